//! The account provisioning workflow
//!
//! [`Provisioner::apply`] turns validated form input into an OS user
//! account: validate the fields, decide between creating a fresh account
//! and updating an existing one, reconcile the home directory, set the
//! password, and optionally join the privileged groups. The interface is
//! driven through the [`Interaction`] trait so the same workflow runs under
//! the TUI and under scripted tests.
//!
//! Error policy: anything the operator can correct surfaces as an inline
//! dialog plus a field refocus and yields `Ok(ApplyOutcome::Failure)`;
//! conditions with no recovery path (a missing privileged group, an
//! unreadable passwd file) propagate as `Err`, which callers must treat as
//! a failed apply.

use std::os::unix::fs::chown;

use tracing::{info, warn};

use crate::accounts::{AccountDatabase, SHA_CRYPT_ROUNDS};
use crate::config_file::WizardConfig;
use crate::error::{FirstbootError, Result};
use crate::homedir::{self, PathProbe};
use crate::policy::LoginDefs;
use crate::shells;
use crate::types::{ApplyOutcome, Field, FormInput};
use crate::validate;

const MSG_PASSWORD_REQUIRED: &str = "You must enter and confirm a password for this user.";
const MSG_PASSWORD_MISMATCH: &str =
    "The passwords do not match.  Please enter the password again.";
const MSG_NO_LOGIN_ACCOUNT: &str = "You did not set up a user account capable of logging into \
     the system.\nAre you sure you want to continue?";

/// Operator's answer to a blocking yes/no question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Yes,
    No,
}

/// The interface collaborator the workflow talks to: modal dialogs, field
/// side effects, and the cooperative yield point used during long walks.
pub trait Interaction {
    /// Show a blocking error dialog.
    fn show_error(&mut self, message: &str) -> Result<()>;
    /// Ask a blocking yes/no question.
    fn confirm(&mut self, message: &str) -> Result<Confirmation>;
    /// Blank a form field.
    fn clear_field(&mut self, field: Field);
    /// Move input focus to a form field.
    fn focus_field(&mut self, field: Field);
    /// Show a please-wait notice before a long operation.
    fn begin_wait(&mut self, message: &str) -> Result<()>;
    /// Remove the please-wait notice.
    fn end_wait(&mut self);
    /// Cooperative yield: let the interface pump pending events.
    fn tick(&mut self);
}

/// One-shot provisioning driver over an account database and the wizard
/// settings.
pub struct Provisioner<'a> {
    db: &'a mut dyn AccountDatabase,
    config: &'a WizardConfig,
}

impl<'a> Provisioner<'a> {
    pub fn new(db: &'a mut dyn AccountDatabase, config: &'a WizardConfig) -> Self {
        Provisioner { db, config }
    }

    /// Run the whole workflow for one apply action. With `testing` set the
    /// call short-circuits to success without side effects.
    pub fn apply(
        &mut self,
        form: &FormInput,
        ui: &mut dyn Interaction,
        testing: bool,
    ) -> Result<ApplyOutcome> {
        if testing {
            return Ok(ApplyOutcome::Success);
        }

        let username = form.username.trim();

        if username.is_empty() {
            return self.apply_without_account(form, ui);
        }

        if let Err(err) = validate::check_username(username) {
            ui.show_error(&err.to_string())?;
            ui.focus_field(Field::Username);
            return Ok(ApplyOutcome::Failure);
        }

        if form.password.is_empty() || form.confirm_password.is_empty() {
            return self.reject_password(ui, MSG_PASSWORD_REQUIRED);
        }
        if form.password != form.confirm_password {
            return self.reject_password(ui, MSG_PASSWORD_MISMATCH);
        }

        let existing = self.db.lookup_user(username)?;

        let uid_min = LoginDefs::load(&self.config.login_defs)?.uid_min();
        if let Some(user) = &existing {
            if user.uid < uid_min {
                ui.show_error(&format!(
                    "The username '{}' is a reserved system account.  \
                     Please specify another username.",
                    username
                ))?;
                ui.clear_field(Field::Username);
                ui.focus_field(Field::Username);
                return Ok(ApplyOutcome::Failure);
            }
        }

        let full_name = form.full_name.trim();
        if let Err(err) = validate::check_realname(full_name) {
            ui.show_error(&err.to_string())?;
            ui.focus_field(Field::FullName);
            return Ok(ApplyOutcome::Failure);
        }

        // A pre-existing home directory may be adopted by the new account;
        // declining means picking a different username.
        let home = self.config.home_root.join(username);
        let mkhomedir = match homedir::probe(&home) {
            PathProbe::Exists => {
                let question = format!(
                    "A home directory for user {} already exists. Would you like \
                     to continue, making the new user the owner of this directory \
                     and all its contents?  Doing so may take a while to reset \
                     permissions and any SELinux labels.  If not, please choose a \
                     different username.",
                    username
                );
                match ui.confirm(&question)? {
                    Confirmation::No => {
                        ui.clear_field(Field::Username);
                        ui.focus_field(Field::Username);
                        return Ok(ApplyOutcome::Failure);
                    }
                    Confirmation::Yes => false,
                }
            }
            PathProbe::NotFound => true,
            PathProbe::Error(err) => {
                // Lenient: an unprobeable path is treated as absent and the
                // account tool gets to surface the real problem.
                warn!(home = %home.display(), error = %err, "could not probe home directory");
                true
            }
        };

        let is_new = existing.is_none();
        let mut account = match existing {
            Some(user) => user,
            None => self.db.init_user(username, uid_min)?,
        };
        account.gecos = full_name.to_string();

        let group = if is_new {
            self.db.init_group(username, uid_min)?
        } else {
            match self.db.lookup_group(username)? {
                Some(group) => group,
                None => self.db.init_group(username, uid_min)?,
            }
        };
        account.gid = group.gid;

        if is_new {
            info!(user = username, uid = account.uid, gid = account.gid, mkhomedir,
                "creating account");
            self.db.add_group(&group)?;
            self.db.add_user(&account, mkhomedir)?;

            if !mkhomedir {
                ui.begin_wait(&format!(
                    "Fixing attributes on the home directory for {}.  \
                     This may take a few minutes.",
                    username
                ))?;
                let report = homedir::adopt_home_directory(
                    &home,
                    &self.config.skel_dir,
                    account.uid,
                    account.gid,
                    || ui.tick(),
                )?;
                ui.end_wait();

                if !report.is_clean() {
                    let report_path = homedir::write_problem_report(&report)?;
                    warn!(
                        failed = report.failures.len(),
                        report = %report_path.display(),
                        "ownership fixes failed for some files"
                    );
                    ui.show_error(&format!(
                        "Problems were encountered fixing the attributes on some \
                         files in the home directory for {}.  Please refer to {} \
                         for which files caused the errors.",
                        username,
                        report_path.display()
                    ))?;
                }
            }
        } else {
            info!(user = username, uid = account.uid, "updating existing account");
            self.db.modify_user(&account)?;
            self.db.modify_group(&group)?;
            chown(&account.home_dir, Some(account.uid), Some(account.gid))?;
        }

        self.db
            .set_password(&account, &form.password, SHA_CRYPT_ROUNDS)?;

        if form.wants_admin {
            self.join_admin_groups(username)?;
        }

        Ok(ApplyOutcome::Success)
    }

    /// Empty username: allowed when the network-auth helper has run or a
    /// login-capable account already exists; otherwise the operator must
    /// explicitly accept a system nobody can log into.
    fn apply_without_account(
        &mut self,
        form: &FormInput,
        ui: &mut dyn Interaction,
    ) -> Result<ApplyOutcome> {
        if form.network_auth_done {
            return Ok(ApplyOutcome::Success);
        }

        let login_shells = shells::login_shells(&self.config.shells_file)?;
        let has_login_account = self
            .db
            .enumerate_users()?
            .iter()
            .any(|user| user.name != "root" && login_shells.iter().any(|s| *s == user.shell));
        if has_login_account {
            return Ok(ApplyOutcome::Success);
        }

        match ui.confirm(MSG_NO_LOGIN_ACCOUNT)? {
            Confirmation::Yes => Ok(ApplyOutcome::Success),
            Confirmation::No => {
                ui.focus_field(Field::Username);
                Ok(ApplyOutcome::Failure)
            }
        }
    }

    fn reject_password(&mut self, ui: &mut dyn Interaction, message: &str) -> Result<ApplyOutcome> {
        ui.show_error(message)?;
        ui.clear_field(Field::Password);
        ui.clear_field(Field::Confirm);
        ui.focus_field(Field::Password);
        Ok(ApplyOutcome::Failure)
    }

    /// Join each configured privileged group in order. A missing group is
    /// unrecoverable; a failure on the second group leaves the first
    /// membership committed.
    fn join_admin_groups(&mut self, username: &str) -> Result<()> {
        for group_name in &self.config.admin_groups {
            let mut group = self.db.lookup_group(group_name)?.ok_or_else(|| {
                FirstbootError::account(format!(
                    "privileged group '{}' does not exist",
                    group_name
                ))
            })?;
            group.members.insert(username.to_string());
            self.db.modify_group(&group)?;
            info!(user = username, group = %group_name, "added to privileged group");
        }
        Ok(())
    }
}

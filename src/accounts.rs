//! System account database access
//!
//! [`AccountDatabase`] is the explicit client object the provisioning
//! workflow drives; [`ShadowDatabase`] is the production implementation,
//! reading the passwd/group/shadow files directly for lookups and driving
//! the shadow-utils tools (`useradd`, `usermod`, `groupadd`, `gpasswd`,
//! `chpasswd`) for persistence.
//!
//! # Security: Password Handling
//!
//! Passwords are written to `chpasswd`'s stdin, never placed on a command
//! line: CLI arguments are visible in `/proc/<pid>/cmdline` to every user
//! on the system.

use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use tracing::debug;

use crate::config_file::WizardConfig;
use crate::error::{FirstbootError, Result};

/// Fixed SHA-512 hashing round count used for every password set
/// non-interactively by the wizard.
pub const SHA_CRYPT_ROUNDS: u32 = 5000;

/// One OS-level user record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemAccount {
    pub name: String,
    pub uid: u32,
    /// Primary group id; equals the matching group's gid after creation.
    pub gid: u32,
    pub gecos: String,
    pub home_dir: PathBuf,
    pub shell: String,
    /// Whether the account's password is locked (shadow `!`/`*` prefix).
    pub locked: bool,
}

/// One OS-level group record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemGroup {
    pub name: String,
    pub gid: u32,
    /// Supplementary member names, not primary-gid membership.
    pub members: BTreeSet<String>,
}

/// Client interface to the system account store.
///
/// Identifier allocation happens at init time (libuser semantics): an
/// initialized account or group already carries its uid/gid, so linkage
/// invariants can be established before anything is persisted.
pub trait AccountDatabase {
    fn lookup_user(&self, name: &str) -> Result<Option<SystemAccount>>;
    fn lookup_user_by_uid(&self, uid: u32) -> Result<Option<SystemAccount>>;
    fn lookup_group(&self, name: &str) -> Result<Option<SystemGroup>>;
    fn enumerate_users(&self) -> Result<Vec<SystemAccount>>;
    /// Supplementary members of a group; empty when the group is absent.
    fn enumerate_group_members(&self, group: &str) -> Result<Vec<String>>;
    /// Initialize a new in-memory account with the next free uid at or
    /// above `uid_min`. Nothing is persisted until [`Self::add_user`].
    fn init_user(&self, name: &str, uid_min: u32) -> Result<SystemAccount>;
    /// Initialize a new in-memory group with the next free gid at or above
    /// `gid_min`.
    fn init_group(&self, name: &str, gid_min: u32) -> Result<SystemGroup>;
    /// Persist a new account; `mkhomedir` materializes the home directory
    /// (populated from the skeleton by the account tool itself).
    fn add_user(&mut self, account: &SystemAccount, mkhomedir: bool) -> Result<()>;
    fn add_group(&mut self, group: &SystemGroup) -> Result<()>;
    fn modify_user(&mut self, account: &SystemAccount) -> Result<()>;
    fn modify_group(&mut self, group: &SystemGroup) -> Result<()>;
    /// Set the account password with a fixed hashing round count.
    fn set_password(&mut self, account: &SystemAccount, password: &str, rounds: u32)
        -> Result<()>;
}

/// Account database backed by the local passwd/group/shadow files and the
/// shadow-utils command-line tools.
#[derive(Debug, Clone)]
pub struct ShadowDatabase {
    passwd_file: PathBuf,
    group_file: PathBuf,
    shadow_file: PathBuf,
    home_root: PathBuf,
    skel_dir: PathBuf,
    default_shell: String,
}

impl ShadowDatabase {
    pub fn from_config(config: &WizardConfig) -> Self {
        ShadowDatabase {
            passwd_file: config.passwd_file.clone(),
            group_file: config.group_file.clone(),
            shadow_file: config.shadow_file.clone(),
            home_root: config.home_root.clone(),
            skel_dir: config.skel_dir.clone(),
            default_shell: config.default_shell.clone(),
        }
    }

    /// Construct against explicit paths.
    pub fn at(
        passwd_file: impl Into<PathBuf>,
        group_file: impl Into<PathBuf>,
        shadow_file: impl Into<PathBuf>,
        home_root: impl Into<PathBuf>,
        default_shell: impl Into<String>,
    ) -> Self {
        ShadowDatabase {
            passwd_file: passwd_file.into(),
            group_file: group_file.into(),
            shadow_file: shadow_file.into(),
            home_root: home_root.into(),
            skel_dir: PathBuf::from("/etc/skel"),
            default_shell: default_shell.into(),
        }
    }

    fn users(&self) -> Result<Vec<SystemAccount>> {
        let text = std::fs::read_to_string(&self.passwd_file)?;
        let locked = self.locked_names();
        Ok(text
            .lines()
            .filter_map(parse_passwd_line)
            .map(|mut account| {
                account.locked = locked.contains(&account.name);
                account
            })
            .collect())
    }

    fn groups(&self) -> Result<Vec<SystemGroup>> {
        let text = std::fs::read_to_string(&self.group_file)?;
        Ok(text.lines().filter_map(parse_group_line).collect())
    }

    /// Names whose shadow password field starts with `!` or `*`. Shadow is
    /// only readable by root; anything else sees every account unlocked.
    fn locked_names(&self) -> BTreeSet<String> {
        match std::fs::read_to_string(&self.shadow_file) {
            Ok(text) => text
                .lines()
                .filter_map(|line| {
                    let mut fields = line.split(':');
                    let name = fields.next()?;
                    let password = fields.next()?;
                    if password.starts_with('!') || password.starts_with('*') {
                        Some(name.to_string())
                    } else {
                        None
                    }
                })
                .collect(),
            Err(err) => {
                debug!(error = %err, "shadow file unreadable, lock status unavailable");
                BTreeSet::new()
            }
        }
    }
}

impl AccountDatabase for ShadowDatabase {
    fn lookup_user(&self, name: &str) -> Result<Option<SystemAccount>> {
        Ok(self.users()?.into_iter().find(|u| u.name == name))
    }

    fn lookup_user_by_uid(&self, uid: u32) -> Result<Option<SystemAccount>> {
        Ok(self.users()?.into_iter().find(|u| u.uid == uid))
    }

    fn lookup_group(&self, name: &str) -> Result<Option<SystemGroup>> {
        Ok(self.groups()?.into_iter().find(|g| g.name == name))
    }

    fn enumerate_users(&self) -> Result<Vec<SystemAccount>> {
        self.users()
    }

    fn enumerate_group_members(&self, group: &str) -> Result<Vec<String>> {
        Ok(self
            .lookup_group(group)?
            .map(|g| g.members.into_iter().collect())
            .unwrap_or_default())
    }

    fn init_user(&self, name: &str, uid_min: u32) -> Result<SystemAccount> {
        let used: BTreeSet<u32> = self.users()?.iter().map(|u| u.uid).collect();
        let uid = next_free_id(&used, uid_min)?;
        Ok(SystemAccount {
            name: name.to_string(),
            uid,
            // Placeholder until the matching group is initialized.
            gid: uid,
            gecos: String::new(),
            home_dir: self.home_root.join(name),
            shell: self.default_shell.clone(),
            locked: false,
        })
    }

    fn init_group(&self, name: &str, gid_min: u32) -> Result<SystemGroup> {
        let used: BTreeSet<u32> = self.groups()?.iter().map(|g| g.gid).collect();
        let gid = next_free_id(&used, gid_min)?;
        Ok(SystemGroup {
            name: name.to_string(),
            gid,
            members: BTreeSet::new(),
        })
    }

    fn add_user(&mut self, account: &SystemAccount, mkhomedir: bool) -> Result<()> {
        let mut args: Vec<String> = vec![
            "--uid".into(),
            account.uid.to_string(),
            "--gid".into(),
            account.gid.to_string(),
            "--no-user-group".into(),
            "--comment".into(),
            account.gecos.clone(),
            "--home-dir".into(),
            account.home_dir.display().to_string(),
            "--shell".into(),
            account.shell.clone(),
        ];
        if mkhomedir {
            args.push("--create-home".into());
            args.push("--skel".into());
            args.push(self.skel_dir.display().to_string());
        } else {
            args.push("--no-create-home".into());
        }
        args.push(account.name.clone());
        run_tool("useradd", &args)
    }

    fn add_group(&mut self, group: &SystemGroup) -> Result<()> {
        run_tool(
            "groupadd",
            &["--gid".into(), group.gid.to_string(), group.name.clone()],
        )
    }

    fn modify_user(&mut self, account: &SystemAccount) -> Result<()> {
        run_tool(
            "usermod",
            &[
                "--comment".into(),
                account.gecos.clone(),
                "--gid".into(),
                account.gid.to_string(),
                account.name.clone(),
            ],
        )
    }

    fn modify_group(&mut self, group: &SystemGroup) -> Result<()> {
        let members: Vec<&str> = group.members.iter().map(String::as_str).collect();
        run_tool(
            "gpasswd",
            &[
                "--members".into(),
                members.join(","),
                group.name.clone(),
            ],
        )
    }

    fn set_password(
        &mut self,
        account: &SystemAccount,
        password: &str,
        rounds: u32,
    ) -> Result<()> {
        debug!(user = %account.name, rounds, "setting password via chpasswd");
        let mut child = Command::new("chpasswd")
            .args(["--crypt-method", "SHA512", "--sha-rounds"])
            .arg(rounds.to_string())
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| FirstbootError::system(format!("failed to run chpasswd: {}", err)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| FirstbootError::system("chpasswd stdin unavailable"))?;
        writeln!(stdin, "{}:{}", account.name, password)?;
        drop(stdin);

        let output = child.wait_with_output()?;
        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(FirstbootError::system(format!(
                "chpasswd failed: {}",
                stderr.trim()
            )))
        }
    }
}

/// Run one of the shadow-utils tools, mapping a non-zero exit to an error
/// carrying its stderr.
fn run_tool(tool: &str, args: &[String]) -> Result<()> {
    debug!(tool, ?args, "running account tool");
    let output = Command::new(tool)
        .args(args)
        .output()
        .map_err(|err| FirstbootError::system(format!("failed to run {}: {}", tool, err)))?;
    if output.status.success() {
        Ok(())
    } else {
        let stderr = String::from_utf8_lossy(&output.stderr);
        Err(FirstbootError::system(format!(
            "{} failed: {}",
            tool,
            stderr.trim()
        )))
    }
}

fn next_free_id(used: &BTreeSet<u32>, min: u32) -> Result<u32> {
    (min..=u32::MAX)
        .find(|id| !used.contains(id))
        .ok_or_else(|| FirstbootError::account("no free account identifier available"))
}

fn parse_passwd_line(line: &str) -> Option<SystemAccount> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() != 7 {
        return None;
    }
    Some(SystemAccount {
        name: fields[0].to_string(),
        uid: fields[2].parse().ok()?,
        gid: fields[3].parse().ok()?,
        gecos: fields[4].to_string(),
        home_dir: PathBuf::from(fields[5]),
        shell: fields[6].to_string(),
        locked: false,
    })
}

fn parse_group_line(line: &str) -> Option<SystemGroup> {
    let fields: Vec<&str> = line.split(':').collect();
    if fields.len() != 4 {
        return None;
    }
    let members = fields[3]
        .split(',')
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();
    Some(SystemGroup {
        name: fields[0].to_string(),
        gid: fields[2].parse().ok()?,
        members,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    const PASSWD: &str = "\
root:x:0:0:root:/root:/bin/bash
bin:x:1:1:bin:/bin:/sbin/nologin
alice:x:501:501:Alice Jones:/home/alice:/bin/bash
bob:x:502:502::/home/bob:/bin/zsh
broken line without colons
";

    const GROUP: &str = "\
root:x:0:
wheel:x:10:alice,bob
alice:x:501:
dialout:x:18:
";

    const SHADOW: &str = "\
root:!!:19000:0:99999:7:::
alice:$6$salt$hash:19000:0:99999:7:::
bob:*:19000:0:99999:7:::
";

    fn fixture_db() -> (tempfile::TempDir, ShadowDatabase) {
        let dir = tempfile::tempdir().unwrap();
        for (name, contents) in [("passwd", PASSWD), ("group", GROUP), ("shadow", SHADOW)] {
            let mut file = std::fs::File::create(dir.path().join(name)).unwrap();
            file.write_all(contents.as_bytes()).unwrap();
        }
        let db = ShadowDatabase::at(
            dir.path().join("passwd"),
            dir.path().join("group"),
            dir.path().join("shadow"),
            "/home",
            "/bin/bash",
        );
        (dir, db)
    }

    #[test]
    fn test_lookup_user() {
        let (_dir, db) = fixture_db();
        let alice = db.lookup_user("alice").unwrap().unwrap();
        assert_eq!(alice.uid, 501);
        assert_eq!(alice.gecos, "Alice Jones");
        assert_eq!(alice.home_dir, PathBuf::from("/home/alice"));
        assert!(db.lookup_user("nobody-here").unwrap().is_none());
    }

    #[test]
    fn test_lookup_user_by_uid() {
        let (_dir, db) = fixture_db();
        let root = db.lookup_user_by_uid(0).unwrap().unwrap();
        assert_eq!(root.name, "root");
    }

    #[test]
    fn test_locked_flag_from_shadow() {
        let (_dir, db) = fixture_db();
        assert!(db.lookup_user("root").unwrap().unwrap().locked);
        assert!(db.lookup_user("bob").unwrap().unwrap().locked);
        assert!(!db.lookup_user("alice").unwrap().unwrap().locked);
    }

    #[test]
    fn test_malformed_passwd_lines_skipped() {
        let (_dir, db) = fixture_db();
        let users = db.enumerate_users().unwrap();
        assert_eq!(users.len(), 4);
    }

    #[test]
    fn test_lookup_group_members() {
        let (_dir, db) = fixture_db();
        let wheel = db.lookup_group("wheel").unwrap().unwrap();
        assert_eq!(wheel.gid, 10);
        assert!(wheel.members.contains("alice"));
        assert!(wheel.members.contains("bob"));

        let empty = db.lookup_group("dialout").unwrap().unwrap();
        assert!(empty.members.is_empty());
    }

    #[test]
    fn test_enumerate_group_members_absent_group() {
        let (_dir, db) = fixture_db();
        assert!(db.enumerate_group_members("no-such-group").unwrap().is_empty());
    }

    #[test]
    fn test_init_user_allocates_above_min() {
        let (_dir, db) = fixture_db();
        let account = db.init_user("carol", 500).unwrap();
        // 501 and 502 are taken, 500 is free.
        assert_eq!(account.uid, 500);
        assert_eq!(account.home_dir, PathBuf::from("/home/carol"));
        assert_eq!(account.shell, "/bin/bash");

        let account = db.init_user("carol", 501).unwrap();
        assert_eq!(account.uid, 503);
    }

    #[test]
    fn test_init_group_allocates_above_min() {
        let (_dir, db) = fixture_db();
        let group = db.init_group("carol", 500).unwrap();
        assert_eq!(group.gid, 500);
        let group = db.init_group("carol", 501).unwrap();
        assert_eq!(group.gid, 502);
    }

    #[test]
    fn test_next_free_id_skips_used() {
        let used: BTreeSet<u32> = [500, 501, 503].into_iter().collect();
        assert_eq!(next_free_id(&used, 500).unwrap(), 502);
        assert_eq!(next_free_id(&used, 600).unwrap(), 600);
    }

    #[test]
    fn test_parse_group_line_empty_members() {
        let group = parse_group_line("audio:x:63:").unwrap();
        assert!(group.members.is_empty());
    }
}

//! firstboot-tui library
//!
//! Core functionality of the first-boot create-user wizard: input
//! validation, the minimum-UID policy, the account database client, home
//! directory reconciliation, and the provisioning workflow that ties them
//! together. The binary adds the terminal front end.

pub mod accounts;
pub mod app;
pub mod cli;
pub mod config_file;
pub mod error;
pub mod homedir;
pub mod netauth;
pub mod policy;
pub mod provision;
pub mod pwcheck;
pub mod sanity;
pub mod screen;
pub mod shells;
pub mod theme;
pub mod types;
pub mod ui;
pub mod validate;

// Re-export main types for convenience
pub use accounts::{
    AccountDatabase, ShadowDatabase, SystemAccount, SystemGroup, SHA_CRYPT_ROUNDS,
};
pub use config_file::WizardConfig;
pub use error::{FirstbootError, Result};
pub use homedir::{ChownReport, PathProbe, REPORT_PREFIX, YIELD_EVERY};
pub use policy::{LoginDefs, DEFAULT_UID_MIN};
pub use provision::{Confirmation, Interaction, Provisioner};
pub use screen::{CreateUserScreen, ScreenEvent};
pub use types::{ApplyOutcome, Field, FormInput};

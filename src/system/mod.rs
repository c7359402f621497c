//! Host probes consumed by the app: where Brave is installed and whether the
//! current user may write managed policies.

pub mod detect;
pub mod privilege;

pub use detect::{InstallDetector, Installation, SystemDetector};
pub use privilege::{check_privilege, PrivilegeError};

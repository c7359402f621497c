use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PrivilegeError {
    #[error(
        "SlimBrave must be run as root.\nUsage: sudo slimbrave\n(no write access to {})",
        .path.display()
    )]
    NotPermitted { path: PathBuf },
}

/// Passes when the effective user is root or owns the closest existing
/// ancestor of the policy file's directory.
pub fn check_privilege(policy_file: &Path) -> Result<(), PrivilegeError> {
    let anchor = nearest_existing_ancestor(policy_file);
    if effective_user_may_write(&anchor) {
        Ok(())
    } else {
        Err(PrivilegeError::NotPermitted { path: anchor })
    }
}

fn nearest_existing_ancestor(policy_file: &Path) -> PathBuf {
    policy_file
        .parent()
        .into_iter()
        .flat_map(Path::ancestors)
        .find(|candidate| !candidate.as_os_str().is_empty() && candidate.exists())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

#[cfg(unix)]
fn effective_user_may_write(anchor: &Path) -> bool {
    use std::os::unix::fs::MetadataExt;

    let euid = nix::unistd::geteuid();
    if euid.is_root() {
        return true;
    }
    std::fs::metadata(anchor)
        .map(|metadata| metadata.uid() == euid.as_raw())
        .unwrap_or(false)
}

#[cfg(not(unix))]
fn effective_user_may_write(_anchor: &Path) -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn owner_of_existing_ancestor_passes() {
        let dir = tempdir().expect("tempdir");
        let policy = dir.path().join("policies/managed/slimbrave.json");
        assert_eq!(nearest_existing_ancestor(&policy), dir.path());
        check_privilege(&policy).expect("tempdir owner may write");
    }

    #[cfg(unix)]
    #[test]
    fn foreign_owned_directory_is_rejected_for_regular_users() {
        if nix::unistd::geteuid().is_root() {
            return;
        }
        let err = check_privilege(Path::new("/etc/brave/policies/managed/slimbrave.json"))
            .expect_err("regular users do not own /etc");
        assert!(err.to_string().contains("must be run as root"));
    }
}

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

const SNAP_WARNING: &str =
    "Snap confinement may prevent policies from taking effect. Native packages are recommended.";
const NOT_FOUND_WARNING: &str =
    "Brave browser not found. Policies will be written but may have no effect.";

/// How Brave was found on this machine. Used for display only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Installation {
    pub found: bool,
    pub method: String,
    pub path: String,
    pub warnings: Vec<String>,
}

impl Installation {
    fn found(method: &str, path: impl Into<String>) -> Self {
        Self {
            found: true,
            method: method.to_string(),
            path: path.into(),
            warnings: Vec::new(),
        }
    }

    pub fn not_found() -> Self {
        Self {
            found: false,
            method: "not found".to_string(),
            path: String::new(),
            warnings: vec![NOT_FOUND_WARNING.to_string()],
        }
    }
}

pub trait InstallDetector {
    fn detect(&self) -> Installation;
}

/// Probes the filesystem, flatpak and `PATH` in packaging-priority order.
#[derive(Debug, Clone)]
pub struct SystemDetector {
    root: PathBuf,
    search_path: Option<std::ffi::OsString>,
    probe_flatpak: bool,
}

impl Default for SystemDetector {
    fn default() -> Self {
        Self {
            root: PathBuf::from("/"),
            search_path: std::env::var_os("PATH"),
            probe_flatpak: true,
        }
    }
}

impl SystemDetector {
    /// Detector rooted at `root` with an explicit search path and no flatpak
    /// probe, for exercising the probe order against a fixture tree.
    pub fn rooted(root: impl Into<PathBuf>, search_path: Option<std::ffi::OsString>) -> Self {
        Self {
            root: root.into(),
            search_path,
            probe_flatpak: false,
        }
    }

    fn under_root(&self, absolute: &str) -> PathBuf {
        self.root.join(absolute.trim_start_matches('/'))
    }

    fn flatpak_has_brave(&self) -> bool {
        if !self.probe_flatpak {
            return false;
        }
        Command::new("flatpak")
            .args(["info", "com.brave.Browser"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn which(&self, name: &str) -> Option<PathBuf> {
        let paths = self.search_path.as_ref()?;
        std::env::split_paths(paths)
            .map(|dir| dir.join(name))
            .find(|candidate| candidate.is_file())
    }
}

impl InstallDetector for SystemDetector {
    fn detect(&self) -> Installation {
        let arch = self.under_root("/opt/brave-bin/brave");
        if arch.is_file() {
            return Installation::found("arch", display(&arch));
        }

        for candidate in [
            "/opt/brave.com/brave/brave-browser",
            "/opt/brave.com/brave/brave",
        ] {
            let path = self.under_root(candidate);
            if path.is_file() {
                return Installation::found("deb/rpm", display(&path));
            }
        }

        if self.flatpak_has_brave() {
            return Installation::found("flatpak", "com.brave.Browser");
        }

        let snap_binary = self.under_root("/snap/brave/current/opt/brave.com/brave/brave");
        if snap_binary.is_file() || self.under_root("/snap/brave/current").is_dir() {
            let mut installation = Installation::found("snap", display(&snap_binary));
            installation.warnings.push(SNAP_WARNING.to_string());
            return installation;
        }

        for name in ["brave-browser-stable", "brave-browser", "brave"] {
            if let Some(path) = self.which(name) {
                return Installation::found("unknown", display(&path));
            }
        }

        Installation::not_found()
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, b"").expect("touch");
    }

    #[test]
    fn arch_package_wins_over_deb_layout() {
        let root = tempdir().expect("tempdir");
        touch(&root.path().join("opt/brave-bin/brave"));
        touch(&root.path().join("opt/brave.com/brave/brave-browser"));

        let installation = SystemDetector::rooted(root.path(), None).detect();
        assert_eq!(installation.method, "arch");
        assert!(installation.warnings.is_empty());
    }

    #[test]
    fn snap_directory_is_detected_with_confinement_warning() {
        let root = tempdir().expect("tempdir");
        fs::create_dir_all(root.path().join("snap/brave/current")).expect("mkdir");

        let installation = SystemDetector::rooted(root.path(), None).detect();
        assert_eq!(installation.method, "snap");
        assert_eq!(installation.warnings, vec![SNAP_WARNING.to_string()]);
    }

    #[test]
    fn path_lookup_is_the_last_resort() {
        let root = tempdir().expect("tempdir");
        let bin = root.path().join("usr/bin");
        touch(&bin.join("brave-browser"));

        let installation =
            SystemDetector::rooted(root.path(), Some(bin.clone().into_os_string())).detect();
        assert_eq!(installation.method, "unknown");
        assert_eq!(installation.path, bin.join("brave-browser").display().to_string());
    }

    #[test]
    fn missing_browser_reports_not_found_warning() {
        let root = tempdir().expect("tempdir");
        let installation = SystemDetector::rooted(root.path(), None).detect();
        assert_eq!(installation, Installation::not_found());
        assert!(!installation.found);
    }
}

use super::navigation::{action_from_key, transition, NavAction, NavEffect, NavState};
use crate::catalog::Catalog;
use crate::policy::PolicyStore;
use crate::reconcile;
use crate::rows::{self, Row};
use crate::shared::errors::ErrorKind;
use crate::shared::logging::EventLog;
use crate::system::Installation;
use crate::transfer;
use crossterm::event::KeyEvent;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub ok: bool,
    pub message: String,
}

impl Status {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Everything the interactive loop owns: rows, navigation state and the
/// status line. Effects requested by the navigation state machine are
/// executed here against the policy store and the import/export codec.
pub struct Session<'a> {
    catalog: &'a Catalog,
    store: PolicyStore,
    log: EventLog,
    rows: Vec<Row>,
    nav: NavState,
    status: Option<Status>,
    install_method: String,
}

impl<'a> Session<'a> {
    /// Projects the catalog and pre-checks rows from the policy on disk. A
    /// corrupt or unreadable policy starts the session with every row off.
    pub fn start(
        catalog: &'a Catalog,
        store: PolicyStore,
        log: EventLog,
        installation: &Installation,
        viewport_height: usize,
    ) -> Self {
        let mut rows = rows::project(catalog);
        let loaded = store.load();
        reconcile::sync(catalog, &mut rows, &loaded.document);
        let nav = NavState::new(&rows, viewport_height);

        let status = if let Some(diagnostic) = &loaded.diagnostic {
            log.warn("policy_load", &diagnostic.to_string());
            Some(Status::error(format!(
                "{diagnostic}. Starting with all settings off."
            )))
        } else {
            installation.warnings.first().map(|warning| Status {
                ok: installation.found,
                message: warning.clone(),
            })
        };
        log.info(
            "session_start",
            &format!(
                "policy={} found={} checked={} install={}",
                store.path().display(),
                loaded.found,
                rows::checked_count(&rows),
                installation.method
            ),
        );

        Self {
            catalog,
            store,
            log,
            rows,
            nav,
            status,
            install_method: installation.method.clone(),
        }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn nav(&self) -> &NavState {
        &self.nav
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn catalog(&self) -> &Catalog {
        self.catalog
    }

    pub fn policy_path(&self) -> &Path {
        self.store.path()
    }

    pub fn install_method(&self) -> &str {
        &self.install_method
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn set_viewport(&mut self, height: usize) {
        self.handle_action(NavAction::Viewport(height));
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Flow {
        match action_from_key(&self.nav.focus, key) {
            Some(action) => self.handle_action(action),
            None => Flow::Continue,
        }
    }

    pub fn handle_action(&mut self, action: NavAction) -> Flow {
        let transition = match transition(&mut self.nav, &mut self.rows, action) {
            Ok(transition) => transition,
            Err(err) => {
                self.status = Some(Status::error(err.to_string()));
                return Flow::Continue;
            }
        };
        if let Some(feedback) = transition.feedback {
            self.status = Some(Status::ok(feedback));
        } else if transition.effect == NavEffect::None && !matches!(action, NavAction::Viewport(_))
        {
            self.status = None;
        }
        self.run_effect(transition.effect)
    }

    fn run_effect(&mut self, effect: NavEffect) -> Flow {
        let status = match effect {
            NavEffect::None => return Flow::Continue,
            NavEffect::Quit => {
                self.log.info("session_quit", "user quit");
                return Flow::Exit;
            }
            NavEffect::Apply => self.apply(),
            NavEffect::Reset => self.reset(),
            NavEffect::Import(path) => self.import(&path),
            NavEffect::Export(path) => self.export(&path),
            NavEffect::UpdateTemplate(url) => self.update_template(&url),
        };
        self.status = Some(status);
        self.nav.reconcile(&self.rows);
        Flow::Continue
    }

    fn apply(&mut self) -> Status {
        let document = reconcile::apply(self.catalog, &self.rows);
        match self.store.save(&document) {
            Ok(()) => {
                self.log.info(
                    "apply",
                    &format!(
                        "wrote {} keys to {}",
                        document.len(),
                        self.store.path().display()
                    ),
                );
                if reconcile::missing_custom_template(&self.rows) {
                    Status::ok(
                        "Settings applied. Warning: custom DNS mode has no template URL set.",
                    )
                } else {
                    Status::ok("Settings applied. Restart Brave to see changes.")
                }
            }
            Err(err) => {
                self.log.error("apply", &err.to_string());
                Status::error(failure_message("Failed to apply", err.kind(), &err))
            }
        }
    }

    fn reset(&mut self) -> Status {
        match self.store.remove() {
            Ok(removed) => {
                reconcile::reset_rows(&mut self.rows);
                self.log.info("reset", &format!("removed={removed}"));
                Status::ok("All settings reset. Restart Brave to see changes.")
            }
            Err(err) => {
                self.log.error("reset", &err.to_string());
                Status::error(failure_message("Failed to reset", err.kind(), &err))
            }
        }
    }

    fn import(&mut self, path: &str) -> Status {
        if path.is_empty() {
            return Status::error(format!(
                "{}: no file path entered.",
                ErrorKind::ValidationError
            ));
        }
        let imported = transfer::read_config(Path::new(path))
            .and_then(|config| transfer::config_to_document(&config, self.catalog));
        match imported {
            Ok(document) => {
                reconcile::sync(self.catalog, &mut self.rows, &document);
                let count = rows::checked_count(&self.rows);
                self.log
                    .info("import", &format!("imported {count} features from {path}"));
                Status::ok(format!(
                    "Imported {count} features from {path}. Choose Apply to write the policy."
                ))
            }
            Err(err) => {
                self.log.error("import", &err.to_string());
                Status::error(failure_message("Import failed", err.kind(), &err))
            }
        }
    }

    fn export(&mut self, path: &str) -> Status {
        if path.is_empty() {
            return Status::error(format!(
                "{}: no file path entered.",
                ErrorKind::ValidationError
            ));
        }
        let document = reconcile::apply(self.catalog, &self.rows);
        let written = transfer::encode(self.catalog, &document)
            .and_then(|bytes| transfer::write_config(Path::new(path), &bytes));
        match written {
            Ok(()) => {
                self.log.info("export", &format!("exported config to {path}"));
                Status::ok(format!("Exported settings to {path}."))
            }
            Err(err) => {
                self.log.error("export", &err.to_string());
                Status::error(failure_message("Export failed", err.kind(), &err))
            }
        }
    }

    fn update_template(&mut self, url: &str) -> Status {
        if let Err(reason) = reconcile::validate_template_url(url) {
            return Status::error(format!("{}: {reason}", ErrorKind::ValidationError));
        }
        rows::set_dns_template(&mut self.rows, url);
        if url.is_empty() {
            Status::ok("DNS template cleared. Warning: custom mode needs a template URL.")
        } else {
            Status::ok(format!("DNS template set to {url}."))
        }
    }
}

fn failure_message(prefix: &str, kind: ErrorKind, err: &dyn std::fmt::Display) -> String {
    match kind {
        ErrorKind::PermissionDenied => format!("{prefix}: {err}. Run as root."),
        _ => format!("{prefix}: {err}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::navigation::{Button, Focus};
    use crossterm::event::{KeyCode, KeyModifiers};
    use serde_json::json;
    use std::fs;
    use tempfile::tempdir;

    fn found() -> Installation {
        Installation {
            found: true,
            method: "deb/rpm".to_string(),
            path: "/opt/brave.com/brave/brave".to_string(),
            warnings: Vec::new(),
        }
    }

    #[test]
    fn corrupt_policy_starts_unchecked_with_error_status() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("slimbrave.json");
        fs::write(&path, "{{{").expect("seed");
        let catalog = Catalog::builtin();

        let session = Session::start(
            &catalog,
            PolicyStore::new(&path),
            EventLog::disabled(),
            &found(),
            10,
        );

        assert_eq!(rows::checked_count(session.rows()), 0);
        let status = session.status().expect("status");
        assert!(!status.ok);
        assert!(status.message.contains("not valid JSON"));
    }

    #[test]
    fn installation_warning_is_shown_at_startup() {
        let dir = tempdir().expect("tempdir");
        let catalog = Catalog::builtin();
        let session = Session::start(
            &catalog,
            PolicyStore::new(dir.path().join("slimbrave.json")),
            EventLog::disabled(),
            &Installation::not_found(),
            10,
        );
        let status = session.status().expect("status");
        assert!(!status.ok);
        assert!(status.message.contains("Brave browser not found"));
    }

    #[test]
    fn failed_apply_keeps_focus_and_reports_status() {
        let dir = tempdir().expect("tempdir");
        let catalog = Catalog::builtin();
        let mut session = Session::start(
            &catalog,
            PolicyStore::new(dir.path().join("missing/slimbrave.json")),
            EventLog::disabled(),
            &found(),
            10,
        );
        session.handle_action(NavAction::SwitchZone);
        session.handle_action(NavAction::Right);
        session.handle_action(NavAction::Right);
        assert_eq!(session.nav().button, Button::Apply);

        assert_eq!(session.handle_action(NavAction::Activate), Flow::Continue);
        assert_eq!(session.nav().focus, Focus::ButtonBar);
        let status = session.status().expect("status");
        assert!(!status.ok);
        assert!(status.message.starts_with("Failed to apply"));
    }

    #[test]
    fn invalid_template_is_rejected_and_empty_path_is_a_validation_error() {
        let dir = tempdir().expect("tempdir");
        let catalog = Catalog::builtin();
        let mut session = Session::start(
            &catalog,
            PolicyStore::new(dir.path().join("slimbrave.json")),
            EventLog::disabled(),
            &found(),
            10,
        );
        let status = session.update_template("ftp://dns");
        assert!(!status.ok);
        assert_eq!(rows::dns_template(session.rows()), "");

        let status = session.import("");
        assert!(status.message.starts_with("validation_error"));
    }

    #[test]
    fn export_then_import_restores_rows() {
        let dir = tempdir().expect("tempdir");
        let policy = dir.path().join("slimbrave.json");
        fs::write(
            &policy,
            json!({"TorDisabled": true, "DnsMode": "secure"}).to_string(),
        )
        .expect("seed");
        let catalog = Catalog::builtin();
        let mut session = Session::start(
            &catalog,
            PolicyStore::new(&policy),
            EventLog::disabled(),
            &found(),
            10,
        );
        let exported = dir.path().join("export.json");
        let before = session.rows().to_vec();

        assert!(session.export(&exported.display().to_string()).ok);
        reconcile::reset_rows(&mut session.rows);
        assert!(session.import(&exported.display().to_string()).ok);

        assert_eq!(session.rows(), before.as_slice());
    }

    fn open_reset_confirmation(session: &mut Session<'_>) {
        session.handle_action(NavAction::SwitchZone);
        for _ in 0..3 {
            session.handle_action(NavAction::Right);
        }
        assert_eq!(session.nav().button, Button::Reset);
        assert_eq!(session.handle_action(NavAction::Activate), Flow::Continue);
    }

    fn seeded_session<'a>(catalog: &'a Catalog, policy: &Path) -> Session<'a> {
        fs::write(
            policy,
            json!({
                "TorDisabled": true,
                "DnsMode": "custom",
                "DohTemplateUrl": "https://dns.example/q"
            })
            .to_string(),
        )
        .expect("seed");
        Session::start(
            catalog,
            PolicyStore::new(policy),
            EventLog::disabled(),
            &found(),
            10,
        )
    }

    #[test]
    fn confirmed_reset_removes_policy_and_clears_rows() {
        let dir = tempdir().expect("tempdir");
        let policy = dir.path().join("slimbrave.json");
        let catalog = Catalog::builtin();
        let mut session = seeded_session(&catalog, &policy);
        assert_eq!(rows::checked_count(session.rows()), 1);

        open_reset_confirmation(&mut session);
        assert!(policy.exists());
        session.handle_key(KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE));

        assert!(!policy.exists());
        assert_eq!(session.rows(), rows::project(&catalog).as_slice());
        assert_eq!(session.nav().focus, Focus::ButtonBar);
        let status = session.status().expect("status");
        assert!(status.ok);
        assert!(status.message.starts_with("All settings reset"));
    }

    #[test]
    fn declined_reset_keeps_policy_and_rows() {
        let dir = tempdir().expect("tempdir");
        let policy = dir.path().join("slimbrave.json");
        let catalog = Catalog::builtin();
        let mut session = seeded_session(&catalog, &policy);
        let before = session.rows().to_vec();

        open_reset_confirmation(&mut session);
        session.handle_key(KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE));

        assert!(policy.exists());
        assert_eq!(session.rows(), before.as_slice());
        assert_eq!(session.nav().focus, Focus::ButtonBar);
        assert_eq!(
            session.status().map(|status| status.message.as_str()),
            Some("Reset cancelled.")
        );
    }

    #[test]
    fn failed_reset_leaves_rows_untouched() {
        let dir = tempdir().expect("tempdir");
        let policy = dir.path().join("slimbrave.json");
        fs::create_dir_all(policy.join("nested")).expect("policy path as directory");
        let catalog = Catalog::builtin();
        let mut session = Session::start(
            &catalog,
            PolicyStore::new(&policy),
            EventLog::disabled(),
            &found(),
            10,
        );
        session.handle_action(NavAction::Toggle);
        let before = session.rows().to_vec();

        open_reset_confirmation(&mut session);
        session.handle_action(NavAction::Confirm);

        assert_eq!(session.rows(), before.as_slice());
        assert_eq!(rows::checked_count(session.rows()), 1);
        let status = session.status().expect("status");
        assert!(!status.ok);
        assert!(status.message.starts_with("Failed to reset"));
    }

    #[test]
    fn failed_import_leaves_rows_untouched() {
        let dir = tempdir().expect("tempdir");
        let policy = dir.path().join("slimbrave.json");
        let catalog = Catalog::builtin();
        let mut session = seeded_session(&catalog, &policy);
        let before = session.rows().to_vec();

        let malformed = dir.path().join("malformed.json");
        fs::write(&malformed, "{\"Features\": [").expect("seed malformed");
        let status = session.import(&malformed.display().to_string());
        assert!(!status.ok);
        assert!(status.message.starts_with("Import failed"));
        assert_eq!(session.rows(), before.as_slice());

        let bad_template = dir.path().join("bad-template.json");
        fs::write(
            &bad_template,
            json!({"Features": [], "DnsMode": "custom", "DohTemplate": "ftp://bad host"})
                .to_string(),
        )
        .expect("seed bad template");
        let status = session.import(&bad_template.display().to_string());
        assert!(!status.ok);
        assert!(status.message.contains("invalid DohTemplate"));
        assert_eq!(session.rows(), before.as_slice());
    }

    #[test]
    fn apply_with_custom_mode_and_no_template_succeeds_with_warning() {
        let dir = tempdir().expect("tempdir");
        let policy = dir.path().join("slimbrave.json");
        let catalog = Catalog::builtin();
        let mut session = Session::start(
            &catalog,
            PolicyStore::new(&policy),
            EventLog::disabled(),
            &found(),
            10,
        );
        rows::set_dns_mode(&mut session.rows, crate::policy::DnsMode::Custom);

        let status = session.apply();

        assert!(status.ok);
        assert!(status.message.contains("Warning"));
        let written: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&policy).expect("read")).expect("json");
        assert_eq!(written, json!({"DnsMode": "custom"}));
    }
}

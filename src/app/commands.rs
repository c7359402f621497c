use super::cli::{help_text, parse_cli_args, version_text};
use crate::catalog::Catalog;
use crate::config::{AppConfig, CliCommand};
use crate::policy::DnsMode;
use crate::reconcile;
use crate::rows;
use crate::shared::logging::EventLog;
use crate::system::{check_privilege, InstallDetector, SystemDetector};
use crate::transfer;
use crate::ui::session::Session;
use crate::ui::{parse_scripted_keys, terminal};
use std::path::Path;

pub fn run_cli(args: Vec<String>) -> Result<String, String> {
    let options = parse_cli_args(&args).map_err(|err| format!("{err}\n\n{}", help_text()))?;
    let command = match &options.command {
        CliCommand::Help => return Ok(help_text()),
        CliCommand::Version => return Ok(version_text()),
        command => command.clone(),
    };

    let config = AppConfig::resolve(&options);
    let catalog = Catalog::builtin();
    catalog
        .validate()
        .map_err(|err| format!("built-in feature catalog is invalid: {err}"))?;
    let log = config.event_log();

    match command {
        CliCommand::Import(path) => cmd_import(&catalog, &config, &log, &path),
        CliCommand::Export(path) => cmd_export(&catalog, &config, &log, &path),
        CliCommand::Reset => cmd_reset(&config, &log),
        CliCommand::Interactive | CliCommand::Help | CliCommand::Version => {
            cmd_interactive(&catalog, &config, log)
        }
    }
}

fn cmd_import(
    catalog: &Catalog,
    config: &AppConfig,
    log: &EventLog,
    path: &Path,
) -> Result<String, String> {
    check_privilege(&config.policy_file).map_err(|err| err.to_string())?;
    let mut import = transfer::read_config(path).map_err(|err| {
        log.error("import", &err.to_string());
        format!("import failed: {err}")
    })?;

    let mut notes = Vec::new();
    if let Some(template) = &config.doh_template_override {
        if import.mode() == DnsMode::Custom {
            import.doh_template = Some(template.clone());
        } else {
            notes.push(format!(
                "note: --doh-templates ignored because DnsMode is `{}`",
                import.mode()
            ));
        }
    }

    let document = transfer::config_to_document(&import, catalog).map_err(|err| {
        log.error("import", &err.to_string());
        format!("import failed: {err}")
    })?;
    let mut rows = rows::project(catalog);
    reconcile::sync(catalog, &mut rows, &document);
    let policy = reconcile::apply(catalog, &rows);
    config.policy_store().save(&policy).map_err(|err| {
        log.error("import", &err.to_string());
        format!("failed to write policy: {err}")
    })?;
    if reconcile::missing_custom_template(&rows) {
        notes.push("warning: DnsMode is custom but no DoH template was provided".to_string());
    }

    let checked = rows::checked_count(&rows);
    let skipped = import
        .features
        .iter()
        .filter(|key| catalog.find_by_key(key).is_none())
        .count();
    log.info(
        "import",
        &format!("imported {checked} features from {}", path.display()),
    );
    let mut lines = vec![
        format!("imported {checked} features from {}", path.display()),
        format!("policy={}", config.policy_file.display()),
        format!("dns_mode={}", rows::dns_mode(&rows)),
    ];
    if skipped > 0 {
        lines.push(format!("skipped {skipped} unknown feature keys"));
    }
    lines.extend(notes);
    lines.push("Restart Brave to see changes.".to_string());
    Ok(lines.join("\n"))
}

fn cmd_export(
    catalog: &Catalog,
    config: &AppConfig,
    log: &EventLog,
    path: &Path,
) -> Result<String, String> {
    let loaded = config.policy_store().load();
    if let Some(diagnostic) = loaded.diagnostic {
        log.error("export", &diagnostic.to_string());
        return Err(format!("export failed: {diagnostic}"));
    }
    let bytes = transfer::encode(catalog, &loaded.document)
        .and_then(|bytes| transfer::write_config(path, &bytes).map(|()| bytes))
        .map_err(|err| {
            log.error("export", &err.to_string());
            format!("export failed: {err}")
        })?;
    let exported = transfer::decode(&bytes)
        .map(|config| config.features.len())
        .unwrap_or(0);

    log.info(
        "export",
        &format!("exported {exported} features to {}", path.display()),
    );
    let mut lines = vec![format!(
        "exported {exported} features to {}",
        path.display()
    )];
    if !loaded.found {
        lines.push(format!(
            "note: no policy file at {}; exported defaults",
            config.policy_file.display()
        ));
    }
    Ok(lines.join("\n"))
}

fn cmd_reset(config: &AppConfig, log: &EventLog) -> Result<String, String> {
    check_privilege(&config.policy_file).map_err(|err| err.to_string())?;
    let removed = config.policy_store().remove().map_err(|err| {
        log.error("reset", &err.to_string());
        format!("reset failed: {err}")
    })?;
    log.info("reset", &format!("removed={removed}"));
    if removed {
        Ok(format!(
            "removed {}\nRestart Brave to see changes.",
            config.policy_file.display()
        ))
    } else {
        Ok(format!(
            "no policy file at {}; nothing to reset",
            config.policy_file.display()
        ))
    }
}

fn cmd_interactive(catalog: &Catalog, config: &AppConfig, log: EventLog) -> Result<String, String> {
    check_privilege(&config.policy_file).map_err(|err| err.to_string())?;
    let scripted = match &config.script_keys {
        Some(raw) => Some(parse_scripted_keys(raw)?),
        None => None,
    };
    if scripted.is_none() && !terminal::is_interactive_terminal() {
        return Err(
            "interactive mode needs a terminal; use --import, --export or --reset instead"
                .to_string(),
        );
    }

    let installation = SystemDetector::default().detect();
    let mut session = Session::start(
        catalog,
        config.policy_store(),
        log,
        &installation,
        terminal::SCRIPTED_VIEWPORT_HEIGHT,
    );
    match scripted {
        Some(keys) => Ok(terminal::run_scripted_session(&mut session, keys)),
        None => {
            terminal::run_terminal_session(&mut session)?;
            Ok(String::new())
        }
    }
}

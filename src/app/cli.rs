use crate::config::{CliCommand, CliOptions, ConfigError};
use crate::reconcile::validate_template_url;
use std::path::PathBuf;

pub fn cli_help_lines() -> Vec<String> {
    vec![
        "Usage: slimbrave [OPTIONS]".to_string(),
        String::new(),
        "Without options an interactive terminal UI is started.".to_string(),
        String::new(),
        "Options:".to_string(),
        "  --import PATH            Import a SlimBrave config and write the policy file"
            .to_string(),
        "  --export PATH            Export the current policy file as a SlimBrave config"
            .to_string(),
        "  --reset                  Remove the policy file".to_string(),
        "  --policy-file PATH       Policy file to manage".to_string(),
        "                           (default /etc/brave/policies/managed/slimbrave.json)"
            .to_string(),
        "  --doh-templates URL      DNS-over-HTTPS template to use with --import".to_string(),
        "  -h, --help               Show this help".to_string(),
        "  -V, --version            Show the version".to_string(),
    ]
}

pub fn help_text() -> String {
    cli_help_lines().join("\n")
}

pub fn version_text() -> String {
    format!("slimbrave {}", env!("CARGO_PKG_VERSION"))
}

fn set_command(slot: &mut Option<CliCommand>, command: CliCommand) -> Result<(), ConfigError> {
    if slot.is_some() {
        return Err(ConfigError::ConflictingCommands);
    }
    *slot = Some(command);
    Ok(())
}

/// Parses `--flag VALUE` and `--flag=VALUE` forms.
pub fn parse_cli_args(args: &[String]) -> Result<CliOptions, ConfigError> {
    let mut command = None;
    let mut policy_file = None;
    let mut doh_template = None;

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let (flag, inline) = match arg.split_once('=') {
            Some((flag, value)) if flag.starts_with("--") => (flag, Some(value.to_string())),
            _ => (arg.as_str(), None),
        };
        let mut value = |flag: &str| -> Result<String, ConfigError> {
            match inline.clone() {
                Some(value) => Ok(value),
                None => iter
                    .next()
                    .cloned()
                    .ok_or_else(|| ConfigError::MissingValue(flag.to_string())),
            }
        };
        match flag {
            "-h" | "--help" => return Ok(bare(CliCommand::Help)),
            "-V" | "--version" => return Ok(bare(CliCommand::Version)),
            "--import" => set_command(&mut command, CliCommand::Import(PathBuf::from(value(flag)?)))?,
            "--export" => set_command(&mut command, CliCommand::Export(PathBuf::from(value(flag)?)))?,
            "--reset" => {
                if inline.is_some() {
                    return Err(ConfigError::UnexpectedValue {
                        flag: flag.to_string(),
                    });
                }
                set_command(&mut command, CliCommand::Reset)?
            }
            "--policy-file" => policy_file = Some(PathBuf::from(value(flag)?)),
            "--doh-templates" => {
                let url = value(flag)?;
                validate_template_url(&url).map_err(ConfigError::InvalidTemplate)?;
                doh_template = Some(url);
            }
            other => return Err(ConfigError::UnknownOption(other.to_string())),
        }
    }

    let command = command.unwrap_or(CliCommand::Interactive);
    if doh_template.is_some() && !matches!(command, CliCommand::Import(_)) {
        return Err(ConfigError::TemplateWithoutImport);
    }
    Ok(CliOptions {
        command,
        policy_file,
        doh_template,
    })
}

fn bare(command: CliCommand) -> CliOptions {
    CliOptions {
        command,
        policy_file: None,
        doh_template: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn no_arguments_means_interactive() {
        let options = parse_cli_args(&[]).expect("parse");
        assert_eq!(options.command, CliCommand::Interactive);
        assert_eq!(options.policy_file, None);
    }

    #[test]
    fn accepts_separate_and_inline_values() {
        let options = parse_cli_args(&args(&[
            "--import",
            "cfg.json",
            "--policy-file=/tmp/p.json",
            "--doh-templates",
            "https://dns.example/dns-query",
        ]))
        .expect("parse");
        assert_eq!(options.command, CliCommand::Import(PathBuf::from("cfg.json")));
        assert_eq!(options.policy_file, Some(PathBuf::from("/tmp/p.json")));
        assert_eq!(
            options.doh_template.as_deref(),
            Some("https://dns.example/dns-query")
        );
    }

    #[test]
    fn rejects_conflicting_and_incomplete_invocations() {
        assert_eq!(
            parse_cli_args(&args(&["--reset", "--export", "x.json"])),
            Err(ConfigError::ConflictingCommands)
        );
        assert_eq!(
            parse_cli_args(&args(&["--export"])),
            Err(ConfigError::MissingValue("--export".to_string()))
        );
        assert_eq!(
            parse_cli_args(&args(&["--reset", "--doh-templates", "https://x"])),
            Err(ConfigError::TemplateWithoutImport)
        );
        assert_eq!(
            parse_cli_args(&args(&["--frobnicate"])),
            Err(ConfigError::UnknownOption("--frobnicate".to_string()))
        );
        assert!(matches!(
            parse_cli_args(&args(&["--import", "a", "--doh-templates", "http://x"])),
            Err(ConfigError::InvalidTemplate(_))
        ));
    }

    #[test]
    fn help_short_circuits_other_flags() {
        let options = parse_cli_args(&args(&["--reset", "--help"])).expect("parse");
        assert_eq!(options.command, CliCommand::Help);
        assert!(help_text().contains("--doh-templates URL"));
    }
}

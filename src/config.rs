//! Runtime configuration resolved from command-line flags and environment.

use crate::policy::{PolicyStore, DEFAULT_POLICY_FILE};
use crate::shared::logging::EventLog;
use std::ffi::OsString;
use std::path::PathBuf;

pub const POLICY_FILE_ENV: &str = "SLIMBRAVE_POLICY_FILE";
pub const LOG_FILE_ENV: &str = "SLIMBRAVE_LOG_FILE";
pub const SCRIPT_KEYS_ENV: &str = "SLIMBRAVE_SCRIPT_KEYS";

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("unknown option `{0}`")]
    UnknownOption(String),
    #[error("option `{0}` requires a value")]
    MissingValue(String),
    #[error("option `{flag}` does not take a value")]
    UnexpectedValue { flag: String },
    #[error("only one of --import, --export and --reset may be given")]
    ConflictingCommands,
    #[error("--doh-templates is only valid together with --import")]
    TemplateWithoutImport,
    #[error("invalid --doh-templates value: {0}")]
    InvalidTemplate(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliCommand {
    Interactive,
    Import(PathBuf),
    Export(PathBuf),
    Reset,
    Help,
    Version,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliOptions {
    pub command: CliCommand,
    pub policy_file: Option<PathBuf>,
    pub doh_template: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub policy_file: PathBuf,
    pub doh_template_override: Option<String>,
    pub log_file: Option<PathBuf>,
    pub script_keys: Option<String>,
    pub create_policy_dir: bool,
}

impl AppConfig {
    pub fn resolve(options: &CliOptions) -> Self {
        Self::resolve_with_env(options, |name| std::env::var_os(name))
    }

    /// Flag values win over environment values, which win over defaults.
    pub fn resolve_with_env<F>(options: &CliOptions, env: F) -> Self
    where
        F: Fn(&str) -> Option<OsString>,
    {
        let non_empty = |name: &str| env(name).filter(|value| !value.is_empty());
        let policy_file = options
            .policy_file
            .clone()
            .or_else(|| non_empty(POLICY_FILE_ENV).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_POLICY_FILE));
        let log_file = non_empty(LOG_FILE_ENV).map(PathBuf::from).or_else(|| {
            non_empty("HOME").map(|home| {
                PathBuf::from(home)
                    .join(".local/state/slimbrave")
                    .join("slimbrave.log")
            })
        });
        let script_keys = non_empty(SCRIPT_KEYS_ENV).map(|raw| raw.to_string_lossy().into_owned());

        Self {
            policy_file,
            doh_template_override: options.doh_template.clone(),
            log_file,
            script_keys,
            create_policy_dir: true,
        }
    }

    pub fn policy_store(&self) -> PolicyStore {
        PolicyStore::new(&self.policy_file).with_create_parent(self.create_policy_dir)
    }

    pub fn event_log(&self) -> EventLog {
        match &self.log_file {
            Some(path) => EventLog::to_file(path),
            None => EventLog::disabled(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    fn options(policy_file: Option<&str>) -> CliOptions {
        CliOptions {
            command: CliCommand::Interactive,
            policy_file: policy_file.map(PathBuf::from),
            doh_template: None,
        }
    }

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<OsString> {
        let map = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), OsString::from(v)))
            .collect::<BTreeMap<_, _>>();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_apply_without_flags_or_environment() {
        let config = AppConfig::resolve_with_env(&options(None), env_from(&[]));
        assert_eq!(config.policy_file, PathBuf::from(DEFAULT_POLICY_FILE));
        assert_eq!(config.log_file, None);
        assert_eq!(config.script_keys, None);
        assert!(config.create_policy_dir);
    }

    #[test]
    fn flag_beats_environment_for_policy_file() {
        let env = env_from(&[(POLICY_FILE_ENV, "/env/policy.json"), ("HOME", "/home/u")]);
        let config = AppConfig::resolve_with_env(&options(Some("/flag/policy.json")), &env);
        assert_eq!(config.policy_file, PathBuf::from("/flag/policy.json"));
        assert_eq!(
            config.log_file,
            Some(PathBuf::from("/home/u/.local/state/slimbrave/slimbrave.log"))
        );

        let config = AppConfig::resolve_with_env(&options(None), &env);
        assert_eq!(config.policy_file, PathBuf::from("/env/policy.json"));
    }

    #[test]
    fn explicit_log_file_overrides_home_default() {
        let env = env_from(&[(LOG_FILE_ENV, "/var/log/sb.log"), ("HOME", "/root")]);
        let config = AppConfig::resolve_with_env(&options(None), env);
        assert_eq!(config.log_file, Some(PathBuf::from("/var/log/sb.log")));
    }
}

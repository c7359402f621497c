//! The managed-policy document and its on-disk store.

pub mod error;
pub mod store;

pub use error::PolicyError;
pub use store::{LoadedPolicy, PolicyStore};

use serde_json::{Map, Value};
use std::collections::BTreeMap;

pub const DEFAULT_POLICY_FILE: &str = "/etc/brave/policies/managed/slimbrave.json";

/// Reserved key carrying the DNS-over-HTTPS mode.
pub const DNS_MODE_KEY: &str = "DnsMode";
/// Reserved key carrying the custom DNS-over-HTTPS template.
pub const DNS_TEMPLATE_KEY: &str = "DohTemplateUrl";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DnsMode {
    #[default]
    Automatic,
    Off,
    Secure,
    Custom,
}

pub const ALL_DNS_MODES: [DnsMode; 4] = [
    DnsMode::Automatic,
    DnsMode::Off,
    DnsMode::Secure,
    DnsMode::Custom,
];

impl DnsMode {
    pub fn as_str(self) -> &'static str {
        match self {
            DnsMode::Automatic => "automatic",
            DnsMode::Off => "off",
            DnsMode::Secure => "secure",
            DnsMode::Custom => "custom",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        ALL_DNS_MODES
            .into_iter()
            .find(|mode| mode.as_str() == raw)
    }

    fn position(self) -> usize {
        match self {
            DnsMode::Automatic => 0,
            DnsMode::Off => 1,
            DnsMode::Secure => 2,
            DnsMode::Custom => 3,
        }
    }

    pub fn next(self) -> Self {
        ALL_DNS_MODES[(self.position() + 1) % ALL_DNS_MODES.len()]
    }

    pub fn prev(self) -> Self {
        ALL_DNS_MODES[(self.position() + ALL_DNS_MODES.len() - 1) % ALL_DNS_MODES.len()]
    }
}

impl std::fmt::Display for DnsMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Policy key to enforced value, as written to the managed-policy file.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyDocument {
    entries: BTreeMap<String, Value>,
}

impl PolicyDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a document from key/value pairs; later duplicates win.
    pub fn from_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        let mut document = Self::new();
        for (key, value) in entries {
            document.insert(key, value);
        }
        document
    }

    pub fn from_json_object(object: Map<String, Value>) -> Self {
        Self::from_entries(object)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.entries.insert(key.into(), value);
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Recognized DNS mode, or `None` when the key is absent or unknown.
    pub fn dns_mode(&self) -> Option<DnsMode> {
        self.get(DNS_MODE_KEY)
            .and_then(Value::as_str)
            .and_then(DnsMode::parse)
    }

    pub fn dns_template(&self) -> Option<&str> {
        self.get(DNS_TEMPLATE_KEY).and_then(Value::as_str)
    }

    pub fn set_dns_mode(&mut self, mode: DnsMode) {
        self.insert(DNS_MODE_KEY, Value::String(mode.as_str().to_string()));
    }

    pub fn set_dns_template(&mut self, template: &str) {
        self.insert(DNS_TEMPLATE_KEY, Value::String(template.to_string()));
    }

    pub fn to_json_object(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect()
    }

    /// Pretty JSON with a trailing newline, the form written to disk.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        let mut body = to_json_indented(&Value::Object(self.to_json_object()))?;
        body.push('\n');
        Ok(body)
    }
}

/// Serializes with four-space indentation, matching what Brave admins expect
/// to find in managed-policy files.
pub(crate) fn to_json_indented(value: &Value) -> Result<String, serde_json::Error> {
    use serde::Serialize;

    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut serializer)?;
    Ok(String::from_utf8_lossy(&out).into_owned())
}

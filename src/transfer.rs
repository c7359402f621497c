//! Import/export config shared with the Windows edition of SlimBrave.
//!
//! The exchange format lists enabled policy keys only:
//! `{"Features": [...], "DnsMode": "...", "DohTemplate": "..."}`. Files may
//! arrive UTF-8 or UTF-16 encoded, with or without a byte-order mark.

use crate::catalog::Catalog;
use crate::policy::{to_json_indented, DnsMode, PolicyDocument};
use crate::reconcile::validate_template_url;
use crate::shared::errors::ErrorKind;
use crate::shared::fs_atomic::atomic_write_file;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::Path;

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];
const UTF16_LE_BOM: &[u8] = &[0xFF, 0xFE];
const UTF16_BE_BOM: &[u8] = &[0xFE, 0xFF];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportExportConfig {
    #[serde(rename = "Features")]
    pub features: Vec<String>,
    #[serde(rename = "DnsMode", default = "default_dns_mode")]
    pub dns_mode: String,
    #[serde(
        rename = "DohTemplate",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub doh_template: Option<String>,
}

fn default_dns_mode() -> String {
    DnsMode::Automatic.as_str().to_string()
}

impl ImportExportConfig {
    /// Unknown or missing mode strings read as `automatic`.
    pub fn mode(&self) -> DnsMode {
        DnsMode::parse(&self.dns_mode).unwrap_or_default()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransferError {
    #[error("config file {path} does not exist")]
    Missing { path: String },
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write config file {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("config is not valid text: {0}")]
    Encoding(String),
    #[error("config is not valid JSON: {0}")]
    Json(#[source] serde_json::Error),
    #[error("config must be a JSON object with a `Features` array: {0}")]
    Shape(String),
    #[error("failed to encode config: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("invalid DohTemplate: {0}")]
    InvalidTemplate(String),
}

impl TransferError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TransferError::Missing { .. } => ErrorKind::NotFound,
            TransferError::Read { .. } | TransferError::Write { .. } => {
                ErrorKind::PermissionDenied
            }
            TransferError::Encoding(_)
            | TransferError::Json(_)
            | TransferError::Shape(_)
            | TransferError::Encode(_) => ErrorKind::InvalidFormat,
            TransferError::InvalidTemplate(_) => ErrorKind::ValidationError,
        }
    }
}

/// Converts raw file bytes to text, honoring UTF-8 and UTF-16 byte-order marks.
fn decode_text(bytes: &[u8]) -> Result<String, TransferError> {
    if let Some(rest) = bytes.strip_prefix(UTF8_BOM) {
        return String::from_utf8(rest.to_vec())
            .map_err(|err| TransferError::Encoding(err.to_string()));
    }
    if let Some(rest) = bytes.strip_prefix(UTF16_LE_BOM) {
        return decode_utf16(rest, u16::from_le_bytes);
    }
    if let Some(rest) = bytes.strip_prefix(UTF16_BE_BOM) {
        return decode_utf16(rest, u16::from_be_bytes);
    }
    String::from_utf8(bytes.to_vec()).map_err(|err| TransferError::Encoding(err.to_string()))
}

fn decode_utf16(bytes: &[u8], to_unit: fn([u8; 2]) -> u16) -> Result<String, TransferError> {
    if bytes.len() % 2 != 0 {
        return Err(TransferError::Encoding(
            "UTF-16 payload has an odd number of bytes".to_string(),
        ));
    }
    let units = bytes
        .chunks_exact(2)
        .map(|pair| to_unit([pair[0], pair[1]]))
        .collect::<Vec<_>>();
    String::from_utf16(&units).map_err(|err| TransferError::Encoding(err.to_string()))
}

pub fn decode(bytes: &[u8]) -> Result<ImportExportConfig, TransferError> {
    let text = decode_text(bytes)?;
    let value: Value = serde_json::from_str(text.trim_start_matches('\u{feff}'))
        .map_err(TransferError::Json)?;
    let Value::Object(object) = &value else {
        return Err(TransferError::Shape("top-level value is not an object".to_string()));
    };
    match object.get("Features") {
        Some(Value::Array(_)) => {}
        Some(_) => return Err(TransferError::Shape("`Features` is not an array".to_string())),
        None => return Err(TransferError::Shape("`Features` is missing".to_string())),
    }
    serde_json::from_value(value).map_err(|err| TransferError::Shape(err.to_string()))
}

/// Emits UTF-8 JSON without a BOM. `Features` follows catalog order and only
/// names keys whose stored value is the catalog's enforced value.
pub fn encode(catalog: &Catalog, document: &PolicyDocument) -> Result<Vec<u8>, TransferError> {
    let config = document_to_config(catalog, document);
    let value = serde_json::to_value(&config).map_err(TransferError::Encode)?;
    let mut body = to_json_indented(&value).map_err(TransferError::Encode)?;
    body.push('\n');
    Ok(body.into_bytes())
}

pub fn document_to_config(catalog: &Catalog, document: &PolicyDocument) -> ImportExportConfig {
    let features = catalog
        .features()
        .filter(|(_, feature)| {
            document
                .get(feature.policy_key)
                .is_some_and(|stored| feature.enforced_value.matches(stored))
        })
        .map(|(_, feature)| feature.policy_key.to_string())
        .collect();
    let mode = document.dns_mode().unwrap_or_default();
    let doh_template = match (mode, document.dns_template()) {
        (DnsMode::Custom, Some(template)) if !template.is_empty() => Some(template.to_string()),
        _ => None,
    };
    ImportExportConfig {
        features,
        dns_mode: mode.as_str().to_string(),
        doh_template,
    }
}

/// Maps enabled keys to their enforced values. Keys the catalog does not know
/// are skipped so configs from newer or older catalogs still import. A custom
/// template must pass the same validation as one typed into the UI.
pub fn config_to_document(
    config: &ImportExportConfig,
    catalog: &Catalog,
) -> Result<PolicyDocument, TransferError> {
    let mut document = PolicyDocument::new();
    for key in &config.features {
        if let Some(feature) = catalog.find_by_key(key) {
            document.insert(feature.policy_key, feature.enforced_value.to_json());
        }
    }
    let mode = config.mode();
    document.set_dns_mode(mode);
    if mode == DnsMode::Custom {
        if let Some(template) = config.doh_template.as_deref().filter(|t| !t.is_empty()) {
            validate_template_url(template).map_err(TransferError::InvalidTemplate)?;
            document.set_dns_template(template);
        }
    }
    Ok(document)
}

pub fn read_config(path: &Path) -> Result<ImportExportConfig, TransferError> {
    let bytes = fs::read(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            TransferError::Missing {
                path: path.display().to_string(),
            }
        } else {
            TransferError::Read {
                path: path.display().to_string(),
                source,
            }
        }
    })?;
    decode(&bytes)
}

pub fn write_config(path: &Path, bytes: &[u8]) -> Result<(), TransferError> {
    atomic_write_file(path, bytes).map_err(|source| TransferError::Write {
        path: path.display().to_string(),
        source,
    })
}

//! Two-way mapping between row state and the managed-policy document.

use crate::catalog::Catalog;
use crate::policy::{DnsMode, PolicyDocument};
use crate::rows::{self, Row};

/// Marks each feature row checked when the document stores exactly the
/// feature's enforced value, and copies the DNS settings onto the DNS rows.
///
/// A stored value that differs from the enforced one leaves the row
/// unchecked. A missing or unrecognized DNS mode resets the rows to
/// `automatic`.
pub fn sync(catalog: &Catalog, rows: &mut [Row], document: &PolicyDocument) {
    for row in rows.iter_mut() {
        if let Row::Feature { feature, checked } = row {
            *checked = catalog
                .feature(*feature)
                .and_then(|feature| {
                    document
                        .get(feature.policy_key)
                        .map(|stored| feature.enforced_value.matches(stored))
                })
                .unwrap_or(false);
        }
    }

    let mode = document.dns_mode().unwrap_or_default();
    rows::set_dns_mode(rows, mode);
    let template = if mode == DnsMode::Custom {
        document.dns_template().unwrap_or("")
    } else {
        ""
    };
    rows::set_dns_template(rows, template);
}

/// Collects checked rows into a fresh document. The DNS mode is always
/// written; the template only for `custom` with a non-empty URL.
pub fn apply(catalog: &Catalog, rows: &[Row]) -> PolicyDocument {
    let mut document = PolicyDocument::new();
    for row in rows {
        match row {
            Row::Feature {
                feature,
                checked: true,
            } => {
                if let Some(feature) = catalog.feature(*feature) {
                    document.insert(feature.policy_key, feature.enforced_value.to_json());
                }
            }
            Row::DnsMode { mode } => document.set_dns_mode(*mode),
            Row::DnsTemplate { template_url, .. } => {
                if rows::dns_mode(rows) == DnsMode::Custom && !template_url.is_empty() {
                    document.set_dns_template(template_url);
                }
            }
            Row::Header { .. } | Row::Feature { checked: false, .. } => {}
        }
    }
    document
}

pub fn reset_rows(rows: &mut [Row]) {
    for row in rows.iter_mut() {
        if let Row::Feature { checked, .. } = row {
            *checked = false;
        }
    }
    rows::set_dns_mode(rows, DnsMode::Automatic);
    rows::set_dns_template(rows, "");
}

/// True when the rows describe a custom DNS mode that has no template yet.
pub fn missing_custom_template(rows: &[Row]) -> bool {
    rows::dns_mode(rows) == DnsMode::Custom && rows::dns_template(rows).is_empty()
}

/// Accepts an empty value (clears the template) or an `https://` URL with a
/// host and no whitespace.
pub fn validate_template_url(url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Ok(());
    }
    if url.chars().any(char::is_whitespace) {
        return Err("DNS template URL must not contain whitespace".to_string());
    }
    let Some(rest) = url.strip_prefix("https://") else {
        return Err(format!("DNS template URL `{url}` must start with https://"));
    };
    let host = rest.split(['/', '?', '{']).next().unwrap_or("");
    if host.is_empty() {
        return Err(format!("DNS template URL `{url}` has no host"));
    }
    Ok(())
}

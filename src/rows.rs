//! Flattens the catalog into the navigable list shown by the terminal UI.

use crate::catalog::{Catalog, FeatureRef};
use crate::policy::DnsMode;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    Header { name: &'static str },
    Feature { feature: FeatureRef, checked: bool },
    DnsMode { mode: DnsMode },
    DnsTemplate { template_url: String, editable: bool },
}

impl Row {
    pub fn kind(&self) -> RowKind {
        match self {
            Row::Header { .. } => RowKind::Header,
            Row::Feature { .. } => RowKind::Feature,
            Row::DnsMode { .. } => RowKind::DnsMode,
            Row::DnsTemplate { .. } => RowKind::DnsTemplate,
        }
    }

    /// Whether the cursor may rest on this row.
    pub fn is_selectable(&self) -> bool {
        match self {
            Row::Header { .. } => false,
            Row::Feature { .. } | Row::DnsMode { .. } => true,
            Row::DnsTemplate { editable, .. } => *editable,
        }
    }

    pub fn is_visible(&self) -> bool {
        match self {
            Row::DnsTemplate { editable, .. } => *editable,
            Row::Header { .. } | Row::Feature { .. } | Row::DnsMode { .. } => true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    Header,
    Feature,
    DnsMode,
    DnsTemplate,
}

/// Builds the row list: one header plus its features per category, then the
/// DNS mode row and the DNS template row.
pub fn project(catalog: &Catalog) -> Vec<Row> {
    let mut rows = Vec::with_capacity(catalog.categories().len() + catalog.feature_count() + 2);
    for (category_idx, category) in catalog.categories().iter().enumerate() {
        rows.push(Row::Header {
            name: category.name,
        });
        for feature_idx in 0..category.features.len() {
            rows.push(Row::Feature {
                feature: FeatureRef {
                    category: category_idx,
                    feature: feature_idx,
                },
                checked: false,
            });
        }
    }
    rows.push(Row::DnsMode {
        mode: DnsMode::Automatic,
    });
    rows.push(Row::DnsTemplate {
        template_url: String::new(),
        editable: false,
    });
    rows
}

pub fn selectable_indices(rows: &[Row]) -> Vec<usize> {
    rows.iter()
        .enumerate()
        .filter(|(_, row)| row.is_selectable())
        .map(|(idx, _)| idx)
        .collect()
}

/// Number of leading rows that are drawn. Hidden rows only ever trail the
/// list, so row indices and display positions coincide.
pub fn visible_len(rows: &[Row]) -> usize {
    rows.iter().filter(|row| row.is_visible()).count()
}

pub fn dns_mode(rows: &[Row]) -> DnsMode {
    rows.iter()
        .find_map(|row| match row {
            Row::DnsMode { mode } => Some(*mode),
            _ => None,
        })
        .unwrap_or_default()
}

pub fn dns_template(rows: &[Row]) -> &str {
    rows.iter()
        .find_map(|row| match row {
            Row::DnsTemplate { template_url, .. } => Some(template_url.as_str()),
            _ => None,
        })
        .unwrap_or("")
}

/// Sets the DNS mode and keeps the template row's editability in step.
pub fn set_dns_mode(rows: &mut [Row], new_mode: DnsMode) {
    for row in rows.iter_mut() {
        match row {
            Row::DnsMode { mode } => *mode = new_mode,
            Row::DnsTemplate { editable, .. } => *editable = new_mode == DnsMode::Custom,
            Row::Header { .. } | Row::Feature { .. } => {}
        }
    }
}

pub fn set_dns_template(rows: &mut [Row], url: &str) {
    for row in rows.iter_mut() {
        if let Row::DnsTemplate { template_url, .. } = row {
            *template_url = url.to_string();
        }
    }
}

pub fn checked_count(rows: &[Row]) -> usize {
    rows.iter()
        .filter(|row| matches!(row, Row::Feature { checked: true, .. }))
        .count()
}

//! The compiled-in list of policy features SlimBrave knows how to enforce.

use crate::policy::{DNS_MODE_KEY, DNS_TEMPLATE_KEY};
use serde_json::Value;
use std::collections::BTreeSet;

/// Value a feature forces for its policy key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyValue {
    Bool(bool),
    Integer(i64),
    Text(&'static str),
    List(&'static [&'static str]),
}

impl PolicyValue {
    pub fn to_json(self) -> Value {
        match self {
            PolicyValue::Bool(value) => Value::Bool(value),
            PolicyValue::Integer(value) => Value::from(value),
            PolicyValue::Text(value) => Value::String(value.to_string()),
            PolicyValue::List(values) => Value::Array(
                values
                    .iter()
                    .map(|value| Value::String((*value).to_string()))
                    .collect(),
            ),
        }
    }

    pub fn matches(self, stored: &Value) -> bool {
        self.to_json() == *stored
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Feature {
    pub display_name: &'static str,
    pub policy_key: &'static str,
    pub enforced_value: PolicyValue,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Category {
    pub name: &'static str,
    pub features: &'static [Feature],
}

/// Stable position of a feature inside a [`Catalog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FeatureRef {
    pub category: usize,
    pub feature: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("policy key `{key}` is declared by more than one feature")]
    DuplicateKey { key: String },
    #[error("category `{name}` has no features")]
    EmptyCategory { name: String },
    #[error("policy key `{key}` is reserved for the DNS settings")]
    ReservedKey { key: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Catalog {
    categories: &'static [Category],
}

impl Catalog {
    pub const fn new(categories: &'static [Category]) -> Self {
        Self { categories }
    }

    pub const fn builtin() -> Self {
        Self::new(BUILTIN_CATEGORIES)
    }

    /// Checks the invariants row projection and reconciliation rely on.
    pub fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = BTreeSet::new();
        for category in self.categories {
            if category.features.is_empty() {
                return Err(CatalogError::EmptyCategory {
                    name: category.name.to_string(),
                });
            }
            for feature in category.features {
                if [DNS_MODE_KEY, DNS_TEMPLATE_KEY].contains(&feature.policy_key) {
                    return Err(CatalogError::ReservedKey {
                        key: feature.policy_key.to_string(),
                    });
                }
                if !seen.insert(feature.policy_key) {
                    return Err(CatalogError::DuplicateKey {
                        key: feature.policy_key.to_string(),
                    });
                }
            }
        }
        Ok(())
    }

    pub fn categories(&self) -> &'static [Category] {
        self.categories
    }

    pub fn feature(&self, feature_ref: FeatureRef) -> Option<&'static Feature> {
        self.categories
            .get(feature_ref.category)?
            .features
            .get(feature_ref.feature)
    }

    /// Iterates features in display order together with their references.
    pub fn features(&self) -> impl Iterator<Item = (FeatureRef, &'static Feature)> + '_ {
        self.categories
            .iter()
            .enumerate()
            .flat_map(|(category_idx, category)| {
                category
                    .features
                    .iter()
                    .enumerate()
                    .map(move |(feature_idx, feature)| {
                        (
                            FeatureRef {
                                category: category_idx,
                                feature: feature_idx,
                            },
                            feature,
                        )
                    })
            })
    }

    pub fn find_by_key(&self, policy_key: &str) -> Option<&'static Feature> {
        self.features()
            .find(|(_, feature)| feature.policy_key == policy_key)
            .map(|(_, feature)| feature)
    }

    pub fn feature_count(&self) -> usize {
        self.categories
            .iter()
            .map(|category| category.features.len())
            .sum()
    }
}

const fn feature(
    display_name: &'static str,
    policy_key: &'static str,
    enforced_value: PolicyValue,
) -> Feature {
    Feature {
        display_name,
        policy_key,
        enforced_value,
    }
}

const OFF: PolicyValue = PolicyValue::Bool(false);
const ON: PolicyValue = PolicyValue::Bool(true);

const TELEMETRY: &[Feature] = &[
    feature("Disable Metrics Reporting", "MetricsReportingEnabled", OFF),
    feature(
        "Disable Safe Browsing Reporting",
        "SafeBrowsingExtendedReportingEnabled",
        OFF,
    ),
    feature(
        "Disable URL Data Collection",
        "UrlKeyedAnonymizedDataCollectionEnabled",
        OFF,
    ),
    feature("Disable Feedback Surveys", "FeedbackSurveysEnabled", OFF),
];

const PRIVACY: &[Feature] = &[
    feature(
        "Disable Safe Browsing",
        "SafeBrowsingProtectionLevel",
        PolicyValue::Integer(0),
    ),
    feature("Disable Autofill (Addresses)", "AutofillAddressEnabled", OFF),
    feature(
        "Disable Autofill (Credit Cards)",
        "AutofillCreditCardEnabled",
        OFF,
    ),
    feature("Disable Password Manager", "PasswordManagerEnabled", OFF),
    feature(
        "Disable Browser Sign-in",
        "BrowserSignin",
        PolicyValue::Integer(0),
    ),
    feature(
        "Disable WebRTC IP Leak",
        "WebRtcIPHandling",
        PolicyValue::Text("disable_non_proxied_udp"),
    ),
    feature("Disable QUIC Protocol", "QuicAllowed", OFF),
    feature("Block Third Party Cookies", "BlockThirdPartyCookies", ON),
    feature("Enable Do Not Track", "EnableDoNotTrack", ON),
    feature("Force Google SafeSearch", "ForceGoogleSafeSearch", ON),
    feature("Disable IPFS", "IPFSEnabled", OFF),
    feature(
        "Disable Incognito Mode",
        "IncognitoModeAvailability",
        PolicyValue::Integer(1),
    ),
];

const BRAVE: &[Feature] = &[
    feature("Disable Brave Rewards", "BraveRewardsDisabled", ON),
    feature("Disable Brave Wallet", "BraveWalletDisabled", ON),
    feature("Disable Brave VPN", "BraveVPNDisabled", ON),
    feature("Disable Brave AI Chat", "BraveAIChatEnabled", OFF),
    feature(
        "Disable Brave Shields",
        "BraveShieldsDisabledForUrls",
        PolicyValue::List(&["https://*", "http://*"]),
    ),
    feature("Disable Tor", "TorDisabled", ON),
    feature("Disable Sync", "SyncDisabled", ON),
];

const PERFORMANCE: &[Feature] = &[
    feature("Disable Background Mode", "BackgroundModeEnabled", OFF),
    feature(
        "Disable Media Recommendations",
        "MediaRecommendationsEnabled",
        OFF,
    ),
    feature("Disable Shopping List", "ShoppingListEnabled", OFF),
    feature("Always Open PDF Externally", "AlwaysOpenPdfExternally", ON),
    feature("Disable Translate", "TranslateEnabled", OFF),
    feature("Disable Spellcheck", "SpellcheckEnabled", OFF),
    feature("Disable Promotions", "PromotionsEnabled", OFF),
    feature("Disable Search Suggestions", "SearchSuggestEnabled", OFF),
    feature("Disable Printing", "PrintingEnabled", OFF),
    feature(
        "Disable Default Browser Prompt",
        "DefaultBrowserSettingEnabled",
        OFF,
    ),
    feature(
        "Disable Developer Tools",
        "DeveloperToolsAvailability",
        PolicyValue::Integer(2),
    ),
];

const BUILTIN_CATEGORIES: &[Category] = &[
    Category {
        name: "Telemetry & Reporting",
        features: TELEMETRY,
    },
    Category {
        name: "Privacy & Security",
        features: PRIVACY,
    },
    Category {
        name: "Brave Features",
        features: BRAVE,
    },
    Category {
        name: "Performance & Bloat",
        features: PERFORMANCE,
    },
];

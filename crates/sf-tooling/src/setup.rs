//! Lightning Setup links for an SObject.

use std::str::FromStr;

use url::Url;

use crate::error::{Error, ErrorKind, Result};

/// A page under Setup > Object Manager > {object}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SetupSubpath {
    #[default]
    Details,
    FieldsAndRelationships,
    Layouts,
    LightningPages,
    Limits,
    Triggers,
    FlowTriggers,
    ValidationRules,
}

impl SetupSubpath {
    /// All subpaths in menu order.
    pub const ALL: [SetupSubpath; 8] = [
        SetupSubpath::Details,
        SetupSubpath::FieldsAndRelationships,
        SetupSubpath::Layouts,
        SetupSubpath::LightningPages,
        SetupSubpath::Limits,
        SetupSubpath::Triggers,
        SetupSubpath::FlowTriggers,
        SetupSubpath::ValidationRules,
    ];

    /// URL path segment.
    pub fn path(self) -> &'static str {
        match self {
            SetupSubpath::Details => "Details",
            SetupSubpath::FieldsAndRelationships => "FieldsAndRelationships",
            SetupSubpath::Layouts => "Layouts",
            SetupSubpath::LightningPages => "LightningPages",
            SetupSubpath::Limits => "Limits",
            SetupSubpath::Triggers => "Triggers",
            SetupSubpath::FlowTriggers => "FlowTriggers",
            SetupSubpath::ValidationRules => "ValidationRules",
        }
    }

    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            SetupSubpath::Details => "Details",
            SetupSubpath::FieldsAndRelationships => "Fields & Relationships",
            SetupSubpath::Layouts => "Layouts",
            SetupSubpath::LightningPages => "Lightning Pages",
            SetupSubpath::Limits => "Limits",
            SetupSubpath::Triggers => "Triggers",
            SetupSubpath::FlowTriggers => "Flow Triggers",
            SetupSubpath::ValidationRules => "Validation Rules",
        }
    }
}

impl std::fmt::Display for SetupSubpath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.path())
    }
}

impl FromStr for SetupSubpath {
    type Err = Error;

    /// Accepts the path segment or the label, ignoring case, spaces, `-`, `_` and `&`.
    fn from_str(s: &str) -> Result<Self> {
        let wanted = normalize(s);
        SetupSubpath::ALL
            .into_iter()
            .find(|sub| normalize(sub.path()) == wanted || normalize(sub.label()) == wanted)
            .ok_or_else(|| Error::new(ErrorKind::Other(format!("Unknown setup page: {s}"))))
    }
}

fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Scheme, host and port of an instance URL, with no path.
///
/// `https://acme.my.salesforce.com/services/data/v62.0` -> `https://acme.my.salesforce.com`
pub fn base_url(instance_url: &str) -> Result<String> {
    let url = Url::parse(instance_url).map_err(|e| Error {
        kind: ErrorKind::Other(format!("Invalid instance URL: {instance_url}")),
        source: Some(Box::new(e)),
    })?;
    if url.host_str().is_none() {
        return Err(Error::new(ErrorKind::Other(format!(
            "Instance URL has no host: {instance_url}"
        ))));
    }
    Ok(url.origin().ascii_serialization())
}

/// Object Manager link for `qualified_api_name`. `None` opens `Details`.
pub fn setup_url(base_url: &str, qualified_api_name: &str, subpath: Option<SetupSubpath>) -> String {
    format!(
        "{}/lightning/setup/ObjectManager/{}/{}/view",
        base_url.trim_end_matches('/'),
        urlencoding::encode(qualified_api_name),
        subpath.unwrap_or_default().path()
    )
}

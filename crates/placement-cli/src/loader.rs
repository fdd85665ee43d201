//! # Organization Documents
//!
//! Reads and writes the organization collection the CLI operates on.
//!
//! A document is either a bare list of organizations or an object with an
//! `organizations` list. JSON (`.json`) and YAML (`.yaml`, `.yml`) are
//! supported; the format follows the file extension.
//!
//! ```yaml
//! organizations:
//!   - id: o1
//!     status: ACTIVE
//!     agreementExpiry: 2099-01-01
//!     name: Acme Placements
//! ```

use std::collections::HashSet;
use std::path::Path;

use anyhow::{bail, Context, Result};

use placement_state::Organization;

/// On-disk encoding of an organization document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentFormat {
    Json,
    Yaml,
}

impl DocumentFormat {
    /// Pick the format from the file extension.
    pub fn from_path(path: &Path) -> Result<Self> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);
        match ext.as_deref() {
            Some("json") => Ok(Self::Json),
            Some("yaml") | Some("yml") => Ok(Self::Yaml),
            _ => bail!(
                "unsupported organization document {}: expected .json, .yaml or .yml",
                path.display()
            ),
        }
    }
}

/// Load the organizations in `path`.
///
/// Identifiers must be unique within a document.
pub fn load_organizations(path: &Path) -> Result<Vec<Organization>> {
    let format = DocumentFormat::from_path(path)?;
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;

    let document: serde_json::Value = match format {
        DocumentFormat::Json => serde_json::from_str(&content)
            .with_context(|| format!("invalid JSON in {}", path.display()))?,
        DocumentFormat::Yaml => serde_yaml::from_str(&content)
            .with_context(|| format!("invalid YAML in {}", path.display()))?,
    };

    let list = match document {
        serde_json::Value::Array(_) => document,
        serde_json::Value::Object(mut map) => map.remove("organizations").with_context(|| {
            format!("{}: expected an `organizations` list", path.display())
        })?,
        _ => bail!(
            "{}: expected a list of organizations or an object with `organizations`",
            path.display()
        ),
    };

    let orgs: Vec<Organization> = serde_json::from_value(list)
        .with_context(|| format!("invalid organization record in {}", path.display()))?;

    let mut seen = HashSet::new();
    for org in &orgs {
        if !seen.insert(&org.id) {
            bail!("{}: duplicate organization id {}", path.display(), org.id);
        }
    }

    tracing::debug!(path = %path.display(), count = orgs.len(), "loaded organizations");
    Ok(orgs)
}

/// Write `orgs` to `path` as a bare list, in the format of its extension.
pub fn save_organizations(path: &Path, orgs: &[Organization]) -> Result<()> {
    let rendered = match DocumentFormat::from_path(path)? {
        DocumentFormat::Json => {
            let mut json = serde_json::to_string_pretty(orgs)?;
            json.push('\n');
            json
        }
        DocumentFormat::Yaml => serde_yaml::to_string(orgs)?,
    };
    std::fs::write(path, rendered).with_context(|| format!("failed to write {}", path.display()))
}

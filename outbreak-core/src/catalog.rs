//! Region catalog: the ordered set of governed provinces and the urban-hub list.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

const DEFAULT_REGION_DATA: &str = include_str!("../data/regions.json");

/// Stable region identifier with case-insensitive equality.
///
/// Identifiers are trimmed and ASCII-lowercased at construction so equality
/// and hashing stay plain string comparisons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct RegionId(String);

impl RegionId {
    #[must_use]
    pub fn new(raw: &str) -> Self {
        Self(raw.trim().to_ascii_lowercase())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true when the identifier has no visible characters.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for RegionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for RegionId {
    fn from(raw: String) -> Self {
        Self::new(&raw)
    }
}

impl From<RegionId> for String {
    fn from(value: RegionId) -> Self {
        value.0
    }
}

impl From<&str> for RegionId {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

/// Catalog entry pairing a region identifier with its display name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionInfo {
    pub id: RegionId,
    pub name: String,
}

impl RegionInfo {
    #[must_use]
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: RegionId::new(id),
            name: name.to_string(),
        }
    }
}

/// Ordered region list plus the configured urban-hub set.
///
/// Catalog order is the stable iteration order used everywhere downstream,
/// including the deployment-order walk that assigns diminishing-return
/// multipliers to outposts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct RegionCatalog {
    #[serde(default)]
    pub regions: Vec<RegionInfo>,
    #[serde(default)]
    pub urban_hubs: Vec<RegionId>,
}

impl RegionCatalog {
    #[must_use]
    pub fn load_from_static() -> Self {
        serde_json::from_str(DEFAULT_REGION_DATA).unwrap_or_default()
    }

    #[must_use]
    pub fn default_catalog() -> &'static Self {
        static CATALOG: OnceLock<RegionCatalog> = OnceLock::new();
        CATALOG.get_or_init(Self::load_from_static)
    }

    /// # Errors
    ///
    /// Returns an error if the JSON cannot be parsed into a region catalog.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    #[must_use]
    pub fn get(&self, id: &RegionId) -> Option<&RegionInfo> {
        self.regions.iter().find(|info| &info.id == id)
    }

    #[must_use]
    pub fn contains(&self, id: &RegionId) -> bool {
        self.get(id).is_some()
    }

    /// Whether the region receives the urban-hub cure bonus. Hub entries that
    /// match no catalog region are tolerated and simply never apply.
    #[must_use]
    pub fn is_urban_hub(&self, id: &RegionId) -> bool {
        self.urban_hubs.iter().any(|hub| hub == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &RegionInfo> {
        self.regions.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn region_ids_compare_case_insensitively() {
        assert_eq!(RegionId::new("Gauteng"), RegionId::new("  gauteng "));
        assert_eq!(RegionId::new("KwaZulu-Natal").as_str(), "kwazulu-natal");
        assert!(RegionId::new("   ").is_empty());
    }

    #[test]
    fn region_id_deserializes_normalized() {
        let id: RegionId = serde_json::from_str("\"Western-Cape\"").unwrap();
        assert_eq!(id, RegionId::new("western-cape"));
        let back = serde_json::to_string(&id).unwrap();
        assert_eq!(back, "\"western-cape\"");
    }

    #[test]
    fn static_catalog_lists_nine_provinces() {
        let catalog = RegionCatalog::default_catalog();
        assert_eq!(catalog.len(), 9);
        assert!(catalog.contains(&RegionId::new("Gauteng")));
        assert!(catalog.is_urban_hub(&RegionId::new("western-cape")));
        assert!(!catalog.is_urban_hub(&RegionId::new("limpopo")));
    }

    #[test]
    fn from_json_rejects_malformed_input() {
        assert!(RegionCatalog::from_json("not json").is_err());
        let empty = RegionCatalog::from_json("{}").unwrap();
        assert!(empty.is_empty());
    }
}

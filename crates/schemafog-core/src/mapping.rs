use std::collections::BTreeMap;
use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Forward identifier map: lowercase original name to new identifier.
///
/// Tables and columns share one namespace. This is the persisted artifact
/// consumed by the materializer and the SQL rewriter; neither recomputes it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdentifierMap {
    entries: BTreeMap<String, String>,
}

impl IdentifierMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Case-insensitive lookup of an original identifier.
    pub fn lookup(&self, name: &str) -> Option<&str> {
        self.entries.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Like [`IdentifierMap::lookup`], but a missing entry is a mapping state error.
    pub fn require(&self, name: &str) -> Result<&str> {
        self.lookup(name).ok_or_else(|| {
            Error::MappingState(format!("no mapping entry for identifier '{name}'"))
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&name.to_lowercase())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// Serialize as a flat, 4-space indented JSON object.
    pub fn to_json_pretty(&self) -> Result<Vec<u8>> {
        to_json_pretty(self)
    }

    /// Persist the map. An empty map has never been generated and is refused.
    pub fn save(&self, path: &Path) -> Result<()> {
        if self.is_empty() {
            return Err(Error::MappingState(
                "generate the mapping before saving it".to_string(),
            ));
        }
        write_file(path, &self.to_json_pretty()?)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}

impl FromIterator<(String, String)> for IdentifierMap {
    /// Keys are lowercased on the way in.
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(key, value)| (key.to_lowercase(), value))
                .collect(),
        }
    }
}

/// Serialize any value with the 4-space indent used by every artifact.
pub fn to_json_pretty<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Write `data` to `path`, creating parent directories.
pub fn write_file(path: &Path, data: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        create_dir_all(parent)?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .truncate(true)
        .write(true)
        .open(path)?;
    file.write_all(data)?;
    file.sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> IdentifierMap {
        IdentifierMap::from_iter([
            ("CustomerID".to_string(), "cid_x".to_string()),
            ("customers".to_string(), "cust_y".to_string()),
        ])
    }

    #[test]
    fn lookup_ignores_case() {
        let map = sample();
        assert_eq!(map.lookup("CUSTOMERID"), Some("cid_x"));
        assert_eq!(map.lookup("Customers"), Some("cust_y"));
        assert_eq!(map.lookup("orders"), None);
    }

    #[test]
    fn require_reports_mapping_state() {
        let err = sample().require("orders").unwrap_err();
        assert!(matches!(err, Error::MappingState(_)));
    }

    #[test]
    fn writes_flat_object_with_four_space_indent() {
        let json = String::from_utf8(sample().to_json_pretty().unwrap()).unwrap();
        assert_eq!(
            json,
            "{\n    \"customerid\": \"cid_x\",\n    \"customers\": \"cust_y\"\n}"
        );
    }

    #[test]
    fn save_round_trips_and_refuses_empty_map() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("spider_L1").join("shop.json");

        let err = IdentifierMap::new().save(&path).unwrap_err();
        assert!(matches!(err, Error::MappingState(_)));
        assert!(!path.exists());

        sample().save(&path).unwrap();
        assert_eq!(IdentifierMap::load(&path).unwrap(), sample());
    }
}

//! Flat-file key:value configuration store.
//!
//! One `key:value` pair per line, colon-delimited. Lines that do not split
//! into exactly two fields are skipped. On every load the full current
//! property set is rewritten back to the same file, which is the sole
//! persisted value store: last write wins per key, no history.

use crate::Result;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Default)]
pub struct ConfigStore {
    properties: BTreeMap<String, String>,
    path: Option<PathBuf>,
}

impl ConfigStore {
    pub fn new() -> ConfigStore {
        ConfigStore::default()
    }

    /// Read properties from `path` if it exists, then rewrite the full
    /// current set back to it.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        if path.exists() {
            self.read_from(path)?;
        }
        self.write_to(path)?;
        self.path = Some(path.to_path_buf());
        Ok(())
    }

    fn read_from(&mut self, path: &Path) -> Result<()> {
        log::info!("reading properties from {}", path.display());
        let text = fs::read_to_string(path)?;
        for line in text.lines() {
            let fields: Vec<&str> = line.split(':').collect();
            if fields.len() == 2 {
                log::debug!("config property '{}' = '{}'", fields[0], fields[1]);
                self.set_property(fields[0], fields[1]);
            } else {
                log::debug!("skipping malformed config line: '{}'", line);
            }
        }
        Ok(())
    }

    fn write_to(&self, path: &Path) -> Result<()> {
        let mut out = String::new();
        for (key, value) in &self.properties {
            let _ = writeln!(out, "{}:{}", key, value);
        }
        fs::write(path, out)?;
        log::info!(
            "wrote {} properties to {}",
            self.properties.len(),
            path.display()
        );
        Ok(())
    }

    /// Persist the current property set to the file last loaded, if any.
    pub fn save(&self) -> Result<()> {
        match &self.path {
            Some(path) => self.write_to(path),
            None => Ok(()),
        }
    }

    /// Reserve `key` with `default` unless it is already set. The first
    /// registration wins; later defaults do not overwrite.
    pub fn register_property(&mut self, key: &str, default: &str) {
        self.properties
            .entry(key.to_string())
            .or_insert_with(|| default.to_string());
    }

    /// Fetch `key`, registering `default` first when unset.
    pub fn get_property(&mut self, key: &str, default: &str) -> String {
        self.register_property(key, default);
        self.properties[key].clone()
    }

    /// Upsert `key` to `value`.
    pub fn set_property(&mut self, key: &str, value: &str) {
        self.properties
            .insert(key.to_string(), value.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.properties.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.properties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("traces.conf");

        let mut store = ConfigStore::new();
        store.set_property("owl_address", "10.0.0.5");
        store.load(&path).unwrap();

        let mut reloaded = ConfigStore::new();
        reloaded.load(&path).unwrap();
        assert_eq!(reloaded.get_property("owl_address", ""), "10.0.0.5");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("traces.conf");
        fs::write(
            &path,
            "owl_address:10.0.0.5\nmalformed-no-colon\ntoo:many:colons\n",
        )
        .unwrap();

        let mut store = ConfigStore::new();
        store.load(&path).unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get_property("owl_address", ""), "10.0.0.5");
    }

    #[test]
    fn load_rewrites_registered_properties() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("traces.conf");

        let mut store = ConfigStore::new();
        store.register_property("owl_address", "127.0.0.1");
        store.load(&path).unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(text, "owl_address:127.0.0.1\n");
    }

    #[test]
    fn first_registration_wins() {
        let mut store = ConfigStore::new();
        store.register_property("owl_address", "127.0.0.1");
        store.register_property("owl_address", "192.168.0.9");
        assert_eq!(store.get_property("owl_address", "ignored"), "127.0.0.1");
    }

    #[test]
    fn get_property_registers_default_when_unset() {
        let mut store = ConfigStore::new();
        assert_eq!(store.get_property("owl_address", "127.0.0.1"), "127.0.0.1");
        assert!(store.contains("owl_address"));
    }

    #[test]
    fn set_property_overwrites() {
        let mut store = ConfigStore::new();
        store.set_property("owl_address", "127.0.0.1");
        store.set_property("owl_address", "10.1.1.1");
        assert_eq!(store.get_property("owl_address", ""), "10.1.1.1");
    }

    #[test]
    fn save_persists_later_changes() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("traces.conf");

        let mut store = ConfigStore::new();
        store.load(&path).unwrap();
        store.set_property("owl_address", "10.2.2.2");
        store.save().unwrap();

        let mut reloaded = ConfigStore::new();
        reloaded.load(&path).unwrap();
        assert_eq!(reloaded.get_property("owl_address", ""), "10.2.2.2");
    }
}

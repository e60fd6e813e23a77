//! In-memory key/value store that config files are parsed into.
//!
//! [`ConfigStore`] wraps a [`toml::Table`], so keys are kept in sorted order
//! and values keep their parsed types. JSON files are parsed with `serde_json`
//! and converted into the same representation, so lookups don't care which
//! format a file came from.
//!
//! Keys are addressed with dots: `"database.pool_size"` walks into the
//! `database` table and returns its `pool_size` entry.

use std::path::Path;

use serde::de::DeserializeOwned;
use toml::{Table, Value};

use crate::error::AppfigError;
use crate::types::ConfigFormat;

/// Something that can take a located config file and ingest it.
///
/// Implemented by [`ConfigStore`]; callers with their own storage can implement
/// it too and hand it to [`Loader::load_into`](crate::Loader::load_into).
pub trait ConfigReader {
    fn read(&mut self, path: &Path, format: ConfigFormat) -> Result<(), AppfigError>;
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigStore {
    values: Table,
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_table(values: Table) -> Self {
        Self { values }
    }

    pub fn as_table(&self) -> &Table {
        &self.values
    }

    pub fn into_table(self) -> Table {
        self.values
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Read and parse `path`, then lay its keys over the current contents.
    ///
    /// Tables present on both sides are combined key by key; any other value
    /// from the file replaces what was there.
    pub fn load_file(&mut self, path: &Path, format: ConfigFormat) -> Result<(), AppfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| AppfigError::IoError {
            path: path.to_path_buf(),
            source: e,
        })?;
        let table = parse_table(&content, path, format)?;
        tracing::debug!("loaded {} top-level keys from {}", table.len(), path.display());

        let current = std::mem::take(&mut self.values);
        self.values = overlay(current, table);
        Ok(())
    }

    /// Look up a value by dotted key.
    pub fn get(&self, dotted_key: &str) -> Option<&Value> {
        let mut segments = dotted_key.split('.');
        let first = segments.next()?;
        segments.try_fold(self.values.get(first)?, |value, segment| {
            value.as_table()?.get(segment)
        })
    }

    pub fn contains(&self, dotted_key: &str) -> bool {
        self.get(dotted_key).is_some()
    }

    pub fn get_str(&self, dotted_key: &str) -> Option<&str> {
        self.get(dotted_key)?.as_str()
    }

    pub fn get_int(&self, dotted_key: &str) -> Option<i64> {
        self.get(dotted_key)?.as_integer()
    }

    /// Float lookup. Integers are widened.
    pub fn get_float(&self, dotted_key: &str) -> Option<f64> {
        match self.get(dotted_key)? {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn get_bool(&self, dotted_key: &str) -> Option<bool> {
        self.get(dotted_key)?.as_bool()
    }

    /// All leaf keys as dotted paths, in key order.
    pub fn keys(&self) -> Vec<String> {
        self.flatten().into_iter().map(|(key, _)| key).collect()
    }

    /// All leaf keys paired with a display form of their value.
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        flatten_into(&self.values, "", &mut out);
        out
    }

    /// Deserialize the whole store into `T`.
    pub fn unmarshal<T: DeserializeOwned>(&self) -> Result<T, AppfigError> {
        Value::Table(self.values.clone())
            .try_into()
            .map_err(|e: toml::de::Error| AppfigError::InvalidValue {
                key: "<root>".into(),
                reason: e.to_string(),
            })
    }

    /// Deserialize the value (or sub-table) at `dotted_key` into `T`.
    pub fn unmarshal_key<T: DeserializeOwned>(&self, dotted_key: &str) -> Result<T, AppfigError> {
        let value = self
            .get(dotted_key)
            .ok_or_else(|| AppfigError::KeyNotFound(dotted_key.into()))?;
        value
            .clone()
            .try_into()
            .map_err(|e: toml::de::Error| AppfigError::InvalidValue {
                key: dotted_key.into(),
                reason: e.to_string(),
            })
    }
}

impl ConfigReader for ConfigStore {
    fn read(&mut self, path: &Path, format: ConfigFormat) -> Result<(), AppfigError> {
        self.load_file(path, format)
    }
}

/// Parse file content into a table according to `format`.
pub(crate) fn parse_table(
    content: &str,
    path: &Path,
    format: ConfigFormat,
) -> Result<Table, AppfigError> {
    match format {
        ConfigFormat::Toml => toml::from_str(content).map_err(|e| AppfigError::ParseError {
            path: path.to_path_buf(),
            source: e,
        }),
        ConfigFormat::Json => {
            let json: serde_json::Value =
                serde_json::from_str(content).map_err(|e| AppfigError::JsonParseError {
                    path: path.to_path_buf(),
                    source: e,
                })?;
            match json_to_toml(json, "")? {
                Some(Value::Table(table)) => Ok(table),
                _ => Err(AppfigError::InvalidValue {
                    key: path.display().to_string(),
                    reason: "top level of a config file must be an object".into(),
                }),
            }
        }
    }
}

/// TOML has no null: `null` entries are dropped from objects and arrays.
/// TOML integers are `i64`, so larger JSON integers are rejected rather than
/// rounded through `f64`.
fn json_to_toml(json: serde_json::Value, key: &str) -> Result<Option<Value>, AppfigError> {
    use serde_json::Value as Json;

    let value = match json {
        Json::Null => return Ok(None),
        Json::Bool(b) => Value::Boolean(b),
        Json::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Value::Integer(i),
            (None, Some(f)) if n.is_f64() => Value::Float(f),
            _ => {
                return Err(AppfigError::InvalidValue {
                    key: key.into(),
                    reason: format!("integer {n} is out of range for a 64-bit signed value"),
                });
            }
        },
        Json::String(s) => Value::String(s),
        Json::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.into_iter().enumerate() {
                if let Some(v) = json_to_toml(item, &format!("{key}[{i}]"))? {
                    out.push(v);
                }
            }
            Value::Array(out)
        }
        Json::Object(map) => {
            let mut table = Table::new();
            for (k, v) in map {
                let child = if key.is_empty() {
                    k.clone()
                } else {
                    format!("{key}.{k}")
                };
                if let Some(v) = json_to_toml(v, &child)? {
                    table.insert(k, v);
                }
            }
            Value::Table(table)
        }
    };
    Ok(Some(value))
}

fn overlay(mut base: Table, top: Table) -> Table {
    for (key, top_val) in top {
        let merged = match (base.remove(&key), top_val) {
            (Some(Value::Table(base_tbl)), Value::Table(top_tbl)) => {
                Value::Table(overlay(base_tbl, top_tbl))
            }
            (_, top_val) => top_val,
        };
        base.insert(key, merged);
    }
    base
}

fn flatten_into(table: &Table, prefix: &str, out: &mut Vec<(String, String)>) {
    for (key, value) in table {
        let dotted = if prefix.is_empty() {
            key.clone()
        } else {
            format!("{prefix}.{key}")
        };
        match value {
            Value::Table(sub) => flatten_into(sub, &dotted, out),
            other => out.push((dotted, display_value(other))),
        }
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Integer(i) => i.to_string(),
        Value::Float(f) => f.to_string(),
        Value::Boolean(b) => b.to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::fs;
    use tempfile::TempDir;

    const BILLING: &str = r#"
        name = "billing"
        workers = 4
        ratio = 0.5
        debug = false

        [database]
        url = "postgres://db/billing"
        pool_size = 10

        [database.replica]
        url = "postgres://replica/billing"
    "#;

    fn store_from(content: &str) -> ConfigStore {
        ConfigStore::from_table(content.parse::<Table>().unwrap())
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn typed_getters() {
        let store = store_from(BILLING);
        assert_eq!(store.get_str("name"), Some("billing"));
        assert_eq!(store.get_int("workers"), Some(4));
        assert_eq!(store.get_float("ratio"), Some(0.5));
        assert_eq!(store.get_float("workers"), Some(4.0));
        assert_eq!(store.get_bool("debug"), Some(false));
        assert_eq!(store.get_str("workers"), None);
    }

    #[test]
    fn dotted_lookup_walks_tables() {
        let store = store_from(BILLING);
        assert_eq!(store.get_int("database.pool_size"), Some(10));
        assert_eq!(
            store.get_str("database.replica.url"),
            Some("postgres://replica/billing")
        );
        assert!(store.get("database").unwrap().is_table());
        assert!(!store.contains("database.missing"));
        assert!(!store.contains("name.nested"));
        assert!(!store.contains(""));
    }

    #[test]
    fn keys_are_sorted_leaf_paths() {
        let store = store_from(BILLING);
        assert_eq!(
            store.keys(),
            vec![
                "database.pool_size",
                "database.replica.url",
                "database.url",
                "debug",
                "name",
                "ratio",
                "workers",
            ]
        );
    }

    #[test]
    fn flatten_renders_values() {
        let store = store_from("tags = [\"a\", \"b\"]\nport = 80\n");
        let flat = store.flatten();
        assert_eq!(flat[0], ("port".to_string(), "80".to_string()));
        assert_eq!(flat[1].0, "tags");
        assert!(flat[1].1.contains("\"a\""));
    }

    #[test]
    fn load_toml_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "billing.prod.toml", BILLING);

        let mut store = ConfigStore::new();
        store.load_file(&path, ConfigFormat::Toml).unwrap();
        assert_eq!(store, store_from(BILLING));
    }

    #[test]
    fn load_json_file() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "billing.prod.json",
            r#"{"name": "billing", "workers": 4, "ratio": 0.5, "skip": null,
                "database": {"url": "postgres://db/billing"}}"#,
        );

        let mut store = ConfigStore::new();
        store.read(&path, ConfigFormat::Json).unwrap();
        assert_eq!(store.get_str("name"), Some("billing"));
        assert_eq!(store.get_int("workers"), Some(4));
        assert_eq!(store.get_float("ratio"), Some(0.5));
        assert_eq!(store.get_str("database.url"), Some("postgres://db/billing"));
        assert!(!store.contains("skip"));
    }

    #[test]
    fn json_top_level_must_be_object() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "list.json", "[1, 2]");

        let result = ConfigStore::new().load_file(&path, ConfigFormat::Json);
        assert!(matches!(result, Err(AppfigError::InvalidValue { .. })));
    }

    #[test]
    fn json_integer_beyond_i64_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "big.json",
            r#"{"limits": {"max_bytes": 18446744073709551615}}"#,
        );

        let result = ConfigStore::new().load_file(&path, ConfigFormat::Json);
        match result {
            Err(AppfigError::InvalidValue { key, reason }) => {
                assert_eq!(key, "limits.max_bytes");
                assert!(reason.contains("18446744073709551615"));
            }
            other => panic!("Expected InvalidValue, got {other:?}"),
        }
    }

    #[test]
    fn json_i64_bounds_stay_integers() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "bounds.json",
            r#"{"hi": 9223372036854775807, "lo": -9223372036854775808, "f": 1e3}"#,
        );

        let mut store = ConfigStore::new();
        store.load_file(&path, ConfigFormat::Json).unwrap();
        assert_eq!(store.get_int("hi"), Some(i64::MAX));
        assert_eq!(store.get_int("lo"), Some(i64::MIN));
        assert!(store.get("f").unwrap().is_float());
    }

    #[test]
    fn second_load_overlays_first() {
        let dir = TempDir::new().unwrap();
        let base = write(&dir, "base.toml", BILLING);
        let patch = write(
            &dir,
            "patch.toml",
            "workers = 8\n[database]\npool_size = 50\n",
        );

        let mut store = ConfigStore::new();
        store.load_file(&base, ConfigFormat::Toml).unwrap();
        store.load_file(&patch, ConfigFormat::Toml).unwrap();

        assert_eq!(store.get_int("workers"), Some(8));
        assert_eq!(store.get_int("database.pool_size"), Some(50));
        assert_eq!(store.get_str("database.url"), Some("postgres://db/billing"));
        assert_eq!(store.get_str("name"), Some("billing"));
    }

    #[test]
    fn scalar_replaces_table_on_overlay() {
        let merged = overlay(
            "[database]\nurl = \"x\"\n".parse().unwrap(),
            "database = \"off\"\n".parse().unwrap(),
        );
        assert_eq!(merged["database"].as_str(), Some("off"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent.toml");

        let result = ConfigStore::new().load_file(&path, ConfigFormat::Toml);
        match result {
            Err(AppfigError::IoError { path: p, .. }) => assert_eq!(p, path),
            other => panic!("Expected IoError, got {other:?}"),
        }
    }

    #[test]
    fn malformed_toml_is_parse_error_and_store_untouched() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.toml", "port = = 3\n");

        let mut store = store_from("port = 1\n");
        let result = store.load_file(&path, ConfigFormat::Toml);
        assert!(matches!(result, Err(AppfigError::ParseError { .. })));
        assert_eq!(store.get_int("port"), Some(1));
    }

    #[test]
    fn malformed_json_is_json_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "bad.json", "{\"port\": }");

        let result = ConfigStore::new().load_file(&path, ConfigFormat::Json);
        assert!(matches!(result, Err(AppfigError::JsonParseError { .. })));
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Database {
        url: String,
        pool_size: u32,
    }

    #[test]
    fn unmarshal_key_into_struct() {
        let store = store_from(BILLING);
        let db: Database = store.unmarshal_key("database").unwrap();
        assert_eq!(
            db,
            Database {
                url: "postgres://db/billing".into(),
                pool_size: 10,
            }
        );
        let workers: u16 = store.unmarshal_key("workers").unwrap();
        assert_eq!(workers, 4);
    }

    #[test]
    fn unmarshal_key_errors() {
        let store = store_from(BILLING);
        assert!(matches!(
            store.unmarshal_key::<u16>("nope"),
            Err(AppfigError::KeyNotFound(k)) if k == "nope"
        ));
        assert!(matches!(
            store.unmarshal_key::<u16>("name"),
            Err(AppfigError::InvalidValue { .. })
        ));
    }

    #[test]
    fn unmarshal_whole_store() {
        #[derive(Debug, Deserialize)]
        struct Billing {
            name: String,
            workers: u8,
            database: Database,
        }

        let billing: Billing = store_from(BILLING).unmarshal().unwrap();
        assert_eq!(billing.name, "billing");
        assert_eq!(billing.workers, 4);
        assert_eq!(billing.database.pool_size, 10);
    }
}

use anyhow::{bail, Context, Result};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::warn;

/// Engine configuration document.
///
/// Root is always a JSON object. Only the keys a caller sets are added or
/// overwritten; everything else round-trips untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigDocument {
    root: Map<String, Value>,
}

impl ConfigDocument {
    pub fn from_value(v: Value) -> Result<Self> {
        match v {
            Value::Object(root) => Ok(Self { root }),
            other => bail!(
                "config document root must be a JSON object, got {}",
                kind_of(&other)
            ),
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self> {
        let v: Value = serde_json::from_str(raw.trim()).context("config document must be valid JSON")?;
        Self::from_value(v)
    }

    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        let v_yaml: serde_yaml::Value = serde_yaml::from_str(raw).context("invalid yaml")?;
        let v_json = serde_json::to_value(v_yaml).context("yaml->json conversion failed")?;
        Self::from_value(v_json)
    }

    /// Load a baseline document. `.yaml` / `.yml` are converted to JSON;
    /// anything else is parsed as JSON.
    pub fn load(path: &Path) -> Result<Self> {
        // Read raw bytes to handle a UTF-8 BOM cleanly (Windows-authored fixtures).
        let bytes =
            fs::read(path).with_context(|| format!("read config failed: {}", path.display()))?;
        let bytes = bytes.strip_prefix(&[0xEF, 0xBB, 0xBF]).unwrap_or(&bytes);
        let raw = String::from_utf8(bytes.to_vec())
            .with_context(|| format!("config must be UTF-8 text: {}", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("yaml") | Some("yml")
        );
        let doc = if is_yaml {
            Self::from_yaml_str(&raw)
        } else {
            Self::from_json_str(&raw)
        };
        doc.with_context(|| format!("parse config failed: {}", path.display()))
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.root.clone())
    }

    pub fn pointer(&self, ptr: &str) -> Option<&Value> {
        if ptr.is_empty() || ptr == "/" {
            return None;
        }
        let mut parts = ptr.trim_start_matches('/').splitn(2, '/');
        let head = unescape_pointer_token(parts.next().unwrap_or_default());
        let top = self.root.get(&head)?;
        match parts.next() {
            Some(rest) => top.pointer(&format!("/{rest}")),
            None => Some(top),
        }
    }

    /// Set `section.key = value`, creating `section` when absent.
    ///
    /// A `section` that exists but is not an object is replaced with one.
    pub fn set(&mut self, section: &str, key: &str, value: Value) {
        let slot = self
            .root
            .entry(section.to_string())
            .or_insert_with(|| Value::Object(Map::new()));

        if let Value::Object(map) = slot {
            map.insert(key.to_string(), value);
            return;
        }

        warn!(
            "config section '{}' is {} not an object; replacing",
            section,
            kind_of(slot)
        );
        let mut map = Map::new();
        map.insert(key.to_string(), value);
        *slot = Value::Object(map);
    }

    /// Compact JSON (no whitespace). Key order is serde_json's map order.
    pub fn to_compact_json(&self) -> Result<String> {
        serde_json::to_string(&self.root).context("serialize config document failed")
    }

    /// Write the compact form to `path`, creating parent directories.
    pub fn write_compact(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("create_dir_all {}", parent.display()))?;
        }
        let json = self.to_compact_json()?;
        fs::write(path, json).with_context(|| format!("write config failed: {}", path.display()))
    }

    /// SHA-256 (lowercase hex) over the compact JSON form. Diagnostics only;
    /// the engine computes its own hash.
    pub fn config_hash(&self) -> Result<String> {
        Ok(sha256_hex(self.to_compact_json()?.as_bytes()))
    }

    /// Every leaf as a JSON pointer, sorted.
    pub fn leaf_pointers(&self) -> Vec<String> {
        let mut out = Vec::new();
        collect_leaf_pointers(&Value::Object(self.root.clone()), "", &mut out);
        out.sort();
        out
    }

    /// Leaf pointers whose value differs between `self` and `other`
    /// (added, removed or changed), sorted and unique.
    pub fn changed_leaf_pointers(&self, other: &ConfigDocument) -> Vec<String> {
        let a = Value::Object(self.root.clone());
        let b = Value::Object(other.root.clone());

        let mut all = self.leaf_pointers();
        all.extend(other.leaf_pointers());
        all.sort();
        all.dedup();

        all.into_iter()
            .filter(|p| a.pointer(p) != b.pointer(p))
            .collect()
    }
}

fn collect_leaf_pointers(v: &Value, prefix: &str, out: &mut Vec<String>) {
    match v {
        Value::Object(map) if !map.is_empty() => {
            for (k, vv) in map.iter() {
                let next = format!("{}/{}", prefix, escape_pointer_token(k));
                collect_leaf_pointers(vv, &next, out);
            }
        }
        Value::Array(arr) if !arr.is_empty() => {
            for (i, vv) in arr.iter().enumerate() {
                let next = format!("{}/{}", prefix, i);
                collect_leaf_pointers(vv, &next, out);
            }
        }
        _ => {
            // Leaf (scalars and empty containers)
            if !prefix.is_empty() {
                out.push(prefix.to_string());
            }
        }
    }
}

fn escape_pointer_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

fn unescape_pointer_token(s: &str) -> String {
    s.replace("~1", "/").replace("~0", "~")
}

fn kind_of(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

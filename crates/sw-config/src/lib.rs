//! sw-config
//!
//! Layered YAML configuration for the stock monitor.
//!
//! # Contract
//! - Documents merge in order; later documents override earlier ones key by
//!   key (objects merge recursively, everything else is replaced).
//! - The merged tree is serialized to canonical JSON and hashed (SHA-256,
//!   hex) so a running daemon can report exactly which config it runs.
//! - YAML carries env var NAMES for credentials. A leaf that looks like a
//!   literal credential aborts loading with `CONFIG_SECRET_DETECTED`.
//! - [`Settings`] is the typed view; [`resolve_secrets`] turns the env var
//!   names into values once, at startup.

mod guard;
mod secrets;
mod settings;
mod unused;

pub use secrets::{resolve_secrets, resolve_secrets_with, ResolvedSecrets};
pub use settings::{
    CatalogSettings, HttpSettings, MonitorSettings, NotifySettings, OnFailure, ServiceSettings,
    Settings, SmtpSettings, StateSettings, Transport, WebhookSettings,
};
pub use unused::{consumed_pointers, report_unused_keys, UnusedKeyPolicy, UnusedKeyReport};

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::Value;
use sha2::{Digest, Sha256};

#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config_hash: String,
    pub canonical_json: String,
    pub config_json: Value,
}

impl LoadedConfig {
    /// Typed, validated settings.
    pub fn settings(&self) -> Result<Settings> {
        Settings::from_config_json(&self.config_json)
    }
}

pub fn load_layered_yaml<P: AsRef<Path>>(paths: &[P]) -> Result<LoadedConfig> {
    let mut docs = Vec::with_capacity(paths.len());
    for p in paths {
        let p = p.as_ref();
        let raw = fs::read_to_string(p)
            .with_context(|| format!("failed to read config yaml: {}", p.display()))?;
        docs.push(raw);
    }
    let refs: Vec<&str> = docs.iter().map(String::as_str).collect();
    load_layered_yaml_from_strings(&refs)
}

pub fn load_layered_yaml_from_strings(yaml_docs: &[&str]) -> Result<LoadedConfig> {
    let mut merged = Value::Object(Default::default());
    for (i, raw) in yaml_docs.iter().enumerate() {
        let doc: serde_yaml::Value =
            serde_yaml::from_str(raw).with_context(|| format!("invalid yaml in layer {i}"))?;
        // An empty layer parses as null; it overrides nothing.
        if doc.is_null() {
            continue;
        }
        let doc = serde_json::to_value(doc).context("yaml->json conversion failed")?;
        merged = deep_merge(merged, doc);
    }

    guard::enforce_no_secret_literals(&merged)?;

    let canonical_json =
        serde_json::to_string(&canonicalize(&merged)).context("canonical json serialize failed")?;
    let config_hash = sha256_hex(canonical_json.as_bytes());
    Ok(LoadedConfig {
        config_hash,
        canonical_json,
        config_json: merged,
    })
}

fn deep_merge(base: Value, over: Value) -> Value {
    match (base, over) {
        (Value::Object(mut base), Value::Object(over)) => {
            for (k, v) in over {
                let merged = match base.remove(&k) {
                    Some(existing) => deep_merge(existing, v),
                    None => v,
                };
                base.insert(k, merged);
            }
            Value::Object(base)
        }
        (_, over) => over,
    }
}

/// Rebuild with keys in sorted order at every level, whatever map
/// ordering serde_json was compiled with.
fn canonicalize(v: &Value) -> Value {
    match v {
        Value::Object(map) => {
            let sorted: BTreeMap<&String, Value> =
                map.iter().map(|(k, v)| (k, canonicalize(v))).collect();
            Value::Object(sorted.into_iter().map(|(k, v)| (k.clone(), v)).collect())
        }
        Value::Array(items) => Value::Array(items.iter().map(canonicalize).collect()),
        other => other.clone(),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn later_layer_overrides_scalars_and_merges_objects() {
        let merged = deep_merge(
            json!({"catalog": {"page_size": 250, "api_version": "2024-01"}, "monitor": {"brands": ["A", "B"]}}),
            json!({"catalog": {"page_size": 50}, "monitor": {"brands": ["C"]}}),
        );
        assert_eq!(
            merged,
            json!({"catalog": {"page_size": 50, "api_version": "2024-01"}, "monitor": {"brands": ["C"]}})
        );
    }

    #[test]
    fn key_order_does_not_change_the_hash() {
        let a = load_layered_yaml_from_strings(&["a: 1\nb: {y: 2, x: 1}\n"]).unwrap();
        let b = load_layered_yaml_from_strings(&["b: {x: 1, y: 2}\na: 1\n"]).unwrap();
        assert_eq!(a.config_hash, b.config_hash);
        assert_eq!(a.canonical_json, r#"{"a":1,"b":{"x":1,"y":2}}"#);
    }

    #[test]
    fn empty_layer_is_ignored() {
        let a = load_layered_yaml_from_strings(&["monitor:\n  brands: [Acme]\n"]).unwrap();
        let b = load_layered_yaml_from_strings(&["monitor:\n  brands: [Acme]\n", ""]).unwrap();
        assert_eq!(a.config_hash, b.config_hash);
    }
}

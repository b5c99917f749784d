//! Unused-key lint.
//!
//! A config leaf is "consumed" when its JSON pointer sits under one of the
//! prefixes the process actually reads. Anything else is a typo or a stale
//! key and is reported; callers choose whether that is a warning or fatal.
//!
//! The notify transport decides which transport subsection is read, so an
//! `smtp:` block left behind while running `transport: http` is reported.

use std::collections::BTreeSet;

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::guard::collect_leaves;
use crate::Transport;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnusedKeyPolicy {
    Warn,
    Fail,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnusedKeyReport {
    pub transport: String,
    pub consumed_prefixes: Vec<String>,
    pub unused_leaf_pointers: Vec<String>,
}

impl UnusedKeyReport {
    pub fn is_clean(&self) -> bool {
        self.unused_leaf_pointers.is_empty()
    }
}

const COMMON: &[&str] = &[
    "/service/bind_addr",
    "/catalog/base_url",
    "/catalog/api_version",
    "/catalog/page_size",
    "/catalog/access_token_env",
    "/catalog/max_pages",
    "/monitor/brands",
    "/monitor/inter_brand_delay_ms",
    "/monitor/periodic_interval_secs",
    "/notify/transport",
    "/notify/from",
    "/notify/to",
    "/notify/timeout_secs",
    "/notify/on_failure",
    "/webhook/secret_env",
    "/webhook/signature_header",
    "/state/path",
];

/// Pointer prefixes read when running with `transport`.
pub fn consumed_pointers(transport: Transport) -> Vec<&'static str> {
    let mut out = COMMON.to_vec();
    match transport {
        Transport::Smtp => out.push("/notify/smtp"),
        Transport::Http => out.push("/notify/http"),
        Transport::Log => {}
    }
    out
}

pub fn report_unused_keys(
    config_json: &Value,
    transport: Transport,
    policy: UnusedKeyPolicy,
) -> Result<UnusedKeyReport> {
    let consumed: BTreeSet<&str> = consumed_pointers(transport).into_iter().collect();

    let mut leaves = Vec::new();
    collect_leaves(config_json, String::new(), &mut leaves);

    let unused: BTreeSet<String> = leaves
        .into_iter()
        .map(|(ptr, _)| ptr)
        .filter(|leaf| !consumed.iter().any(|c| is_under(c, leaf)))
        .collect();

    let report = UnusedKeyReport {
        transport: transport.as_str().to_string(),
        consumed_prefixes: consumed.iter().map(|s| s.to_string()).collect(),
        unused_leaf_pointers: unused.into_iter().collect(),
    };

    if policy == UnusedKeyPolicy::Fail && !report.is_clean() {
        bail!(
            "CONFIG_UNUSED_KEYS (transport={}): {} unused config leaf key(s): {:?}",
            report.transport,
            report.unused_leaf_pointers.len(),
            report.unused_leaf_pointers.iter().take(12).collect::<Vec<_>>()
        );
    }
    Ok(report)
}

/// `/a/b` covers `/a/b` and `/a/b/...`, not `/a/bc`.
fn is_under(prefix: &str, leaf: &str) -> bool {
    match leaf.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/'),
        None => false,
    }
}

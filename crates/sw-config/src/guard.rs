use anyhow::{bail, Result};
use serde_json::Value;

/// Prefixes of credentials that must never appear as literal config values.
/// A leaf string starting with one of these aborts loading.
const SECRET_PREFIXES: &[&str] = &[
    "shpat_",     // Shopify admin API access token
    "shpca_",     // Shopify custom app token
    "shpss_",     // Shopify shared secret
    "sk_live",    // Stripe-style live key
    "sk_test",    // Stripe-style test key
    "SG.",        // SendGrid API key
    "re_",        // Resend API key
    "xkeysib-",   // Brevo API key
    "AKIA",       // AWS access key ID (SES)
    "-----BEGIN", // PEM private keys
];

/// Values shorter than this are never treated as credentials
/// (keeps `re_` from matching short identifiers).
const MIN_SECRET_LEN: usize = 12;

/// Brand identifiers are opaque catalog names, not credentials.
const EXEMPT_PREFIX: &str = "/monitor/brands";

pub(crate) fn enforce_no_secret_literals(v: &Value) -> Result<()> {
    let mut leaves = Vec::new();
    collect_leaves(v, String::new(), &mut leaves);
    for (ptr, leaf) in leaves {
        if is_exempt(&ptr) {
            continue;
        }
        if let Some(s) = leaf.as_str() {
            if looks_like_secret(s) {
                bail!("CONFIG_SECRET_DETECTED leaf={ptr} value=REDACTED");
            }
        }
    }
    Ok(())
}

fn is_exempt(ptr: &str) -> bool {
    ptr == EXEMPT_PREFIX || ptr.starts_with(&format!("{EXEMPT_PREFIX}/"))
}

fn looks_like_secret(s: &str) -> bool {
    let t = s.trim();
    t.len() >= MIN_SECRET_LEN && SECRET_PREFIXES.iter().any(|p| t.starts_with(p))
}

/// Every scalar leaf with its JSON pointer. The root scalar gets `/`.
pub(crate) fn collect_leaves<'a>(v: &'a Value, ptr: String, out: &mut Vec<(String, &'a Value)>) {
    match v {
        Value::Object(map) => {
            for (k, child) in map {
                collect_leaves(child, format!("{ptr}/{}", escape_token(k)), out);
            }
        }
        Value::Array(items) => {
            for (i, child) in items.iter().enumerate() {
                collect_leaves(child, format!("{ptr}/{i}"), out);
            }
        }
        _ => {
            let ptr = if ptr.is_empty() { "/".to_string() } else { ptr };
            out.push((ptr, v));
        }
    }
}

fn escape_token(s: &str) -> String {
    s.replace('~', "~0").replace('/', "~1")
}

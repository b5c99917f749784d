use std::time::Duration;

use reqwest::header::LINK;
use serde::Deserialize;
use sw_stock::{Product, Variant};
use tracing::debug;

use crate::{parse_next_link, CatalogError, CatalogSource};

/// Upstream caps `limit` at 250 products per page.
pub const MAX_PAGE_SIZE: u32 = 250;

const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Connection parameters for [`ShopifyCatalog`].
///
/// The access token is resolved by the caller (config layer) and passed in;
/// do not log it.
#[derive(Clone)]
pub struct ShopifyCatalogConfig {
    /// Shop origin, e.g. `https://example.myshopify.com`.
    pub base_url: String,
    /// Admin API version segment, e.g. `2024-01`.
    pub api_version: String,
    pub access_token: String,
    /// Products per page, clamped to `1..=250`.
    pub page_size: u32,
    /// Hard stop for a cursor chain that never ends.
    pub max_pages: usize,
    pub request_timeout: Duration,
}

impl std::fmt::Debug for ShopifyCatalogConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyCatalogConfig")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("access_token", &"<REDACTED>")
            .field("page_size", &self.page_size)
            .field("max_pages", &self.max_pages)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

/// Admin-REST backed catalog source with `Link` header cursor pagination.
#[derive(Debug, Clone)]
pub struct ShopifyCatalog {
    cfg: ShopifyCatalogConfig,
    http: reqwest::Client,
}

impl ShopifyCatalog {
    pub fn new(mut cfg: ShopifyCatalogConfig) -> Result<Self, CatalogError> {
        cfg.page_size = cfg.page_size.clamp(1, MAX_PAGE_SIZE);
        cfg.max_pages = cfg.max_pages.max(1);
        let http = reqwest::Client::builder()
            .timeout(cfg.request_timeout)
            .build()
            .map_err(|e| CatalogError::Transport(format!("http client build failed: {e}")))?;
        Ok(Self { cfg, http })
    }

    fn products_url(&self) -> String {
        format!(
            "{}/admin/api/{}/products.json",
            self.cfg.base_url.trim_end_matches('/'),
            self.cfg.api_version
        )
    }

    /// First page: brand filter + page size. Later pages: the cursor URL
    /// verbatim, since the upstream rejects filters next to a cursor.
    fn page_request(&self, brand: &str, cursor: Option<&str>) -> reqwest::RequestBuilder {
        let req = match cursor {
            None => {
                let limit = self.cfg.page_size.to_string();
                self.http.get(self.products_url()).query(&[
                    ("vendor", brand),
                    ("limit", limit.as_str()),
                    ("fields", "id,title,variants"),
                ])
            }
            Some(url) => self.http.get(url),
        };
        req.header(ACCESS_TOKEN_HEADER, self.cfg.access_token.as_str())
    }
}

#[async_trait::async_trait]
impl CatalogSource for ShopifyCatalog {
    fn source_name(&self) -> &'static str {
        "shopify"
    }

    async fn fetch_all_products(&self, brand: &str) -> Result<Vec<Product>, CatalogError> {
        let mut out: Vec<Product> = Vec::new();
        let mut cursor: Option<String> = None;

        for page in 1..=self.cfg.max_pages {
            let resp = self
                .page_request(brand, cursor.as_deref())
                .send()
                .await
                .map_err(|e| CatalogError::Transport(e.to_string()))?;

            let status = resp.status();
            if !status.is_success() {
                return Err(CatalogError::Upstream {
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or("unknown").to_string(),
                });
            }

            let link = resp
                .headers()
                .get(LINK)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned);

            let body: ProductsPage = resp
                .json()
                .await
                .map_err(|e| CatalogError::Decode(e.to_string()))?;

            let products = body.products.unwrap_or_default();
            debug!(brand, page, count = products.len(), "catalog page fetched");
            out.extend(products.into_iter().map(Product::from));

            cursor = parse_next_link(link.as_deref());
            if cursor.is_none() {
                return Ok(out);
            }
        }

        Err(CatalogError::PageLimit {
            pages: self.cfg.max_pages,
        })
    }
}

// ---------------------------------------------------------------------------
// Wire shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ProductsPage {
    #[serde(default)]
    products: Option<Vec<WireProduct>>,
}

#[derive(Debug, Deserialize)]
struct WireProduct {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    variants: Option<Vec<WireVariant>>,
}

#[derive(Debug, Deserialize)]
struct WireVariant {
    #[serde(default)]
    inventory_quantity: Option<i64>,
}

impl From<WireProduct> for Product {
    fn from(w: WireProduct) -> Self {
        Product {
            id: w.id,
            title: w.title.unwrap_or_default(),
            variants: w
                .variants
                .unwrap_or_default()
                .into_iter()
                .map(|v| Variant {
                    inventory_quantity: v.inventory_quantity,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cfg(base: &str) -> ShopifyCatalogConfig {
        ShopifyCatalogConfig {
            base_url: base.to_string(),
            api_version: "2024-01".to_string(),
            access_token: "tok".to_string(),
            page_size: 9999,
            max_pages: 0,
            request_timeout: Duration::from_secs(5),
        }
    }

    #[test]
    fn page_size_and_budget_are_clamped() {
        let c = ShopifyCatalog::new(cfg("https://s.example")).unwrap();
        assert_eq!(c.cfg.page_size, MAX_PAGE_SIZE);
        assert_eq!(c.cfg.max_pages, 1);
    }

    #[test]
    fn products_url_tolerates_trailing_slash() {
        let c = ShopifyCatalog::new(cfg("https://s.example/")).unwrap();
        assert_eq!(
            c.products_url(),
            "https://s.example/admin/api/2024-01/products.json"
        );
    }

    #[test]
    fn wire_product_with_nulls_decodes() {
        let page: ProductsPage = serde_json::from_str(
            r#"{"products":[{"id":1,"title":null,"variants":[{"inventory_quantity":null},{}]}]}"#,
        )
        .unwrap();
        let p: Product = page.products.unwrap().remove(0).into();
        assert_eq!(p.variants.len(), 2);
        assert_eq!(p.total_quantity(), 0);
    }

    #[test]
    fn debug_redacts_token() {
        let dbg = format!("{:?}", cfg("https://s.example"));
        assert!(!dbg.contains("\"tok\""));
        assert!(dbg.contains("REDACTED"));
    }
}

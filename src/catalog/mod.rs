// SPDX-License-Identifier: GPL-3.0-only

//! Remote product catalog
//!
//! The catalog is an HTTP JSON endpoint keyed by product code. Its answer
//! is classified here: found, not found, or a transport failure.

pub mod lookup;
pub mod model;

pub use lookup::{LookupCompletion, LookupFailure, LookupState, PendingLookup, ProductLookup};
pub use model::{CategoryTag, NutriScoreGrade, Nutrient, NutrientLevel, Product};

use crate::app::scan::ProductCode;
use crate::config::Config;
use crate::errors::LookupError;
use model::{CatalogResponse, normalize};
use std::future::Future;
use tracing::{debug, info};

/// Read access to the catalog
pub trait CatalogClient: Send + Sync + 'static {
    /// Fetch and classify the catalog entry for `code`
    fn fetch_product(
        &self,
        code: &ProductCode,
    ) -> impl Future<Output = Result<Product, LookupError>> + Send;
}

/// Classify a catalog response body
///
/// A body that is not JSON is a transport failure. Parseable JSON without
/// `status == 1` and a product is not-found.
pub fn classify_body(body: &str, code: &ProductCode) -> Result<Product, LookupError> {
    let response: CatalogResponse = serde_json::from_str(body)?;
    match response.into_found() {
        Some(raw) => Ok(normalize(raw, code)),
        None => Err(LookupError::NotFound),
    }
}

/// Catalog over HTTP
#[derive(Debug, Clone)]
pub struct HttpCatalog {
    client: reqwest::Client,
    config: Config,
}

impl HttpCatalog {
    pub fn new(config: Config) -> Result<Self, LookupError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self { client, config })
    }
}

impl CatalogClient for HttpCatalog {
    fn fetch_product(
        &self,
        code: &ProductCode,
    ) -> impl Future<Output = Result<Product, LookupError>> + Send {
        let url = self.config.product_url(code.as_str());
        let client = self.client.clone();
        let code = code.clone();

        async move {
            debug!(%url, "Fetching product");
            // The catalog reports unknown codes in the body, so the HTTP
            // status is not checked
            let response = client.get(&url).send().await?;
            let http_status = response.status();
            let body = response.text().await?;

            let result = classify_body(&body, &code);
            info!(
                code = %code,
                http_status = http_status.as_u16(),
                found = result.is_ok(),
                "Catalog lookup finished"
            );
            result
        }
    }
}

//! Catalog platform API client.
//!
//! The pipeline's upstream: bib, item, and holding lookups against the
//! catalog platform. [`CatalogApi`] is the contract the pipeline consumes;
//! [`PlatformClient`] is the HTTP implementation. Pagination and
//! authentication details live here and nowhere else.

use crate::error::Result;
use crate::records::{Bib, Holding, Item};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

/// Read access to the catalog platform.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    /// All items for a bib, fully paginated.
    async fn items_for_bib(&self, bib: &Bib) -> Result<Vec<Item>>;

    /// Holdings for a single bib.
    async fn holdings_for_bib(&self, bib: &Bib) -> Result<Vec<Holding>>;

    /// Holdings for a batch of bib ids, in one query.
    async fn holdings_for_bibs(&self, bib_ids: &[String]) -> Result<Vec<Holding>>;

    /// A bib by source and id. `Ok(None)` signals not-found, not an error:
    /// a deleted or missing bib means "nothing to index".
    async fn bib_by_id(&self, source: &str, id: &str) -> Result<Option<Bib>>;
}

/// A `(source, id)` pair naming a bib to fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BibIdentifier {
    /// Institution source tag.
    pub nypl_source: String,
    /// Bib record id.
    pub id: String,
}

/// Distinct bib identifiers referenced by a set of items.
#[must_use]
pub fn bib_identifiers_for_items(items: &[Item]) -> Vec<BibIdentifier> {
    items
        .iter()
        .flat_map(|item| {
            item.bib_ids.iter().map(|id| BibIdentifier {
                nypl_source: item.nypl_source.clone(),
                id: id.clone(),
            })
        })
        .collect()
}

/// Bib identifiers referenced by a set of holdings. Holdings are only
/// tracked for the home institution.
#[must_use]
pub fn bib_identifiers_for_holdings(holdings: &[Holding]) -> Vec<BibIdentifier> {
    holdings
        .iter()
        .flat_map(|holding| {
            holding.bib_ids.iter().map(|id| BibIdentifier {
                nypl_source: "sierra-nypl".to_string(),
                id: id.clone(),
            })
        })
        .collect()
}

/// Fetch the bibs owning a set of items. Missing bibs are skipped.
///
/// # Errors
///
/// Propagates the first catalog API failure.
pub async fn bibs_for_items(client: &dyn CatalogApi, items: &[Item]) -> Result<Vec<Bib>> {
    bibs_for_identifiers(client, bib_identifiers_for_items(items)).await
}

/// Fetch the bibs owning a set of holdings. Missing bibs are skipped.
///
/// # Errors
///
/// Propagates the first catalog API failure.
pub async fn bibs_for_holdings(client: &dyn CatalogApi, holdings: &[Holding]) -> Result<Vec<Bib>> {
    bibs_for_identifiers(client, bib_identifiers_for_holdings(holdings)).await
}

async fn bibs_for_identifiers(
    client: &dyn CatalogApi,
    identifiers: Vec<BibIdentifier>,
) -> Result<Vec<Bib>> {
    let fetches = identifiers
        .iter()
        .map(|ident| client.bib_by_id(&ident.nypl_source, &ident.id));
    let bibs = futures::future::try_join_all(fetches).await?;
    Ok(bibs.into_iter().flatten().collect())
}

/// Envelope the platform wraps every payload in.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    #[serde(default = "Option::default")]
    data: Option<T>,
}

/// HTTP implementation of [`CatalogApi`].
#[derive(Debug)]
pub struct PlatformClient {
    client: reqwest::Client,
    base_url: String,
    items_page_size: u32,
}

impl PlatformClient {
    /// Create a client against `base_url` (no trailing slash), paging item
    /// fetches by `items_page_size` (clamped to at least 1, since a
    /// zero-item page can never satisfy the last-page check).
    #[must_use]
    pub fn new(base_url: impl Into<String>, items_page_size: u32) -> Self {
        PlatformClient {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            items_page_size: items_page_size.max(1),
        }
    }

    async fn get<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<Option<T>> {
        let url = format!("{}/{path}", self.base_url);
        debug!(%url, "PlatformClient fetch");
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let envelope: ApiResponse<T> = response.error_for_status()?.json().await?;
        Ok(envelope.data)
    }
}

#[async_trait]
impl CatalogApi for PlatformClient {
    async fn items_for_bib(&self, bib: &Bib) -> Result<Vec<Item>> {
        let limit = self.items_page_size;
        let mut offset = 0;
        let mut items: Vec<Item> = Vec::new();
        loop {
            let path = format!(
                "bibs/{}/{}/items?limit={limit}&offset={offset}",
                bib.nypl_source, bib.id
            );
            let page: Vec<Item> = self.get(&path).await?.unwrap_or_default();
            let page_len = page.len();
            debug!(count = page_len, "PlatformClient got items page");
            items.extend(page);
            if page_len < limit as usize {
                return Ok(items);
            }
            offset += limit;
        }
    }

    async fn holdings_for_bib(&self, bib: &Bib) -> Result<Vec<Holding>> {
        let path = format!("holdings?bib_id={}", bib.id);
        Ok(self.get(&path).await?.unwrap_or_default())
    }

    async fn holdings_for_bibs(&self, bib_ids: &[String]) -> Result<Vec<Holding>> {
        let path = format!("holdings?bib_ids={}", bib_ids.join(","));
        Ok(self.get(&path).await?.unwrap_or_default())
    }

    async fn bib_by_id(&self, source: &str, id: &str) -> Result<Option<Bib>> {
        self.get(&format!("bibs/{source}/{id}")).await
    }
}

//! Search index client interface.
//!
//! The index's document schema and write semantics are owned by the
//! index-writing layer; this module only carries the contract the pipeline
//! needs: save assembled documents, delete by URI with not-found treated as
//! success.

use crate::document::RecordDocument;
use crate::error::{IndexerError, Result};
use async_trait::async_trait;
use reqwest::StatusCode;
use tracing::debug;

/// Write access to the research search index.
#[async_trait]
pub trait SearchIndex: Send + Sync {
    /// Persist assembled documents.
    async fn save(&self, documents: &[RecordDocument]) -> Result<()>;

    /// Remove the document for `uri`. Implementations must treat a
    /// not-found response as success: deletes are issued speculatively for
    /// records that may never have been indexed.
    async fn delete(&self, uri: &str) -> Result<()>;
}

/// Minimal Elasticsearch-backed [`SearchIndex`].
#[derive(Debug)]
pub struct ElasticsearchIndex {
    client: reqwest::Client,
    base_url: String,
    index_name: String,
}

impl ElasticsearchIndex {
    /// Create a client for `index_name` at `base_url`.
    #[must_use]
    pub fn new(base_url: impl Into<String>, index_name: impl Into<String>) -> Self {
        ElasticsearchIndex {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            index_name: index_name.into(),
        }
    }

    fn doc_url(&self, uri: &str) -> String {
        format!("{}/{}/_doc/{}", self.base_url, self.index_name, uri)
    }
}

#[async_trait]
impl SearchIndex for ElasticsearchIndex {
    async fn save(&self, documents: &[RecordDocument]) -> Result<()> {
        for document in documents {
            let response = self
                .client
                .put(self.doc_url(&document.uri))
                .json(document)
                .send()
                .await?;
            if !response.status().is_success() {
                return Err(IndexerError::Index(format!(
                    "save of {} returned {}",
                    document.uri,
                    response.status()
                )));
            }
        }
        debug!(count = documents.len(), "Saved document(s) to index");
        Ok(())
    }

    async fn delete(&self, uri: &str) -> Result<()> {
        let response = self.client.delete(self.doc_url(uri)).send().await?;
        // Not-found means there was nothing to remove, which is success:
        if response.status() == StatusCode::NOT_FOUND || response.status().is_success() {
            return Ok(());
        }
        Err(IndexerError::Index(format!(
            "delete of {uri} returned {}",
            response.status()
        )))
    }
}

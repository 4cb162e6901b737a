//! Per-batch holdings prefetch cache.
//!
//! Rebuilding many bibs in one batch would otherwise issue one holdings
//! query per bib. [`HoldingsCache`] batches those lookups: one query per
//! chunk of home-institution bibs, with the results grouped by the
//! holdings' multi-valued bib-reference field and memoized per bib for the
//! duration of the batch. Partner bibs have no holdings and resolve to an
//! empty list without touching the network.
//!
//! The cache is the only run-scoped shared state in the pipeline: it is
//! built once per batch (each `prefetch` replaces the previous contents)
//! and read many times, so no locking is needed beyond "prefetch before
//! first read" sequencing at the call site.

use crate::error::{IndexerError, Result};
use crate::platform::CatalogApi;
use crate::records::{Bib, Holding};
use futures::future::{BoxFuture, FutureExt, Shared};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

type SharedHoldings = Shared<BoxFuture<'static, std::result::Result<Vec<Holding>, Arc<IndexerError>>>>;

/// Group holdings by their multi-valued bib-reference field.
fn group_by_bib_id(holdings: Vec<Holding>) -> HashMap<String, Vec<Holding>> {
    let mut grouped: HashMap<String, Vec<Holding>> = HashMap::new();
    for holding in holdings {
        for bib_id in &holding.bib_ids {
            grouped.entry(bib_id.clone()).or_default().push(holding.clone());
        }
    }
    grouped
}

/// Batch-scoped cache of per-bib holdings lookups.
///
/// Create one per pipeline invocation, [`prefetch`](Self::prefetch) it with
/// the batch's bibs, then answer every bib's holdings from
/// [`holdings_for`](Self::holdings_for).
#[derive(Debug, Default)]
pub struct HoldingsCache {
    entries: HashMap<String, SharedHoldings>,
}

impl HoldingsCache {
    /// An empty cache; every lookup falls back to a direct query until
    /// [`prefetch`](Self::prefetch) is called.
    #[must_use]
    pub fn new() -> Self {
        HoldingsCache::default()
    }

    /// Issue batched holdings queries for a batch of bibs.
    ///
    /// Replaces any previous cache contents entirely. Home-institution
    /// bibs are chunked (at most `chunk_size` per query) into shared
    /// deferred fetches; each bib's entry resolves to its own holdings,
    /// extracted from the chunk result. Partner bibs get an
    /// immediately-ready empty entry. Each batched query runs at most
    /// once, no matter how many bibs await it or in what order.
    pub fn prefetch(&mut self, bibs: &[Bib], client: &Arc<dyn CatalogApi>, chunk_size: usize) {
        self.entries.clear();

        let (home, partner): (Vec<&Bib>, Vec<&Bib>) =
            bibs.iter().partition(|bib| !bib.is_partner());

        for bib in partner {
            self.entries.insert(
                bib.source_and_id(),
                futures::future::ready(Ok(Vec::new())).boxed().shared(),
            );
        }

        let chunk_size = chunk_size.max(1);
        for chunk in home.chunks(chunk_size) {
            let ids: Vec<String> = chunk.iter().map(|bib| bib.id.clone()).collect();
            debug!(bibs = ids.len(), "Prefetching holdings for chunk");

            let client = Arc::clone(client);
            let chunk_fetch = async move {
                client
                    .holdings_for_bibs(&ids)
                    .await
                    .map(|holdings| Arc::new(group_by_bib_id(holdings)))
                    .map_err(Arc::new)
            }
            .boxed()
            .shared();

            for bib in chunk {
                let chunk_fetch = chunk_fetch.clone();
                let bib_id = bib.id.clone();
                let entry = async move {
                    let grouped = chunk_fetch.await?;
                    Ok(grouped.get(&bib_id).cloned().unwrap_or_default())
                }
                .boxed()
                .shared();
                self.entries.insert(bib.source_and_id(), entry);
            }
        }
    }

    /// Holdings for one bib: the cached deferred result when present,
    /// otherwise a direct uncached lookup (so the cache also works for
    /// bibs outside the prefetched batch).
    ///
    /// # Errors
    ///
    /// Propagates the underlying catalog API failure.
    pub async fn holdings_for(&self, bib: &Bib, client: &Arc<dyn CatalogApi>) -> Result<Vec<Holding>> {
        match self.entries.get(&bib.source_and_id()) {
            Some(entry) => entry
                .clone()
                .await
                .map_err(|e| IndexerError::Upstream(e.to_string())),
            None => client.holdings_for_bib(bib).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::test_support::{bib, holding};
    use crate::records::Item;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingCatalog {
        holdings: Vec<Holding>,
        batched_calls: AtomicUsize,
        single_calls: AtomicUsize,
    }

    impl CountingCatalog {
        fn new(holdings: Vec<Holding>) -> Self {
            CountingCatalog {
                holdings,
                batched_calls: AtomicUsize::new(0),
                single_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl CatalogApi for CountingCatalog {
        async fn items_for_bib(&self, _bib: &Bib) -> Result<Vec<Item>> {
            Ok(vec![])
        }

        async fn holdings_for_bib(&self, bib: &Bib) -> Result<Vec<Holding>> {
            self.single_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .holdings
                .iter()
                .filter(|h| h.bib_ids.contains(&bib.id))
                .cloned()
                .collect())
        }

        async fn holdings_for_bibs(&self, bib_ids: &[String]) -> Result<Vec<Holding>> {
            self.batched_calls.fetch_add(1, Ordering::SeqCst);
            Ok(self
                .holdings
                .iter()
                .filter(|h| h.bib_ids.iter().any(|id| bib_ids.contains(id)))
                .cloned()
                .collect())
        }

        async fn bib_by_id(&self, _source: &str, _id: &str) -> Result<Option<Bib>> {
            Ok(None)
        }
    }

    fn catalog(holdings: Vec<Holding>) -> (Arc<CountingCatalog>, Arc<dyn CatalogApi>) {
        let counting = Arc::new(CountingCatalog::new(holdings));
        let as_api: Arc<dyn CatalogApi> = Arc::clone(&counting) as Arc<dyn CatalogApi>;
        (counting, as_api)
    }

    #[tokio::test]
    async fn test_prefetch_groups_by_bib_reference() {
        let (counting, client) = catalog(vec![
            holding("h1", &["100"]),
            holding("h2", &["100", "200"]),
            holding("h3", &["200"]),
        ]);
        let bibs = vec![bib("100", "sierra-nypl", &[]), bib("200", "sierra-nypl", &[])];

        let mut cache = HoldingsCache::new();
        cache.prefetch(&bibs, &client, 25);

        let for_100 = cache.holdings_for(&bibs[0], &client).await.expect("holdings");
        let for_200 = cache.holdings_for(&bibs[1], &client).await.expect("holdings");

        assert_eq!(
            for_100.iter().map(|h| h.id.as_str()).collect::<Vec<_>>(),
            vec!["h1", "h2"]
        );
        assert_eq!(
            for_200.iter().map(|h| h.id.as_str()).collect::<Vec<_>>(),
            vec!["h2", "h3"]
        );
        // One batched query served both bibs; no single-bib fallbacks:
        assert_eq!(counting.batched_calls.load(Ordering::SeqCst), 1);
        assert_eq!(counting.single_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_partner_bib_resolves_empty_without_network() {
        let (counting, client) = catalog(vec![holding("h1", &["100"])]);
        let partner = bib("100", "recap-pul", &[]);

        let mut cache = HoldingsCache::new();
        cache.prefetch(std::slice::from_ref(&partner), &client, 25);

        let holdings = cache.holdings_for(&partner, &client).await.expect("holdings");
        assert!(holdings.is_empty());
        assert_eq!(counting.batched_calls.load(Ordering::SeqCst), 0);
        assert_eq!(counting.single_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_chunking_respects_size() {
        let (counting, client) = catalog(vec![]);
        let bibs: Vec<Bib> = (0..60)
            .map(|i| bib(&i.to_string(), "sierra-nypl", &[]))
            .collect();

        let mut cache = HoldingsCache::new();
        cache.prefetch(&bibs, &client, 25);

        // Await every entry to drive all chunk fetches:
        for b in &bibs {
            let _ = cache.holdings_for(b, &client).await.expect("holdings");
        }
        // 60 bibs / 25 per chunk = 3 batched queries:
        assert_eq!(counting.batched_calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_memoized_across_repeated_reads() {
        let (counting, client) = catalog(vec![holding("h1", &["100"])]);
        let b = bib("100", "sierra-nypl", &[]);

        let mut cache = HoldingsCache::new();
        cache.prefetch(std::slice::from_ref(&b), &client, 25);

        for _ in 0..3 {
            let _ = cache.holdings_for(&b, &client).await.expect("holdings");
        }
        assert_eq!(counting.batched_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_prefetch_replaces_previous_cache() {
        let (counting, client) = catalog(vec![holding("h1", &["100"])]);
        let first = bib("100", "sierra-nypl", &[]);
        let second = bib("200", "sierra-nypl", &[]);

        let mut cache = HoldingsCache::new();
        cache.prefetch(std::slice::from_ref(&first), &client, 25);
        cache.prefetch(std::slice::from_ref(&second), &client, 25);

        // The first bib's slot is gone, so this is an uncached fallback:
        let _ = cache.holdings_for(&first, &client).await.expect("holdings");
        assert_eq!(counting.single_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_uncached_fallback_without_prefetch() {
        let (counting, client) = catalog(vec![holding("h1", &["100"])]);
        let b = bib("100", "sierra-nypl", &[]);

        let cache = HoldingsCache::new();
        let holdings = cache.holdings_for(&b, &client).await.expect("holdings");

        assert_eq!(holdings.len(), 1);
        assert_eq!(counting.single_calls.load(Ordering::SeqCst), 1);
    }
}

//! The record assembly pipeline.
//!
//! For a batch of bibs: filter out (and delete) circulating bibs, prefetch
//! holdings for the whole batch, then per bib fetch children, enrich with
//! off-site customer codes, extract statements, and assemble the
//! classified, nested statement graph. Per-bib assembly is independent and
//! interleaves freely; within one bib the stages are strictly sequential.

use crate::config::Config;
use crate::document::RecordDocument;
use crate::error::{IndexerError, Result};
use crate::extractor::StatementExtractor;
use crate::grouping::{classify, group_by_subject, GroupKind};
use crate::holdings_cache::HoldingsCache;
use crate::identifier::{identifier_for, RecordKind};
use crate::nesting::nest_blank_nodes;
use crate::platform::CatalogApi;
use crate::recap::{attach_recap_customer_codes, ScsbClient};
use crate::records::{Bib, BibBundle};
use crate::research::{filter_and_delete_circulating, filter_research_items};
use crate::search_index::SearchIndex;
use crate::statement::{stringify_statement_literals, Statement};
use crate::tables::{ItemTypeTable, LocationTable};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Subject-id suffix marking electronic item statements extracted from a
/// bib record.
const ELECTRONIC_SUFFIX: &str = "-e";

/// The collaborators and configuration one pipeline invocation runs with.
pub struct PipelineContext {
    /// Catalog platform API.
    pub catalog: Arc<dyn CatalogApi>,
    /// Off-site registry client.
    pub scsb: Arc<dyn ScsbClient>,
    /// Statement extractor.
    pub extractor: Arc<dyn StatementExtractor>,
    /// Search index client.
    pub index: Arc<dyn SearchIndex>,
    /// Sierra location classification table.
    pub locations: LocationTable,
    /// Catalog item-type classification table.
    pub item_types: ItemTypeTable,
    /// Run-level flags and sizes.
    pub config: Config,
}

impl std::fmt::Debug for PipelineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipelineContext")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Outcome counts for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchCounts {
    /// Documents written to the index.
    pub processed: usize,
    /// Documents flagged suppressed and removed instead of written.
    pub suppressed: usize,
}

/// Fetch a bib's items and holdings, filtering items to research items.
async fn attach_children(
    bib: Bib,
    context: &PipelineContext,
    cache: &HoldingsCache,
) -> Result<BibBundle> {
    let (items, holdings) = futures::try_join!(
        context.catalog.items_for_bib(&bib),
        cache.holdings_for(&bib, &context.catalog)
    )
    .map_err(|e| {
        error!(bib = %bib.source_and_id(), error = %e, "Error attaching items and holdings to bib");
        e
    })?;
    debug!(
        bib = %bib.source_and_id(),
        items = items.len(),
        holdings = holdings.len(),
        "Got children"
    );
    let items = filter_research_items(items, &context.item_types);
    Ok(BibBundle {
        bib,
        items,
        holdings,
    })
}

/// Assemble the classified, nested statement graph for one bib bundle.
///
/// Extracts statements from the bib and all of its children, normalizes
/// literals, groups by subject, nests blank nodes, and classifies each
/// group in first-seen order. Electronic item statements extracted from
/// the bib record become item groups appended after catalog items.
/// Unclassifiable groups are logged and dropped.
///
/// # Errors
///
/// Returns [`IndexerError::Assembly`] if no bib group emerges, and
/// propagates extractor failures.
pub async fn assemble_document(
    bundle: BibBundle,
    extractor: &dyn StatementExtractor,
) -> Result<RecordDocument> {
    let expected_uri = identifier_for(&bundle.bib.nypl_source, &bundle.bib.id, RecordKind::Bib);

    debug!(bib = %bundle.bib.source_and_id(), "Extracting bib statements");
    let bib_statements = extractor.extract_bib(&bundle.bib).await?;

    // Electronic item statements ride along in the bib record; split them
    // out so they classify as items, appended after catalog items.
    let (electronic, bib_statements): (Vec<Statement>, Vec<Statement>) = bib_statements
        .into_iter()
        .partition(|s| s.subject_id.ends_with(ELECTRONIC_SUFFIX));

    let (item_statements, holding_statements) = futures::try_join!(
        futures::future::try_join_all(bundle.items.iter().map(|item| extractor.extract_item(item))),
        futures::future::try_join_all(
            bundle
                .holdings
                .iter()
                .map(|holding| extractor.extract_holding(holding))
        )
    )?;

    let mut statements = bib_statements;
    statements.extend(item_statements.into_iter().flatten());
    statements.extend(holding_statements.into_iter().flatten());
    statements.extend(electronic);

    let statements = stringify_statement_literals(statements);
    let groups = nest_blank_nodes(group_by_subject(statements));

    let mut bib_group = None;
    let mut items = Vec::new();
    let mut holdings = Vec::new();
    for group in groups {
        match classify(&group, expected_uri.as_deref()) {
            GroupKind::Bib => {
                if bib_group.is_none() {
                    bib_group = Some(group);
                } else {
                    warn!(subject_id = %group.subject_id, "Dropping duplicate bib group");
                }
            }
            GroupKind::Item => items.push(group),
            GroupKind::Holding => holdings.push(group),
            // Blank-node groups were consumed by nesting; anything still
            // carrying that shape is extraction drift, as is any group
            // matching no known shape:
            GroupKind::BlankNode | GroupKind::Unclassified => {
                warn!(subject_id = %group.subject_id, "Dropping unclassifiable statement group");
            }
        }
    }

    let bib_group = bib_group.ok_or_else(|| {
        IndexerError::Assembly(format!(
            "no bib statement group for {}",
            bundle.bib.source_and_id()
        ))
    })?;

    Ok(RecordDocument {
        uri: bib_group.subject_id.clone(),
        bib: bib_group,
        items,
        holdings,
    })
}

/// Build a [`RecordDocument`] for every bib in a batch.
///
/// Holdings for the whole batch are prefetched up front; per-bib pipelines
/// then run concurrently. Any unguarded per-bib failure fails the whole
/// batch (no partial commit on this path).
///
/// # Errors
///
/// Propagates the first per-bib pipeline failure.
pub async fn build_documents(
    bibs: Vec<Bib>,
    context: &PipelineContext,
) -> Result<Vec<RecordDocument>> {
    // Issue the batched holdings fetches first so every bib's lookup below
    // hits a cache slot:
    let mut cache = HoldingsCache::new();
    cache.prefetch(&bibs, &context.catalog, context.config.holdings_prefetch_chunk_size);
    let cache = &cache;

    futures::future::try_join_all(bibs.into_iter().map(|bib| async move {
        let bundle = attach_children(bib, context, cache).await?;
        let bundle =
            attach_recap_customer_codes(bundle, context.scsb.as_ref(), &context.config).await?;
        assemble_document(bundle, context.extractor.as_ref()).await
    }))
    .await
}

/// Full rebuild for a batch of bibs: filter and delete circulating bibs,
/// assemble documents for the research bibs, write them to the index, and
/// remove any that carry the suppression signal.
///
/// # Errors
///
/// Propagates assembly and index save failures. Delete failures — for
/// circulating bibs (see [`filter_and_delete_circulating`]) and for
/// suppressed documents — are logged without aborting.
pub async fn rebuild_bibs(bibs: Vec<Bib>, context: &PipelineContext) -> Result<BatchCounts> {
    debug!(
        bibs = %bibs
            .iter()
            .map(Bib::source_and_id)
            .collect::<Vec<_>>()
            .join(", "),
        "Full rebuild for bibs"
    );

    let research = filter_and_delete_circulating(
        bibs,
        context.index.as_ref(),
        &context.locations,
        &context.config,
    )
    .await;

    let documents = build_documents(research, context).await?;

    let (suppressed, to_save): (Vec<RecordDocument>, Vec<RecordDocument>) = documents
        .into_iter()
        .partition(RecordDocument::is_suppressed);

    if !to_save.is_empty() {
        context.index.save(&to_save).await?;
    }
    // Deletes are speculative (the record may never have been indexed);
    // a failed one must not stop the rest of the batch.
    for document in &suppressed {
        if let Err(e) = context.index.delete(&document.uri).await {
            error!(uri = %document.uri, error = %e, "Error deleting suppressed bib");
        }
    }

    let counts = BatchCounts {
        processed: to_save.len(),
        suppressed: suppressed.len(),
    };
    info!(
        processed = counts.processed,
        suppressed = counts.suppressed,
        "Completed processing batch"
    );
    Ok(counts)
}

//! Shared mock collaborators for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use discovery_indexer::document::RecordDocument;
use discovery_indexer::error::Result;
use discovery_indexer::extractor::StatementExtractor;
use discovery_indexer::platform::CatalogApi;
use discovery_indexer::recap::{ScsbClient, ScsbQuery, ScsbResponse};
use discovery_indexer::records::{Bib, Holding, Item};
use discovery_indexer::search_index::SearchIndex;
use discovery_indexer::statement::{Statement, StatementGroup};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// Install a logging subscriber honoring `RUST_LOG`; safe to call from
/// every test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Build a literal statement.
#[must_use]
pub fn literal(subject: &str, predicate: &str, value: Value) -> Statement {
    Statement {
        subject_id: subject.to_string(),
        predicate: predicate.to_string(),
        source_id: "sierra-nypl".to_string(),
        source_record_id: subject.trim_start_matches(|c: char| c.is_alphabetic()).to_string(),
        creator_id: 1,
        index: 0,
        source_record_path: None,
        object_literal: Some(value),
        object_id: None,
        object_label: None,
        object_type: None,
        blanknode: None,
    }
}

/// Build an entity-reference statement.
#[must_use]
pub fn reference(subject: &str, predicate: &str, object_id: &str) -> Statement {
    Statement {
        object_literal: None,
        object_id: Some(object_id.to_string()),
        ..literal(subject, predicate, Value::Null)
    }
}

/// A catalog API stub answering from in-memory records.
#[derive(Default)]
pub struct ScriptedCatalog {
    /// Items per bib id.
    pub items: HashMap<String, Vec<Item>>,
    /// All holdings; filtered by bib reference per query.
    pub holdings: Vec<Holding>,
    /// Bibs per `"{source}/{id}"`.
    pub bibs: HashMap<String, Bib>,
}

#[async_trait]
impl CatalogApi for ScriptedCatalog {
    async fn items_for_bib(&self, bib: &Bib) -> Result<Vec<Item>> {
        Ok(self.items.get(&bib.id).cloned().unwrap_or_default())
    }

    async fn holdings_for_bib(&self, bib: &Bib) -> Result<Vec<Holding>> {
        Ok(self
            .holdings
            .iter()
            .filter(|h| h.bib_ids.contains(&bib.id))
            .cloned()
            .collect())
    }

    async fn holdings_for_bibs(&self, bib_ids: &[String]) -> Result<Vec<Holding>> {
        Ok(self
            .holdings
            .iter()
            .filter(|h| h.bib_ids.iter().any(|id| bib_ids.contains(id)))
            .cloned()
            .collect())
    }

    async fn bib_by_id(&self, source: &str, id: &str) -> Result<Option<Bib>> {
        Ok(self.bibs.get(&format!("{source}/{id}")).cloned())
    }
}

/// An off-site registry stub returning a fixed response.
#[derive(Default)]
pub struct ScriptedScsb {
    /// Response served for every search.
    pub response: ScsbResponse,
    /// Queries received.
    pub queries: Mutex<Vec<ScsbQuery>>,
}

#[async_trait]
impl ScsbClient for ScriptedScsb {
    async fn search(&self, query: &ScsbQuery) -> Result<ScsbResponse> {
        self.queries.lock().expect("lock").push(query.clone());
        Ok(self.response.clone())
    }
}

/// A statement extractor playing back scripted statements per record id.
#[derive(Default)]
pub struct ScriptedExtractor {
    /// Statements per bib id.
    pub bib_statements: HashMap<String, Vec<Statement>>,
    /// Statements per item id. Items carrying a recap customer code
    /// additionally get a `nypl:recapCustomerCode` statement, mirroring
    /// how the production extractor surfaces enrichment.
    pub item_statements: HashMap<String, Vec<Statement>>,
    /// Statements per holding id.
    pub holding_statements: HashMap<String, Vec<Statement>>,
    /// Ids to fail on, for batch-abort tests.
    pub fail_for: Vec<String>,
}

#[async_trait]
impl StatementExtractor for ScriptedExtractor {
    async fn extract_bib(&self, bib: &Bib) -> Result<Vec<Statement>> {
        if self.fail_for.contains(&bib.id) {
            return Err(discovery_indexer::IndexerError::Upstream(format!(
                "extraction failed for {}",
                bib.id
            )));
        }
        Ok(self.bib_statements.get(&bib.id).cloned().unwrap_or_default())
    }

    async fn extract_item(&self, item: &Item) -> Result<Vec<Statement>> {
        let mut statements = self.item_statements.get(&item.id).cloned().unwrap_or_default();
        if let Some(code) = &item.recap_customer_code {
            let subject = format!("i{}", item.id);
            statements.push(literal(
                &subject,
                "nypl:recapCustomerCode",
                Value::String(code.clone()),
            ));
        }
        Ok(statements)
    }

    async fn extract_holding(&self, holding: &Holding) -> Result<Vec<Statement>> {
        Ok(self
            .holding_statements
            .get(&holding.id)
            .cloned()
            .unwrap_or_default())
    }
}

/// A search index recording saves and deletes.
#[derive(Default)]
pub struct RecordingIndex {
    /// Documents saved.
    pub saved: Mutex<Vec<RecordDocument>>,
    /// URIs deleted (recorded even when the delete then fails).
    pub deletes: Mutex<Vec<String>>,
    /// When true, every delete fails after being recorded.
    pub fail_deletes: bool,
}

#[async_trait]
impl SearchIndex for RecordingIndex {
    async fn save(&self, documents: &[RecordDocument]) -> Result<()> {
        self.saved.lock().expect("lock").extend_from_slice(documents);
        Ok(())
    }

    async fn delete(&self, uri: &str) -> Result<()> {
        self.deletes.lock().expect("lock").push(uri.to_string());
        if self.fail_deletes {
            return Err(discovery_indexer::IndexerError::Index(
                "index unavailable".to_string(),
            ));
        }
        Ok(())
    }
}

/// Build a bib with the given location codes.
#[must_use]
pub fn bib(id: &str, source: &str, location_codes: &[&str]) -> Bib {
    Bib {
        id: id.to_string(),
        nypl_source: source.to_string(),
        locations: location_codes
            .iter()
            .map(|code| discovery_indexer::Location {
                code: (*code).to_string(),
                name: None,
            })
            .collect(),
        deleted: false,
        rest: HashMap::new(),
    }
}

/// Build an item, optionally with a location code.
#[must_use]
pub fn item(id: &str, source: &str, location_code: Option<&str>) -> Item {
    Item {
        id: id.to_string(),
        nypl_source: source.to_string(),
        bib_ids: Vec::new(),
        location: location_code.map(|code| discovery_indexer::Location {
            code: code.to_string(),
            name: None,
        }),
        fixed_fields: HashMap::new(),
        recap_customer_code: None,
        rest: HashMap::new(),
    }
}

/// Build a holding referencing the given bib ids.
#[must_use]
pub fn holding(id: &str, bib_ids: &[&str]) -> Holding {
    Holding {
        id: id.to_string(),
        bib_ids: bib_ids.iter().map(|s| (*s).to_string()).collect(),
        rest: HashMap::new(),
    }
}

/// Find the statement group for `subject_id`, panicking with context if
/// absent.
#[must_use]
pub fn group_for<'a>(groups: &'a [StatementGroup], subject_id: &str) -> &'a StatementGroup {
    groups
        .iter()
        .find(|g| g.subject_id == subject_id)
        .unwrap_or_else(|| panic!("expected group for {subject_id}"))
}

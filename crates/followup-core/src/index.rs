//! Semantic index: ranked top-k similarity over commitment task text.
//!
//! The engine only depends on the [`SimilarityIndex`] capability; scoring is
//! opaque below that contract. The production backend is a persistent
//! tantivy index with BM25 ranking over the task text and the metadata
//! mirror carried as stored fields. No score threshold is applied anywhere:
//! rank position and metadata filters are the only selection criteria.

use std::path::Path;

use tantivy::{
    collector::{Count, DocSetCollector, TopDocs},
    directory::MmapDirectory,
    query::{AllQuery, QueryParser, TermQuery},
    schema::{Field, IndexRecordOption, Schema, Value, STORED, STRING, TEXT},
    Index, IndexReader, IndexWriter, ReloadPolicy, TantivyDocument, Term,
};

use crate::error::{EngineError, Result};
use crate::types::Commitment;

// ---------------------------------------------------------------------------
// Capability contract
// ---------------------------------------------------------------------------

/// One indexed commitment: the task text plus a metadata mirror.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub id: String,
    pub text: String,
    pub meeting_id: String,
    pub meeting_title: String,
    pub owner: String,
    pub deadline: String,
    pub priority: String,
    pub status: String,
    pub created_at: String,
}

impl IndexEntry {
    /// Mirror a commitment, defaulting absent fields to their sentinels.
    pub fn from_commitment(c: &Commitment) -> IndexEntry {
        IndexEntry {
            id: c.id.clone(),
            text: c.task.clone(),
            meeting_id: c.meeting_id.clone(),
            meeting_title: c.meeting_title.clone(),
            owner: c.owner.clone().unwrap_or_else(|| "unassigned".to_string()),
            deadline: c.deadline.clone().unwrap_or_else(|| "none".to_string()),
            priority: c.priority.to_string(),
            status: c.status.to_string(),
            created_at: c.created_at.clone(),
        }
    }
}

/// A retrieved entry, ranked by descending similarity to the query text.
#[derive(Debug, Clone)]
pub struct IndexMatch {
    pub entry: IndexEntry,
    pub score: f32,
}

/// Ranked top-k retrieval with metadata passthrough, keyed by commitment id.
pub trait SimilarityIndex: Send {
    /// Insert or replace the entry stored under `entry.id`.
    fn upsert(&mut self, entry: &IndexEntry) -> Result<()>;

    /// Drop the entry stored under `id`, if any.
    fn remove(&mut self, id: &str) -> Result<()>;

    /// Up to `k` entries ordered by descending similarity to `text`.
    fn query(&self, text: &str, k: usize) -> Result<Vec<IndexMatch>>;

    /// Whether an entry exists under `id`.
    fn contains(&self, id: &str) -> Result<bool>;

    /// Every indexed id, for reconciliation sweeps.
    fn ids(&self) -> Result<Vec<String>>;
}

// ---------------------------------------------------------------------------
// TantivyIndex
// ---------------------------------------------------------------------------

struct EntryFields {
    id: Field,
    text: Field,
    meeting_id: Field,
    meeting_title: Field,
    owner: Field,
    deadline: Field,
    priority: Field,
    status: Field,
    created_at: Field,
}

pub struct TantivyIndex {
    index: Index,
    writer: IndexWriter,
    reader: IndexReader,
    fields: EntryFields,
}

impl TantivyIndex {
    /// Open (or create) a persistent index in `dir`.
    pub fn open(dir: &Path) -> Result<TantivyIndex> {
        std::fs::create_dir_all(dir)?;
        let (schema, fields) = build_schema();
        let mmap =
            MmapDirectory::open(dir).map_err(|e| EngineError::Index(e.to_string()))?;
        let index = Index::open_or_create(mmap, schema)
            .map_err(|e| EngineError::Index(e.to_string()))?;
        Self::from_index(index, fields)
    }

    /// Ephemeral in-RAM index. Intended for tests.
    pub fn open_in_ram() -> Result<TantivyIndex> {
        let (schema, fields) = build_schema();
        Self::from_index(Index::create_in_ram(schema), fields)
    }

    fn from_index(index: Index, fields: EntryFields) -> Result<TantivyIndex> {
        // 15 MB heap is more than enough for single-document commits
        let writer: IndexWriter = index
            .writer(15_000_000)
            .map_err(|e| EngineError::Index(e.to_string()))?;

        // Manual reload: the reader is refreshed after every commit in upsert/remove
        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()
            .map_err(|e: tantivy::TantivyError| EngineError::Index(e.to_string()))?;

        Ok(TantivyIndex {
            index,
            writer,
            reader,
            fields,
        })
    }

    fn commit_and_reload(&mut self) -> Result<()> {
        self.writer
            .commit()
            .map_err(|e| EngineError::Index(e.to_string()))?;
        self.reader
            .reload()
            .map_err(|e| EngineError::Index(e.to_string()))
    }

    fn read_match(&self, doc: &TantivyDocument, score: f32) -> IndexMatch {
        let get = |field: Field| {
            doc.get_first(field)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };
        IndexMatch {
            entry: IndexEntry {
                id: get(self.fields.id),
                text: get(self.fields.text),
                meeting_id: get(self.fields.meeting_id),
                meeting_title: get(self.fields.meeting_title),
                owner: get(self.fields.owner),
                deadline: get(self.fields.deadline),
                priority: get(self.fields.priority),
                status: get(self.fields.status),
                created_at: get(self.fields.created_at),
            },
            score,
        }
    }
}

impl SimilarityIndex for TantivyIndex {
    fn upsert(&mut self, entry: &IndexEntry) -> Result<()> {
        self.writer
            .delete_term(Term::from_field_text(self.fields.id, &entry.id));

        let mut doc = TantivyDocument::default();
        doc.add_text(self.fields.id, &entry.id);
        doc.add_text(self.fields.text, &entry.text);
        doc.add_text(self.fields.meeting_id, &entry.meeting_id);
        doc.add_text(self.fields.meeting_title, &entry.meeting_title);
        doc.add_text(self.fields.owner, &entry.owner);
        doc.add_text(self.fields.deadline, &entry.deadline);
        doc.add_text(self.fields.priority, &entry.priority);
        doc.add_text(self.fields.status, &entry.status);
        doc.add_text(self.fields.created_at, &entry.created_at);
        self.writer
            .add_document(doc)
            .map_err(|e| EngineError::Index(e.to_string()))?;

        self.commit_and_reload()
    }

    fn remove(&mut self, id: &str) -> Result<()> {
        self.writer
            .delete_term(Term::from_field_text(self.fields.id, id));
        self.commit_and_reload()
    }

    fn query(&self, text: &str, k: usize) -> Result<Vec<IndexMatch>> {
        if k == 0 || text.trim().is_empty() {
            return Ok(vec![]);
        }
        let searcher = self.reader.searcher();

        // Disjunctive by default: free text ranks by term overlap (BM25),
        // which is what similarity retrieval wants here.
        let parser = QueryParser::for_index(&self.index, vec![self.fields.text]);
        let query = match parser.parse_query(text) {
            Ok(q) => q,
            Err(_) => return Ok(vec![]),
        };

        let top_docs = searcher
            .search(&query, &TopDocs::with_limit(k))
            .map_err(|e| EngineError::Index(e.to_string()))?;

        let mut results = Vec::with_capacity(top_docs.len());
        for (score, addr) in top_docs {
            let doc: TantivyDocument = searcher
                .doc(addr)
                .map_err(|e| EngineError::Index(e.to_string()))?;
            results.push(self.read_match(&doc, score));
        }
        Ok(results)
    }

    fn contains(&self, id: &str) -> Result<bool> {
        let searcher = self.reader.searcher();
        let query = TermQuery::new(
            Term::from_field_text(self.fields.id, id),
            IndexRecordOption::Basic,
        );
        let count = searcher
            .search(&query, &Count)
            .map_err(|e| EngineError::Index(e.to_string()))?;
        Ok(count > 0)
    }

    fn ids(&self) -> Result<Vec<String>> {
        let searcher = self.reader.searcher();
        let docs = searcher
            .search(&AllQuery, &DocSetCollector)
            .map_err(|e| EngineError::Index(e.to_string()))?;
        let mut ids = Vec::with_capacity(docs.len());
        for addr in docs {
            let doc: TantivyDocument = searcher
                .doc(addr)
                .map_err(|e| EngineError::Index(e.to_string()))?;
            let id = doc
                .get_first(self.fields.id)
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();
            if !id.is_empty() {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

// ---------------------------------------------------------------------------
// Schema construction
// ---------------------------------------------------------------------------

/// `text` is the only tokenized search field; everything else is an
/// exact-match stored mirror used for filtering and display.
fn build_schema() -> (Schema, EntryFields) {
    let mut builder = Schema::builder();

    let id = builder.add_text_field("id", STRING | STORED);
    let text = builder.add_text_field("text", TEXT | STORED);
    let meeting_id = builder.add_text_field("meeting_id", STRING | STORED);
    let meeting_title = builder.add_text_field("meeting_title", STRING | STORED);
    let owner = builder.add_text_field("owner", STRING | STORED);
    let deadline = builder.add_text_field("deadline", STRING | STORED);
    let priority = builder.add_text_field("priority", STRING | STORED);
    let status = builder.add_text_field("status", STRING | STORED);
    let created_at = builder.add_text_field("created_at", STRING | STORED);

    let schema = builder.build();
    let fields = EntryFields {
        id,
        text,
        meeting_id,
        meeting_title,
        owner,
        deadline,
        priority,
        status,
        created_at,
    };
    (schema, fields)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, text: &str, meeting_id: &str) -> IndexEntry {
        IndexEntry {
            id: id.into(),
            text: text.into(),
            meeting_id: meeting_id.into(),
            meeting_title: "Weekly sync".into(),
            owner: "unassigned".into(),
            deadline: "none".into(),
            priority: "medium".into(),
            status: "open".into(),
            created_at: "2026-01-05T10:00:00Z".into(),
        }
    }

    #[test]
    fn query_ranks_by_similarity() {
        let mut index = TantivyIndex::open_in_ram().unwrap();
        index.upsert(&entry("c1", "Update the API documentation", "m1")).unwrap();
        index.upsert(&entry("c2", "Plan the offsite agenda", "m1")).unwrap();

        let matches = index.query("update API documentation", 5).unwrap();
        assert!(!matches.is_empty());
        assert_eq!(matches[0].entry.id, "c1");
    }

    #[test]
    fn query_exact_text_returns_same_id_first() {
        let mut index = TantivyIndex::open_in_ram().unwrap();
        index.upsert(&entry("c1", "Ship the beta build", "m1")).unwrap();
        let matches = index.query("Ship the beta build", 1).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].entry.id, "c1");
    }

    #[test]
    fn query_respects_k() {
        let mut index = TantivyIndex::open_in_ram().unwrap();
        for i in 0..4 {
            index
                .upsert(&entry(&format!("c{i}"), "review the quarterly budget", "m1"))
                .unwrap();
        }
        let matches = index.query("review budget", 2).unwrap();
        assert!(matches.len() <= 2);
    }

    #[test]
    fn query_no_match_returns_empty() {
        let mut index = TantivyIndex::open_in_ram().unwrap();
        index.upsert(&entry("c1", "Ship the beta build", "m1")).unwrap();
        let matches = index.query("kubernetes", 5).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn malformed_query_returns_empty_not_error() {
        let mut index = TantivyIndex::open_in_ram().unwrap();
        index.upsert(&entry("c1", "Ship the beta build", "m1")).unwrap();
        let matches = index.query("text:[unclosed", 5).unwrap();
        assert!(matches.is_empty());
    }

    #[test]
    fn upsert_replaces_existing_id() {
        let mut index = TantivyIndex::open_in_ram().unwrap();
        index.upsert(&entry("c1", "old task text", "m1")).unwrap();
        index.upsert(&entry("c1", "replacement task text", "m1")).unwrap();

        let matches = index.query("replacement", 5).unwrap();
        assert_eq!(matches.len(), 1);
        assert!(index.query("old", 5).unwrap().is_empty());
        assert_eq!(index.ids().unwrap(), vec!["c1".to_string()]);
    }

    #[test]
    fn contains_and_remove() {
        let mut index = TantivyIndex::open_in_ram().unwrap();
        index.upsert(&entry("c1", "Ship the beta build", "m1")).unwrap();
        assert!(index.contains("c1").unwrap());
        assert!(!index.contains("c2").unwrap());

        index.remove("c1").unwrap();
        assert!(!index.contains("c1").unwrap());
        assert!(index.ids().unwrap().is_empty());
    }

    #[test]
    fn metadata_round_trips_through_query() {
        let mut index = TantivyIndex::open_in_ram().unwrap();
        let e = entry("c1", "Ship the beta build", "m42");
        index.upsert(&e).unwrap();
        let matches = index.query("beta", 5).unwrap();
        assert_eq!(matches[0].entry, e);
    }

    #[test]
    fn persistent_index_survives_reopen() {
        let dir = tempfile::TempDir::new().unwrap();
        {
            let mut index = TantivyIndex::open(dir.path()).unwrap();
            index.upsert(&entry("c1", "Ship the beta build", "m1")).unwrap();
        }
        let index = TantivyIndex::open(dir.path()).unwrap();
        assert!(index.contains("c1").unwrap());
    }
}

//! In-memory document store
//!
//! A reference [`DocumentStore`] for tests, prototypes, and single-process
//! deployments. Identifiers are UUIDv7 strings; every write stamps the
//! document with a strictly increasing millisecond timestamp so that
//! "newest first" reads are deterministic even for writes landing in the
//! same millisecond.

use std::cmp::Ordering;
use std::collections::HashMap;

use serde_json::Value;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::error::{StoreError, StoreOperation};
use super::traits::{
    Document, DocumentId, DocumentStore, Filter, SortDirection, SortSpec, StoreResult,
    DEFAULT_ID_FIELD, DEFAULT_UPDATED_AT_FIELD,
};

#[derive(Debug, Default)]
struct Inner {
    documents: HashMap<DocumentId, Document>,
    last_stamp: i64,
}

impl Inner {
    fn next_stamp(&mut self) -> i64 {
        let now = chrono::Utc::now().timestamp_millis();
        self.last_stamp = now.max(self.last_stamp + 1);
        self.last_stamp
    }
}

/// Document store held entirely in process memory
#[derive(Debug)]
pub struct MemoryStore {
    name: String,
    id_field: String,
    updated_at_field: String,
    inner: RwLock<Inner>,
}

impl MemoryStore {
    /// Create an empty store for the named resource
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id_field: DEFAULT_ID_FIELD.to_string(),
            updated_at_field: DEFAULT_UPDATED_AT_FIELD.to_string(),
            inner: RwLock::new(Inner::default()),
        }
    }

    /// Override the identifier field name
    #[must_use]
    pub fn with_id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = field.into();
        self
    }

    /// Override the last-updated field name
    #[must_use]
    pub fn with_updated_at_field(mut self, field: impl Into<String>) -> Self {
        self.updated_at_field = field.into();
        self
    }

    /// Number of stored documents
    pub async fn len(&self) -> usize {
        self.inner.read().await.documents.len()
    }

    /// Whether the store holds no documents
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.documents.is_empty()
    }

    fn parse_id(&self, id: &DocumentId, operation: StoreOperation) -> StoreResult<()> {
        Uuid::parse_str(id.as_str())
            .map(|_| ())
            .map_err(|_| StoreError::invalid_id(&self.name, id.as_str()).with_operation(operation))
    }
}

impl DocumentStore for MemoryStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn id_field(&self) -> &str {
        &self.id_field
    }

    fn updated_at_field(&self) -> &str {
        &self.updated_at_field
    }

    async fn create_one(&self, mut document: Document) -> StoreResult<DocumentId> {
        let id = DocumentId::new(Uuid::now_v7().to_string());
        let mut inner = self.inner.write().await;
        let stamp = inner.next_stamp();
        document.insert(self.id_field.clone(), id.clone().into());
        document.insert(self.updated_at_field.clone(), Value::from(stamp));
        inner.documents.insert(id.clone(), document);
        tracing::trace!(resource = %self.name, id = %id, "document created");
        Ok(id)
    }

    async fn read_many(&self, filter: &Filter, sort: &SortSpec) -> StoreResult<Vec<Document>> {
        let inner = self.inner.read().await;
        let mut matched: Vec<Document> = inner
            .documents
            .values()
            .filter(|doc| matches_filter(doc, filter))
            .cloned()
            .collect();
        drop(inner);

        matched.sort_by(|a, b| {
            let ordering = compare_fields(a.get(&sort.field), b.get(&sort.field));
            match sort.direction {
                SortDirection::Ascending => ordering,
                SortDirection::Descending => ordering.reverse(),
            }
        });
        Ok(matched)
    }

    async fn update_one_by_id(&self, id: &DocumentId, patch: Document) -> StoreResult<bool> {
        self.parse_id(id, StoreOperation::UpdateOneById)?;
        let mut inner = self.inner.write().await;
        // stamps only need to increase, so a miss may consume one
        let stamp = inner.next_stamp();
        let Some(document) = inner.documents.get_mut(id) else {
            return Ok(false);
        };
        for (field, value) in patch {
            // identifiers are store-issued and never patched
            if field == self.id_field {
                continue;
            }
            document.insert(field, value);
        }
        document.insert(self.updated_at_field.clone(), Value::from(stamp));
        Ok(true)
    }

    async fn read_one_by_id(&self, id: &DocumentId) -> StoreResult<Option<Document>> {
        self.parse_id(id, StoreOperation::ReadOneById)?;
        Ok(self.inner.read().await.documents.get(id).cloned())
    }

    async fn pop_one_by_id(&self, id: &DocumentId) -> StoreResult<Option<Document>> {
        self.parse_id(id, StoreOperation::PopOneById)?;
        Ok(self.inner.write().await.documents.remove(id))
    }
}

/// Top-level field equality; an empty filter matches everything
fn matches_filter(document: &Document, filter: &Filter) -> bool {
    filter
        .iter()
        .all(|(field, expected)| document.get(field) == Some(expected))
}

/// Missing fields sort after present ones
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => compare_values(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => {
            let a = a.as_f64().unwrap_or(f64::NAN);
            let b = b.as_f64().unwrap_or(f64::NAN);
            a.partial_cmp(&b).unwrap_or(Ordering::Equal)
        }
        (Value::String(a), Value::String(b)) => a.cmp(b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        _ => Ordering::Equal,
    }
}

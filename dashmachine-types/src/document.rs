//! Data documents and the queries used to find them.
//!
//! A [`NewDocument`] is built locally and handed to the platform for
//! creation; the platform answers with a confirmed [`Document`] that carries
//! the network-assigned id. Documents are plain values: to change one,
//! build a new one.

use crate::{ContractId, DocumentId, IdentityId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;

/// A document confirmed by (or fetched from) the platform.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Contract the document validates against.
    pub contract_id: ContractId,
    /// Document type name within the contract (e.g. `"domain"`).
    pub document_type: String,
    /// Network-assigned id.
    pub id: DocumentId,
    /// Identity that owns (signed) the document.
    pub owner_id: IdentityId,
    /// Structured payload.
    pub data: Value,
}

impl Document {
    /// Looks up a field in the payload by dotted path, e.g. `records.identityId`.
    pub fn field(&self, path: &str) -> Option<&Value> {
        lookup(&self.data, path)
    }
}

/// A document built locally, before the network has assigned an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDocument {
    pub contract_id: ContractId,
    pub document_type: String,
    pub owner_id: IdentityId,
    pub data: Value,
}

impl NewDocument {
    /// Creates a new unsubmitted document.
    pub fn new(
        contract_id: ContractId,
        document_type: impl Into<String>,
        owner_id: IdentityId,
        data: Value,
    ) -> Self {
        Self {
            contract_id,
            document_type: document_type.into(),
            owner_id,
            data,
        }
    }
}

/// A set of state transitions broadcast together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentBatch {
    pub create: Vec<Document>,
    pub replace: Vec<Document>,
    pub delete: Vec<Document>,
}

impl DocumentBatch {
    /// A batch that creates exactly one document.
    pub fn create_one(document: Document) -> Self {
        Self {
            create: vec![document],
            ..Default::default()
        }
    }

    /// Total number of transitions in the batch.
    pub fn len(&self) -> usize {
        self.create.len() + self.replace.len() + self.delete.len()
    }

    /// Returns true if the batch carries no transitions.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Comparison operator in a where clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WhereOperator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "in")]
    In,
    #[serde(rename = "startsWith")]
    StartsWith,
}

/// One condition of a document query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereClause {
    /// Dotted path into the document payload.
    pub field: String,
    pub op: WhereOperator,
    pub value: Value,
}

impl WhereClause {
    /// Builds an equality clause.
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            op: WhereOperator::Eq,
            value: value.into(),
        }
    }

    /// Returns true if the document satisfies this clause.
    pub fn matches(&self, document: &Document) -> bool {
        let Some(actual) = document.field(&self.field) else {
            return false;
        };
        match self.op {
            WhereOperator::Eq => actual == &self.value,
            WhereOperator::Lt => compare(actual, &self.value) == Some(Ordering::Less),
            WhereOperator::Lte => matches!(
                compare(actual, &self.value),
                Some(Ordering::Less | Ordering::Equal)
            ),
            WhereOperator::Gt => compare(actual, &self.value) == Some(Ordering::Greater),
            WhereOperator::Gte => matches!(
                compare(actual, &self.value),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            WhereOperator::In => self
                .value
                .as_array()
                .is_some_and(|candidates| candidates.contains(actual)),
            WhereOperator::StartsWith => match (actual.as_str(), self.value.as_str()) {
                (Some(a), Some(prefix)) => a.starts_with(prefix),
                _ => false,
            },
        }
    }
}

/// A document query: conjunction of where clauses plus paging.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentQuery {
    #[serde(rename = "where")]
    pub where_clauses: Vec<WhereClause>,
    /// 1-based position of the first result to return.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_at: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
}

impl DocumentQuery {
    /// Creates an empty query (matches every document).
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a where clause.
    #[must_use]
    pub fn with_clause(mut self, clause: WhereClause) -> Self {
        self.where_clauses.push(clause);
        self
    }

    /// Adds an equality clause.
    #[must_use]
    pub fn where_eq(self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.with_clause(WhereClause::eq(field, value))
    }

    #[must_use]
    pub fn start_at(mut self, start_at: u32) -> Self {
        self.start_at = Some(start_at);
        self
    }

    #[must_use]
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Returns true if the document satisfies every clause.
    pub fn matches(&self, document: &Document) -> bool {
        self.where_clauses.iter().all(|c| c.matches(document))
    }

    /// Filters and pages a candidate set the way the platform does.
    pub fn apply<'a, I>(&self, documents: I) -> Vec<Document>
    where
        I: IntoIterator<Item = &'a Document>,
    {
        let skip = self.start_at.map_or(0, |s| s.saturating_sub(1)) as usize;
        let take = self.limit.map_or(usize::MAX, |l| l as usize);
        documents
            .into_iter()
            .filter(|d| self.matches(d))
            .skip(skip)
            .take(take)
            .cloned()
            .collect()
    }
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.')
        .try_fold(value, |current, segment| current.get(segment))
}

fn compare(a: &Value, b: &Value) -> Option<Ordering> {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (Value::String(x), Value::String(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

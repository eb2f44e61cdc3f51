//! The protocol between the pipeline and the graph store
//!
//! The graph store itself is a black box. The pipeline only relies on
//! the operations of the [`GraphSink`] trait:
//!
//! - bulk merge of [`Node`]s by label and ID
//! - bulk merge of [`Edge`]s by kind and endpoints
//! - reading back all nodes of a label or all edges of a kind
//!
//! Merging overwrites the supplied properties and keeps all others untouched.
//! This makes every write idempotent.
//!
//! [`MemoryGraph`] is an in-memory implementation of the protocol.

use std::collections::BTreeMap;
use std::fmt::Display;

use thiserror::Error;

mod memory;
mod summary;

/// Property names used on nodes and edges
pub mod keys {
    /// Name of a term or a disease
    pub const NAME: &str = "name";
    /// Definition of a term
    pub const DEFINITION: &str = "definition";
    /// Comment of a term
    pub const COMMENT: &str = "comment";
    /// Synonyms of a term
    pub const SYNONYMS: &str = "synonyms";
    /// Cross-references of a term
    pub const XREFS: &str = "xrefs";
    /// Category of a term
    pub const CATEGORY: &str = "category";
    /// Unix timestamp of the first write in the current run
    pub const CREATED_AT: &str = "created_at";
    /// Unix timestamp of the last write
    pub const MODIFIED_AT: &str = "modified_at";

    /// Confidence of an `IS_A` edge
    pub const CONFIDENCE_SCORE: &str = "confidence_score";
    /// Type of an `IS_A` edge
    pub const RELATIONSHIP_TYPE: &str = "relationship_type";

    /// Qualifier of a `HAS_PHENOTYPE` edge
    pub const QUALIFIER: &str = "qualifier";
    /// Evidence code of a `HAS_PHENOTYPE` edge
    pub const EVIDENCE: &str = "evidence";
    /// Frequency of a `HAS_PHENOTYPE` edge
    pub const FREQUENCY: &str = "frequency";
    /// Onset of a `HAS_PHENOTYPE` edge
    pub const ONSET: &str = "onset";

    /// Number of diseases shared by both terms of an `ASSOCIATED_WITH` edge
    pub const CO_OCCURRENCE_COUNT: &str = "co_occurrence_count";
    /// Co-occurrences relative to all occurrences of the source term
    pub const CORRELATION_STRENGTH: &str = "correlation_strength";
    /// `true` if both terms of an `ASSOCIATED_WITH` edge are in different clusters
    pub const CROSS_CLUSTER: &str = "cross_cluster";
    /// Co-occurrences relative to the size of both clusters
    pub const CLUSTER_CONNECTION_STRENGTH: &str = "cluster_connection_strength";

    /// Cluster of a term
    pub const CLUSTER_ID: &str = "cluster_id";
    /// Number of terms in the cluster
    pub const CLUSTER_SIZE: &str = "cluster_size";
    /// Number of linked diseases
    pub const DEGREE_CENTRALITY: &str = "degree_centrality";
    /// Number of terms within a few association hops
    pub const BETWEENNESS_SCORE: &str = "betweenness_score";
    /// `true` for terms with many associations
    pub const IS_HUB: &str = "is_hub";
    /// Local clustering coefficient of the association graph
    pub const CLUSTER_COEFFICIENT: &str = "cluster_coefficient";
    /// Number of linked diseases
    pub const PREVALENCE: &str = "prevalence";
    /// Number of associations
    pub const CONNECTIVITY: &str = "connectivity";
    /// Inverse prevalence
    pub const SPECIFICITY: &str = "specificity";
    /// Number of ancestors
    pub const HIERARCHICAL_LEVEL: &str = "hierarchical_level";
    /// `true` if the term has no children
    pub const LEAF_NODE: &str = "leaf_node";
}

pub use memory::MemoryGraph;
pub use summary::{DiseaseSample, GraphSummary, PhenotypeSample};

/// The properties of a node or an edge
pub type Properties = BTreeMap<String, Value>;

/// Shortcut for `Result<T, SinkError>`
pub type SinkResult<T> = Result<T, SinkError>;

/// Errors reported by a [`GraphSink`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SinkError {
    /// The store refused or aborted the transaction
    #[error("transaction rejected: {0}")]
    Rejected(String),
    /// The store could not be reached
    #[error("graph store unavailable: {0}")]
    Unavailable(String),
}

/// A single property value
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// A string
    Text(String),
    /// A list of strings, e.g. synonyms
    TextList(Vec<String>),
    /// An integer, used for counts and timestamps
    Integer(i64),
    /// A floating point number
    Float(f64),
    /// A boolean flag
    Bool(bool),
}

impl Value {
    /// Returns the string if the value is [`Value::Text`]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the integer if the value is [`Value::Integer`]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(n) => Some(*n),
            _ => None,
        }
    }

    /// Returns the numeric value of [`Value::Float`] or [`Value::Integer`]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Float(n) => Some(*n),
            #[allow(clippy::cast_precision_loss)]
            Value::Integer(n) => Some(*n as f64),
            _ => None,
        }
    }

    /// Returns the flag if the value is [`Value::Bool`]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<Vec<String>> for Value {
    fn from(list: Vec<String>) -> Self {
        Value::TextList(list)
    }
}

impl From<&[String]> for Value {
    fn from(list: &[String]) -> Self {
        Value::TextList(list.to_vec())
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Integer(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Integer(i64::try_from(n).unwrap_or(i64::MAX))
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// The label of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeLabel {
    /// An ontology term
    Phenotype,
    /// A disease from the annotation data
    Disease,
}

impl NodeLabel {
    /// The label as used by the graph store
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeLabel::Phenotype => "Phenotype",
            NodeLabel::Disease => "Disease",
        }
    }
}

impl Display for NodeLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The type of an edge
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EdgeKind {
    /// Child term -> parent term
    IsA,
    /// Disease -> term
    HasPhenotype,
    /// Term -> co-occurring term
    AssociatedWith,
}

impl EdgeKind {
    /// The relationship type as used by the graph store
    pub fn as_str(&self) -> &'static str {
        match self {
            EdgeKind::IsA => "IS_A",
            EdgeKind::HasPhenotype => "HAS_PHENOTYPE",
            EdgeKind::AssociatedWith => "ASSOCIATED_WITH",
        }
    }

    /// The labels of the source and the target node
    pub fn endpoints(&self) -> (NodeLabel, NodeLabel) {
        match self {
            EdgeKind::IsA | EdgeKind::AssociatedWith => (NodeLabel::Phenotype, NodeLabel::Phenotype),
            EdgeKind::HasPhenotype => (NodeLabel::Disease, NodeLabel::Phenotype),
        }
    }
}

impl Display for EdgeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A node, either to be merged into the store or read from it
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    /// The label of the node
    pub label: NodeLabel,
    /// The unique ID within the label
    pub id: String,
    /// The properties to set
    pub properties: Properties,
}

impl Node {
    /// Constructs a new node without properties
    pub fn new(label: NodeLabel, id: &str) -> Self {
        Self {
            label,
            id: id.to_string(),
            properties: Properties::new(),
        }
    }

    /// Adds a property
    #[must_use]
    pub fn with<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// Returns the value of a property
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

/// An edge, either to be merged into the store or read from it
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// The type of the edge
    pub kind: EdgeKind,
    /// ID of the source node
    pub from: String,
    /// ID of the target node
    pub to: String,
    /// The properties to set
    pub properties: Properties,
}

impl Edge {
    /// Constructs a new edge without properties
    pub fn new(kind: EdgeKind, from: &str, to: &str) -> Self {
        Self {
            kind,
            from: from.to_string(),
            to: to.to_string(),
            properties: Properties::new(),
        }
    }

    /// Adds a property
    #[must_use]
    pub fn with<V: Into<Value>>(mut self, key: &str, value: V) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    /// Returns the value of a property
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }
}

/// Nodes and edges that are written in one transaction
#[derive(Debug, Default, Clone)]
pub struct Batch {
    /// Nodes, merged first
    pub nodes: Vec<Node>,
    /// Edges, merged after all nodes of the batch
    pub edges: Vec<Edge>,
}

impl Batch {
    /// Constructs an empty batch with room for `capacity` items
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: Vec::with_capacity(capacity),
            edges: Vec::with_capacity(capacity),
        }
    }

    /// Returns the total number of nodes and edges
    pub fn len(&self) -> usize {
        self.nodes.len() + self.edges.len()
    }

    /// Returns `true` if the batch contains neither nodes nor edges
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    /// Removes all nodes and edges
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.edges.clear();
    }
}

/// A transactional graph store
///
/// Implementors must merge nodes by `(label, id)` and edges by
/// `(kind, from, to)`. Properties of a merged item are overwritten,
/// properties that are not part of the upsert stay unchanged.
///
/// Edges whose endpoints do not exist are silently dropped.
///
/// Each call to [`GraphSink::upsert_nodes`] and [`GraphSink::upsert_edges`]
/// must be atomic.
pub trait GraphSink {
    /// Merges all nodes into the store
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the store rejects the transaction.
    /// In this case no node of the call must be persisted.
    fn upsert_nodes(&mut self, nodes: &[Node]) -> SinkResult<()>;

    /// Merges all edges into the store
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the store rejects the transaction.
    /// In this case no edge of the call must be persisted.
    fn upsert_edges(&mut self, edges: &[Edge]) -> SinkResult<()>;

    /// Returns all nodes of the label, sorted by ID
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the store cannot be queried
    fn nodes(&self, label: NodeLabel) -> SinkResult<Vec<Node>>;

    /// Returns all edges of the kind, sorted by source and target ID
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the store cannot be queried
    fn edges(&self, kind: EdgeKind) -> SinkResult<Vec<Edge>>;

    /// Writes a batch, all nodes before all edges
    ///
    /// Edges can reference nodes of the same batch.
    ///
    /// The default implementation issues two separate upserts and is only
    /// atomic per call: if the edge upsert fails, the nodes of the batch
    /// are already persisted. Stores that can span a single transaction
    /// over both should override this method. Re-running the ingestion
    /// repairs a partially written batch, since all upserts are merges.
    ///
    /// # Errors
    ///
    /// Returns the first [`SinkError`] of the underlying upserts
    fn commit(&mut self, batch: &Batch) -> SinkResult<()> {
        if !batch.nodes.is_empty() {
            self.upsert_nodes(&batch.nodes)?;
        }
        if !batch.edges.is_empty() {
            self.upsert_edges(&batch.edges)?;
        }
        Ok(())
    }

    /// Aggregated statistics of the current graph
    ///
    /// # Errors
    ///
    /// Returns a [`SinkError`] if the store cannot be queried
    fn summary(&self) -> SinkResult<GraphSummary> {
        GraphSummary::collect(self)
    }
}

//! Batched, idempotent ingestion of parsed records into a [`GraphSink`]
//!
//! Every record is translated into node and edge upserts. The upserts are
//! collected in a [`Batch`] that is committed as soon as `batch_size`
//! records were added to it. A record is never split across two batches,
//! no matter how many upserts it contributes.
//!
//! Since the sink merges nodes by ID and edges by their endpoints, running
//! the same input twice leaves the graph unchanged.

use tracing::{debug, error, info};

use crate::config::PipelineConfig;
use crate::sink::{keys, Batch, Edge, EdgeKind, GraphSink, Node, NodeLabel};
use crate::term::{Annotation, CategoryRules, Term};
use crate::{GraphError, GraphResult};

/// A single parsed record
#[derive(Debug, Clone, PartialEq)]
pub enum IngestRecord {
    /// An ontology term from `hp.obo`
    Term(Term),
    /// A disease - phenotype association from `phenotype.hpoa`
    Annotation(Annotation),
}

impl From<Term> for IngestRecord {
    fn from(term: Term) -> Self {
        IngestRecord::Term(term)
    }
}

impl From<Annotation> for IngestRecord {
    fn from(annotation: Annotation) -> Self {
        IngestRecord::Annotation(annotation)
    }
}

/// Counts of a finished ingestion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Number of records that were added to a batch
    pub records: usize,
    /// Number of records that were ignored, e.g. negated annotations
    pub skipped: usize,
    /// Number of committed batches
    pub batches: usize,
    /// Number of node upserts sent to the sink
    pub nodes: usize,
    /// Number of edge upserts sent to the sink
    pub edges: usize,
}

/// Converts a term into its `Phenotype` node
pub fn term_node(term: &Term, categories: &CategoryRules, timestamp: i64) -> Node {
    Node::new(NodeLabel::Phenotype, term.id().as_str())
        .with(keys::NAME, term.name())
        .with(keys::DEFINITION, term.definition())
        .with(keys::COMMENT, term.comment())
        .with(keys::SYNONYMS, term.synonyms())
        .with(keys::XREFS, term.xrefs())
        .with(keys::CATEGORY, categories.classify(term.id().as_str()))
        .with(keys::CREATED_AT, timestamp)
        .with(keys::MODIFIED_AT, timestamp)
}

/// Converts the parents of a term into `IS_A` edges
pub fn term_edges(term: &Term, timestamp: i64) -> impl Iterator<Item = Edge> + '_ {
    term.parents().iter().map(move |parent| {
        Edge::new(EdgeKind::IsA, term.id().as_str(), parent.as_str())
            .with(keys::CONFIDENCE_SCORE, 1.0)
            .with(keys::RELATIONSHIP_TYPE, "direct")
            .with(keys::CREATED_AT, timestamp)
    })
}

/// Converts an annotation into its `Disease` node
pub fn disease_node(annotation: &Annotation, timestamp: i64) -> Node {
    Node::new(NodeLabel::Disease, annotation.disease_id.as_str())
        .with(keys::NAME, annotation.disease_name.as_str())
        .with(keys::MODIFIED_AT, timestamp)
}

/// Converts an annotation into its `HAS_PHENOTYPE` edge
pub fn phenotype_edge(annotation: &Annotation, timestamp: i64) -> Edge {
    Edge::new(
        EdgeKind::HasPhenotype,
        annotation.disease_id.as_str(),
        annotation.phenotype_id.as_str(),
    )
    .with(keys::QUALIFIER, annotation.qualifier.as_str())
    .with(keys::EVIDENCE, annotation.evidence.as_str())
    .with(keys::FREQUENCY, annotation.frequency.as_str())
    .with(keys::ONSET, annotation.onset.as_str())
    .with(keys::CREATED_AT, timestamp)
}

/// Accumulates records into batches and commits them to a [`GraphSink`]
///
/// The first failing commit aborts the run with [`GraphError::Batch`].
/// Batches that were committed before stay in the sink.
///
/// # Examples
///
/// ```
/// use phenograph::ingest::BatchIngestor;
/// use phenograph::sink::{EdgeKind, NodeLabel};
/// use phenograph::{MemoryGraph, PipelineConfig, Term};
///
/// let root = Term::new("HP:0000001", "All");
/// let mut child = Term::new("HP:0000118", "Phenotypic abnormality");
/// child.add_parent("HP:0000001");
///
/// let config = PipelineConfig::default().batch_size(2);
/// let mut graph = MemoryGraph::new();
/// let mut ingestor = BatchIngestor::new(&mut graph, &config);
/// ingestor.push(root).unwrap();
/// ingestor.push(child).unwrap();
/// let report = ingestor.finish().unwrap();
///
/// assert_eq!(report.records, 2);
/// assert_eq!(report.batches, 1);
/// assert_eq!(graph.node_count(NodeLabel::Phenotype), 2);
/// assert_eq!(graph.edge_count(EdgeKind::IsA), 1);
/// ```
pub struct BatchIngestor<'a, S: GraphSink + ?Sized> {
    sink: &'a mut S,
    config: &'a PipelineConfig,
    batch: Batch,
    pending: usize,
    deferred: Vec<Edge>,
    report: IngestReport,
}

impl<'a, S: GraphSink + ?Sized> BatchIngestor<'a, S> {
    /// Constructs a new ingestor writing to `sink`
    pub fn new(sink: &'a mut S, config: &'a PipelineConfig) -> Self {
        Self {
            sink,
            config,
            batch: Batch::with_capacity(config.get_batch_size()),
            pending: 0,
            deferred: Vec::new(),
            report: IngestReport::default(),
        }
    }

    /// Number of records added so far
    pub fn processed(&self) -> usize {
        self.report.records
    }

    /// Adds a record and commits the batch once it is full
    ///
    /// # Errors
    ///
    /// [`GraphError::Batch`] if the sink rejects the commit
    pub fn push<R: Into<IngestRecord>>(&mut self, record: R) -> GraphResult<()> {
        let timestamp = self.config.get_timestamp();
        match record.into() {
            IngestRecord::Term(term) => {
                self.batch.nodes.push(term_node(
                    &term,
                    self.config.get_categories(),
                    timestamp,
                ));
                if self.config.get_defer_edges() {
                    self.deferred.extend(term_edges(&term, timestamp));
                } else {
                    self.batch.edges.extend(term_edges(&term, timestamp));
                }
            }
            IngestRecord::Annotation(annotation) => {
                if self.config.get_skip_negated() && annotation.is_negated() {
                    self.report.skipped += 1;
                    return Ok(());
                }
                self.batch.nodes.push(disease_node(&annotation, timestamp));
                self.batch.edges.push(phenotype_edge(&annotation, timestamp));
            }
        }
        self.report.records += 1;
        self.pending += 1;

        if self.pending >= self.config.get_batch_size() {
            self.commit()?;
        }
        Ok(())
    }

    /// Adds all records of a parser
    ///
    /// # Errors
    ///
    /// - Any error of the parser, e.g. [`GraphError::Io`]
    /// - [`GraphError::Batch`] if the sink rejects a commit
    pub fn ingest<I, R>(&mut self, records: I) -> GraphResult<()>
    where
        I: IntoIterator<Item = GraphResult<R>>,
        R: Into<IngestRecord>,
    {
        for record in records {
            self.push(record?)?;
        }
        Ok(())
    }

    /// Commits the remaining partial batch and all deferred edges
    ///
    /// Deferred edges are committed in chunks of `batch_size` edges.
    ///
    /// # Errors
    ///
    /// [`GraphError::Batch`] if the sink rejects a commit
    pub fn finish(mut self) -> GraphResult<IngestReport> {
        self.commit()?;

        let deferred = std::mem::take(&mut self.deferred);
        for chunk in deferred.chunks(self.config.get_batch_size().max(1)) {
            self.batch.edges.extend_from_slice(chunk);
            self.commit()?;
        }

        info!(
            "Ingested {} records in {} batches ({} nodes, {} edges)",
            self.report.records, self.report.batches, self.report.nodes, self.report.edges
        );
        Ok(self.report)
    }

    fn commit(&mut self) -> GraphResult<()> {
        if self.batch.is_empty() {
            return Ok(());
        }
        let number = self.report.batches + 1;
        if let Err(err) = self.sink.commit(&self.batch) {
            error!("Batch #{} failed: {}", number, err);
            return Err(GraphError::Batch {
                batch: number,
                source: err,
            });
        }
        self.report.batches = number;
        self.report.nodes += self.batch.nodes.len();
        self.report.edges += self.batch.edges.len();
        debug!(
            "Committed batch #{} with {} records ({} items), {} records processed",
            number,
            self.pending,
            self.batch.len(),
            self.report.records
        );
        self.batch.clear();
        self.pending = 0;
        Ok(())
    }
}

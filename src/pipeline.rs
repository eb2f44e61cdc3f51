//! Runs ingestion and analytics in their fixed order
//!
//! 1. ingest all terms of `hp.obo`
//! 2. ingest all annotations of `phenotype.hpoa`
//! 3. run all [`analytics`](`crate::analytics`) passes
//! 4. collect the [`GraphSummary`]

use std::path::Path;

use tracing::{error, info};

use crate::analytics::{self, AnalyticsReport};
use crate::config::PipelineConfig;
use crate::ingest::{BatchIngestor, IngestReport};
use crate::parser::{read_hpoa_file, read_obo_file};
use crate::sink::{GraphSink, GraphSummary};
use crate::term::{Annotation, Term};
use crate::GraphResult;

/// Counts of a complete pipeline run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PipelineReport {
    /// Ingestion of the ontology terms
    pub terms: IngestReport,
    /// Ingestion of the disease annotations
    pub annotations: IngestReport,
    /// All analytics passes
    pub analytics: AnalyticsReport,
    /// The state of the graph after the run
    pub summary: GraphSummary,
}

/// Drives a full run against a [`GraphSink`]
///
/// # Examples
///
/// ```
/// use phenograph::{MemoryGraph, Pipeline, PipelineConfig};
///
/// let mut graph = MemoryGraph::new();
/// let mut pipeline = Pipeline::new(&mut graph, PipelineConfig::default()).unwrap();
/// let report = pipeline.run_files("tests/small.obo", "tests/small.hpoa").unwrap();
///
/// assert_eq!(report.terms.records, 8);
/// println!("{}", report.summary);
/// ```
pub struct Pipeline<'a, S: GraphSink + ?Sized> {
    sink: &'a mut S,
    config: PipelineConfig,
}

impl<'a, S: GraphSink + ?Sized> Pipeline<'a, S> {
    /// Constructs a new pipeline
    ///
    /// # Errors
    ///
    /// [`GraphError::InvalidConfig`](`crate::GraphError::InvalidConfig`) if the configuration is not usable
    pub fn new(sink: &'a mut S, config: PipelineConfig) -> GraphResult<Self> {
        config.validate()?;
        Ok(Self { sink, config })
    }

    /// The configuration of the pipeline
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Writes all terms and their `IS_A` edges
    ///
    /// # Errors
    ///
    /// - Any error of the term source
    /// - [`GraphError::Batch`](`crate::GraphError::Batch`) if the sink rejects a batch
    pub fn ingest_terms<I>(&mut self, terms: I) -> GraphResult<IngestReport>
    where
        I: IntoIterator<Item = GraphResult<Term>>,
    {
        let mut ingestor = BatchIngestor::new(&mut *self.sink, &self.config);
        ingestor.ingest(terms)?;
        ingestor.finish()
    }

    /// Writes all diseases and their `HAS_PHENOTYPE` edges
    ///
    /// # Errors
    ///
    /// - Any error of the annotation source
    /// - [`GraphError::Batch`](`crate::GraphError::Batch`) if the sink rejects a batch
    pub fn ingest_annotations<I>(&mut self, annotations: I) -> GraphResult<IngestReport>
    where
        I: IntoIterator<Item = GraphResult<Annotation>>,
    {
        let mut ingestor = BatchIngestor::new(&mut *self.sink, &self.config);
        ingestor.ingest(annotations)?;
        ingestor.finish()
    }

    /// Runs all analytics passes on the current graph
    ///
    /// # Errors
    ///
    /// [`GraphError::Sink`](`crate::GraphError::Sink`) if the sink fails
    pub fn analyze(&mut self) -> GraphResult<AnalyticsReport> {
        analytics::run(&mut *self.sink, &self.config)
    }

    /// Aggregated statistics of the current graph
    ///
    /// # Errors
    ///
    /// [`GraphError::Sink`](`crate::GraphError::Sink`) if the sink cannot be queried
    pub fn summary(&self) -> GraphResult<GraphSummary> {
        Ok(self.sink.summary()?)
    }

    /// Ingests both sources and runs all analytics
    ///
    /// # Errors
    ///
    /// Stops at the first error, see [`Pipeline::ingest_terms`],
    /// [`Pipeline::ingest_annotations`] and [`Pipeline::analyze`]
    pub fn run<T, A>(&mut self, terms: T, annotations: A) -> GraphResult<PipelineReport>
    where
        T: IntoIterator<Item = GraphResult<Term>>,
        A: IntoIterator<Item = GraphResult<Annotation>>,
    {
        let terms = logged("Term ingestion", self.ingest_terms(terms))?;
        let annotations = logged("Annotation ingestion", self.ingest_annotations(annotations))?;
        let analytics = logged("Analytics", self.analyze())?;
        let summary = logged("Summary", self.summary())?;
        info!(
            "Pipeline finished: {} terms, {} annotations, {} associations",
            terms.records, annotations.records, analytics.associations.edges
        );
        Ok(PipelineReport {
            terms,
            annotations,
            analytics,
            summary,
        })
    }

    /// Reads `hp.obo` and `phenotype.hpoa` and runs the whole pipeline
    ///
    /// # Errors
    ///
    /// [`GraphError::CannotOpenFile`](`crate::GraphError::CannotOpenFile`) if
    /// a file is missing, otherwise see [`Pipeline::run`]
    pub fn run_files<P: AsRef<Path>, Q: AsRef<Path>>(
        &mut self,
        obo: P,
        hpoa: Q,
    ) -> GraphResult<PipelineReport> {
        let terms = logged("Reading hp.obo", read_obo_file(obo))?;
        let annotations = logged("Reading phenotype.hpoa", read_hpoa_file(hpoa))?;
        self.run(terms, annotations)
    }
}

/// Logs a failed pipeline stage and passes the result on
fn logged<T>(stage: &str, res: GraphResult<T>) -> GraphResult<T> {
    if let Err(err) = &res {
        error!("{} failed: {}", stage, err);
    }
    res
}

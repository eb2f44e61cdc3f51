//! Builds a phenotype graph from the Human Phenotype Ontology
//!
//! Terms from `hp.obo` and disease annotations from `phenotype.hpoa` are
//! written to a [`GraphSink`] in batches. On top of the ingested graph the
//! [`analytics`] passes mine co-occurrence edges between phenotypes, assign
//! clusters and calculate centrality measures.
//!
//! ```
//! use phenograph::{MemoryGraph, Pipeline, PipelineConfig};
//! use phenograph::sink::EdgeKind;
//!
//! let config = PipelineConfig::default().min_co_occurrence(2);
//! let mut graph = MemoryGraph::new();
//! let report = Pipeline::new(&mut graph, config)
//!     .unwrap()
//!     .run_files("tests/small.obo", "tests/small.hpoa")
//!     .unwrap();
//!
//! assert!(report.summary.edges(EdgeKind::IsA) > 0);
//! assert!(graph.edge_count(EdgeKind::AssociatedWith) > 0);
//! ```
//!
//! [`QueryIndex`] answers hierarchy and co-occurrence questions
//! directly from the source files, without any graph store.
#![warn(missing_docs)]

use thiserror::Error;

pub mod analytics;
pub mod config;
pub mod index;
pub mod ingest;
pub mod parser;
pub mod pipeline;
pub mod sink;
pub mod term;
pub mod utils;

pub use config::PipelineConfig;
pub use index::QueryIndex;
pub use pipeline::{Pipeline, PipelineReport};
pub use sink::{GraphSink, MemoryGraph};
pub use term::{Annotation, CategoryRules, DiseaseId, Term, TermId};

use sink::SinkError;

const DEFAULT_NUM_PARENTS: usize = 2;
const DEFAULT_BATCH_SIZE: usize = 1000;
const DEFAULT_PAGE_SIZE: usize = 100;
const DEFAULT_MIN_CO_OCCURRENCE: usize = 5;
const DEFAULT_HUB_THRESHOLD: usize = 10;
const DEFAULT_MAX_HOPS: usize = 3;
const FALLBACK_CATEGORY: &str = "Other";

/// Main Error type for this crate
#[derive(Error, Debug)]
pub enum GraphError {
    /// Failed to open a source file
    #[error("unable to open file {0}")]
    CannotOpenFile(String),
    /// Reading from an opened source failed
    #[error("unable to read input: {0}")]
    Io(String),
    /// The pipeline configuration is not usable
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    /// A batch transaction was rejected by the graph sink
    ///
    /// This error aborts the whole ingestion run. Batches that were
    /// committed before remain in the sink.
    #[error("batch #{batch} could not be committed")]
    Batch {
        /// The sequence number of the failed batch, starting at 1
        batch: usize,
        /// The error reported by the sink
        #[source]
        source: SinkError,
    },
    /// Reading from or writing to the sink failed outside of ingestion
    #[error(transparent)]
    Sink(#[from] SinkError),
}

impl From<std::io::Error> for GraphError {
    fn from(err: std::io::Error) -> Self {
        GraphError::Io(err.to_string())
    }
}

/// Shortcut for `Result<T, GraphError>`
pub type GraphResult<T> = Result<T, GraphError>;

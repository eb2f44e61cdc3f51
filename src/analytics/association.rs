//! Mines `ASSOCIATED_WITH` edges between co-occurring phenotypes
//!
//! Two phenotypes co-occur if they are linked to the same disease. For
//! every anchor phenotype `p1` and every other phenotype `p2`, the number
//! of shared diseases is counted. Pairs that share at least
//! `min_co_occurrence` diseases get an edge `p1 -> p2` with
//!
//! - `co_occurrence_count`: number of shared diseases
//! - `correlation_strength`: shared diseases / all diseases of `p1`
//!
//! The strength is normalized by the anchor only, so `p1 -> p2` and
//! `p2 -> p1` usually have different strengths.

use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;
use tracing::{debug, info};

use crate::analytics::{phenotype_ids, ratio};
use crate::config::PipelineConfig;
use crate::sink::{keys, Edge, EdgeKind, GraphSink};
use crate::GraphResult;

/// Counts of the association mining
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AssociationReport {
    /// Number of pages of anchor phenotypes
    pub pages: usize,
    /// Number of `ASSOCIATED_WITH` edges written
    pub edges: usize,
}

/// Diseases per phenotype and phenotypes per disease
struct CoOccurrence<'a> {
    diseases: HashMap<&'a str, Vec<&'a str>>,
    phenotypes: HashMap<&'a str, Vec<&'a str>>,
}

impl<'a> CoOccurrence<'a> {
    fn new(has_phenotype: &'a [Edge]) -> Self {
        let mut diseases: HashMap<&str, Vec<&str>> = HashMap::new();
        let mut phenotypes: HashMap<&str, Vec<&str>> = HashMap::new();
        for edge in has_phenotype {
            diseases
                .entry(edge.to.as_str())
                .or_default()
                .push(edge.from.as_str());
            phenotypes
                .entry(edge.from.as_str())
                .or_default()
                .push(edge.to.as_str());
        }
        Self {
            diseases,
            phenotypes,
        }
    }

    /// Number of `HAS_PHENOTYPE` edges of the phenotype
    fn total_occurrences(&self, phenotype: &str) -> usize {
        self.diseases.get(phenotype).map_or(0, Vec::len)
    }

    /// Number of shared diseases for every other phenotype, sorted by ID
    fn counts(&self, anchor: &str) -> BTreeMap<&'a str, usize> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for disease in self.diseases.get(anchor).into_iter().flatten() {
            for other in self.phenotypes.get(disease).into_iter().flatten() {
                if *other != anchor {
                    *counts.entry(*other).or_default() += 1;
                }
            }
        }
        counts
    }

    fn edges(&self, anchor: &str, config: &PipelineConfig) -> Vec<Edge> {
        let total = self.total_occurrences(anchor);
        self.counts(anchor)
            .into_iter()
            .filter(|(_, count)| *count >= config.get_min_co_occurrence())
            .map(|(other, count)| {
                Edge::new(EdgeKind::AssociatedWith, anchor, other)
                    .with(keys::CO_OCCURRENCE_COUNT, count)
                    .with(keys::CORRELATION_STRENGTH, ratio(count, total))
                    .with(keys::CREATED_AT, config.get_timestamp())
            })
            .collect()
    }
}

/// Calculates all associations and writes them to the sink
///
/// Anchors are processed in pages of `page_size` phenotypes, every page
/// is written with a single `upsert_edges` call.
///
/// # Errors
///
/// Returns [`GraphError::Sink`](`crate::GraphError::Sink`) if the sink
/// cannot be read or rejects a page
pub fn mine<S: GraphSink + ?Sized>(
    sink: &mut S,
    config: &PipelineConfig,
) -> GraphResult<AssociationReport> {
    let ids = phenotype_ids(&*sink)?;
    let has_phenotype = sink.edges(EdgeKind::HasPhenotype)?;
    let co_occurrence = CoOccurrence::new(&has_phenotype);

    let mut report = AssociationReport::default();
    for page in ids.chunks(config.get_page_size().max(1)) {
        let edges: Vec<Edge> = page
            .par_iter()
            .map(|anchor| co_occurrence.edges(anchor, config))
            .collect::<Vec<Vec<Edge>>>()
            .into_iter()
            .flatten()
            .collect();

        if !edges.is_empty() {
            sink.upsert_edges(&edges)?;
        }
        report.pages += 1;
        report.edges += edges.len();
        debug!(
            "Association page #{}: {} edges for {} phenotypes",
            report.pages,
            edges.len(),
            page.len()
        );
    }
    info!(
        "Mined {} associations in {} pages",
        report.edges, report.pages
    );
    Ok(report)
}

//! Derived structure on top of the ingested graph
//!
//! All analytics run as separate passes. Each pass reads its input
//! fresh from the [`GraphSink`] and writes its results back as node or
//! edge properties. Per-term calculations within a pass run in parallel,
//! the results are written in ID order.
//!
//! All values are recalculated on every run, running the passes twice on
//! an unchanged graph yields identical values.

use std::collections::{BTreeSet, HashMap};

use crate::config::PipelineConfig;
use crate::sink::{Edge, GraphSink, Node, NodeLabel};
use crate::GraphResult;

pub mod association;
pub mod centrality;
pub mod cluster;
pub mod metrics;

pub use association::AssociationReport;
pub use centrality::CentralityReport;
pub use cluster::ClusterReport;

/// Summary of all analytics passes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnalyticsReport {
    /// Result of the association mining
    pub associations: AssociationReport,
    /// Result of the cluster assignment
    pub clusters: ClusterReport,
    /// Result of the centrality pass
    pub centrality: CentralityReport,
    /// Number of phenotypes that received composite metrics
    pub metrics: usize,
}

#[cfg_attr(doc, aquamarine::aquamarine)]
/// Runs all analytics passes in their fixed order
///
/// ```mermaid
/// flowchart LR
///     A[association mining] --> B[cluster assignment]
///     B --> C[cross-cluster strength]
///     C --> D[centrality, hubs, clustering coefficient]
///     D --> E[composite metrics]
/// ```
///
/// # Errors
///
/// Returns [`GraphError::Sink`](`crate::GraphError::Sink`) if any read or write of the sink fails.
/// Passes that completed before keep their results.
pub fn run<S: GraphSink + ?Sized>(
    sink: &mut S,
    config: &PipelineConfig,
) -> GraphResult<AnalyticsReport> {
    let associations = association::mine(sink, config)?;
    let mut clusters = cluster::assign(sink, config)?;
    clusters.cross_cluster_edges = cluster::cross_cluster_strength(sink, config)?;
    let centrality = centrality::compute(sink, config)?;
    let metrics = metrics::compute(sink, config)?;
    Ok(AnalyticsReport {
        associations,
        clusters,
        centrality,
        metrics,
    })
}

/// IDs of all phenotype nodes, sorted
fn phenotype_ids<S: GraphSink + ?Sized>(sink: &S) -> GraphResult<Vec<String>> {
    let mut ids: Vec<String> = sink
        .nodes(NodeLabel::Phenotype)?
        .into_iter()
        .map(|node| node.id)
        .collect();
    ids.sort_unstable();
    Ok(ids)
}

/// Number of edges pointing to each node
fn count_targets(edges: &[Edge]) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for edge in edges {
        *counts.entry(edge.to.as_str()).or_default() += 1;
    }
    counts
}

/// Number of edges starting or ending at each node
fn count_incident(edges: &[Edge]) -> HashMap<&str, usize> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for edge in edges {
        *counts.entry(edge.from.as_str()).or_default() += 1;
        *counts.entry(edge.to.as_str()).or_default() += 1;
    }
    counts
}

/// Distinct neighbors of each node, ignoring the edge direction
fn undirected_neighbors(edges: &[Edge]) -> HashMap<&str, BTreeSet<&str>> {
    let mut neighbors: HashMap<&str, BTreeSet<&str>> = HashMap::new();
    for edge in edges.iter().filter(|edge| edge.from != edge.to) {
        neighbors
            .entry(edge.from.as_str())
            .or_default()
            .insert(edge.to.as_str());
        neighbors
            .entry(edge.to.as_str())
            .or_default()
            .insert(edge.from.as_str());
    }
    neighbors
}

/// Writes the nodes in chunks of the configured batch size
fn write_nodes<S: GraphSink + ?Sized>(
    sink: &mut S,
    nodes: &[Node],
    config: &PipelineConfig,
) -> GraphResult<()> {
    for chunk in nodes.chunks(config.get_batch_size().max(1)) {
        sink.upsert_nodes(chunk)?;
    }
    Ok(())
}

/// Writes the edges in chunks of the configured batch size
fn write_edges<S: GraphSink + ?Sized>(
    sink: &mut S,
    edges: &[Edge],
    config: &PipelineConfig,
) -> GraphResult<()> {
    for chunk in edges.chunks(config.get_batch_size().max(1)) {
        sink.upsert_edges(chunk)?;
    }
    Ok(())
}

#[allow(clippy::cast_precision_loss)]
fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

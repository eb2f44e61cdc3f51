//! Groups phenotypes into clusters and weighs edges between clusters
//!
//! A cluster is the set of all phenotypes of the same category.

use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;
use tracing::info;

use crate::analytics::{ratio, write_edges, write_nodes};
use crate::config::PipelineConfig;
use crate::sink::{keys, Edge, EdgeKind, GraphSink, Node, NodeLabel};
use crate::GraphResult;

/// Counts of the cluster passes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ClusterReport {
    /// Number of distinct clusters
    pub clusters: usize,
    /// Number of phenotypes that were assigned a cluster
    pub phenotypes: usize,
    /// Number of `ASSOCIATED_WITH` edges that connect different clusters
    pub cross_cluster_edges: usize,
}

fn text<'a>(node: &'a Node, key: &str) -> Option<&'a str> {
    node.get(key).and_then(|value| value.as_str())
}

/// Assigns `cluster_id` and `cluster_size` to every phenotype
///
/// The cluster is the `category` of the phenotype, phenotypes without
/// a category belong to the fallback cluster.
///
/// # Errors
///
/// Returns [`GraphError::Sink`](`crate::GraphError::Sink`) if the sink
/// cannot be read or rejects the update
pub fn assign<S: GraphSink + ?Sized>(
    sink: &mut S,
    config: &PipelineConfig,
) -> GraphResult<ClusterReport> {
    let fallback = config.get_categories().fallback();
    let phenotypes = sink.nodes(NodeLabel::Phenotype)?;

    let mut sizes: BTreeMap<&str, usize> = BTreeMap::new();
    for node in &phenotypes {
        *sizes
            .entry(text(node, keys::CATEGORY).unwrap_or(fallback))
            .or_default() += 1;
    }

    let updates: Vec<Node> = phenotypes
        .iter()
        .map(|node| {
            let cluster = text(node, keys::CATEGORY).unwrap_or(fallback);
            Node::new(NodeLabel::Phenotype, &node.id)
                .with(keys::CLUSTER_ID, cluster)
                .with(keys::CLUSTER_SIZE, sizes.get(cluster).copied().unwrap_or_default())
        })
        .collect();
    write_nodes(sink, &updates, config)?;

    info!(
        "Assigned {} phenotypes to {} clusters",
        updates.len(),
        sizes.len()
    );
    Ok(ClusterReport {
        clusters: sizes.len(),
        phenotypes: updates.len(),
        cross_cluster_edges: 0,
    })
}

/// Flags `ASSOCIATED_WITH` edges between different clusters
///
/// Edges across clusters get `cross_cluster = true` and a
/// `cluster_connection_strength` of the co-occurrence count divided by
/// the size of both clusters. Edges within a cluster get `false` and `0.0`.
///
/// Returns the number of cross-cluster edges.
///
/// # Errors
///
/// Returns [`GraphError::Sink`](`crate::GraphError::Sink`) if the sink
/// cannot be read or rejects the update
pub fn cross_cluster_strength<S: GraphSink + ?Sized>(
    sink: &mut S,
    config: &PipelineConfig,
) -> GraphResult<usize> {
    let fallback = config.get_categories().fallback();
    let phenotypes = sink.nodes(NodeLabel::Phenotype)?;
    let clusters: HashMap<&str, (&str, usize)> = phenotypes
        .iter()
        .map(|node| {
            let cluster = text(node, keys::CLUSTER_ID).unwrap_or(fallback);
            let size = node
                .get(keys::CLUSTER_SIZE)
                .and_then(|value| value.as_i64())
                .and_then(|size| usize::try_from(size).ok())
                .unwrap_or_default();
            (node.id.as_str(), (cluster, size))
        })
        .collect();
    let cluster_of = |id: &str| clusters.get(id).copied().unwrap_or((fallback, 0));

    let associations = sink.edges(EdgeKind::AssociatedWith)?;
    let updates: Vec<Edge> = associations
        .par_iter()
        .map(|edge| {
            let (cluster1, size1) = cluster_of(&edge.from);
            let (cluster2, size2) = cluster_of(&edge.to);
            let update = Edge::new(EdgeKind::AssociatedWith, &edge.from, &edge.to);
            if cluster1 == cluster2 {
                return update
                    .with(keys::CROSS_CLUSTER, false)
                    .with(keys::CLUSTER_CONNECTION_STRENGTH, 0.0);
            }
            let count = edge
                .get(keys::CO_OCCURRENCE_COUNT)
                .and_then(|value| value.as_i64())
                .and_then(|count| usize::try_from(count).ok())
                .unwrap_or_default();
            update
                .with(keys::CROSS_CLUSTER, true)
                .with(
                    keys::CLUSTER_CONNECTION_STRENGTH,
                    ratio(count, size1 + size2),
                )
        })
        .collect();
    write_edges(sink, &updates, config)?;

    let cross = updates
        .iter()
        .filter(|edge| {
            edge.get(keys::CROSS_CLUSTER)
                .and_then(|value| value.as_bool())
                .unwrap_or(false)
        })
        .count();
    info!(
        "{} of {} associations connect different clusters",
        cross,
        updates.len()
    );
    Ok(cross)
}

//! Centrality measures of phenotypes
//!
//! - `degree_centrality`: number of linked diseases
//! - `betweenness_score`: number of other phenotypes reachable within
//!   `max_hops` association hops. This is a cheap bounded approximation,
//!   not the exact betweenness centrality.
//! - `is_hub`: more than `hub_threshold` incident associations
//! - `cluster_coefficient`: local clustering coefficient of the
//!   association graph
//!
//! `ASSOCIATED_WITH` edges are treated as undirected for all measures.

use std::collections::{BTreeSet, HashMap, HashSet};

use rayon::prelude::*;
use tracing::info;

use crate::analytics::{
    count_incident, count_targets, phenotype_ids, ratio, undirected_neighbors, write_nodes,
};
use crate::config::PipelineConfig;
use crate::sink::{keys, EdgeKind, GraphSink, Node, NodeLabel};
use crate::utils::Combinations;
use crate::GraphResult;

type Neighbors<'a> = HashMap<&'a str, BTreeSet<&'a str>>;

/// Counts of the centrality pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CentralityReport {
    /// Number of phenotypes that were updated
    pub phenotypes: usize,
    /// Number of hubs
    pub hubs: usize,
}

/// Number of distinct nodes within `max_hops` of `start`, excluding `start`
pub(crate) fn reachable<'a>(start: &'a str, neighbors: &Neighbors<'a>, max_hops: usize) -> usize {
    let mut visited: HashSet<&str> = HashSet::from([start]);
    let mut frontier: Vec<&str> = vec![start];
    for _ in 0..max_hops {
        let mut next = Vec::new();
        for id in frontier {
            for neighbor in neighbors.get(id).into_iter().flatten() {
                if visited.insert(*neighbor) {
                    next.push(*neighbor);
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = next;
    }
    visited.len() - 1
}

/// `2T / (n * (n - 1))` with `T` connected pairs of the `n` neighbors
///
/// Returns `0.0` for less than two neighbors.
pub(crate) fn clustering_coefficient(id: &str, neighbors: &Neighbors<'_>) -> f64 {
    let Some(own) = neighbors.get(id) else {
        return 0.0;
    };
    let n = own.len();
    if n <= 1 {
        return 0.0;
    }
    let own: Vec<&str> = own.iter().copied().collect();
    let triangles = Combinations::new(&own)
        .filter(|(a, b)| neighbors.get(*a).is_some_and(|set| set.contains(*b)))
        .count();
    ratio(2 * triangles, n * (n - 1))
}

/// Calculates the centrality measures of every phenotype
///
/// Phenotypes without any edges get `0` and `false`.
///
/// # Errors
///
/// Returns [`GraphError::Sink`](`crate::GraphError::Sink`) if the sink
/// cannot be read or rejects the update
pub fn compute<S: GraphSink + ?Sized>(
    sink: &mut S,
    config: &PipelineConfig,
) -> GraphResult<CentralityReport> {
    let ids = phenotype_ids(&*sink)?;
    let has_phenotype = sink.edges(EdgeKind::HasPhenotype)?;
    let associations = sink.edges(EdgeKind::AssociatedWith)?;

    let degrees = count_targets(&has_phenotype);
    let incident = count_incident(&associations);
    let neighbors = undirected_neighbors(&associations);

    let updates: Vec<Node> = ids
        .par_iter()
        .map(|id| {
            let id = id.as_str();
            let associated = incident.get(id).copied().unwrap_or_default();
            Node::new(NodeLabel::Phenotype, id)
                .with(
                    keys::DEGREE_CENTRALITY,
                    degrees.get(id).copied().unwrap_or_default(),
                )
                .with(
                    keys::BETWEENNESS_SCORE,
                    reachable(id, &neighbors, config.get_max_hops()),
                )
                .with(keys::IS_HUB, associated > config.get_hub_threshold())
                .with(
                    keys::CLUSTER_COEFFICIENT,
                    clustering_coefficient(id, &neighbors),
                )
        })
        .collect();
    write_nodes(sink, &updates, config)?;

    let hubs = updates
        .iter()
        .filter(|node| {
            node.get(keys::IS_HUB)
                .and_then(|value| value.as_bool())
                .unwrap_or(false)
        })
        .count();
    info!(
        "Centrality of {} phenotypes, {} hubs",
        updates.len(),
        hubs
    );
    Ok(CentralityReport {
        phenotypes: updates.len(),
        hubs,
    })
}

//! Builds the phenotype graph in memory and prints its summary
//!
//! ```bash
//! RUST_LOG=debug cargo run --example build_graph -- hp.obo phenotype.hpoa 5
//! ```
use std::process;

use phenograph::{MemoryGraph, Pipeline, PipelineConfig, QueryIndex};

fn main() {
    simple_logger::init_with_env().unwrap();

    let mut args = std::env::args().skip(1);
    let (Some(obo), Some(hpoa)) = (args.next(), args.next()) else {
        println!("Usage:\nbuild_graph <PATH TO hp.obo> <PATH TO phenotype.hpoa> [<MIN CO-OCCURRENCE>]");
        process::exit(1)
    };
    let min_co_occurrence = args
        .next()
        .map_or(5, |arg| arg.parse::<usize>().expect("co-occurrence must be an integer"));

    let config = PipelineConfig::default().min_co_occurrence(min_co_occurrence);
    let mut graph = MemoryGraph::new();
    let report = Pipeline::new(&mut graph, config)
        .and_then(|mut pipeline| pipeline.run_files(&obo, &hpoa))
        .unwrap_or_else(|err| {
            eprintln!("{err}");
            process::exit(1)
        });

    println!("{}", report.summary);
    println!(
        "{} edges were dropped because of missing endpoints",
        graph.dropped_edges()
    );

    let index = QueryIndex::from_files(&obo, &hpoa).unwrap();
    let term = "HP:0001250";
    println!("\nSymptoms related to {term}:");
    let mut related: Vec<_> = index.related_symptoms(term).into_iter().collect();
    related.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    for (id, count) in related.into_iter().take(10) {
        let name = index.term(id.as_str()).map_or("", |term| term.name());
        println!("{count}\t{id}\t{name}");
    }
}

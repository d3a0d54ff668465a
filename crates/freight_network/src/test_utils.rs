use jiff::SignedDuration;
use rand::Rng;

use crate::graph::StationGraph;

pub fn create_graph(stations: &[&str], edges: &[(&str, &str, i64)]) -> StationGraph {
    let mut graph = StationGraph::new();

    for &station in stations {
        graph.add_station(station).unwrap();
    }

    for &(from, to, minutes) in edges {
        graph
            .add_edge(
                format!("{from}-{to}"),
                from,
                to,
                SignedDuration::from_mins(minutes),
            )
            .unwrap();
    }

    graph
}

/// Stations chained one after another, `durations[i]` linking station `i` and `i + 1`.
pub fn create_line_graph(stations: &[&str], durations: &[i64]) -> StationGraph {
    let edges = stations
        .windows(2)
        .zip(durations)
        .map(|(pair, &minutes)| (pair[0], pair[1], minutes))
        .collect::<Vec<_>>();

    create_graph(stations, &edges)
}

/// A random spanning tree plus `extra_edges` random links, durations in 0..=30 minutes.
pub fn create_random_graph(
    rng: &mut impl Rng,
    stations: usize,
    extra_edges: usize,
) -> StationGraph {
    let mut graph = StationGraph::new();
    let names = (0..stations).map(|i| format!("S{i}")).collect::<Vec<_>>();

    for name in &names {
        graph.add_station(name.as_str()).unwrap();
    }

    for i in 1..stations {
        let parent = rng.random_range(0..i);
        let minutes = rng.random_range(0..=30);
        graph
            .add_edge(
                format!("tree-{i}"),
                &names[parent],
                &names[i],
                SignedDuration::from_mins(minutes),
            )
            .unwrap();
    }

    for i in 0..extra_edges {
        let from = rng.random_range(0..stations);
        let to = rng.random_range(0..stations);
        let minutes = rng.random_range(0..=30);
        graph
            .add_edge(
                format!("extra-{i}"),
                &names[from],
                &names[to],
                SignedDuration::from_mins(minutes),
            )
            .unwrap();
    }

    graph
}

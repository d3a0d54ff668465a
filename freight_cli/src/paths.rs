use std::path::PathBuf;

use clap::Args;
use comfy_table::{ContentArrangement, Table, presets::UTF8_FULL};
use freight_network::{ShortestPathTable, StationGraph};

use crate::problem_file;

#[derive(Args)]
pub struct PathsArgs {
    /// The problem file whose station graph is printed
    #[arg(short, long)]
    input: PathBuf,
}

fn adjacency_table(graph: &StationGraph) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Station", "Edges"]);

    for (idx, station) in graph.stations_iter() {
        let edges = graph
            .edges_from(idx)
            .iter()
            .map(|edge| {
                format!(
                    "{} -> {} ({:#})",
                    edge.name(),
                    graph.station_name(edge.to()),
                    edge.duration()
                )
            })
            .collect::<Vec<_>>();

        table.add_row(vec![station.name().to_owned(), edges.join("\n")]);
    }

    table
}

fn shortest_paths_table(graph: &StationGraph, paths: &ShortestPathTable) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["From", "To", "Time", "Path"]);

    for (from, origin) in graph.stations_iter() {
        for (to, destination) in graph.stations_iter() {
            let (time, path) = match paths.get(from, to) {
                Some(path) => (
                    format!("{:#}", path.distance()),
                    path.stations()
                        .iter()
                        .map(|&station| graph.station_name(station))
                        .collect::<Vec<_>>()
                        .join(" -> "),
                ),
                None => ("-".to_owned(), "unreachable".to_owned()),
            };

            table.add_row(vec![
                origin.name().to_owned(),
                destination.name().to_owned(),
                time,
                path,
            ]);
        }
    }

    table
}

pub fn run(args: PathsArgs) -> Result<(), anyhow::Error> {
    let problem = problem_file::load_problem(&args.input)?;

    println!("{}", adjacency_table(problem.graph()));
    println!("{}", shortest_paths_table(problem.graph(), problem.shortest_paths()));

    Ok(())
}

mod arena;
mod cli;
mod db;
mod error;
mod graph;
mod hops;
mod identity;
mod image;
mod path;
mod successor;

use std::process::ExitCode;

use clap::Parser;
use tracing::{info, warn};

use arena::{Arena, FpId};
use bt_types::format_mac_reversed;
use cli::Args;
use db::DbReader;
use error::CorrelatorError;
use identity::DEFAULT_MAX_DISTANCE_KM;
use path::{get_paths, PathResult};
use successor::{link_successors, SuccessorTunables};

fn run() -> Result<(), CorrelatorError> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bt_correlator=info".into()),
        )
        .init();

    let db = DbReader::open(&args.db_file)?;

    let macs = if args.all {
        db.get_all_macs()?
    } else {
        args.mac.clone()
    };
    if macs.is_empty() {
        warn!("no MAC addresses selected; pass -m/--mac or -a/--all");
        return Ok(());
    }

    for mac in macs {
        if let Err(e) = correlate_one(&mac, &args, &db) {
            warn!(mac, error = %e, "skipping MAC after error");
        }
    }

    Ok(())
}

fn correlate_one(mac: &str, args: &Args, db: &DbReader) -> Result<(), CorrelatorError> {
    let rows = if args.all {
        db.get_all_rows()?
            .into_iter()
            .filter(|r| format_mac_reversed(&r.mac) == mac)
            .collect()
    } else {
        db.get_mac_rows(mac)?
    };
    if rows.is_empty() {
        warn!(mac, "no fingerprints found");
        return Ok(());
    }

    let mut arena = Arena::from_rows(rows);
    let ids: Vec<FpId> = arena.ids().collect();

    let components = graph::get_components(&ids, &arena, db, DEFAULT_MAX_DISTANCE_KM);
    let paths = get_paths(&components, &arena, db, DEFAULT_MAX_DISTANCE_KM)?;

    link_successors(&mut arena, &ids, db, &SuccessorTunables::default());
    for result in &paths {
        hops::resolve_hops(&mut arena, result);
    }

    if args.correlation {
        print_correlation(mac, &components);
    }
    if args.path {
        print_paths(mac, &paths, &arena);
    }
    if args.image {
        print_images(mac, &paths, &arena, db)?;
    }
    if !args.correlation && !args.path && !args.image {
        print_chains(mac, &arena);
    }

    Ok(())
}

fn print_correlation(mac: &str, components: &[Vec<FpId>]) {
    info!(mac, components = components.len(), "correlation result");
    for (i, component) in components.iter().enumerate() {
        println!("{mac} component {i}: {} fingerprint(s)", component.len());
    }
}

fn print_paths(mac: &str, paths: &[PathResult], arena: &Arena) {
    for result in paths {
        let ids: Vec<String> = result.path.iter().map(|&id| arena.get(id).row.id.to_string()).collect();
        println!("{mac} path: {}", ids.join(" -> "));
        if !result.unused.is_empty() {
            println!(
                "{mac} unused: {}",
                result
                    .unused
                    .iter()
                    .map(|&id| arena.get(id).row.id.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
}

fn print_images(
    mac: &str,
    paths: &[PathResult],
    arena: &Arena,
    db: &DbReader,
) -> Result<(), CorrelatorError> {
    for result in paths {
        let url = image::build_static_map_url(&result.path, arena, db)?;
        println!("{mac} map: {url}");
    }
    Ok(())
}

fn print_chains(mac: &str, arena: &Arena) {
    for root in arena.chain_roots() {
        let mut chain = vec![root];
        let mut current = root;
        while let Some(next) = arena.get(current).antenna_hop {
            chain.push(next);
            current = next;
        }
        let ids: Vec<String> = chain.iter().map(|&id| arena.get(id).row.id.to_string()).collect();
        println!("{mac} chain: {}", ids.join(" -> "));
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

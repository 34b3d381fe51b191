use std::path::Path;

use ciplan_config::{Config, DEFAULT_CONFIG_FILE};
use ciplan_graph::discover_graph;

use super::ValidateArgs;
use crate::error::Result;

pub(crate) fn run(args: &ValidateArgs, start_path: &Path) -> Result<()> {
    // Graph discovery doubles as validation: cycles and duplicate package
    // names surface here, before the configuration is even read.
    let graph = discover_graph(start_path)?;

    let path = graph.root().join(DEFAULT_CONFIG_FILE);
    let config = Config::load(&path)?;

    println!(
        "{}: ok ({} surfaces, {} profiles, {} packages)",
        path.display(),
        config.surfaces().len(),
        config.profiles().len(),
        graph.len()
    );

    if args.strict {
        for warning in config.lint() {
            println!("warning: {warning}");
        }
    }

    Ok(())
}

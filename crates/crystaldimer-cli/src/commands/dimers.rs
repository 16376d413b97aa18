use super::{read_crystal, read_ledger, write_ledger};
use crate::cli::DimersArgs;
use crate::config::PartialConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use crystaldimer::core::io::ledger::DimerLedger;
use crystaldimer::core::models::crystal::Crystal;
use crystaldimer::core::models::dimer::Dimer;
use crystaldimer::engine::config::NeighborSearchConfig;
use crystaldimer::engine::progress::ProgressReporter;
use crystaldimer::workflows;
use tracing::{info, warn};

pub fn run(args: DimersArgs, show_progress: bool) -> Result<()> {
    let config = PartialConfig::load(args.config.as_deref(), &args.set_values)?;
    info!("Merging configuration from file and CLI arguments...");
    let search_config = config.merge_search_with_cli(&args.search)?;

    let crystal = read_crystal(&args.input)?;
    let previous = args.previous.as_deref().map(read_ledger).transpose()?;

    let dimers = search(&crystal, &search_config, previous.as_ref(), show_progress)?;
    write_ledger(&DimerLedger::from_dimers(&dimers), &args.output)?;
    println!(
        "✓ {} dimer(s) written to: {}",
        dimers.len(),
        args.output.display()
    );
    Ok(())
}

/// Runs the dimer workflow behind a progress display.
pub(crate) fn search(
    crystal: &Crystal,
    config: &NeighborSearchConfig,
    previous: Option<&DimerLedger>,
    show_progress: bool,
) -> Result<Vec<Dimer>> {
    let progress_handler = CliProgressHandler::new(show_progress);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Searching for dimers within {:.2} Å ({})...",
        config.cutoff, config.distance_policy
    );
    let result = workflows::dimers::run(crystal, config, previous, &reporter)?;

    if result.dimers.is_empty() {
        warn!("Search completed but no molecule pair is closer than the cutoff.");
        println!("Warning: no molecule pair is closer than the cutoff.");
    } else if let Some(nearest) = result.records.first() {
        info!(
            nearest = nearest.distance,
            molecule_1 = %nearest.candidate.molecule_1,
            molecule_2 = %nearest.candidate.molecule_2,
            "Closest contact."
        );
    }
    Ok(result.dimers)
}

use super::{read_comparator, read_crystal, read_ledger, write_groups, write_pairs};
use crate::cli::{EquivalenceArgs, EquivalenceOverrides};
use crate::config::PartialConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use crystaldimer::core::models::crystal::Crystal;
use crystaldimer::core::models::dimer::Dimer;
use crystaldimer::core::models::ids::{DimerId, EntityId, MoleculeId};
use crystaldimer::engine::config::EquivalenceConfig;
use crystaldimer::engine::progress::ProgressReporter;
use crystaldimer::workflows;
use crystaldimer::workflows::equivalence::EquivalenceResult;
use std::path::Path;
use tracing::info;

pub fn run(args: EquivalenceArgs, show_progress: bool) -> Result<()> {
    let config = PartialConfig::load(args.config.as_deref(), &args.set_values)?;
    info!("Merging configuration from file and CLI arguments...");
    let equivalence_config = config.merge_equivalence_with_cli(&args.equivalence)?;

    let crystal = read_crystal(&args.input)?;
    std::fs::create_dir_all(&args.output_dir)?;

    let progress_handler = CliProgressHandler::new(show_progress);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    group_molecules(
        &crystal,
        &args.equivalence,
        &equivalence_config,
        &reporter,
        &args.output_dir,
    )?;

    if let Some(ledger_path) = &args.ledger {
        let ledger = read_ledger(ledger_path)?;
        let dimers = workflows::dimers::restore(
            &crystal,
            &ledger,
            equivalence_config.integrality_tolerance,
        )?;
        group_dimers(
            &crystal,
            &dimers,
            &args.equivalence,
            &equivalence_config,
            &reporter,
            &args.output_dir,
        )?;
    }
    Ok(())
}

pub(crate) fn group_molecules(
    crystal: &Crystal,
    args: &EquivalenceOverrides,
    config: &EquivalenceConfig,
    reporter: &ProgressReporter,
    output_dir: &Path,
) -> Result<()> {
    let comparator = read_comparator::<MoleculeId>(args.molecule_pairs.as_deref(), "molecule")?;
    println!("Grouping {} molecule(s)...", crystal.molecule_count());
    let result = workflows::equivalence::run_molecules(crystal, &comparator, config, reporter)?;
    write_result(&result, config, "molecules", output_dir)
}

pub(crate) fn group_dimers(
    crystal: &Crystal,
    dimers: &[Dimer],
    args: &EquivalenceOverrides,
    config: &EquivalenceConfig,
    reporter: &ProgressReporter,
    output_dir: &Path,
) -> Result<()> {
    let comparator = read_comparator::<DimerId>(args.dimer_pairs.as_deref(), "dimer")?;
    println!("Grouping {} dimer(s)...", dimers.len());
    let result =
        workflows::equivalence::run_dimers(crystal, dimers, &comparator, config, reporter)?;
    write_result(&result, config, "dimers", output_dir)
}

/// Writes `<prefix>.<pass>.groups` and `<prefix>.<pass>.pairs` for every
/// pass that ran.
fn write_result<T: EntityId>(
    result: &EquivalenceResult<T>,
    config: &EquivalenceConfig,
    prefix: &str,
    output_dir: &Path,
) -> Result<()> {
    let path = |pass: &str, kind: &str| output_dir.join(format!("{}.{}.{}", prefix, pass, kind));
    if config.symmetry.is_some() {
        write_groups(&result.symmetry, &path("symmetry", "groups"))?;
        write_pairs(&result.symmetry_pairs, &path("symmetry", "pairs"))?;
    }
    write_groups(&result.structural, &path("structural", "groups"))?;
    write_pairs(&result.structural_pairs, &path("structural", "pairs"))?;
    if let (Some(groups), Some(pairs)) = (&result.conformational, &result.conformational_pairs) {
        write_groups(groups, &path("conformational", "groups"))?;
        write_pairs(pairs, &path("conformational", "pairs"))?;
    }
    Ok(())
}

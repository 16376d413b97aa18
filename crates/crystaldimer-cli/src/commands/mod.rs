pub mod dimers;
pub mod equivalence;
pub mod run;

use crate::error::{CliError, Result};
use crystaldimer::core::io::crystal::CrystalFile;
use crystaldimer::core::io::groups::GroupsFile;
use crystaldimer::core::io::ledger::{DimerLedger, LedgerFile};
use crystaldimer::core::io::pairs::PairsFile;
use crystaldimer::core::io::traits::PersistedFile;
use crystaldimer::core::models::crystal::Crystal;
use crystaldimer::core::models::equivalence::{EquivalenceGroups, EquivalencePair};
use crystaldimer::core::models::ids::EntityId;
use crystaldimer::engine::equivalence::PairListComparator;
use std::path::Path;
use tracing::{info, warn};

/// Name of the ledger inside an output directory.
pub const LEDGER_FILE_NAME: &str = "dimers.ledger";

fn read_crystal(path: &Path) -> Result<Crystal> {
    info!("Loading decomposed crystal from {:?}", path);
    let crystal = CrystalFile::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    info!(
        molecules = crystal.molecule_count(),
        symmetry_operations = crystal.symmetry_operations().len(),
        "Crystal loaded."
    );
    Ok(crystal)
}

fn read_ledger(path: &Path) -> Result<DimerLedger> {
    let ledger = LedgerFile::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    info!(dimers = ledger.len(), "Loaded dimer ledger from {:?}", path);
    Ok(ledger)
}

fn write_ledger(ledger: &DimerLedger, path: &Path) -> Result<()> {
    LedgerFile::write_to_path(ledger, path).map_err(|e| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e.into(),
    })
}

/// Loads the pairs an external comparator judged equivalent. Without a file
/// no pair is equivalent, so only symmetry can merge entities.
fn read_comparator<T: EntityId>(path: Option<&Path>, kind: &str) -> Result<PairListComparator<T>> {
    let Some(path) = path else {
        warn!(
            "No {} pairs file given; structural groups will come from symmetry alone.",
            kind
        );
        return Ok(PairListComparator::new(Vec::new()));
    };
    let pairs = PairsFile::<T>::read_from_path(path).map_err(|e| CliError::FileParsing {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    info!(pairs = pairs.len(), "Loaded {} equivalence pairs from {:?}", kind, path);
    Ok(PairListComparator::new(pairs))
}

fn write_groups<T: EntityId>(groups: &EquivalenceGroups<T>, path: &Path) -> Result<()> {
    GroupsFile::write_to_path(groups, path).map_err(|e| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    println!(
        "  {} group(s) written to: {}",
        groups.len(),
        path.display()
    );
    Ok(())
}

fn write_pairs<T: EntityId>(pairs: &Vec<EquivalencePair<T>>, path: &Path) -> Result<()> {
    PairsFile::write_to_path(pairs, path).map_err(|e| CliError::FileWriting {
        path: path.to_path_buf(),
        source: e.into(),
    })?;
    info!(pairs = pairs.len(), "Equivalence pairs written to {:?}", path);
    Ok(())
}

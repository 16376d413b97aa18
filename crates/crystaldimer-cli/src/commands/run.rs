use super::equivalence::{group_dimers, group_molecules};
use super::{LEDGER_FILE_NAME, read_crystal, read_ledger, write_ledger};
use crate::cli::RunArgs;
use crate::config::PartialConfig;
use crate::error::Result;
use crate::utils::progress::CliProgressHandler;
use crystaldimer::core::io::ledger::DimerLedger;
use crystaldimer::engine::progress::ProgressReporter;
use tracing::info;

pub fn run(args: RunArgs, show_progress: bool) -> Result<()> {
    let config = PartialConfig::load(args.config.as_deref(), &args.set_values)?;
    info!("Merging configuration from file and CLI arguments...");
    let search_config = config.merge_search_with_cli(&args.search)?;
    let equivalence_config = config.merge_equivalence_with_cli(&args.equivalence)?;

    let crystal = read_crystal(&args.input)?;
    std::fs::create_dir_all(&args.output_dir)?;

    let ledger_path = args.output_dir.join(LEDGER_FILE_NAME);
    let previous = if !args.fresh && ledger_path.exists() {
        info!("Reusing recentering vectors from {:?}", ledger_path);
        Some(read_ledger(&ledger_path)?)
    } else {
        None
    };

    let dimers = super::dimers::search(&crystal, &search_config, previous.as_ref(), show_progress)?;
    write_ledger(&DimerLedger::from_dimers(&dimers), &ledger_path)?;
    println!(
        "✓ {} dimer(s) written to: {}",
        dimers.len(),
        ledger_path.display()
    );

    let progress_handler = CliProgressHandler::new(show_progress);
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());
    group_molecules(
        &crystal,
        &args.equivalence,
        &equivalence_config,
        &reporter,
        &args.output_dir,
    )?;
    group_dimers(
        &crystal,
        &dimers,
        &args.equivalence,
        &equivalence_config,
        &reporter,
        &args.output_dir,
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use crate::error::CliError;
    use clap::Parser;
    use std::fs;
    use std::path::Path;

    const OUTPUTS: [&str; 9] = [
        "dimers.ledger",
        "molecules.structural.groups",
        "molecules.structural.pairs",
        "molecules.conformational.groups",
        "molecules.conformational.pairs",
        "dimers.structural.groups",
        "dimers.structural.pairs",
        "dimers.conformational.groups",
        "dimers.conformational.pairs",
    ];

    const CHAINS: &str = r#"
[lattice]
a = [20.0, 0.0, 0.0]
b = [0.0, 20.0, 0.0]
c = [0.0, 0.0, 20.0]

[[molecules]]
id = 1
elements = ["C", "C", "C"]
positions = [[17.0, 10.0, 10.0], [18.0, 10.0, 10.0], [19.0, 10.0, 10.0]]
bonds = [[0, 1], [1, 2]]

[[molecules]]
id = 2
elements = ["C", "C", "C"]
positions = [[1.5, 10.0, 10.0], [2.5, 10.0, 10.0], [3.5, 10.0, 10.0]]
bonds = [[0, 1], [1, 2]]
"#;

    fn run_args(input: &Path, output_dir: &Path, extra: &[&str]) -> RunArgs {
        let mut args = vec![
            "crystaldimer",
            "run",
            "-i",
            input.to_str().unwrap(),
            "-o",
            output_dir.to_str().unwrap(),
        ];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Run(args) => args,
            _ => panic!("Expected 'run' subcommand"),
        }
    }

    #[test]
    fn repeated_runs_produce_identical_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cell.toml");
        fs::write(&input, CHAINS).unwrap();
        let first = dir.path().join("first");
        let second = dir.path().join("second");

        run(run_args(&input, &first, &["--cutoff", "8.0"]), false).unwrap();
        run(run_args(&input, &second, &["--cutoff", "8.0", "--fresh"]), false).unwrap();
        // The third run picks up the ledger left in `first`.
        let snapshot: Vec<String> = OUTPUTS
            .iter()
            .map(|name| fs::read_to_string(first.join(name)).unwrap())
            .collect();
        run(run_args(&input, &first, &["--cutoff", "8.0"]), false).unwrap();

        for (name, before) in OUTPUTS.iter().zip(&snapshot) {
            let again = fs::read_to_string(first.join(name)).unwrap();
            let fresh = fs::read_to_string(second.join(name)).unwrap();
            assert_eq!(&again, before, "{} changed on rerun", name);
            assert_eq!(again, fresh, "{} differs from a fresh run", name);
        }
        assert_eq!(
            fs::read_to_string(first.join("molecules.conformational.groups")).unwrap(),
            "[1, 2]\n"
        );
        assert_eq!(
            fs::read_to_string(first.join("dimers.structural.groups")).unwrap(),
            "[1]\n"
        );
    }

    #[test]
    fn invalid_configuration_fails_before_writing_anything() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("cell.toml");
        fs::write(&input, CHAINS).unwrap();
        let output = dir.path().join("out");

        let result = run(
            run_args(
                &input,
                &output,
                &["--cutoff", "8.0", "--distance-policy", "average-distance"],
            ),
            false,
        );
        assert!(matches!(result, Err(CliError::Config(_))));
        assert!(!output.exists());
    }
}

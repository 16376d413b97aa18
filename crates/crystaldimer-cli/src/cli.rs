use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Tony Kan, Ted Yu",
    version,
    about = "crystaldimer - Finds periodic dimers in decomposed molecular crystals and groups molecules and dimers into distinct species.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads for parallel computation.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the crystal for neighboring molecule pairs and write the dimer ledger.
    Dimers(DimersArgs),
    /// Group molecules, and optionally the dimers of a ledger, into equivalence classes.
    Equivalence(EquivalenceArgs),
    /// Run the dimer search followed by molecule and dimer grouping.
    Run(RunArgs),
}

/// Overrides for the `[search]` section of the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct SearchOverrides {
    /// Override the neighbor cutoff distance in Angstrom.
    #[arg(long, value_name = "FLOAT")]
    pub cutoff: Option<f64>,

    /// Override the distance policy (e.g., 'nearest-atom').
    #[arg(long, value_name = "POLICY")]
    pub distance_policy: Option<String>,

    /// Override the slack added to covalent radii when detecting wrapped bonds.
    #[arg(long, value_name = "FLOAT")]
    pub bond_tolerance: Option<f64>,

    /// Leave solvent molecules out of the neighbor search.
    #[arg(long)]
    pub exclude_solvent: bool,
}

/// A group to handle mutually exclusive flags for the symmetry pre-pass.
#[derive(Args, Debug, Clone, Copy, Default)]
#[group(required = false, multiple = false)]
pub struct SymmetryPrepass {
    /// Fold symmetry-equivalent entities together before comparing.
    #[arg(long)]
    pub with_symmetry: bool,
    /// Skip the symmetry pre-pass.
    #[arg(long)]
    pub no_symmetry: bool,
}

/// Overrides for the `[equivalence]` section of the configuration file.
#[derive(Args, Debug, Clone, Default)]
pub struct EquivalenceOverrides {
    #[command(flatten)]
    pub symmetry: SymmetryPrepass,

    /// Override the atom matching tolerance of the symmetry pre-pass in Angstrom.
    #[arg(long, value_name = "FLOAT")]
    pub symmetry_tolerance: Option<f64>,

    /// Skip the conformational (connectivity-only) grouping.
    #[arg(long)]
    pub no_conformational: bool,

    /// Equivalent molecule pairs produced by an external structure comparator.
    #[arg(long, value_name = "PATH")]
    pub molecule_pairs: Option<PathBuf>,

    /// Equivalent dimer pairs produced by an external structure comparator.
    #[arg(long, value_name = "PATH")]
    pub dimer_pairs: Option<PathBuf>,
}

/// Arguments for the `dimers` subcommand.
#[derive(Args, Debug)]
pub struct DimersArgs {
    /// Path to the decomposed crystal in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the dimer ledger to write.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Path to the configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// A ledger from an earlier run whose recentering vectors should be kept.
    #[arg(long, value_name = "PATH")]
    pub previous: Option<PathBuf>,

    #[command(flatten)]
    pub search: SearchOverrides,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S search.cutoff=7.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `equivalence` subcommand.
#[derive(Args, Debug)]
pub struct EquivalenceArgs {
    /// Path to the decomposed crystal in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory receiving the group files.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Path to the configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Dimer ledger whose dimers should be grouped as well.
    #[arg(short, long, value_name = "PATH")]
    pub ledger: Option<PathBuf>,

    #[command(flatten)]
    pub equivalence: EquivalenceOverrides,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S equivalence.conformational=false
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `run` subcommand.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the decomposed crystal in TOML format.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Directory receiving the ledger and all group files.
    #[arg(short, long, required = true, value_name = "DIR")]
    pub output_dir: PathBuf,

    /// Path to the configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Ignore a ledger left in the output directory by an earlier run.
    #[arg(long)]
    pub fresh: bool,

    #[command(flatten)]
    pub search: SearchOverrides,

    #[command(flatten)]
    pub equivalence: EquivalenceOverrides,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S search.cutoff=7.5
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn command_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_search_and_equivalence_overrides_together() {
        let cli = Cli::parse_from([
            "crystaldimer",
            "-vv",
            "run",
            "-i",
            "cell.toml",
            "-o",
            "out",
            "--cutoff",
            "7.5",
            "--no-symmetry",
            "--molecule-pairs",
            "molecules.pairs",
        ]);
        assert_eq!(cli.verbose, 2);
        let Commands::Run(args) = cli.command else {
            panic!("Expected 'run' subcommand");
        };
        assert_eq!(args.search.cutoff, Some(7.5));
        assert!(args.equivalence.symmetry.no_symmetry);
        assert_eq!(
            args.equivalence.molecule_pairs,
            Some(PathBuf::from("molecules.pairs"))
        );
    }

    #[test]
    fn symmetry_flags_are_mutually_exclusive() {
        let result = Cli::try_parse_from([
            "crystaldimer",
            "equivalence",
            "-i",
            "cell.toml",
            "-o",
            "out",
            "--with-symmetry",
            "--no-symmetry",
        ]);
        assert!(result.is_err());
    }
}

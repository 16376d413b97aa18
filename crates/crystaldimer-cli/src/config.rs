mod defaults;

use crate::cli::{EquivalenceOverrides, SearchOverrides};
use crate::error::{CliError, Result};
use crystaldimer::engine::config as core_config;
use crystaldimer::engine::distance::DistancePolicy;
use defaults::DefaultsConfig;
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialSearchConfig {
    cutoff: Option<f64>,
    distance_policy: Option<String>,
    bond_tolerance: Option<f64>,
    integrality_tolerance: Option<f64>,
    include_solvent: Option<bool>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields, rename_all = "kebab-case")]
struct PartialEquivalenceConfig {
    symmetry_prepass: Option<bool>,
    symmetry_tolerance: Option<f64>,
    conformational: Option<bool>,
    integrality_tolerance: Option<f64>,
}

/// The configuration file as written by the user; every field is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    search: Option<PartialSearchConfig>,
    equivalence: Option<PartialEquivalenceConfig>,
}

fn parse_value<V: FromStr>(key: &str, value: &str) -> Result<V> {
    value.trim().parse().map_err(|_| {
        CliError::Config(format!("Invalid value for {}: {}", key, value))
    })
}

impl PartialConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: e.into(),
        })
    }

    /// Reads the optional configuration file and applies `--set` overrides.
    pub fn load(path: Option<&Path>, set_values: &[String]) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_set_values(set_values)?;
        Ok(config)
    }

    pub fn merge_search_with_cli(
        &self,
        args: &SearchOverrides,
    ) -> Result<core_config::NeighborSearchConfig> {
        let defaults = DefaultsConfig::default();
        let file = self.search.as_ref();

        let cutoff = args
            .cutoff
            .or(file.and_then(|f| f.cutoff))
            .ok_or_else(|| {
                CliError::Config(
                    "A value for 'search.cutoff' is required either in the config file or via --cutoff."
                        .to_string(),
                )
            })?;

        let distance_policy = match args
            .distance_policy
            .as_deref()
            .or(file.and_then(|f| f.distance_policy.as_deref()))
        {
            Some(name) => name.parse::<DistancePolicy>()?,
            None => defaults.distance_policy,
        };

        let include_solvent = if args.exclude_solvent {
            false
        } else {
            file.and_then(|f| f.include_solvent)
                .unwrap_or(defaults.include_solvent)
        };

        let config = core_config::NeighborSearchConfigBuilder::new()
            .cutoff(cutoff)
            .distance_policy(distance_policy)
            .bond_tolerance(
                args.bond_tolerance
                    .or(file.and_then(|f| f.bond_tolerance))
                    .unwrap_or(defaults.bond_tolerance),
            )
            .integrality_tolerance(
                file.and_then(|f| f.integrality_tolerance)
                    .unwrap_or(defaults.integrality_tolerance),
            )
            .include_solvent(include_solvent)
            .build()?;
        Ok(config)
    }

    pub fn merge_equivalence_with_cli(
        &self,
        args: &EquivalenceOverrides,
    ) -> Result<core_config::EquivalenceConfig> {
        let defaults = DefaultsConfig::default();
        let file = self.equivalence.as_ref();

        let symmetry_prepass = if args.symmetry.with_symmetry {
            true
        } else if args.symmetry.no_symmetry {
            false
        } else {
            file.and_then(|f| f.symmetry_prepass)
                .unwrap_or(defaults.symmetry_prepass)
        };

        let conformational = if args.no_conformational {
            false
        } else {
            file.and_then(|f| f.conformational)
                .unwrap_or(defaults.conformational)
        };

        let config = core_config::EquivalenceConfigBuilder::new()
            .symmetry_prepass(symmetry_prepass)
            .symmetry_tolerance(
                args.symmetry_tolerance
                    .or(file.and_then(|f| f.symmetry_tolerance))
                    .unwrap_or(defaults.symmetry_tolerance),
            )
            .conformational(conformational)
            .integrality_tolerance(
                file.and_then(|f| f.integrality_tolerance)
                    .unwrap_or(defaults.integrality_tolerance),
            )
            .build()?;
        Ok(config)
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();

            match key.split_once('.') {
                Some(("search", field)) => {
                    let search = self.search.get_or_insert_with(Default::default);
                    match field {
                        "cutoff" => search.cutoff = Some(parse_value(key, value)?),
                        "distance-policy" => {
                            search.distance_policy = Some(value.trim().to_string())
                        }
                        "bond-tolerance" => search.bond_tolerance = Some(parse_value(key, value)?),
                        "integrality-tolerance" => {
                            search.integrality_tolerance = Some(parse_value(key, value)?)
                        }
                        "include-solvent" => {
                            search.include_solvent = Some(parse_value(key, value)?)
                        }
                        _ => return Err(unsupported_key(key)),
                    }
                }
                Some(("equivalence", field)) => {
                    let equivalence = self.equivalence.get_or_insert_with(Default::default);
                    match field {
                        "symmetry-prepass" => {
                            equivalence.symmetry_prepass = Some(parse_value(key, value)?)
                        }
                        "symmetry-tolerance" => {
                            equivalence.symmetry_tolerance = Some(parse_value(key, value)?)
                        }
                        "conformational" => {
                            equivalence.conformational = Some(parse_value(key, value)?)
                        }
                        "integrality-tolerance" => {
                            equivalence.integrality_tolerance = Some(parse_value(key, value)?)
                        }
                        _ => return Err(unsupported_key(key)),
                    }
                }
                _ => return Err(unsupported_key(key)),
            }
        }
        Ok(())
    }
}

fn unsupported_key(key: &str) -> CliError {
    CliError::Config(format!(
        "Unsupported configuration key for --set: '{}'",
        key
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands, RunArgs};
    use clap::Parser;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn write_config_file(dir: &TempDir, content: &str) -> PathBuf {
        let path = dir.path().join("crystaldimer.toml");
        fs::write(&path, content).unwrap();
        path
    }

    fn run_args(extra: &[&str]) -> RunArgs {
        let mut args = vec!["crystaldimer", "run", "-i", "cell.toml", "-o", "out"];
        args.extend_from_slice(extra);
        match Cli::parse_from(args).command {
            Commands::Run(args) => args,
            _ => panic!("Expected 'run' subcommand"),
        }
    }

    #[test]
    fn file_values_are_merged_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(
            &dir,
            r#"
            [search]
            cutoff = 8.0

            [equivalence]
            symmetry-prepass = true
            "#,
        );
        let args = run_args(&[]);
        let config = PartialConfig::load(Some(&path), &args.set_values).unwrap();

        let search = config.merge_search_with_cli(&args.search).unwrap();
        assert_eq!(search.cutoff, 8.0);
        assert_eq!(search.distance_policy, DistancePolicy::NearestAtom);
        assert!(search.include_solvent);

        let equivalence = config.merge_equivalence_with_cli(&args.equivalence).unwrap();
        assert_eq!(equivalence.symmetry.map(|s| s.tolerance), Some(0.1));
        assert!(equivalence.conformational);
    }

    #[test]
    fn cli_arguments_override_file_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(
            &dir,
            r#"
            [search]
            cutoff = 8.0 # Will be overridden
            include-solvent = true

            [equivalence]
            symmetry-prepass = true
            conformational = true
            "#,
        );
        let args = run_args(&[
            "--cutoff",
            "6.5",
            "--exclude-solvent",
            "--no-symmetry",
            "--no-conformational",
        ]);
        let config = PartialConfig::load(Some(&path), &args.set_values).unwrap();

        let search = config.merge_search_with_cli(&args.search).unwrap();
        assert_eq!(search.cutoff, 6.5);
        assert!(!search.include_solvent);

        let equivalence = config.merge_equivalence_with_cli(&args.equivalence).unwrap();
        assert!(equivalence.symmetry.is_none());
        assert!(!equivalence.conformational);
    }

    #[test]
    fn set_values_override_file_and_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(&dir, "[search]\ncutoff = 8.0\n");
        let args = run_args(&[
            "-S",
            "search.cutoff=9.25",
            "-S",
            "equivalence.symmetry-tolerance=0.02",
            "-S",
            "equivalence.symmetry-prepass=true",
        ]);
        let config = PartialConfig::load(Some(&path), &args.set_values).unwrap();

        assert_eq!(config.merge_search_with_cli(&args.search).unwrap().cutoff, 9.25);
        let equivalence = config.merge_equivalence_with_cli(&args.equivalence).unwrap();
        assert_eq!(equivalence.symmetry.map(|s| s.tolerance), Some(0.02));
    }

    #[test]
    fn missing_cutoff_returns_config_error() {
        let args = run_args(&[]);
        let config = PartialConfig::load(None, &args.set_values).unwrap();
        let result = config.merge_search_with_cli(&args.search);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("cutoff")));
    }

    #[test]
    fn unimplemented_policy_fails_before_any_work() {
        let args = run_args(&["--cutoff", "8", "--distance-policy", "center-of-mass"]);
        let config = PartialConfig::load(None, &args.set_values).unwrap();
        let result = config.merge_search_with_cli(&args.search);
        assert!(matches!(result, Err(CliError::Config(msg)) if msg.contains("center-of-mass")));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_config_file(&dir, "[search]\ncut-off = 8.0\n");
        assert!(matches!(
            PartialConfig::from_file(&path),
            Err(CliError::FileParsing { .. })
        ));

        let set = vec!["search.radius=3".to_string()];
        assert!(matches!(
            PartialConfig::load(None, &set),
            Err(CliError::Config(_))
        ));
    }
}

use crate::cli::ParamArgs;
use crate::error::{CliError, Result};
use ncikit::engine::config::{ContactParams, ContactParamsBuilder};
use std::path::Path;
use toml::{Table, Value};
use tracing::debug;

/// Parameter values from a file and `--set` overrides, before defaults and
/// validation apply.
#[derive(Debug, Default)]
pub struct PartialContactParams {
    values: Table,
}

impl PartialContactParams {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading parameters from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        let values = toml::from_str(&content).map_err(|e| CliError::FileParsing {
            path: path.to_path_buf(),
            source: anyhow::Error::from(e),
        })?;
        Ok(Self { values })
    }

    /// Loads the file named by `args`, if any, applies its `--set` values and
    /// flags and validates the result.
    pub fn resolve(args: &ParamArgs) -> Result<ContactParams> {
        let mut partial = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        partial.apply_set_values(&args.set_values)?;
        partial.merge_with_cli(args)
    }

    pub fn merge_with_cli(self, args: &ParamArgs) -> Result<ContactParams> {
        let content =
            toml::to_string(&self.values).map_err(|e| CliError::Config(e.to_string()))?;
        let base =
            ContactParams::from_toml_str(&content).map_err(|e| CliError::Config(e.to_string()))?;

        let mut builder = ContactParamsBuilder::from_params(base);
        if let Some(model) = args.master_model {
            builder = builder.master_model_index(Some(model));
        }
        if args.no_salt_bridges {
            builder = builder.refine_salt_bridges(false);
        }
        if args.weak_hbonds {
            builder = builder.weak_hydrogen_bond(true);
        }
        builder.build().map_err(|e| CliError::Config(e.to_string()))
    }

    fn apply_set_values(&mut self, set_values: &[String]) -> Result<()> {
        for kv_pair in set_values {
            let Some((key, value_str)) = kv_pair.split_once('=') else {
                return Err(CliError::Config(format!(
                    "Invalid --set format: '{}'. Expected KEY=VALUE.",
                    kv_pair
                )));
            };
            let key = key.trim();
            if key.is_empty() {
                return Err(CliError::Config(format!(
                    "Missing key in --set value '{}'",
                    kv_pair
                )));
            }
            debug!(key, value = value_str, "Applying parameter override.");
            self.values
                .insert(key.to_string(), parse_value(value_str.trim()));
        }
        Ok(())
    }
}

/// A TOML scalar such as `3.2`, `true` or `-1`; anything else is kept as a string.
fn parse_value(raw: &str) -> Value {
    toml::from_str::<Table>(&format!("value = {raw}"))
        .ok()
        .and_then(|mut table| table.remove("value"))
        .unwrap_or_else(|| Value::String(raw.to_string()))
}

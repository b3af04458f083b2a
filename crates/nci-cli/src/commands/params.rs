use crate::cli::ParamsArgs;
use crate::error::{CliError, Result};
use ncikit::engine::config::ContactParams;
use tracing::info;

pub fn template() -> Result<String> {
    ContactParams::default()
        .to_toml_string()
        .map_err(|e| CliError::Config(e.to_string()))
}

pub fn run(args: ParamsArgs) -> Result<()> {
    let content = template()?;
    match args.output {
        Some(path) => {
            std::fs::write(&path, content)?;
            info!("Default parameters written to {:?}", path);
            println!("✓ Default parameters written to: {}", path.display());
        }
        None => print!("{content}"),
    }
    Ok(())
}

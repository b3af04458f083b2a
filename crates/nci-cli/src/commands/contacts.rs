use super::{load_structure, write_report};
use crate::cli::ContactsArgs;
use crate::config::PartialContactParams;
use crate::error::{CliError, Result};
use crate::utils::progress::PhaseSpinner;
use ncikit::core::io::report;
use ncikit::engine::progress::ProgressReporter;
use ncikit::workflows::contacts::{self, SelectionFilter};
use tracing::info;

pub fn run(args: ContactsArgs) -> Result<()> {
    let params = PartialContactParams::resolve(&args.params)?;
    let filter =
        SelectionFilter::parse(args.filter.filter.as_deref(), args.filter.between.as_deref())?;
    let system = load_structure(&args.input)?;

    let spinner = PhaseSpinner::new();
    let reporter = ProgressReporter::with_callback(spinner.callback());

    info!("Invoking the contact workflow...");
    let result = contacts::run(&system, &params, &filter, &reporter);
    spinner.finish();
    let result = result?;
    for (phase, elapsed) in spinner.timings() {
        info!(phase, elapsed_ms = elapsed.as_millis() as u64, "Phase timing.");
    }

    match &args.output {
        Some(path) => {
            write_report(path, &result.records)?;
            println!("{}", result.summary);
            println!("✓ Report written to: {}", path.display());
        }
        None => {
            report::write_csv(std::io::stdout().lock(), &result.records).map_err(|source| {
                CliError::Report {
                    path: "<stdout>".into(),
                    source,
                }
            })?;
            eprintln!("{}", result.summary);
        }
    }
    Ok(())
}

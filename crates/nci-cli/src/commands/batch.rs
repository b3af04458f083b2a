use super::{load_structure, write_report};
use crate::cli::BatchArgs;
use crate::config::PartialContactParams;
use crate::error::{CliError, Result};
use crate::utils::progress::bar_style;
use indicatif::{ProgressBar, ProgressDrawTarget};
use ncikit::engine::config::ContactParams;
use ncikit::engine::progress::ProgressReporter;
use ncikit::workflows::contacts::{self, SelectionFilter};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use tracing::{error, info};

/// Report path for one input: `<output_dir>/<input stem>.csv`.
pub fn report_path(output_dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "structure".to_string());
    output_dir.join(format!("{stem}.csv"))
}

fn process(
    input: &Path,
    output_dir: &Path,
    params: &ContactParams,
    filter: &SelectionFilter,
) -> Result<usize> {
    let system = load_structure(input)?;
    let report = contacts::run(&system, params, filter, &ProgressReporter::new())?;
    write_report(&report_path(output_dir, input), &report.records)?;
    Ok(report.records.len())
}

pub fn run(args: BatchArgs) -> Result<()> {
    let params = PartialContactParams::resolve(&args.params)?;
    let filter =
        SelectionFilter::parse(args.filter.filter.as_deref(), args.filter.between.as_deref())?;
    std::fs::create_dir_all(&args.output_dir)?;

    let pb = ProgressBar::new(args.inputs.len() as u64)
        .with_style(bar_style())
        .with_message("Structures");
    pb.set_draw_target(ProgressDrawTarget::stderr());

    info!(
        inputs = args.inputs.len(),
        threads = rayon::current_num_threads(),
        "Processing structures in parallel."
    );
    let outcomes: Vec<(&PathBuf, Result<usize>)> = args
        .inputs
        .par_iter()
        .map(|input| {
            let outcome = process(input, &args.output_dir, &params, &filter);
            pb.inc(1);
            (input, outcome)
        })
        .collect();
    pb.finish_and_clear();

    let mut failed = 0;
    for (input, outcome) in &outcomes {
        match outcome {
            Ok(count) => println!("  {}: {} contacts", input.display(), count),
            Err(e) => {
                failed += 1;
                error!("Failed to process {:?}: {}", input, e);
                eprintln!("  {}: {}", input.display(), e);
            }
        }
    }

    if failed > 0 {
        return Err(CliError::Batch {
            failed,
            total: outcomes.len(),
        });
    }
    println!(
        "✓ {} reports written to: {}",
        outcomes.len(),
        args.output_dir.display()
    );
    Ok(())
}

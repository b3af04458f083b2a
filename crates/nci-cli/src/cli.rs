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
    author,
    version,
    about = "NCIKit CLI - Detects non-covalent interactions (hydrogen and halogen bonds, salt bridges, cation-pi, pi-stacking, hydrophobic contacts, metal coordination) in molecular structures.",
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

    /// Set the number of threads used by `batch`.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect the contacts of one structure and write them as CSV.
    Contacts(ContactsArgs),
    /// Detect contacts for several structures in parallel, one CSV report per input.
    Batch(BatchArgs),
    /// Print the default parameter file.
    Params(ParamsArgs),
}

/// Parameter sources shared by `contacts` and `batch`.
#[derive(Args, Debug, Clone, Default)]
pub struct ParamArgs {
    /// Path to a parameter file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set a parameter, overriding the config file.
    /// Can be used multiple times. Example: -S max-hbond-dist=3.2
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,

    /// Only consider atoms of this model (ensemble member).
    #[arg(long, value_name = "INDEX")]
    pub master_model: Option<usize>,

    /// Keep every ionic partner instead of resolving salt bridges.
    #[arg(long)]
    pub no_salt_bridges: bool,

    /// Report weak (C-H) hydrogen bonds.
    #[arg(long)]
    pub weak_hbonds: bool,
}

/// Restricts the report to contacts touching selected atoms.
#[derive(Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Keep contacts with a feature in this selection (e.g. 'chain:A & resname:HEM').
    #[arg(long, value_name = "SEL")]
    pub filter: Option<String>,

    /// Keep only contacts between `--filter` and this selection.
    #[arg(long, value_name = "SEL", requires = "filter")]
    pub between: Option<String>,
}

/// Arguments for the `contacts` subcommand.
#[derive(Args, Debug)]
pub struct ContactsArgs {
    /// Path to the input molecular structure file (e.g., complex.bgf).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path for the CSV report. Written to stdout when omitted.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[command(flatten)]
    pub params: ParamArgs,
}

/// Arguments for the `batch` subcommand.
#[derive(Args, Debug)]
pub struct BatchArgs {
    /// Input structure files.
    #[arg(short, long, required = true, num_args(1..), value_name = "PATH")]
    pub inputs: Vec<PathBuf>,

    /// Directory receiving one `<input stem>.csv` report per input.
    #[arg(short = 'd', long, required = true, value_name = "DIR")]
    pub output_dir: PathBuf,

    #[command(flatten)]
    pub filter: FilterArgs,

    #[command(flatten)]
    pub params: ParamArgs,
}

/// Arguments for the `params` subcommand.
#[derive(Args, Debug)]
pub struct ParamsArgs {
    /// Write the parameter file here instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,
}

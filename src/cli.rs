use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::metadata::{PKG_DESCRIPTION, PKG_NAME, PKG_VERSION};

#[derive(Parser, Debug, Clone)]
#[command(name = PKG_NAME)]
#[command(version = PKG_VERSION)]
#[command(about = PKG_DESCRIPTION, long_about = None)]
pub struct Cli {
    /// Settings file (defaults to <config dir>/daylio-backup/settings.json)
    #[arg(long, global = true, env = "DAYLIO_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Validate one or more backup exports
    Validate(ValidateArgs),
    /// Decode and re-encode an export, reporting keys that changed
    Roundtrip(RoundtripArgs),
    /// List registered fields and their external keys
    Fields {
        /// Entity name, e.g. DayEntry (all entities when omitted)
        entity: Option<String>,
    },
    /// Print the JSON Schema of `validate --json` output
    ReportSchema,
    /// Print version information
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct ValidateArgs {
    /// Export files to validate
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Print one JSON report per file instead of text
    #[arg(long, default_value_t = false)]
    pub json: bool,

    /// Also report duplicate ids and dangling mood/tag references
    #[arg(long, env = "DAYLIO_CHECK_REFERENCES", default_value_t = false)]
    pub check_references: bool,

    /// Export versions accepted without a warning (overrides settings)
    #[arg(long, env = "DAYLIO_KNOWN_VERSIONS", value_delimiter = ',')]
    pub known_versions: Vec<i64>,
}

#[derive(Args, Debug, Clone)]
pub struct RoundtripArgs {
    /// Export file to round-trip
    pub path: PathBuf,

    /// Write the re-encoded document here
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Pretty-print the written document
    #[arg(long, default_value_t = false)]
    pub pretty: bool,
}

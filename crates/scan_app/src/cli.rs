use std::path::PathBuf;

use clap::{Parser, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "secuapi-scan",
    version,
    about = "Describe an API surface and submit it to the SecuAPI scanning service"
)]
pub struct Cli {
    /// Settings file (RON). Defaults to ./scanner_settings.ron when present.
    #[arg(long, value_name = "FILE")]
    pub settings: Option<PathBuf>,

    /// Base url of the scanning service; overrides the settings file
    #[arg(long, value_name = "URL")]
    pub service_url: Option<String>,

    /// Seed the form from a JSON scan config: {"api": {"base_url": ..., "endpoints": [...]}}
    #[arg(long, value_name = "FILE", conflicts_with_all = ["base_url", "endpoints"])]
    pub config: Option<PathBuf>,

    /// Base url of the API to scan
    #[arg(short, long, value_name = "URL")]
    pub base_url: Option<String>,

    /// Endpoint path to scan (repeatable, order is kept)
    #[arg(short, long = "endpoint", value_name = "PATH")]
    pub endpoints: Vec<String>,

    /// Submit once, print the result as JSON and exit
    #[arg(long)]
    pub submit: bool,

    /// Where log output goes
    #[arg(long, value_enum, default_value_t = LogTarget::File)]
    pub log: LogTarget,

    /// Log at debug level
    #[arg(short, long)]
    pub verbose: bool,
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LogTarget {
    /// ./scanner.log in the current directory
    File,
    /// stderr/stdout
    Terminal,
    Both,
}

pub use clap::Parser;

use std::path::PathBuf;
use std::time::Duration;

use clap::ArgAction;

use crate::version::LONG_VERSION;

#[derive(Parser, Debug)]
#[command(name = "rnid")]
#[command(about = "Identity & Encryption Utility")]
#[command(version, long_version = LONG_VERSION, disable_version_flag = true)]
pub struct Args {
    /// Path to an alternative rnid config directory (defaults to ~/.rnid)
    #[arg(long, value_name = "path")]
    pub config: Option<PathBuf>,

    /// Hexadecimal destination hash or path to an identity file
    #[arg(short = 'i', long = "identity", value_name = "identity")]
    pub identity: String,

    /// Increase verbosity
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Decrease verbosity
    #[arg(short, long, action = ArgAction::Count)]
    pub quiet: u8,

    /// Encrypt data
    #[arg(short, long)]
    pub encrypt: bool,

    /// Decrypt data
    #[arg(short, long)]
    pub decrypt: bool,

    /// Sign data
    #[arg(short, long)]
    pub sign: bool,

    /// Verify a signature
    #[arg(short = 'V', long)]
    pub verify: bool,

    /// Input file path
    #[arg(short, long, value_name = "path")]
    pub read: Option<PathBuf>,

    /// Output file path
    #[arg(short, long, value_name = "path")]
    pub write: Option<PathBuf>,

    /// Write output even if it overwrites existing files
    #[arg(short, long)]
    pub force: bool,

    /// Read input from stdin instead of a file
    #[arg(short = 'I', long, hide = true)]
    pub stdin: bool,

    /// Write output to stdout instead of a file
    #[arg(short = 'O', long, hide = true)]
    pub stdout: bool,

    /// Request unknown identities from the network
    #[arg(short = 'R', long)]
    pub request: bool,

    /// Identity request timeout before giving up
    #[arg(short = 't', value_name = "seconds", value_parser = parse_seconds)]
    pub timeout: Option<Duration>,

    /// Print identity info and exit
    #[arg(short, long)]
    pub print_identity: bool,

    /// Allow displaying private keys
    #[arg(short = 'P', long)]
    pub print_private: bool,

    /// Use base64-encoded input and output
    #[arg(short, long)]
    pub base64: bool,

    /// Signature file to verify against (defaults to <input>.rsg)
    #[arg(long, value_name = "path")]
    pub signature: Option<PathBuf>,

    /// Print version
    #[arg(long, action = ArgAction::Version)]
    pub version: Option<bool>,
}

fn parse_seconds(s: &str) -> Result<Duration, String> {
    let seconds: f64 = s
        .parse()
        .map_err(|_| format!("{s:?} is not a number of seconds"))?;
    Duration::try_from_secs_f64(seconds).map_err(|e| e.to_string())
}

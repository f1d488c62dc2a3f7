//! Command-line interface definition and parsing.

use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for the ERP server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file.
    #[arg(short, long, env = "APP_CONFIG")]
    pub config: Option<PathBuf>,

    /// The HMAC secret used to sign and verify bearer tokens.
    #[arg(short, long, env = "APP_SECRET")]
    pub secret: String,

    /// Write the OpenAPI schema to this path and exit.
    #[arg(long)]
    pub schema: Option<PathBuf>,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn import() -> Result<Self, clap::Error> {
        Self::try_parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_flags() {
        let cli = Cli::try_parse_from([
            "erpd",
            "--secret",
            "s3cret",
            "--config",
            "erpd.toml",
            "--schema",
            "api.json",
        ])
        .unwrap();
        assert_eq!(cli.secret, "s3cret");
        assert_eq!(cli.config, Some(PathBuf::from("erpd.toml")));
        assert_eq!(cli.schema, Some(PathBuf::from("api.json")));
    }
}

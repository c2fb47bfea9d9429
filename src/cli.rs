//! Command-line interface for the AI Impact Brief job.
//!
//! Every option has an environment variable and a default, so a scheduled
//! run needs no arguments at all.

use crate::enrich::analyst::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use clap::Parser;
use std::path::PathBuf;

/// Command-line arguments for one brief run.
///
/// # Examples
///
/// ```sh
/// # Fallback-only run with defaults
/// ai_impact_brief
///
/// # Structured run writing somewhere else
/// OPENAI_API_KEY=sk-... ai_impact_brief -o site/today.json -a site/archive
///
/// # Custom feed list
/// ai_impact_brief --feeds feeds.yaml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Analysis credential; when unset or blank the fallback template is used
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// Chat model used for analysis
    #[arg(long, env = "OPENAI_MODEL", default_value = DEFAULT_MODEL)]
    pub openai_model: String,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub openai_base_url: String,

    /// Primary output file
    #[arg(short, long, env = "BRIEF_OUTPUT_PATH", default_value = "public/today.json")]
    pub output_path: PathBuf,

    /// Directory receiving the dated archive copy
    #[arg(short, long, env = "BRIEF_ARCHIVE_DIR", default_value = "public/archive")]
    pub archive_dir: PathBuf,

    /// Optional YAML file replacing the built-in feed list
    #[arg(short, long, env = "BRIEF_FEEDS_FILE")]
    pub feeds: Option<PathBuf>,
}

impl Cli {
    /// The analysis credential, if one is set and not blank.
    pub fn analysis_key(&self) -> Option<&str> {
        self.openai_api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from(&[
            "ai_impact_brief",
            "--output-path",
            "./site/today.json",
            "--archive-dir",
            "./site/archive",
            "--openai-api-key",
            "sk-test",
        ]);

        assert_eq!(cli.output_path, PathBuf::from("./site/today.json"));
        assert_eq!(cli.archive_dir, PathBuf::from("./site/archive"));
        assert_eq!(cli.analysis_key(), Some("sk-test"));
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(&[
            "ai_impact_brief",
            "-o",
            "/tmp/today.json",
            "-a",
            "/tmp/archive",
            "-f",
            "/tmp/feeds.yaml",
        ]);

        assert_eq!(cli.output_path, PathBuf::from("/tmp/today.json"));
        assert_eq!(cli.archive_dir, PathBuf::from("/tmp/archive"));
        assert_eq!(cli.feeds, Some(PathBuf::from("/tmp/feeds.yaml")));
    }

    #[test]
    fn test_blank_key_counts_as_unset() {
        let cli = Cli::parse_from(&["ai_impact_brief", "--openai-api-key", "   "]);
        assert_eq!(cli.analysis_key(), None);

        let cli = Cli::parse_from(&["ai_impact_brief", "--openai-api-key", "  sk-padded "]);
        assert_eq!(cli.analysis_key(), Some("sk-padded"));
    }
}

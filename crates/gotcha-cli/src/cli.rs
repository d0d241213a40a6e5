//! Command-line arguments.

use clap::Parser;
use gotcha_core::Category;
use gotcha_report::ReportFormat;
use std::collections::BTreeSet;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "gotcha")]
#[command(about = "Find which platforms have an account for a username or email address")]
#[command(version)]
#[command(after_help = "Examples:
  gotcha -u john_doe --social --developer
  gotcha -e john@example.com --social --professional
  gotcha -u username -e email@domain.com --all
  gotcha -u username --social --adult
  gotcha -e john@example.com --domain
  gotcha -f targets.txt --all -o report.csv

Adult/NSFW platforms (18+) are only probed with --adult or --all.")]
pub struct Cli {
    /// Target username
    #[arg(short, long)]
    pub username: Option<String>,

    /// Target email address
    #[arg(short, long)]
    pub email: Option<String>,

    /// File with one username or email per line
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Search social media platforms
    #[arg(long)]
    pub social: bool,

    /// Search general websites
    #[arg(long)]
    pub general: bool,

    /// Search developer platforms
    #[arg(long)]
    pub developer: bool,

    /// Search forums and communities
    #[arg(long)]
    pub forums: bool,

    /// Search gaming platforms
    #[arg(long)]
    pub gaming: bool,

    /// Search professional networks
    #[arg(long)]
    pub professional: bool,

    /// Search miscellaneous platforms
    #[arg(long)]
    pub misc: bool,

    /// Search adult/NSFW platforms (18+ content)
    #[arg(long)]
    pub adult: bool,

    /// Analyze the email domain (MX, SPF, DMARC)
    #[arg(long)]
    pub domain: bool,

    /// Enable every category and analysis, adult included
    #[arg(long)]
    pub all: bool,

    /// Write the report to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Report format [default: the output extension, else output.format from config]
    #[arg(long, value_parser = parse_format)]
    pub format: Option<ReportFormat>,

    /// Suppress the banner and informational logging
    #[arg(short, long)]
    pub quiet: bool,

    /// Maximum number of concurrent probes [default: 50]
    #[arg(long, value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    pub threads: Option<u32>,

    /// Per-request timeout in seconds [default: 10]
    #[arg(long, value_name = "SECS", value_parser = clap::value_parser!(u64).range(1..))]
    pub timeout: Option<u64>,

    /// Directory with additional platform definition TOML files
    #[arg(long, value_name = "DIR")]
    pub definitions: Option<PathBuf>,

    /// List the known platforms and exit
    #[arg(long)]
    pub list_platforms: bool,

    /// Configuration file [default: the per-user config path]
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

fn parse_format(value: &str) -> Result<ReportFormat, String> {
    value.parse().map_err(|e: gotcha_report::ReportError| e.to_string())
}

impl Cli {
    /// Categories switched on by the flags.
    pub fn categories(&self) -> BTreeSet<Category> {
        if self.all {
            return Category::ALL.into_iter().collect();
        }

        [
            (self.social, Category::Social),
            (self.general, Category::General),
            (self.developer, Category::Developer),
            (self.forums, Category::Forum),
            (self.gaming, Category::Gaming),
            (self.professional, Category::Professional),
            (self.misc, Category::Misc),
            (self.adult, Category::Adult),
        ]
        .into_iter()
        .filter_map(|(enabled, category)| enabled.then_some(category))
        .collect()
    }

    /// Whether adult-flagged platforms may be probed.
    pub fn include_adult(&self) -> bool {
        self.adult || self.all
    }

    /// Whether email domains should be analyzed.
    pub fn analyze_domain(&self) -> bool {
        self.domain || self.all
    }

    /// Whether any target was given.
    pub fn has_target(&self) -> bool {
        self.username.is_some() || self.email.is_some() || self.file.is_some()
    }
}

pub use clap::Parser;

use std::path::PathBuf;

use acl_backend::Refresh;
use url::Url;

#[derive(Parser, Debug)]
#[command(name = "acl-es")]
#[command(about = "Inspect and edit access-control sets stored in Elasticsearch")]
#[command(version)]
pub struct Args {
    /// Elasticsearch URL (defaults to the config file, then http://localhost:9200)
    #[arg(long, global = true)]
    pub url: Option<Url>,

    /// Path to a TOML file holding backend settings
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Index namespace holding every bucket
    #[arg(long, global = true)]
    pub index: Option<String>,

    /// Prefix applied to every bucket name
    #[arg(long, global = true)]
    pub prefix: Option<String>,

    /// Write consistency: false, true or wait_for
    #[arg(long, global = true)]
    pub refresh: Option<Refresh>,

    /// Initial search page size, at most the `max_page_size` of the config file
    #[arg(long, global = true)]
    pub page_size: Option<usize>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: crate::Command,
}

impl Args {
    /// Settings given on the command line, applied over the config file.
    pub fn overrides(&self) -> crate::cli::op::Overrides {
        crate::cli::op::Overrides {
            url: self.url.clone(),
            index: self.index.clone(),
            prefix: self.prefix.clone(),
            refresh: self.refresh,
            page_size: self.page_size,
        }
    }
}

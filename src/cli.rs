use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Browse the Star Wars reference API from the terminal
#[derive(Parser)]
#[command(name = "holocron")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "HOLOCRON_CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Override the API base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Print JSON instead of text
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List one page of a resource
    List {
        /// people, films, planets or starships
        resource: String,
        /// Page number (clamped to the available range)
        #[arg(short, long, default_value_t = 1, allow_negative_numbers = true)]
        page: i64,
    },
    /// Show one entity and its related entities
    Show {
        resource: String,
        id: u64,
    },
    /// Search a resource by name or title
    Search {
        resource: String,
        query: String,
    },
    /// Show or change the light/dark preference
    Theme {
        #[arg(value_enum)]
        action: Option<ThemeAction>,
    },
    /// Simulate adding a resource (nothing is sent)
    Add {
        resource: String,
        /// Form field as key=value; repeat for more fields
        #[arg(short, long = "field", value_parser = parse_field)]
        fields: Vec<(String, String)>,
    },
    /// List the registered resource kinds
    Resources,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ThemeAction {
    Light,
    Dark,
    Toggle,
}

fn parse_field(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw.split_once('=').ok_or_else(|| format!("expected key=value, got '{raw}'"))?;
    if key.trim().is_empty() {
        return Err(format!("empty field name in '{raw}'"));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

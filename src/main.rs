mod cli;

use anyhow::{bail, Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands, ThemeAction};
use holocron::config::Config;
use holocron::detail::DetailSnapshot;
use holocron::list::ListSnapshot;
use holocron::registry::{Phase, Resolution, ResourceKey};
use holocron::storage::FilePreferenceStore;
use holocron::theme::{Theme, ThemeService};
use holocron::Holocron;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(url) = cli.base_url {
        config.base_url = url;
    }

    match cli.command {
        Commands::List { resource, page } => {
            let app = Holocron::new(config)?;
            let key = parse_key(&resource)?;
            let snap = app.list(key, page).await?;
            if cli.json {
                print_json(&snap)?;
            } else {
                print_list(&snap);
            }
            ensure_ready(&snap.phase)
        }
        Commands::Show { resource, id } => {
            let app = Holocron::new(config)?;
            let key = parse_key(&resource)?;
            let snap = app.show(key, id).await?;
            if cli.json {
                print_json(&snap)?;
            } else {
                print_detail(&snap);
            }
            ensure_ready(&snap.phase)
        }
        Commands::Search { resource, query } => {
            let app = Holocron::new(config)?;
            let key = parse_key(&resource)?;
            let hits = app.search(key, &query).await.map_err(|e| anyhow::anyhow!(e.user_message()))?;
            if cli.json {
                print_json(&hits)?;
            } else if hits.is_empty() {
                println!("Keine Treffer für '{query}'.");
            } else {
                for hit in hits {
                    println!("{:<32} {}", hit.label, hit.link);
                }
            }
            Ok(())
        }
        Commands::Theme { action } => {
            let store = FilePreferenceStore::open_default()?;
            let themes = ThemeService::new(Arc::new(store));
            let theme = match action {
                None => themes.current().await,
                Some(ThemeAction::Toggle) => themes.toggle().await?,
                Some(ThemeAction::Light) => {
                    themes.set(Theme::Light).await?;
                    Theme::Light
                }
                Some(ThemeAction::Dark) => {
                    themes.set(Theme::Dark).await?;
                    Theme::Dark
                }
            };
            println!("{theme}");
            Ok(())
        }
        Commands::Add { resource, fields } => {
            let app = Holocron::new(config)?;
            let key = parse_key(&resource)?;
            let (title, _) = holocron::drafts::form_schema(key);
            eprintln!("{title} ...");
            let receipt = app.submit_draft(key, &fields).await?;
            if cli.json {
                print_json(&receipt)?;
            } else {
                println!("Entwurf {} für {} erstellt (nicht gesendet).", receipt.draft_id, receipt.resource);
            }
            Ok(())
        }
        Commands::Resources => {
            let app = Holocron::new(config)?;
            for key in app.registry().keys() {
                let entry = app.registry().get(key)?;
                println!("{:<10} {}", key, entry.titles().list_title);
            }
            Ok(())
        }
    }
}

fn parse_key(raw: &str) -> Result<ResourceKey> {
    Ok(raw.parse::<ResourceKey>()?)
}

fn ensure_ready(phase: &Phase) -> Result<()> {
    match phase {
        Phase::Error(msg) => bail!("{msg}"),
        _ => Ok(()),
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).context("serializing output")?);
    Ok(())
}

// --- text rendering ---

fn print_list(snap: &ListSnapshot) {
    println!("{}", snap.title);
    if let Phase::Error(msg) = &snap.phase {
        eprintln!("{msg}");
        return;
    }
    if snap.cards.is_empty() {
        println!("{}", snap.empty_message);
        return;
    }
    for card in &snap.cards {
        println!();
        println!("{}  ({})", card.title, card.link);
        for field in &card.fields {
            println!("  {:<18} {}", field.label, field.value);
        }
        println!("  {:<18} {}", "Bild", card.image_url);
    }
    println!();
    println!("Seite {} von {} ({} Einträge)", snap.current_page, snap.total_pages, snap.total_count);
}

fn print_detail(snap: &DetailSnapshot) {
    println!("{}", snap.kicker);
    if let Phase::Error(msg) = &snap.phase {
        eprintln!("{msg}");
        return;
    }
    if let Some(title) = &snap.title {
        println!("{title}");
    }
    if let Some(subtitle) = &snap.subtitle {
        println!("{subtitle}");
    }
    if let Some(image) = &snap.image_url {
        println!("{image}");
    }
    println!();
    for field in &snap.fields {
        println!("  {:<18} {}", field.label, field.value);
    }
    for block in &snap.related {
        println!();
        println!("{}", block.title);
        match &block.content {
            Resolution::Single(None) => println!("  -"),
            Resolution::Single(Some(item)) => println!("  {}  ({})", item.label, item.link),
            Resolution::List(items) if items.is_empty() => println!("  -"),
            Resolution::List(items) => {
                for item in items {
                    match &item.subtitle {
                        Some(sub) => println!("  {} - {}  ({})", item.label, sub, item.link),
                        None => println!("  {}  ({})", item.label, item.link),
                    }
                }
            }
        }
    }
    println!();
    println!("{} ({})", snap.back_label, snap.back_link);
}

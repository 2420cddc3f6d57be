//! CLI administration tool for snaplink.
//!
//! Inspects and manages links and clicks directly through the configured
//! store, without requiring HTTP API access.
//!
//! # Usage
//!
//! ```bash
//! # List links, optionally for one owner
//! cargo run --bin admin -- link list --owner alice
//!
//! # Search by code, alias or URL
//! cargo run --bin admin -- link search promo
//!
//! # Rename a link
//! cargo run --bin admin -- link rename abc123 spring-sale
//!
//! # Click history of a code
//! cargo run --bin admin -- clicks abc123
//!
//! # View statistics
//! cargo run --bin admin -- stats
//!
//! # Check store connection
//! cargo run --bin admin -- store check
//! ```
//!
//! # Environment Variables
//!
//! Same as the server: `STORE_BACKEND`, `DATABASE_URL`, `STORE_TIMEOUT_MS`, ...
//! The in-memory backend starts empty, so the tool is mostly useful with
//! `STORE_BACKEND=postgres`.

use snaplink::config::{self, Config};
use snaplink::domain::entities::{LinkRecord, LinkSummary};
use snaplink::infrastructure::cache::NullCache;
use snaplink::server::build_store;
use snaplink::state::AppState;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use std::sync::Arc;
use tokio::sync::mpsc;

/// CLI tool for managing snaplink.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage links
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Show the click history of a code
    Clicks {
        /// Short code
        code: String,
    },

    /// Show statistics
    Stats,

    /// Store operations
    Store {
        #[command(subcommand)]
        action: StoreAction,
    },
}

/// Link management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// List links with click counts
    List {
        /// Only links of this owner
        #[arg(short, long)]
        owner: Option<String>,
    },

    /// Search links by code, alias or URL
    Search {
        /// Case-insensitive substring
        query: String,
    },

    /// Show one link
    Show {
        /// Short code
        code: String,
    },

    /// Delete a link
    Delete {
        /// Short code
        code: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Move a link to a new code
    Rename {
        /// Current code
        old_code: String,

        /// New code
        new_code: String,
    },
}

/// Store diagnostic subcommands.
#[derive(Subcommand)]
enum StoreAction {
    /// Check store connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Invalid configuration")?;
    let state = build_state(&config).await?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &state).await?,
        Commands::Clicks { code } => show_clicks(&state, &code).await?,
        Commands::Stats => handle_stats(&state).await?,
        Commands::Store { action } => handle_store_action(action, &state).await?,
    }

    Ok(())
}

/// Wires services over the configured store.
///
/// No click worker runs here; the tool never resolves links.
async fn build_state(config: &Config) -> Result<AppState> {
    let store = build_store(config).await?;
    let (click_tx, _click_rx) = mpsc::channel(1);

    Ok(AppState::new(
        store,
        Arc::new(NullCache::new()),
        click_tx,
        config.link_service_options(),
    ))
}

/// Dispatches link management commands.
async fn handle_link_action(action: LinkAction, state: &AppState) -> Result<()> {
    match action {
        LinkAction::List { owner } => list_links(state, owner).await?,
        LinkAction::Search { query } => search_links(state, &query).await?,
        LinkAction::Show { code } => show_link(state, &code).await?,
        LinkAction::Delete { code, yes } => delete_link(state, &code, yes).await?,
        LinkAction::Rename { old_code, new_code } => {
            rename_link(state, &old_code, &new_code).await?
        }
    }

    Ok(())
}

async fn list_links(state: &AppState, owner: Option<String>) -> Result<()> {
    let summaries = match owner {
        Some(owner) => {
            println!(
                "{} {}",
                "📋 Links of".bright_blue().bold(),
                owner.cyan().bold()
            );
            state.link_service.owner_links_with_counts(&owner).await?
        }
        None => {
            println!("{}", "📋 Links".bright_blue().bold());
            state.link_service.search_with_counts("").await?
        }
    };
    println!();

    print_summaries(&summaries);
    Ok(())
}

async fn search_links(state: &AppState, query: &str) -> Result<()> {
    println!(
        "{} {}",
        "🔍 Search:".bright_blue().bold(),
        query.cyan().bold()
    );
    println!();

    let summaries = state.link_service.search_with_counts(query).await?;
    print_summaries(&summaries);
    Ok(())
}

/// Prints links as a table.
///
/// # Output Format
///
/// ```text
///   Code             Clicks   URL
///   ──────────────────────────────────────────────────────────────
///   spring-sale      42       shop.example.com/sale
///   ba7816           0        https://example.com/a
/// ```
fn print_summaries(summaries: &[LinkSummary]) {
    if summaries.is_empty() {
        println!("{}", "  No links found".yellow());
        return;
    }

    println!(
        "  {:<16} {:<8} {}",
        "Code".bright_white().bold(),
        "Clicks".bright_white().bold(),
        "URL".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for summary in summaries {
        println!(
            "  {:<16} {:<8} {}",
            summary.short_code.cyan(),
            summary.click_count.to_string().bright_green(),
            summary.long_url
        );
    }

    println!();
    println!(
        "  Total: {}",
        summaries.len().to_string().bright_white().bold()
    );
    println!();
}

async fn show_link(state: &AppState, code: &str) -> Result<()> {
    let record = state.link_service.get(code).await?;
    let clicks = state.click_service.count_for(code).await?;

    print_link(&record);
    println!("  Clicks:     {}", clicks.to_string().bright_green().bold());
    println!();
    Ok(())
}

fn print_link(record: &LinkRecord) {
    let now = Utc::now();
    let status = if !record.active {
        "INACTIVE".red()
    } else if record.is_expired_at(now) {
        "EXPIRED".yellow()
    } else {
        "ACTIVE".green()
    };

    println!("{}", "🔗 Link".bright_blue().bold());
    println!();
    println!("  Code:       {}", record.short_code.cyan().bold());
    println!("  URL:        {}", record.long_url);
    println!("  Owner:      {}", record.owner_id);
    println!(
        "  Created:    {}",
        record.creation_timestamp.format("%Y-%m-%d %H:%M:%S")
    );
    println!(
        "  Expires:    {}",
        record.effective_expiration().format("%Y-%m-%d %H:%M:%S")
    );
    println!("  One-time:   {}", record.one_time_use);
    println!("  Status:     {}", status);
}

/// Deletes a link after confirmation (default: No).
async fn delete_link(state: &AppState, code: &str, skip_confirm: bool) -> Result<()> {
    let record = state.link_service.get(code).await?;
    print_link(&record);
    println!();

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    state.link_service.remove(code).await?;

    println!("{}", "✅ Link deleted".green().bold());
    println!();
    Ok(())
}

async fn rename_link(state: &AppState, old_code: &str, new_code: &str) -> Result<()> {
    let renamed = state
        .link_service
        .rename(old_code, new_code)
        .await
        .with_context(|| format!("Failed to rename '{}'", old_code))?;

    println!(
        "{} {} → {}",
        "✅ Renamed".green().bold(),
        old_code.bright_black(),
        renamed.short_code.cyan().bold()
    );
    println!(
        "{}",
        "   Clicks recorded under the old code stay there.".bright_black()
    );
    println!();
    Ok(())
}

/// Prints every click of `code`, oldest first.
async fn show_clicks(state: &AppState, code: &str) -> Result<()> {
    println!(
        "{} {}",
        "🖱  Clicks of".bright_blue().bold(),
        code.cyan().bold()
    );
    println!();

    let clicks = state.click_service.details_for(code).await?;
    if clicks.is_empty() {
        println!("{}", "  No clicks recorded".yellow());
        return Ok(());
    }

    for click in &clicks {
        println!(
            "  {}  {:<16} {:<12} {}",
            click
                .timestamp
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .bright_black(),
            click.ip_address,
            click.referrer,
            click.user_agent.bright_black()
        );
    }

    println!();
    println!("  Total: {}", clicks.len().to_string().bright_white().bold());
    println!();
    Ok(())
}

/// Displays system statistics.
///
/// Shows:
/// - Store backend
/// - Total number of links
/// - Total number of clicks
async fn handle_stats(state: &AppState) -> Result<()> {
    println!("{}", "📊 Statistics".bright_blue().bold());
    println!();

    let links_count = state.link_service.count().await?;
    let clicks_count = state.click_service.total_clicks().await?;

    println!("  Backend: {}", state.store.backend_name().bright_white());
    println!(
        "  Links:   {}",
        links_count.to_string().bright_green().bold()
    );
    println!(
        "  Clicks:  {}",
        clicks_count.to_string().bright_green().bold()
    );
    println!();

    Ok(())
}

/// Handles store diagnostic commands.
async fn handle_store_action(action: StoreAction, state: &AppState) -> Result<()> {
    match action {
        StoreAction::Check => {
            println!(
                "{} {}...",
                "🔍 Checking".bright_blue(),
                state.store.backend_name()
            );

            state
                .store
                .health_check()
                .await
                .map_err(|e| anyhow::anyhow!("Store check failed: {}", e))?;

            println!("{}", "✅ Store connection OK".green().bold());
        }
    }

    Ok(())
}

//! Command-line interface for subfeed.
//!
//! Provides commands for signing in and out, assembling the
//! subscription feed, searching the catalog and selecting a video for
//! playback. Feed and search output never includes view counts or
//! comment data; those are never requested in the first place.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use crate::adapters::{GoogleIdentity, TokenStore, YouTubeCatalog};
use crate::config;
use crate::core::App;
use crate::domain::{embed_url, SessionState, VideoId, VideoSummary};

/// subfeed - subscriptions-first video feed without the engagement chrome
#[derive(Parser, Debug)]
#[command(name = "subfeed")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and assemble the personalized feed
    Feed,

    /// Search the catalog for videos (short-form clips excluded)
    Search {
        /// Search query
        query: String,
    },

    /// Print the embed player URL for a video and select it for playback
    Play {
        /// Video id
        video_id: String,
    },

    /// Run the interactive sign-in flow
    Login,

    /// Sign out and clear feed, search results and playback selection
    Logout,

    /// Show the current session state
    Status,

    /// Show resolved configuration (secrets redacted)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Feed => show_feed().await,
            Commands::Search { query } => run_search(&query).await,
            Commands::Play { video_id } => play_video(&video_id).await,
            Commands::Login => login().await,
            Commands::Logout => logout().await,
            Commands::Status => show_status().await,
            Commands::Config => show_config(),
        }
    }
}

/// Build the app from resolved configuration. Fails when credentials
/// are missing or placeholders: the sign-in affordance is disabled
/// rather than letting a doomed network call fail later.
fn build_app() -> Result<App> {
    let cfg = config::config()?;

    if !cfg.credentials.is_configured() {
        anyhow::bail!(
            "credentials are missing or placeholders; set SUBFEED_CLIENT_ID and \
             SUBFEED_API_KEY or fill in .subfeed/config.yaml"
        );
    }

    let tokens = TokenStore::default();
    let provider = Arc::new(GoogleIdentity::new(&cfg.credentials, tokens.clone()));
    let catalog = Arc::new(YouTubeCatalog::new(cfg.credentials.api_key.clone(), tokens));

    Ok(App::new(provider, catalog))
}

/// Initialize and sign in, driving the transition handler the same way
/// the reactive loop would.
async fn sign_in(app: &App) -> Result<()> {
    app.session
        .initialize()
        .await
        .context("identity provider initialization failed")?;

    if !app.session.state().is_signed_in() {
        app.session.sign_in().await.context("sign-in failed")?;
    }

    Ok(())
}

async fn login() -> Result<()> {
    let app = build_app()?;
    sign_in(&app).await?;
    eprintln!("Signed in.");
    Ok(())
}

async fn logout() -> Result<()> {
    let app = build_app()?;
    app.session.initialize().await?;
    app.session.sign_out().await?;
    app.handle_transition(&SessionState::SignedOut).await;
    eprintln!("Signed out.");
    Ok(())
}

async fn show_status() -> Result<()> {
    let cfg = config::config()?;

    println!("Session: requires an interactive sign-in per run (nothing is persisted)");
    println!(
        "Credentials: {}",
        if cfg.credentials.is_configured() {
            "configured"
        } else {
            "missing or placeholders (sign-in disabled)"
        }
    );

    Ok(())
}

async fn show_feed() -> Result<()> {
    let app = build_app()?;
    sign_in(&app).await?;

    app.handle_transition(&app.session.state()).await;

    if let Some(message) = app.feed_error() {
        anyhow::bail!("could not assemble the feed: {}", message);
    }

    let feed = app.assembler.feed();
    if feed.is_empty() {
        println!("Nothing to show. Either no channel uploaded recently or everything was short-form.");
        return Ok(());
    }

    print_videos(&feed);
    Ok(())
}

async fn run_search(query: &str) -> Result<()> {
    if query.trim().is_empty() {
        // Ignored by design, not an error.
        return Ok(());
    }

    // Search needs only the API key, not a signed-in session.
    let app = build_app()?;

    let results = app
        .search
        .search(query)
        .await
        .context("search failed")?;

    if results.is_empty() {
        println!("No results for \"{}\".", query.trim());
        return Ok(());
    }

    print_videos(&results);
    Ok(())
}

async fn play_video(video_id: &str) -> Result<()> {
    let app = build_app()?;
    let id = VideoId::from(video_id);

    println!("{}", embed_url(&id));
    app.playback.lock().select(id);

    Ok(())
}

fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none)".to_string())
    );
    println!("Client id:   {}", redact(&cfg.credentials.client_id));
    println!("API key:     {}", redact(&cfg.credentials.api_key));
    println!("Scope:       {}", cfg.credentials.scope);

    Ok(())
}

/// Keep just enough of a secret to recognize it.
fn redact(value: &str) -> String {
    if value.is_empty() {
        return "(unset)".to_string();
    }
    if value.chars().count() <= 8 {
        return "********".to_string();
    }
    let head: String = value.chars().take(8).collect();
    format!("{}…", head)
}

/// Print feed or search rows: publish time, channel, title. No view
/// counts, no comments.
fn print_videos(videos: &[VideoSummary]) {
    println!("{:<17} {:<24} {}", "PUBLISHED", "CHANNEL", "TITLE");
    println!("{}", "-".repeat(80));

    for video in videos {
        println!(
            "{:<17} {:<24} {}",
            video.published_at.format("%Y-%m-%d %H:%M"),
            truncate(&video.channel_title, 23),
            video.title
        );
    }

    println!("\nTotal: {} videos", videos.len());
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact() {
        assert_eq!(redact(""), "(unset)");
        assert_eq!(redact("short"), "********");
        assert_eq!(redact("123456789-abc.apps.googleusercontent.com"), "12345678…");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 23), "short");
        let long = "a channel with a very long name indeed";
        assert_eq!(truncate(long, 10).chars().count(), 10);
    }
}

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use citelink_core::config_file;
use citelink_core::{CitationResolver, CitationSource, Config};
use citelink_snapshot::SnapshotDocument;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod output;

use output::ColorMode;

/// Citation link resolver - follow in-document citation links of a PDF to the cited work
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Read configuration from this file instead of the default locations
    #[arg(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Resolve one citation anchor to the cited work's URL
    Resolve {
        /// Path to the document snapshot (JSON)
        snapshot: PathBuf,

        /// Anchor name, i.e. the part of the link after '#'
        anchor: String,

        #[command(flatten)]
        search: SearchArgs,

        /// Print every normalized search result, not only the first
        #[arg(long)]
        show_results: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Dry run: show the bibliography entry an anchor points to, without searching
    Inspect {
        /// Path to the document snapshot (JSON)
        snapshot: PathBuf,

        /// Anchor name, i.e. the part of the link after '#'
        anchor: String,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the named destinations of a snapshot
    Anchors {
        /// Path to the document snapshot (JSON)
        snapshot: PathBuf,
    },

    /// Resolve every named destination of a snapshot
    ResolveAll {
        /// Path to the document snapshot (JSON)
        snapshot: PathBuf,

        #[command(flatten)]
        search: SearchArgs,

        /// Print results as JSON lines
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Default)]
struct SearchArgs {
    /// Web search backend: serply or searxng
    #[arg(long)]
    backend: Option<String>,

    /// Serply API key
    #[arg(long)]
    api_key: Option<String>,

    /// SearxNG instance URL
    #[arg(long)]
    searxng_url: Option<String>,

    /// Search request timeout in seconds
    #[arg(long)]
    timeout: Option<u64>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let color = ColorMode(!cli.no_color);
    let config_path = cli.config.as_deref();

    match cli.command {
        Command::Resolve {
            snapshot,
            anchor,
            search,
            show_results,
            json,
        } => {
            let config = build_config(config_path, &search)?;
            resolve(&snapshot, &anchor, config, show_results, json, color).await
        }
        Command::Inspect {
            snapshot,
            anchor,
            json,
        } => {
            let config = build_config(config_path, &SearchArgs::default())?;
            inspect(&snapshot, &anchor, &config, json, color).await
        }
        Command::Anchors { snapshot } => anchors(&snapshot),
        Command::ResolveAll {
            snapshot,
            search,
            json,
        } => {
            let config = build_config(config_path, &search)?;
            resolve_all(&snapshot, config, json, color).await
        }
    }
}

/// Resolve configuration: CLI flags > env vars > config file > defaults
fn build_config(config_path: Option<&Path>, search: &SearchArgs) -> anyhow::Result<Config> {
    let file = match config_path {
        Some(path) => config_file::load_from_path(path)
            .ok_or_else(|| anyhow::anyhow!("Could not read config file {}", path.display()))?,
        None => config_file::load_config(),
    };

    let mut config = Config::default();
    file.apply_to(&mut config)?;

    if let Ok(key) = std::env::var("SERPLY_API_KEY") {
        config.serply_api_key = Some(key);
    }
    if let Ok(url) = std::env::var("SEARXNG_URL") {
        config.searxng_url = Some(url);
    }

    if let Some(ref backend) = search.backend {
        config.search_backend = backend.parse()?;
    }
    if let Some(ref key) = search.api_key {
        config.serply_api_key = Some(key.clone());
    }
    if let Some(ref url) = search.searxng_url {
        config.searxng_url = Some(url.clone());
    }
    if let Some(secs) = search.timeout {
        config.search_timeout_secs = secs;
    }

    tracing::debug!(?config, "resolved configuration");
    Ok(config)
}

fn open_snapshot(path: &Path) -> anyhow::Result<SnapshotDocument> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    Ok(SnapshotDocument::open(path)?)
}

fn build_resolver(doc: SnapshotDocument, config: Config) -> anyhow::Result<CitationResolver> {
    let search = config.build_search_backend()?;
    Ok(CitationResolver::new(Arc::new(doc), search, config))
}

async fn resolve(
    snapshot: &Path,
    anchor: &str,
    config: Config,
    show_results: bool,
    json: bool,
    color: ColorMode,
) -> anyhow::Result<()> {
    let doc = open_snapshot(snapshot)?;
    let resolver = build_resolver(doc, config)?;
    let mut out = std::io::stdout();

    match resolver.resolve(anchor).await {
        Ok(resolved) if json => {
            writeln!(out, "{}", serde_json::to_string_pretty(&resolved)?)?;
            Ok(())
        }
        Ok(resolved) => {
            output::print_resolved(&mut out, anchor, &resolved, show_results, color)?;
            Ok(())
        }
        Err(e) => anyhow::bail!("{}", e),
    }
}

async fn inspect(
    snapshot: &Path,
    anchor: &str,
    config: &Config,
    json: bool,
    color: ColorMode,
) -> anyhow::Result<()> {
    let doc = open_snapshot(snapshot)?;
    let report = citelink_core::inspect_entry(&doc, &config.heuristics, anchor).await?;
    let mut out = std::io::stdout();

    if json {
        let entry: Vec<&str> = report.fragments[report.span.clone()]
            .iter()
            .map(|f| f.text.as_str())
            .collect();
        let value = serde_json::json!({
            "anchor": report.anchor,
            "page": report.page,
            "mode": format!("{:?}", report.destination.mode),
            "x": report.destination.target.x,
            "y": report.destination.target.y,
            "fragments": entry,
            "embedded_link": report.embedded_link,
            "citation_text": report.citation_text,
        });
        writeln!(out, "{}", serde_json::to_string_pretty(&value)?)?;
    } else {
        output::print_report(&mut out, &report, color)?;
    }
    Ok(())
}

fn anchors(snapshot: &Path) -> anyhow::Result<()> {
    let doc = open_snapshot(snapshot)?;
    let mut out = std::io::stdout();
    for anchor in doc.anchors() {
        writeln!(out, "{}", anchor)?;
    }
    Ok(())
}

async fn resolve_all(
    snapshot: &Path,
    config: Config,
    json: bool,
    color: ColorMode,
) -> anyhow::Result<()> {
    let doc = open_snapshot(snapshot)?;
    let anchors: Vec<String> = doc.anchors().map(str::to_string).collect();
    let resolver = build_resolver(doc, config)?;
    let mut out = std::io::stdout();

    let (mut metadata, mut search, mut failed) = (0, 0, 0);
    for anchor in &anchors {
        let result = resolver.resolve(anchor).await;
        match &result {
            Ok(resolved) if resolved.source == CitationSource::Metadata => metadata += 1,
            Ok(_) => search += 1,
            Err(_) => failed += 1,
        }

        if json {
            let value = match result {
                Ok(resolved) => serde_json::json!({ "anchor": anchor, "result": resolved }),
                Err(e) => serde_json::json!({ "anchor": anchor, "error": e.to_string() }),
            };
            writeln!(out, "{}", serde_json::to_string(&value)?)?;
        } else {
            match result {
                Ok(resolved) => output::print_resolved(&mut out, anchor, &resolved, false, color)?,
                Err(e) => output::print_failure(&mut out, anchor, &e, color)?,
            }
        }
    }

    if !json {
        output::print_summary(&mut out, metadata, search, failed, color)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[search]\nbackend = \"serply\"\ntimeout_secs = 30\nsearxng_url = \"http://file:8080\"\n",
        )
        .unwrap();

        let args = SearchArgs {
            backend: Some("searxng".into()),
            searxng_url: Some("http://flag:8080".into()),
            ..SearchArgs::default()
        };
        let config = build_config(Some(&path), &args).unwrap();

        assert_eq!(config.search_backend, citelink_core::SearchBackendKind::Searxng);
        assert_eq!(config.searxng_url.as_deref(), Some("http://flag:8080"));
        assert_eq!(config.search_timeout_secs, 30);
    }

    #[test]
    fn missing_config_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = build_config(Some(&dir.path().join("nope.toml")), &SearchArgs::default());
        assert!(err.is_err());
    }

    #[test]
    fn unknown_backend_flag_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.toml");
        std::fs::write(&path, "").unwrap();

        let args = SearchArgs {
            backend: Some("bing".into()),
            ..SearchArgs::default()
        };
        assert!(build_config(Some(&path), &args).is_err());
    }

    #[test]
    fn cli_parses_resolve() {
        let cli = Cli::try_parse_from([
            "citelink",
            "resolve",
            "paper.json",
            "cite.vaswani2017",
            "--backend",
            "searxng",
            "--no-color",
        ])
        .unwrap();
        assert!(cli.no_color);
        let Command::Resolve { anchor, search, .. } = cli.command else {
            panic!("expected resolve");
        };
        assert_eq!(anchor, "cite.vaswani2017");
        assert_eq!(search.backend.as_deref(), Some("searxng"));
    }
}

use std::io::Write;

use citelink_core::{CitationSource, EntryReport, ResolveError, ResolvedCitation};
use owo_colors::OwoColorize;

/// Whether to use colored output.
#[derive(Debug, Clone, Copy)]
pub struct ColorMode(pub bool);

impl ColorMode {
    pub fn enabled(&self) -> bool {
        self.0
    }
}

/// Print a successful resolution.
pub fn print_resolved(
    w: &mut dyn Write,
    anchor: &str,
    resolved: &ResolvedCitation,
    show_results: bool,
    color: ColorMode,
) -> std::io::Result<()> {
    let source = match resolved.source {
        CitationSource::Metadata => "embedded link",
        CitationSource::Search => "web search",
    };
    if color.enabled() {
        writeln!(
            w,
            "{} {} {}",
            anchor.bold(),
            "->".dimmed(),
            resolved.url.green()
        )?;
        writeln!(w, "  {}", format!("via {}", source).dimmed())?;
    } else {
        writeln!(w, "{} -> {}", anchor, resolved.url)?;
        writeln!(w, "  via {}", source)?;
    }

    if show_results && resolved.search_results.len() > 1 {
        writeln!(w, "  Other results:")?;
        for url in resolved.search_results.iter().skip(1) {
            writeln!(w, "    {}", url)?;
        }
    }
    Ok(())
}

/// Print a failed resolution.
pub fn print_failure(
    w: &mut dyn Write,
    anchor: &str,
    error: &ResolveError,
    color: ColorMode,
) -> std::io::Result<()> {
    if color.enabled() {
        writeln!(w, "{} {} {}", anchor.bold(), "x".red(), error.to_string().red())
    } else {
        writeln!(w, "{} x {}", anchor, error)
    }
}

/// Print what was found for an anchor without searching.
pub fn print_report(w: &mut dyn Write, report: &EntryReport, color: ColorMode) -> std::io::Result<()> {
    let dest = &report.destination;
    if color.enabled() {
        writeln!(w, "{} {}", "Anchor:".bold().cyan(), report.anchor.bold())?;
    } else {
        writeln!(w, "Anchor: {}", report.anchor)?;
    }
    writeln!(
        w,
        "  destination: {:?} at ({}, {}) on page {}",
        dest.mode, dest.target.x, dest.target.y, report.page
    )?;
    writeln!(
        w,
        "  fragments:   {}..{} of {}",
        report.span.start,
        report.span.end,
        report.fragments.len()
    )?;

    let entry: Vec<&str> = report.fragments[report.span.clone()]
        .iter()
        .map(|f| f.text.as_str())
        .collect();
    writeln!(w, "  raw text:    {}", entry.join(" | "))?;

    match &report.embedded_link {
        Some(url) if color.enabled() => writeln!(w, "  link:        {}", url.green())?,
        Some(url) => writeln!(w, "  link:        {}", url)?,
        None if color.enabled() => writeln!(w, "  link:        {}", "(none)".dimmed())?,
        None => writeln!(w, "  link:        (none)")?,
    }

    if report.citation_text.is_empty() {
        writeln!(w, "  query:       (empty)")?;
    } else {
        writeln!(w, "  query:       \"{}\"", report.citation_text)?;
    }
    Ok(())
}

/// Print the tally after resolving every anchor.
pub fn print_summary(
    w: &mut dyn Write,
    metadata: usize,
    search: usize,
    failed: usize,
    color: ColorMode,
) -> std::io::Result<()> {
    writeln!(w)?;
    if color.enabled() {
        writeln!(
            w,
            "{} {} from embedded links, {} from search, {} failed",
            "Summary:".bold(),
            metadata.to_string().green(),
            search.to_string().green(),
            if failed > 0 {
                failed.to_string().red().to_string()
            } else {
                failed.to_string()
            }
        )
    } else {
        writeln!(
            w,
            "Summary: {} from embedded links, {} from search, {} failed",
            metadata, search, failed
        )
    }
}

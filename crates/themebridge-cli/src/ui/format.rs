//! Catalog and entry graph listings.

use std::time::Duration;

use console::Term;
use indexmap::IndexSet;
use owo_colors::OwoColorize;
use themebridge_core::{AssetCatalog, AssetPath, EntryGraph, ExecutionContext};

/// One context's share of the listing: each asset appears under the first
/// context of [`ExecutionContext::DISPLAY_PRECEDENCE`] that lists it.
/// The flag is `true` for libraries.
pub fn catalog_groups(
    catalog: &AssetCatalog,
) -> Vec<(ExecutionContext, Vec<(&AssetPath, bool)>)> {
    let mut seen: IndexSet<&AssetPath> = IndexSet::new();
    ExecutionContext::DISPLAY_PRECEDENCE
        .into_iter()
        .map(|context| {
            let entry = catalog.entry(context);
            let sources = entry.sources.iter().map(|p| (p, false));
            let libraries = entry.libraries.iter().map(|p| (p, true));
            let assets = sources
                .chain(libraries)
                .filter(|(path, _)| seen.insert(*path))
                .collect();
            (context, assets)
        })
        .collect()
}

/// Print the catalog grouped by context.
pub fn print_catalog(catalog: &AssetCatalog) {
    let width = (Term::stderr().size().1 as usize).min(80);

    eprintln!("\n{}", "Asset Catalog".bold().underline());
    eprintln!("{}", "─".repeat(width));

    for (context, assets) in catalog_groups(catalog) {
        if assets.is_empty() {
            continue;
        }
        eprintln!("  {}", context.as_str().bright_white().bold());
        for (path, library) in assets {
            if library {
                eprintln!("    {} {} {}", "◦".dimmed(), path.as_str().dimmed(), "(library)".dimmed());
            } else {
                eprintln!("    {} {}", "▸".blue(), path);
            }
        }
    }

    eprintln!("{}", "─".repeat(width));
    let summary = catalog.summary();
    let libraries: usize = summary.counts.values().map(|c| c.libraries).sum();
    eprintln!(
        "  {} {} sources, {} libraries, build folder {}",
        "Total:".bold(),
        (summary.total() - libraries).green(),
        libraries.dimmed(),
        catalog.build_folder.cyan()
    );
}

/// Print the entries handed to the bundler and any missing sources.
pub fn print_entry_graph(graph: &EntryGraph) {
    eprintln!("\n{}", "Bundler Entries".bold().underline());
    for (name, path) in &graph.entries {
        eprintln!("  {} {} {}", "▸".blue(), name.bright_white().bold(), path.display().dimmed());
    }
    for path in &graph.missing {
        eprintln!("  {} {} {}", "✗".red(), path, "(not found)".red());
    }
}

/// Format duration in human-readable format.
///
/// ```
/// use std::time::Duration;
/// use themebridge_cli::ui::format_duration;
///
/// assert_eq!(format_duration(Duration::from_millis(50)), "50ms");
/// assert_eq!(format_duration(Duration::from_millis(1500)), "1.50s");
/// ```
pub fn format_duration(duration: Duration) -> String {
    let total_ms = duration.as_millis();
    if total_ms < 1000 {
        format!("{total_ms}ms")
    } else {
        format!("{:.2}s", duration.as_secs_f64())
    }
}

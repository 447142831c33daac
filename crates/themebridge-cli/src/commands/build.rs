//! Build command: write the bundler entry graph.
//!
//! The bundler config reads the JSON manifest and feeds `entries` to its
//! input option. Sources that are registered but missing on disk are
//! reported and left out.

use std::path::PathBuf;

use indexmap::IndexMap;
use serde::Serialize;
use themebridge_core::{AssetPath, bump_theme_version, generate_entries};

use crate::cli::BuildArgs;
use crate::commands::utils;
use crate::error::{Result, ResultExt};
use crate::ui;

/// JSON handed to the bundler.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildManifest {
    pub entries: IndexMap<String, PathBuf>,
    pub missing: Vec<AssetPath>,
    pub build_folder: String,
}

pub async fn execute(args: BuildArgs) -> Result<()> {
    let config = utils::load_config(&args.config)?;
    let builder = utils::catalog_builder(&config);
    let catalog = builder.build();
    let graph = generate_entries(&catalog, builder.theme_root());

    ui::print_entry_graph(&graph);
    if !graph.is_complete() {
        ui::warning(&format!(
            "{} registered source(s) not found on disk",
            graph.missing.len()
        ));
    }

    let manifest = BuildManifest {
        entries: graph.entries,
        missing: graph.missing,
        build_folder: catalog.build_folder.clone(),
    };
    let json = serde_json::to_string_pretty(&manifest)?;

    match &args.out {
        Some(out) => {
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await.with_path(parent)?;
            }
            tokio::fs::write(out, format!("{json}\n"))
                .await
                .context(format!("Writing {}", out.display()))?;
            ui::success(&format!(
                "Wrote {} entr{} to {}",
                manifest.entries.len(),
                if manifest.entries.len() == 1 { "y" } else { "ies" },
                out.display()
            ));
        }
        None => println!("{json}"),
    }

    if config.settings.auto_increment_version
        && let Some(bump) = bump_theme_version(&config.paths.theme_dir)?
    {
        ui::info(&format!("Theme version {} -> {}", bump.from, bump.to));
    }

    Ok(())
}

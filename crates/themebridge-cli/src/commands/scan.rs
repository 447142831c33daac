//! Scan command: print the asset catalog.

use crate::cli::ScanArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::ui;

pub async fn execute(args: ScanArgs) -> Result<()> {
    let config = utils::load_config(&args.config)?;
    let start = std::time::Instant::now();
    let catalog = utils::catalog_builder(&config).build();

    if args.json {
        println!("{}", serde_json::to_string_pretty(&catalog)?);
        return Ok(());
    }

    ui::info(&format!("Theme: {}", config.paths.theme_dir.display()));
    ui::print_catalog(&catalog);
    ui::success(&format!(
        "Scanned {} file(s) in {}",
        config.settings.php_files.len(),
        ui::format_duration(start.elapsed())
    ));
    Ok(())
}

//! Clean command: remove a shim left behind by an interrupted session.

use themebridge_core::ShimInstaller;

use crate::cli::CleanArgs;
use crate::commands::utils;
use crate::error::Result;
use crate::ui;

pub async fn execute(args: CleanArgs) -> Result<()> {
    let config = utils::load_config(&args.config)?;
    let installer = ShimInstaller::new(&config.paths.mu_plugins_dir);

    if installer.remove_orphan()? {
        ui::success(&format!("Removed {}", installer.shim_path().display()));
    } else {
        ui::info("No dev-mode shim installed");
    }
    Ok(())
}

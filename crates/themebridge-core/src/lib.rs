//! Asset detection and dev-mode shim generation for WordPress themes.
//!
//! The pipeline reads the theme's PHP sources, finds script and style
//! registrations, and folds them into an [`AssetCatalog`]:
//!
//! ```text
//! PHP files -> RegexScanner -> Registration
//!           -> classify_for + PathNormalizer + LibraryClassifier
//!           -> AssetCatalog (memoized by CatalogCache)
//!           -> { generate_entries, generate_shim }
//! ```
//!
//! # Example
//!
//! ```no_run
//! use themebridge_core::{CatalogBuilder, generate_entries};
//!
//! let builder = CatalogBuilder::new("/srv/wp/wp-content/themes/flavor", ["functions.php"]);
//! let catalog = builder.build();
//! let graph = generate_entries(&catalog, builder.theme_root());
//! for (name, path) in &graph.entries {
//!     println!("{name} -> {}", path.display());
//! }
//! ```

pub mod cache;
pub mod catalog;
pub mod context;
pub mod css;
pub mod entries;
pub mod error;
pub mod library;
pub mod normalize;
pub mod scanner;
pub mod shim;
pub mod theme_version;

pub use cache::CatalogCache;
pub use catalog::{AssetCatalog, AssetPath, CatalogBuilder, CatalogEntry, CatalogSummary};
pub use context::{AssetKind, ExecutionContext, classify, classify_for};
pub use css::CssUrlRewriter;
pub use entries::{EntryGraph, entry_name, generate_entries};
pub use error::{CoreError, Result};
pub use library::LibraryClassifier;
pub use normalize::{BUILD_FOLDER_CANDIDATES, PathNormalizer, detect_build_folder};
pub use scanner::{AssetScanner, Registration, RegexScanner, ScanReport};
pub use shim::{CONTROL_PREFIX, SHIM_FILE_NAME, ShimInstaller, ShimOptions, generate_shim};
pub use theme_version::{VersionBump, bump_theme_version};

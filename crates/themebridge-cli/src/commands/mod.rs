//! Command implementations.
//!
//! - [`dev`] - install the shim, serve the control endpoints, watch PHP
//! - [`build`] - write the bundler entry graph
//! - [`scan`] - print the asset catalog
//! - [`clean`] - remove a leftover shim
//!
//! Each module exposes an `execute` function taking its parsed arguments.

pub mod build;
pub mod clean;
pub mod dev;
pub mod scan;
pub(crate) mod utils;

pub use build::execute as build_execute;
pub use clean::execute as clean_execute;
pub use dev::execute as dev_execute;
pub use scan::execute as scan_execute;

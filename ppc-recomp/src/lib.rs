//! Static PowerPC → host recompiler core: function discovery over a
//! parsed [`image::Image`], per-opcode emission under [`recompiler`], and
//! the [`config::Config`]/[`diagnostics::Diagnostics`]/[`error::Error`]
//! ambient layers around it.
//!
//! Grounded on `fuel-vm`'s crate-root shape: one `lib.rs` re-exporting the
//! module tree, a `thiserror`-derived `Error` for aborting conditions, and
//! a single top-level driver type (here [`recompiler::discover_functions`]
//! plus [`recompiler::recompile_function`]) that owns a run's state.

pub mod analyzer;
pub mod config;
pub mod diagnostics;
pub mod emit;
pub mod error;
pub mod image;
pub mod recompiler;

pub use analyzer::{Block, Function};
pub use config::Config;
pub use diagnostics::{Diagnostic, Diagnostics};
pub use emit::Emitter;
pub use error::{Error, Result};
pub use image::Image;

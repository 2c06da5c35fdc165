//! Mailsheet Sheet Renderer
//!
//! Writes project records to a single-sheet xlsx workbook: a bold,
//! light-yellow header row of the Japanese field labels, one wrapped row per
//! record, an autofilter over the table and content-sized columns.
//!
//! Sentinel and unknown markers are written as blank cells.

#![warn(missing_docs)]

mod config;
mod error;
pub mod layout;
mod renderer;

pub use config::SheetConfig;
pub use error::SheetError;
pub use renderer::{RenderedSheet, SheetRenderer};

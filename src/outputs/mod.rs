//! Output generation for the display layer.
//!
//! # Submodules
//!
//! - [`json`]: Writes the [`ReadingsBundle`](crate::models::ReadingsBundle) as JSON
//! - [`markdown`]: Renders the bundle as Markdown, one section per source
//!
//! # Output Structure
//!
//! ```text
//! json_output_dir/
//! └── 2026-10-18.json
//!
//! markdown_output_dir/
//! └── 2026-10-18.md
//! ```

pub mod json;
pub mod markdown;

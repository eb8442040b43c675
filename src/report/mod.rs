//! Report rendering.

pub mod generator;

pub use generator::{
    distribution_lines, generate_json_report, prefixed, render_text_report, summary_lines,
};

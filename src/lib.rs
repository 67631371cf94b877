//! Descriptive plots of the cardiovascular examination dataset.
//!
//! Two independent pipelines read `medical_examination.csv`, derive the
//! `overweight` flag and normalized cholesterol/glucose levels, then draw either a
//! categorical bar chart ([`catplot::draw_cat_plot`]) or a correlation heatmap
//! ([`heatmap::draw_heat_map`]).

pub mod catplot;
pub mod config;
pub mod dataset;
pub mod error;
pub mod heatmap;
pub mod palette;
pub mod records;
pub mod stats;

pub use catplot::{draw_cat_plot, CatPlot, CategoryCount};
pub use config::Config;
pub use error::{Result, VisualizerError};
pub use heatmap::{draw_heat_map, Heatmap};
pub use records::MedicalRecord;

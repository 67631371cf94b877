use std::path::PathBuf;

use polars::prelude::PolarsError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum VisualizerError {
    #[error("could not open {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Polars(#[from] PolarsError),
    #[error("column {column:?} has no values to take a quantile of")]
    EmptyColumn { column: String },
    #[error("failed to draw {figure}: {message}")]
    Plot {
        figure: &'static str,
        message: String,
    },
}

impl VisualizerError {
    pub(crate) fn plot<E: std::fmt::Display>(figure: &'static str, error: E) -> Self {
        VisualizerError::Plot {
            figure,
            message: error.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, VisualizerError>;

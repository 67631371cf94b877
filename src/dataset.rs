use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use log::{debug, info};
use polars::prelude::*;

use crate::config::{BMI_THRESHOLD, NORMAL_LEVEL};
use crate::error::{Result, VisualizerError};
use crate::records::MedicalRecord;

/// The six binary risk factors compared by the categorical plot.
pub static RISK_FACTORS: [&str; 6] = ["cholesterol", "gluc", "smoke", "alco", "active", "overweight"];

pub fn read_csv<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|source| VisualizerError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let df = CsvReader::new(file)
        .has_header(true)
        .with_dtypes(Option::from(Arc::new(MedicalRecord::schema().clone())))
        .finish()?;

    info!("loaded {} examinations from {}", df.height(), path.display());
    Ok(df)
}

/// Adds `overweight` and turns `cholesterol`/`gluc` into 0 (normal) / 1 (above normal).
pub fn derive_columns(df: DataFrame) -> Result<DataFrame> {
    let height_m = col("height").cast(DataType::Float64) / lit(100.0);
    let bmi = col("weight").cast(DataType::Float64) / (height_m.clone() * height_m);

    let df = df
        .lazy()
        .with_columns([
            bmi.gt(lit(BMI_THRESHOLD))
                .cast(DataType::Int64)
                .alias("overweight"),
            binarize("cholesterol"),
            binarize("gluc"),
        ])
        .collect()?;

    debug!("derived columns:\n{}", df.head(Some(5)));
    Ok(df)
}

fn binarize(name: &str) -> Expr {
    col(name)
        .gt(lit(NORMAL_LEVEL))
        .cast(DataType::Int64)
        .alias(name)
}

/// Reads the dataset fresh from disk and applies [`derive_columns`].
pub fn load_derived<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    derive_columns(read_csv(path)?)
}

use std::path::{Path, PathBuf};

pub static DATA_FILE_NAME: &str = "medical_examination.csv";
pub static CATPLOT_FILE_NAME: &str = "catplot.png";
pub static HEATMAP_FILE_NAME: &str = "heatmap.png";

/// BMI above which a patient counts as overweight.
pub const BMI_THRESHOLD: f64 = 25.0;
/// Ordinal cholesterol/glucose codes above this are "above normal".
pub const NORMAL_LEVEL: i64 = 1;
pub const QUANTILE_LOW: f64 = 0.025;
pub const QUANTILE_HIGH: f64 = 0.975;
pub const HEATMAP_CENTER: f64 = 0.0;
pub const HEATMAP_VMAX: f64 = 0.32;

/// Where a run reads its dataset and writes its images.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub input: PathBuf,
    pub output_dir: PathBuf,
}

impl Config {
    pub fn new<P: Into<PathBuf>, Q: Into<PathBuf>>(input: P, output_dir: Q) -> Self {
        Config {
            input: input.into(),
            output_dir: output_dir.into(),
        }
    }

    pub fn input(&self) -> &Path {
        &self.input
    }

    pub fn catplot_path(&self) -> PathBuf {
        self.output_dir.join(CATPLOT_FILE_NAME)
    }

    pub fn heatmap_path(&self) -> PathBuf {
        self.output_dir.join(HEATMAP_FILE_NAME)
    }
}

impl Default for Config {
    fn default() -> Self {
        Config::new(DATA_FILE_NAME, ".")
    }
}

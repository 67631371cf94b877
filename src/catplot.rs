//! Risk-factor prevalence split by cardiovascular-disease status.
//!
//! The derived table is melted into `(cardio, variable, value)` triples, counted per
//! group and drawn as one bar-chart facet per `cardio` level.

use std::path::Path;

use log::{debug, info};
use plotters::coord::Shift;
use plotters::prelude::*;
use polars::prelude::*;

use crate::config::Config;
use crate::dataset::{load_derived, RISK_FACTORS};
use crate::error::{Result, VisualizerError};
use crate::palette;

/// Pixel size of one facet: 5 units high, aspect 1.2, at 100 px per unit.
const FACET_SIZE: (u32, u32) = (600, 500);
const BAR_GROUP_WIDTH: f64 = 0.8;

/// One row of the long-form count table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryCount {
    pub cardio: i64,
    pub variable: String,
    pub value: i64,
    pub total: u32,
}

/// Wide-to-long reshape of the risk factors, keeping `cardio` as identifier.
pub fn melt_risk_factors(df: &DataFrame) -> Result<DataFrame> {
    Ok(df.melt(["cardio"], RISK_FACTORS)?)
}

/// Counts rows per `(cardio, variable, value)` into a `total` column.
pub fn count_risk_factors(df: &DataFrame) -> Result<DataFrame> {
    let long = melt_risk_factors(df)?;
    let counts = long
        .lazy()
        .groupby([col("cardio"), col("variable"), col("value")])
        .agg([count().alias("total")])
        .collect()?;
    Ok(counts)
}

fn counts_to_rows(counts: &DataFrame) -> Result<Vec<CategoryCount>> {
    let cardio = counts.column("cardio")?.cast(&DataType::Int64)?;
    let variable = counts.column("variable")?.utf8()?;
    let value = counts.column("value")?.cast(&DataType::Int64)?;
    let total = counts.column("total")?.cast(&DataType::UInt32)?;

    let mut rows: Vec<CategoryCount> = cardio
        .i64()?
        .into_no_null_iter()
        .zip(variable.into_no_null_iter())
        .zip(value.i64()?.into_no_null_iter())
        .zip(total.u32()?.into_no_null_iter())
        .map(|(((cardio, variable), value), total)| CategoryCount {
            cardio,
            variable: variable.to_string(),
            value,
            total,
        })
        .collect();

    rows.sort_by(|a, b| {
        (a.cardio, &a.variable, a.value).cmp(&(b.cardio, &b.variable, b.value))
    });
    Ok(rows)
}

/// The categorical bar chart, backed by its count table.
#[derive(Debug, Clone, PartialEq)]
pub struct CatPlot {
    counts: Vec<CategoryCount>,
}

impl CatPlot {
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let counts = count_risk_factors(df)?;
        debug!("risk factor counts:\n{}", counts);
        Ok(CatPlot {
            counts: counts_to_rows(&counts)?,
        })
    }

    /// Count rows ordered by `(cardio, variable, value)`.
    pub fn counts(&self) -> &[CategoryCount] {
        &self.counts
    }

    pub fn cardio_levels(&self) -> Vec<i64> {
        let mut levels: Vec<i64> = self.counts.iter().map(|c| c.cardio).collect();
        levels.dedup();
        levels
    }

    pub fn variables(&self) -> Vec<&str> {
        let mut variables: Vec<&str> = self.counts.iter().map(|c| c.variable.as_str()).collect();
        variables.sort_unstable();
        variables.dedup();
        variables
    }

    pub fn values(&self) -> Vec<i64> {
        let mut values: Vec<i64> = self.counts.iter().map(|c| c.value).collect();
        values.sort_unstable();
        values.dedup();
        values
    }

    /// Count for one bar, zero when the group never occurs.
    pub fn total(&self, cardio: i64, variable: &str, value: i64) -> u32 {
        self.counts
            .iter()
            .find(|c| c.cardio == cardio && c.variable == variable && c.value == value)
            .map_or(0, |c| c.total)
    }

    pub fn variable_total(&self, variable: &str) -> u64 {
        self.counts
            .iter()
            .filter(|c| c.variable == variable)
            .map(|c| c.total as u64)
            .sum()
    }

    pub fn render(&self, path: &Path) -> Result<()> {
        let facets = self.cardio_levels();
        let width = FACET_SIZE.0 * facets.len().max(1) as u32;

        let root = BitMapBackend::new(path, (width, FACET_SIZE.1)).into_drawing_area();
        root.fill(&WHITE).map_err(|e| VisualizerError::plot("catplot", e))?;

        let y_max = self.counts.iter().map(|c| c.total).max().unwrap_or(0).max(1) as f64 * 1.05;
        let areas = root.split_evenly((1, facets.len().max(1)));
        for (area, cardio) in areas.iter().zip(&facets) {
            self.draw_facet(area, *cardio, y_max)?;
        }

        root.present().map_err(|e| VisualizerError::plot("catplot", e))?;
        Ok(())
    }

    fn draw_facet(&self, area: &DrawingArea<BitMapBackend, Shift>, cardio: i64, y_max: f64) -> Result<()> {
        let variables = self.variables();
        let values = self.values();
        let n = variables.len();
        let bar_width = BAR_GROUP_WIDTH / values.len().max(1) as f64;

        // Groups are centered on integer x so each mesh label lands under its group.
        let mut chart = ChartBuilder::on(area)
            .caption(format!("cardio = {}", cardio), ("sans-serif", 22))
            .margin(15)
            .x_label_area_size(40)
            .y_label_area_size(60)
            .build_cartesian_2d(-0.5f64..(n as f64 - 0.5), 0f64..y_max)
            .map_err(|e| VisualizerError::plot("catplot", e))?;

        let label = |x: &f64| group_label(&variables, *x);
        chart
            .configure_mesh()
            .disable_x_mesh()
            .x_labels(n)
            .x_label_formatter(&label)
            .y_label_formatter(&|y| format!("{:.0}", y))
            .x_desc("variable")
            .y_desc("total")
            .draw()
            .map_err(|e| VisualizerError::plot("catplot", e))?;

        for (hue, value) in values.iter().enumerate() {
            let color = palette::hue(hue);
            let bars: Vec<Rectangle<(f64, f64)>> = variables
                .iter()
                .enumerate()
                .map(|(i, variable)| {
                    let left = i as f64 - BAR_GROUP_WIDTH / 2.0 + hue as f64 * bar_width;
                    let height = self.total(cardio, variable, *value) as f64;
                    Rectangle::new([(left, 0.0), (left + bar_width, height)], color.filled())
                })
                .collect();

            chart
                .draw_series(bars)
                .map_err(|e| VisualizerError::plot("catplot", e))?
                .label(format!("value = {}", value))
                .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
        }

        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(|e| VisualizerError::plot("catplot", e))?;
        Ok(())
    }
}

fn group_label(variables: &[&str], x: f64) -> String {
    let i = x.round();
    if (x - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    variables
        .get(i as usize)
        .map(|v| v.to_string())
        .unwrap_or_default()
}

/// Loads the dataset, builds the count table and writes `catplot.png`.
pub fn draw_cat_plot(config: &Config) -> Result<CatPlot> {
    let df = load_derived(config.input())?;
    let figure = CatPlot::from_frame(&df)?;

    let path = config.catplot_path();
    figure.render(&path)?;
    info!("wrote {}", path.display());
    Ok(figure)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn derived() -> DataFrame {
        DataFrame::new(vec![
            Series::new("cardio", &[0i64, 1, 1, 0, 1]),
            Series::new("cholesterol", &[0i64, 1, 1, 0, 0]),
            Series::new("gluc", &[0i64, 0, 1, 0, 0]),
            Series::new("smoke", &[0i64, 0, 0, 1, 0]),
            Series::new("alco", &[0i64, 0, 0, 0, 0]),
            Series::new("active", &[1i64, 1, 0, 1, 1]),
            Series::new("overweight", &[0i64, 1, 1, 1, 0]),
        ])
        .unwrap()
    }

    #[test]
    fn test_melt_keeps_every_pair() {
        let long = melt_risk_factors(&derived()).unwrap();
        assert_eq!(long.height(), 5 * RISK_FACTORS.len());
        assert_eq!(long.get_column_names(), &["cardio", "variable", "value"]);
    }

    #[test]
    fn test_counts_cover_every_row() {
        let plot = CatPlot::from_frame(&derived()).unwrap();
        for variable in RISK_FACTORS {
            assert_eq!(plot.variable_total(variable), 5, "{}", variable);
        }
    }

    #[test]
    fn test_group_totals() {
        let plot = CatPlot::from_frame(&derived()).unwrap();
        assert_eq!(plot.total(1, "cholesterol", 1), 2);
        assert_eq!(plot.total(1, "cholesterol", 0), 1);
        assert_eq!(plot.total(0, "active", 1), 2);
        assert_eq!(plot.total(0, "alco", 0), 2);
        // never observed
        assert_eq!(plot.total(0, "alco", 1), 0);
    }

    #[test]
    fn test_counts_are_sorted_by_group_keys() {
        let plot = CatPlot::from_frame(&derived()).unwrap();
        let keys: Vec<(i64, &str, i64)> = plot
            .counts()
            .iter()
            .map(|c| (c.cardio, c.variable.as_str(), c.value))
            .collect();
        let mut sorted = keys.clone();
        sorted.sort();
        assert_eq!(keys, sorted);
        assert_eq!(keys[0], (0, "active", 1));
        assert_eq!(plot.cardio_levels(), vec![0, 1]);
        assert_eq!(
            plot.variables(),
            vec!["active", "alco", "cholesterol", "gluc", "overweight", "smoke"]
        );
    }

    #[test]
    fn test_group_label_only_on_centers() {
        let variables = ["active", "alco"];
        assert_eq!(group_label(&variables, 0.0), "active");
        assert_eq!(group_label(&variables, 1.0), "alco");
        assert_eq!(group_label(&variables, 0.5), "");
        assert_eq!(group_label(&variables, 2.0), "");
        assert_eq!(group_label(&variables, -1.0), "");
    }
}

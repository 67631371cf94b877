//! Correlation heatmap over the cleaned examination table.

use std::path::Path;

use log::{debug, info};
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use polars::prelude::*;

use crate::config::{Config, HEATMAP_CENTER, HEATMAP_VMAX, QUANTILE_HIGH, QUANTILE_LOW};
use crate::dataset::load_derived;
use crate::error::{Result, VisualizerError};
use crate::palette::{self, DivergingScale};
use crate::stats::{upper_triangle_mask, CorrelationMatrix, QuantileBounds};

/// 10 x 8 units at 100 px per unit.
const FIGURE_SIZE: (u32, u32) = (1000, 800);
/// Width of the square heatmap panel; the rest holds the color bar.
const PANEL_WIDTH: u32 = 800;
const COLORBAR_SHRINK: f64 = 0.5;
const COLORBAR_STEPS: usize = 128;

/// Drops rows with inverted blood pressure or height/weight outside the central
/// 95% of the unfiltered table.
pub fn clean_for_heatmap(df: DataFrame) -> Result<DataFrame> {
    let height = QuantileBounds::of(df.column("height")?, QUANTILE_LOW, QUANTILE_HIGH)?;
    let weight = QuantileBounds::of(df.column("weight")?, QUANTILE_LOW, QUANTILE_HIGH)?;
    debug!("height bounds {:?}, weight bounds {:?}", height, weight);

    let df = df
        .lazy()
        .filter(
            col("ap_lo")
                .lt_eq(col("ap_hi"))
                .and(within("height", height))
                .and(within("weight", weight)),
        )
        .collect()?;
    Ok(df)
}

fn within(name: &str, bounds: QuantileBounds) -> Expr {
    let value = col(name).cast(DataType::Float64);
    value
        .clone()
        .gt_eq(lit(bounds.lower))
        .and(value.lt_eq(lit(bounds.upper)))
}

/// Lower-triangle correlation heatmap.
#[derive(Debug, Clone, PartialEq)]
pub struct Heatmap {
    corr: CorrelationMatrix,
    mask: Vec<Vec<bool>>,
    scale: DivergingScale,
    lower: f64,
}

impl Heatmap {
    pub fn new(corr: CorrelationMatrix) -> Self {
        let mask = upper_triangle_mask(corr.len());

        let mut lower = f64::INFINITY;
        for i in 0..corr.len() {
            for j in 0..corr.len() {
                let r = corr.get(i, j);
                if !mask[i][j] && !r.is_nan() {
                    lower = lower.min(r);
                }
            }
        }
        if !lower.is_finite() {
            lower = HEATMAP_CENTER - HEATMAP_VMAX;
        }

        Heatmap {
            scale: DivergingScale::new(HEATMAP_CENTER, lower, HEATMAP_VMAX),
            corr,
            mask,
            lower,
        }
    }

    pub fn correlation(&self) -> &CorrelationMatrix {
        &self.corr
    }

    pub fn mask(&self) -> &[Vec<bool>] {
        &self.mask
    }

    /// Whether cell `(row, col)` gets drawn.
    pub fn is_visible(&self, row: usize, col: usize) -> bool {
        !self.mask[row][col] && !self.corr.get(row, col).is_nan()
    }

    /// Values spanned by the color bar; the top is always the clamped maximum.
    fn colorbar_range(&self) -> (f64, f64) {
        if self.lower < HEATMAP_VMAX {
            (self.lower, HEATMAP_VMAX)
        } else {
            (self.scale.vmin(), self.scale.vmax())
        }
    }

    pub fn render(&self, path: &Path) -> Result<()> {
        let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
        root.fill(&WHITE).map_err(|e| VisualizerError::plot("heatmap", e))?;

        let (panel, colorbar) = root.split_horizontally(PANEL_WIDTH);
        if !self.corr.is_empty() {
            self.draw_cells(&panel)?;
        }
        self.draw_colorbar(&colorbar)?;

        root.present().map_err(|e| VisualizerError::plot("heatmap", e))?;
        Ok(())
    }

    fn draw_cells(&self, area: &DrawingArea<BitMapBackend, Shift>) -> Result<()> {
        let n = self.corr.len();
        let last = n as f64 - 0.5;
        let columns = self.corr.columns();

        // Equal label areas on both axes keep the cells square in a square panel.
        let mut chart = ChartBuilder::on(area)
            .margin(20)
            .x_label_area_size(100)
            .y_label_area_size(100)
            .build_cartesian_2d(-0.5f64..last, -0.5f64..last)
            .map_err(|e| VisualizerError::plot("heatmap", e))?;

        // Row 0 is drawn at the top.
        let flip = |y: f64| (n as f64 - 1.0) - y;
        let x_label = |x: &f64| axis_label(columns, *x);
        let y_label = |y: &f64| axis_label(columns, flip(*y));
        chart
            .configure_mesh()
            .disable_mesh()
            .x_labels(n)
            .y_labels(n)
            .x_label_formatter(&x_label)
            .y_label_formatter(&y_label)
            .x_label_style(
                ("sans-serif", 14)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .y_label_style(("sans-serif", 14))
            .draw()
            .map_err(|e| VisualizerError::plot("heatmap", e))?;

        let mut cells = Vec::new();
        let mut borders = Vec::new();
        let mut notes = Vec::new();
        for i in 0..n {
            for j in 0..n {
                if !self.is_visible(i, j) {
                    continue;
                }
                let r = self.corr.get(i, j);
                let (x, y) = (j as f64, flip(i as f64));
                let corners = [(x - 0.5, y - 0.5), (x + 0.5, y + 0.5)];
                let fill = self.scale.color(r);

                cells.push(Rectangle::new(corners, fill.filled()));
                borders.push(Rectangle::new(corners, WHITE.stroke_width(1)));
                notes.push(Text::new(
                    format!("{:.1}", r),
                    (x, y),
                    ("sans-serif", 13)
                        .into_font()
                        .color(&palette::text_on(fill))
                        .pos(Pos::new(HPos::Center, VPos::Center)),
                ));
            }
        }

        chart
            .draw_series(cells)
            .map_err(|e| VisualizerError::plot("heatmap", e))?;
        chart
            .draw_series(borders)
            .map_err(|e| VisualizerError::plot("heatmap", e))?;
        chart
            .draw_series(notes)
            .map_err(|e| VisualizerError::plot("heatmap", e))?;
        Ok(())
    }

    fn draw_colorbar(&self, area: &DrawingArea<BitMapBackend, Shift>) -> Result<()> {
        let (_, height) = area.dim_in_pixel();
        let inset = (height as f64 * (1.0 - COLORBAR_SHRINK) / 2.0) as u32;
        let bar = area.margin(inset, inset, 10, 0);

        let (lower, upper) = self.colorbar_range();

        let mut chart = ChartBuilder::on(&bar)
            .right_y_label_area_size(60)
            .build_cartesian_2d(0f64..1f64, lower..upper)
            .map_err(|e| VisualizerError::plot("heatmap", e))?;
        chart
            .configure_mesh()
            .disable_mesh()
            .disable_x_axis()
            .y_labels(7)
            .y_label_formatter(&|v| format!("{:.2}", v))
            .draw()
            .map_err(|e| VisualizerError::plot("heatmap", e))?;

        let step = (upper - lower) / COLORBAR_STEPS as f64;
        chart
            .draw_series((0..COLORBAR_STEPS).map(|k| {
                let from = lower + k as f64 * step;
                let color = self.scale.color(from + step / 2.0);
                Rectangle::new([(0.0, from), (1.0, from + step)], color.filled())
            }))
            .map_err(|e| VisualizerError::plot("heatmap", e))?;
        Ok(())
    }
}

fn axis_label(columns: &[String], position: f64) -> String {
    let i = position.round();
    if (position - i).abs() > 1e-6 || i < 0.0 {
        return String::new();
    }
    columns.get(i as usize).cloned().unwrap_or_default()
}

/// Loads the dataset, filters it, correlates it and writes `heatmap.png`.
pub fn draw_heat_map(config: &Config) -> Result<Heatmap> {
    let df = load_derived(config.input())?;
    let total = df.height();
    let df = clean_for_heatmap(df)?;
    info!("kept {} of {} examinations after cleaning", df.height(), total);

    let figure = Heatmap::new(CorrelationMatrix::from_frame(&df)?);

    let path = config.heatmap_path();
    figure.render(&path)?;
    info!("wrote {}", path.display());
    Ok(figure)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exams() -> DataFrame {
        DataFrame::new(vec![
            Series::new("height", &[150i64, 160, 170, 180, 190, 165, 175, 155]),
            Series::new("weight", &[50.0, 60.0, 70.0, 80.0, 90.0, 65.0, 75.0, 55.0]),
            Series::new("ap_hi", &[120i64, 110, 130, 140, 120, 80, 120, 120]),
            Series::new("ap_lo", &[80i64, 70, 90, 90, 80, 90, 80, 80]),
        ])
        .unwrap()
    }

    #[test]
    fn test_cleaning_drops_inverted_pressure_and_extremes() {
        let cleaned = clean_for_heatmap(exams()).unwrap();
        let heights: Vec<i64> = cleaned
            .column("height")
            .unwrap()
            .i64()
            .unwrap()
            .into_no_null_iter()
            .collect();
        // 150/50 and 190/90 fall outside the bounds, 165 has ap_lo > ap_hi.
        assert_eq!(heights, vec![160, 170, 180, 175, 155]);
    }

    #[test]
    fn test_cleaned_rows_respect_bounds() {
        let raw = exams();
        let height = QuantileBounds::of(raw.column("height").unwrap(), QUANTILE_LOW, QUANTILE_HIGH).unwrap();
        let cleaned = clean_for_heatmap(raw).unwrap();

        let hi = cleaned.column("ap_hi").unwrap().i64().unwrap();
        let lo = cleaned.column("ap_lo").unwrap().i64().unwrap();
        for (hi, lo) in hi.into_no_null_iter().zip(lo.into_no_null_iter()) {
            assert!(lo <= hi);
        }
        for h in cleaned.column("height").unwrap().i64().unwrap().into_no_null_iter() {
            assert!(h as f64 >= height.lower && h as f64 <= height.upper);
        }
    }

    #[test]
    fn test_heatmap_hides_upper_triangle() {
        let corr = CorrelationMatrix::from_frame(&exams()).unwrap();
        let heatmap = Heatmap::new(corr);
        for i in 0..4 {
            assert!(!heatmap.is_visible(i, i));
        }
        assert!(heatmap.is_visible(1, 0));
        assert!(!heatmap.is_visible(0, 1));
        assert_eq!(heatmap.mask().len(), 4);
    }

    #[test]
    fn test_scale_is_centered_with_clamped_top() {
        let df = DataFrame::new(vec![
            Series::new("a", &[1.0, 2.0, 3.0, 4.0]),
            Series::new("b", &[4.0, 3.0, 2.0, 1.0]),
        ])
        .unwrap();
        let heatmap = Heatmap::new(CorrelationMatrix::from_frame(&df).unwrap());
        // The only visible cell is -1, so the lower side sets the span.
        assert_eq!(heatmap.scale.center, 0.0);
        assert!((heatmap.scale.half_range - 1.0).abs() < 1e-12);

        let df = DataFrame::new(vec![
            Series::new("a", &[1.0, 2.0, 3.0, 4.0]),
            Series::new("b", &[1.0, 3.0, 2.0, 4.0]),
        ])
        .unwrap();
        let heatmap = Heatmap::new(CorrelationMatrix::from_frame(&df).unwrap());
        assert_eq!(heatmap.scale.half_range, HEATMAP_VMAX);
    }

    #[test]
    fn test_colorbar_tops_out_at_vmax() {
        let df = DataFrame::new(vec![
            Series::new("a", &[1.0, 2.0, 3.0, 4.0]),
            Series::new("b", &[4.0, 3.0, 1.0, 2.0]),
        ])
        .unwrap();
        let heatmap = Heatmap::new(CorrelationMatrix::from_frame(&df).unwrap());
        let (lower, upper) = heatmap.colorbar_range();
        assert!((lower + 0.8).abs() < 1e-12);
        assert_eq!(upper, HEATMAP_VMAX);

        // Every visible value above the clamp falls back to the symmetric span.
        let df = DataFrame::new(vec![
            Series::new("a", &[1.0, 2.0, 3.0, 4.0]),
            Series::new("b", &[1.0, 3.0, 2.0, 4.0]),
        ])
        .unwrap();
        let heatmap = Heatmap::new(CorrelationMatrix::from_frame(&df).unwrap());
        assert_eq!(heatmap.colorbar_range(), (-HEATMAP_VMAX, HEATMAP_VMAX));
    }

    #[test]
    fn test_axis_label_positions() {
        let columns = vec!["id".to_string(), "age".to_string()];
        assert_eq!(axis_label(&columns, 1.0), "age");
        assert_eq!(axis_label(&columns, 0.5), "");
        assert_eq!(axis_label(&columns, 3.0), "");
    }
}

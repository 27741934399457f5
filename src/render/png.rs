//! Two-panel PNG figure.
//!
//! Top panel: average bearing over time with horizontal QC range lines.
//! Bottom panel: histogram of every bearing with vertical QC range lines.

use super::{Histogram, Renderer};
use crate::config::OutputConfig;
use crate::error::{AvrbError, Result};
use crate::models::{BearingTimeSeries, QcRange};
use crate::processor::StationStatistics;
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut};
use imageproc::rect::Rect;
use std::path::Path;
use tracing::debug;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const FRAME: Rgb<u8> = Rgb([0, 0, 0]);
const GRID: Rgb<u8> = Rgb([220, 220, 220]);
const SERIES: Rgb<u8> = Rgb([31, 119, 180]);
const QC_LINE: Rgb<u8> = Rgb([255, 0, 0]);

/// Degrees between bearing grid lines
const GRID_STEP: f64 = 45.0;

/// Pixel rectangle of one panel
#[derive(Debug, Clone, Copy, PartialEq)]
struct PlotArea {
    left: f32,
    top: f32,
    width: f32,
    height: f32,
}

impl PlotArea {
    /// Horizontal pixel of a value within [lo, hi]
    fn x(&self, value: f64, lo: f64, hi: f64) -> f32 {
        self.left + (fraction(value, lo, hi) as f32) * self.width
    }

    /// Vertical pixel of a value within [lo, hi], growing upwards
    fn y(&self, value: f64, lo: f64, hi: f64) -> f32 {
        self.top + self.height - (fraction(value, lo, hi) as f32) * self.height
    }

    fn right(&self) -> f32 {
        self.left + self.width
    }

    fn bottom(&self) -> f32 {
        self.top + self.height
    }

    fn frame(&self) -> Rect {
        Rect::at(self.left as i32, self.top as i32)
            .of_size(self.width.max(1.0) as u32, self.height.max(1.0) as u32)
    }
}

fn fraction(value: f64, lo: f64, hi: f64) -> f64 {
    if hi > lo {
        ((value - lo) / (hi - lo)).clamp(0.0, 1.0)
    } else {
        0.5
    }
}

/// Furthest the bearing axis widens past either end of the circle
const MAX_AXIS_OVERSHOOT: f64 = 360.0;

/// Bearing axis extent: the full circle widened to include finite QC bounds,
/// at most [`MAX_AXIS_OVERSHOOT`] beyond 0 and 360
fn bearing_extent(qc_range: QcRange) -> (f64, f64) {
    let (lo, hi) = [qc_range.min, qc_range.max]
        .into_iter()
        .filter(|bound| bound.is_finite())
        .fold((0.0_f64, 360.0_f64), |(lo, hi), bound| {
            (lo.min(bound), hi.max(bound))
        });
    (
        lo.max(-MAX_AXIS_OVERSHOOT),
        hi.min(360.0 + MAX_AXIS_OVERSHOOT),
    )
}

/// Multiples of [`GRID_STEP`] within [lo, hi]
fn grid_values(lo: f64, hi: f64) -> impl Iterator<Item = f64> {
    let first = (lo / GRID_STEP).ceil() as i64;
    let last = (hi / GRID_STEP).floor() as i64;
    (first..=last).map(|k| k as f64 * GRID_STEP)
}

/// PNG renderer backed by `image` and `imageproc`
#[derive(Debug, Clone, PartialEq)]
pub struct PngRenderer {
    width: u32,
    height: u32,
    bin_width: f64,
}

impl PngRenderer {
    pub fn new(width: u32, height: u32, bin_width: f64) -> Self {
        Self {
            width,
            height,
            bin_width,
        }
    }

    pub fn from_config(config: &OutputConfig) -> Self {
        Self::new(
            config.image_width,
            config.image_height,
            config.histogram_bin_width,
        )
    }

    /// Draw the figure in memory
    pub fn draw(&self, statistics: &StationStatistics) -> RgbImage {
        let mut img = RgbImage::from_pixel(self.width, self.height, BACKGROUND);

        let margin = (self.width.min(self.height) as f32 * 0.06).max(20.0);
        let panel_height = (self.height as f32 - 3.0 * margin) / 2.0;
        let panel_width = self.width as f32 - 2.0 * margin;

        let top = PlotArea {
            left: margin,
            top: margin,
            width: panel_width,
            height: panel_height,
        };
        let bottom = PlotArea {
            top: 2.0 * margin + panel_height,
            ..top
        };

        self.draw_time_series(
            &mut img,
            top,
            &statistics.time_series.data,
            statistics.time_series.qc_range,
        );

        let histogram =
            Histogram::from_values(statistics.distribution.data.values(), self.bin_width);
        self.draw_histogram(
            &mut img,
            bottom,
            &histogram,
            statistics.distribution.qc_range,
        );

        img
    }

    fn draw_time_series(
        &self,
        img: &mut RgbImage,
        area: PlotArea,
        series: &BearingTimeSeries,
        qc_range: QcRange,
    ) {
        let (lo, hi) = bearing_extent(qc_range);
        draw_horizontal_grid(img, area, lo, hi);

        if let Some((first, last)) = series.time_span() {
            let t0 = first.timestamp_millis() as f64;
            let t1 = last.timestamp_millis() as f64;
            let points: Vec<(f32, f32)> = series
                .entries()
                .iter()
                .map(|entry| {
                    (
                        area.x(entry.timestamp.timestamp_millis() as f64, t0, t1),
                        area.y(entry.value, lo, hi),
                    )
                })
                .collect();

            if let [only] = points.as_slice() {
                draw_filled_rect_mut(
                    img,
                    Rect::at(only.0 as i32 - 2, only.1 as i32 - 2).of_size(5, 5),
                    SERIES,
                );
            }
            for pair in points.windows(2) {
                draw_thick_line(img, pair[0], pair[1], SERIES);
            }
        }

        for bound in [qc_range.min, qc_range.max] {
            if bound.is_finite() {
                let y = area.y(bound, lo, hi);
                draw_thick_line(img, (area.left, y), (area.right(), y), QC_LINE);
            }
        }

        draw_hollow_rect_mut(img, area.frame(), FRAME);
    }

    fn draw_histogram(
        &self,
        img: &mut RgbImage,
        area: PlotArea,
        histogram: &Histogram,
        qc_range: QcRange,
    ) {
        let (lo, hi) = bearing_extent(qc_range);
        draw_vertical_grid(img, area, lo, hi);

        let max_count = histogram.max_count().max(1) as f64;
        for (index, &count) in histogram.counts().iter().enumerate() {
            if count == 0 {
                continue;
            }
            let start = histogram.bin_start(index);
            let end = (start + histogram.bin_width()).min(360.0);
            let x0 = area.x(start, lo, hi);
            let x1 = area.x(end, lo, hi);
            let y = area.y(count as f64, 0.0, max_count);

            let bar = Rect::at(x0 as i32, y as i32).of_size(
                (x1 - x0).max(1.0) as u32,
                (area.bottom() - y).max(1.0) as u32,
            );
            draw_filled_rect_mut(img, bar, SERIES);
            draw_hollow_rect_mut(img, bar, FRAME);
        }

        for bound in [qc_range.min, qc_range.max] {
            if bound.is_finite() {
                let x = area.x(bound, lo, hi);
                draw_thick_line(img, (x, area.top), (x, area.bottom()), QC_LINE);
            }
        }

        draw_hollow_rect_mut(img, area.frame(), FRAME);
    }
}

impl Renderer for PngRenderer {
    fn render(&self, statistics: &StationStatistics, path: &Path) -> Result<()> {
        let img = self.draw(statistics);
        img.save(path).map_err(|e| AvrbError::RenderFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        debug!("Saved figure {}", path.display());
        Ok(())
    }
}

fn draw_thick_line(img: &mut RgbImage, start: (f32, f32), end: (f32, f32), color: Rgb<u8>) {
    for offset in [-1.0_f32, 0.0, 1.0] {
        if (end.0 - start.0).abs() >= (end.1 - start.1).abs() {
            draw_line_segment_mut(img, (start.0, start.1 + offset), (end.0, end.1 + offset), color);
        } else {
            draw_line_segment_mut(img, (start.0 + offset, start.1), (end.0 + offset, end.1), color);
        }
    }
}

fn draw_horizontal_grid(img: &mut RgbImage, area: PlotArea, lo: f64, hi: f64) {
    for value in grid_values(lo, hi) {
        let y = area.y(value, lo, hi);
        draw_line_segment_mut(img, (area.left, y), (area.right(), y), GRID);
    }
}

fn draw_vertical_grid(img: &mut RgbImage, area: PlotArea, lo: f64, hi: f64) {
    for value in grid_values(lo, hi) {
        let x = area.x(value, lo, hi);
        draw_line_segment_mut(img, (x, area.top), (x, area.bottom()), GRID);
    }
}

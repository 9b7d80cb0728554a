//! Boundary to the line-chart engine.
//!
//! A chart asks the engine for one handle per drawing surface (the overview
//! and each detail panel) and must destroy every handle it created. The
//! engine draws [`Plot`]s and reports hover geometry back as tooltip
//! [`Candidate`]s.

use crate::reshape::PlotSeries;
use crate::tooltip::Candidate;

use iced_core::{Point, Rectangle};

/// Pointer distance (px) within which a series point counts as hovered.
pub const HIT_RADIUS: f32 = 12.0;

const EXTENT_PADDING: f64 = 0.05;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Surface {
    Overview,
    Panel(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HandleId(pub u64);

/// Monotonic handle allocator for engine implementations.
#[derive(Debug, Default)]
pub struct HandleIds(u64);

impl HandleIds {
    pub fn next(&mut self) -> HandleId {
        self.0 += 1;
        HandleId(self.0)
    }
}

pub trait Engine {
    fn create(&mut self, plot: Plot) -> HandleId;

    fn destroy(&mut self, handle: HandleId);
}

#[derive(Debug, Clone, PartialEq)]
pub struct Plot {
    pub surface: Surface,
    pub series: Vec<PlotSeries>,
    pub x_label: String,
    pub y_label: String,
}

/// Data-space bounds of a plot, padded so lines do not touch the frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl Extent {
    pub fn of(series: &[PlotSeries]) -> Option<Self> {
        let mut points = series
            .iter()
            .flat_map(|s| s.points.iter())
            .filter(|(x, y)| x.is_finite() && y.is_finite())
            .peekable();
        points.peek()?;

        let (mut min_x, mut max_x) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut min_y, mut max_y) = (f64::INFINITY, f64::NEG_INFINITY);
        for &(x, y) in points {
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);
        }

        if (max_x - min_x).abs() < f64::EPSILON {
            max_x += 1.0;
        }
        if (max_y - min_y).abs() < f64::EPSILON {
            min_y -= 1.0;
            max_y += 1.0;
        }
        let pad = (max_y - min_y) * EXTENT_PADDING;

        Some(Self {
            min_x,
            max_x,
            min_y: min_y - pad,
            max_y: max_y + pad,
        })
    }

    pub fn to_screen(&self, (x, y): (f64, f64), rect: Rectangle) -> Point {
        let tx = ((x - self.min_x) / (self.max_x - self.min_x)) as f32;
        let ty = ((y - self.min_y) / (self.max_y - self.min_y)) as f32;
        Point::new(
            rect.x + tx * rect.width,
            rect.y + rect.height - ty * rect.height,
        )
    }
}

impl Plot {
    pub fn extent(&self) -> Option<Extent> {
        Extent::of(&self.series)
    }

    /// Nearest point of every series close to `cursor`, nearest first.
    pub fn candidates(&self, cursor: Point, rect: Rectangle) -> Vec<Candidate> {
        let Some(extent) = self.extent() else {
            return Vec::new();
        };

        let mut found: Vec<Candidate> = self
            .series
            .iter()
            .filter_map(|series| {
                series
                    .points
                    .iter()
                    .filter(|(x, y)| x.is_finite() && y.is_finite())
                    .map(|&point| (point, extent.to_screen(point, rect).distance(cursor)))
                    .filter(|(_, distance)| *distance <= HIT_RADIUS)
                    .min_by(|a, b| a.1.total_cmp(&b.1))
                    .map(|((x, y), distance)| Candidate {
                        kind: series.kind.clone(),
                        color: series.color,
                        x,
                        y,
                        distance,
                    })
            })
            .collect();

        found.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        found
    }

    /// Last plottable point of the entity's own line, used to anchor a
    /// tooltip that was not triggered by the pointer.
    pub fn anchor_of(&self, entity_id: &str) -> Option<Candidate> {
        let series = self.series.iter().find(|s| {
            matches!(&s.kind, crate::reshape::SeriesKind::Entity { id, .. } if id == entity_id)
        })?;
        let &(x, y) = series
            .points
            .iter()
            .rev()
            .find(|(x, y)| x.is_finite() && y.is_finite())?;

        Some(Candidate {
            kind: series.kind.clone(),
            color: series.color,
            x,
            y,
            distance: 0.0,
        })
    }
}

//! Scrollable grid of per-site detail charts.

use crate::color;
use crate::engine::{Plot, Surface};
use crate::input::{EntityLabel, StudyPoint};
use crate::reshape::{PlotSeries, SeriesKind, study_series};

use iced_core::{Color, Point, Rectangle, Size};
use rustc_hash::FxHashMap;

pub const GAP: f32 = 8.0;
pub const OUTLINE_WIDTH: f32 = 2.0;

const SUB_ENTITY_ORDER: u8 = 3;
const ENTITY_ORDER: u8 = 2;
const STUDY_ORDER: u8 = 1;
const ENTITY_WIDTH: f32 = 2.0;
const SUB_ENTITY_WIDTH: f32 = 1.0;

/// Visual treatment drawn around a panel without taking layout space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Outline {
    pub width: f32,
    pub color: Color,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PanelStyle {
    pub outline: Option<Outline>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub entity_id: String,
    pub score: f64,
    pub plot: Plot,
    pub style: PanelStyle,
}

/// One panel per flagged site, most anomalous (lowest score) first.
///
/// Each panel layers patient trajectories under the site line under the
/// study reference line.
pub fn build_panels(
    labels: &[EntityLabel],
    entity_points: &FxHashMap<String, Vec<(f64, f64)>>,
    visits: &FxHashMap<String, Vec<(String, Vec<(f64, f64)>)>>,
    study: &[StudyPoint],
    x_label: &str,
    y_label: &str,
) -> Vec<Panel> {
    let mut flagged: Vec<&EntityLabel> = labels.iter().filter(|l| l.is_flagged()).collect();
    flagged.sort_by(|a, b| a.score.unwrap_or(0.0).total_cmp(&b.score.unwrap_or(0.0)));

    flagged
        .into_iter()
        .map(|label| {
            let id = &label.entity_id;
            let mut series: Vec<PlotSeries> = visits
                .get(id)
                .into_iter()
                .flatten()
                .map(|(patient, points)| PlotSeries {
                    kind: SeriesKind::SubEntity {
                        id: patient.clone(),
                        entity_id: id.clone(),
                    },
                    points: points.clone(),
                    color: color::SUB_ENTITY,
                    opacity: 1.0,
                    border_width: SUB_ENTITY_WIDTH,
                    order: SUB_ENTITY_ORDER,
                })
                .collect();

            if let Some(points) = entity_points.get(id) {
                series.push(PlotSeries {
                    kind: SeriesKind::Entity {
                        id: id.clone(),
                        flagged: true,
                    },
                    points: points.clone(),
                    color: color::entity_color(label.color.as_deref()),
                    opacity: 1.0,
                    border_width: ENTITY_WIDTH,
                    order: ENTITY_ORDER,
                });
            }

            if !study.is_empty() {
                series.push(PlotSeries {
                    order: STUDY_ORDER,
                    ..study_series(study)
                });
            }

            Panel {
                entity_id: id.clone(),
                score: label.score.unwrap_or(0.0),
                plot: Plot {
                    surface: Surface::Panel(id.clone()),
                    series,
                    x_label: x_label.to_string(),
                    y_label: y_label.to_string(),
                },
                style: PanelStyle::default(),
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
struct Highlight {
    entity_id: String,
    previous: PanelStyle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelGrid {
    panels: Vec<Panel>,
    columns: usize,
    panel_height: f32,
    viewport_height: f32,
    scroll: f32,
    highlight: Option<Highlight>,
}

impl PanelGrid {
    pub fn new(columns: usize, panel_height: f32, viewport_height: f32) -> Self {
        Self {
            panels: Vec::new(),
            columns: columns.max(1),
            panel_height,
            viewport_height,
            scroll: 0.0,
            highlight: None,
        }
    }

    /// Swaps in freshly built panels. The scroll offset survives, the
    /// highlight does not: new panels start undecorated.
    pub fn rebuild(&mut self, panels: Vec<Panel>) {
        self.panels = panels;
        self.highlight = None;
        self.scroll = self.scroll.clamp(0.0, self.max_scroll());
    }

    pub fn clear(&mut self) {
        self.panels.clear();
        self.highlight = None;
        self.scroll = 0.0;
    }

    pub fn resize(&mut self, columns: usize, panel_height: f32, viewport_height: f32) {
        self.columns = columns.max(1);
        self.panel_height = panel_height;
        self.viewport_height = viewport_height;
        self.scroll = self.scroll.clamp(0.0, self.max_scroll());
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        self.position(entity_id).is_some()
    }

    fn position(&self, entity_id: &str) -> Option<usize> {
        self.panels.iter().position(|p| p.entity_id == entity_id)
    }

    pub fn highlighted(&self) -> Option<&str> {
        self.highlight.as_ref().map(|h| h.entity_id.as_str())
    }

    /// Outlines exactly one panel. Returns false when the site has no panel,
    /// in which case nothing stays highlighted.
    pub fn highlight(&mut self, entity_id: &str) -> bool {
        self.clear_highlight();

        let Some(idx) = self.position(entity_id) else {
            return false;
        };
        let panel = &mut self.panels[idx];
        self.highlight = Some(Highlight {
            entity_id: entity_id.to_string(),
            previous: panel.style,
        });
        panel.style.outline = Some(Outline {
            width: OUTLINE_WIDTH,
            color: color::HIGHLIGHT,
        });
        true
    }

    pub fn clear_highlight(&mut self) {
        let Some(highlight) = self.highlight.take() else {
            return;
        };
        if let Some(idx) = self.position(&highlight.entity_id) {
            self.panels[idx].style = highlight.previous;
        }
    }

    pub fn scroll(&self) -> f32 {
        self.scroll
    }

    pub fn viewport_height(&self) -> f32 {
        self.viewport_height
    }

    pub fn rows(&self) -> usize {
        self.panels.len().div_ceil(self.columns)
    }

    pub fn content_height(&self) -> f32 {
        let rows = self.rows() as f32;
        (rows * self.panel_height + (rows - 1.0).max(0.0) * GAP).max(0.0)
    }

    fn max_scroll(&self) -> f32 {
        (self.content_height() - self.viewport_height).max(0.0)
    }

    pub fn scroll_by(&mut self, delta: f32) {
        self.scroll = (self.scroll + delta).clamp(0.0, self.max_scroll());
    }

    /// Moves the grid's own scroll offset just enough for the panel to be
    /// fully visible. No-op for sites without a panel.
    pub fn scroll_into_view(&mut self, entity_id: &str) -> bool {
        let Some(idx) = self.position(entity_id) else {
            return false;
        };
        let top = (idx / self.columns) as f32 * (self.panel_height + GAP);
        let bottom = top + self.panel_height;

        if top < self.scroll {
            self.scroll = top;
        } else if bottom > self.scroll + self.viewport_height {
            self.scroll = bottom - self.viewport_height;
        }
        self.scroll = self.scroll.clamp(0.0, self.max_scroll());
        true
    }

    /// Bounds of panel `idx` relative to the visible grid area of `width`.
    pub fn cell(&self, idx: usize, width: f32) -> Rectangle {
        let cols = self.columns as f32;
        let cell_w = ((width - GAP * (cols - 1.0)) / cols).max(0.0);
        let (row, col) = (idx / self.columns, idx % self.columns);

        Rectangle::new(
            Point::new(
                col as f32 * (cell_w + GAP),
                row as f32 * (self.panel_height + GAP) - self.scroll,
            ),
            Size::new(cell_w, self.panel_height),
        )
    }

    pub fn panel_at(&self, point: Point, width: f32) -> Option<&Panel> {
        self.panels
            .iter()
            .enumerate()
            .find(|(idx, _)| self.cell(*idx, width).contains(point))
            .map(|(_, panel)| panel)
    }
}

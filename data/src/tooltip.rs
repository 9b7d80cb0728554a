//! Custom tooltip: content for hovered or synthesized points, and placement
//! next to the point inside its host surface.

use crate::config::Config;
use crate::engine::Surface;
use crate::format::{format_number, is_internal, normalize_key};
use crate::group::GroupIndex;
use crate::input::EntityLabel;
use crate::reshape::SeriesKind;

use iced_core::{Color, Point, Rectangle, Size};
use rustc_hash::FxHashMap;

/// Points closer than this on both axes are reported as one overlapping stack.
pub const OVERLAP_THRESHOLD: f64 = 0.5;
/// Horizontal gap between the point and the tooltip box.
pub const OFFSET: f32 = 12.0;

pub const TEXT_SIZE: f32 = 12.0;
pub const LINE_HEIGHT: f32 = TEXT_SIZE + 4.0;
pub const CHAR_WIDTH: f32 = TEXT_SIZE * 0.6;
pub const PADDING: f32 = 6.0;
pub const SWATCH: f32 = 10.0;
pub const BLOCK_GAP: f32 = 6.0;

const DECIMALS: usize = 2;

/// A series point under the pointer, as reported by the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub kind: SeriesKind,
    pub color: Color,
    pub x: f64,
    pub y: f64,
    /// Pointer distance in pixels.
    pub distance: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub swatch: Color,
    pub title: String,
    pub metrics: Vec<(String, String)>,
    pub metadata: Vec<(String, String)>,
}

impl Block {
    pub fn lines(&self) -> impl Iterator<Item = String> + '_ {
        std::iter::once(self.title.clone()).chain(
            self.metrics
                .iter()
                .chain(self.metadata.iter())
                .map(|(k, v)| format!("{k}: {v}")),
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub blocks: Vec<Block>,
}

impl Content {
    /// Estimated box size with the fixed-width text metrics above.
    pub fn measure(&self) -> Size {
        let mut widest = 0usize;
        let mut lines = 0usize;
        for block in &self.blocks {
            for line in block.lines() {
                widest = widest.max(line.chars().count());
                lines += 1;
            }
        }
        let gaps = self.blocks.len().saturating_sub(1) as f32 * BLOCK_GAP;

        Size::new(
            widest as f32 * CHAR_WIDTH + SWATCH + PADDING * 3.0,
            lines as f32 * LINE_HEIGHT + gaps + PADDING * 2.0,
        )
    }
}

/// Everything tooltip text is derived from besides the points themselves.
pub struct Context<'a> {
    pub config: &'a Config,
    pub labels: &'a FxHashMap<String, EntityLabel>,
    pub groups: Option<&'a GroupIndex>,
}

/// True when every candidate lies within [`OVERLAP_THRESHOLD`] of the first
/// on both axes. Nearest-point hit testing rarely returns exactly equal
/// coordinates for coinciding lines, hence the tolerance.
pub fn is_overlapping(candidates: &[Candidate]) -> bool {
    let Some(first) = candidates.first() else {
        return false;
    };
    candidates.iter().skip(1).all(|c| {
        (c.x - first.x).abs() <= OVERLAP_THRESHOLD && (c.y - first.y).abs() <= OVERLAP_THRESHOLD
    })
}

pub fn build(candidates: &[Candidate], ctx: &Context<'_>) -> Option<Content> {
    if candidates.len() > 1 && is_overlapping(candidates) {
        let blocks = candidates.iter().map(|c| compact_block(c, ctx)).collect();
        return Some(Content { blocks });
    }

    let nearest = candidates
        .iter()
        .min_by(|a, b| a.distance.total_cmp(&b.distance))?;
    Some(Content {
        blocks: vec![full_block(nearest, ctx)],
    })
}

fn title(candidate: &Candidate, ctx: &Context<'_>) -> String {
    match &candidate.kind {
        SeriesKind::SubEntity { id, .. } => format!("Patient {id}"),
        SeriesKind::Study => "Study Mean".to_string(),
        SeriesKind::Entity { id, .. } => {
            let mut title = format!("Site {id}");
            let attribute = |field: &str| ctx.groups.and_then(|g| g.attribute(id, field));

            if let Some(investigator) = attribute(&ctx.config.investigator_field) {
                title.push_str(&format!(" - {investigator}"));
            }
            if let Some(enrolled) = attribute(&ctx.config.enrollment_field) {
                title.push_str(&format!(" ({enrolled} enrolled)"));
            }
            title
        }
    }
}

fn point_metrics(candidate: &Candidate, config: &Config) -> Vec<(String, String)> {
    vec![
        (config.y_axis_label(), format_number(candidate.y, DECIMALS)),
        (config.x_axis_label(), format_number(candidate.x, DECIMALS)),
    ]
}

fn compact_block(candidate: &Candidate, ctx: &Context<'_>) -> Block {
    Block {
        swatch: candidate.color,
        title: title(candidate, ctx),
        metrics: point_metrics(candidate, ctx.config),
        metadata: Vec::new(),
    }
}

fn full_block(candidate: &Candidate, ctx: &Context<'_>) -> Block {
    let mut metrics = point_metrics(candidate, ctx.config);
    let mut metadata = Vec::new();

    if let SeriesKind::Entity { id, .. } = &candidate.kind {
        if let Some(label) = ctx.labels.get(id) {
            if let Some(score) = label.score {
                metrics.push(("Score".to_string(), format_number(score, 3)));
            }
            if let Some(delta) = label.delta {
                metrics.push(("Delta".to_string(), format_number(delta, DECIMALS)));
            }
        }

        if let Some(attributes) = ctx.groups.and_then(|g| g.attributes(id)) {
            metadata = attributes
                .iter()
                .filter(|(key, _)| !is_internal(key))
                .map(|(key, value)| (normalize_key(key), value.clone()))
                .collect();
        }
    }

    Block {
        swatch: candidate.color,
        title: title(candidate, ctx),
        metrics,
        metadata,
    }
}

/// Top-left corner of a tooltip of `size` for a point at `anchor`.
///
/// Right of the point by default, left of it when the box would cross the
/// right edge of `panel`, and never above the panel's top edge.
pub fn place(anchor: Point, size: Size, panel: Rectangle) -> Point {
    let mut x = anchor.x + OFFSET;
    if x + size.width > panel.x + panel.width {
        x = anchor.x - OFFSET - size.width;
    }
    let y = (anchor.y - size.height / 2.0).max(panel.y);
    Point::new(x, y)
}

/// The one tooltip node of a chart. Hidden by opacity, never dropped, so the
/// renderer always has a node to update.
#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    surface: Surface,
    anchor: (f64, f64),
    content: Option<Content>,
    opacity: f32,
}

impl Default for Tooltip {
    fn default() -> Self {
        Self {
            surface: Surface::Overview,
            anchor: (0.0, 0.0),
            content: None,
            opacity: 0.0,
        }
    }
}

impl Tooltip {
    pub fn show(&mut self, surface: Surface, anchor: (f64, f64), content: Content) {
        self.surface = surface;
        self.anchor = anchor;
        self.content = Some(content);
        self.opacity = 1.0;
    }

    pub fn hide(&mut self) {
        self.opacity = 0.0;
    }

    pub fn is_visible(&self) -> bool {
        self.opacity > 0.0 && self.content.is_some()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Data coordinates of the point the tooltip belongs to.
    pub fn anchor(&self) -> (f64, f64) {
        self.anchor
    }

    pub fn content(&self) -> Option<&Content> {
        self.content.as_ref()
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::GroupMetadataRow;

    fn candidate(kind: SeriesKind, x: f64, y: f64, distance: f32) -> Candidate {
        Candidate {
            kind,
            color: Color::BLACK,
            x,
            y,
            distance,
        }
    }

    fn site(id: &str) -> SeriesKind {
        SeriesKind::Entity {
            id: id.to_string(),
            flagged: true,
        }
    }

    fn groups() -> GroupIndex {
        let rows: Vec<GroupMetadataRow> = [
            ("InvestigatorLastName", "Smith"),
            ("ParticipantCount", "12"),
            ("Country", "USA"),
            ("GroupID", "120"),
        ]
        .into_iter()
        .map(|(name, value)| GroupMetadataRow {
            entity_id: "120".to_string(),
            level: "Site".to_string(),
            attribute_name: name.to_string(),
            attribute_value: value.to_string(),
        })
        .collect();
        crate::group::index(&rows, "Site").unwrap()
    }

    #[test]
    fn overlap_threshold_is_inclusive() {
        let a = candidate(SeriesKind::Study, 10.0, 5.0, 0.0);
        let near = candidate(site("120"), 10.5, 5.5, 1.0);
        let far_x = candidate(site("120"), 10.51, 5.0, 1.0);
        let far_y = candidate(site("120"), 10.0, 5.6, 1.0);

        assert!(is_overlapping(&[a.clone(), near]));
        assert!(!is_overlapping(&[a.clone(), far_x]));
        assert!(!is_overlapping(&[a, far_y]));
        assert!(!is_overlapping(&[]));
    }

    #[test]
    fn overlapping_points_get_compact_blocks() {
        let config = Config::default();
        let labels = FxHashMap::default();
        let groups = groups();
        let ctx = Context {
            config: &config,
            labels: &labels,
            groups: Some(&groups),
        };

        let content = build(
            &[
                candidate(site("120"), 3.0, 1.0, 2.0),
                candidate(SeriesKind::Study, 3.2, 1.1, 1.0),
            ],
            &ctx,
        )
        .unwrap();

        assert_eq!(content.blocks.len(), 2);
        assert!(content.blocks.iter().all(|b| b.metadata.is_empty()));
        assert_eq!(content.blocks[1].title, "Study Mean");
        assert_eq!(content.blocks[0].metrics[0].0, "Cumulative Adverse Events");
    }

    #[test]
    fn separate_points_show_nearest_with_metadata() {
        let config = Config::default();
        let labels = FxHashMap::default();
        let groups = groups();
        let ctx = Context {
            config: &config,
            labels: &labels,
            groups: Some(&groups),
        };

        let content = build(
            &[
                candidate(SeriesKind::Study, 1.0, 1.0, 9.0),
                candidate(site("120"), 8.0, 4.0, 3.0),
            ],
            &ctx,
        )
        .unwrap();

        let block = &content.blocks[0];
        assert_eq!(content.blocks.len(), 1);
        assert_eq!(block.title, "Site 120 - Smith (12 enrolled)");
        assert!(block.metadata.contains(&("Country".to_string(), "USA".to_string())));
        assert!(block
            .metadata
            .contains(&("Investigator Last Name".to_string(), "Smith".to_string())));
        assert!(!block.metadata.iter().any(|(k, _)| k == "Group ID"));
    }

    #[test]
    fn patient_titles_and_no_candidates() {
        let config = Config::default();
        let labels = FxHashMap::default();
        let ctx = Context {
            config: &config,
            labels: &labels,
            groups: None,
        };
        let patient = SeriesKind::SubEntity {
            id: "P-7".into(),
            entity_id: "120".into(),
        };

        let content = build(&[candidate(patient, 1.0, 1.0, 0.0)], &ctx).unwrap();
        assert_eq!(content.blocks[0].title, "Patient P-7");
        assert!(build(&[], &ctx).is_none());
    }

    #[test]
    fn placement_flips_and_clamps() {
        let panel = Rectangle::new(Point::new(0.0, 50.0), Size::new(300.0, 200.0));
        let size = Size::new(100.0, 80.0);

        let right = place(Point::new(50.0, 150.0), size, panel);
        assert_eq!(right, Point::new(50.0 + OFFSET, 110.0));

        let flipped = place(Point::new(250.0, 150.0), size, panel);
        assert_eq!(flipped.x, 250.0 - OFFSET - 100.0);

        let clamped = place(Point::new(50.0, 55.0), size, panel);
        assert_eq!(clamped.y, 50.0);
    }

    #[test]
    fn hidden_tooltip_keeps_its_node() {
        let mut tooltip = Tooltip::default();
        assert!(!tooltip.is_visible());

        tooltip.show(
            Surface::Panel("120".into()),
            (1.0, 2.0),
            Content { blocks: vec![] },
        );
        assert!(tooltip.is_visible());

        tooltip.hide();
        assert_eq!(tooltip.opacity(), 0.0);
        assert!(tooltip.content().is_some());
    }
}

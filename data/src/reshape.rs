//! Flat tables to styled, ordered plot series.

use crate::color;
use crate::input::{EntityLabel, EntityRow, StudyPoint, group_rows};
use crate::selection::Selection;

use enum_map::{Enum, EnumMap, enum_map};
use iced_core::Color;
use rustc_hash::FxHashMap;

pub const DIMMED_OPACITY: f32 = 0.2;
pub const SELECTED_WIDTH: f32 = 3.0;
pub const STUDY_WIDTH: f32 = 2.0;
pub const FLAGGED_WIDTH: f32 = 1.5;
pub const UNFLAGGED_WIDTH: f32 = 1.0;

#[derive(Debug, Clone, PartialEq)]
pub enum SeriesKind {
    Study,
    Entity { id: String, flagged: bool },
    SubEntity { id: String, entity_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlotSeries {
    pub kind: SeriesKind,
    pub points: Vec<(f64, f64)>,
    pub color: Color,
    pub opacity: f32,
    pub border_width: f32,
    /// Lower values are painted later, i.e. on top.
    pub order: u8,
}

impl PlotSeries {
    pub fn entity_id(&self) -> Option<&str> {
        match &self.kind {
            SeriesKind::Entity { id, .. } => Some(id),
            SeriesKind::SubEntity { entity_id, .. } => Some(entity_id),
            SeriesKind::Study => None,
        }
    }

    pub fn stroke_color(&self) -> Color {
        self.color.scale_alpha(self.opacity)
    }

    pub fn is_study(&self) -> bool {
        matches!(self.kind, SeriesKind::Study)
    }
}

/// Painting tiers of the overview, topmost first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Enum)]
pub enum Tier {
    Study,
    FlaggedSelected,
    UnflaggedSelected,
    FlaggedUnselected,
    UnflaggedUnselected,
}

impl Tier {
    fn of(flagged: bool, selected: bool) -> Self {
        match (flagged, selected) {
            (true, true) => Tier::FlaggedSelected,
            (false, true) => Tier::UnflaggedSelected,
            (true, false) => Tier::FlaggedUnselected,
            (false, false) => Tier::UnflaggedUnselected,
        }
    }

    pub fn order(self) -> u8 {
        let orders: EnumMap<Tier, u8> = enum_map! {
            Tier::Study => 0,
            Tier::FlaggedSelected => 1,
            Tier::UnflaggedSelected => 2,
            Tier::FlaggedUnselected => 3,
            Tier::UnflaggedUnselected => 5,
        };
        orders[self]
    }
}

pub fn reshape(
    study: &[StudyPoint],
    flagged: &[EntityRow],
    unflagged: &[EntityRow],
    labels: &FxHashMap<String, EntityLabel>,
    selection: &Selection,
) -> Vec<PlotSeries> {
    let mut series = Vec::new();

    if !study.is_empty() {
        series.push(study_series(study));
    }

    for (rows, is_flagged) in [(flagged, true), (unflagged, false)] {
        for (id, points) in group_rows(rows) {
            let selected = selection.contains(&id);
            let opacity = if !selection.is_empty() && !selected {
                DIMMED_OPACITY
            } else {
                1.0
            };
            let border_width = match (selected, is_flagged) {
                (true, _) => SELECTED_WIDTH,
                (false, true) => FLAGGED_WIDTH,
                (false, false) => UNFLAGGED_WIDTH,
            };
            let hex = labels.get(&id).and_then(|label| label.color.as_deref());

            series.push(PlotSeries {
                color: color::entity_color(hex),
                kind: SeriesKind::Entity {
                    id,
                    flagged: is_flagged,
                },
                points,
                opacity,
                border_width,
                order: Tier::of(is_flagged, selected).order(),
            });
        }
    }

    series
}

pub fn study_series(study: &[StudyPoint]) -> PlotSeries {
    PlotSeries {
        kind: SeriesKind::Study,
        points: study.iter().map(|p| (p.x, p.y)).collect(),
        color: color::STUDY,
        opacity: 1.0,
        border_width: STUDY_WIDTH,
        order: Tier::Study.order(),
    }
}

/// Series in the sequence they must be painted: highest order first.
pub fn paint_order(series: &[PlotSeries]) -> Vec<&PlotSeries> {
    let mut sorted: Vec<&PlotSeries> = series.iter().collect();
    sorted.sort_by(|a, b| b.order.cmp(&a.order));
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::selection::RawSelection;

    fn row(id: &str, x: f64, y: f64) -> EntityRow {
        EntityRow {
            entity_id: id.to_string(),
            x,
            y,
        }
    }

    fn labels() -> FxHashMap<String, EntityLabel> {
        [("120", 1, "#ff0000"), ("10", 0, "#00ff00"), ("11", 0, "#0000ff")]
            .into_iter()
            .map(|(id, flag, hex)| {
                (
                    id.to_string(),
                    EntityLabel {
                        entity_id: id.to_string(),
                        flag_status: flag,
                        color: Some(hex.to_string()),
                        sub_entity_count: None,
                        score: None,
                        delta: None,
                    },
                )
            })
            .collect()
    }

    fn fixture(selection: &Selection) -> Vec<PlotSeries> {
        let study = vec![StudyPoint { x: 1.0, y: 0.5 }, StudyPoint { x: 2.0, y: 1.0 }];
        let flagged = vec![row("120", 1.0, 2.0), row("120", 2.0, 4.0), row("130", 1.0, 3.0)];
        let unflagged = vec![row("10", 1.0, 0.2), row("11", 1.0, 0.1)];
        reshape(&study, &flagged, &unflagged, &labels(), selection)
    }

    fn find<'a>(series: &'a [PlotSeries], id: &str) -> &'a PlotSeries {
        series
            .iter()
            .find(|s| s.entity_id() == Some(id))
            .expect("series present")
    }

    fn selections() -> Vec<Selection> {
        vec![
            Selection::None,
            Selection::Single("120".into()),
            Selection::Single("10".into()),
            Selection::from_raw(&RawSelection::Many(vec!["120".into(), "10".into()])),
            Selection::Single("missing".into()),
        ]
    }

    #[test]
    fn selected_series_are_emphasised() {
        for selection in selections() {
            for s in fixture(&selection).iter().filter(|s| !s.is_study()) {
                let id = s.entity_id().unwrap();
                if selection.contains(id) {
                    assert_eq!(s.opacity, 1.0);
                    assert_eq!(s.border_width, SELECTED_WIDTH);
                } else if selection.is_empty() {
                    assert_eq!(s.opacity, 1.0);
                } else {
                    assert_eq!(s.opacity, DIMMED_OPACITY);
                }
            }
        }
    }

    #[test]
    fn study_is_always_topmost() {
        for selection in selections() {
            let series = fixture(&selection);
            let study = series.iter().find(|s| s.is_study()).unwrap();
            assert_eq!(study.opacity, 1.0);
            assert_eq!(study.border_width, STUDY_WIDTH);
            assert!(series
                .iter()
                .filter(|s| !s.is_study())
                .all(|s| study.order < s.order));
        }
    }

    #[test]
    fn draw_tiers_are_ranked() {
        let selection = Selection::from_raw(&RawSelection::Many(vec!["120".into(), "10".into()]));
        let series = fixture(&selection);

        let flagged_selected = find(&series, "120").order;
        let flagged_unselected = find(&series, "130").order;
        let unflagged_selected = find(&series, "10").order;
        let unflagged_unselected = find(&series, "11").order;

        assert!(flagged_selected < unflagged_selected);
        assert!(unflagged_selected < flagged_unselected);
        assert!(flagged_unselected < unflagged_unselected);
    }

    #[test]
    fn single_flagged_selection() {
        let series = fixture(&Selection::Single("120".into()));
        let selected = find(&series, "120");
        assert_eq!(selected.border_width, 3.0);
        assert_eq!(selected.order, 1);
        assert_eq!(selected.points, vec![(1.0, 2.0), (2.0, 4.0)]);
        assert_eq!(find(&series, "10").opacity, DIMMED_OPACITY);
    }

    #[test]
    fn unlabelled_entities_use_default_color() {
        let series = fixture(&Selection::None);
        assert_eq!(find(&series, "130").color, color::DEFAULT_ENTITY);
        assert_eq!(find(&series, "130").border_width, FLAGGED_WIDTH);
        assert_eq!(find(&series, "11").border_width, UNFLAGGED_WIDTH);
    }

    #[test]
    fn empty_study_is_omitted_and_nan_passes_through() {
        let rows = vec![row("10", f64::NAN, 1.0)];
        let series = reshape(&[], &[], &rows, &labels(), &Selection::None);
        assert_eq!(series.len(), 1);
        assert!(series[0].points[0].0.is_nan());
    }

    #[test]
    fn painting_ends_with_study() {
        let series = fixture(&Selection::Single("10".into()));
        let painted = paint_order(&series);
        assert!(painted.last().unwrap().is_study());
        assert!(painted.windows(2).all(|w| w[0].order >= w[1].order));
    }
}

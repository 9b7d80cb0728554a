//! Ranked list of sites, the second widget a report can host next to the
//! cumulative deviation chart.

use crate::color;
use crate::host::{Container, ContainerId, Emitted, Event, Registry, WIDGET_MARKER, WidgetKind};
use crate::input::EntityLabel;
use crate::selection::{RawSelection, Selection};

use iced_core::Color;

#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    pub entity_id: String,
    pub flagged: bool,
    pub score: Option<f64>,
    pub delta: Option<f64>,
    pub sub_entity_count: Option<f64>,
    pub color: Color,
}

impl Row {
    fn from_label(label: &EntityLabel) -> Self {
        Self {
            entity_id: label.entity_id.clone(),
            flagged: label.is_flagged(),
            score: label.score,
            delta: label.delta,
            sub_entity_count: label.sub_entity_count,
            color: color::entity_color(label.color.as_deref()),
        }
    }
}

pub struct SiteList {
    container: Container,
    rows: Vec<Row>,
    selection: Selection,
}

impl SiteList {
    pub fn new(container: ContainerId, labels: &[EntityLabel]) -> Self {
        let mut root = Container::new(container);
        root.mark(WIDGET_MARKER);

        let mut rows: Vec<Row> = labels.iter().map(Row::from_label).collect();
        // flagged first, then most significant score; unscored rows sink
        rows.sort_by(|a, b| {
            b.flagged.cmp(&a.flagged).then_with(|| {
                let a = a.score.filter(|s| s.is_finite()).unwrap_or(f64::INFINITY);
                let b = b.score.filter(|s| s.is_finite()).unwrap_or(f64::INFINITY);
                a.total_cmp(&b)
            })
        });

        Self {
            container: root,
            rows,
            selection: Selection::None,
        }
    }

    pub fn id(&self) -> ContainerId {
        self.container.id()
    }

    pub fn register(&self, registry: &mut Registry) {
        registry.register(self.container.id(), WidgetKind::SiteList);
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn is_selected(&self, entity_id: &str) -> bool {
        self.selection.contains(entity_id)
    }

    /// A row was clicked. Clicking the selected row again clears it.
    pub fn select(&mut self, entity_id: &str) -> Emitted {
        let entity_id = if self.selection == Selection::Single(entity_id.to_string()) {
            crate::selection::NONE
        } else {
            entity_id
        };
        self.selection = Selection::from_raw(&RawSelection::One(entity_id.to_string()));

        Emitted {
            container: self.container.id(),
            event: Event::SelectionChanged {
                entity_id: entity_id.to_string(),
            },
        }
    }

    pub fn update_selection(&mut self, raw: &RawSelection) {
        self.selection = Selection::from_raw(raw);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(id: &str, flag: i32, score: Option<f64>) -> EntityLabel {
        EntityLabel {
            entity_id: id.to_string(),
            flag_status: flag,
            color: None,
            sub_entity_count: Some(4.0),
            score,
            delta: None,
        }
    }

    fn list() -> SiteList {
        SiteList::new(
            ContainerId::new(),
            &[
                label("1", 0, Some(0.5)),
                label("2", 1, Some(0.04)),
                label("3", 0, None),
                label("4", 1, Some(0.001)),
                label("5", 0, Some(0.2)),
            ],
        )
    }

    #[test]
    fn flagged_sites_lead_by_score() {
        let list = list();
        let ids: Vec<&str> = list.rows().iter().map(|r| r.entity_id.as_str()).collect();
        assert_eq!(ids, vec!["4", "2", "5", "1", "3"]);
    }

    #[test]
    fn click_emits_and_toggles() {
        let mut list = list();

        let emitted = list.select("2");
        assert_eq!(emitted.container, list.id());
        assert_eq!(
            emitted.event,
            Event::SelectionChanged {
                entity_id: "2".into()
            }
        );
        assert!(list.is_selected("2"));

        let cleared = list.select("2");
        assert_eq!(
            cleared.event,
            Event::SelectionChanged {
                entity_id: "none".into()
            }
        );
        assert_eq!(list.selection(), &Selection::None);
    }

    #[test]
    fn host_selection_marks_rows() {
        let mut list = list();
        list.update_selection(&RawSelection::Many(vec!["1".into(), "5".into()]));
        assert!(list.is_selected("1") && list.is_selected("5"));
        assert!(!list.is_selected("2"));

        let mut registry = Registry::default();
        list.register(&mut registry);
        assert_eq!(registry.kind_of(list.id()), Some(WidgetKind::SiteList));
    }
}

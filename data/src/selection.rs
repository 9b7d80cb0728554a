//! Selection state machine.
//!
//! Transitions are pure: they compute the next [`Selection`] and the side
//! effects a chart has to run, without touching any rendering state.

use crate::group::GroupIndex;
use crate::host::Event;

use serde::{Deserialize, Serialize};

/// Sentinel the hosts and dropdowns use for "nothing selected".
pub const NONE: &str = "none";

/// Selection as hosts pass it around: one id or a list of ids.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSelection {
    One(String),
    Many(Vec<String>),
}

impl Default for RawSelection {
    fn default() -> Self {
        RawSelection::One(NONE.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Single(String),
    Group {
        ids: Vec<String>,
        country: Option<String>,
    },
}

impl Selection {
    pub fn from_raw(raw: &RawSelection) -> Self {
        match raw {
            RawSelection::One(id) if is_none(id) => Selection::None,
            RawSelection::One(id) => Selection::Single(id.clone()),
            RawSelection::Many(ids) => {
                let ids: Vec<String> = ids.iter().filter(|id| !is_none(id)).cloned().collect();
                if ids.is_empty() {
                    Selection::None
                } else {
                    Selection::Group { ids, country: None }
                }
            }
        }
    }

    pub fn to_raw(&self) -> RawSelection {
        match self {
            Selection::None => RawSelection::default(),
            Selection::Single(id) => RawSelection::One(id.clone()),
            Selection::Group { ids, .. } => RawSelection::Many(ids.clone()),
        }
    }

    pub fn contains(&self, entity_id: &str) -> bool {
        match self {
            Selection::None => false,
            Selection::Single(id) => id == entity_id,
            Selection::Group { ids, .. } => ids.iter().any(|id| id == entity_id),
        }
    }

    pub fn is_empty(&self) -> bool {
        match self {
            Selection::None => true,
            Selection::Single(_) => false,
            Selection::Group { ids, .. } => ids.is_empty(),
        }
    }

    /// The one entity follow-up effects should act on.
    ///
    /// A group resolves to its first member that owns a detail panel.
    pub fn target(&self, has_panel: impl Fn(&str) -> bool) -> Option<String> {
        match self {
            Selection::None => None,
            Selection::Single(id) => Some(id.clone()),
            Selection::Group { ids, .. } => ids.iter().find(|id| has_panel(id)).cloned(),
        }
    }

    /// Value the site dropdown shows for this selection.
    pub fn entity_choice(&self) -> &str {
        match self {
            Selection::Single(id) => id.as_str(),
            _ => NONE,
        }
    }

    /// Value the country dropdown shows for this selection.
    pub fn country_choice(&self) -> &str {
        match self {
            Selection::Group {
                country: Some(country),
                ..
            } => country.as_str(),
            _ => NONE,
        }
    }
}

fn is_none(id: &str) -> bool {
    id.is_empty() || id == NONE
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    Render,
    Emit(Event),
    /// Highlight, scroll to and show a tooltip for the entity once the
    /// render that precedes it is on screen.
    FollowUp(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: Selection,
    pub effects: Vec<Effect>,
}

#[derive(Debug, Clone, Default)]
pub struct Controller {
    selection: Selection,
}

impl Controller {
    pub fn new(selection: Selection) -> Self {
        Self { selection }
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// Commits a transition and hands back the effects it carries.
    pub fn apply(&mut self, transition: Transition) -> Vec<Effect> {
        log::debug!("selection {:?} -> {:?}", self.selection, transition.next);
        self.selection = transition.next;
        transition.effects
    }

    /// Site picked in the dropdown or by clicking a detail panel.
    pub fn select_entity(&self, entity_id: &str) -> Transition {
        let next = Selection::from_raw(&RawSelection::One(entity_id.to_string()));

        let mut effects = vec![
            Effect::Render,
            Effect::Emit(Event::SelectionChanged {
                entity_id: entity_id.to_string(),
            }),
        ];
        if let Selection::Single(id) = &next {
            effects.push(Effect::FollowUp(id.clone()));
        }

        Transition { next, effects }
    }

    /// Country picked in the dropdown. Only restyles the overview: with
    /// several matching sites there is no single panel to jump to.
    pub fn select_country(
        &self,
        country: &str,
        groups: Option<&GroupIndex>,
        country_field: &str,
    ) -> Transition {
        let (next, entity_ids) = if is_none(country) {
            (Selection::None, Vec::new())
        } else {
            let ids = groups
                .map(|index| index.entities_where(country_field, country))
                .unwrap_or_default();
            (
                Selection::Group {
                    ids: ids.clone(),
                    country: Some(country.to_string()),
                },
                ids,
            )
        };

        Transition {
            next,
            effects: vec![
                Effect::Render,
                Effect::Emit(Event::CountryChanged {
                    country: country.to_string(),
                    entity_ids,
                }),
            ],
        }
    }

    /// Host pushed a new configuration, possibly carrying a selection.
    pub fn update_configuration(
        &self,
        selection: Option<&RawSelection>,
        has_panel: impl Fn(&str) -> bool,
    ) -> Transition {
        let next = selection
            .map(Selection::from_raw)
            .unwrap_or_else(|| self.selection.clone());

        let mut effects = vec![Effect::Render];
        if let Some(target) = next.target(has_panel) {
            effects.push(Effect::FollowUp(target));
        }

        Transition { next, effects }
    }

    /// Host pushed a raw selection. `follow_up` is false when the chart
    /// itself is the caller and already scheduled its effects.
    pub fn update_selection(
        &self,
        raw: &RawSelection,
        follow_up: bool,
        has_panel: impl Fn(&str) -> bool,
    ) -> Transition {
        let next = Selection::from_raw(raw);

        let mut effects = vec![Effect::Render];
        if follow_up && let Some(target) = next.target(has_panel) {
            effects.push(Effect::FollowUp(target));
        }

        Transition { next, effects }
    }
}

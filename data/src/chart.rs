//! The cumulative deviation chart: an overview of every site plus a grid of
//! detail panels for flagged sites, driven by one selection.
//!
//! Rendering is a two-phase commit. Every transition renders synchronously
//! and may hand back a follow-up target in its [`Outcome`]; the caller runs
//! [`Chart::apply_follow_up`] once the new frame is on screen, because the
//! panels it targets only exist after that render.

use crate::config::Config;
use crate::engine::{Engine, HandleId, Plot, Surface};
use crate::group::{self, GroupIndex};
use crate::host::{
    Container, ContainerId, Emitted, Node, Registry, SelectorKind, WIDGET_MARKER, WidgetKind,
};
use crate::input::{Dataset, EntityLabel, group_rows};
use crate::panel::{PanelGrid, build_panels};
use crate::reshape::{PlotSeries, reshape};
use crate::selection::{Controller, Effect, RawSelection, Selection, Transition};
use crate::tooltip::{self, Candidate, Tooltip};

use rustc_hash::{FxHashMap, FxHashSet};
use serde_json::Value;

/// What the caller has to do after a transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    pub events: Vec<Emitted>,
    /// Entity to highlight, scroll to and show a tooltip for after the next paint.
    pub follow_up: Option<String>,
}

pub struct Chart<E: Engine> {
    container: Container,
    data: Dataset,
    labels: FxHashMap<String, EntityLabel>,
    entity_points: FxHashMap<String, Vec<(f64, f64)>>,
    entity_ids: Vec<String>,
    visits: FxHashMap<String, Vec<(String, Vec<(f64, f64)>)>>,
    config: Config,
    groups: Option<GroupIndex>,
    controller: Controller,
    series: Vec<PlotSeries>,
    grid: PanelGrid,
    tooltip: Tooltip,
    engine: E,
    overview: Option<HandleId>,
    panel_handles: Vec<HandleId>,
}

impl<E: Engine> Chart<E> {
    /// Takes over `container` and renders immediately.
    pub fn new(container: ContainerId, data: Dataset, config: Config, engine: E) -> Self {
        let mut root = Container::new(container);
        root.mark(WIDGET_MARKER);

        let labels = data.label_index();
        let grouped: Vec<(String, Vec<(f64, f64)>)> = group_rows(&data.flagged)
            .into_iter()
            .chain(group_rows(&data.unflagged))
            .collect();

        // labelled sites first, then any series without a label, each once
        let entity_ids: Vec<String> = {
            let mut seen: FxHashSet<&str> = FxHashSet::default();
            data.labels
                .iter()
                .map(|l| l.entity_id.as_str())
                .chain(grouped.iter().map(|(id, _)| id.as_str()))
                .filter(|id| seen.insert(*id))
                .map(str::to_string)
                .collect()
        };

        let groups = group::index(&data.groups, &config.group_level);
        let selection = config
            .selected_group_ids
            .as_ref()
            .map(Selection::from_raw)
            .unwrap_or_default();
        let visits = data.visits_by_entity();
        let grid = PanelGrid::new(
            config.panel_columns,
            config.panel_height,
            config.overview_height,
        );

        let mut chart = Self {
            container: root,
            labels,
            entity_points: grouped.into_iter().collect(),
            entity_ids,
            visits,
            data,
            config,
            groups,
            controller: Controller::new(selection),
            series: Vec::new(),
            grid,
            tooltip: Tooltip::default(),
            engine,
            overview: None,
            panel_handles: Vec::new(),
        };
        chart.render();
        chart
    }

    pub fn id(&self) -> ContainerId {
        self.container.id()
    }

    pub fn register(&self, registry: &mut Registry) {
        registry.register(self.container.id(), WidgetKind::Simaerep);
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn selection(&self) -> &Selection {
        self.controller.selection()
    }

    pub fn series(&self) -> &[PlotSeries] {
        &self.series
    }

    pub fn grid(&self) -> &PanelGrid {
        &self.grid
    }

    pub fn tooltip(&self) -> &Tooltip {
        &self.tooltip
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    pub fn overview_handle(&self) -> Option<HandleId> {
        self.overview
    }

    pub fn panel_handles(&self) -> &[HandleId] {
        &self.panel_handles
    }

    pub fn groups(&self) -> Option<&GroupIndex> {
        self.groups.as_ref()
    }

    /// Options of the site dropdown, led by the "none" sentinel.
    pub fn entity_options(&self) -> Vec<String> {
        std::iter::once(crate::selection::NONE.to_string())
            .chain(self.entity_ids.iter().cloned())
            .collect()
    }

    /// Options of the country dropdown, led by the "none" sentinel.
    pub fn country_options(&self) -> Vec<String> {
        let countries = self
            .groups
            .as_ref()
            .map(|g| g.distinct_values(&self.config.country_field))
            .unwrap_or_default();
        std::iter::once(crate::selection::NONE.to_string())
            .chain(countries)
            .collect()
    }

    fn has_panel_layer(&self) -> bool {
        self.config.show_detail_panels && !self.data.visits.is_empty()
    }

    /// Rebuilds every series, engine handle and panel from current state.
    pub fn render(&mut self) {
        self.series = reshape(
            &self.data.study,
            &self.data.flagged,
            &self.data.unflagged,
            &self.labels,
            self.controller.selection(),
        );

        self.teardown_handles();

        let (x_label, y_label) = (self.config.x_axis_label(), self.config.y_axis_label());
        self.overview = Some(self.engine.create(Plot {
            surface: Surface::Overview,
            series: self.series.clone(),
            x_label: x_label.clone(),
            y_label: y_label.clone(),
        }));

        if self.has_panel_layer() {
            let panels = build_panels(
                &self.data.labels,
                &self.entity_points,
                &self.visits,
                &self.data.study,
                &x_label,
                &y_label,
            );
            self.panel_handles = panels
                .iter()
                .map(|panel| self.engine.create(panel.plot.clone()))
                .collect();
            self.grid.rebuild(panels);
        } else {
            self.grid.clear();
        }

        let mut children = Vec::new();
        if self.config.show_entity_select {
            children.push(Node::Selector(SelectorKind::Entity));
        }
        if self.config.show_country_select {
            children.push(Node::Selector(SelectorKind::Country));
        }
        children.push(Node::Overview);
        if self.has_panel_layer() {
            children.push(Node::PanelGrid {
                panels: self.grid.panels().len(),
            });
        }
        children.push(Node::Tooltip);
        self.container.replace_children(children);

        self.tooltip.hide();
    }

    fn teardown_handles(&mut self) {
        if let Some(handle) = self.overview.take() {
            self.engine.destroy(handle);
        }
        for handle in self.panel_handles.drain(..) {
            self.engine.destroy(handle);
        }
    }

    fn commit(&mut self, transition: Transition) -> Outcome {
        let effects = self.controller.apply(transition);
        self.config.selected_group_ids = Some(self.controller.selection().to_raw());

        let mut outcome = Outcome::default();
        for effect in effects {
            match effect {
                Effect::Render => self.render(),
                Effect::Emit(event) => outcome.events.push(Emitted {
                    container: self.container.id(),
                    event,
                }),
                Effect::FollowUp(target) => {
                    if self.has_panel_layer() {
                        outcome.follow_up = Some(target);
                    }
                }
            }
        }
        outcome
    }

    pub fn select_entity(&mut self, entity_id: &str) -> Outcome {
        let transition = self.controller.select_entity(entity_id);
        self.commit(transition)
    }

    pub fn select_country(&mut self, country: &str) -> Outcome {
        let transition = self.controller.select_country(
            country,
            self.groups.as_ref(),
            &self.config.country_field,
        );
        self.commit(transition)
    }

    /// Host entry point: shallow-merges `patch` into the configuration and
    /// replaces the thresholds. An unusable patch keeps the old configuration.
    pub fn update_configuration(&mut self, patch: &Value, thresholds: Option<Value>) -> Outcome {
        match self.config.merged(patch) {
            Ok(config) => self.config = config,
            Err(err) => log::warn!("ignoring configuration patch: {err}"),
        }
        self.config.thresholds = thresholds;

        self.groups = group::index(&self.data.groups, &self.config.group_level);
        self.grid.resize(
            self.config.panel_columns,
            self.config.panel_height,
            self.config.overview_height,
        );

        // a patch carrying the key always replaces the selection; null or an
        // unreadable shape clears it
        let incoming: Option<RawSelection> = patch.get("selectedGroupIDs").map(|_| {
            self.config
                .selected_group_ids
                .clone()
                .unwrap_or_default()
        });

        let panels: Vec<String> = self.panel_ids();
        let transition = self
            .controller
            .update_configuration(incoming.as_ref(), |id| panels.iter().any(|p| p == id));
        self.commit(transition)
    }

    /// Host entry point: sets the selection as given. `follow_up` is false
    /// when the call originates from this chart's own event.
    pub fn update_selection(&mut self, raw: &RawSelection, follow_up: bool) -> Outcome {
        let panels: Vec<String> = self.panel_ids();
        let transition = self
            .controller
            .update_selection(raw, follow_up, |id| panels.iter().any(|p| p == id));
        self.commit(transition)
    }

    fn panel_ids(&self) -> Vec<String> {
        if !self.has_panel_layer() {
            return Vec::new();
        }
        self.data
            .labels
            .iter()
            .filter(|l| l.is_flagged())
            .map(|l| l.entity_id.clone())
            .collect()
    }

    /// Second phase of a selection: outline and reveal the site's panel and
    /// show a tooltip at its last point. Returns false, leaving nothing
    /// highlighted and the tooltip hidden, when the site has no panel.
    pub fn apply_follow_up(&mut self, entity_id: &str) -> bool {
        if !self.grid.highlight(entity_id) {
            self.tooltip.hide();
            return false;
        }
        self.grid.scroll_into_view(entity_id);

        let anchor = self
            .grid
            .panels()
            .iter()
            .find(|p| p.entity_id == entity_id)
            .and_then(|p| p.plot.anchor_of(entity_id));

        match anchor {
            Some(candidate) => self.show_tooltip(Surface::Panel(entity_id.to_string()), &[candidate]),
            None => self.tooltip.hide(),
        }
        true
    }

    /// Pointer moved over a surface; `candidates` come from the engine.
    pub fn hover(&mut self, surface: Surface, candidates: &[Candidate]) {
        if candidates.is_empty() {
            self.tooltip.hide();
        } else {
            self.show_tooltip(surface, candidates);
        }
    }

    pub fn leave(&mut self) {
        self.tooltip.hide();
    }

    fn show_tooltip(&mut self, surface: Surface, candidates: &[Candidate]) {
        let ctx = tooltip::Context {
            config: &self.config,
            labels: &self.labels,
            groups: self.groups.as_ref(),
        };
        let content = tooltip::build(candidates, &ctx);
        let nearest = candidates
            .iter()
            .min_by(|a, b| a.distance.total_cmp(&b.distance));

        match (content, nearest) {
            (Some(content), Some(nearest)) => {
                self.tooltip.show(surface, (nearest.x, nearest.y), content)
            }
            _ => self.tooltip.hide(),
        }
    }

    pub fn scroll_panels(&mut self, delta: f32) {
        self.grid.scroll_by(delta);
    }

    /// Lets a host operate a dropdown through its stable class identifier.
    pub fn drive_selector(&mut self, class: &str, value: &str) -> Outcome {
        match self.container.find_selector(class) {
            Some(SelectorKind::Entity) => self.select_entity(value),
            Some(SelectorKind::Country) => self.select_country(value),
            None => {
                log::debug!("no selector {class:?} in container {}", self.container.id());
                Outcome::default()
            }
        }
    }

    /// Tears down every engine handle and empties the container.
    pub fn destroy(&mut self) {
        self.teardown_handles();
        self.grid.clear();
        self.series.clear();
        self.tooltip = Tooltip::default();
        self.container.clear();
    }
}

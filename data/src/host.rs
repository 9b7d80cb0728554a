//! Contract between chart widgets and the report that hosts them.
//!
//! A host owns one [`Registry`] per report. Widgets register their container
//! under a [`WidgetKind`] and the host pushes selection or configuration into
//! every registered container. Widgets talk back through [`Emitted`] events
//! scoped to their container.

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Marker a host looks for when discovering widgets in a container tree.
pub const WIDGET_MARKER: &str = "htmlwidget";
/// Stable identifier of the site dropdown.
pub const ENTITY_SELECT_CLASS: &str = "site-select--simaerep";
/// Stable identifier of the country dropdown.
pub const COUNTRY_SELECT_CLASS: &str = "country-select--simaerep";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContainerId(Uuid);

impl ContainerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ContainerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ContainerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WidgetKind {
    Simaerep,
    SiteList,
}

impl std::fmt::Display for WidgetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WidgetKind::Simaerep => write!(f, "simaerep"),
            WidgetKind::SiteList => write!(f, "site list"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectorKind {
    Entity,
    Country,
}

impl SelectorKind {
    pub fn class(self) -> &'static str {
        match self {
            SelectorKind::Entity => ENTITY_SELECT_CLASS,
            SelectorKind::Country => COUNTRY_SELECT_CLASS,
        }
    }

    pub fn from_class(class: &str) -> Option<Self> {
        match class {
            ENTITY_SELECT_CLASS => Some(SelectorKind::Entity),
            COUNTRY_SELECT_CLASS => Some(SelectorKind::Country),
            _ => None,
        }
    }
}

/// Children a chart lays out inside its container, rebuilt on every render.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Selector(SelectorKind),
    Overview,
    PanelGrid { panels: usize },
    Tooltip,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Container {
    id: ContainerId,
    marker: Option<&'static str>,
    children: Vec<Node>,
}

impl Container {
    pub fn new(id: ContainerId) -> Self {
        Self {
            id,
            marker: None,
            children: Vec::new(),
        }
    }

    pub fn id(&self) -> ContainerId {
        self.id
    }

    pub fn mark(&mut self, marker: &'static str) {
        self.marker = Some(marker);
    }

    pub fn is_widget(&self) -> bool {
        self.marker == Some(WIDGET_MARKER)
    }

    pub fn children(&self) -> &[Node] {
        &self.children
    }

    pub fn replace_children(&mut self, children: Vec<Node>) {
        self.children = children;
    }

    pub fn clear(&mut self) {
        self.children.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Finds a selector by its stable class identifier.
    pub fn find_selector(&self, class: &str) -> Option<SelectorKind> {
        let kind = SelectorKind::from_class(class)?;
        self.children
            .iter()
            .any(|node| *node == Node::Selector(kind))
            .then_some(kind)
    }
}

/// Notifications a widget raises for the host and sibling widgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    SelectionChanged {
        entity_id: String,
    },
    CountryChanged {
        country: String,
        entity_ids: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emitted {
    pub container: ContainerId,
    pub event: Event,
}

/// Caller-supplied discovery context. Scoped to one report, never global.
#[derive(Debug, Default, Clone)]
pub struct Registry {
    widgets: FxHashMap<ContainerId, WidgetKind>,
    order: Vec<ContainerId>,
}

impl Registry {
    pub fn register(&mut self, container: ContainerId, kind: WidgetKind) {
        if self.widgets.insert(container, kind).is_none() {
            self.order.push(container);
        }
        log::debug!("registered {kind} widget in container {container}");
    }

    pub fn unregister(&mut self, container: ContainerId) -> Option<WidgetKind> {
        self.order.retain(|id| *id != container);
        self.widgets.remove(&container)
    }

    pub fn kind_of(&self, container: ContainerId) -> Option<WidgetKind> {
        self.widgets.get(&container).copied()
    }

    /// Registered containers in registration order.
    pub fn discover(&self) -> impl Iterator<Item = (ContainerId, WidgetKind)> + '_ {
        self.order
            .iter()
            .filter_map(|id| self.widgets.get(id).map(|kind| (*id, *kind)))
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_discovers_in_registration_order() {
        let mut registry = Registry::default();
        let (a, b) = (ContainerId::new(), ContainerId::new());

        registry.register(a, WidgetKind::SiteList);
        registry.register(b, WidgetKind::Simaerep);
        registry.register(a, WidgetKind::SiteList);

        let found: Vec<_> = registry.discover().collect();
        assert_eq!(found, vec![(a, WidgetKind::SiteList), (b, WidgetKind::Simaerep)]);

        assert_eq!(registry.unregister(a), Some(WidgetKind::SiteList));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.kind_of(a), None);
    }

    #[test]
    fn selectors_are_found_by_class() {
        let mut container = Container::new(ContainerId::new());
        container.replace_children(vec![Node::Selector(SelectorKind::Entity), Node::Overview]);

        assert_eq!(
            container.find_selector(ENTITY_SELECT_CLASS),
            Some(SelectorKind::Entity)
        );
        assert_eq!(container.find_selector(COUNTRY_SELECT_CLASS), None);
        assert_eq!(container.find_selector("unrelated"), None);
    }
}

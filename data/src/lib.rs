pub mod chart;
pub mod color;
pub mod config;
pub mod engine;
pub mod format;
pub mod group;
pub mod host;
pub mod input;
pub mod panel;
pub mod reshape;
pub mod selection;
pub mod site_list;
pub mod tooltip;
pub mod util;

pub use chart::{Chart, Outcome};
pub use config::Config;
pub use engine::{Engine, HandleId, Plot, Surface};
pub use group::GroupIndex;
pub use host::{ContainerId, Event, Registry, WidgetKind};
pub use input::Dataset;
pub use reshape::{PlotSeries, SeriesKind};
pub use selection::{RawSelection, Selection};

use std::path::PathBuf;

pub const APP_DIR_NAME: &str = "simaerep-chart";

/// Per-user data directory of the application, optionally joined with `path_name`.
///
/// Falls back to the current directory when the platform has no data dir.
pub fn data_path(path_name: Option<&str>) -> PathBuf {
    let base = dirs_next::data_dir()
        .map(|dir| dir.join(APP_DIR_NAME))
        .unwrap_or_else(|| PathBuf::from("."));

    match path_name {
        Some(name) => base.join(name),
        None => base,
    }
}

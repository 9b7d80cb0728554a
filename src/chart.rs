use data::engine::{Engine, HandleId, HandleIds, Plot};
use rustc_hash::FxHashMap;

/// Chart engine backed by iced canvases.
///
/// Holds the plot of every live handle; the canvas programs look plots up by
/// handle and redraw their caches whenever `version` moves.
#[derive(Default)]
pub struct CanvasEngine {
    ids: HandleIds,
    plots: FxHashMap<HandleId, Plot>,
    version: u64,
}

impl CanvasEngine {
    pub fn plot(&self, handle: HandleId) -> Option<&Plot> {
        self.plots.get(&handle)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn live(&self) -> usize {
        self.plots.len()
    }
}

impl Engine for CanvasEngine {
    fn create(&mut self, plot: Plot) -> HandleId {
        let handle = self.ids.next();
        log::trace!("plot {handle:?} created for {:?}", plot.surface);

        self.plots.insert(handle, plot);
        self.version = self.version.wrapping_add(1);
        handle
    }

    fn destroy(&mut self, handle: HandleId) {
        if self.plots.remove(&handle).is_none() {
            log::warn!("destroy of unknown plot {handle:?}");
        }
        self.version = self.version.wrapping_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use data::Surface;

    fn plot() -> Plot {
        Plot {
            surface: Surface::Overview,
            series: vec![],
            x_label: "Visits".into(),
            y_label: "Cumulative Adverse Events".into(),
        }
    }

    #[test]
    fn handles_track_live_plots() {
        let mut engine = CanvasEngine::default();
        let a = engine.create(plot());
        let b = engine.create(plot());
        assert_ne!(a, b);
        assert_eq!(engine.live(), 2);

        let before = engine.version();
        engine.destroy(a);
        assert!(engine.plot(a).is_none());
        assert!(engine.plot(b).is_some());
        assert!(engine.version() > before);
    }
}

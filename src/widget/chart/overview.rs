use super::{Gutter, Interaction};

use data::engine::Plot;
use data::tooltip::{Candidate, Tooltip};
use data::Surface;

use iced::widget::canvas::{self, Event, Geometry};
use iced::{Rectangle, Renderer, Theme, mouse, window};

#[derive(Default)]
pub struct State {
    plot_cache: canvas::Cache,
    last_version: u64,
    hovered: Vec<Candidate>,
}

/// Every site against the study reference, on one canvas.
pub struct Overview<'a> {
    plot: Option<&'a Plot>,
    tooltip: &'a Tooltip,
    version: u64,
}

impl<'a> Overview<'a> {
    pub fn new(plot: Option<&'a Plot>, tooltip: &'a Tooltip, version: u64) -> Self {
        Self {
            plot,
            tooltip,
            version,
        }
    }
}

impl canvas::Program<Interaction> for Overview<'_> {
    type State = State;

    fn update(
        &self,
        state: &mut State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Interaction>> {
        match event {
            Event::Window(window::Event::RedrawRequested(_)) => {
                if state.last_version != self.version {
                    state.plot_cache.clear();
                    state.last_version = self.version;
                }
                None
            }
            Event::Mouse(mouse::Event::CursorMoved { .. } | mouse::Event::CursorLeft) => {
                let plot = self.plot?;

                let Some(local) = cursor.position_in(bounds) else {
                    if state.hovered.is_empty() {
                        return None;
                    }
                    state.hovered.clear();
                    return Some(canvas::Action::publish(Interaction::Left));
                };

                let area = Gutter::OVERVIEW.plot_area(Rectangle::with_size(bounds.size()));
                let candidates = plot.candidates(local, area);
                if candidates == state.hovered {
                    return None;
                }
                state.hovered = candidates.clone();

                Some(canvas::Action::publish(Interaction::Hovered(
                    Surface::Overview,
                    candidates,
                )))
            }
            _ => None,
        }
    }

    fn draw(
        &self,
        state: &State,
        renderer: &Renderer,
        theme: &Theme,
        bounds: Rectangle,
        _cursor: mouse::Cursor,
    ) -> Vec<Geometry> {
        let Some(plot) = self.plot else {
            return vec![];
        };
        let palette = theme.extended_palette();
        let local = Rectangle::with_size(bounds.size());
        let area = Gutter::OVERVIEW.plot_area(local);

        let lines = state.plot_cache.draw(renderer, bounds.size(), |frame| {
            super::fill_plot(frame, plot, area, palette, true);
        });

        let mut overlay = canvas::Frame::new(renderer, bounds.size());
        if self.tooltip.is_visible()
            && *self.tooltip.surface() == Surface::Overview
            && let Some(extent) = plot.extent()
        {
            let anchor = extent.to_screen(self.tooltip.anchor(), area);
            super::fill_tooltip(&mut overlay, self.tooltip, anchor, local, palette);
        }

        vec![lines, overlay.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        state: &State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        if !state.hovered.is_empty() && cursor.is_over(bounds) {
            mouse::Interaction::Crosshair
        } else {
            mouse::Interaction::default()
        }
    }
}

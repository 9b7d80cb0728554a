use super::{Gutter, Interaction};

use data::engine::Plot;
use data::panel::PanelGrid;
use data::tooltip::{Candidate, Tooltip};
use data::Surface;

use iced::widget::canvas::{self, Event, Geometry};
use iced::{Point, Rectangle, Renderer, Size, Theme, mouse, window};

/// Pixels scrolled per wheel line.
const LINE_SCROLL: f32 = 40.0;

#[derive(Debug, Clone, PartialEq)]
struct Revision {
    version: u64,
    scroll: f32,
    highlighted: Option<String>,
}

#[derive(Default)]
pub struct State {
    cache: canvas::Cache,
    last: Option<Revision>,
    hovered: Vec<Candidate>,
}

/// Scrollable grid of detail panels, one per flagged site.
pub struct Grid<'a> {
    grid: &'a PanelGrid,
    /// Engine plot of each panel, in panel order.
    plots: Vec<Option<&'a Plot>>,
    tooltip: &'a Tooltip,
    version: u64,
}

impl<'a> Grid<'a> {
    pub fn new(
        grid: &'a PanelGrid,
        plots: Vec<Option<&'a Plot>>,
        tooltip: &'a Tooltip,
        version: u64,
    ) -> Self {
        Self {
            grid,
            plots,
            tooltip,
            version,
        }
    }

    fn revision(&self) -> Revision {
        Revision {
            version: self.version,
            scroll: self.grid.scroll(),
            highlighted: self.grid.highlighted().map(str::to_string),
        }
    }

    fn hit(&self, local: Point, width: f32) -> Option<(usize, &'a Plot, Rectangle)> {
        let panel = self.grid.panel_at(local, width)?;
        let idx = self
            .grid
            .panels()
            .iter()
            .position(|p| p.entity_id == panel.entity_id)?;
        let plot = self.plots.get(idx).copied().flatten()?;

        Some((idx, plot, self.grid.cell(idx, width)))
    }
}

impl canvas::Program<Interaction> for Grid<'_> {
    type State = State;

    fn update(
        &self,
        state: &mut State,
        event: &Event,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> Option<canvas::Action<Interaction>> {
        if let Event::Window(window::Event::RedrawRequested(_)) = event {
            let revision = self.revision();
            if state.last.as_ref() != Some(&revision) {
                state.cache.clear();
                state.last = Some(revision);
            }
            return None;
        }

        let Event::Mouse(mouse_event) = event else {
            return None;
        };

        let Some(local) = cursor.position_in(bounds) else {
            if state.hovered.is_empty() {
                return None;
            }
            state.hovered.clear();
            return Some(canvas::Action::publish(Interaction::Left));
        };

        match mouse_event {
            mouse::Event::WheelScrolled { delta } => {
                let dy = match delta {
                    mouse::ScrollDelta::Lines { y, .. } => -y * LINE_SCROLL,
                    mouse::ScrollDelta::Pixels { y, .. } => -y,
                };
                state.hovered.clear();
                Some(canvas::Action::publish(Interaction::Scrolled(dy)).and_capture())
            }
            mouse::Event::ButtonPressed(mouse::Button::Left) => {
                let panel = self.grid.panel_at(local, bounds.width)?;
                Some(canvas::Action::publish(Interaction::PanelClicked(
                    panel.entity_id.clone(),
                )))
            }
            mouse::Event::CursorMoved { .. } => {
                let (candidates, surface) = match self.hit(local, bounds.width) {
                    Some((idx, plot, cell)) => (
                        plot.candidates(local, Gutter::PANEL.plot_area(cell)),
                        Surface::Panel(self.grid.panels()[idx].entity_id.clone()),
                    ),
                    None => (Vec::new(), Surface::Overview),
                };
                if candidates == state.hovered {
                    return None;
                }
                state.hovered = candidates.clone();

                Some(canvas::Action::publish(if candidates.is_empty() {
                    Interaction::Left
                } else {
                    Interaction::Hovered(surface, candidates)
                }))
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
        let palette = theme.extended_palette();
        let width = bounds.width;

        let panels = state.cache.draw(renderer, bounds.size(), |frame| {
            for (idx, panel) in self.grid.panels().iter().enumerate() {
                let cell = self.grid.cell(idx, width);
                if cell.y + cell.height < 0.0 || cell.y > bounds.height {
                    continue;
                }

                frame.fill_rectangle(cell.position(), cell.size(), palette.background.weak.color);
                super::fill_label(
                    frame,
                    format!("Site {}", panel.entity_id),
                    Point::new(cell.x + 6.0, cell.y + 10.0),
                    palette.background.base.text,
                    iced::Alignment::Start,
                );

                if let Some(plot) = self.plots.get(idx).copied().flatten() {
                    super::fill_plot(frame, plot, Gutter::PANEL.plot_area(cell), palette, false);
                }

                if let Some(outline) = panel.style.outline {
                    let inset = outline.width / 2.0;
                    frame.stroke(
                        &canvas::Path::rectangle(
                            Point::new(cell.x + inset, cell.y + inset),
                            Size::new(cell.width - outline.width, cell.height - outline.width),
                        ),
                        canvas::Stroke::default()
                            .with_color(outline.color)
                            .with_width(outline.width),
                    );
                }
            }
        });

        let mut overlay = canvas::Frame::new(renderer, bounds.size());
        if self.tooltip.is_visible()
            && let Surface::Panel(entity_id) = self.tooltip.surface()
            && let Some(idx) = self
                .grid
                .panels()
                .iter()
                .position(|p| &p.entity_id == entity_id)
            && let Some(plot) = self.plots.get(idx).copied().flatten()
            && let Some(extent) = plot.extent()
        {
            let cell = self.grid.cell(idx, width);
            let anchor = extent.to_screen(self.tooltip.anchor(), Gutter::PANEL.plot_area(cell));
            super::fill_tooltip(&mut overlay, self.tooltip, anchor, cell, palette);
        }

        vec![panels, overlay.into_geometry()]
    }

    fn mouse_interaction(
        &self,
        _state: &State,
        bounds: Rectangle,
        cursor: mouse::Cursor,
    ) -> mouse::Interaction {
        match cursor.position_in(bounds) {
            Some(local) if self.grid.panel_at(local, bounds.width).is_some() => {
                mouse::Interaction::Pointer
            }
            _ => mouse::Interaction::default(),
        }
    }
}

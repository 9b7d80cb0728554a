use crate::chart::CanvasEngine;
use crate::widget::chart::{Interaction, grid::Grid, overview::Overview};

use data::host::{Node, SelectorKind};
use data::{Chart, Outcome};

use iced::{
    Element, Length,
    widget::{canvas, center, column, container, pick_list, row, space, text},
};

#[derive(Debug, Clone)]
pub enum Message {
    EntitySelected(String),
    CountrySelected(String),
    Canvas(Interaction),
    /// Second phase of a selection, dispatched once the new frame is drawn.
    FollowUp(String),
}

pub fn view(chart: &Chart<CanvasEngine>) -> Element<'_, Message> {
    let engine = chart.engine();

    let mut selectors = row![].spacing(8).align_y(iced::Alignment::Center);
    let mut plots = row![].spacing(8);

    for node in chart.container().children() {
        match node {
            Node::Selector(SelectorKind::Entity) => {
                selectors = selectors.push(text("Site")).push(pick_list(
                    chart.entity_options(),
                    Some(chart.selection().entity_choice().to_string()),
                    Message::EntitySelected,
                ));
            }
            Node::Selector(SelectorKind::Country) => {
                selectors = selectors.push(text("Country")).push(pick_list(
                    chart.country_options(),
                    Some(chart.selection().country_choice().to_string()),
                    Message::CountrySelected,
                ));
            }
            Node::Overview => {
                let plot = chart.overview_handle().and_then(|h| engine.plot(h));
                let overview: Element<'_, Interaction> =
                    canvas(Overview::new(plot, chart.tooltip(), engine.version()))
                        .width(Length::FillPortion(3))
                        .height(chart.config().overview_height)
                        .into();
                plots = plots.push(overview.map(Message::Canvas));
            }
            Node::PanelGrid { panels } => {
                let content: Element<'_, Interaction> = if *panels == 0 {
                    center(text("No flagged sites").size(14))
                        .width(Length::FillPortion(2))
                        .height(chart.grid().viewport_height())
                        .into()
                } else {
                    let handles: Vec<_> = chart
                        .panel_handles()
                        .iter()
                        .map(|h| engine.plot(*h))
                        .collect();
                    canvas(Grid::new(
                        chart.grid(),
                        handles,
                        chart.tooltip(),
                        engine.version(),
                    ))
                    .width(Length::FillPortion(2))
                    .height(chart.grid().viewport_height())
                    .into()
                };
                plots = plots.push(content.map(Message::Canvas));
            }
            Node::Tooltip => {}
        }
    }

    if chart.series().is_empty() {
        selectors = selectors.push(space::horizontal()).push(text("No data").size(12));
    }

    container(column![selectors, plots].spacing(8))
        .padding(8)
        .into()
}

pub fn update(chart: &mut Chart<CanvasEngine>, message: Message) -> Outcome {
    match message {
        Message::EntitySelected(id) => chart.select_entity(&id),
        Message::CountrySelected(country) => chart.select_country(&country),
        Message::Canvas(Interaction::PanelClicked(id)) => chart.select_entity(&id),
        Message::Canvas(Interaction::Hovered(surface, candidates)) => {
            chart.hover(surface, &candidates);
            Outcome::default()
        }
        Message::Canvas(Interaction::Left) => {
            chart.leave();
            Outcome::default()
        }
        Message::Canvas(Interaction::Scrolled(delta)) => {
            chart.scroll_panels(delta);
            Outcome::default()
        }
        Message::FollowUp(id) => {
            if !chart.apply_follow_up(&id) {
                log::debug!("site {id} has no detail panel");
            }
            Outcome::default()
        }
    }
}

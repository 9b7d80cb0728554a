mod chart;
mod logger;
mod screen;
mod widget;

use chart::CanvasEngine;
use screen::{simaerep, site_list};

use data::host::{ContainerId, Emitted, Event, Registry, WidgetKind};
use data::site_list::SiteList;
use data::{Chart, Config, Dataset, Outcome, RawSelection};

use iced::widget::row;
use iced::{Element, Task};

use std::path::{Path, PathBuf};

fn main() -> iced::Result {
    let mut args = std::env::args().skip(1);
    let dataset = args.next().map(PathBuf::from);
    let config = args.next().map(PathBuf::from);

    if let Err(err) = logger::setup(cfg!(feature = "debug")) {
        eprintln!("logger setup failed: {err}");
    }

    iced::application(
        move || Report::new(dataset.as_deref(), config.as_deref()),
        Report::update,
        Report::view,
    )
    .title("simaerep")
    .window_size(iced::Size::new(1360.0, 560.0))
    .run()
}

#[derive(Debug, Clone)]
enum Message {
    Chart(simaerep::Message),
    Sites(site_list::Message),
}

/// Host report: one cumulative deviation chart and one site list sharing a
/// single selection.
struct Report {
    registry: Registry,
    chart: Chart<CanvasEngine>,
    sites: SiteList,
}

impl Report {
    fn new(dataset: Option<&Path>, config: Option<&Path>) -> Self {
        let dataset = dataset
            .map(|path| {
                Dataset::from_path(path).unwrap_or_else(|err| {
                    log::error!("failed to load {}: {err}", path.display());
                    Dataset::default()
                })
            })
            .unwrap_or_default();
        if dataset.is_empty() {
            log::warn!("no data to plot");
        }

        let config = config
            .map(|path| {
                data::config::load(path).unwrap_or_else(|err| {
                    log::error!("failed to load {}: {err}", path.display());
                    Config::default()
                })
            })
            .unwrap_or_default();

        let sites = SiteList::new(ContainerId::new(), &dataset.labels);
        let chart = Chart::new(ContainerId::new(), dataset, config, CanvasEngine::default());

        let mut registry = Registry::default();
        chart.register(&mut registry);
        sites.register(&mut registry);

        let mut report = Self {
            registry,
            chart,
            sites,
        };
        let initial = report.chart.selection().to_raw();
        report.sites.update_selection(&initial);
        report
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::Chart(message) => {
                let outcome = simaerep::update(&mut self.chart, message);
                self.dispatch(outcome)
            }
            Message::Sites(message) => {
                let emitted = site_list::update(&mut self.sites, message);
                self.dispatch(Outcome {
                    events: vec![emitted],
                    follow_up: None,
                })
            }
        }
    }

    /// Pushes emitted selection events into every other registered widget
    /// and schedules pending follow-ups for after the next frame.
    fn dispatch(&mut self, outcome: Outcome) -> Task<Message> {
        let mut follow_ups: Vec<String> = outcome.follow_up.into_iter().collect();

        for Emitted { container, event } in outcome.events {
            log::info!("{container}: {event:?}");
            let raw = match event {
                Event::SelectionChanged { entity_id } => RawSelection::One(entity_id),
                Event::CountryChanged { entity_ids, .. } if entity_ids.is_empty() => {
                    RawSelection::default()
                }
                Event::CountryChanged { entity_ids, .. } => RawSelection::Many(entity_ids),
            };

            let targets: Vec<(ContainerId, WidgetKind)> = self
                .registry
                .discover()
                .filter(|(id, _)| *id != container)
                .collect();

            for (id, kind) in targets {
                match kind {
                    WidgetKind::Simaerep if id == self.chart.id() => {
                        let pushed = self.chart.update_selection(&raw, true);
                        follow_ups.extend(pushed.follow_up);
                    }
                    WidgetKind::SiteList if id == self.sites.id() => {
                        self.sites.update_selection(&raw);
                    }
                    _ => log::warn!("no {kind} widget in container {id}"),
                }
            }
        }

        Task::batch(
            follow_ups
                .into_iter()
                .map(|id| Task::done(Message::Chart(simaerep::Message::FollowUp(id)))),
        )
    }

    fn view(&self) -> Element<'_, Message> {
        row![
            site_list::view(&self.sites).map(Message::Sites),
            simaerep::view(&self.chart).map(Message::Chart),
        ]
        .into()
    }
}

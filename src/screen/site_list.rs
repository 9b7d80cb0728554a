use data::format::format_number;
use data::host::Emitted;
use data::site_list::{Row, SiteList};

use iced::{
    Element, Length,
    widget::{button, column, container, row, scrollable, space, text},
};

#[derive(Debug, Clone)]
pub enum Message {
    SiteClicked(String),
}

fn site_row<'a>(site: &Row, is_selected: bool) -> Element<'a, Message> {
    let score = site
        .score
        .map(|s| format_number(s, 3))
        .unwrap_or_else(|| "-".to_string());
    let flag = if site.flagged { "flagged" } else { "" };

    let content = row![
        text(format!("Site {}", site.entity_id)).color(site.color),
        space::horizontal(),
        text(flag).size(11),
        text(score).size(12).width(56),
    ]
    .spacing(8)
    .width(Length::Fill);

    button(content)
        .on_press(Message::SiteClicked(site.entity_id.clone()))
        .width(Length::Fill)
        .style(if is_selected {
            button::primary
        } else {
            button::text
        })
        .into()
}

pub fn view(list: &SiteList) -> Element<'_, Message> {
    let rows = list
        .rows()
        .iter()
        .map(|site| site_row(site, list.is_selected(&site.entity_id)));

    container(scrollable(column(rows).spacing(2)))
        .padding(8)
        .width(260)
        .into()
}

pub fn update(list: &mut SiteList, message: Message) -> Emitted {
    match message {
        Message::SiteClicked(id) => list.select(&id),
    }
}

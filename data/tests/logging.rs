use simaerep_chart_data::group;
use simaerep_chart_data::input::GroupMetadataRow;

use std::sync::{Mutex, Once};

static RECORDS: Mutex<Vec<(log::Level, String)>> = Mutex::new(Vec::new());
static INSTALL: Once = Once::new();

struct Capture;

impl log::Log for Capture {
    fn enabled(&self, _metadata: &log::Metadata) -> bool {
        true
    }

    fn log(&self, record: &log::Record) {
        if let Ok(mut records) = RECORDS.lock() {
            records.push((record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

fn capture() {
    INSTALL.call_once(|| {
        log::set_boxed_logger(Box::new(Capture)).unwrap();
        log::set_max_level(log::LevelFilter::Trace);
    });
}

fn row(entity_id: &str, level: &str) -> GroupMetadataRow {
    GroupMetadataRow {
        entity_id: entity_id.into(),
        level: level.into(),
        attribute_name: "Country".into(),
        attribute_value: "USA".into(),
    }
}

#[test]
fn missing_group_level_is_warned_about() {
    capture();

    let rows = vec![row("US", "Country"), row("DE", "Country")];
    assert!(group::index(&rows, "Site").is_none());

    let records = RECORDS.lock().unwrap();
    let warning = records
        .iter()
        .find(|(level, message)| *level == log::Level::Warn && message.contains("\"Site\""));
    assert!(warning.is_some(), "no warning in {records:?}");
    assert!(warning.unwrap().1.contains("Country"));
}

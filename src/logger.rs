use std::{fs, io};

const LOG_FILE: &str = "simaerep-chart.log";
const LEVEL_ENV: &str = "SIMAEREP_LOG";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("log file: {0}")]
    Io(#[from] io::Error),
    #[error("logger already installed: {0}")]
    SetLogger(#[from] log::SetLoggerError),
}

fn level(is_debug: bool) -> log::LevelFilter {
    std::env::var(LEVEL_ENV)
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(if is_debug {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
}

/// Logs to stdout and to a file in the application data directory.
pub fn setup(is_debug: bool) -> Result<(), Error> {
    let level = level(is_debug);

    let dir = data::data_path(None);
    fs::create_dir_all(&dir)?;
    let file = fern::log_file(dir.join(LOG_FILE))?;

    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} {:<5} {} -- {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(log::LevelFilter::Warn)
        .level_for("simaerep_chart", level)
        .level_for("simaerep_chart_data", level)
        .chain(io::stdout())
        .chain(file)
        .apply()?;

    Ok(())
}

use clap::Parser;
use log::*;
#[cfg(debug_assertions)]
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::{
    append::rolling_file::{
        RollingFileAppender,
        policy::compound::{
            CompoundPolicy, roll::fixed_window::FixedWindowRoller, trigger::size::SizeTrigger,
        },
    },
    config::{Appender, Config as LogConfig, Logger, Root},
    encode::pattern::PatternEncoder,
};
use podracer_common::{
    api::{PodRacerClient, RacerId, TrackId},
    config::Config,
};
use std::{
    error::Error,
    path::{Path, PathBuf},
    sync::Arc,
};

mod app;
mod race;
#[cfg(test)]
mod test_support;

use app::{PodRacerApp, input, message::UiEvents, render::TerminalRenderer};

const APP_NAME: &str = "podracer";

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[clap(long, short, action(clap::ArgAction::Count))]
    /// Increase the log verbosity
    verbose: u8,

    #[clap(long)]
    /// URL of the race server, overrides the config file
    server: Option<String>,

    #[clap(long)]
    /// Read the config from this file instead of the platform config location
    config: Option<PathBuf>,

    #[clap(long)]
    /// Id of the track to select at startup
    track: Option<TrackId>,

    #[clap(long)]
    /// Id of the racer to select at startup
    racer: Option<RacerId>,

    #[clap(long)]
    /// Directory within which log files will be placed, default is platform dependent
    log_location: Option<PathBuf>,

    #[clap(long, default_value = "5000000")]
    /// Max size in bytes that a log file is allowed to reach before being rolled over
    log_max_file_size: u64,

    #[clap(long, default_value = "3")]
    /// Number of archived logs to keep
    num_old_logs: u32,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::parse();

    init_logging(&args)?;

    let mut config = load_config(args.config.as_deref())?;
    if let Some(url) = args.server {
        config.server.url = url;
    }

    info!("Using race server at {}", config.server.url);
    let api = PodRacerClient::new(&config.server.url, config.server.timeout())?;

    let mut app = PodRacerApp::new(Arc::new(api), Arc::new(TerminalRenderer), config.race);
    app.load().await;
    info!(
        "Loaded {} tracks and {} racers",
        app.catalog().tracks.len(),
        app.catalog().racers.len()
    );
    if let Some(id) = args.track {
        app.on_select_track(id);
    }
    if let Some(id) = args.racer {
        app.on_select_racer(id);
    }

    // Stdin reads block, so they get a thread of their own
    let tx = app.sender();
    std::thread::spawn(move || input::read_input(std::io::stdin().lock(), tx));

    let store = app.run().await;
    debug!(
        "Stopped with track {:?} and racer {:?} selected",
        store.track_id(),
        store.player_id()
    );

    Ok(())
}

fn load_config(path: Option<&Path>) -> Result<Config, Box<dyn Error>> {
    if let Some(path) = path {
        info!("Reading config file from {}", path.display());
        return Config::new_from_file(path);
    }

    match confy::get_configuration_file_path(APP_NAME, None) {
        Ok(path) => info!("Reading config file from {}", path.display()),
        Err(e) => warn!("Could not determine the config file path: {e}"),
    }

    let config: Config = match confy::load(APP_NAME, None) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file, overwriting with default. Error: {e}");
            let config = Config::default();
            confy::store(APP_NAME, None, &config)?;
            config
        }
    };

    Ok(config)
}

fn init_logging(args: &Cli) -> Result<(), Box<dyn Error>> {
    let log_level = match args.verbose {
        0 => LevelFilter::Info,
        1 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let log_base_path = match &args.log_location {
        Some(path) => path.clone(),
        None => {
            let mut path = directories::BaseDirs::new()
                .ok_or("Could not find a directory to store logs")?
                .data_local_dir()
                .to_path_buf();
            path.push("podracer-logs");
            path
        }
    };
    let mut log_path = log_base_path.clone();
    let mut archived_log_path = log_base_path;
    log_path.push(format!("{APP_NAME}-log.txt"));
    archived_log_path.push(format!("{APP_NAME}-log-{{}}.txt.gz"));

    #[cfg(debug_assertions)]
    eprintln!("Log path: {}", log_path.display());

    // Only log to the console in debug mode, stdout belongs to the race views
    #[cfg(debug_assertions)]
    let console = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("[{d} {h({l:5})} {M}] {m}{n}")))
        .build();

    // Setup the file log roller
    let roller = FixedWindowRoller::builder().build(
        archived_log_path
            .to_str()
            .ok_or("The log path is not valid UTF-8")?,
        args.num_old_logs,
    )?;
    let file_policy = CompoundPolicy::new(
        Box::new(SizeTrigger::new(args.log_max_file_size)),
        Box::new(roller),
    );
    let file_appender = RollingFileAppender::builder()
        .append(true)
        .encoder(Box::new(PatternEncoder::new("[{d} {l:5} {M}] {m}{n}")))
        .build(log_path, Box::new(file_policy))?;

    // Setup the logging from all locations to use `LevelFilter::Error`
    let root = Root::builder().appender("file_appender");
    #[cfg(debug_assertions)]
    let root = root.appender("console");
    let root = root.build(LevelFilter::Error);

    // Setup the top level logging config
    let log_config = LogConfig::builder()
        .appender(Appender::builder().build("file_appender", Box::new(file_appender)));

    #[cfg(debug_assertions)]
    let log_config = log_config.appender(Appender::builder().build("console", Box::new(console)));

    let log_config = log_config
        .logger(Logger::builder().build(APP_NAME, log_level)) // Setup the logging from this app to use `log_level`
        .logger(Logger::builder().build("podracer_common", log_level))
        .build(root)?;

    log4rs::init_config(log_config)?;
    log_panics::init();

    Ok(())
}

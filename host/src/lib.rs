//! MQT Host Library - Page Session and Control Surface Glue
//!
//! Plays both sides of the equalizer from one process: the page (a session
//! following an in-process media element) and the control surface (which
//! sends commands and saves the settings record after each one).

mod console;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use mqt_core::{
    ensure_defaults, ChainConfig, Command, EqualizerController, JsonFileStore, PageEvent, Session,
    SettingsStore,
};
use mqt_platform::{PageElements, SoftwareBackend};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};
use tracing_subscriber::EnvFilter;

pub use console::{parse_line, Line};

/// Default log filter when `RUST_LOG` is unset
const DEFAULT_FILTER: &str = "mqt_core=debug,mqt_platform=info,mqt_host_lib=info";

/// Environment variable overriding the settings file location
pub const SETTINGS_ENV: &str = "MQT_SETTINGS";

pub const SAMPLE_RATE: f32 = 48000.0;

/// What the loop should do after a line
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Reply(String),
    Silent,
    Quit,
}

/// A page plus the control surface driving it
pub struct Host {
    session: Session,
    page: PageElements,
    store: Arc<dyn SettingsStore>,
}

impl Host {
    /// Write first-run defaults, put a media element on the page and set up audio
    pub fn new(store: Arc<dyn SettingsStore>, sample_rate: f32) -> anyhow::Result<Self> {
        ensure_defaults(store.as_ref());

        let backend = SoftwareBackend::new(sample_rate);
        let controller = EqualizerController::new(Box::new(backend), Arc::clone(&store), ChainConfig::default())
            .context("Failed to create equalizer")?;

        let session = Session::new(controller);
        let page = PageElements::new();
        session.watch(&page);

        let mut host = Self { session, page, store };
        host.page.mount_new();
        host.session.pump();
        Ok(host)
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn handle_line(&mut self, line: &str) -> anyhow::Result<Outcome> {
        self.session.pump();

        let outcome = match parse_line(line)? {
            Line::Message(value) => {
                let command = mqt_core::dispatch::parse(&value);
                self.send(&command)?
            }
            Line::Preset(name) => match Command::preset(&name) {
                Some(command) => self.send(&command)?,
                None => {
                    warn!("No preset named {:?}", name);
                    Outcome::Silent
                }
            },
            Line::Click => {
                if self.session.events().send(PageEvent::UserInteraction).is_err() {
                    debug!("Event queue closed, dropping click");
                }
                self.session.pump();
                Outcome::Reply(json!({ "ready": self.session.is_ready() }).to_string())
            }
            Line::Navigate => {
                let element = self.page.mount_new();
                self.session.pump();
                Outcome::Reply(json!({ "element": element.id(), "ready": self.session.is_ready() }).to_string())
            }
            Line::Status => {
                let status = match self.session.controller().snapshot() {
                    Ok(snapshot) => serde_json::to_value(snapshot)?,
                    Err(_) => json!({ "ready": false }),
                };
                Outcome::Reply(status.to_string())
            }
            Line::Quit => Outcome::Quit,
            Line::Empty => Outcome::Silent,
        };
        Ok(outcome)
    }

    /// Deliver to the page, then save the record like the control surface does
    fn send(&mut self, command: &Command) -> anyhow::Result<Outcome> {
        let ack = self.session.handle_command(command);
        if *command != Command::Unknown {
            self.persist(command);
        }
        Ok(Outcome::Reply(serde_json::to_string(&ack)?))
    }

    fn persist(&self, command: &Command) {
        let mut record = match self.store.get() {
            Ok(record) => record.unwrap_or_default(),
            Err(e) => {
                warn!("Could not read settings, starting from defaults: {}", e);
                Default::default()
            }
        };
        record.apply_command(command);
        if let Err(e) = self.store.set(&record) {
            error!("Failed to save settings: {}", e);
        } else {
            debug!("Saved settings after {}", command.kind());
        }
    }
}

fn settings_store() -> anyhow::Result<JsonFileStore> {
    match std::env::var_os(SETTINGS_ENV) {
        Some(path) => Ok(JsonFileStore::new(PathBuf::from(path))),
        None => JsonFileStore::default_location().context("No settings location"),
    }
}

/// Read lines from stdin until EOF or `quit`
pub async fn run() -> anyhow::Result<()> {
    // Acks go to stdout, so logs go to stderr
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)))
        .with_writer(std::io::stderr)
        .init();

    info!("Starting MQT Equalizer host");

    let store = settings_store()?;
    info!("Settings file: {:?}", store.path());
    let mut host = Host::new(Arc::new(store), SAMPLE_RATE)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        match host.handle_line(&line) {
            Ok(Outcome::Reply(reply)) => {
                stdout.write_all(reply.as_bytes()).await?;
                stdout.write_all(b"\n").await?;
                stdout.flush().await?;
            }
            Ok(Outcome::Silent) => {}
            Ok(Outcome::Quit) => break,
            Err(e) => warn!("{:#}", e),
        }
    }

    info!("Host shutting down");
    Ok(())
}

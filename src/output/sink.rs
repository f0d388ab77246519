use std::fs::File;
use std::io;
use std::io::BufWriter;
use std::io::Write;

use tracing::debug;

use super::Destination;
use crate::ChangeEvent;
use crate::OutputConfig;
use crate::OutputError;

const HUMAN: &str = "log";
const JSON: &str = "json";

type Writer = Box<dyn Write + Send>;

/// Writes every event to the configured human and JSON destinations
///
/// The human log defaults to stderr and JSON to stdout. Both are flushed
/// after each event so a killed process never loses a delivered line.
pub struct EventSink {
    human: Option<Writer>,
    json: Option<Writer>,
}

impl EventSink {
    /// Files are created (truncated if they exist) up front
    pub fn open(config: &OutputConfig) -> std::result::Result<Self, OutputError> {
        let human = open_writer(HUMAN, Destination::parse(&config.log), || Box::new(io::stderr()))?;
        let json = open_writer(JSON, Destination::parse(&config.json), || Box::new(io::stdout()))?;
        Ok(Self { human, json })
    }

    /// Build a sink on arbitrary writers
    pub fn from_writers(
        human: Option<Box<dyn Write + Send>>,
        json: Option<Box<dyn Write + Send>>,
    ) -> Self {
        Self { human, json }
    }

    pub fn is_empty(&self) -> bool {
        self.human.is_none() && self.json.is_none()
    }

    pub fn write(
        &mut self,
        event: &ChangeEvent,
    ) -> std::result::Result<(), OutputError> {
        if let Some(w) = self.human.as_mut() {
            writeln!(w, "{event}")
                .and_then(|_| w.flush())
                .map_err(|source| OutputError::Write { kind: HUMAN, source })?;
        }

        if let Some(w) = self.json.as_mut() {
            serde_json::to_writer(&mut *w, event)?;
            w.write_all(b"\n")
                .and_then(|_| w.flush())
                .map_err(|source| OutputError::Write { kind: JSON, source })?;
        }
        Ok(())
    }

    pub fn flush(&mut self) -> std::result::Result<(), OutputError> {
        if let Some(w) = self.human.as_mut() {
            w.flush().map_err(|source| OutputError::Write { kind: HUMAN, source })?;
        }
        if let Some(w) = self.json.as_mut() {
            w.flush().map_err(|source| OutputError::Write { kind: JSON, source })?;
        }
        Ok(())
    }
}

fn open_writer(
    kind: &'static str,
    destination: Destination,
    default_stream: impl FnOnce() -> Writer,
) -> std::result::Result<Option<Writer>, OutputError> {
    match destination {
        Destination::Suppressed => Ok(None),
        Destination::Default => Ok(Some(default_stream())),
        Destination::File(path) => {
            debug!("creating {} output file {:?}", kind, path);
            let file = File::create(&path).map_err(|source| OutputError::Create { kind, path, source })?;
            Ok(Some(Box::new(BufWriter::new(file))))
        }
    }
}

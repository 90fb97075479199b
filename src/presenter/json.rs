use std::io::{self, Write};

use parking_lot::Mutex;
use serde::Serialize;

use super::Presenter;
use crate::status::{BoardSnapshot, FleetSummary};

/// How machine-readable output is framed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonMode {
    /// One pretty document with the final state, nothing while running.
    Document,
    /// One compact object per line for every render and summary.
    Lines,
}

#[derive(Serialize)]
struct Line<'a, T: Serialize> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    payload: &'a T,
}

#[derive(Serialize)]
struct FinalReport<'a> {
    snapshot: &'a BoardSnapshot,
    summary: FleetSummary,
}

/// Serializes snapshots for scripts and log shippers.
pub struct JsonPresenter {
    mode: JsonMode,
    out: Mutex<Box<dyn Write + Send>>,
}

impl JsonPresenter {
    pub fn stdout(mode: JsonMode) -> Self {
        Self::with_writer(mode, Box::new(io::stdout()))
    }

    pub fn with_writer(mode: JsonMode, out: Box<dyn Write + Send>) -> Self {
        Self {
            mode,
            out: Mutex::new(out),
        }
    }

    fn write_line<T: Serialize>(&self, kind: &'static str, payload: &T) {
        if let Ok(json) = serde_json::to_string(&Line { kind, payload }) {
            let mut out = self.out.lock();
            let _ = writeln!(out, "{}", json);
            let _ = out.flush();
        }
    }
}

impl Presenter for JsonPresenter {
    fn render(&self, snapshot: &BoardSnapshot) {
        if self.mode == JsonMode::Lines {
            self.write_line("snapshot", snapshot);
        }
    }

    fn summarize(&self, summary: &FleetSummary) {
        if self.mode == JsonMode::Lines {
            self.write_line("summary", summary);
        }
    }

    fn finish(&self, snapshot: &BoardSnapshot) {
        let report = FinalReport {
            snapshot,
            summary: snapshot.summary(),
        };
        match self.mode {
            JsonMode::Lines => self.write_line("final", &report),
            JsonMode::Document => {
                if let Ok(json) = serde_json::to_string_pretty(&report) {
                    let mut out = self.out.lock();
                    let _ = writeln!(out, "{}", json);
                    let _ = out.flush();
                }
            }
        }
    }
}

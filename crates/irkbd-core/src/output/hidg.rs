// irkbd HID Gadget Output
// Writes boot keyboard reports to a USB gadget endpoint such as /dev/hidg0

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::report::{KeyboardReport, REPORT_LEN};
use super::state::PressedKeyState;
use super::{HidEmitter, OutputError};
use crate::Combo;

/// Destination for raw keyboard reports
pub trait ReportSink {
    fn write_report(&mut self, report: &[u8; REPORT_LEN]) -> io::Result<()>;
}

/// In-memory sink, for inspecting the report stream
impl ReportSink for Vec<[u8; REPORT_LEN]> {
    fn write_report(&mut self, report: &[u8; REPORT_LEN]) -> io::Result<()> {
        self.push(*report);
        Ok(())
    }
}

/// HID gadget character device
#[derive(Debug)]
pub struct GadgetSink {
    path: PathBuf,
    file: File,
}

impl GadgetSink {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, OutputError> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|e| OutputError::Open(path.display().to_string(), e))?;
        log::info!("Writing keyboard reports to {}", path.display());
        Ok(Self {
            path: path.to_path_buf(),
            file,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ReportSink for GadgetSink {
    fn write_report(&mut self, report: &[u8; REPORT_LEN]) -> io::Result<()> {
        // One write per report; the gadget driver frames on write boundaries
        self.file.write_all(report)
    }
}

/// Emitter producing boot keyboard reports.
///
/// A report is written only when the pressed set actually changes, so
/// repeated press or release calls for the same combo are no-ops.
#[derive(Debug)]
pub struct ReportEmitter<S: ReportSink> {
    sink: S,
    pressed: PressedKeyState,
    last: KeyboardReport,
}

impl<S: ReportSink> ReportEmitter<S> {
    pub fn new(sink: S) -> Self {
        Self {
            sink,
            pressed: PressedKeyState::new(),
            last: KeyboardReport::empty(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Last report sent to the sink
    pub fn current_report(&self) -> KeyboardReport {
        self.last
    }

    fn flush(&mut self) -> Result<(), OutputError> {
        let report = KeyboardReport::from_state(&self.pressed);
        if report == self.last {
            return Ok(());
        }
        log::trace!("HID report: {}", report);
        self.sink
            .write_report(&report.to_bytes())
            .map_err(OutputError::Write)?;
        self.last = report;
        Ok(())
    }
}

impl<S: ReportSink> HidEmitter for ReportEmitter<S> {
    fn press(&mut self, combo: Combo) -> Result<(), OutputError> {
        if self.pressed.press_combo(combo).is_empty() {
            return Ok(());
        }
        self.flush()
    }

    fn release(&mut self, combo: Combo) -> Result<(), OutputError> {
        if self.pressed.release_combo(combo).is_empty() {
            return Ok(());
        }
        self.flush()
    }

    fn release_all(&mut self) -> Result<(), OutputError> {
        self.pressed.clear();
        self.flush()
    }
}

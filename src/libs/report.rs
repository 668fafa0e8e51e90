//! Periodic activity reports.
//!
//! Every logging interval the reporter reads the report windows of both
//! channels together with the all-time close count, writes them as a single
//! record into a new timestamped file (`YYYY-MM-DD_HH-MM.xlsx` or `.csv`)
//! and then resets the report windows.
//!
//! A write failure is logged and nothing is reset, so the next successful
//! report still covers the lost interval. Failures never reach the monitor
//! loop.

use crate::libs::accrual::ActivityTracker;
use crate::libs::config::{ReportConfig, ReportFormat};
use crate::libs::data_storage::DataStorage;
use crate::libs::messages::Message;
use crate::{msg_error, msg_info};
use anyhow::Result;
use chrono::{DateTime, Local};
use rust_xlsxwriter::{Format, Workbook, XlsxError};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const REPORTS_DIR: &str = "reports";
const WORKSHEET_NAME: &str = "ActivityLog";
const HEADERS: [&str; 3] = ["Keyboard Activity (s)", "Mouse Activity (s)", "Total Close Counter"];

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Excel error: {0}")]
    Xlsx(#[from] XlsxError),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// One report line.
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityRecord {
    pub recorded_at: DateTime<Local>,
    pub keyboard_seconds: f64,
    pub mouse_seconds: f64,
    pub total_close_count: u64,
}

impl ActivityRecord {
    fn file_name(&self, format: ReportFormat) -> String {
        format!("{}.{}", self.recorded_at.format("%Y-%m-%d_%H-%M"), format.extension())
    }
}

pub trait ReportWriter: Send {
    /// Persists `record` and returns the file it was written to.
    fn write(&mut self, record: &ActivityRecord) -> Result<PathBuf, ReportError>;
}

pub struct XlsxReportWriter {
    directory: PathBuf,
}

impl XlsxReportWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }
}

impl ReportWriter for XlsxReportWriter {
    fn write(&mut self, record: &ActivityRecord) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(record.file_name(ReportFormat::Xlsx));

        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(WORKSHEET_NAME)?;

        let header_format = Format::new().set_bold();
        for (col, header) in HEADERS.iter().enumerate() {
            worksheet.write_string_with_format(0, col as u16, *header, &header_format)?;
        }
        worksheet.write_number(1, 0, record.keyboard_seconds)?;
        worksheet.write_number(1, 1, record.mouse_seconds)?;
        worksheet.write_number(1, 2, record.total_close_count as f64)?;

        workbook.save(&path)?;
        Ok(path)
    }
}

pub struct CsvReportWriter {
    directory: PathBuf,
}

impl CsvReportWriter {
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self { directory: directory.into() }
    }
}

impl ReportWriter for CsvReportWriter {
    fn write(&mut self, record: &ActivityRecord) -> Result<PathBuf, ReportError> {
        fs::create_dir_all(&self.directory)?;
        let path = self.directory.join(record.file_name(ReportFormat::Csv));

        let mut writer = csv::Writer::from_path(&path)?;
        writer.write_record(HEADERS)?;
        writer.write_record([
            format!("{:.3}", record.keyboard_seconds),
            format!("{:.3}", record.mouse_seconds),
            record.total_close_count.to_string(),
        ])?;
        writer.flush()?;
        Ok(path)
    }
}

/// Builds the writer described by `config`.
pub fn writer_for(config: &ReportConfig) -> Result<Box<dyn ReportWriter>> {
    let directory = match &config.directory {
        Some(directory) => directory.clone(),
        None => DataStorage::new().get_dir(REPORTS_DIR)?,
    };
    Ok(match config.format {
        ReportFormat::Xlsx => Box::new(XlsxReportWriter::new(directory)),
        ReportFormat::Csv => Box::new(CsvReportWriter::new(directory)),
    })
}

pub struct ActivityReporter {
    writer: Box<dyn ReportWriter>,
    interval: Duration,
}

impl ActivityReporter {
    pub fn new(writer: Box<dyn ReportWriter>, interval: Duration) -> Self {
        Self { writer, interval }
    }

    pub fn from_config(config: &ReportConfig, interval: Duration) -> Result<Self> {
        Ok(Self::new(writer_for(config)?, interval))
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Writes one record and resets the report windows on success.
    pub fn report(&mut self, tracker: &ActivityTracker, total_close_count: u64) -> Result<PathBuf, ReportError> {
        let snapshot = tracker.snapshot();
        let record = ActivityRecord {
            recorded_at: Local::now(),
            keyboard_seconds: snapshot.keyboard.report_window.as_secs_f64(),
            mouse_seconds: snapshot.mouse.report_window.as_secs_f64(),
            total_close_count,
        };

        match self.writer.write(&record) {
            Ok(path) => {
                tracker.reset_report_window();
                msg_info!(Message::ReportWritten(display_path(&path)));
                Ok(path)
            }
            Err(e) => {
                msg_error!(Message::ReportWriteFailed(e.to_string()));
                Err(e)
            }
        }
    }
}

fn display_path(path: &Path) -> String {
    path.display().to_string()
}

//! Append-only prediction log
//!
//! The serving layer appends one CSV row per served prediction:
//! `timestamp,<feature columns...>,prediction`. The header is written by the
//! first append and fixes the feature set for the lifetime of the file.
//!
//! Reads are bounded: the file length is captured when a read starts and a
//! trailing row without its newline is ignored, so a reader never sees a
//! partially appended row.

use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use csv::{ReaderBuilder, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::data::{parse_cell, FeatureSnapshot};
use crate::{Error, Result};

const TIMESTAMP_COLUMN: &str = "timestamp";
const PREDICTION_COLUMN: &str = "prediction";

/// A single served prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionRecord {
    /// When the prediction was served
    pub timestamp: DateTime<Utc>,
    /// Named input features; NaN marks a missing value
    pub features: BTreeMap<String, f64>,
    /// Value returned to the caller
    pub prediction: f64,
}

impl PredictionRecord {
    /// Record stamped with the current time
    pub fn new(features: BTreeMap<String, f64>, prediction: f64) -> Self {
        Self { timestamp: Utc::now(), features, prediction }
    }

    /// Record with an explicit timestamp
    pub fn at(timestamp: DateTime<Utc>, features: BTreeMap<String, f64>, prediction: f64) -> Self {
        Self { timestamp, features, prediction }
    }
}

/// Which part of the log forms the detection window
///
/// Append order defines the total order of the log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum WindowSpec {
    /// Every record in the log
    #[default]
    All,
    /// The most recent `count` records
    LastN { count: usize },
    /// Records served at or after `since`
    Since { since: DateTime<Utc> },
}

impl WindowSpec {
    fn apply(&self, mut records: Vec<PredictionRecord>) -> Vec<PredictionRecord> {
        match self {
            WindowSpec::All => records,
            WindowSpec::LastN { count } => {
                let skip = records.len().saturating_sub(*count);
                records.split_off(skip)
            }
            WindowSpec::Since { since } => {
                records.retain(|r| r.timestamp >= *since);
                records
            }
        }
    }
}

/// File-backed append-only log of [`PredictionRecord`]s
#[derive(Debug)]
pub struct PredictionLog {
    path: PathBuf,
    /// Serialises appends from this process and caches the header
    header: Mutex<Option<Vec<String>>>,
}

impl PredictionLog {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self { path: path.as_ref().to_path_buf(), header: Mutex::new(None) }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record as one complete row
    ///
    /// The row is encoded in memory and handed to the OS in a single write on
    /// an append-mode handle. A record whose feature names differ from the
    /// header is rejected.
    pub fn append(&self, record: &PredictionRecord) -> Result<()> {
        let mut header = self
            .header
            .lock()
            .map_err(|_| Error::InvalidData("prediction log lock poisoned".to_string()))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        if header.is_none() && self.path.exists() && fs::metadata(&self.path)?.len() > 0 {
            *header = Some(self.read_header()?);
        }

        let features: Vec<String> = record.features.keys().cloned().collect();
        let mut buf = WriterBuilder::new().has_headers(false).from_writer(Vec::new());

        match header.as_ref() {
            Some(existing) => {
                let expected = &existing[1..existing.len() - 1];
                crate::data::check_schema(expected, &features)?;
            }
            None => {
                let mut cols = vec![TIMESTAMP_COLUMN.to_string()];
                cols.extend(features.iter().cloned());
                cols.push(PREDICTION_COLUMN.to_string());
                buf.write_record(&cols)?;
                *header = Some(cols);
            }
        }

        let Some(columns) = header.as_ref() else {
            return Err(Error::InvalidData("prediction log header unavailable".to_string()));
        };
        let mut row = Vec::with_capacity(columns.len());
        row.push(record.timestamp.to_rfc3339());
        for name in &columns[1..columns.len() - 1] {
            row.push(format_cell(record.features[name]));
        }
        row.push(format_cell(record.prediction));
        buf.write_record(&row)?;

        let bytes = buf
            .into_inner()
            .map_err(|e| Error::InvalidData(format!("failed to encode prediction row: {e}")))?;

        let mut file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        file.write_all(&bytes)?;
        file.flush()?;
        Ok(())
    }

    /// All complete records as of now, in append order
    pub fn records(&self) -> Result<Vec<PredictionRecord>> {
        if !self.path.exists() {
            return Err(Error::InsufficientData(format!(
                "prediction log not found: {}",
                self.path.display()
            )));
        }

        let bytes = self.bounded_bytes()?;
        if bytes.is_empty() {
            return Ok(Vec::new());
        }

        let mut reader = ReaderBuilder::new().has_headers(true).from_reader(bytes.as_slice());
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let ts_idx = position(&headers, TIMESTAMP_COLUMN)?;
        let pred_idx = position(&headers, PREDICTION_COLUMN)?;

        let mut records = Vec::new();
        for (row_idx, row) in reader.records().enumerate() {
            let row = row?;
            let timestamp = DateTime::parse_from_rfc3339(row.get(ts_idx).unwrap_or_default())
                .map_err(|e| {
                    Error::InvalidData(format!("bad timestamp at log row {row_idx}: {e}"))
                })?
                .with_timezone(&Utc);

            let mut features = BTreeMap::new();
            for (col_idx, raw) in row.iter().enumerate() {
                if col_idx != ts_idx && col_idx != pred_idx {
                    let name = &headers[col_idx];
                    features.insert(name.clone(), parse_cell(raw, name, row_idx)?);
                }
            }
            let prediction = parse_cell(row.get(pred_idx).unwrap_or_default(), PREDICTION_COLUMN, row_idx)?;
            records.push(PredictionRecord { timestamp, features, prediction });
        }
        Ok(records)
    }

    /// Consistent snapshot of the selected window
    pub fn snapshot(&self, window: &WindowSpec) -> Result<FeatureSnapshot> {
        let records = window.apply(self.records()?);
        FeatureSnapshot::from_records(&records)
    }

    /// Number of complete records currently in the log
    pub fn len(&self) -> Result<usize> {
        Ok(self.records()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read_header(&self) -> Result<Vec<String>> {
        let mut reader = ReaderBuilder::new().has_headers(true).from_path(&self.path)?;
        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        if headers.first().map(String::as_str) != Some(TIMESTAMP_COLUMN)
            || headers.last().map(String::as_str) != Some(PREDICTION_COLUMN)
        {
            return Err(Error::InvalidData(format!(
                "prediction log {} must start with '{TIMESTAMP_COLUMN}' and end with '{PREDICTION_COLUMN}'",
                self.path.display()
            )));
        }
        Ok(headers)
    }

    /// File contents up to the length observed at call time, cut at the last newline
    fn bounded_bytes(&self) -> Result<Vec<u8>> {
        let file = File::open(&self.path)?;
        let len = file.metadata()?.len();
        let mut bytes = Vec::with_capacity(len as usize);
        file.take(len).read_to_end(&mut bytes)?;
        match bytes.iter().rposition(|&b| b == b'\n') {
            Some(last) => bytes.truncate(last + 1),
            None => bytes.clear(),
        }
        Ok(bytes)
    }
}

fn format_cell(value: f64) -> String {
    if value.is_nan() {
        String::new()
    } else {
        value.to_string()
    }
}

fn position(headers: &[String], name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| Error::InvalidData(format!("prediction log has no '{name}' column")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    fn features(age: f64, rm: f64) -> BTreeMap<String, f64> {
        BTreeMap::from([("age".to_string(), age), ("rm".to_string(), rm)])
    }

    fn ts(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn test_append_writes_header_once() {
        let dir = TempDir::new().unwrap();
        let log = PredictionLog::new(dir.path().join("predictions_log.csv"));
        log.append(&PredictionRecord::at(ts(0), features(1.0, 2.0), 3.0)).unwrap();
        log.append(&PredictionRecord::at(ts(1), features(4.0, 5.0), 6.0)).unwrap();

        let content = fs::read_to_string(log.path()).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "timestamp,age,rm,prediction");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_records_round_trip_in_append_order() {
        let dir = TempDir::new().unwrap();
        let log = PredictionLog::new(dir.path().join("log.csv"));
        let first = PredictionRecord::at(ts(0), features(1.0, f64::NAN), 3.0);
        let second = PredictionRecord::at(ts(5), features(4.0, 5.0), 6.0);
        log.append(&first).unwrap();
        log.append(&second).unwrap();

        let records = log.records().unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].timestamp, ts(0));
        assert!(records[0].features["rm"].is_nan());
        assert_eq!(records[1], second);
    }

    #[test]
    fn test_append_rejects_different_feature_set() {
        let dir = TempDir::new().unwrap();
        let log = PredictionLog::new(dir.path().join("log.csv"));
        log.append(&PredictionRecord::at(ts(0), features(1.0, 2.0), 3.0)).unwrap();

        let other = BTreeMap::from([("age".to_string(), 1.0)]);
        let err = log.append(&PredictionRecord::at(ts(1), other, 3.0)).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch { .. }));
    }

    #[test]
    fn test_reopened_log_keeps_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("log.csv");
        PredictionLog::new(&path)
            .append(&PredictionRecord::at(ts(0), features(1.0, 2.0), 3.0))
            .unwrap();

        let reopened = PredictionLog::new(&path);
        reopened.append(&PredictionRecord::at(ts(1), features(2.0, 2.0), 3.0)).unwrap();
        assert_eq!(reopened.len().unwrap(), 2);
    }

    #[test]
    fn test_partial_trailing_row_is_ignored() {
        let dir = TempDir::new().unwrap();
        let log = PredictionLog::new(dir.path().join("log.csv"));
        log.append(&PredictionRecord::at(ts(0), features(1.0, 2.0), 3.0)).unwrap();

        let mut file = OpenOptions::new().append(true).open(log.path()).unwrap();
        file.write_all(b"2023-11-14T22:13:21+00:00,4.0").unwrap();

        assert_eq!(log.records().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_log_is_insufficient_data() {
        let log = PredictionLog::new("/nonexistent/dir/log.csv");
        assert!(matches!(log.records(), Err(Error::InsufficientData(_))));
    }

    #[test]
    fn test_window_last_n() {
        let dir = TempDir::new().unwrap();
        let log = PredictionLog::new(dir.path().join("log.csv"));
        for i in 0..10 {
            log.append(&PredictionRecord::at(ts(i), features(i as f64, 0.0), 0.0)).unwrap();
        }

        let snap = log.snapshot(&WindowSpec::LastN { count: 3 }).unwrap();
        assert_eq!(snap.len(), 3);
        assert_eq!(snap.features().column("age").unwrap(), vec![7.0, 8.0, 9.0]);
    }

    #[test]
    fn test_window_since() {
        let dir = TempDir::new().unwrap();
        let log = PredictionLog::new(dir.path().join("log.csv"));
        for i in 0..10 {
            log.append(&PredictionRecord::at(ts(i), features(i as f64, 0.0), 0.0)).unwrap();
        }

        let snap = log.snapshot(&WindowSpec::Since { since: ts(8) }).unwrap();
        assert_eq!(snap.len(), 2);
    }

    #[test]
    fn test_concurrent_appends_do_not_interleave() {
        let dir = TempDir::new().unwrap();
        let log = Arc::new(PredictionLog::new(dir.path().join("log.csv")));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let log = Arc::clone(&log);
                thread::spawn(move || {
                    for i in 0..25 {
                        let rec = PredictionRecord::at(ts(i), features(t as f64, i as f64), 1.0);
                        log.append(&rec).unwrap();
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let records = log.records().unwrap();
        assert_eq!(records.len(), 100);
        assert!(records.iter().all(|r| r.features.len() == 2 && r.prediction == 1.0));
    }
}

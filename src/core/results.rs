//! Batch result records and their on-disk form.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use tempfile::NamedTempFile;

use crate::core::constants::DEFAULT_APOLOGY_MARKERS;
use crate::core::spaces::SpaceId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExchangeStatus {
    Success,
    Error,
}

impl ExchangeStatus {
    pub fn is_success(self) -> bool {
        self == ExchangeStatus::Success
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRecord {
    pub question: String,
    pub answer: String,
    pub status: ExchangeStatus,
}

/// One entry of a space's result list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BatchEntry {
    Exchange(ExchangeRecord),
    /// The space could not be processed at all.
    Failure { error: String },
}

impl BatchEntry {
    pub fn as_exchange(&self) -> Option<&ExchangeRecord> {
        match self {
            BatchEntry::Exchange(record) => Some(record),
            BatchEntry::Failure { .. } => None,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, BatchEntry::Failure { .. })
    }
}

/// Decides whether a returned answer counts as a failed exchange.
///
/// Provisional: the service has no structured failure signal, so an answer
/// containing an apology marker (case-insensitive) is tagged as an error even
/// though the HTTP call succeeded. An empty marker list tags every answer as
/// success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyClassifier {
    markers: Vec<String>,
}

impl ReplyClassifier {
    pub fn new<I, S>(markers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let markers = markers
            .into_iter()
            .map(|marker| marker.as_ref().trim().to_lowercase())
            .filter(|marker| !marker.is_empty())
            .collect();
        Self { markers }
    }

    pub fn classify(&self, answer: &str) -> ExchangeStatus {
        let lowered = answer.to_lowercase();
        if self.markers.iter().any(|marker| lowered.contains(marker)) {
            ExchangeStatus::Error
        } else {
            ExchangeStatus::Success
        }
    }
}

impl Default for ReplyClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_APOLOGY_MARKERS)
    }
}

/// Per-space results in the order the spaces were requested.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FanOutResults {
    spaces: Vec<(SpaceId, Vec<BatchEntry>)>,
}

impl FanOutResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a space's entries; a repeated space replaces its earlier
    /// entries in place.
    pub fn insert(&mut self, space: SpaceId, entries: Vec<BatchEntry>) {
        match self.spaces.iter_mut().find(|(id, _)| *id == space) {
            Some(slot) => slot.1 = entries,
            None => self.spaces.push((space, entries)),
        }
    }

    pub fn get(&self, space: SpaceId) -> Option<&[BatchEntry]> {
        self.spaces
            .iter()
            .find(|(id, _)| *id == space)
            .map(|(_, entries)| entries.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (SpaceId, &[BatchEntry])> {
        self.spaces
            .iter()
            .map(|(id, entries)| (*id, entries.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.spaces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.spaces.is_empty()
    }
}

impl Serialize for FanOutResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.spaces.len()))?;
        for (space, entries) in &self.spaces {
            map.serialize_entry(&space.to_string(), entries)?;
        }
        map.end()
    }
}

/// Counts used for the end-of-run summary.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SpaceSummary {
    pub succeeded: usize,
    pub failed: usize,
    pub space_failed: bool,
}

pub fn summarize(entries: &[BatchEntry]) -> SpaceSummary {
    entries
        .iter()
        .fold(SpaceSummary::default(), |mut summary, entry| {
            match entry {
                BatchEntry::Exchange(record) if record.status.is_success() => {
                    summary.succeeded += 1
                }
                BatchEntry::Exchange(_) => summary.failed += 1,
                BatchEntry::Failure { .. } => summary.space_failed = true,
            }
            summary
        })
}

pub fn results_filename(prefix: &str, timestamp: DateTime<Local>) -> String {
    format!("{prefix}_{}.json", timestamp.format("%Y%m%d_%H%M%S"))
}

/// Write `results` as indented JSON to `<dir>/<prefix>_<YYYYMMDD_HHMMSS>.json`.
pub fn save_results(
    results: &FanOutResults,
    output_dir: &Path,
    prefix: &str,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    save_results_at(results, output_dir, prefix, Local::now())
}

pub fn save_results_at(
    results: &FanOutResults,
    output_dir: &Path,
    prefix: &str,
    timestamp: DateTime<Local>,
) -> Result<PathBuf, Box<dyn std::error::Error>> {
    fs::create_dir_all(output_dir)?;
    let path = output_dir.join(results_filename(prefix, timestamp));

    let mut file = NamedTempFile::new_in(output_dir)?;
    serde_json::to_writer_pretty(file.as_file_mut(), results)?;
    file.as_file_mut().write_all(b"\n")?;
    file.as_file_mut().flush()?;
    file.persist(&path).map_err(|err| err.error)?;

    Ok(path)
}

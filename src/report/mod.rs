//! Cucumber JSON report aggregation.
//!
//! Every `<prefix>*.json` file in a directory is decoded as a list of
//! features, and each step outcome is folded into per-scenario counts.
//! Scenarios that share a name across files accumulate into one entry.

use std::{
    collections::{btree_map, BTreeMap},
    path::Path,
};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
    error::{Error, Result},
    fs::FileSystem,
};

pub mod sinks;

pub const REPORT_SUFFIX: &str = ".json";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Feature {
    #[serde(default)]
    pub elements: Vec<Scenario>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scenario {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Step {
    #[serde(default)]
    pub result: StepResult,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StepResult {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// Normalized step status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    Passed,
    Pending,
    Failed,
    Skipped,
    /// Anything else (`undefined`, `ambiguous`, typos). Not counted.
    Ignored,
}

impl StepStatus {
    /// Case-insensitive, surrounding whitespace trimmed.
    pub fn normalize(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "passed" => Self::Passed,
            "pending" => Self::Pending,
            "failed" => Self::Failed,
            "skipped" => Self::Skipped,
            _ => Self::Ignored,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioCounts {
    pub passed: u64,
    pub pending: u64,
    pub failed: u64,
    pub skipped: u64,
    /// Failure messages in encounter order.
    #[serde(default)]
    pub messages: Vec<String>,
}

impl ScenarioCounts {
    pub fn total(&self) -> u64 {
        self.passed + self.pending + self.failed + self.skipped
    }

    pub fn record(&mut self, result: &StepResult) {
        let status = result
            .status
            .as_deref()
            .map_or(StepStatus::Ignored, StepStatus::normalize);
        match status {
            StepStatus::Passed => self.passed += 1,
            StepStatus::Pending => self.pending += 1,
            StepStatus::Skipped => self.skipped += 1,
            StepStatus::Failed => {
                self.failed += 1;
                if let Some(msg) = result.error_message.as_deref() {
                    if !msg.is_empty() {
                        self.messages.push(msg.to_string());
                    }
                }
            }
            StepStatus::Ignored => {}
        }
    }
}

/// Per-scenario counts, ordered by scenario name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Aggregate {
    scenarios: BTreeMap<String, ScenarioCounts>,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fold(&mut self, features: &[Feature]) {
        for scenario in features.iter().flat_map(|f| &f.elements) {
            let counts = self.scenarios.entry(scenario.name.clone()).or_default();
            for step in &scenario.steps {
                counts.record(&step.result);
            }
        }
    }

    pub fn get(&self, scenario: &str) -> Option<&ScenarioCounts> {
        self.scenarios.get(scenario)
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, ScenarioCounts> {
        self.scenarios.iter()
    }
}

impl<'a> IntoIterator for &'a Aggregate {
    type Item = (&'a String, &'a ScenarioCounts);
    type IntoIter = btree_map::Iter<'a, String, ScenarioCounts>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Report files in `dir`: non-directories named `<prefix>*.json`.
pub fn list_report_files(fs: &dyn FileSystem, dir: &Path, prefix: &str) -> Result<Vec<String>> {
    let entries = fs.list_dir(dir).map_err(|source| Error::DirectoryUnreadable {
        path: dir.to_path_buf(),
        source,
    })?;
    Ok(entries
        .into_iter()
        .filter(|e| !e.is_dir && e.name.starts_with(prefix) && e.name.ends_with(REPORT_SUFFIX))
        .map(|e| e.name)
        .collect())
}

pub fn read_features(fs: &dyn FileSystem, path: &Path) -> Result<Vec<Feature>> {
    let data = fs.read(path).map_err(|e| Error::DecodeFailure {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_slice(&data).map_err(|e| Error::DecodeFailure {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })
}

/// Fold every report file in `dir` into a fresh aggregate.
///
/// An unreadable directory yields an empty aggregate; a file that cannot be
/// read or decoded contributes nothing.
pub fn aggregate(fs: &dyn FileSystem, dir: &Path, prefix: &str) -> Aggregate {
    let mut results = Aggregate::new();
    let files = match list_report_files(fs, dir, prefix) {
        Ok(files) => files,
        Err(err) => {
            info!("Error listing files: {err}");
            return results;
        }
    };

    for name in files {
        match read_features(fs, &dir.join(&name)) {
            Ok(features) => {
                debug!(file = %name, features = features.len(), "folding report");
                results.fold(&features);
            }
            Err(err) => info!("{err}"),
        }
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::MemFs;

    #[test]
    fn list_relevant_files() {
        let fs = MemFs::new();
        fs.add_file("/test/awesome-report1.json", "");
        fs.add_file("/test/awesome-report2.json", "");
        fs.add_file("/test/ignore-report.json", "");
        fs.add_file("/test/awesome-notes.txt", "");
        fs.add_dir("/test/awesome-dir.json");

        let files = list_report_files(&fs, Path::new("/test"), "awesome-").unwrap();
        assert_eq!(files, vec!["awesome-report1.json", "awesome-report2.json"]);
    }

    #[test]
    fn normalize_statuses() {
        assert_eq!(StepStatus::normalize("  FAILED "), StepStatus::Failed);
        assert_eq!(StepStatus::normalize("Passed"), StepStatus::Passed);
        assert_eq!(StepStatus::normalize("skipped\n"), StepStatus::Skipped);
        assert_eq!(StepStatus::normalize("undefined"), StepStatus::Ignored);
        assert_eq!(StepStatus::normalize(""), StepStatus::Ignored);
    }

    #[test]
    fn fold_counts_and_messages() {
        let features: Vec<Feature> = serde_json::from_str(
            r#"[{"elements":[
                {"name":"Scenario1","steps":[
                    {"result":{"status":"passed"}},
                    {"result":{"status":"failed","error_message":"boom"}},
                    {"result":{"status":"failed","error_message":""}},
                    {"result":{"status":"undefined"}}
                ]},
                {"name":"Scenario2","steps":[{"result":{"status":"pending"}}]}
            ]}]"#,
        )
        .unwrap();

        let mut results = Aggregate::new();
        results.fold(&features);

        let s1 = results.get("Scenario1").unwrap();
        assert_eq!((s1.passed, s1.pending, s1.failed, s1.skipped), (1, 0, 2, 0));
        assert_eq!(s1.messages, vec!["boom"]);
        assert_eq!(s1.total(), 3);
        assert_eq!(results.get("Scenario2").unwrap().pending, 1);
    }

    #[test]
    fn missing_fields_decode_as_empty() {
        let features: Vec<Feature> =
            serde_json::from_str(r#"[{"name":"f"},{"elements":[{"name":"s","steps":[{}]}]}]"#)
                .unwrap();
        let mut results = Aggregate::new();
        results.fold(&features);
        assert_eq!(results.get("s").unwrap().total(), 0);
    }

    #[test]
    fn null_status_is_ignored_not_fatal() {
        let fs = MemFs::new();
        fs.add_file(
            "/r/cucumber_report_a.json",
            r#"[{"elements":[{"name":"Login","steps":[
                {"result":{"status":null}},
                {"result":{"status":"passed"}}
            ]}]}]"#,
        );
        let results = aggregate(&fs, Path::new("/r"), "cucumber_report");
        let login = results.get("Login").unwrap();
        assert_eq!(login.passed, 1);
        assert_eq!(login.total(), 1);
    }

    #[test]
    fn undecodable_file_is_skipped() {
        let fs = MemFs::new();
        fs.add_file("/r/cucumber_report_a.json", "{not json");
        fs.add_file(
            "/r/cucumber_report_b.json",
            r#"[{"elements":[{"name":"Login","steps":[{"result":{"status":"passed"}}]}]}]"#,
        );
        let results = aggregate(&fs, Path::new("/r"), "cucumber_report");
        assert_eq!(results.len(), 1);
        assert_eq!(results.get("Login").unwrap().passed, 1);
    }
}

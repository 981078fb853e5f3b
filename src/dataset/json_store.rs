// In-memory dataset loaded from developers.json and bugs.json

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;
use tracing::info;

use super::types::{Bug, BugId, Developer, DeveloperId};
use super::DatasetProvider;
use crate::errors::DatasetError;

const DEVELOPERS_FILE: &str = "developers.json";
const BUGS_FILE: &str = "bugs.json";

/// Minimum query length for prefix matches ("Ali" matches "Alice")
const MIN_PREFIX_LEN: usize = 3;

#[derive(Debug, Clone)]
pub struct JsonDataset {
    developers: Vec<Developer>,
    bugs: Vec<Bug>,
    developer_by_id: HashMap<DeveloperId, usize>,
    developer_by_name: HashMap<String, usize>,
    bug_by_id: HashMap<BugId, usize>,
}

impl JsonDataset {
    /// Load `developers.json` and `bugs.json` from `data_dir`
    pub fn load(data_dir: &Path) -> Result<Self, DatasetError> {
        let developers: Vec<Developer> = read_json(&data_dir.join(DEVELOPERS_FILE))?;
        let bugs: Vec<Bug> = read_json(&data_dir.join(BUGS_FILE))?;
        let dataset = Self::from_records(developers, bugs)?;
        info!(
            "Loaded {} developers and {} bugs from {}",
            dataset.developers.len(),
            dataset.bugs.len(),
            data_dir.display()
        );
        Ok(dataset)
    }

    /// Build the dataset and its indices from already-parsed records
    pub fn from_records(developers: Vec<Developer>, bugs: Vec<Bug>) -> Result<Self, DatasetError> {
        let mut developer_by_id = HashMap::with_capacity(developers.len());
        let mut developer_by_name = HashMap::with_capacity(developers.len());
        for (idx, dev) in developers.iter().enumerate() {
            if developer_by_id.insert(dev.id, idx).is_some() {
                return Err(DatasetError::DuplicateId {
                    kind: "developer",
                    id: dev.id,
                });
            }
            developer_by_name.insert(normalize(&dev.name), idx);
        }

        let mut bug_by_id = HashMap::with_capacity(bugs.len());
        for (idx, bug) in bugs.iter().enumerate() {
            if bug_by_id.insert(bug.id, idx).is_some() {
                return Err(DatasetError::DuplicateId { kind: "bug", id: bug.id });
            }
        }

        Ok(Self {
            developers,
            bugs,
            developer_by_id,
            developer_by_name,
            bug_by_id,
        })
    }

    pub fn developers(&self) -> &[Developer] {
        &self.developers
    }

    pub fn bugs(&self) -> &[Bug] {
        &self.bugs
    }

    pub fn get_developer(&self, developer_id: DeveloperId) -> Option<&Developer> {
        self.developer_by_id
            .get(&developer_id)
            .map(|&idx| &self.developers[idx])
    }
}

impl DatasetProvider for JsonDataset {
    fn find_developer_by_name(&self, name: &str) -> Option<Developer> {
        self.developer_by_name
            .get(&normalize(name))
            .map(|&idx| self.developers[idx].clone())
    }

    fn get_bugs_for_developer(&self, developer_id: DeveloperId) -> Vec<Bug> {
        self.bugs
            .iter()
            .filter(|bug| bug.is_assigned_to(developer_id))
            .cloned()
            .collect()
    }

    fn get_bug(&self, bug_id: BugId) -> Option<Bug> {
        self.bug_by_id.get(&bug_id).map(|&idx| self.bugs[idx].clone())
    }

    fn find_similar_developers(&self, name: &str) -> Vec<Developer> {
        let query = normalize(name);
        if query.is_empty() {
            return Vec::new();
        }

        self.developers
            .iter()
            .filter(|dev| {
                let full = normalize(&dev.name);
                full.split_whitespace().any(|part| {
                    part == query || (query.len() >= MIN_PREFIX_LEN && part.starts_with(&query))
                })
            })
            .cloned()
            .collect()
    }

    fn list_developer_names(&self) -> Vec<String> {
        self.developers.iter().map(|dev| dev.name.clone()).collect()
    }
}

fn normalize(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, DatasetError> {
    let display = path.display().to_string();
    let contents = fs::read_to_string(path).map_err(|source| DatasetError::Io {
        path: display.clone(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| DatasetError::Parse {
        path: display,
        source,
    })
}

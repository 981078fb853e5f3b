// Read-only developer/bug dataset
//
// The conversation core only ever reads from the dataset. Implementations
// must be safe to share across sessions (`Send + Sync`).

pub mod json_store;
pub mod types;

pub use json_store::JsonDataset;
pub use types::{Bug, BugId, BugStatus, Developer, DeveloperId};

/// Lookup operations the conversation core relies on
pub trait DatasetProvider: Send + Sync {
    /// Case-insensitive exact match on the full name
    fn find_developer_by_name(&self, name: &str) -> Option<Developer>;

    /// Bugs assigned to `developer_id`, scoped at the source
    fn get_bugs_for_developer(&self, developer_id: DeveloperId) -> Vec<Bug>;

    fn get_bug(&self, bug_id: BugId) -> Option<Bug>;

    /// Developers whose name partially matches `name` (first name, last name,
    /// or a prefix of at least three characters of either)
    fn find_similar_developers(&self, _name: &str) -> Vec<Developer> {
        Vec::new()
    }

    /// All known developer names, for "not found" guidance
    fn list_developer_names(&self) -> Vec<String> {
        Vec::new()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use super::*;

    fn bug(id: BugId, description: &str, dev: DeveloperId, status: BugStatus) -> Bug {
        Bug {
            id,
            description: description.to_string(),
            assigned_developer_id: dev,
            status,
            progress_notes: Vec::new(),
            solved: false,
        }
    }

    fn developer(id: DeveloperId, name: &str) -> Developer {
        Developer {
            id,
            name: name.to_string(),
        }
    }

    /// Alice (1) owns bug 1, Bob (2) owns bug 2, Carol (3) owns bug 7,
    /// Dave (4) owns nothing
    pub(crate) fn sample_dataset() -> JsonDataset {
        let developers = vec![
            developer(1, "Alice Johnson"),
            developer(2, "Bob Smith"),
            developer(3, "Carol White"),
            developer(4, "Dave Brown"),
        ];
        let bugs = vec![
            bug(1, "Login page crashes on submit", 1, BugStatus::Open),
            bug(2, "Payment processing fails", 2, BugStatus::InProgress),
            bug(7, "Database connection leak", 3, BugStatus::Testing),
        ];
        JsonDataset::from_records(developers, bugs).expect("fixture ids are unique")
    }
}

// Deterministic checks on an extraction result
//
// The dataset and the session are authoritative. Any claim that fails a check
// here downgrades the output to a failure; nothing is corrected.

use chrono::{DateTime, Local};
use rust_stemmers::{Algorithm, Stemmer};
use std::collections::HashSet;
use thiserror::Error;

use super::parse::RawExtraction;
use crate::dataset::{BugId, DatasetProvider, DeveloperId};
use crate::session::ConversationSession;

/// Answers that carry no progress information on their own
const FILLER_ANSWERS: &[&str] = &[
    "idk",
    "i dont know",
    "i don't know",
    "dunno",
    "stuff",
    "things",
    "some stuff",
    "some things",
    "n/a",
    "na",
    "nothing",
    "none",
    "not sure",
    "whatever",
    "something",
    "worked on it",
    "did some work",
];

/// Words ignored when judging whether a description says anything
const STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "am", "an", "and", "any", "are", "as", "at", "be",
    "been", "before", "bit", "bug", "but", "by", "did", "do", "does", "done", "dont", "for",
    "from", "got", "had", "has", "have", "he", "i", "idk", "im", "in", "into", "is", "issue",
    "it", "its", "just", "me", "my", "na", "no", "not", "now", "of", "on", "or", "our", "she",
    "so", "some", "something", "stuff", "that", "the", "them", "then", "there", "they",
    "things", "this", "to", "up", "was", "we", "were", "what", "whatever", "with", "work",
    "worked", "yes", "you",
];

const MIN_SIGNIFICANT_WORDS: usize = 2;

/// Why finalize produced a failure
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("session was aborted")]
    SessionAborted,

    #[error("no developer utterances to extract from")]
    NoDialogue,

    #[error("extraction call failed: {0}")]
    Gateway(String),

    #[error("extraction reply malformed: {0}")]
    Malformed(String),

    #[error("model reported no complete report: {0}")]
    Declined(String),

    #[error("no developer was resolved in this session")]
    NoDeveloper,

    #[error("reported developer {reported} does not match session developer {resolved}")]
    DeveloperMismatch {
        reported: DeveloperId,
        resolved: DeveloperId,
    },

    #[error("no bug id in report")]
    MissingBugId,

    #[error("bug {0} does not exist")]
    UnknownBug(BugId),

    #[error("bug {bug_id} is not assigned to developer {developer_id}")]
    BugNotAssigned {
        bug_id: BugId,
        developer_id: DeveloperId,
    },

    #[error("solved status was not determined")]
    MissingSolved,

    #[error("no progress description")]
    MissingDescription,

    #[error("progress description is not substantive")]
    NonSubstantive,

    #[error("progress description is not grounded in the developer's words")]
    Ungrounded,
}

/// Extraction fields that passed every check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedReport {
    pub bug_id: BugId,
    pub description: String,
    pub solved: bool,
}

pub fn validate(
    raw: &RawExtraction,
    session: &ConversationSession,
    dataset: &dyn DatasetProvider,
) -> Result<ValidatedReport, Rejection> {
    if !raw.success {
        return Err(Rejection::Declined(
            raw.reason.clone().unwrap_or_else(|| "no reason given".to_string()),
        ));
    }

    let developer_id = session.developer_id().ok_or(Rejection::NoDeveloper)?;
    if let Some(reported) = raw.developer_id {
        if reported != developer_id {
            return Err(Rejection::DeveloperMismatch {
                reported,
                resolved: developer_id,
            });
        }
    }

    let bug_id = raw.bug_id.ok_or(Rejection::MissingBugId)?;
    let bug = dataset.get_bug(bug_id).ok_or(Rejection::UnknownBug(bug_id))?;
    if !bug.is_assigned_to(developer_id) {
        return Err(Rejection::BugNotAssigned {
            bug_id,
            developer_id,
        });
    }

    let solved = raw.solved.ok_or(Rejection::MissingSolved)?;

    let description = raw
        .progress_description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or(Rejection::MissingDescription)?;

    if !is_substantive(description) {
        return Err(Rejection::NonSubstantive);
    }
    let known = [session.developer_name().unwrap_or_default(), bug.description.as_str()];
    if !is_grounded(description, session.user_utterances(), &known) {
        return Err(Rejection::Ungrounded);
    }

    Ok(ValidatedReport {
        bug_id,
        description: description.to_string(),
        solved,
    })
}

/// "<YYYY-MM-DD HH:MM:SS> - <description>"
pub fn stamp_progress_note(now: DateTime<Local>, description: &str) -> String {
    format!("{} - {}", now.format("%Y-%m-%d %H:%M:%S"), description.trim())
}

fn words(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphanumeric() && c != '\'')
        .map(|w| w.trim_matches('\'').replace('\'', "").to_lowercase())
        .filter(|w| !w.is_empty())
}

fn significant_words(text: &str) -> Vec<String> {
    words(text)
        .filter(|w| !STOPWORDS.contains(&w.as_str()))
        .collect()
}

fn is_substantive(description: &str) -> bool {
    let normalized = words(description).collect::<Vec<_>>().join(" ");
    let lowered = description.trim().to_lowercase();
    if FILLER_ANSWERS.contains(&normalized.as_str()) || FILLER_ANSWERS.contains(&lowered.as_str()) {
        return false;
    }
    significant_words(description).len() >= MIN_SIGNIFICANT_WORDS
}

/// Most of the description's own words were said by the developer
///
/// Numbers and words of the `known` texts (the developer's name, the bug title)
/// are left out before counting. With nothing left, the description is
/// ungrounded.
fn is_grounded<'a>(
    description: &str,
    utterances: impl Iterator<Item = &'a str>,
    known: &[&str],
) -> bool {
    let stemmer = Stemmer::create(Algorithm::English);
    let stems = |text: &str| -> HashSet<String> {
        words(text).map(|w| stemmer.stem(&w).into_owned()).collect()
    };

    let said: HashSet<String> = utterances.flat_map(|u| stems(u)).collect();
    let known: HashSet<String> = known.iter().flat_map(|text| stems(*text)).collect();

    let claimed: Vec<String> = significant_words(description)
        .iter()
        .filter(|w| !w.chars().all(|c| c.is_ascii_digit()))
        .map(|w| stemmer.stem(w).into_owned())
        .filter(|stem| !known.contains(stem))
        .collect();
    if claimed.is_empty() {
        return false;
    }

    let matched = claimed.iter().filter(|stem| said.contains(*stem)).count();
    matched * 2 > claimed.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::fixtures::sample_dataset;
    use crate::providers::types::Message;
    use chrono::TimeZone;

    fn session_for(developer_id: DeveloperId, utterances: &[&str]) -> ConversationSession {
        let mut session = ConversationSession::new();
        for text in utterances {
            session.push(Message::user(*text));
        }
        session.resolve_developer(developer_id, "dev".to_string());
        session
    }

    fn claim(bug_id: BugId, description: &str, solved: bool) -> RawExtraction {
        RawExtraction {
            success: true,
            developer_id: None,
            bug_id: Some(bug_id),
            progress_description: Some(description.to_string()),
            solved: Some(solved),
            reason: None,
        }
    }

    #[test]
    fn test_accepts_grounded_report() {
        let session = session_for(1, &["I fixed the null pointer in the login handler", "yes"]);
        let report = validate(
            &claim(1, "Fixed null pointer in login handler", true),
            &session,
            &sample_dataset(),
        )
        .unwrap();
        assert_eq!(report.bug_id, 1);
        assert!(report.solved);
    }

    #[test]
    fn test_rejects_foreign_bug() {
        let session = session_for(2, &["I fixed the database leak"]);
        let err = validate(&claim(7, "Fixed the database leak", true), &session, &sample_dataset())
            .unwrap_err();
        assert_eq!(
            err,
            Rejection::BugNotAssigned {
                bug_id: 7,
                developer_id: 2
            }
        );
    }

    #[test]
    fn test_rejects_unknown_bug_and_missing_developer() {
        let session = session_for(1, &["patched it"]);
        assert_eq!(
            validate(&claim(99, "patched it", true), &session, &sample_dataset()).unwrap_err(),
            Rejection::UnknownBug(99)
        );

        let anonymous = ConversationSession::new();
        assert_eq!(
            validate(&claim(1, "patched it", true), &anonymous, &sample_dataset()).unwrap_err(),
            Rejection::NoDeveloper
        );
    }

    #[test]
    fn test_rejects_developer_mismatch() {
        let session = session_for(1, &["rewrote the session check"]);
        let mut raw = claim(1, "rewrote the session check", false);
        raw.developer_id = Some(3);
        assert!(matches!(
            validate(&raw, &session, &sample_dataset()),
            Err(Rejection::DeveloperMismatch { reported: 3, resolved: 1 })
        ));
    }

    #[test]
    fn test_rejects_vague_descriptions() {
        let session = session_for(1, &["idk", "stuff"]);
        for vague in ["idk", "stuff", "Worked on it.", "some stuff"] {
            assert_eq!(
                validate(&claim(1, vague, true), &session, &sample_dataset()).unwrap_err(),
                Rejection::NonSubstantive,
                "{vague} should be rejected"
            );
        }
    }

    #[test]
    fn test_rejects_fabricated_description() {
        let session = session_for(1, &["idk", "stuff", "yes"]);
        let err = validate(
            &claim(1, "Refactored authentication middleware and added tests", true),
            &session,
            &sample_dataset(),
        )
        .unwrap_err();
        assert_eq!(err, Rejection::Ungrounded);
    }

    #[test]
    fn test_requires_solved_flag() {
        let session = session_for(1, &["fixed the crash"]);
        let mut raw = claim(1, "fixed the crash", true);
        raw.solved = None;
        assert_eq!(
            validate(&raw, &session, &sample_dataset()).unwrap_err(),
            Rejection::MissingSolved
        );
    }

    #[test]
    fn test_declined_extraction() {
        let session = session_for(1, &["hello"]);
        let raw = RawExtraction {
            reason: Some("no bug selected".to_string()),
            ..RawExtraction::default()
        };
        assert_eq!(
            validate(&raw, &session, &sample_dataset()).unwrap_err(),
            Rejection::Declined("no bug selected".to_string())
        );
    }

    #[test]
    fn test_grounding_matches_inflections() {
        let said = ["I fixed two crash paths"];
        assert!(is_grounded("Fixing the crashes", said.into_iter(), &[]));
        assert!(!is_grounded("Rewrote the cache", said.into_iter(), &[]));
    }

    #[test]
    fn test_grounding_ignores_ids_and_known_words() {
        let said = ["Alice Johnson", "bug 1", "idk", "stuff", "yes"];
        let known = ["Alice Johnson", "Login page crashes on submit"];
        assert!(!is_grounded("Fixed bug 1", said.into_iter(), &known));
        assert!(!is_grounded("Alice fixed the login page", said.into_iter(), &known));
        assert!(!is_grounded("Login page crashes", said.into_iter(), &known));
    }

    #[test]
    fn test_grounding_needs_most_words() {
        let said = ["I fixed the crash"];
        assert!(!is_grounded(
            "Fixed the crash and rewrote the cache layer",
            said.into_iter(),
            &[]
        ));
        assert!(is_grounded("Fixed the crash layer", said.into_iter(), &[]));
    }

    #[test]
    fn test_rejects_restated_bug_number() {
        let session = session_for(1, &["Alice Johnson", "bug 1", "idk", "stuff", "yes"]);
        assert_eq!(
            validate(&claim(1, "Fixed bug 1", true), &session, &sample_dataset()).unwrap_err(),
            Rejection::Ungrounded
        );
    }

    #[test]
    fn test_progress_note_stamp() {
        let now = Local.with_ymd_and_hms(2025, 3, 4, 9, 5, 7).unwrap();
        assert_eq!(
            stamp_progress_note(now, "  Patched the retry loop "),
            "2025-03-04 09:05:07 - Patched the retry loop"
        );
    }
}

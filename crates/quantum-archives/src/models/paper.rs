//! Paper data model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Physicist;

/// A paper as returned by discovery, before the session tags it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperDraft {
    /// Original title of the paper or book.
    pub title: String,

    /// Year of publication.
    pub year: i32,

    /// One-sentence summary of the paper's significance.
    pub description: String,
}

impl PaperDraft {
    /// Tag the draft with a session id and the physicist it was discovered for.
    #[must_use]
    pub fn into_paper(self, id: impl Into<String>, physicist: Physicist) -> Paper {
        Paper {
            id: id.into(),
            title: self.title,
            year: self.year,
            description: self.description,
            physicist,
            collected_at: None,
        }
    }
}

/// A paper known to the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Paper {
    /// Session-unique id assigned at discovery time.
    pub id: String,

    /// Paper title. Collection membership is judged by this field.
    pub title: String,

    /// Year of publication.
    pub year: i32,

    /// Short description.
    pub description: String,

    /// The physicist the paper was discovered for.
    pub physicist: Physicist,

    /// When the paper entered the collection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collected_at: Option<DateTime<Utc>>,
}

impl Paper {
    /// Same paper for collection purposes.
    #[must_use]
    pub fn same_title(&self, other: &Self) -> bool {
        self.title == other.title
    }

    /// Copy of this paper stamped as collected at `at`.
    #[must_use]
    pub fn collected(&self, at: DateTime<Utc>) -> Self {
        Self { collected_at: Some(at), ..self.clone() }
    }

    /// Context line for the chat system instruction.
    #[must_use]
    pub fn context_line(&self) -> String {
        format!("- \"{}\" ({}) by {}: {}", self.title, self.year, self.physicist, self.description)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn draft() -> PaperDraft {
        PaperDraft {
            title: "Quantum-theoretical re-interpretation of kinematic and mechanical relations"
                .to_string(),
            year: 1925,
            description: "Founded matrix mechanics.".to_string(),
        }
    }

    #[test]
    fn test_into_paper_tags_id_and_physicist() {
        let paper = draft().into_paper("p-1", Physicist::Heisenberg);
        assert_eq!(paper.id, "p-1");
        assert_eq!(paper.physicist, Physicist::Heisenberg);
        assert!(paper.collected_at.is_none());
    }

    #[test]
    fn test_context_line_format() {
        let paper = draft().into_paper("p-1", Physicist::Heisenberg);
        assert_eq!(
            paper.context_line(),
            "- \"Quantum-theoretical re-interpretation of kinematic and mechanical relations\" \
             (1925) by Werner Heisenberg: Founded matrix mechanics."
        );
    }

    #[test]
    fn test_collected_stamps_copy() {
        let paper = draft().into_paper("p-1", Physicist::Heisenberg);
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let collected = paper.collected(at);
        assert_eq!(collected.collected_at, Some(at));
        assert!(paper.collected_at.is_none());
        assert!(collected.same_title(&paper));
    }

    #[test]
    fn test_serialization_uses_camel_case_and_skips_none() {
        let paper = draft().into_paper("p-1", Physicist::Dirac);
        let json = serde_json::to_value(&paper).unwrap();
        assert_eq!(json["physicist"], "Paul Dirac");
        assert!(json.get("collectedAt").is_none());

        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        let json = serde_json::to_value(paper.collected(at)).unwrap();
        assert!(json["collectedAt"].is_string());
    }
}

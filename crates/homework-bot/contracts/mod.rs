//! Homework Bot Contracts
//!
//! Wire types of the homework status API and the review verdicts derived
//! from them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::BotError;

/// Review status of a submitted homework
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HomeworkStatus {
    /// Review finished without remarks
    Approved,
    /// Taken for review
    Reviewing,
    /// Review finished with remarks
    Rejected,
}

impl HomeworkStatus {
    /// All known statuses
    pub const ALL: [HomeworkStatus; 3] = [
        HomeworkStatus::Approved,
        HomeworkStatus::Reviewing,
        HomeworkStatus::Rejected,
    ];

    /// Wire code of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => "approved",
            HomeworkStatus::Reviewing => "reviewing",
            HomeworkStatus::Rejected => "rejected",
        }
    }

    /// Human-readable verdict sent to the chat.
    ///
    /// English translations of the fixed Russian texts used by the status
    /// service's reviewers.
    pub fn verdict(&self) -> &'static str {
        match self {
            HomeworkStatus::Approved => {
                "The work has been reviewed: the reviewer liked everything. Hooray!"
            }
            HomeworkStatus::Reviewing => "The work has been taken for review.",
            HomeworkStatus::Rejected => "The work has been reviewed: the reviewer has comments.",
        }
    }
}

impl fmt::Display for HomeworkStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HomeworkStatus {
    type Err = BotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        HomeworkStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| BotError::UnknownStatus(s.to_string()))
    }
}

/// A submitted homework as returned by the status API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Homework {
    /// Name of the submitted work (usually the repository name)
    pub homework_name: String,

    /// Raw status code, validated when the verdict is built
    pub status: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer_comment: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_updated: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lesson_name: Option<String>,
}

impl Homework {
    /// Create a homework record with only the required fields
    pub fn new(homework_name: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            homework_name: homework_name.into(),
            status: status.into(),
            id: None,
            reviewer_comment: None,
            date_updated: None,
            lesson_name: None,
        }
    }
}

/// Validated response of the status API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Homeworks changed since the requested cursor, most recent first
    pub homeworks: Vec<Homework>,

    /// Server time of the response (unix seconds)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_date: Option<i64>,
}

impl StatusResponse {
    /// Most recent homework, if any
    pub fn latest(&self) -> Option<&Homework> {
        self.homeworks.first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_from_str() {
        assert_eq!("approved".parse::<HomeworkStatus>().unwrap(), HomeworkStatus::Approved);
        assert_eq!("reviewing".parse::<HomeworkStatus>().unwrap(), HomeworkStatus::Reviewing);
        assert_eq!("rejected".parse::<HomeworkStatus>().unwrap(), HomeworkStatus::Rejected);
    }

    #[test]
    fn test_unknown_status_rejected() {
        let err = "graded".parse::<HomeworkStatus>().unwrap_err();
        assert!(matches!(err, BotError::UnknownStatus(ref code) if code == "graded"));
        assert!("Approved".parse::<HomeworkStatus>().is_err());
    }

    #[test]
    fn test_verdicts_are_distinct() {
        let verdicts: std::collections::HashSet<_> =
            HomeworkStatus::ALL.iter().map(|s| s.verdict()).collect();
        assert_eq!(verdicts.len(), 3);
    }

    #[test]
    fn test_status_response_deserialize() {
        let json = r#"{
            "homeworks": [
                {"id": 124, "status": "rejected", "homework_name": "user__hw_python_oop.zip",
                 "reviewer_comment": "Fix the tests", "date_updated": "2020-02-13T16:42:47Z",
                 "lesson_name": "OOP"}
            ],
            "current_date": 1581604970
        }"#;

        let response: StatusResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.current_date, Some(1581604970));

        let latest = response.latest().unwrap();
        assert_eq!(latest.homework_name, "user__hw_python_oop.zip");
        assert_eq!(latest.status, "rejected");
        assert_eq!(latest.lesson_name.as_deref(), Some("OOP"));
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use uuid::Uuid;

use survey_spec::Section;

/// Anonymous respondent session linking section results together.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSession {
    pub user_id: Uuid,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_sections: Vec<String>,
}

impl UserSession {
    pub fn new(now: DateTime<Utc>) -> Self {
        UserSession {
            user_id: Uuid::new_v4(),
            created_at: now,
            completed_sections: Vec::new(),
        }
    }

    /// Records a completed section; returns false when it was already recorded.
    pub fn mark_complete(&mut self, section_id: &str) -> bool {
        if self.is_complete(section_id) {
            return false;
        }
        self.completed_sections.push(section_id.to_string());
        true
    }

    pub fn is_complete(&self, section_id: &str) -> bool {
        self.completed_sections.iter().any(|id| id == section_id)
    }
}

/// Latest answers snapshot for one section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionResult {
    pub user_id: Uuid,
    pub section_id: String,
    pub section_title: String,
    pub start_time: DateTime<Utc>,
    pub completion_time: DateTime<Utc>,
    pub responses: Value,
    pub percent_complete: u8,
}

/// Session plus saved results, round-tripped through the host as JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionState {
    pub session: UserSession,
    #[serde(default)]
    pub results: Vec<SectionResult>,
}

impl SessionState {
    pub fn new(now: DateTime<Utc>) -> Self {
        SessionState {
            session: UserSession::new(now),
            results: Vec::new(),
        }
    }

    /// Stores the snapshot for `section`, replacing any earlier one but
    /// keeping its start time.
    pub fn record(
        &mut self,
        section: &Section,
        responses: Value,
        percent_complete: u8,
        now: DateTime<Utc>,
    ) -> &SectionResult {
        let section_id = section.id();
        let start_time = self
            .result(&section_id)
            .map(|existing| existing.start_time)
            .unwrap_or(now);
        let result = SectionResult {
            user_id: self.session.user_id,
            section_id,
            section_title: section.title.clone(),
            start_time,
            completion_time: now,
            responses,
            percent_complete,
        };

        let position = self
            .results
            .iter()
            .position(|existing| {
                existing.user_id == result.user_id && existing.section_id == result.section_id
            });
        let position = match position {
            Some(position) => {
                self.results[position] = result;
                position
            }
            None => {
                self.results.push(result);
                self.results.len() - 1
            }
        };
        &self.results[position]
    }

    /// Saved result for a section belonging to the current user.
    pub fn result(&self, section_id: &str) -> Option<&SectionResult> {
        self.user_results()
            .find(|result| result.section_id == section_id)
    }

    pub fn user_results(&self) -> impl Iterator<Item = &SectionResult> {
        self.results
            .iter()
            .filter(|result| result.user_id == self.session.user_id)
    }

    /// Export document for importing responses elsewhere.
    pub fn export(&self, now: DateTime<Utc>) -> Value {
        json!({
            "userId": self.session.user_id,
            "sessionCreated": self.session.created_at,
            "surveys": self.user_results().collect::<Vec<_>>(),
            "exportedAt": now,
        })
    }

    /// Drops all results and starts a fresh session.
    pub fn clear(&mut self, now: DateTime<Utc>) {
        *self = SessionState::new(now);
    }
}

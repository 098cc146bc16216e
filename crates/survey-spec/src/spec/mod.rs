pub mod question;
pub mod survey;

use thiserror::Error;

pub use question::{Predicate, Question, QuestionId, QuestionType, RawShowCondition, ShowCondition};
pub use survey::{CLOSING_TITLE, Section, SurveySpec, WELCOME_TITLE};

/// Errors raised while loading a survey document.
#[derive(Debug, Error)]
pub enum SpecError {
    #[error("failed to parse survey document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error(
        "show condition referencing question {parent} must populate exactly one of anyOf, allOf, noneOf (found {populated})"
    )]
    ConditionMode { parent: QuestionId, populated: usize },
}

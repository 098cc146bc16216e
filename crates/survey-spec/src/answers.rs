use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::spec::QuestionId;

/// A collected answer: a scalar or the selections of a multi-choice question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum AnswerValue {
    Text(String),
    Number(f64),
    Choices(Vec<String>),
}

impl AnswerValue {
    /// Scalar equality against the stringified answer, or membership for selections.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            AnswerValue::Choices(choices) => choices.iter().any(|choice| choice == value),
            scalar => scalar.display() == value,
        }
    }

    /// True when the answer matches at least one of `values`.
    pub fn intersects(&self, values: &[String]) -> bool {
        values.iter().any(|value| self.matches(value))
    }

    pub fn display(&self) -> String {
        match self {
            AnswerValue::Text(text) => text.clone(),
            AnswerValue::Number(number) => number.to_string(),
            AnswerValue::Choices(choices) => choices.join(", "),
        }
    }
}

/// Answers keyed by `q_<questionId>`. Unanswered questions have no entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct AnswerMap(BTreeMap<String, AnswerValue>);

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an answer map from a host snapshot object.
    ///
    /// Nulls, empty strings and empty selections count as unanswered. Booleans
    /// are stringified; nested objects (matrix rows) cannot drive conditions and
    /// are skipped.
    pub fn from_snapshot(snapshot: &Value) -> Self {
        let mut answers = AnswerMap::new();
        let Some(object) = snapshot.as_object() else {
            return answers;
        };
        for (key, value) in object {
            let answer = match value {
                Value::String(text) if !text.is_empty() => AnswerValue::Text(text.clone()),
                Value::Bool(flag) => AnswerValue::Text(flag.to_string()),
                Value::Number(number) => match number.as_f64() {
                    Some(number) => AnswerValue::Number(number),
                    None => continue,
                },
                Value::Array(items) if !items.is_empty() => AnswerValue::Choices(
                    items
                        .iter()
                        .map(|item| match item {
                            Value::String(text) => text.clone(),
                            other => other.to_string(),
                        })
                        .collect(),
                ),
                _ => continue,
            };
            answers.0.insert(key.clone(), answer);
        }
        answers
    }

    pub fn insert(&mut self, id: impl Into<QuestionId>, value: AnswerValue) {
        self.0.insert(id.into().answer_key(), value);
    }

    pub fn with(mut self, id: impl Into<QuestionId>, value: AnswerValue) -> Self {
        self.insert(id, value);
        self
    }

    /// Answer collected for the given question, if any.
    pub fn get(&self, id: &QuestionId) -> Option<&AnswerValue> {
        self.0.get(&id.answer_key())
    }

    pub fn contains(&self, id: &QuestionId) -> bool {
        self.0.contains_key(&id.answer_key())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

use std::borrow::Cow;
use std::fmt;

use schemars::{JsonSchema, SchemaGenerator, Schema, json_schema};
use serde::{Deserialize, Serialize};

use crate::spec::SpecError;

/// Question identifier in its canonical textual form.
///
/// Documents may spell identifiers as JSON numbers (`7`, `7.1`) or strings
/// (`"7.1"`); both load to the same value. Dotted identifiers express a
/// parent/child relationship purely by convention.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawQuestionId", into = "String")]
pub struct QuestionId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQuestionId {
    Number(serde_json::Number),
    Text(String),
}

impl From<RawQuestionId> for QuestionId {
    fn from(raw: RawQuestionId) -> Self {
        match raw {
            RawQuestionId::Number(number) => QuestionId(number_text(&number)),
            RawQuestionId::Text(text) => QuestionId(text),
        }
    }
}

/// Integral floats print without a fraction so `7.0` and `7` name the same question.
fn number_text(number: &serde_json::Number) -> String {
    match number.as_f64() {
        Some(value) if number.is_f64() && value.fract() == 0.0 && value.abs() < 1e15 => {
            format!("{}", value as i64)
        }
        _ => number.to_string(),
    }
}

impl From<QuestionId> for String {
    fn from(id: QuestionId) -> Self {
        id.0
    }
}

impl QuestionId {
    pub fn new(id: impl Into<String>) -> Self {
        QuestionId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Key under which the answer to this question is collected (`q_<id>`).
    pub fn answer_key(&self) -> String {
        format!("q_{}", self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for QuestionId {
    fn from(value: &str) -> Self {
        QuestionId::new(value)
    }
}

impl JsonSchema for QuestionId {
    fn schema_name() -> Cow<'static, str> {
        "QuestionId".into()
    }

    fn json_schema(_generator: &mut SchemaGenerator) -> Schema {
        json_schema!({
            "type": ["string", "number"],
            "description": "Question identifier; dotted values express parent.child",
        })
    }
}

/// Question kinds accepted by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    Info,
    Select,
    Radio,
    Checkbox,
    Text,
    Number,
    AgenciesWithCount,
    /// Any tag outside the known set; rendered as free text.
    #[serde(other)]
    Other,
}

/// Predicate applied to the parent question's answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Predicate {
    /// Visible when the answer matches at least one value.
    AnyOf(Vec<String>),
    /// Visible when a multi-select answer contains every value.
    AllOf(Vec<String>),
    /// Visible when the answer matches none of the values.
    NoneOf(Vec<String>),
}

impl Predicate {
    pub fn values(&self) -> &[String] {
        match self {
            Predicate::AnyOf(values) | Predicate::AllOf(values) | Predicate::NoneOf(values) => {
                values
            }
        }
    }
}

/// Show-condition attached to a question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawShowCondition", into = "RawShowCondition")]
pub struct ShowCondition {
    pub question_id: QuestionId,
    pub predicate: Predicate,
}

impl ShowCondition {
    pub fn any_of(question_id: impl Into<QuestionId>, values: &[&str]) -> Self {
        Self::with(question_id, Predicate::AnyOf(owned(values)))
    }

    pub fn all_of(question_id: impl Into<QuestionId>, values: &[&str]) -> Self {
        Self::with(question_id, Predicate::AllOf(owned(values)))
    }

    pub fn none_of(question_id: impl Into<QuestionId>, values: &[&str]) -> Self {
        Self::with(question_id, Predicate::NoneOf(owned(values)))
    }

    fn with(question_id: impl Into<QuestionId>, predicate: Predicate) -> Self {
        ShowCondition {
            question_id: question_id.into(),
            predicate,
        }
    }
}

fn owned(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Wire form of a show-condition as it appears in survey documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RawShowCondition {
    pub question_id: QuestionId,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub any_of: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub all_of: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub none_of: Vec<String>,
}

impl TryFrom<RawShowCondition> for ShowCondition {
    type Error = SpecError;

    fn try_from(raw: RawShowCondition) -> Result<Self, Self::Error> {
        let RawShowCondition {
            question_id,
            any_of,
            all_of,
            none_of,
        } = raw;
        let populated = [&any_of, &all_of, &none_of]
            .iter()
            .filter(|values| !values.is_empty())
            .count();
        if populated != 1 {
            return Err(SpecError::ConditionMode {
                parent: question_id,
                populated,
            });
        }

        let predicate = if !any_of.is_empty() {
            Predicate::AnyOf(any_of)
        } else if !all_of.is_empty() {
            Predicate::AllOf(all_of)
        } else {
            Predicate::NoneOf(none_of)
        };
        Ok(ShowCondition {
            question_id,
            predicate,
        })
    }
}

impl From<ShowCondition> for RawShowCondition {
    fn from(condition: ShowCondition) -> Self {
        let mut raw = RawShowCondition {
            question_id: condition.question_id,
            any_of: Vec::new(),
            all_of: Vec::new(),
            none_of: Vec::new(),
        };
        match condition.predicate {
            Predicate::AnyOf(values) => raw.any_of = values,
            Predicate::AllOf(values) => raw.all_of = values,
            Predicate::NoneOf(values) => raw.none_of = values,
        }
        raw
    }
}

/// A single survey question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub id: QuestionId,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(rename = "type")]
    pub kind: QuestionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[schemars(with = "Option<RawShowCondition>")]
    pub show_if: Option<ShowCondition>,
}

impl Question {
    pub fn new(id: impl Into<QuestionId>, text: impl Into<String>, kind: QuestionType) -> Self {
        Question {
            id: id.into(),
            text: text.into(),
            description: None,
            options: Vec::new(),
            kind,
            show_if: None,
        }
    }

    pub fn with_options(mut self, options: &[&str]) -> Self {
        self.options = owned(options);
        self
    }

    pub fn with_condition(mut self, condition: ShowCondition) -> Self {
        self.show_if = Some(condition);
        self
    }

    pub fn answer_key(&self) -> String {
        self.id.answer_key()
    }
}

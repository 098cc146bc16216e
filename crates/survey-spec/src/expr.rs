use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::answers::AnswerMap;
use crate::spec::{Predicate, QuestionId, ShowCondition};

/// Boolean visibility expression over parent answers.
///
/// This is the structured form of a show-condition; [`VisibilityExpr::to_survey_expression`]
/// prints it in the rendering engine's expression syntax.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum VisibilityExpr {
    Equals { question: QuestionId, value: String },
    NotEquals { question: QuestionId, value: String },
    Contains { question: QuestionId, value: String },
    And { expressions: Vec<VisibilityExpr> },
    Or { expressions: Vec<VisibilityExpr> },
}

impl VisibilityExpr {
    pub fn from_condition(condition: &ShowCondition) -> Self {
        let question = &condition.question_id;
        match &condition.predicate {
            Predicate::AnyOf(values) => VisibilityExpr::Or {
                expressions: leaves(question, values, |question, value| {
                    VisibilityExpr::Equals { question, value }
                }),
            },
            Predicate::AllOf(values) => VisibilityExpr::And {
                expressions: leaves(question, values, |question, value| {
                    VisibilityExpr::Contains { question, value }
                }),
            },
            Predicate::NoneOf(values) => VisibilityExpr::And {
                expressions: leaves(question, values, |question, value| {
                    VisibilityExpr::NotEquals { question, value }
                }),
            },
        }
    }

    /// Prints the expression in the rendering engine's syntax, e.g.
    /// `{q_7} = 'Yes' or {q_7} = 'Maybe'`.
    pub fn to_survey_expression(&self) -> String {
        match self {
            VisibilityExpr::Equals { question, value } => {
                format!("{{{}}} = '{}'", question.answer_key(), value)
            }
            VisibilityExpr::NotEquals { question, value } => {
                format!("{{{}}} != '{}'", question.answer_key(), value)
            }
            VisibilityExpr::Contains { question, value } => {
                format!("{{{}}} contains '{}'", question.answer_key(), value)
            }
            VisibilityExpr::And { expressions } => join(expressions, " and "),
            VisibilityExpr::Or { expressions } => join(expressions, " or "),
        }
    }

    /// Evaluates against collected answers; `None` when a referenced answer is missing.
    ///
    /// Follows the printed expression literally, so an `and` of `contains`
    /// clauses over a single scalar answer is stricter than
    /// [`crate::condition::evaluate_show_condition`], which treats `allOf` on a
    /// scalar as membership.
    pub fn evaluate(&self, answers: &AnswerMap) -> Option<bool> {
        match self {
            VisibilityExpr::Equals { question, value }
            | VisibilityExpr::Contains { question, value } => {
                answers.get(question).map(|answer| answer.matches(value))
            }
            VisibilityExpr::NotEquals { question, value } => {
                answers.get(question).map(|answer| !answer.matches(value))
            }
            VisibilityExpr::And { expressions } => {
                for expr in expressions {
                    match expr.evaluate(answers) {
                        Some(true) => continue,
                        Some(false) => return Some(false),
                        None => return None,
                    }
                }
                Some(true)
            }
            VisibilityExpr::Or { expressions } => {
                let mut unknown = false;
                for expr in expressions {
                    match expr.evaluate(answers) {
                        Some(true) => return Some(true),
                        Some(false) => {}
                        None => unknown = true,
                    }
                }
                if unknown { None } else { Some(false) }
            }
        }
    }

    fn is_compound(&self) -> bool {
        match self {
            VisibilityExpr::And { expressions } | VisibilityExpr::Or { expressions } => {
                expressions.len() > 1
            }
            _ => false,
        }
    }
}

fn leaves(
    question: &QuestionId,
    values: &[String],
    make: impl Fn(QuestionId, String) -> VisibilityExpr,
) -> Vec<VisibilityExpr> {
    values
        .iter()
        .map(|value| make(question.clone(), value.clone()))
        .collect()
}

fn join(expressions: &[VisibilityExpr], separator: &str) -> String {
    expressions
        .iter()
        .map(|expr| {
            if expr.is_compound() {
                format!("({})", expr.to_survey_expression())
            } else {
                expr.to_survey_expression()
            }
        })
        .collect::<Vec<_>>()
        .join(separator)
}

/// Renders a show-condition as a visibility expression string.
pub fn create_visibility_condition(condition: &ShowCondition) -> String {
    VisibilityExpr::from_condition(condition).to_survey_expression()
}

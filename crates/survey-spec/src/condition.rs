use std::collections::BTreeMap;

use crate::answers::{AnswerMap, AnswerValue};
use crate::spec::{Predicate, Question, ShowCondition};

/// Visibility per question id.
pub type VisibilityMap = BTreeMap<String, bool>;

/// Whether `question` is shown given the answers collected so far.
pub fn is_visible(question: &Question, answers: &AnswerMap) -> bool {
    match &question.show_if {
        Some(condition) => evaluate_show_condition(condition, answers),
        None => true,
    }
}

/// Evaluates a show-condition. An unanswered parent never satisfies it.
pub fn evaluate_show_condition(condition: &ShowCondition, answers: &AnswerMap) -> bool {
    let Some(answer) = answers.get(&condition.question_id) else {
        return false;
    };

    match &condition.predicate {
        Predicate::AnyOf(values) => answer.intersects(values),
        Predicate::AllOf(values) => match answer {
            AnswerValue::Choices(_) => values.iter().all(|value| answer.matches(value)),
            // A single answer cannot hold several values; membership is the only usable reading.
            scalar => scalar.intersects(values),
        },
        Predicate::NoneOf(values) => !answer.intersects(values),
    }
}

pub fn resolve_visibility(questions: &[Question], answers: &AnswerMap) -> VisibilityMap {
    questions
        .iter()
        .map(|question| (question.id.to_string(), is_visible(question, answers)))
        .collect()
}

/// Human-readable explanation of when a conditional question appears.
pub fn describe_condition(question: &Question) -> Option<String> {
    let condition = question.show_if.as_ref()?;
    let (phrase, joiner) = match &condition.predicate {
        Predicate::AnyOf(_) => ("is answered with", " or "),
        Predicate::AllOf(_) => ("includes all of", " and "),
        Predicate::NoneOf(_) => ("is NOT answered with", " or "),
    };
    Some(format!(
        "This question appears when Question {} {}: {}",
        condition.question_id,
        phrase,
        condition.predicate.values().join(joiner)
    ))
}

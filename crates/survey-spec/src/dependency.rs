use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::spec::{Question, QuestionId};

/// Referential problem between show-conditions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DependencyError {
    #[error("circular dependency through question {question}")]
    Circular { question: QuestionId },
    #[error("missing referenced question {referenced} from question {question}")]
    MissingReference {
        question: QuestionId,
        referenced: QuestionId,
    },
}

impl DependencyError {
    /// Question whose show-condition produced the finding.
    pub fn question(&self) -> &QuestionId {
        match self {
            DependencyError::Circular { question }
            | DependencyError::MissingReference { question, .. } => question,
        }
    }
}

/// Checks every show-condition for cycles and dangling parent references.
///
/// Cycle findings come first, then missing references, each in input order.
/// Findings are advisory; conversion proceeds regardless.
pub fn validate_dependencies(questions: &[Question]) -> Vec<DependencyError> {
    let index: HashMap<&QuestionId, &Question> = questions
        .iter()
        .map(|question| (&question.id, question))
        .collect();

    let mut errors = Vec::new();

    for question in questions {
        if question.show_if.is_some() && reaches_itself(question, &index) {
            errors.push(DependencyError::Circular {
                question: question.id.clone(),
            });
        }
    }

    for question in questions {
        if let Some(condition) = &question.show_if
            && !index.contains_key(&condition.question_id)
        {
            errors.push(DependencyError::MissingReference {
                question: question.id.clone(),
                referenced: condition.question_id.clone(),
            });
        }
    }

    errors
}

/// Follows the parent chain from `origin` with a visited set local to this
/// walk; any revisit means the chain loops.
fn reaches_itself(origin: &Question, index: &HashMap<&QuestionId, &Question>) -> bool {
    let mut seen: HashSet<&QuestionId> = HashSet::from([&origin.id]);
    let mut next = origin.show_if.as_ref().map(|condition| &condition.question_id);

    while let Some(current) = next {
        if !seen.insert(current) {
            return true;
        }
        next = index
            .get(current)
            .and_then(|question| question.show_if.as_ref())
            .map(|condition| &condition.question_id);
    }

    false
}

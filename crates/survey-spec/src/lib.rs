#![allow(missing_docs)]

pub mod answers;
pub mod condition;
pub mod convert;
pub mod dependency;
pub mod expr;
pub mod slug;
pub mod spec;

pub use answers::{AnswerMap, AnswerValue};
pub use condition::{
    VisibilityMap, describe_condition, evaluate_show_condition, is_visible, resolve_visibility,
};
pub use convert::{
    ElementType, MatrixColumn, RenderElement, RenderModel, RenderPage, convert_survey,
    to_render_model,
};
pub use dependency::{DependencyError, validate_dependencies};
pub use expr::{VisibilityExpr, create_visibility_condition};
pub use slug::section_id;
pub use spec::{
    Predicate, Question, QuestionId, QuestionType, Section, ShowCondition, SpecError, SurveySpec,
};

/// JSON Schema describing accepted survey documents.
pub fn survey_schema() -> serde_json::Value {
    serde_json::to_value(schemars::schema_for!(SurveySpec)).unwrap_or_default()
}

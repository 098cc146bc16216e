use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::dependency::validate_dependencies;
use crate::expr::create_visibility_condition;
use crate::spec::{Question, QuestionType, Section, SurveySpec};

pub const PROGRESS_BAR_POSITION: &str = "top";
pub const PROGRESS_BAR_TYPE: &str = "pages";
pub const COMPLETE_TEXT: &str = "Complete Section";
pub const QUESTION_NUMBERING: &str = "on";
pub const AGENCY_COUNT_COLUMN: &str = "Number of Agencies";

/// Element kinds understood by the rendering engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ElementType {
    #[serde(rename = "html")]
    Html,
    #[serde(rename = "dropdown")]
    Dropdown,
    #[serde(rename = "radiogroup")]
    RadioGroup,
    #[serde(rename = "checkbox")]
    Checkbox,
    #[serde(rename = "text")]
    Text,
    #[serde(rename = "matrixdropdown")]
    MatrixDropdown,
}

impl ElementType {
    pub fn for_question(kind: QuestionType) -> Self {
        match kind {
            QuestionType::Info => ElementType::Html,
            QuestionType::Select => ElementType::Dropdown,
            QuestionType::Radio => ElementType::RadioGroup,
            QuestionType::Checkbox => ElementType::Checkbox,
            QuestionType::Text | QuestionType::Number | QuestionType::Other => ElementType::Text,
            QuestionType::AgenciesWithCount => ElementType::MatrixDropdown,
        }
    }
}

/// Column of a matrix element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct MatrixColumn {
    pub name: String,
    pub title: String,
    pub cell_type: String,
    pub input_type: String,
}

/// One element on a rendered page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderElement {
    pub name: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: ElementType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub render_as: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_other: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_if: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<MatrixColumn>>,
}

impl RenderElement {
    fn new(question: &Question, kind: ElementType) -> Self {
        RenderElement {
            name: question.answer_key(),
            title: question.text.clone(),
            description: question.description.clone(),
            kind,
            html: None,
            choices: None,
            render_as: None,
            has_other: None,
            input_type: None,
            is_required: None,
            visible_if: question.show_if.as_ref().map(create_visibility_condition),
            rows: None,
            columns: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RenderPage {
    pub name: String,
    pub title: String,
    pub elements: Vec<RenderElement>,
}

/// Survey model handed to the rendering engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct RenderModel {
    pub title: String,
    pub pages: Vec<RenderPage>,
    pub show_progress_bar: String,
    pub progress_bar_type: String,
    pub complete_text: String,
    pub show_question_numbers: String,
}

/// Converts a section into a single-page render model.
///
/// Dependency findings are logged and do not stop the conversion.
pub fn to_render_model(section: &Section, section_index: usize) -> RenderModel {
    for finding in validate_dependencies(&section.questions) {
        warn!(section = %section.title, question = %finding.question(), "{finding}");
    }
    debug!(
        section = %section.title,
        questions = section.questions.len(),
        "converting section"
    );

    let page = RenderPage {
        name: format!("page_{section_index}"),
        title: section.title.clone(),
        elements: section.questions.iter().map(convert_question).collect(),
    };

    RenderModel {
        title: section.title.clone(),
        pages: vec![page],
        show_progress_bar: PROGRESS_BAR_POSITION.into(),
        progress_bar_type: PROGRESS_BAR_TYPE.into(),
        complete_text: COMPLETE_TEXT.into(),
        show_question_numbers: QUESTION_NUMBERING.into(),
    }
}

/// Converts every processable section, keyed by section id.
pub fn convert_survey(spec: &SurveySpec) -> Vec<(String, RenderModel)> {
    spec.sections()
        .into_iter()
        .enumerate()
        .map(|(index, section)| (section.id(), to_render_model(section, index)))
        .collect()
}

fn convert_question(question: &Question) -> RenderElement {
    if question.kind == QuestionType::AgenciesWithCount {
        return agencies_matrix(question);
    }

    let mut element = RenderElement::new(question, ElementType::for_question(question.kind));

    if !question.options.is_empty() {
        element.choices = Some(question.options.clone());
        if question.kind == QuestionType::Select {
            element.render_as = Some("select".into());
        }
        if question
            .options
            .iter()
            .any(|option| option.to_lowercase().contains("other"))
        {
            element.has_other = Some(true);
        }
    }

    match question.kind {
        QuestionType::Info => element.html = Some(question.text.clone()),
        QuestionType::Number => element.input_type = Some("number".into()),
        _ => {}
    }

    if question.kind != QuestionType::Info {
        element.is_required = Some(false);
    }

    element
}

/// Agencies are collected as a matrix: one row per option, one numeric count column.
fn agencies_matrix(question: &Question) -> RenderElement {
    let mut element = RenderElement::new(question, ElementType::MatrixDropdown);
    element.rows = Some(question.options.clone());
    element.columns = Some(vec![MatrixColumn {
        name: "count".into(),
        title: AGENCY_COUNT_COLUMN.into(),
        cell_type: "text".into(),
        input_type: "number".into(),
    }]);
    element.is_required = Some(false);
    element
}

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::slug::section_id;
use crate::spec::{SpecError, question::Question};

/// Title of the introductory section served by a static page.
pub const WELCOME_TITLE: &str = "Welcome";
/// Title of the closing section served by a static page.
pub const CLOSING_TITLE: &str = "Closing";

/// Titled, ordered group of questions. Titles are unique within a survey.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Section {
    pub title: String,
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Section {
    pub fn new(title: impl Into<String>, questions: Vec<Question>) -> Self {
        Section {
            title: title.into(),
            questions,
        }
    }

    /// Routing identifier derived from the title.
    pub fn id(&self) -> String {
        section_id(&self.title)
    }

    pub fn is_reserved(&self) -> bool {
        self.title == WELCOME_TITLE || self.title == CLOSING_TITLE
    }
}

/// Top-level survey document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SurveySpec {
    pub title: String,
    pub sections: Vec<Section>,
}

impl SurveySpec {
    pub fn from_json(json: &str) -> Result<Self, SpecError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Sections processed by the converter, reserved sections filtered out.
    pub fn sections(&self) -> Vec<&Section> {
        self.sections
            .iter()
            .filter(|section| !section.is_reserved())
            .collect()
    }

    pub fn welcome(&self) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.title == WELCOME_TITLE)
    }

    pub fn closing(&self) -> Option<&Section> {
        self.sections
            .iter()
            .find(|section| section.title == CLOSING_TITLE)
    }

    /// Looks up a processable section by its slug, returning its position
    /// among the processable sections.
    pub fn find_section(&self, id: &str) -> Option<(usize, &Section)> {
        self.sections()
            .into_iter()
            .enumerate()
            .find(|(_, section)| section.id() == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spec::QuestionType;

    fn survey() -> SurveySpec {
        SurveySpec {
            title: "PSAP Survey".into(),
            sections: vec![
                Section::new(WELCOME_TITLE, vec![]),
                Section::new(
                    "PSAP Staffing & Operations",
                    vec![Question::new("1", "Staff count", QuestionType::Number)],
                ),
                Section::new("Call Handling", vec![]),
                Section::new(CLOSING_TITLE, vec![]),
            ],
        }
    }

    #[test]
    fn reserved_sections_are_filtered() {
        let spec = survey();
        let titles: Vec<_> = spec
            .sections()
            .into_iter()
            .map(|section| section.title.as_str())
            .collect();
        assert_eq!(titles, vec!["PSAP Staffing & Operations", "Call Handling"]);
        assert!(spec.welcome().is_some());
        assert!(spec.closing().is_some());
    }

    #[test]
    fn find_section_uses_filtered_position() {
        let spec = survey();
        let (index, section) = spec.find_section("call-handling").expect("section");
        assert_eq!(index, 1);
        assert_eq!(section.title, "Call Handling");
        assert!(spec.find_section("welcome").is_none());
    }
}

//! Records that flow through the pipeline: the normalized product, generated
//! questions, the synthesized competitor, and the finished page.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical product record produced by the normalizer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProductData {
    pub name: String,
    pub concentration: Option<String>,
    pub skin_type: Vec<String>,
    pub ingredients: Vec<String>,
    pub benefits: Vec<String>,
    pub how_to_use: String,
    pub side_effects: String,
    pub price: f64,
}

/// The fixed set of question categories the generator may use
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum QuestionCategory {
    Informational,
    Safety,
    Usage,
    Purchase,
    Comparison,
}

impl QuestionCategory {
    pub const ALL: [QuestionCategory; 5] = [
        QuestionCategory::Informational,
        QuestionCategory::Safety,
        QuestionCategory::Usage,
        QuestionCategory::Purchase,
        QuestionCategory::Comparison,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionCategory::Informational => "Informational",
            QuestionCategory::Safety => "Safety",
            QuestionCategory::Usage => "Usage",
            QuestionCategory::Purchase => "Purchase",
            QuestionCategory::Comparison => "Comparison",
        }
    }
}

impl fmt::Display for QuestionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        QuestionCategory::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| {
                format!(
                    "unknown question category '{}'. Valid: Informational, Safety, Usage, Purchase, Comparison",
                    wanted
                )
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserQuestion {
    pub category: QuestionCategory,
    pub question_text: String,
    pub answer_text: Option<String>,
}

impl UserQuestion {
    pub fn new(category: QuestionCategory, question_text: impl Into<String>) -> Self {
        Self {
            category,
            question_text: question_text.into(),
            answer_text: None,
        }
    }

    /// Copy of this question carrying an answer; `self` stays unanswered.
    pub fn answered(&self, answer: impl Into<String>) -> Self {
        Self {
            answer_text: Some(answer.into()),
            ..self.clone()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CompetitorProduct {
    pub name: String,
    pub key_ingredients: Vec<String>,
    pub benefits: Vec<String>,
    pub price: f64,
}

impl CompetitorProduct {
    /// Substituted whenever synthesis does not yield a usable record
    pub fn placeholder() -> Self {
        Self {
            name: "Unknown".to_string(),
            key_ingredients: Vec::new(),
            benefits: Vec::new(),
            price: 0.0,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        *self == Self::placeholder()
    }
}

/// Handoff from the Analyst stage to the Publisher stage.
///
/// Fields are private so the state cannot be edited after the Analyst hands it over.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineState {
    product: ProductData,
    questions: Vec<UserQuestion>,
    competitor: CompetitorProduct,
}

impl PipelineState {
    pub fn new(
        product: ProductData,
        questions: Vec<UserQuestion>,
        competitor: CompetitorProduct,
    ) -> Self {
        Self {
            product,
            questions,
            competitor,
        }
    }

    pub fn product(&self) -> &ProductData {
        &self.product
    }

    pub fn questions(&self) -> &[UserQuestion] {
        &self.questions
    }

    pub fn competitor(&self) -> &CompetitorProduct {
        &self.competitor
    }

    /// Questions in one category, in generation order
    pub fn questions_in(&self, category: QuestionCategory) -> impl Iterator<Item = &UserQuestion> {
        self.questions.iter().filter(move |q| q.category == category)
    }
}

/// Body of a page section
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum SectionContent {
    Prose(String),
    Questions(Vec<UserQuestion>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageSection {
    pub heading: String,
    pub content: SectionContent,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PageOutput {
    pub page_type: String,
    pub meta_title: String,
    pub meta_description: String,
    pub meta_tags: Vec<String>,
    pub sections: Vec<PageSection>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_parse_is_case_insensitive() {
        assert_eq!(
            "safety".parse::<QuestionCategory>().unwrap(),
            QuestionCategory::Safety
        );
        assert_eq!(
            " PURCHASE ".parse::<QuestionCategory>().unwrap(),
            QuestionCategory::Purchase
        );
        assert!("Pricing".parse::<QuestionCategory>().is_err());
    }

    #[test]
    fn test_answered_leaves_original_untouched() {
        let q = UserQuestion::new(QuestionCategory::Usage, "How often?");
        let a = q.answered("Twice daily.");
        assert!(q.answer_text.is_none());
        assert_eq!(a.answer_text.as_deref(), Some("Twice daily."));
        assert_eq!(a.question_text, q.question_text);
    }

    #[test]
    fn test_placeholder_detection() {
        assert!(CompetitorProduct::placeholder().is_placeholder());
        let mut c = CompetitorProduct::placeholder();
        c.price = 12.0;
        assert!(!c.is_placeholder());
    }

    #[test]
    fn test_section_content_serializes_untagged() {
        let prose = PageSection {
            heading: "Intro".into(),
            content: SectionContent::Prose("Hello".into()),
        };
        let v = serde_json::to_value(&prose).unwrap();
        assert_eq!(v["content"], "Hello");

        let qa = PageSection {
            heading: "FAQ".into(),
            content: SectionContent::Questions(vec![
                UserQuestion::new(QuestionCategory::Safety, "Safe?").answered("Yes."),
            ]),
        };
        let v = serde_json::to_value(&qa).unwrap();
        assert_eq!(v["content"][0]["category"], "Safety");
        assert_eq!(v["content"][0]["answer_text"], "Yes.");
    }
}

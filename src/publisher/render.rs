use crate::models::{PageOutput, SectionContent};

/// Markdown rendering of a finished page
pub fn render_markdown(page: &PageOutput) -> String {
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", page.meta_title));
    out.push_str(&format!("> {}\n\n", page.meta_description));

    for section in &page.sections {
        out.push_str(&format!("## {}\n\n", section.heading));
        match &section.content {
            SectionContent::Prose(text) => {
                out.push_str(text.trim());
                out.push_str("\n\n");
            }
            SectionContent::Questions(questions) if questions.is_empty() => {
                out.push_str("_No questions available._\n\n");
            }
            SectionContent::Questions(questions) => {
                for q in questions {
                    out.push_str(&format!("**Q: {}**\n\n", q.question_text));
                    out.push_str(&format!(
                        "{}\n\n",
                        q.answer_text.as_deref().unwrap_or("_Unanswered_")
                    ));
                }
            }
        }
    }

    if !page.meta_tags.is_empty() {
        out.push_str(&format!("---\nTags: {}\n", page.meta_tags.join(", ")));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PageSection, QuestionCategory, UserQuestion};

    #[test]
    fn test_render_both_content_shapes() {
        let page = PageOutput {
            page_type: "faq".into(),
            meta_title: "GlowBoost | FAQ".into(),
            meta_description: "FAQ for GlowBoost.".into(),
            meta_tags: vec!["glowboost".into()],
            sections: vec![
                PageSection {
                    heading: "Intro".into(),
                    content: SectionContent::Prose("Welcome!\n".into()),
                },
                PageSection {
                    heading: "Safety".into(),
                    content: SectionContent::Questions(vec![
                        UserQuestion::new(QuestionCategory::Safety, "Is it safe?")
                            .answered("Yes, for most skin types."),
                    ]),
                },
                PageSection {
                    heading: "Purchase".into(),
                    content: SectionContent::Questions(vec![]),
                },
            ],
        };
        let md = render_markdown(&page);
        assert!(md.starts_with("# GlowBoost | FAQ\n"));
        assert!(md.contains("## Intro\n\nWelcome!\n\n"));
        assert!(md.contains("**Q: Is it safe?**\n\nYes, for most skin types."));
        assert!(md.contains("_No questions available._"));
        assert!(md.ends_with("Tags: glowboost\n"));
    }
}

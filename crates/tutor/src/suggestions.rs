//! Canned follow-up suggestions shown under each tutor reply.
//!
//! Pure data keyed on the assessment's skill level, with a frustration
//! override. Always at most three entries.

use tutoragent_core::{Assessment, SkillLevel};

const MAX_SUGGESTIONS: usize = 3;

/// Suggestions for a plain chat turn.
pub fn suggestions_for(assessment: Option<&Assessment>) -> Vec<String> {
    let Some(assessment) = assessment else {
        return to_vec(&[
            "Can you show me your work so far?",
            "What's the first step you would take?",
            "Are there any parts you're unsure about?",
        ]);
    };

    if assessment.emotional_state == "frustrated" {
        return to_vec(&[
            "Take your time - we'll figure this out together",
            "Let's try a different approach",
            "You're doing well - keep going!",
        ]);
    }

    let picks: &[&str] = match assessment.skill_level {
        SkillLevel::Beginner => &[
            "Let's break this into smaller steps",
            "What information do we have?",
            "Can you identify what we need to find?",
        ],
        SkillLevel::Advanced => &[
            "Are there multiple ways to solve this?",
            "Can you explain your reasoning?",
            "What would happen if we changed one of the numbers?",
        ],
        SkillLevel::Intermediate => &[
            "What operation might help here?",
            "Can you try the next step?",
            "Does this remind you of similar problems?",
        ],
    };
    to_vec(picks)
}

/// Suggestions for a document-backed chat turn, aware of which question
/// the student is on.
pub fn pdf_suggestions_for(
    assessment: Option<&Assessment>,
    current_question: u32,
    total_questions: u32,
) -> Vec<String> {
    let mut picks = match assessment.map(|a| a.skill_level) {
        None => vec![
            format!("What do you notice about Question {current_question}?"),
            "Can you identify what type of problem this is?".into(),
            "What information does the question give you?".into(),
        ],
        Some(SkillLevel::Beginner) => vec![
            "Let's read the question together step by step".to_string(),
            format!("What is Question {current_question} asking you to find?"),
            "Can you identify the key numbers in this problem?".into(),
        ],
        Some(SkillLevel::Advanced) => vec![
            format!("How does Question {current_question} compare to previous ones?"),
            "Can you think of multiple ways to approach this?".into(),
            "What patterns do you see in your homework?".into(),
        ],
        Some(SkillLevel::Intermediate) => vec![
            format!("What's your first step for Question {current_question}?"),
            "Which math concept does this problem use?".into(),
            "Can you explain your thinking so far?".into(),
        ],
    };

    if current_question < total_questions {
        picks.push(format!(
            "Ready to move to Question {}?",
            current_question + 1
        ));
    }
    cap(picks)
}

fn to_vec(items: &[&str]) -> Vec<String> {
    cap(items.iter().map(|s| s.to_string()).collect())
}

fn cap(mut items: Vec<String>) -> Vec<String> {
    items.truncate(MAX_SUGGESTIONS);
    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_assessment_gets_generic_prompts() {
        let suggestions = suggestions_for(None);
        assert_eq!(suggestions.len(), 3);
        assert!(suggestions[0].contains("your work so far"));
    }

    #[test]
    fn skill_level_selects_table() {
        let mut assessment = Assessment::fallback();

        assessment.skill_level = SkillLevel::Beginner;
        assert!(suggestions_for(Some(&assessment))[0].contains("smaller steps"));

        assessment.skill_level = SkillLevel::Advanced;
        assert!(suggestions_for(Some(&assessment))[0].contains("multiple ways"));

        assessment.skill_level = SkillLevel::Intermediate;
        assert!(suggestions_for(Some(&assessment))[0].contains("operation"));
    }

    #[test]
    fn frustration_overrides_skill_level() {
        let mut assessment = Assessment::fallback();
        assessment.skill_level = SkillLevel::Advanced;
        assessment.emotional_state = "frustrated".into();

        let suggestions = suggestions_for(Some(&assessment));
        assert!(suggestions[0].contains("Take your time"));
    }

    #[test]
    fn never_more_than_three() {
        assert!(suggestions_for(None).len() <= 3);
        // the navigation entry never displaces the skill-level picks
        assert_eq!(pdf_suggestions_for(None, 1, 10).len(), 3);
        assert!(
            !pdf_suggestions_for(None, 1, 10)
                .iter()
                .any(|s| s.contains("Ready to move"))
        );
    }

    #[test]
    fn pdf_suggestions_name_the_current_question() {
        let suggestions = pdf_suggestions_for(None, 4, 10);
        assert!(suggestions[0].contains("Question 4"));

        let assessment = Assessment::fallback();
        let suggestions = pdf_suggestions_for(Some(&assessment), 4, 10);
        assert!(suggestions[0].contains("Question 4"));
    }
}

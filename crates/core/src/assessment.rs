//! Assessment and tutoring-reply value objects.
//!
//! An [`Assessment`] is produced fresh on every continuation turn; it is
//! never merged with a prior one, except that the session's skill-level
//! field is overwritten by the latest. Model output is allowed to be
//! partial: [`Assessment::fill_defaults`] patches missing fields from a
//! fixed defaults table instead of failing the whole assessment.

use serde::{Deserialize, Serialize};

/// A student's proficiency label. Always one of these three values;
/// anything else the model returns is coerced to the default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
}

impl SkillLevel {
    /// Lenient parse: unknown or missing labels map to the default.
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "beginner" => Self::Beginner,
            "advanced" => Self::Advanced,
            _ => Self::Intermediate,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Beginner => "beginner",
            Self::Intermediate => "intermediate",
            Self::Advanced => "advanced",
        }
    }
}

impl std::fmt::Display for SkillLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A structured judgment of a student's latest response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    #[serde(default, deserialize_with = "lenient_skill_level")]
    pub skill_level: SkillLevel,

    /// Confidence scalar in [0, 1].
    #[serde(default = "default_confidence")]
    pub confidence: f64,

    #[serde(default)]
    pub knowledge_gaps: Vec<String>,

    #[serde(default)]
    pub strengths: Vec<String>,

    #[serde(default)]
    pub recommended_approach: String,

    /// One of "easier" | "same" | "harder".
    #[serde(default)]
    pub next_question_difficulty: String,

    /// E.g. "confident", "hesitant", "frustrated", "engaged", "neutral".
    #[serde(default)]
    pub emotional_state: String,

    #[serde(default)]
    pub reasoning: String,
}

fn default_confidence() -> f64 {
    0.5
}

/// Accept any string for skill_level and coerce unknown values, so a
/// sloppy model answer never fails the whole parse.
fn lenient_skill_level<'de, D>(deserializer: D) -> Result<SkillLevel, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match raw {
        Some(serde_json::Value::String(s)) => SkillLevel::parse_lenient(&s),
        _ => SkillLevel::default(),
    })
}

impl Assessment {
    /// The per-field defaults table. Pure data: missing string fields
    /// get these values after a partial model answer is parsed.
    const DEFAULT_APPROACH: &'static str = "Continue with guided questioning";
    const DEFAULT_DIFFICULTY: &'static str = "same";
    const DEFAULT_EMOTIONAL_STATE: &'static str = "neutral";

    /// Fill any field the model omitted with its default value, and
    /// clamp confidence into [0, 1].
    pub fn fill_defaults(mut self) -> Self {
        if self.recommended_approach.is_empty() {
            self.recommended_approach = Self::DEFAULT_APPROACH.into();
        }
        if self.next_question_difficulty.is_empty() {
            self.next_question_difficulty = Self::DEFAULT_DIFFICULTY.into();
        }
        if self.emotional_state.is_empty() {
            self.emotional_state = Self::DEFAULT_EMOTIONAL_STATE.into();
        }
        self.confidence = self.confidence.clamp(0.0, 1.0);
        self
    }

    /// The fixed fallback returned whenever the model call or its
    /// output cannot be used. Returned verbatim; no retry.
    pub fn fallback() -> Self {
        Self {
            skill_level: SkillLevel::Intermediate,
            confidence: 0.5,
            knowledge_gaps: vec!["assessment_unavailable".into()],
            strengths: Vec::new(),
            recommended_approach: "Continue with standard tutoring approach".into(),
            next_question_difficulty: "same".into(),
            emotional_state: "neutral".into(),
            reasoning: "Fallback assessment due to AI failure".into(),
        }
    }

    /// A neutral seed assessment used when generating the very first
    /// reply to a new problem, before any student work exists.
    pub fn neutral_seed() -> Self {
        Self {
            skill_level: SkillLevel::Intermediate,
            confidence: 0.5,
            knowledge_gaps: Vec::new(),
            strengths: Vec::new(),
            recommended_approach: String::new(),
            next_question_difficulty: String::new(),
            emotional_state: "neutral".into(),
            reasoning: String::new(),
        }
        .fill_defaults()
    }
}

/// A Socratic tutoring reply generated for one turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TutorReply {
    /// The encouraging tutoring message with a guiding question.
    pub message: String,

    /// Hint escalation level, 1–3.
    #[serde(default = "default_hint_level")]
    pub hint_level: u8,

    #[serde(default)]
    pub celebrates_progress: bool,

    /// The specific knowledge gap being addressed.
    #[serde(default)]
    pub targets_gap: String,

    /// Stamped from the caller context's `timestamp` field, for
    /// downstream logging. Pass-through string, not parsed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// The skill level the assessment carried when this reply was
    /// generated.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub based_on_assessment: Option<SkillLevel>,
}

fn default_hint_level() -> u8 {
    1
}

impl TutorReply {
    /// The fixed fallback reply used whenever reply generation fails.
    pub fn fallback() -> Self {
        Self {
            message: "I'm here to help! Can you tell me what you think the first step \
                      might be for this problem?"
                .into(),
            hint_level: 1,
            celebrates_progress: false,
            targets_gap: "general_approach".into(),
            timestamp: None,
            based_on_assessment: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_level_lenient_parse() {
        assert_eq!(SkillLevel::parse_lenient("beginner"), SkillLevel::Beginner);
        assert_eq!(SkillLevel::parse_lenient(" Advanced "), SkillLevel::Advanced);
        assert_eq!(SkillLevel::parse_lenient("expert"), SkillLevel::Intermediate);
        assert_eq!(SkillLevel::parse_lenient(""), SkillLevel::Intermediate);
    }

    #[test]
    fn partial_assessment_fills_defaults() {
        let a: Assessment = serde_json::from_str(
            r#"{"skill_level": "advanced", "confidence": 0.9}"#,
        )
        .unwrap();
        let a = a.fill_defaults();
        assert_eq!(a.skill_level, SkillLevel::Advanced);
        assert_eq!(a.recommended_approach, "Continue with guided questioning");
        assert_eq!(a.next_question_difficulty, "same");
        assert_eq!(a.emotional_state, "neutral");
        assert!(a.knowledge_gaps.is_empty());
    }

    #[test]
    fn unknown_skill_level_coerced() {
        let a: Assessment =
            serde_json::from_str(r#"{"skill_level": "wizard", "confidence": 0.7}"#).unwrap();
        assert_eq!(a.skill_level, SkillLevel::Intermediate);
    }

    #[test]
    fn confidence_clamped() {
        let a: Assessment = serde_json::from_str(r#"{"confidence": 3.5}"#).unwrap();
        assert_eq!(a.fill_defaults().confidence, 1.0);
    }

    #[test]
    fn fallback_assessment_shape() {
        let a = Assessment::fallback();
        assert_eq!(a.skill_level, SkillLevel::Intermediate);
        assert_eq!(a.confidence, 0.5);
        assert!(a.knowledge_gaps.contains(&"assessment_unavailable".to_string()));
        assert!(!a.reasoning.is_empty());
    }

    #[test]
    fn fallback_reply_shape() {
        let r = TutorReply::fallback();
        assert_eq!(r.hint_level, 1);
        assert!(!r.celebrates_progress);
        assert_eq!(r.targets_gap, "general_approach");
        assert!(r.message.contains("first step"));
    }

    #[test]
    fn reply_default_hint_level_on_partial_json() {
        let r: TutorReply = serde_json::from_str(r#"{"message": "Try again!"}"#).unwrap();
        assert_eq!(r.hint_level, 1);
        assert!(!r.celebrates_progress);
    }
}

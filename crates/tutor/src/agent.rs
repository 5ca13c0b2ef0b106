//! The tutoring agent: assessment and reply generation.

use crate::prompts;
use serde_json::Value;
use std::sync::Arc;
use tracing::{error, info, warn};
use tutoragent_core::provider::CompletionRequest;
use tutoragent_core::{Assessment, Provider, ProviderError, TutorReply};

/// Fallback message when even the very first reply to a new problem
/// cannot be generated.
const INITIAL_REPLY_FALLBACK: &str = "Hi! I'm excited to help you with this math problem. \
     Let's work through it together - what do you think we should look at first?";

/// Strip a markdown code fence from a model answer.
///
/// Handles the ```` ```json ```` and bare ```` ``` ```` prefixes plus a
/// trailing fence. Idempotent: already-clean input passes through.
pub fn strip_code_fence(text: &str) -> &str {
    let mut text = text.trim();
    if let Some(rest) = text.strip_prefix("```json") {
        text = rest;
    } else if let Some(rest) = text.strip_prefix("```") {
        text = rest;
    }
    if let Some(rest) = text.strip_suffix("```") {
        text = rest;
    }
    text.trim()
}

/// Drives one tutoring turn against an injected model provider.
pub struct TutorAgent {
    provider: Arc<dyn Provider>,
    temperature: f32,
    max_output_tokens: u32,
}

impl TutorAgent {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self {
            provider,
            temperature: 0.7,
            max_output_tokens: 2048,
        }
    }

    /// Override the generation settings from configuration.
    pub fn with_generation(mut self, temperature: f32, max_output_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_output_tokens = max_output_tokens;
        self
    }

    fn request(&self, prompt: String) -> CompletionRequest {
        CompletionRequest {
            prompt,
            temperature: self.temperature,
            max_output_tokens: self.max_output_tokens,
        }
    }

    /// Assess the student's latest response.
    ///
    /// Never fails: a model error or unparseable answer yields the fixed
    /// fallback assessment, a partial answer is completed from the
    /// defaults table.
    pub async fn assess(&self, problem: &str, student_response: &str, context: &Value) -> Assessment {
        let prompt = prompts::assessment_prompt(problem, student_response, context);

        let raw = match self.provider.complete(self.request(prompt)).await {
            Ok(raw) => raw,
            Err(e) => {
                error!(error = %e, "Assessment model call failed");
                return Assessment::fallback();
            }
        };

        let cleaned = strip_code_fence(&raw);
        match serde_json::from_str::<Assessment>(cleaned) {
            Ok(assessment) => {
                let assessment = assessment.fill_defaults();
                info!(skill_level = %assessment.skill_level, "Assessment completed");
                assessment
            }
            Err(e) => {
                error!(error = %e, raw = %truncate(cleaned, 200), "Failed to parse assessment JSON");
                Assessment::fallback()
            }
        }
    }

    /// Generate the Socratic tutoring reply for one turn.
    ///
    /// Never fails: any model or parse error yields the fixed fallback
    /// reply. On success the reply is stamped with the context timestamp
    /// and the assessment's skill level.
    pub async fn respond(
        &self,
        problem: &str,
        student_response: &str,
        assessment: &Assessment,
        context: &Value,
    ) -> TutorReply {
        match self
            .generate_reply(problem, student_response, assessment, context)
            .await
        {
            Ok(reply) => reply,
            Err(()) => TutorReply::fallback(),
        }
    }

    /// Generate the welcoming reply when a new problem is first posed,
    /// before the student has shown any work.
    pub async fn initial_reply(&self, problem: &str) -> String {
        let seed = Assessment::neutral_seed();
        let context = serde_json::json!({"is_initial": true});

        match self
            .generate_reply(problem, "I need help with this problem", &seed, &context)
            .await
        {
            Ok(reply) => reply.message,
            Err(()) => {
                warn!("Failed to generate initial reply, using canned welcome");
                INITIAL_REPLY_FALLBACK.into()
            }
        }
    }

    async fn generate_reply(
        &self,
        problem: &str,
        student_response: &str,
        assessment: &Assessment,
        context: &Value,
    ) -> Result<TutorReply, ()> {
        let prompt = prompts::tutoring_prompt(problem, student_response, assessment, context);

        let raw = self
            .provider
            .complete(self.request(prompt))
            .await
            .map_err(|e: ProviderError| {
                error!(error = %e, "Tutoring model call failed");
            })?;

        let cleaned = strip_code_fence(&raw);
        let mut reply: TutorReply = serde_json::from_str(cleaned).map_err(|e| {
            error!(error = %e, raw = %truncate(cleaned, 400), "Failed to parse tutoring JSON");
        })?;

        reply.timestamp = context
            .get("timestamp")
            .and_then(Value::as_str)
            .map(str::to_string);
        reply.based_on_assessment = Some(assessment.skill_level);

        info!(hint_level = reply.hint_level, "Tutoring reply generated");
        Ok(reply)
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use tutoragent_core::SkillLevel;

    /// Provider that replays a fixed answer, or errors.
    struct ScriptedProvider {
        answer: Result<String, ProviderError>,
    }

    impl ScriptedProvider {
        fn ok(answer: &str) -> Arc<dyn Provider> {
            Arc::new(Self {
                answer: Ok(answer.to_string()),
            })
        }

        fn failing() -> Arc<dyn Provider> {
            Arc::new(Self {
                answer: Err(ProviderError::Network("connection refused".into())),
            })
        }
    }

    #[async_trait]
    impl Provider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<String, ProviderError> {
            self.answer.clone()
        }
    }

    #[test]
    fn fence_stripping_json_variant() {
        assert_eq!(strip_code_fence("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn fence_stripping_bare_variant() {
        assert_eq!(strip_code_fence("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
    }

    #[test]
    fn fence_stripping_is_idempotent() {
        let clean = "{\"a\": 1}";
        assert_eq!(strip_code_fence(clean), clean);
        assert_eq!(strip_code_fence(strip_code_fence("```json\n{\"a\": 1}\n```")), clean);
    }

    #[tokio::test]
    async fn assess_parses_model_json() {
        let agent = TutorAgent::new(ScriptedProvider::ok(
            r#"```json
{"skill_level": "advanced", "confidence": 0.9, "knowledge_gaps": [], "strengths": ["algebra"], "recommended_approach": "challenge", "next_question_difficulty": "harder", "emotional_state": "confident", "reasoning": "strong work"}
```"#,
        ));

        let assessment = agent.assess("15+27", "42", &json!({})).await;
        assert_eq!(assessment.skill_level, SkillLevel::Advanced);
        assert_eq!(assessment.strengths, vec!["algebra"]);
    }

    #[tokio::test]
    async fn assess_fills_defaults_on_partial_answer() {
        let agent = TutorAgent::new(ScriptedProvider::ok(r#"{"skill_level": "beginner"}"#));
        let assessment = agent.assess("15+27", "idk", &json!({})).await;
        assert_eq!(assessment.skill_level, SkillLevel::Beginner);
        assert_eq!(assessment.recommended_approach, "Continue with guided questioning");
        assert_eq!(assessment.next_question_difficulty, "same");
        assert_eq!(assessment.emotional_state, "neutral");
    }

    #[tokio::test]
    async fn assess_falls_back_on_model_error() {
        let agent = TutorAgent::new(ScriptedProvider::failing());
        let assessment = agent.assess("15+27", "42", &json!({})).await;
        assert_eq!(assessment.skill_level, SkillLevel::Intermediate);
        assert!(assessment
            .knowledge_gaps
            .contains(&"assessment_unavailable".to_string()));
    }

    #[tokio::test]
    async fn assess_falls_back_on_non_json() {
        let agent = TutorAgent::new(ScriptedProvider::ok("Sure! Here is my assessment: great"));
        let assessment = agent.assess("15+27", "42", &json!({})).await;
        assert!(assessment
            .knowledge_gaps
            .contains(&"assessment_unavailable".to_string()));
    }

    #[tokio::test]
    async fn respond_stamps_timestamp_and_level() {
        let agent = TutorAgent::new(ScriptedProvider::ok(
            r#"{"message": "What do you notice?", "hint_level": 2, "celebrates_progress": true, "targets_gap": "addition"}"#,
        ));

        let assessment = Assessment {
            skill_level: SkillLevel::Advanced,
            ..Assessment::fallback()
        };
        let context = json!({"timestamp": "2024-05-01T10:00:00"});
        let reply = agent.respond("15+27", "42", &assessment, &context).await;

        assert_eq!(reply.message, "What do you notice?");
        assert_eq!(reply.hint_level, 2);
        assert_eq!(reply.timestamp.as_deref(), Some("2024-05-01T10:00:00"));
        assert_eq!(reply.based_on_assessment, Some(SkillLevel::Advanced));
    }

    #[tokio::test]
    async fn respond_falls_back_on_model_error() {
        let agent = TutorAgent::new(ScriptedProvider::failing());
        let reply = agent
            .respond("15+27", "42", &Assessment::fallback(), &json!({}))
            .await;
        assert_eq!(reply.hint_level, 1);
        assert!(!reply.celebrates_progress);
        assert_eq!(reply.targets_gap, "general_approach");
        assert!(reply.message.starts_with("I'm here to help!"));
    }

    #[tokio::test]
    async fn initial_reply_uses_model_message() {
        let agent = TutorAgent::new(ScriptedProvider::ok(
            r#"{"message": "Welcome! What kind of problem is this?"}"#,
        ));
        let message = agent.initial_reply("15+27").await;
        assert_eq!(message, "Welcome! What kind of problem is this?");
    }

    #[tokio::test]
    async fn initial_reply_has_its_own_fallback() {
        let agent = TutorAgent::new(ScriptedProvider::failing());
        let message = agent.initial_reply("15+27").await;
        assert!(message.starts_with("Hi! I'm excited"));
    }
}

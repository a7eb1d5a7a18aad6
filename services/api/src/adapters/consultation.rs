//! services/api/src/adapters/consultation.rs
//!
//! This module contains the adapter for the AI doctor consultation LLM.
//! It implements the `ConsultationService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use std::time::Duration;

use aidoctor_core::ports::{ConsultationService, PortError, PortResult};

const SYSTEM_INSTRUCTIONS: &str = "You are a medical AI assistant providing consultations.";

const USER_INPUT_TEMPLATE: &str = r#"Given these patient details:
Symptoms: {symptom}
Sex: {sex}
Age: {age}
Country visited: {country}

Provide a concise summary of the potential medical issue and recommended actions. If the condition appears complex, provide a more detailed explanation. Use simple language and avoid medical jargon. use words like 'you' and 'your'. Never return result in form of bullets or points or list. always return result in paragraph format."#;

/// Upper bound on one outbound completion call. A slower provider response
/// surfaces as an upstream failure instead of hanging the request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `ConsultationService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiConsultationAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiConsultationAdapter {
    /// Creates a new `OpenAiConsultationAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

fn build_prompt(symptom: &str, sex: &str, age: &str, country: &str) -> String {
    USER_INPUT_TEMPLATE
        .replace("{symptom}", symptom)
        .replace("{sex}", sex)
        .replace("{age}", age)
        .replace("{country}", country)
}

//=========================================================================================
// `ConsultationService` Trait Implementation
//=========================================================================================

#[async_trait]
impl ConsultationService for OpenAiConsultationAdapter {
    /// Runs a single, synchronous completion call with the fixed prompt template.
    async fn consult(
        &self,
        symptom: &str,
        sex: &str,
        age: &str,
        country: &str,
    ) -> PortResult<String> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(build_prompt(symptom, sex, age, country))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .n(1)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = tokio::time::timeout(REQUEST_TIMEOUT, self.client.chat().create(request))
            .await
            .map_err(|_| {
                PortError::Upstream(format!(
                    "Consultation provider timed out after {}s",
                    REQUEST_TIMEOUT.as_secs()
                ))
            })?
            .map_err(|e: OpenAIError| PortError::Upstream(e.to_string()))?;

        // Extract the text content from the first choice in the response.
        if let Some(choice) = response.choices.into_iter().next() {
            if let Some(content) = choice.message.content {
                Ok(content)
            } else {
                Err(PortError::Upstream(
                    "Consultation LLM response contained no text content.".to_string(),
                ))
            }
        } else {
            Err(PortError::Upstream(
                "Consultation LLM returned no choices in its response.".to_string(),
            ))
        }
    }
}

use async_openai::{
    config::OpenAIConfig,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;

const ORACLE_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(30);

/// Narrow text-classification capability consumed by the relevance
/// classifier, the contact disambiguator, the summarizer and the sentiment
/// analyzer. Injected so deterministic doubles can replace it in tests.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Answer a free-form question about a piece of text; returns the raw
    /// model output.
    async fn classify(&self, text: &str, question: &str) -> anyhow::Result<String>;

    /// Extract a structured record from text. The schema hint describes the
    /// exact JSON object expected back.
    async fn extract_structured(
        &self,
        text: &str,
        schema_hint: &str,
    ) -> anyhow::Result<serde_json::Value>;
}

pub struct OpenaiOracle {
    client: Client<OpenAIConfig>,
    model: String,
}

impl Default for OpenaiOracle {
    fn default() -> Self {
        OpenaiOracle {
            client: Client::new(),
            model: "gpt-4o-mini".to_string(),
        }
    }
}

impl OpenaiOracle {
    pub fn new(api_key: String) -> Self {
        let config = OpenAIConfig::new().with_api_key(api_key);
        OpenaiOracle {
            client: Client::with_config(config),
            model: "gpt-4o-mini".to_string(),
        }
    }

    async fn complete(&self, system: &str, prompt: &str) -> anyhow::Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.model.as_str())
            .messages([
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(system)
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(prompt)
                    .build()?
                    .into(),
            ])
            .temperature(0.2)
            .max_tokens(500_u32)
            .build()?;

        let response = tokio::time::timeout(ORACLE_TIMEOUT, self.client.chat().create(request))
            .await
            .map_err(|_| anyhow::anyhow!("Model call timed out"))??;

        let first_choice = response
            .choices
            .first()
            .ok_or_else(|| anyhow::anyhow!("No choices in model response"))?
            .message
            .content
            .clone()
            .ok_or_else(|| anyhow::anyhow!("No content in model response"))?;

        Ok(first_choice.trim().to_string())
    }
}

#[async_trait]
impl Oracle for OpenaiOracle {
    async fn classify(&self, text: &str, question: &str) -> anyhow::Result<String> {
        let prompt = format!("{}\n\n{}", question, text);
        self.complete("You are a helpful assistant.", &prompt).await
    }

    async fn extract_structured(
        &self,
        text: &str,
        schema_hint: &str,
    ) -> anyhow::Result<serde_json::Value> {
        let prompt = format!(
            "{}\n\nReturn ONLY a JSON object with this exact structure:\n{}",
            text, schema_hint
        );
        let raw = self
            .complete(
                "You are a careful data extractor. Return only valid JSON.",
                &prompt,
            )
            .await?;

        let stripped = strip_code_fences(&raw);
        let value = serde_json::from_str(stripped)?;
        Ok(value)
    }
}

/// Models wrap JSON answers in markdown fences often enough that we strip
/// them before parsing.
pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    trimmed.strip_suffix("```").unwrap_or(trimmed).trim()
}

#[cfg(test)]
mod tests {
    use super::strip_code_fences;

    #[test]
    fn strip_code_fences_handles_fenced_and_plain_json() {
        assert_eq!(
            strip_code_fences("```json\n{\"a\": 1}\n```"),
            "{\"a\": 1}"
        );
        assert_eq!(strip_code_fences("```\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("{\"a\": 1}"), "{\"a\": 1}");
    }
}

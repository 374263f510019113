//! Client for the external generative-text service used for chat and
//! meal-plan generation. The matching core never depends on this; its only
//! interaction is post-hoc enrichment of a generated plan via
//! `Engine::optimized_suggestion`.

use engine::Suggestion;
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_API_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

const CHAT_SYSTEM_PROMPT: &str = "You are a friendly nutrition assistant for a food \
    matching service. Answer questions about food, nutrition, and meal planning \
    concisely. Do not give medical advice.";

/// Failures talking to the generative service. Surfaced to the caller as
/// typed errors; the core never retries.
#[derive(Debug, Error)]
pub enum GenerateError {
    /// The HTTP request could not be sent or the body could not be read.
    #[error("generative request failed: {0}")]
    Request(String),

    /// The service answered with a non-success status.
    #[error("generative service returned status {status}: {message}")]
    Api { status: u16, message: String },

    /// The service answered 2xx but the payload was not usable.
    #[error("malformed generative response: {0}")]
    Malformed(String),
}

/// One turn of a chat conversation, as sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: String,
    pub content: String,
}

/// Parameters for meal-plan generation.
#[derive(Debug, Clone, Deserialize)]
pub struct PlanRequest {
    #[serde(default)]
    pub age: Option<u32>,
    #[serde(default)]
    pub gender: Option<String>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(rename = "targetCalories", alias = "target_calories")]
    pub target_calories: f64,
}

/// One meal slot of a generated plan. `suggestion` is attached by the
/// engine during optimization, never by the generative service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub name: String,
    pub description: String,
    pub calories: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<Suggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealSlots {
    pub breakfast: Meal,
    pub lunch: Meal,
    pub dinner: Meal,
}

/// The fixed meal-plan schema the generative service must produce.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealPlanDoc {
    pub plan: MealSlots,
    #[serde(rename = "totalCalories")]
    pub total_calories: f64,
    pub reason: String,
}

#[derive(Debug, Serialize)]
struct CompletionMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<CompletionMessage>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionReply,
}

#[derive(Debug, Deserialize)]
struct CompletionReply {
    content: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorResponse {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Thin client over an OpenAI-compatible chat-completions endpoint.
pub struct GenerateClient {
    http: reqwest::Client,
    api_url: String,
    api_key: String,
    model: String,
}

impl GenerateClient {
    pub fn new(api_url: String, api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_url,
            api_key,
            model,
        }
    }

    /// Configure from `GENERATE_API_KEY`, `GENERATE_API_URL`, and
    /// `GENERATE_MODEL`. Returns `None` without a key; the chat and
    /// meal-plan routes then answer 503 while everything else keeps
    /// working.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("GENERATE_API_KEY").ok()?;
        let api_url =
            std::env::var("GENERATE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string());
        let model = std::env::var("GENERATE_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Some(Self::new(api_url, api_key, model))
    }

    async fn complete(&self, messages: Vec<CompletionMessage>) -> Result<String, GenerateError> {
        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
        };
        let response = self
            .http
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| GenerateError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| GenerateError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            let message = serde_json::from_str::<ApiErrorResponse>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| body.chars().take(200).collect());
            return Err(GenerateError::Api { status, message });
        }

        let parsed: CompletionResponse =
            serde_json::from_str(&body).map_err(|e| GenerateError::Malformed(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .ok_or_else(|| GenerateError::Malformed("response contained no choices".into()))
    }

    /// Free-text chat with optional conversation history.
    pub async fn chat(
        &self,
        message: &str,
        history: &[ChatTurn],
    ) -> Result<String, GenerateError> {
        let mut messages = vec![CompletionMessage {
            role: "system".to_string(),
            content: CHAT_SYSTEM_PROMPT.to_string(),
        }];
        for turn in history {
            messages.push(CompletionMessage {
                role: turn.role.clone(),
                content: turn.content.clone(),
            });
        }
        messages.push(CompletionMessage {
            role: "user".to_string(),
            content: message.to_string(),
        });
        self.complete(messages).await
    }

    /// Generate a structured meal plan matching [`MealPlanDoc`].
    pub async fn meal_plan(&self, request: &PlanRequest) -> Result<MealPlanDoc, GenerateError> {
        let mut profile = String::new();
        if let Some(age) = request.age {
            profile.push_str(&format!("age {age}, "));
        }
        if let Some(gender) = &request.gender {
            profile.push_str(&format!("gender {gender}, "));
        }
        if let Some(weight) = request.weight {
            profile.push_str(&format!("weight {weight} kg, "));
        }
        if let Some(height) = request.height {
            profile.push_str(&format!("height {height} cm, "));
        }
        let prompt = format!(
            "Create a one-day meal plan for a person ({profile}target {target} kcal). \
             Respond with strict JSON only, no prose, matching exactly this schema: \
             {{\"plan\": {{\"breakfast\": {{\"name\": str, \"description\": str, \
             \"calories\": number}}, \"lunch\": {{...}}, \"dinner\": {{...}}}}, \
             \"totalCalories\": number, \"reason\": str}}",
            target = request.target_calories,
        );
        let text = self
            .complete(vec![CompletionMessage {
                role: "user".to_string(),
                content: prompt,
            }])
            .await?;
        serde_json::from_str(strip_code_fences(&text))
            .map_err(|e| GenerateError::Malformed(e.to_string()))
    }
}

/// Models wrap JSON answers in markdown fences often enough that stripping
/// them beats failing the request.
fn strip_code_fences(text: &str) -> &str {
    let t = text.trim();
    let t = t
        .strip_prefix("```json")
        .or_else(|| t.strip_prefix("```"))
        .unwrap_or(t);
    t.strip_suffix("```").unwrap_or(t).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\n{}\n```"), "{}");
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
    }

    #[test]
    fn meal_plan_schema_round_trips() {
        let json = r#"{
            "plan": {
                "breakfast": {"name": "Oatmeal", "description": "With berries", "calories": 320},
                "lunch": {"name": "Chicken Salad", "description": "Grilled", "calories": 450},
                "dinner": {"name": "Salmon Fillet", "description": "Baked", "calories": 520}
            },
            "totalCalories": 1290,
            "reason": "Balanced macros."
        }"#;
        let doc: MealPlanDoc = serde_json::from_str(json).unwrap();
        assert_eq!(doc.plan.breakfast.name, "Oatmeal");
        assert_eq!(doc.total_calories, 1290.0);
        assert!(doc.plan.dinner.suggestion.is_none());
        let out = serde_json::to_value(&doc).unwrap();
        assert_eq!(out["totalCalories"], 1290.0);
        assert!(out["plan"]["lunch"].get("suggestion").is_none());
    }
}

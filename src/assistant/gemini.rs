use super::InlinePayload;
use crate::errors::{AppError, AppResult};
use crate::models::AudioData;
use serde::{Deserialize, Serialize};

const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

pub const GUIDANCE_MODEL: &str = "gemini-3-flash-preview";
pub const IMAGE_MODEL: &str = "gemini-2.5-flash-image";

const GUIDANCE_TEMPERATURE: f32 = 0.2;

const SYSTEM_INSTRUCTION: &str = "\
Você é o ApoioVital, um assistente especializado em fornecer instruções de emergência \
para pessoas com deficiência ou necessidades especiais.
Seu tom deve ser CALMO, DIRETO e CLARO.
Use frases curtas.
Forneça instruções passo a passo.
Se a situação parecer uma emergência médica grave, comece SEMPRE dizendo para ligar \
para o 192 (SAMU) ou 193 (Bombeiros).
Adapte as orientações considerando que o usuário pode ter limitações físicas, \
sensoriais ou cognitivas.
Responda em Português do Brasil.";

const AUDIO_ONLY_PROMPT: &str = "Analise o áudio acima e forneça orientações de \
primeiros socorros imediatas para a situação descrita.";

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Part {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inline_data: Option<InlineData>,
}

impl Part {
    fn text(value: impl Into<String>) -> Self {
        Self {
            text: Some(value.into()),
            inline_data: None,
        }
    }

    fn inline(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            text: None,
            inline_data: Some(InlineData {
                mime_type: mime_type.into(),
                data: data.into(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_instruction: Option<Content>,
    pub contents: Vec<Content>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct GenerateContentResponse {
    #[serde(default)]
    pub candidates: Option<Vec<Candidate>>,
}

/// Thin client for the generative-AI backend. No retry policy lives here;
/// failures surface to the caller as recoverable external errors.
#[derive(Debug, Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    base_url: String,
}

impl Default for GeminiClient {
    fn default() -> Self {
        Self::new()
    }
}

impl GeminiClient {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL.to_string())
    }

    pub fn with_base_url(base_url: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Step-by-step guidance for a described (or recorded) emergency.
    pub async fn emergency_guidance(
        &self,
        api_key: &str,
        scenario: &str,
        audio: Option<&AudioData>,
    ) -> AppResult<String> {
        let request = build_guidance_request(scenario, audio)?;
        let response = self.generate(api_key, GUIDANCE_MODEL, &request).await?;
        first_text(&response).ok_or_else(|| AppError::External("Resposta vazia da IA".to_string()))
    }

    /// Edits an image according to `prompt`; `None` when the model returned
    /// no image part.
    pub async fn edit_image(
        &self,
        api_key: &str,
        image: &InlinePayload,
        prompt: &str,
    ) -> AppResult<Option<InlinePayload>> {
        let request = GenerateContentRequest {
            system_instruction: None,
            contents: vec![Content {
                parts: vec![
                    Part::inline(image.mime_type.clone(), image.data.clone()),
                    Part::text(prompt),
                ],
            }],
            generation_config: None,
        };
        let response = self.generate(api_key, IMAGE_MODEL, &request).await?;
        Ok(first_inline_image(&response))
    }

    async fn generate(
        &self,
        api_key: &str,
        model: &str,
        request: &GenerateContentRequest,
    ) -> AppResult<GenerateContentResponse> {
        let url = format!("{}/v1beta/models/{}:generateContent", self.base_url, model);
        let response = self
            .http
            .post(&url)
            .query(&[("key", api_key)])
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::warn!(model, %status, "generative AI request rejected");
            return Err(AppError::External(format!(
                "AI service request failed with status {status}"
            )));
        }

        Ok(response.json::<GenerateContentResponse>().await?)
    }
}

/// Builds the guidance request: inline audio first (when recorded), then the
/// typed scenario, falling back to a fixed analyse-the-audio prompt.
pub fn build_guidance_request(
    scenario: &str,
    audio: Option<&AudioData>,
) -> AppResult<GenerateContentRequest> {
    let mut parts = Vec::new();
    if let Some(audio) = audio {
        parts.push(Part::inline(audio.mime_type.clone(), audio.data.clone()));
    }
    if !scenario.trim().is_empty() {
        parts.push(Part::text(scenario));
    } else if audio.is_some() {
        parts.push(Part::text(AUDIO_ONLY_PROMPT));
    }
    if parts.is_empty() {
        return Err(AppError::Invalid(
            "guidance request needs a scenario or an audio recording".to_string(),
        ));
    }

    Ok(GenerateContentRequest {
        system_instruction: Some(Content {
            parts: vec![Part::text(SYSTEM_INSTRUCTION)],
        }),
        contents: vec![Content { parts }],
        generation_config: Some(GenerationConfig {
            temperature: GUIDANCE_TEMPERATURE,
        }),
    })
}

/// Joined text of the first candidate, `None` when the response is empty.
pub fn first_text(response: &GenerateContentResponse) -> Option<String> {
    let candidates = response.candidates.as_deref()?;
    let content = candidates.first()?.content.as_ref()?;
    let joined: String = content
        .parts
        .iter()
        .filter_map(|part| part.text.as_deref())
        .collect::<Vec<_>>()
        .join("");
    if joined.trim().is_empty() {
        None
    } else {
        Some(joined)
    }
}

/// First inline image of the first candidate, with a PNG fallback for a
/// missing media type.
pub fn first_inline_image(response: &GenerateContentResponse) -> Option<InlinePayload> {
    let candidates = response.candidates.as_deref()?;
    let content = candidates.first()?.content.as_ref()?;
    content.parts.iter().find_map(|part| {
        part.inline_data.as_ref().map(|inline| InlinePayload {
            mime_type: if inline.mime_type.is_empty() {
                "image/png".to_string()
            } else {
                inline.mime_type.clone()
            },
            data: inline.data.clone(),
        })
    })
}

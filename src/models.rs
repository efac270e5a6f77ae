use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyContact {
    pub id: String,
    pub name: String,
    pub phone: String,
    pub relation: String,
    pub is_primary: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

/// Contact as submitted by the form, before an id is assigned.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewContact {
    pub name: String,
    pub phone: String,
    pub relation: String,
    #[serde(default)]
    pub is_primary: bool,
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuideCategory {
    Saude,
    Mobilidade,
    Mental,
    Geral,
}

impl GuideCategory {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Saude => "saude",
            Self::Mobilidade => "mobilidade",
            Self::Mental => "mental",
            Self::Geral => "geral",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyInstruction {
    pub id: String,
    pub title: String,
    pub content: String,
    pub icon: String,
    pub category: GuideCategory,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AiQueryItem {
    pub id: String,
    pub query: String,
    pub response: String,
    /// Epoch milliseconds.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontSize {
    Normal,
    Large,
    Xl,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContrastMode {
    None,
    Dark,
    Light,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HapticIntensity {
    Low,
    Medium,
    High,
}

impl HapticIntensity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct AccessibilitySettings {
    pub font_size: FontSize,
    pub high_contrast: ContrastMode,
    pub animations: bool,
    pub haptic_feedback: bool,
    pub haptic_intensity: HapticIntensity,
}

impl Default for AccessibilitySettings {
    fn default() -> Self {
        Self {
            font_size: FontSize::Normal,
            high_contrast: ContrastMode::None,
            animations: true,
            haptic_feedback: true,
            haptic_intensity: HapticIntensity::Medium,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ContactSort {
    Primary,
    Name,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ContactQuery {
    pub search: Option<String>,
    pub sort: Option<ContactSort>,
}

/// Base64 payload captured by the webview recorder.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AudioData {
    pub data: String,
    pub mime_type: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AskAssistantPayload {
    #[serde(default)]
    pub prompt: String,
    pub audio: Option<AudioData>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditImagePayload {
    /// `data:<mime>;base64,<payload>` as produced by a FileReader.
    pub image_data_url: String,
    pub prompt: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditedImageResponse {
    pub image_data_url: Option<String>,
}

/// Platform request forwarded to the webview, which owns the actual
/// `tel:` / `sms:` / vibration APIs. Fire-and-forget.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum DeviceIntent {
    #[serde(rename_all = "camelCase")]
    Call { number: String },
    #[serde(rename_all = "camelCase")]
    SilentAlert { number: String, body: String },
    #[serde(rename_all = "camelCase")]
    Haptics { intensity: HapticIntensity },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanResponse {
    pub success: bool,
}

use std::env;

use serde::{Deserialize, Serialize};

fn default_api_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_lookup_model() -> String {
    "gemini-3-flash-preview".to_string()
}

fn default_check_model() -> String {
    "gemini-3-pro-preview".to_string()
}

fn default_chat_model() -> String {
    "gemini-3-pro-preview".to_string()
}

fn default_image_model() -> String {
    "gemini-2.5-flash-image".to_string()
}

fn default_speech_model() -> String {
    "gemini-2.5-flash-preview-tts".to_string()
}

fn default_voice() -> String {
    "Kore".to_string()
}

fn default_display_language() -> String {
    "English".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

#[derive(Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct GatewayConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default = "default_lookup_model")]
    pub lookup_model: String,
    #[serde(default = "default_check_model")]
    pub check_model: String,
    #[serde(default = "default_chat_model")]
    pub chat_model: String,
    #[serde(default = "default_image_model")]
    pub image_model: String,
    #[serde(default = "default_speech_model")]
    pub speech_model: String,
    /// Prebuilt voice used for speech synthesis
    #[serde(default = "default_voice")]
    pub voice: String,
    /// Language the tutor explains things in
    #[serde(default = "default_display_language")]
    pub display_language: String,
    /// Client-side timeout per remote call
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_url: default_api_url(),
            lookup_model: default_lookup_model(),
            check_model: default_check_model(),
            chat_model: default_chat_model(),
            image_model: default_image_model(),
            speech_model: default_speech_model(),
            voice: default_voice(),
            display_language: default_display_language(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl GatewayConfig {
    pub fn new() -> Self {
        let api_key = env::var("GEMINI_API_KEY")
            .or_else(|_| env::var("API_KEY"))
            .unwrap_or_default();

        let api_url = env::var("GEMINI_API_URL").unwrap_or_else(|_| default_api_url());

        let display_language =
            env::var("WORTSCHATZ_DISPLAY_LANGUAGE").unwrap_or_else(|_| default_display_language());

        let timeout_seconds = env::var("GATEWAY_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or_else(default_timeout_seconds);

        Self {
            api_key,
            api_url,
            display_language,
            timeout_seconds,
            ..Default::default()
        }
    }
}

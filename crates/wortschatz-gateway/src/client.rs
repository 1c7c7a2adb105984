use std::time::Duration;

use async_trait::async_trait;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde_json::json;
use wortschatz_config::gateway::GatewayConfig;
use wortschatz_types::{SentenceAnalysis, WordEntry};

use crate::preprocess::normalize_input;
use crate::session::ChatTurn;
use crate::wire::{
    Content, GenerateContentRequest, GenerateContentResponse, GenerationConfig, SpeechConfig,
};
use crate::{ChatError, CheckError, LookupError, TutorBackend};

/// HTTP client for the generative-AI tutor service.
#[derive(Clone)]
pub struct GeminiClient {
    http: reqwest::Client,
    config: GatewayConfig,
}

/// Shared failure shape of one `generateContent` round trip, mapped into
/// the per-operation error at each call site.
#[derive(Debug, thiserror::Error)]
enum ApiFailure {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("authentication failed")]
    Authentication,

    #[error("{0}")]
    Malformed(String),
}

impl From<ApiFailure> for LookupError {
    fn from(failure: ApiFailure) -> Self {
        match failure {
            ApiFailure::Network(e) => LookupError::Network(e),
            ApiFailure::Api(m) => LookupError::Api(m),
            ApiFailure::RateLimited => LookupError::RateLimited,
            ApiFailure::Authentication => LookupError::Authentication,
            ApiFailure::Malformed(m) => LookupError::MalformedResponse(m),
        }
    }
}

impl From<ApiFailure> for CheckError {
    fn from(failure: ApiFailure) -> Self {
        match failure {
            ApiFailure::Network(e) => CheckError::Network(e),
            ApiFailure::Api(m) => CheckError::Api(m),
            ApiFailure::RateLimited => CheckError::RateLimited,
            ApiFailure::Authentication => CheckError::Authentication,
            ApiFailure::Malformed(m) => CheckError::MalformedResponse(m),
        }
    }
}

impl From<ApiFailure> for ChatError {
    fn from(failure: ApiFailure) -> Self {
        match failure {
            ApiFailure::Network(e) => ChatError::Network(e),
            ApiFailure::Api(m) => ChatError::Api(m),
            ApiFailure::RateLimited => ChatError::RateLimited,
            ApiFailure::Authentication => ChatError::Authentication,
            ApiFailure::Malformed(m) => ChatError::MalformedResponse(m),
        }
    }
}

impl GeminiClient {
    pub fn new(config: GatewayConfig) -> Self {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("falling back to default HTTP client: {e}");
                reqwest::Client::new()
            });

        Self { http, config }
    }

    async fn generate(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse, ApiFailure> {
        let url = format!(
            "{}/models/{}:generateContent",
            self.config.api_url.trim_end_matches('/'),
            model
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.config.api_key)
            .json(request)
            .send()
            .await?;

        if response.status() == 429 {
            return Err(ApiFailure::RateLimited);
        }

        if response.status() == 401 || response.status() == 403 {
            return Err(ApiFailure::Authentication);
        }

        if !response.status().is_success() {
            return Err(ApiFailure::Api(format!("HTTP {}", response.status())));
        }

        response
            .json::<GenerateContentResponse>()
            .await
            .map_err(|e| ApiFailure::Malformed(format!("invalid response body: {e}")))
    }
}

#[async_trait]
impl TutorBackend for GeminiClient {
    async fn lookup_word(&self, term: &str) -> Result<WordEntry, LookupError> {
        let term = normalize_input(term);
        if term.is_empty() {
            return Err(LookupError::EmptyTerm);
        }

        let prompt = format!(
            "Analyze the German word \"{term}\". Include the article for nouns, the plural \
             or conjugated form, a synonym, and a simple example sentence. Use {lang} for \
             meaning_primary and all explanations, and English for meaning_secondary.",
            lang = self.config.display_language,
        );

        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(lookup_schema()),
                ..Default::default()
            }),
        };

        let response = self
            .generate(&self.config.lookup_model, &request)
            .await
            .map_err(LookupError::from)?;

        let text = response
            .first_text()
            .ok_or_else(|| LookupError::MalformedResponse("no text candidate".to_string()))?;

        parse_entry(text)
    }

    async fn check_sentence(&self, text: &str) -> Result<SentenceAnalysis, CheckError> {
        let text = normalize_input(text);
        if text.is_empty() {
            return Err(CheckError::EmptyText);
        }

        let prompt = format!(
            "Check this German sentence for grammar and logic: \"{text}\". Provide the \
             correction and the explanation in {lang}.",
            lang = self.config.display_language,
        );

        let request = GenerateContentRequest {
            contents: vec![Content::user_text(prompt)],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_mime_type: Some("application/json".to_string()),
                response_schema: Some(check_schema()),
                ..Default::default()
            }),
        };

        let response = self
            .generate(&self.config.check_model, &request)
            .await
            .map_err(CheckError::from)?;

        let text = response
            .first_text()
            .ok_or_else(|| CheckError::MalformedResponse("no text candidate".to_string()))?;

        parse_analysis(text)
    }

    async fn chat_turn(
        &self,
        instruction: &str,
        history: &[ChatTurn],
    ) -> Result<String, ChatError> {
        if history.is_empty() {
            return Err(ChatError::EmptyMessage);
        }

        let contents = history
            .iter()
            .map(|turn| Content {
                role: Some(turn.role.clone()),
                parts: vec![crate::wire::Part::text(turn.text.clone())],
            })
            .collect();

        let request = GenerateContentRequest {
            contents,
            system_instruction: Some(Content::plain_text(instruction)),
            generation_config: None,
        };

        let response = self
            .generate(&self.config.chat_model, &request)
            .await
            .map_err(ChatError::from)?;

        let reply = response
            .first_text()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ChatError::MalformedResponse("no reply text".to_string()))?;

        Ok(reply.to_string())
    }

    async fn synthesize_image(&self, prompt: &str) -> Option<Vec<u8>> {
        let prompt = normalize_input(prompt);
        if prompt.is_empty() {
            return None;
        }

        let request = GenerateContentRequest {
            contents: vec![Content::user_text(format!(
                "A high quality, clear educational illustration of: {prompt}"
            ))],
            system_instruction: None,
            generation_config: None,
        };

        let response = match self.generate(&self.config.image_model, &request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("image synthesis failed: {e}");
                return None;
            }
        };

        decode_inline_payload(&response, "image")
    }

    async fn synthesize_speech(&self, text: &str) -> Option<Vec<u8>> {
        let text = normalize_input(text);
        if text.is_empty() {
            return None;
        }

        let request = GenerateContentRequest {
            contents: vec![Content::user_text(format!("Say clearly in German: {text}"))],
            system_instruction: None,
            generation_config: Some(GenerationConfig {
                response_modalities: Some(vec!["AUDIO".to_string()]),
                speech_config: Some(SpeechConfig::prebuilt_voice(self.config.voice.clone())),
                ..Default::default()
            }),
        };

        let response = match self.generate(&self.config.speech_model, &request).await {
            Ok(response) => response,
            Err(e) => {
                tracing::debug!("speech synthesis failed: {e}");
                return None;
            }
        };

        decode_inline_payload(&response, "speech")
    }
}

fn decode_inline_payload(response: &GenerateContentResponse, kind: &str) -> Option<Vec<u8>> {
    let data = response.first_inline_data();
    let Some(data) = data else {
        tracing::debug!("{kind} response carried no inline data");
        return None;
    };

    match BASE64.decode(&data.data) {
        Ok(bytes) => Some(bytes),
        Err(e) => {
            tracing::debug!("undecodable {kind} payload: {e}");
            None
        }
    }
}

/// Response schema sent with every lookup request. `article` is the only
/// optional property.
fn lookup_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "word": { "type": "STRING" },
            "article": { "type": "STRING", "description": "der, die, or das; omit if not a noun" },
            "part_of_speech": { "type": "STRING", "description": "Noun, Verb, Adjective, etc." },
            "meaning_primary": { "type": "STRING" },
            "meaning_secondary": { "type": "STRING" },
            "plural_or_conjugation": { "type": "STRING" },
            "plural_or_conjugation_meaning": { "type": "STRING" },
            "synonym": { "type": "STRING" },
            "synonym_meaning": { "type": "STRING" },
            "example_sentence": { "type": "STRING" },
            "example_sentence_translated": { "type": "STRING" },
            "image_prompt": { "type": "STRING", "description": "prompt for an image generator representing this word" }
        },
        "required": [
            "word", "part_of_speech", "meaning_primary", "meaning_secondary",
            "plural_or_conjugation", "plural_or_conjugation_meaning",
            "synonym", "synonym_meaning",
            "example_sentence", "example_sentence_translated", "image_prompt"
        ]
    })
}

fn check_schema() -> serde_json::Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "is_correct": { "type": "BOOLEAN" },
            "corrected": { "type": "STRING" },
            "explanation": { "type": "STRING" },
            "meaning": { "type": "STRING" },
            "score": { "type": "NUMBER", "description": "accuracy score from 0 to 100" }
        },
        "required": ["is_correct", "corrected", "explanation", "meaning", "score"]
    })
}

/// Parse and validate the structured lookup payload. Partial responses are
/// a failure, not a partial result.
fn parse_entry(text: &str) -> Result<WordEntry, LookupError> {
    let entry: WordEntry =
        serde_json::from_str(text).map_err(|e| LookupError::MalformedResponse(e.to_string()))?;

    let required = [
        ("word", &entry.word),
        ("part_of_speech", &entry.part_of_speech),
        ("meaning_primary", &entry.meaning_primary),
        ("meaning_secondary", &entry.meaning_secondary),
        ("plural_or_conjugation", &entry.plural_or_conjugation),
        (
            "plural_or_conjugation_meaning",
            &entry.plural_or_conjugation_meaning,
        ),
        ("synonym", &entry.synonym),
        ("synonym_meaning", &entry.synonym_meaning),
        ("example_sentence", &entry.example_sentence),
        (
            "example_sentence_translated",
            &entry.example_sentence_translated,
        ),
        ("image_prompt", &entry.image_prompt),
    ];

    for (name, value) in required {
        if value.trim().is_empty() {
            return Err(LookupError::MalformedResponse(format!(
                "empty required field `{name}`"
            )));
        }
    }

    Ok(entry)
}

fn parse_analysis(text: &str) -> Result<SentenceAnalysis, CheckError> {
    let mut analysis: SentenceAnalysis =
        serde_json::from_str(text).map_err(|e| CheckError::MalformedResponse(e.to_string()))?;

    if analysis.corrected.trim().is_empty() {
        return Err(CheckError::MalformedResponse(
            "empty required field `corrected`".to_string(),
        ));
    }

    analysis.score = analysis.score.clamp(0.0, 100.0);
    Ok(analysis)
}

#[cfg(test)]
mod tests {
    use super::*;
    use wortschatz_types::Article;

    fn client() -> GeminiClient {
        // Dummy key and unroutable URL; tests below never get as far as I/O.
        GeminiClient::new(GatewayConfig {
            api_key: "test-key".to_string(),
            api_url: "http://127.0.0.1:1".to_string(),
            ..GatewayConfig::default()
        })
    }

    #[tokio::test]
    async fn empty_term_is_rejected_locally() {
        let err = client().lookup_word("   ").await.unwrap_err();
        assert!(matches!(err, LookupError::EmptyTerm));
    }

    #[tokio::test]
    async fn empty_sentence_is_rejected_locally() {
        let err = client().check_sentence("").await.unwrap_err();
        assert!(matches!(err, CheckError::EmptyText));

        let err = client().check_sentence(" \n ").await.unwrap_err();
        assert!(matches!(err, CheckError::EmptyText));
    }

    #[tokio::test]
    async fn empty_media_inputs_yield_none_without_io() {
        assert!(client().synthesize_image("").await.is_none());
        assert!(client().synthesize_speech("  ").await.is_none());
    }

    const FULL_ENTRY: &str = r#"{
        "word": "Haus",
        "article": "das",
        "part_of_speech": "Noun",
        "meaning_primary": "house",
        "meaning_secondary": "house",
        "plural_or_conjugation": "Häuser",
        "plural_or_conjugation_meaning": "houses",
        "synonym": "Gebäude",
        "synonym_meaning": "building",
        "example_sentence": "Das Haus ist groß.",
        "example_sentence_translated": "The house is big.",
        "image_prompt": "a cozy house"
    }"#;

    #[test]
    fn full_entry_parses() {
        let entry = parse_entry(FULL_ENTRY).unwrap();
        assert_eq!(entry.word, "Haus");
        assert_eq!(entry.article, Some(Article::Das));
    }

    #[test]
    fn missing_article_means_not_a_noun() {
        let without_article = FULL_ENTRY.replace(r#""article": "das","#, "");
        let entry = parse_entry(&without_article).unwrap();
        assert_eq!(entry.article, None);
    }

    #[test]
    fn missing_required_field_is_malformed() {
        let without_example = FULL_ENTRY.replace(r#""example_sentence": "Das Haus ist groß.","#, "");
        let err = parse_entry(&without_example).unwrap_err();
        assert!(matches!(err, LookupError::MalformedResponse(_)));
    }

    #[test]
    fn blank_required_field_is_malformed() {
        let blanked = FULL_ENTRY.replace(r#""synonym": "Gebäude""#, r#""synonym": "  ""#);
        let err = parse_entry(&blanked).unwrap_err();
        assert!(matches!(err, LookupError::MalformedResponse(_)));
    }

    #[test]
    fn unknown_article_is_malformed() {
        let bad = FULL_ENTRY.replace(r#""article": "das""#, r#""article": "les""#);
        let err = parse_entry(&bad).unwrap_err();
        assert!(matches!(err, LookupError::MalformedResponse(_)));
    }

    #[test]
    fn analysis_score_is_clamped() {
        let analysis = parse_analysis(
            r#"{"is_correct": false, "corrected": "Ich gehe nach Hause.",
                "explanation": "word order", "meaning": "I go home", "score": 240}"#,
        )
        .unwrap();
        assert_eq!(analysis.score, 100.0);

        let analysis = parse_analysis(
            r#"{"is_correct": true, "corrected": "Gut.",
                "explanation": "fine", "meaning": "good", "score": -3}"#,
        )
        .unwrap();
        assert_eq!(analysis.score, 0.0);
    }

    #[test]
    fn analysis_missing_field_is_malformed() {
        let err = parse_analysis(r#"{"is_correct": true, "corrected": "Gut."}"#).unwrap_err();
        assert!(matches!(err, CheckError::MalformedResponse(_)));
    }
}

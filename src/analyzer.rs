use std::time::Duration;

use base64::Engine;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::Config;
use crate::report::{AnalysisResult, SafetyLevel};
use crate::validator::UploadedVideo;

fn coach_prompt(language: &str) -> String {
    format!(
        r#"Analyze this video of a fitness exercise.
Act as a professional fitness coach and biomechanics expert.
Your task:
1. Identify the exercise.
2. Rate the execution technique on a scale from 1 to 10.
3. List what was done well.
4. Identify technique mistakes, if any.
5. Give clear, concrete recommendations to fix them.
6. Name the working muscle groups.
7. Rate the safety of the execution (Safe, Caution, Dangerous).

Answer in {language}."#
    )
}

/// Output contract handed to Gemini. Every field is required.
fn response_schema() -> serde_json::Value {
    let string_list = |description: &str| {
        serde_json::json!({
            "type": "ARRAY",
            "items": { "type": "STRING" },
            "description": description,
        })
    };
    let safety_levels: Vec<&str> = SafetyLevel::ALL.iter().map(|l| l.as_str()).collect();

    serde_json::json!({
        "type": "OBJECT",
        "properties": {
            "exerciseName": { "type": "STRING", "description": "Name of the exercise" },
            "score": { "type": "INTEGER", "description": "Technique score from 1 to 10" },
            "goodPoints": string_list("What was performed correctly"),
            "mistakes": string_list("Technique mistakes"),
            "recommendations": string_list("Concrete advice for improvement"),
            "muscleGroups": string_list("Muscle groups involved"),
            "safetyLevel": {
                "type": "STRING",
                "enum": safety_levels,
                "description": "Safety level of the execution",
            },
        },
        "required": [
            "exerciseName", "score", "goodPoints", "mistakes",
            "recommendations", "muscleGroups", "safetyLevel",
        ],
    })
}

/// Everything that can end an analysis attempt.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Gemini API key is missing")]
    MissingApiKey,

    #[error("could not read video: {0}")]
    Read(#[from] std::io::Error),

    #[error("request failed: {0}")]
    Transport(reqwest::Error),

    #[error("Gemini API error {status}: {body}")]
    Api { status: u16, body: String },

    #[error("empty response from model")]
    EmptyResponse,

    #[error("request blocked by model: {0}")]
    Blocked(String),

    #[error("malformed analysis: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("score {0} is outside 1-10")]
    ScoreOutOfRange(u8),
}

// The request URL is stripped so it never reaches logs or the error label.
impl From<reqwest::Error> for AnalysisError {
    fn from(e: reqwest::Error) -> Self {
        AnalysisError::Transport(e.without_url())
    }
}

/// Gemini request types
#[derive(Serialize)]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
#[serde(rename_all = "snake_case")]
enum Part {
    InlineData { mime_type: String, data: String },
    Text(String),
}

#[derive(Serialize)]
struct GenerationConfig {
    response_mime_type: &'static str,
    response_schema: serde_json::Value,
}

/// Gemini response types
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<Candidate>>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate.
    fn text(self) -> Result<String, AnalysisError> {
        let text = self
            .candidates
            .and_then(|c| c.into_iter().next())
            .and_then(|c| c.content)
            .map(|c| {
                c.parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if !text.trim().is_empty() {
            return Ok(text);
        }
        match self.prompt_feedback.and_then(|f| f.block_reason) {
            Some(reason) => Err(AnalysisError::Blocked(reason)),
            None => Err(AnalysisError::EmptyResponse),
        }
    }
}

/// Parse the model's JSON payload into a result, rejecting out-of-range scores.
pub fn parse_analysis(payload: &str) -> Result<AnalysisResult, AnalysisError> {
    let result: AnalysisResult = serde_json::from_str(payload.trim())?;
    if !(AnalysisResult::MIN_SCORE..=AnalysisResult::MAX_SCORE).contains(&result.score) {
        return Err(AnalysisError::ScoreOutOfRange(result.score));
    }
    Ok(result)
}

fn build_request(mime_type: &str, bytes: &[u8], language: &str) -> GeminiRequest {
    GeminiRequest {
        contents: vec![Content {
            parts: vec![
                Part::InlineData {
                    mime_type: mime_type.to_string(),
                    data: base64::engine::general_purpose::STANDARD.encode(bytes),
                },
                Part::Text(coach_prompt(language)),
            ],
        }],
        generation_config: GenerationConfig {
            response_mime_type: "application/json",
            response_schema: response_schema(),
        },
    }
}

/// Send one video to Gemini and return the structured critique.
/// Single attempt: no retry, no caching.
pub async fn analyze(
    config: &Config,
    video: &UploadedVideo,
) -> Result<AnalysisResult, AnalysisError> {
    let api_key = config.api_key().ok_or(AnalysisError::MissingApiKey)?;

    let bytes = tokio::fs::read(&video.path).await?;
    log::info!(
        "Sending {} ({:.1} MB, {}) to {}",
        video.display_name,
        video.size_mb(),
        video.mime_type,
        config.model
    );
    let url = format!(
        "{}/models/{}:generateContent",
        config.api_base.trim_end_matches('/'),
        config.model
    );
    let body = build_request(&video.mime_type, &bytes, &config.response_language);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .build()?;
    let resp = client
        .post(&url)
        .header("x-goog-api-key", api_key)
        .json(&body)
        .send()
        .await?;

    if !resp.status().is_success() {
        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        return Err(AnalysisError::Api { status, body });
    }

    let gemini_resp: GeminiResponse = resp.json().await?;
    let result = parse_analysis(&gemini_resp.text()?)?;
    log::info!("Analysis: {} scored {}/10", result.exercise_name, result.score);
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    const SQUAT: &str = r#"{"exerciseName":"Squat","score":7,"goodPoints":["Good depth"],"mistakes":["Knees cave in"],"recommendations":["Widen stance"],"muscleGroups":["Quadriceps","Glutes"],"safetyLevel":"Caution"}"#;
    const MODEL_PATH: &str = "/v1beta/models/gemini-2.5-flash:generateContent";

    fn config_for(server: &MockServer, key: &str) -> Config {
        Config {
            gemini_api_key: key.into(),
            api_base: server.url("/v1beta"),
            request_timeout_secs: 5,
            ..Config::default()
        }
    }

    fn clip(contents: &[u8]) -> (tempfile::NamedTempFile, UploadedVideo) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents).unwrap();
        let video = UploadedVideo::new(file.path(), "squat.mp4", "video/mp4", contents.len() as u64);
        (file, video)
    }

    fn candidate_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
        })
    }

    fn squat() -> AnalysisResult {
        AnalysisResult {
            exercise_name: "Squat".into(),
            score: 7,
            good_points: vec!["Good depth".into()],
            mistakes: vec!["Knees cave in".into()],
            recommendations: vec!["Widen stance".into()],
            muscle_groups: vec!["Quadriceps".into(), "Glutes".into()],
            safety_level: SafetyLevel::Caution,
        }
    }

    #[test]
    fn request_carries_video_prompt_and_schema() {
        let body = serde_json::to_value(build_request("video/mp4", b"fake-video", "English")).unwrap();
        let parts = &body["contents"][0]["parts"];

        assert_eq!(parts[0]["inline_data"]["mime_type"], "video/mp4");
        // base64 of "fake-video"
        assert_eq!(parts[0]["inline_data"]["data"], "ZmFrZS12aWRlbw==");
        assert!(parts[1]["text"].as_str().unwrap().contains("biomechanics"));

        let config = &body["generation_config"];
        assert_eq!(config["response_mime_type"], "application/json");
        let schema = &config["response_schema"];
        assert_eq!(
            schema["properties"]["safetyLevel"]["enum"],
            serde_json::json!(["Safe", "Caution", "Dangerous"])
        );
        assert_eq!(schema["required"].as_array().unwrap().len(), 7);
    }

    #[tokio::test]
    async fn posts_to_model_with_key() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path(MODEL_PATH)
                    .header("x-goog-api-key", "test-key");
                then.status(200).json_body(candidate_body(SQUAT));
            })
            .await;

        let (_file, video) = clip(b"fake-video");
        let result = analyze(&config_for(&server, "test-key"), &video).await.unwrap();

        mock.assert_async().await;
        assert_eq!(result, squat());
    }

    #[tokio::test]
    async fn joins_split_text_parts() {
        let server = MockServer::start_async().await;
        let (head, tail) = SQUAT.split_at(20);
        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(200).json_body(serde_json::json!({
                    "candidates": [{ "content": { "parts": [{ "text": head }, { "text": tail }] } }]
                }));
            })
            .await;

        let (_file, video) = clip(b"x");
        let result = analyze(&config_for(&server, "k"), &video).await.unwrap();
        assert_eq!(result, squat());
    }

    #[tokio::test]
    async fn missing_key_sends_nothing() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.any_request();
                then.status(200);
            })
            .await;

        let (_file, video) = clip(b"x");
        let err = analyze(&config_for(&server, ""), &video).await.unwrap_err();

        assert!(matches!(err, AnalysisError::MissingApiKey));
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn empty_text_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(200).json_body(candidate_body("  "));
            })
            .await;

        let (_file, video) = clip(b"x");
        let err = analyze(&config_for(&server, "k"), &video).await.unwrap_err();
        assert!(matches!(err, AnalysisError::EmptyResponse));
        assert_eq!(err.to_string(), "empty response from model");
    }

    #[tokio::test]
    async fn blocked_prompt_reports_reason() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(200)
                    .json_body(serde_json::json!({ "promptFeedback": { "blockReason": "SAFETY" } }));
            })
            .await;

        let (_file, video) = clip(b"x");
        let err = analyze(&config_for(&server, "k"), &video).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Blocked(ref r) if r == "SAFETY"));
    }

    #[tokio::test]
    async fn malformed_payload_is_an_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(200)
                    .json_body(candidate_body(r#"{"exerciseName":"Squat","score":7}"#));
            })
            .await;

        let (_file, video) = clip(b"x");
        let err = analyze(&config_for(&server, "k"), &video).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Parse(_)));
    }

    #[tokio::test]
    async fn api_error_keeps_status_and_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path(MODEL_PATH);
                then.status(403).body("API key not valid");
            })
            .await;

        let (_file, video) = clip(b"x");
        let err = analyze(&config_for(&server, "bad"), &video).await.unwrap_err();
        match err {
            AnalysisError::Api { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "API key not valid");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreadable_file_fails_before_request() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.any_request();
                then.status(200);
            })
            .await;

        let video = UploadedVideo::new("/nonexistent/clip.mp4", "clip.mp4", "video/mp4", 10);
        let err = analyze(&config_for(&server, "k"), &video).await.unwrap_err();

        assert!(matches!(err, AnalysisError::Read(_)));
        mock.assert_hits_async(0).await;
    }

    #[tokio::test]
    async fn unreachable_server_is_a_transport_error_without_the_key() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let config = Config {
            gemini_api_key: "SECRET-KEY-123".into(),
            api_base: format!("http://{addr}/v1beta"),
            request_timeout_secs: 5,
            ..Config::default()
        };
        let (_file, video) = clip(b"x");
        let err = analyze(&config, &video).await.unwrap_err();

        assert!(matches!(err, AnalysisError::Transport(_)), "{err:?}");
        let message = err.to_string();
        assert!(message.starts_with("request failed"), "{message}");
        assert!(!message.contains("SECRET-KEY-123"), "{message}");
        assert!(!format!("{err:?}").contains("SECRET-KEY-123"));
    }

    #[test]
    fn score_outside_range_is_rejected() {
        let zero = SQUAT.replace("\"score\":7", "\"score\":0");
        let eleven = SQUAT.replace("\"score\":7", "\"score\":11");
        assert!(matches!(parse_analysis(&zero), Err(AnalysisError::ScoreOutOfRange(0))));
        assert!(matches!(parse_analysis(&eleven), Err(AnalysisError::ScoreOutOfRange(11))));
        assert_eq!(parse_analysis(SQUAT).unwrap(), squat());
    }

    #[test]
    fn prompt_names_language() {
        assert!(coach_prompt("Russian").ends_with("Answer in Russian."));
    }
}

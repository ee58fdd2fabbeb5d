/// HTTP surface of the SEO assistant.
///
/// Five POST endpoints, each: validate the JSON body, fill a prompt
/// template, run it through the [`Generator`], shape the JSON reply.
/// Every piece of model text returned here has been through the markdown
/// cleaner already.
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::ApiError;
use crate::generation::{Generator, PromptRequest, PromptTemplate};
use crate::prompts;
use crate::score::{basic_seo_score, extract_score};

const MAX_RELATED_KEYWORDS: usize = 5;
const MAX_TITLES: usize = 3;

#[derive(Clone)]
pub struct AppState {
    generator: Generator,
}

impl AppState {
    pub fn new(generator: Generator) -> Self {
        Self { generator }
    }

    /// Generate and treat an empty cleaned reply as a failure too.
    async fn generate(
        &self,
        template: &PromptTemplate,
        request: &PromptRequest,
        failure: &'static str,
    ) -> Result<String, ApiError> {
        self.generator
            .generate(template, request)
            .await
            .filter(|text| !text.is_empty())
            .ok_or(ApiError::Generation(failure))
    }
}

pub fn router(state: AppState, cors_enabled: bool) -> Router {
    let app = Router::new()
        .route("/health", get(health))
        .route("/related_keywords", post(related_keywords))
        .route("/seo_titles", post(seo_titles))
        .route("/topic_ideas", post(topic_ideas))
        .route("/generate_content", post(generate_content))
        .route("/score_seo", post(score_seo))
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if cors_enabled {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

async fn health() -> &'static str {
    "OK"
}

// --- Request validation ---

fn parse_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| {
            ApiError::Validation(format!("invalid request body: {}", rejection.body_text()))
        })
}

/// Check that every named field is present and not blank.
///
/// All missing fields are reported in one message, e.g.
/// "topic and keyword are required". Returns the trimmed values in order.
fn require<'a, const N: usize>(
    fields: [(&'static str, Option<&'a str>); N],
) -> Result<[&'a str; N], ApiError> {
    let missing: Vec<&str> = fields
        .iter()
        .filter(|(_, value)| value.map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();

    if !missing.is_empty() {
        return Err(ApiError::Validation(missing_fields_message(&missing)));
    }
    Ok(fields.map(|(_, value)| value.unwrap_or_default().trim()))
}

fn missing_fields_message(missing: &[&str]) -> String {
    match missing {
        [] => String::new(),
        [one] => format!("{one} is required"),
        [init @ .., last] => format!("{} and {last} are required", init.join(", ")),
    }
}

fn split_lines(text: &str, max: usize) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .take(max)
        .map(str::to_string)
        .collect()
}

// --- Handlers ---

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RelatedKeywordsRequest {
    seed_keyword: Option<String>,
}

#[derive(Debug, Serialize)]
struct RelatedKeywordsResponse {
    related_keywords: Vec<String>,
}

async fn related_keywords(
    State(state): State<AppState>,
    payload: Result<Json<RelatedKeywordsRequest>, JsonRejection>,
) -> Result<Json<RelatedKeywordsResponse>, ApiError> {
    let body = parse_body(payload)?;
    let [seed_keyword] = require([("seed_keyword", body.seed_keyword.as_deref())])?;

    let text = state
        .generate(
            &prompts::RELATED_KEYWORDS,
            &PromptRequest::new().with("seed_keyword", seed_keyword),
            "Failed to generate related keywords",
        )
        .await?;

    Ok(Json(RelatedKeywordsResponse {
        related_keywords: split_lines(&text, MAX_RELATED_KEYWORDS),
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct SeoTitlesRequest {
    keyword: Option<String>,
}

#[derive(Debug, Serialize)]
struct SeoTitlesResponse {
    titles: Vec<String>,
}

async fn seo_titles(
    State(state): State<AppState>,
    payload: Result<Json<SeoTitlesRequest>, JsonRejection>,
) -> Result<Json<SeoTitlesResponse>, ApiError> {
    let body = parse_body(payload)?;
    let [keyword] = require([("keyword", body.keyword.as_deref())])?;

    let text = state
        .generate(
            &prompts::SEO_TITLES,
            &PromptRequest::new().with("keyword", keyword),
            "Failed to generate titles",
        )
        .await?;

    Ok(Json(SeoTitlesResponse {
        titles: split_lines(&text, MAX_TITLES),
    }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct TopicIdeasRequest {
    title: Option<String>,
}

#[derive(Debug, Serialize)]
struct TopicIdeasResponse {
    topic_ideas: String,
}

async fn topic_ideas(
    State(state): State<AppState>,
    payload: Result<Json<TopicIdeasRequest>, JsonRejection>,
) -> Result<Json<TopicIdeasResponse>, ApiError> {
    let body = parse_body(payload)?;
    let [title] = require([("title", body.title.as_deref())])?;

    let text = state
        .generate(
            &prompts::TOPIC_IDEAS,
            &PromptRequest::new().with("title", title),
            "Failed to generate topic ideas",
        )
        .await?;

    Ok(Json(TopicIdeasResponse { topic_ideas: text }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct GenerateContentRequest {
    topic: Option<String>,
    keyword: Option<String>,
}

#[derive(Debug, Serialize)]
struct GenerateContentResponse {
    content: String,
    seo_score: u8,
}

async fn generate_content(
    State(state): State<AppState>,
    payload: Result<Json<GenerateContentRequest>, JsonRejection>,
) -> Result<Json<GenerateContentResponse>, ApiError> {
    let body = parse_body(payload)?;
    let [topic, keyword] = require([
        ("topic", body.topic.as_deref()),
        ("keyword", body.keyword.as_deref()),
    ])?;

    let content = state
        .generate(
            &prompts::SHORT_CONTENT,
            &PromptRequest::new().with("topic", topic).with("keyword", keyword),
            "Failed to generate content",
        )
        .await?;

    let seo_score = basic_seo_score(&content, keyword);
    info!(keyword, seo_score, chars = content.len(), "content generated");
    Ok(Json(GenerateContentResponse { content, seo_score }))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ScoreSeoRequest {
    text: Option<String>,
    keyword: Option<String>,
}

#[derive(Debug, Serialize)]
struct ScoreSeoResponse {
    seo_score: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<&'static str>,
}

async fn score_seo(
    State(state): State<AppState>,
    payload: Result<Json<ScoreSeoRequest>, JsonRejection>,
) -> Result<Json<ScoreSeoResponse>, ApiError> {
    let body = parse_body(payload)?;
    let [text, keyword] = require([
        ("text", body.text.as_deref()),
        ("keyword", body.keyword.as_deref()),
    ])?;

    let reply = state
        .generate(
            &prompts::SEO_SCORE,
            &PromptRequest::new().with("keyword", keyword).with("text_content", text),
            "Failed to score SEO",
        )
        .await?;

    let score = extract_score(&reply, text, keyword);
    if score.used_fallback() {
        warn!(
            reason = ?score.fallback,
            reply = %reply,
            fallback_score = score.value,
            "model score unusable, used basic scoring"
        );
    }

    Ok(Json(ScoreSeoResponse {
        seo_score: score.value,
        warning: score.fallback.map(|reason| reason.warning()),
    }))
}

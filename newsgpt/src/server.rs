use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use rocket::form::{Form, FromForm};
use rocket::http::Status;
use rocket::response::content::RawHtml;
use rocket::serde::json::Json;
use rocket::{get, post, routes, Build, Rocket, State};
use serde::{Deserialize, Serialize};

use common::Config;

use crate::error::Error;
use crate::processing::{self, GateStage, SummarizeOutcome};

/// Application state stored inside Rocket managed state.
#[derive(Clone)]
pub struct AppState {
    pub started_at: DateTime<Utc>,
    pub config: Arc<Config>,
}

/// Fields of the shell page. Both buttons submit the same form.
#[derive(Debug, FromForm)]
struct ShellForm {
    url: String,
    summary: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NoticeKind {
    Success,
    Warning,
    Error,
}

/// What the page shows after an action
#[derive(Debug, Default)]
struct PageView {
    url: String,
    summary: String,
    notice: Option<(NoticeKind, String)>,
}

const TOO_SHORT_MESSAGE: &str = "Article is too short";
const PUBLISHED_MESSAGE: &str = "Published to Mastodon!";

#[get("/")]
async fn index() -> RawHtml<String> {
    RawHtml(render_page(&PageView::default()))
}

#[get("/health")]
async fn health() -> &'static str {
    "OK"
}

/// Response structure for `/api/v1/status`.
#[derive(Serialize)]
struct StatusResponse {
    status: &'static str,
    uptime_seconds: i64,
    translation_configured: bool,
    llm_configured: bool,
    mastodon_configured: bool,
    max_post_length: usize,
}

/// Status endpoint reporting uptime and which collaborators have credentials.
#[get("/api/v1/status")]
async fn status(state: &State<AppState>) -> Json<StatusResponse> {
    let cfg = &state.config;
    Json(StatusResponse {
        status: "ok",
        uptime_seconds: (Utc::now() - state.started_at).num_seconds(),
        translation_configured: cfg.translation.api_key.is_some(),
        llm_configured: cfg.llm.api_key.is_some(),
        mastodon_configured: cfg.mastodon.api_url.is_some() && cfg.mastodon.api_key.is_some(),
        max_post_length: cfg.post.max_length,
    })
}

/// "Summarize Article" button
#[post("/summarize", data = "<form>")]
async fn summarize(state: &State<AppState>, form: Form<ShellForm>) -> RawHtml<String> {
    let form = form.into_inner();
    let mut view = PageView {
        url: form.url.clone(),
        ..PageView::default()
    };

    match processing::summarize_article(&state.config, &form.url).await {
        Ok(SummarizeOutcome::Summarized { summary, .. }) => view.summary = summary.text,
        Ok(SummarizeOutcome::TooShort(_)) => {
            view.notice = Some((NoticeKind::Warning, TOO_SHORT_MESSAGE.to_string()));
        }
        Err(e) => {
            tracing::warn!("server: summarize failed for {}: {}", form.url, e);
            view.notice = Some((NoticeKind::Error, e.to_string()));
        }
    }

    RawHtml(render_page(&view))
}

/// "Publish to Mastodon" button, publishes the summary currently in the text area
#[post("/publish", data = "<form>")]
async fn publish(state: &State<AppState>, form: Form<ShellForm>) -> RawHtml<String> {
    let form = form.into_inner();
    let summary = form.summary.unwrap_or_default();
    let mut view = PageView {
        url: form.url.clone(),
        summary: summary.clone(),
        notice: None,
    };

    match processing::publish_summary(&state.config, &summary, &form.url).await {
        Ok(_) => view.notice = Some((NoticeKind::Success, PUBLISHED_MESSAGE.to_string())),
        Err(e) => {
            tracing::warn!("server: publish failed for {}: {}", form.url, e);
            view.notice = Some((NoticeKind::Error, e.to_string()));
        }
    }

    RawHtml(render_page(&view))
}

/// Request body for the JSON summarize endpoint.
#[derive(Deserialize)]
struct SummarizeRequest {
    url: String,
}

/// Request body for the JSON publish endpoint.
#[derive(Deserialize)]
struct PublishRequest {
    url: String,
    summary: String,
}

#[derive(Serialize)]
struct SummarizeResponse {
    title: String,
    translated_title: String,
    summary: String,
    log_file: String,
}

#[derive(Serialize)]
struct PublishResponse {
    status: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: &'static str,
    message: String,
}

type ApiResult<T> = std::result::Result<Json<T>, (Status, Json<ErrorResponse>)>;

fn api_error(err: Error) -> (Status, Json<ErrorResponse>) {
    let status = match &err {
        Error::InvalidUrl(_) | Error::EmptySummary => Status::BadRequest,
        Error::Configuration(_) => Status::ServiceUnavailable,
        Error::Fetch(_)
        | Error::Parse(_)
        | Error::Translation(_)
        | Error::Summarization(_)
        | Error::Publish(_) => Status::BadGateway,
        Error::Io(_) => Status::InternalServerError,
    };
    tracing::warn!("server: api request failed: {}", err);
    (
        status,
        Json(ErrorResponse {
            error: err.kind(),
            message: err.to_string(),
        }),
    )
}

#[post("/api/v1/summarize", format = "json", data = "<body>")]
async fn api_summarize(
    state: &State<AppState>,
    body: Json<SummarizeRequest>,
) -> ApiResult<SummarizeResponse> {
    match processing::summarize_article(&state.config, &body.url).await {
        Ok(SummarizeOutcome::Summarized {
            article,
            translated,
            summary,
        }) => Ok(Json(SummarizeResponse {
            title: article.title,
            translated_title: translated.title,
            summary: summary.text,
            log_file: summary.log_path.display().to_string(),
        })),
        Ok(SummarizeOutcome::TooShort(stage)) => {
            let which = match stage {
                GateStage::Source => "source",
                GateStage::Translated => "translated",
            };
            Err((
                Status::UnprocessableEntity,
                Json(ErrorResponse {
                    error: "too_short",
                    message: format!("{TOO_SHORT_MESSAGE} ({which})"),
                }),
            ))
        }
        Err(e) => Err(api_error(e)),
    }
}

#[post("/api/v1/publish", format = "json", data = "<body>")]
async fn api_publish(state: &State<AppState>, body: Json<PublishRequest>) -> ApiResult<PublishResponse> {
    processing::publish_summary(&state.config, &body.summary, &body.url)
        .await
        .map(|post| Json(PublishResponse { status: post.text() }))
        .map_err(api_error)
}

fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn render_page(view: &PageView) -> String {
    let notice = match &view.notice {
        Some((kind, message)) => {
            let class = match kind {
                NoticeKind::Success => "success",
                NoticeKind::Warning => "warning",
                NoticeKind::Error => "error",
            };
            format!(
                "<p class=\"notice {}\">{}</p>\n",
                class,
                escape_html(message)
            )
        }
        None => String::new(),
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="zh">
<head>
<meta charset="utf-8">
<title>NewsGPT-ZH</title>
<style>
body {{ font-family: sans-serif; max-width: 48rem; margin: 2rem auto; }}
input, textarea {{ width: 100%; box-sizing: border-box; }}
textarea {{ min-height: 14rem; }}
.notice {{ padding: .5rem; }}
.success {{ background: #e6f4ea; }}
.warning {{ background: #fef7e0; }}
.error {{ background: #fce8e6; }}
</style>
</head>
<body>
<h1>NewsGPT-ZH</h1>
<p>Translate, summarize, and publish news articles using DeepL and OpenAI GPT</p>
{notice}<form method="post" action="/summarize">
<label for="url">Enter the URL of the news article:</label>
<input id="url" name="url" type="text" value="{url}">
<label for="summary">Summary</label>
<textarea id="summary" name="summary">{summary}</textarea>
<button type="submit" formaction="/summarize">Summarize Article</button>
<button type="submit" formaction="/publish">Publish to Mastodon</button>
</form>
</body>
</html>
"#,
        notice = notice,
        url = escape_html(&view.url),
        summary = escape_html(&view.summary),
    )
}

/// Build the Rocket instance with the shell routes, bound to `[server]` from config.
pub fn build_rocket(config: Arc<Config>) -> Rocket<Build> {
    let fig = rocket::Config::figment()
        .merge(("address", config.server.bind.clone()))
        .merge(("port", config.server.port));

    let state = AppState {
        started_at: Utc::now(),
        config,
    };

    rocket::custom(fig).manage(state).mount(
        "/",
        routes![index, health, status, summarize, publish, api_summarize, api_publish],
    )
}

pub async fn launch_rocket(config: Arc<Config>) -> Result<()> {
    tracing::info!(
        "Starting Rocket HTTP server on {}:{}",
        config.server.bind,
        config.server.port
    );
    build_rocket(config)
        .launch()
        .await
        .map_err(|e| anyhow!("Rocket failed: {}", e))?;

    tracing::info!("Rocket HTTP server has shut down");
    Ok(())
}

use std::sync::{Arc, Mutex};

use mockito::{Matcher, Mock, Server};
use newsgpt::error::{Error, Result};
use newsgpt::llm::remote::RemoteLlmProvider;
use newsgpt::llm::summarizer::Summarizer;
use newsgpt::processing::{GateStage, PublishPipeline, SummarizeOutcome, SummarizePipeline};
use newsgpt::publish::Publisher;
use newsgpt::scraping::ArticleExtractor;
use newsgpt::storage::SummaryLog;
use newsgpt::translation::deepl::DeepLTranslator;

const TITLE: &str = "Scientists discover a new species of deep sea fish";
const PARAGRAPH: &str = "The fish was found at a depth of eight thousand metres in the Pacific Ocean.";

const ZH_TITLE: &str = "科学家发现一种新的深海鱼类物种";
const SUMMARY: &str = "科学家在太平洋八千米深处发现了一种新的深海鱼类。";

fn page(paragraphs: &[&str]) -> String {
    let body: String = paragraphs.iter().map(|p| format!("<p>{p}</p>")).collect();
    format!("<html><body><h1>{TITLE}</h1><article>{body}</article></body></html>")
}

fn zh_content() -> String {
    "在太平洋八千米深处发现了这种鱼，研究人员表示它能够承受极端的压力。".repeat(4)
}

async fn mock_page(server: &mut Server, html: String) -> Mock {
    server
        .mock("GET", "/news/fish")
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body(html)
        .create_async()
        .await
}

async fn mock_translation(server: &mut Server, source: &str, target: &str) -> Mock {
    server
        .mock("POST", "/v2/translate")
        .match_body(Matcher::UrlEncoded("text".into(), source.into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(serde_json::json!({ "translations": [{ "text": target }] }).to_string())
        .create_async()
        .await
}

fn pipeline(server: &Server, log_dir: &std::path::Path) -> SummarizePipeline {
    let extractor = ArticleExtractor::new(common::DEFAULT_USER_AGENT, 5).unwrap();
    let translator = DeepLTranslator::new(
        Some("key"),
        Some(&format!("{}/v2/translate", server.url())),
        5,
    )
    .unwrap();
    let provider = RemoteLlmProvider::new(
        format!("{}/v1/chat/completions", server.url()),
        "sk-test",
        "gpt-3.5-turbo",
    )
    .unwrap()
    .with_defaults(5, None, None);

    SummarizePipeline::new(
        extractor,
        Arc::new(translator),
        Summarizer::new(Arc::new(provider), SummaryLog::new(log_dir)),
        "ZH",
    )
}

#[tokio::test]
async fn summarizes_a_full_article() {
    let mut server = Server::new_async().await;
    let paragraphs = [PARAGRAPH, PARAGRAPH];
    let content = paragraphs.concat();

    let _page = mock_page(&mut server, page(&paragraphs)).await;
    let _title = mock_translation(&mut server, TITLE, ZH_TITLE).await;
    let _content = mock_translation(&mut server, &content, &zh_content()).await;
    let completion = server
        .mock("POST", "/v1/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::Regex(
            "Scientists discover a new species of deep sea fish".to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            serde_json::json!({
                "choices": [{ "message": { "role": "assistant", "content": SUMMARY } }],
                "usage": { "prompt_tokens": 120, "completion_tokens": 40, "total_tokens": 160 }
            })
            .to_string(),
        )
        .create_async()
        .await;

    let logs = tempfile::tempdir().unwrap();
    let outcome = pipeline(&server, logs.path())
        .run(&format!("{}/news/fish", server.url()))
        .await
        .unwrap();

    match outcome {
        SummarizeOutcome::Summarized {
            article,
            translated,
            summary,
        } => {
            assert_eq!(article.title, TITLE);
            assert_eq!(article.content, content);
            assert_eq!(translated.title, ZH_TITLE);
            assert_eq!(summary.text, SUMMARY);
            assert_eq!(summary.usage.total_tokens, 160);
            assert!(summary.log_path.starts_with(logs.path()));
            assert_eq!(std::fs::read_to_string(&summary.log_path).unwrap(), SUMMARY);
        }
        other => panic!("expected a summary, got {other:?}"),
    }

    completion.assert_async().await;
}

#[tokio::test]
async fn short_translation_stops_before_the_model() {
    let mut server = Server::new_async().await;
    let paragraphs = [PARAGRAPH, PARAGRAPH];

    let _page = mock_page(&mut server, page(&paragraphs)).await;
    let _title = mock_translation(&mut server, TITLE, ZH_TITLE).await;
    let _content = mock_translation(&mut server, &paragraphs.concat(), "太短了。").await;
    let completion = server
        .mock("POST", "/v1/chat/completions")
        .expect(0)
        .create_async()
        .await;

    let logs = tempfile::tempdir().unwrap();
    let outcome = pipeline(&server, logs.path())
        .run(&format!("{}/news/fish", server.url()))
        .await
        .unwrap();

    assert!(matches!(outcome, SummarizeOutcome::TooShort(GateStage::Translated)));
    completion.assert_async().await;
    assert!(std::fs::read_dir(logs.path()).unwrap().next().is_none());
}

#[tokio::test]
async fn short_source_stops_before_the_model() {
    let mut server = Server::new_async().await;
    let paragraphs = ["Too short to brief."];

    let _page = mock_page(&mut server, page(&paragraphs)).await;
    let _title = mock_translation(&mut server, TITLE, ZH_TITLE).await;
    let _content = mock_translation(&mut server, paragraphs[0], &zh_content()).await;
    let completion = server
        .mock("POST", "/v1/chat/completions")
        .expect(0)
        .create_async()
        .await;

    let logs = tempfile::tempdir().unwrap();
    let outcome = pipeline(&server, logs.path())
        .run(&format!("{}/news/fish", server.url()))
        .await
        .unwrap();

    assert!(matches!(outcome, SummarizeOutcome::TooShort(GateStage::Source)));
    completion.assert_async().await;
}

#[tokio::test]
async fn translation_failure_ends_the_run() {
    let mut server = Server::new_async().await;
    let _page = mock_page(&mut server, page(&[PARAGRAPH, PARAGRAPH])).await;
    let _deepl = server
        .mock("POST", "/v2/translate")
        .with_status(403)
        .with_body("Forbidden")
        .create_async()
        .await;

    let logs = tempfile::tempdir().unwrap();
    let err = pipeline(&server, logs.path())
        .run(&format!("{}/news/fish", server.url()))
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Translation(_)));
}

#[tokio::test]
async fn invalid_url_makes_no_requests() {
    let server = Server::new_async().await;
    let logs = tempfile::tempdir().unwrap();

    let err = pipeline(&server, logs.path()).run("ftp://example.com").await.unwrap_err();
    assert!(matches!(err, Error::InvalidUrl(_)));
}

/// Collects published statuses instead of sending them anywhere.
#[derive(Default)]
struct RecordingPublisher {
    statuses: Mutex<Vec<String>>,
}

#[async_trait::async_trait]
impl Publisher for RecordingPublisher {
    async fn publish(&self, status: &str) -> Result<()> {
        self.statuses.lock().unwrap().push(status.to_string());
        Ok(())
    }
}

#[tokio::test]
async fn publish_pipeline_bounds_the_post() {
    let recorder = Arc::new(RecordingPublisher::default());
    let pipeline = PublishPipeline::new(recorder.clone(), 30);

    let url = "https://x.io/a";
    let post = pipeline.run(&"新".repeat(50), url).await.unwrap();

    assert_eq!(post.url, url);
    assert_eq!(post.body, format!("{}...", "新".repeat(13)));
    assert_eq!(
        recorder.statuses.lock().unwrap().as_slice(),
        [format!("{}...\n{}", "新".repeat(13), url)]
    );
}

#[tokio::test]
async fn publish_pipeline_rejects_empty_summary() {
    let recorder = Arc::new(RecordingPublisher::default());
    let pipeline = PublishPipeline::new(recorder.clone(), 2000);

    let err = pipeline.run("  \n", "https://example.com/a").await.unwrap_err();
    assert!(matches!(err, Error::EmptySummary));
    assert!(recorder.statuses.lock().unwrap().is_empty());
}

use mockito::Matcher;
use newsgpt::article::Article;
use newsgpt::error::Error;
use newsgpt::translation::deepl::DeepLTranslator;
use newsgpt::translation::{translate_article, Translator};

fn translator(server: &mockito::Server) -> DeepLTranslator {
    let endpoint = format!("{}/v2/translate", server.url());
    DeepLTranslator::new(Some("test-key:fx"), Some(&endpoint), 5).unwrap()
}

#[tokio::test]
async fn sends_form_request_with_auth_key() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v2/translate")
        .match_header("authorization", "DeepL-Auth-Key test-key:fx")
        .match_header(
            "content-type",
            Matcher::Regex("application/x-www-form-urlencoded".to_string()),
        )
        .match_body(Matcher::AllOf(vec![
            Matcher::UrlEncoded("text".into(), "Hello world".into()),
            Matcher::UrlEncoded("target_lang".into(), "ZH".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"translations":[{"detected_source_language":"EN","text":"你好，世界"}]}"#)
        .create_async()
        .await;

    let text = translator(&server).translate("Hello world", "ZH").await.unwrap();
    assert_eq!(text, "你好，世界");

    mock.assert_async().await;
}

#[tokio::test]
async fn error_status_is_a_translation_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v2/translate")
        .with_status(456)
        .with_body(r#"{"message":"Quota exceeded"}"#)
        .create_async()
        .await;

    let err = translator(&server).translate("Hello", "ZH").await.unwrap_err();
    assert!(matches!(err, Error::Translation(_)));
    assert!(err.to_string().contains("456"));
    assert!(err.to_string().contains("Quota exceeded"));
}

#[tokio::test]
async fn empty_translation_list_is_an_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v2/translate")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"translations":[]}"#)
        .create_async()
        .await;

    let err = translator(&server).translate("Hello", "ZH").await.unwrap_err();
    assert!(err.to_string().contains("no translations"));
}

#[tokio::test]
async fn translates_title_and_content_separately() {
    let mut server = mockito::Server::new_async().await;
    let title = server
        .mock("POST", "/v2/translate")
        .match_body(Matcher::UrlEncoded("text".into(), "Big news today".into()))
        .with_status(200)
        .with_body(r#"{"translations":[{"text":"今天的大新闻"}]}"#)
        .create_async()
        .await;
    let content = server
        .mock("POST", "/v2/translate")
        .match_body(Matcher::UrlEncoded(
            "text".into(),
            "Something happened.".into(),
        ))
        .with_status(200)
        .with_body(r#"{"translations":[{"text":"发生了一些事情。"}]}"#)
        .create_async()
        .await;

    let article = Article::new("Big news today", "Something happened.");
    let translated = translate_article(&translator(&server), &article, "ZH")
        .await
        .unwrap();

    assert_eq!(translated.title, "今天的大新闻");
    assert_eq!(translated.content, "发生了一些事情。");

    title.assert_async().await;
    content.assert_async().await;
}

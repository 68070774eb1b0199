use std::time::Duration;

use listing_engine::{
    AskSuggestionBody, DeclineBody, FailureKind, HistoryBody, HistoryEntry, RemoteService,
    ReqwestService, ServiceSettings, SubmitBody, SuggestionId,
};
use pretty_assertions::assert_eq;
use serde_json::json;
use url::Url;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn endpoint(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), route)).unwrap()
}

fn service() -> ReqwestService {
    ReqwestService::new(ServiceSettings::default()).unwrap()
}

#[tokio::test]
async fn ask_suggestion_posts_product_keywords_and_prompt_type() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask/"))
        .and(header("content-type", "application/json"))
        .and(body_json(json!({
            "id": "p-1",
            "name": "Red Shoes",
            "keywords": ["running", "red"],
            "prompt_type": "description"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "Comfortable Red Running Shoes",
            "suggestion_id": 42
        })))
        .expect(1)
        .mount(&server)
        .await;

    let body = AskSuggestionBody {
        product: json!({"id": "p-1", "name": "Red Shoes"})
            .as_object()
            .unwrap()
            .clone(),
        keywords: vec!["running".into(), "red".into()],
        prompt_type: "description".into(),
    };
    let reply = service()
        .ask_suggestion(&endpoint(&server, "/ask/"), &body)
        .await
        .expect("suggestion");

    assert_eq!(reply.answer, "Comfortable Red Running Shoes");
    assert_eq!(reply.suggestion_id, SuggestionId::Number(42));
}

#[tokio::test]
async fn submit_returns_the_persisted_value() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit/"))
        .and(body_json(json!({
            "product_id": "p-1",
            "prompt_type": "seo_title",
            "new_value": "New",
            "suggestion_id": "abc"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"new_value": "New"})))
        .mount(&server)
        .await;

    let body = SubmitBody {
        product_id: "p-1".into(),
        prompt_type: "seo_title".into(),
        new_value: "New".into(),
        suggestion_id: Some(SuggestionId::Text("abc".into())),
    };
    let reply = service()
        .submit(&endpoint(&server, "/submit/"), &body)
        .await
        .expect("submit");
    assert_eq!(reply.new_value, "New");
}

#[tokio::test]
async fn decline_ignores_the_reply_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/decline/"))
        .and(body_json(json!({"suggestion_id": 42})))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;

    let body = DeclineBody {
        suggestion_id: SuggestionId::Number(42),
    };
    service()
        .decline(&endpoint(&server, "/decline/"), &body)
        .await
        .expect("decline");
}

#[tokio::test]
async fn history_entries_keep_server_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/history/"))
        .and(body_json(json!({"prompt_type": "title", "product_id": "9"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"answer_text": "Second", "keywords_str": "a, b"},
            {"answer_text": "First"}
        ])))
        .mount(&server)
        .await;

    let body = HistoryBody {
        prompt_type: "title".into(),
        product_id: "9".into(),
    };
    let entries = service()
        .history(&endpoint(&server, "/history/"), &body)
        .await
        .expect("history");

    assert_eq!(
        entries,
        vec![
            HistoryEntry {
                answer_text: "Second".into(),
                keywords_str: Some("a, b".into()),
            },
            HistoryEntry {
                answer_text: "First".into(),
                keywords_str: None,
            },
        ]
    );
}

#[tokio::test]
async fn non_success_status_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/submit/"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let body = SubmitBody {
        product_id: "1".into(),
        prompt_type: "title".into(),
        new_value: "x".into(),
        suggestion_id: None,
    };
    let err = service()
        .submit(&endpoint(&server, "/submit/"), &body)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::HttpStatus(503));
}

#[tokio::test]
async fn unexpected_payload_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/ask/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"description": "old shape"})))
        .mount(&server)
        .await;

    let body = AskSuggestionBody {
        product: serde_json::Map::new(),
        keywords: Vec::new(),
        prompt_type: "title".into(),
    };
    let err = service()
        .ask_suggestion(&endpoint(&server, "/ask/"), &body)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::MalformedResponse);
}

#[tokio::test]
async fn slow_backend_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/slow/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_delay(Duration::from_millis(250))
                .set_body_json(json!({"new_value": "late"})),
        )
        .mount(&server)
        .await;

    let service = ReqwestService::new(ServiceSettings {
        request_timeout: Duration::from_millis(50),
        ..ServiceSettings::default()
    })
    .unwrap();
    let body = SubmitBody {
        product_id: "1".into(),
        prompt_type: "title".into(),
        new_value: "x".into(),
        suggestion_id: None,
    };
    let err = service
        .submit(&endpoint(&server, "/slow/"), &body)
        .await
        .unwrap_err();
    assert_eq!(err.kind, FailureKind::Timeout);
}

#[tokio::test]
async fn non_http_urls_are_rejected_without_a_call() {
    let body = DeclineBody {
        suggestion_id: SuggestionId::Number(1),
    };
    let url = Url::parse("ftp://example.com/decline/").unwrap();
    let err = service().decline(&url, &body).await.unwrap_err();
    assert_eq!(err.kind, FailureKind::InvalidUrl);
}

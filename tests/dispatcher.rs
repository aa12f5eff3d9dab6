use std::collections::HashMap;

use fluximg::{CommandOutcome, FluxDispatcher, FluxError};
use httpmock::{
    Method::{GET, POST},
    MockServer,
};
use serde_json::json;

const PNG_BYTES: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDRfake-image-payload";
const API_KEY: &str = "sk-test";

fn credentials(endpoint: &str, default_model: &str) -> HashMap<String, String> {
    [
        ("model", default_model),
        ("size", "1024x1024"),
        ("endpoint", endpoint),
        ("key", API_KEY),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

async fn dispatcher(server: &MockServer, default_model: &str) -> FluxDispatcher {
    FluxDispatcher::start(&credentials(&server.base_url(), default_model))
        .await
        .expect("dispatcher should start")
}

fn image_url_body(server: &MockServer) -> String {
    json!({
        "created": 1_700_000_000,
        "data": [{ "url": server.url("/files/generated.png") }]
    })
    .to_string()
}

#[tokio::test]
async fn generates_image_with_mapped_model_and_explicit_size() {
    let server = MockServer::start_async().await;
    let generate_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/images/generations")
                .header("authorization", "Bearer sk-test")
                .json_body(json!({
                    "prompt": "a red fox in snow",
                    "n": 1,
                    "size": "512x768",
                    "response_format": "url",
                    "model": "sdxl-lightning-4step"
                }));
            then.status(200)
                .header("content-type", "application/json")
                .body(image_url_body(&server));
        })
        .await;
    let image_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/files/generated.png");
            then.status(200)
                .header("content-type", "image/png")
                .body(PNG_BYTES);
        })
        .await;

    let dispatcher = dispatcher(&server, "base").await;
    let outcome = dispatcher
        .handle_command("a red fox --model=sdxl in snow --size=512x768")
        .await
        .unwrap();

    generate_mock.assert_async().await;
    image_mock.assert_async().await;

    let reply = outcome.into_reply();
    let attachment = reply.attachment.expect("attachment");
    assert_eq!(attachment.data.as_ref(), PNG_BYTES);
    assert_eq!(attachment.filename, "a_red_fox_in_snow.png");
    assert_eq!(
        reply.embed_description.as_deref(),
        Some("Prompt: a red fox in snow; Model: sdxl;")
    );
    assert!(reply.content.is_none());
}

#[tokio::test]
async fn falls_back_to_configured_model_and_size() {
    let server = MockServer::start_async().await;
    let generate_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/images/generations")
                .json_body(json!({
                    "prompt": "lighthouse",
                    "n": 1,
                    "size": "1024x1024",
                    "response_format": "url",
                    "model": "flux-anime"
                }));
            then.status(200)
                .header("content-type", "application/json")
                .body(image_url_body(&server));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/files/generated.png");
            then.status(200).body(PNG_BYTES);
        })
        .await;

    let dispatcher = dispatcher(&server, "anime").await;
    let reply = dispatcher
        .handle_command("lighthouse")
        .await
        .unwrap()
        .into_reply();

    generate_mock.assert_async().await;
    assert_eq!(
        reply.embed_description.as_deref(),
        Some("Prompt: lighthouse; Model: anime;")
    );
}

#[tokio::test]
async fn alias_lookup_ignores_case() {
    let server = MockServer::start_async().await;
    let generate_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/images/generations")
                .json_body_includes(json!({ "model": "flux.1.1-pro-ultra" }).to_string());
            then.status(200)
                .header("content-type", "application/json")
                .body(image_url_body(&server));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/files/generated.png");
            then.status(200).body(PNG_BYTES);
        })
        .await;

    let dispatcher = dispatcher(&server, "base").await;
    let outcome = dispatcher.handle_command("castle --model=PRO").await.unwrap();

    generate_mock.assert_async().await;
    assert!(outcome.is_success());
}

#[tokio::test]
async fn empty_explicit_size_uses_configured_default() {
    let server = MockServer::start_async().await;
    let generate_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/images/generations")
                .json_body(json!({
                    "prompt": "harbor",
                    "n": 1,
                    "size": "1024x1024",
                    "response_format": "url",
                    "model": "flux-anime"
                }));
            then.status(200)
                .header("content-type", "application/json")
                .body(image_url_body(&server));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/files/generated.png");
            then.status(200).body(PNG_BYTES);
        })
        .await;

    let dispatcher = dispatcher(&server, "anime").await;
    let image = dispatcher
        .generate_image("harbor", None, Some(""))
        .await
        .unwrap();

    generate_mock.assert_async().await;
    assert_eq!(image.as_ref(), PNG_BYTES);
}

#[tokio::test]
async fn empty_model_flag_uses_configured_default() {
    let server = MockServer::start_async().await;
    let generate_mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/images/generations")
                .json_body(json!({
                    "prompt": "fox",
                    "n": 1,
                    "size": "1024x1024",
                    "response_format": "url",
                    "model": "flux-anime"
                }));
            then.status(200)
                .header("content-type", "application/json")
                .body(image_url_body(&server));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/files/generated.png");
            then.status(200).body(PNG_BYTES);
        })
        .await;

    let dispatcher = dispatcher(&server, "anime").await;
    let reply = dispatcher
        .handle_command("fox --model=")
        .await
        .unwrap()
        .into_reply();

    generate_mock.assert_calls(1);
    assert_eq!(
        reply.embed_description.as_deref(),
        Some("Prompt: fox; Model: anime;")
    );
    assert_eq!(reply.attachment.unwrap().filename, "fox.png");
}

#[tokio::test]
async fn unknown_model_fails_without_http_calls() {
    let server = MockServer::start_async().await;
    let generate_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/images/generations");
            then.status(200).body(image_url_body(&server));
        })
        .await;

    let dispatcher = dispatcher(&server, "base").await;

    let err = dispatcher
        .generate_image("castle", Some("bogus"), None)
        .await
        .unwrap_err();
    assert!(matches!(err, FluxError::Diffusion(_)));
    assert!(err.to_string().contains("bogus"));

    let reply = dispatcher
        .handle_command("castle --model=bogus")
        .await
        .unwrap()
        .into_reply();
    assert_eq!(
        reply.content.as_deref(),
        Some("Something went wrong...\nModel `bogus` does not exist.")
    );
    assert!(reply.attachment.is_none());
    assert!(reply.reference_invoker);
    assert!(!reply.mention_invoker);

    generate_mock.assert_calls(0);
}

#[tokio::test]
async fn invalid_size_is_rejected_before_any_request() {
    let server = MockServer::start_async().await;
    let generate_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/images/generations");
            then.status(200).body(image_url_body(&server));
        })
        .await;

    let dispatcher = dispatcher(&server, "base").await;

    for raw in ["castle --size=1024", "castle --size=widexhigh"] {
        let outcome = dispatcher.handle_command(raw).await.unwrap();
        assert!(matches!(outcome, CommandOutcome::InvalidSize(_)));

        let reply = outcome.into_reply();
        assert_eq!(
            reply.content.as_deref(),
            Some(fluximg::command::INVALID_SIZE_MESSAGE)
        );
        assert!(reply.attachment.is_none());
    }

    generate_mock.assert_calls(0);
}

#[tokio::test]
async fn server_error_becomes_reply_without_attachment() {
    let server = MockServer::start_async().await;
    let generate_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/images/generations");
            then.status(500)
                .header("content-type", "application/json")
                .body(r#"{"error":{"message":"upstream exploded"}}"#);
        })
        .await;
    let image_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/files/generated.png");
            then.status(200).body(PNG_BYTES);
        })
        .await;

    let dispatcher = dispatcher(&server, "base").await;
    let outcome = dispatcher.handle_command("castle").await.unwrap();

    generate_mock.assert_async().await;
    image_mock.assert_calls(0);

    assert!(matches!(
        outcome,
        CommandOutcome::Failed(FluxError::Diffusion(_))
    ));
    let reply = outcome.into_reply();
    let content = reply.content.expect("error text");
    assert!(content.contains("500"));
    assert!(reply.attachment.is_none());
}

#[tokio::test]
async fn image_download_status_is_not_checked() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/images/generations");
            then.status(200)
                .header("content-type", "application/json")
                .body(image_url_body(&server));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/files/generated.png");
            then.status(404).body("gone");
        })
        .await;

    let dispatcher = dispatcher(&server, "base").await;
    let image = dispatcher.generate_image("castle", None, None).await.unwrap();

    assert_eq!(image.as_ref(), b"gone");
}

#[tokio::test]
async fn malformed_success_body_is_returned_as_error() {
    let server = MockServer::start_async().await;
    let generate_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/images/generations");
            then.status(200)
                .header("content-type", "application/json")
                .body(r#"{"data":[]}"#);
        })
        .await;

    let dispatcher = dispatcher(&server, "base").await;
    let result = dispatcher.handle_command("castle").await;

    generate_mock.assert_async().await;
    assert!(matches!(result, Err(FluxError::Response(_))));
}

#[tokio::test]
async fn non_json_success_body_is_returned_as_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/images/generations");
            then.status(200).body("<html>ok</html>");
        })
        .await;

    let dispatcher = dispatcher(&server, "base").await;
    let result = dispatcher.handle_command("castle").await;

    assert!(matches!(result, Err(FluxError::Response(_))));
}

#[tokio::test]
async fn unreachable_endpoint_becomes_http_error_reply() {
    let dispatcher = FluxDispatcher::start(&credentials("http://127.0.0.1:1", "base"))
        .await
        .unwrap();

    let outcome = dispatcher.handle_command("castle").await.unwrap();
    assert!(matches!(
        outcome,
        CommandOutcome::Failed(FluxError::Http { .. })
    ));

    let reply = outcome.into_reply();
    assert!(reply.content.unwrap().starts_with("Error?: `"));
    assert!(reply.attachment.is_none());
}

#[tokio::test]
async fn concurrent_invocations_share_one_dispatcher() {
    let server = MockServer::start_async().await;
    let generate_mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/images/generations");
            then.status(200)
                .header("content-type", "application/json")
                .body(image_url_body(&server));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/files/generated.png");
            then.status(200).body(PNG_BYTES);
        })
        .await;

    let dispatcher = dispatcher(&server, "base").await;
    let prompts: Vec<String> = (0..5).map(|i| format!("tower number {}", i)).collect();

    let outcomes = futures::future::join_all(
        prompts.iter().map(|prompt| dispatcher.handle_command(prompt)),
    )
    .await;

    generate_mock.assert_calls(5);
    for (prompt, outcome) in prompts.iter().zip(outcomes) {
        let attachment = outcome.unwrap().into_reply().attachment.unwrap();
        assert_eq!(attachment.filename, format!("{}.png", prompt.replace(' ', "_")));
        assert_eq!(attachment.data.as_ref(), PNG_BYTES);
    }

    dispatcher.stop();
}

#[tokio::test]
async fn start_fails_on_incomplete_credentials() {
    let mut source = credentials("http://localhost", "base");
    source.remove("key");

    match FluxDispatcher::start(&source).await {
        Err(FluxError::Setup(msg)) => assert!(msg.contains("key")),
        Err(other) => panic!("expected setup error, got {}", other),
        Ok(_) => panic!("expected setup error"),
    }
}

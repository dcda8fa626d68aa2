//! OpenAI-compatible client tests against a throwaway local HTTP server.

use ragguard_llm::{
    CompletionClient, CompletionConfig, CompletionRequest, OpenAiCompatClient, TransportError,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Accept one connection, capture the raw request, answer with `status` + `body`.
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (format!("http://{addr}/v1"), handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&buf);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).to_string()
}

fn client_for(base_url: &str) -> OpenAiCompatClient {
    let config = CompletionConfig::new(base_url)
        .with_model("test-model")
        .with_api_key("sk-test")
        .with_timeout_secs(5);
    OpenAiCompatClient::new(config).unwrap()
}

#[tokio::test]
async fn test_complete_posts_deterministic_chat_request() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"choices":[{"message":{"role":"assistant","content":"\n Laurie Forman \n"}}]}"#,
    )
    .await;

    let client = client_for(&base_url);
    let text = client
        .complete(&CompletionRequest::deterministic("test-model", "Who does Fez marry?"))
        .await
        .unwrap();
    assert_eq!(text, "Laurie Forman");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /v1/chat/completions"));
    assert!(request.to_ascii_lowercase().contains("authorization: bearer sk-test"));

    let body_start = request.find("\r\n\r\n").unwrap() + 4;
    let body: serde_json::Value = serde_json::from_str(&request[body_start..]).unwrap();
    assert_eq!(body["model"], "test-model");
    assert_eq!(body["temperature"], 0.0);
    assert_eq!(body["messages"][0]["role"], "user");
    assert_eq!(body["messages"][0]["content"], "Who does Fez marry?");
}

#[tokio::test]
async fn test_non_success_status_is_transport_error() {
    let (base_url, server) = serve_once("401 Unauthorized", r#"{"error":"bad key"}"#).await;

    let err = client_for(&base_url)
        .complete(&CompletionRequest::deterministic("test-model", "q"))
        .await
        .unwrap_err();

    match err {
        TransportError::Status { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("bad key"));
        }
        other => panic!("expected Status error, got {other:?}"),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn test_malformed_body_is_transport_error() {
    let (base_url, server) = serve_once("200 OK", "this is not json").await;

    let err = client_for(&base_url)
        .complete(&CompletionRequest::deterministic("test-model", "q"))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::MalformedResponse(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn test_empty_content_is_transport_error() {
    let (base_url, server) =
        serve_once("200 OK", r#"{"choices":[{"message":{"content":"   "}}]}"#).await;

    let err = client_for(&base_url)
        .complete(&CompletionRequest::deterministic("test-model", "q"))
        .await
        .unwrap_err();

    assert_eq!(err, TransportError::EmptyResponse);
    server.await.unwrap();
}

#[tokio::test]
async fn test_unreachable_endpoint_is_transport_error() {
    // Bind then drop to get a port nobody is listening on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = client_for(&format!("http://{addr}/v1"))
        .complete(&CompletionRequest::deterministic("test-model", "q"))
        .await
        .unwrap_err();

    assert!(matches!(err, TransportError::Http(_)));
}

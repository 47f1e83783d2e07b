//! OpenAI-compatible chat completions client
//!
//! DeepSeek, OpenAI, Groq, vLLM and most local servers share the same
//! `POST {base_url}/chat/completions` contract. Only the non-streaming
//! form is used.

use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::config::UpstreamConfig;
use crate::conversation::Message;

use super::UpstreamError;

/// Chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f64,
    max_tokens: u32,
    stream: bool,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Option<Vec<Choice>>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    #[serde(default)]
    message: Option<ResponseMessage>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

/// Error response from API
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

pub struct OpenAICompatProvider {
    config: UpstreamConfig,
    client: Client,
}

impl OpenAICompatProvider {
    pub fn new(config: UpstreamConfig) -> Result<Self, UpstreamError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &UpstreamConfig {
        &self.config
    }

    /// Send `messages` as-is and return the first completion's content
    pub async fn complete(&self, messages: &[Message]) -> Result<String, UpstreamError> {
        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let request = ChatCompletionRequest {
            model: &self.config.model,
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stream: false,
        };

        let mut req_builder = self.client.post(&url);

        if let Some(ref api_key) = self.config.api_key {
            req_builder = req_builder.bearer_auth(api_key);
        }

        let response = req_builder.json(&request).send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = match response.text().await {
                Err(e) if e.is_timeout() => return Err(UpstreamError::Timeout),
                body => body.unwrap_or_default(),
            };
            let detail = match serde_json::from_str::<ErrorResponse>(&body) {
                Ok(error_resp) => error_resp.error.message,
                Err(_) => body,
            };
            return Err(UpstreamError::Rejected {
                status: status.as_u16(),
                detail,
            });
        }

        let body = response.text().await?;
        let completion: ChatCompletionResponse = serde_json::from_str(&body)
            .map_err(|e| UpstreamError::Transport(format!("Failed to parse response: {}", e)))?;

        let message = completion
            .choices
            .and_then(|choices| choices.into_iter().next())
            .ok_or_else(|| UpstreamError::MalformedResponse("No choices in response".into()))?
            .message
            .ok_or_else(|| UpstreamError::MalformedResponse("First choice has no message".into()))?;

        message
            .content
            .ok_or_else(|| UpstreamError::MalformedResponse("Message has no content".into()))
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use httpmock::Method::POST;
    use httpmock::MockServer;
    use serde_json::json;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    fn provider(server: &MockServer) -> OpenAICompatProvider {
        let config = UpstreamConfig::with_base_url(server.base_url()).api_key("test-key");
        OpenAICompatProvider::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_request_shape() {
        let server = MockServer::start_async().await;
        let chat_mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/chat/completions")
                    .header("authorization", "Bearer test-key")
                    .json_body(json!({
                        "model": "deepseek-chat",
                        "messages": [
                            {"role": "system", "content": "be brief"},
                            {"role": "user", "content": "hi"}
                        ],
                        "temperature": 0.7,
                        "max_tokens": 2048,
                        "stream": false
                    }));
                then.status(200).json_body(json!({
                    "choices": [{"message": {"role": "assistant", "content": "hello"}}]
                }));
            })
            .await;

        let content = provider(&server)
            .complete(&[Message::system("be brief"), Message::user("hi")])
            .await
            .unwrap();

        assert_eq!(content, "hello");
        chat_mock.assert_calls(1);
    }

    #[tokio::test]
    async fn test_rejected_status_carries_error_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(401).json_body(json!({
                    "error": {"message": "Authentication Fails", "type": "authentication_error"}
                }));
            })
            .await;

        let err = provider(&server)
            .complete(&[Message::user("hi")])
            .await
            .unwrap_err();

        match err {
            UpstreamError::Rejected { status, detail } => {
                assert_eq!(status, 401);
                assert_eq!(detail, "Authentication Fails");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_rejected_status_with_plain_body() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(502).body("bad gateway");
            })
            .await;

        let err = provider(&server)
            .complete(&[Message::user("hi")])
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            UpstreamError::Rejected { status: 502, ref detail } if detail == "bad gateway"
        ));
    }

    #[tokio::test]
    async fn test_missing_completion_shape() {
        let cases = [
            json!({"choices": []}),
            json!({"id": "chatcmpl-1"}),
            json!({"choices": [{"index": 0}]}),
            json!({"choices": [{"message": {"role": "assistant"}}]}),
        ];

        for body in cases {
            let server = MockServer::start_async().await;
            server
                .mock_async(|when, then| {
                    when.method(POST).path("/chat/completions");
                    then.status(200).json_body(body.clone());
                })
                .await;

            let err = provider(&server)
                .complete(&[Message::user("hi")])
                .await
                .unwrap_err();
            assert!(
                matches!(err, UpstreamError::MalformedResponse(_)),
                "body {} gave {:?}",
                body,
                err
            );
        }
    }

    #[tokio::test]
    async fn test_unparseable_body_is_transport_failure() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200).body("<html>not json</html>");
            })
            .await;

        let err = provider(&server)
            .complete(&[Message::user("hi")])
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::Transport(_)));
    }

    #[tokio::test]
    async fn test_stalled_error_body_times_out() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            socket
                .write_all(
                    b"HTTP/1.1 503 Service Unavailable\r\n\
                      Content-Type: application/json\r\n\
                      Content-Length: 100\r\n\r\n{\"error\":",
                )
                .await
                .unwrap();
            tokio::time::sleep(Duration::from_secs(5)).await;
        });

        let config = UpstreamConfig::with_base_url(format!("http://{}", addr))
            .timeout(Duration::from_millis(300));
        let err = OpenAICompatProvider::new(config)
            .unwrap()
            .complete(&[Message::user("hi")])
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::Timeout), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_stalled_upstream_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/chat/completions");
                then.status(200)
                    .delay(Duration::from_secs(3))
                    .json_body(json!({"choices": [{"message": {"content": "late"}}]}));
            })
            .await;

        let config = UpstreamConfig::with_base_url(server.base_url())
            .timeout(Duration::from_millis(200));
        let err = OpenAICompatProvider::new(config)
            .unwrap()
            .complete(&[Message::user("hi")])
            .await
            .unwrap_err();

        assert!(matches!(err, UpstreamError::Timeout));
    }
}

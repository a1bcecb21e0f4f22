pub mod client;
pub mod response;

use std::future::Future;

use async_openai::{Client, config::OpenAIConfig, error::OpenAIError};
use tracing::debug;

use crate::config::{Config, Settings};
use crate::error::{QuizError, Result};
use crate::prompt::Prompt;

pub use client::{healthcheck_client, initialize_client};
pub use response::request_text_response;

const INVALID_API_KEY_CODE: &str = "invalid_api_key";

/// A text-generation backend that answers one prompt with one block of text.
pub trait TextModel {
    fn complete(&self, prompt: &Prompt) -> impl Future<Output = Result<String>> + Send;
}

#[derive(Clone, Debug)]
pub struct OpenAiModel {
    client: Client<OpenAIConfig>,
    settings: Settings,
}

impl OpenAiModel {
    pub fn connect(config: &Config) -> Result<Self> {
        Ok(Self {
            client: initialize_client(config),
            settings: config.settings.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.settings.model
    }

    pub async fn check_key(&self) -> Result<()> {
        healthcheck_client(&self.client).await.map_err(classify_error)
    }
}

impl TextModel for OpenAiModel {
    fn complete(&self, prompt: &Prompt) -> impl Future<Output = Result<String>> + Send {
        async move {
            debug!(
                model = %self.settings.model,
                max_output_tokens = self.settings.max_output_tokens,
                "requesting quiz from model service"
            );
            let request = request_text_response(
                &self.client,
                &self.settings.model,
                self.settings.max_output_tokens,
                prompt.system,
                &prompt.user,
            );

            let outcome = match self.settings.timeout {
                Some(limit) => match tokio::time::timeout(limit, request).await {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        return Err(QuizError::Service(format!(
                            "No response from the model service within {}s",
                            limit.as_secs()
                        )));
                    }
                },
                None => request.await,
            };

            outcome.map_err(classify_error)
        }
    }
}

/// Rejected credentials are a configuration problem; every other failure belongs to the service.
fn classify_error(err: anyhow::Error) -> QuizError {
    if let Some(OpenAIError::ApiError(api)) = err.downcast_ref::<OpenAIError>()
        && api.code.as_deref() == Some(INVALID_API_KEY_CODE)
    {
        return QuizError::Configuration(format!("API key was rejected: {}", api.message));
    }
    QuizError::Service(format!("{err:#}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CredentialSource;
    use anyhow::Context;
    use async_openai::error::ApiError;
    use std::io::{Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    fn api_error(code: &str) -> OpenAIError {
        let body = serde_json::json!({
            "message": "Incorrect API key provided",
            "type": "invalid_request_error",
            "param": null,
            "code": code,
        });
        OpenAIError::ApiError(serde_json::from_value::<ApiError>(body).unwrap())
    }

    #[test]
    fn rejected_key_maps_to_configuration() {
        let err = Err::<(), _>(api_error(INVALID_API_KEY_CODE))
            .context("Failed to get response from LLM")
            .unwrap_err();
        let mapped = classify_error(err);
        assert!(mapped.is_configuration());
        assert!(mapped.to_string().contains("Incorrect API key provided"));
    }

    #[test]
    fn other_api_errors_map_to_service() {
        let err = anyhow::Error::new(api_error("rate_limit_exceeded"));
        assert!(classify_error(err).is_service());
    }

    #[test]
    fn transport_errors_map_to_service_with_context() {
        let err = anyhow::anyhow!("connection reset by peer")
            .context("Failed to get response from LLM");
        let mapped = classify_error(err);
        assert!(mapped.is_service());
        let message = mapped.to_string();
        assert!(message.contains("Failed to get response from LLM"));
        assert!(message.contains("connection reset by peer"));
    }

    struct TestKey;

    impl CredentialSource for TestKey {
        fn api_key(&self) -> Option<String> {
            Some("sk-test".to_string())
        }
    }

    /// Local HTTP endpoint that answers every request with one canned reply,
    /// or never answers at all when `reply` is `None`.
    struct StubServer {
        base: String,
        requests: Arc<AtomicUsize>,
    }

    impl StubServer {
        fn start(reply: Option<(u16, &'static str)>) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").unwrap();
            let base = format!("http://{}/v1", listener.local_addr().unwrap());
            let requests = Arc::new(AtomicUsize::new(0));
            let counter = Arc::clone(&requests);

            thread::spawn(move || {
                let mut held = Vec::new();
                for stream in listener.incoming() {
                    let Ok(mut stream) = stream else { break };
                    read_request(&mut stream);
                    counter.fetch_add(1, Ordering::SeqCst);
                    match reply {
                        Some((status, body)) => {
                            let response = format!(
                                "HTTP/1.1 {status} Stub\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                                body.len()
                            );
                            let _ = stream.write_all(response.as_bytes());
                            let _ = stream.flush();
                        }
                        None => held.push(stream),
                    }
                }
            });

            Self { base, requests }
        }

        fn requests(&self) -> usize {
            self.requests.load(Ordering::SeqCst)
        }

        fn model(&self, timeout: Duration) -> OpenAiModel {
            let settings = Settings {
                api_base: Some(self.base.clone()),
                timeout: Some(timeout),
                ..Settings::default()
            };
            OpenAiModel::connect(&Config::load(&TestKey, settings).unwrap()).unwrap()
        }
    }

    fn read_request(stream: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 4096];
        loop {
            let n = match stream.read(&mut chunk) {
                Ok(0) | Err(_) => return,
                Ok(n) => n,
            };
            buf.extend_from_slice(&chunk[..n]);
            let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };

            let head = String::from_utf8_lossy(&buf[..end]).to_ascii_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|value| value.trim().parse::<usize>().ok())
                .unwrap_or(0);
            let mut received = buf.len() - end - 4;
            while received < body_len {
                match stream.read(&mut chunk) {
                    Ok(0) | Err(_) => return,
                    Ok(n) => received += n,
                }
            }
            return;
        }
    }

    const SERVER_ERROR: &str = r#"{"error":{"message":"The server had an error while processing your request.","type":"server_error","param":null,"code":null}}"#;
    const RATE_LIMITED: &str = r#"{"error":{"message":"Rate limit reached for requests.","type":"requests","param":null,"code":"rate_limit_exceeded"}}"#;
    const BAD_KEY: &str = r#"{"error":{"message":"Incorrect API key provided: sk-test.","type":"invalid_request_error","param":null,"code":"invalid_api_key"}}"#;

    #[tokio::test]
    async fn server_error_is_sent_once_and_surfaced() {
        let server = StubServer::start(Some((500, SERVER_ERROR)));
        let model = server.model(Duration::from_secs(10));

        let err = model.complete(&Prompt::for_topic("Volcanoes")).await.unwrap_err();

        assert_eq!(server.requests(), 1);
        assert!(err.is_service());
        assert!(err.to_string().contains("The server had an error"), "{err}");
    }

    #[tokio::test]
    async fn rate_limit_is_sent_once_and_surfaced() {
        let server = StubServer::start(Some((429, RATE_LIMITED)));
        let model = server.model(Duration::from_secs(10));

        let err = model.complete(&Prompt::for_topic("Volcanoes")).await.unwrap_err();

        assert_eq!(server.requests(), 1);
        assert!(err.is_service());
        assert!(err.to_string().contains("Rate limit reached"), "{err}");
    }

    #[tokio::test]
    async fn unauthorized_reply_is_configuration_error() {
        let server = StubServer::start(Some((401, BAD_KEY)));
        let model = server.model(Duration::from_secs(10));

        let err = model.complete(&Prompt::for_topic("Volcanoes")).await.unwrap_err();

        assert_eq!(server.requests(), 1);
        assert!(err.is_configuration(), "{err}");
        assert!(err.to_string().contains("Incorrect API key provided"));
    }

    #[tokio::test]
    async fn silent_service_times_out() {
        let server = StubServer::start(None);
        let model = server.model(Duration::from_secs(1));

        let err = model.complete(&Prompt::for_topic("Volcanoes")).await.unwrap_err();

        assert!(err.is_service());
        assert!(err.to_string().contains("within 1s"), "{err}");
        assert_eq!(server.requests(), 1);
    }
}

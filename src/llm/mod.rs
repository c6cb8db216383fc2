// src/llm/mod.rs

//! Text-completion providers used by the LLM intent extractor.
//!
//! A provider is constructed once from configuration and injected into the
//! extractor; nothing here is global. Every provider uses a blocking client
//! with a request timeout and retries a failed call at most `max_retries` times.

use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

pub mod azure;
pub mod ollama;

pub use azure::AzureOpenAiProvider;
pub use ollama::OllamaProvider;

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
    #[error("request to {provider} failed: {source}")]
    Transport {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} returned HTTP {status}: {body}")]
    Status {
        provider: &'static str,
        status: u16,
        body: String,
    },
    #[error("{provider} response is not valid JSON: {source}")]
    Decode {
        provider: &'static str,
        #[source]
        source: reqwest::Error,
    },
    #[error("{provider} response missing `{field}`")]
    MissingField {
        provider: &'static str,
        field: &'static str,
    },
}

/// Black-box completion call: a system instruction plus the user's text in,
/// the model's raw reply out.
pub trait CompletionProvider: Send + Sync {
    fn name(&self) -> &'static str;
    fn complete(&self, system: &str, user: &str) -> Result<String, ProviderError>;
}

/// Transport settings shared by every provider.
#[derive(Debug, Clone, Copy)]
pub struct HttpOptions {
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for HttpOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 1,
        }
    }
}

pub(crate) fn build_client(options: &HttpOptions) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(options.timeout)
        .build()
        .map_err(ProviderError::Client)
}

/// Sends the request built by `request`, retrying transport failures and 5xx
/// responses up to `max_retries` times. Returns the decoded JSON body.
pub(crate) fn send_json(
    provider: &'static str,
    max_retries: u32,
    request: impl Fn() -> RequestBuilder,
) -> Result<Value, ProviderError> {
    let mut attempt = 0;

    loop {
        let retries_left = attempt < max_retries;
        attempt += 1;

        match request().send() {
            Ok(resp) if resp.status().is_server_error() && retries_left => {
                warn!(
                    provider,
                    status = resp.status().as_u16(),
                    attempt,
                    "provider error, retrying"
                );
            }
            Ok(resp) if !resp.status().is_success() => {
                let status = resp.status().as_u16();
                let body = resp.text().unwrap_or_default();
                return Err(ProviderError::Status {
                    provider,
                    status,
                    body,
                });
            }
            Ok(resp) => {
                debug!(provider, attempt, "provider responded");
                return resp
                    .json::<Value>()
                    .map_err(|source| ProviderError::Decode { provider, source });
            }
            Err(err) if retries_left => {
                warn!(provider, attempt, error = %err, "request failed, retrying");
            }
            Err(source) => return Err(ProviderError::Transport { provider, source }),
        }
    }
}

/// Follows `path` (object keys or array indices) into `body` and returns the string there.
pub(crate) fn text_at<'a>(body: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(body, |node, key| match key.parse::<usize>() {
            Ok(index) => node.get(index),
            Err(_) => node.get(*key),
        })
        .and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{TcpListener, TcpStream};
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    /// `(status, body)` per connection; status 0 hangs up without replying.
    /// The last entry repeats once the script runs out.
    type Script = &'static [(u16, &'static str)];

    fn scripted_server(script: Script) -> (String, Arc<AtomicUsize>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/api/generate", listener.local_addr().unwrap());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&hits);

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { break };
                let n = counter.fetch_add(1, Ordering::SeqCst);
                let (status, body) = script[n.min(script.len() - 1)];
                read_request(&mut stream);
                if status == 0 {
                    continue;
                }
                let reply = format!(
                    "HTTP/1.1 {status} Scripted\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = stream.write_all(reply.as_bytes());
            }
        });

        (url, hits)
    }

    fn read_request(stream: &mut TcpStream) {
        let mut reader = BufReader::new(stream);
        let mut length = 0;
        let mut line = String::new();
        while reader.read_line(&mut line).unwrap_or(0) > 0 {
            if line == "\r\n" {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    length = value.trim().parse().unwrap_or(0);
                }
            }
            line.clear();
        }
        let mut body = vec![0; length];
        let _ = reader.read_exact(&mut body);
    }

    fn post(url: &str, max_retries: u32) -> Result<Value, ProviderError> {
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        send_json("scripted", max_retries, || {
            client.post(url).json(&json!({ "prompt": "hi" }))
        })
    }

    #[test]
    fn server_error_is_retried_once() {
        let (url, hits) = scripted_server(&[(503, "busy"), (200, r#"{"response": "ok"}"#)]);
        let body = post(&url, 1).unwrap();
        assert_eq!(text_at(&body, &["response"]), Some("ok"));
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn dropped_connection_is_retried() {
        let (url, hits) = scripted_server(&[(0, ""), (200, r#"{"response": "ok"}"#)]);
        assert!(post(&url, 1).is_ok());
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn client_error_is_not_retried() {
        let (url, hits) = scripted_server(&[(404, "no such model")]);
        let err = post(&url, 3).unwrap_err();
        assert!(matches!(
            err,
            ProviderError::Status { status: 404, ref body, .. } if body == "no such model"
        ));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn retries_stop_at_the_limit() {
        let (url, hits) = scripted_server(&[(503, "busy")]);
        let err = post(&url, 2).unwrap_err();
        assert!(matches!(err, ProviderError::Status { status: 503, .. }));
        assert_eq!(hits.load(Ordering::SeqCst), 3);

        let (url, hits) = scripted_server(&[(503, "busy")]);
        assert!(post(&url, 0).is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn text_at_walks_objects_and_arrays() {
        let body = json!({ "choices": [ { "message": { "content": "hi" } } ] });
        assert_eq!(text_at(&body, &["choices", "0", "message", "content"]), Some("hi"));
        assert_eq!(text_at(&body, &["choices", "1", "message", "content"]), None);
        assert_eq!(text_at(&json!({ "response": 3 }), &["response"]), None);
    }
}

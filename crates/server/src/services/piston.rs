use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::lang::file_extension;

/// Thin client for the remote Piston execution engine. Pass-through by
/// design: bodies are relayed verbatim and no retries are attempted, the
/// caller retries manually. The only hardening is the bounded timeout.
#[derive(Clone)]
pub struct PistonClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug, thiserror::Error)]
pub enum PistonError {
    #[error("request to execution engine timed out")]
    Timeout,
    #[error("execution engine returned {status}")]
    Remote { status: u16, detail: String },
    #[error("failed to reach execution engine: {0}")]
    Transport(String),
}

#[derive(Debug, Deserialize)]
pub struct ExecuteRequest {
    pub language: String,
    pub version: String,
    pub code: String,
    pub filename: Option<String>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ExecutePayload {
    pub language: String,
    pub version: String,
    pub files: Vec<ExecuteFile>,
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ExecuteFile {
    pub name: String,
    pub content: String,
}

impl ExecutePayload {
    /// Shapes an incoming request into the engine's wire format. Callers may
    /// name the file themselves; otherwise one is derived from the language.
    pub fn from_request(req: ExecuteRequest) -> Self {
        let name = req.filename.unwrap_or_else(|| {
            let ext = file_extension(&req.language);
            if ext.is_empty() {
                "main".to_string()
            } else {
                format!("main.{ext}")
            }
        });

        Self {
            language: req.language,
            version: req.version,
            files: vec![ExecuteFile {
                name,
                content: req.code,
            }],
        }
    }
}

impl PistonClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// GET the engine's runtime listing, relayed verbatim.
    pub async fn runtimes(&self) -> Result<Value, PistonError> {
        let response = self
            .http
            .get(format!("{}/runtimes", self.base_url))
            .send()
            .await
            .map_err(classify_transport)?;

        read_json(response).await
    }

    /// POST an execution request, relaying the engine's response verbatim.
    pub async fn execute(&self, payload: &ExecutePayload) -> Result<Value, PistonError> {
        let response = self
            .http
            .post(format!("{}/execute", self.base_url))
            .json(payload)
            .send()
            .await
            .map_err(classify_transport)?;

        read_json(response).await
    }
}

fn classify_transport(err: reqwest::Error) -> PistonError {
    if err.is_timeout() {
        PistonError::Timeout
    } else {
        PistonError::Transport(err.to_string())
    }
}

async fn read_json(response: reqwest::Response) -> Result<Value, PistonError> {
    let status = response.status();
    if !status.is_success() {
        let detail = response.text().await.unwrap_or_default();
        return Err(PistonError::Remote {
            status: status.as_u16(),
            detail,
        });
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| PistonError::Transport(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_derives_filename_from_language() {
        let payload = ExecutePayload::from_request(ExecuteRequest {
            language: "python".to_string(),
            version: "3.11".to_string(),
            code: "print(1)".to_string(),
            filename: None,
        });

        assert_eq!(payload.files.len(), 1);
        assert_eq!(payload.files[0].name, "main.py");
        assert_eq!(payload.files[0].content, "print(1)");
    }

    #[test]
    fn payload_keeps_caller_filename() {
        let payload = ExecutePayload::from_request(ExecuteRequest {
            language: "cpp".to_string(),
            version: "10.2".to_string(),
            code: "int main() {}".to_string(),
            filename: Some("solution.cpp".to_string()),
        });

        assert_eq!(payload.files[0].name, "solution.cpp");
    }

    #[test]
    fn unknown_language_gets_bare_filename() {
        let payload = ExecutePayload::from_request(ExecuteRequest {
            language: "cobol".to_string(),
            version: "1".to_string(),
            code: "DISPLAY 'HI'.".to_string(),
            filename: None,
        });

        assert_eq!(payload.files[0].name, "main");
    }

    #[test]
    fn payload_serializes_in_engine_wire_format() {
        let payload = ExecutePayload::from_request(ExecuteRequest {
            language: "bash".to_string(),
            version: "5".to_string(),
            code: "echo hi".to_string(),
            filename: None,
        });

        let value = serde_json::to_value(&payload).expect("serialize");
        assert_eq!(value["language"], "bash");
        assert_eq!(value["files"][0]["name"], "main.sh");
        assert_eq!(value["files"][0]["content"], "echo hi");
    }
}

//! The configured HTTP session every operation goes through.
//!
//! # Design
//! `Session::send` is the single send-and-check step: it attaches the fixed
//! header set and credentials, executes the request, and when raise-on-error
//! is enabled turns any non-2xx status into `DeckError::HttpStatus` before the
//! body is looked at.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::Value;
use tracing::debug;

use crate::config::DeckConfig;
use crate::error::DeckError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;

pub const OCS_API_REQUEST: &str = "OCS-APIRequest";

#[derive(Debug, Clone)]
pub struct Session<T> {
    transport: T,
    headers: Vec<(String, String)>,
    raise_for_status: bool,
}

impl<T: Transport> Session<T> {
    pub fn new(config: &DeckConfig, transport: T) -> Self {
        let credentials = STANDARD.encode(format!("{}:{}", config.username, config.password));
        Self {
            transport,
            headers: vec![
                (OCS_API_REQUEST.to_string(), "true".to_string()),
                ("Content-Type".to_string(), "application/json".to_string()),
                ("Authorization".to_string(), format!("Basic {credentials}")),
            ],
            raise_for_status: config.raise_for_status,
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Attach headers, execute, and check the status.
    pub fn send(&self, mut request: HttpRequest) -> Result<HttpResponse, DeckError> {
        request.headers.extend(self.headers.iter().cloned());
        debug!(method = %request.method, path = %request.path, "sending request");

        let response = self.transport.execute(&request)?;
        debug!(status = response.status, path = %request.path, "received response");

        if self.raise_for_status && !response.is_success() {
            return Err(DeckError::HttpStatus {
                status: response.status,
                body: response.body,
            });
        }
        Ok(response)
    }

    /// `send`, then decode the body as JSON. An empty body decodes to `null`.
    pub fn send_json(&self, request: HttpRequest) -> Result<Value, DeckError> {
        let response = self.send(request)?;
        decode_body(&response.body)
    }
}

fn decode_body(body: &str) -> Result<Value, DeckError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(body).map_err(|e| DeckError::Decode(e.to_string()))
}

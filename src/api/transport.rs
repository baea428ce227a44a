//! XML-RPC transport to the backend.
//!
//! The backend exposes two endpoints under the same address: `common` for
//! authentication and `object` for model operations. Each [`XmlRpcProxy`] is
//! bound to one of them and carries no state besides its URL.

use std::time::Duration;

use reqwest::blocking::{Client, Response};
use reqwest::header::CONTENT_TYPE;
use xmlrpc::{Request, Value};

use super::error::TransportError;
use crate::constants;

/// Relation command meaning "unlink everything, then link exactly these ids".
const RELATION_REPLACE: i32 = 6;

/// Service endpoint of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// Authentication service.
    Common,
    /// Model operations (`execute_kw`).
    Object,
}

impl Endpoint {
    /// Path of the endpoint relative to the backend address.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Common => constants::RPC_COMMON_PATH,
            Self::Object => constants::RPC_OBJECT_PATH,
        }
    }
}

/// A remote procedure call proxy bound to one endpoint.
pub trait Transport {
    /// Invokes `method` with positional `params` and returns the decoded response.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] if the endpoint is unreachable, answers with
    /// a non-success status, or returns a fault or an undecodable body.
    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError>;
}

/// Builds the blocking HTTP client shared by both endpoint proxies.
///
/// # Errors
///
/// Returns [`TransportError`] if the TLS backend cannot be initialised.
pub fn http_client(timeout: Duration) -> Result<Client, TransportError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(format!("{}/{}", constants::APP_NAME, constants::APP_VERSION))
        .build()
        .map_err(|e| {
            TransportError::new(format!("{}: {e}", constants::ERR_HTTP_CLIENT_BUILD_FAILED))
        })
}

/// XML-RPC over HTTP(S) to a single endpoint.
#[derive(Debug, Clone)]
pub struct XmlRpcProxy {
    http: Client,
    url: String,
}

impl XmlRpcProxy {
    #[must_use]
    pub fn new(http: Client, address: &str, endpoint: Endpoint) -> Self {
        Self {
            http,
            url: format!("{address}{}", endpoint.path()),
        }
    }

    /// Full URL of the bound endpoint.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

impl Transport for XmlRpcProxy {
    fn call(&self, method: &str, params: Vec<Value>) -> Result<Value, TransportError> {
        let request = params
            .into_iter()
            .fold(Request::new(method), |request, param| request.arg(param));

        request
            .call(HttpPost {
                http: &self.http,
                url: &self.url,
            })
            .map_err(|e| TransportError::new(e.to_string()))
    }
}

/// One POST of an encoded request body.
struct HttpPost<'a> {
    http: &'a Client,
    url: &'a str,
}

impl xmlrpc::Transport for HttpPost<'_> {
    type Stream = Response;

    fn transmit(
        self,
        request: &Request<'_>,
    ) -> Result<Self::Stream, Box<dyn std::error::Error + Send + Sync>> {
        let mut body = Vec::new();
        request.write_as_xml(&mut body)?;

        let response = self
            .http
            .post(self.url)
            .header(CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(body)
            .send()
            .map_err(|e| format!("{}: {e}", constants::ERR_NETWORK_REQUEST_FAILED))?;

        if !response.status().is_success() {
            return Err(format!("{}{}", constants::ERR_SERVER_ERROR, response.status()).into());
        }

        Ok(response)
    }
}

/// Value for a many-to-many field that replaces its whole link set with `ids`.
///
/// Sending a link (`4`) command instead would keep the previous links attached.
#[must_use]
pub fn replace_relation(ids: &[i32]) -> Value {
    Value::Array(vec![Value::Array(vec![
        Value::Int(RELATION_REPLACE),
        Value::Bool(false),
        Value::Array(ids.iter().copied().map(Value::Int).collect()),
    ])])
}

/// Reads a record id, accepting both XML-RPC integer widths.
pub(crate) fn as_id(value: &Value) -> Option<i32> {
    match value {
        Value::Int(id) => Some(*id),
        Value::Int64(id) => i32::try_from(*id).ok(),
        _ => None,
    }
}

/// Looks up `name` in a struct value.
pub(crate) fn field<'a>(value: &'a Value, name: &str) -> Option<&'a Value> {
    value.as_struct()?.get(name)
}

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use reqwest::Url;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::errors::ClientError;
use crate::handler::LocalHandler;
use crate::metrics::{CALLS_TOTAL, CALL_DURATION};
use crate::request::{FormBody, Invocation, Method, Payload};
use crate::service::{LogicalService, ServiceEndpoints};

/// Services mount their HTTP API under this prefix.
pub const API_PREFIX: &str = "/api";

/// How a logical service is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Local,
    Remote,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Local => "local",
            Mode::Remote => "remote",
        }
    }
}

#[derive(Clone)]
enum Binding {
    Local(Arc<dyn LocalHandler>),
    Remote(Url),
}

impl Binding {
    fn mode(&self) -> Mode {
        match self {
            Binding::Local(_) => Mode::Local,
            Binding::Remote(_) => Mode::Remote,
        }
    }
}

/// Dispatches invocations to local handlers or remote services.
///
/// Every [`LogicalService`] is bound once, at construction; the client holds
/// no per-call state and performs no retries.
#[derive(Clone)]
pub struct ServiceClient {
    bindings: HashMap<LogicalService, Binding>,
    http: reqwest::Client,
}

impl fmt::Debug for ServiceClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut m = f.debug_map();
        for s in LogicalService::ALL {
            match self.bindings.get(&s) {
                Some(Binding::Remote(url)) => m.entry(&s.as_str(), &url.as_str()),
                Some(Binding::Local(_)) => m.entry(&s.as_str(), &"<local>"),
                None => m.entry(&s.as_str(), &"<unbound>"),
            };
        }
        m.finish()
    }
}

pub struct ServiceClientBuilder {
    endpoints: ServiceEndpoints,
    handlers: HashMap<LogicalService, Arc<dyn LocalHandler>>,
    timeout: Option<Duration>,
    http: Option<reqwest::Client>,
}

impl ServiceClientBuilder {
    /// Register the in-process handler used when `service` has no address.
    pub fn local(mut self, service: LogicalService, handler: Arc<dyn LocalHandler>) -> Self {
        self.handlers.insert(service, handler);
        self
    }

    /// Overall request timeout for remote calls; unset means the HTTP
    /// client's default.
    pub fn timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Use a preconfigured HTTP client (the timeout setting is then ignored).
    pub fn http_client(mut self, client: reqwest::Client) -> Self {
        self.http = Some(client);
        self
    }

    pub fn build(self) -> Result<ServiceClient, ClientError> {
        let mut bindings = HashMap::new();
        for service in LogicalService::ALL {
            let binding = match self.endpoints.address(service) {
                Some(address) => Binding::Remote(parse_base_url(service, address)?),
                None => match self.handlers.get(&service) {
                    Some(h) => Binding::Local(Arc::clone(h)),
                    None => {
                        return Err(ClientError::configuration(format!(
                            "{service}: no address configured ({}) and no local handler registered",
                            service.url_env_var()
                        )))
                    }
                },
            };
            debug!(service = %service, mode = binding.mode().as_str(), "service bound");
            bindings.insert(service, binding);
        }

        let http = match self.http {
            Some(c) => c,
            None => {
                let mut b = reqwest::Client::builder();
                if let Some(t) = self.timeout {
                    b = b.timeout(t);
                }
                b.build()?
            }
        };
        Ok(ServiceClient { bindings, http })
    }
}

fn parse_base_url(service: LogicalService, address: &str) -> Result<Url, ClientError> {
    let url = Url::parse(address)
        .map_err(|e| ClientError::configuration(format!("{service}: invalid address {address:?}: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ClientError::configuration(format!(
            "{service}: address must start with http(s), got {address:?}"
        )));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(ClientError::configuration(format!(
            "{service}: address must not carry a query or fragment, got {address:?}"
        )));
    }
    Ok(url)
}

impl ServiceClient {
    pub fn builder(endpoints: ServiceEndpoints) -> ServiceClientBuilder {
        ServiceClientBuilder { endpoints, handlers: HashMap::new(), timeout: None, http: None }
    }

    pub fn mode(&self, service: LogicalService) -> Option<Mode> {
        self.bindings.get(&service).map(Binding::mode)
    }

    /// Full URL a call would hit, or `None` when the service is local.
    pub fn remote_url(&self, service: LogicalService, path: &str) -> Option<String> {
        match self.bindings.get(&service)? {
            Binding::Remote(base) => Some(join_url(base, path)),
            Binding::Local(_) => None,
        }
    }

    pub async fn get<S>(&self, service: S, path: &str) -> Result<Value, ClientError>
    where
        S: TryInto<LogicalService>,
        ClientError: From<S::Error>,
    {
        self.call(Invocation::new(service.try_into()?, Method::Get, path)).await
    }

    pub async fn post_json<S>(&self, service: S, path: &str, body: Value) -> Result<Value, ClientError>
    where
        S: TryInto<LogicalService>,
        ClientError: From<S::Error>,
    {
        self.call(Invocation::new(service.try_into()?, Method::Post, path).json(body)).await
    }

    pub async fn post_form<S>(&self, service: S, path: &str, body: FormBody) -> Result<Value, ClientError>
    where
        S: TryInto<LogicalService>,
        ClientError: From<S::Error>,
    {
        self.call(Invocation::new(service.try_into()?, Method::Post, path).form(body)).await
    }

    pub async fn put<S>(&self, service: S, path: &str, body: Value) -> Result<Value, ClientError>
    where
        S: TryInto<LogicalService>,
        ClientError: From<S::Error>,
    {
        self.call(Invocation::new(service.try_into()?, Method::Put, path).json(body)).await
    }

    pub async fn delete<S>(&self, service: S, path: &str) -> Result<Value, ClientError>
    where
        S: TryInto<LogicalService>,
        ClientError: From<S::Error>,
    {
        self.call(Invocation::new(service.try_into()?, Method::Delete, path)).await
    }

    /// Like [`call`](Self::call), decoding the response into `T`.
    pub async fn call_as<T: DeserializeOwned>(&self, invocation: Invocation) -> Result<T, ClientError> {
        let value = self.call(invocation).await?;
        serde_json::from_value(value).map_err(|e| ClientError::Decode(e.to_string()))
    }

    /// Dispatch one invocation through the service's binding.
    #[instrument(skip(self, invocation), fields(service = %invocation.service, method = %invocation.method, path = %invocation.path))]
    pub async fn call(&self, invocation: Invocation) -> Result<Value, ClientError> {
        let service = invocation.service;
        let binding = self
            .bindings
            .get(&service)
            .ok_or_else(|| ClientError::configuration(format!("{service}: not bound")))?;
        let mode = binding.mode();
        debug!(mode = mode.as_str(), "dispatching service call");

        let start = Instant::now();
        let result = match binding {
            Binding::Local(handler) => handler.handle(&invocation).await.map_err(ClientError::Local),
            Binding::Remote(base) => self.call_remote(base, invocation).await,
        };

        let labels = [service.as_str(), mode.as_str()];
        CALL_DURATION.with_label_values(&labels).observe(start.elapsed().as_secs_f64());
        let outcome = if result.is_ok() { "ok" } else { "error" };
        CALLS_TOTAL.with_label_values(&[service.as_str(), mode.as_str(), outcome]).inc();
        result
    }

    async fn call_remote(&self, base: &Url, invocation: Invocation) -> Result<Value, ClientError> {
        let url = join_url(base, &invocation.path);
        let mut req = self.http.request(invocation.method.into(), &url);
        if !invocation.query.is_empty() {
            req = req.query(&invocation.query);
        }
        req = match invocation.body {
            Payload::Empty => req,
            Payload::Json(v) => req.json(&v),
            Payload::Form(form) => req.multipart(form.into_multipart()?),
        };

        let resp = req.send().await.map_err(|e| {
            warn!(%url, error = %e, "remote call transport failure");
            ClientError::Transport(e)
        })?;

        let status = resp.status();
        if !status.is_success() {
            let body = match resp.text().await {
                Ok(body) => body,
                Err(e) => {
                    warn!(%url, status = status.as_u16(), error = %e, "failed to read error response body");
                    format!("<unreadable response body: {e}>")
                }
            };
            warn!(%url, status = status.as_u16(), "remote call returned error status");
            return Err(ClientError::RemoteCall { status: status.as_u16(), body });
        }

        let bytes = resp.bytes().await?;
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Value::Null);
        }
        serde_json::from_slice(&bytes).map_err(|e| ClientError::Decode(e.to_string()))
    }
}

fn join_url(base: &Url, path: &str) -> String {
    let base = base.as_str().trim_end_matches('/');
    if path.starts_with('/') {
        format!("{base}{API_PREFIX}{path}")
    } else {
        format!("{base}{API_PREFIX}/{path}")
    }
}

//! Request executor: one HTTP call wrapped with a loading flag and notifications.
//!
//! Failures are absorbed here. The caller gets an [`Outcome::Failed`] and the
//! user gets an error notification; no error is propagated upward.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::watch;

use super::endpoint::EndpointDescriptor;
use super::transport::{ApiRequest, Transport};
use crate::errors::TransportError;
use crate::notify::Notifier;

/// Shown when neither configuration, server nor error text provide a message.
pub const FALLBACK_ERROR_MESSAGE: &str = "An unexpected error occurred.";
pub const DEFAULT_ERROR_TITLE: &str = "Error: ";

/// Shared "a request is in flight" flag with explicit subscription.
///
/// Overlapping calls are counted; the flag drops back to false only when the
/// last one finishes. Subscribers hold a `watch::Receiver`; dropping it
/// unsubscribes.
#[derive(Debug)]
pub struct LoadingFlag {
    tx: watch::Sender<bool>,
    in_flight: AtomicUsize,
}

impl Default for LoadingFlag {
    fn default() -> Self {
        Self::new()
    }
}

impl LoadingFlag {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(false);
        Self {
            tx,
            in_flight: AtomicUsize::new(0),
        }
    }

    pub fn is_loading(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }

    // The counter only changes inside `send_if_modified`, which holds the
    // channel's write lock, so count and flag move together.
    fn begin(&self) -> LoadingGuard<'_> {
        self.tx.send_if_modified(|loading| {
            let before = self.in_flight.fetch_add(1, Ordering::SeqCst);
            *loading = true;
            before == 0
        });
        LoadingGuard { flag: self }
    }

    fn finish(&self) {
        self.tx.send_if_modified(|loading| {
            let before = self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if before == 1 {
                *loading = false;
                true
            } else {
                false
            }
        });
    }
}

/// Releases one in-flight call when dropped, whatever path the call took.
struct LoadingGuard<'a> {
    flag: &'a LoadingFlag,
}

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.flag.finish();
    }
}

/// Title and body of a configured notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub title: String,
    pub message: String,
}

impl Message {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Per-call notification settings.
#[derive(Debug, Clone, Default)]
pub struct RequestOptions {
    pub success: Option<Message>,
    pub error: Option<Message>,
    /// Suppress the error notification entirely.
    pub hide_toast: bool,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_success(mut self, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.success = Some(Message::new(title, message));
        self
    }

    pub fn on_error(mut self, title: impl Into<String>, message: impl Into<String>) -> Self {
        self.error = Some(Message::new(title, message));
        self
    }

    pub fn quiet(mut self) -> Self {
        self.hide_toast = true;
        self
    }
}

/// Result of an executed request.
///
/// A failed call carries the message that was (or would have been) shown to
/// the user, so callers must branch on completion before touching data.
#[must_use]
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Completed(T),
    Failed { message: String },
}

impl<T> Outcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Completed(value) => Outcome::Completed(f(value)),
            Outcome::Failed { message } => Outcome::Failed { message },
        }
    }

    /// Convert to `anyhow::Result` at the command boundary.
    pub fn into_result(self) -> anyhow::Result<T> {
        match self {
            Outcome::Completed(value) => Ok(value),
            Outcome::Failed { message } => Err(anyhow::anyhow!(message)),
        }
    }
}

/// Pick the error text: configured → server → error display → fallback.
pub fn resolve_error_message(
    configured: Option<&str>,
    server: Option<&str>,
    generic: &str,
) -> String {
    [configured, server, Some(generic)]
        .into_iter()
        .flatten()
        .find(|m| !m.trim().is_empty())
        .unwrap_or(FALLBACK_ERROR_MESSAGE)
        .to_string()
}

#[derive(Clone)]
pub struct RequestExecutor {
    transport: Arc<dyn Transport>,
    notifier: Arc<dyn Notifier>,
    loading: Arc<LoadingFlag>,
}

impl RequestExecutor {
    pub fn new(transport: Arc<dyn Transport>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            transport,
            notifier,
            loading: Arc::new(LoadingFlag::new()),
        }
    }

    pub fn loading(&self) -> &LoadingFlag {
        &self.loading
    }

    pub fn notifier(&self) -> &Arc<dyn Notifier> {
        &self.notifier
    }

    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Run `op(input)` with the loading flag raised and notifications applied.
    pub async fn execute<I, T, F, Fut>(&self, op: F, input: I, options: &RequestOptions) -> Outcome<T>
    where
        F: FnOnce(I) -> Fut,
        Fut: Future<Output = Result<T, TransportError>>,
    {
        let _guard = self.loading.begin();

        match op(input).await {
            Ok(value) => {
                if let Some(success) = &options.success {
                    self.notifier.success(&success.title, &success.message);
                }
                Outcome::Completed(value)
            }
            Err(err) => {
                let configured = options.error.as_ref().map(|m| m.message.as_str());
                let message =
                    resolve_error_message(configured, err.server_message(), &err.to_string());
                tracing::warn!(error = %err, "request failed");

                if !options.hide_toast {
                    let title = options
                        .error
                        .as_ref()
                        .map(|m| m.title.as_str())
                        .filter(|t| !t.is_empty())
                        .unwrap_or(DEFAULT_ERROR_TITLE);
                    self.notifier.error(title, &message);
                    self.notifier.show_validation_errors(err.field_errors());
                }
                Outcome::Failed { message }
            }
        }
    }

    /// Send `request` and decode the body as `T`.
    ///
    /// `inspect` sees the raw JSON before decoding; decode failures are
    /// handled like any other failed call.
    pub async fn dispatch<T, F>(
        &self,
        request: ApiRequest,
        options: &RequestOptions,
        inspect: F,
    ) -> Outcome<T>
    where
        T: DeserializeOwned,
        F: FnOnce(&Value) + Send,
    {
        let transport = self.transport.clone();
        self.execute(
            |req: ApiRequest| async move {
                let url = req.url.clone();
                let value = transport.send(req).await?;
                inspect(&value);
                serde_json::from_value(value).map_err(|e| TransportError::Decode {
                    url,
                    message: e.to_string(),
                })
            },
            request,
            options,
        )
        .await
    }

    /// Call with a JSON body.
    pub async fn request<T: DeserializeOwned>(
        &self,
        endpoint: &EndpointDescriptor,
        body: Value,
        options: &RequestOptions,
    ) -> Outcome<T> {
        let request = ApiRequest::new(&endpoint.url, endpoint.method).with_body(body);
        self.dispatch(request, options, |_| {}).await
    }

    /// Call without body or query.
    pub async fn simple_request<T: DeserializeOwned>(
        &self,
        endpoint: &EndpointDescriptor,
        options: &RequestOptions,
    ) -> Outcome<T> {
        let request = ApiRequest::new(&endpoint.url, endpoint.method);
        self.dispatch(request, options, |_| {}).await
    }

    /// Call with query parameters only.
    pub async fn search_request<T: DeserializeOwned>(
        &self,
        endpoint: &EndpointDescriptor,
        query: Vec<(String, String)>,
        options: &RequestOptions,
    ) -> Outcome<T> {
        let request = ApiRequest::new(&endpoint.url, endpoint.method).with_query(query);
        self.dispatch(request, options, |_| {}).await
    }
}

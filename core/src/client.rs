//! Per-endpoint operations against the subscription-manager REST API.
//!
//! # Design
//! `SubscriptionManagerClient` composes every operation the same way: encode
//! the payload if there is one, hand the request to the injected
//! [`RequestHandler`], fail on any status outside the 2xx range, decode the
//! body into the declared record type. Endpoint paths are fixed relative
//! templates built once at construction; the client holds no other state
//! and performs no I/O of its own.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, RequestHandler};
use crate::models::{Subscription, Topic};

/// Root under which every endpoint of the service lives.
const BASE_PATH: &str = "subscription-manager/api/1.0/";

/// Synchronous client for the subscription-manager API, one method per
/// endpoint.
///
/// The handler passed to [`new`](Self::new) performs the actual HTTP round
/// trips; the client itself is pure data transformation and can be cloned
/// freely when the handler allows it.
#[derive(Debug, Clone)]
pub struct SubscriptionManagerClient<H> {
    handler: H,
    url_topics: String,
    url_topics_own: String,
    url_subscriptions: String,
    url_ping_credentials: String,
}

impl<H: RequestHandler> SubscriptionManagerClient<H> {
    pub fn new(handler: H) -> Self {
        Self {
            handler,
            url_topics: format!("{BASE_PATH}topics/"),
            url_topics_own: format!("{BASE_PATH}topics/own"),
            url_subscriptions: format!("{BASE_PATH}subscriptions/"),
            url_ping_credentials: format!("{BASE_PATH}ping-credentials"),
        }
    }

    /// Every topic registered on the server.
    #[tracing::instrument(skip(self))]
    pub fn list_topics(&self) -> Result<Vec<Topic>, ApiError> {
        let response = self.send(HttpRequest::get(self.url_topics.clone()))?;
        decode_json(&response)
    }

    /// Topics owned by the authenticated caller.
    #[tracing::instrument(skip(self))]
    pub fn list_own_topics(&self) -> Result<Vec<Topic>, ApiError> {
        let response = self.send(HttpRequest::get(self.url_topics_own.clone()))?;
        decode_json(&response)
    }

    #[tracing::instrument(skip(self))]
    pub fn get_topic(&self, id: i64) -> Result<Topic, ApiError> {
        let response = self.send(HttpRequest::get(format!("{}{id}", self.url_topics)))?;
        decode_json(&response)
    }

    /// Register a topic; the returned record carries the assigned id.
    #[tracing::instrument(skip(self, topic))]
    pub fn create_topic(&self, topic: &Topic) -> Result<Topic, ApiError> {
        let body = encode_json(topic)?;
        let response = self.send(HttpRequest::post(self.url_topics.clone(), body))?;
        decode_json(&response)
    }

    #[tracing::instrument(skip(self))]
    pub fn delete_topic(&self, id: i64) -> Result<(), ApiError> {
        self.send(HttpRequest::delete(format!("{}{id}", self.url_topics)))?;
        Ok(())
    }

    /// Subscriptions visible to the caller, optionally narrowed to the ones
    /// reading from `queue`.
    #[tracing::instrument(skip(self))]
    pub fn list_subscriptions(&self, queue: Option<&str>) -> Result<Vec<Subscription>, ApiError> {
        let mut request = HttpRequest::get(self.url_subscriptions.clone());
        if let Some(queue) = queue {
            request = request.with_query("queue", queue);
        }
        let response = self.send(request)?;
        decode_json(&response)
    }

    #[tracing::instrument(skip(self))]
    pub fn get_subscription(&self, id: i64) -> Result<Subscription, ApiError> {
        let response = self.send(HttpRequest::get(format!("{}{id}", self.url_subscriptions)))?;
        decode_json(&response)
    }

    /// Open a subscription. The server materializes the returned record in
    /// full: assigned id, generated queue name, defaults for whatever the
    /// request left unset.
    #[tracing::instrument(skip(self, subscription))]
    pub fn create_subscription(
        &self,
        subscription: &Subscription,
    ) -> Result<Subscription, ApiError> {
        let body = encode_json(subscription)?;
        let response = self.send(HttpRequest::post(self.url_subscriptions.clone(), body))?;
        decode_json(&response)
    }

    /// Replace the subscription stored under `id` wholesale.
    #[tracing::instrument(skip(self, subscription))]
    pub fn replace_subscription(
        &self,
        id: i64,
        subscription: &Subscription,
    ) -> Result<Subscription, ApiError> {
        let body = encode_json(subscription)?;
        let response = self.send(HttpRequest::put(format!("{}{id}", self.url_subscriptions), body))?;
        decode_json(&response)
    }

    #[tracing::instrument(skip(self))]
    pub fn delete_subscription(&self, id: i64) -> Result<(), ApiError> {
        self.send(HttpRequest::delete(format!("{}{id}", self.url_subscriptions)))?;
        Ok(())
    }

    /// Cheap credentials check; succeeds on any 2xx answer and discards the
    /// body.
    #[tracing::instrument(skip(self))]
    pub fn ping_credentials(&self) -> Result<(), ApiError> {
        self.send(HttpRequest::get(self.url_ping_credentials.clone()))?;
        Ok(())
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let response = self
            .handler
            .execute(request)
            .map_err(|e| ApiError::Transport(Box::new(e)))?;
        debug!(status = response.status, "response received");
        check_status(&response)?;
        Ok(response)
    }
}

/// Any status outside the 2xx window surfaces as `ApiError::Http` with the
/// raw body attached.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if (200..300).contains(&response.status) {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode_json<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn encode_json<T: Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

//! Synchronous client for the subscription-manager REST service.
//!
//! # Overview
//! The service manages topics (named message channels) and subscriptions
//! (queue-backed bindings to one or more topics). This crate exposes one
//! method per endpoint on [`SubscriptionManagerClient`], translating between
//! typed records and the service's JSON wire format.
//!
//! # Design
//! - The client performs no I/O. Every round trip goes through an injected
//!   [`RequestHandler`], which owns host resolution, auth, timeouts and
//!   retries; the core stays deterministic and testable with canned
//!   responses.
//! - Records use owned `String` / `Vec` fields; optional fields are omitted
//!   from encoded payloads rather than sent as null.
//! - Server payloads decode strictly: a subscription missing one of its
//!   expected keys, or a topic missing its name, is an error rather than a
//!   silently defaulted field.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod client;
pub mod error;
pub mod http;
pub mod models;

pub use client::SubscriptionManagerClient;
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse, RequestHandler};
pub use models::{ParseQosError, Qos, Subscription, Topic, TopicRef};

//! Wire records for the subscription-manager API.
//!
//! # Design
//! `Topic` and `Subscription` are value objects mirroring the server's JSON
//! schema. Optional fields are omitted from encoded payloads rather than
//! sent as null, while `Subscription` decoding still requires every key to
//! be present: the server always materializes subscriptions in full, so a
//! missing key means a truncated payload, not an unset value. The `topics`
//! list is heterogeneous on the wire: each element is either a bare
//! reference token or a fully expanded topic object, told apart by shape
//! alone via [`TopicRef`].

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

/// Delivery guarantee the broker applies to messages flowing through a
/// subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Qos {
    AtLeastOnce,
    AtMostOnce,
    ExactlyOnce,
}

impl Qos {
    /// All admitted wire tokens, in stable order.
    pub const fn all() -> [&'static str; 3] {
        ["AT_LEAST_ONCE", "AT_MOST_ONCE", "EXACTLY_ONCE"]
    }

    /// The wire token for this variant.
    pub const fn as_str(self) -> &'static str {
        match self {
            Qos::AtLeastOnce => "AT_LEAST_ONCE",
            Qos::AtMostOnce => "AT_MOST_ONCE",
            Qos::ExactlyOnce => "EXACTLY_ONCE",
        }
    }
}

impl fmt::Display for Qos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejection of a value outside [`Qos::all`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("qos should be one of {:?}", Qos::all())]
pub struct ParseQosError;

impl FromStr for Qos {
    type Err = ParseQosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AT_LEAST_ONCE" => Ok(Qos::AtLeastOnce),
            "AT_MOST_ONCE" => Ok(Qos::AtMostOnce),
            "EXACTLY_ONCE" => Ok(Qos::ExactlyOnce),
            _ => Err(ParseQosError),
        }
    }
}

impl Serialize for Qos {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Qos {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        // Non-string values get the same rejection as unknown tokens, so the
        // error always names the admitted set.
        let value = Value::deserialize(deserializer)?;
        value
            .as_str()
            .ok_or(ParseQosError)
            .and_then(Qos::from_str)
            .map_err(de::Error::custom)
    }
}

/// A named message channel subscribers bind to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    /// Channel name; present on every server payload.
    pub name: String,
    /// Database id, assigned once the topic has been persisted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
}

impl Topic {
    /// A topic that has not been persisted yet (no `id`).
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
        }
    }
}

/// One element of [`Subscription::topics`].
///
/// The server returns either an opaque reference token for topics it has
/// not expanded, or the whole topic object inline. There is no
/// discriminator field on the wire; the two cases are told apart by shape,
/// and both re-encode exactly as they arrived.
#[derive(Debug, Clone, PartialEq)]
pub enum TopicRef {
    /// Token standing in for a topic the server has not expanded,
    /// typically its name.
    Reference(Value),
    /// Topic expanded inline by the server.
    Inline(Topic),
}

impl TopicRef {
    /// Reference token for the common string case.
    pub fn reference(token: impl Into<String>) -> Self {
        TopicRef::Reference(Value::String(token.into()))
    }

    // An object carrying a non-null `id` is an expanded topic; every other
    // shape passes through unchanged as an opaque reference.
    fn from_value<E: de::Error>(value: Value) -> Result<Self, E> {
        let expanded = value
            .as_object()
            .is_some_and(|object| object.get("id").is_some_and(|id| !id.is_null()));
        if expanded {
            Topic::deserialize(value)
                .map(TopicRef::Inline)
                .map_err(de::Error::custom)
        } else {
            Ok(TopicRef::Reference(value))
        }
    }
}

impl Serialize for TopicRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            TopicRef::Reference(token) => token.serialize(serializer),
            TopicRef::Inline(topic) => topic.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for TopicRef {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        TopicRef::from_value(Value::deserialize(deserializer)?)
    }
}

/// A consumer's binding, via a queue, to one or more topics.
///
/// Client-constructed subscriptions set only the fields the request needs;
/// everything else stays `None` and is left out of the payload. Server
/// payloads carry the whole key set, with null standing in for unset
/// values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Subscription {
    /// Broker-assigned queue the consumer reads from.
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "required")]
    pub queue: Option<String>,
    /// Topics the subscription binds to, expanded or not.
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "required")]
    pub topics: Option<Vec<TopicRef>>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "required")]
    pub active: Option<bool>,
    /// Delivery guarantee requested from the broker.
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "required")]
    pub qos: Option<Qos>,
    /// Whether messages are kept while the subscriber is offline.
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "required")]
    pub durable: Option<bool>,
    /// Database id, assigned once the subscription has been persisted.
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "required")]
    pub id: Option<i64>,
}

/// Keeps a key mandatory while its value stays nullable. Plain `Option`
/// fields silently read as `None` when the key is missing, which would mask
/// truncated payloads.
fn required<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::deserialize(deserializer)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_subscription_json() -> &'static str {
        r#"{
            "queue": "queue name",
            "topics": [{"name": "topic", "id": 1}, "ref-queue-2"],
            "active": true,
            "qos": "EXACTLY_ONCE",
            "durable": true,
            "id": 1
        }"#
    }

    fn full_subscription() -> Subscription {
        Subscription {
            queue: Some("queue name".to_string()),
            topics: Some(vec![
                TopicRef::Inline(Topic {
                    name: "topic".to_string(),
                    id: Some(1),
                }),
                TopicRef::reference("ref-queue-2"),
            ]),
            active: Some(true),
            qos: Some(Qos::ExactlyOnce),
            durable: Some(true),
            id: Some(1),
        }
    }

    #[test]
    fn qos_all_lists_the_admitted_tokens_in_order() {
        assert_eq!(
            Qos::all(),
            ["AT_LEAST_ONCE", "AT_MOST_ONCE", "EXACTLY_ONCE"]
        );
    }

    #[test]
    fn qos_parses_every_admitted_token() {
        for token in Qos::all() {
            let qos: Qos = token.parse().unwrap();
            assert_eq!(qos.as_str(), token);
            assert_eq!(qos.to_string(), token);
        }
    }

    #[test]
    fn qos_rejects_unknown_tokens_naming_the_admitted_set() {
        for bad in ["invalid", "", "exactly_once", "EXACTLY ONCE"] {
            let err = bad.parse::<Qos>().unwrap_err();
            assert_eq!(
                err.to_string(),
                r#"qos should be one of ["AT_LEAST_ONCE", "AT_MOST_ONCE", "EXACTLY_ONCE"]"#
            );
        }
    }

    #[test]
    fn qos_decode_rejects_non_member_values_with_the_same_message() {
        for bad in ["1", "true", "\"\"", "[\"EXACTLY_ONCE\"]"] {
            let err = serde_json::from_str::<Qos>(bad).unwrap_err();
            assert!(
                err.to_string().contains(
                    r#"qos should be one of ["AT_LEAST_ONCE", "AT_MOST_ONCE", "EXACTLY_ONCE"]"#
                ),
                "unexpected message for {bad}: {err}"
            );
        }
    }

    #[test]
    fn topic_round_trips_with_and_without_id() {
        let persisted = Topic {
            name: "topic".to_string(),
            id: Some(1),
        };
        for topic in [persisted, Topic::new("topic")] {
            let json = serde_json::to_string(&topic).unwrap();
            let back: Topic = serde_json::from_str(&json).unwrap();
            assert_eq!(back, topic);
        }
    }

    #[test]
    fn topic_encode_omits_an_absent_id() {
        let json = serde_json::to_value(Topic::new("topic")).unwrap();
        assert_eq!(json["name"], "topic");
        assert!(json.get("id").is_none());

        let json = serde_json::to_value(Topic {
            name: "topic".to_string(),
            id: Some(1),
        })
        .unwrap();
        assert_eq!(json["id"], 1);
    }

    #[test]
    fn topic_decode_requires_name() {
        let err = serde_json::from_str::<Topic>(r#"{"id": 1}"#).unwrap_err();
        assert!(
            err.to_string().contains("missing field `name`"),
            "unexpected message: {err}"
        );
    }

    #[test]
    fn topic_decode_treats_null_id_as_absent() {
        let topic: Topic = serde_json::from_str(r#"{"name": "topic", "id": null}"#).unwrap();
        assert_eq!(topic.id, None);
    }

    #[test]
    fn subscription_decodes_a_fully_materialized_payload() {
        let subscription: Subscription = serde_json::from_str(full_subscription_json()).unwrap();
        assert_eq!(subscription, full_subscription());
    }

    #[test]
    fn subscription_decode_requires_every_key() {
        for key in ["queue", "topics", "active", "qos", "durable", "id"] {
            let mut payload: serde_json::Map<String, Value> =
                serde_json::from_str(full_subscription_json()).unwrap();
            payload.remove(key);
            let err = serde_json::from_value::<Subscription>(Value::Object(payload)).unwrap_err();
            assert!(
                err.to_string().contains(&format!("missing field `{key}`")),
                "{key}: unexpected message: {err}"
            );
        }
    }

    #[test]
    fn subscription_decode_accepts_null_values() {
        let subscription: Subscription = serde_json::from_str(
            r#"{"queue": null, "topics": null, "active": null, "qos": null, "durable": null, "id": null}"#,
        )
        .unwrap();
        assert_eq!(subscription, Subscription::default());
    }

    #[test]
    fn subscription_encode_omits_absent_fields() {
        let subscription = Subscription {
            qos: Some(Qos::AtMostOnce),
            durable: Some(false),
            ..Subscription::default()
        };
        let json = serde_json::to_value(&subscription).unwrap();
        assert_eq!(json["qos"], "AT_MOST_ONCE");
        assert_eq!(json["durable"], false);
        for absent in ["queue", "topics", "active", "id"] {
            assert!(json.get(absent).is_none(), "{absent} should be omitted");
        }

        let empty = serde_json::to_value(Subscription::default()).unwrap();
        let expected: Value = serde_json::from_str("{}").unwrap();
        assert_eq!(empty, expected);
    }

    #[test]
    fn subscription_round_trips_when_fully_populated() {
        let subscription = full_subscription();
        let json = serde_json::to_string(&subscription).unwrap();
        let back: Subscription = serde_json::from_str(&json).unwrap();
        assert_eq!(back, subscription);
    }

    #[test]
    fn topics_elements_are_discriminated_by_shape() {
        let subscription: Subscription = serde_json::from_str(full_subscription_json()).unwrap();
        let topics = subscription.topics.unwrap();
        assert_eq!(
            topics[0],
            TopicRef::Inline(Topic {
                name: "topic".to_string(),
                id: Some(1),
            })
        );
        assert_eq!(
            topics[1],
            TopicRef::Reference(Value::String("ref-queue-2".to_string()))
        );
    }

    #[test]
    fn an_object_without_a_live_id_stays_a_reference() {
        for raw in [r#"{"name": "pending"}"#, r#"{"name": "pending", "id": null}"#] {
            let reference: TopicRef = serde_json::from_str(raw).unwrap();
            let expected: Value = serde_json::from_str(raw).unwrap();
            assert_eq!(reference, TopicRef::Reference(expected));
        }
    }

    #[test]
    fn an_expanded_topic_must_carry_a_name() {
        let err = serde_json::from_str::<TopicRef>(r#"{"id": 7}"#).unwrap_err();
        assert!(
            err.to_string().contains("missing field `name`"),
            "unexpected message: {err}"
        );
    }

    #[test]
    fn topics_re_encode_losslessly_in_both_shapes() {
        let raw =
            r#"[{"name": "topic", "id": 1}, "ref-queue-2", {"name": "pending", "id": null}, 42]"#;
        let topics: Vec<TopicRef> = serde_json::from_str(raw).unwrap();
        let encoded = serde_json::to_value(&topics).unwrap();
        let expected: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(encoded, expected);
    }

    #[test]
    fn invalid_qos_inside_a_subscription_fails_decode() {
        let raw = r#"{"queue": null, "topics": null, "active": null, "qos": "SOMETIMES", "durable": null, "id": null}"#;
        let err = serde_json::from_str::<Subscription>(raw).unwrap_err();
        assert!(
            err.to_string().contains("qos should be one of"),
            "unexpected message: {err}"
        );
    }
}

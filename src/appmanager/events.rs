//! Metric and log events, and subscriptions that call back when they fire.

use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, Operation};
use crate::error::ApiError;
use crate::schema::{ApiStatus, EventType, platform_response};
use crate::transport::Transport;

const NEW: Operation = Operation::mutation("EventsNew");
const UPDATE: Operation = Operation::mutation("EventsUpdate");
const DELETE: Operation = Operation::mutation("EventsDelete");
const LIST: Operation = Operation::read("EventsList");
const NEW_SUBSCRIPTION: Operation = Operation::mutation("EventSubscriptionsNew");
const DELETE_SUBSCRIPTION: Operation = Operation::mutation("EventSubscriptionsDelete");
const LIST_SUBSCRIPTIONS: Operation = Operation::read("EventSubscriptionsList");

#[cfg(test)]
pub(crate) const OPERATIONS: &[Operation] = &[
    NEW,
    UPDATE,
    DELETE,
    LIST,
    NEW_SUBSCRIPTION,
    DELETE_SUBSCRIPTION,
    LIST_SUBSCRIPTIONS,
];

/// One named condition of an event.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Criterion {
    /// Name referenced from the equation.
    pub name: String,
    /// Metric name or log field.
    pub field: String,
    /// Comparison operator.
    pub operand: String,
    /// Threshold or regex.
    pub value: String,
}

/// Conditions of an event and how they combine.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EventCriteria {
    /// Named conditions.
    pub criteria: Vec<Criterion>,
    /// Boolean expression over criterion names, e.g. `a && !b`.
    pub equation: String,
}

/// Definition of an event.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EventSpec {
    /// Event name.
    pub name: String,
    /// Free-form description.
    pub description: String,
    /// Metric or logging event.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
    /// Conditions.
    #[serde(flatten)]
    pub criteria: EventCriteria,
}

/// A registered event.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Event {
    /// Event identifier.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub event_id: String,
    /// Definition.
    #[serde(flatten)]
    pub spec: EventSpec,
}

/// Where and for which scope an event is delivered.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SubscriptionSpec {
    /// Event subscribed to.
    pub event_id: String,
    /// URL called when the event fires.
    pub callback_url: String,
    /// Body sent to the callback URL.
    pub callback_message_content: String,
    /// Deployment watched.
    pub deployment_id: String,
    /// Narrows the subscription to one worker group.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub worker_group_id: String,
    /// Narrows the subscription to one worker.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub worker_id: String,
}

/// A registered subscription.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Subscription {
    /// Subscription identifier.
    pub subscription_id: String,
    /// What is subscribed.
    #[serde(flatten)]
    pub spec: SubscriptionSpec,
}

/// Registers an event.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct NewRequest {
    /// Definition.
    #[serde(flatten)]
    pub spec: EventSpec,
}

/// Response to [`NewRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct NewResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Identifier of the new event.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub event_id: String,
}

/// Replaces an event's definition.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct UpdateRequest {
    /// Event to update.
    pub event_id: String,
    /// New definition.
    #[serde(flatten)]
    pub spec: EventSpec,
}

/// Removes an event.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DeleteRequest {
    /// Event to remove.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub event_id: String,
}

/// Lists events, optionally of one type.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ListRequest {
    /// Restricts the listing to one type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<EventType>,
}

/// Response to [`ListRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ListResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Matching events.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
}

/// Subscribes to an event.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct NewSubscriptionRequest {
    /// What to subscribe.
    #[serde(flatten)]
    pub spec: SubscriptionSpec,
}

/// Response to [`NewSubscriptionRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct NewSubscriptionResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Identifier of the new subscription.
    pub subscription_id: String,
}

/// Removes a subscription.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DeleteSubscriptionRequest {
    /// Subscription to remove.
    pub subscription_id: String,
}

/// Lists every subscription.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ListSubscriptionsRequest {}

/// Response to [`ListSubscriptionsRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ListSubscriptionsResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Registered subscriptions.
    pub subscriptions: Vec<Subscription>,
}

platform_response!(
    NewResponse,
    ListResponse,
    NewSubscriptionResponse,
    ListSubscriptionsResponse,
);

impl NewRequest {
    /// Registers the event and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn create<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<String, ApiError> {
        let response: NewResponse = dispatcher.call(NEW, self).await?;
        Ok(response.event_id)
    }
}

impl UpdateRequest {
    /// Replaces the definition.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn update<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<(), ApiError> {
        let _: ApiStatus = dispatcher.call(UPDATE, self).await?;
        Ok(())
    }
}

impl DeleteRequest {
    /// Removes the event.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn delete<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<(), ApiError> {
        let _: ApiStatus = dispatcher.call(DELETE, self).await?;
        Ok(())
    }
}

impl ListRequest {
    /// Lists the matching events.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn list<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<Vec<Event>, ApiError> {
        let response: ListResponse = dispatcher.call(LIST, self).await?;
        Ok(response.events)
    }
}

impl NewSubscriptionRequest {
    /// Subscribes and returns the subscription identifier.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn new_subscription<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<String, ApiError> {
        let response: NewSubscriptionResponse = dispatcher.call(NEW_SUBSCRIPTION, self).await?;
        Ok(response.subscription_id)
    }
}

impl DeleteSubscriptionRequest {
    /// Removes the subscription.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn delete_subscription<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<(), ApiError> {
        let _: ApiStatus = dispatcher.call(DELETE_SUBSCRIPTION, self).await?;
        Ok(())
    }
}

impl ListSubscriptionsRequest {
    /// Lists every subscription.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn list_subscriptions<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<Vec<Subscription>, ApiError> {
        let response: ListSubscriptionsResponse = dispatcher.call(LIST_SUBSCRIPTIONS, self).await?;
        Ok(response.subscriptions)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::dispatch::RetryPolicy;
    use crate::test_support::{ScriptedTransport, assert_round_trips, ok_body};

    fn dispatcher(transport: &ScriptedTransport) -> Dispatcher<ScriptedTransport> {
        Dispatcher::with_transport("http://platform.test", transport.clone())
            .with_retry_policy(RetryPolicy::fast())
    }

    fn high_cpu() -> EventSpec {
        EventSpec {
            name: String::from("high-cpu"),
            description: String::from("CPU above 90%"),
            event_type: Some(EventType::Metric),
            criteria: EventCriteria {
                criteria: vec![Criterion {
                    name: String::from("a"),
                    field: String::from("cpu"),
                    operand: String::from(">"),
                    value: String::from("0.9"),
                }],
                equation: String::from("a"),
            },
        }
    }

    #[tokio::test]
    async fn create_flattens_criteria() {
        let transport = ScriptedTransport::new();
        transport.push_json(&ok_body(json!({ "event_id": "ev-1" })));
        let id = NewRequest { spec: high_cpu() }
            .create(&dispatcher(&transport))
            .await
            .expect("created");
        assert_eq!(id, "ev-1");
        let body = transport.attempts().first().expect("attempt").json().expect("json");
        assert_eq!(body["type"], "Metric");
        assert_eq!(body["equation"], "a");
        assert_eq!(body["criteria"][0]["operand"], ">");
    }

    #[tokio::test]
    async fn create_propagates_server_unavailable() {
        let transport = ScriptedTransport::new();
        transport.push_status(500);
        let err = NewRequest { spec: high_cpu() }
            .create(&dispatcher(&transport))
            .await
            .expect_err("unavailable");
        assert_eq!(err.code, "502");
    }

    #[tokio::test]
    async fn list_filters_by_event_type() {
        let transport = ScriptedTransport::new();
        transport.push_json(&ok_body(json!({
            "events": [{ "event_id": "ev-1", "name": "errors", "type": "Logging" }]
        })));
        let events = ListRequest {
            event_type: Some(EventType::Logging),
        }
        .list(&dispatcher(&transport))
        .await
        .expect("listed");
        assert_eq!(
            events.first().and_then(|e| e.spec.event_type.clone()),
            Some(EventType::Logging)
        );
        let body = transport.attempts().first().expect("attempt").json().expect("json");
        assert_eq!(body, json!({ "event_type": "Logging" }));
    }

    #[tokio::test]
    async fn subscribe_returns_subscription_id() {
        let transport = ScriptedTransport::new();
        transport.push_json(&ok_body(json!({ "subscription_id": "sub-1" })));
        let id = NewSubscriptionRequest {
            spec: SubscriptionSpec {
                event_id: String::from("ev-1"),
                callback_url: String::from("http://manager/events"),
                deployment_id: String::from("dep"),
                ..SubscriptionSpec::default()
            },
        }
        .new_subscription(&dispatcher(&transport))
        .await
        .expect("subscribed");
        assert_eq!(id, "sub-1");
    }

    #[test]
    fn event_shapes_round_trip() {
        let spec = EventSpec {
            name: String::from("high-cpu"),
            description: String::from("CPU above 80%"),
            event_type: Some(EventType::Metric),
            criteria: EventCriteria {
                criteria: vec![Criterion {
                    name: String::from("a"),
                    field: String::from("cpu"),
                    operand: String::from(">"),
                    value: String::from("0.8"),
                }],
                equation: String::from("a"),
            },
        };
        let subscription = SubscriptionSpec {
            event_id: String::from("ev-1"),
            callback_url: String::from("http://hooks.internal/cpu"),
            callback_message_content: String::from("cpu high"),
            deployment_id: String::from("dep"),
            worker_group_id: String::from("wg"),
            worker_id: String::from("w-1"),
        };
        let ok = ApiStatus {
            status_code: String::from("200"),
            description: String::from("ok"),
        };
        assert_round_trips(&NewRequest { spec: spec.clone() });
        assert_round_trips(&NewResponse {
            status: ok.clone(),
            event_id: String::from("ev-1"),
        });
        assert_round_trips(&UpdateRequest {
            event_id: String::from("ev-1"),
            spec: spec.clone(),
        });
        assert_round_trips(&DeleteRequest {
            event_id: String::from("ev-1"),
        });
        assert_round_trips(&ListRequest {
            event_type: Some(EventType::Logging),
        });
        assert_round_trips(&ListResponse {
            status: ok.clone(),
            events: vec![Event {
                event_id: String::from("ev-1"),
                spec,
            }],
        });
        assert_round_trips(&NewSubscriptionRequest {
            spec: subscription.clone(),
        });
        assert_round_trips(&NewSubscriptionResponse {
            status: ok.clone(),
            subscription_id: String::from("sub-1"),
        });
        assert_round_trips(&DeleteSubscriptionRequest {
            subscription_id: String::from("sub-1"),
        });
        assert_round_trips(&ListSubscriptionsRequest {});
        assert_round_trips(&ListSubscriptionsResponse {
            status: ok,
            subscriptions: vec![Subscription {
                subscription_id: String::from("sub-1"),
                spec: subscription,
            }],
        });
    }
}

//! Scheduled callbacks.

use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, Operation};
use crate::error::ApiError;
use crate::schema::{ApiStatus, platform_response};
use crate::transport::Transport;

const CREATE: Operation = Operation::mutation("CronCreate");
const LIST: Operation = Operation::read("CronList");
const UPDATE: Operation = Operation::mutation("CronUpdate");
const DELETE: Operation = Operation::mutation("CronDelete");

#[cfg(test)]
pub(crate) const OPERATIONS: &[Operation] = &[CREATE, LIST, UPDATE, DELETE];

/// What a cron job does and when.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct CronSpec {
    /// Crontab-format schedule.
    pub schedule: String,
    /// URL called on every tick.
    pub callback_url: String,
    /// Body sent to the callback URL.
    pub callback_message_content: String,
}

/// A registered cron job.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Cron {
    /// Cron identifier.
    pub cron_id: String,
    /// Schedule and callback.
    #[serde(flatten)]
    pub spec: CronSpec,
}

/// Registers a cron job.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct CreateRequest {
    /// Schedule and callback.
    #[serde(flatten)]
    pub spec: CronSpec,
}

/// Response to [`CreateRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct CreateResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Identifier of the new cron job.
    pub cron_id: String,
}

/// Lists every cron job.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ListRequest {}

/// Response to [`ListRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ListResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Registered cron jobs.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cron_list: Vec<Cron>,
}

/// Replaces every field of an existing cron job.
pub type UpdateRequest = Cron;

/// Removes a cron job.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DeleteRequest {
    /// Cron job to remove.
    pub cron_id: String,
}

platform_response!(CreateResponse, ListResponse);

impl CreateRequest {
    /// Registers the job and returns its identifier.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn create<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<String, ApiError> {
        let response: CreateResponse = dispatcher.call(CREATE, self).await?;
        Ok(response.cron_id)
    }
}

impl ListRequest {
    /// Lists every registered job.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn list<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<Vec<Cron>, ApiError> {
        let response: ListResponse = dispatcher.call(LIST, self).await?;
        Ok(response.cron_list)
    }
}

impl Cron {
    /// Overwrites the registered job with this one.
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
    /// Removes the job.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn delete<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<(), ApiError> {
        let _: ApiStatus = dispatcher.call(DELETE, self).await?;
        Ok(())
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

    fn nightly() -> CronSpec {
        CronSpec {
            schedule: String::from("0 2 * * *"),
            callback_url: String::from("http://manager/tick"),
            callback_message_content: String::from("backup"),
        }
    }

    #[tokio::test]
    async fn create_returns_cron_id() {
        let transport = ScriptedTransport::new();
        transport.push_json(&ok_body(json!({ "cron_id": "cron-1" })));
        let id = CreateRequest { spec: nightly() }
            .create(&dispatcher(&transport))
            .await
            .expect("created");
        assert_eq!(id, "cron-1");
        let body = transport.attempts().first().expect("attempt").json().expect("json");
        assert_eq!(body["schedule"], "0 2 * * *");
    }

    #[tokio::test]
    async fn create_surfaces_server_unavailability() {
        let transport = ScriptedTransport::new();
        transport.push_connect_error();
        let err = CreateRequest { spec: nightly() }
            .create(&dispatcher(&transport))
            .await
            .expect_err("unreachable");
        assert_eq!(err.code, "502");
    }

    #[tokio::test]
    async fn update_sends_id_with_spec() {
        let transport = ScriptedTransport::new();
        transport.push_json(&ok_body(json!({})));
        let cron = Cron {
            cron_id: String::from("cron-1"),
            spec: nightly(),
        };
        cron.update(&dispatcher(&transport)).await.expect("updated");
        let body = transport.attempts().first().expect("attempt").json().expect("json");
        assert_eq!(body["cron_id"], "cron-1");
        assert_eq!(body["callback_message_content"], "backup");
    }

    #[tokio::test]
    async fn list_decodes_cron_list() {
        let transport = ScriptedTransport::new();
        transport.push_json(&ok_body(json!({ "cron_list": [{ "cron_id": "a", "schedule": "@hourly" }] })));
        let crons = ListRequest {}
            .list(&dispatcher(&transport))
            .await
            .expect("listed");
        assert_eq!(crons.first().map(|c| c.spec.schedule.as_str()), Some("@hourly"));
    }

    #[test]
    fn cron_shapes_round_trip() {
        let ok = ApiStatus {
            status_code: String::from("200"),
            description: String::from("ok"),
        };
        let spec = CronSpec {
            schedule: String::from("*/5 * * * *"),
            callback_url: String::from("http://manager/tick"),
            callback_message_content: String::from("{\"job\":\"sweep\"}"),
        };
        let cron = Cron {
            cron_id: String::from("cron-1"),
            spec: spec.clone(),
        };
        assert_round_trips(&cron);
        assert_round_trips(&CreateRequest { spec });
        assert_round_trips(&CreateResponse {
            status: ok.clone(),
            cron_id: String::from("cron-1"),
        });
        assert_round_trips(&ListResponse {
            status: ok,
            cron_list: vec![cron],
        });
        assert_round_trips(&DeleteRequest {
            cron_id: String::from("cron-1"),
        });
        assert_round_trips(&ListRequest {});
    }
}

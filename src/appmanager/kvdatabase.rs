//! The platform's key-value store.

use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, Operation};
use crate::error::ApiError;
use crate::schema::{ApiStatus, is_zero, platform_response};
use crate::transport::Transport;

const GET: Operation = Operation::read("DatabaseGet");
const SET: Operation = Operation::mutation("DatabaseSet");
const DELETE: Operation = Operation::mutation("DatabaseDelete");
const RENAME: Operation = Operation::mutation("DatabaseRename");
const LIST: Operation = Operation::read("DatabaseList");

#[cfg(test)]
pub(crate) const OPERATIONS: &[Operation] = &[GET, SET, DELETE, RENAME, LIST];

/// A key and its value.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Record {
    /// Key.
    pub key: String,
    /// Value.
    pub value: String,
}

impl Record {
    /// Pairs `key` with `value`.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Reads the records for a set of keys.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct GetRequest {
    /// Keys to read.
    pub keys: Vec<String>,
}

/// Records returned by get and list.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct RecordsResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Matching records.
    pub records: Vec<Record>,
}

/// Writes records.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SetRequest {
    /// Records to write.
    pub records: Vec<Record>,
}

/// Deletes keys.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DeleteRequest {
    /// Keys to delete.
    pub keys: Vec<String>,
}

/// Response to [`DeleteRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DeleteResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// How many keys existed and were removed.
    #[serde(skip_serializing_if = "is_zero")]
    pub num_keys_deleted: i32,
}

/// One rename in a [`RenameRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct RenameKey {
    /// Current key.
    pub existing_name: String,
    /// New key.
    pub new_name: String,
    /// Replace the new key if it already exists.
    pub overwrite: bool,
}

/// Outcome of one rename.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct RenameKeyResult {
    /// Key before the rename.
    pub existing_name: String,
    /// Key after the rename.
    pub new_name: String,
    /// Whether the rename happened.
    pub result: bool,
}

/// Renames keys.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct RenameRequest {
    /// Renames to apply.
    pub rename_keys: Vec<RenameKey>,
}

/// Response to [`RenameRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct RenameResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// One result per requested rename.
    pub rename_keys: Vec<RenameKeyResult>,
}

/// Lists records whose key starts with a prefix.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ListRequest {
    /// Key prefix; empty lists every record.
    pub key_prefix: String,
}

platform_response!(RecordsResponse, DeleteResponse, RenameResponse);

impl GetRequest {
    /// Reads the records for `keys`.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn get<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<Vec<Record>, ApiError> {
        let response: RecordsResponse = dispatcher.call(GET, self).await?;
        Ok(response.records)
    }
}

impl SetRequest {
    /// Writes the records.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn set<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<(), ApiError> {
        let _: ApiStatus = dispatcher.call(SET, self).await?;
        Ok(())
    }
}

impl DeleteRequest {
    /// Deletes the keys and returns how many were removed.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn delete<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<i32, ApiError> {
        let response: DeleteResponse = dispatcher.call(DELETE, self).await?;
        Ok(response.num_keys_deleted)
    }
}

impl RenameRequest {
    /// Applies the renames.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn rename<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<Vec<RenameKeyResult>, ApiError> {
        let response: RenameResponse = dispatcher.call(RENAME, self).await?;
        Ok(response.rename_keys)
    }
}

impl ListRequest {
    /// Lists the records under the prefix.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn list<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<Vec<Record>, ApiError> {
        let response: RecordsResponse = dispatcher.call(LIST, self).await?;
        Ok(response.records)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::dispatch::RetryPolicy;
    use crate::test_support::{ScriptedTransport, assert_round_trips, ok_body};

    fn dispatcher(transport: &ScriptedTransport) -> Dispatcher<ScriptedTransport> {
        Dispatcher::with_transport("http://platform.test", transport.clone())
            .with_retry_policy(RetryPolicy::fast())
    }

    #[tokio::test]
    async fn get_returns_records() {
        let transport = ScriptedTransport::new();
        transport.push_json(&ok_body(json!({ "records": [{ "key": "a", "value": "1" }] })));
        let records = GetRequest {
            keys: vec![String::from("a")],
        }
        .get(&dispatcher(&transport))
        .await
        .expect("read");
        assert_eq!(records, vec![Record::new("a", "1")]);
    }

    #[tokio::test]
    async fn delete_reports_count() {
        let transport = ScriptedTransport::new();
        transport.push_json(&ok_body(json!({ "num_keys_deleted": 2 })));
        let deleted = DeleteRequest {
            keys: vec![String::from("a"), String::from("b")],
        }
        .delete(&dispatcher(&transport))
        .await
        .expect("deleted");
        assert_eq!(deleted, 2);
    }

    #[tokio::test]
    async fn rename_reports_each_key() {
        let transport = ScriptedTransport::new();
        transport.push_json(&ok_body(json!({
            "rename_keys": [{ "existing_name": "a", "new_name": "b", "result": false }]
        })));
        let results = RenameRequest {
            rename_keys: vec![RenameKey {
                existing_name: String::from("a"),
                new_name: String::from("b"),
                overwrite: false,
            }],
        }
        .rename(&dispatcher(&transport))
        .await
        .expect("renamed");
        assert_eq!(results.first().map(|r| r.result), Some(false));
    }

    #[rstest]
    #[case::set(503, 1)]
    #[case::set_rejected(400, 1)]
    #[tokio::test]
    async fn set_is_never_resent(#[case] status: u16, #[case] attempts: usize) {
        let transport = ScriptedTransport::new();
        transport.push_repeated_status(status, 6);
        let outcome = SetRequest {
            records: vec![Record::new("a", "1")],
        }
        .set(&dispatcher(&transport))
        .await;
        assert!(outcome.is_err());
        assert_eq!(transport.attempt_count(), attempts);
    }

    #[tokio::test]
    async fn list_retries_reads() {
        let transport = ScriptedTransport::new();
        transport.push_connect_error();
        transport.push_json(&ok_body(json!({ "records": [] })));
        let records = ListRequest {
            key_prefix: String::from("cfg/"),
        }
        .list(&dispatcher(&transport))
        .await
        .expect("listed");
        assert!(records.is_empty());
        assert_eq!(transport.attempt_count(), 2);
    }

    #[test]
    fn database_shapes_round_trip() {
        let ok = ApiStatus {
            status_code: String::from("200"),
            description: String::new(),
        };
        assert_round_trips(&GetRequest {
            keys: vec![String::from("colour"), String::from("size")],
        });
        assert_round_trips(&RecordsResponse {
            status: ok.clone(),
            records: vec![Record::new("colour", "blue")],
        });
        assert_round_trips(&SetRequest {
            records: vec![Record::new("colour", "blue"), Record::new("size", "")],
        });
        assert_round_trips(&DeleteRequest {
            keys: vec![String::from("colour")],
        });
        assert_round_trips(&DeleteResponse {
            status: ok.clone(),
            num_keys_deleted: 1,
        });
        assert_round_trips(&RenameRequest {
            rename_keys: vec![RenameKey {
                existing_name: String::from("colour"),
                new_name: String::from("color"),
                overwrite: true,
            }],
        });
        assert_round_trips(&RenameResponse {
            status: ok,
            rename_keys: vec![RenameKeyResult {
                existing_name: String::from("colour"),
                new_name: String::from("color"),
                result: true,
            }],
        });
        assert_round_trips(&ListRequest {
            key_prefix: String::from("col"),
        });
    }
}

//! Secret storage and credential generation.
//!
//! Secrets are scoped to a deployment when `deployment_id` is set, and to the
//! application otherwise. Worker-side code uses the same shapes through
//! [`crate::worker::secrets`].

use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, Operation};
use crate::error::ApiError;
use crate::schema::{ApiStatus, CredentialType, is_zero, platform_response};
use crate::transport::Transport;

const STORE: Operation = Operation::mutation("SecretsStore");
const RETRIEVE: Operation = Operation::read("SecretsRetrieve");
const DELETE: Operation = Operation::mutation("SecretsDelete");
const GENERATE: Operation = Operation::mutation("SecretsGenerateCredentials");
const GENERATE_STORE: Operation = Operation::mutation("SecretsGenerateStoreCredentials");

#[cfg(test)]
pub(crate) const OPERATIONS: &[Operation] = &[STORE, RETRIEVE, DELETE, GENERATE, GENERATE_STORE];

/// Names one secret.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SecretSpec {
    /// Owning deployment; empty for application-wide secrets.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deployment_id: String,
    /// Secret name.
    pub secret_key: String,
}

impl SecretSpec {
    /// Names the application-wide secret `secret_key`.
    #[must_use]
    pub fn new(secret_key: impl Into<String>) -> Self {
        Self {
            deployment_id: String::new(),
            secret_key: secret_key.into(),
        }
    }

    /// Scopes the secret to `deployment_id`.
    #[must_use]
    pub fn in_deployment(mut self, deployment_id: impl Into<String>) -> Self {
        self.deployment_id = deployment_id.into();
        self
    }
}

/// Shape of generated credentials.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct CredentialFormat {
    /// Character class of the credential.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub credential_type: Option<CredentialType>,
    /// Length of the credential.
    #[serde(skip_serializing_if = "is_zero")]
    pub length: i32,
    /// Regex the credential must match when the type is `Regex`.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub regex_format: String,
}

/// Stores a secret value.
#[derive(Clone, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct StoreSecretRequest {
    /// Which secret.
    #[serde(flatten)]
    pub spec: SecretSpec,
    /// Value to store.
    pub secret_value: String,
    /// Replace an existing value.
    pub overwrite: bool,
}

impl std::fmt::Debug for StoreSecretRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreSecretRequest")
            .field("spec", &self.spec)
            .field("secret_value", &"<redacted>")
            .field("overwrite", &self.overwrite)
            .finish()
    }
}

/// Reads a secret value.
pub type RetrieveSecretRequest = SecretSpec;
/// Deletes a secret.
pub type DeleteSecretRequest = SecretSpec;

/// Response carrying a secret value.
#[derive(Clone, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SecretValueResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// The secret.
    #[serde(rename = "secret_value", skip_serializing_if = "String::is_empty")]
    pub secret: String,
}

impl std::fmt::Debug for SecretValueResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretValueResponse")
            .field("status", &self.status)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Generates a credential without storing it.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct GenerateCredentialsRequest {
    /// Deployment the credential is for.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub deployment_id: String,
    /// Shape of the credential.
    #[serde(flatten)]
    pub format: CredentialFormat,
}

/// Generates a credential and stores it under a secret name.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct GenerateStoreCredentialsRequest {
    /// Where to store the credential.
    #[serde(flatten)]
    pub spec: SecretSpec,
    /// Shape of the credential.
    #[serde(flatten)]
    pub format: CredentialFormat,
}

platform_response!(SecretValueResponse);

impl StoreSecretRequest {
    /// Stores the value.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn store<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<(), ApiError> {
        let _: ApiStatus = dispatcher.call(STORE, self).await?;
        Ok(())
    }
}

impl SecretSpec {
    /// Reads the secret value.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn retrieve<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<String, ApiError> {
        let response: SecretValueResponse = dispatcher.call(RETRIEVE, self).await?;
        Ok(response.secret)
    }

    /// Deletes the secret.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn delete<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<(), ApiError> {
        let _: ApiStatus = dispatcher.call(DELETE, self).await?;
        Ok(())
    }
}

impl GenerateCredentialsRequest {
    /// Generates and returns a credential.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn generate<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<String, ApiError> {
        let response: SecretValueResponse = dispatcher.call(GENERATE, self).await?;
        Ok(response.secret)
    }
}

impl GenerateStoreCredentialsRequest {
    /// Generates a credential and stores it without returning it.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn generate_and_store<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<(), ApiError> {
        let _: ApiStatus = dispatcher.call(GENERATE_STORE, self).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::dispatch::RetryPolicy;
    use crate::test_support::{ScriptedTransport, assert_round_trips, failure_body, ok_body};

    fn dispatcher(transport: &ScriptedTransport) -> Dispatcher<ScriptedTransport> {
        Dispatcher::with_transport("http://platform.test", transport.clone())
            .with_retry_policy(RetryPolicy::fast())
    }

    #[tokio::test]
    async fn store_keeps_key_and_value_apart() {
        let transport = ScriptedTransport::new();
        transport.push_json(&ok_body(json!({})));
        let request = StoreSecretRequest {
            spec: SecretSpec::new("db-password"),
            secret_value: String::from("hunter2"),
            overwrite: true,
        };
        request.store(&dispatcher(&transport)).await.expect("stored");
        let body = transport.attempts().first().expect("attempt").json().expect("json");
        assert_eq!(
            body,
            json!({ "secret_key": "db-password", "secret_value": "hunter2", "overwrite": true })
        );
    }

    #[tokio::test]
    async fn retrieve_returns_secret_value() {
        let transport = ScriptedTransport::new();
        transport.push_json(&ok_body(json!({ "secret_value": "hunter2" })));
        let secret = SecretSpec::new("db-password")
            .in_deployment("dep")
            .retrieve(&dispatcher(&transport))
            .await
            .expect("retrieved");
        assert_eq!(secret, "hunter2");
        let body = transport.attempts().first().expect("attempt").json().expect("json");
        assert_eq!(body["deployment_id"], "dep");
    }

    #[tokio::test]
    async fn generate_store_flattens_format() {
        let transport = ScriptedTransport::new();
        transport.push_json(&failure_body("403", "quota exceeded"));
        let request = GenerateStoreCredentialsRequest {
            spec: SecretSpec::new("api-key"),
            format: CredentialFormat {
                credential_type: Some(CredentialType::Hexadecimal),
                length: 32,
                regex_format: String::new(),
            },
        };
        let err = request
            .generate_and_store(&dispatcher(&transport))
            .await
            .expect_err("quota");
        assert_eq!(err.code, "403");
        let body = transport.attempts().first().expect("attempt").json().expect("json");
        assert_eq!(body["type"], "Hexadecimal");
        assert_eq!(body["length"], 32);
    }

    #[test]
    fn debug_never_prints_values() {
        let request = StoreSecretRequest {
            secret_value: String::from("hunter2"),
            ..StoreSecretRequest::default()
        };
        assert!(!format!("{request:?}").contains("hunter2"));
    }

    #[test]
    fn secret_shapes_round_trip() {
        let format = CredentialFormat {
            credential_type: Some(CredentialType::Regex),
            length: 24,
            regex_format: String::from("[a-z]{24}"),
        };
        assert_round_trips(&SecretSpec::new("db-password").in_deployment("dep"));
        assert_round_trips(&StoreSecretRequest {
            spec: SecretSpec::new("db-password"),
            secret_value: String::from("hunter2"),
            overwrite: true,
        });
        assert_round_trips(&SecretValueResponse {
            status: ApiStatus {
                status_code: String::from("200"),
                description: String::from("ok"),
            },
            secret: String::from("hunter2"),
        });
        assert_round_trips(&GenerateCredentialsRequest {
            deployment_id: String::from("dep"),
            format: format.clone(),
        });
        assert_round_trips(&GenerateStoreCredentialsRequest {
            spec: SecretSpec::new("api-token").in_deployment("dep"),
            format,
        });
        assert_round_trips(&SecretValueResponse::default());
    }
}

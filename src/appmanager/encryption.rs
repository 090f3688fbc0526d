//! Content encryption with platform-managed keys.

use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, Operation};
use crate::error::ApiError;
use crate::schema::{ApiStatus, platform_response};
use crate::transport::Transport;

const ENCRYPT_CONTENT: Operation = Operation::mutation("EncryptionEncryptContent");
const DECRYPT_CONTENT: Operation = Operation::read("EncryptionDecryptContent");
const DELETE_KEY: Operation = Operation::mutation("EncryptionDeleteKey");

#[cfg(test)]
pub(crate) const OPERATIONS: &[Operation] = &[ENCRYPT_CONTENT, DECRYPT_CONTENT, DELETE_KEY];

/// Encrypts a string under a fresh key.
#[derive(Clone, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EncryptContentRequest {
    /// Plain text.
    pub content: String,
}

/// Ciphertext and the key it was produced with.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EncryptedContent {
    /// Ciphertext.
    pub encrypted_content: String,
    /// Identifier of the key; needed to decrypt.
    pub encryption_key_identifier: String,
}

/// Response to [`EncryptContentRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EncryptContentResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Ciphertext and key.
    #[serde(flatten)]
    pub encrypted: EncryptedContent,
}

/// Decrypts content produced by [`EncryptContentRequest`].
pub type DecryptContentRequest = EncryptedContent;

/// Response to [`DecryptContentRequest`].
#[derive(Clone, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DecryptContentResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Plain text.
    pub content: String,
}

/// Deletes an encryption key; content encrypted under it becomes unreadable.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DeleteKeyRequest {
    /// Key to delete.
    pub encryption_key_identifier: String,
}

impl std::fmt::Debug for EncryptContentRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EncryptContentRequest")
            .field("content", &"<redacted>")
            .finish()
    }
}

impl std::fmt::Debug for DecryptContentResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptContentResponse")
            .field("status", &self.status)
            .field("content", &"<redacted>")
            .finish()
    }
}

platform_response!(EncryptContentResponse, DecryptContentResponse);

impl EncryptContentRequest {
    /// Wraps `content` for encryption.
    #[must_use]
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
        }
    }

    /// Encrypts the content.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn encrypt_content<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<EncryptedContent, ApiError> {
        let response: EncryptContentResponse = dispatcher.call(ENCRYPT_CONTENT, self).await?;
        Ok(response.encrypted)
    }
}

impl EncryptedContent {
    /// Decrypts the content.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn decrypt_content<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<String, ApiError> {
        let response: DecryptContentResponse = dispatcher.call(DECRYPT_CONTENT, self).await?;
        Ok(response.content)
    }
}

impl DeleteKeyRequest {
    /// Addresses the key `encryption_key_identifier`.
    #[must_use]
    pub fn new(encryption_key_identifier: impl Into<String>) -> Self {
        Self {
            encryption_key_identifier: encryption_key_identifier.into(),
        }
    }

    /// Deletes the key.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn delete_key<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<(), ApiError> {
        let _: ApiStatus = dispatcher.call(DELETE_KEY, self).await?;
        Ok(())
    }
}

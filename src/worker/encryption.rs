//! Encrypting files in place from inside a worker.

use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, Operation};
use crate::error::ApiError;
use crate::schema::{ApiStatus, platform_response};
use crate::transport::Transport;

pub use crate::appmanager::encryption::DeleteKeyRequest;

const ENCRYPT_FILE: Operation = Operation::mutation("EncryptionEncryptFile");
const DECRYPT_FILE: Operation = Operation::mutation("EncryptionDecryptFile");

#[cfg(test)]
pub(crate) const OPERATIONS: &[Operation] = &[ENCRYPT_FILE, DECRYPT_FILE];

/// Encrypts a file or every file under a directory.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EncryptFileRequest {
    /// Path inside the worker.
    pub file_or_directory: String,
}

/// Response to [`EncryptFileRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EncryptFileResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Key the files were encrypted with.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub encryption_key_identifier: String,
}

/// Decrypts a file produced by [`EncryptFileRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DecryptFileRequest {
    /// Path of the encrypted file.
    pub encrypted_file: String,
    /// Key it was encrypted with.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub encryption_key_identifier: String,
}

platform_response!(EncryptFileResponse);

impl EncryptFileRequest {
    /// Encrypts the path and returns the key identifier.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn encrypt_file<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<String, ApiError> {
        let response: EncryptFileResponse = dispatcher.call(ENCRYPT_FILE, self).await?;
        Ok(response.encryption_key_identifier)
    }
}

impl DecryptFileRequest {
    /// Decrypts the file.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn decrypt_file<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<(), ApiError> {
        let _: ApiStatus = dispatcher.call(DECRYPT_FILE, self).await?;
        Ok(())
    }
}

//! Secret access from inside a worker.

pub use crate::appmanager::secrets::{
    CredentialFormat, DeleteSecretRequest, GenerateCredentialsRequest,
    GenerateStoreCredentialsRequest, RetrieveSecretRequest, SecretSpec, SecretValueResponse,
    StoreSecretRequest,
};

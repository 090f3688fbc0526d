//! Email notification templates and sending.
//!
//! A template is registered once with [`AddEmailRequest`]; sending fills its
//! placeholders. Recipient addresses must be verified before anything is
//! delivered to them.

use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, Operation};
use crate::error::ApiError;
use crate::schema::{ApiStatus, platform_response};
use crate::transport::Transport;

const ADD_EMAIL: Operation = Operation::mutation("NotificationsAddEmail");
const SEND_EMAIL: Operation = Operation::mutation("NotificationsSendEmail");
const DELETE_EMAIL: Operation = Operation::mutation("NotificationsDeleteEmail");
const UPDATE_EMAIL: Operation = Operation::mutation("NotificationsUpdateEmail");
const LIST_EMAIL: Operation = Operation::read("NotificationsListEmail");
const VERIFY_EMAIL_ID: Operation = Operation::mutation("NotificationVerifyEmailID");
const LIST_VERIFIED_EMAIL_IDS: Operation = Operation::read("NotificationVerifiedEmailIDsList");

#[cfg(test)]
pub(crate) const OPERATIONS: &[Operation] = &[
    ADD_EMAIL,
    SEND_EMAIL,
    DELETE_EMAIL,
    UPDATE_EMAIL,
    LIST_EMAIL,
    VERIFY_EMAIL_ID,
    LIST_VERIFIED_EMAIL_IDS,
];

/// Addressee, subject and body of an email template.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct NotificationTemplate {
    /// Recipient address.
    pub to_email: String,
    /// Subject line.
    pub subject: String,
    /// Body with `{placeholder}` markers.
    pub body: String,
}

/// A registered template.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct Notification {
    /// Template content.
    #[serde(flatten)]
    pub template: NotificationTemplate,
    /// Template identifier.
    pub notification_id: String,
}

/// One placeholder substitution.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct EmailTemplateContent {
    /// Placeholder name.
    pub placeholder_key: String,
    /// Text substituted for it.
    pub replacement_value: String,
}

impl EmailTemplateContent {
    /// Replaces `placeholder_key` with `replacement_value`.
    #[must_use]
    pub fn new(placeholder_key: impl Into<String>, replacement_value: impl Into<String>) -> Self {
        Self {
            placeholder_key: placeholder_key.into(),
            replacement_value: replacement_value.into(),
        }
    }
}

/// Registers a template.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct AddEmailRequest {
    /// Template content.
    #[serde(flatten)]
    pub template: NotificationTemplate,
}

/// Sends an email from a template.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct SendEmailRequest {
    /// Template to send.
    pub notification_id: String,
    /// Placeholder substitutions.
    pub email_template_content: Vec<EmailTemplateContent>,
}

/// Removes a template.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct DeleteEmailRequest {
    /// Template to remove.
    pub notification_id: String,
}

/// Replaces a template's content.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct UpdateEmailRequest {
    /// Template to replace.
    pub notification_id: String,
    /// New content.
    #[serde(flatten)]
    pub template: NotificationTemplate,
}

/// Lists every template.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ListEmailRequest {}

/// Response to [`ListEmailRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ListEmailResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Registered templates.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub notification_list: Vec<Notification>,
}

/// Starts verification of a recipient address.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct VerifyEmailIdRequest {
    /// Address to verify.
    pub email_id: String,
}

/// Lists verified recipient addresses.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct ListVerifiedEmailIdsRequest {}

/// Response to [`ListVerifiedEmailIdsRequest`].
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(default)]
pub struct ListVerifiedEmailIdsResponse {
    /// Status envelope.
    #[serde(flatten)]
    pub status: ApiStatus,
    /// Verified addresses.
    pub verified_email_ids: Vec<String>,
}

platform_response!(ListEmailResponse, ListVerifiedEmailIdsResponse);

async fn acknowledge<T: Transport, Req: Serialize + Sync>(
    dispatcher: &Dispatcher<T>,
    operation: Operation,
    request: &Req,
) -> Result<(), ApiError> {
    let _: ApiStatus = dispatcher.call(operation, request).await?;
    Ok(())
}

impl AddEmailRequest {
    /// Registers the template.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn add_email<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<(), ApiError> {
        acknowledge(dispatcher, ADD_EMAIL, self).await
    }
}

impl SendEmailRequest {
    /// Sends the email.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn send_email<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<(), ApiError> {
        acknowledge(dispatcher, SEND_EMAIL, self).await
    }
}

impl DeleteEmailRequest {
    /// Removes the template.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn delete_email<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<(), ApiError> {
        acknowledge(dispatcher, DELETE_EMAIL, self).await
    }
}

impl UpdateEmailRequest {
    /// Replaces the template.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn update_email<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<(), ApiError> {
        acknowledge(dispatcher, UPDATE_EMAIL, self).await
    }
}

impl ListEmailRequest {
    /// Lists every template.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn list_email<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<Vec<Notification>, ApiError> {
        let response: ListEmailResponse = dispatcher.call(LIST_EMAIL, self).await?;
        Ok(response.notification_list)
    }
}

impl VerifyEmailIdRequest {
    /// Sends a verification mail to the address.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn verify_email_id<T: Transport>(&self, dispatcher: &Dispatcher<T>) -> Result<(), ApiError> {
        acknowledge(dispatcher, VERIFY_EMAIL_ID, self).await
    }
}

impl ListVerifiedEmailIdsRequest {
    /// Lists verified addresses.
    ///
    /// # Errors
    ///
    /// Returns the dispatcher's or the platform's [`ApiError`].
    pub async fn list_verified_email_ids<T: Transport>(
        &self,
        dispatcher: &Dispatcher<T>,
    ) -> Result<Vec<String>, ApiError> {
        let response: ListVerifiedEmailIdsResponse =
            dispatcher.call(LIST_VERIFIED_EMAIL_IDS, self).await?;
        Ok(response.verified_email_ids)
    }
}

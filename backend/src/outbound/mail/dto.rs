//! Wire format for the mail relay.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Serialize;

use crate::domain::ports::{MailAttachment, MailMessage};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RelayMessageDto<'a> {
    pub from: &'a str,
    pub to: &'a [String],
    pub subject: &'a str,
    pub text: &'a str,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<RelayAttachmentDto<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct RelayAttachmentDto<'a> {
    pub filename: &'a str,
    pub content_type: &'a str,
    /// Base64 (standard alphabet, padded) file contents.
    pub content: String,
}

impl<'a> RelayMessageDto<'a> {
    pub fn new(from: &'a str, to: &'a [String], message: &'a MailMessage) -> Self {
        Self {
            from,
            to,
            subject: message.subject.as_str(),
            text: message.body.as_str(),
            attachments: message.attachments.iter().map(RelayAttachmentDto::from).collect(),
        }
    }
}

impl<'a> From<&'a MailAttachment> for RelayAttachmentDto<'a> {
    fn from(value: &'a MailAttachment) -> Self {
        Self {
            filename: value.file_name.as_str(),
            content_type: value.content_type.as_str(),
            content: STANDARD.encode(&value.data),
        }
    }
}

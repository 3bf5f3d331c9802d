//! Messaging gateway port - outbound actions on the chat platform

use async_trait::async_trait;

use crate::error::DomainError;
use crate::value_objects::{GroupId, ParticipantId};

/// Destination of an outbound message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recipient {
    Participant(ParticipantId),
    Group(GroupId),
}

/// Text formatting hint for the platform adapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageFormat {
    #[default]
    Plain,
    Markdown,
    Html,
}

/// Outbound interface to the messaging platform.
///
/// Implementations live outside the engine; all methods map 1:1 onto
/// platform calls and surface failures as [`DomainError::DeliveryFailed`].
#[async_trait]
pub trait MessagingGateway: Send + Sync {
    /// Send a text message to a participant or group
    async fn send_message(
        &self,
        recipient: Recipient,
        text: &str,
        format: MessageFormat,
    ) -> Result<(), DomainError>;

    /// Approve a pending join request
    async fn approve_join_request(
        &self,
        group: GroupId,
        participant: ParticipantId,
    ) -> Result<(), DomainError>;

    /// Ban (expel) a member from the group
    async fn ban_member(&self, group: GroupId, participant: ParticipantId)
        -> Result<(), DomainError>;
}

//! Inbound events delivered by the messaging gateway

use crate::value_objects::ParticipantId;

/// Events the verification engine consumes from the gateway
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GatewayEvent {
    /// A participant asked to join the gated group
    JoinRequested { participant_id: ParticipantId },
    /// A participant sent the bot a private text message
    PrivateText {
        participant_id: ParticipantId,
        text: String,
    },
}

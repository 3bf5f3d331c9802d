//! Console gateway adapter
//!
//! A development stand-in for a real messaging platform: outbound actions
//! are logged, inbound events are parsed from stdin lines. The engine only
//! sees the [`MessagingGateway`] trait and [`GatewayEvent`] values, so a
//! platform adapter replaces this module without touching anything else.
//!
//! Input syntax, one event per line:
//! ```text
//! join <participant_id>
//! msg <participant_id> <text...>
//! ```

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{info, warn};

use vip_core::error::DomainError;
use vip_core::events::GatewayEvent;
use vip_core::traits::{MessageFormat, MessagingGateway, Recipient};
use vip_core::value_objects::{GroupId, ParticipantId};

/// Gateway that logs outbound actions instead of delivering them
#[derive(Debug, Default)]
pub struct ConsoleGateway;

impl ConsoleGateway {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl MessagingGateway for ConsoleGateway {
    async fn send_message(
        &self,
        recipient: Recipient,
        text: &str,
        _format: MessageFormat,
    ) -> Result<(), DomainError> {
        match recipient {
            Recipient::Participant(id) => info!(participant_id = %id, text, "[send]"),
            Recipient::Group(id) => info!(group_id = %id, text, "[send]"),
        }
        Ok(())
    }

    async fn approve_join_request(
        &self,
        group: GroupId,
        participant: ParticipantId,
    ) -> Result<(), DomainError> {
        info!(group_id = %group, participant_id = %participant, "[approve]");
        Ok(())
    }

    async fn ban_member(
        &self,
        group: GroupId,
        participant: ParticipantId,
    ) -> Result<(), DomainError> {
        info!(group_id = %group, participant_id = %participant, "[ban]");
        Ok(())
    }
}

/// Spawn a task turning stdin lines into gateway events
pub fn spawn_stdin_events() -> mpsc::Receiver<GatewayEvent> {
    let (tx, rx) = mpsc::channel(64);
    tokio::spawn(async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            match parse_event(&line) {
                Some(event) => {
                    if tx.send(event).await.is_err() {
                        break;
                    }
                }
                None => {
                    if !line.trim().is_empty() {
                        warn!(line, "unparseable gateway line");
                    }
                }
            }
        }
    });
    rx
}

/// Parse one console line into a gateway event
fn parse_event(line: &str) -> Option<GatewayEvent> {
    let line = line.trim();
    let (verb, rest) = line.split_once(' ')?;
    match verb {
        "join" => {
            let id: i64 = rest.trim().parse().ok()?;
            Some(GatewayEvent::JoinRequested {
                participant_id: ParticipantId::new(id),
            })
        }
        "msg" => {
            let (id, text) = rest.trim().split_once(' ')?;
            let id: i64 = id.parse().ok()?;
            Some(GatewayEvent::PrivateText {
                participant_id: ParticipantId::new(id),
                text: text.to_string(),
            })
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_join_event() {
        assert_eq!(
            parse_event("join 42"),
            Some(GatewayEvent::JoinRequested {
                participant_id: ParticipantId::new(42)
            })
        );
    }

    #[test]
    fn test_parse_msg_event_keeps_full_text() {
        assert_eq!(
            parse_event("msg 42 my uid is 123"),
            Some(GatewayEvent::PrivateText {
                participant_id: ParticipantId::new(42),
                text: "my uid is 123".to_string()
            })
        );
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert_eq!(parse_event(""), None);
        assert_eq!(parse_event("join"), None);
        assert_eq!(parse_event("join abc"), None);
        assert_eq!(parse_event("msg 42"), None);
        assert_eq!(parse_event("kick 42"), None);
    }
}

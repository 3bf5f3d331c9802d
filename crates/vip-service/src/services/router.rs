//! Event router - dispatches gateway events to the right handler
//!
//! Admin commands are peeled off first; everything else is part of the
//! admission conversation.

use std::sync::Arc;
use tracing::instrument;

use vip_core::events::GatewayEvent;

use super::admin::AdminCommands;
use super::admission::AdmissionController;
use super::error::ServiceResult;

/// Routes inbound gateway events
pub struct EventRouter {
    admission: Arc<AdmissionController>,
    admin: Arc<AdminCommands>,
}

impl EventRouter {
    pub fn new(admission: Arc<AdmissionController>, admin: Arc<AdminCommands>) -> Self {
        Self { admission, admin }
    }

    /// Handle one inbound event to completion
    #[instrument(skip(self, event))]
    pub async fn handle(&self, event: GatewayEvent) -> ServiceResult<()> {
        match event {
            GatewayEvent::JoinRequested { participant_id } => {
                self.admission.on_join_requested(participant_id).await
            }
            GatewayEvent::PrivateText {
                participant_id,
                text,
            } => {
                if self.admin.try_handle(participant_id, &text).await? {
                    return Ok(());
                }
                self.admission.on_private_text(participant_id, &text).await
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::LifecycleScheduler;
    use crate::testing::{
        test_context, InMemoryMembers, InMemoryMeta, InMemoryTracked, RecordingGateway,
        ScriptedLookup,
    };
    use vip_core::traits::{MemberRepository, TrackedAccountRepository};
    use vip_core::value_objects::ParticipantId;

    struct Rig {
        members: Arc<InMemoryMembers>,
        tracked: Arc<InMemoryTracked>,
        gateway: Arc<RecordingGateway>,
        router: EventRouter,
    }

    fn rig() -> Rig {
        let members = Arc::new(InMemoryMembers::default());
        let tracked = Arc::new(InMemoryTracked::default());
        let gateway = Arc::new(RecordingGateway::default());
        let ctx = test_context(
            Arc::clone(&members),
            Arc::clone(&tracked),
            Arc::new(InMemoryMeta::default()),
            Arc::new(ScriptedLookup::default()),
            Arc::clone(&gateway),
        );
        let scheduler = LifecycleScheduler::new(Arc::clone(&ctx));
        let admission = Arc::new(AdmissionController::new(Arc::clone(&ctx), scheduler));
        let admin = Arc::new(AdminCommands::new(ctx));
        let router = EventRouter::new(admission, admin);
        Rig {
            members,
            tracked,
            gateway,
            router,
        }
    }

    #[tokio::test]
    async fn test_join_event_routes_to_admission() {
        let r = rig();
        r.router
            .handle(GatewayEvent::JoinRequested {
                participant_id: ParticipantId::new(7),
            })
            .await
            .unwrap();
        assert!(r.members.find(ParticipantId::new(7)).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_admin_command_consumed_before_admission() {
        let r = rig();
        // ParticipantId 1 is an admin; the command must not reach admission
        r.router
            .handle(GatewayEvent::PrivateText {
                participant_id: ParticipantId::new(1),
                text: "/track 4242".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(r.tracked.count().await.unwrap(), 1);
        assert!(r.members.find(ParticipantId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_non_admin_text_routes_to_admission() {
        let r = rig();
        r.router
            .handle(GatewayEvent::PrivateText {
                participant_id: ParticipantId::new(99),
                text: "/track 4242".to_string(),
            })
            .await
            .unwrap();

        // Treated as conversation, not a command
        assert_eq!(r.tracked.count().await.unwrap(), 0);
        assert_eq!(r.gateway.sent.lock().unwrap().len(), 1);
    }
}

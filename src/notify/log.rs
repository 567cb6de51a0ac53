//! Notifier that writes session events to the tracing log

use async_trait::async_trait;
use tracing::{info, warn};

use super::messages::SessionEvent;
use crate::common::errors::Result;
use crate::common::traits::Notifier;
use crate::common::types::SessionId;

/// Fallback channel when no chat is configured
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

#[async_trait]
impl Notifier for LogNotifier {
    async fn notify(&self, session_id: SessionId, event: &SessionEvent) -> Result<()> {
        let degraded = matches!(
            event,
            SessionEvent::PriceUnavailable { .. }
                | SessionEvent::PriceRejected { .. }
                | SessionEvent::CapitalExhausted { .. }
        );
        if degraded {
            warn!(session_id = %session_id, symbol = event.symbol(), "{}", event);
        } else {
            info!(session_id = %session_id, symbol = event.symbol(), "{}", event);
        }
        Ok(())
    }

    fn channel_name(&self) -> &'static str {
        "log"
    }
}

//! Message broadcaster port.
//!
//! Real-time fan-out of stored messages to connected clients. Delivery is
//! best-effort: a broadcast never fails and never waits on a slow client.

use async_trait::async_trait;

use crate::domain::foundation::CompanyId;
use crate::domain::message::Message;

/// Pushes a stored message to everyone watching its session.
#[async_trait]
pub trait MessageBroadcaster: Send + Sync {
    /// Deliver to the session's group and the company's operator group.
    ///
    /// Returns the number of connections the event was queued for.
    async fn broadcast_message(&self, company_id: CompanyId, message: &Message) -> usize;
}

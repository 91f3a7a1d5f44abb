//! The status-change notification hub
//!
//! Every case mutation publishes a `CaseEvent`. The hub fans events out on a
//! tokio broadcast channel: publishing never blocks the writer, and a lagging
//! subscriber misses events rather than stalling case mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::debug;

use core_kernel::EventId;

use domain_kyc::KycEvent;
use domain_lending::LoanEvent;
use domain_tickets::TicketEvent;

/// Default buffer depth for the broadcast channel
const DEFAULT_CAPACITY: usize = 256;

/// The domain payload of a case event
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", rename_all = "snake_case")]
pub enum CasePayload {
    Kyc(KycEvent),
    Ticket(TicketEvent),
    Loan(LoanEvent),
}

/// Envelope published to downstream consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaseEvent {
    /// Unique event identifier
    pub id: EventId,
    /// When the event was published
    pub published_at: DateTime<Utc>,
    /// The domain event
    pub payload: CasePayload,
}

impl CaseEvent {
    fn wrap(payload: CasePayload) -> Self {
        Self {
            id: EventId::new_v7(),
            published_at: Utc::now(),
            payload,
        }
    }
}

impl From<KycEvent> for CaseEvent {
    fn from(event: KycEvent) -> Self {
        Self::wrap(CasePayload::Kyc(event))
    }
}

impl From<TicketEvent> for CaseEvent {
    fn from(event: TicketEvent) -> Self {
        Self::wrap(CasePayload::Ticket(event))
    }
}

impl From<LoanEvent> for CaseEvent {
    fn from(event: LoanEvent) -> Self {
        Self::wrap(CasePayload::Loan(event))
    }
}

/// A downstream consumer of case events
#[async_trait::async_trait]
pub trait NotificationSink: Send + Sync {
    async fn deliver(&self, event: &CaseEvent);
}

/// Sink that logs every event through tracing
///
/// Useful as the always-on consumer in environments with no external
/// integrations configured.
#[derive(Debug, Default, Clone)]
pub struct TracingSink;

#[async_trait::async_trait]
impl NotificationSink for TracingSink {
    async fn deliver(&self, event: &CaseEvent) {
        match &event.payload {
            CasePayload::Kyc(e) => {
                debug!(event_id = %event.id, case_id = %e.case_id(), "kyc event");
            }
            CasePayload::Ticket(e) => {
                debug!(event_id = %event.id, ticket_id = %e.ticket_id(), "ticket event");
            }
            CasePayload::Loan(e) => {
                debug!(event_id = %event.id, loan_id = %e.loan_id(), "loan event");
            }
        }
    }
}

/// Fan-out hub for case events
#[derive(Debug, Clone)]
pub struct NotificationHub {
    sender: broadcast::Sender<CaseEvent>,
}

impl NotificationHub {
    /// Creates a hub with the default buffer depth
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Creates a hub with an explicit buffer depth
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all current subscribers
    ///
    /// Returns the number of subscribers that received it. Zero subscribers
    /// is not an error: events are advisory and mutation must not depend on
    /// anyone listening.
    pub fn publish(&self, event: impl Into<CaseEvent>) -> usize {
        self.sender.send(event.into()).unwrap_or(0)
    }

    /// Subscribes to the event stream from this point forward
    pub fn subscribe(&self) -> broadcast::Receiver<CaseEvent> {
        self.sender.subscribe()
    }

    /// Spawns a task that forwards every event to the given sink
    pub fn attach_sink<S>(&self, sink: S) -> tokio::task::JoinHandle<()>
    where
        S: NotificationSink + 'static,
    {
        let mut receiver = self.subscribe();
        tokio::spawn(async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => sink.deliver(&event).await,
                    Err(broadcast::error::RecvError::Lagged(missed)) => {
                        debug!(missed, "notification sink lagged");
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_kernel::{AgentId, KycCaseId};

    fn kyc_event() -> KycEvent {
        KycEvent::ReviewStarted {
            case_id: KycCaseId::new_v7(),
            reviewer: AgentId::new_v7(),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_publish_without_subscribers_is_fine() {
        let hub = NotificationHub::new();
        assert_eq!(hub.publish(kyc_event()), 0);
    }

    #[tokio::test]
    async fn test_subscriber_receives_event() {
        let hub = NotificationHub::new();
        let mut receiver = hub.subscribe();

        let event = kyc_event();
        let case_id = event.case_id();
        assert_eq!(hub.publish(event), 1);

        let received = receiver.recv().await.unwrap();
        match received.payload {
            CasePayload::Kyc(e) => assert_eq!(e.case_id(), case_id),
            other => panic!("unexpected payload: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multiple_subscribers_all_receive() {
        let hub = NotificationHub::new();
        let mut a = hub.subscribe();
        let mut b = hub.subscribe();

        assert_eq!(hub.publish(kyc_event()), 2);
        assert!(a.recv().await.is_ok());
        assert!(b.recv().await.is_ok());
    }

    #[tokio::test]
    async fn test_envelope_wraps_all_domains() {
        let hub = NotificationHub::new();
        let mut receiver = hub.subscribe();

        hub.publish(TicketEvent::TicketEscalated {
            ticket_id: core_kernel::TicketId::new_v7(),
            timestamp: Utc::now(),
        });
        hub.publish(LoanEvent::AutoDebitChanged {
            loan_id: core_kernel::LoanId::new_v7(),
            enabled: true,
            timestamp: Utc::now(),
        });

        assert!(matches!(
            receiver.recv().await.unwrap().payload,
            CasePayload::Ticket(_)
        ));
        assert!(matches!(
            receiver.recv().await.unwrap().payload,
            CasePayload::Loan(_)
        ));
    }

    #[tokio::test]
    async fn test_tracing_sink_attaches() {
        let hub = NotificationHub::new();
        let handle = hub.attach_sink(TracingSink);

        hub.publish(kyc_event());

        // Give the forwarding task a chance to drain, then stop it
        tokio::task::yield_now().await;
        handle.abort();
    }
}

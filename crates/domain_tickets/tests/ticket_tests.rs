//! Comprehensive tests for domain_tickets

use chrono::Duration;

use core_kernel::{AgentId, CustomerId};
use domain_tickets::{
    SlaPolicy, SlaState, Ticket, TicketPriority, TicketStatus,
};

fn open(priority: TicketPriority) -> Ticket {
    Ticket::open(
        CustomerId::new_v7(),
        "Net banking login fails",
        "Customer sees error IB-401 after OTP entry.",
        priority,
    )
}

// ============================================================================
// Lifecycle
// ============================================================================

mod lifecycle {
    use super::*;

    #[test]
    fn test_happy_path_to_resolution() {
        let mut ticket = open(TicketPriority::Medium);
        let agent = AgentId::new_v7();

        ticket.assign(agent).unwrap();
        ticket.update_status(TicketStatus::InProgress).unwrap();
        ticket
            .add_comment(Some(agent), "Password policy blocked the reset; fixed.", false)
            .unwrap();
        ticket.update_status(TicketStatus::Resolved).unwrap();

        assert_eq!(ticket.status, TicketStatus::Resolved);
        assert!(ticket.resolved_at.is_some());
        assert!(ticket.first_response_at.is_some());
    }

    #[test]
    fn test_waiting_on_customer_round_trip() {
        let mut ticket = open(TicketPriority::Low);
        ticket.update_status(TicketStatus::InProgress).unwrap();
        ticket.update_status(TicketStatus::Pending).unwrap();
        ticket.update_status(TicketStatus::InProgress).unwrap();
        ticket.update_status(TicketStatus::Resolved).unwrap();
        assert_eq!(ticket.status, TicketStatus::Resolved);
    }

    #[test]
    fn test_trivial_ticket_resolves_from_open() {
        let mut ticket = open(TicketPriority::Low);
        assert!(ticket.update_status(TicketStatus::Resolved).is_ok());
    }

    #[test]
    fn test_invalid_edges_rejected() {
        let mut ticket = open(TicketPriority::Low);

        // Open -> Pending skips the agent
        assert!(ticket.update_status(TicketStatus::Pending).is_err());

        ticket.update_status(TicketStatus::InProgress).unwrap();
        ticket.update_status(TicketStatus::Pending).unwrap();
        // Pending -> Resolved skips the agent confirming the answer
        assert!(ticket.update_status(TicketStatus::Resolved).is_err());
    }

    #[test]
    fn test_resolution_is_terminal() {
        let mut ticket = open(TicketPriority::High);
        ticket.update_status(TicketStatus::Resolved).unwrap();

        assert!(ticket.update_status(TicketStatus::Open).is_err());
        assert!(ticket.update_status(TicketStatus::InProgress).is_err());
        assert!(ticket.assign(AgentId::new_v7()).is_err());
        assert!(ticket.escalate().is_err());
    }
}

// ============================================================================
// SLA
// ============================================================================

mod sla {
    use super::*;

    #[test]
    fn test_deadlines_follow_priority_matrix() {
        let high = open(TicketPriority::High);
        let low = open(TicketPriority::Low);

        assert!(high.sla.resolution_due < low.sla.resolution_due);
        assert!(high.sla.first_response_due < low.sla.first_response_due);
    }

    #[test]
    fn test_escalation_tightens_deadlines_without_resetting_anchor() {
        let mut ticket = open(TicketPriority::Low);
        let low_deadlines = ticket.sla;

        ticket.escalate().unwrap();

        let expected = SlaPolicy::standard(TicketPriority::High).deadlines(ticket.created_at);
        assert_eq!(ticket.sla, expected);
        assert!(ticket.sla.resolution_due < low_deadlines.resolution_due);
    }

    #[test]
    fn test_sla_state_progression() {
        let ticket = open(TicketPriority::High);
        let opened = ticket.created_at;

        assert_eq!(
            ticket.sla.state(opened + Duration::minutes(30), None, None),
            SlaState::OnTrack
        );
        assert_eq!(
            ticket.sla.state(opened + Duration::hours(2), None, None),
            SlaState::FirstResponseBreached
        );
        assert_eq!(
            ticket.sla.state(opened + Duration::hours(20), None, None),
            SlaState::ResolutionBreached
        );
    }

    #[test]
    fn test_first_response_only_from_customer_visible_agent_comment() {
        let mut ticket = open(TicketPriority::Medium);
        let agent = AgentId::new_v7();

        ticket.add_comment(None, "Still broken", false).unwrap();
        ticket.add_comment(Some(agent), "internal triage note", true).unwrap();
        assert!(ticket.first_response_at.is_none());

        ticket
            .add_comment(Some(agent), "We are looking into this now.", false)
            .unwrap();
        let first = ticket.first_response_at.unwrap();

        // Later replies do not move the stamp
        ticket
            .add_comment(Some(agent), "Update: fix deployed.", false)
            .unwrap();
        assert_eq!(ticket.first_response_at, Some(first));
    }
}

// ============================================================================
// Escalation
// ============================================================================

mod escalation {
    use super::*;

    #[test]
    fn test_escalation_sets_high_and_flag() {
        let mut ticket = open(TicketPriority::Low);
        ticket.escalate().unwrap();

        assert!(ticket.escalated);
        assert_eq!(ticket.priority, TicketPriority::High);
    }

    #[test]
    fn test_escalation_is_once_only() {
        let mut ticket = open(TicketPriority::Medium);
        ticket.escalate().unwrap();
        assert!(ticket.escalate().is_err());
    }

    #[test]
    fn test_escalated_high_ticket_keeps_high() {
        let mut ticket = open(TicketPriority::High);
        ticket.escalate().unwrap();
        assert_eq!(ticket.priority, TicketPriority::High);
    }
}

// ============================================================================
// Serialization
// ============================================================================

#[test]
fn test_ticket_round_trips_through_json() {
    let mut ticket = open(TicketPriority::Medium);
    ticket
        .add_comment(Some(AgentId::new_v7()), "Checking.", false)
        .unwrap();

    let json = serde_json::to_string(&ticket).unwrap();
    let back: Ticket = serde_json::from_str(&json).unwrap();

    assert_eq!(back.id, ticket.id);
    assert_eq!(back.status, ticket.status);
    assert_eq!(back.comments.len(), 1);
    assert_eq!(back.sla, ticket.sla);
}

//! Test Data Builders
//!
//! Builder patterns for constructing test aggregates with sensible defaults.

use chrono::NaiveDate;

use core_kernel::{AgentId, CustomerId, Money, Rate};
use domain_kyc::{screen, DocumentKind, KycCase, ReviewDecision};
use domain_lending::EmiSchedule;
use domain_tickets::{Ticket, TicketPriority};

use crate::fixtures::{DocumentFixtures, MoneyFixtures, TemporalFixtures};

/// Builder for KYC cases
pub struct TestKycCaseBuilder {
    customer_id: CustomerId,
    document_kind: DocumentKind,
    document_number: String,
    document_expiry: Option<NaiveDate>,
    in_review_by: Option<AgentId>,
    decision: Option<ReviewDecision>,
}

impl Default for TestKycCaseBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestKycCaseBuilder {
    /// Creates a builder for a clean pending passport case
    pub fn new() -> Self {
        Self {
            customer_id: CustomerId::new_v7(),
            document_kind: DocumentKind::Passport,
            document_number: DocumentFixtures::valid_passport().to_string(),
            document_expiry: None,
            in_review_by: None,
            decision: None,
        }
    }

    /// Sets the customer
    pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = customer_id;
        self
    }

    /// Sets the document presented
    pub fn with_document(mut self, kind: DocumentKind, number: impl Into<String>) -> Self {
        self.document_kind = kind;
        self.document_number = number.into();
        self
    }

    /// Sets the document expiry
    pub fn with_expiry(mut self, expiry: NaiveDate) -> Self {
        self.document_expiry = Some(expiry);
        self
    }

    /// Advances the built case into review
    pub fn in_review_by(mut self, reviewer: AgentId) -> Self {
        self.in_review_by = Some(reviewer);
        self
    }

    /// Advances the built case to a terminal decision
    pub fn decided(mut self, reviewer: AgentId, decision: ReviewDecision) -> Self {
        self.in_review_by = Some(reviewer);
        self.decision = Some(decision);
        self
    }

    /// Builds the case, applying any requested lifecycle steps
    pub fn build(self) -> KycCase {
        let screening = screen(
            &self.document_kind,
            &self.document_number,
            self.document_expiry,
            TemporalFixtures::today(),
        );
        let mut case = KycCase::submit(
            self.customer_id,
            self.document_kind,
            self.document_number,
            self.document_expiry,
            screening,
        );

        if let Some(reviewer) = self.in_review_by {
            case.start_review(reviewer).expect("builder: start review");
        }
        if let Some(decision) = self.decision {
            case.decide(decision).expect("builder: decide");
        }
        case
    }
}

/// Builder for support tickets
pub struct TestTicketBuilder {
    customer_id: CustomerId,
    subject: String,
    description: String,
    priority: TicketPriority,
    escalated: bool,
}

impl Default for TestTicketBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTicketBuilder {
    /// Creates a builder for an open medium-priority ticket
    pub fn new() -> Self {
        Self {
            customer_id: CustomerId::new_v7(),
            subject: "Card blocked after PIN retries".to_string(),
            description: "Customer cannot use their debit card at ATMs.".to_string(),
            priority: TicketPriority::Medium,
            escalated: false,
        }
    }

    /// Sets the customer
    pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = customer_id;
        self
    }

    /// Sets the subject line
    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the priority
    pub fn with_priority(mut self, priority: TicketPriority) -> Self {
        self.priority = priority;
        self
    }

    /// Escalates the built ticket
    pub fn escalated(mut self) -> Self {
        self.escalated = true;
        self
    }

    /// Builds the ticket
    pub fn build(self) -> Ticket {
        let mut ticket = Ticket::open(
            self.customer_id,
            self.subject,
            self.description,
            self.priority,
        );
        if self.escalated {
            ticket.escalate().expect("builder: escalate");
        }
        ticket
    }
}

/// Builder for EMI schedules
pub struct TestEmiScheduleBuilder {
    customer_id: CustomerId,
    principal: Money,
    annual_rate: Rate,
    total_installments: u32,
    disbursed_on: NaiveDate,
    auto_debit: bool,
    paid_installments: u32,
}

impl Default for TestEmiScheduleBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEmiScheduleBuilder {
    /// Creates a builder for a fresh five-year schedule
    pub fn new() -> Self {
        Self {
            customer_id: CustomerId::new_v7(),
            principal: MoneyFixtures::principal(),
            annual_rate: MoneyFixtures::lending_rate(),
            total_installments: 60,
            disbursed_on: TemporalFixtures::disbursal_date(),
            auto_debit: false,
            paid_installments: 0,
        }
    }

    /// Sets the customer
    pub fn with_customer(mut self, customer_id: CustomerId) -> Self {
        self.customer_id = customer_id;
        self
    }

    /// Sets the loan terms
    pub fn with_terms(mut self, principal: Money, annual_rate: Rate, installments: u32) -> Self {
        self.principal = principal;
        self.annual_rate = annual_rate;
        self.total_installments = installments;
        self
    }

    /// Sets the disbursal date
    pub fn disbursed_on(mut self, date: NaiveDate) -> Self {
        self.disbursed_on = date;
        self
    }

    /// Enables auto-debit
    pub fn with_auto_debit(mut self) -> Self {
        self.auto_debit = true;
        self
    }

    /// Records the given number of manual payments on the built schedule
    pub fn with_paid_installments(mut self, paid: u32) -> Self {
        self.paid_installments = paid;
        self
    }

    /// Builds the schedule
    pub fn build(self) -> EmiSchedule {
        let mut schedule = EmiSchedule::disburse(
            self.customer_id,
            self.principal,
            self.annual_rate,
            self.total_installments,
            self.disbursed_on,
            self.auto_debit,
        )
        .expect("builder: disburse");

        for _ in 0..self.paid_installments {
            schedule
                .record_payment(domain_lending::PaymentChannel::Manual)
                .expect("builder: record payment");
        }
        schedule
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_kyc::KycStatus;
    use domain_lending::ScheduleStatus;

    #[test]
    fn test_kyc_builder_defaults_to_pending() {
        let case = TestKycCaseBuilder::new().build();
        assert_eq!(case.status, KycStatus::Pending);
    }

    #[test]
    fn test_kyc_builder_decided() {
        let reviewer = AgentId::new_v7();
        let case = TestKycCaseBuilder::new()
            .decided(reviewer, ReviewDecision::approve(reviewer))
            .build();
        assert_eq!(case.status, KycStatus::Approved);
    }

    #[test]
    fn test_ticket_builder_escalated() {
        let ticket = TestTicketBuilder::new().escalated().build();
        assert!(ticket.escalated);
        assert_eq!(ticket.priority, TicketPriority::High);
    }

    #[test]
    fn test_schedule_builder_completion() {
        let schedule = TestEmiScheduleBuilder::new()
            .with_terms(
                MoneyFixtures::small_principal(),
                MoneyFixtures::lending_rate(),
                3,
            )
            .with_paid_installments(3)
            .build();
        assert_eq!(schedule.status, ScheduleStatus::Completed);
    }
}

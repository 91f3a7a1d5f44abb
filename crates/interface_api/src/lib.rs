//! HTTP API Layer
//!
//! This crate provides the REST API for the banking back office using Axum.
//!
//! # Architecture
//!
//! - **Handlers**: Request handlers for each domain
//! - **Middleware**: Authentication, authorization, tracing, audit logging
//! - **DTOs**: Request/Response data transfer objects
//! - **Error Handling**: Consistent error responses
//!
//! Handlers work against the domain port traits, never a concrete store:
//! production wires the PostgreSQL adapters in, tests wire the mocks, and
//! the handler code is identical in both.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod error;
pub mod middleware;
pub mod handlers;
pub mod dto;
pub mod auth;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post, put},
    middleware as axum_middleware,
};
use tower_http::trace::TraceLayer;
use tower_http::cors::{CorsLayer, Any};

use domain_kyc::KycCasePort;
use domain_lending::EmiSchedulePort;
use domain_tickets::TicketPort;
use domain_workflow::{NotificationHub, WorkQueuePort};

use crate::config::ApiConfig;
use crate::middleware::{auth_middleware, audit_middleware};
use crate::handlers::{health, kyc, tickets, loans, queue};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub kyc: Arc<dyn KycCasePort>,
    pub tickets: Arc<dyn TicketPort>,
    pub loans: Arc<dyn EmiSchedulePort>,
    pub queue: Arc<dyn WorkQueuePort>,
    pub hub: NotificationHub,
    pub config: ApiConfig,
}

impl AppState {
    /// Creates state from the four ports and a fresh notification hub
    pub fn new(
        kyc: Arc<dyn KycCasePort>,
        tickets: Arc<dyn TicketPort>,
        loans: Arc<dyn EmiSchedulePort>,
        queue: Arc<dyn WorkQueuePort>,
        config: ApiConfig,
    ) -> Self {
        Self {
            kyc,
            tickets,
            loans,
            queue,
            hub: NotificationHub::new(),
            config,
        }
    }
}

/// Creates the main API router
///
/// # Arguments
///
/// * `state` - Shared application state (ports, hub, config)
///
/// # Returns
///
/// Configured Axum router with all routes and middleware
pub fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check));

    // KYC routes
    let kyc_routes = Router::new()
        .route("/", post(kyc::submit_case))
        .route("/", get(kyc::list_cases))
        .route("/:id", get(kyc::get_case))
        .route("/:id/history", get(kyc::case_history))
        .route("/:id/review", post(kyc::start_review))
        .route("/:id/decision", post(kyc::decide));

    // Ticket routes
    let ticket_routes = Router::new()
        .route("/", post(tickets::open_ticket))
        .route("/", get(tickets::list_tickets))
        .route("/:id", get(tickets::get_ticket))
        .route("/:id/status", put(tickets::update_status))
        .route("/:id/comments", post(tickets::add_comment))
        .route("/:id/assign", post(tickets::assign))
        .route("/:id/escalate", post(tickets::escalate));

    // Loan routes
    let loan_routes = Router::new()
        .route("/", post(loans::disburse))
        .route("/", get(loans::list_schedules))
        .route("/:id", get(loans::get_schedule))
        .route("/:id/payments", post(loans::record_payment))
        .route("/:id/autodebit", put(loans::set_auto_debit));

    // Queue routes
    let queue_routes = Router::new()
        .route("/", get(queue::list_queue))
        .route("/claim", post(queue::claim_next))
        .route("/:id/release", post(queue::release));

    // Protected API routes
    let api_routes = Router::new()
        .nest("/kyc", kyc_routes)
        .nest("/tickets", ticket_routes)
        .nest("/loans", loan_routes)
        .nest("/queue", queue_routes)
        .layer(axum_middleware::from_fn_with_state(state.clone(), audit_middleware))
        .layer(axum_middleware::from_fn_with_state(state.clone(), auth_middleware));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

//! # Order Submitter
//!
//! Turns the ledger into an `addOrder` call and the backend's answer into an
//! [`OrderResult`].
//!
//! ```text
//!            submit()                 reply
//!   Idle ──────────────► Submitting ─────────► Idle
//!                                      │  Accepted:  ordered units taken off the cart
//!                                      └─ otherwise: cart untouched
//! ```
//!
//! Local checks (session, empty cart, re-entry) never reach the network. The
//! ordered units only leave the cart after the backend confirms the order;
//! anything added while the call was in flight stays. Failed submissions are
//! never retried here; the cashier decides.

use crate::cart::SharedLedger;
use crate::error::PosError;
use crate::order::{OrderReceipt, OrderReply, OrderRequest, PaymentDeclaration};
use crate::service::BoxedOrderService;
use crate::session::AuthToken;
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, error, info, instrument, warn};

/// Why a submission did not produce an order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderFailure {
    #[error("No staff session, log in before checking out")]
    NotAuthenticated,

    #[error("Cart is empty")]
    EmptyCart,

    /// Another submission for this ledger has not finished yet
    #[error("An order is already being submitted")]
    SubmissionInProgress,

    /// Unreachable backend, non-success status or unreadable response
    #[error("Could not reach the order service: {0}")]
    TransportError(String),

    /// The backend refused the order
    #[error("Order rejected: {0}")]
    Rejected(String),
}

impl OrderFailure {
    /// Failures decided before any network call
    pub fn is_local(&self) -> bool {
        matches!(
            self,
            OrderFailure::NotAuthenticated
                | OrderFailure::EmptyCart
                | OrderFailure::SubmissionInProgress
        )
    }

    /// Returns the HTTP status code appropriate for this failure
    pub fn status_code(&self) -> u16 {
        match self {
            OrderFailure::NotAuthenticated => 401,
            OrderFailure::EmptyCart => 400,
            OrderFailure::SubmissionInProgress => 409,
            OrderFailure::TransportError(_) => 502,
            OrderFailure::Rejected(_) => 422,
        }
    }

    fn from_service_error(err: PosError) -> Self {
        match err {
            PosError::Backend { message, .. } => OrderFailure::Rejected(message),
            other => OrderFailure::TransportError(other.to_string()),
        }
    }
}

/// Outcome of one checkout attempt
pub type OrderResult = Result<OrderReceipt, OrderFailure>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitterState {
    Idle,
    Submitting,
}

/// Holds the `Submitting` state; dropping it returns the submitter to `Idle`
/// on every exit path, including a cancelled future.
struct SubmittingGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> SubmittingGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for SubmittingGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// An attempt whose outcome is unknown (transport failure). The backend may
/// have recorded it, so a retry of the same lines and payment reuses its key.
#[derive(Debug, Clone)]
struct UnsettledAttempt {
    request: OrderRequest,
}

/// Submits the orders of one ledger, one at a time
pub struct OrderSubmitter {
    service: BoxedOrderService,
    ledger: SharedLedger,
    submitting: AtomicBool,
    unsettled: Mutex<Option<UnsettledAttempt>>,
}

impl OrderSubmitter {
    pub fn new(service: BoxedOrderService, ledger: SharedLedger) -> Self {
        Self {
            service,
            ledger,
            submitting: AtomicBool::new(false),
            unsettled: Mutex::new(None),
        }
    }

    pub fn ledger(&self) -> &SharedLedger {
        &self.ledger
    }

    pub fn state(&self) -> SubmitterState {
        if self.submitting.load(Ordering::Acquire) {
            SubmitterState::Submitting
        } else {
            SubmitterState::Idle
        }
    }

    /// Submit the ledger's current contents.
    ///
    /// On success the submitted units are taken off the ledger; on any failure it
    /// is left exactly as it was.
    #[instrument(skip_all, fields(method = %payment.method()))]
    pub async fn submit(&self, payment: &PaymentDeclaration, token: Option<&AuthToken>) -> OrderResult {
        let Some(token) = token else {
            warn!("Checkout refused: no staff session");
            return Err(OrderFailure::NotAuthenticated);
        };

        let Some(_guard) = SubmittingGuard::acquire(&self.submitting) else {
            warn!("Checkout refused: submission already in flight");
            return Err(OrderFailure::SubmissionInProgress);
        };

        let request = {
            let ledger = self.ledger.lock().await;
            if ledger.is_empty() {
                return Err(OrderFailure::EmptyCart);
            }
            OrderRequest::from_ledger(&ledger, payment)
        };

        let request = match self.unsettled.lock().await.as_ref() {
            Some(previous) if previous.request.same_order(&request) => {
                let key = previous.request.idempotency_key();
                debug!("Retrying unsettled order, reusing key {}", key);
                request.with_idempotency_key(key)
            }
            _ => request,
        };

        info!(
            "Submitting order: {} lines, {} units, backend={}, key={}",
            request.items().len(),
            request.unit_count(),
            self.service.backend_name(),
            request.idempotency_key()
        );

        let reply = self.service.add_order(&request, token).await;

        *self.unsettled.lock().await = match &reply {
            Err(e) if e.is_transport() => Some(UnsettledAttempt {
                request: request.clone(),
            }),
            _ => None,
        };

        match reply {
            Ok(OrderReply::Accepted(receipt)) => {
                self.ledger.lock().await.settle(request.items());
                info!(
                    "Order accepted: id={:?}, status={}",
                    receipt.order_id, receipt.status
                );
                Ok(receipt)
            }
            Ok(OrderReply::Rejected(message)) => {
                warn!("Order rejected: {}", message);
                Err(OrderFailure::Rejected(message))
            }
            Err(e) => {
                error!("Order submission failed: {}", e);
                Err(OrderFailure::from_service_error(e))
            }
        }
    }
}

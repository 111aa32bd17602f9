//! # Order Types
//!
//! Submission snapshots and the canonical shape of the backend's answer.

use crate::cart::CartLedger;
use crate::error::{PosError, PosResult};
use crate::money::Amount;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// How the customer pays. Unknown method names pass through to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum PaymentMethod {
    Cash,
    /// Electronic wallet (GCash)
    EWallet,
    Other(String),
}

impl PaymentMethod {
    pub fn as_str(&self) -> &str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::EWallet => "gcash",
            PaymentMethod::Other(name) => name,
        }
    }

    /// Only cash payments carry a tendered amount
    pub fn takes_tender(&self) -> bool {
        matches!(self, PaymentMethod::Cash)
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = PosError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        match name.as_str() {
            "" => Err(PosError::InvalidRequest(
                "payment method is required".to_string(),
            )),
            "cash" => Ok(PaymentMethod::Cash),
            "gcash" | "ewallet" | "e-wallet" | "electronic-wallet" => Ok(PaymentMethod::EWallet),
            _ => Ok(PaymentMethod::Other(name)),
        }
    }
}

impl TryFrom<String> for PaymentMethod {
    type Error = PosError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<PaymentMethod> for String {
    fn from(method: PaymentMethod) -> Self {
        method.as_str().to_string()
    }
}

/// A validated payment method and tendered amount
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentDeclaration {
    method: PaymentMethod,
    tendered: Amount,
}

impl PaymentDeclaration {
    /// Validate the cashier's input. Tendered must be non-negative; it is
    /// dropped to zero for methods that do not take cash.
    pub fn new(method: PaymentMethod, tendered: Amount) -> PosResult<Self> {
        if tendered.is_negative() {
            return Err(PosError::InvalidRequest(
                "tendered amount cannot be negative".to_string(),
            ));
        }

        let tendered = if method.takes_tender() {
            tendered
        } else {
            Amount::ZERO
        };

        Ok(Self { method, tendered })
    }

    pub fn cash(tendered: Amount) -> PosResult<Self> {
        Self::new(PaymentMethod::Cash, tendered)
    }

    pub fn e_wallet() -> Self {
        Self {
            method: PaymentMethod::EWallet,
            tendered: Amount::ZERO,
        }
    }

    pub fn method(&self) -> &PaymentMethod {
        &self.method
    }

    pub fn tendered(&self) -> Amount {
        self.tendered
    }
}

/// A line in a submission: id and quantity only, the backend prices it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: String,
    pub qty: u32,
}

/// Immutable submission snapshot (`addOrder` payload)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderRequest {
    items: Vec<OrderLine>,
    payment_method: PaymentMethod,
    tendered: Amount,

    /// Sent as a header, not in the payload
    #[serde(skip)]
    idempotency_key: String,
}

impl OrderRequest {
    /// Snapshot the ledger's current rows
    pub fn from_ledger(ledger: &CartLedger, payment: &PaymentDeclaration) -> Self {
        Self {
            items: ledger.snapshot(),
            payment_method: payment.method().clone(),
            tendered: payment.tendered(),
            idempotency_key: Uuid::new_v4().to_string(),
        }
    }

    /// Builder: reuse the key of an earlier attempt at the same order
    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = key.into();
        self
    }

    pub fn items(&self) -> &[OrderLine] {
        &self.items
    }

    pub fn payment_method(&self) -> &PaymentMethod {
        &self.payment_method
    }

    pub fn tendered(&self) -> Amount {
        self.tendered
    }

    pub fn idempotency_key(&self) -> &str {
        &self.idempotency_key
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Same lines and payment, ignoring the idempotency key
    pub fn same_order(&self, other: &OrderRequest) -> bool {
        self.items == other.items
            && self.payment_method == other.payment_method
            && self.tendered == other.tendered
    }

    /// Total units across all lines
    pub fn unit_count(&self) -> u32 {
        self.items.iter().map(|line| line.qty).sum()
    }
}

/// What the backend recorded for an accepted order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReceipt {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Authoritative total, priced by the backend
    pub total: Amount,
    pub status: String,
}

/// Canonical backend verdict on a submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderReply {
    Accepted(OrderReceipt),
    Rejected(String),
}

/// Raw `addOrder` response as it appears on the wire.
///
/// Two shapes are in circulation: `{error: "..."}` for failures, and either
/// `{ok: true, ...}` or `{success: true, ...}` for successes. Older deployments
/// omit the flag and just return `{total, status}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AddOrderResponse {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub ok: Option<bool>,
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default, rename = "orderId", alias = "order_id")]
    pub order_id: Option<String>,
    #[serde(default)]
    pub total: Option<Amount>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AddOrderResponse {
    /// Fold either wire shape into an [`OrderReply`].
    ///
    /// - a non-empty `error` is a rejection
    /// - an explicit `ok: false` or `success: false` is a rejection, whatever the other flag says
    /// - an explicit `true` flag, or a flagless body carrying `total`, is acceptance
    /// - anything else is a malformed body
    pub fn normalize(self) -> PosResult<OrderReply> {
        if let Some(error) = self.error.filter(|e| !e.trim().is_empty()) {
            return Ok(OrderReply::Rejected(error));
        }

        let rejected = self.ok == Some(false) || self.success == Some(false);
        if rejected {
            let reason = self
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| "order was not accepted".to_string());
            return Ok(OrderReply::Rejected(reason));
        }

        let accepted = self.ok == Some(true) || self.success == Some(true);
        if !accepted && self.total.is_none() {
            return Err(PosError::Serialization(
                "addOrder response has neither an error nor a total".to_string(),
            ));
        }

        Ok(OrderReply::Accepted(OrderReceipt {
            order_id: self.order_id.filter(|id| !id.is_empty()),
            total: self.total.unwrap_or_default(),
            status: self.status.unwrap_or_else(|| "unknown".to_string()),
        }))
    }
}

//! # pos-core
//!
//! Cart and checkout core for the deli-pos point-of-sale client.
//!
//! This crate provides:
//! - `CartLedger` and `LineItem` for building an order, with optional slot persistence
//! - `OrderSubmitter` for turning a ledger into exactly one `addOrder` call
//! - `OrderService` trait for the remote order/menu/report backend
//! - `MenuCatalog`, `SalesReport` and session types exchanged with the backend
//! - `PosError` and `OrderFailure` for typed error handling
//!
//! ## Example
//!
//! ```rust,ignore
//! use pos_core::{Amount, CartLedger, OrderSubmitter, PaymentDeclaration};
//!
//! let ledger = CartLedger::new().into_shared();
//! ledger.lock().await.add("adobo", "Adobo Rice", Amount::from_major(50));
//!
//! let submitter = OrderSubmitter::new(service, ledger.clone());
//! let payment = PaymentDeclaration::cash(Amount::from_major(100))?;
//!
//! match submitter.submit(&payment, session.token()).await {
//!     Ok(receipt) => println!("Order {:?}: {}", receipt.order_id, receipt.status),
//!     Err(failure) => eprintln!("Checkout failed: {}", failure),
//! }
//! ```

pub mod cart;
pub mod error;
pub mod menu;
pub mod money;
pub mod order;
pub mod report;
pub mod service;
pub mod session;
pub mod store;
pub mod submitter;

#[cfg(any(test, feature = "test-util"))]
pub mod testing;

// Re-exports for convenience
pub use cart::{CartLedger, CartLine, CartView, LineItem, SharedLedger};
pub use error::{PosError, PosResult};
pub use menu::{MenuCatalog, MenuItem};
pub use money::{Amount, Currency};
pub use order::{
    AddOrderResponse, OrderLine, OrderReceipt, OrderReply, OrderRequest, PaymentDeclaration,
    PaymentMethod,
};
pub use report::{ReportSummary, SaleRecord, SalesReport};
pub use service::{Action, BoxedOrderService, OrderService};
pub use session::{AuthToken, StaffCredentials};
pub use store::{BoxedCartStore, CartStore, FileCartStore, MemoryCartStore, DEFAULT_CART_SLOT};
pub use submitter::{OrderFailure, OrderResult, OrderSubmitter, SubmitterState};

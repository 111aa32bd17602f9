//! # Order Service Trait
//!
//! Boundary to the remote order/menu/report backend. The backend is the
//! authority for pricing, persistence and staff authentication; this trait only
//! carries requests across.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    OrderService (trait)                      │
//! │  ├── add_order()          addOrder        POST               │
//! │  ├── get_menu()           getMenu         GET                │
//! │  ├── staff_login()        staffLogin      POST               │
//! │  ├── add_menu_item()      addMenuItem     POST               │
//! │  ├── update_menu_item()   updateMenuItem  POST               │
//! │  ├── delete_menu_item()   deleteMenuItem  POST               │
//! │  └── sales_report()       getReportSales  GET                │
//! └──────────────────────────────────────────────────────────────┘
//!                 ▲                             ▲
//!        ┌────────┴────────┐          ┌─────────┴────────┐
//!        │ HttpOrderService│          │ MockOrderService │
//!        │  (pos-client)   │          │   (test-util)    │
//!        └─────────────────┘          └──────────────────┘
//! ```

use crate::error::PosResult;
use crate::menu::{MenuCatalog, MenuItem};
use crate::order::{OrderReply, OrderRequest};
use crate::report::SalesReport;
use crate::session::{AuthToken, StaffCredentials};
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;

/// Backend action identifiers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    AddOrder,
    GetMenu,
    StaffLogin,
    AddMenuItem,
    UpdateMenuItem,
    DeleteMenuItem,
    GetReportSales,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::AddOrder => "addOrder",
            Action::GetMenu => "getMenu",
            Action::StaffLogin => "staffLogin",
            Action::AddMenuItem => "addMenuItem",
            Action::UpdateMenuItem => "updateMenuItem",
            Action::DeleteMenuItem => "deleteMenuItem",
            Action::GetReportSales => "getReportSales",
        }
    }

    /// Read actions go out as GET without a body, everything else as POST
    pub fn is_read(&self) -> bool {
        matches!(self, Action::GetMenu | Action::GetReportSales)
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Remote order/menu/report backend.
///
/// Implementations report transport trouble (unreachable host, non-2xx status,
/// unparsable body) as `Err`. An `addOrder` that the backend explicitly refuses
/// is `Ok(OrderReply::Rejected(..))`; for the admin actions a backend-reported
/// error is `Err(PosError::Backend { .. })`.
#[async_trait]
pub trait OrderService: Send + Sync {
    /// Submit an order snapshot. Called at most once per checkout attempt.
    async fn add_order(&self, request: &OrderRequest, token: &AuthToken) -> PosResult<OrderReply>;

    async fn get_menu(&self) -> PosResult<MenuCatalog>;

    /// Exchange staff credentials for a session token.
    async fn staff_login(&self, credentials: &StaffCredentials) -> PosResult<AuthToken>;

    async fn add_menu_item(&self, item: &MenuItem, token: &AuthToken) -> PosResult<()>;

    async fn update_menu_item(&self, item: &MenuItem, token: &AuthToken) -> PosResult<()>;

    async fn delete_menu_item(&self, id: &str, token: &AuthToken) -> PosResult<()>;

    async fn sales_report(&self, token: &AuthToken) -> PosResult<SalesReport>;

    /// Backend name (for logging)
    fn backend_name(&self) -> &'static str;
}

/// Type alias for a shared order service (dynamic dispatch)
pub type BoxedOrderService = Arc<dyn OrderService>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_wire_names() {
        assert_eq!(Action::AddOrder.as_str(), "addOrder");
        assert_eq!(Action::GetReportSales.to_string(), "getReportSales");
    }

    #[test]
    fn test_read_actions() {
        assert!(Action::GetMenu.is_read());
        assert!(Action::GetReportSales.is_read());
        assert!(!Action::AddOrder.is_read());
        assert!(!Action::DeleteMenuItem.is_read());
    }
}

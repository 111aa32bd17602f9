//! # Test Support
//!
//! A scripted, in-process [`OrderService`] for exercising the submitter and the
//! API without a backend. Enabled with the `test-util` feature.

use crate::error::{PosError, PosResult};
use crate::menu::{MenuCatalog, MenuItem};
use crate::money::Amount;
use crate::order::{OrderReceipt, OrderReply, OrderRequest};
use crate::report::SalesReport;
use crate::service::{Action, OrderService};
use crate::session::{AuthToken, StaffCredentials};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{Notify, Semaphore};

/// Canned answer for the next `add_order` call
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    Accept(OrderReceipt),
    Reject(String),
    /// Backend unreachable
    NetworkDown,
    /// Backend answered with the given HTTP status
    Status(u16),
    /// 2xx with a body that cannot be read
    Malformed,
}

impl ScriptedReply {
    pub fn accept(order_id: &str, total: Amount, status: &str) -> Self {
        ScriptedReply::Accept(OrderReceipt {
            order_id: Some(order_id.to_string()),
            total,
            status: status.to_string(),
        })
    }

    fn into_result(self) -> PosResult<OrderReply> {
        match self {
            ScriptedReply::Accept(receipt) => Ok(OrderReply::Accepted(receipt)),
            ScriptedReply::Reject(message) => Ok(OrderReply::Rejected(message)),
            ScriptedReply::NetworkDown => Err(PosError::NetworkError("connection refused".into())),
            ScriptedReply::Status(status) => Err(PosError::HttpStatus {
                status,
                body: String::new(),
            }),
            ScriptedReply::Malformed => Err(PosError::Serialization("expected value".into())),
        }
    }
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// In-memory backend with scripted order replies and a call log
pub struct MockOrderService {
    replies: Mutex<VecDeque<ScriptedReply>>,
    fallback: ScriptedReply,
    menu: Mutex<MenuCatalog>,
    report: SalesReport,
    staff: (String, String),
    calls: Mutex<Vec<Action>>,
    orders: Mutex<Vec<OrderRequest>>,
    gate: Option<Arc<Semaphore>>,
    entered: Notify,
}

impl Default for MockOrderService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockOrderService {
    /// Accepts every order with total 0 until scripted otherwise.
    /// Staff login succeeds for `cashier` / `secret`.
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: ScriptedReply::accept("ORD-0", Amount::ZERO, "paid"),
            menu: Mutex::new(MenuCatalog::default()),
            report: SalesReport::default(),
            staff: ("cashier".to_string(), "secret".to_string()),
            calls: Mutex::new(Vec::new()),
            orders: Mutex::new(Vec::new()),
            gate: None,
            entered: Notify::new(),
        }
    }

    /// Builder: queue a reply for the next `add_order`
    pub fn with_reply(self, reply: ScriptedReply) -> Self {
        locked(&self.replies).push_back(reply);
        self
    }

    pub fn with_menu(self, menu: MenuCatalog) -> Self {
        *locked(&self.menu) = menu;
        self
    }

    pub fn with_report(mut self, report: SalesReport) -> Self {
        self.report = report;
        self
    }

    /// Builder: `add_order` blocks until [`release`](Self::release) is called
    pub fn gated(mut self) -> Self {
        self.gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let one gated `add_order` call complete
    pub fn release(&self) {
        if let Some(gate) = &self.gate {
            gate.add_permits(1);
        }
    }

    /// Resolves once an `add_order` call has reached the backend
    pub async fn order_started(&self) {
        self.entered.notified().await;
    }

    pub fn calls(&self) -> Vec<Action> {
        locked(&self.calls).clone()
    }

    pub fn order_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|a| **a == Action::AddOrder)
            .count()
    }

    /// Every order snapshot received, oldest first
    pub fn orders(&self) -> Vec<OrderRequest> {
        locked(&self.orders).clone()
    }

    pub fn menu(&self) -> MenuCatalog {
        locked(&self.menu).clone()
    }

    fn record(&self, action: Action) {
        locked(&self.calls).push(action);
    }
}

#[async_trait]
impl OrderService for MockOrderService {
    async fn add_order(&self, request: &OrderRequest, _token: &AuthToken) -> PosResult<OrderReply> {
        self.record(Action::AddOrder);
        locked(&self.orders).push(request.clone());
        self.entered.notify_one();

        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }

        let reply = locked(&self.replies)
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone());
        reply.into_result()
    }

    async fn get_menu(&self) -> PosResult<MenuCatalog> {
        self.record(Action::GetMenu);
        Ok(self.menu())
    }

    async fn staff_login(&self, credentials: &StaffCredentials) -> PosResult<AuthToken> {
        self.record(Action::StaffLogin);
        if credentials.username == self.staff.0 && credentials.password == self.staff.1 {
            AuthToken::new(format!("token-{}", credentials.username))
                .ok_or_else(|| PosError::Internal("empty mock token".into()))
        } else {
            Err(PosError::Backend {
                action: Action::StaffLogin.to_string(),
                message: "invalid credentials".into(),
            })
        }
    }

    async fn add_menu_item(&self, item: &MenuItem, _token: &AuthToken) -> PosResult<()> {
        self.record(Action::AddMenuItem);
        let mut menu = locked(&self.menu);
        if menu.get(&item.id).is_some() {
            return Err(PosError::Backend {
                action: Action::AddMenuItem.to_string(),
                message: format!("item {} already exists", item.id),
            });
        }
        menu.items.push(item.clone());
        Ok(())
    }

    async fn update_menu_item(&self, item: &MenuItem, _token: &AuthToken) -> PosResult<()> {
        self.record(Action::UpdateMenuItem);
        let mut menu = locked(&self.menu);
        match menu.items.iter_mut().find(|existing| existing.id == item.id) {
            Some(existing) => {
                *existing = item.clone();
                Ok(())
            }
            None => Err(PosError::Backend {
                action: Action::UpdateMenuItem.to_string(),
                message: format!("item {} not found", item.id),
            }),
        }
    }

    async fn delete_menu_item(&self, id: &str, _token: &AuthToken) -> PosResult<()> {
        self.record(Action::DeleteMenuItem);
        let mut menu = locked(&self.menu);
        let before = menu.items.len();
        menu.items.retain(|item| item.id != id);
        if menu.items.len() == before {
            return Err(PosError::Backend {
                action: Action::DeleteMenuItem.to_string(),
                message: format!("item {} not found", id),
            });
        }
        Ok(())
    }

    async fn sales_report(&self, _token: &AuthToken) -> PosResult<SalesReport> {
        self.record(Action::GetReportSales);
        Ok(self.report.clone())
    }

    fn backend_name(&self) -> &'static str {
        "mock"
    }
}

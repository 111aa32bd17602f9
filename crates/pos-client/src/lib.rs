//! # pos-client
//!
//! HTTP backend for deli-pos.
//!
//! The order/menu/report service is a single web app endpoint. Each call names
//! an action in the query string; read actions are `GET`, mutating actions are
//! `POST` with a JSON body:
//!
//! | Action | Method | Payload |
//! |--------|--------|---------|
//! | `addOrder` | POST | `{items: [{id, qty}], payment_method, tendered}` |
//! | `getMenu` | GET | none |
//! | `staffLogin` | POST | `{username, password}` |
//! | `addMenuItem` / `updateMenuItem` | POST | `{item: {id, name, price, category}}` |
//! | `deleteMenuItem` | POST | `{id}` |
//! | `getReportSales` | GET | none |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pos_client::HttpOrderService;
//! use pos_core::OrderService;
//!
//! // Reads POS_API_BASE (and optionally POS_API_TIMEOUT_SECS)
//! let backend = HttpOrderService::from_env()?;
//!
//! let menu = backend.get_menu().await?;
//! ```

pub mod client;
pub mod config;

// Re-exports
pub use client::HttpOrderService;
pub use config::{BackendConfig, API_BASE_PLACEHOLDER};

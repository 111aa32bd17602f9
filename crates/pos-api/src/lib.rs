//! # pos-api
//!
//! Local HTTP surface of the deli-pos register.
//!
//! This crate provides:
//! - Axum-based HTTP server wrapping one cart ledger and its order submitter
//! - REST endpoints for the cart, checkout and the staff session
//! - Staff-only menu administration and the sales report
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/health` | Health check |
//! | GET | `/api/v1/cart` | Current cart |
//! | POST | `/api/v1/cart/items` | Add one unit |
//! | DELETE | `/api/v1/cart/items/{id}` | Remove a row |
//! | DELETE | `/api/v1/cart` | Clear the cart |
//! | POST | `/api/v1/checkout` | Submit the order |
//! | POST / DELETE | `/api/v1/session` | Staff login / logout |
//! | GET / POST | `/api/v1/menu` | Menu, add item |
//! | PUT / DELETE | `/api/v1/menu/{id}` | Replace / delete item |
//! | GET | `/api/v1/reports/sales` | Sales report |

pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};

//! # Request Handlers
//!
//! Axum request handlers for the register.
//! Each handler is one discrete UI event dispatched into the cart ledger, the
//! order submitter or the backend.

use crate::state::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use pos_core::{
    Amount, CartView, MenuItem, OrderFailure, PaymentDeclaration, PaymentMethod, PosError,
    ReportSummary, SaleRecord, StaffCredentials,
};
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

// =============================================================================
// Request/Response Types
// =============================================================================

/// Add one unit of a menu item to the cart
#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub id: String,
    pub name: String,
    /// Price snapshot from the menu the cashier is looking at
    pub price: Amount,
}

/// Checkout request
#[derive(Debug, Deserialize)]
pub struct CheckoutRequest {
    /// "cash", "gcash", ...
    pub payment_method: String,
    /// Cash received; ignored for non-cash methods
    #[serde(default)]
    pub tendered: Option<Amount>,
}

/// Cart state with a preformatted subtotal
#[derive(Debug, Serialize)]
pub struct CartResponse {
    #[serde(flatten)]
    pub cart: CartView,
    pub subtotal_display: String,
}

/// Checkout response
#[derive(Debug, Serialize)]
pub struct CheckoutResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    pub total: Amount,
    pub total_display: String,
    pub status: String,
    /// Cart after the ordered units were taken off
    pub cart: CartView,
}

#[derive(Debug, Serialize)]
pub struct MenuResponse {
    pub items: Vec<MenuItem>,
    pub categories: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct ReportResponse {
    pub summary: ReportSummary,
    pub grand_total_display: String,
    pub sales: Vec<SaleRecord>,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, code: u16) -> Self {
        Self {
            error: error.into(),
            code,
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn status(code: u16) -> StatusCode {
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn pos_error_to_response(err: PosError) -> ApiError {
    let code = err.status_code();
    let mut response = ErrorResponse::new(err.to_string(), code);
    if err.is_retryable() {
        response = response.with_details("retryable");
    }
    (status(code), Json(response))
}

fn order_failure_to_response(failure: OrderFailure) -> ApiError {
    let code = failure.status_code();
    let mut response = ErrorResponse::new(failure.to_string(), code);
    if !failure.is_local() {
        response = response.with_details("cart kept for retry");
    }
    (status(code), Json(response))
}

fn cart_response(state: &AppState, cart: CartView) -> CartResponse {
    let subtotal_display = cart.subtotal.display(state.config.currency);
    CartResponse {
        cart,
        subtotal_display,
    }
}

// =============================================================================
// Handlers
// =============================================================================

/// Health check endpoint
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "deli-pos",
        "backend": state.service.backend_name(),
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Current cart
pub async fn get_cart(State(state): State<AppState>) -> Json<CartResponse> {
    let view = state.ledger.lock().await.view();
    Json(cart_response(&state, view))
}

/// Add one unit to the cart
#[instrument(skip(state, request), fields(item_id = %request.id))]
pub async fn add_to_cart(
    State(state): State<AppState>,
    Json(request): Json<AddItemRequest>,
) -> Result<Json<CartResponse>, ApiError> {
    if request.id.trim().is_empty() {
        return Err(pos_error_to_response(PosError::InvalidRequest(
            "item id is required".to_string(),
        )));
    }

    let view = {
        let mut ledger = state.ledger.lock().await;
        ledger.add(request.id, request.name, request.price);
        ledger.view()
    };

    Ok(Json(cart_response(&state, view)))
}

/// Remove a row from the cart (no-op for unknown ids)
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Json<CartResponse> {
    let view = {
        let mut ledger = state.ledger.lock().await;
        ledger.remove(&item_id);
        ledger.view()
    };
    Json(cart_response(&state, view))
}

/// Empty the cart
pub async fn clear_cart(State(state): State<AppState>) -> Json<CartResponse> {
    let view = {
        let mut ledger = state.ledger.lock().await;
        ledger.clear();
        ledger.view()
    };
    Json(cart_response(&state, view))
}

/// Submit the cart as an order
#[instrument(skip(state, request), fields(method = %request.payment_method))]
pub async fn checkout(
    State(state): State<AppState>,
    Json(request): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, ApiError> {
    let method: PaymentMethod = request
        .payment_method
        .parse()
        .map_err(pos_error_to_response)?;
    let payment = PaymentDeclaration::new(method, request.tendered.unwrap_or_default())
        .map_err(pos_error_to_response)?;

    let token = state.session.token().await;
    let receipt = state
        .submitter
        .submit(&payment, token.as_ref())
        .await
        .map_err(|failure| {
            error!("Checkout failed: {}", failure);
            order_failure_to_response(failure)
        })?;

    info!(
        "Order saved: total={}, status={}",
        receipt.total.display(state.config.currency),
        receipt.status
    );

    let cart = state.ledger.lock().await.view();
    Ok(Json(CheckoutResponse {
        order_id: receipt.order_id,
        total_display: receipt.total.display(state.config.currency),
        total: receipt.total,
        status: receipt.status,
        cart,
    }))
}

/// Staff login; the token stays in this process
#[instrument(skip(state, credentials), fields(username = %credentials.username))]
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<StaffCredentials>,
) -> Result<impl IntoResponse, ApiError> {
    if credentials.username.trim().is_empty() || credentials.password.is_empty() {
        return Err(pos_error_to_response(PosError::InvalidRequest(
            "username and password are required".to_string(),
        )));
    }

    let token = state
        .service
        .staff_login(&credentials)
        .await
        .map_err(|e| match e {
            PosError::Backend { message, .. } => (
                StatusCode::UNAUTHORIZED,
                Json(ErrorResponse::new(message, 401)),
            ),
            other => pos_error_to_response(other),
        })?;

    state.session.start(token).await;
    info!("Staff session started");

    Ok(Json(serde_json::json!({ "authenticated": true })))
}

/// End the staff session
pub async fn logout(State(state): State<AppState>) -> StatusCode {
    state.session.end().await;
    StatusCode::NO_CONTENT
}

/// Menu from the backend
pub async fn get_menu(State(state): State<AppState>) -> Result<Json<MenuResponse>, ApiError> {
    let menu = state.service.get_menu().await.map_err(|e| {
        error!("Failed to load menu: {}", e);
        pos_error_to_response(e)
    })?;

    let categories = menu.categories().into_iter().map(String::from).collect();
    Ok(Json(MenuResponse {
        count: menu.len(),
        categories,
        items: menu.items,
    }))
}

/// Admin: add a menu item
#[instrument(skip(state, item), fields(item_id = %item.id))]
pub async fn add_menu_item(
    State(state): State<AppState>,
    Json(item): Json<MenuItem>,
) -> Result<StatusCode, ApiError> {
    item.validate().map_err(pos_error_to_response)?;
    let token = state.session.require().await.map_err(pos_error_to_response)?;

    state
        .service
        .add_menu_item(&item, &token)
        .await
        .map_err(pos_error_to_response)?;

    info!("Menu item added");
    Ok(StatusCode::CREATED)
}

/// Admin: replace a menu item
#[instrument(skip(state, item))]
pub async fn update_menu_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
    Json(item): Json<MenuItem>,
) -> Result<StatusCode, ApiError> {
    if item.id != item_id {
        return Err(pos_error_to_response(PosError::InvalidRequest(format!(
            "path id {} does not match item id {}",
            item_id, item.id
        ))));
    }
    item.validate().map_err(pos_error_to_response)?;
    let token = state.session.require().await.map_err(pos_error_to_response)?;

    state
        .service
        .update_menu_item(&item, &token)
        .await
        .map_err(pos_error_to_response)?;

    info!("Menu item updated");
    Ok(StatusCode::NO_CONTENT)
}

/// Admin: delete a menu item
#[instrument(skip(state))]
pub async fn delete_menu_item(
    State(state): State<AppState>,
    Path(item_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let token = state.session.require().await.map_err(pos_error_to_response)?;

    state
        .service
        .delete_menu_item(&item_id, &token)
        .await
        .map_err(pos_error_to_response)?;

    info!("Menu item deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// Admin: sales report
pub async fn sales_report(State(state): State<AppState>) -> Result<Json<ReportResponse>, ApiError> {
    let token = state.session.require().await.map_err(pos_error_to_response)?;

    let report = state.service.sales_report(&token).await.map_err(|e| {
        error!("Failed to load sales report: {}", e);
        pos_error_to_response(e)
    })?;

    let summary = report.summary();
    Ok(Json(ReportResponse {
        grand_total_display: summary.grand_total.display(state.config.currency),
        summary,
        sales: report.sales,
    }))
}

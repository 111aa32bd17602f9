//! # Routes
//!
//! Axum router configuration for the register API.

use crate::handlers;
use crate::state::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

/// Create the main application router
///
/// Routes:
/// - Cart:
///   - GET    /api/v1/cart - Current cart
///   - POST   /api/v1/cart/items - Add one unit of an item
///   - DELETE /api/v1/cart/items/{id} - Remove a row
///   - DELETE /api/v1/cart - Clear the cart
///   - POST   /api/v1/checkout - Submit the cart as an order
///
/// - Staff:
///   - POST   /api/v1/session - Log in
///   - DELETE /api/v1/session - Log out
///
/// - Menu & reports:
///   - GET    /api/v1/menu - Menu from the backend
///   - POST   /api/v1/menu - Add item (staff)
///   - PUT    /api/v1/menu/{id} - Replace item (staff)
///   - DELETE /api/v1/menu/{id} - Delete item (staff)
///   - GET    /api/v1/reports/sales - Sales report (staff)
pub fn create_router(state: AppState) -> Router {
    // The register UI is served from a different origin during development
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let cart_routes = Router::new()
        .route("/", get(handlers::get_cart).delete(handlers::clear_cart))
        .route("/items", post(handlers::add_to_cart))
        .route("/items/{item_id}", delete(handlers::remove_from_cart));

    let menu_routes = Router::new()
        .route("/", get(handlers::get_menu).post(handlers::add_menu_item))
        .route(
            "/{item_id}",
            put(handlers::update_menu_item).delete(handlers::delete_menu_item),
        );

    let api_routes = Router::new()
        .nest("/cart", cart_routes)
        .route("/checkout", post(handlers::checkout))
        .route("/session", post(handlers::login).delete(handlers::logout))
        .nest("/menu", menu_routes)
        .route("/reports/sales", get(handlers::sales_report));

    Router::new()
        .route("/health", get(handlers::health))
        .route("/", get(handlers::health))
        .nest("/api/v1", api_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppConfig;
    use axum::http::StatusCode;
    use axum_test::TestServer;
    use pos_core::testing::{MockOrderService, ScriptedReply};
    use pos_core::{Amount, MenuCatalog, MenuItem, SalesReport};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn server_with(mock: Arc<MockOrderService>) -> TestServer {
        let state = AppState::with_service(mock, AppConfig::default());
        TestServer::new(create_router(state)).unwrap()
    }

    async fn stock_cart(server: &TestServer) {
        let taps = [
            ("adobo", "Adobo Rice", 50),
            ("adobo", "Adobo Rice", 50),
            ("tea", "Iced Tea", 30),
        ];
        for (id, name, price) in taps {
            server
                .post("/api/v1/cart/items")
                .json(&json!({ "id": id, "name": name, "price": price }))
                .await
                .assert_status_ok();
        }
    }

    async fn log_in(server: &TestServer) {
        server
            .post("/api/v1/session")
            .json(&json!({ "username": "cashier", "password": "secret" }))
            .await
            .assert_status_ok();
    }

    #[tokio::test]
    async fn test_health() {
        let server = server_with(Arc::new(MockOrderService::new()));

        let response = server.get("/health").await;
        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["backend"], "mock");
    }

    #[tokio::test]
    async fn test_cart_flow() {
        let server = server_with(Arc::new(MockOrderService::new()));
        stock_cart(&server).await;

        let body: Value = server.get("/api/v1/cart").await.json();
        assert_eq!(body["subtotal"], 130);
        assert_eq!(body["subtotal_display"], "₱130.00");
        assert_eq!(body["item_count"], 3);
        assert_eq!(body["lines"].as_array().unwrap().len(), 2);

        let body: Value = server.delete("/api/v1/cart/items/adobo").await.json();
        assert_eq!(body["subtotal"], 30);

        // Unknown ids are a no-op
        server.delete("/api/v1/cart/items/halo-halo").await.assert_status_ok();

        let body: Value = server.delete("/api/v1/cart").await.json();
        assert_eq!(body["is_empty"], true);
        assert_eq!(body["subtotal"], 0);
    }

    #[tokio::test]
    async fn test_add_item_requires_id() {
        let server = server_with(Arc::new(MockOrderService::new()));

        server
            .post("/api/v1/cart/items")
            .json(&json!({ "id": " ", "name": "Mystery", "price": 10 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_add_item_rejects_out_of_range_price() {
        let server = server_with(Arc::new(MockOrderService::new()));

        for _ in 0..2 {
            server
                .post("/api/v1/cart/items")
                .json(&json!({ "id": "gold", "name": "Gold Plate", "price": 92233720368547758_i64 }))
                .await
                .assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        }

        let body: Value = server.get("/api/v1/cart").await.json();
        assert_eq!(body["is_empty"], true);
        assert_eq!(body["subtotal"], 0);
    }

    #[tokio::test]
    async fn test_checkout_without_login_keeps_cart() {
        let mock = Arc::new(MockOrderService::new());
        let server = server_with(mock.clone());
        stock_cart(&server).await;

        let response = server
            .post("/api/v1/checkout")
            .json(&json!({ "payment_method": "cash", "tendered": 200 }))
            .await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        assert_eq!(mock.order_calls(), 0);
        let body: Value = server.get("/api/v1/cart").await.json();
        assert_eq!(body["subtotal"], 130);
    }

    #[tokio::test]
    async fn test_checkout_success_clears_cart() {
        let mock = Arc::new(MockOrderService::new().with_reply(ScriptedReply::accept(
            "ORD-42",
            Amount::from_major(130),
            "paid",
        )));
        let server = server_with(mock.clone());
        log_in(&server).await;
        stock_cart(&server).await;

        let response = server
            .post("/api/v1/checkout")
            .json(&json!({ "payment_method": "cash", "tendered": 200 }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["order_id"], "ORD-42");
        assert_eq!(body["total"], 130);
        assert_eq!(body["status"], "paid");
        assert_eq!(body["cart"]["is_empty"], true);

        let orders = mock.orders();
        assert_eq!(orders.len(), 1);
        assert_eq!(orders[0].unit_count(), 3);
    }

    #[tokio::test]
    async fn test_checkout_rejected_keeps_cart() {
        let mock = Arc::new(
            MockOrderService::new().with_reply(ScriptedReply::Reject("Iced Tea sold out".into())),
        );
        let server = server_with(mock);
        log_in(&server).await;
        stock_cart(&server).await;

        let response = server
            .post("/api/v1/checkout")
            .json(&json!({ "payment_method": "gcash" }))
            .await;
        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        let body: Value = response.json();
        assert!(body["error"].as_str().unwrap().contains("Iced Tea sold out"));

        let body: Value = server.get("/api/v1/cart").await.json();
        assert_eq!(body["subtotal"], 130);
    }

    #[tokio::test]
    async fn test_checkout_network_failure_keeps_cart() {
        let mock = Arc::new(MockOrderService::new().with_reply(ScriptedReply::NetworkDown));
        let server = server_with(mock.clone());
        log_in(&server).await;
        stock_cart(&server).await;

        server
            .post("/api/v1/checkout")
            .json(&json!({ "payment_method": "cash", "tendered": 150 }))
            .await
            .assert_status(StatusCode::BAD_GATEWAY);

        assert_eq!(mock.order_calls(), 1);
        let body: Value = server.get("/api/v1/cart").await.json();
        assert_eq!(body["item_count"], 3);
    }

    #[tokio::test]
    async fn test_checkout_empty_cart() {
        let mock = Arc::new(MockOrderService::new());
        let server = server_with(mock.clone());
        log_in(&server).await;

        server
            .post("/api/v1/checkout")
            .json(&json!({ "payment_method": "cash", "tendered": 0 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        assert_eq!(mock.order_calls(), 0);
    }

    #[tokio::test]
    async fn test_checkout_bad_payment() {
        let server = server_with(Arc::new(MockOrderService::new()));
        log_in(&server).await;
        stock_cart(&server).await;

        server
            .post("/api/v1/checkout")
            .json(&json!({ "payment_method": "", "tendered": 0 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .post("/api/v1/checkout")
            .json(&json!({ "payment_method": "cash", "tendered": -5 }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_login_and_logout() {
        let server = server_with(Arc::new(MockOrderService::new()));

        server
            .post("/api/v1/session")
            .json(&json!({ "username": "cashier", "password": "wrong" }))
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        log_in(&server).await;
        server.get("/api/v1/reports/sales").await.assert_status_ok();

        server
            .delete("/api/v1/session")
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .get("/api/v1/reports/sales")
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_menu_admin() {
        let mock = Arc::new(MockOrderService::new().with_menu(MenuCatalog::new(vec![
            MenuItem::new("adobo", "Adobo Rice", Amount::from_major(50), "meals"),
        ])));
        let server = server_with(mock.clone());

        let body: Value = server.get("/api/v1/menu").await.json();
        assert_eq!(body["count"], 1);
        assert_eq!(body["categories"], json!(["meals"]));

        let tea = json!({ "id": "tea", "name": "Iced Tea", "price": 30, "category": "drinks" });

        // Admin actions need a staff session
        server
            .post("/api/v1/menu")
            .json(&tea)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);

        log_in(&server).await;
        server
            .post("/api/v1/menu")
            .json(&tea)
            .await
            .assert_status(StatusCode::CREATED);

        server
            .put("/api/v1/menu/tea")
            .json(&json!({ "id": "tea", "name": "Iced Tea (L)", "price": 35, "category": "drinks" }))
            .await
            .assert_status(StatusCode::NO_CONTENT);
        assert_eq!(
            mock.menu().get("tea").map(|item| item.price),
            Some(Amount::from_major(35))
        );

        server
            .put("/api/v1/menu/adobo")
            .json(&tea)
            .await
            .assert_status(StatusCode::BAD_REQUEST);

        server
            .delete("/api/v1/menu/adobo")
            .await
            .assert_status(StatusCode::NO_CONTENT);
        server
            .delete("/api/v1/menu/adobo")
            .await
            .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

        assert_eq!(mock.menu().len(), 1);
    }

    #[tokio::test]
    async fn test_sales_report() {
        let report: SalesReport = serde_json::from_value(json!({
            "sales": [
                { "date": "2026-03-01T09:00:00Z", "total": 130, "status": "paid" },
                { "date": "2026-03-01T12:30:00Z", "total": "80.50", "status": "paid" },
                { "date": "2026-03-01T13:00:00Z", "total": 45, "status": "pending" }
            ]
        }))
        .unwrap();
        let server = server_with(Arc::new(MockOrderService::new().with_report(report)));
        log_in(&server).await;

        let body: Value = server.get("/api/v1/reports/sales").await.json();
        assert_eq!(body["summary"]["count"], 3);
        assert_eq!(body["grand_total_display"], "₱255.50");
        assert_eq!(body["sales"].as_array().unwrap().len(), 3);
    }
}

//! # Web App Backend
//!
//! `OrderService` over the backend web app's single endpoint: every call is
//! `GET|POST {api_base}?action=<name>` with a JSON body on POST.

use crate::config::BackendConfig;
use async_trait::async_trait;
use pos_core::{
    Action, AddOrderResponse, AuthToken, MenuCatalog, MenuItem, OrderReply, OrderRequest,
    OrderService, PosError, PosResult, SalesReport, StaffCredentials,
};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info, instrument, warn};

const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// HTTP implementation of the order/menu/report backend
pub struct HttpOrderService {
    config: BackendConfig,
    client: Client,
}

impl HttpOrderService {
    /// Create a new backend client
    pub fn new(config: BackendConfig) -> PosResult<Self> {
        config.validate()?;

        if config.api_base.starts_with("http://") && !config.is_local() {
            warn!("Backend {} is not using TLS", config.api_base);
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PosError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    /// Create from environment variables
    pub fn from_env() -> PosResult<Self> {
        let config = BackendConfig::from_env()?;
        Self::new(config)
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    fn request(&self, action: Action, token: Option<&AuthToken>) -> RequestBuilder {
        let builder = if action.is_read() {
            self.client.get(&self.config.api_base)
        } else {
            self.client.post(&self.config.api_base)
        };

        let builder = builder.query(&[("action", action.as_str())]);
        match token {
            Some(token) => builder.header(AUTHORIZATION, token.bearer()),
            None => builder,
        }
    }

    /// Send and return the raw body of a 2xx response
    async fn send(&self, action: Action, builder: RequestBuilder) -> PosResult<String> {
        debug!("Calling backend action {}", action);

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                PosError::NetworkError(format!("{} timed out", action))
            } else {
                PosError::NetworkError(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| PosError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            error!("Backend error: action={}, status={}, body={}", action, status, body);
            return Err(PosError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }

    async fn get<T: DeserializeOwned>(&self, action: Action, token: Option<&AuthToken>) -> PosResult<T> {
        let body = self.send(action, self.request(action, token)).await?;
        decode(action, &body)
    }

    async fn post<P, T>(&self, action: Action, payload: &P, token: Option<&AuthToken>) -> PosResult<T>
    where
        P: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let body = self
            .send(action, self.request(action, token).json(payload))
            .await?;
        decode(action, &body)
    }
}

/// Every action except `addOrder` signals failure as `{error: "..."}`
#[derive(Deserialize)]
#[serde(untagged)]
enum Envelope<T> {
    Failure { error: String },
    Success(T),
}

fn decode<T: DeserializeOwned>(action: Action, body: &str) -> PosResult<T> {
    let envelope: Envelope<T> = serde_json::from_str(body).map_err(|e| {
        PosError::Serialization(format!("Failed to parse {} response: {}", action, e))
    })?;

    match envelope {
        Envelope::Success(value) => Ok(value),
        Envelope::Failure { error } => {
            warn!("Backend refused {}: {}", action, error);
            Err(PosError::Backend {
                action: action.to_string(),
                message: error,
            })
        }
    }
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[async_trait]
impl OrderService for HttpOrderService {
    #[instrument(skip(self, request, token), fields(key = %request.idempotency_key()))]
    async fn add_order(&self, request: &OrderRequest, token: &AuthToken) -> PosResult<OrderReply> {
        let builder = self
            .request(Action::AddOrder, Some(token))
            .header(IDEMPOTENCY_HEADER, request.idempotency_key())
            .json(request);

        let body = self.send(Action::AddOrder, builder).await?;

        let response: AddOrderResponse = serde_json::from_str(&body).map_err(|e| {
            PosError::Serialization(format!("Failed to parse addOrder response: {}", e))
        })?;

        let reply = response.normalize()?;
        if let OrderReply::Accepted(receipt) = &reply {
            info!("Backend recorded order {:?}", receipt.order_id);
        }
        Ok(reply)
    }

    #[instrument(skip(self))]
    async fn get_menu(&self) -> PosResult<MenuCatalog> {
        let menu: MenuCatalog = self.get(Action::GetMenu, None).await?;
        debug!("Loaded {} menu items", menu.len());
        Ok(menu)
    }

    #[instrument(skip(self, credentials), fields(username = %credentials.username))]
    async fn staff_login(&self, credentials: &StaffCredentials) -> PosResult<AuthToken> {
        let response: LoginResponse = self.post(Action::StaffLogin, credentials, None).await?;

        AuthToken::new(response.token).ok_or_else(|| {
            PosError::Serialization("staffLogin returned an empty token".to_string())
        })
    }

    #[instrument(skip(self, item, token), fields(item_id = %item.id))]
    async fn add_menu_item(&self, item: &MenuItem, token: &AuthToken) -> PosResult<()> {
        let _: serde_json::Value = self
            .post(Action::AddMenuItem, &json!({ "item": item }), Some(token))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, item, token), fields(item_id = %item.id))]
    async fn update_menu_item(&self, item: &MenuItem, token: &AuthToken) -> PosResult<()> {
        let _: serde_json::Value = self
            .post(Action::UpdateMenuItem, &json!({ "item": item }), Some(token))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn delete_menu_item(&self, id: &str, token: &AuthToken) -> PosResult<()> {
        let _: serde_json::Value = self
            .post(Action::DeleteMenuItem, &json!({ "id": id }), Some(token))
            .await?;
        Ok(())
    }

    #[instrument(skip(self, token))]
    async fn sales_report(&self, token: &AuthToken) -> PosResult<SalesReport> {
        let report: SalesReport = self.get(Action::GetReportSales, Some(token)).await?;
        Ok(report.sorted_newest_first())
    }

    fn backend_name(&self) -> &'static str {
        "webapp"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pos_core::{Amount, CartLedger, PaymentDeclaration};
    use std::time::Duration;
    use wiremock::matchers::{body_json, header, header_exists, method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn service(server: &MockServer) -> HttpOrderService {
        HttpOrderService::new(BackendConfig::new(server.uri())).unwrap()
    }

    fn token() -> AuthToken {
        AuthToken::new("tok-123").unwrap()
    }

    fn order() -> OrderRequest {
        let mut ledger = CartLedger::new();
        ledger.add("A", "Adobo Rice", Amount::from_major(50));
        ledger.add("A", "Adobo Rice", Amount::from_major(50));
        ledger.add("B", "Iced Tea", Amount::from_major(30));
        let payment = PaymentDeclaration::cash(Amount::from_major(150)).unwrap();
        OrderRequest::from_ledger(&ledger, &payment)
    }

    #[tokio::test]
    async fn test_add_order_accepted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("action", "addOrder"))
            .and(header("authorization", "Bearer tok-123"))
            .and(header_exists("idempotency-key"))
            .and(body_json(json!({
                "items": [{"id": "A", "qty": 2}, {"id": "B", "qty": 1}],
                "payment_method": "cash",
                "tendered": 150
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true, "orderId": "X1", "total": 130, "status": "paid"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let reply = service(&server).add_order(&order(), &token()).await.unwrap();

        match reply {
            OrderReply::Accepted(receipt) => {
                assert_eq!(receipt.order_id.as_deref(), Some("X1"));
                assert_eq!(receipt.total, Amount::from_major(130));
            }
            other => panic!("expected acceptance, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_add_order_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("action", "addOrder"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "out of stock"})))
            .mount(&server)
            .await;

        let reply = service(&server).add_order(&order(), &token()).await.unwrap();
        assert_eq!(reply, OrderReply::Rejected("out of stock".into()));
    }

    #[tokio::test]
    async fn test_add_order_http_failure() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = service(&server).add_order(&order(), &token()).await.unwrap_err();
        assert!(matches!(err, PosError::HttpStatus { status: 500, .. }));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_add_order_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
            .mount(&server)
            .await;

        let err = service(&server).add_order(&order(), &token()).await.unwrap_err();
        assert!(matches!(err, PosError::Serialization(_)));
    }

    #[tokio::test]
    async fn test_timeout_is_network_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": true, "total": 1}))
                    .set_delay(Duration::from_millis(500)),
            )
            .mount(&server)
            .await;

        let config = BackendConfig::new(server.uri()).with_timeout(Duration::from_millis(50));
        let service = HttpOrderService::new(config).unwrap();

        let err = service.add_order(&order(), &token()).await.unwrap_err();
        assert!(matches!(err, PosError::NetworkError(_)));
    }

    #[tokio::test]
    async fn test_get_menu_uses_get_without_token() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("action", "getMenu"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"id": "adobo", "name": "Adobo Rice", "price": 50, "category": "meals"},
                {"id": "tea", "name": "Iced Tea", "price": 30, "category": "drinks"}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let menu = service(&server).get_menu().await.unwrap();
        assert_eq!(menu.len(), 2);
        assert_eq!(menu.get("adobo").unwrap().price, Amount::from_major(50));

        let requests = server.received_requests().await.unwrap();
        assert!(requests[0].headers.get("authorization").is_none());
    }

    #[tokio::test]
    async fn test_get_menu_backend_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "sheet missing"})))
            .mount(&server)
            .await;

        let err = service(&server).get_menu().await.unwrap_err();
        match err {
            PosError::Backend { action, message } => {
                assert_eq!(action, "getMenu");
                assert_eq!(message, "sheet missing");
            }
            other => panic!("expected backend error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_staff_login() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("action", "staffLogin"))
            .and(body_json(json!({"username": "ana", "password": "pw"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "abc"})))
            .mount(&server)
            .await;

        let token = service(&server)
            .staff_login(&StaffCredentials::new("ana", "pw"))
            .await
            .unwrap();
        assert_eq!(token.as_str(), "abc");
    }

    #[tokio::test]
    async fn test_menu_admin_payloads() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(query_param("action", "addMenuItem"))
            .and(body_json(json!({
                "item": {"id": "flan", "name": "Leche Flan", "price": 45, "category": "desserts"}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(query_param("action", "deleteMenuItem"))
            .and(body_json(json!({"id": "flan"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
            .expect(1)
            .mount(&server)
            .await;

        let service = service(&server);
        let item = MenuItem::new("flan", "Leche Flan", Amount::from_major(45), "desserts");

        service.add_menu_item(&item, &token()).await.unwrap();
        service.delete_menu_item("flan", &token()).await.unwrap();
    }

    #[tokio::test]
    async fn test_sales_report_sorted() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("action", "getReportSales"))
            .and(header("authorization", "Bearer tok-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"sales": [
                {"date": "2026-10-01T08:00:00Z", "total": 100, "status": "paid"},
                {"date": "2026-10-03T08:00:00Z", "total": 50, "status": "paid"}
            ]})))
            .mount(&server)
            .await;

        let report = service(&server).sales_report(&token()).await.unwrap();
        assert_eq!(report.sales[0].total, Amount::from_major(50));
        assert_eq!(report.grand_total(), Amount::from_major(150));
    }

    #[test]
    fn test_placeholder_config_rejected() {
        let result = HttpOrderService::new(BackendConfig::new(crate::config::API_BASE_PLACEHOLDER));
        assert!(result.is_err());
    }
}

//! HTTP API Tests
//!
//! Exercises the router end to end with `axum-test`, backed by the
//! in-memory mapping store and the fixture reference directory.

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use serde_json::{json, Value};
use std::sync::Arc;

use domain_accounting::{AccountingMethod, MappingLifecycleCoordinator, MockMappingStore};
use interface_api::{config::ApiConfig, create_router};
use test_utils::{fixture_directory, ChartOfAccounts, ConfigurationPayloadBuilder, ProductFixtures};

const LOAN_URL: &str = "/api/v1/products/loan/1/accounting";

fn server() -> (Arc<MockMappingStore>, TestServer) {
    let store = Arc::new(MockMappingStore::new());
    let coordinator = Arc::new(MappingLifecycleCoordinator::new(
        store.clone(),
        Arc::new(fixture_directory()),
    ));
    let app = create_router(coordinator, ApiConfig::default());
    (store, TestServer::new(app).unwrap())
}

async fn create_loan(server: &TestServer) {
    server
        .post(LOAN_URL)
        .json(&ConfigurationPayloadBuilder::loan_cash().build())
        .await
        .assert_status(StatusCode::CREATED);
}

// ============================================================================
// HEALTH
// ============================================================================

mod health_tests {
    use super::*;

    #[tokio::test]
    async fn test_liveness() {
        let (_, server) = server();
        let response = server.get("/health").await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["status"], "healthy");
    }

    #[tokio::test]
    async fn test_readiness_reports_both_ports() {
        let (_, server) = server();
        let response = server.get("/health/ready").await;
        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(body["status"], "ready");
        assert_eq!(body["checks"].as_array().unwrap().len(), 2);
    }
}

// ============================================================================
// CONFIGURATION COMMANDS
// ============================================================================

mod command_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_returns_resource_id() {
        let (store, server) = server();
        let response = server
            .post(LOAN_URL)
            .json(&ConfigurationPayloadBuilder::loan_cash().build())
            .await;

        response.assert_status(StatusCode::CREATED);
        let body = response.json::<Value>();
        assert_eq!(body["resourceId"], json!(1));
        assert_eq!(body["changes"], json!({}));

        let snapshot = store.snapshot(ProductFixtures::loan()).await;
        assert_eq!(snapshot.gl_mappings.len(), 14);
    }

    #[tokio::test]
    async fn test_create_echoes_request_id() {
        let (_, server) = server();
        let response = server
            .post(LOAN_URL)
            .add_header(HeaderName::from_static("x-request-id"), HeaderValue::from_static("req-42"))
            .json(&ConfigurationPayloadBuilder::loan_cash().build())
            .await;

        response.assert_status(StatusCode::CREATED);
        assert_eq!(response.header("x-request-id"), "req-42");
    }

    #[tokio::test]
    async fn test_update_reports_changes() {
        let (_, server) = server();
        create_loan(&server).await;

        let response = server
            .put(LOAN_URL)
            .json(&json!({ "fundSourceAccountId": 150 }))
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["changes"], json!({ "fundSourceAccountId": 150 }));
    }

    #[tokio::test]
    async fn test_update_with_identical_values_reports_nothing() {
        let (store, server) = server();
        create_loan(&server).await;
        let writes = store.apply_calls();

        let response = server
            .put(LOAN_URL)
            .json(&json!({ "fundSourceAccountId": 100 }))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["changes"], json!({}));
        assert_eq!(store.apply_calls(), writes);
    }

    #[tokio::test]
    async fn test_delete_then_fetch_is_not_found() {
        let (_, server) = server();
        create_loan(&server).await;

        server.delete(LOAN_URL).await.assert_status(StatusCode::NO_CONTENT);
        server.get(LOAN_URL).await.assert_status_not_found();
    }
}

// ============================================================================
// FETCH
// ============================================================================

mod fetch_tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_returns_mappings_in_rule_order() {
        let (_, server) = server();
        let payload = ConfigurationPayloadBuilder::loan_cash()
            .payment_channel(1, 110)
            .fee(11, 420)
            .penalty(21, 421)
            .build();
        server.post(LOAN_URL).json(&payload).await.assert_status(StatusCode::CREATED);

        let response = server.get(LOAN_URL).await;
        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(body["accountingRule"], "CASH_BASED");
        assert_eq!(body["state"]["state"], "CONFIGURED");
        assert_eq!(body["mappings"].as_array().unwrap().len(), 14);
        assert_eq!(body["mappings"][0]["parameter"], "fundSourceAccountId");
        assert_eq!(body["feeToIncomeAccountMappings"].as_array().unwrap().len(), 1);
        assert_eq!(body["penaltyToIncomeAccountMappings"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_fetch_unconfigured_product_is_not_found() {
        let (_, server) = server();
        let response = server.get(LOAN_URL).await;
        response.assert_status_not_found();
        assert_eq!(response.json::<Value>()["error"], "not_found");
    }
}

// ============================================================================
// ERROR MAPPING
// ============================================================================

mod error_tests {
    use super::*;

    #[tokio::test]
    async fn test_validation_batch_is_unprocessable_with_details() {
        let (_, server) = server();
        let payload = ConfigurationPayloadBuilder::loan_cash()
            .remove("fundSourceAccountId")
            .raw("bogusParameter", json!(1))
            .build();

        let response = server.post(LOAN_URL).json(&payload).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body = response.json::<Value>();
        assert_eq!(body["error"], "validation_error");
        let details = body["details"].as_array().unwrap();
        let parameters: Vec<&str> = details.iter().filter_map(|d| d["parameter"].as_str()).collect();
        assert!(parameters.contains(&"fundSourceAccountId"));
        assert!(parameters.contains(&"bogusParameter"));
    }

    #[tokio::test]
    async fn test_second_create_is_conflict() {
        let (_, server) = server();
        create_loan(&server).await;

        server
            .post(LOAN_URL)
            .json(&ConfigurationPayloadBuilder::loan_cash().build())
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_duplicate_charge_key_is_conflict() {
        let (_, server) = server();
        let payload = ConfigurationPayloadBuilder::loan_cash()
            .fee(11, 420)
            .fee(11, 421)
            .build();

        server
            .post(LOAN_URL)
            .json(&payload)
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_missing_gl_account_is_not_found() {
        let (_, server) = server();
        let payload = ConfigurationPayloadBuilder::loan_cash()
            .slot("writeOffAccountId", ChartOfAccounts::missing_account())
            .build();

        server.post(LOAN_URL).json(&payload).await.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_unknown_product_type_is_not_found() {
        let (_, server) = server();
        server
            .get("/api/v1/products/mortgage/1/accounting")
            .await
            .assert_status_not_found();
    }
}

// ============================================================================
// RULES TEMPLATE
// ============================================================================

mod rules_tests {
    use super::*;

    #[tokio::test]
    async fn test_loan_cash_template() {
        let (_, server) = server();
        let response = server
            .get("/api/v1/accounting/rules/loan")
            .add_query_param("accountingRule", AccountingMethod::CashBased.code())
            .await;

        response.assert_status_ok();
        let body = response.json::<Value>();
        assert_eq!(body["requiredSlots"].as_array().unwrap().len(), 14);
        assert_eq!(body["requiredSlots"][0]["parameter"], "fundSourceAccountId");
        assert_eq!(body["optionalSlots"].as_array().unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_savings_dormancy_adds_escheat() {
        let (_, server) = server();
        let count = |body: &Value| body["requiredSlots"].as_array().unwrap().len();

        let without = server
            .get("/api/v1/accounting/rules/savings")
            .add_query_param("accountingRule", 2)
            .await
            .json::<Value>();
        let with = server
            .get("/api/v1/accounting/rules/savings")
            .add_query_param("accountingRule", 2)
            .add_query_param("isDormancyTrackingActive", true)
            .await
            .json::<Value>();

        assert_eq!(count(&with), count(&without) + 1);
    }

    #[tokio::test]
    async fn test_unsupported_combination_is_unprocessable() {
        let (_, server) = server();
        let response = server
            .get("/api/v1/accounting/rules/share")
            .add_query_param("accountingRule", 3)
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["details"][0]["parameter"], "accountingRule");
    }

    #[tokio::test]
    async fn test_deposit_type_rejected_for_loans() {
        let (_, server) = server();
        let response = server
            .get("/api/v1/accounting/rules/loan")
            .add_query_param("accountingRule", 2)
            .add_query_param("depositAccountType", 200)
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["details"][0]["code"], "unsupported");
    }
}

// ============================================================================
// MALFORMED REQUESTS
// ============================================================================

mod malformed_request_tests {
    use super::*;

    #[tokio::test]
    async fn test_malformed_body_uses_error_envelope() {
        let (store, server) = server();
        let response = server
            .post(LOAN_URL)
            .text(r#"{"accountingRule": "#)
            .content_type("application/json")
            .await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["error"], "bad_request");
        assert!(body["message"].as_str().is_some_and(|m| !m.is_empty()));
        assert_eq!(store.apply_calls(), 0);
    }

    #[tokio::test]
    async fn test_missing_accounting_rule_uses_error_envelope() {
        let (_, server) = server();
        let response = server.get("/api/v1/accounting/rules/loan").await;

        response.assert_status(StatusCode::BAD_REQUEST);
        let body = response.json::<Value>();
        assert_eq!(body["error"], "bad_request");
        assert!(body["message"].as_str().is_some_and(|m| m.contains("accountingRule")));
    }
}

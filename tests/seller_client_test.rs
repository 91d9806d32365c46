use anyhow::Result;
use httpmock::prelude::*;
use loyalty_service::core::CompanyDirectory;
use loyalty_service::utils::error::LookupError;
use loyalty_service::SellerServiceClient;
use serde_json::json;
use std::time::Duration;

fn client_for(server: &MockServer, timeout: Duration) -> Result<SellerServiceClient> {
    Ok(SellerServiceClient::new(server.base_url(), timeout)?)
}

#[tokio::test]
async fn test_get_company_decodes_record() -> Result<()> {
    let server = MockServer::start_async().await;
    let company_mock = server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/companies/42");
            then.status(200)
                .header("content-type", "application/json")
                .json_body(json!({
                    "id": 42,
                    "name": "Coffee Corner",
                    "addresses": [
                        { "id": 1, "city": "Taipei", "street": "Main", "building": "5A" }
                    ],
                    "manager_ids": [7, 8],
                    "created_at": "2024-01-10T08:00:00Z",
                    "updated_at": "2024-02-01T12:30:00Z"
                }));
        })
        .await;

    let client = client_for(&server, Duration::from_secs(2))?;
    let company = client.get_company(42).await?;

    company_mock.assert_async().await;
    assert_eq!(company.id, 42);
    assert_eq!(company.name, "Coffee Corner");
    assert_eq!(company.addresses.len(), 1);
    assert!(company.is_managed_by(7));
    assert!(!company.is_managed_by(9));
    Ok(())
}

#[tokio::test]
async fn test_get_company_tolerates_missing_optional_fields() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/companies/5");
            then.status(200).json_body(json!({ "id": 5 }));
        })
        .await;

    let company = client_for(&server, Duration::from_secs(2))?
        .get_company(5)
        .await?;

    assert!(company.manager_ids.is_empty());
    assert!(company.created_at.is_none());
    Ok(())
}

#[tokio::test]
async fn test_not_found_maps_to_company_not_found() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/companies/404");
            then.status(404).body("company not found");
        })
        .await;

    let result = client_for(&server, Duration::from_secs(2))?
        .get_company(404)
        .await;

    assert!(matches!(result, Err(LookupError::CompanyNotFound)));
    Ok(())
}

#[tokio::test]
async fn test_server_error_keeps_status_and_body() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/companies/42");
            then.status(500).body("database is down");
        })
        .await;

    let result = client_for(&server, Duration::from_secs(2))?
        .get_company(42)
        .await;

    match result {
        Err(LookupError::UnexpectedStatus { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "database is down");
        }
        other => panic!("expected unexpected status error, got {:?}", other),
    }
    Ok(())
}

#[tokio::test]
async fn test_malformed_body_is_invalid_response() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/companies/42");
            then.status(200).body("{ not json");
        })
        .await;

    let result = client_for(&server, Duration::from_secs(2))?
        .get_company(42)
        .await;

    assert!(matches!(result, Err(LookupError::InvalidResponse { .. })));
    Ok(())
}

#[tokio::test]
async fn test_slow_seller_service_times_out() -> Result<()> {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/api/v1/companies/42");
            then.status(200)
                .delay(Duration::from_millis(1500))
                .json_body(json!({ "id": 42, "manager_ids": [7] }));
        })
        .await;

    let result = client_for(&server, Duration::from_millis(200))?
        .get_company(42)
        .await;

    match result {
        Err(LookupError::Transport(e)) => assert!(e.is_timeout()),
        other => panic!("expected transport timeout, got {:?}", other),
    }
    Ok(())
}

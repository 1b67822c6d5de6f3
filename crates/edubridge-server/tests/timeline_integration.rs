//! Integration tests for the paginated notification feed.

mod common;

use std::time::Duration;

use anyhow::Result;
use chrono::NaiveDate;
use edubridge_portal::{EventType, PortalFixture, TimelineEvent};
use edubridge_session::CacheConfig;
use serde_json::Value;

fn feed(len: i64) -> Vec<TimelineEvent> {
    let start = NaiveDate::from_ymd_opt(2024, 9, 16)
        .unwrap()
        .and_hms_opt(12, 0, 0)
        .unwrap();
    (0..len)
        .map(|i| TimelineEvent {
            event_id: len - i,
            timestamp: start - chrono::Duration::minutes(i),
            event_type: EventType::Message,
            text: format!("event {}", len - i),
            author: None,
            recipient: None,
        })
        .collect()
}

fn fixture(len: i64) -> PortalFixture {
    PortalFixture::default()
        .with_account(common::USERNAME, common::PASSWORD, common::SUBDOMAIN)
        .with_timeline(feed(len))
}

fn ids(page: &Value) -> Vec<i64> {
    page.as_array()
        .unwrap()
        .iter()
        .map(|e| e["event_id"].as_i64().unwrap())
        .collect()
}

#[tokio::test]
async fn test_first_and_middle_pages() -> Result<()> {
    let server = common::TestServer::start_with(fixture(7), |c| c).await?;
    let token = server.login().await?;

    let page: Value = server
        .get("/timeline?items_per_page=3&page=0", &token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(ids(&page), vec![7, 6, 5]);

    let page: Value = server
        .get("/timeline?items_per_page=3&page=1", &token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(ids(&page), vec![4, 3, 2]);

    Ok(())
}

#[tokio::test]
async fn test_partial_last_page() -> Result<()> {
    let server = common::TestServer::start_with(fixture(7), |c| c).await?;
    let token = server.login().await?;

    let page: Value = server
        .get("/timeline?items_per_page=3&page=2", &token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(ids(&page), vec![1]);

    Ok(())
}

#[tokio::test]
async fn test_page_past_end_is_no_content() -> Result<()> {
    let server = common::TestServer::start_with(fixture(6), |c| c).await?;
    let token = server.login().await?;

    let resp = server
        .get("/timeline?items_per_page=3&page=2", &token)
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 204);
    assert!(resp.bytes().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_overflowing_page_is_no_content() -> Result<()> {
    let server = common::TestServer::start_with(fixture(6), |c| c).await?;
    let token = server.login().await?;

    let resp = server
        .get(
            &format!("/timeline?items_per_page=2&page={}", usize::MAX),
            &token,
        )
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 204);
    assert!(resp.bytes().await?.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_empty_feed_is_no_content() -> Result<()> {
    let server = common::TestServer::start_with(fixture(0), |c| c).await?;
    let token = server.login().await?;

    let resp = server.get("/timeline", &token).send().await?;
    assert_eq!(resp.status().as_u16(), 204);

    Ok(())
}

#[tokio::test]
async fn test_zero_page_size_rejected() -> Result<()> {
    let server = common::TestServer::start_with(fixture(3), |c| c).await?;
    let token = server.login().await?;

    let resp = server
        .get("/timeline?items_per_page=0&page=0", &token)
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await?;
    assert_eq!(body["code"], "bad_request");

    Ok(())
}

#[tokio::test]
async fn test_default_page_size() -> Result<()> {
    let server = common::TestServer::start().await?;
    let token = server.login().await?;

    let page: Value = server.get("/timeline", &token).send().await?.json().await?;
    assert_eq!(page.as_array().unwrap().len(), 10);

    Ok(())
}

#[tokio::test]
async fn test_timeline_requires_session() -> Result<()> {
    let server = common::TestServer::start_with(fixture(3), |c| c).await?;

    let resp = server
        .client
        .get(server.url("/timeline?items_per_page=3&page=0"))
        .send()
        .await?;
    assert_eq!(resp.status().as_u16(), 400);
    let body: Value = resp.json().await?;
    assert_eq!(body["code"], "missing_token");

    Ok(())
}

#[tokio::test]
async fn test_feed_cache_expires() -> Result<()> {
    let server = common::TestServer::start_with(fixture(4), |c| {
        c.with_timeline_cache(
            CacheConfig::default()
                .with_max_sessions(20)
                .with_ttl(Duration::from_millis(100))
                .with_cleanup_task(false),
        )
    })
    .await?;
    let token = server.login().await?;

    let first: Value = server
        .get("/timeline?items_per_page=2&page=0", &token)
        .send()
        .await?
        .json()
        .await?;
    let again: Value = server
        .get("/timeline?items_per_page=2&page=0", &token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(first, again);

    tokio::time::sleep(Duration::from_millis(200)).await;

    let refreshed: Value = server
        .get("/timeline?items_per_page=2&page=0", &token)
        .send()
        .await?
        .json()
        .await?;
    assert_eq!(ids(&refreshed), vec![4, 3]);

    Ok(())
}

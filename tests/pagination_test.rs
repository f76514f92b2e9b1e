use serde::Deserialize;
use serde_json::{Value, json};
use splex::error::ExportError;
use splex::session::{CredentialState, Session};
use splex::spotify::client::SpotifyClient;
use splex::spotify::pagination::{PageWalker, fetch_all};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, PartialEq, Deserialize)]
struct Item {
    id: u32,
}

fn client_for(server: &MockServer) -> SpotifyClient {
    SpotifyClient::with_api_url(Session::from_token("test-token").unwrap(), server.uri())
}

// Mounts `/items/0`, `/items/1`, ... each linking to the next page
async fn mount_pages(server: &MockServer, total: u32, page_size: usize) -> String {
    let items: Vec<Value> = (1..=total).map(|id| json!({ "id": id })).collect();
    let mut chunks: Vec<&[Value]> = items.chunks(page_size).collect();
    if chunks.is_empty() {
        chunks.push(&[]);
    }

    for (index, chunk) in chunks.iter().enumerate() {
        let next = if index + 1 < chunks.len() {
            json!(format!("{}/items/{}", server.uri(), index + 1))
        } else {
            Value::Null
        };

        Mock::given(method("GET"))
            .and(path(format!("/items/{}", index)))
            .and(header("authorization", "Bearer test-token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": chunk,
                "next": next,
                "total": total
            })))
            .mount(server)
            .await;
    }

    format!("{}/items/0", server.uri())
}

#[tokio::test]
async fn test_fetch_all_returns_every_item_in_order() {
    for page_size in [1, 2, 5] {
        let server = MockServer::start().await;
        let start_url = mount_pages(&server, 7, page_size).await;
        let client = client_for(&server);

        let items: Vec<Item> = fetch_all(&client, &start_url, 100).await.unwrap();

        let ids: Vec<u32> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, (1..=7).collect::<Vec<_>>(), "page size {}", page_size);
    }
}

#[tokio::test]
async fn test_walker_reports_pages_and_declared_total() {
    let server = MockServer::start().await;
    let start_url = mount_pages(&server, 5, 2).await;
    let client = client_for(&server);

    let mut walker = PageWalker::<Item>::new(&client, start_url);
    let mut sizes = Vec::new();
    while let Some(page) = walker.next_page().await {
        sizes.push(page.unwrap().items.len());
    }

    assert_eq!(sizes, vec![2, 2, 1]);
    assert_eq!(walker.pages_fetched(), 3);
    assert_eq!(walker.declared_total(), Some(5));
    assert!(walker.next_page().await.is_none());
}

#[tokio::test]
async fn test_empty_collection() {
    let server = MockServer::start().await;
    let start_url = mount_pages(&server, 0, 50).await;
    let client = client_for(&server);

    let items: Vec<Item> = fetch_all(&client, &start_url, 100).await.unwrap();
    assert!(items.is_empty());
}

#[tokio::test]
async fn test_repeated_walks_are_identical() {
    let server = MockServer::start().await;
    let start_url = mount_pages(&server, 6, 4).await;
    let client = client_for(&server);

    let first: Vec<Item> = fetch_all(&client, &start_url, 100).await.unwrap();
    let second: Vec<Item> = fetch_all(&client, &start_url, 100).await.unwrap();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_page_bound_stops_runaway_pagination() {
    let server = MockServer::start().await;
    let start_url = mount_pages(&server, 3, 1).await;
    let client = client_for(&server);

    let result = fetch_all::<Item>(&client, &start_url, 2).await;

    match result {
        Err(ExportError::PageLimit { url, max_pages }) => {
            assert_eq!(url, start_url);
            assert_eq!(max_pages, 2);
        }
        other => panic!("expected PageLimit, got {:?}", other),
    }
}

#[tokio::test]
async fn test_failed_page_is_an_error_not_a_truncation() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("GET"))
        .and(path("/items/0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": 1 }],
            "next": format!("{}/items/1", server.uri())
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/items/1"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let mut walker = PageWalker::<Item>::new(&client, format!("{}/items/0", server.uri()));
    assert!(walker.next_page().await.unwrap().is_ok());
    match walker.next_page().await {
        Some(Err(ExportError::Status { status, .. })) => assert_eq!(status.as_u16(), 500),
        other => panic!("expected Status error, got {:?}", other.map(|r| r.map(|p| p.items))),
    }
    // fused after a failure
    assert!(walker.next_page().await.is_none());
}

#[tokio::test]
async fn test_malformed_json_is_a_decode_error() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("GET"))
        .and(path("/items/0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let result = fetch_all::<Item>(&client, &format!("{}/items/0", server.uri()), 10).await;
    assert!(matches!(result, Err(ExportError::Decode { .. })));
}

#[tokio::test]
async fn test_rate_limit_is_not_retried_by_default() {
    let server = MockServer::start().await;
    let client = client_for(&server);

    Mock::given(method("GET"))
        .and(path("/items/0"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "7"))
        .expect(1)
        .mount(&server)
        .await;

    let result = fetch_all::<Item>(&client, &format!("{}/items/0", server.uri()), 10).await;

    match result {
        Err(ExportError::Throttled { retry_after }) => assert_eq!(retry_after, Some(7)),
        other => panic!("expected Throttled, got {:?}", other),
    }
}

#[tokio::test]
async fn test_throttle_retries_honor_retry_after_when_enabled() {
    let server = MockServer::start().await;
    let client = client_for(&server).with_throttle_retries(1);

    Mock::given(method("GET"))
        .and(path("/items/0"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/items/0"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [{ "id": 1 }],
            "next": null
        })))
        .expect(1)
        .mount(&server)
        .await;

    let items: Vec<Item> = fetch_all(&client, &format!("{}/items/0", server.uri()), 10)
        .await
        .unwrap();
    assert_eq!(items, vec![Item { id: 1 }]);
}

#[tokio::test]
async fn test_unauthorized_expires_the_session() {
    let server = MockServer::start().await;
    let client = client_for(&server);
    let url = format!("{}/items/0", server.uri());

    Mock::given(method("GET"))
        .and(path("/items/0"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let result = fetch_all::<Item>(&client, &url, 10).await;
    assert!(matches!(result, Err(ExportError::CredentialExpired)));
    assert_eq!(client.session().state(), CredentialState::Expired);

    // no request leaves an expired session
    let again = fetch_all::<Item>(&client, &url, 10).await;
    assert!(matches!(again, Err(ExportError::CredentialExpired)));
}

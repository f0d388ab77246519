use std::time::Duration;

use super::*;

#[test]
fn test_parse_endpoint_accepts_http_and_https() {
    assert!(parse_endpoint("http://127.0.0.1:2379").is_ok());
    assert!(parse_endpoint("https://etcd.example.com:2379").is_ok());
    assert!(parse_endpoint(" http://localhost:2379 ").is_ok());
}

#[test]
fn test_parse_endpoint_rejects_bad_values() {
    for raw in ["", "localhost:2379", "ftp://127.0.0.1:2379", "http://"] {
        let e = parse_endpoint(raw).unwrap_err();
        assert!(
            matches!(e, ClientError::InvalidEndpoint { .. }),
            "unexpected error for {raw:?}: {e:?}"
        );
    }
}

#[test]
fn test_keys_path_adds_missing_slash() {
    assert_eq!(keys_path("/a/b"), "/v2/keys/a/b");
    assert_eq!(keys_path("a/b"), "/v2/keys/a/b");
    assert_eq!(keys_path("/"), "/v2/keys/");
}

#[test]
fn test_api_url_ignores_trailing_slash_on_endpoint() {
    let endpoint = parse_endpoint("http://127.0.0.1:2379/").unwrap();
    let url = api_url(&endpoint, "/v2/keys/a").unwrap();
    assert_eq!(url.as_str(), "http://127.0.0.1:2379/v2/keys/a");
}

#[test]
fn test_watch_params() {
    let params = Client::watch_params(42, true);
    assert_eq!(
        params,
        vec![
            ("wait", "true".to_string()),
            ("waitIndex", "42".to_string()),
            ("recursive", "true".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_build_rejects_empty_endpoint_list() {
    let result = Client::builder(vec![]).sync_cluster(false).build().await;
    assert!(matches!(result, Err(ClientError::NoEndpoints)));
}

#[tokio::test]
async fn test_build_rejects_invalid_endpoint() {
    let result = Client::builder(vec!["http://127.0.0.1:2379".into(), "not a url".into()])
        .sync_cluster(false)
        .build()
        .await;
    assert!(matches!(result, Err(ClientError::InvalidEndpoint { .. })));
}

#[tokio::test]
async fn test_build_without_sync_keeps_bootstrap_endpoints() {
    let client = Client::builder(vec!["http://10.0.0.1:2379".into(), "http://10.0.0.2:2379/".into()])
        .sync_cluster(false)
        .build()
        .await
        .unwrap();

    assert_eq!(client.endpoints(), vec!["http://10.0.0.1:2379", "http://10.0.0.2:2379"]);
}

#[tokio::test]
async fn test_read_params_follow_consistency() {
    let strong = Client::builder(vec!["http://10.0.0.1:2379".into()])
        .sync_cluster(false)
        .build()
        .await
        .unwrap();
    assert!(strong.read_params().contains(&("quorum", "true".to_string())));

    let weak = Client::builder(vec!["http://10.0.0.1:2379".into()])
        .sync_cluster(false)
        .consistency(Consistency::Weak)
        .build()
        .await
        .unwrap();
    assert!(!weak.read_params().iter().any(|(k, _)| *k == "quorum"));
}

#[tokio::test]
async fn test_clients_can_share_one_transport() {
    let transport = Transport::new(&ClientConfig::default()).unwrap();
    let a = Client::builder(vec!["http://10.0.0.1:2379".into()])
        .sync_cluster(false)
        .transport(transport.clone())
        .build()
        .await
        .unwrap();
    let b = Client::builder(vec!["http://10.0.0.2:2379".into()])
        .sync_cluster(false)
        .transport(transport.clone())
        .build()
        .await
        .unwrap();
    let c = Client::builder(vec!["http://10.0.0.3:2379".into()])
        .sync_cluster(false)
        .build()
        .await
        .unwrap();

    assert!(a.transport().same_pool(b.transport()));
    assert!(!a.transport().same_pool(c.transport()));

    a.close_idle_connections();
    assert_eq!(b.transport().idle_resets(), 1);
    assert_eq!(c.transport().idle_resets(), 0);
}

#[tokio::test]
async fn test_promote_moves_answering_endpoint_first() {
    let client = Client::builder(vec!["http://10.0.0.1:2379".into(), "http://10.0.0.2:2379".into()])
        .sync_cluster(false)
        .build()
        .await
        .unwrap();

    let second = parse_endpoint("http://10.0.0.2:2379").unwrap();
    client.promote(&second);
    assert_eq!(client.endpoints(), vec!["http://10.0.0.2:2379", "http://10.0.0.1:2379"]);
}

#[tokio::test]
async fn test_raw_watch_returns_stopped_by_user_when_token_already_cancelled() {
    // Unroutable address: the request would hang on connect if it were issued
    let client = Client::builder(vec!["http://10.255.255.1:2379".into()])
        .sync_cluster(false)
        .connect_timeout(Duration::from_secs(30))
        .build()
        .await
        .unwrap();
    let stop = CancellationToken::new();
    stop.cancel();

    let result = client.raw_watch("/a", 1, true, stop).await;
    assert!(matches!(result, Err(WatchCallError::StoppedByUser)));
}

#[tokio::test]
async fn test_sync_cluster_fails_when_no_member_answers() {
    // Port 1 on loopback refuses connections
    let result = Client::builder(vec!["http://127.0.0.1:1".into()])
        .connect_timeout(Duration::from_millis(200))
        .request_timeout(Duration::from_millis(200))
        .build()
        .await;
    assert!(matches!(result, Err(ClientError::ClusterUnreachable(_))));
}

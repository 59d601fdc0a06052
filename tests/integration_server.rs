mod common;

use common::FakeNode;
use eth_address_watcher::api::ApiServer;
use eth_address_watcher::EthereumParser;
use std::sync::Arc;

#[tokio::test]
async fn test_api_server_creation() {
    let parser = Arc::new(EthereumParser::new(Arc::new(FakeNode::new(1))));

    // Not started: start() serves until Ctrl-C
    let server = ApiServer::new(parser, "127.0.0.1", 3000);

    assert_eq!(server.host, "127.0.0.1");
    assert_eq!(server.port, 3000);
}

#[tokio::test]
async fn test_api_server_reports_bind_failure() {
    let occupied = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = occupied.local_addr().unwrap().port();

    let parser = Arc::new(EthereumParser::new(Arc::new(FakeNode::new(1))));
    let server = ApiServer::new(parser, "127.0.0.1", port);

    let error = server.start().await.unwrap_err();
    assert!(error.to_string().contains("Failed to bind"));
}

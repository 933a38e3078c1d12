//! Round-trip tests for the WebSocket transport.

use fairway_transport::{Connection, WebSocketTransport};
use futures_util::{SinkExt, StreamExt};
use tokio_tungstenite::tungstenite::Message;

/// Binds a transport on a random port and returns it with its address.
async fn bound_transport() -> (WebSocketTransport, String) {
    let transport = WebSocketTransport::bind("127.0.0.1:0")
        .await
        .expect("bind should succeed");
    let addr = transport.local_addr().expect("local addr").to_string();
    (transport, addr)
}

#[tokio::test]
async fn test_accept_captures_the_request_query() {
    let (mut transport, addr) = bound_transport().await;

    let client = tokio::spawn(async move {
        let (ws, _) =
            tokio_tungstenite::connect_async(format!("ws://{addr}/ws?gameId=1&userId=2"))
                .await
                .expect("client connect");
        ws
    });

    let conn = transport.accept().await.expect("accept");
    assert_eq!(conn.path_and_query(), "/ws?gameId=1&userId=2");

    let _ws = client.await.unwrap();
}

#[tokio::test]
async fn test_send_and_recv_round_trip() {
    let (mut transport, addr) = bound_transport().await;

    let client = tokio::spawn(async move {
        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/"))
            .await
            .expect("client connect");
        ws.send(Message::Binary(b"hello server".to_vec().into()))
            .await
            .expect("client send");
        let reply = ws.next().await.expect("reply frame").expect("frame ok");
        reply.into_data().to_vec()
    });

    let conn = transport.accept().await.expect("accept");
    let inbound = conn.recv().await.expect("recv").expect("open");
    assert_eq!(inbound, b"hello server");

    conn.send(b"hello client").await.expect("send");
    assert_eq!(client.await.unwrap(), b"hello client");
}

#[tokio::test]
async fn test_text_frames_arrive_as_bytes() {
    let (mut transport, addr) = bound_transport().await;

    let client = tokio::spawn(async move {
        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/"))
            .await
            .expect("client connect");
        ws.send(Message::Text("{\"type\":\"game:start\"}".into()))
            .await
            .expect("client send");
        ws
    });

    let conn = transport.accept().await.expect("accept");
    let inbound = conn.recv().await.expect("recv").expect("open");
    assert_eq!(inbound, b"{\"type\":\"game:start\"}");

    let _ws = client.await.unwrap();
}

#[tokio::test]
async fn test_client_close_yields_none() {
    let (mut transport, addr) = bound_transport().await;

    let client = tokio::spawn(async move {
        let (mut ws, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/"))
            .await
            .expect("client connect");
        ws.close(None).await.expect("client close");
    });

    let conn = transport.accept().await.expect("accept");
    let inbound = conn.recv().await.expect("recv");
    assert!(inbound.is_none());

    client.await.unwrap();
}

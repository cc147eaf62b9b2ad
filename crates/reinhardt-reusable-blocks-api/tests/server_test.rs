//! Serves the slot API on an ephemeral port and talks raw HTTP/1.1 to it

use reinhardt_reusable_blocks_api::{ApiServer, SlotsApi};
use reinhardt_reusable_blocks_conf::ReusableBlocksSettings;
use reinhardt_reusable_blocks_core::prelude::*;
use rstest::rstest;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;

async fn get(addr: SocketAddr, path: &str) -> String {
	let mut stream = TcpStream::connect(addr).await.unwrap();
	let request = format!("GET {path} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n");
	stream.write_all(request.as_bytes()).await.unwrap();
	let mut raw = String::new();
	stream.read_to_string(&mut raw).await.unwrap();
	raw
}

fn body(raw: &str) -> serde_json::Value {
	let (_, body) = raw.split_once("\r\n\r\n").unwrap();
	serde_json::from_str(body).unwrap()
}

#[rstest]
#[tokio::test]
async fn test_server_answers_slot_and_render_requests() {
	// Arrange
	let store = Arc::new(InMemoryDocumentStore::new());
	let layout = store
		.create(
			"Layout",
			StreamField::new().add_block(ContentBlock::slot(
				SlotPlaceholder::new("main")
					.with_default(StreamField::new().add_block(ContentBlock::rich_text("<p>D</p>"))),
			)),
		)
		.unwrap();
	let api = SlotsApi::new(store, &ReusableBlocksSettings::default());
	let server = ApiServer::new(Arc::new(api));
	let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
	let addr = listener.local_addr().unwrap();
	let (stop_tx, stop_rx) = oneshot::channel::<()>();
	let handle = tokio::spawn(async move {
		server
			.serve(listener, async {
				let _ = stop_rx.await;
			})
			.await
	});

	// Act
	let slots = get(addr, &format!("/reusable-blocks/blocks/{}/slots/", layout.id)).await;
	let render = get(addr, &format!("/reusable-blocks/blocks/{}/render/", layout.id)).await;
	let missing = get(addr, "/reusable-blocks/blocks/nope/slots/").await;
	stop_tx.send(()).unwrap();

	// Assert
	assert!(slots.starts_with("HTTP/1.1 200"));
	assert!(slots.contains("content-type: application/json"));
	assert_eq!(
		body(&slots),
		serde_json::json!({"slots": [{"id": "main", "label": "main", "has_default": true}]})
	);
	assert!(render.starts_with("HTTP/1.1 200"));
	assert!(render.contains(r#"<p>D</p>"#));
	assert!(missing.starts_with("HTTP/1.1 400"));
	handle.await.unwrap().unwrap();
}

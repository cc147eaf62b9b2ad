//! HTTP/1 server for [`SlotsApi`]

use crate::error::ApiError;
use crate::handler::{ApiResponse, SlotsApi};
use bytes::Bytes;
use http::header::CONTENT_TYPE;
use http_body_util::Full;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::Service;
use hyper_util::rt::TokioIo;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};

/// Serves a [`SlotsApi`] with one task per connection
pub struct ApiServer {
	api: Arc<SlotsApi>,
}

impl ApiServer {
	/// Server for `api`
	pub fn new(api: Arc<SlotsApi>) -> Self {
		Self { api }
	}

	/// Bind `addr` and serve until the process exits
	///
	/// # Examples
	///
	/// ```no_run
	/// use std::sync::Arc;
	/// use reinhardt_reusable_blocks_api::{ApiServer, SlotsApi};
	/// use reinhardt_reusable_blocks_conf::ReusableBlocksSettings;
	/// use reinhardt_reusable_blocks_core::store::InMemoryDocumentStore;
	///
	/// # async fn example() -> anyhow::Result<()> {
	/// let store = Arc::new(InMemoryDocumentStore::new());
	/// let api = SlotsApi::new(store, &ReusableBlocksSettings::default());
	/// ApiServer::new(Arc::new(api)).listen("127.0.0.1:8000".parse()?).await?;
	/// # Ok(())
	/// # }
	/// ```
	pub async fn listen(&self, addr: SocketAddr) -> anyhow::Result<()> {
		let listener = TcpListener::bind(addr).await?;
		self.serve(listener, std::future::pending()).await
	}

	/// Accept connections on `listener` until `shutdown` resolves
	pub async fn serve(
		&self,
		listener: TcpListener,
		shutdown: impl Future<Output = ()>,
	) -> anyhow::Result<()> {
		tracing::info!(addr = ?listener.local_addr().ok(), prefix = self.api.prefix(), "slot API listening");
		tokio::pin!(shutdown);

		loop {
			tokio::select! {
				result = listener.accept() => {
					let (stream, socket_addr) = result?;
					let api = self.api.clone();

					tokio::task::spawn(async move {
						if let Err(err) = Self::handle_connection(stream, socket_addr, api).await {
							tracing::warn!(%socket_addr, error = %err, "error handling connection");
						}
					});
				}
				_ = &mut shutdown => {
					tracing::info!("shutdown signal received, stopping slot API");
					break;
				}
			}
		}

		Ok(())
	}

	async fn handle_connection(
		stream: TcpStream,
		socket_addr: SocketAddr,
		api: Arc<SlotsApi>,
	) -> Result<(), hyper::Error> {
		let io = TokioIo::new(stream);
		let service = RequestService {
			api,
			remote_addr: socket_addr,
		};

		http1::Builder::new().serve_connection(io, service).await
	}
}

struct RequestService {
	api: Arc<SlotsApi>,
	remote_addr: SocketAddr,
}

impl Service<hyper::Request<Incoming>> for RequestService {
	type Response = hyper::Response<Full<Bytes>>;
	type Error = http::Error;
	type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send + 'static>>;

	fn call(&self, req: hyper::Request<Incoming>) -> Self::Future {
		let api = self.api.clone();
		let remote_addr = self.remote_addr;
		let method = req.method().clone();
		let path = req.uri().path().to_string();

		Box::pin(async move {
			tracing::debug!(%remote_addr, %method, path, "slot API request");

			// Rendering is synchronous and may block on the store
			let response = tokio::task::spawn_blocking(move || api.handle(&method, &path))
				.await
				.unwrap_or_else(|err| ApiResponse::from(ApiError::Internal(err.to_string())));

			hyper::Response::builder()
				.status(response.status)
				.header(CONTENT_TYPE, "application/json")
				.body(Full::new(Bytes::from(response.body_bytes())))
		})
	}
}

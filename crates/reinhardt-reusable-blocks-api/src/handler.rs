//! Transport-free request handling

use crate::error::ApiError;
use http::{Method, StatusCode};
use reinhardt_reusable_blocks_conf::ReusableBlocksSettings;
use reinhardt_reusable_blocks_core::compositor::SlotCompositor;
use reinhardt_reusable_blocks_core::content::{BlockId, SlotFills};
use reinhardt_reusable_blocks_core::document::DocumentStore;
use reinhardt_reusable_blocks_core::inventory::SlotInventory;
use serde_json::{Value, json};
use std::sync::Arc;

/// Status and JSON body of an API response
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
	/// HTTP status
	pub status: StatusCode,
	/// JSON body
	pub body: Value,
}

impl ApiResponse {
	/// 200 response with `body`
	pub fn ok(body: Value) -> Self {
		Self {
			status: StatusCode::OK,
			body,
		}
	}

	/// Serialized body bytes
	pub fn body_bytes(&self) -> Vec<u8> {
		self.body.to_string().into_bytes()
	}
}

impl From<ApiError> for ApiResponse {
	fn from(err: ApiError) -> Self {
		Self {
			status: err.status(),
			body: err.to_body(),
		}
	}
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
	Slots,
	Render,
}

/// Routes slot inventory and render requests
pub struct SlotsApi {
	inventory: SlotInventory,
	compositor: SlotCompositor,
	prefix: String,
}

impl SlotsApi {
	/// API over `store`, mounted at `settings.api_prefix`
	pub fn new(store: Arc<dyn DocumentStore>, settings: &ReusableBlocksSettings) -> Self {
		Self {
			inventory: SlotInventory::new(store.clone(), settings),
			compositor: SlotCompositor::new(store, settings),
			prefix: settings.api_prefix.trim_end_matches('/').to_string(),
		}
	}

	/// Mount prefix without its trailing slash
	pub fn prefix(&self) -> &str {
		&self.prefix
	}

	/// Answer `method path`, never failing
	///
	/// Errors are turned into `{"detail": ...}` bodies with a matching status.
	pub fn handle(&self, method: &Method, path: &str) -> ApiResponse {
		match self.dispatch(method, path) {
			Ok(response) => response,
			Err(err) => {
				if err.status().is_server_error() {
					tracing::error!(%method, path, error = %err, "slot API request failed");
				} else {
					tracing::debug!(%method, path, status = %err.status(), "slot API request rejected");
				}
				err.into()
			}
		}
	}

	fn dispatch(&self, method: &Method, path: &str) -> Result<ApiResponse, ApiError> {
		let (raw_id, action) = self.route(path)?;
		if *method != Method::GET {
			return Err(ApiError::MethodNotAllowed(method.to_string()));
		}
		let id: BlockId = raw_id
			.parse()
			.map_err(|_| ApiError::InvalidId(raw_id.to_string()))?;

		match action {
			Action::Slots => {
				let slots = self.inventory.inventory(id)?;
				Ok(ApiResponse::ok(json!({ "slots": slots })))
			}
			Action::Render => {
				let html = self.compositor.render(id, &SlotFills::new())?;
				Ok(ApiResponse::ok(json!({ "html": html })))
			}
		}
	}

	fn route<'p>(&self, path: &'p str) -> Result<(&'p str, Action), ApiError> {
		let not_found = || ApiError::NotFound(format!("No route for {path}"));
		let path = path.split('?').next().unwrap_or_default();
		let rest = path.strip_prefix(self.prefix.as_str()).ok_or_else(not_found)?;
		let segments: Vec<&str> = rest.trim_matches('/').split('/').collect();

		match segments.as_slice() {
			["blocks", id, "slots"] => Ok((*id, Action::Slots)),
			["blocks", id, "render"] => Ok((*id, Action::Render)),
			_ => Err(not_found()),
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use reinhardt_reusable_blocks_core::content::{ContentBlock, SlotPlaceholder, StreamField};
	use reinhardt_reusable_blocks_core::store::InMemoryDocumentStore;
	use rstest::{fixture, rstest};

	#[fixture]
	fn store() -> Arc<InMemoryDocumentStore> {
		Arc::new(InMemoryDocumentStore::new())
	}

	#[rstest]
	#[case::no_prefix("/blocks/x/slots/")]
	#[case::unknown_action("/reusable-blocks/blocks/x/edit/")]
	#[case::too_short("/reusable-blocks/blocks/")]
	#[case::prefix_only("/reusable-blocks")]
	fn test_unknown_routes_are_not_found(store: Arc<InMemoryDocumentStore>, #[case] path: &str) {
		// Arrange
		let api = SlotsApi::new(store, &ReusableBlocksSettings::default());

		// Act
		let response = api.handle(&Method::GET, path);

		// Assert
		assert_eq!(response.status, StatusCode::NOT_FOUND);
	}

	#[rstest]
	fn test_route_accepts_missing_trailing_slash_and_query(store: Arc<InMemoryDocumentStore>) {
		// Arrange
		let layout = store
			.create(
				"Layout",
				StreamField::new().add_block(ContentBlock::slot(SlotPlaceholder::new("main"))),
			)
			.unwrap();
		let api = SlotsApi::new(store, &ReusableBlocksSettings::default());

		// Act
		let response = api.handle(
			&Method::GET,
			&format!("/reusable-blocks/blocks/{}/slots?fresh=1", layout.id),
		);

		// Assert
		assert_eq!(response.status, StatusCode::OK);
	}

	#[rstest]
	fn test_custom_prefix_with_trailing_slash(store: Arc<InMemoryDocumentStore>) {
		// Arrange
		let settings = ReusableBlocksSettings {
			api_prefix: "/cms/api/".to_string(),
			..Default::default()
		};
		let api = SlotsApi::new(store, &settings);

		// Act
		let response = api.handle(&Method::GET, "/cms/api/blocks/not-a-uuid/slots/");

		// Assert
		assert_eq!(api.prefix(), "/cms/api");
		assert_eq!(response.status, StatusCode::BAD_REQUEST);
	}
}

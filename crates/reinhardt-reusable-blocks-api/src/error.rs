//! API error types and their HTTP status mapping

use http::StatusCode;
use reinhardt_reusable_blocks_core::BlocksError;
use thiserror::Error;

/// Errors surfaced to API clients
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
	/// Path segment is not a block id
	#[error("Invalid block id: {0}")]
	InvalidId(String),

	/// Unknown route or missing document
	#[error("{0}")]
	NotFound(String),

	/// Route exists but not for this method
	#[error("Method {0} not allowed")]
	MethodNotAllowed(String),

	/// Render exceeded its time budget
	#[error("{0}")]
	Timeout(String),

	/// Anything else
	#[error("{0}")]
	Internal(String),
}

impl ApiError {
	/// HTTP status for this error
	pub fn status(&self) -> StatusCode {
		match self {
			ApiError::InvalidId(_) => StatusCode::BAD_REQUEST,
			ApiError::NotFound(_) => StatusCode::NOT_FOUND,
			ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
			ApiError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
			ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	/// JSON body in the `{"detail": ...}` shape
	pub fn to_body(&self) -> serde_json::Value {
		serde_json::json!({ "detail": self.to_string() })
	}
}

impl From<BlocksError> for ApiError {
	fn from(err: BlocksError) -> Self {
		match err {
			BlocksError::NotFound(_) => ApiError::NotFound(err.to_string()),
			BlocksError::RenderTimeout { .. } => ApiError::Timeout(err.to_string()),
			other => ApiError::Internal(other.to_string()),
		}
	}
}

//! Editor settings, fixed at build time and shared through Leptos context.

use crate::components::tree_canvas::RetryPolicy;

/// Where the node store listens when `TREE_EDITOR_API_URL` is not set at build time.
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Settings consumed by the canvas and its remote store client.
#[derive(Clone, Debug, PartialEq)]
pub struct EditorConfig {
	/// Base URL of the node store, without a trailing slash.
	pub api_url: String,
	/// Canvas size used before the element is laid out, and as the range for
	/// nodes loaded without coordinates.
	pub canvas_width: f64,
	/// See `canvas_width`.
	pub canvas_height: f64,
	/// Retry schedule for creates and deletes.
	pub retry: RetryPolicy,
}

impl Default for EditorConfig {
	fn default() -> Self {
		Self {
			api_url: DEFAULT_API_URL.to_string(),
			canvas_width: 800.0,
			canvas_height: 600.0,
			retry: RetryPolicy::default(),
		}
	}
}

impl EditorConfig {
	/// Defaults, with the API URL taken from `TREE_EDITOR_API_URL` when it was set
	/// for the build.
	pub fn from_build_env() -> Self {
		match option_env!("TREE_EDITOR_API_URL") {
			Some(url) if !url.trim().is_empty() => Self::default().with_api_url(url),
			_ => Self::default(),
		}
	}

	/// Replaces the API URL.
	pub fn with_api_url(mut self, url: &str) -> Self {
		self.api_url = url.trim().trim_end_matches('/').to_string();
		self
	}
}

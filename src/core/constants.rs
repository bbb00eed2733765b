//! Shared constants used across the application

pub const DEFAULT_BASE_URL: &str = "https://mvp.slangit.ai/api";

pub const TOKEN_ENV_VAR: &str = "SLANGIT_TOKEN";
pub const BASE_URL_ENV_VAR: &str = "SLANGIT_BASE_URL";

pub const DEFAULT_LANGUAGE: &str = "EN";
pub const MESSAGE_TYPE_TEXT: &str = "TEXT";

pub const DEFAULT_OUTPUT_DIR: &str = "space_query_results";
pub const DEFAULT_RESULTS_PREFIX: &str = "batch_results";

/// Answers containing one of these are treated as failed exchanges.
pub const DEFAULT_APOLOGY_MARKERS: &[&str] = &["sorry"];

/// Number of chat panels rendered side by side.
pub const PANEL_COUNT: usize = 3;

//! Supported Gemini model IDs.
//!
//! | Model ID | Tier | Notes |
//! |----------|------|-------|
//! | `gemini-2.5-pro` | Stable | Production-ready |
//! | `gemini-2.5-flash` | Stable | Fast, budget-friendly |
//! | `gemini-2.5-flash-lite` | Stable lite | Lightest option (default) |
//! | `gemini-3-flash-preview` | Preview fast | |
//! | `gemini-3-pro-preview` | Preview | |
//!
//! Reference: <https://ai.google.dev/gemini-api/docs/models>
//!
//! Any other ID is still sent as-is; the shell only warns about it. When the
//! default changes, update `DEFAULT_MODEL_NAME` in `banter-core/src/config.rs`
//! and the table above.

pub const SUPPORTED_GEMINI_MODELS: &[&str] = &[
    "gemini-2.5-pro",
    "gemini-2.5-flash",
    "gemini-2.5-flash-lite",
    "gemini-3-flash-preview",
    "gemini-3-pro-preview",
];

pub fn is_known_model(model: &str) -> bool {
    SUPPORTED_GEMINI_MODELS.contains(&model)
}

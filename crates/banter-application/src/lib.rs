pub mod context;
pub mod exchange;
pub mod render;

pub use context::ContextStrategy;
pub use exchange::{CANCELLED_REPLY, ExchangeOrchestrator, RejectReason, SendOutcome};
pub use render::{BOT_LABEL, MessageRow, RowSide, SanitizedRenderer, TYPING_INDICATOR, render_rows};

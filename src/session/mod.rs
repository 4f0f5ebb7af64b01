//! Per-panel session state, updated through plain transition methods

mod highlight;
mod overview;

pub use highlight::{ChatMessage, HIGHLIGHT_APOLOGY, HighlightPhase, HighlightSession, Role};
pub use overview::{OVERVIEW_ERROR, OverviewPhase, OverviewSession};

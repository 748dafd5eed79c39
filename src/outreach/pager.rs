//! Batch window computation

use super::state::RunState;
use crate::config::RunConfig;

/// Offset and size of the next search call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    /// Start offset
    pub offset: u32,
    /// Requested page size
    pub size: u32,
}

/// Next window to fetch, or `None` when nothing remains to process
///
/// The size is the remaining work capped at `page_cap`.
pub fn next_window(state: &RunState, config: &RunConfig, page_cap: u32) -> Option<Window> {
    let remaining = config.total_leads.saturating_sub(state.processed);
    let size = remaining.min(page_cap);
    (size > 0).then_some(Window {
        offset: state.cursor,
        size,
    })
}

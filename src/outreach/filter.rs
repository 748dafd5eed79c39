//! Pending-invitation filtering

use crate::types::{Candidate, Page};

/// A page split into actionable candidates and a skip count
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilteredPage {
    /// Candidates without a pending invitation, in page order
    pub available: Vec<Candidate>,
    /// Candidates dropped for a pending invitation
    pub skipped: u32,
    /// Elements the directory returned
    pub received: u32,
}

/// Drop every candidate that already has a pending invitation
pub fn filter_page(page: Page) -> FilteredPage {
    let received = page.len() as u32;
    let available: Vec<Candidate> = page
        .elements
        .into_iter()
        .filter(|c| !c.pending_invitation)
        .collect();
    FilteredPage {
        skipped: received - available.len() as u32,
        available,
        received,
    }
}

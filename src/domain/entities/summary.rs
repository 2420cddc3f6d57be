//! Link summary joined with its click count.

/// A link listed together with its aggregated click count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkSummary {
    pub short_code: String,
    pub long_url: String,
    pub click_count: u64,
}

//! Time-window splitting and per-window fetch state.

use crate::core::TimeRange;

/// Paging state of one fetch window.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageToken {
    /// No fetch has been issued for this window yet
    #[default]
    Initial,
    /// Opaque upstream cursor for the next page
    Next(String),
    /// The upstream reported no further pages for this window
    Exhausted,
}

impl PageToken {
    /// Returns true while the window still has pages to fetch
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Exhausted)
    }

    /// Returns the cursor to send upstream, if one was issued
    pub fn as_cursor(&self) -> Option<&str> {
        match self {
            Self::Next(token) => Some(token),
            Self::Initial | Self::Exhausted => None,
        }
    }

    /// Folds the token returned by a fetch back into the window state.
    /// An absent token marks the window exhausted; it will not be
    /// queried again.
    pub fn advance(&mut self, next: Option<String>) {
        *self = match next {
            Some(token) => Self::Next(token),
            None => Self::Exhausted,
        };
    }
}

/// One sub-range of the request time range, paged independently.
///
/// Owned by the engine for the lifetime of a single analytics request;
/// mutated only between rounds.
#[derive(Debug, Clone)]
pub struct FetchWindow {
    /// Sub-range of the overall request range
    pub range: TimeRange,
    /// Continuation state across rounds
    pub token: PageToken,
    /// Sampling rate for this window's next fetch, in `(0, 1]`.
    /// Monotonically non-increasing across rounds.
    pub sampling: f64,
}

impl FetchWindow {
    /// Creates a window that has not been fetched yet
    pub fn new(range: TimeRange, sampling: f64) -> Self {
        Self {
            range,
            token: PageToken::Initial,
            sampling,
        }
    }
}

/// Splits `range` into `parts` contiguous sub-ranges of equal duration.
///
/// Boundaries are computed as `from + duration * i / parts` with the
/// multiplication first, so consecutive windows share a boundary and the
/// last window ends exactly at `range.to` even when the duration does not
/// divide evenly.
pub fn split(range: &TimeRange, parts: usize) -> Vec<TimeRange> {
    if parts <= 1 {
        return vec![*range];
    }
    let total = range.duration();
    let mut windows = Vec::with_capacity(parts);
    let mut start = range.from;
    for i in 1..=parts {
        let end = if i == parts {
            range.to
        } else {
            range.from + total * (i as i32) / (parts as i32)
        };
        windows.push(TimeRange::new(start, end));
        start = end;
    }
    windows
}

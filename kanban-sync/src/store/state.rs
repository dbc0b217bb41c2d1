//! Observable board state

use crate::types::BoardSnapshot;
use serde::Serialize;

/// Lifecycle phase derived from a [`BoardState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Phase {
    /// Nothing has happened yet: no `init`, no fetch outcome, no mutation
    Uninitialized,
    /// Waiting for the first successful fetch
    Loading,
    Ready,
    /// At least one mutation is in flight
    Mutating,
    /// The latest fetch failed; see [`BoardState::error`]
    Error,
}

/// What a view should render
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardView<'a> {
    /// Nothing fetched yet. `error` is set when the first fetch failed.
    NoData { error: Option<&'a str> },
    /// Last-known-good data plus an error banner
    Stale {
        snapshot: &'a BoardSnapshot,
        error: &'a str,
    },
    Fresh { snapshot: &'a BoardSnapshot },
}

/// Everything a view may read from the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BoardState {
    pub snapshot: BoardSnapshot,
    /// Message of the latest failed fetch, cleared by the next success
    pub error: Option<String>,
    /// At least one fetch has been applied
    pub loaded: bool,
    pub started: bool,
    pub in_flight: usize,
}

impl BoardState {
    pub fn phase(&self) -> Phase {
        // A plain `refresh` or mutation before `init` still counts as activity
        let idle = !self.started && !self.loaded && self.error.is_none() && self.in_flight == 0;
        if idle {
            Phase::Uninitialized
        } else if self.in_flight > 0 {
            Phase::Mutating
        } else if self.error.is_some() {
            Phase::Error
        } else if !self.loaded {
            Phase::Loading
        } else {
            Phase::Ready
        }
    }

    pub fn view(&self) -> BoardView<'_> {
        match (&self.error, self.loaded) {
            (error, false) => BoardView::NoData {
                error: error.as_deref(),
            },
            (Some(error), true) => BoardView::Stale {
                snapshot: &self.snapshot,
                error: error.as_str(),
            },
            (None, true) => BoardView::Fresh {
                snapshot: &self.snapshot,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Column;

    #[test]
    fn test_phase_transitions() {
        let mut state = BoardState::default();
        assert_eq!(state.phase(), Phase::Uninitialized);

        state.started = true;
        assert_eq!(state.phase(), Phase::Loading);
        assert_eq!(state.view(), BoardView::NoData { error: None });

        state.error = Some("offline".into());
        assert_eq!(state.phase(), Phase::Error);
        assert_eq!(
            state.view(),
            BoardView::NoData {
                error: Some("offline")
            }
        );

        state.error = None;
        state.loaded = true;
        state.snapshot.columns.push(Column::new("c1", "To Do", 1));
        assert_eq!(state.phase(), Phase::Ready);

        state.in_flight = 2;
        assert_eq!(state.phase(), Phase::Mutating);
    }

    #[test]
    fn test_loaded_without_init_is_ready() {
        let state = BoardState {
            loaded: true,
            ..BoardState::default()
        };
        assert_eq!(state.phase(), Phase::Ready);

        let failed = BoardState {
            error: Some("offline".into()),
            ..BoardState::default()
        };
        assert_eq!(failed.phase(), Phase::Error);
    }

    #[test]
    fn test_stale_view_keeps_snapshot() {
        let state = BoardState {
            snapshot: BoardSnapshot::new(vec![Column::new("c1", "To Do", 1)], vec![]),
            error: Some("timeout".into()),
            loaded: true,
            started: true,
            in_flight: 0,
        };
        match state.view() {
            BoardView::Stale { snapshot, error } => {
                assert_eq!(snapshot.columns.len(), 1);
                assert_eq!(error, "timeout");
            }
            other => panic!("unexpected view {other:?}"),
        }
    }
}

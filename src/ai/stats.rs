//! Counters from the most recent search decision.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// What one `MonteCarloPolicy` decision cost.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Root actions the search chose between.
    pub candidates: u32,

    /// Hidden-information worlds sampled, one per iteration.
    pub worlds_sampled: u32,

    /// Playouts that ran to the end of the match.
    pub finished_playouts: u32,

    /// Playouts stopped at the depth limit and scored by heuristic.
    pub truncated_playouts: u32,

    /// Actions in the longest playout.
    pub deepest_playout: u32,

    pub elapsed: Duration,
}

impl SearchStats {
    #[must_use]
    pub fn playouts(&self) -> u32 {
        self.finished_playouts + self.truncated_playouts
    }

    pub(crate) fn record_playout(&mut self, depth: u32, truncated: bool) {
        if truncated {
            self.truncated_playouts += 1;
        } else {
            self.finished_playouts += 1;
        }
        self.deepest_playout = self.deepest_playout.max(depth);
    }

    /// Playouts per second of wall time, 0 when nothing was timed.
    #[must_use]
    pub fn playout_rate(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs == 0.0 {
            0.0
        } else {
            f64::from(self.playouts()) / secs
        }
    }
}

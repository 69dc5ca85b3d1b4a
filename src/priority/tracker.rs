//! Priority passing between the players of a match.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::core::PlayerId;
use crate::error::{Result, RulesError};

/// What a pass led to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PassOutcome {
    /// Priority moved on to `next`.
    Passed { next: PlayerId },
    /// Every player still in the match passed in succession.
    AllPassed,
}

/// Who holds priority and how many players passed in a row.
///
/// Priority moves in seat order. Players who lost or left are skipped
/// and don't count toward "all passed".
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityTracker {
    players: Vec<PlayerId>,
    out: Vec<bool>,
    current: usize,
    consecutive_passes: usize,
}

impl PriorityTracker {
    /// Players in seat order. The first one starts with priority.
    pub fn new<I, P>(players: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PlayerId>,
    {
        let players: Vec<PlayerId> = players.into_iter().map(Into::into).collect();
        let out = vec![false; players.len()];
        Self {
            players,
            out,
            current: 0,
            consecutive_passes: 0,
        }
    }

    #[must_use]
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    /// The priority holder, or `None` if nobody can respond.
    #[must_use]
    pub fn priority_player(&self) -> Option<&PlayerId> {
        if self.active_count() == 0 {
            return None;
        }
        self.players.get(self.current)
    }

    #[must_use]
    pub fn consecutive_passes(&self) -> usize {
        self.consecutive_passes
    }

    /// Players who can still respond.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.out.iter().filter(|out| !**out).count()
    }

    fn index_of(&self, player: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p == player)
    }

    /// Give priority to `player` and clear the pass count.
    ///
    /// Returns false if the player is unknown or out of the match.
    pub fn set_priority(&mut self, player: &PlayerId) -> bool {
        match self.index_of(player) {
            Some(i) if !self.out[i] => {
                self.current = i;
                self.consecutive_passes = 0;
                true
            }
            _ => false,
        }
    }

    /// `player` passes priority.
    ///
    /// Fails with `NotPriorityPlayer` if they don't hold it.
    pub fn pass(&mut self, player: &PlayerId) -> Result<PassOutcome> {
        if self.priority_player() != Some(player) {
            return Err(RulesError::NotPriorityPlayer(player.clone()));
        }
        self.consecutive_passes += 1;
        if self.consecutive_passes >= self.active_count() {
            debug!(player = %player, "all players passed");
            return Ok(PassOutcome::AllPassed);
        }
        self.advance();
        let next = self.players[self.current].clone();
        debug!(player = %player, next = %next, "pass priority");
        Ok(PassOutcome::Passed { next })
    }

    /// Something happened (a spell was cast, an item resolved); passes
    /// so far no longer count.
    pub fn reset_passes(&mut self) {
        self.consecutive_passes = 0;
    }

    /// Take `player` out of priority rotation.
    pub fn mark_out(&mut self, player: &PlayerId) {
        let Some(i) = self.index_of(player) else {
            return;
        };
        self.out[i] = true;
        if i == self.current {
            self.advance();
        }
    }

    #[must_use]
    pub fn is_out(&self, player: &PlayerId) -> bool {
        self.index_of(player).is_some_and(|i| self.out[i])
    }

    fn advance(&mut self) {
        let n = self.players.len();
        for step in 1..=n {
            let i = (self.current + step) % n;
            if !self.out[i] {
                self.current = i;
                return;
            }
        }
    }
}

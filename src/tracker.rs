use chrono::Utc;
use log::{debug, info, warn};

use crate::aggregate::{self, SessionScore};
use crate::error::StoreError;
use crate::settings::SettingsStore;
use crate::store::SessionStore;
use crate::summary::SessionSummary;
use crate::throws::{empty_rounds, Outcome, Round, ROUNDS_PER_SESSION, THROWS_PER_ROUND};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// No live session
    Ready,
    /// Accepting throws
    InProgress,
    /// All forty bags thrown, waiting for save or discard
    Completed,
}

/// Position and outcome of a recorded throw, kept for undo
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThrowRecord {
    pub round: u8,
    pub throw_number: u8,
    pub outcome: Outcome,
}

/// What a tracker operation did
#[derive(Clone, Debug, PartialEq)]
pub enum TrackerEvent {
    Recorded(ThrowRecord),
    RoundComplete { round: u8, score: u32 },
    SessionComplete,
    Undone(ThrowRecord),
    Discarded,
    /// The operation had no valid target and changed nothing
    Ignored,
}

/// Owns the live practice session: rounds, cursor and undo history.
///
/// One tracker per practice attempt; all mutation goes through `&mut self`.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionTracker {
    rounds: Vec<Round>,
    current_round: u8,
    current_throw: u8,
    state: SessionState,
    history: Vec<ThrowRecord>,
    bag_type: String,
    throwing_style: Option<String>,
}

impl SessionTracker {
    /// Creates an idle tracker labelled with the configured defaults
    pub fn new(settings: &dyn SettingsStore) -> Self {
        let settings = settings.load();
        Self {
            rounds: empty_rounds(),
            current_round: 1,
            current_throw: 1,
            state: SessionState::Ready,
            history: Vec::new(),
            bag_type: settings.default_bag_type,
            throwing_style: settings.default_throwing_style,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    pub fn current_round(&self) -> u8 {
        self.current_round
    }

    pub fn current_throw(&self) -> u8 {
        self.current_throw
    }

    pub fn history(&self) -> &[ThrowRecord] {
        &self.history
    }

    pub fn bag_type(&self) -> &str {
        &self.bag_type
    }

    pub fn throwing_style(&self) -> Option<&str> {
        self.throwing_style.as_deref()
    }

    /// Labels used by [`SessionTracker::save`]
    pub fn set_labels(&mut self, bag_type: impl Into<String>, throwing_style: Option<String>) {
        self.bag_type = bag_type.into();
        self.throwing_style = throwing_style;
    }

    pub fn is_session_complete(&self) -> bool {
        self.current_round > ROUNDS_PER_SESSION
    }

    /// Live points per round over complete rounds
    pub fn current_ppr(&self) -> f64 {
        aggregate::points_per_round(&self.rounds)
    }

    pub fn score(&self) -> SessionScore {
        aggregate::aggregate(&self.rounds)
    }

    fn reset(&mut self) {
        self.rounds = empty_rounds();
        self.current_round = 1;
        self.current_throw = 1;
        self.history.clear();
    }

    /// Starts a fresh session, dropping any unsaved one
    pub fn setup_new_session(&mut self) -> SessionState {
        if !self.history.is_empty() {
            info!(
                "dropping unsaved session with {} throws",
                self.history.len()
            );
        }
        self.reset();
        self.state = SessionState::InProgress;
        self.state
    }

    pub fn record_throw(&mut self, outcome: Outcome) -> TrackerEvent {
        if self.state != SessionState::InProgress
            || self.current_round > ROUNDS_PER_SESSION
            || self.current_throw > THROWS_PER_ROUND
        {
            debug!("ignoring throw {outcome} in state {:?}", self.state);
            return TrackerEvent::Ignored;
        }

        let record = ThrowRecord {
            round: self.current_round,
            throw_number: self.current_throw,
            outcome,
        };
        let round = &mut self.rounds[(record.round - 1) as usize];
        if !round.push(outcome) {
            return TrackerEvent::Ignored;
        }
        self.history.push(record);
        debug!(
            "round {} throw {}: {outcome}",
            record.round, record.throw_number
        );

        if self.current_throw < THROWS_PER_ROUND {
            self.current_throw += 1;
            return TrackerEvent::Recorded(record);
        }

        self.current_throw = 1;
        self.current_round += 1;
        if self.current_round > ROUNDS_PER_SESSION {
            self.state = SessionState::Completed;
            info!("session complete at {:.2} ppr", self.current_ppr());
            TrackerEvent::SessionComplete
        } else {
            TrackerEvent::RoundComplete {
                round: record.round,
                score: self.rounds[(record.round - 1) as usize].score(),
            }
        }
    }

    /// Removes the most recent throw and rewinds the cursor to it
    pub fn undo_last_throw(&mut self) -> TrackerEvent {
        let Some(record) = self.history.pop() else {
            return TrackerEvent::Ignored;
        };

        self.rounds[(record.round - 1) as usize].pop();
        self.current_round = record.round;
        self.current_throw = record.throw_number;
        if self.state == SessionState::Completed {
            self.state = SessionState::InProgress;
        }
        debug!(
            "undid round {} throw {} ({})",
            record.round, record.throw_number, record.outcome
        );
        TrackerEvent::Undone(record)
    }

    /// Saves with the tracker's current labels
    pub fn save(&mut self, store: &dyn SessionStore) -> Result<Option<SessionSummary>, StoreError> {
        let bag_type = self.bag_type.clone();
        let throwing_style = self.throwing_style.clone();
        self.save_session(store, &bag_type, throwing_style.as_deref())
    }

    /// Persists the live session and returns to `Ready`.
    ///
    /// Returns `Ok(None)` when there is no live session. On error the live
    /// session is left untouched so the save can be retried.
    pub fn save_session(
        &mut self,
        store: &dyn SessionStore,
        bag_type: &str,
        throwing_style: Option<&str>,
    ) -> Result<Option<SessionSummary>, StoreError> {
        if self.state == SessionState::Ready {
            return Ok(None);
        }

        let summary = SessionSummary::from_score(
            &self.score(),
            bag_type,
            throwing_style.map(str::to_string),
            Utc::now(),
        );
        if let Err(e) = store.insert(&summary) {
            warn!("failed to save session: {e}");
            return Err(e);
        }

        self.reset();
        self.state = SessionState::Ready;
        Ok(Some(summary))
    }

    /// Abandons the live session without saving
    pub fn discard_session(&mut self) -> TrackerEvent {
        if self.state == SessionState::Ready {
            return TrackerEvent::Ignored;
        }
        info!("discarding session with {} throws", self.history.len());
        self.reset();
        self.state = SessionState::Ready;
        TrackerEvent::Discarded
    }
}

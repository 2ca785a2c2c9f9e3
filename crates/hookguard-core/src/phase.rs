//! TDD cycle automaton — a 4-state, 6-event transition table plus a small
//! context record. No I/O; the persisted phase is the caller's to load and
//! save.

use crate::types::TddPhase;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PhaseEvent
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PhaseEvent {
    TestWritten,
    TestPassed,
    RefactorDone,
    NewFeature,
    ForcePhase { phase: TddPhase },
    Reset,
}

// ---------------------------------------------------------------------------
// TddContext
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TddContext {
    pub phase: TddPhase,
    #[serde(default)]
    pub attempt_count: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub test_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impl_file: Option<String>,
}

impl TddContext {
    pub fn new(phase: TddPhase) -> Self {
        Self {
            phase,
            ..Default::default()
        }
    }

    /// Apply an event. Events invalid for the current phase are silent
    /// no-ops — malformed or out-of-order signals never raise. Returns the
    /// phase after the event.
    pub fn apply(&mut self, event: PhaseEvent) -> TddPhase {
        match event {
            PhaseEvent::TestWritten if self.phase == TddPhase::Blocked => {
                self.phase = TddPhase::Red;
            }
            PhaseEvent::TestPassed if self.phase == TddPhase::Red => {
                self.phase = TddPhase::Green;
            }
            PhaseEvent::RefactorDone if self.phase == TddPhase::Green => {
                self.phase = TddPhase::Complete;
            }
            PhaseEvent::NewFeature if self.phase == TddPhase::Complete => {
                self.phase = TddPhase::Blocked;
            }
            PhaseEvent::ForcePhase { phase } => {
                self.phase = phase;
            }
            PhaseEvent::Reset => {
                self.phase = TddPhase::Blocked;
                self.attempt_count = 0;
                self.last_error = None;
                self.test_file = None;
                self.impl_file = None;
            }
            // Explicit no-op default for everything else.
            _ => {}
        }
        self.phase
    }

    /// True iff `target` is the single canonical successor of the current
    /// phase on the normal cycle (complete wraps to blocked). Does not
    /// report `ForcePhase` reachability.
    pub fn can_transition_to(&self, target: TddPhase) -> bool {
        self.phase.next() == target
    }

    pub fn record_attempt(&mut self, error: Option<String>) {
        self.attempt_count += 1;
        self.last_error = error;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

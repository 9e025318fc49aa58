use log::debug;
use serde::{Deserialize, Serialize};

use crate::clock::ClockState;
use crate::cursor::{ResolvedCharacter, TapeCursor};
use crate::error::EngineError;

/// What to do when the input grows or shrinks by more than one character
/// in a single change event (paste, word deletion).
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    clap::ValueEnum,
    strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BulkInputPolicy {
    /// Fail with `UnsupportedBulkInput` and leave the cursor untouched
    #[default]
    Reject,
    /// Apply one advance or retreat per character
    Replay,
}

/// A single change applied to the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edit {
    Advanced(ResolvedCharacter),
    Retreated(ResolvedCharacter),
}

/// Turns successive full input strings into advance/retreat calls.
///
/// The previous input length is never stored: it always equals the
/// cursor index, since every accepted character moved the cursor by one.
#[derive(Debug, Clone, Copy, Default)]
pub struct InputReconciler {
    pub bulk_input: BulkInputPolicy,
    pub allow_post_expiry_correction: bool,
}

impl InputReconciler {
    pub fn new(bulk_input: BulkInputPolicy, allow_post_expiry_correction: bool) -> Self {
        Self {
            bulk_input,
            allow_post_expiry_correction,
        }
    }

    pub fn reconcile(
        &self,
        new_input: &str,
        cursor: &mut TapeCursor,
        clock: ClockState,
    ) -> Result<Vec<Edit>, EngineError> {
        let new_len = new_input.chars().count();
        let idx = cursor.current_index();
        let delta = new_len as isize - idx as isize;
        let expired = clock == ClockState::Expired;

        // a closed session swallows edits of any size
        if delta > 0 && (cursor.is_complete() || expired) {
            debug!("ignoring input past the end of the session");
            return Ok(vec![]);
        }
        if delta < 0 && expired && !self.allow_post_expiry_correction {
            debug!("ignoring backspace after expiry");
            return Ok(vec![]);
        }

        if delta.abs() > 1 && self.bulk_input == BulkInputPolicy::Reject {
            return Err(EngineError::UnsupportedBulkInput { delta });
        }

        let mut edits = Vec::new();

        if delta < 0 {
            for _ in 0..delta.unsigned_abs() {
                edits.push(Edit::Retreated(cursor.retreat()?));
            }
        } else if delta > 0 {
            for c in new_input.chars().skip(idx) {
                if cursor.is_complete() {
                    debug!("ignoring input past the end of the tape");
                    break;
                }
                edits.push(Edit::Advanced(cursor.advance(c)?));
            }
        }

        Ok(edits)
    }
}

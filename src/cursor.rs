use log::debug;

use crate::error::EngineError;
use crate::tape::CharacterTape;

#[derive(Clone, Debug, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Verdict {
    Correct,
    Wrong,
}

/// A tape character that has been typed, with the key that was pressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResolvedCharacter {
    pub index: usize,
    pub char: char,
    pub typed: char,
    pub verdict: Verdict,
}

/// Tracks typing progress over a tape as two stacks.
///
/// `pending` holds the untyped characters reversed, so the next expected
/// character is at the top. `resolved` holds typed characters in tape order,
/// with the most recent at the top. Reading `resolved` forwards followed by
/// `pending` backwards always reproduces the tape.
#[derive(Debug, Clone, Default)]
pub struct TapeCursor {
    pending: Vec<char>,
    resolved: Vec<ResolvedCharacter>,
}

impl TapeCursor {
    pub fn new(tape: &CharacterTape) -> Self {
        let mut cursor = Self::default();
        cursor.load(tape);
        cursor
    }

    /// Reset and put every tape character into `pending`.
    pub fn load(&mut self, tape: &CharacterTape) {
        self.resolved.clear();
        self.pending = tape.chars().iter().rev().copied().collect();
    }

    /// Append late passage content behind the last pending character.
    pub fn extend(&mut self, more: &[char]) {
        self.pending.splice(0..0, more.iter().rev().copied());
    }

    pub fn advance(&mut self, typed: char) -> Result<ResolvedCharacter, EngineError> {
        let expected = self.pending.pop().ok_or(EngineError::EmptyTape)?;
        let verdict = if typed == expected {
            Verdict::Correct
        } else {
            Verdict::Wrong
        };

        let resolved = ResolvedCharacter {
            index: self.resolved.len(),
            char: expected,
            typed,
            verdict,
        };
        self.resolved.push(resolved);
        debug!("advance {:?} at {} -> {}", typed, resolved.index, verdict);

        Ok(resolved)
    }

    pub fn retreat(&mut self) -> Result<ResolvedCharacter, EngineError> {
        let reverted = self.resolved.pop().ok_or(EngineError::EmptyHistory)?;
        self.pending.push(reverted.char);
        debug!("retreat from {}", reverted.index);

        Ok(reverted)
    }

    pub fn is_complete(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.resolved.len()
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn next_expected(&self) -> Option<char> {
        self.pending.last().copied()
    }

    /// Typed characters, oldest first.
    pub fn resolved(&self) -> &[ResolvedCharacter] {
        &self.resolved
    }

    /// Untyped characters in tape order.
    pub fn pending(&self) -> impl Iterator<Item = char> + '_ {
        self.pending.iter().rev().copied()
    }
}

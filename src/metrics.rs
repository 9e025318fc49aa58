use serde::{Deserialize, Serialize};

use crate::clock::SessionClock;
use crate::cursor::{TapeCursor, Verdict};
use crate::error::EngineError;

/// Summary of a finished session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionResult {
    pub word_count: usize,
    pub elapsed_seconds: u32,
    pub correct_chars: usize,
    pub wrong_chars: usize,
}

impl SessionResult {
    pub fn words_per_minute(&self) -> f64 {
        if self.elapsed_seconds == 0 {
            return 0.0;
        }
        (self.word_count as f64 * 60.0 / self.elapsed_seconds as f64).round()
    }

    /// Share of typed characters that matched, as a whole percentage.
    pub fn accuracy(&self) -> f64 {
        let typed = self.correct_chars + self.wrong_chars;
        if typed == 0 {
            return 0.0;
        }
        ((self.correct_chars as f64 / typed as f64) * 100.0).round()
    }
}

pub fn compute(cursor: &TapeCursor, clock: &SessionClock) -> Result<SessionResult, EngineError> {
    if !clock.is_expired() {
        return Err(EngineError::InvalidStateTransition {
            from: clock.state(),
            operation: "report results",
        });
    }

    let typed: String = cursor.resolved().iter().map(|r| r.char).collect();
    let correct_chars = cursor
        .resolved()
        .iter()
        .filter(|r| r.verdict == Verdict::Correct)
        .count();

    Ok(SessionResult {
        word_count: typed.split_whitespace().count(),
        elapsed_seconds: clock.elapsed(),
        correct_chars,
        wrong_chars: cursor.current_index() - correct_chars,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ClockState;
    use crate::tape::CharacterTape;
    use assert_matches::assert_matches;

    fn typed(passage: &str, input: &str) -> TapeCursor {
        let mut cursor = TapeCursor::new(&CharacterTape::new(passage));
        for c in input.chars() {
            cursor.advance(c).unwrap();
        }
        cursor
    }

    fn expired_after(secs: u32) -> SessionClock {
        let mut clock = SessionClock::new();
        clock.start(30).unwrap();
        for _ in 0..secs {
            clock.tick().unwrap();
        }
        if clock.is_running() {
            clock.force_expire().unwrap();
        }
        clock
    }

    #[test]
    fn test_two_words() {
        let cursor = typed("go go", "go go");

        let result = compute(&cursor, &expired_after(4)).unwrap();

        assert_eq!(result.word_count, 2);
        assert_eq!(result.elapsed_seconds, 4);
        assert_eq!(result.accuracy(), 100.0);
    }

    #[test]
    fn test_whitespace_is_collapsed() {
        let cursor = typed("  one   two\tthree  ", "  one   two\tthree  ");

        let result = compute(&cursor, &expired_after(30)).unwrap();

        assert_eq!(result.word_count, 3);
    }

    #[test]
    fn test_partial_word_counts() {
        let cursor = typed("quick brown fox", "quick br");

        let result = compute(&cursor, &expired_after(30)).unwrap();

        assert_eq!(result.word_count, 2);
        assert_eq!(result.words_per_minute(), 4.0);
    }

    #[test]
    fn test_words_use_tape_chars_not_typed_keys() {
        // a wrong key on a space still resolves the space
        let cursor = typed("go go", "goxgo");

        let result = compute(&cursor, &expired_after(30)).unwrap();

        assert_eq!(result.word_count, 2);
        assert_eq!(result.correct_chars, 4);
        assert_eq!(result.wrong_chars, 1);
        assert_eq!(result.accuracy(), 80.0);
    }

    #[test]
    fn test_nothing_typed() {
        let cursor = typed("go", "");

        let result = compute(&cursor, &expired_after(0)).unwrap();

        assert_eq!(result.word_count, 0);
        assert_eq!(result.words_per_minute(), 0.0);
        assert_eq!(result.accuracy(), 0.0);
    }

    #[test]
    fn test_compute_before_expiry_is_rejected() {
        let cursor = typed("go", "g");
        let mut clock = SessionClock::new();

        assert_matches!(
            compute(&cursor, &clock),
            Err(EngineError::InvalidStateTransition {
                from: ClockState::Idle,
                ..
            })
        );

        clock.start(30).unwrap();
        assert_matches!(
            compute(&cursor, &clock),
            Err(EngineError::InvalidStateTransition {
                from: ClockState::Running,
                ..
            })
        );
    }
}

use std::sync::{Arc, Mutex};

use log::{info, warn};

use crate::clock::{ClockState, SessionClock, DEFAULT_SESSION_SECS};
use crate::cursor::TapeCursor;
use crate::error::EngineError;
use crate::metrics::{self, SessionResult};
use crate::reconciler::{BulkInputPolicy, Edit, InputReconciler};
use crate::tape::CharacterTape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    pub session_secs: u32,
    pub allow_post_expiry_correction: bool,
    pub bulk_input: BulkInputPolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            session_secs: DEFAULT_SESSION_SECS,
            allow_post_expiry_correction: false,
            bulk_input: BulkInputPolicy::Reject,
        }
    }
}

/// Cursor and clock behind one lock, for drivers that feed input and ticks
/// from different threads.
pub type SharedSession = Arc<Mutex<Session>>;

/// One typing run over a passage.
///
/// Input changes and clock ticks must reach the session one at a time;
/// it is the only owner of the cursor and the clock.
#[derive(Debug)]
pub struct Session {
    config: SessionConfig,
    tape: CharacterTape,
    cursor: TapeCursor,
    clock: SessionClock,
    reconciler: InputReconciler,
    result: Option<SessionResult>,
}

impl Session {
    pub fn new(config: SessionConfig, passage: &str) -> Self {
        let tape = CharacterTape::new(passage);
        Self {
            cursor: TapeCursor::new(&tape),
            tape,
            clock: SessionClock::new(),
            reconciler: InputReconciler::new(
                config.bulk_input,
                config.allow_post_expiry_correction,
            ),
            config,
            result: None,
        }
    }

    pub fn into_shared(self) -> SharedSession {
        Arc::new(Mutex::new(self))
    }

    /// Throw away all progress and start over on a new passage.
    pub fn load_passage(&mut self, passage: &str) {
        *self = Self::new(self.config, passage);
    }

    /// Extend the tape with content that arrived after the session began.
    pub fn append_passage(&mut self, more: &str) -> Result<(), EngineError> {
        if self.is_finished() {
            warn!("dropping {} passage chars that arrived too late", more.chars().count());
            return Err(EngineError::PassageAfterFinish);
        }

        let appended = self.tape.extend(more);
        self.cursor.extend(appended);
        info!("passage extended to {} chars", self.tape.len());

        Ok(())
    }

    /// Feed the full current contents of the input surface.
    pub fn on_input(&mut self, input: &str) -> Result<Vec<Edit>, EngineError> {
        let edits = self
            .reconciler
            .reconcile(input, &mut self.cursor, self.clock.state())?;

        let typed = edits.iter().any(|e| matches!(e, Edit::Advanced(_)));
        if typed && !self.has_started() {
            self.clock.start(self.config.session_secs)?;
        }
        self.finish_if_done()?;

        Ok(edits)
    }

    /// Advance the clock by one second. Ticks outside a running session are
    /// dropped so the caller can tick unconditionally.
    pub fn on_tick(&mut self) -> Result<(), EngineError> {
        if !self.clock.is_running() {
            return Ok(());
        }

        self.clock.tick()?;
        self.finish_if_done()
    }

    fn finish_if_done(&mut self) -> Result<(), EngineError> {
        if self.clock.is_running() && self.cursor.is_complete() {
            self.clock.force_expire()?;
        }

        if self.clock.is_expired() && self.result.is_none() {
            let result = metrics::compute(&self.cursor, &self.clock)?;
            info!(
                "session finished: {} words in {}s ({} wpm, {}% acc)",
                result.word_count,
                result.elapsed_seconds,
                result.words_per_minute(),
                result.accuracy()
            );
            self.result = Some(result);
        }

        Ok(())
    }

    pub fn has_started(&self) -> bool {
        self.clock.state() != ClockState::Idle
    }

    pub fn is_finished(&self) -> bool {
        self.clock.is_expired()
    }

    /// Whether new characters would be accepted. Once this is false the
    /// input surface should be disabled.
    pub fn accepts_input(&self) -> bool {
        !self.is_finished() && !self.cursor.is_complete()
    }

    /// Whether a backspace would be applied.
    pub fn accepts_correction(&self) -> bool {
        self.cursor.current_index() > 0
            && (!self.is_finished() || self.config.allow_post_expiry_correction)
    }

    /// Tape position the caret should be drawn at.
    pub fn current_index(&self) -> usize {
        self.cursor.current_index()
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn tape(&self) -> &CharacterTape {
        &self.tape
    }

    pub fn cursor(&self) -> &TapeCursor {
        &self.cursor
    }

    pub fn clock(&self) -> &SessionClock {
        &self.clock
    }

    pub fn result(&self) -> Option<&SessionResult> {
        self.result.as_ref()
    }
}

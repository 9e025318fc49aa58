use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use log::{info, warn};

use crate::error::EngineError;
use crate::history::{HistoryRecord, ResultsLog};
use crate::passage::{PassageSource, StaticPassage, DEFAULT_PASSAGE};
pub use crate::runtime::Control;
use crate::session::{Session, SessionConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppState {
    Typing,
    Results,
}

/// Terminal front-end state around a typing session.
///
/// Keeps the text typed so far and hands the whole string to the session
/// on every change, the way a text field would.
#[derive(Debug)]
pub struct App {
    pub session: Session,
    pub input: String,
    pub state: AppState,
    results_log: Option<ResultsLog>,
    passage_source: Box<dyn PassageSource>,
}

impl App {
    pub fn new(config: SessionConfig, passage: &str) -> Self {
        Self {
            session: Session::new(config, passage),
            input: String::new(),
            state: AppState::Typing,
            results_log: None,
            passage_source: Box::new(StaticPassage(DEFAULT_PASSAGE.to_string())),
        }
    }

    pub fn with_results_log(mut self, log: ResultsLog) -> Self {
        self.results_log = Some(log);
        self
    }

    /// Where `(n)ew` takes its passage from.
    pub fn with_passage_source<S: PassageSource>(mut self, source: S) -> Self {
        self.passage_source = Box::new(source);
        self
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Result<Control, EngineError> {
        match key.code {
            KeyCode::Esc => return Ok(Control::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(Control::Quit)
            }
            KeyCode::Backspace => self.backspace()?,
            KeyCode::Char(c) => match self.state {
                AppState::Typing => {
                    if self.type_char(c)? {
                        return Ok(Control::Started);
                    }
                }
                AppState::Results if c == 'r' => {
                    self.restart();
                    return Ok(Control::Restarted);
                }
                AppState::Results if c == 'n' => {
                    self.new_passage();
                    return Ok(Control::Restarted);
                }
                AppState::Results => {}
            },
            _ => {}
        }

        Ok(Control::Continue)
    }

    pub fn on_tick(&mut self) -> Result<(), EngineError> {
        self.session.on_tick()?;
        self.check_finished();
        Ok(())
    }

    /// Content from the passage source arrived.
    pub fn on_passage(&mut self, text: &str) -> Result<(), EngineError> {
        match self.session.append_passage(text) {
            Err(EngineError::PassageAfterFinish) => {
                warn!("passage arrived after the session ended, ignoring it");
                Ok(())
            }
            other => other,
        }
    }

    /// Type each character of `text` as a separate keystroke.
    pub fn type_str(&mut self, text: &str) -> Result<(), EngineError> {
        text.chars().try_for_each(|c| self.type_char(c).map(|_| ()))
    }

    /// Returns true when this keystroke started the clock.
    fn type_char(&mut self, c: char) -> Result<bool, EngineError> {
        if !self.session.accepts_input() {
            return Ok(false);
        }
        let was_started = self.session.has_started();
        self.input.push(c);
        self.session.on_input(&self.input)?;
        self.check_finished();
        Ok(!was_started && self.session.has_started())
    }

    fn backspace(&mut self) -> Result<(), EngineError> {
        if !self.session.accepts_correction() {
            return Ok(());
        }
        self.input.pop();
        self.session.on_input(&self.input)?;
        Ok(())
    }

    /// Start again on the same passage.
    pub fn restart(&mut self) {
        let passage = self.session.tape().to_string();
        self.begin(&passage);
        info!("restarted session");
    }

    /// Start again on a freshly fetched passage. A failing source falls back
    /// to the built-in passage.
    pub fn new_passage(&mut self) {
        let passage = self.passage_source.fetch().unwrap_or_else(|e| {
            warn!("{}, using the default passage", e);
            DEFAULT_PASSAGE.to_string()
        });
        self.begin(&passage);
        info!("new session on a {} char passage", passage.chars().count());
    }

    fn begin(&mut self, passage: &str) {
        self.session.load_passage(passage);
        self.input.clear();
        self.state = AppState::Typing;
    }

    fn check_finished(&mut self) {
        if self.state != AppState::Typing || !self.session.is_finished() {
            return;
        }
        self.state = AppState::Results;

        if let (Some(log), Some(result)) = (&self.results_log, self.session.result()) {
            let record = HistoryRecord::new(result, self.session.config().session_secs);
            if let Err(e) = log.append(&record) {
                warn!("could not save results: {}", e);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passage::FilePassage;
    use std::fs;
    use tempfile::tempdir;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_app_state_variants() {
        assert_ne!(AppState::Typing, AppState::Results);
    }

    #[test]
    fn test_typing_mirrors_input() {
        let mut app = App::new(SessionConfig::default(), "hello");

        app.handle_key(key(KeyCode::Char('h'))).unwrap();
        app.handle_key(key(KeyCode::Char('x'))).unwrap();
        app.handle_key(key(KeyCode::Backspace)).unwrap();

        assert_eq!(app.input, "h");
        assert_eq!(app.session.current_index(), 1);
    }

    #[test]
    fn test_backspace_at_start_is_ignored() {
        let mut app = App::new(SessionConfig::default(), "hello");

        assert_eq!(app.handle_key(key(KeyCode::Backspace)).unwrap(), Control::Continue);
        assert_eq!(app.session.current_index(), 0);
    }

    #[test]
    fn test_escape_and_ctrl_c_quit() {
        let mut app = App::new(SessionConfig::default(), "hello");

        assert_eq!(app.handle_key(key(KeyCode::Esc)).unwrap(), Control::Quit);
        assert_eq!(
            app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL))
                .unwrap(),
            Control::Quit
        );
        assert_eq!(app.session.current_index(), 0);
    }

    #[test]
    fn test_finishing_moves_to_results() {
        let mut app = App::new(SessionConfig::default(), "hi");

        app.type_str("hi").unwrap();

        assert_eq!(app.state, AppState::Results);
        assert!(app.session.result().is_some());

        // extra keys after the end do not grow the input
        app.handle_key(key(KeyCode::Char('x'))).unwrap();
        assert_eq!(app.input, "hi");
    }

    #[test]
    fn test_retry_restarts_same_passage() {
        let mut app = App::new(SessionConfig::default(), "hi");
        app.type_str("hi").unwrap();

        let control = app.handle_key(key(KeyCode::Char('r'))).unwrap();

        assert_eq!(control, Control::Restarted);
        assert_eq!(app.state, AppState::Typing);
        assert!(app.input.is_empty());
        assert!(!app.session.has_started());
        assert_eq!(app.session.tape().to_string(), "hi");
    }

    #[test]
    fn test_first_keystroke_reports_start() {
        let mut app = App::new(SessionConfig::default(), "hello");

        assert_eq!(app.handle_key(key(KeyCode::Char('h'))).unwrap(), Control::Started);
        assert_eq!(app.handle_key(key(KeyCode::Char('e'))).unwrap(), Control::Continue);
    }

    #[test]
    fn test_new_loads_from_passage_source() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("passage.txt");
        fs::write(&path, "fresh\ntext\n").unwrap();
        let mut app =
            App::new(SessionConfig::default(), "hi").with_passage_source(FilePassage::new(&path));
        app.type_str("hi").unwrap();

        let control = app.handle_key(key(KeyCode::Char('n'))).unwrap();

        assert_eq!(control, Control::Restarted);
        assert_eq!(app.state, AppState::Typing);
        assert!(app.input.is_empty());
        assert!(!app.session.has_started());
        assert_eq!(app.session.tape().to_string(), "fresh text");
    }

    #[test]
    fn test_new_falls_back_to_default_passage() {
        let dir = tempdir().unwrap();
        let mut app = App::new(SessionConfig::default(), "hi")
            .with_passage_source(FilePassage::new(dir.path().join("missing.txt")));
        app.type_str("hi").unwrap();

        app.handle_key(key(KeyCode::Char('n'))).unwrap();

        assert_eq!(app.session.tape().to_string(), DEFAULT_PASSAGE);
    }

    #[test]
    fn test_new_is_ignored_while_typing() {
        let mut app = App::new(SessionConfig::default(), "nap");

        app.handle_key(key(KeyCode::Char('n'))).unwrap();

        assert_eq!(app.session.tape().to_string(), "nap");
        assert_eq!(app.input, "n");
    }

    #[test]
    fn test_timeout_moves_to_results() {
        let config = SessionConfig {
            session_secs: 2,
            ..SessionConfig::default()
        };
        let mut app = App::new(config, "hello");
        app.type_str("he").unwrap();

        app.on_tick().unwrap();
        assert_eq!(app.state, AppState::Typing);
        app.on_tick().unwrap();

        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.session.result().unwrap().elapsed_seconds, 2);
    }

    #[test]
    fn test_late_passage_after_finish_is_ignored() {
        let mut app = App::new(SessionConfig::default(), "a");
        app.type_str("a").unwrap();

        app.on_passage(" more").unwrap();

        assert_eq!(app.session.tape().len(), 1);
    }

    #[test]
    fn test_finished_session_is_logged() {
        let dir = tempdir().unwrap();
        let log = ResultsLog::new(dir.path().join("history.csv"));
        let mut app = App::new(SessionConfig::default(), "go go").with_results_log(log.clone());

        app.type_str("go go").unwrap();

        let records = log.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].words, 2);
    }
}

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::quote::{Quote, QuoteError};
use crate::runtime::{AppEvent, QuoteFetcher};
use crate::session::TypingSession;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum AppState {
    /// waiting for the first quote
    Loading,
    Typing,
    Results,
    /// the first quote could not be fetched
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Quit,
}

/// Host of the typing session: owns the round, the fetch bookkeeping and input editing
#[derive(Debug)]
pub struct App {
    pub session: Option<TypingSession>,
    pub author: Option<String>,
    pub state: AppState,
    /// last fetch failure, shown until the next successful fetch
    pub last_error: Option<String>,
    /// first visible line of the wrapped quote
    pub scroll_offset: usize,
    fetcher: QuoteFetcher,
    pending_request: Option<u64>,
    next_request_id: u64,
}

impl App {
    pub fn new(fetcher: QuoteFetcher) -> Self {
        Self {
            session: None,
            author: None,
            state: AppState::Loading,
            last_error: None,
            scroll_offset: 0,
            fetcher,
            pending_request: None,
            next_request_id: 0,
        }
    }

    pub fn is_fetching(&self) -> bool {
        self.pending_request.is_some()
    }

    /// Ask for a new quote. Returns false when a request is already in flight.
    pub fn request_quote(&mut self) -> bool {
        if let Some(pending) = self.pending_request {
            tracing::debug!(pending, "quote request ignored, one already in flight");
            return false;
        }

        self.next_request_id += 1;
        let request_id = self.next_request_id;
        self.pending_request = Some(request_id);
        if self.state == AppState::Failed {
            self.state = AppState::Loading;
        }
        self.fetcher.fetch(request_id);
        true
    }

    pub fn on_quote(&mut self, request_id: u64, result: Result<Quote, QuoteError>) {
        if self.pending_request != Some(request_id) {
            tracing::debug!(request_id, pending = ?self.pending_request, "discarding stale quote result");
            return;
        }
        self.pending_request = None;

        match result {
            Ok(quote) => {
                tracing::info!(
                    request_id,
                    chars = quote.content.chars().count(),
                    author = quote.author.as_deref().unwrap_or(""),
                    "new round"
                );
                self.start_round(quote);
            }
            Err(e) => {
                tracing::warn!(request_id, state = %self.state, error = %e, "quote fetch failed");
                self.last_error = Some(e.to_string());
                if self.session.is_none() {
                    self.state = AppState::Failed;
                }
            }
        }
    }

    fn start_round(&mut self, quote: Quote) {
        match self.session.as_mut() {
            Some(session) => session.reset(quote.content),
            None => self.session = Some(TypingSession::new(quote.content)),
        }
        self.author = quote.author;
        self.last_error = None;
        self.scroll_offset = 0;
        self.state = AppState::Typing;
    }

    /// Pass the full edited value to the session, unless the round is over
    pub fn set_input(&mut self, value: &str) {
        if self.state != AppState::Typing {
            return;
        }
        let Some(session) = self.session.as_mut() else {
            return;
        };
        if session.is_completed() {
            return;
        }

        session.on_input(value);
        if session.is_completed() {
            self.state = AppState::Results;
            // a skip still in flight must not replace the results
            if let Some(pending) = self.pending_request.take() {
                tracing::debug!(pending, "round finished, abandoning quote request");
            }
        }
    }

    fn edit_input(&mut self, edit: impl FnOnce(&mut String)) {
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let mut value = session.input().to_string();
        edit(&mut value);
        self.set_input(&value);
    }

    pub fn handle_event(&mut self, event: AppEvent) -> Control {
        match event {
            AppEvent::Key(key) => return self.on_key(key),
            AppEvent::Paste(text) => self.on_paste(&text),
            AppEvent::Quote { request_id, result } => self.on_quote(request_id, result),
            AppEvent::Resize | AppEvent::Tick => {}
        }
        Control::Continue
    }

    pub fn on_paste(&mut self, text: &str) {
        // single line quotes, so line breaks in the clipboard are dropped
        let text: String = text.chars().filter(|c| *c != '\n' && *c != '\r').collect();
        if text.is_empty() {
            return;
        }
        self.edit_input(|value| value.push_str(&text));
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Control {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return Control::Quit,
            KeyCode::Char('c') if ctrl => return Control::Quit,
            KeyCode::Char('r') if ctrl => {
                self.request_quote();
            }
            KeyCode::Char('u') if ctrl => self.edit_input(String::clear),
            _ => match self.state {
                AppState::Typing => match key.code {
                    KeyCode::Backspace => self.edit_input(|value| {
                        value.pop();
                    }),
                    KeyCode::Char(c) if !ctrl => self.edit_input(|value| value.push(c)),
                    _ => {}
                },
                AppState::Results => {
                    if let KeyCode::Char('r') | KeyCode::Char('n') | KeyCode::Enter = key.code {
                        self.request_quote();
                    }
                }
                AppState::Failed => {
                    if let KeyCode::Char('r') | KeyCode::Enter = key.code {
                        self.request_quote();
                    }
                }
                AppState::Loading => {}
            },
        }

        Control::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quote::{FixedQuoteProvider, QuoteRequest};
    use crate::session::CharStatus;
    use std::sync::{mpsc, Arc};

    fn app_with(text: &str) -> (App, mpsc::Receiver<AppEvent>) {
        let (tx, rx) = mpsc::channel();
        let fetcher = QuoteFetcher::new(
            Arc::new(FixedQuoteProvider::new(Quote::new(text, Some("Tester".into())))),
            QuoteRequest::default(),
            tx,
        );
        (App::new(fetcher), rx)
    }

    fn typing_app(text: &str) -> App {
        let (mut app, _rx) = app_with(text);
        assert!(app.request_quote());
        app.on_quote(1, Ok(Quote::new(text, Some("Tester".into()))));
        app
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.on_key(key(c));
        }
    }

    #[test]
    fn test_app_starts_loading() {
        let (app, _rx) = app_with("hi");
        assert_eq!(app.state, AppState::Loading);
        assert!(app.session.is_none());
        assert!(!app.is_fetching());
    }

    #[test]
    fn test_request_quote_posts_result() {
        let (mut app, rx) = app_with("hello");

        assert!(app.request_quote());
        assert!(app.is_fetching());

        match rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap() {
            AppEvent::Quote { request_id, result } => {
                assert_eq!(request_id, 1);
                app.on_quote(request_id, result);
            }
            other => panic!("unexpected event {other:?}"),
        }

        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.session.as_ref().unwrap().target(), "hello");
        assert_eq!(app.author.as_deref(), Some("Tester"));
        assert!(!app.is_fetching());
    }

    #[test]
    fn test_double_fetch_is_guarded() {
        let (mut app, _rx) = app_with("hello");

        assert!(app.request_quote());
        assert!(!app.request_quote());
    }

    #[test]
    fn test_stale_result_is_discarded() {
        let mut app = typing_app("first");
        type_str(&mut app, "fi");

        app.on_quote(99, Ok(Quote::new("stale", None)));

        let session = app.session.as_ref().unwrap();
        assert_eq!(session.target(), "first");
        assert_eq!(session.input(), "fi");
    }

    #[test]
    fn test_failure_without_round_shows_failed() {
        let (mut app, _rx) = app_with("hello");
        app.request_quote();

        app.on_quote(1, Err(QuoteError::MissingContent));

        assert_eq!(app.state, AppState::Failed);
        assert!(app.session.is_none());
        assert_eq!(
            app.last_error.as_deref(),
            Some("quote response has no content")
        );
    }

    #[test]
    fn test_failure_after_round_keeps_session() {
        let mut app = typing_app("hi");
        type_str(&mut app, "hi");
        assert_eq!(app.state, AppState::Results);
        let wpm = app.session.as_ref().unwrap().words_per_minute();

        app.on_key(key('r'));
        app.on_quote(2, Err(QuoteError::Status(503)));

        assert_eq!(app.state, AppState::Results);
        let session = app.session.as_ref().unwrap();
        assert!(session.is_completed());
        assert_eq!(session.target(), "hi");
        assert_eq!(session.words_per_minute(), wpm);
        assert!(app.last_error.is_some());
    }

    #[test]
    fn test_skip_landing_after_completion_keeps_results() {
        let mut app = typing_app("hi");

        app.on_key(ctrl('r'));
        assert!(app.is_fetching());
        type_str(&mut app, "hi");
        assert_eq!(app.state, AppState::Results);
        assert!(!app.is_fetching());

        app.on_quote(2, Ok(Quote::new("skipped", None)));

        assert_eq!(app.state, AppState::Results);
        assert_eq!(app.session.as_ref().unwrap().target(), "hi");

        // retry from the results screen still starts the next round
        app.on_key(key('r'));
        app.on_quote(3, Ok(Quote::new("next", None)));
        assert_eq!(app.state, AppState::Typing);
        assert_eq!(app.session.as_ref().unwrap().target(), "next");
    }

    #[test]
    fn test_retry_from_failed_screen() {
        let (mut app, _rx) = app_with("hello");
        app.request_quote();
        app.on_quote(1, Err(QuoteError::MissingContent));

        app.on_key(key('r'));

        assert_eq!(app.state, AppState::Loading);
        assert!(app.is_fetching());
    }

    #[test]
    fn test_typing_completes_round() {
        let mut app = typing_app("hi");

        app.on_key(key('h'));
        assert_eq!(app.state, AppState::Typing);
        assert!(app.session.as_ref().unwrap().has_started());

        app.on_key(key('i'));
        assert_eq!(app.state, AppState::Results);
        assert!(app.session.as_ref().unwrap().is_completed());
    }

    #[test]
    fn test_input_refused_after_completion() {
        let mut app = typing_app("hi");
        type_str(&mut app, "hi");

        app.on_key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
        app.on_paste("more");
        app.set_input("h");

        assert_eq!(app.session.as_ref().unwrap().input(), "hi");
    }

    #[test]
    fn test_backspace_and_clear() {
        let mut app = typing_app("hello");
        type_str(&mut app, "hex");

        app.on_key(KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE));
        assert_eq!(app.session.as_ref().unwrap().input(), "he");

        app.on_key(ctrl('u'));
        assert_eq!(app.session.as_ref().unwrap().input(), "");
    }

    #[test]
    fn test_paste_as_first_input_keeps_timer_stopped() {
        let mut app = typing_app("cat");

        app.on_paste("ab");

        let session = app.session.as_ref().unwrap();
        assert_eq!(session.input(), "ab");
        assert!(!session.has_started());
    }

    #[test]
    fn test_paste_strips_newlines() {
        let mut app = typing_app("a b");
        app.on_key(key('a'));

        app.on_paste(" b\n");

        assert_eq!(app.state, AppState::Results);
    }

    #[test]
    fn test_mistyped_chars_show_as_mismatch() {
        let mut app = typing_app("abc");
        type_str(&mut app, "abx");

        let projection = app.session.as_ref().unwrap().derive_per_character_status();
        assert_eq!(projection.chars[2].status, CharStatus::Mismatch);
        assert_eq!(app.state, AppState::Typing);
    }

    #[test]
    fn test_retry_from_results_starts_new_round() {
        let mut app = typing_app("hi");
        type_str(&mut app, "hi");

        app.on_key(key('n'));
        assert!(app.is_fetching());
        app.on_quote(2, Ok(Quote::new("next one", None)));

        let session = app.session.as_ref().unwrap();
        assert_eq!(app.state, AppState::Typing);
        assert_eq!(session.target(), "next one");
        assert_eq!(session.input(), "");
        assert!(!session.is_completed());
        assert_eq!(app.author, None);
    }

    #[test]
    fn test_r_while_typing_is_input() {
        let mut app = typing_app("run");

        app.on_key(key('r'));

        assert!(!app.is_fetching());
        assert_eq!(app.session.as_ref().unwrap().input(), "r");
    }

    #[test]
    fn test_ctrl_r_skips_quote_while_typing() {
        let mut app = typing_app("run");
        app.on_key(key('r'));

        app.on_key(ctrl('r'));
        assert!(app.is_fetching());
        app.on_quote(2, Ok(Quote::new("walk", None)));

        assert_eq!(app.session.as_ref().unwrap().target(), "walk");
        assert_eq!(app.session.as_ref().unwrap().input(), "");
    }

    #[test]
    fn test_quit_keys() {
        let mut app = typing_app("hi");
        assert_eq!(
            app.on_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)),
            Control::Quit
        );
        assert_eq!(app.on_key(ctrl('c')), Control::Quit);
        assert_eq!(app.on_key(key('c')), Control::Continue);
    }

    #[test]
    fn test_handle_event_dispatch() {
        let mut app = typing_app("hi");

        assert_eq!(app.handle_event(AppEvent::Tick), Control::Continue);
        assert_eq!(app.handle_event(AppEvent::Resize), Control::Continue);
        assert_eq!(app.handle_event(AppEvent::Key(key('h'))), Control::Continue);
        assert_eq!(
            app.handle_event(AppEvent::Paste("i".into())),
            Control::Continue
        );
        assert_eq!(app.state, AppState::Results);
    }

    #[test]
    fn test_keys_ignored_while_loading() {
        let (mut app, _rx) = app_with("hi");
        app.request_quote();

        app.on_key(key('h'));

        assert!(app.session.is_none());
        assert_eq!(app.state, AppState::Loading);
    }
}

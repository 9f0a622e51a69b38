use ratatui::Frame;

use crate::{
    app::{App, AppState},
    ui::{render_failed, render_loading, render_results, render_typing},
};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &mut App, f: &mut Frame);
}

/// Waiting for the first quote
pub struct LoadingScreen;

impl Screen for LoadingScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_loading(app, f);
    }
}

/// Quote with live per-character colouring
pub struct TypingScreen;

impl Screen for TypingScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_typing(app, f);
    }
}

/// Completed quote plus the round results
pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_results(app, f);
    }
}

/// First fetch failed and there is nothing to type yet
pub struct FailedScreen;

impl Screen for FailedScreen {
    fn render(&self, app: &mut App, f: &mut Frame) {
        render_failed(app, f);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Loading => Box::new(LoadingScreen),
        AppState::Typing => Box::new(TypingScreen),
        AppState::Results => Box::new(ResultsScreen),
        AppState::Failed => Box::new(FailedScreen),
    }
}

use ratatui::Frame;

use crate::{ui::analytics::AnalyticsView, App, AppState};

/// A UI Screen boundary: responsible for rendering one app state
pub trait Screen {
    fn render(&self, app: &App, f: &mut Frame);
}

/// Typing screen - prompt, live errors and progress
pub struct TypingScreen;

impl Screen for TypingScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Results screen - speed chart, summary and error frequencies
pub struct ResultsScreen;

impl Screen for ResultsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(app, f.area());
    }
}

/// Keyboard heatmap and word frequencies
pub struct AnalyticsScreen;

impl Screen for AnalyticsScreen {
    fn render(&self, app: &App, f: &mut Frame) {
        f.render_widget(AnalyticsView::new(app), f.area());
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: AppState) -> Box<dyn Screen> {
    match state {
        AppState::Typing => Box::new(TypingScreen),
        AppState::Results => Box::new(ResultsScreen),
        AppState::Analytics => Box::new(AnalyticsScreen),
    }
}

use crate::app::MenuItem;
use crate::state::predictions::PredictionSession;
use crate::state::quiz::QuizSession;
use crate::state::storage::KeyValueStore;
use torikumi_api::{QuizIndex, TorikumiData, TorikumiIndex};

pub type BoxedStore = Box<dyn KeyValueStore + Send>;

// ---------------------------------------------------------------------------
// Torikumi (match list) state
// ---------------------------------------------------------------------------

/// Lifecycle of the first match-list fetch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum LoadState {
    #[default]
    Loading,
    Ready,
    /// The initial fetch failed; nothing usable to show.
    Failed(String),
}

#[derive(Debug, Default)]
pub struct TorikumiState {
    pub index: Option<TorikumiIndex>,
    pub data: Option<TorikumiData>,
    pub selected_match: usize,
}

impl TorikumiState {
    pub fn match_count(&self) -> usize {
        self.data.as_ref().map(|d| d.matches.len()).unwrap_or(0)
    }

    pub fn select_down(&mut self) {
        let max = self.match_count().saturating_sub(1);
        if self.selected_match < max {
            self.selected_match += 1;
        }
    }

    pub fn select_up(&mut self) {
        self.selected_match = self.selected_match.saturating_sub(1);
    }

    /// Last day that can be browsed for the basho on screen.
    pub fn last_day(&self) -> u8 {
        let Some(data) = &self.data else {
            return 15;
        };
        let days = self
            .index
            .as_ref()
            .map(|i| i.days_for(&data.basho.id))
            .unwrap_or(15);
        days.clamp(1, 15) as u8
    }
}

// ---------------------------------------------------------------------------
// Preview (generated text) state
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentField {
    Header,
    Footer,
}

#[derive(Debug, Default)]
pub struct PreviewState {
    pub header_comment: String,
    pub footer_comment: String,
    pub editing: Option<CommentField>,
    pub scroll_offset: u16,
}

impl PreviewState {
    pub fn field_mut(&mut self, field: CommentField) -> &mut String {
        match field {
            CommentField::Header => &mut self.header_comment,
            CommentField::Footer => &mut self.footer_comment,
        }
    }
}

// ---------------------------------------------------------------------------
// Quiz state
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct QuizState {
    pub session: QuizSession,
    pub index: Option<QuizIndex>,
    pub available: bool,
    pub loading: bool,
    pub selected_match: usize,
}

impl Default for QuizState {
    fn default() -> Self {
        Self {
            session: QuizSession::default(),
            index: None,
            available: true,
            loading: false,
            selected_match: 0,
        }
    }
}

// ---------------------------------------------------------------------------
// Root app state
// ---------------------------------------------------------------------------

pub struct AppState {
    pub active_tab: MenuItem,
    pub previous_tab: MenuItem,
    pub show_logs: bool,
    pub load: LoadState,
    /// Last non-fatal problem, shown in the status line.
    pub last_error: Option<String>,
    pub torikumi: TorikumiState,
    pub predictions: PredictionSession<BoxedStore>,
    pub preview: PreviewState,
    pub quiz: QuizState,
}

impl AppState {
    pub fn new(store: BoxedStore) -> Self {
        Self {
            active_tab: MenuItem::default(),
            previous_tab: MenuItem::default(),
            show_logs: false,
            load: LoadState::default(),
            last_error: None,
            torikumi: TorikumiState::default(),
            predictions: PredictionSession::new(store),
            preview: PreviewState::default(),
            quiz: QuizState::default(),
        }
    }
}

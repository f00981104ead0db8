use crate::state::app_settings::AppSettings;
use crate::state::app_state::{AppState, BoxedStore, CommentField, LoadState};
use crate::state::messages::NetworkRequest;
use crate::state::predictions::PredictionKey;
use crate::state::quiz::{QuizPhase, pick_basho};
use crate::state::storage::{FileStore, MemoryStore, can_persist_to};
use log::{info, warn};
use torikumi_api::format::PredictionText;
use torikumi_api::{QuizBashoData, QuizIndex, Side, TorikumiData, TorikumiIndex};

#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum MenuItem {
    #[default]
    Predict,
    Preview,
    Quiz,
    Help,
}

pub struct App {
    pub settings: AppSettings,
    pub state: AppState,
}

impl App {
    pub fn new() -> Self {
        let settings = AppSettings::load();
        let store: BoxedStore = if can_persist_to(&settings.store_path) {
            let store = FileStore::open(&settings.store_path);
            info!("predictions stored in {}", store.path().display());
            Box::new(store)
        } else {
            warn!("cannot write {}, predictions kept in memory", settings.store_path.display());
            Box::new(MemoryStore::new())
        };

        let app = Self::with_store(settings, store);

        if let Some(level) = app.settings.log_level {
            log::set_max_level(level);
            tui_logger::set_default_level(level);
        }

        app
    }

    pub fn with_store(settings: AppSettings, store: BoxedStore) -> Self {
        let mut state = AppState::new(store);
        state.preview.header_comment = settings.header_comment.clone();
        state.preview.footer_comment = settings.footer_comment.clone();
        Self { settings, state }
    }

    // -----------------------------------------------------------------------
    // Network response handlers, called from main_ui_loop
    // -----------------------------------------------------------------------

    pub fn on_index_loaded(&mut self, index: TorikumiIndex) {
        if index.is_off_season() {
            info!("torikumi index reports off-season");
        }
        self.state.torikumi.index = Some(index);
    }

    /// A day's match list arrived. The prediction mapping is swapped for the
    /// one stored under the new (basho, day, division) in the same step.
    pub fn on_day_loaded(&mut self, data: TorikumiData) {
        self.state.load = LoadState::Ready;
        self.state.last_error = None;
        self.state.predictions.select(PredictionKey::for_day(&data));
        self.state.torikumi.data = Some(data);
        self.state.torikumi.selected_match = 0;
        self.state.preview.scroll_offset = 0;
    }

    /// A fetch failed. Only a failed first load is fatal; anything later
    /// leaves the current view untouched.
    pub fn on_fetch_failed(&mut self, request: NetworkRequest, message: String) {
        match request {
            NetworkRequest::LoadLatest if self.state.torikumi.data.is_none() => {
                self.state.load = LoadState::Failed(message);
            }
            NetworkRequest::LoadIndex => {
                warn!("torikumi index unavailable, basho switching disabled: {message}");
            }
            NetworkRequest::LoadLatest | NetworkRequest::LoadDay { .. } => {
                warn!("keeping current day: {message}");
                self.state.last_error = Some(message);
            }
            NetworkRequest::LoadQuizIndex | NetworkRequest::LoadQuizBasho { .. } => {
                warn!("quiz data unavailable: {message}");
                self.state.quiz.available = false;
                self.state.quiz.loading = false;
                self.state.last_error = Some(message);
            }
        }
    }

    // -----------------------------------------------------------------------
    // Tab management
    // -----------------------------------------------------------------------

    /// Switch tabs. Entering an idle quiz tab returns the request that starts a round.
    pub fn update_tab(&mut self, next: MenuItem) -> Option<NetworkRequest> {
        if self.state.active_tab == next {
            return None;
        }
        self.state.previous_tab = self.state.active_tab;
        self.state.active_tab = next;
        if next == MenuItem::Quiz && self.state.quiz.session.phase == QuizPhase::Idle {
            return self.start_quiz();
        }
        None
    }

    pub fn exit_help(&mut self) {
        if self.state.active_tab == MenuItem::Help {
            self.state.active_tab = self.state.previous_tab;
        }
    }

    pub fn toggle_show_logs(&mut self) {
        self.state.show_logs = !self.state.show_logs;
    }

    pub fn toggle_full_screen(&mut self) {
        self.settings.full_screen = !self.settings.full_screen;
    }

    // -----------------------------------------------------------------------
    // Day / basho navigation
    // -----------------------------------------------------------------------

    pub fn next_day(&self) -> Option<NetworkRequest> {
        let data = self.state.torikumi.data.as_ref()?;
        (data.day < self.state.torikumi.last_day()).then(|| NetworkRequest::LoadDay {
            basho_id: data.basho.id.clone(),
            day: data.day + 1,
        })
    }

    pub fn prev_day(&self) -> Option<NetworkRequest> {
        let data = self.state.torikumi.data.as_ref()?;
        (data.day > 1).then(|| NetworkRequest::LoadDay {
            basho_id: data.basho.id.clone(),
            day: data.day - 1,
        })
    }

    /// Request the next basho in the index, keeping the day where possible.
    pub fn cycle_basho(&self) -> Option<NetworkRequest> {
        let index = self.state.torikumi.index.as_ref()?;
        let data = self.state.torikumi.data.as_ref()?;
        if index.basho_list.is_empty() {
            return None;
        }
        let next = match index.basho_list.iter().position(|b| b.id == data.basho.id) {
            Some(pos) => (pos + 1) % index.basho_list.len(),
            None => 0,
        };
        let basho = &index.basho_list[next];
        if basho.id == data.basho.id {
            return None;
        }
        let day = u32::from(data.day).clamp(1, basho.days.clamp(1, 15)) as u8;
        Some(NetworkRequest::LoadDay { basho_id: basho.id.clone(), day })
    }

    // -----------------------------------------------------------------------
    // Predictions
    // -----------------------------------------------------------------------

    pub fn select_down(&mut self) {
        self.state.torikumi.select_down();
    }

    pub fn select_up(&mut self) {
        self.state.torikumi.select_up();
    }

    pub fn predict_selected(&mut self, side: Side) {
        if self.state.torikumi.match_count() == 0 {
            return;
        }
        let index = self.state.torikumi.selected_match;
        self.state.predictions.set_prediction(index, Some(side));
    }

    pub fn toggle_selected(&mut self) {
        if self.state.torikumi.match_count() == 0 {
            return;
        }
        let index = self.state.torikumi.selected_match;
        self.state.predictions.toggle(index);
    }

    pub fn clear_predictions(&mut self) {
        self.state.predictions.clear_all();
    }

    /// All parts of the shareable text for the day on screen.
    pub fn prediction_text(&self) -> Option<PredictionText> {
        let data = self.state.torikumi.data.as_ref()?;
        Some(PredictionText::for_day(
            data,
            self.state.predictions.predictions(),
            &self.state.preview.header_comment,
            &self.state.preview.footer_comment,
        ))
    }

    pub fn generated_text(&self) -> String {
        self.prediction_text().map(|t| t.assemble()).unwrap_or_default()
    }

    // -----------------------------------------------------------------------
    // Comment editing
    // -----------------------------------------------------------------------

    pub fn start_editing(&mut self, field: CommentField) {
        self.state.preview.editing = Some(field);
    }

    pub fn finish_editing(&mut self) {
        self.state.preview.editing = None;
    }

    pub fn edit_push(&mut self, c: char) {
        if let Some(field) = self.state.preview.editing {
            self.state.preview.field_mut(field).push(c);
        }
    }

    pub fn edit_backspace(&mut self) {
        if let Some(field) = self.state.preview.editing {
            self.state.preview.field_mut(field).pop();
        }
    }

    pub fn preview_scroll_down(&mut self) {
        self.state.preview.scroll_offset = self.state.preview.scroll_offset.saturating_add(1);
    }

    pub fn preview_scroll_up(&mut self) {
        self.state.preview.scroll_offset = self.state.preview.scroll_offset.saturating_sub(1);
    }

    // -----------------------------------------------------------------------
    // Quiz
    // -----------------------------------------------------------------------

    /// Begin loading a new round, reusing the quiz index once it is known.
    pub fn start_quiz(&mut self) -> Option<NetworkRequest> {
        if self.state.quiz.loading {
            return None;
        }
        self.state.quiz.loading = true;
        match self.state.quiz.index.clone() {
            Some(index) => self.on_quiz_index_loaded(index),
            None => Some(NetworkRequest::LoadQuizIndex),
        }
    }

    pub fn on_quiz_index_loaded(&mut self, index: QuizIndex) -> Option<NetworkRequest> {
        let basho_id = pick_basho(&index.basho_list, &mut rand::thread_rng()).map(|b| b.id.clone());
        self.state.quiz.available = basho_id.is_some();
        self.state.quiz.index = Some(index);
        match basho_id {
            Some(basho_id) => Some(NetworkRequest::LoadQuizBasho { basho_id }),
            None => {
                self.state.quiz.loading = false;
                None
            }
        }
    }

    pub fn on_quiz_basho_loaded(&mut self, data: QuizBashoData) {
        self.state.quiz.loading = false;
        self.state.quiz.selected_match = 0;
        if !self.state.quiz.session.begin_random(&data, &mut rand::thread_rng()) {
            warn!("quiz basho {} has no playable days", data.basho.id);
        }
    }

    pub fn quiz_select_down(&mut self) {
        let max = self.state.quiz.session.matches.len().saturating_sub(1);
        if self.state.quiz.selected_match < max {
            self.state.quiz.selected_match += 1;
        }
    }

    pub fn quiz_select_up(&mut self) {
        self.state.quiz.selected_match = self.state.quiz.selected_match.saturating_sub(1);
    }

    pub fn quiz_predict(&mut self, side: Side) {
        let index = self.state.quiz.selected_match;
        self.state.quiz.session.set_prediction(index, side);
    }

    pub fn quiz_toggle(&mut self) {
        let index = self.state.quiz.selected_match;
        self.state.quiz.session.toggle(index);
    }

    pub fn quiz_submit(&mut self) {
        self.state.quiz.session.submit();
    }

    /// Advance an in-progress reveal. Returns true when something changed.
    pub fn on_reveal_tick(&mut self) -> bool {
        let before = self.state.quiz.session.phase;
        self.state.quiz.session.tick();
        if let QuizPhase::Revealing { revealed } = self.state.quiz.session.phase {
            self.state.quiz.selected_match = revealed.saturating_sub(1);
        }
        before != self.state.quiz.session.phase
    }

    /// Start over from the result screen, or retry after a failed load.
    pub fn restart_quiz(&mut self) -> Option<NetworkRequest> {
        if matches!(self.state.quiz.session.phase, QuizPhase::Playing | QuizPhase::Revealing { .. }) {
            return None;
        }
        self.state.quiz.session.exit();
        self.state.quiz.selected_match = 0;
        self.state.quiz.available = true;
        self.start_quiz()
    }

    pub fn quiz_exit(&mut self) {
        self.state.quiz.session.exit();
        self.state.quiz.selected_match = 0;
        self.state.active_tab = MenuItem::Predict;
    }
}

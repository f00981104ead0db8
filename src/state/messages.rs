use crate::state::network::LoadingState;
use crossterm::event::KeyEvent;
use torikumi_api::{QuizBashoData, QuizIndex, TorikumiData, TorikumiIndex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NetworkRequest {
    LoadIndex,
    LoadLatest,
    LoadDay { basho_id: String, day: u8 },
    LoadQuizIndex,
    LoadQuizBasho { basho_id: String },
}

#[derive(Debug)]
pub enum NetworkResponse {
    LoadingStateChanged { loading_state: LoadingState },
    IndexLoaded { index: TorikumiIndex },
    DayLoaded { data: TorikumiData },
    QuizIndexLoaded { index: QuizIndex },
    QuizBashoLoaded { data: QuizBashoData },
    /// Carries the failed request so the app can decide between blocking and rollback.
    Error { request: NetworkRequest, message: String },
}

#[derive(Debug, Clone)]
pub enum UiEvent {
    KeyPressed(KeyEvent),
    Resize,
    AppStarted,
    RevealTick,
}

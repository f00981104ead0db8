mod app;
mod draw;
mod keys;
mod state;
mod ui;

use crate::app::App;
use crate::state::app_settings::AppSettings;
use crate::state::messages::{NetworkRequest, NetworkResponse, UiEvent};
use crate::state::network::{LoadingState, NetworkWorker};
use crate::state::predictions::{PredictionKey, PredictionStore};
use crate::state::storage::FileStore;
use crossterm::event::{self as crossterm_event, Event};
use crossterm::{cursor, execute, terminal};
use log::error;
use std::io::Stdout;
use std::sync::Arc;
use std::{io, panic};
use tokio::sync::{Mutex, mpsc};
use tokio::time::Duration;
use torikumi_api::client::TorikumiApi;
use torikumi_api::format::PredictionText;
use tui::{Terminal, backend::CrosstermBackend};

const REVEAL_INTERVAL: Duration = Duration::from_millis(400);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if handle_cli_args().await? {
        return Ok(());
    }

    better_panic::install();

    let backend = CrosstermBackend::new(io::stdout());
    let terminal = Terminal::new(backend)?;

    setup_panic_hook();
    setup_terminal();

    tui_logger::init_logger(log::LevelFilter::Warn)?;
    tui_logger::set_default_level(log::LevelFilter::Warn);

    let app = App::new();
    let client = TorikumiApi::with_base_url(&app.settings.data_url);
    let app = Arc::new(Mutex::new(app));

    let (ui_event_tx, ui_event_rx) = mpsc::channel::<UiEvent>(100);
    let (network_req_tx, network_req_rx) = mpsc::channel::<NetworkRequest>(100);
    let (network_resp_tx, network_resp_rx) = mpsc::channel::<NetworkResponse>(100);

    // Input handler thread
    let input_handler = tokio::spawn(input_handler_task(ui_event_tx.clone()));

    // Network thread
    let network_worker = NetworkWorker::new(client, network_req_rx, network_resp_tx);
    let network_task = tokio::spawn(network_worker.run());

    // Quiz answer reveal tick
    let reveal_tx = ui_event_tx.clone();
    let reveal_task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(REVEAL_INTERVAL);
        loop {
            interval.tick().await;
            if reveal_tx.send(UiEvent::RevealTick).await.is_err() {
                break;
            }
        }
    });

    let _ = ui_event_tx.send(UiEvent::AppStarted).await;

    main_ui_loop(terminal, app, ui_event_rx, network_req_tx, network_resp_rx).await;

    input_handler.abort();
    network_task.abort();
    reveal_task.abort();

    Ok(())
}

/// Returns true when the process should exit without starting the UI.
async fn handle_cli_args() -> anyhow::Result<bool> {
    let mut args = std::env::args().skip(1);
    let Some(arg) = args.next() else {
        return Ok(false);
    };

    match arg.as_str() {
        "-h" | "--help" => {
            println!("{}", usage_text());
            Ok(true)
        }
        "-V" | "--version" => {
            println!("sumo-yoso {}", env!("CARGO_PKG_VERSION"));
            Ok(true)
        }
        "--print" => {
            println!("{}", print_latest(&AppSettings::load()).await?);
            Ok(true)
        }
        _ => {
            eprintln!("Unknown argument: {arg}\n\n{}", usage_text());
            std::process::exit(2);
        }
    }
}

/// Text for the latest day, using whatever picks are already saved for it.
async fn print_latest(settings: &AppSettings) -> anyhow::Result<String> {
    let client = TorikumiApi::with_base_url(&settings.data_url);
    let data = client.fetch_latest().await?;
    let store = PredictionStore::new(FileStore::open(&settings.store_path));
    let predictions = store.load(&PredictionKey::for_day(&data));
    let text = PredictionText::for_day(
        &data,
        &predictions,
        &settings.header_comment,
        &settings.footer_comment,
    );
    Ok(text.assemble())
}

fn usage_text() -> &'static str {
    "sumo-yoso - grand sumo winner predictions in the terminal

Usage:
  sumo-yoso
  sumo-yoso --print
  sumo-yoso --help
  sumo-yoso --version

Environment:
  SUMO_YOSO_DATA_URL   Base URL serving data/torikumi and data/quiz (default http://127.0.0.1:5173/)
  SUMO_YOSO_STORE      Prediction file (default $XDG_CONFIG_HOME/sumo-yoso/predictions.json)
  SUMO_YOSO_HEADER     Header comment line (default （・ω・）ノ, empty to omit)
  SUMO_YOSO_FOOTER     Footer comment line
  SUMO_YOSO_LOG        Log level for the log pane (error, warn, info, debug, trace)"
}

async fn main_ui_loop(
    mut terminal: Terminal<CrosstermBackend<Stdout>>,
    app: Arc<Mutex<App>>,
    mut ui_events: mpsc::Receiver<UiEvent>,
    network_requests: mpsc::Sender<NetworkRequest>,
    mut network_responses: mpsc::Receiver<NetworkResponse>,
) {
    let mut loading = LoadingState::default();

    loop {
        tokio::select! {
            Some(ui_event) = ui_events.recv() => {
                let should_redraw = handle_ui_event(ui_event, &app, &network_requests).await;
                if should_redraw && !loading.is_loading {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }

            Some(response) = network_responses.recv() => {
                let should_redraw =
                    handle_network_response(response, &app, &network_requests, &mut loading).await;
                if should_redraw {
                    let mut app_guard = app.lock().await;
                    draw::draw(&mut terminal, &mut app_guard, loading);
                }
            }
        }
    }
}

async fn handle_ui_event(
    ui_event: UiEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) -> bool {
    match ui_event {
        UiEvent::AppStarted => {
            let _ = network_requests.send(NetworkRequest::LoadIndex).await;
            let _ = network_requests.send(NetworkRequest::LoadLatest).await;
            true
        }
        UiEvent::KeyPressed(key_event) => {
            keys::handle_key_bindings(key_event, app, network_requests).await;
            true
        }
        UiEvent::Resize => true,
        UiEvent::RevealTick => app.lock().await.on_reveal_tick(),
    }
}

async fn handle_network_response(
    response: NetworkResponse,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
    loading: &mut LoadingState,
) -> bool {
    match response {
        NetworkResponse::LoadingStateChanged { loading_state } => {
            *loading = loading_state;
            return true;
        }
        NetworkResponse::IndexLoaded { index } => {
            app.lock().await.on_index_loaded(index);
        }
        NetworkResponse::DayLoaded { data } => {
            app.lock().await.on_day_loaded(data);
        }
        NetworkResponse::QuizIndexLoaded { index } => {
            let follow_up = app.lock().await.on_quiz_index_loaded(index);
            if let Some(request) = follow_up {
                let _ = network_requests.send(request).await;
            }
        }
        NetworkResponse::QuizBashoLoaded { data } => {
            app.lock().await.on_quiz_basho_loaded(data);
        }
        NetworkResponse::Error { request, message } => {
            error!("Network error: {message}");
            app.lock().await.on_fetch_failed(request, message);
        }
    }
    !loading.is_loading
}

async fn input_handler_task(ui_events: mpsc::Sender<UiEvent>) {
    loop {
        if let Ok(event) = crossterm_event::read() {
            let ui_event = match event {
                Event::Key(key_event) => Some(UiEvent::KeyPressed(key_event)),
                Event::Resize(_, _) => Some(UiEvent::Resize),
                _ => None,
            };

            if let Some(ui_event) = ui_event
                && ui_events.send(ui_event).await.is_err()
            {
                break;
            }
        }
    }
}

fn setup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::Hide);
    let _ = execute!(stdout, terminal::EnterAlternateScreen);
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = terminal::enable_raw_mode();
}

pub fn cleanup_terminal() {
    let mut stdout = io::stdout();
    let _ = execute!(stdout, cursor::MoveTo(0, 0));
    let _ = execute!(stdout, terminal::Clear(terminal::ClearType::All));
    let _ = execute!(stdout, terminal::LeaveAlternateScreen);
    let _ = execute!(stdout, cursor::Show);
    let _ = terminal::disable_raw_mode();
}

fn setup_panic_hook() {
    panic::set_hook(Box::new(|panic_info| {
        cleanup_terminal();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));
}

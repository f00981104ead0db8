use crate::app::{App, MenuItem};
use crate::state::app_state::CommentField;
use crate::state::messages::NetworkRequest;
use crossterm::event::KeyCode::Char;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;
use tokio::sync::{Mutex, mpsc};
use torikumi_api::Side;

pub async fn handle_key_bindings(
    key_event: KeyEvent,
    app: &Arc<Mutex<App>>,
    network_requests: &mpsc::Sender<NetworkRequest>,
) {
    let mut guard = app.lock().await;

    // Comment editing swallows every key except the ones that end it.
    if guard.state.preview.editing.is_some() {
        match (key_event.code, key_event.modifiers) {
            (Char('c'), KeyModifiers::CONTROL) => {
                crate::cleanup_terminal();
                std::process::exit(0);
            }
            (KeyCode::Enter | KeyCode::Esc, _) => guard.finish_editing(),
            (KeyCode::Backspace, _) => guard.edit_backspace(),
            (Char(c), _) => guard.edit_push(c),
            _ => {}
        }
        return;
    }

    let request = match (guard.state.active_tab, key_event.code, key_event.modifiers) {
        // Quit
        (_, Char('q'), _) | (_, Char('c'), KeyModifiers::CONTROL) => {
            crate::cleanup_terminal();
            std::process::exit(0);
        }

        // Tab switching
        (_, Char('1'), _) => guard.update_tab(MenuItem::Predict),
        (_, Char('2'), _) => guard.update_tab(MenuItem::Preview),
        (_, Char('3'), _) => guard.update_tab(MenuItem::Quiz),
        (_, Char('?'), _) => guard.update_tab(MenuItem::Help),
        (MenuItem::Help, KeyCode::Esc, _) => {
            guard.exit_help();
            None
        }

        // Predictions
        (MenuItem::Predict, Char('j') | KeyCode::Down, _) => {
            guard.select_down();
            None
        }
        (MenuItem::Predict, Char('k') | KeyCode::Up, _) => {
            guard.select_up();
            None
        }
        (MenuItem::Predict, Char('e'), _) => {
            guard.predict_selected(Side::East);
            guard.select_down();
            None
        }
        (MenuItem::Predict, Char('w'), _) => {
            guard.predict_selected(Side::West);
            guard.select_down();
            None
        }
        (MenuItem::Predict, Char(' ') | KeyCode::Enter, _) => {
            guard.toggle_selected();
            None
        }
        (MenuItem::Predict, Char('x'), _) => {
            guard.clear_predictions();
            None
        }
        (MenuItem::Predict | MenuItem::Preview, Char('n') | KeyCode::Right, _) => guard.next_day(),
        (MenuItem::Predict | MenuItem::Preview, Char('p') | KeyCode::Left, _) => guard.prev_day(),
        (MenuItem::Predict, Char('b'), _) => guard.cycle_basho(),

        // Preview
        (MenuItem::Preview, Char('h'), _) => {
            guard.start_editing(CommentField::Header);
            None
        }
        (MenuItem::Preview, Char('t'), _) => {
            guard.start_editing(CommentField::Footer);
            None
        }
        (MenuItem::Preview, Char('j') | KeyCode::Down, _) => {
            guard.preview_scroll_down();
            None
        }
        (MenuItem::Preview, Char('k') | KeyCode::Up, _) => {
            guard.preview_scroll_up();
            None
        }

        // Quiz
        (MenuItem::Quiz, Char('j') | KeyCode::Down, _) => {
            guard.quiz_select_down();
            None
        }
        (MenuItem::Quiz, Char('k') | KeyCode::Up, _) => {
            guard.quiz_select_up();
            None
        }
        (MenuItem::Quiz, Char('e'), _) => {
            guard.quiz_predict(Side::East);
            None
        }
        (MenuItem::Quiz, Char('w'), _) => {
            guard.quiz_predict(Side::West);
            None
        }
        (MenuItem::Quiz, Char(' '), _) => {
            guard.quiz_toggle();
            None
        }
        (MenuItem::Quiz, KeyCode::Enter, _) => {
            guard.quiz_submit();
            None
        }
        (MenuItem::Quiz, Char('r'), _) => guard.restart_quiz(),
        (MenuItem::Quiz, KeyCode::Esc, _) => {
            guard.quiz_exit();
            None
        }

        // Global
        (_, Char('f'), _) => {
            guard.toggle_full_screen();
            None
        }
        (_, Char('"'), _) => {
            guard.toggle_show_logs();
            None
        }

        _ => None,
    };

    if let Some(request) = request {
        drop(guard);
        let _ = network_requests.send(request).await;
    }
}

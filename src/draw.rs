use tui::backend::Backend;
use tui::layout::{Alignment, Constraint, Layout, Rect};
use tui::style::{Color, Modifier, Style};
use tui::text::{Line, Span};
use tui::widgets::{Block, BorderType, Borders, Paragraph, Tabs};
use tui::{Frame, Terminal};
use tui_logger::TuiLoggerWidget;

use crate::app::{App, MenuItem};
use crate::state::app_state::{CommentField, LoadState};
use crate::state::network::{ERROR_CHAR, LoadingState};
use crate::state::quiz::QuizPhase;
use crate::ui::layout::LayoutAreas;
use torikumi_api::format::{basho_id_to_label, day_to_kanji, format_basho_day, match_line};
use torikumi_api::{Match, Side};

static TABS: &[&str; 3] = &["予想", "Preview", "Quiz"];

const HELP_TEXT: &str = "\
1/2/3  switch tab          ?  help          \"  logs          f  full screen          q  quit

予想     j/k  move   e/w  pick east/west   Space  flip   ←/→  day   b  basho   x  clear
Preview  h  edit header   t  edit footer   j/k  scroll   Enter/Esc  finish editing
Quiz     j/k  move   e/w/Space  pick   Enter  answer   r  new round   Esc  leave";

pub fn draw<B>(terminal: &mut Terminal<B>, app: &mut App, loading: LoadingState)
where
    B: Backend,
{
    let current_size = terminal.size().unwrap_or_default();
    if current_size.width <= 10 || current_size.height <= 10 {
        return;
    }

    let mut layout = LayoutAreas::new(current_size);

    let _ = terminal.draw(|f| {
        layout.update(f.area(), app.settings.full_screen, app.state.show_logs);

        if !app.settings.full_screen {
            draw_tabs(f, layout.tab_bar, app);
            draw_status(f, layout.status, app);
        }

        match app.state.active_tab {
            MenuItem::Predict => draw_predict(f, layout.main, app),
            MenuItem::Preview => draw_preview(f, layout.main, app),
            MenuItem::Quiz => draw_quiz(f, layout.main, app),
            MenuItem::Help => draw_placeholder(f, layout.main, HELP_TEXT),
        }

        if let Some(logs) = layout.logs {
            draw_logs(f, logs);
        }

        draw_loading_spinner(f, f.area(), app, loading);
    });
}

pub fn default_border<'a>(color: Color) -> Block<'a> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(color))
}

fn draw_tabs(f: &mut Frame, tab_bar: [Rect; 2], app: &App) {
    let style = Style::default().fg(Color::White);
    let border_type = BorderType::Rounded;

    let tab_index = match app.state.active_tab {
        MenuItem::Predict => 0,
        MenuItem::Preview => 1,
        MenuItem::Quiz => 2,
        MenuItem::Help => 0,
    };

    let titles: Vec<Line> = TABS.iter().map(|t| Line::from(*t)).collect();
    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::LEFT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .highlight_style(Style::default().add_modifier(Modifier::UNDERLINED))
        .select(tab_index)
        .style(style);
    f.render_widget(tabs, tab_bar[0]);

    let help = Paragraph::new("Help: ? ")
        .alignment(Alignment::Right)
        .block(
            Block::default()
                .borders(Borders::RIGHT | Borders::BOTTOM | Borders::TOP)
                .border_type(border_type),
        )
        .style(style);
    f.render_widget(help, tab_bar[1]);
}

fn draw_status(f: &mut Frame, area: Rect, app: &App) {
    let line = if let Some(err) = app.state.last_error.as_deref() {
        Line::from(Span::styled(format!(" {err}"), Style::default().fg(Color::Red)))
    } else if let Some(data) = app.state.torikumi.data.as_ref() {
        let mut spans = vec![Span::styled(
            format!(" 更新 {}", data.updated_at_local()),
            Style::default().fg(Color::DarkGray),
        )];
        if app.state.torikumi.index.as_ref().is_some_and(|i| i.is_off_season()) {
            spans.push(Span::styled("  場所外", Style::default().fg(Color::Yellow)));
        }
        Line::from(spans)
    } else {
        Line::default()
    };
    f.render_widget(Paragraph::new(line), area);
}

/// Shown instead of a tab body until the first day arrives.
fn draw_load_state(f: &mut Frame, area: Rect, load: &LoadState) -> bool {
    let (msg, color) = match load {
        LoadState::Ready => return false,
        LoadState::Loading => ("取組データを読み込み中...".to_string(), Color::DarkGray),
        LoadState::Failed(err) => (format!("エラー: {err}"), Color::Red),
    };
    f.render_widget(
        Paragraph::new(msg).style(Style::default().fg(color)).alignment(Alignment::Center),
        area,
    );
    true
}

fn draw_predict(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" 取組 ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if draw_load_state(f, inner, &app.state.load) {
        return;
    }
    let Some(data) = app.state.torikumi.data.as_ref() else {
        return;
    };

    let [header, key_legend, content] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Fill(1)]).areas(inner);

    let picked = app.state.predictions.predictions().iter().filter(|(_, v)| v.is_some()).count();
    let basho_label = if data.basho.label.is_empty() {
        basho_id_to_label(&data.basho.id)
    } else {
        data.basho.label.clone()
    };
    f.render_widget(
        Paragraph::new(format!(
            "{}  {}  ({picked}/{})",
            format_basho_day(&basho_label, i64::from(data.day)),
            app.state.predictions.key().division,
            data.matches.len()
        )),
        header,
    );
    f.render_widget(
        Paragraph::new("Keys: j/k=move  e/w=pick  Space=flip  ←/→=day  b=basho  x=clear")
            .style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    if data.matches.is_empty() {
        f.render_widget(
            Paragraph::new("取組がありません").style(Style::default().fg(Color::DarkGray)),
            content,
        );
        return;
    }

    let predictions = app.state.predictions.predictions();
    let selected = app.state.torikumi.selected_match;
    let visible = content.height.max(1) as usize;
    let offset = selected.saturating_sub(visible.saturating_sub(1));

    let lines: Vec<Line> = data
        .matches
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, m)| {
            let marker = if i == selected { "> " } else { "  " };
            let style = if predictions.get(i).is_some() {
                Style::default().fg(Color::White)
            } else {
                Style::default().fg(Color::DarkGray)
            };
            let style = if i == selected { style.add_modifier(Modifier::BOLD) } else { style };
            Line::from(vec![
                Span::raw(marker),
                Span::styled(match_line(m, predictions.winner_or_default(i)), style),
            ])
        })
        .collect();

    f.render_widget(Paragraph::new(lines), content);
}

fn draw_preview(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Preview ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    if draw_load_state(f, inner, &app.state.load) {
        return;
    }

    let [header_field, footer_field, text_area] =
        Layout::vertical([Constraint::Length(3), Constraint::Length(3), Constraint::Fill(1)]).areas(inner);

    let preview = &app.state.preview;
    draw_comment_field(f, header_field, " h: header ", &preview.header_comment, preview.editing == Some(CommentField::Header));
    draw_comment_field(f, footer_field, " t: footer ", &preview.footer_comment, preview.editing == Some(CommentField::Footer));

    let text = app.generated_text();
    let lines: Vec<Line> = text
        .lines()
        .skip(preview.scroll_offset as usize)
        .map(Line::from)
        .collect();
    let text_block = default_border(Color::DarkGray).title(" 予想テキスト ");
    let text_inner = text_block.inner(text_area);
    f.render_widget(text_block, text_area);
    f.render_widget(Paragraph::new(lines), text_inner);
}

fn draw_comment_field(f: &mut Frame, area: Rect, title: &str, value: &str, editing: bool) {
    let (color, body) = if editing {
        (Color::Yellow, format!("{value}_"))
    } else {
        (Color::DarkGray, value.to_string())
    };
    let block = default_border(color).title(title.to_string());
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(Paragraph::new(body).style(Style::default().fg(color)), inner);
}

fn draw_quiz(f: &mut Frame, area: Rect, app: &App) {
    let block = default_border(Color::White).title(" Quiz ");
    let inner = block.inner(area);
    f.render_widget(block, area);

    let quiz = &app.state.quiz;
    let session = &quiz.session;

    if !quiz.available {
        draw_centered(f, inner, "クイズデータがありません (r: retry)", Color::DarkGray);
        return;
    }
    if quiz.loading {
        draw_centered(f, inner, "クイズを読み込み中...", Color::DarkGray);
        return;
    }
    if session.phase == QuizPhase::Idle {
        draw_centered(f, inner, "r: start a round", Color::DarkGray);
        return;
    }

    let [header, key_legend, content] =
        Layout::vertical([Constraint::Length(1), Constraint::Length(1), Constraint::Fill(1)]).areas(inner);

    let day_label = session
        .day
        .parse::<i64>()
        .map(|d| day_to_kanji(d).into_owned())
        .unwrap_or_else(|_| session.day.clone());
    f.render_widget(Paragraph::new(format!("{} {day_label}", session.basho_label)), header);

    let legend = match session.phase {
        QuizPhase::Playing => "Keys: j/k=move  e/w/Space=pick  Enter=answer  Esc=leave".to_string(),
        QuizPhase::Result => format!(
            "{} / {} 問正解 ({}%)   r=new round  Esc=leave",
            session.score.correct,
            session.score.total,
            session.score.percentage()
        ),
        _ => "答え合わせ中...".to_string(),
    };
    f.render_widget(
        Paragraph::new(legend).style(Style::default().fg(Color::DarkGray)),
        key_legend,
    );

    let selected = quiz.selected_match;
    let visible = content.height.max(1) as usize;
    let offset = selected.saturating_sub(visible.saturating_sub(1));

    let lines: Vec<Line> = session
        .matches
        .iter()
        .enumerate()
        .skip(offset)
        .take(visible)
        .map(|(i, m)| {
            let marker = if i == selected && session.phase == QuizPhase::Playing { "> " } else { "  " };
            let bout = Match { east: m.east.clone(), west: m.west.clone() };
            let mut spans = vec![
                Span::raw(marker),
                Span::raw(match_line(&bout, session.predictions.winner_or_default(i))),
            ];
            if session.is_revealed(i) {
                let (mark, color) = if session.is_correct(i) {
                    ("  ✓ ", Color::Green)
                } else {
                    ("  ✗ ", Color::Red)
                };
                let winner = match m.winner {
                    Side::East => &m.east,
                    Side::West => &m.west,
                };
                spans.push(Span::styled(mark, Style::default().fg(color)));
                spans.push(Span::styled(
                    format!("{winner} ({})", m.kimarite),
                    Style::default().fg(Color::Gray),
                ));
            }
            Line::from(spans)
        })
        .collect();

    f.render_widget(Paragraph::new(lines), content);
}

fn draw_centered(f: &mut Frame, area: Rect, msg: &str, color: Color) {
    f.render_widget(
        Paragraph::new(msg.to_string())
            .style(Style::default().fg(color))
            .alignment(Alignment::Center),
        area,
    );
}

fn draw_placeholder(f: &mut Frame, area: Rect, msg: &str) {
    let block = default_border(Color::DarkGray);
    let inner = block.inner(area);
    f.render_widget(block, area);
    f.render_widget(
        Paragraph::new(msg.to_string()).style(Style::default().fg(Color::Gray)),
        inner,
    );
}

fn draw_logs(f: &mut Frame, area: Rect) {
    let logs = TuiLoggerWidget::default()
        .block(default_border(Color::DarkGray).title(" Logs "))
        .style_error(Style::default().fg(Color::Red))
        .style_warn(Style::default().fg(Color::Yellow))
        .style_info(Style::default().fg(Color::Gray));
    f.render_widget(logs, area);
}

fn draw_loading_spinner(f: &mut Frame, area: Rect, app: &App, loading: LoadingState) {
    if !loading.is_loading && loading.spinner_char != ERROR_CHAR {
        return;
    }
    let style = match loading.spinner_char {
        ERROR_CHAR => Style::default().fg(Color::Red),
        _ => Style::default().fg(Color::White),
    };
    let spinner = Paragraph::new(loading.spinner_char.to_string())
        .alignment(Alignment::Right)
        .style(style);
    let area = if app.settings.full_screen {
        Rect::new(area.width.saturating_sub(3), area.height.saturating_sub(2), 1, 1)
    } else {
        Rect::new(area.width.saturating_sub(11), 1, 1, 1)
    };
    f.render_widget(spinner, area);
}

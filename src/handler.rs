use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::warn;

use crate::app::{App, Focus, InputMode, TextField};
use crate::config::Config;
use crate::tui::AppEvent;

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }
    app.poll_analysis().await;
    Ok(())
}

pub fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        app.should_quit = true;
        return;
    }

    if app.show_picker {
        handle_picker(app, key);
        return;
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        // Focus
        KeyCode::Tab | KeyCode::Char('j') | KeyCode::Down => app.focus = app.focus.next(),
        KeyCode::BackTab | KeyCode::Char('k') | KeyCode::Up => app.focus = app.focus.prev(),

        KeyCode::Enter => match app.focus {
            Focus::File | Focus::Role => app.input_mode = InputMode::Editing,
            Focus::Analyze => analyze(app),
        },
        KeyCode::Char('i') => {
            if app.focus != Focus::Analyze {
                app.input_mode = InputMode::Editing;
            }
        }

        KeyCode::Char('a') => analyze(app),
        KeyCode::Char('o') => app.open_picker(),
        KeyCode::Char('d') => app.toggle_debug(),

        // Results scrolling
        KeyCode::PageDown | KeyCode::Char('J') => app.scroll_results_down(5),
        KeyCode::PageUp | KeyCode::Char('K') => app.scroll_results_up(5),
        KeyCode::Home => app.results_scroll = 0,

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.input_mode = InputMode::Normal;
            if app.focus == Focus::File {
                app.commit_path_input();
            }
        }
        KeyCode::Tab => {
            if app.focus == Focus::File {
                app.commit_path_input();
            }
            app.input_mode = InputMode::Normal;
            app.focus = app.focus.next();
        }
        _ => {
            let field = match app.focus {
                Focus::File => &mut app.path_input,
                Focus::Role => &mut app.role_input,
                Focus::Analyze => {
                    app.input_mode = InputMode::Normal;
                    return;
                }
            };
            if edit_field(field, key) && app.focus == Focus::Role {
                app.sync_role();
            }
        }
    }
}

/// Apply a text-editing key. Returns whether the field changed.
fn edit_field(field: &mut TextField, key: KeyEvent) -> bool {
    let before = field.value.len();
    match key.code {
        KeyCode::Backspace => field.backspace(),
        KeyCode::Delete => field.delete(),
        KeyCode::Left => field.left(),
        KeyCode::Right => field.right(),
        KeyCode::Home => field.home(),
        KeyCode::End => field.end(),
        KeyCode::Char(c) => field.insert(c),
        _ => {}
    }
    field.value.len() != before
}

fn handle_picker(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => app.show_picker = false,
        KeyCode::Char('j') | KeyCode::Down => app.picker_nav_down(),
        KeyCode::Char('k') | KeyCode::Up => app.picker_nav_up(),
        KeyCode::Enter => app.choose_picked(),
        _ => {}
    }
}

fn analyze(app: &mut App) {
    app.trigger();
    if app.has_pending_analysis() {
        if let Err(err) = Config::save_default_role(&app.upload.target_role) {
            warn!("Could not remember target role: {:#}", err);
        }
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let in_results = app
        .results_area
        .is_some_and(|r| point_in_rect(mouse.column, mouse.row, r));
    if !in_results {
        return;
    }

    match mouse.kind {
        MouseEventKind::ScrollDown => app.scroll_results_down(3),
        MouseEventKind::ScrollUp => app.scroll_results_up(3),
        _ => {}
    }
}

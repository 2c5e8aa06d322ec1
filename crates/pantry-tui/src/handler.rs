use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;
use tracing::{debug, warn};

use crate::app::{App, InputMode};
use crate::tui::AppEvent;

/// Lines moved per mouse wheel notch
const WHEEL_STEP: i32 = 3;

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

pub async fn handle_event(app: &mut App, event: AppEvent) -> Result<()> {
    match event {
        AppEvent::Key(key) => handle_key(app, key),
        AppEvent::Mouse(mouse) => handle_mouse(app, mouse),
        AppEvent::Resize(_, _) => {}
        AppEvent::Tick => app.tick_animation(),
    }
    app.poll_tasks().await;
    Ok(())
}

fn handle_key(app: &mut App, key: KeyEvent) {
    // Global keys that work in any mode
    if key.modifiers.contains(KeyModifiers::CONTROL) {
        match key.code {
            KeyCode::Char('c') => {
                app.should_quit = true;
                return;
            }
            KeyCode::Char('r') => {
                app.check_connection();
                return;
            }
            _ => {}
        }
    }

    match app.input_mode {
        InputMode::Normal => handle_normal_mode(app, key),
        InputMode::Editing => handle_editing_mode(app, key),
    }
}

fn handle_normal_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Char('q') => app.should_quit = true,

        KeyCode::Char('i') | KeyCode::Enter => app.input_mode = InputMode::Editing,
        KeyCode::Tab => app.toggle_focus(),

        // Half-page scroll
        KeyCode::Char('d') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half = app.half_page();
            app.scroll_focused_by(half);
        }
        KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            let half = app.half_page();
            app.scroll_focused_by(-half);
        }

        KeyCode::Char('j') | KeyCode::Down => app.scroll_focused_by(1),
        KeyCode::Char('k') | KeyCode::Up => app.scroll_focused_by(-1),
        KeyCode::PageDown => {
            let half = app.half_page();
            app.scroll_focused_by(half * 2);
        }
        KeyCode::PageUp => {
            let half = app.half_page();
            app.scroll_focused_by(-half * 2);
        }
        KeyCode::Char('g') | KeyCode::Home => app.scroll_focused_to_top(),
        KeyCode::Char('G') | KeyCode::End => app.scroll_focused_to_bottom(),

        KeyCode::Char('r') => app.check_connection(),
        KeyCode::Char('c') => match app.recipe_text() {
            Some(text) => {
                app.status = Some(if copy_to_clipboard(&text) {
                    "Recipe copied to clipboard.".to_string()
                } else {
                    "No clipboard tool found (tried pbcopy, wl-copy, xclip).".to_string()
                });
            }
            None => app.status = Some("Nothing to copy yet.".to_string()),
        },

        _ => {}
    }
}

fn handle_editing_mode(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Enter => {
            app.send();
        }
        KeyCode::Backspace => {
            if app.input_cursor > 0 {
                app.input_cursor -= 1;
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Delete => {
            let char_count = app.input.chars().count();
            if app.input_cursor < char_count {
                let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
                app.input.remove(byte_pos);
            }
        }
        KeyCode::Left => {
            app.input_cursor = app.input_cursor.saturating_sub(1);
        }
        KeyCode::Right => {
            let char_count = app.input.chars().count();
            app.input_cursor = (app.input_cursor + 1).min(char_count);
        }
        KeyCode::Home => {
            app.input_cursor = 0;
        }
        KeyCode::End => {
            app.input_cursor = app.input.chars().count();
        }
        KeyCode::Up => app.scroll_chat_by(-1),
        KeyCode::Down => app.scroll_chat_by(1),
        KeyCode::Char(c) => {
            let byte_pos = char_to_byte_index(&app.input, app.input_cursor);
            app.input.insert(byte_pos, c);
            app.input_cursor += 1;
        }
        _ => {}
    }
}

/// Check if a point is within a rectangle
fn point_in_rect(x: u16, y: u16, rect: Rect) -> bool {
    x >= rect.x && x < rect.x + rect.width && y >= rect.y && y < rect.y + rect.height
}

fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    let delta = match mouse.kind {
        MouseEventKind::ScrollDown => WHEEL_STEP,
        MouseEventKind::ScrollUp => -WHEEL_STEP,
        _ => return,
    };

    let (x, y) = (mouse.column, mouse.row);
    if app.recipe_area.is_some_and(|r| point_in_rect(x, y, r)) {
        app.scroll_recipe_by(delta);
    } else if app.chat_area.is_some_and(|r| point_in_rect(x, y, r)) {
        app.scroll_chat_by(delta);
    }
}

/// Pipe `text` into the first clipboard tool that accepts it.
fn copy_to_clipboard(text: &str) -> bool {
    const TOOLS: [(&str, &[&str]); 3] = [
        ("pbcopy", &[]),
        ("wl-copy", &[]),
        ("xclip", &["-selection", "clipboard"]),
    ];

    TOOLS
        .iter()
        .any(|(program, args)| pipe_to_program(program, args, text))
}

/// Run `program`, feed `text` on stdin and report whether it exited cleanly.
/// The child is always reaped, even when the write fails.
fn pipe_to_program(program: &str, args: &[&str], text: &str) -> bool {
    use std::io::Write;
    use std::process::{Command, Stdio};

    let Ok(mut child) = Command::new(program)
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn()
    else {
        return false;
    };

    if let Some(mut stdin) = child.stdin.take() {
        if let Err(e) = stdin.write_all(text.as_bytes()) {
            warn!(program, error = %e, "clipboard write failed");
            drop(stdin);
            let _ = child.kill();
            let _ = child.wait();
            return false;
        }
    }

    match child.wait() {
        Ok(status) if status.success() => {
            debug!(program, "recipe copied");
            true
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyEventKind, KeyEventState, KeyModifiers};
    use pantry_core::{BackendClient, ConnectionState, ParsedRecipe};

    use crate::app::FocusPane;

    fn test_app() -> App {
        App::new(BackendClient::new("http://127.0.0.1:9"))
    }

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn type_text(app: &mut App, text: &str) {
        for c in text.chars() {
            handle_key(app, key(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_char_to_byte_index_multibyte() {
        let s = "jalapeño oil";
        assert_eq!(char_to_byte_index(s, 6), 6);
        assert_eq!(char_to_byte_index(s, 7), 8);
        assert_eq!(char_to_byte_index(s, 100), s.len());
    }

    #[test]
    fn test_typing_and_cursor_editing() {
        let mut app = test_app();
        type_text(&mut app, "ric");
        handle_key(&mut app, key(KeyCode::Left));
        handle_key(&mut app, key(KeyCode::Left));
        type_text(&mut app, "ñ");
        assert_eq!(app.input, "rñic");
        assert_eq!(app.input_cursor, 2);

        handle_key(&mut app, key(KeyCode::Backspace));
        assert_eq!(app.input, "ric");
        handle_key(&mut app, key(KeyCode::Delete));
        assert_eq!(app.input, "rc");
        handle_key(&mut app, key(KeyCode::End));
        type_text(&mut app, "e");
        assert_eq!(app.input, "rce");
        handle_key(&mut app, key(KeyCode::Home));
        assert_eq!(app.input_cursor, 0);
    }

    #[test]
    fn test_esc_and_i_switch_modes() {
        let mut app = test_app();
        handle_key(&mut app, key(KeyCode::Esc));
        assert_eq!(app.input_mode, InputMode::Normal);

        // Typing in normal mode does not edit the input
        handle_key(&mut app, key(KeyCode::Char('x')));
        assert!(app.input.is_empty());

        handle_key(&mut app, key(KeyCode::Char('i')));
        assert_eq!(app.input_mode, InputMode::Editing);
    }

    #[test]
    fn test_quit_keys() {
        let mut app = test_app();
        handle_key(&mut app, key(KeyCode::Char('q')));
        assert!(!app.should_quit, "q is text while editing");

        handle_key(&mut app, ctrl('c'));
        assert!(app.should_quit);

        let mut app = test_app();
        app.input_mode = InputMode::Normal;
        handle_key(&mut app, key(KeyCode::Char('q')));
        assert!(app.should_quit);
    }

    #[test]
    fn test_tab_switches_focus_in_normal_mode() {
        let mut app = test_app();
        app.input_mode = InputMode::Normal;
        handle_key(&mut app, key(KeyCode::Tab));
        assert_eq!(app.focus, FocusPane::Recipe);
    }

    #[test]
    fn test_enter_ignored_while_offline() {
        let mut app = test_app();
        app.set_connection(false);
        type_text(&mut app, "eggs");
        handle_key(&mut app, key(KeyCode::Enter));
        assert!(!app.busy);
        assert!(app.request_task.is_none());
        assert_eq!(app.input, "eggs");
    }

    #[test]
    fn test_copy_without_recipe_sets_status() {
        let mut app = test_app();
        app.input_mode = InputMode::Normal;
        handle_key(&mut app, key(KeyCode::Char('c')));
        assert_eq!(app.status.as_deref(), Some("Nothing to copy yet."));
    }

    #[test]
    fn test_mouse_wheel_scrolls_pane_under_cursor() {
        let mut app = test_app();
        app.recipe = Some(ParsedRecipe::default());
        app.recipe_area = Some(Rect::new(0, 0, 40, 20));
        app.chat_area = Some(Rect::new(40, 0, 40, 20));
        app.total_recipe_lines = 50;
        app.recipe_height = 18;

        let wheel = |column| MouseEvent {
            kind: MouseEventKind::ScrollDown,
            column,
            row: 5,
            modifiers: KeyModifiers::NONE,
        };
        handle_mouse(&mut app, wheel(10));
        assert_eq!(app.recipe_scroll, 3);

        handle_mouse(&mut app, wheel(60));
        assert_eq!(app.recipe_scroll, 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_pipe_to_program_reaps_child() {
        assert!(pipe_to_program("cat", &[], "2 eggs"));
        assert!(!pipe_to_program("false", &[], "2 eggs"));
        assert!(!pipe_to_program("pantry-chef-no-such-tool", &[], "2 eggs"));

        // `true` never reads, so a payload larger than the pipe buffer
        // fails to write and the child must still be collected
        let big = "salt ".repeat(200_000);
        assert!(!pipe_to_program("true", &[], &big));
    }

    #[tokio::test]
    async fn test_enter_sends_when_ready() {
        let mut app = test_app();
        type_text(&mut app, "tofu, scallions");
        handle_event(&mut app, AppEvent::Key(key(KeyCode::Enter)))
            .await
            .unwrap();

        assert!(app.busy);
        assert_eq!(app.messages.last().unwrap().text, "tofu, scallions");
        if let Some(task) = app.request_task.take() {
            task.abort();
        }
    }

    #[tokio::test]
    async fn test_ctrl_r_starts_health_check() {
        let mut app = test_app();
        app.set_connection(false);
        handle_event(&mut app, AppEvent::Key(ctrl('r'))).await.unwrap();

        // The spawned check cannot run before this task yields
        assert!(app.health_task.is_some());
        assert_eq!(app.connection, ConnectionState::Checking);
        if let Some(task) = app.health_task.take() {
            task.abort();
        }
    }
}

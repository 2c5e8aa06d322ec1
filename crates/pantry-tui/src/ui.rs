use ratatui::{
    layout::{Alignment, Constraint, Layout, Margin, Rect},
    style::{Color, Modifier, Style, Stylize},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState, Wrap},
    Frame,
};

use crate::app::{App, FocusPane, InputMode};
use pantry_core::{ChatRole, ConnectionState, ParsedRecipe};

const ACCENT: Color = Color::LightRed;
const INPUT_PLACEHOLDER: &str = "chicken, rice, garlic, lemon...";

/// Render `**bold**` runs as bold spans; everything else stays literal.
fn render_inline_bold(text: &str) -> Line<'static> {
    let mut spans: Vec<Span<'static>> = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find("**") {
        let after_open = &rest[open + 2..];
        let Some(close) = after_open.find("**") else {
            break;
        };
        if close == 0 {
            // "****" has nothing to embolden
            spans.push(Span::raw(rest[..open + 4].to_string()));
            rest = &after_open[2..];
            continue;
        }
        if open > 0 {
            spans.push(Span::raw(rest[..open].to_string()));
        }
        spans.push(Span::styled(
            after_open[..close].to_string(),
            Style::default().add_modifier(Modifier::BOLD),
        ));
        rest = &after_open[close + 2..];
    }

    if !rest.is_empty() {
        spans.push(Span::raw(rest.to_string()));
    }

    Line::from(spans)
}

/// Number of terminal rows `lines` occupy when wrapped to `width`.
fn wrapped_height(lines: &[Line], width: u16) -> u16 {
    let width = width.max(1) as usize;
    let total: usize = lines
        .iter()
        .map(|line| line.width().max(1).div_ceil(width))
        .sum();
    total.min(u16::MAX as usize) as u16
}

pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();

    // Main layout: header, body, footer
    let [header_area, body_area, footer_area] = Layout::vertical([
        Constraint::Length(1),
        Constraint::Min(0),
        Constraint::Length(1),
    ])
    .areas(area);

    // Recipe display on the left, chat on the right
    let [recipe_area, chat_area] =
        Layout::horizontal([Constraint::Percentage(50), Constraint::Percentage(50)])
            .areas(body_area);

    render_header(app, frame, header_area);
    render_recipe(app, frame, recipe_area);
    render_chat(app, frame, chat_area);
    render_footer(app, frame, footer_area);
}

fn render_header(app: &App, frame: &mut Frame, area: Rect) {
    let (badge, badge_color) = match app.connection {
        ConnectionState::Checking => ("● checking", Color::Yellow),
        ConnectionState::Online => ("● online", Color::Green),
        ConnectionState::Offline => ("● offline", Color::Red),
    };

    let title = Line::from(vec![
        Span::styled(" Pantry Chef ", Style::default().fg(ACCENT).bold()),
        Span::styled(badge, Style::default().fg(badge_color)),
        Span::styled(
            format!("  {}", app.client.base_url()),
            Style::default().fg(Color::Gray),
        ),
        Span::raw(" "),
        Span::styled(
            format!("v{}", env!("CARGO_PKG_VERSION")),
            Style::default().fg(Color::Gray),
        ),
    ]);

    let header = Paragraph::new(title).style(Style::default().bg(Color::DarkGray));
    frame.render_widget(header, area);
}

fn render_footer(app: &App, frame: &mut Frame, area: Rect) {
    let (mode_text, mode_style) = match app.input_mode {
        InputMode::Normal => (" NORMAL ", Style::default().bg(Color::Blue).fg(Color::White)),
        InputMode::Editing => (" EDIT ", Style::default().bg(Color::Yellow).fg(Color::Black)),
    };

    // Key style: dark background with bright text for visibility on both light/dark terminals
    let key_style = Style::default().bg(Color::DarkGray).fg(Color::White);
    let label_style = Style::default().bg(Color::Black).fg(Color::White);

    let hint = |key: &'static str, label: &'static str| {
        [
            Span::styled(format!(" {} ", key), key_style),
            Span::styled(format!(" {} ", label), label_style),
        ]
    };

    let mut spans = vec![Span::styled(mode_text, mode_style), Span::styled(" ", label_style)];
    match app.input_mode {
        InputMode::Editing => {
            spans.extend(hint("Enter", "generate"));
            spans.extend(hint("Esc", "browse"));
            spans.extend(hint("Ctrl-R", "reconnect"));
            spans.extend(hint("Ctrl-C", "quit"));
        }
        InputMode::Normal => {
            spans.extend(hint("i", "type"));
            spans.extend(hint("Tab", "focus"));
            spans.extend(hint("j/k", "scroll"));
            spans.extend(hint("c", "copy recipe"));
            spans.extend(hint("r", "reconnect"));
            spans.extend(hint("q", "quit"));
        }
    }

    if let Some(status) = &app.status {
        spans.push(Span::styled(
            format!(" {}", status),
            Style::default().fg(Color::Yellow).bg(Color::Black),
        ));
    }

    let footer = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    frame.render_widget(footer, area);
}

/// Empty-state shown before the first recipe arrives
fn placeholder_lines() -> Vec<Line<'static>> {
    vec![
        Line::default(),
        Line::default(),
        Line::from(Span::styled(
            "Make Your Recipe",
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(Span::styled(
            "Tell the chef what you have → Get magic here",
            Style::default().fg(Color::DarkGray),
        )),
    ]
}

pub(crate) fn recipe_lines(recipe: &ParsedRecipe) -> Vec<Line<'static>> {
    let heading = Style::default().add_modifier(Modifier::BOLD | Modifier::UNDERLINED);
    let label = Style::default().fg(Color::DarkGray);

    let mut lines = vec![
        Line::from(Span::styled(
            recipe.title.clone(),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )),
        Line::default(),
        Line::from(vec![
            Span::styled(recipe.time.clone(), Style::default().bold()),
            Span::styled("  ·  ", label),
            Span::styled(recipe.servings.clone(), Style::default().bold()),
        ]),
        Line::default(),
        Line::from(Span::styled("Ingredients", heading)),
    ];

    if recipe.ingredients.is_empty() {
        lines.push(Line::from(Span::styled(
            "  (none listed)",
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }
    for ingredient in &recipe.ingredients {
        lines.push(Line::from(vec![
            Span::styled("  • ", Style::default().fg(ACCENT)),
            Span::styled(ingredient.name.clone(), Style::default().bold()),
            Span::styled(format!(" — {}", ingredient.quantity), label),
        ]));
    }

    lines.push(Line::default());
    lines.push(Line::from(Span::styled("Instructions", heading)));
    for (i, step) in recipe.steps.iter().enumerate() {
        lines.push(Line::from(vec![
            Span::styled(format!("{:>3}. ", i + 1), Style::default().fg(ACCENT).bold()),
            Span::raw(step.clone()),
        ]));
        lines.push(Line::default());
    }

    lines
}

fn render_recipe(app: &mut App, frame: &mut Frame, area: Rect) {
    let focused = app.focus == FocusPane::Recipe && app.input_mode == InputMode::Normal;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" Recipe ");

    let inner_area = block.inner(area);
    app.recipe_area = Some(area);
    app.recipe_height = inner_area.height;

    let Some(recipe) = &app.recipe else {
        app.total_recipe_lines = 0;
        let placeholder = Paragraph::new(placeholder_lines())
            .alignment(Alignment::Center)
            .block(block);
        frame.render_widget(placeholder, area);
        return;
    };

    let lines = recipe_lines(recipe);
    app.total_recipe_lines = wrapped_height(&lines, inner_area.width);
    app.recipe_scroll = app
        .recipe_scroll
        .min(app.total_recipe_lines.saturating_sub(app.recipe_height));

    let paragraph = Paragraph::new(lines)
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.recipe_scroll, 0));
    frame.render_widget(paragraph, area);

    if app.total_recipe_lines > app.recipe_height {
        let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
            .begin_symbol(Some("^"))
            .end_symbol(Some("v"));
        let mut scrollbar_state = ScrollbarState::new(app.total_recipe_lines as usize)
            .position(app.recipe_scroll as usize);

        frame.render_stateful_widget(
            scrollbar,
            area.inner(Margin {
                vertical: 1,
                horizontal: 0,
            }),
            &mut scrollbar_state,
        );
    }
}

pub(crate) fn chat_lines(app: &App) -> Vec<Line<'static>> {
    let mut lines: Vec<Line<'static>> = Vec::new();

    for msg in &app.messages {
        let role_style = match msg.role {
            ChatRole::User => Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
            ChatRole::Assistant => Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        };
        lines.push(Line::from(vec![
            Span::styled(format!("{}:", msg.role.label()), role_style),
            Span::styled(
                format!(" {}", msg.timestamp.format("%H:%M")),
                Style::default().fg(Color::DarkGray),
            ),
        ]));

        for line in msg.text.lines() {
            match msg.role {
                ChatRole::User => lines.push(Line::from(line.to_string())),
                ChatRole::Assistant => lines.push(render_inline_bold(line)),
            }
        }
        lines.push(Line::default());
    }

    if app.busy {
        lines.push(Line::from(Span::styled(
            format!("{}:", ChatRole::Assistant.label()),
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )));
        // Animated ellipsis: cycles through ".", "..", "..."
        let dots = ".".repeat((app.animation_frame as usize) + 1);
        lines.push(Line::from(Span::styled(
            format!("Chef is cooking{}", dots),
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::ITALIC),
        )));
    }

    lines
}

fn render_chat(app: &mut App, frame: &mut Frame, area: Rect) {
    let [history_area, input_area] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(3)]).areas(area);

    app.chat_area = Some(history_area);
    app.chat_height = history_area.height.saturating_sub(2);
    app.chat_width = history_area.width.saturating_sub(2);

    let focused = app.focus == FocusPane::Chat && app.input_mode == InputMode::Normal;
    let border_color = if focused { Color::Cyan } else { Color::DarkGray };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(" AI Recipe Assistant ");

    let paragraph = Paragraph::new(Text::from(chat_lines(app)))
        .block(block)
        .wrap(Wrap { trim: false })
        .scroll((app.chat_scroll, 0));
    frame.render_widget(paragraph, history_area);

    render_input(app, frame, input_area);
}

fn render_input(app: &App, frame: &mut Frame, area: Rect) {
    let editing = app.input_mode == InputMode::Editing;

    let (title, border_color) = if app.busy {
        (" Cooking... ", Color::DarkGray)
    } else if app.connection == ConnectionState::Offline {
        (" Chef offline · Ctrl-R to reconnect ", Color::Red)
    } else if editing {
        (" Ingredients · Enter to generate ", Color::Yellow)
    } else {
        (" Ingredients ", Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(border_color))
        .title(title);

    let content = if app.input.is_empty() {
        Span::styled(INPUT_PLACEHOLDER, Style::default().fg(Color::DarkGray))
    } else {
        Span::styled(app.input.clone(), Style::default().fg(Color::White))
    };

    frame.render_widget(Paragraph::new(Line::from(content)).block(block), area);

    if editing && !app.busy {
        let max_x = area.width.saturating_sub(2);
        let offset = (app.input_cursor as u16).min(max_x);
        frame.set_cursor_position((area.x + 1 + offset, area.y + 1));
    }
}

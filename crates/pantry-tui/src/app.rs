use anyhow::{anyhow, Result};
use ratatui::layout::Rect;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use pantry_core::state::{EMPTY_INGREDIENTS_MESSAGE, OFFLINE_MESSAGE, WELCOME_MESSAGE};
use pantry_core::{
    parse_ingredients, parse_recipe, BackendClient, ChatMessage, ChatRole, ConnectionState,
    ParsedRecipe,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusPane {
    Recipe,
    Chat,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub focus: FocusPane,

    // Chat state
    pub messages: Vec<ChatMessage>,
    next_message_id: u64,
    pub input: String,
    pub input_cursor: usize, // char index into `input`
    pub busy: bool,
    pub chat_scroll: u16,
    pub chat_height: u16, // inner size of the history pane, set at render
    pub chat_width: u16,
    pub request_task: Option<JoinHandle<Result<String>>>,

    // Backend state
    pub client: BackendClient,
    pub connection: ConnectionState,
    pub health_task: Option<JoinHandle<bool>>,

    // Recipe display state
    pub recipe: Option<ParsedRecipe>,
    pub recipe_scroll: u16,
    pub recipe_height: u16,
    pub total_recipe_lines: u16,

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    /// One-line notice shown in the footer
    pub status: Option<String>,

    // Panel areas for mouse hit-testing (updated during render)
    pub recipe_area: Option<Rect>,
    pub chat_area: Option<Rect>,
}

impl App {
    pub fn new(client: BackendClient) -> Self {
        let mut app = Self {
            should_quit: false,
            input_mode: InputMode::Editing,
            focus: FocusPane::Chat,

            messages: Vec::new(),
            next_message_id: 1,
            input: String::new(),
            input_cursor: 0,
            busy: false,
            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,
            request_task: None,

            client,
            connection: ConnectionState::default(),
            health_task: None,

            recipe: None,
            recipe_scroll: 0,
            recipe_height: 0,
            total_recipe_lines: 0,

            animation_frame: 0,
            status: None,

            recipe_area: None,
            chat_area: None,
        };
        app.push_message(ChatRole::Assistant, WELCOME_MESSAGE);
        app
    }

    pub fn push_message(&mut self, role: ChatRole, text: impl Into<String>) {
        let id = self.next_message_id;
        self.next_message_id += 1;
        self.messages.push(ChatMessage::new(id, role, text));
        self.scroll_chat_to_bottom();
    }

    pub fn can_send(&self) -> bool {
        !self.busy && self.connection.can_send() && !self.input.trim().is_empty()
    }

    /// Move the input into the conversation and return the ingredients to
    /// request, or `None` when nothing should go to the backend.
    pub fn submit(&mut self) -> Option<Vec<String>> {
        let text = self.input.trim().to_string();
        if text.is_empty() {
            return None;
        }
        if self.busy {
            self.status = Some("The chef is still cooking...".to_string());
            return None;
        }
        if !self.connection.can_send() {
            self.status = Some("Chef is offline. Press Ctrl-R to reconnect.".to_string());
            return None;
        }

        self.push_message(ChatRole::User, text.clone());
        self.input.clear();
        self.input_cursor = 0;
        self.status = None;

        let ingredients = parse_ingredients(&text);
        if ingredients.is_empty() {
            self.push_message(ChatRole::Assistant, EMPTY_INGREDIENTS_MESSAGE);
            return None;
        }

        self.busy = true;
        self.animation_frame = 0;
        // Keep "Chef is cooking..." in view
        self.scroll_chat_to_bottom();
        Some(ingredients)
    }

    /// Submit the input and start the recipe request in the background.
    pub fn send(&mut self) {
        if let Some(ingredients) = self.submit() {
            info!(ingredients = %ingredients.join(", "), "requesting recipe");
            let client = self.client.clone();
            self.request_task = Some(tokio::spawn(async move {
                client.generate_recipe(&ingredients).await
            }));
        }
    }

    /// Start a health check unless one is already running.
    pub fn check_connection(&mut self) {
        if self.health_task.is_some() {
            return;
        }
        self.connection = ConnectionState::Checking;
        self.status = Some(format!("Checking {}...", self.client.base_url()));
        let client = self.client.clone();
        self.health_task = Some(tokio::spawn(async move { client.is_available().await }));
    }

    pub fn set_connection(&mut self, available: bool) {
        self.connection = ConnectionState::from_available(available);
        self.status = Some(if available {
            "The chef is in the kitchen.".to_string()
        } else {
            "Chef is offline. Press Ctrl-R to reconnect.".to_string()
        });
        debug!(state = self.connection.label(), "connection state changed");
    }

    /// Apply the outcome of a recipe request.
    pub fn complete_request(&mut self, result: Result<String>) {
        self.busy = false;
        match result {
            Ok(raw) => {
                let recipe = parse_recipe(&raw);
                info!(title = %recipe.title, steps = recipe.steps.len(), "recipe received");
                self.recipe = Some(recipe);
                self.recipe_scroll = 0;
                self.connection = ConnectionState::Online;
                self.status = None;
                self.push_message(ChatRole::Assistant, raw);
            }
            Err(e) => {
                warn!(error = %e, "recipe request failed");
                self.connection = ConnectionState::Offline;
                self.status = Some("Chef is offline. Press Ctrl-R to reconnect.".to_string());
                self.push_message(ChatRole::Assistant, OFFLINE_MESSAGE);
            }
        }
    }

    /// Collect any background task that has finished since the last call.
    pub async fn poll_tasks(&mut self) {
        if self.request_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.request_task.take() {
                let result = task
                    .await
                    .unwrap_or_else(|e| Err(anyhow!("recipe task did not complete: {}", e)));
                self.complete_request(result);
            }
        }

        if self.health_task.as_ref().is_some_and(|t| t.is_finished()) {
            if let Some(task) = self.health_task.take() {
                let available = task.await.unwrap_or(false);
                self.set_connection(available);
            }
        }
    }

    /// Tick animation frame (called by Tick event)
    pub fn tick_animation(&mut self) {
        if self.busy {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            FocusPane::Recipe => FocusPane::Chat,
            FocusPane::Chat => FocusPane::Recipe,
        };
    }

    /// Plain-text copy of the current recipe
    pub fn recipe_text(&self) -> Option<String> {
        self.recipe.as_ref().map(|r| r.to_string())
    }

    // Scrolling

    fn max_recipe_scroll(&self) -> u16 {
        self.total_recipe_lines.saturating_sub(self.recipe_height)
    }

    fn max_chat_scroll(&self) -> u16 {
        self.chat_line_count().saturating_sub(self.visible_chat_height())
    }

    pub fn scroll_recipe_by(&mut self, delta: i32) {
        self.recipe_scroll = apply_delta(self.recipe_scroll, delta, self.max_recipe_scroll());
    }

    pub fn scroll_chat_by(&mut self, delta: i32) {
        self.chat_scroll = apply_delta(self.chat_scroll, delta, self.max_chat_scroll());
    }

    pub fn scroll_focused_by(&mut self, delta: i32) {
        match self.focus {
            FocusPane::Recipe => self.scroll_recipe_by(delta),
            FocusPane::Chat => self.scroll_chat_by(delta),
        }
    }

    pub fn half_page(&self) -> i32 {
        let height = match self.focus {
            FocusPane::Recipe => self.recipe_height,
            FocusPane::Chat => self.visible_chat_height(),
        };
        (height / 2).max(1) as i32
    }

    pub fn scroll_focused_to_top(&mut self) {
        match self.focus {
            FocusPane::Recipe => self.recipe_scroll = 0,
            FocusPane::Chat => self.chat_scroll = 0,
        }
    }

    pub fn scroll_focused_to_bottom(&mut self) {
        match self.focus {
            FocusPane::Recipe => self.recipe_scroll = self.max_recipe_scroll(),
            FocusPane::Chat => self.scroll_chat_to_bottom(),
        }
    }

    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.max_chat_scroll();
    }

    fn visible_chat_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    /// Rendered height of the chat history, mirroring `ui::chat_lines`.
    pub fn chat_line_count(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total: usize = 0;
        for msg in &self.messages {
            total += 1; // role and time
            for line in msg.text.lines() {
                let chars = line.chars().count();
                total += if chars == 0 { 1 } else { chars.div_ceil(wrap_width) };
            }
            total += 1; // blank separator
        }
        if self.busy {
            total += 2; // "Chef:" + "Chef is cooking..."
        }
        total.min(u16::MAX as usize) as u16
    }
}

fn apply_delta(current: u16, delta: i32, max: u16) -> u16 {
    let next = (current as i32 + delta).clamp(0, max as i32);
    next as u16
}

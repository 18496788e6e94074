use ratatui::layout::Rect;
use terp_core::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Editing,
}

pub struct App {
    // Core state
    pub should_quit: bool,
    pub input_mode: InputMode,
    pub session: Session,
    pub api_url: String,

    // Chat input
    pub input: String,
    pub input_cursor: usize, // cursor position in input, in chars

    // Chat view
    pub chat_scroll: u16,
    pub chat_height: u16, // Height of chat area for scroll calculations
    pub chat_width: u16,  // Width of chat area for wrap calculations

    // Animation state
    pub animation_frame: u8, // 0-2 for ellipsis animation

    // Panel areas for mouse hit-testing (updated during render)
    pub chat_area: Option<Rect>,
    pub quick_reply_areas: [Option<Rect>; 2],
    pub fact_area: Option<Rect>,
}

impl App {
    pub fn new(session: Session, api_url: String) -> Self {
        Self {
            should_quit: false,
            input_mode: InputMode::Normal,
            session,
            api_url,

            input: String::new(),
            input_cursor: 0,

            chat_scroll: 0,
            chat_height: 0,
            chat_width: 0,

            animation_frame: 0,

            chat_area: None,
            quick_reply_areas: [None, None],
            fact_area: None,
        }
    }

    /// The input box is disabled while a reply is pending or the backend is down
    pub fn input_enabled(&self) -> bool {
        self.session.state().accepts_input()
    }

    pub fn start_editing(&mut self) {
        if self.input_enabled() {
            self.input_mode = InputMode::Editing;
        }
    }

    /// Submit the input box. The text is kept if the session refused it.
    pub fn submit_input(&mut self) {
        if !self.input_enabled() || self.input.trim().is_empty() {
            return;
        }

        if self.session.submit(&self.input) {
            self.input.clear();
            self.input_cursor = 0;
            self.input_mode = InputMode::Normal;
            self.scroll_chat_to_bottom();
        }
    }

    pub fn select_quick_reply(&mut self, slot: usize) {
        if !self.session.quick_replies_visible() {
            return;
        }
        if self.session.select_quick_reply(slot) {
            self.scroll_chat_to_bottom();
        }
    }

    /// Refresh is disabled while a fetch is outstanding
    pub fn refresh_fact(&mut self) {
        if !self.session.is_loading_fact() {
            self.session.refresh_fact();
        }
    }

    /// Called by Tick event
    pub async fn on_tick(&mut self) {
        self.tick_animation();
        if self.session.poll().await {
            self.scroll_chat_to_bottom();
        }
    }

    pub fn tick_animation(&mut self) {
        if self.session.state().is_loading() || self.session.is_loading_fact() {
            self.animation_frame = (self.animation_frame + 1) % 3;
        }
    }

    // Input editing (cursor is a char index, not a byte index)
    pub fn insert_char(&mut self, c: char) {
        let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
        self.input.insert(byte_pos, c);
        self.input_cursor += 1;
    }

    pub fn delete_back(&mut self) {
        if self.input_cursor > 0 {
            self.input_cursor -= 1;
            let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn delete_forward(&mut self) {
        if self.input_cursor < self.input.chars().count() {
            let byte_pos = char_to_byte_index(&self.input, self.input_cursor);
            self.input.remove(byte_pos);
        }
    }

    pub fn cursor_left(&mut self) {
        self.input_cursor = self.input_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        self.input_cursor = (self.input_cursor + 1).min(self.input.chars().count());
    }

    pub fn cursor_home(&mut self) {
        self.input_cursor = 0;
    }

    pub fn cursor_end(&mut self) {
        self.input_cursor = self.input.chars().count();
    }

    // Chat scrolling
    pub fn scroll_down(&mut self, lines: u16) {
        let max_scroll = self.chat_line_count().saturating_sub(self.visible_height());
        self.chat_scroll = self.chat_scroll.saturating_add(lines).min(max_scroll);
    }

    pub fn scroll_up(&mut self, lines: u16) {
        self.chat_scroll = self.chat_scroll.saturating_sub(lines);
    }

    pub fn scroll_to_top(&mut self) {
        self.chat_scroll = 0;
    }

    /// Scroll chat to bottom so the latest message (or "Thinking...") is visible
    pub fn scroll_chat_to_bottom(&mut self) {
        self.chat_scroll = self.chat_line_count().saturating_sub(self.visible_height());
    }

    fn visible_height(&self) -> u16 {
        if self.chat_height > 0 {
            self.chat_height
        } else {
            20
        }
    }

    /// Rendered line count of the chat pane, mirroring the layout in ui.rs
    fn chat_line_count(&self) -> u16 {
        // Use actual chat width for wrap calculation, default to 50 if not set
        let wrap_width = if self.chat_width > 0 {
            self.chat_width as usize
        } else {
            50
        };

        let mut total_lines: u16 = 0;

        for msg in self.session.state().messages() {
            total_lines = total_lines.saturating_add(1); // Role line ("You" or "Terp")
            for line in msg.content().lines() {
                // Use character count, not byte length, for proper UTF-8 handling
                let char_count = line.chars().count();
                let wrapped = u16::try_from(char_count / wrap_width + 1).unwrap_or(u16::MAX);
                total_lines = total_lines.saturating_add(wrapped);
            }
            total_lines = total_lines.saturating_add(1); // Blank line after message
        }

        if self.session.state().is_loading() {
            total_lines = total_lines.saturating_add(2); // Role line + "Thinking..."
        }

        total_lines
    }
}

/// Convert a character index to a byte index for UTF-8 safe string operations
fn char_to_byte_index(s: &str, char_idx: usize) -> usize {
    s.char_indices()
        .nth(char_idx)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

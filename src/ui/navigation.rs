use crate::policy::DnsMode;
use crate::rows::{self, Row};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

const LISTING_HINT_TEXT: &str =
    "Up/Down move | Space toggle | Left/Right DNS mode | Tab buttons | q quit";
const BUTTONS_HINT_TEXT: &str = "Left/Right choose | Enter activate | Tab/Up list | q quit";
const PROMPT_HINT_TEXT: &str = "Enter confirm | Esc cancel";
const CONFIRM_HINT_TEXT: &str = "Enter reset | any other key cancel";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    Import,
    Export,
    Apply,
    Reset,
    Quit,
}

pub const ALL_BUTTONS: [Button; 5] = [
    Button::Import,
    Button::Export,
    Button::Apply,
    Button::Reset,
    Button::Quit,
];

impl Button {
    pub fn label(self) -> &'static str {
        match self {
            Button::Import => "Import",
            Button::Export => "Export",
            Button::Apply => "Apply",
            Button::Reset => "Reset",
            Button::Quit => "Quit",
        }
    }

    fn position(self) -> usize {
        match self {
            Button::Import => 0,
            Button::Export => 1,
            Button::Apply => 2,
            Button::Reset => 3,
            Button::Quit => 4,
        }
    }

    pub fn next(self) -> Self {
        ALL_BUTTONS[(self.position() + 1) % ALL_BUTTONS.len()]
    }

    pub fn prev(self) -> Self {
        ALL_BUTTONS[(self.position() + ALL_BUTTONS.len() - 1) % ALL_BUTTONS.len()]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Listing,
    ButtonBar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptPurpose {
    TemplateUrl,
    ImportPath,
    ExportPath,
    ConfirmReset,
}

impl PromptPurpose {
    pub fn title(self) -> &'static str {
        match self {
            PromptPurpose::TemplateUrl => "DNS over HTTPS template",
            PromptPurpose::ImportPath => "Import configuration",
            PromptPurpose::ExportPath => "Export configuration",
            PromptPurpose::ConfirmReset => "Reset",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            PromptPurpose::TemplateUrl => "Template URL (https://..., empty to clear):",
            PromptPurpose::ImportPath => "Path of the config file to import:",
            PromptPurpose::ExportPath => "Path to write the exported config to:",
            PromptPurpose::ConfirmReset => "Reset all settings?",
        }
    }

    /// Whether the prompt collects text. A reset confirmation only waits for
    /// one key.
    pub fn takes_input(self) -> bool {
        !matches!(self, PromptPurpose::ConfirmReset)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub purpose: PromptPurpose,
    pub buffer: String,
    pub return_to: Zone,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Focus {
    Listing,
    ButtonBar,
    Prompting(Prompt),
}

impl Focus {
    fn as_str(&self) -> &'static str {
        match self {
            Focus::Listing => "listing",
            Focus::ButtonBar => "button_bar",
            Focus::Prompting(_) => "prompting",
        }
    }

    fn from_zone(zone: Zone) -> Self {
        match zone {
            Zone::Listing => Focus::Listing,
            Zone::ButtonBar => Focus::ButtonBar,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavAction {
    Up,
    Down,
    Left,
    Right,
    Toggle,
    SwitchZone,
    Activate,
    Quit,
    Input(char),
    Backspace,
    Confirm,
    Cancel,
    Viewport(usize),
}

impl NavAction {
    fn as_str(self) -> &'static str {
        match self {
            NavAction::Up => "up",
            NavAction::Down => "down",
            NavAction::Left => "left",
            NavAction::Right => "right",
            NavAction::Toggle => "toggle",
            NavAction::SwitchZone => "switch_zone",
            NavAction::Activate => "activate",
            NavAction::Quit => "quit",
            NavAction::Input(_) => "input",
            NavAction::Backspace => "backspace",
            NavAction::Confirm => "confirm",
            NavAction::Cancel => "cancel",
            NavAction::Viewport(_) => "viewport",
        }
    }
}

/// Work the session must carry out after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavEffect {
    None,
    Apply,
    Reset,
    Import(String),
    Export(String),
    UpdateTemplate(String),
    Quit,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavTransition {
    pub effect: NavEffect,
    pub feedback: Option<String>,
}

impl NavTransition {
    fn no_op(feedback: Option<String>) -> Self {
        Self {
            effect: NavEffect::None,
            feedback,
        }
    }

    fn effect(effect: NavEffect) -> Self {
        Self {
            effect,
            feedback: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NavError {
    InvalidTransition {
        focus: &'static str,
        action: NavAction,
    },
}

impl std::fmt::Display for NavError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NavError::InvalidTransition { focus, action } => {
                write!(
                    f,
                    "invalid transition: focus={} action={}",
                    focus,
                    action.as_str()
                )
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavState {
    pub focus: Focus,
    pub cursor_row: usize,
    pub scroll_offset: usize,
    pub viewport_height: usize,
    pub button: Button,
}

impl NavState {
    pub fn new(rows: &[Row], viewport_height: usize) -> Self {
        let mut state = Self {
            focus: Focus::Listing,
            cursor_row: 0,
            scroll_offset: 0,
            viewport_height: viewport_height.max(1),
            button: Button::Import,
        };
        state.reconcile(rows);
        state
    }

    /// Zone the user is working in; a prompt reports the zone it returns to.
    pub fn zone(&self) -> Zone {
        match &self.focus {
            Focus::Listing => Zone::Listing,
            Focus::ButtonBar => Zone::ButtonBar,
            Focus::Prompting(prompt) => prompt.return_to,
        }
    }

    pub fn prompt(&self) -> Option<&Prompt> {
        match &self.focus {
            Focus::Prompting(prompt) => Some(prompt),
            Focus::Listing | Focus::ButtonBar => None,
        }
    }

    pub fn hint_text(&self) -> &'static str {
        match &self.focus {
            Focus::Listing => LISTING_HINT_TEXT,
            Focus::ButtonBar => BUTTONS_HINT_TEXT,
            Focus::Prompting(prompt) if !prompt.purpose.takes_input() => CONFIRM_HINT_TEXT,
            Focus::Prompting(_) => PROMPT_HINT_TEXT,
        }
    }

    /// Moves the cursor onto a selectable row and scrolls it into view. Rows
    /// can become unselectable when the DNS template row hides.
    pub fn reconcile(&mut self, rows: &[Row]) {
        let selectable = rows::selectable_indices(rows);
        if !selectable.contains(&self.cursor_row) {
            self.cursor_row = selectable
                .iter()
                .rev()
                .find(|idx| **idx < self.cursor_row)
                .or_else(|| selectable.first())
                .copied()
                .unwrap_or(0);
        }
        self.ensure_cursor_visible(rows);
    }

    fn ensure_cursor_visible(&mut self, rows: &[Row]) {
        let height = self.viewport_height.max(1);
        let cursor = self.cursor_row;
        if cursor < self.scroll_offset {
            self.scroll_offset = cursor;
        }
        if cursor >= self.scroll_offset + height {
            self.scroll_offset = cursor + 1 - height;
        }
        if height > 1
            && cursor > 0
            && cursor - 1 < self.scroll_offset
            && matches!(rows.get(cursor - 1), Some(Row::Header { .. }))
        {
            self.scroll_offset = cursor - 1;
        }
        let max_offset = rows::visible_len(rows).saturating_sub(height);
        self.scroll_offset = self.scroll_offset.min(max_offset);
    }

    fn cursor_position(&self, selectable: &[usize]) -> Option<usize> {
        selectable.iter().position(|idx| *idx == self.cursor_row)
    }

    fn open_prompt(&mut self, purpose: PromptPurpose, seed: &str) {
        let return_to = self.zone();
        self.focus = Focus::Prompting(Prompt {
            purpose,
            buffer: seed.to_string(),
            return_to,
        });
    }
}

pub fn action_from_key(focus: &Focus, key: KeyEvent) -> Option<NavAction> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    if let Focus::Prompting(prompt) = focus {
        if !prompt.purpose.takes_input() {
            return match key.code {
                KeyCode::Enter | KeyCode::Char('\n') | KeyCode::Char('\r') => {
                    Some(NavAction::Confirm)
                }
                _ => Some(NavAction::Cancel),
            };
        }
        return match key.code {
            KeyCode::Char('c') if control => Some(NavAction::Cancel),
            KeyCode::Esc => Some(NavAction::Cancel),
            KeyCode::Enter | KeyCode::Char('\n') | KeyCode::Char('\r') => {
                Some(NavAction::Confirm)
            }
            KeyCode::Backspace => Some(NavAction::Backspace),
            KeyCode::Char(ch) if !control => Some(NavAction::Input(ch)),
            _ => None,
        };
    }
    if key.code == KeyCode::Char('c') && control {
        return Some(NavAction::Quit);
    }
    match key.code {
        KeyCode::Up | KeyCode::Char('k') => Some(NavAction::Up),
        KeyCode::Down | KeyCode::Char('j') => Some(NavAction::Down),
        KeyCode::Left | KeyCode::Char('h') => Some(NavAction::Left),
        KeyCode::Right | KeyCode::Char('l') => Some(NavAction::Right),
        KeyCode::Char(' ') => Some(NavAction::Toggle),
        KeyCode::Enter | KeyCode::Char('\n') | KeyCode::Char('\r') => Some(NavAction::Activate),
        KeyCode::Tab | KeyCode::BackTab => Some(NavAction::SwitchZone),
        KeyCode::Esc | KeyCode::Char('q') => Some(NavAction::Quit),
        _ => None,
    }
}

/// Parses `SLIMBRAVE_SCRIPT_KEYS`: comma-separated key names plus
/// `type:<text>` for literal characters.
pub fn parse_scripted_keys(raw: &str) -> Result<Vec<KeyEvent>, String> {
    let mut keys = Vec::new();
    for token in raw.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        if let Some(text) = token.strip_prefix("type:") {
            keys.extend(
                text.chars()
                    .map(|ch| KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE)),
            );
            continue;
        }
        let key = match token.to_ascii_lowercase().as_str() {
            "up" => KeyEvent::new(KeyCode::Up, KeyModifiers::NONE),
            "down" => KeyEvent::new(KeyCode::Down, KeyModifiers::NONE),
            "left" => KeyEvent::new(KeyCode::Left, KeyModifiers::NONE),
            "right" => KeyEvent::new(KeyCode::Right, KeyModifiers::NONE),
            "tab" => KeyEvent::new(KeyCode::Tab, KeyModifiers::NONE),
            "enter" => KeyEvent::new(KeyCode::Enter, KeyModifiers::NONE),
            "space" => KeyEvent::new(KeyCode::Char(' '), KeyModifiers::NONE),
            "esc" => KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE),
            "backspace" => KeyEvent::new(KeyCode::Backspace, KeyModifiers::NONE),
            "q" => KeyEvent::new(KeyCode::Char('q'), KeyModifiers::NONE),
            "ctrl-c" => KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
            other => {
                return Err(format!(
                    "invalid SLIMBRAVE_SCRIPT_KEYS token `{other}`; valid tokens: up,down,left,right,tab,enter,space,esc,backspace,q,ctrl-c,type:<text>"
                ));
            }
        };
        keys.push(key);
    }
    Ok(keys)
}

pub fn transition(
    state: &mut NavState,
    rows: &mut [Row],
    action: NavAction,
) -> Result<NavTransition, NavError> {
    if let NavAction::Viewport(height) = action {
        state.viewport_height = height.max(1);
        state.reconcile(rows);
        return Ok(NavTransition::no_op(None));
    }

    let result = match state.focus.clone() {
        Focus::Listing => listing_transition(state, rows, action),
        Focus::ButtonBar => button_bar_transition(state, rows, action),
        Focus::Prompting(prompt) => prompting_transition(state, prompt, action),
    };
    state.reconcile(rows);
    result
}

fn invalid(state: &NavState, action: NavAction) -> Result<NavTransition, NavError> {
    Err(NavError::InvalidTransition {
        focus: state.focus.as_str(),
        action,
    })
}

fn listing_transition(
    state: &mut NavState,
    rows: &mut [Row],
    action: NavAction,
) -> Result<NavTransition, NavError> {
    let selectable = rows::selectable_indices(rows);
    match action {
        NavAction::Up => {
            if let Some(pos) = state.cursor_position(&selectable) {
                if pos > 0 {
                    state.cursor_row = selectable[pos - 1];
                }
            }
            Ok(NavTransition::no_op(None))
        }
        NavAction::Down => {
            match state.cursor_position(&selectable) {
                Some(pos) if pos + 1 < selectable.len() => {
                    state.cursor_row = selectable[pos + 1];
                }
                _ => {
                    state.focus = Focus::ButtonBar;
                    state.button = Button::Import;
                }
            }
            Ok(NavTransition::no_op(None))
        }
        NavAction::Left | NavAction::Right => {
            if let Some(Row::DnsMode { mode }) = rows.get(state.cursor_row) {
                let next = if action == NavAction::Left {
                    mode.prev()
                } else {
                    mode.next()
                };
                rows::set_dns_mode(rows, next);
            }
            Ok(NavTransition::no_op(None))
        }
        NavAction::Toggle | NavAction::Activate => toggle_row(state, rows),
        NavAction::SwitchZone => {
            state.focus = Focus::ButtonBar;
            Ok(NavTransition::no_op(None))
        }
        NavAction::Quit => Ok(NavTransition::effect(NavEffect::Quit)),
        NavAction::Input(_) | NavAction::Backspace | NavAction::Confirm | NavAction::Cancel => {
            invalid(state, action)
        }
        NavAction::Viewport(_) => Ok(NavTransition::no_op(None)),
    }
}

fn toggle_row(state: &mut NavState, rows: &mut [Row]) -> Result<NavTransition, NavError> {
    let Some(row) = rows.get_mut(state.cursor_row) else {
        return Ok(NavTransition::no_op(None));
    };
    match row {
        Row::Feature { checked, .. } => {
            *checked = !*checked;
            Ok(NavTransition::no_op(None))
        }
        Row::DnsMode { mode } => {
            let next = mode.next();
            rows::set_dns_mode(rows, next);
            let feedback = (next == DnsMode::Custom)
                .then(|| "Custom DNS selected: edit the template URL below.".to_string());
            Ok(NavTransition::no_op(feedback))
        }
        Row::DnsTemplate { template_url, .. } => {
            let seed = template_url.clone();
            state.open_prompt(PromptPurpose::TemplateUrl, &seed);
            Ok(NavTransition::no_op(None))
        }
        Row::Header { .. } => Ok(NavTransition::no_op(None)),
    }
}

fn button_bar_transition(
    state: &mut NavState,
    rows: &[Row],
    action: NavAction,
) -> Result<NavTransition, NavError> {
    match action {
        NavAction::Left => {
            state.button = state.button.prev();
            Ok(NavTransition::no_op(None))
        }
        NavAction::Right => {
            state.button = state.button.next();
            Ok(NavTransition::no_op(None))
        }
        NavAction::Up => {
            state.focus = Focus::Listing;
            if let Some(last) = rows::selectable_indices(rows).last() {
                state.cursor_row = *last;
            }
            Ok(NavTransition::no_op(None))
        }
        NavAction::SwitchZone => {
            state.focus = Focus::Listing;
            Ok(NavTransition::no_op(None))
        }
        NavAction::Down => Ok(NavTransition::no_op(None)),
        NavAction::Activate | NavAction::Toggle => Ok(match state.button {
            Button::Import => {
                state.open_prompt(PromptPurpose::ImportPath, "");
                NavTransition::no_op(None)
            }
            Button::Export => {
                state.open_prompt(PromptPurpose::ExportPath, "");
                NavTransition::no_op(None)
            }
            Button::Apply => NavTransition::effect(NavEffect::Apply),
            Button::Reset => {
                state.open_prompt(PromptPurpose::ConfirmReset, "");
                NavTransition::no_op(None)
            }
            Button::Quit => NavTransition::effect(NavEffect::Quit),
        }),
        NavAction::Quit => Ok(NavTransition::effect(NavEffect::Quit)),
        NavAction::Input(_) | NavAction::Backspace | NavAction::Confirm | NavAction::Cancel => {
            invalid(state, action)
        }
        NavAction::Viewport(_) => Ok(NavTransition::no_op(None)),
    }
}

fn prompting_transition(
    state: &mut NavState,
    mut prompt: Prompt,
    action: NavAction,
) -> Result<NavTransition, NavError> {
    let action = match action {
        NavAction::Input(_) | NavAction::Backspace if !prompt.purpose.takes_input() => {
            NavAction::Cancel
        }
        other => other,
    };
    match action {
        NavAction::Input(ch) => {
            prompt.buffer.push(ch);
            state.focus = Focus::Prompting(prompt);
            Ok(NavTransition::no_op(None))
        }
        NavAction::Backspace => {
            prompt.buffer.pop();
            state.focus = Focus::Prompting(prompt);
            Ok(NavTransition::no_op(None))
        }
        NavAction::Confirm => {
            state.focus = Focus::Listing;
            let value = prompt.buffer;
            let effect = match prompt.purpose {
                PromptPurpose::TemplateUrl => NavEffect::UpdateTemplate(value.trim().to_string()),
                PromptPurpose::ImportPath => NavEffect::Import(value.trim().to_string()),
                PromptPurpose::ExportPath => NavEffect::Export(value.trim().to_string()),
                PromptPurpose::ConfirmReset => {
                    state.focus = Focus::from_zone(prompt.return_to);
                    NavEffect::Reset
                }
            };
            Ok(NavTransition::effect(effect))
        }
        NavAction::Cancel => {
            state.focus = Focus::from_zone(prompt.return_to);
            Ok(NavTransition::no_op(Some(format!(
                "{} cancelled.",
                prompt.purpose.title()
            ))))
        }
        NavAction::Quit => Ok(NavTransition::effect(NavEffect::Quit)),
        NavAction::Up
        | NavAction::Down
        | NavAction::Left
        | NavAction::Right
        | NavAction::Toggle
        | NavAction::SwitchZone
        | NavAction::Activate => invalid(state, action),
        NavAction::Viewport(_) => Ok(NavTransition::no_op(None)),
    }
}

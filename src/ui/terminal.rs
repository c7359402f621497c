use super::render::{self, fits_terminal, list_viewport_height, MIN_HEIGHT, MIN_WIDTH};
use super::session::{Flow, Session};
use crate::rows;
use crossterm::cursor::{Hide, Show};
use crossterm::event::{self, Event, KeyEvent};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, size, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io::{self, IsTerminal};

/// Viewport assumed when a session is driven by scripted keys.
pub const SCRIPTED_VIEWPORT_HEIGHT: usize = 20;

pub fn is_interactive_terminal() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

/// Runs the full-screen UI until the user quits. Fails before touching the
/// terminal when it is smaller than the minimum layout.
pub fn run_terminal_session(session: &mut Session<'_>) -> Result<(), String> {
    let (width, height) = size().map_err(|e| format!("failed to query terminal size: {e}"))?;
    if !fits_terminal(width, height) {
        return Err(format!(
            "terminal is {width}x{height}; SlimBrave needs at least {MIN_WIDTH}x{MIN_HEIGHT}"
        ));
    }

    let mut stdout = io::stdout();
    enable_raw_mode().map_err(|e| format!("failed to enable raw mode: {e}"))?;
    if let Err(err) = execute!(stdout, EnterAlternateScreen, Hide) {
        let _ = disable_raw_mode();
        return Err(format!("failed to enter terminal screen: {err}"));
    }
    let backend = CrosstermBackend::new(stdout);
    let result = match Terminal::new(backend) {
        Ok(mut terminal) => {
            let result = run_terminal_loop(session, &mut terminal);
            let _ = execute!(terminal.backend_mut(), Show, LeaveAlternateScreen);
            result
        }
        Err(err) => {
            let _ = execute!(io::stdout(), Show, LeaveAlternateScreen);
            Err(format!("failed to create terminal: {err}"))
        }
    };
    disable_raw_mode().map_err(|e| format!("failed to disable raw mode: {e}"))?;
    result
}

fn run_terminal_loop(
    session: &mut Session<'_>,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
) -> Result<(), String> {
    loop {
        if let Ok((_, height)) = size() {
            session.set_viewport(list_viewport_height(height));
        }
        let view = render::project_view(session);
        if let Err(err) = terminal.draw(|frame| render::draw(frame, &view)) {
            session.log().warn("draw", &err.to_string());
        }

        let ev = event::read().map_err(|e| format!("failed to read terminal input: {e}"))?;
        let Event::Key(key) = ev else {
            continue;
        };
        if session.handle_key(key) == Flow::Exit {
            return Ok(());
        }
    }
}

/// Drives a session from a fixed key list without a terminal and describes
/// the final state.
pub fn run_scripted_session(session: &mut Session<'_>, keys: Vec<KeyEvent>) -> String {
    session.set_viewport(SCRIPTED_VIEWPORT_HEIGHT);
    let mut exited = false;
    for key in keys {
        if session.handle_key(key) == Flow::Exit {
            exited = true;
            break;
        }
    }
    let status = session
        .status()
        .map(|status| {
            format!(
                "{}: {}",
                if status.ok { "ok" } else { "error" },
                status.message
            )
        })
        .unwrap_or_else(|| "none".to_string());
    format!(
        "session {}\nchecked={}\ndns_mode={}\nstatus={}",
        if exited { "quit" } else { "ended" },
        rows::checked_count(session.rows()),
        rows::dns_mode(session.rows()),
        status
    )
}

//! Raw-mode terminal on stderr, so stdout stays free for the selection.

use std::io::{self, Stderr};

use crossterm::event::{DisableMouseCapture, EnableMouseCapture};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;

pub type PickerTerminal = Terminal<CrosstermBackend<Stderr>>;

/// Restores the terminal when dropped, including on early returns.
pub struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stderr(), LeaveAlternateScreen, DisableMouseCapture);
    }
}

pub fn setup() -> io::Result<(PickerTerminal, TerminalGuard)> {
    enable_raw_mode()?;
    let guard = TerminalGuard;
    execute!(io::stderr(), EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(io::stderr());
    let terminal = Terminal::new(backend)?;
    Ok((terminal, guard))
}

/// Points stdin at the controlling terminal when it was redirected, so the
/// picker still reads keys inside `$(navgator)` and pipelines.
pub fn ensure_tty_stdin() -> io::Result<()> {
    #[cfg(unix)]
    {
        use std::fs;
        use std::io::IsTerminal;
        use std::os::unix::io::AsRawFd;

        if io::stdin().is_terminal() {
            return Ok(());
        }

        let tty = fs::File::open("/dev/tty")?;
        // SAFETY: both descriptors are valid for the duration of the call.
        let result = unsafe { libc::dup2(tty.as_raw_fd(), libc::STDIN_FILENO) };
        if result == -1 {
            return Err(io::Error::last_os_error());
        }
    }
    Ok(())
}

//! Interactivity probe: is standard input attached to a terminal?

/// True if stdin is a terminal, i.e. nothing is being piped in.
#[cfg(unix)]
pub fn stdin_is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) == 1 }
}

#[cfg(not(unix))]
pub fn stdin_is_tty() -> bool {
    use std::io::IsTerminal;
    std::io::stdin().is_terminal()
}

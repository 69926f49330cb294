// MangaShelf - app/prompt.rs
//
// Confirmation collaborator for destructive actions.

use std::io::{BufRead, Write};

/// Asks the user to approve a destructive action.
pub trait ConfirmPrompt {
    /// Show `message` and return true if the user agreed.
    fn confirm(&mut self, message: &str) -> bool;
}

/// Answers every prompt the same way. Used for `--yes` and in tests.
#[derive(Debug, Clone, Copy)]
pub struct AutoConfirm(pub bool);

impl ConfirmPrompt for AutoConfirm {
    fn confirm(&mut self, message: &str) -> bool {
        tracing::debug!(message, answer = self.0, "Auto-confirmed");
        self.0
    }
}

/// Asks on a terminal: prints to the writer, reads a y/N line from the reader.
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl TerminalPrompt<std::io::StdinLock<'static>, std::io::Stderr> {
    /// Prompt on stderr, read from stdin.
    pub fn stdio() -> Self {
        Self::new(std::io::stdin().lock(), std::io::stderr())
    }
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl<R: BufRead, W: Write> ConfirmPrompt for TerminalPrompt<R, W> {
    /// Anything other than "y"/"yes" (including I/O failure) is a refusal.
    fn confirm(&mut self, message: &str) -> bool {
        if write!(self.output, "{message} [y/N] ").and_then(|_| self.output.flush()).is_err() {
            return false;
        }
        let mut line = String::new();
        match self.input.read_line(&mut line) {
            Ok(_) => matches!(line.trim().to_lowercase().as_str(), "y" | "yes"),
            Err(e) => {
                tracing::warn!(error = %e, "Could not read confirmation; treating as no");
                false
            }
        }
    }
}

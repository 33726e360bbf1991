//! Confirmation prompts before changes are written.

use dialoguer::Confirm as Dialog;
use std::io::{self, BufRead, IsTerminal, Write};

pub trait Confirm {
    fn ask(&mut self, message: &str) -> bool;
}

/// `[y/N]` prompt. Uses an interactive terminal prompt when one is attached;
/// otherwise reads one answer line from stdin, so `echo y | paramsync ...`
/// works. Anything but an explicit yes counts as no.
#[derive(Debug, Default)]
pub struct TerminalConfirm;

impl Confirm for TerminalConfirm {
    fn ask(&mut self, message: &str) -> bool {
        if io::stdin().is_terminal() && io::stderr().is_terminal() {
            match Dialog::new().with_prompt(message).default(false).interact() {
                Ok(answer) => return answer,
                Err(e) => tracing::debug!(error = %e, "Terminal prompt failed; reading stdin"),
            }
        }
        ask_line(message, &mut io::stdin().lock())
    }
}

fn ask_line(message: &str, input: &mut impl BufRead) -> bool {
    eprint!("{} [y/N] ", message);
    let _ = io::stderr().flush();
    let mut line = String::new();
    match input.read_line(&mut line) {
        Ok(_) => is_yes(&line),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read confirmation; treating as no");
            false
        }
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

/// Fixed answer, used for `--yes` and in tests. Counts how often it was asked.
#[derive(Debug, Default)]
pub struct AutoConfirm {
    pub answer: bool,
    pub asked: usize,
}

impl AutoConfirm {
    pub fn new(answer: bool) -> Self {
        Self { answer, asked: 0 }
    }
}

impl Confirm for AutoConfirm {
    fn ask(&mut self, _message: &str) -> bool {
        self.asked += 1;
        self.answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auto_confirm_counts_questions() {
        let mut c = AutoConfirm::new(false);
        assert!(!c.ask("Apply these changes?"));
        assert!(!c.ask("Apply these changes?"));
        assert_eq!(c.asked, 2);
    }

    #[test]
    fn test_line_answers() {
        let mut yes = io::Cursor::new("y\n");
        assert!(ask_line("Apply these changes?", &mut yes));
        let mut upper = io::Cursor::new(" YES \n");
        assert!(ask_line("Apply these changes?", &mut upper));
        let mut no = io::Cursor::new("yeah\n");
        assert!(!ask_line("Apply these changes?", &mut no));
        let mut eof = io::Cursor::new("");
        assert!(!ask_line("Apply these changes?", &mut eof));
        assert!(!is_yes("no"));
    }
}

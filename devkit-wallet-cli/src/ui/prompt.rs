//! Typed prompt requests and their terminal adapter.
//!
//! Business logic decides *what* to ask (a choice among options, a line of
//! input, a password) and issues one of these typed requests; the adapter
//! decides *how* the question is rendered and read. Tests fulfill the same
//! requests from a script, so flows stay testable without a terminal.

use std::io::{self, BufRead, Write};

use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};

/// Error types for prompt interactions
#[derive(Debug, thiserror::Error)]
pub enum PromptError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("input stream closed")]
    Closed,

    #[error("prompt aborted")]
    Aborted,
}

/// Result type for prompt operations
pub type Result<T> = std::result::Result<T, PromptError>;

/// A fulfiller of typed prompt requests.
///
/// Every method blocks until the user supplies input; no flow proceeds on
/// partial input.
pub trait Prompt {
    /// Asks the user to pick one of `options`; returns the chosen index.
    fn select(&mut self, message: &str, options: &[&str]) -> Result<usize>;

    /// Asks for a line of input, falling back to `default` on an empty line.
    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String>;

    /// Asks for a password without echoing it.
    fn password(&mut self, message: &str) -> Result<String>;

    /// Shows a user-visible message (validation feedback, progress notes).
    fn notice(&mut self, message: &str);
}

/// Interactive adapter reading from stdin/stdout.
#[derive(Debug, Default)]
pub struct ConsolePrompt;

impl ConsolePrompt {
    pub fn new() -> Self {
        Self
    }

    fn read_line(&self) -> Result<String> {
        let mut line = String::new();
        let read = io::stdin().lock().read_line(&mut line)?;
        if read == 0 {
            return Err(PromptError::Closed);
        }
        Ok(line.trim().to_string())
    }
}

impl Prompt for ConsolePrompt {
    fn select(&mut self, message: &str, options: &[&str]) -> Result<usize> {
        println!("{message}");
        for (i, option) in options.iter().enumerate() {
            println!("  {}) {option}", i + 1);
        }
        loop {
            print!("Select [1-{}]: ", options.len());
            io::stdout().flush()?;
            match self.read_line()?.parse::<usize>() {
                Ok(n) if (1..=options.len()).contains(&n) => return Ok(n - 1),
                _ => println!("Enter a number between 1 and {}.", options.len()),
            }
        }
    }

    fn input(&mut self, message: &str, default: Option<&str>) -> Result<String> {
        match default {
            Some(default) => print!("{message} [{default}]: "),
            None => print!("{message}: "),
        }
        io::stdout().flush()?;
        let line = self.read_line()?;
        if line.is_empty() {
            if let Some(default) = default {
                return Ok(default.to_string());
            }
        }
        Ok(line)
    }

    fn password(&mut self, message: &str) -> Result<String> {
        print!("{message}: ");
        io::stdout().flush()?;

        enable_raw_mode()?;
        let result = read_password_raw();
        disable_raw_mode()?;
        println!();
        result
    }

    fn notice(&mut self, message: &str) {
        eprintln!("{message}");
    }
}

/// Collects key events until Enter. The terminal must already be in raw mode.
fn read_password_raw() -> Result<String> {
    let mut password = String::new();
    loop {
        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            match key.code {
                KeyCode::Enter => return Ok(password),
                KeyCode::Backspace => {
                    password.pop();
                }
                KeyCode::Esc => return Err(PromptError::Aborted),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                    return Err(PromptError::Aborted);
                }
                KeyCode::Char(c) => password.push(c),
                _ => {}
            }
        }
    }
}

/// Scripted prompt adapter for tests: answers come from pre-loaded queues and
/// every request is counted.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct ScriptedPrompt {
    selections: std::collections::VecDeque<usize>,
    inputs: std::collections::VecDeque<String>,
    passwords: std::collections::VecDeque<String>,
    pub select_requests: usize,
    pub input_requests: usize,
    pub password_requests: usize,
    pub notices: Vec<String>,
}

#[cfg(test)]
impl ScriptedPrompt {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_selections<I: IntoIterator<Item = usize>>(mut self, picks: I) -> Self {
        self.selections.extend(picks);
        self
    }

    pub fn with_inputs<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.inputs.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn with_passwords<I, S>(mut self, passwords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.passwords.extend(passwords.into_iter().map(Into::into));
        self
    }
}

#[cfg(test)]
impl Prompt for ScriptedPrompt {
    fn select(&mut self, _message: &str, options: &[&str]) -> Result<usize> {
        self.select_requests += 1;
        let pick = self.selections.pop_front().ok_or(PromptError::Closed)?;
        assert!(pick < options.len(), "scripted selection out of range");
        Ok(pick)
    }

    fn input(&mut self, _message: &str, default: Option<&str>) -> Result<String> {
        self.input_requests += 1;
        let line = self.inputs.pop_front().ok_or(PromptError::Closed)?;
        if line.is_empty() {
            if let Some(default) = default {
                return Ok(default.to_string());
            }
        }
        Ok(line)
    }

    fn password(&mut self, _message: &str) -> Result<String> {
        self.password_requests += 1;
        self.passwords.pop_front().ok_or(PromptError::Closed)
    }

    fn notice(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

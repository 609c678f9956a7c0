use std::borrow::Cow::{self, Borrowed, Owned};

use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};

pub const RESET_COMMAND: &str = "/reset";
pub const SESSION_COMMAND: &str = "/session";
pub const HELP_COMMAND: &str = "/help";

/// What a line typed at the prompt asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplInput {
    Empty,
    Quit,
    Reset,
    Session,
    Help,
    UnknownCommand(String),
    Message(String),
}

impl ReplInput {
    pub fn parse(line: &str) -> Self {
        let trimmed = line.trim();
        match trimmed {
            "" => Self::Empty,
            "quit" | "exit" => Self::Quit,
            RESET_COMMAND => Self::Reset,
            SESSION_COMMAND => Self::Session,
            HELP_COMMAND => Self::Help,
            command if command.starts_with('/') && !command.contains(' ') => {
                Self::UnknownCommand(command.to_string())
            }
            message => Self::Message(message.to_string()),
        }
    }
}

/// Rustyline helper: slash-command completion, hints and highlighting.
#[derive(Clone)]
pub struct CliHelper {
    commands: Vec<String>,
}

impl CliHelper {
    pub fn new() -> Self {
        Self {
            commands: [RESET_COMMAND, SESSION_COMMAND, HELP_COMMAND]
                .iter()
                .map(|command| command.to_string())
                .collect(),
        }
    }

    fn matching<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a String> + 'a {
        self.commands
            .iter()
            .filter(move |command| prefix.starts_with('/') && command.starts_with(prefix))
    }
}

impl Helper for CliHelper {}

impl Completer for CliHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let candidates = self
            .matching(&line[..pos])
            .map(|command| Pair {
                display: command.clone(),
                replacement: command.clone(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for CliHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if line.starts_with('/') {
            Owned(line.bright_cyan().to_string())
        } else {
            Borrowed(line)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for CliHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.contains(' ') {
            return None;
        }
        self.matching(line)
            .find(|command| command.len() > line.len())
            .map(|command| command[line.len()..].to_string())
    }
}

impl Validator for CliHelper {}

pub fn print_help() {
    println!("{}", "Type a message to ask about your symptoms.".bright_black());
    println!("{}", format!("  {RESET_COMMAND:<10} start a new conversation").bright_black());
    println!("{}", format!("  {SESSION_COMMAND:<10} show the session id").bright_black());
    println!("{}", format!("  {HELP_COMMAND:<10} show this help").bright_black());
    println!("{}", "  quit       leave".bright_black());
}

//! Turning a configured command string into a program and its arguments

use std::fmt;
use std::process::Command;

use crate::config::ApplicationKind;
use crate::error::EngineError;

/// Program plus arguments, ready to hand to [`std::process::Command`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl LaunchCommand {
    /// Build the launch command for an engine.
    ///
    /// For [`ApplicationKind::Jar`] the command line is run through
    /// `<launcher> -jar`, so `"-Xmx1g engines/Flux.jar"` becomes
    /// `java -jar -Xmx1g engines/Flux.jar`. Arguments embedded in the command
    /// line are passed through as-is.
    pub fn build(
        command_line: &str,
        kind: ApplicationKind,
        runtime_launcher: &str,
    ) -> Result<Self, EngineError> {
        let mut tokens = split_command_line(command_line)?;
        if kind == ApplicationKind::Jar {
            let mut launcher = split_command_line(runtime_launcher)?;
            launcher.push("-jar".to_string());
            launcher.append(&mut tokens);
            tokens = launcher;
        }

        let mut tokens = tokens.into_iter();
        let program = tokens.next().ok_or_else(|| EngineError::InvalidCommand {
            command: command_line.to_string(),
            reason: "no program given",
        })?;
        Ok(Self {
            program,
            args: tokens.collect(),
        })
    }

    pub(crate) fn to_command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command.args(&self.args);
        command
    }
}

impl fmt::Display for LaunchCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.program)?;
        for arg in &self.args {
            write!(f, " {}", arg)?;
        }
        Ok(())
    }
}

/// Split a command line the way a POSIX shell would for simple cases:
/// whitespace separates words, `\` escapes the next character, and single or
/// double quotes group words. No expansion of any kind happens.
pub fn split_command_line(line: &str) -> Result<Vec<String>, EngineError> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some('"'), '\\') => match chars.next() {
                Some(next @ ('"' | '\\')) => current.push(next),
                Some(next) => {
                    current.push('\\');
                    current.push(next);
                }
                None => current.push('\\'),
            },
            (Some(_), c) => current.push(c),
            (None, '\'' | '"') => {
                quote = Some(c);
                in_word = true;
            }
            (None, '\\') => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
                in_word = true;
            }
            (None, c) if c.is_whitespace() => {
                if in_word {
                    words.push(std::mem::take(&mut current));
                    in_word = false;
                }
            }
            (None, c) => {
                current.push(c);
                in_word = true;
            }
        }
    }

    if quote.is_some() {
        return Err(EngineError::InvalidCommand {
            command: line.to_string(),
            reason: "unterminated quote",
        });
    }
    if in_word {
        words.push(current);
    }
    Ok(words)
}

#[cfg(test)]
#[path = "command_tests.rs"]
mod command_tests;

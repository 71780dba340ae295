//! REPL Module
//!
//! Input cleaning, command parsing and command execution for the
//! interactive cache shell.

use std::io::{self, BufRead, Write};
use std::thread;

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::fetch::{CachedFetcher, Fetch};

/// Lines buffered between the reader thread and the loop.
const LINE_BUFFER: usize = 16;

// == Command Table ==
/// Every command name with its help text, sorted by name.
pub const COMMANDS: &[(&str, &str)] = &[
    ("add", "Store a value: add <key> <value...>"),
    ("exit", "Exit the shell"),
    ("get", "Look up a cached value: get <key>"),
    ("help", "Displays a help message"),
    ("load", "Read a file through the cache: load <path>"),
    ("stats", "Show cache statistics"),
];

/// Lowercases `text` and splits it into whitespace-separated words.
pub fn clean_input(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

// == Line Reader ==
/// Reads lines from `reader` on a dedicated thread and sends them over a
/// channel.
///
/// A blocking read can't be cancelled, so it stays off the runtime: the
/// thread is detached and never holds up runtime shutdown. It stops at end
/// of input, after the first read error, or once the receiver is dropped.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<io::Result<String>>
where
    R: BufRead + Send + 'static,
{
    let (tx, rx) = mpsc::channel(LINE_BUFFER);

    thread::spawn(move || {
        for line in reader.lines() {
            let failed = line.is_err();
            if tx.blocking_send(line).is_err() || failed {
                break;
            }
        }
        debug!("Line reader finished");
    });

    rx
}

// == Command ==
/// A parsed REPL command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Exit,
    Add { key: String, value: String },
    Get { key: String },
    Load { path: String },
    Stats,
}

impl Command {
    /// Parses cleaned input words into a command.
    ///
    /// Returns `Ok(None)` for empty input.
    pub fn parse(words: &[String]) -> Result<Option<Self>> {
        let Some((name, args)) = words.split_first() else {
            return Ok(None);
        };

        let command = match name.as_str() {
            "help" => Self::Help,
            "exit" => Self::Exit,
            "stats" => Self::Stats,
            "add" => {
                let (key, rest) = args.split_first().ok_or(Error::MissingArgument("key"))?;
                if rest.is_empty() {
                    return Err(Error::MissingArgument("value"));
                }
                Self::Add {
                    key: key.clone(),
                    value: rest.join(" "),
                }
            }
            "get" => Self::Get {
                key: args.first().ok_or(Error::MissingArgument("key"))?.clone(),
            },
            "load" => Self::Load {
                path: args.first().ok_or(Error::MissingArgument("path"))?.clone(),
            },
            other => return Err(Error::UnknownCommand(other.to_string())),
        };

        Ok(Some(command))
    }
}

// == Output ==
/// What the shell should do after running a command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// Print the text and read the next line
    Continue(String),
    /// Print the text and stop
    Exit(String),
}

// == Repl ==
/// Executes commands against a cached fetcher.
#[derive(Debug)]
pub struct Repl<F> {
    fetcher: CachedFetcher<F>,
}

impl<F: Fetch> Repl<F> {
    pub fn new(fetcher: CachedFetcher<F>) -> Self {
        Self { fetcher }
    }

    /// Cleans, parses and runs one line of input.
    ///
    /// Empty lines produce empty output.
    pub async fn run_line(&self, line: &str) -> Result<Output> {
        match Command::parse(&clean_input(line))? {
            Some(command) => self.execute(command).await,
            None => Ok(Output::Continue(String::new())),
        }
    }

    /// Prompts, reads and executes lines until `exit` or end of input.
    ///
    /// Command errors are written to `out` and the loop carries on; read
    /// and write failures end it.
    pub async fn run<W: Write>(
        &self,
        lines: &mut mpsc::Receiver<io::Result<String>>,
        prompt: &str,
        out: &mut W,
    ) -> Result<()> {
        loop {
            write!(out, "{prompt}")?;
            out.flush()?;

            let Some(line) = lines.recv().await else {
                writeln!(out)?;
                return Ok(());
            };

            match self.run_line(&line?).await {
                Ok(Output::Continue(text)) if text.is_empty() => {}
                Ok(Output::Continue(text)) => writeln!(out, "{text}")?,
                Ok(Output::Exit(text)) => {
                    writeln!(out, "{text}")?;
                    return Ok(());
                }
                Err(err) => {
                    warn!("Command failed: {}", err);
                    writeln!(out, "{err}")?;
                }
            }
        }
    }

    pub async fn execute(&self, command: Command) -> Result<Output> {
        let cache = self.fetcher.cache();

        let text = match command {
            Command::Exit => return Ok(Output::Exit("Closing the cache... Goodbye!".to_string())),
            Command::Help => {
                let mut text = String::from("Welcome to Pokecache!\nUsage:\n\n");
                for (name, description) in COMMANDS {
                    text.push_str(&format!("{name}: {description}\n"));
                }
                text
            }
            Command::Add { key, value } => {
                cache.add(key.clone(), value);
                format!("Stored {key}")
            }
            Command::Get { key } => match cache.get(&key) {
                Some(value) => String::from_utf8_lossy(&value).into_owned(),
                None => format!("{key}: not cached"),
            },
            Command::Load { path } => {
                let fetched = self.fetcher.fetch(&path).await?;
                let origin = if fetched.from_cache { "cache" } else { "source" };
                format!("{path}: {} bytes (from {origin})", fetched.body.len())
            }
            Command::Stats => serde_json::to_string_pretty(&cache.stats())?,
        };

        Ok(Output::Continue(text))
    }
}

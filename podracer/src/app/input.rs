use super::message::Message;
use log::*;
use std::io::BufRead;
use thiserror::Error;
use tokio::sync::mpsc;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error(
        "Unknown command `{0}`. Use `track <id>`, `racer <id>`, `start`, Enter to accelerate or `quit`"
    )]
    UnknownCommand(String),
    #[error("`{0}` needs an id")]
    MissingId(String),
    #[error("`{0}` is not a valid id")]
    InvalidId(String),
}

pub fn parse_line(line: &str) -> Result<Message, InputError> {
    let mut words = line.split_whitespace();
    let Some(command) = words.next() else {
        return Ok(Message::Accelerate);
    };
    let command = command.to_lowercase();

    let id = |command: &str, word: Option<&str>| -> Result<u32, InputError> {
        let word = word.ok_or_else(|| InputError::MissingId(command.to_string()))?;
        word.parse()
            .map_err(|_| InputError::InvalidId(word.to_string()))
    };

    match command.as_str() {
        "a" | "accelerate" => Ok(Message::Accelerate),
        "track" | "t" => Ok(Message::SelectTrack(id(&command, words.next())?.into())),
        "racer" | "pod" | "r" => Ok(Message::SelectRacer(id(&command, words.next())?.into())),
        "start" | "go" => Ok(Message::Submit),
        "quit" | "q" | "exit" => Ok(Message::Quit),
        _ => Err(InputError::UnknownCommand(line.trim().to_string())),
    }
}

/// Reads commands line by line until the input ends or the receiver goes away. Blocks, so it
/// belongs on its own thread. A `Quit` is always sent last.
pub fn read_input<B: BufRead>(input: B, tx: mpsc::Sender<Message>) {
    for line in input.lines() {
        let message = match line {
            Ok(line) => parse_line(&line).unwrap_or_else(|e| {
                debug!("Rejected input {line:?}: {e}");
                Message::InvalidInput(e.to_string())
            }),
            Err(e) => {
                error!("Failed to read input: {e}");
                break;
            }
        };
        let quit = message == Message::Quit;
        if tx.blocking_send(message).is_err() || quit {
            return;
        }
    }

    info!("Input closed");
    tx.blocking_send(Message::Quit).ok();
}

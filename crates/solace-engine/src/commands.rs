//! Console command parsing.
//!
//! The engine reads one command per line from stdin. `release`, `new`,
//! and `reset` are queued for the next frame; `status` and `quit` are
//! handled by the loop itself.

use solace_core::Command;
use solace_types::EmotionKind;

/// A parsed console line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Queue a simulation command for the next frame.
    Queue(Command),
    /// Print the current session status.
    Status,
    /// Save and shut down.
    Quit,
}

/// Why a console line could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    /// The line was blank.
    #[error("empty command")]
    Empty,

    /// The verb is not a known command.
    #[error("unknown command '{0}'; try release, new, reset, status, quit")]
    Unknown(String),

    /// `release` was given without an emotion.
    #[error("release needs an emotion: release <emotion> [text...]")]
    MissingEmotion,

    /// The emotion word names no known kind.
    #[error("unknown emotion '{0}'; known: happiness, sadness, worry, calm, anger (or 0-4)")]
    UnknownEmotion(String),
}

/// Parse one console line into an [`Instruction`].
///
/// `release` takes an emotion by name or index and an optional free-text
/// reflection; left blank, the reflection falls back to the emotion's
/// composing prompt.
pub fn parse(line: &str) -> Result<Instruction, ParseError> {
    let mut parts = line.split_whitespace();
    let Some(verb) = parts.next() else {
        return Err(ParseError::Empty);
    };

    match verb.to_ascii_lowercase().as_str() {
        "release" => {
            let word = parts.next().ok_or(ParseError::MissingEmotion)?;
            let kind = parse_emotion(word)
                .ok_or_else(|| ParseError::UnknownEmotion(word.to_owned()))?;

            let text = parts.collect::<Vec<_>>().join(" ");
            let description = if text.is_empty() {
                kind.prompt().to_owned()
            } else {
                text
            };
            Ok(Instruction::Queue(Command::Release {
                emotion_index: kind.index(),
                label: kind.name().to_owned(),
                description,
            }))
        }
        "new" => Ok(Instruction::Queue(Command::NewSession)),
        "reset" => Ok(Instruction::Queue(Command::ResetAll)),
        "status" => Ok(Instruction::Status),
        "quit" | "exit" => Ok(Instruction::Quit),
        other => Err(ParseError::Unknown(other.to_owned())),
    }
}

/// Resolve an emotion word: a kind name (case-insensitive) or its index.
fn parse_emotion(word: &str) -> Option<EmotionKind> {
    if let Ok(index) = word.parse::<u32>() {
        return EmotionKind::from_index(index);
    }
    EmotionKind::ALL
        .into_iter()
        .find(|kind| kind.name().eq_ignore_ascii_case(word))
}

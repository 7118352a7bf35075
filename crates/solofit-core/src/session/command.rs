use std::str::FromStr;

use super::summary::FeedbackTag;

/// A user action on a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Finish the current set (workout) or exercise (evaluation).
    Complete,
    /// End the running countdown early.
    Skip,
    Pause,
    Resume,
    Increment,
    Decrement,
    /// Raw manual rep entry, validated by the session.
    EnterReps(String),
    ConfirmReady,
    SelectVariant(String),
    /// `None` dismisses the feedback prompt.
    Feedback(Option<FeedbackTag>),
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::Complete => "complete",
            Command::Skip => "skip",
            Command::Pause => "pause",
            Command::Resume => "resume",
            Command::Increment => "increment",
            Command::Decrement => "decrement",
            Command::EnterReps(_) => "enter reps",
            Command::ConfirmReady => "ready",
            Command::SelectVariant(_) => "select variant",
            Command::Feedback(_) => "feedback",
        }
    }
}

/// A line of input to a running session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Command(Command),
    /// Leave the session without finishing it.
    Exit,
}

impl FromStr for Input {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((w, r)) => (w, r.trim()),
            None => (line, ""),
        };
        let command = match word.to_ascii_lowercase().as_str() {
            "done" | "d" | "complete" => Command::Complete,
            "skip" | "s" => Command::Skip,
            "pause" | "p" => Command::Pause,
            "resume" | "r" => Command::Resume,
            "+" | "inc" => Command::Increment,
            "-" | "dec" => Command::Decrement,
            "ready" | "go" => Command::ConfirmReady,
            "reps" => Command::EnterReps(rest.to_string()),
            "variant" if !rest.is_empty() => Command::SelectVariant(rest.to_string()),
            "feedback" | "f" => match rest {
                "" | "none" | "skip" => Command::Feedback(None),
                tag => Command::Feedback(Some(tag.parse()?)),
            },
            "quit" | "q" | "exit" => return Ok(Input::Exit),
            "" => return Err("empty input".into()),
            other => return Err(format!("unknown command '{other}'")),
        };
        Ok(Input::Command(command))
    }
}

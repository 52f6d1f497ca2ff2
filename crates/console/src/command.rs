//! Operator command parsing.
//!
//! One command per input line. Keywords are case-insensitive; field values
//! are kept as raw text so the monitor decides whether they parse.

use std::str::FromStr;

/// Upper bound for `simulate <count>`.
pub const MAX_SIMULATE_COUNT: u32 = 1000;

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Replace the speed limit input field text.
    SetSpeedLimit(String),
    /// Replace the threshold input field text.
    SetThreshold(String),
    Activate,
    Deactivate,
    /// Activate when inactive, deactivate when active.
    Toggle,
    /// Draw `count` speeds from the simulator.
    Simulate(u32),
    /// Evaluate an externally reported speed.
    Detect(f64),
    /// Estimate a speed from tracked pixel displacement over a frame interval.
    Track { pixels: f64, frame_secs: f64 },
    Status,
    Log,
    Help,
    Quit,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command: {0:?} (try `help`)")]
    Unknown(String),

    #[error("`{command}` expects {expected}")]
    MissingArgument {
        command: &'static str,
        expected: &'static str,
    },

    #[error("`{command}`: {input:?} is not a valid {expected}")]
    InvalidArgument {
        command: &'static str,
        input: String,
        expected: &'static str,
    },

    #[error("`{0}` takes no arguments")]
    UnexpectedArgument(&'static str),
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (keyword, rest) = match line.split_once(char::is_whitespace) {
            Some((keyword, rest)) => (keyword, rest.trim()),
            None => (line, ""),
        };

        if keyword.is_empty() {
            return Err(CommandError::Empty);
        }

        match keyword.to_ascii_lowercase().as_str() {
            "limit" => field_text("limit", rest).map(Command::SetSpeedLimit),
            "threshold" => field_text("threshold", rest).map(Command::SetThreshold),
            "activate" | "on" => no_args("activate", rest, Command::Activate),
            "deactivate" | "off" => no_args("deactivate", rest, Command::Deactivate),
            "toggle" => no_args("toggle", rest, Command::Toggle),
            "simulate" | "sim" => parse_count(rest).map(Command::Simulate),
            "detect" => {
                if rest.is_empty() {
                    return Err(CommandError::MissingArgument {
                        command: "detect",
                        expected: "a speed in mph",
                    });
                }
                finite("detect", rest, "speed in mph").map(Command::Detect)
            }
            "track" => parse_track(rest),
            "status" => no_args("status", rest, Command::Status),
            "log" => no_args("log", rest, Command::Log),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" => Ok(Command::Quit),
            _ => Err(CommandError::Unknown(keyword.to_string())),
        }
    }
}

/// Text shown by `help`.
pub const HELP: &[&str] = &[
    "limit <mph>              set the speed limit field",
    "threshold <mph>          set the alert threshold field",
    "activate | on            start monitoring with the field values",
    "deactivate | off         stop monitoring",
    "toggle                   switch between active and inactive",
    "simulate [count]         simulate vehicle detections (default 1)",
    "detect <mph>             report a detected vehicle speed",
    "track <pixels> <secs>    estimate speed from pixel displacement",
    "status                   show system status",
    "log                      show the alert log",
    "quit | exit              leave the console",
];

fn field_text(command: &'static str, rest: &str) -> Result<String, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::MissingArgument {
            command,
            expected: "a value in mph",
        });
    }
    Ok(rest.to_string())
}

fn no_args(command: &'static str, rest: &str, parsed: Command) -> Result<Command, CommandError> {
    if rest.is_empty() {
        Ok(parsed)
    } else {
        Err(CommandError::UnexpectedArgument(command))
    }
}

fn finite(command: &'static str, input: &str, expected: &'static str) -> Result<f64, CommandError> {
    match input.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(CommandError::InvalidArgument {
            command,
            input: input.to_string(),
            expected,
        }),
    }
}

fn parse_count(rest: &str) -> Result<u32, CommandError> {
    if rest.is_empty() {
        return Ok(1);
    }
    match rest.parse::<u32>() {
        Ok(count) if (1..=MAX_SIMULATE_COUNT).contains(&count) => Ok(count),
        _ => Err(CommandError::InvalidArgument {
            command: "simulate",
            input: rest.to_string(),
            expected: "count between 1 and 1000",
        }),
    }
}

fn parse_track(rest: &str) -> Result<Command, CommandError> {
    let missing = || CommandError::MissingArgument {
        command: "track",
        expected: "<pixels> <frame seconds>",
    };

    let mut parts = rest.split_whitespace();
    let pixels = parts.next().ok_or_else(missing)?;
    let frame_secs = parts.next().ok_or_else(missing)?;
    if parts.next().is_some() {
        return Err(CommandError::UnexpectedArgument("track"));
    }

    Ok(Command::Track {
        pixels: finite("track", pixels, "pixel displacement")?,
        frame_secs: finite("track", frame_secs, "frame interval")?,
    })
}

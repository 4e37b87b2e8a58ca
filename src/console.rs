//! Line-oriented commands for driving carousels from a terminal.
//!
//! Grammar: `[<instance>:]<command> [<arg>]`, instance defaulting to 0.
//!
//! | command            | event                         |
//! |--------------------|-------------------------------|
//! | `next` / `prev`    | click next / previous         |
//! | `dot <i>`          | click dot `i`                 |
//! | `toggle`           | click the autoplay toggle     |
//! | `enter` / `leave`  | pointer enters / leaves       |
//! | `key <name>`       | key down (`left`, `right`, `space`, or a DOM key) |
//! | `left` / `right` / `space` | shorthand for `key ...` |
//! | `status`           | print snapshot(s)             |
//! | `quit`             | shut down                     |

use thiserror::Error;

use crate::events::{CarouselEvent, Control, Key};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Send { target: usize, event: CarouselEvent },
    /// `None` means every instance.
    Status { target: Option<usize> },
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("invalid instance '{0}'")]
    BadTarget(String),
    #[error("unknown command '{0}'")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("invalid dot index '{0}'")]
    BadDot(String),
    #[error("unexpected argument '{0}'")]
    Unexpected(String),
}

/// Parses one line; blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<Command>, CommandError> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let (target, rest) = match line.split_once(':') {
        Some((prefix, rest)) => {
            let prefix = prefix.trim();
            let idx = prefix
                .parse::<usize>()
                .map_err(|_| CommandError::BadTarget(prefix.to_string()))?;
            (Some(idx), rest.trim())
        }
        None => (None, line),
    };

    let (word, arg) = match rest.split_once(char::is_whitespace) {
        Some((word, arg)) => (word, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (rest, None),
    };
    let word = word.to_ascii_lowercase();

    let event = match word.as_str() {
        "status" => {
            reject_arg(arg)?;
            return Ok(Some(Command::Status { target }));
        }
        "quit" | "exit" => {
            reject_arg(arg)?;
            return Ok(Some(Command::Quit));
        }
        "next" => CarouselEvent::Click(Control::Next),
        "prev" | "previous" => CarouselEvent::Click(Control::Previous),
        "toggle" => CarouselEvent::Click(Control::AutoplayToggle),
        "enter" => CarouselEvent::PointerEnter,
        "leave" => CarouselEvent::PointerLeave,
        "dot" => {
            let raw = arg.ok_or(CommandError::MissingArgument("dot"))?;
            let index = raw
                .parse::<usize>()
                .map_err(|_| CommandError::BadDot(raw.to_string()))?;
            return Ok(Some(Command::Send {
                target: target.unwrap_or(0),
                event: CarouselEvent::Click(Control::Dot(index)),
            }));
        }
        "key" => {
            let raw = arg.ok_or(CommandError::MissingArgument("key"))?;
            return Ok(Some(Command::Send {
                target: target.unwrap_or(0),
                event: CarouselEvent::KeyDown(key_by_name(raw)),
            }));
        }
        "left" | "right" | "space" => CarouselEvent::KeyDown(key_by_name(&word)),
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    reject_arg(arg)?;
    Ok(Some(Command::Send {
        target: target.unwrap_or(0),
        event,
    }))
}

fn reject_arg(arg: Option<&str>) -> Result<(), CommandError> {
    match arg {
        Some(extra) => Err(CommandError::Unexpected(extra.to_string())),
        None => Ok(()),
    }
}

fn key_by_name(name: &str) -> Key {
    match name {
        "left" => Key::ArrowLeft,
        "right" => Key::ArrowRight,
        "space" => Key::Space,
        other => Key::from_dom_key(other),
    }
}

use crate::menu::{SlotId, SwipeDirection};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One line of the control socket protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Tap on the main toggle button.
    Main,
    Open,
    Close,
    Swipe(SwipeDirection),
    /// Tap on the ring button with this slot id.
    Tap(SlotId),
    /// Tap on the submenu button with this child index.
    Sub(usize),
    Backdrop,
    Reload,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command '{0}'")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error("Invalid argument '{arg}' for '{command}'")]
    InvalidArgument { command: &'static str, arg: String },
    #[error("Unexpected trailing input '{0}'")]
    Trailing(String),
}

fn argument<T: FromStr>(command: &'static str, arg: Option<&str>) -> Result<T, CommandError> {
    let arg = arg.ok_or(CommandError::MissingArgument(command))?;
    arg.parse().map_err(|_| CommandError::InvalidArgument {
        command,
        arg: arg.to_string(),
    })
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut words = s.split_whitespace();
        let name = words.next().ok_or(CommandError::Empty)?;
        let arg = words.next();

        let command = match name.to_ascii_lowercase().as_str() {
            "main" => Self::Main,
            "open" => Self::Open,
            "close" => Self::Close,
            "swipe" => Self::Swipe(argument("swipe", arg)?),
            "tap" => Self::Tap(SlotId::new(argument("tap", arg)?)),
            "sub" => Self::Sub(argument("sub", arg)?),
            "backdrop" => Self::Backdrop,
            "reload" => Self::Reload,
            _ => return Err(CommandError::Unknown(name.to_string())),
        };

        let takes_argument = matches!(command, Self::Swipe(_) | Self::Tap(_) | Self::Sub(_));
        let rest: Vec<_> = if takes_argument {
            words.collect()
        } else {
            arg.into_iter().chain(words).collect()
        };
        if !rest.is_empty() {
            return Err(CommandError::Trailing(rest.join(" ")));
        }
        Ok(command)
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Main => write!(f, "main"),
            Self::Open => write!(f, "open"),
            Self::Close => write!(f, "close"),
            Self::Swipe(direction) => write!(f, "swipe {direction}"),
            Self::Tap(slot) => write!(f, "tap {slot}"),
            Self::Sub(index) => write!(f, "sub {index}"),
            Self::Backdrop => write!(f, "backdrop"),
            Self::Reload => write!(f, "reload"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        let cases = vec![
            ("main", Command::Main),
            ("  OPEN ", Command::Open),
            ("close", Command::Close),
            ("swipe left", Command::Swipe(SwipeDirection::Left)),
            ("swipe U", Command::Swipe(SwipeDirection::Up)),
            ("tap 3", Command::Tap(SlotId::new(3))),
            ("sub 0", Command::Sub(0)),
            ("backdrop", Command::Backdrop),
            ("reload", Command::Reload),
        ];
        for (line, expected) in cases {
            assert_eq!(line.parse::<Command>(), Ok(expected), "{line:?}");
        }
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "spin".parse::<Command>(),
            Err(CommandError::Unknown("spin".into()))
        );
        assert_eq!(
            "tap".parse::<Command>(),
            Err(CommandError::MissingArgument("tap"))
        );
        assert_eq!(
            "swipe sideways".parse::<Command>(),
            Err(CommandError::InvalidArgument {
                command: "swipe",
                arg: "sideways".into()
            })
        );
        assert_eq!(
            "sub -1".parse::<Command>(),
            Err(CommandError::InvalidArgument {
                command: "sub",
                arg: "-1".into()
            })
        );
        assert_eq!(
            "open now".parse::<Command>(),
            Err(CommandError::Trailing("now".into()))
        );
        assert_eq!(
            "tap 1 2".parse::<Command>(),
            Err(CommandError::Trailing("2".into()))
        );
    }

    #[test]
    fn test_display_is_parseable() {
        for command in [
            Command::Swipe(SwipeDirection::Down),
            Command::Tap(SlotId::new(5)),
            Command::Sub(4),
            Command::Backdrop,
        ] {
            assert_eq!(command.to_string().parse::<Command>(), Ok(command));
        }
    }
}

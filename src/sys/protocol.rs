//! Newline-delimited text protocol spoken on the daemon socket.

use crate::events::AppEvent;
use crate::geometry::{Point, Size};
use std::fmt;
use std::str::FromStr;
use strum::{Display as StrumDisplay, EnumString};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, StrumDisplay)]
#[strum(serialize_all = "kebab-case")]
enum Verb {
    Show,
    Shown,
    Hide,
    Move,
    Click,
    Back,
    Reload,
    Scale,
    Radii,
    CenterText,
    Canvas,
    Watch,
}

#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    #[error("Empty command")]
    Empty,
    #[error("Unknown command '{0}'")]
    UnknownCommand(String),
    #[error("'{command}' is missing its {name} argument")]
    MissingArgument { command: String, name: &'static str },
    #[error("'{command}' expects a number, got '{value}'")]
    BadNumber { command: String, value: String },
    #[error("'{command}' takes no argument '{value}'")]
    UnexpectedArgument { command: String, value: String },
}

/// One line received from a client.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Event(AppEvent),
    /// Keep the connection open and stream engine events to it.
    Watch,
}

struct Args<'a> {
    verb: Verb,
    words: std::str::SplitWhitespace<'a>,
}

impl Args<'_> {
    fn number(&mut self, name: &'static str) -> Result<f64, ProtocolError> {
        let value = self
            .words
            .next()
            .ok_or_else(|| ProtocolError::MissingArgument {
                command: self.verb.to_string(),
                name,
            })?;
        value
            .parse::<f64>()
            .ok()
            .filter(|n| n.is_finite())
            .ok_or_else(|| ProtocolError::BadNumber {
                command: self.verb.to_string(),
                value: value.to_string(),
            })
    }

    fn point(&mut self) -> Result<Point, ProtocolError> {
        Ok(Point::new(self.number("x")?, self.number("y")?))
    }

    fn finish(mut self) -> Result<(), ProtocolError> {
        match self.words.next() {
            Some(value) => Err(ProtocolError::UnexpectedArgument {
                command: self.verb.to_string(),
                value: value.to_string(),
            }),
            None => Ok(()),
        }
    }
}

impl FromStr for Request {
    type Err = ProtocolError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (head, rest) = line
            .split_once(char::is_whitespace)
            .map_or((line, ""), |(head, rest)| (head, rest.trim_start()));
        if head.is_empty() {
            return Err(ProtocolError::Empty);
        }
        let verb = Verb::from_str(head)
            .map_err(|_| ProtocolError::UnknownCommand(head.to_string()))?;

        let mut args = Args {
            verb,
            words: rest.split_whitespace(),
        };

        let event = match verb {
            Verb::Show if rest.is_empty() => AppEvent::Show(None),
            Verb::Show => AppEvent::Show(Some(args.point()?)),
            Verb::Shown => AppEvent::Shown,
            Verb::Hide => AppEvent::Hide,
            Verb::Move => AppEvent::CursorMove(args.point()?),
            Verb::Click => AppEvent::Click,
            Verb::Back => AppEvent::Back,
            Verb::Reload => AppEvent::ConfigReload,
            Verb::Scale => AppEvent::UiScale(args.number("scale")?),
            Verb::Radii => AppEvent::Radii {
                inner: args.number("inner")?,
                outer: args.number("outer")?,
            },
            Verb::Canvas => AppEvent::Canvas(Size::new(
                args.number("width")?,
                args.number("height")?,
            )),
            Verb::Watch => {
                args.finish()?;
                return Ok(Self::Watch);
            }
            // the text is taken verbatim, inner spaces included
            Verb::CenterText => return Ok(Self::Event(AppEvent::CenterText(rest.to_string()))),
        };
        args.finish()?;
        Ok(Self::Event(event))
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let event = match self {
            Self::Watch => return write!(f, "{}", Verb::Watch),
            Self::Event(event) => event,
        };
        match event {
            AppEvent::Show(None) => write!(f, "{}", Verb::Show),
            AppEvent::Show(Some(p)) => write!(f, "{} {} {}", Verb::Show, p.x, p.y),
            AppEvent::Shown => write!(f, "{}", Verb::Shown),
            AppEvent::Hide => write!(f, "{}", Verb::Hide),
            AppEvent::CursorMove(p) => write!(f, "{} {} {}", Verb::Move, p.x, p.y),
            AppEvent::Click => write!(f, "{}", Verb::Click),
            AppEvent::Back => write!(f, "{}", Verb::Back),
            AppEvent::ConfigReload => write!(f, "{}", Verb::Reload),
            AppEvent::UiScale(s) => write!(f, "{} {}", Verb::Scale, s),
            AppEvent::Radii { inner, outer } => write!(f, "{} {} {}", Verb::Radii, inner, outer),
            AppEvent::CenterText(text) if text.is_empty() => write!(f, "{}", Verb::CenterText),
            AppEvent::CenterText(text) => write!(f, "{} {}", Verb::CenterText, text),
            AppEvent::Canvas(s) => write!(f, "{} {} {}", Verb::Canvas, s.width, s.height),
        }
    }
}

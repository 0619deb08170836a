//! Line-oriented input for running without a terminal UI
//!
//! One command per line:
//!
//! ```text
//! set <param> <value>
//! nudge <param> <steps>
//! tap
//! double on|off|flip
//! trigger <address>
//! ```

use std::io::BufRead;
use std::time::Instant;

use crate::control::{ControlEvent, ParamId, Trigger};
use crate::engine::EngineHandle;
use crate::error::CommandError;

/// Parse one command line. `now` stamps tap events.
pub fn parse_command(line: &str, now: f64) -> Result<ControlEvent, CommandError> {
    let mut words = line.split_whitespace();
    let command = words.next().ok_or(CommandError::Empty)?;

    match command {
        "set" => {
            let id: ParamId = words.next().ok_or(CommandError::MissingArgument("set"))?.parse()?;
            let word = words.next();
            let value = parse_number::<f64>(word, "set")?;
            if !value.is_finite() {
                return Err(CommandError::InvalidNumber(word.unwrap_or_default().to_string()));
            }
            Ok(ControlEvent::TargetChanged { id, value })
        }
        "nudge" => {
            let id: ParamId = words.next().ok_or(CommandError::MissingArgument("nudge"))?.parse()?;
            let steps = match words.next() {
                Some(word) => parse_number::<i32>(Some(word), "nudge")?,
                None => 1,
            };
            Ok(ControlEvent::Nudged { id, steps })
        }
        "tap" => Ok(ControlEvent::TapRegistered { timestamp: now }),
        "double" => match words.next() {
            Some("on") => Ok(ControlEvent::DoubleToggled { active: true }),
            Some("off") => Ok(ControlEvent::DoubleToggled { active: false }),
            Some("flip") | None => Ok(ControlEvent::DoubleFlipped),
            Some(other) => Err(CommandError::UnknownCommand(format!("double {}", other))),
        },
        "trigger" => {
            let trigger: Trigger = words.next().ok_or(CommandError::MissingArgument("trigger"))?.parse()?;
            Ok(ControlEvent::Triggered(trigger))
        }
        other => Err(CommandError::UnknownCommand(other.to_string())),
    }
}

fn parse_number<N: std::str::FromStr>(word: Option<&str>, command: &'static str) -> Result<N, CommandError> {
    let word = word.ok_or(CommandError::MissingArgument(command))?;
    word.parse().map_err(|_| CommandError::InvalidNumber(word.to_string()))
}

/// Feed commands from `input` into the engine until EOF or the engine stops
pub fn run_lines<R: BufRead>(input: R, handle: &EngineHandle, start: Instant) -> std::io::Result<()> {
    for line in input.lines() {
        let line = line?;
        if line.trim().is_empty() || line.trim_start().starts_with('#') {
            continue;
        }
        if !handle.is_running() {
            break;
        }

        match parse_command(&line, start.elapsed().as_secs_f64()) {
            Ok(event) => {
                tracing::debug!(?event, "command");
                if !handle.send(event) {
                    break;
                }
            }
            Err(e) => tracing::warn!(line = %line.trim(), error = %e, "ignored command"),
        }
    }
    Ok(())
}

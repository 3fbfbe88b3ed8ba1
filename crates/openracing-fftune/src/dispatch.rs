//! Command dispatch for the interactive shell.
//!
//! Maps a verb and its argument tail onto [`FfTune`] operations. Text
//! rendering of the [`Reply`] is left to the caller.

use serde::Serialize;

use crate::context::{AddOutcome, FfTune};
use crate::device::FfDevice;
use crate::effect::EffectRecord;
use crate::encoder::EncodeError;
use crate::params::parse_integer;
use crate::table::EffectSummary;
use crate::{FfTuneError, Result};

/// A recognised shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    List,
    Run(i64),
    Stop(i64),
    Add { tag: String, args: Vec<String> },
    Remove(i64),
    Quit,
}

impl Command {
    /// Split a line on whitespace and parse it.
    ///
    /// # Errors
    ///
    /// See [`Command::parse`].
    pub fn parse_line(line: &str) -> Result<Option<Self>> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        Self::parse(&tokens)
    }

    /// Parse `verb args...`. Empty input is `Ok(None)`, unknown verbs are
    /// [`Command::Help`].
    ///
    /// # Errors
    ///
    /// A missing or non-integer slot for `run`, `stop` and `remove` is a
    /// lookup error; `add` without a kind tag is an input error.
    pub fn parse<S: AsRef<str>>(tokens: &[S]) -> Result<Option<Self>> {
        let Some((verb, args)) = tokens.split_first() else {
            return Ok(None);
        };
        let command = match verb.as_ref() {
            "help" => Command::Help,
            "list" => Command::List,
            "quit" => Command::Quit,
            "run" => Command::Run(slot_arg(args)?),
            "stop" => Command::Stop(slot_arg(args)?),
            "remove" => Command::Remove(slot_arg(args)?),
            "add" => {
                let (tag, rest) = args
                    .split_first()
                    .ok_or(EncodeError::MissingToken { field: "kind" })?;
                Command::Add {
                    tag: tag.as_ref().to_owned(),
                    args: rest.iter().map(|arg| arg.as_ref().to_owned()).collect(),
                }
            }
            _ => Command::Help,
        };
        Ok(Some(command))
    }
}

fn slot_arg<S: AsRef<str>>(args: &[S]) -> Result<i64> {
    let arg = args.first().ok_or(FfTuneError::MissingSlot)?.as_ref();
    parse_integer(arg).ok_or_else(|| FfTuneError::InvalidSlot(arg.to_owned()))
}

/// What a command did, for the caller to render.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum Reply {
    Help,
    Listing { effects: Vec<EffectSummary> },
    Added(AddOutcome),
    Playing { slot: i64 },
    Stopped { slot: i64 },
    Removed { slot: i64, record: EffectRecord },
    Quit,
}

/// Run `command` against the session.
///
/// # Errors
///
/// Whatever the session operation reports; the session stays usable.
pub fn dispatch<D: FfDevice>(tune: &mut FfTune<D>, command: Command) -> Result<Reply> {
    match command {
        Command::Help => Ok(Reply::Help),
        Command::List => Ok(Reply::Listing {
            effects: tune.list(),
        }),
        Command::Run(slot) => tune.run(slot).map(|()| Reply::Playing { slot }),
        Command::Stop(slot) => tune.stop(slot).map(|()| Reply::Stopped { slot }),
        Command::Add { tag, args } => tune.add(&tag, &args).map(Reply::Added),
        Command::Remove(slot) => tune
            .remove(slot)
            .map(|record| Reply::Removed { slot, record }),
        Command::Quit => Ok(Reply::Quit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorCategory;
    use crate::mock::MockFfDevice;

    #[test]
    fn test_parse_verbs() -> Result<()> {
        assert_eq!(Command::parse_line("list")?, Some(Command::List));
        assert_eq!(Command::parse_line("  run 3 ")?, Some(Command::Run(3)));
        assert_eq!(Command::parse_line("stop 0x1")?, Some(Command::Stop(1)));
        assert_eq!(Command::parse_line("remove -2")?, Some(Command::Remove(-2)));
        assert_eq!(Command::parse_line("quit")?, Some(Command::Quit));
        assert_eq!(Command::parse_line("")?, None);
        Ok(())
    }

    #[test]
    fn test_unknown_verb_is_help() -> Result<()> {
        assert_eq!(Command::parse_line("frobnicate 1 2")?, Some(Command::Help));
        Ok(())
    }

    #[test]
    fn test_parse_add() -> Result<()> {
        assert_eq!(
            Command::parse_line("add r: 500 0xffff 0xffff")?,
            Some(Command::Add {
                tag: "r:".into(),
                args: vec!["500".into(), "0xffff".into(), "0xffff".into()],
            })
        );
        let err = Command::parse_line("add");
        assert!(matches!(err, Err(FfTuneError::Input(_))));
        Ok(())
    }

    #[test]
    fn test_slot_argument_errors_are_lookups() {
        let missing = Command::parse_line("run");
        assert!(matches!(missing, Err(FfTuneError::MissingSlot)));

        let invalid = Command::parse_line("stop first");
        assert!(matches!(invalid, Err(ref e) if e.category() == ErrorCategory::Lookup));
    }

    #[test]
    fn test_dispatch_round() -> Result<()> {
        let mut tune = FfTune::new(MockFfDevice::new("pad"))?;
        let added = dispatch(
            &mut tune,
            Command::Add {
                tag: "r:".into(),
                args: vec!["500".into(), "1".into(), "2".into()],
            },
        )?;
        assert!(matches!(added, Reply::Added(ref outcome) if outcome.slot == 0));
        assert_eq!(
            dispatch(&mut tune, Command::Run(0))?,
            Reply::Playing { slot: 0 }
        );
        let listing = dispatch(&mut tune, Command::List)?;
        assert!(matches!(listing, Reply::Listing { ref effects } if effects.len() == 1));
        let removed = dispatch(&mut tune, Command::Remove(0))?;
        assert!(matches!(removed, Reply::Removed { slot: 0, .. }));
        assert!(tune.table().is_empty());
        Ok(())
    }
}

//! Output formatting for shell replies and CLI errors

use std::io::{self, Write};

use anyhow::Error;
use colored::*;
use openracing_fftune::{
    AddOutcome, EffectPayload, EffectRecord, EffectSummary, ErrorCategory, FfCapabilities,
    FfFeature, FfTuneError, Reply,
};
use serde_json::{Value, json};

use crate::error::CliError;

const HELP: &str = "
  help          Print available commands
  list          List available effects
  run <id>      Run effect number <id>
  stop <id>     Stop effect number <id>
  add <params>  Add effect with given parameters

                add r: <ms> <strong_magn [0:0xffff]> <weak_magn [0:0xffff]>
                add p: <sine|triangle|square> <ms> <period_ms> <magnitude>
                       <offset> <phase> <attack_length> <attack_level>
                       <fade_length> <fade_level>

                Example, maximum force rumble effect:
                add r: 500 0xffff 0xffff

                Example, sine effect with attack and fade envelope:
                add p: sine 4000 500 0x7fff 0 0 1000 0 1000 0

  remove <id>   Remove and unload effect number <id>
  quit          Quit the program
";

const ADD_USAGE: &str = "  usage:
  \"add r: <ms> <strong_magn> <weak_magn>\" OR
  \"add p: <sine|triangle|square> <ms> <period_ms> <magnitude> <offset> <phase> <attack_length> <attack_level> <fade_length> <fade_level>\"
";

/// Print error in JSON format
pub fn print_error_json(error: &Error) {
    let error_json = json!({
        "success": false,
        "error": {
            "message": error.to_string(),
            "type": error_type_name(error)
        }
    });
    match serde_json::to_string_pretty(&error_json) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("Failed to format error as JSON: {e}"),
    }
}

fn error_type_name(error: &Error) -> &'static str {
    match error.downcast_ref::<CliError>() {
        Some(CliError::DeviceNotFound(_)) => "device_not_found",
        Some(CliError::DeviceOpen { .. }) => "device_open",
        Some(CliError::InvalidConfiguration(_) | CliError::YamlError(_)) => "invalid_configuration",
        Some(CliError::Unsupported) => "unsupported",
        Some(CliError::IoError(_)) => "io",
        Some(CliError::Tune(_)) => "force_feedback",
        None => "internal",
    }
}

/// Write one compact JSON document per line.
fn write_json_line<W: Write>(out: &mut W, value: &Value) -> io::Result<()> {
    serde_json::to_writer(&mut *out, value).map_err(io::Error::from)?;
    writeln!(out)
}

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

/// Device banner printed before the shell starts.
pub fn write_device_summary<W: Write>(
    out: &mut W,
    name: &str,
    capabilities: FfCapabilities,
    max_simultaneous: usize,
) -> io::Result<()> {
    writeln!(out, "Device {} opened", name.bold())?;
    writeln!(out, "Effects supported: {}", format_capabilities(capabilities))?;
    writeln!(out, "Number of simultaneous effects: {max_simultaneous}")?;
    writeln!(out)
}

/// Device banner as a single JSON line.
pub fn write_device_summary_json<W: Write>(
    out: &mut W,
    name: &str,
    capabilities: FfCapabilities,
    max_simultaneous: usize,
) -> io::Result<()> {
    let features: Vec<&str> = capabilities.iter().map(FfFeature::name).collect();
    write_json_line(
        out,
        &json!({
            "success": true,
            "device": {
                "name": name,
                "capabilities": features,
                "max_effects": max_simultaneous
            }
        }),
    )
}

fn format_capabilities(capabilities: FfCapabilities) -> String {
    if capabilities.is_empty() {
        "None".to_string()
    } else {
        capabilities.to_string()
    }
}

/// Render the outcome of a shell command.
pub fn write_reply<W: Write>(out: &mut W, reply: &Reply) -> io::Result<()> {
    match reply {
        Reply::Help => write!(out, "{HELP}"),
        Reply::Listing { effects } => write_listing(out, effects),
        Reply::Added(outcome) => write_added(out, outcome),
        Reply::Playing { slot } => writeln!(out, "Playing effect {slot}"),
        Reply::Stopped { slot } => writeln!(out, "Stopping effect {slot}"),
        Reply::Removed { slot, .. } => writeln!(out, "Removed effect {slot}"),
        Reply::Quit => Ok(()),
    }
}

/// Render the outcome of a shell command as a JSON line.
pub fn write_reply_json<W: Write>(out: &mut W, reply: &Reply) -> io::Result<()> {
    write_json_line(out, &json!({ "success": true, "result": reply }))
}

fn write_listing<W: Write>(out: &mut W, effects: &[EffectSummary]) -> io::Result<()> {
    writeln!(out, "fftune effects:")?;
    for effect in effects {
        writeln!(
            out,
            "  Effect [{}]: {} | {}ms",
            effect.slot, effect.kind, effect.duration_ms
        )?;
    }
    Ok(())
}

fn write_added<W: Write>(out: &mut W, outcome: &AddOutcome) -> io::Result<()> {
    for note in &outcome.notes {
        writeln!(out, "  {note}")?;
    }
    writeln!(out, "Added effect [{}]:", outcome.slot)?;
    write_record(out, &outcome.record)
}

fn write_record<W: Write>(out: &mut W, record: &EffectRecord) -> io::Result<()> {
    let kind = record.kind();
    writeln!(out, "  type = {kind} (0x{:x})", kind.code())?;
    if let Some(id) = record.device_id {
        writeln!(out, "  id = {id}")?;
    }
    writeln!(out, "  length = {}ms", record.duration_ms)?;
    match &record.payload {
        EffectPayload::Rumble(rumble) => {
            writeln!(out, "  strong rumble magnitude = 0x{:x}", rumble.strong_magnitude)?;
            writeln!(out, "  weak rumble magnitude = 0x{:x}", rumble.weak_magnitude)
        }
        EffectPayload::Periodic(periodic) => {
            writeln!(out, "  waveform = {}", periodic.waveform)?;
            writeln!(out, "  period = {}ms", periodic.period)?;
            writeln!(out, "  periodic magnitude = {}", periodic.magnitude)?;
            writeln!(out, "  offset = {}", periodic.offset)?;
            writeln!(out, "  phase = {}", periodic.phase)?;
            let envelope = &periodic.envelope;
            if envelope.is_flat() {
                return writeln!(out, "  envelope = none");
            }
            writeln!(out, "  att = {}ms", envelope.attack_length)?;
            writeln!(out, "  att_lev = 0x{:x}", envelope.attack_level)?;
            writeln!(out, "  fade = {}ms", envelope.fade_length)?;
            writeln!(out, "  fade_lev = 0x{:x}", envelope.fade_level)
        }
    }
}

/// Render a failed shell command. The session keeps running afterwards.
pub fn write_command_error<W: Write>(out: &mut W, error: &FfTuneError) -> io::Result<()> {
    let message = capitalize(&error.to_string());
    writeln!(out, "  {message}")?;
    if error.category() == ErrorCategory::Input {
        write!(out, "{ADD_USAGE}")?;
    }
    Ok(())
}

/// Render a failed shell command as a JSON line.
pub fn write_command_error_json<W: Write>(out: &mut W, error: &FfTuneError) -> io::Result<()> {
    write_json_line(
        out,
        &json!({
            "success": false,
            "error": {
                "message": error.to_string(),
                "category": error.category()
            }
        }),
    )
}

fn capitalize(message: &str) -> String {
    let mut chars = message.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openracing_fftune::{
        EffectKind, EncodeError, FfFeature, PeriodicParams, RumbleParams, Waveform,
    };

    type TestResult = Result<(), Box<dyn std::error::Error>>;

    fn render(reply: &Reply) -> Result<String, Box<dyn std::error::Error>> {
        let mut out = Vec::new();
        write_reply(&mut out, reply)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn listing_lines() -> TestResult {
        let text = render(&Reply::Listing {
            effects: vec![
                EffectSummary {
                    slot: 0,
                    kind: EffectKind::Rumble,
                    duration_ms: 500,
                },
                EffectSummary {
                    slot: 1,
                    kind: EffectKind::Periodic,
                    duration_ms: 4000,
                },
            ],
        })?;
        insta::assert_snapshot!(text, @r"
        fftune effects:
          Effect [0]: FF_RUMBLE | 500ms
          Effect [1]: FF_PERIODIC | 4000ms
        ");
        Ok(())
    }

    #[test]
    fn added_rumble_shows_fields() -> TestResult {
        let record = EffectRecord::rumble(
            500,
            RumbleParams {
                strong_magnitude: 0xffff,
                weak_magnitude: 0x10,
            },
        );
        let text = render(&Reply::Added(AddOutcome {
            slot: 0,
            record,
            notes: Vec::new(),
        }))?;
        assert!(text.contains("Added effect [0]:"));
        assert!(text.contains("type = FF_RUMBLE (0x50)"));
        assert!(text.contains("strong rumble magnitude = 0xffff"));
        assert!(text.contains("weak rumble magnitude = 0x10"));
        Ok(())
    }

    #[test]
    fn added_periodic_shows_envelope() -> TestResult {
        let record = EffectRecord::periodic(
            4000,
            PeriodicParams {
                waveform: Waveform::Sine,
                period: 500,
                magnitude: 0x7fff,
                offset: 0,
                phase: 0,
                envelope: openracing_fftune::Envelope {
                    attack_length: 1000,
                    attack_level: 0,
                    fade_length: 1000,
                    fade_level: 0,
                },
            },
        );
        let text = render(&Reply::Added(AddOutcome {
            slot: 3,
            record,
            notes: Vec::new(),
        }))?;
        assert!(text.contains("waveform = sine"));
        assert!(text.contains("att = 1000ms"));
        assert!(text.contains("fade = 1000ms"));
        Ok(())
    }

    #[test]
    fn added_periodic_without_envelope() -> TestResult {
        let record = EffectRecord::periodic(
            1000,
            PeriodicParams {
                waveform: Waveform::Square,
                period: 50,
                magnitude: 0x4000,
                offset: 0,
                phase: 0,
                envelope: openracing_fftune::Envelope::default(),
            },
        );
        let text = render(&Reply::Added(AddOutcome {
            slot: 0,
            record,
            notes: Vec::new(),
        }))?;
        assert!(text.contains("envelope = none"));
        assert!(!text.contains("att ="));
        Ok(())
    }

    #[test]
    fn playback_messages() -> TestResult {
        assert_eq!(render(&Reply::Playing { slot: 2 })?, "Playing effect 2\n");
        assert_eq!(render(&Reply::Stopped { slot: 2 })?, "Stopping effect 2\n");
        assert_eq!(render(&Reply::Quit)?, "");
        Ok(())
    }

    #[test]
    fn input_errors_print_usage() -> TestResult {
        let mut out = Vec::new();
        let error = FfTuneError::from(EncodeError::UnknownWaveform("hexagon".into()));
        write_command_error(&mut out, &error)?;
        let text = String::from_utf8(out)?;
        assert!(text.contains("hexagon"));
        assert!(text.contains("usage:"));
        Ok(())
    }

    #[test]
    fn lookup_errors_are_one_line() -> TestResult {
        let mut out = Vec::new();
        write_command_error(&mut out, &FfTuneError::no_such_effect(5))?;
        assert_eq!(String::from_utf8(out)?, "  No such effect 5\n");
        Ok(())
    }

    #[test]
    fn json_reply_is_tagged() -> TestResult {
        let mut out = Vec::new();
        write_reply_json(
            &mut out,
            &Reply::Listing {
                effects: vec![EffectSummary {
                    slot: 0,
                    kind: EffectKind::Rumble,
                    duration_ms: 500,
                }],
            },
        )?;
        let value: Value = serde_json::from_slice(&out)?;
        assert_eq!(value.pointer("/success"), Some(&Value::Bool(true)));
        assert_eq!(value.pointer("/result/reply"), Some(&Value::from("listing")));
        assert_eq!(value.pointer("/result/effects/0/duration_ms"), Some(&Value::from(500)));
        Ok(())
    }

    #[test]
    fn json_added_carries_notes_and_record() -> TestResult {
        let record = EffectRecord::rumble(100, RumbleParams::default());
        let notes = openracing_fftune::validate("strong_magnitude", "0x10000", 0, 0xffff)
            .note
            .into_iter()
            .collect();
        let mut out = Vec::new();
        write_reply_json(
            &mut out,
            &Reply::Added(AddOutcome {
                slot: 2,
                record,
                notes,
            }),
        )?;
        let value: Value = serde_json::from_slice(&out)?;
        assert_eq!(value.pointer("/result/reply"), Some(&Value::from("added")));
        assert_eq!(value.pointer("/result/slot"), Some(&Value::from(2)));
        assert_eq!(value.pointer("/result/record/payload/kind"), Some(&Value::from("rumble")));
        assert_eq!(
            value.pointer("/result/notes/0/field"),
            Some(&Value::from("strong_magnitude"))
        );
        Ok(())
    }

    #[test]
    fn json_error_has_category() -> TestResult {
        let mut out = Vec::new();
        write_command_error_json(&mut out, &FfTuneError::no_such_effect(7))?;
        let value: Value = serde_json::from_slice(&out)?;
        assert_eq!(value.pointer("/success"), Some(&Value::Bool(false)));
        assert_eq!(value.pointer("/error/category"), Some(&Value::from("lookup")));
        assert_eq!(value.pointer("/error/message"), Some(&Value::from("no such effect 7")));
        Ok(())
    }

    #[test]
    fn json_device_summary_lists_feature_names() -> TestResult {
        let mut out = Vec::new();
        let caps = FfCapabilities::from_features([FfFeature::Rumble, FfFeature::Periodic]);
        write_device_summary_json(&mut out, "pad", caps, 16)?;
        let value: Value = serde_json::from_slice(&out)?;
        assert_eq!(value.pointer("/device/capabilities/1"), Some(&Value::from("FF_PERIODIC")));
        assert_eq!(value.pointer("/device/max_effects"), Some(&Value::from(16)));
        Ok(())
    }

    #[test]
    fn capabilities_fallback() {
        assert_eq!(format_capabilities(FfCapabilities::empty()), "None");
        assert_eq!(
            format_capabilities(FfCapabilities::from_features([FfFeature::Rumble])),
            "FF_RUMBLE"
        );
    }
}

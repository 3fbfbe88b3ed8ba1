//! Interactive command loop.

use std::io::{self, BufRead, Write};

use openracing_fftune::{Command, FfDevice, FfTune, FfTuneError, Reply, dispatch};
use tracing::debug;

use crate::output;

/// Where and how the shell writes.
pub struct ShellOutput<'a, W> {
    pub out: &'a mut W,
    pub prompt: &'a str,
    /// One JSON document per command, no prompt
    pub json: bool,
}

impl<W: Write> ShellOutput<'_, W> {
    fn reply(&mut self, reply: &Reply) -> io::Result<()> {
        if self.json {
            output::write_reply_json(self.out, reply)
        } else {
            output::write_reply(self.out, reply)
        }
    }

    fn error(&mut self, error: &FfTuneError) -> io::Result<()> {
        if self.json {
            output::write_command_error_json(self.out, error)
        } else {
            output::write_command_error(self.out, error)
        }
    }
}

/// Read commands from `input` until `quit` or end of input.
///
/// Command failures are printed and the loop carries on; only I/O errors on
/// the streams end it early.
///
/// # Errors
///
/// Reading `input` or writing `out` failed.
pub fn run<D, R, W>(tune: &mut FfTune<D>, mut input: R, mut sink: ShellOutput<'_, W>) -> io::Result<()>
where
    D: FfDevice,
    R: BufRead,
    W: Write,
{
    let mut line = String::new();
    loop {
        if !sink.json {
            write!(sink.out, "{}", sink.prompt)?;
            sink.out.flush()?;
        }

        line.clear();
        if input.read_line(&mut line)? == 0 {
            debug!("end of input");
            if !sink.json {
                writeln!(sink.out)?;
            }
            return Ok(());
        }

        let command = match Command::parse_line(line.trim()) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(err) => {
                sink.error(&err)?;
                continue;
            }
        };

        match dispatch(tune, command) {
            Ok(Reply::Quit) => return Ok(()),
            Ok(reply) => sink.reply(&reply)?,
            Err(err) => sink.error(&err)?,
        }
    }
}

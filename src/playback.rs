//! Blocking WAV playback on the default output device.

use std::{io::Cursor, path::Path};

use anyhow::{Context, Result};
use log::debug;
use rodio::{Decoder, OutputStream, Sink};

/// Play an in-memory WAV file and return once it has finished.
pub fn play_wav_bytes(wav: Vec<u8>) -> Result<()> {
    let (_stream, handle) =
        OutputStream::try_default().context("Failed to open default audio output")?;
    let sink = Sink::try_new(&handle).context("Failed to create audio sink")?;
    let source = Decoder::new(Cursor::new(wav)).context("Failed to decode WAV")?;
    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}

/// Play a WAV file from disk and return once it has finished.
pub fn play_wav_file(path: &Path) -> Result<()> {
    debug!("playing {}", path.display());
    let wav = std::fs::read(path).with_context(|| format!("Cannot read {}", path.display()))?;
    play_wav_bytes(wav)
}

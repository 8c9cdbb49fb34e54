//! WAV helpers for the in-memory files VOICEVOX returns.
//!
//! The core hands back a complete RIFF file (24 kHz, mono, 16-bit PCM with
//! the stock models).  We only ever need to look at its header, glue several
//! of them together, and put them on disk.

use std::{
    io::Cursor,
    path::Path,
    time::Duration,
};

use log::info;

use crate::error::{Error, Result};

/// Header summary of a WAV buffer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WavInfo {
    pub sample_rate: u32,
    pub channels: u16,
    pub bits_per_sample: u16,
    /// Samples per channel.
    pub frames: u32,
}

impl WavInfo {
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let reader = hound::WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        Ok(Self {
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
            frames: reader.duration(),
        })
    }

    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 {
            return Duration::ZERO;
        }
        Duration::from_secs_f64(self.frames as f64 / self.sample_rate as f64)
    }
}

/// Write `wav` to `path`, creating parent directories.
pub fn save(wav: &[u8], path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, wav)?;
    match WavInfo::from_bytes(wav) {
        Ok(info) => info!(
            "saved {} ({:.2} s, {} Hz)",
            path.display(),
            info.duration().as_secs_f32(),
            info.sample_rate
        ),
        Err(_) => info!("saved {} ({} bytes)", path.display(), wav.len()),
    }
    Ok(())
}

/// Concatenate integer-PCM WAV files that share one format.
///
/// An empty slice yields an empty buffer; a single element is returned as-is.
pub fn concat(parts: &[Vec<u8>]) -> Result<Vec<u8>> {
    match parts {
        [] => return Ok(Vec::new()),
        [only] => return Ok(only.clone()),
        _ => {}
    }

    let first = hound::WavReader::new(Cursor::new(&parts[0]))?.spec();
    if first.sample_format != hound::SampleFormat::Int {
        return Err(Error::WavFormatMismatch("only integer PCM can be joined".into()));
    }

    let mut out = Vec::new();
    {
        let mut writer = hound::WavWriter::new(Cursor::new(&mut out), first)?;
        for (i, part) in parts.iter().enumerate() {
            let mut reader = hound::WavReader::new(Cursor::new(part))?;
            let spec = reader.spec();
            if spec != first {
                return Err(Error::WavFormatMismatch(format!(
                    "part {i} is {} Hz/{} ch/{} bit, expected {} Hz/{} ch/{} bit",
                    spec.sample_rate,
                    spec.channels,
                    spec.bits_per_sample,
                    first.sample_rate,
                    first.channels,
                    first.bits_per_sample
                )));
            }
            for sample in reader.samples::<i32>() {
                writer.write_sample(sample?)?;
            }
        }
        writer.finalize()?;
    }
    Ok(out)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// A 16-bit mono WAV holding `samples` at `rate` Hz.
    pub(crate) fn make_wav(rate: u32, samples: &[i16]) -> Vec<u8> {
        let spec = hound::WavSpec {
            channels: 1,
            sample_rate: rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };
        let mut buf = Vec::new();
        {
            let mut w = hound::WavWriter::new(Cursor::new(&mut buf), spec).unwrap();
            for &s in samples {
                w.write_sample(s).unwrap();
            }
            w.finalize().unwrap();
        }
        buf
    }

    #[test]
    fn test_info() {
        let wav = make_wav(24_000, &vec![0; 12_000]);
        let info = WavInfo::from_bytes(&wav).unwrap();
        assert_eq!(info.sample_rate, 24_000);
        assert_eq!(info.channels, 1);
        assert_eq!(info.frames, 12_000);
        assert_eq!(info.duration(), Duration::from_millis(500));
    }

    #[test]
    fn test_info_rejects_garbage() {
        assert!(matches!(WavInfo::from_bytes(b"not a wav"), Err(Error::Wav(_))));
    }

    #[test]
    fn test_concat_joins_samples() {
        let a = make_wav(24_000, &[1, 2, 3]);
        let b = make_wav(24_000, &[4, 5]);
        let joined = concat(&[a, b]).unwrap();
        let samples: Vec<i16> = hound::WavReader::new(Cursor::new(joined))
            .unwrap()
            .samples::<i16>()
            .map(|s| s.unwrap())
            .collect();
        assert_eq!(samples, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_concat_edge_cases() {
        assert!(concat(&[]).unwrap().is_empty());
        let a = make_wav(24_000, &[7]);
        assert_eq!(concat(std::slice::from_ref(&a)).unwrap(), a);
    }

    #[test]
    fn test_concat_rejects_mixed_rates() {
        let a = make_wav(24_000, &[1]);
        let b = make_wav(48_000, &[1]);
        assert!(matches!(concat(&[a, b]), Err(Error::WavFormatMismatch(_))));
    }

    #[test]
    fn test_save_creates_parents() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("out").join("speech.wav");
        let wav = make_wav(24_000, &[0, 1]);
        save(&wav, &path).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), wav);
    }
}

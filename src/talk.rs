//! End-to-end flows: text (or an LLM answer) → WAV on disk → playback.
//!
//! Synthesis and the LLM sit behind small traits so the flows can be
//! exercised without the native library or the network.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::info;

use crate::{text, wav};

/// Phrases spoken when `say` is given no text.
pub const DEFAULT_PHRASES: &[&str] = &["今日の天気は晴れです。", "あかさたなはまやらわ"];

/// Longest sentence handed to the synthesizer in one call.
pub const SENTENCE_MAX_CHARS: usize = 120;

/// Name of the output file written next to the executable.
pub const OUTPUT_FILE_NAME: &str = "speech.wav";

/// Text → complete WAV file.
pub trait SpeechSynthesizer {
    fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Prompt → answer text.
pub trait Prompter {
    fn prompt(&self, prompt: &str) -> Result<String>;
}

/// `speech.wav` beside the running executable.
pub fn default_output_path() -> Result<PathBuf> {
    let exe = std::env::current_exe().context("Cannot locate the running executable")?;
    let dir = exe.parent().map(Path::to_path_buf).unwrap_or_default();
    Ok(dir.join(OUTPUT_FILE_NAME))
}

/// Speak each phrase in turn: synthesise, save to `dest`, hand `dest` to `play`.
///
/// `dest` is overwritten for every phrase, so `play` must finish with the
/// file before returning.
pub fn speak_all<S, P>(synth: &S, phrases: &[&str], dest: &Path, mut play: P) -> Result<()>
where
    S: SpeechSynthesizer + ?Sized,
    P: FnMut(&Path) -> Result<()>,
{
    for phrase in phrases {
        let audio = synth.synthesize(phrase)?;
        wav::save(&audio, dest).with_context(|| format!("Cannot write {}", dest.display()))?;
        play(dest)?;
    }
    Ok(())
}

/// Ask `prompter`, then speak the cleaned answer as one WAV at `dest`.
///
/// Returns the cleaned text that was spoken.
pub fn ask_and_speak<Q, S, P>(
    prompter: &Q,
    synth: &S,
    prompt: &str,
    dest: &Path,
    mut play: P,
) -> Result<String>
where
    Q: Prompter + ?Sized,
    S: SpeechSynthesizer + ?Sized,
    P: FnMut(&Path) -> Result<()>,
{
    let answer = prompter.prompt(prompt)?;
    let spoken = text::clean_for_speech(&answer);
    let sentences = text::split_sentences(&spoken, SENTENCE_MAX_CHARS);
    if sentences.is_empty() {
        bail!("Nothing to say: the answer was empty after cleanup ({answer:?})");
    }
    info!("speaking {} sentence(s)", sentences.len());

    let parts = sentences
        .iter()
        .map(|s| synth.synthesize(s))
        .collect::<Result<Vec<_>>>()?;
    let audio = wav::concat(&parts).context("Failed to join sentence audio")?;
    wav::save(&audio, dest).with_context(|| format!("Cannot write {}", dest.display()))?;
    play(dest)?;
    Ok(spoken)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wav::tests::make_wav;
    use std::cell::RefCell;

    /// Emits one sample per character so output length is checkable.
    struct FakeSynth {
        calls: RefCell<Vec<String>>,
    }

    impl FakeSynth {
        fn new() -> Self {
            Self { calls: RefCell::new(Vec::new()) }
        }
    }

    impl SpeechSynthesizer for FakeSynth {
        fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
            if text.contains("失敗") {
                bail!("synthesis failed");
            }
            self.calls.borrow_mut().push(text.to_string());
            Ok(make_wav(24_000, &vec![1; text.chars().count()]))
        }
    }

    struct FixedAnswer(&'static str);

    impl Prompter for FixedAnswer {
        fn prompt(&self, _prompt: &str) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn test_speak_all_plays_each_phrase() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join(OUTPUT_FILE_NAME);
        let synth = FakeSynth::new();
        let mut played = Vec::new();

        speak_all(&synth, DEFAULT_PHRASES, &dest, |p| {
            let info = wav::WavInfo::from_bytes(&std::fs::read(p)?)?;
            played.push(info.frames);
            Ok(())
        })
        .unwrap();

        assert_eq!(*synth.calls.borrow(), DEFAULT_PHRASES);
        assert_eq!(played, vec![11, 10]);
    }

    #[test]
    fn test_speak_all_stops_on_error() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join(OUTPUT_FILE_NAME);
        let synth = FakeSynth::new();
        let mut plays = 0;

        let result = speak_all(&synth, &["一つ目", "失敗", "三つ目"], &dest, |_| {
            plays += 1;
            Ok(())
        });

        assert!(result.is_err());
        assert_eq!(plays, 1);
    }

    #[test]
    fn test_ask_and_speak_cleans_and_joins() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join(OUTPUT_FILE_NAME);
        let synth = FakeSynth::new();
        let prompter = FixedAnswer("**はい**。\n- 晴れです！");
        let mut played = None;

        let spoken = ask_and_speak(&prompter, &synth, "天気は？", &dest, |p| {
            played = Some(wav::WavInfo::from_bytes(&std::fs::read(p)?)?.frames);
            Ok(())
        })
        .unwrap();

        assert_eq!(spoken, "はい。\n晴れです！");
        assert_eq!(*synth.calls.borrow(), vec!["はい。", "晴れです！"]);
        assert_eq!(played, Some(3 + 5));
    }

    #[test]
    fn test_ask_and_speak_empty_answer() {
        let tmp = tempfile::tempdir().unwrap();
        let dest = tmp.path().join(OUTPUT_FILE_NAME);
        let result = ask_and_speak(&FixedAnswer("```\n```"), &FakeSynth::new(), "?", &dest, |_| Ok(()));
        assert!(result.is_err());
        assert!(!dest.exists());
    }

    #[test]
    fn test_default_output_path() {
        let path = default_output_path().unwrap();
        assert_eq!(path.file_name().unwrap(), OUTPUT_FILE_NAME);
    }
}

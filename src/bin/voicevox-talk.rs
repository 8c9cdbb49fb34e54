//! `voicevox-talk`: speak Japanese text (or a Gemini answer) through VOICEVOX CORE.
//!
//! Usage:
//!   voicevox-talk say                         # the two built-in phrases
//!   voicevox-talk say 今日の天気は晴れです。
//!   voicevox-talk --style 1 ask "明日の予定を一文で励まして"
//!   voicevox-talk speakers
//!   voicevox-talk version
//!
//! Logging is controlled with `RUST_LOG` (default `info`).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use voicevox_talk::{
    config::{parse_acceleration, Settings},
    handles::VoicevoxCore,
    layout::ModelSelection,
    metas, playback,
    talk::{self, SpeechSynthesizer},
    AccelerationMode, Engine, StyleId,
};

#[derive(Parser, Debug)]
#[command(name = "voicevox-talk", version, about = "Japanese TTS via VOICEVOX CORE")]
struct Cli {
    /// JSON settings file (default: voicevox-talk.json beside the executable)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// VOICEVOX CORE distribution root
    #[arg(long, global = true)]
    core_dir: Option<PathBuf>,

    /// Style id to speak with
    #[arg(long, short, global = true)]
    style: Option<StyleId>,

    /// Voice models to load: "all" or e.g. "0,3"
    #[arg(long, global = true)]
    models: Option<String>,

    /// Inference device: auto, cpu or gpu
    #[arg(long, global = true, value_parser = parse_accel_arg)]
    accel: Option<AccelerationMode>,

    /// Shorthand for `--accel gpu`
    #[arg(long, global = true, conflicts_with = "accel")]
    gpu: bool,

    /// CPU threads for inference (0 = library default)
    #[arg(long, global = true)]
    cpu_threads: Option<u16>,

    /// Where to write the WAV (default: speech.wav beside the executable)
    #[arg(long, short, global = true)]
    output: Option<PathBuf>,

    /// Write the WAV but do not play it
    #[arg(long, global = true)]
    no_play: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Speak each argument as a separate phrase
    Say {
        /// Treat input as AquesTalk-style kana
        #[arg(long)]
        kana: bool,
        text: Vec<String>,
    },
    /// Ask Gemini and speak the answer
    Ask { prompt: String },
    /// List speakers and style ids of the loaded models
    Speakers,
    /// Print the VOICEVOX CORE version
    Version,
}

fn parse_accel_arg(s: &str) -> Result<AccelerationMode, String> {
    parse_acceleration(s).ok_or_else(|| format!("expected auto, cpu or gpu, got {s:?}"))
}

/// Routes [`SpeechSynthesizer`] calls to the kana entry point.
struct Kana<'a>(&'a Engine);

impl SpeechSynthesizer for Kana<'_> {
    fn synthesize(&self, kana: &str) -> Result<Vec<u8>> {
        self.0
            .synthesize_kana(kana)
            .with_context(|| format!("Synthesis failed for kana {kana:?}"))
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let mut settings = Settings::load(cli.config.as_deref())?;
    if let Some(dir) = &cli.core_dir {
        settings.core_dir = Some(dir.clone());
    }
    if let Some(style) = cli.style {
        settings.style_id = Some(style);
    }
    if let Some(models) = &cli.models {
        settings.models = Some(models.clone());
    }
    if let Some(threads) = cli.cpu_threads {
        settings.cpu_num_threads = threads;
    }
    if let Some(out) = &cli.output {
        settings.output = Some(out.clone());
    }

    let mut engine_config = settings.engine_config()?;
    if let Some(accel) = cli.accel {
        engine_config.acceleration_mode = accel;
    }
    if cli.gpu {
        engine_config.acceleration_mode = AccelerationMode::Gpu;
    }

    let dest = match &settings.output {
        Some(path) => path.clone(),
        None => talk::default_output_path()?,
    };
    let no_play = cli.no_play;
    let play = move |path: &Path| -> Result<()> {
        if no_play {
            return Ok(());
        }
        playback::play_wav_file(path)
    };

    match cli.command {
        Command::Version => {
            let core = VoicevoxCore::load(&engine_config.layout.core_library())?;
            println!("{}", core.version());
        }
        Command::Speakers => {
            // Listing wants every style, whatever the settings select.
            engine_config.models = ModelSelection::All;
            let engine = Engine::open(&engine_config)?;
            let speakers = engine.metas()?;
            for (speaker, style, id) in metas::style_table(&speakers) {
                println!("{id:>4}  {speaker} ({style})");
            }
        }
        Command::Say { kana, text } => {
            let engine = Engine::open(&engine_config)?;
            info!("初期化完了");
            let phrases: Vec<&str> = if text.is_empty() {
                talk::DEFAULT_PHRASES.to_vec()
            } else {
                text.iter().map(String::as_str).collect()
            };
            if kana {
                talk::speak_all(&Kana(&engine), &phrases, &dest, play)?;
            } else {
                talk::speak_all(&engine, &phrases, &dest, play)?;
            }
        }
        Command::Ask { prompt } => {
            let gemini = settings.gemini_client()?;
            let engine = Engine::open(&engine_config)?;
            let spoken = talk::ask_and_speak(&gemini, &engine, &prompt, &dest, play)?;
            println!("{spoken}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_say_with_globals() {
        let cli = Cli::try_parse_from([
            "voicevox-talk", "say", "--kana", "--style", "1", "--accel", "gpu", "コンニチワ'",
        ])
        .unwrap();
        assert_eq!(cli.style, Some(1));
        assert_eq!(cli.accel, Some(AccelerationMode::Gpu));
        match cli.command {
            Command::Say { kana, text } => {
                assert!(kana);
                assert_eq!(text, vec!["コンニチワ'"]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_gpu_shorthand() {
        let cli = Cli::try_parse_from(["voicevox-talk", "speakers", "--gpu"]).unwrap();
        assert!(cli.gpu);
        assert_eq!(cli.accel, None);
        assert!(
            Cli::try_parse_from(["voicevox-talk", "--gpu", "--accel", "cpu", "version"]).is_err()
        );
    }

    #[test]
    fn test_rejects_bad_accel() {
        assert!(Cli::try_parse_from(["voicevox-talk", "--accel", "tpu", "version"]).is_err());
    }
}

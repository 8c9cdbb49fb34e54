//! Basic voicevox-talk example: loads VOICEVOX CORE and writes a WAV file.
//!
//! Usage:
//!   cargo run --example basic -- --core-dir /opt/voicevox_core
//!   cargo run --example basic -- --core-dir ./voicevox_core --style 1 --text "こんにちは"
//!
//! Requirements:
//!   - an unpacked VOICEVOX CORE distribution (c_api/, onnxruntime/, dict/, models/)

use std::path::Path;

use voicevox_talk::{wav::WavInfo, Engine, EngineConfig, Layout, ModelSelection};

fn main() -> anyhow::Result<()> {
    // ── Parse simple CLI arguments ───────────────────────────────────────────
    let mut args = std::env::args().skip(1);

    let mut core_dir = "voicevox_core".to_string();
    let mut style    = 3u32;
    let mut model    = None;
    let mut text     = "今日の天気は晴れです。".to_string();
    let mut output   = "speech.wav".to_string();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--core-dir" => { if let Some(v) = args.next() { core_dir = v; } }
            "--style"    => { if let Some(v) = args.next() { style = v.parse().unwrap_or(3); } }
            "--model"    => { if let Some(v) = args.next() { model = v.parse::<u32>().ok(); } }
            "--text"     => { if let Some(v) = args.next() { text = v; } }
            "--output"   => { if let Some(v) = args.next() { output = v; } }
            "--help"     => {
                println!(
                    "Usage: basic [--core-dir DIR] [--style ID] [--model N] \
                     [--text TEXT] [--output FILE]"
                );
                return Ok(());
            }
            _ => {}
        }
    }

    println!("Core   : {}", core_dir);
    println!("Style  : {}", style);
    println!("Text   : {:?}", text);
    println!("Output : {}", output);
    println!();

    // ── Load ─────────────────────────────────────────────────────────────────
    let mut config = EngineConfig::new(Layout::new(&core_dir));
    config.style_id = style;
    if let Some(n) = model {
        config.models = ModelSelection::Numbers(vec![n]);
    }
    let engine = Engine::open(&config)?;
    println!("VOICEVOX CORE {}", engine.core().version());

    // ── Synthesise ───────────────────────────────────────────────────────────
    let audio = engine.synthesize(&text)?;
    let info = WavInfo::from_bytes(&audio)?;
    voicevox_talk::wav::save(&audio, Path::new(&output))?;

    println!("{:.2} s at {} Hz", info.duration().as_secs_f32(), info.sample_rate);
    Ok(())
}

//! # voicevox-talk
//!
//! Drive the [VOICEVOX CORE](https://github.com/VOICEVOX/voicevox_core) native
//! library from Rust: synthesise Japanese speech, optionally voice an answer
//! from Gemini, and play it back.
//!
//! ## Quick start
//!
//! ```no_run
//! use voicevox_talk::{Engine, EngineConfig, Layout};
//!
//! // Unpacked VOICEVOX CORE distribution (c_api/, onnxruntime/, dict/, models/)
//! let config = EngineConfig::new(Layout::new("/opt/voicevox_core"));
//! let engine = Engine::open(&config).unwrap();
//!
//! engine
//!     .synthesize_to_file("今日の天気は晴れです。", std::path::Path::new("speech.wav"))
//!     .unwrap();
//! ```
//!
//! ## Asking Gemini
//!
//! ```no_run
//! use voicevox_talk::{talk, Engine, EngineConfig, GeminiClient, Layout};
//!
//! let engine = Engine::open(&EngineConfig::new(Layout::new("/opt/voicevox_core"))).unwrap();
//! let gemini = GeminiClient::new(std::env::var("GEMINI_API_KEY").unwrap()).unwrap();
//! let spoken = talk::ask_and_speak(
//!     &gemini,
//!     &engine,
//!     "今日のおすすめの晩ごはんを一文で教えて",
//!     std::path::Path::new("answer.wav"),
//!     |_| Ok(()),
//! )
//! .unwrap();
//! println!("{spoken}");
//! ```
//!
//! ## Runtime requirements
//! | What                    | Where                                             |
//! |-------------------------|---------------------------------------------------|
//! | core library            | `<root>/c_api/lib/{voicevox_core.dll, libvoicevox_core.so, libvoicevox_core.dylib}` |
//! | ONNX runtime            | `<root>/onnxruntime/lib/` (name reported by the core) |
//! | Open JTalk dictionary   | `<root>/dict/open_jtalk_dic_utf_8-1.11/`          |
//! | voice models            | `<root>/models/vvms/*.vvm`                        |
//!
//! Nothing is linked at build time; the core library is opened with
//! `libloading` when [`Engine::open`] runs.
//!
//! ## Pipeline
//! 1. **Load**: core library, ONNX runtime, dictionary, synthesizer, models.
//! 2. **Prompt** (optional): Gemini `generateContent`.
//! 3. **Clean**: Markdown/URLs stripped, answer split into sentences.
//! 4. **Synthesise**: `voicevox_synthesizer_tts` per sentence.
//! 5. **Concat / save**: one WAV on disk.
//! 6. **Play**: rodio, blocking until done (`playback` feature).

pub mod config;
pub mod engine;
pub mod error;
pub mod gemini;
pub mod handles;
pub mod layout;
pub mod metas;
pub mod result_code;
pub mod sys;
pub mod talk;
pub mod text;
pub mod wav;

#[cfg(feature = "playback")]
pub mod playback;

// ─── Re-exports for convenience ─────────────────────────────────────────────

pub use config::Settings;
pub use engine::{Engine, EngineConfig};
pub use error::{Error, Result};
pub use gemini::GeminiClient;
pub use layout::{Layout, ModelSelection};
pub use result_code::ResultCode;
pub use sys::{AccelerationMode, StyleId};

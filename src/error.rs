//! Errors raised while driving the native library.
//!
//! Higher-level flows ([`crate::talk`], [`crate::gemini`], the CLI) wrap these
//! in `anyhow` with context; this enum keeps the native failure modes
//! matchable.

use std::path::PathBuf;

use thiserror::Error;

use crate::result_code::ResultCode;

#[derive(Debug, Error)]
pub enum Error {
    #[error("cannot load VOICEVOX CORE library {}: {source}", .path.display())]
    LibraryLoad {
        path: PathBuf,
        #[source]
        source: libloading::Error,
    },

    #[error("symbol `{symbol}` not found in {}: {source}", .path.display())]
    MissingSymbol {
        path: PathBuf,
        symbol: &'static str,
        #[source]
        source: libloading::Error,
    },

    /// A core function returned something other than `VOICEVOX_RESULT_OK`.
    #[error("{function}() failed: {message} [{code}]")]
    Core {
        function: &'static str,
        code: ResultCode,
        message: String,
    },

    #[error("{what} contains a NUL byte")]
    InteriorNul { what: &'static str },

    #[error("voice model {} not found", .0.display())]
    ModelNotFound(PathBuf),

    #[error("no voice models (*.vvm) under {}", .0.display())]
    NoModels(PathBuf),

    #[error("WAV data: {0}")]
    Wav(#[from] hound::Error),

    #[error("WAV buffers differ in format: {0}")]
    WavFormatMismatch(String),

    #[error("speaker metas: {0}")]
    Metas(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

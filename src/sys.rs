//! Raw binary interface of the VOICEVOX CORE 0.16 C API.
//!
//! The library is opened at runtime with [`libloading`] rather than linked by
//! a build script: the distribution ships `voicevox_core.{dll,so,dylib}` next
//! to the application, and its ONNX runtime is in turn loaded by the core
//! library itself.  Keeping the crate free of link-time dependencies means it
//! builds on machines that have never seen VOICEVOX.
//!
//! Only the subset of the API this crate drives is mirrored here.  Layouts
//! follow `voicevox_core.h`.

use std::{os::raw::c_char, path::Path};

use libloading::Library;

use crate::error::{Error, Result};

// ─── Value types ──────────────────────────────────────────────────────────────

/// Style identifier (`VoicevoxStyleId`).
pub type StyleId = u32;

/// Raw `VoicevoxResultCode`; interpret it with [`crate::ResultCode`].
pub type RawResultCode = i32;

/// Hardware used for inference.
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AccelerationMode {
    /// Let the library decide (GPU when available).
    #[default]
    Auto = 0,
    Cpu = 1,
    Gpu = 2,
}

/// `VoicevoxInitializeOptions`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct InitializeOptions {
    pub acceleration_mode: AccelerationMode,
    /// `0` lets the library pick half of the logical cores.
    pub cpu_num_threads: u16,
}

/// `VoicevoxLoadOnnxruntimeOptions`
#[repr(C)]
#[derive(Debug, Clone, Copy)]
pub struct LoadOnnxruntimeOptions {
    /// Path or bare filename of the ONNX runtime shared library.
    pub filename: *const c_char,
}

/// `VoicevoxTtsOptions`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtsOptions {
    /// Raise the pitch at the end of interrogative sentences.
    pub enable_interrogative_upspeak: bool,
}

impl Default for TtsOptions {
    fn default() -> Self {
        Self { enable_interrogative_upspeak: true }
    }
}

// ─── Opaque handles ───────────────────────────────────────────────────────────

#[repr(C)]
pub struct VoicevoxOnnxruntime {
    _private: [u8; 0],
}

#[repr(C)]
pub struct OpenJtalkRc {
    _private: [u8; 0],
}

#[repr(C)]
pub struct VoicevoxSynthesizer {
    _private: [u8; 0],
}

#[repr(C)]
pub struct VoicevoxVoiceModelFile {
    _private: [u8; 0],
}

// ─── Function table ───────────────────────────────────────────────────────────

/// Resolved entry points of a loaded core library.
///
/// The pointers are only valid while `_lib` is alive, which is why the table
/// owns the [`Library`] and is always shared behind an `Arc`.
pub struct CoreApi {
    pub get_version: unsafe extern "C" fn() -> *const c_char,
    pub get_onnxruntime_lib_versioned_filename: unsafe extern "C" fn() -> *const c_char,
    pub make_default_load_onnxruntime_options:
        unsafe extern "C" fn() -> LoadOnnxruntimeOptions,
    pub make_default_initialize_options: unsafe extern "C" fn() -> InitializeOptions,
    pub make_default_tts_options: unsafe extern "C" fn() -> TtsOptions,

    pub onnxruntime_load_once: unsafe extern "C" fn(
        options: LoadOnnxruntimeOptions,
        out_onnxruntime: *mut *const VoicevoxOnnxruntime,
    ) -> RawResultCode,

    pub open_jtalk_rc_new: unsafe extern "C" fn(
        open_jtalk_dic_dir: *const c_char,
        out_open_jtalk: *mut *mut OpenJtalkRc,
    ) -> RawResultCode,
    pub open_jtalk_rc_delete: unsafe extern "C" fn(open_jtalk: *mut OpenJtalkRc),

    pub synthesizer_new: unsafe extern "C" fn(
        onnxruntime: *const VoicevoxOnnxruntime,
        open_jtalk: *const OpenJtalkRc,
        options: InitializeOptions,
        out_synthesizer: *mut *mut VoicevoxSynthesizer,
    ) -> RawResultCode,
    pub synthesizer_delete: unsafe extern "C" fn(synthesizer: *mut VoicevoxSynthesizer),
    pub synthesizer_is_gpu_mode:
        unsafe extern "C" fn(synthesizer: *const VoicevoxSynthesizer) -> bool,
    pub synthesizer_create_metas_json:
        unsafe extern "C" fn(synthesizer: *const VoicevoxSynthesizer) -> *mut c_char,
    pub synthesizer_load_voice_model: unsafe extern "C" fn(
        synthesizer: *const VoicevoxSynthesizer,
        model: *const VoicevoxVoiceModelFile,
    ) -> RawResultCode,

    /// Shared signature of `voicevox_synthesizer_tts` and `…_tts_from_kana`.
    pub synthesizer_tts: TtsFn,
    pub synthesizer_tts_from_kana: TtsFn,

    pub voice_model_file_open: unsafe extern "C" fn(
        path: *const c_char,
        out_model: *mut *mut VoicevoxVoiceModelFile,
    ) -> RawResultCode,
    pub voice_model_file_delete: unsafe extern "C" fn(model: *mut VoicevoxVoiceModelFile),

    pub wav_free: unsafe extern "C" fn(wav: *mut u8),
    pub json_free: unsafe extern "C" fn(json: *mut c_char),
    pub error_result_to_message: unsafe extern "C" fn(code: RawResultCode) -> *const c_char,

    _lib: Library,
}

pub type TtsFn = unsafe extern "C" fn(
    synthesizer: *const VoicevoxSynthesizer,
    text: *const c_char,
    style_id: StyleId,
    options: TtsOptions,
    output_wav_length: *mut usize,
    output_wav: *mut *mut u8,
) -> RawResultCode;

/// Copy one symbol out of `lib`, naming it in the error when it is absent.
///
/// # Safety
/// `T` must match the C signature of `name`.
unsafe fn symbol<T: Copy>(lib: &Library, path: &Path, name: &'static str) -> Result<T> {
    let mut cname = Vec::with_capacity(name.len() + 1);
    cname.extend_from_slice(name.as_bytes());
    cname.push(0);
    let sym = unsafe { lib.get::<T>(&cname) }.map_err(|source| Error::MissingSymbol {
        path: path.to_path_buf(),
        symbol: name,
        source,
    })?;
    Ok(*sym)
}

impl CoreApi {
    /// Open the core library at `path` and resolve every entry point.
    pub fn load(path: &Path) -> Result<Self> {
        // SAFETY: loading runs the library's initialisers; VOICEVOX CORE has
        // no initialiser side-effects beyond its own statics.
        let lib = unsafe { Library::new(path) }.map_err(|source| Error::LibraryLoad {
            path: path.to_path_buf(),
            source,
        })?;

        // SAFETY: every signature below mirrors voicevox_core.h (0.16).
        unsafe {
            Ok(Self {
                get_version: symbol(&lib, path, "voicevox_get_version")?,
                get_onnxruntime_lib_versioned_filename: symbol(
                    &lib,
                    path,
                    "voicevox_get_onnxruntime_lib_versioned_filename",
                )?,
                make_default_load_onnxruntime_options: symbol(
                    &lib,
                    path,
                    "voicevox_make_default_load_onnxruntime_options",
                )?,
                make_default_initialize_options: symbol(
                    &lib,
                    path,
                    "voicevox_make_default_initialize_options",
                )?,
                make_default_tts_options: symbol(&lib, path, "voicevox_make_default_tts_options")?,
                onnxruntime_load_once: symbol(&lib, path, "voicevox_onnxruntime_load_once")?,
                open_jtalk_rc_new: symbol(&lib, path, "voicevox_open_jtalk_rc_new")?,
                open_jtalk_rc_delete: symbol(&lib, path, "voicevox_open_jtalk_rc_delete")?,
                synthesizer_new: symbol(&lib, path, "voicevox_synthesizer_new")?,
                synthesizer_delete: symbol(&lib, path, "voicevox_synthesizer_delete")?,
                synthesizer_is_gpu_mode: symbol(&lib, path, "voicevox_synthesizer_is_gpu_mode")?,
                synthesizer_create_metas_json: symbol(
                    &lib,
                    path,
                    "voicevox_synthesizer_create_metas_json",
                )?,
                synthesizer_load_voice_model: symbol(
                    &lib,
                    path,
                    "voicevox_synthesizer_load_voice_model",
                )?,
                synthesizer_tts: symbol(&lib, path, "voicevox_synthesizer_tts")?,
                synthesizer_tts_from_kana: symbol(&lib, path, "voicevox_synthesizer_tts_from_kana")?,
                voice_model_file_open: symbol(&lib, path, "voicevox_voice_model_file_open")?,
                voice_model_file_delete: symbol(&lib, path, "voicevox_voice_model_file_delete")?,
                wav_free: symbol(&lib, path, "voicevox_wav_free")?,
                json_free: symbol(&lib, path, "voicevox_json_free")?,
                error_result_to_message: symbol(&lib, path, "voicevox_error_result_to_message")?,
                _lib: lib,
            })
        }
    }
}

//! Safe handles over [`CoreApi`].
//!
//! Each native object gets an owning Rust type that frees it on drop and
//! holds an `Arc<VoicevoxCore>` so the library cannot be unloaded underneath
//! it.  Ownership mirrors the C API:
//!
//! | Handle            | Created by                        | Freed by                          |
//! |-------------------|-----------------------------------|-----------------------------------|
//! | [`Onnxruntime`]   | `voicevox_onnxruntime_load_once`  | never (process-global)            |
//! | [`OpenJtalk`]     | `voicevox_open_jtalk_rc_new`      | `voicevox_open_jtalk_rc_delete`   |
//! | [`Synthesizer`]   | `voicevox_synthesizer_new`        | `voicevox_synthesizer_delete`     |
//! | [`VoiceModelFile`]| `voicevox_voice_model_file_open`  | `voicevox_voice_model_file_delete`|
//! | WAV buffers       | `voicevox_synthesizer_tts*`       | `voicevox_wav_free`               |
//! | metas JSON        | `…_create_metas_json`             | `voicevox_json_free`              |

use std::{
    ffi::{CStr, CString},
    os::raw::c_char,
    path::Path,
    ptr,
    sync::Arc,
};

use log::{debug, info};

use crate::{
    error::{Error, Result},
    metas::{self, SpeakerMeta},
    result_code::ResultCode,
    sys::{
        CoreApi, InitializeOptions, LoadOnnxruntimeOptions, OpenJtalkRc, RawResultCode, StyleId,
        TtsFn, TtsOptions, VoicevoxOnnxruntime, VoicevoxSynthesizer, VoicevoxVoiceModelFile,
    },
};

// ─── Helpers ──────────────────────────────────────────────────────────────────

fn to_cstring(s: &str, what: &'static str) -> Result<CString> {
    CString::new(s).map_err(|_| Error::InteriorNul { what })
}

fn path_to_cstring(path: &Path, what: &'static str) -> Result<CString> {
    to_cstring(&path.to_string_lossy(), what)
}

/// Copy a library-owned C string.  Null maps to an empty string.
unsafe fn borrowed_str(ptr: *const c_char) -> String {
    if ptr.is_null() {
        return String::new();
    }
    unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
}

// ─── Library ──────────────────────────────────────────────────────────────────

/// A loaded `voicevox_core` dynamic library.
pub struct VoicevoxCore {
    api: CoreApi,
}

impl VoicevoxCore {
    pub fn load(path: &Path) -> Result<Arc<Self>> {
        info!("loading VOICEVOX CORE from {}", path.display());
        let api = CoreApi::load(path)?;
        let core = Arc::new(Self { api });
        info!("VOICEVOX CORE {} loaded", core.version());
        Ok(core)
    }

    pub fn api(&self) -> &CoreApi {
        &self.api
    }

    /// Library version, e.g. `"0.16.0"`.
    pub fn version(&self) -> String {
        // SAFETY: returns a static string owned by the library.
        unsafe { borrowed_str((self.api.get_version)()) }
    }

    /// The library's own description of `code`.
    pub fn error_message(&self, code: ResultCode) -> String {
        // SAFETY: returns a static string owned by the library.
        unsafe { borrowed_str((self.api.error_result_to_message)(code.raw())) }
    }

    /// Filename of the ONNX runtime this core expects,
    /// e.g. `libvoicevox_onnxruntime.so.1.17.3`.
    pub fn onnxruntime_versioned_filename(&self) -> String {
        // SAFETY: returns a static string owned by the library.
        unsafe { borrowed_str((self.api.get_onnxruntime_lib_versioned_filename)()) }
    }

    pub fn default_initialize_options(&self) -> InitializeOptions {
        // SAFETY: plain value-returning call.
        unsafe { (self.api.make_default_initialize_options)() }
    }

    pub fn default_tts_options(&self) -> TtsOptions {
        // SAFETY: plain value-returning call.
        unsafe { (self.api.make_default_tts_options)() }
    }

    /// Turn a raw status into `Ok(())` or an [`Error::Core`] carrying the
    /// library's message.
    pub fn check(&self, function: &'static str, raw: RawResultCode) -> Result<()> {
        let code = ResultCode::from(raw);
        if code.is_ok() {
            return Ok(());
        }
        Err(Error::Core { function, code, message: self.error_message(code) })
    }
}

// ─── ONNX runtime ─────────────────────────────────────────────────────────────

/// The process-wide inference runtime.
///
/// `voicevox_onnxruntime_load_once` returns the same pointer on every call and
/// the runtime lives until process exit, so this handle is `Copy`-cheap to
/// clone and has no destructor.
#[derive(Clone)]
pub struct Onnxruntime {
    core: Arc<VoicevoxCore>,
    ptr: *const VoicevoxOnnxruntime,
}

// SAFETY: the native runtime is immutable after load and documented as
// shareable between threads.
unsafe impl Send for Onnxruntime {}
unsafe impl Sync for Onnxruntime {}

impl Onnxruntime {
    /// Load the runtime.  `filename` is passed to the dynamic loader as-is, so
    /// either an absolute path or a name on the loader's search path works.
    /// `None` keeps the library's default (`voicevox_make_default_load_onnxruntime_options`).
    pub fn load_once(core: &Arc<VoicevoxCore>, filename: Option<&Path>) -> Result<Self> {
        let api = core.api();
        let owned = filename.map(|p| path_to_cstring(p, "ONNX runtime path")).transpose()?;

        // SAFETY: the default options point at a static string in the library.
        let mut options: LoadOnnxruntimeOptions =
            unsafe { (api.make_default_load_onnxruntime_options)() };
        if let Some(owned) = &owned {
            options.filename = owned.as_ptr();
        }
        // SAFETY: options.filename is either static or `owned`, alive across the call.
        debug!("onnxruntime filename: {}", unsafe { borrowed_str(options.filename) });

        let mut out: *const VoicevoxOnnxruntime = ptr::null();
        // SAFETY: `out` is a valid out-pointer.
        let rc = unsafe { (api.onnxruntime_load_once)(options, &mut out) };
        core.check("voicevox_onnxruntime_load_once", rc)?;
        Ok(Self { core: Arc::clone(core), ptr: out })
    }

    pub fn as_ptr(&self) -> *const VoicevoxOnnxruntime {
        self.ptr
    }

    pub fn core(&self) -> &Arc<VoicevoxCore> {
        &self.core
    }
}

// ─── Open JTalk dictionary ────────────────────────────────────────────────────

/// A loaded Open JTalk system dictionary.
pub struct OpenJtalk {
    core: Arc<VoicevoxCore>,
    ptr: *mut OpenJtalkRc,
}

impl OpenJtalk {
    pub fn new(core: &Arc<VoicevoxCore>, dict_dir: &Path) -> Result<Self> {
        info!("loading Open JTalk dictionary {}", dict_dir.display());
        let dir = path_to_cstring(dict_dir, "dictionary path")?;
        let mut out: *mut OpenJtalkRc = ptr::null_mut();
        // SAFETY: `dir` outlives the call; `out` is a valid out-pointer.
        let rc = unsafe { (core.api().open_jtalk_rc_new)(dir.as_ptr(), &mut out) };
        core.check("voicevox_open_jtalk_rc_new", rc)?;
        Ok(Self { core: Arc::clone(core), ptr: out })
    }
}

impl Drop for OpenJtalk {
    fn drop(&mut self) {
        // SAFETY: `ptr` came from open_jtalk_rc_new and is dropped once.
        unsafe { (self.core.api().open_jtalk_rc_delete)(self.ptr) };
    }
}

// ─── Voice model file ─────────────────────────────────────────────────────────

/// An opened `.vvm` archive.  Closing it after loading into a synthesizer is
/// fine; the synthesizer keeps what it needs.
pub struct VoiceModelFile {
    core: Arc<VoicevoxCore>,
    ptr: *mut VoicevoxVoiceModelFile,
}

impl VoiceModelFile {
    pub fn open(core: &Arc<VoicevoxCore>, path: &Path) -> Result<Self> {
        let cpath = path_to_cstring(path, "model path")?;
        let mut out: *mut VoicevoxVoiceModelFile = ptr::null_mut();
        // SAFETY: `cpath` outlives the call; `out` is a valid out-pointer.
        let rc = unsafe { (core.api().voice_model_file_open)(cpath.as_ptr(), &mut out) };
        core.check("voicevox_voice_model_file_open", rc)?;
        Ok(Self { core: Arc::clone(core), ptr: out })
    }
}

impl Drop for VoiceModelFile {
    fn drop(&mut self) {
        // SAFETY: `ptr` came from voice_model_file_open and is dropped once.
        unsafe { (self.core.api().voice_model_file_delete)(self.ptr) };
    }
}

// ─── Synthesizer ──────────────────────────────────────────────────────────────

/// Owns a `VoicevoxSynthesizer`.
pub struct Synthesizer {
    core: Arc<VoicevoxCore>,
    // Kept for its lifetime guarantee; the native synthesizer references it.
    _runtime: Onnxruntime,
    ptr: *mut VoicevoxSynthesizer,
}

// SAFETY: the native synthesizer guards its own state and VOICEVOX documents
// it as usable from multiple threads.
unsafe impl Send for Synthesizer {}
unsafe impl Sync for Synthesizer {}

impl Synthesizer {
    /// The synthesizer takes its own reference to the dictionary, so
    /// `open_jtalk` may be dropped as soon as this returns.
    pub fn new(
        runtime: &Onnxruntime,
        open_jtalk: &OpenJtalk,
        options: InitializeOptions,
    ) -> Result<Self> {
        let core = runtime.core();
        debug!(
            "creating synthesizer (acceleration {:?}, {} cpu threads)",
            options.acceleration_mode, options.cpu_num_threads
        );
        let mut out: *mut VoicevoxSynthesizer = ptr::null_mut();
        // SAFETY: both input handles are alive; `out` is a valid out-pointer.
        let rc = unsafe {
            (core.api().synthesizer_new)(runtime.as_ptr(), open_jtalk.ptr, options, &mut out)
        };
        core.check("voicevox_synthesizer_new", rc)?;
        Ok(Self { core: Arc::clone(core), _runtime: runtime.clone(), ptr: out })
    }

    pub fn core(&self) -> &Arc<VoicevoxCore> {
        &self.core
    }

    pub fn is_gpu_mode(&self) -> bool {
        // SAFETY: `ptr` is a live synthesizer.
        unsafe { (self.core.api().synthesizer_is_gpu_mode)(self.ptr) }
    }

    pub fn load_voice_model(&self, model: &VoiceModelFile) -> Result<()> {
        // SAFETY: both handles are alive.
        let rc = unsafe { (self.core.api().synthesizer_load_voice_model)(self.ptr, model.ptr) };
        self.core.check("voicevox_synthesizer_load_voice_model", rc)
    }

    /// Speaker/style metadata of every loaded model.
    pub fn metas(&self) -> Result<Vec<SpeakerMeta>> {
        let api = self.core.api();
        // SAFETY: `ptr` is a live synthesizer; the result is freed below.
        let raw = unsafe { (api.synthesizer_create_metas_json)(self.ptr) };
        if raw.is_null() {
            return Ok(Vec::new());
        }
        // SAFETY: non-null, NUL-terminated, owned by us until json_free.
        let json = unsafe { CStr::from_ptr(raw) }.to_string_lossy().into_owned();
        // SAFETY: `raw` came from create_metas_json and is freed once.
        unsafe { (api.json_free)(raw) };
        Ok(metas::parse(&json)?)
    }

    /// Synthesise Japanese text.  Returns a complete WAV file.
    pub fn tts(&self, text: &str, style_id: StyleId, options: TtsOptions) -> Result<Vec<u8>> {
        let text = to_cstring(text, "text")?;
        self.run_tts(
            self.core.api().synthesizer_tts,
            "voicevox_synthesizer_tts",
            &text,
            style_id,
            options,
        )
    }

    /// Synthesise AquesTalk-style kana (e.g. `"コンニチワ'"`).
    pub fn tts_from_kana(
        &self,
        kana: &str,
        style_id: StyleId,
        options: TtsOptions,
    ) -> Result<Vec<u8>> {
        let kana = to_cstring(kana, "kana")?;
        self.run_tts(
            self.core.api().synthesizer_tts_from_kana,
            "voicevox_synthesizer_tts_from_kana",
            &kana,
            style_id,
            options,
        )
    }

    fn run_tts(
        &self,
        func: TtsFn,
        name: &'static str,
        input: &CStr,
        style_id: StyleId,
        options: TtsOptions,
    ) -> Result<Vec<u8>> {
        let mut len: usize = 0;
        let mut buf: *mut u8 = ptr::null_mut();
        // SAFETY: `input` outlives the call; both out-pointers are valid.
        let rc = unsafe { func(self.ptr, input.as_ptr(), style_id, options, &mut len, &mut buf) };
        self.core.check(name, rc)?;
        if buf.is_null() {
            return Ok(Vec::new());
        }
        // SAFETY: on success the library hands us `len` initialised bytes,
        // which we copy and release immediately.
        let wav = unsafe { std::slice::from_raw_parts(buf, len) }.to_vec();
        unsafe { (self.core.api().wav_free)(buf) };
        debug!("{name}: {} bytes (style {style_id})", wav.len());
        Ok(wav)
    }
}

impl Drop for Synthesizer {
    fn drop(&mut self) {
        debug!("deleting synthesizer");
        // SAFETY: `ptr` came from synthesizer_new and is dropped once.
        unsafe { (self.core.api().synthesizer_delete)(self.ptr) };
    }
}

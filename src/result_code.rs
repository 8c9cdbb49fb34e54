//! `VoicevoxResultCode`: the status returned by every fallible core call.

use std::fmt;

use crate::sys::RawResultCode;

/// Status codes of VOICEVOX CORE 0.16.
///
/// Gaps in the numbering are codes the library has retired.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Ok,
    NotLoadedOpenjtalkDict,
    GetSupportedDevices,
    GpuSupport,
    StyleNotFound,
    ModelNotFound,
    RunModel,
    AnalyzeText,
    InvalidUtf8Input,
    ParseKana,
    InvalidAudioQuery,
    InvalidAccentPhrase,
    OpenZipFile,
    ReadZipEntry,
    ModelAlreadyLoaded,
    LoadUserDict,
    SaveUserDict,
    UserDictWordNotFound,
    UseUserDict,
    InvalidUserDictWord,
    InvalidUuid,
    StyleAlreadyLoaded,
    InvalidModelData,
    InvalidModelHeader,
    InitInferenceRuntime,
    /// A code newer than this crate.
    Unknown(RawResultCode),
}

const TABLE: &[(RawResultCode, ResultCode, &str)] = &[
    (0, ResultCode::Ok, "VOICEVOX_RESULT_OK"),
    (1, ResultCode::NotLoadedOpenjtalkDict, "VOICEVOX_RESULT_NOT_LOADED_OPENJTALK_DICT_ERROR"),
    (3, ResultCode::GetSupportedDevices, "VOICEVOX_RESULT_GET_SUPPORTED_DEVICES_ERROR"),
    (4, ResultCode::GpuSupport, "VOICEVOX_RESULT_GPU_SUPPORT_ERROR"),
    (6, ResultCode::StyleNotFound, "VOICEVOX_RESULT_STYLE_NOT_FOUND_ERROR"),
    (7, ResultCode::ModelNotFound, "VOICEVOX_RESULT_MODEL_NOT_FOUND_ERROR"),
    (8, ResultCode::RunModel, "VOICEVOX_RESULT_RUN_MODEL_ERROR"),
    (11, ResultCode::AnalyzeText, "VOICEVOX_RESULT_ANALYZE_TEXT_ERROR"),
    (12, ResultCode::InvalidUtf8Input, "VOICEVOX_RESULT_INVALID_UTF8_INPUT_ERROR"),
    (13, ResultCode::ParseKana, "VOICEVOX_RESULT_PARSE_KANA_ERROR"),
    (14, ResultCode::InvalidAudioQuery, "VOICEVOX_RESULT_INVALID_AUDIO_QUERY_ERROR"),
    (15, ResultCode::InvalidAccentPhrase, "VOICEVOX_RESULT_INVALID_ACCENT_PHRASE_ERROR"),
    (16, ResultCode::OpenZipFile, "VOICEVOX_RESULT_OPEN_ZIP_FILE_ERROR"),
    (17, ResultCode::ReadZipEntry, "VOICEVOX_RESULT_READ_ZIP_ENTRY_ERROR"),
    (18, ResultCode::ModelAlreadyLoaded, "VOICEVOX_RESULT_MODEL_ALREADY_LOADED_ERROR"),
    (20, ResultCode::LoadUserDict, "VOICEVOX_RESULT_LOAD_USER_DICT_ERROR"),
    (21, ResultCode::SaveUserDict, "VOICEVOX_RESULT_SAVE_USER_DICT_ERROR"),
    (22, ResultCode::UserDictWordNotFound, "VOICEVOX_RESULT_USER_DICT_WORD_NOT_FOUND_ERROR"),
    (23, ResultCode::UseUserDict, "VOICEVOX_RESULT_USE_USER_DICT_ERROR"),
    (24, ResultCode::InvalidUserDictWord, "VOICEVOX_RESULT_INVALID_USER_DICT_WORD_ERROR"),
    (25, ResultCode::InvalidUuid, "VOICEVOX_RESULT_INVALID_UUID_ERROR"),
    (26, ResultCode::StyleAlreadyLoaded, "VOICEVOX_RESULT_STYLE_ALREADY_LOADED_ERROR"),
    (27, ResultCode::InvalidModelData, "VOICEVOX_RESULT_INVALID_MODEL_DATA_ERROR"),
    (28, ResultCode::InvalidModelHeader, "VOICEVOX_RESULT_INVALID_MODEL_HEADER_ERROR"),
    (29, ResultCode::InitInferenceRuntime, "VOICEVOX_RESULT_INIT_INFERENCE_RUNTIME_ERROR"),
];

impl ResultCode {
    pub fn is_ok(self) -> bool {
        self == ResultCode::Ok
    }

    /// The raw value as the C API spells it.
    pub fn raw(self) -> RawResultCode {
        match self {
            ResultCode::Unknown(raw) => raw,
            known => TABLE
                .iter()
                .find(|(_, code, _)| *code == known)
                .map(|(raw, _, _)| *raw)
                .unwrap_or_default(),
        }
    }

    /// The `VOICEVOX_RESULT_*` constant name, or `None` for unknown codes.
    pub fn name(self) -> Option<&'static str> {
        TABLE.iter().find(|(_, code, _)| *code == self).map(|(_, _, name)| *name)
    }
}

impl From<RawResultCode> for ResultCode {
    fn from(raw: RawResultCode) -> Self {
        TABLE
            .iter()
            .find(|(r, _, _)| *r == raw)
            .map(|(_, code, _)| *code)
            .unwrap_or(ResultCode::Unknown(raw))
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.name() {
            Some(name) => write!(f, "{} ({})", name, self.raw()),
            None => write!(f, "unknown result code {}", self.raw()),
        }
    }
}

//! Settings file + environment overrides.
//!
//! Resolution order (later wins): built-in defaults → JSON settings file →
//! environment variables → command-line flags (applied by the binary).
//!
//! ```json
//! {
//!   "core_dir": "/opt/voicevox_core",
//!   "style_id": 3,
//!   "models": "0,3",
//!   "acceleration": "cpu",
//!   "cpu_num_threads": 4,
//!   "gemini": { "model": "gemini-2.5-flash" }
//! }
//! ```

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use log::debug;
use serde::Deserialize;

use crate::{
    engine::{EngineConfig, DEFAULT_STYLE_ID},
    gemini::{self, GeminiClient},
    layout::{Layout, ModelSelection},
    sys::{AccelerationMode, StyleId},
};

/// File looked up beside the executable when no `--config` is given.
pub const SETTINGS_FILE_NAME: &str = "voicevox-talk.json";

pub const ENV_CORE_DIR: &str = "VOICEVOX_CORE_DIR";
pub const ENV_STYLE_ID: &str = "VOICEVOX_STYLE_ID";
pub const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
pub const ENV_GEMINI_MODEL: &str = "GEMINI_MODEL";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    /// VOICEVOX distribution root; defaults to the executable's directory.
    pub core_dir: Option<PathBuf>,
    pub style_id: Option<StyleId>,
    /// `"all"` or a comma-separated list of model numbers.
    pub models: Option<String>,
    /// `"cpu"`, `"gpu"` or `"auto"`.
    pub acceleration: Option<String>,
    pub cpu_num_threads: u16,
    pub interrogative_upspeak: Option<bool>,
    /// WAV destination; defaults to `speech.wav` beside the executable.
    pub output: Option<PathBuf>,
    pub gemini: GeminiSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeminiSettings {
    pub api_key: Option<String>,
    pub model: Option<String>,
    pub base_url: Option<String>,
}

pub fn parse_acceleration(s: &str) -> Option<AccelerationMode> {
    match s.trim().to_ascii_lowercase().as_str() {
        "auto" => Some(AccelerationMode::Auto),
        "cpu" => Some(AccelerationMode::Cpu),
        "gpu" => Some(AccelerationMode::Gpu),
        _ => None,
    }
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path)
            .with_context(|| format!("Cannot read settings: {}", path.display()))?;
        serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse settings: {}", path.display()))
    }

    /// Load `path`, or the default file beside the executable if present,
    /// then apply environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut settings = match path {
            Some(path) => Self::from_file(path)?,
            None => match default_settings_path().filter(|p| p.is_file()) {
                Some(p) => {
                    debug!("using settings {}", p.display());
                    Self::from_file(&p)?
                }
                None => Self::default(),
            },
        };
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// Apply overrides from `lookup` (normally the process environment).
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(dir) = get(ENV_CORE_DIR) {
            self.core_dir = Some(PathBuf::from(dir));
        }
        if let Some(id) = get(ENV_STYLE_ID) {
            let id = id
                .trim()
                .parse()
                .with_context(|| format!("{ENV_STYLE_ID} is not a style id: {id:?}"))?;
            self.style_id = Some(id);
        }
        if let Some(key) = get(ENV_GEMINI_API_KEY) {
            self.gemini.api_key = Some(key);
        }
        if let Some(model) = get(ENV_GEMINI_MODEL) {
            self.gemini.model = Some(model);
        }
        Ok(())
    }

    pub fn layout(&self) -> Result<Layout> {
        match &self.core_dir {
            Some(dir) => Ok(Layout::new(dir)),
            None => Layout::beside_executable().context("Cannot locate the VOICEVOX directory"),
        }
    }

    pub fn engine_config(&self) -> Result<EngineConfig> {
        let mut config = EngineConfig::new(self.layout()?);
        config.style_id = self.style_id.unwrap_or(DEFAULT_STYLE_ID);
        if let Some(models) = &self.models {
            config.models = ModelSelection::parse(models)
                .with_context(|| format!("Invalid model list {models:?}"))?;
        }
        if let Some(accel) = &self.acceleration {
            config.acceleration_mode = parse_acceleration(accel)
                .with_context(|| format!("Invalid acceleration mode {accel:?}"))?;
        }
        config.cpu_num_threads = self.cpu_num_threads;
        if let Some(upspeak) = self.interrogative_upspeak {
            config.enable_interrogative_upspeak = upspeak;
        }
        Ok(config)
    }

    pub fn gemini_client(&self) -> Result<GeminiClient> {
        let Some(key) = self.gemini.api_key.as_deref() else {
            bail!("No Gemini API key: set {ENV_GEMINI_API_KEY} or gemini.api_key in the settings file");
        };
        let mut client = GeminiClient::new(key)?
            .with_model(self.gemini.model.as_deref().unwrap_or(gemini::DEFAULT_MODEL));
        if let Some(base) = &self.gemini.base_url {
            client = client.with_base_url(base);
        }
        Ok(client)
    }
}

fn default_settings_path() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join(SETTINGS_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |k| map.get(k).cloned()
    }

    #[test]
    fn test_from_file() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(SETTINGS_FILE_NAME);
        std::fs::write(
            &path,
            r#"{"core_dir": "/opt/vv", "style_id": 1, "models": "0,3", "acceleration": "gpu",
                "gemini": {"model": "gemini-2.5-pro"}}"#,
        )
        .unwrap();

        let s = Settings::from_file(&path).unwrap();
        assert_eq!(s.core_dir.as_deref(), Some(Path::new("/opt/vv")));
        assert_eq!(s.gemini.model.as_deref(), Some("gemini-2.5-pro"));

        let config = s.engine_config().unwrap();
        assert_eq!(config.style_id, 1);
        assert_eq!(config.models, ModelSelection::Numbers(vec![0, 3]));
        assert_eq!(config.acceleration_mode, AccelerationMode::Gpu);
        assert_eq!(config.layout.root(), Path::new("/opt/vv"));
    }

    #[test]
    fn test_unknown_field_rejected() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("bad.json");
        std::fs::write(&path, r#"{"styleid": 1}"#).unwrap();
        assert!(Settings::from_file(&path).is_err());
    }

    #[test]
    fn test_env_overrides() {
        let mut s = Settings { style_id: Some(1), ..Default::default() };
        s.apply_env(env(&[
            (ENV_CORE_DIR, "/srv/voicevox"),
            (ENV_STYLE_ID, " 8 "),
            (ENV_GEMINI_API_KEY, "secret"),
            (ENV_GEMINI_MODEL, ""),
        ]))
        .unwrap();
        assert_eq!(s.core_dir.as_deref(), Some(Path::new("/srv/voicevox")));
        assert_eq!(s.style_id, Some(8));
        assert_eq!(s.gemini.api_key.as_deref(), Some("secret"));
        assert_eq!(s.gemini.model, None);
    }

    #[test]
    fn test_bad_env_style_id() {
        let mut s = Settings::default();
        assert!(s.apply_env(env(&[(ENV_STYLE_ID, "zundamon")])).is_err());
    }

    #[test]
    fn test_invalid_values() {
        let s = Settings { acceleration: Some("tpu".into()), core_dir: Some("/x".into()), ..Default::default() };
        assert!(s.engine_config().is_err());
        let s = Settings { models: Some("1,a".into()), core_dir: Some("/x".into()), ..Default::default() };
        assert!(s.engine_config().is_err());
    }

    #[test]
    fn test_gemini_requires_key() {
        let s = Settings::default();
        let err = s.gemini_client().err().expect("missing key must fail");
        assert!(err.to_string().contains(ENV_GEMINI_API_KEY));

        let mut s = Settings::default();
        s.gemini.api_key = Some("k".into());
        assert_eq!(s.gemini_client().unwrap().model(), gemini::DEFAULT_MODEL);
    }

    #[test]
    fn test_parse_acceleration() {
        assert_eq!(parse_acceleration("CPU"), Some(AccelerationMode::Cpu));
        assert_eq!(parse_acceleration("auto"), Some(AccelerationMode::Auto));
        assert_eq!(parse_acceleration("npu"), None);
    }
}

//! One-call setup of a ready-to-speak synthesizer.
//!
//! [`Engine::open`] runs the fixed sequence VOICEVOX requires:
//!
//! 1. open `c_api/lib/<core>`
//! 2. load the ONNX runtime from `onnxruntime/lib/<versioned name>`
//! 3. load the Open JTalk dictionary
//! 4. create the synthesizer (the dictionary handle is released right after)
//! 5. open, load and close each selected `.vvm`
//!
//! Dropping the engine deletes the synthesizer; the library itself is
//! unloaded once the last handle referencing it is gone.

use std::{path::Path, sync::Arc};

use anyhow::Context;
use log::info;

use crate::{
    error::Result,
    handles::{Onnxruntime, OpenJtalk, Synthesizer, VoiceModelFile, VoicevoxCore},
    layout::{Layout, ModelSelection},
    metas::SpeakerMeta,
    sys::{AccelerationMode, StyleId, TtsOptions},
    talk::SpeechSynthesizer,
    wav,
};

/// Default style: ずんだもん (ノーマル).
pub const DEFAULT_STYLE_ID: StyleId = 3;

/// Everything [`Engine::open`] needs.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub layout: Layout,
    pub models: ModelSelection,
    pub style_id: StyleId,
    pub acceleration_mode: AccelerationMode,
    /// `0` keeps the library default.
    pub cpu_num_threads: u16,
    pub enable_interrogative_upspeak: bool,
}

impl EngineConfig {
    pub fn new(layout: Layout) -> Self {
        Self {
            layout,
            models: ModelSelection::All,
            style_id: DEFAULT_STYLE_ID,
            acceleration_mode: AccelerationMode::Cpu,
            cpu_num_threads: 0,
            enable_interrogative_upspeak: true,
        }
    }
}

pub struct Engine {
    synthesizer: Synthesizer,
    style_id: StyleId,
    tts_options: TtsOptions,
}

impl Engine {
    pub fn open(config: &EngineConfig) -> Result<Self> {
        let layout = &config.layout;
        let core = VoicevoxCore::load(&layout.core_library())?;

        let runtime_path = layout.onnxruntime(&core.onnxruntime_versioned_filename());
        let runtime = Onnxruntime::load_once(&core, Some(&runtime_path))?;

        let synthesizer = {
            let open_jtalk = OpenJtalk::new(&core, &layout.open_jtalk_dict())?;
            let mut options = core.default_initialize_options();
            options.acceleration_mode = config.acceleration_mode;
            if config.cpu_num_threads > 0 {
                options.cpu_num_threads = config.cpu_num_threads;
            }
            Synthesizer::new(&runtime, &open_jtalk, options)?
        };
        info!("synthesizer ready (gpu: {})", synthesizer.is_gpu_mode());

        for path in layout.model_files(&config.models)? {
            info!("loading voice model {}", path.display());
            let model = VoiceModelFile::open(&core, &path)?;
            synthesizer.load_voice_model(&model)?;
        }

        let mut tts_options = core.default_tts_options();
        tts_options.enable_interrogative_upspeak = config.enable_interrogative_upspeak;

        Ok(Self { synthesizer, style_id: config.style_id, tts_options })
    }

    pub fn core(&self) -> &Arc<VoicevoxCore> {
        self.synthesizer.core()
    }

    pub fn synthesizer(&self) -> &Synthesizer {
        &self.synthesizer
    }

    pub fn style_id(&self) -> StyleId {
        self.style_id
    }

    pub fn set_style_id(&mut self, style_id: StyleId) {
        self.style_id = style_id;
    }

    pub fn metas(&self) -> Result<Vec<SpeakerMeta>> {
        self.synthesizer.metas()
    }

    /// Synthesise `text` with the configured style; returns a WAV file.
    pub fn synthesize(&self, text: &str) -> Result<Vec<u8>> {
        info!("synthesizing {:?} (style {})", text, self.style_id);
        self.synthesizer.tts(text, self.style_id, self.tts_options)
    }

    /// Synthesise AquesTalk-style kana with the configured style.
    pub fn synthesize_kana(&self, kana: &str) -> Result<Vec<u8>> {
        info!("synthesizing kana {:?} (style {})", kana, self.style_id);
        self.synthesizer.tts_from_kana(kana, self.style_id, self.tts_options)
    }

    pub fn synthesize_to_file(&self, text: &str, path: &Path) -> Result<()> {
        let audio = self.synthesize(text)?;
        wav::save(&audio, path)
    }
}

impl SpeechSynthesizer for Engine {
    fn synthesize(&self, text: &str) -> anyhow::Result<Vec<u8>> {
        Engine::synthesize(self, text).with_context(|| format!("Synthesis failed for {text:?}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EngineConfig::new(Layout::new("/opt/voicevox_core"));
        assert_eq!(config.style_id, DEFAULT_STYLE_ID);
        assert_eq!(config.acceleration_mode, AccelerationMode::Cpu);
        assert_eq!(config.models, ModelSelection::All);
    }

    #[test]
    fn test_open_without_distribution_fails() {
        let tmp = tempfile::tempdir().unwrap();
        let config = EngineConfig::new(Layout::new(tmp.path()));
        let err = Engine::open(&config).err().expect("no core library present");
        assert!(matches!(err, crate::Error::LibraryLoad { .. }), "{err}");
    }
}

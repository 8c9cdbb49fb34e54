//! Where things live inside an unpacked VOICEVOX CORE distribution.
//!
//! ```text
//! <root>/
//!   c_api/lib/voicevox_core.dll | libvoicevox_core.so | libvoicevox_core.dylib
//!   onnxruntime/lib/<versioned onnxruntime>
//!   dict/open_jtalk_dic_utf_8-1.11/
//!   models/vvms/0.vvm, 1.vvm, …
//! ```
//!
//! This is the tree the official downloader produces.

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Directory name of the bundled Open JTalk dictionary.
pub const OPEN_JTALK_DICT_NAME: &str = "open_jtalk_dic_utf_8-1.11";

/// Core library filename for the compile target.
pub const CORE_LIB_NAME: &str = if cfg!(target_os = "windows") {
    "voicevox_core.dll"
} else if cfg!(target_os = "macos") {
    "libvoicevox_core.dylib"
} else {
    "libvoicevox_core.so"
};

/// Which `.vvm` files to load.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ModelSelection {
    /// Every `*.vvm` under `models/vvms`.
    #[default]
    All,
    /// `models/vvms/<n>.vvm` for each listed number.
    Numbers(Vec<u32>),
}

impl ModelSelection {
    /// Parse `"all"` or a comma-separated list such as `"0,3,15"`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("all") || s.is_empty() {
            return Some(ModelSelection::All);
        }
        s.split(',')
            .map(|n| n.trim().parse().ok())
            .collect::<Option<Vec<u32>>>()
            .map(ModelSelection::Numbers)
    }
}

/// Paths inside one distribution root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    root: PathBuf,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Layout rooted at the directory of the running executable.
    pub fn beside_executable() -> Result<Self> {
        let exe = std::env::current_exe()?;
        let dir = exe.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
        Ok(Self::new(dir))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn core_library(&self) -> PathBuf {
        self.root.join("c_api").join("lib").join(CORE_LIB_NAME)
    }

    /// Full path of the runtime library given the name the core reports.
    pub fn onnxruntime(&self, filename: &str) -> PathBuf {
        self.root.join("onnxruntime").join("lib").join(filename)
    }

    pub fn open_jtalk_dict(&self) -> PathBuf {
        self.root.join("dict").join(OPEN_JTALK_DICT_NAME)
    }

    pub fn models_dir(&self) -> PathBuf {
        self.root.join("models").join("vvms")
    }

    /// Resolve `selection` to existing model files.
    ///
    /// `All` returns files ordered by their numeric stem (`2.vvm` before
    /// `10.vvm`); non-numeric stems sort after, by name.
    pub fn model_files(&self, selection: &ModelSelection) -> Result<Vec<PathBuf>> {
        let dir = self.models_dir();
        match selection {
            ModelSelection::Numbers(numbers) => numbers
                .iter()
                .map(|n| {
                    let path = dir.join(format!("{n}.vvm"));
                    if path.is_file() {
                        Ok(path)
                    } else {
                        Err(Error::ModelNotFound(path))
                    }
                })
                .collect(),
            ModelSelection::All => {
                let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)
                    .map_err(|_| Error::NoModels(dir.clone()))?
                    .filter_map(|entry| entry.ok().map(|e| e.path()))
                    .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "vvm"))
                    .collect();
                if files.is_empty() {
                    return Err(Error::NoModels(dir));
                }
                files.sort_by_key(|p| {
                    let stem = p.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
                    (stem.parse::<u64>().unwrap_or(u64::MAX), stem)
                });
                Ok(files)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_paths() {
        let layout = Layout::new("/opt/voicevox_core");
        assert_eq!(
            layout.open_jtalk_dict(),
            Path::new("/opt/voicevox_core/dict/open_jtalk_dic_utf_8-1.11")
        );
        assert_eq!(
            layout.onnxruntime("libvoicevox_onnxruntime.so.1.17.3"),
            Path::new("/opt/voicevox_core/onnxruntime/lib/libvoicevox_onnxruntime.so.1.17.3")
        );
        assert!(layout.core_library().ends_with(Path::new("c_api/lib").join(CORE_LIB_NAME)));
    }

    #[test]
    fn test_parse_selection() {
        assert_eq!(ModelSelection::parse("all"), Some(ModelSelection::All));
        assert_eq!(ModelSelection::parse(""), Some(ModelSelection::All));
        assert_eq!(ModelSelection::parse("0, 3,15"), Some(ModelSelection::Numbers(vec![0, 3, 15])));
        assert_eq!(ModelSelection::parse("0,x"), None);
    }

    #[test]
    fn test_all_models_numeric_order() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = Layout::new(tmp.path());
        for name in ["10.vvm", "2.vvm", "0.vvm", "readme.txt"] {
            touch(&layout.models_dir().join(name));
        }
        let names: Vec<_> = layout
            .model_files(&ModelSelection::All)
            .unwrap()
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["0.vvm", "2.vvm", "10.vvm"]);
    }

    #[test]
    fn test_selected_models() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = Layout::new(tmp.path());
        touch(&layout.models_dir().join("3.vvm"));

        let files = layout.model_files(&ModelSelection::Numbers(vec![3])).unwrap();
        assert_eq!(files, vec![layout.models_dir().join("3.vvm")]);

        let err = layout.model_files(&ModelSelection::Numbers(vec![3, 4])).unwrap_err();
        assert!(matches!(err, Error::ModelNotFound(p) if p.ends_with("4.vvm")));
    }

    #[test]
    fn test_no_models() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = Layout::new(tmp.path());
        assert!(matches!(layout.model_files(&ModelSelection::All), Err(Error::NoModels(_))));
        std::fs::create_dir_all(layout.models_dir()).unwrap();
        assert!(matches!(layout.model_files(&ModelSelection::All), Err(Error::NoModels(_))));
    }
}

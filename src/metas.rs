//! Speaker / style metadata as reported by `voicevox_synthesizer_create_metas_json`.

use serde::{Deserialize, Serialize};

use crate::sys::StyleId;

/// One character voice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeakerMeta {
    pub name: String,
    pub styles: Vec<StyleMeta>,
    pub speaker_uuid: String,
    pub version: String,
    #[serde(default)]
    pub order: Option<u32>,
}

/// One speaking style of a [`SpeakerMeta`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleMeta {
    pub name: String,
    pub id: StyleId,
    /// `"talk"`, `"singing_teacher"`, `"frame_decode"` or `"sing"`.
    #[serde(rename = "type", default = "default_style_type")]
    pub style_type: String,
    #[serde(default)]
    pub order: Option<u32>,
}

fn default_style_type() -> String {
    "talk".to_string()
}

/// Parse the JSON array returned by the core library.
pub fn parse(json: &str) -> serde_json::Result<Vec<SpeakerMeta>> {
    serde_json::from_str(json)
}

/// Resolve a style id from a speaker name and (optionally) a style name.
///
/// Without a style name the speaker's first style is used; VOICEVOX lists
/// ノーマル first for every character.
pub fn find_style(metas: &[SpeakerMeta], speaker: &str, style: Option<&str>) -> Option<StyleId> {
    let speaker = metas.iter().find(|m| m.name == speaker)?;
    match style {
        Some(style) => speaker.styles.iter().find(|s| s.name == style).map(|s| s.id),
        None => speaker.styles.first().map(|s| s.id),
    }
}

/// Flatten to `(speaker, style, id)` rows ordered by id, for listing.
pub fn style_table(metas: &[SpeakerMeta]) -> Vec<(&str, &str, StyleId)> {
    let mut rows: Vec<_> = metas
        .iter()
        .flat_map(|m| m.styles.iter().map(move |s| (m.name.as_str(), s.name.as_str(), s.id)))
        .collect();
    rows.sort_by_key(|&(_, _, id)| id);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {
            "name": "四国めたん",
            "styles": [
                {"name": "ノーマル", "id": 2, "type": "talk"},
                {"name": "あまあま", "id": 0, "type": "talk"}
            ],
            "version": "0.16.0",
            "speaker_uuid": "7ffcb7ce-00ec-4bdc-82cd-45a8889e43ff",
            "order": 0
        },
        {
            "name": "ずんだもん",
            "styles": [
                {"name": "ノーマル", "id": 3},
                {"name": "あまあま", "id": 1}
            ],
            "version": "0.16.0",
            "speaker_uuid": "388f246b-8c41-4ac1-8e2d-5d79f3ff56d9"
        }
    ]"#;

    #[test]
    fn test_parse() {
        let metas = parse(SAMPLE).unwrap();
        assert_eq!(metas.len(), 2);
        assert_eq!(metas[1].styles[0].style_type, "talk");
        assert_eq!(metas[0].order, Some(0));
        assert_eq!(metas[1].order, None);
    }

    #[test]
    fn test_find_style() {
        let metas = parse(SAMPLE).unwrap();
        assert_eq!(find_style(&metas, "ずんだもん", None), Some(3));
        assert_eq!(find_style(&metas, "ずんだもん", Some("あまあま")), Some(1));
        assert_eq!(find_style(&metas, "ずんだもん", Some("ツンツン")), None);
        assert_eq!(find_style(&metas, "春日部つむぎ", None), None);
    }

    #[test]
    fn test_style_table_sorted_by_id() {
        let metas = parse(SAMPLE).unwrap();
        let ids: Vec<_> = style_table(&metas).into_iter().map(|(_, _, id)| id).collect();
        assert_eq!(ids, vec![0, 1, 2, 3]);
    }
}

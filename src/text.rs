//! Turning LLM output into something VOICEVOX can read aloud.
//!
//! Gemini answers in Markdown.  Asterisks, hashes, backticks and URLs are
//! either read out literally or make the text analyser fail, so they are
//! removed before synthesis.  Long answers are then split into sentences:
//! synthesis time grows with input length, and a sentence-level failure is
//! easier to report than a whole-answer one.

use once_cell::sync::Lazy;
use regex::Regex;

static CODE_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?ms)^[ \t]*```.*?^[ \t]*```[^\n]*$").unwrap());
static CODE_FENCE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*```.*$").unwrap());
static INLINE_CODE: Lazy<Regex> = Lazy::new(|| Regex::new(r"`([^`]*)`").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").unwrap());
// ASCII only: Japanese prose often runs straight on after a URL.
static URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"https?://[A-Za-z0-9\-._~:/?#\[\]@!$&'*+,;=%]+").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s{0,3}#{1,6}\s*").unwrap());
static BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*(?:[-*+・]|\d+[.)])\s+").unwrap());
static QUOTE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*>\s?").unwrap());
static EMPHASIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\*{1,3}|_{2,3}|~~)").unwrap());
static RULE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?m)^\s*(?:-{3,}|\*{3,}|_{3,})\s*$").unwrap());
static SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t\x{3000}]+").unwrap());
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\s*\n+").unwrap());

/// Strip Markdown and URLs, collapse whitespace.
///
/// Fenced code blocks are dropped whole; an unclosed fence loses only its
/// marker line.
pub fn clean_for_speech(text: &str) -> String {
    let text = CODE_BLOCK.replace_all(text, "");
    let text = CODE_FENCE.replace_all(&text, "");
    let text = RULE.replace_all(&text, "");
    let text = LINK.replace_all(&text, "$1");
    let text = URL.replace_all(&text, "");
    let text = INLINE_CODE.replace_all(&text, "$1");
    let text = HEADING.replace_all(&text, "");
    let text = BULLET.replace_all(&text, "");
    let text = QUOTE.replace_all(&text, "");
    let text = EMPHASIS.replace_all(&text, "");
    let text = SPACES.replace_all(&text, " ");
    let text = BLANK_LINES.replace_all(&text, "\n");
    text.lines().map(str::trim).filter(|l| !l.is_empty()).collect::<Vec<_>>().join("\n")
}

fn is_terminator(c: char) -> bool {
    matches!(c, '。' | '！' | '？' | '!' | '?' | '\n')
}

fn is_soft_break(c: char) -> bool {
    matches!(c, '、' | ',' | '，')
}

/// Split `text` into sentences of at most `max_chars` characters.
///
/// Sentences end at `。！？!?` (kept) or a newline (dropped).  A sentence longer
/// than `max_chars` is cut after the last `、`/`,` that fits, or hard-cut when
/// there is none.
pub fn split_sentences(text: &str, max_chars: usize) -> Vec<String> {
    let max_chars = max_chars.max(1);
    let mut sentences = Vec::new();
    let mut current = String::new();

    for c in text.chars() {
        if c != '\n' {
            current.push(c);
        }
        if is_terminator(c) {
            push_sentence(&mut sentences, &current, max_chars);
            current.clear();
        }
    }
    push_sentence(&mut sentences, &current, max_chars);
    sentences
}

fn push_sentence(out: &mut Vec<String>, sentence: &str, max_chars: usize) {
    let mut rest: Vec<char> = sentence.trim().chars().collect();
    while rest.len() > max_chars {
        let cut = rest[..max_chars]
            .iter()
            .rposition(|&c| is_soft_break(c))
            .map(|i| i + 1)
            .unwrap_or(max_chars);
        let head: String = rest.drain(..cut).collect();
        let head = head.trim();
        if !head.is_empty() {
            out.push(head.to_string());
        }
    }
    let tail: String = rest.into_iter().collect();
    let tail = tail.trim();
    if !tail.is_empty() {
        out.push(tail.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_markdown() {
        let md = "## 今日の天気\n\n**晴れ**です。\n- 最高気温は*25度*\n- 詳細は[気象庁](https://www.jma.go.jp/)へ";
        assert_eq!(
            clean_for_speech(md),
            "今日の天気\n晴れです。\n最高気温は25度\n詳細は気象庁へ"
        );
    }

    #[test]
    fn test_clean_code_and_urls() {
        let md = "例:\n```rust\nfn main() {}\n```\n`cargo` を使います。 https://example.com/x を参照";
        assert_eq!(clean_for_speech(md), "例:\ncargo を使います。 を参照");
    }

    #[test]
    fn test_clean_unclosed_fence() {
        assert_eq!(clean_for_speech("```\nこんにちは"), "こんにちは");
    }

    #[test]
    fn test_clean_url_followed_by_japanese() {
        let text = "詳しくはhttps://example.com/path?q=1をご覧ください。明日は雨です。";
        let cleaned = clean_for_speech(text);
        assert_eq!(cleaned, "詳しくはをご覧ください。明日は雨です。");
        assert_eq!(
            split_sentences(&cleaned, 100),
            vec!["詳しくはをご覧ください。", "明日は雨です。"]
        );
        assert_eq!(clean_for_speech("（https://example.com）参照"), "（）参照");
    }

    #[test]
    fn test_clean_plain_text_unchanged() {
        assert_eq!(clean_for_speech("あかさたなはまやらわ"), "あかさたなはまやらわ");
    }

    #[test]
    fn test_split_keeps_terminators() {
        let s = split_sentences("今日は晴れです。明日は？雨！", 100);
        assert_eq!(s, vec!["今日は晴れです。", "明日は？", "雨！"]);
    }

    #[test]
    fn test_split_on_newline() {
        let s = split_sentences("一行目\n二行目\n\n", 100);
        assert_eq!(s, vec!["一行目", "二行目"]);
    }

    #[test]
    fn test_split_long_sentence_at_comma() {
        let s = split_sentences("あいうえお、かきくけこ、さしすせそ。", 8);
        assert_eq!(s, vec!["あいうえお、", "かきくけこ、", "さしすせそ。"]);
    }

    #[test]
    fn test_split_hard_cut() {
        let s = split_sentences("あいうえおかきくけこ", 4);
        assert_eq!(s, vec!["あいうえ", "おかきく", "けこ"]);
        for part in &s {
            assert!(part.chars().count() <= 4);
        }
    }

    #[test]
    fn test_split_empty() {
        assert!(split_sentences("", 10).is_empty());
        assert!(split_sentences("  \n ", 10).is_empty());
    }
}

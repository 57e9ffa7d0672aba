use pinyin::ToPinyin;

/// Tone-marked pinyin for a sentence, syllables joined by spaces. Characters
/// without a pinyin reading (punctuation, latin text) are skipped.
pub fn render_pinyin(text: &str) -> String {
    let mut syllables: Vec<&str> = Vec::new();
    for reading in text.to_pinyin() {
        if let Some(syllable) = reading {
            syllables.push(syllable.with_tone());
        }
    }
    syllables.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_tone_marked_syllables() {
        assert_eq!(render_pinyin("你好"), "nǐ hǎo");
    }

    #[test]
    fn punctuation_and_latin_are_skipped() {
        assert_eq!(render_pinyin("你好。ok"), "nǐ hǎo");
    }

    #[test]
    fn empty_input_renders_empty() {
        assert_eq!(render_pinyin(""), "");
    }
}

/// Derives which vocabulary tokens were actually used in free-text oracle
/// output. The oracle sometimes self-reports an index list; that report is
/// never trusted — usage is always recomputed from the literal text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSentence {
    pub chinese_text: String,
    pub used_characters: Vec<String>,
}

const SENTENCE_MARKER: &str = "SENTENCE_";

const CJK_PUNCTUATION: &[char] = &[
    '。', '，', '、', '！', '？', '；', '：', '“', '”', '‘', '’', '（', '）',
    '《', '》', '【', '】', '「', '」', '—', '…', '·', '～',
];

/// Splits `raw_response` on `SENTENCE_<n>:` markers and recomputes token
/// usage for each candidate sentence against `allowed_pool`. Text before the
/// first marker (and anything that is not a tagged sentence) is discarded.
/// A sentence whose stream matches no pool token is still emitted with an
/// empty usage set.
pub fn extract(raw_response: &str, allowed_pool: &[String]) -> Vec<ExtractedSentence> {
    let tokens = tokens_longest_first(allowed_pool);

    candidate_sentences(raw_response)
        .into_iter()
        .map(|sentence| ExtractedSentence {
            used_characters: match_used_tokens(&sentence, &tokens),
            chinese_text: sentence,
        })
        .collect()
}

/// Pool tokens sorted descending by character length, so multi-character
/// words win over their single-character substrings.
fn tokens_longest_first(allowed_pool: &[String]) -> Vec<(Vec<char>, &str)> {
    let mut tokens: Vec<(Vec<char>, &str)> = allowed_pool
        .iter()
        .filter(|t| !t.is_empty())
        .map(|t| (t.chars().collect(), t.as_str()))
        .collect();
    tokens.sort_by(|a, b| b.0.len().cmp(&a.0.len()));
    tokens
}

fn candidate_sentences(raw: &str) -> Vec<String> {
    let markers = marker_positions(raw);

    let mut sentences = Vec::with_capacity(markers.len());
    for (idx, &(_, content_start)) in markers.iter().enumerate() {
        let content_end = markers
            .get(idx + 1)
            .map(|&(next_start, _)| next_start)
            .unwrap_or(raw.len());

        let candidate = raw[content_start..content_end].trim();
        if !candidate.is_empty() {
            sentences.push(candidate.to_string());
        }
    }
    sentences
}

/// Byte positions of every `SENTENCE_<digits>:` marker as
/// `(marker_start, content_start)`.
fn marker_positions(raw: &str) -> Vec<(usize, usize)> {
    let bytes = raw.as_bytes();
    let mut positions = Vec::new();
    let mut search_from = 0;

    while let Some(found) = raw[search_from..].find(SENTENCE_MARKER) {
        let marker_start = search_from + found;
        let mut cursor = marker_start + SENTENCE_MARKER.len();

        let digits_start = cursor;
        while cursor < bytes.len() && bytes[cursor].is_ascii_digit() {
            cursor += 1;
        }

        if cursor > digits_start && bytes.get(cursor) == Some(&b':') {
            positions.push((marker_start, cursor + 1));
            search_from = cursor + 1;
        } else {
            search_from = marker_start + SENTENCE_MARKER.len();
        }
    }

    positions
}

/// Greedy longest-prefix scan over the punctuation-stripped character stream.
/// Unmatched characters are skipped one at a time; that is the defense
/// against an oracle that violates the character constraint.
fn match_used_tokens(sentence: &str, tokens_longest_first: &[(Vec<char>, &str)]) -> Vec<String> {
    let stream: Vec<char> = sentence.chars().filter(|c| !is_ignorable(*c)).collect();

    let mut used: Vec<String> = Vec::new();
    let mut pos = 0;

    while pos < stream.len() {
        let mut advanced = false;

        for (token_chars, token) in tokens_longest_first {
            if stream[pos..].starts_with(token_chars.as_slice()) {
                if !used.iter().any(|u| u == token) {
                    used.push((*token).to_string());
                }
                pos += token_chars.len();
                advanced = true;
                break;
            }
        }

        if !advanced {
            pos += 1;
        }
    }

    used
}

fn is_ignorable(c: char) -> bool {
    c.is_whitespace() || c.is_ascii_punctuation() || CJK_PUNCTUATION.contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    #[test]
    fn splits_on_numbered_markers_and_drops_surrounding_noise() {
        let raw = "好的，以下是句子。SENTENCE_1: 你好。 SENTENCE_2: 我是学生。\n完毕。";
        let extracted = extract(raw, &pool(&["你", "好", "我", "是", "学生"]));

        assert_eq!(extracted.len(), 2);
        assert_eq!(extracted[0].chinese_text, "你好。");
        assert_eq!(extracted[1].chinese_text, "我是学生。\n完毕。");
    }

    #[test]
    fn usage_recomputed_from_text_with_junk_dropped() {
        let raw = "SENTENCE_1: 你好。garbage你 SENTENCE_2: 我是学生。";
        let extracted = extract(raw, &pool(&["你", "好", "我", "是", "学生"]));

        assert_eq!(extracted[0].used_characters, vec!["你", "好"]);
        assert_eq!(extracted[1].used_characters, vec!["我", "是", "学生"]);
    }

    #[test]
    fn longer_tokens_win_over_single_character_substrings() {
        let raw = "SENTENCE_1: 学生在学习。";
        let extracted = extract(raw, &pool(&["学", "生", "学生", "在"]));

        assert_eq!(extracted[0].used_characters, vec!["学生", "在", "学"]);
    }

    #[test]
    fn sentence_with_no_pool_tokens_is_still_emitted() {
        let raw = "SENTENCE_1: 完全无关的文字。";
        let extracted = extract(raw, &pool(&["你", "好"]));

        assert_eq!(extracted.len(), 1);
        assert!(extracted[0].used_characters.is_empty());
    }

    #[test]
    fn malformed_markers_are_not_split_points() {
        let raw = "SENTENCE_: 不算。SENTENCE_X: 也不算。SENTENCE_3: 你好。";
        let extracted = extract(raw, &pool(&["你", "好"]));

        assert_eq!(extracted.len(), 1);
        assert_eq!(extracted[0].chinese_text, "你好。");
    }

    #[test]
    fn no_markers_yields_nothing() {
        assert!(extract("你好。我是学生。", &pool(&["你", "好"])).is_empty());
    }

    #[test]
    fn duplicate_usage_is_deduplicated() {
        let raw = "SENTENCE_1: 你你你好。";
        let extracted = extract(raw, &pool(&["你", "好"]));

        assert_eq!(extracted[0].used_characters, vec!["你", "好"]);
    }
}

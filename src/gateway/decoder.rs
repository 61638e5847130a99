//! Decoder for batch generation responses.
//!
//! Grammar, one candidate per line: `<n>-<1|2>: <text>` where `n` is the
//! 1-based source index and the second tag selects the first or second
//! alternative. Everything else is ignored. Duplicate tags: last wins.
//! Out-of-range indices: ignored. Positions missing either alternative get
//! the fallback marker carrying the original text.

use super::types::CandidatePair;

/// Decode a raw response into exactly `originals.len()` candidate pairs,
/// in input order.
pub fn decode_candidates(raw: &str, originals: &[String]) -> Vec<CandidatePair> {
    let mut slots: Vec<[Option<String>; 2]> = vec![[None, None]; originals.len()];

    for line in raw.lines() {
        let line = line.trim();
        let Some((tag, text)) = line.split_once(':') else {
            continue;
        };
        let text = text.trim();
        if text.is_empty() {
            continue;
        }
        let Some((index_part, variant_part)) = tag.trim().split_once('-') else {
            continue;
        };
        let Ok(index) = index_part.trim().parse::<usize>() else {
            continue;
        };
        let variant = match variant_part.trim() {
            "1" => 0,
            "2" => 1,
            _ => continue,
        };
        if index == 0 || index > originals.len() {
            continue;
        }
        slots[index - 1][variant] = Some(text.to_string());
    }

    slots
        .into_iter()
        .zip(originals)
        .map(|(slot, original)| match slot {
            [Some(first), Some(second)] => CandidatePair::new(first, second),
            _ => CandidatePair::fallback(original),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn originals(n: usize) -> Vec<String> {
        (1..=n).map(|i| format!("source {i}")).collect()
    }

    #[test]
    fn decodes_well_formed_response() {
        let raw = "1-1: 시작\n1-2: 출발\n2-1: 종료\n2-2: 나가기";
        let pairs = decode_candidates(raw, &originals(2));

        assert_eq!(pairs.len(), 2);
        assert_eq!(pairs[0], CandidatePair::new("시작", "출발"));
        assert_eq!(pairs[1], CandidatePair::new("종료", "나가기"));
    }

    #[test]
    fn returns_exact_arity_with_fallbacks_for_missing_positions() {
        // Position 2 is missing its second alternative, position 3 entirely.
        let raw = "1-1: a\n1-2: b\n2-1: c";
        let pairs = decode_candidates(raw, &originals(3));

        assert_eq!(pairs.len(), 3);
        assert!(!pairs[0].fallback);
        assert!(pairs[1].fallback);
        assert_eq!(pairs[1].first, "[generation failed: source 2]");
        assert!(pairs[2].fallback);
        assert_eq!(pairs[2].first, "[generation failed: source 3]");
    }

    #[test]
    fn duplicate_tags_last_wins() {
        let raw = "1-1: old\n1-2: b\n1-1: new";
        let pairs = decode_candidates(raw, &originals(1));
        assert_eq!(pairs[0], CandidatePair::new("new", "b"));
    }

    #[test]
    fn out_of_range_indices_are_ignored() {
        let raw = "0-1: x\n3-1: y\n1-1: a\n1-2: b";
        let pairs = decode_candidates(raw, &originals(1));
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0], CandidatePair::new("a", "b"));
    }

    #[test]
    fn prose_and_blank_lines_are_skipped() {
        let raw = "Here are the translations:\n\n1-1: a\n1-2: b\nHope this helps!";
        let pairs = decode_candidates(raw, &originals(1));
        assert_eq!(pairs[0], CandidatePair::new("a", "b"));
    }

    #[test]
    fn variant_other_than_one_or_two_is_ignored() {
        let raw = "1-3: junk\n1-1: a\n1-2: b";
        let pairs = decode_candidates(raw, &originals(1));
        assert_eq!(pairs[0], CandidatePair::new("a", "b"));
    }

    #[test]
    fn translation_text_may_contain_colons() {
        let raw = "1-1: 비율: 16:9\n1-2: 화면비 16:9";
        let pairs = decode_candidates(raw, &originals(1));
        assert_eq!(pairs[0].first, "비율: 16:9");
    }

    #[test]
    fn empty_response_is_all_fallbacks() {
        let pairs = decode_candidates("", &originals(2));
        assert_eq!(pairs.len(), 2);
        assert!(pairs.iter().all(|p| p.fallback));
    }
}

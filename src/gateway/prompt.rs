//! Prompt assembly for batch generation.
//!
//! The engine is asked for two translations per source text and must answer
//! one line per candidate in the `<n>-<1|2>: <text>` form that
//! [`decoder`](super::decoder) understands.

use crate::config::TranslationStyle;
use crate::glossary::Glossary;

/// Build the prompt for one batch of source texts.
pub fn build_batch_prompt(texts: &[String], glossary: &Glossary, style: &TranslationStyle) -> String {
    let mut prompt = format!(
        "You are a professional game localization translator working from {} to {}.\n\n",
        style.source_lang, style.target_lang
    );

    prompt.push_str("Translation context:\n");
    prompt.push_str(&format!("- Game genre: {}\n", style.game_genre));
    prompt.push_str(&format!("- Tone: {}\n", style.tone));
    prompt.push_str(&format!("- Formality: {}\n", style.formality));
    prompt.push_str(&format!("- Target audience: {}\n\n", style.target_audience));

    prompt.push_str("Rules:\n");
    prompt.push_str("1. These are game UI/menu strings; keep translations short and direct.\n");
    prompt.push_str(&format!(
        "2. Transliterate proper nouns (track names, places) into {}.\n",
        style.target_lang
    ));
    prompt.push_str("3. Keep format specifiers (%s, %d, {0}) and HTML tags exactly as they are.\n\n");

    if !glossary.is_empty() {
        prompt.push_str("Glossary:\n");
        for (term, translation) in glossary {
            prompt.push_str(&format!("  - {term} -> {translation}\n"));
        }
        prompt.push('\n');
    }

    prompt.push_str("Source texts:\n");
    for (i, text) in texts.iter().enumerate() {
        prompt.push_str(&format!("Source {}: {}\n", i + 1, text));
    }
    prompt.push('\n');

    let n = texts.len();
    prompt.push_str(
        "Provide two translations for each source text. Answer with exactly one \
         line per candidate and nothing else, in this format:\n",
    );
    prompt.push_str("1-1: <first translation of source 1>\n");
    prompt.push_str("1-2: <second translation of source 1>\n");
    prompt.push_str("...\n");
    prompt.push_str(&format!("{n}-1: <first translation of source {n}>\n"));
    prompt.push_str(&format!("{n}-2: <second translation of source {n}>\n"));
    prompt.push_str(&format!("Provide exactly {} lines.", n * 2));

    prompt
}

//! Language detection by Polish diacritic density.

use tts_client::Language;

/// Number of leading characters examined.
pub const SAMPLE_CHARS: usize = 1000;

/// Density above which text is classified as Polish.
pub const DEFAULT_PL_THRESHOLD: f64 = 0.02;

const POLISH_DIACRITICS: [char; 9] = ['ą', 'ę', 'ć', 'ł', 'ń', 'ó', 'ś', 'ź', 'ż'];

/// Share of Polish diacritics in the lower-cased leading sample.
///
/// Returns 0.0 for empty text.
pub fn diacritic_density(text: &str) -> f64 {
    let sample: String = text.chars().take(SAMPLE_CHARS).collect::<String>().to_lowercase();

    let mut total = 0usize;
    let mut matches = 0usize;
    for c in sample.chars() {
        total += 1;
        if POLISH_DIACRITICS.contains(&c) {
            matches += 1;
        }
    }

    if total == 0 {
        return 0.0;
    }
    matches as f64 / total as f64
}

/// Classify text as Polish or English using the default threshold.
pub fn classify(text: &str) -> Language {
    classify_with_threshold(text, DEFAULT_PL_THRESHOLD)
}

/// Classify text, treating it as Polish when diacritic density exceeds `threshold`.
pub fn classify_with_threshold(text: &str, threshold: f64) -> Language {
    if diacritic_density(text) > threshold {
        Language::Pl
    } else {
        Language::En
    }
}

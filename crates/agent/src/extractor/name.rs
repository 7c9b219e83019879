//! Customer name capture and correction

use super::is_vehicle_word;
use super::rules::{Keywords, Patterns};

static INTRODUCTION: Patterns = Patterns::new(&[
    r"(?i)(?:me chamo|meu nome [eé]|\bsou(?:\s+[oa])?)\s+([A-ZÀ-Ú][a-zà-ú]+(?:\s+[A-ZÀ-Ú][a-zà-ú]+)?)",
    r"(?i)(?:\boi|\bolá|\bola),?\s*(?:sou|me chamo)\s+([A-ZÀ-Ú][a-zà-ú]+)",
    r"^([A-ZÀ-Ú][a-zà-ú]+)$",
]);

// Keyword-led corrections accept lowercase names; the bare forms require
// a capitalized name so ordinary words are not taken for one
static CORRECTION: Patterns = Patterns::new(&[
    r"(?i)\b(?:é|e)\s+([a-zà-ú]+)\s+(?:na verdade|na real)",
    r"(?i)(?:na verdade|na real),?\s+(?:é|e|sou)\s+([a-zà-ú]+)",
    r"(?i)(?:meu nome [eé]|me chamo)\s+([a-zà-ú]+)",
    r"([A-ZÀ-Ú][a-zà-ú]+),?\s+(?i:não|e não|nao)\s+[A-ZÀ-Ú][a-zà-ú]+",
    r"(?i)(?:pode me chamar de|me chama de|chama de)\s+([a-zà-ú]+)",
    r"^(?i:sou)\s+(?:o\s+|a\s+)?([A-ZÀ-Ú][a-zà-ú]+)$",
    r"(?i)(?:errei|errado|erro),?\s+(?:é|e|sou)\s+([a-zà-ú]+)",
    r"(?i:desculpa|desculpe),?\s+(?:é\s+)?([A-ZÀ-Ú][a-zà-ú]+)",
    r"(?i)(?:corrigindo|correção|correcao):?\s+([a-zà-ú]+)",
]);

static SINGLE_WORD: Keywords = Keywords::new(r"^([A-ZÀ-Ú][a-zà-ú]+)$");

const STOPWORDS: &[&str] = &[
    "oi", "ola", "olá", "bom", "boa", "dia", "tarde", "noite", "quero", "preciso", "um", "uma",
    "carro", "suv", "sedan", "sim", "nao", "não", "mas", "eu", "gosto", "acho", "prefiro",
    "talvez", "obrigado", "valeu", "ok", "certo", "beleza", "esse", "essa", "isso", "de", "da",
    "do",
];

fn is_stopword(lower: &str) -> bool {
    STOPWORDS.contains(&lower)
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

/// Validate one word as a name and normalize its casing
fn accept_word(word: &str) -> Option<String> {
    let lower = word.to_lowercase();
    if lower.chars().count() <= 1 || is_stopword(&lower) || is_vehicle_word(&lower) {
        return None;
    }
    Some(capitalize(word))
}

/// The second word is kept only when it also reads as a name
fn accept_name(raw: &str) -> Option<String> {
    let mut words = raw.split_whitespace();
    let first = accept_word(words.next()?)?;
    let second = words
        .next()
        .filter(|w| w.chars().next().is_some_and(char::is_uppercase))
        .and_then(accept_word);

    Some(match second {
        Some(second) => format!("{first} {second}"),
        None => first,
    })
}

/// Extract the customer's name from a self-introduction
pub fn extract_name(utterance: &str) -> Option<String> {
    let text = utterance.trim();
    INTRODUCTION.iter().find_map(|pattern| {
        let caps = pattern.captures(text)?;
        accept_name(caps.get(1)?.as_str())
    })
}

/// Loose match for single-name typos ("Rafaek" for "Rafael")
pub fn is_similar_name(a: &str, b: &str) -> bool {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    if a.len().abs_diff(b.len()) > 2 {
        return false;
    }

    let longest = a.len().max(b.len());
    let mismatches = (0..longest).filter(|&i| a.get(i) != b.get(i)).count();
    (1..=2).contains(&mismatches)
}

/// Detect an explicit or implied correction of the customer's name
///
/// Returns the corrected name only when it differs from `current`.
pub fn detect_name_correction(utterance: &str, current: Option<&str>) -> Option<String> {
    let text = utterance.trim();
    let differs = |name: &String| current.map_or(true, |c| c.to_lowercase() != name.to_lowercase());

    let explicit = CORRECTION.iter().find_map(|pattern| {
        let caps = pattern.captures(text)?;
        accept_word(caps.get(1)?.as_str())
    });
    if let Some(name) = explicit {
        return differs(&name).then_some(name);
    }

    let current = current?;
    let candidate = accept_word(SINGLE_WORD.capture(text)?)?;
    (differs(&candidate) && is_similar_name(&candidate, current)).then_some(candidate)
}

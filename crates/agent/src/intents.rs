//! Keyword sets that steer routing between nodes
//!
//! Matched against the lowercased utterance.

use crate::extractor::rules::Keywords;

pub static HANDOFF: Keywords =
    Keywords::new(r"vendedor|humano|atendente|pessoa real");

pub static EXIT_STRICT: Keywords = Keywords::new(r"^(?:sair|tchau|bye|encerrar|finalizar)[.!]*$");

pub static FINANCING: Keywords = Keywords::new(r"financ|parcel|entrada|prestação|prestacao");

pub static TRADE_IN_DISCOVERY: Keywords = Keywords::new(r"tenho.*troca|meu carro|dar na troca");

pub static TRADE_IN: Keywords = Keywords::new(r"troca|meu carro|tenho um\b|dar na troca");

pub static VISIT: Keywords = Keywords::new(r"agendar|visita|test.?drive|conhecer");

pub static PURCHASE: Keywords =
    Keywords::new(r"gostei|interessei|quero esse|\bquero o\b|vou levar|fechar|comprar");

pub static MORE_OPTIONS: Keywords =
    Keywords::new(r"mais opções|mais opcoes|outras|diferentes|\boutro\b");

pub static DETAIL_CHOICE: Keywords = Keywords::new(r"^\s*([1-3])\s*$");

/// Leave a calculator and go back to the list
pub static BACK: Keywords = Keywords::new(r"voltar|ver carros|opções|opcoes|recomend");

pub static CLOSE_FINANCING: Keywords = Keywords::new(r"vendedor|humano|fechar|aprovar");

pub static CLOSE_TRADE_IN: Keywords = Keywords::new(r"vendedor|humano|avaliar presencial");

pub static NEGOTIATION_BACK: Keywords =
    Keywords::new(r"voltar|ver carros|outras opções|outras opcoes|mais carros");

pub static NEW_SEARCH: Keywords = Keywords::new(r"buscar|procurar|outro tipo|diferente");

pub static FAREWELL: Keywords = Keywords::new(r"tchau|\bbye\b|\bsair\b|encerrar|obrigad|valeu");

pub static TIMING: Keywords = Keywords::new(r"quando|prazo|demora|contato");

static QUESTION_START: Keywords = Keywords::new(
    r"^(?:qual|quais|quanto|quantos|quantas|como|quando|onde|por ?que|o que|tem|é|e se|pode|posso)\b",
);

/// Free-form question that deserves an open answer
pub fn is_question(lower: &str) -> bool {
    lower.contains('?') || QUESTION_START.matches(lower.trim_start())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_exit_needs_whole_message() {
        assert!(EXIT_STRICT.matches("sair"));
        assert!(EXIT_STRICT.matches("tchau!"));
        assert!(!EXIT_STRICT.matches("não quero sair agora"));
    }

    #[test]
    fn test_purchase_does_not_catch_more_options() {
        assert!(PURCHASE.matches("quero o primeiro"));
        assert!(!PURCHASE.matches("quero outros"));
        assert!(MORE_OPTIONS.matches("me mostra outras"));
    }

    #[test]
    fn test_detail_choice() {
        assert_eq!(DETAIL_CHOICE.capture("2"), Some("2"));
        assert_eq!(DETAIL_CHOICE.capture(" 3 "), Some("3"));
        assert_eq!(DETAIL_CHOICE.capture("4"), None);
        assert_eq!(DETAIL_CHOICE.capture("12"), None);
    }

    #[test]
    fn test_questions() {
        assert!(is_question("qual o consumo desse carro"));
        assert!(is_question("ele tem airbag?"));
        assert!(!is_question("gostei do segundo"));
    }
}

//! Business constants shared by settings defaults and calculators

/// Vehicle financing
pub mod financing {
    /// Monthly interest rate applied to financed amounts (1.79%)
    pub const MONTHLY_RATE: f64 = 0.0179;
    pub const DEFAULT_DOWN_PAYMENT_RATIO: f64 = 0.2;
    pub const DEFAULT_TERM_MONTHS: u32 = 48;
    pub const ALTERNATIVE_TERMS: [u32; 2] = [36, 60];
}

/// Trade-in estimation
pub mod trade_in {
    pub const BASE_VALUE: f64 = 50_000.0;
    pub const ANNUAL_DEPRECIATION: f64 = 0.12;
    pub const EXPECTED_KM_PER_YEAR: u32 = 15_000;
    /// Value shift per 100,000 km of deviation from expected mileage
    pub const MILEAGE_ADJUSTMENT_PER_100K: f64 = 0.1;
    pub const MILEAGE_MULTIPLIER_MIN: f64 = 0.7;
    pub const MILEAGE_MULTIPLIER_MAX: f64 = 1.1;
    pub const RANGE_LOW: f64 = 0.85;
    pub const RANGE_HIGH: f64 = 1.05;

    pub const BRAND_MULTIPLIERS: [(&str, f64); 10] = [
        ("toyota", 1.1),
        ("honda", 1.1),
        ("volkswagen", 1.0),
        ("chevrolet", 0.95),
        ("fiat", 0.9),
        ("hyundai", 1.0),
        ("jeep", 1.15),
        ("ford", 0.95),
        ("renault", 0.9),
        ("nissan", 0.95),
    ];
}

/// Recommendation ranking
pub mod ranker {
    pub const SIMILARITY_THRESHOLD: f32 = 0.3;
    /// Hard price ceiling as a multiple of the stated budget
    pub const BUDGET_FLEXIBILITY: f64 = 1.1;
    pub const MAX_RECOMMENDATIONS: usize = 3;
    pub const CANDIDATE_LIMIT: usize = 50;
    pub const KEYWORD_FALLBACK_SCORE: f32 = 0.7;
    pub const FILTER_FALLBACK_SCORE: f32 = 0.8;
    pub const UNFILTERED_FALLBACK_SCORE: f32 = 1.0;
}

/// Chat-completion routing
pub mod llm {
    pub const TEMPERATURE: f32 = 0.7;
    pub const MAX_TOKENS: u32 = 1024;
    pub const FAILURE_THRESHOLD: u32 = 3;
    pub const OPEN_DURATION_SECS: u64 = 60;
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    pub const MAX_RETRIES: u32 = 2;
    pub const FALLBACK_PROVIDER: &str = "mock";
    pub const FALLBACK_TEXT: &str = "Desculpe, estou com dificuldades técnicas no momento. \
        Por favor, tente novamente em alguns instantes.";
}

/// Embedding provider
pub mod embedding {
    pub const MODEL: &str = "text-embedding-3-small";
    pub const DIMENSIONS: usize = 1536;
}

/// Outbound API endpoints
pub mod endpoints {
    pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
    pub const GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
    pub const OPENAI_MODEL: &str = "gpt-4o-mini";
    pub const GROQ_MODEL: &str = "llama-3.1-8b-instant";
}

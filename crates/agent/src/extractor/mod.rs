//! Profile extraction from free-text pt-BR utterances
//!
//! [`extract`] is pure and deterministic: it maps one utterance to a
//! [`ProfileUpdate`] by running ordered rule families over the lowercased
//! text. Rule order is data (see the tables below), not control flow.

mod name;
pub mod rules;
mod trade_in;

pub use name::{detect_name_correction, extract_name, is_similar_name};
pub use trade_in::{extract_trade_in, TradeInFacts};

use sales_agent_core::{
    BodyType, CustomerProfile, FuelType, ProfileUpdate, Transmission, UsageCategory, Urgency,
};

use rules::{Keywords, Patterns, Rules};

static BUDGET: Patterns = Patterns::new(&[
    r"(\d{2,3})[\s.]?(?:mil\b|k\b)",
    r"r\$\s*(\d{1,3}(?:\.\d{3})+|\d+)",
    r"até\s*(\d{2,3})[\s.]?(?:mil)?",
    r"orçamento.*?(\d{2,3})[\s.]?(?:mil)?",
]);

static BUDGET_RANGE: Keywords = Keywords::new(r"entre\s*(\d{2,3})\s*(?:mil\s*)?e\s*(\d{2,3})\s*mil");
static BUDGET_FLEXIBLE: Keywords =
    Keywords::new(r"flexível|flexivel|posso esticar|um pouco mais|dá pra esticar");

static BODY_TYPE: Rules<BodyType> = Rules::new(&[
    (r"suv", BodyType::Suv),
    (r"sedan|sedã", BodyType::Sedan),
    (r"hatch", BodyType::Hatch),
    (r"pickup|picape", BodyType::Pickup),
    (r"minivan|\bvan\b", BodyType::Minivan),
]);

static USAGE: Rules<UsageCategory> = Rules::new(&[
    (r"\buber\b|\b99\b|\bapp\b|aplicativo|motorista", UsageCategory::Rideshare),
    (r"cidade e estrada|estrada e cidade|uso misto|\bmisto\b", UsageCategory::Mixed),
    (r"família|familia|filhos|crianças|passeio", UsageCategory::Trip),
    (r"trabalho|serviço|empresa", UsageCategory::Work),
    (r"cidade|urbano|dia.?a.?dia", UsageCategory::City),
    (r"viagem|viajar|estrada|rodovia", UsageCategory::Trip),
]);

static PEOPLE: Keywords = Keywords::new(r"(\d+)\s*(?:pessoas?|passageiros?|lugares?)");
static SEATS: Keywords = Keywords::new(r"(\d+)\s*lugares?");
static LARGE_FAMILY: Keywords = Keywords::new(r"família grande|familia grande|muitos filhos");

static MIN_YEAR_EXPLICIT: Keywords =
    Keywords::new(r"(?:a partir de|mínimo|minimo|desde)\s*(20[12]\d)");
static ANY_YEAR: Keywords = Keywords::new(r"\b(20[12]\d)\b");

static MAX_MILEAGE: Keywords =
    Keywords::new(r"(?:até|máximo|maximo|menos de)\s*(\d{1,3}(?:\.\d{3})+|\d{2,3})[\s.]?(?:mil)?\s*km");

static TRANSMISSION: Rules<Transmission> = Rules::new(&[
    (r"automático|automatico|\bauto\b", Transmission::Automatic),
    (r"manual", Transmission::Manual),
]);

static FUEL: Rules<FuelType> = Rules::new(&[
    (r"\bflex\b", FuelType::Flex),
    (r"diesel", FuelType::Diesel),
    (r"híbrido|hibrido", FuelType::Hybrid),
    (r"elétrico|eletrico", FuelType::Electric),
]);

/// Brand keywords, shared with trade-in parsing
pub(crate) static BRAND: Rules<&'static str> = Rules::new(&[
    (r"toyota", "toyota"),
    (r"honda", "honda"),
    (r"volkswagen|\bvw\b", "volkswagen"),
    (r"fiat", "fiat"),
    (r"chevrolet|\bgm\b", "chevrolet"),
    (r"\bford\b", "ford"),
    (r"hyundai", "hyundai"),
    (r"\bjeep\b", "jeep"),
    (r"nissan", "nissan"),
    (r"renault", "renault"),
    (r"peugeot", "peugeot"),
    (r"citroen|citroën", "citroen"),
    (r"mitsubishi", "mitsubishi"),
    (r"\bkia\b", "kia"),
    (r"\bbmw\b", "bmw"),
    (r"mercedes", "mercedes"),
    (r"\baudi\b", "audi"),
]);

static TRADE_IN_INTENT: Keywords = Keywords::new(
    r"tenho.*(?:pra|para)?\s*(?:dar na)?\s*troca|meu carro.*troca|trocar meu|dar na troca",
);
static FINANCING_INTENT: Keywords = Keywords::new(r"financ|parcel|entrada|prestação|prestacao");

static PRIORITIES: Rules<&'static str> = Rules::new(&[
    (r"econômic|econom|consumo baixo|gasta pouco", "economico"),
    (r"confort|espaço|espacoso|espaçoso", "conforto"),
    (r"segur|airbag|freio abs", "seguranca"),
    (r"potent|forte|motor bom", "potencia"),
]);

static URGENCY: Rules<Urgency> = Rules::new(&[
    (r"urgente|o quanto antes|\bhoje\b|\bagora\b", Urgency::Immediate),
    (r"esse mês|este mês|próximo mês|proximo mes|em breve", Urgency::Soon),
    (r"sem pressa|sem urgência|só pesquisando|so pesquisando", Urgency::Flexible),
]);

/// Amounts below 1000 are read as thousands
fn normalize_thousands(value: u64) -> u64 {
    if value < 1000 {
        value * 1000
    } else {
        value
    }
}

fn parse_amount(raw: &str) -> Option<u64> {
    raw.replace('.', "").parse::<u64>().ok()
}

/// Amount followed by "km" or "entrada" is mileage or a down payment
fn is_budget_context(rest: &str) -> bool {
    // "50.000 km" leaves dotted thousand groups after the captured digits
    let rest = rest
        .trim_start_matches(|c: char| c.is_ascii_digit() || c == '.')
        .trim_start();
    !(rest.starts_with("km") || rest.starts_with("de entrada") || rest.starts_with("entrada"))
}

fn extract_budget(lower: &str) -> Option<u64> {
    for pattern in BUDGET.iter() {
        for caps in pattern.captures_iter(lower) {
            let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if !is_budget_context(&lower[whole.end()..]) {
                continue;
            }
            if let Some(amount) = parse_amount(value.as_str()) {
                return Some(normalize_thousands(amount));
            }
        }
    }
    None
}

fn extract_budget_range(lower: &str) -> Option<(u64, u64)> {
    let caps = BUDGET_RANGE.captures_iter(lower).next()?;
    let min = parse_amount(caps.get(1)?.as_str())?;
    let max = parse_amount(caps.get(2)?.as_str())?;
    Some((normalize_thousands(min), normalize_thousands(max)))
}

fn parse_small<T: std::str::FromStr>(raw: Option<&str>) -> Option<T> {
    raw.and_then(|r| r.parse().ok())
}

/// Map one utterance to a partial profile
///
/// A name is only looked for while `prior` has none; changing a known
/// name goes through [`detect_name_correction`].
pub fn extract(utterance: &str, prior: &CustomerProfile) -> ProfileUpdate {
    let lower = utterance.to_lowercase();
    let mut update = ProfileUpdate::default();

    if prior.name.is_none() {
        update.name = extract_name(utterance);
    }

    update.budget = extract_budget(&lower);
    if let Some((min, max)) = extract_budget_range(&lower) {
        update.budget_min = Some(min);
        update.budget_max = Some(max);
        update.budget = Some(max);
    }
    update.budget_flexible = BUDGET_FLEXIBLE.matches(&lower);

    update.body_type = BODY_TYPE.first(&lower);
    update.usage = USAGE.first(&lower);

    update.people = parse_small(PEOPLE.capture(&lower));
    update.min_seats = parse_small(SEATS.capture(&lower));
    if LARGE_FAMILY.matches(&lower) {
        update.people = Some(5);
        update.min_seats = Some(7);
    }

    update.min_year = parse_small(MIN_YEAR_EXPLICIT.capture(&lower))
        .or_else(|| parse_small(ANY_YEAR.capture(&lower)));

    update.max_mileage = MAX_MILEAGE
        .capture(&lower)
        .and_then(parse_amount)
        .and_then(|km| u32::try_from(normalize_thousands(km)).ok());

    update.transmission = TRANSMISSION.first(&lower);
    update.fuel = FUEL.first(&lower);
    update.brand = BRAND.first(&lower).map(str::to_string);

    update.has_trade_in = TRADE_IN_INTENT.matches(&lower);
    if !update.has_trade_in {
        // A model named while describing a trade-in is not the one wanted
        update.model = trade_in::find_model(&lower).map(str::to_string);
    }
    update.wants_financing = FINANCING_INTENT.matches(&lower);

    update.priorities = PRIORITIES.all(&lower).into_iter().map(str::to_string).collect();
    update.urgency = URGENCY.first(&lower);

    update
}

/// Known brand, body or model keyword; never a customer name
pub(crate) fn is_vehicle_word(lower: &str) -> bool {
    BRAND.first(lower).is_some() || BODY_TYPE.first(lower).is_some() || trade_in::find_model(lower).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(text: &str) -> ProfileUpdate {
        extract(text, &CustomerProfile::default())
    }

    #[test]
    fn test_budget_in_thousands() {
        assert_eq!(run("até 80 mil").budget, Some(80_000));
        assert_eq!(run("tenho uns 120k").budget, Some(120_000));
        assert_eq!(run("meu orçamento é 95").budget, Some(95_000));
    }

    #[test]
    fn test_budget_currency_amount() {
        assert_eq!(run("posso pagar R$ 85.000").budget, Some(85_000));
        assert_eq!(run("r$ 90").budget, Some(90_000));
    }

    #[test]
    fn test_body_and_budget_in_one_pass() {
        let update = run("quero um SUV até 80 mil");
        assert_eq!(update.body_type, Some(BodyType::Suv));
        assert_eq!(update.budget, Some(80_000));
    }

    #[test]
    fn test_body_type_priority_order() {
        assert_eq!(run("suv ou sedan").body_type, Some(BodyType::Suv));
        assert_eq!(run("sedan ou hatch").body_type, Some(BodyType::Sedan));
        assert_eq!(run("uma picape").body_type, Some(BodyType::Pickup));
        assert_eq!(run("uma van").body_type, Some(BodyType::Minivan));
        assert_eq!(run("avançado").body_type, None);
    }

    #[test]
    fn test_mileage_is_not_budget() {
        let update = run("com até 50 mil km");
        assert_eq!(update.max_mileage, Some(50_000));
        assert_eq!(update.budget, None);
    }

    #[test]
    fn test_dotted_mileage_is_not_budget() {
        let update = run("com até 50.000 km");
        assert_eq!(update.max_mileage, Some(50_000));
        assert_eq!(update.budget, None);

        let update = run("sedan até 90 mil, máximo 60.000 km");
        assert_eq!(update.budget, Some(90_000));
        assert_eq!(update.max_mileage, Some(60_000));

        let update = run("até 80 mil 50.000 km");
        assert_eq!(update.budget, Some(80_000));
    }

    #[test]
    fn test_down_payment_is_not_budget() {
        let update = run("tenho 20 mil de entrada");
        assert_eq!(update.budget, None);
        assert!(update.wants_financing);
    }

    #[test]
    fn test_budget_range() {
        let update = run("entre 60 e 80 mil");
        assert_eq!(update.budget_min, Some(60_000));
        assert_eq!(update.budget_max, Some(80_000));
        assert_eq!(update.budget, Some(80_000));
    }

    #[test]
    fn test_usage_mapping() {
        assert_eq!(run("vou rodar no uber").usage, Some(UsageCategory::Rideshare));
        assert_eq!(run("para a família").usage, Some(UsageCategory::Trip));
        assert_eq!(run("pro trabalho").usage, Some(UsageCategory::Work));
        assert_eq!(run("dia a dia na cidade").usage, Some(UsageCategory::City));
        assert_eq!(run("cidade e estrada").usage, Some(UsageCategory::Mixed));
        assert_eq!(run("ano 1999").usage, None);
    }

    #[test]
    fn test_large_family() {
        let update = run("tenho uma família grande");
        assert_eq!(update.people, Some(5));
        assert_eq!(update.min_seats, Some(7));
        assert_eq!(run("para 4 pessoas").people, Some(4));
        let seats = run("preciso de 7 lugares");
        assert_eq!(seats.min_seats, Some(7));
        assert_eq!(seats.people, Some(7));
    }

    #[test]
    fn test_year_and_transmission_and_fuel() {
        let update = run("a partir de 2019, automático e flex");
        assert_eq!(update.min_year, Some(2019));
        assert_eq!(update.transmission, Some(Transmission::Automatic));
        assert_eq!(update.fuel, Some(FuelType::Flex));
        assert_eq!(run("câmbio manual").transmission, Some(Transmission::Manual));
    }

    #[test]
    fn test_brand_normalization() {
        assert_eq!(run("um vw").brand.as_deref(), Some("volkswagen"));
        assert_eq!(run("da GM").brand.as_deref(), Some("chevrolet"));
        assert_eq!(run("gosto de toyota").brand.as_deref(), Some("toyota"));
    }

    #[test]
    fn test_trade_in_and_financing_intent() {
        let update = run("tenho um gol pra dar na troca e quero financiar");
        assert!(update.has_trade_in);
        assert!(update.wants_financing);
        assert_eq!(update.model, None);
    }

    #[test]
    fn test_priorities_can_co_occur() {
        let update = run("quero algo econômico, confortável e seguro");
        assert_eq!(update.priorities, vec!["economico", "conforto", "seguranca"]);
    }

    #[test]
    fn test_name_only_when_unknown() {
        assert_eq!(run("Oi, sou Maria").name.as_deref(), Some("Maria"));

        let known = CustomerProfile {
            name: Some("Ana".into()),
            ..Default::default()
        };
        assert_eq!(extract("Oi, sou Maria", &known).name, None);
    }

    #[test]
    fn test_nothing_extracted_from_small_talk() {
        assert!(run("tudo bem?").is_empty());
    }
}

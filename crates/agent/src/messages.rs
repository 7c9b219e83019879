//! Customer-facing pt-BR copy
//!
//! Every reply the nodes send is built here so wording stays in one place.

use std::fmt::Write;

use sales_agent_core::format::{brl, group_thousands, km};
use sales_agent_core::{BodyType, ConversationSession, CustomerProfile, VehicleCard, VehicleRecommendation};
use sales_agent_tools::{FinancingSimulation, TradeInEstimate};

const SEPARATOR: &str = "━━━━━━━━━━━━━━━━━━━━━";

pub const DISCOVERY_HANDOFF: &str = "Claro! Vou te transferir para um de nossos consultores. 👨‍💼\n\n\
    Ele vai entrar em contato em breve pelo WhatsApp.\n\n\
    _Obrigado por usar o CarInsight!_ 🚗";

pub const DISCOVERY_EXIT: &str = "Até mais! Foi um prazer ajudar. 👋\n\n\
    Quando precisar de um carro, é só voltar aqui! 🚗";

pub const NO_RESULTS: &str = "Poxa, não encontrei veículos disponíveis com esses critérios no momento. 😕\n\n\
    Quer que eu:\n\
    • Busque com critérios mais flexíveis?\n\
    • Te passe para um vendedor que pode ajudar?";

pub const VISIT_REQUESTED: &str = "Ótimo! 🎉\n\n\
    Vou pedir pro nosso consultor agendar sua visita.\n\n\
    Ele vai entrar em contato pelo WhatsApp pra confirmar o melhor horário.\n\n\
    _Obrigado por escolher o CarInsight!_ 🚗";

pub const RECOMMENDATION_HANDOFF: &str = "Claro! Vou te transferir para um consultor. 👨‍💼\n\n\
    Ele vai entrar em contato em breve.\n\n\
    _Já passei suas informações pra ele!_";

pub const RECOMMENDATION_HELP: &str = "Posso te ajudar com algo mais? 🤔\n\n\
    • Digite um número (1, 2 ou 3) pra ver detalhes\n\
    • \"Mais opções\" pra ver outros carros\n\
    • \"Financiamento\" pra simular parcelas\n\
    • \"Vendedor\" pra falar com alguém";

pub const FINANCING_NO_PRICE: &str = "Pra simular o financiamento, preciso saber qual veículo te interessa! 🚗\n\n\
    Me conta:\n\
    • Qual tipo de carro você procura?\n\
    • Qual seu orçamento?\n\n\
    Assim posso te mostrar as opções e simular as parcelas!";

pub const FINANCING_PROMPT: &str = "Vamos simular o financiamento! 💰\n\n\
    Me conta:\n\
    • Quanto você tem de entrada?\n\
    • Em quantas vezes quer parcelar? (36, 48 ou 60x)\n\n\
    _Exemplo: \"20 mil de entrada em 48x\"_";

pub const NEW_SEARCH: &str = "Claro! Vamos buscar outras opções. 🔍\n\n\
    Me conta o que você está procurando agora?";

pub const NEGOTIATION_EXIT: &str = "Foi um prazer ajudar! 😊\n\n\
    Nosso consultor vai entrar em contato em breve.\n\n\
    Até mais e boa sorte com o carro novo! 🚗✨";

pub const CONTACT_TIMING: &str = "Nosso consultor costuma responder em até 30 minutos durante o horário comercial. ⏰\n\n\
    Se preferir, pode ligar diretamente para a loja!\n\n\
    _Posso ajudar com mais alguma coisa enquanto isso?_";

pub const ALREADY_FORWARDED: &str = "Seu contato já foi encaminhado para nossa equipe! 👍\n\n\
    Enquanto aguarda, posso:\n\
    • Mostrar mais opções de carros\n\
    • Simular financiamento\n\
    • Tirar dúvidas sobre os veículos\n\n\
    _É só me dizer!_";

pub const HANDOFF_CLOSING: &str = "Seu atendimento já foi encaminhado para um consultor. 👨‍💼\n\n\
    Ele vai entrar em contato em breve pelo WhatsApp.";

pub const END_CLOSING: &str = "Esta conversa foi encerrada. 👋\n\n\
    Quando quiser procurar outro carro, é só começar uma nova conversa!";

pub const TURN_FAILURE: &str = "Desculpe, tive um problema ao processar sua mensagem. 😕\n\n\
    Pode tentar novamente? Se preferir, posso te passar para um consultor.";

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn greeting_intro(first_name: Option<&str>) -> String {
    let salutation = match first_name {
        Some(name) => format!("👋 Olá, {name}!"),
        None => "👋 Olá!".to_string(),
    };
    format!(
        "{salutation} Sou a assistente virtual do *CarInsight*.\n\n\
         🤖 *Importante:* Sou uma inteligência artificial e posso cometer erros.\n\n"
    )
}

/// Customer arrived from a specific listing
pub fn greeting_selected_vehicle(vehicle: &VehicleCard) -> String {
    format!(
        "{}Vi que você está interessado no *{} {} {}*! Excelente escolha! 🚗\n\n\
         📋 *Detalhes:*\n\
         💰 Preço: {}\n\
         🛣️ {}\n\n\
         Como posso te ajudar?\n\
         • Quer saber mais sobre este veículo?\n\
         • Simular financiamento?\n\
         • Agendar uma visita?\n\
         • Falar com um vendedor?\n\n\
         _Qual é o seu nome, por favor?_",
        greeting_intro(None),
        vehicle.make,
        vehicle.model,
        vehicle.year,
        brl(vehicle.price),
        km(vehicle.mileage),
    )
}

pub fn greeting_with_intent(first_name: &str, body: Option<BodyType>, budget: Option<u64>) -> String {
    let mut text = greeting_intro(Some(first_name));
    if let Some(body) = body {
        let _ = write!(text, "Vi que você está interessado em um *{}*. ", body.as_str().to_uppercase());
    }
    if let Some(budget) = budget {
        let _ = write!(text, "Com orçamento de *{}*. ", brl(budget));
    }
    text.push_str("\n\nVou buscar as melhores opções pra você! 🚗");
    text
}

pub fn greeting_name_only(first_name: &str) -> String {
    format!(
        "{}Me conta, o que você está procurando? 🚗\n\n\
         Pode ser:\n\
         • Um tipo de carro (SUV, sedan, hatch...)\n\
         • Para que vai usar (família, trabalho, app...)\n\
         • Ou um modelo específico",
        greeting_intro(Some(first_name))
    )
}

pub fn greeting_intent_only(profile: &CustomerProfile) -> String {
    let mut parts = Vec::new();
    if let Some(body) = profile.body_type {
        parts.push(body.as_str().to_uppercase());
    }
    if let Some(brand) = &profile.brand {
        parts.push(title_case(brand));
    }
    let description = if parts.is_empty() {
        "veículo".to_string()
    } else {
        parts.join(" ")
    };
    format!(
        "{}Vi que você busca um *{description}*. Ótima escolha! 🚗\n\nQual é o seu nome?",
        greeting_intro(None)
    )
}

pub fn greeting_ask_name() -> String {
    format!(
        "{}💡 _A qualquer momento, digite *sair* para encerrar._\n\n\
         Para começar, qual é o seu nome?",
        greeting_intro(None)
    )
}

pub fn name_corrected(first_name: &str, follow_up: &str) -> String {
    format!("Desculpa pelo erro, {first_name}! 😅\n\n{follow_up}")
}

pub fn name_corrected_searching(first_name: &str) -> String {
    format!("Desculpa pelo erro, {first_name}! 😅 Deixa eu buscar as melhores opções pra você...")
}

pub const CORRECTION_ASK_BUDGET: &str = "Qual seria sua faixa de orçamento para o carro? 🚗💰";
pub const CORRECTION_ASK_USAGE: &str = "E qual o principal uso que você pretende dar para o carro? 🚗";
pub const CORRECTION_ASK_ANYTHING: &str = "Como posso te ajudar a encontrar o carro ideal? 🚗";

/// Question aimed at the most useful missing field
pub fn clarifying_question(profile: &CustomerProfile) -> String {
    let lead = profile
        .first_name()
        .map(|name| format!("{name}, "))
        .unwrap_or_default();

    if profile.budget.is_none() && profile.body_type.is_none() && profile.usage.is_none() {
        return format!(
            "{lead}pra te ajudar melhor, me conta:\n\n\
             • Qual tipo de carro você procura? (SUV, sedan, hatch...)\n\
             • Pra que vai usar? (família, trabalho, app...)\n\
             • Tem um orçamento em mente?"
        );
    }
    if profile.budget.is_none() {
        return format!(
            "{lead}qual é o seu orçamento? Pode ser um valor aproximado, tipo \"até 80 mil\" 💰"
        );
    }
    if profile.body_type.is_none() && profile.usage.is_none() {
        return format!(
            "{lead}e qual tipo de carro você prefere?\n\n\
             • SUV (mais espaço e altura)\n\
             • Sedan (conforto e porta-malas)\n\
             • Hatch (compacto e econômico)\n\
             • Pickup (trabalho e aventura)"
        );
    }
    "Entendi! Deixa eu buscar as melhores opções pra você... 🔍".to_string()
}

pub fn recommendation_list(recommendations: &[VehicleRecommendation]) -> String {
    if recommendations.is_empty() {
        return NO_RESULTS.to_string();
    }

    let mut text = String::from("Encontrei algumas opções que combinam com você! 🚗✨\n\n");
    for (index, rec) in recommendations.iter().enumerate() {
        let vehicle = &rec.vehicle;
        let _ = writeln!(text, "*{}. {} {}* {}", index + 1, vehicle.make, vehicle.model, vehicle.year);
        if vehicle.mileage > 0 {
            let thousands = (f64::from(vehicle.mileage) / 1000.0).round() as u64;
            let _ = writeln!(text, "   {thousands}mil km • {}", brl(vehicle.price));
        } else {
            let _ = writeln!(text, "   {}", brl(vehicle.price));
        }
        if !rec.reasoning.is_empty() {
            let _ = writeln!(text, "   _{}_", rec.reasoning);
        }
        text.push('\n');
    }
    let _ = write!(
        text,
        "{SEPARATOR}\n\n\
         Curtiu algum? Me diz o número (1, 2 ou 3) pra ver mais detalhes!\n\n\
         Ou me conta se quer:\n\
         • Ver mais opções\n\
         • Saber sobre financiamento\n\
         • Falar com um vendedor"
    );
    text
}

pub fn vehicle_detail(rec: &VehicleRecommendation) -> String {
    let vehicle = &rec.vehicle;
    let mut text = format!(
        "📋 *{} {}*\n\n📅 Ano: {}\n🛣️ {}\n💰 {}\n🚗 Tipo: {}\n",
        vehicle.make,
        vehicle.model,
        vehicle.year,
        km(vehicle.mileage),
        brl(vehicle.price),
        vehicle.body_type,
    );

    if !vehicle.features.is_empty() {
        text.push_str("\n✨ *Destaques:*\n");
        for feature in vehicle.features.iter().take(5) {
            let _ = writeln!(text, "• {feature}");
        }
    }
    if !rec.highlights.is_empty() {
        text.push_str("\n👍 *Por que esse carro:*\n");
        for highlight in &rec.highlights {
            let _ = writeln!(text, "• {highlight}");
        }
    }

    let _ = write!(
        text,
        "\n{SEPARATOR}\n\n\
         Gostou? Você pode:\n\
         • \"Agendar visita\" pra ver de perto\n\
         • \"Financiamento\" pra simular parcelas\n\
         • \"Falar com vendedor\" pra negociar"
    );
    text
}

/// `simulations` are rendered in the given order; the first one is the
/// reference for price, down payment and rate. The `chosen_term` line is starred.
pub fn financing_simulation(simulations: &[FinancingSimulation], chosen_term: u32) -> String {
    let Some(reference) = simulations.first() else {
        return FINANCING_PROMPT.to_string();
    };

    let mut text = format!(
        "💰 *Simulação de Financiamento*\n\n\
         Veículo: {}\n\
         Entrada: {} ({}%)\n\
         Valor financiado: {}\n\n\
         📊 *Opções de parcelamento:*\n\n",
        brl(reference.vehicle_price),
        brl(reference.down_payment),
        reference.down_payment_percent(),
        brl(reference.financed_amount),
    );
    for simulation in simulations {
        let marker = if simulation.term_months == chosen_term { " ⭐" } else { "" };
        let _ = writeln!(
            text,
            "• *{}x* de {}{marker}",
            simulation.term_months,
            brl(simulation.monthly_payment)
        );
    }
    let _ = write!(
        text,
        "\n_Taxa aproximada: {:.1}% a.a._\n\n\
         {SEPARATOR}\n\n\
         Quer ajustar a entrada ou prazo?\n\
         Ou posso te passar pra um consultor pra fechar as condições! 👨‍💼",
        reference.annual_rate_percent
    );
    text
}

pub fn trade_in_estimate(
    brand: &str,
    model: Option<&str>,
    year: i32,
    estimate: &TradeInEstimate,
) -> String {
    let vehicle = match model {
        Some(model) => format!("{} {}", brand.to_uppercase(), model.to_uppercase()),
        None => brand.to_uppercase(),
    };
    format!(
        "🚗 *Avaliação do seu {vehicle} {year}*\n\n\
         💰 Valor estimado:\n\
         {} - {}\n\n\
         _Confiança: {}_\n\n\
         ⚠️ *Importante:* Este é um valor estimado. O valor final depende de:\n\
         • Estado de conservação\n\
         • Quilometragem real\n\
         • Histórico de manutenção\n\n\
         {SEPARATOR}\n\n\
         Quer que eu considere esse valor na busca do seu próximo carro?\n\
         Ou prefere falar com um consultor pra uma avaliação presencial?",
        brl(estimate.min_value),
        brl(estimate.max_value),
        estimate.confidence.label(),
    )
}

pub fn trade_in_missing(brand: bool, model: bool, year: bool) -> String {
    let mut text = String::from("Pra avaliar seu carro, preciso de algumas informações! 🚗\n\n");
    if !brand {
        text.push_str("• Qual a *marca* do seu carro?\n");
    }
    if !model {
        text.push_str("• Qual o *modelo*?\n");
    }
    if !year {
        text.push_str("• Qual o *ano*?\n");
    }
    text.push_str("\n_Exemplo: \"Tenho um Corolla 2020\"_");
    text
}

/// Hand-off summary for the sales team
pub fn customer_summary(session: &ConversationSession) -> String {
    let profile = &session.profile;
    let mut text = String::from("📋 *Resumo do Cliente*\n\n");

    if let Some(name) = &profile.name {
        let _ = writeln!(text, "👤 Nome: {name}");
    }
    if let Some(budget) = profile.budget {
        let _ = writeln!(text, "💰 Orçamento: {}", brl(budget));
    }
    if let Some(body) = profile.body_type {
        let _ = writeln!(text, "🚗 Tipo: {}", body.as_str().to_uppercase());
    }
    if let Some(usage) = profile.usage {
        let _ = writeln!(text, "📍 Uso: {}", usage.display_name());
    }

    let trade_in = &profile.trade_in;
    if trade_in.has_trade_in {
        text.push_str("\n🔄 *Troca:*\n  ");
        for part in [trade_in.brand.clone(), trade_in.model.clone(), trade_in.year.map(|y| y.to_string())]
            .into_iter()
            .flatten()
        {
            let _ = write!(text, " {part}");
        }
        if let Some(value) = trade_in.estimated_value {
            let _ = write!(text, "\n   Valor estimado: {}", brl(value));
        }
        text.push('\n');
    }

    let financing = &profile.financing;
    if financing.wants_financing {
        text.push_str("\n💳 *Financiamento:*\n");
        if let Some(down) = financing.down_payment {
            let _ = writeln!(text, "   Entrada: {}", brl(down));
        }
        if let Some(months) = financing.term_months {
            let _ = writeln!(text, "   Prazo: {months}x");
        }
    }

    if !session.recommendations.is_empty() {
        text.push_str("\n🚗 *Veículos de interesse:*\n");
        for (index, rec) in session.recommendations.iter().take(3).enumerate() {
            let vehicle = &rec.vehicle;
            let _ = writeln!(text, "   {}. {} {} {}", index + 1, vehicle.make, vehicle.model, vehicle.year);
        }
    }

    text
}

pub fn negotiation_intro(session: &ConversationSession) -> String {
    format!(
        "Perfeito! Vou te conectar com um de nossos consultores. 👨‍💼\n\n\
         {}\n{SEPARATOR}\n\n\
         Um consultor vai entrar em contato pelo WhatsApp em breve!\n\n\
         _Enquanto isso, posso te ajudar com mais alguma coisa?_",
        customer_summary(session)
    )
}

pub fn name_acknowledged(first_name: &str, rest: &str) -> String {
    format!("Prazer, {first_name}! 😊\n\n{rest}")
}

/// System prompt for open questions about the vehicles on screen
pub fn assistant_context(profile: &CustomerProfile, recommendations: &[VehicleRecommendation]) -> String {
    let mut text = String::from(
        "Você é a assistente virtual de vendas do CarInsight, uma loja de veículos. \
         Responda em português do Brasil, de forma curta e amigável. \
         Não invente preços nem condições que não estejam abaixo.\n",
    );
    if let Some(name) = profile.first_name() {
        let _ = writeln!(text, "Cliente: {name}");
    }
    if let Some(budget) = profile.budget {
        let _ = writeln!(text, "Orçamento: {}", brl(budget));
    }
    if let Some(body) = profile.body_type {
        let _ = writeln!(text, "Tipo preferido: {}", body.as_str());
    }
    if let Some(usage) = profile.usage {
        let _ = writeln!(text, "Uso: {}", usage.display_name());
    }
    if !recommendations.is_empty() {
        text.push_str("Veículos apresentados:\n");
        for (index, rec) in recommendations.iter().enumerate() {
            let vehicle = &rec.vehicle;
            let _ = writeln!(
                text,
                "{}. {} {} {} - {} - {} km",
                index + 1,
                vehicle.make,
                vehicle.model,
                vehicle.year,
                brl(vehicle.price),
                group_thousands(u64::from(vehicle.mileage)),
            );
        }
    }
    text
}

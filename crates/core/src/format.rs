//! pt-BR number formatting for customer-facing text

/// Group digits with "." every three places: 100000 → "100.000"
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}

/// "R$ 100.000"
pub fn brl(value: u64) -> String {
    format!("R$ {}", group_thousands(value))
}

/// "45.000 km"
pub fn km(value: u32) -> String {
    format!("{} km", group_thousands(u64::from(value)))
}

use chrono::{DateTime, Utc};

fn symbol(currency: &str) -> Option<&'static str> {
    match currency.to_ascii_uppercase().as_str() {
        "USD" => Some("$"),
        "EUR" => Some("€"),
        "GBP" => Some("£"),
        "INR" => Some("₹"),
        "JPY" => Some("¥"),
        _ => None,
    }
}

fn group_thousands(digits: &str) -> String {
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// "$1,500", "€12.50", "CHF 900". Cents are shown only when non-zero.
pub fn money(value: f64, currency: &str) -> String {
    let negative = value < 0.0;
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = group_thousands(&(cents / 100).to_string());
    let amount = match cents % 100 {
        0 => whole,
        frac => format!("{}.{:02}", whole, frac),
    };
    let sign = if negative && cents > 0 { "-" } else { "" };
    match symbol(currency) {
        Some(s) => format!("{}{}{}", sign, s, amount),
        None => format!("{}{} {}", sign, currency.to_ascii_uppercase(), amount),
    }
}

/// Coarse "how long ago" label for card footers.
pub fn relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - at).num_seconds();
    if secs < 60 {
        return "just now".to_string();
    }
    let (n, unit) = match secs {
        s if s < 3_600 => (s / 60, "minute"),
        s if s < 86_400 => (s / 3_600, "hour"),
        s if s < 30 * 86_400 => (s / 86_400, "day"),
        s if s < 365 * 86_400 => (s / (30 * 86_400), "month"),
        s => (s / (365 * 86_400), "year"),
    };
    if n == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", n, unit)
    }
}

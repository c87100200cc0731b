use crate::models::BusinessCard;

/// Physical lines longer than this many octets are folded.
const FOLD_AT: usize = 75;

fn escape(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.trim().chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            ';' => out.push_str("\\;"),
            ',' => out.push_str("\\,"),
            '\n' => out.push_str("\\n"),
            '\r' => {}
            other => out.push(other),
        }
    }
    out
}

fn fold(line: &str) -> String {
    if line.len() <= FOLD_AT {
        return line.to_string();
    }
    let mut out = String::with_capacity(line.len() + line.len() / FOLD_AT * 3);
    let mut width = 0;
    for ch in line.chars() {
        let len = ch.len_utf8();
        if width + len > FOLD_AT {
            out.push_str("\r\n ");
            // continuation lines start with the space
            width = 1;
        }
        out.push(ch);
        width += len;
    }
    out
}

/// Splits "Given Middle Family" into (family, given).
fn split_name(full_name: &str) -> (String, String) {
    let parts: Vec<&str> = full_name.split_whitespace().collect();
    match parts.as_slice() {
        [] => (String::new(), String::new()),
        [only] => (String::new(), only.to_string()),
        [given @ .., family] => (family.to_string(), given.join(" ")),
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// vCard 3.0 text for the card. Lines end in CRLF; empty fields are left out.
pub fn to_vcard(card: &BusinessCard) -> String {
    let (family, given) = split_name(&card.full_name);
    let mut lines = vec![
        "BEGIN:VCARD".to_string(),
        "VERSION:3.0".to_string(),
        format!("N:{};{};;;", escape(&family), escape(&given)),
        format!("FN:{}", escape(&card.full_name)),
    ];
    if let Some(v) = non_empty(&card.company) {
        lines.push(format!("ORG:{}", escape(v)));
    }
    if let Some(v) = non_empty(&card.job_title) {
        lines.push(format!("TITLE:{}", escape(v)));
    }
    if let Some(v) = non_empty(&card.phone) {
        lines.push(format!("TEL;TYPE=CELL:{}", escape(v)));
    }
    if let Some(v) = non_empty(&card.email) {
        lines.push(format!("EMAIL;TYPE=INTERNET:{}", escape(v)));
    }
    if let Some(v) = non_empty(&card.website) {
        lines.push(format!("URL:{}", escape(v)));
    }
    if let Some(v) = non_empty(&card.address) {
        lines.push(format!("ADR;TYPE=WORK:;;{};;;;", escape(v)));
    }
    if let Some(v) = non_empty(&card.bio) {
        lines.push(format!("NOTE:{}", escape(v)));
    }
    lines.push("END:VCARD".to_string());

    let mut out = String::new();
    for line in lines {
        out.push_str(&fold(&line));
        out.push_str("\r\n");
    }
    out
}

//! `tel:` and `mailto:` links for the device's dialer and mail client.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::models::lead::is_email;

static NON_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\D").expect("digit pattern"));

/// `tel:` URI made of the number's digits. A leading `+` survives; spaces,
/// dashes and brackets do not. `None` when there is nothing to dial.
pub fn dial_uri(phone: &str) -> Option<String> {
    let phone = phone.trim();
    let digits = NON_DIGITS.replace_all(phone, "");
    if digits.is_empty() {
        return None;
    }
    let plus = if phone.starts_with('+') { "+" } else { "" };
    Some(format!("tel:{}{}", plus, digits))
}

pub fn mail_uri(email: &str) -> Option<String> {
    let email = email.trim();
    is_email(email).then(|| format!("mailto:{}", email))
}

#[cfg(feature = "desktop")]
pub mod commands {
    use tauri_plugin_shell::ShellExt;

    use super::{dial_uri, mail_uri};

    #[allow(deprecated)]
    fn open(app: &tauri::AppHandle, uri: Option<String>, what: &str) -> Result<(), String> {
        let uri = uri.ok_or_else(|| format!("No {} to open", what))?;
        log::info!("Opening {}", uri);
        app.shell().open(uri, None).map_err(|e| e.to_string())
    }

    #[tauri::command]
    pub fn dial(app: tauri::AppHandle, phone: String) -> Result<(), String> {
        open(&app, dial_uri(&phone), "phone number")
    }

    #[tauri::command]
    pub fn compose_email(app: tauri::AppHandle, email: String) -> Result<(), String> {
        open(&app, mail_uri(&email), "email address")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dial_keeps_digits_and_leading_plus() {
        assert_eq!(dial_uri("+1 (555) 010-0199").as_deref(), Some("tel:+15550100199"));
        assert_eq!(dial_uri("555.0100").as_deref(), Some("tel:5550100"));
        assert_eq!(dial_uri(" +44 20 7946 0000 ").as_deref(), Some("tel:+442079460000"));
    }

    #[test]
    fn nothing_to_dial() {
        assert_eq!(dial_uri(""), None);
        assert_eq!(dial_uri("n/a"), None);
        assert_eq!(dial_uri("+"), None);
    }

    #[test]
    fn mail_requires_an_address() {
        assert_eq!(mail_uri("amy@acme.test").as_deref(), Some("mailto:amy@acme.test"));
        assert_eq!(mail_uri("not an email"), None);
        assert_eq!(mail_uri(""), None);
    }
}

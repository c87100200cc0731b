use base64::{engine::general_purpose::STANDARD, Engine};
use qrcode::render::svg;
use qrcode::QrCode;
use std::io::Cursor;

use crate::error::{Result, StrikeError};
use crate::models::CardTemplate;

const MIN_SIZE: u32 = 240;

/// (dark, light) module colors per template.
fn palette(template: &CardTemplate) -> (&'static str, &'static str) {
    match template {
        CardTemplate::Professional => ("#0f172a", "#ffffff"),
        CardTemplate::Modern => ("#1e3a8a", "#ffffff"),
        CardTemplate::Minimal => ("#111827", "#f9fafb"),
        CardTemplate::Bold => ("#7c2d12", "#fff7ed"),
        CardTemplate::Classic | CardTemplate::Other(_) => ("#000000", "#ffffff"),
    }
}

fn encode(payload: &str) -> Result<QrCode> {
    QrCode::new(payload.as_bytes()).map_err(|e| StrikeError::Qr(e.to_string()))
}

pub fn qr_svg(payload: &str, template: &CardTemplate) -> Result<String> {
    let code = encode(payload)?;
    let (dark, light) = palette(template);
    Ok(code
        .render::<svg::Color>()
        .min_dimensions(MIN_SIZE, MIN_SIZE)
        .dark_color(svg::Color(dark))
        .light_color(svg::Color(light))
        .build())
}

/// PNG as a `data:` URI, ready for an `<img>` tag or the share sheet.
pub fn qr_png_data_uri(payload: &str) -> Result<String> {
    let code = encode(payload)?;
    let image = code
        .render::<image::Luma<u8>>()
        .min_dimensions(MIN_SIZE, MIN_SIZE)
        .build();

    let mut buffer = Cursor::new(Vec::new());
    image::DynamicImage::ImageLuma8(image)
        .write_to(&mut buffer, image::ImageFormat::Png)
        .map_err(|e| StrikeError::Qr(format!("Failed to encode image: {}", e)))?;

    Ok(format!(
        "data:image/png;base64,{}",
        STANDARD.encode(buffer.into_inner())
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn svg_uses_template_colors() {
        let svg = qr_svg("BEGIN:VCARD\r\nEND:VCARD\r\n", &CardTemplate::Modern).unwrap();
        assert!(svg.contains("<svg"));
        assert!(svg.contains("#1e3a8a"));
    }

    #[test]
    fn professional_template_has_its_own_palette() {
        let svg = qr_svg("hello", &CardTemplate::Professional).unwrap();
        assert!(svg.contains("#0f172a"));
        assert!(!svg.contains("#000000"));
    }

    #[test]
    fn png_is_a_data_uri() {
        let uri = qr_png_data_uri("hello").unwrap();
        assert!(uri.starts_with("data:image/png;base64,"));
        let encoded = uri.trim_start_matches("data:image/png;base64,");
        let bytes = STANDARD.decode(encoded).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");
    }

    #[test]
    fn oversized_payload_is_an_error() {
        let err = qr_svg(&"x".repeat(8000), &CardTemplate::Classic).unwrap_err();
        assert!(matches!(err, StrikeError::Qr(_)));
    }
}

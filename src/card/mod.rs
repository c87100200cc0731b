//! Business card sharing: vCard payload plus its QR code.

pub mod qr;
pub mod vcard;

use serde::Serialize;

use crate::error::Result;
use crate::models::BusinessCard;

pub use qr::{qr_png_data_uri, qr_svg};
pub use vcard::to_vcard;

#[derive(Debug, Clone, Serialize)]
pub struct CardShare {
    pub vcard: String,
    pub qr_svg: String,
    pub qr_png: String,
}

impl CardShare {
    pub fn for_card(card: &BusinessCard) -> Result<Self> {
        let vcard = to_vcard(card);
        Ok(Self {
            qr_svg: qr_svg(&vcard, &card.template)?,
            qr_png: qr_png_data_uri(&vcard)?,
            vcard,
        })
    }
}

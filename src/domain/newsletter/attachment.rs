use base64::{
    alphabet,
    engine::{GeneralPurpose, GeneralPurposeConfig},
    Engine as _,
};
use serde::{Deserialize, Serialize};

/// Standard alphabet with padding required, tolerating non-zero bits in the
/// last symbol.
const PAYLOAD_ENGINE: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_allow_trailing_bits(true),
);

/// A file attached to a newsletter, as stored: the payload is base64 text and
/// is only checked when the newsletter is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub name: String,
    pub data: String,
    #[serde(rename = "type")]
    pub content_type: String,
}

/// An attachment whose payload has been decoded to raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedAttachment {
    pub name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

#[derive(thiserror::Error, Debug)]
#[error("attachment `{name}` does not hold valid base64 data")]
pub struct InvalidAttachment {
    pub name: String,
    #[source]
    pub source: base64::DecodeError,
}

impl Attachment {
    /// Line breaks and other ASCII whitespace are ignored, so wrapped
    /// payloads decode the same as single-line ones.
    pub fn decode(&self) -> Result<DecodedAttachment, InvalidAttachment> {
        let payload: Vec<u8> = self
            .data
            .bytes()
            .filter(|b| !b.is_ascii_whitespace())
            .collect();
        let data = PAYLOAD_ENGINE
            .decode(payload)
            .map_err(|source| InvalidAttachment {
                name: self.name.clone(),
                source,
            })?;

        Ok(DecodedAttachment {
            name: self.name.clone(),
            content_type: self.content_type.clone(),
            data,
        })
    }
}

/// Decodes every attachment, failing on the first invalid payload.
pub fn decode_all(
    attachments: &[Attachment],
) -> Result<Vec<DecodedAttachment>, InvalidAttachment> {
    attachments.iter().map(Attachment::decode).collect()
}

//! Public identifier obfuscation
//!
//! Internal UUIDs never leave the process in their raw form. Every id written
//! to a response is base64-encoded, and every id received from a client is
//! decoded and validated as a UUID before it reaches a repository.
//!
//! This is anti-enumeration masking, not encryption: anyone can decode the
//! public form.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

/// Identifier decoding errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("malformed id encoding")]
    InvalidEncoding,

    #[error("id is not valid utf-8")]
    InvalidUtf8,

    #[error("id is not a valid uuid: {0}")]
    InvalidUuid(String),
}

/// Encode an internal id into its public form
pub fn encode(id: &Uuid) -> String {
    encode_str(&id.to_string())
}

/// Encode an arbitrary internal identifier string
pub fn encode_str(raw: &str) -> String {
    STANDARD.encode(raw.as_bytes())
}

/// Decode a public id back into the internal identifier string
///
/// Fails on anything that is not valid padded base64 of UTF-8 text.
pub fn decode(encoded: &str) -> Result<String, IdError> {
    let bytes = STANDARD
        .decode(encoded.trim())
        .map_err(|_| IdError::InvalidEncoding)?;

    String::from_utf8(bytes).map_err(|_| IdError::InvalidUtf8)
}

/// Decode a public id and validate it as a UUID
pub fn decode_uuid(encoded: &str) -> Result<Uuid, IdError> {
    let raw = decode(encoded)?;
    Uuid::parse_str(&raw).map_err(|_| IdError::InvalidUuid(raw))
}

/// An internal id that serializes as its public (encoded) form
///
/// Used in request and response bodies so that raw UUIDs cannot leak through
/// a DTO by accident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PublicId(Uuid);

impl PublicId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Parse a client-supplied public id
    pub fn parse(encoded: &str) -> Result<Self, IdError> {
        decode_uuid(encoded).map(Self)
    }

    /// The internal id
    pub fn uuid(&self) -> Uuid {
        self.0
    }

    /// The encoded public form
    pub fn encoded(&self) -> String {
        encode(&self.0)
    }
}

impl From<Uuid> for PublicId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for PublicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encoded())
    }
}

impl Serialize for PublicId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.encoded())
    }
}

impl<'de> Deserialize<'de> for PublicId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        PublicId::parse(&encoded).map_err(de::Error::custom)
    }
}

impl<'s> utoipa::ToSchema<'s> for PublicId {
    fn schema() -> (
        &'s str,
        utoipa::openapi::RefOr<utoipa::openapi::schema::Schema>,
    ) {
        (
            "PublicId",
            utoipa::openapi::ObjectBuilder::new()
                .schema_type(utoipa::openapi::SchemaType::String)
                .description(Some("Base64-encoded resource identifier"))
                .into(),
        )
    }
}

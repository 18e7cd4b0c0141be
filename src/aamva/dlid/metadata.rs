use std::io;

use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid record metadata: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Subfile type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubfileKind {
    /// Driver license.
    #[default]
    #[serde(rename = "DL")]
    Dl,

    /// Identification card.
    #[serde(rename = "ID")]
    Id,
}

impl SubfileKind {
    pub fn marker(&self) -> &'static [u8; 2] {
        match self {
            Self::Dl => b"DL",
            Self::Id => b"ID",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Dl => "DL",
            Self::Id => "ID",
        }
    }
}

/// Issuing country. Governs the byte order of date elements.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Country {
    /// Dates are `MMDDCCYY`.
    #[default]
    #[serde(rename = "USA")]
    Usa,

    /// Dates are `CCYYMMDD`.
    #[serde(rename = "CAN")]
    Can,
}

impl Country {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Usa => "USA",
            Self::Can => "CAN",
        }
    }
}

/// Header-level information about the record to produce.
///
/// Numeric codes are kept as text, the way they are typed into the form, and
/// are coerced to their fixed width at encoding time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RecordMetadata {
    /// Issuer Identification Number (6 digits).
    pub issuer_identification_number: String,

    /// AAMVA version number (2 digits).
    pub standard_version: String,

    /// Jurisdiction version number (2 digits).
    pub jurisdiction_version: String,

    pub subfile_kind: SubfileKind,

    pub country: Country,
}

impl Default for RecordMetadata {
    fn default() -> Self {
        Self {
            issuer_identification_number: String::new(),
            standard_version: "10".to_owned(),
            jurisdiction_version: "00".to_owned(),
            subfile_kind: SubfileKind::Dl,
            country: Country::Usa,
        }
    }
}

impl RecordMetadata {
    pub fn new(issuer_identification_number: impl Into<String>) -> Self {
        Self {
            issuer_identification_number: issuer_identification_number.into(),
            ..Self::default()
        }
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(Into::into)
    }

    pub fn from_reader(reader: impl io::Read) -> Result<Self, ConfigError> {
        serde_json::from_reader(reader).map_err(Into::into)
    }

    pub fn issuer_id(&self) -> u32 {
        coerce_digits(&self.issuer_identification_number, 6)
    }

    pub fn version(&self) -> u8 {
        coerce_digits(&self.standard_version, 2) as u8
    }

    pub fn jurisdiction_version(&self) -> u8 {
        coerce_digits(&self.jurisdiction_version, 2) as u8
    }
}

/// Reads the first `width` ASCII digits of `value`, ignoring anything else.
fn coerce_digits(value: &str, width: usize) -> u32 {
    value
        .bytes()
        .filter(u8::is_ascii_digit)
        .take(width)
        .fold(0, |acc, d| acc * 10 + (d - b'0') as u32)
}

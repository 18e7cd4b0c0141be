/// AAMVA DL/ID Card Design Standard.
///
/// See: <https://www.aamva.org/assets/best-practices,-guides,-standards,-manuals,-whitepapers/aamva-dl-id-card-design-standard-(2020)>
mod macros;

pub(crate) use macros::*;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown data element `{0}`")]
pub struct UnknownTag(pub String);

pub mod catalog;
pub use catalog::{lookup, lookup_str, Criticality, FieldKind, FieldSpec, Tag};

pub mod types;

pub mod truncation;
pub use truncation::{truncate, Truncation, NAME_LIMIT};

pub mod metadata;
pub use metadata::{ConfigError, Country, RecordMetadata, SubfileKind};

pub mod values;
pub use values::{sanitize_extracted, FieldValues};

pub mod pdf_417;

mod encoder;
pub use encoder::*;

mod decoder;
pub use decoder::*;

pub mod validator;
pub use validator::{
    validate, validate_record, ValidationField, ValidationReport, ValidationStatus, Validator,
    Weights,
};

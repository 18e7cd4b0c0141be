//! This library encodes, decodes and validates the [AAMVA DL/ID][aamva] data
//! record carried by the PDF417 barcode of North American driver licenses and
//! identification cards.
//!
//! [aamva]: <https://www.aamva.org/identity/card-design-standard>
//!
//! ```
//! use aamva_dlid::{encode, decode, validate, FieldValues, RecordMetadata, Tag};
//!
//! let form = FieldValues::new()
//!     .with(Tag::CustomerFamilyName, "Smith")
//!     .with(Tag::CustomerFirstName, "John");
//! let metadata = RecordMetadata::new("636005");
//!
//! let record = encode(&form, &metadata);
//! assert!(record.as_str().starts_with("@\n\x1e\rANSI 636005"));
//!
//! let decoded = decode(record.as_str());
//! assert_eq!(decoded.fields.get(Tag::CustomerFamilyName), Some("SMITH"));
//!
//! let report = validate(&form, &metadata);
//! assert!(report.overall_score < 100);
//! ```
//!
//! The `demos` folder contains a few examples showing how to build a record
//! from a JSON form and how to inspect a scanned one.
pub mod aamva;

pub use aamva::dlid::{
    decode, encode, sanitize_extracted, truncate, validate, validate_record, Country,
    DecodedRecord, Diagnostic, EncodedRecord, FieldValues, RecordMetadata, SubfileKind, Tag,
    Truncation, ValidationReport, ValidationStatus, Validator, Weights,
};

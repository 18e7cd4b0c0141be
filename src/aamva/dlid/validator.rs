//! Compliance scoring.
//!
//! The validator encodes the form, decodes the result back and grades it:
//! structural checks first, then every applicable data element against its
//! format rule. Each check carries a weight; the score is the share of the
//! total weight that was earned.
use serde::{Deserialize, Serialize};

use super::{
    catalog,
    decoder::{decode, DecodedRecord},
    encoder::{date_from_wire, encode, format_elements, EYE_COLORS},
    pdf_417::{first_subfile_offset, SubfileDesignator},
    types::{is_variable_ans, F1A, F1N, F2A, F3N, F8N, V11An, V12Ans, V3A, V5Ans, V6Ans},
    Country, Criticality, FieldKind, FieldSpec, FieldValues, RecordMetadata, SubfileKind, Tag,
    Truncation, NAME_LIMIT,
};

/// AAMVA versions `00` (pre-2000) to `10` (2020).
const KNOWN_VERSIONS: std::ops::RangeInclusive<u8> = 0..=10;

/// Outcome for one data element.
///
/// Variants are declared in report order: most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ValidationStatus {
    /// A critical element is missing.
    CriticalInvalid,

    /// The element is present but its value is malformed.
    FormatError,

    /// The element is well-formed but differs from the form.
    Mismatch,

    /// A secondary element is missing.
    MissingInScan,

    Match,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationField {
    pub tag: Tag,
    pub human_description: String,
    pub form_value: String,
    pub scanned_or_derived_value: String,
    pub status: ValidationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub is_header_valid: bool,
    pub raw_string: String,

    /// Sorted by status, most severe first.
    pub fields: Vec<ValidationField>,

    /// 0 to 100.
    pub overall_score: u8,

    pub compliance_notes: Vec<String>,
}

impl ValidationReport {
    pub fn field(&self, tag: Tag) -> Option<&ValidationField> {
        self.fields.iter().find(|f| f.tag == tag)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Score weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Weights {
    /// Weight of each structural check.
    pub structural: u32,

    pub critical: u32,
    pub secondary: u32,

    /// Weight of each optional element present in the record.
    pub optional: u32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            structural: 10,
            critical: 10,
            secondary: 4,
            optional: 1,
        }
    }
}

impl Weights {
    fn of(&self, criticality: Criticality) -> u32 {
        match criticality {
            Criticality::Critical => self.critical,
            Criticality::Secondary => self.secondary,
            Criticality::Optional => self.optional,
        }
    }
}

#[derive(Debug, Default)]
struct Score {
    earned: u32,
    total: u32,
}

impl Score {
    fn add(&mut self, weight: u32, passed: bool) {
        self.total += weight;
        if passed {
            self.earned += weight;
        }
    }

    fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }

        let percent = (100.0 * self.earned as f64 / self.total as f64).round();
        percent.clamp(0.0, 100.0) as u8
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Validator {
    weights: Weights,
}

impl Validator {
    pub fn new(weights: Weights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &Weights {
        &self.weights
    }

    /// Encodes the form and grades the resulting record.
    pub fn validate(&self, form: &FieldValues, metadata: &RecordMetadata) -> ValidationReport {
        let record = encode(form, metadata);
        self.inspect(
            record.as_str(),
            form,
            metadata,
            record.elements(),
            record.names(),
        )
    }

    /// Grades an externally produced record against the form it should
    /// carry.
    pub fn validate_record(
        &self,
        raw: &str,
        form: &FieldValues,
        metadata: &RecordMetadata,
    ) -> ValidationReport {
        let expected = format_elements(form, metadata);
        self.inspect(raw, form, metadata, &expected.elements, &expected.names)
    }

    fn inspect(
        &self,
        raw: &str,
        form: &FieldValues,
        metadata: &RecordMetadata,
        expected: &[(Tag, String)],
        names: &[Truncation; 3],
    ) -> ValidationReport {
        let record = decode(raw);
        let mut score = Score::default();
        let mut notes = Vec::new();

        let is_header_valid = !record.is_fatal();
        self.check_structure(&record, &mut score, &mut notes);

        notes.extend(
            record
                .diagnostics
                .iter()
                .filter(|d| !d.is_fatal())
                .map(|d| format!("decoder: {d}")),
        );

        let mut fields = Vec::new();

        for spec in catalog::mandatory() {
            if spec.dl_only && metadata.subfile_kind == SubfileKind::Id {
                continue;
            }

            let field = self.check_element(spec, &record, form, metadata, expected, &mut notes);
            score.add(
                self.weights.of(spec.criticality),
                field.status == ValidationStatus::Match,
            );
            fields.push(field);
        }

        for spec in catalog::optional() {
            if record.fields.contains(spec.tag) {
                let field =
                    self.check_element(spec, &record, form, metadata, expected, &mut notes);
                score.add(self.weights.optional, field.status == ValidationStatus::Match);
                fields.push(field);
            }
        }

        for ((name, _), truncation) in Tag::NAMES.iter().zip(names) {
            if truncation.is_truncated() {
                notes.push(format!(
                    "{name} ({}) was truncated to `{}` to fit {NAME_LIMIT} characters",
                    name.spec().description,
                    truncation.text
                ));
            }
        }

        fields.sort_by_key(|f| f.status);

        let overall_score = score.percent();
        tracing::debug!(
            overall_score,
            earned = score.earned,
            total = score.total,
            notes = notes.len(),
            "validated DL/ID record"
        );

        ValidationReport {
            is_header_valid,
            raw_string: raw.to_owned(),
            fields,
            overall_score,
            compliance_notes: notes,
        }
    }

    fn check_structure(&self, record: &DecodedRecord, score: &mut Score, notes: &mut Vec<String>) {
        let weight = self.weights.structural;

        let anchored = !record.is_fatal();
        score.add(weight, anchored);
        if !anchored {
            notes.push(
                "record does not start with the `@` compliance indicator and `ANSI ` file type"
                    .to_owned(),
            );
        }

        let version = record.header.map(|h| h.version);
        let known_version = version.is_some_and(|v| KNOWN_VERSIONS.contains(&v));
        score.add(weight, known_version);
        match version {
            Some(v) if !known_version => {
                notes.push(format!("AAMVA version `{v:02}` is not a recognized standard version"))
            }
            None if anchored => notes.push("AAMVA version number is unreadable".to_owned()),
            _ => (),
        }

        let consistent = designators_consistent(&record.designators);
        score.add(weight, consistent);
        if anchored && !consistent {
            notes.push(format!(
                "subfile designators do not point at consecutive subfiles starting at byte {}",
                first_subfile_offset(record.designators.len())
            ));
        }
    }

    fn check_element(
        &self,
        spec: &FieldSpec,
        record: &DecodedRecord,
        form: &FieldValues,
        metadata: &RecordMetadata,
        expected: &[(Tag, String)],
        notes: &mut Vec<String>,
    ) -> ValidationField {
        let tag = spec.tag;
        let scanned = record.fields.get(tag);

        let status = match scanned {
            None => {
                notes.push(format!(
                    "{tag} ({}) is missing from the encoded record",
                    spec.description
                ));
                match spec.criticality {
                    Criticality::Critical => ValidationStatus::CriticalInvalid,
                    _ => ValidationStatus::MissingInScan,
                }
            }
            Some(value) if !conforms(spec, value, metadata.country) => {
                notes.push(format!(
                    "{tag} ({}) value `{value}` is not {}",
                    spec.description,
                    rule_description(spec, metadata.country)
                ));
                ValidationStatus::FormatError
            }
            Some(value) => {
                let wanted = expected
                    .iter()
                    .find(|(t, _)| *t == tag)
                    .map(|(_, v)| v.trim());

                match wanted {
                    Some(wanted) if wanted != value => {
                        notes.push(format!(
                            "{tag} ({}) encodes `{value}` but the form gives `{wanted}`",
                            spec.description
                        ));
                        ValidationStatus::Mismatch
                    }
                    _ => ValidationStatus::Match,
                }
            }
        };

        ValidationField {
            tag,
            human_description: spec.description.clone(),
            form_value: form.get(tag).unwrap_or_default().to_owned(),
            scanned_or_derived_value: scanned.unwrap_or_default().to_owned(),
            status,
        }
    }
}

/// Offsets must start right after the designator table and follow each
/// other without gaps.
fn designators_consistent(designators: &[SubfileDesignator]) -> bool {
    let mut offset = first_subfile_offset(designators.len());

    for designator in designators {
        if designator.offset != offset {
            return false;
        }

        offset += designator.length;
    }

    !designators.is_empty()
}

fn is_height(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() == 6
        && bytes[..3].iter().all(u8::is_ascii_digit)
        && matches!(&bytes[3..], b" IN" | b" CM")
}

/// Format rule of a decoded (trimmed) value.
fn conforms(spec: &FieldSpec, value: &str, country: Country) -> bool {
    match spec.kind {
        FieldKind::Text => is_variable_ans(value, spec.max_length),
        FieldKind::Date => {
            F8N::new(value).is_ok_and(|date| date_from_wire(&date, country).is_some())
        }
        FieldKind::SexCode => matches!(value, "1" | "2" | "9"),
        FieldKind::Height => is_height(value),
        FieldKind::Weight => F3N::new(value).is_ok(),
        FieldKind::CountryCode => matches!(value, "USA" | "CAN"),
        FieldKind::FixedCode => match spec.tag {
            Tag::VehicleClass => V6Ans::new(value).is_ok(),
            Tag::RestrictionCodes => V12Ans::new(value).is_ok(),
            Tag::EndorsementCodes => V5Ans::new(value).is_ok(),
            Tag::EyeColor => EYE_COLORS.iter().any(|(code, _)| *code == value),
            Tag::AddressJurisdictionCode => F2A::new(value).is_ok(),
            Tag::AddressPostalCode => value.len() >= 5 && V11An::new(value).is_ok(),
            Tag::FamilyNameTruncation | Tag::FirstNameTruncation | Tag::MiddleNameTruncation => {
                matches!(value, "T" | "N" | "U")
            }
            Tag::ComplianceType => F1A::new(value).is_ok(),
            Tag::RaceOrEthnicity => V3A::new(value).is_ok(),
            Tag::WeightRange
            | Tag::LimitedDurationDocumentIndicator
            | Tag::OrganDonorIndicator
            | Tag::VeteranIndicator => F1N::new(value).is_ok(),
            _ => is_variable_ans(value, spec.max_length),
        },
    }
}

fn rule_description(spec: &FieldSpec, country: Country) -> String {
    match spec.kind {
        FieldKind::Text => format!("printable ASCII of 1 to {} characters", spec.max_length),
        FieldKind::Date => match country {
            Country::Usa => "a valid MMDDCCYY date".to_owned(),
            Country::Can => "a valid CCYYMMDD date".to_owned(),
        },
        FieldKind::SexCode => "1 (male), 2 (female) or 9 (not specified)".to_owned(),
        FieldKind::Height => "3 digits followed by ` IN` or ` CM`".to_owned(),
        FieldKind::Weight => "3 digits".to_owned(),
        FieldKind::CountryCode => "USA or CAN".to_owned(),
        FieldKind::FixedCode => match spec.tag {
            Tag::EyeColor => "an ANSI D20 eye color code".to_owned(),
            Tag::AddressJurisdictionCode => "a 2-letter jurisdiction code".to_owned(),
            Tag::AddressPostalCode => "5 to 11 letters or digits".to_owned(),
            Tag::FamilyNameTruncation | Tag::FirstNameTruncation | Tag::MiddleNameTruncation => {
                "T, N or U".to_owned()
            }
            _ => format!("a code of at most {} characters", spec.max_length),
        },
    }
}

/// Encodes `form` and grades the result with the default weights.
pub fn validate(form: &FieldValues, metadata: &RecordMetadata) -> ValidationReport {
    Validator::default().validate(form, metadata)
}

/// Grades `raw` against `form` with the default weights.
pub fn validate_record(raw: &str, form: &FieldValues, metadata: &RecordMetadata) -> ValidationReport {
    Validator::default().validate_record(raw, form, metadata)
}

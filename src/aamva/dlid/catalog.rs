//! Field catalog (AAMVA 2020, Annex D).
//!
//! The [`Tag`] enumeration is closed: every data element this crate encodes,
//! decodes or validates is listed here, in canonical emission order. The
//! per-tag properties live in an embedded CSV table that is parsed once on
//! first use.
use std::{collections::HashMap, io::Cursor};

use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};

use super::{data_elements_enum, UnknownTag};

data_elements_enum! {
    /// Known data element tag.
    ///
    /// Mandatory elements come first, in the order the encoder emits them,
    /// followed by the optional elements.
    pub enum Tag {
        /// Jurisdiction-specific vehicle class (DCA).
        VehicleClass: b"DCA",

        /// Jurisdiction-specific restriction codes (DCB).
        RestrictionCodes: b"DCB",

        /// Jurisdiction-specific endorsement codes (DCD).
        EndorsementCodes: b"DCD",

        /// Document Expiration Date (DBA).
        DocumentExpirationDate: b"DBA",

        /// Customer Family Name (DCS).
        CustomerFamilyName: b"DCS",

        /// Customer First Name (DAC).
        CustomerFirstName: b"DAC",

        /// Customer Middle Name(s) (DAD).
        CustomerMiddleName: b"DAD",

        /// Document Issue Date (DBD).
        DocumentIssueDate: b"DBD",

        /// Date of Birth (DBB).
        DateOfBirth: b"DBB",

        /// Physical Description – Sex (DBC).
        Sex: b"DBC",

        /// Physical Description – Eye Color (DAY).
        EyeColor: b"DAY",

        /// Physical Description – Height (DAU).
        Height: b"DAU",

        /// Address – Street 1 (DAG).
        AddressStreet1: b"DAG",

        /// Address – City (DAI).
        AddressCity: b"DAI",

        /// Address – Jurisdiction Code (DAJ).
        AddressJurisdictionCode: b"DAJ",

        /// Address – Postal Code (DAK).
        AddressPostalCode: b"DAK",

        /// Customer ID Number (DAQ).
        CustomerIdNumber: b"DAQ",

        /// Document Discriminator (DCF).
        DocumentDiscriminator: b"DCF",

        /// Country Identification (DCG).
        CountryIdentification: b"DCG",

        /// Family name truncation (DDE).
        FamilyNameTruncation: b"DDE",

        /// First name truncation (DDF).
        FirstNameTruncation: b"DDF",

        /// Middle name truncation (DDG).
        MiddleNameTruncation: b"DDG",

        /// Second line of street portion of the cardholder address (DAH).
        AddressStreet2: b"DAH",

        /// Cardholder weight in pounds (DAW).
        WeightInPounds: b"DAW",

        /// Cardholder weight in kilograms (DAX).
        WeightInKilograms: b"DAX",

        /// Hair color (DAZ).
        HairColor: b"DAZ",

        /// Place of birth (DCI).
        PlaceOfBirth: b"DCI",

        /// Audit information (DCJ).
        AuditInformation: b"DCJ",

        /// Inventory control number (DCK).
        InventoryControlNumber: b"DCK",

        /// Other family name by which cardholder is known (DBN).
        AkaFamilyName: b"DBN",

        /// Other given name by which cardholder is known (DBG).
        AkaGivenName: b"DBG",

        /// Other suffix by which cardholder is known (DBS).
        AkaSuffixName: b"DBS",

        /// Name Suffix (DCU).
        NameSuffix: b"DCU",

        /// Approximate weight range of the cardholder (DCE).
        WeightRange: b"DCE",

        /// Race or ethnicity, as defined in AAMVA D20 (DCL).
        RaceOrEthnicity: b"DCL",

        /// DHS compliance type (DDA).
        ComplianceType: b"DDA",

        /// Card revision date (DDB).
        CardRevisionDate: b"DDB",

        /// HAZMAT endorsement expiration date (DDC).
        HazmatEndorsementExpirationDate: b"DDC",

        /// Limited duration document indicator (DDD).
        LimitedDurationDocumentIndicator: b"DDD",

        /// Date on which the cardholder turns 18 years old (DDH).
        Under18Until: b"DDH",

        /// Date on which the cardholder turns 19 years old (DDI).
        Under19Until: b"DDI",

        /// Date on which the cardholder turns 21 years old (DDJ).
        Under21Until: b"DDJ",

        /// Organ donor indicator (DDK).
        OrganDonorIndicator: b"DDK",

        /// Veteran indicator (DDL).
        VeteranIndicator: b"DDL"
    }
}

impl Tag {
    pub fn spec(&self) -> &'static FieldSpec {
        lookup(*self)
    }

    /// Name elements paired with their truncation indicator.
    pub const NAMES: [(Tag, Tag); 3] = [
        (Tag::CustomerFamilyName, Tag::FamilyNameTruncation),
        (Tag::CustomerFirstName, Tag::FirstNameTruncation),
        (Tag::CustomerMiddleName, Tag::MiddleNameTruncation),
    ];

    pub fn is_truncation_indicator(&self) -> bool {
        matches!(
            self,
            Tag::FamilyNameTruncation | Tag::FirstNameTruncation | Tag::MiddleNameTruncation
        )
    }
}

/// Semantic kind of a data element, driving encoder coercion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    FixedCode,
    Date,
    SexCode,
    Height,
    Weight,
    CountryCode,
}

/// How much a data element weighs in the compliance score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criticality {
    /// Identity and legal fields.
    Critical,

    /// Mandatory, but not identity-bearing.
    Secondary,

    Optional,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldSpec {
    pub tag: Tag,
    pub kind: FieldKind,
    pub max_length: usize,
    pub mandatory: bool,
    pub criticality: Criticality,

    /// Only meaningful in `DL` subfiles.
    pub dl_only: bool,

    /// Emitted for a mandatory element left empty. Only the jurisdiction
    /// codes (DCA, DCB, DCD) and the middle name (DAD) have one: the other
    /// mandatory elements are omitted when empty and reported missing by the
    /// validator.
    pub placeholder: String,

    pub description: String,
}

lazy_static! {
    static ref CATALOG: HashMap<Tag, FieldSpec> = {
        let cursor = Cursor::new(include_str!("catalog.csv"));
        let mut reader = csv::Reader::from_reader(cursor);
        let mut map = HashMap::with_capacity(Tag::COUNT);

        for result in reader.deserialize::<FieldSpec>() {
            let spec = result.expect("embedded field catalog is well-formed");
            let previous = map.insert(spec.tag, spec);
            assert!(previous.is_none(), "duplicate tag in field catalog");
        }

        map
    };
}

/// Returns the specification of a data element.
///
/// # Panics
///
/// Panics if the embedded catalog has no row for `tag`, which means the
/// catalog and the [`Tag`] enumeration have drifted apart.
pub fn lookup(tag: Tag) -> &'static FieldSpec {
    CATALOG
        .get(&tag)
        .unwrap_or_else(|| panic!("data element {tag} missing from the field catalog"))
}

pub fn lookup_str(tag: &str) -> Result<&'static FieldSpec, UnknownTag> {
    tag.parse().map(lookup)
}

/// Iterates over the mandatory elements in canonical order.
pub fn mandatory() -> impl Iterator<Item = &'static FieldSpec> {
    Tag::LIST.into_iter().map(lookup).filter(|spec| spec.mandatory)
}

/// Iterates over the optional elements in canonical order.
pub fn optional() -> impl Iterator<Item = &'static FieldSpec> {
    Tag::LIST.into_iter().map(lookup).filter(|spec| !spec.mandatory)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_tag_has_exactly_one_spec() {
        assert_eq!(CATALOG.len(), Tag::COUNT);
        for tag in Tag::LIST {
            assert_eq!(lookup(tag).tag, tag);
        }
    }

    #[test]
    fn mandatory_elements_come_first() {
        let first_optional = Tag::LIST
            .iter()
            .position(|t| !t.spec().mandatory)
            .unwrap();
        assert_eq!(first_optional, 22);
        assert!(Tag::LIST[first_optional..]
            .iter()
            .all(|t| !t.spec().mandatory));
        assert_eq!(mandatory().count(), 22);
    }

    #[test]
    fn lookup_by_string() {
        let spec = lookup_str("DAJ").unwrap();
        assert_eq!(spec.tag, Tag::AddressJurisdictionCode);
        assert_eq!(spec.kind, FieldKind::FixedCode);
        assert_eq!(spec.max_length, 2);
        assert_eq!(spec.criticality, Criticality::Critical);

        assert_eq!(lookup_str("ZZZ"), Err(UnknownTag("ZZZ".to_owned())));
        assert!(lookup_str("DA").is_err());
    }

    #[test]
    fn placeholders() {
        assert_eq!(Tag::VehicleClass.spec().placeholder, "NONE");
        assert_eq!(Tag::CustomerMiddleName.spec().placeholder, "NONE");
        assert_eq!(Tag::AddressJurisdictionCode.spec().placeholder, "");
        assert!(Tag::RestrictionCodes.spec().dl_only);
        assert!(!Tag::CustomerIdNumber.spec().dl_only);

        let with_placeholder: Vec<Tag> = mandatory()
            .filter(|spec| !spec.placeholder.is_empty())
            .map(|spec| spec.tag)
            .collect();
        assert_eq!(
            with_placeholder,
            [
                Tag::VehicleClass,
                Tag::RestrictionCodes,
                Tag::EndorsementCodes,
                Tag::CustomerMiddleName
            ]
        );
    }

    #[test]
    fn tag_serde() {
        let json = serde_json::to_string(&Tag::DateOfBirth).unwrap();
        assert_eq!(json, "\"DBB\"");
        let tag: Tag = serde_json::from_str("\"DCG\"").unwrap();
        assert_eq!(tag, Tag::CountryIdentification);
        assert!(serde_json::from_str::<Tag>("\"XYZ\"").is_err());
    }
}

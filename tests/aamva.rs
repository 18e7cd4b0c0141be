mod common;

use aamva_dlid::{
    aamva::dlid::{catalog, format_elements, Diagnostic},
    decode, encode, sanitize_extracted, validate, validate_record, Country, FieldValues,
    RecordMetadata, SubfileKind, Tag, ValidationStatus, Validator, Weights,
};
use common::*;
use proptest::prelude::*;

#[test]
fn complete_form_round_trip() {
    init_tracing();
    let (form, metadata) = complete_form();

    let record = encode(&form, &metadata);
    assert!(record.as_str().starts_with("@\n\x1e\rANSI 63600510"));
    assert_eq!(&record.as_str()[21..27], "DL0031");

    let decoded = decode(record.as_str());
    assert!(decoded.diagnostics.is_empty(), "{:?}", decoded.diagnostics);
    assert_eq!(decoded.fields.get(Tag::CustomerFamilyName), Some("SMITH"));
    assert_eq!(decoded.fields.get(Tag::CustomerFirstName), Some("JOHN"));
    assert_eq!(decoded.fields.get(Tag::DateOfBirth), Some("01011990"));
    assert_eq!(decoded.fields.get(Tag::Height), Some("070 IN"));
    assert_eq!(decoded.fields.get(Tag::AddressPostalCode), Some("122070000"));
    assert_eq!(decoded.fields.get(Tag::FamilyNameTruncation), Some("N"));

    let report = validate(&form, &metadata);
    assert!(report.is_header_valid);
    assert_eq!(report.overall_score, 100);
    assert!(report.compliance_notes.is_empty(), "{:?}", report.compliance_notes);
    assert!(report
        .fields
        .iter()
        .all(|f| f.status == ValidationStatus::Match));
    assert_eq!(report.raw_string, record.as_str());
}

#[test]
fn long_family_name_is_truncated() {
    let (form, metadata) = complete_form();
    let name = "ABCDEFGHIJKLMNOPQRSTUVWXYZABCDEFGHIJKLMNOPQRS";
    assert_eq!(name.len(), 45);
    let form = form.with(Tag::CustomerFamilyName, name);

    let decoded = decode(encode(&form, &metadata).as_str());
    assert_eq!(
        decoded.fields.get(Tag::CustomerFamilyName),
        Some(&name[..40])
    );
    assert_eq!(decoded.fields.get(Tag::FamilyNameTruncation), Some("T"));

    let report = validate(&form, &metadata);
    assert_eq!(report.overall_score, 100);
    assert_eq!(report.compliance_notes.len(), 1);
    assert!(report.compliance_notes[0].contains("DCS"));
}

#[test]
fn missing_jurisdiction_is_critical() {
    let (mut form, metadata) = complete_form();
    form.remove(Tag::AddressJurisdictionCode);

    let report = validate(&form, &metadata);
    assert!(report.is_header_valid);
    assert!(report.overall_score < 100);
    assert_eq!(report.fields[0].tag, Tag::AddressJurisdictionCode);
    assert_eq!(report.fields[0].status, ValidationStatus::CriticalInvalid);
    assert!(report.compliance_notes.iter().any(|n| n.contains("DAJ")));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["fields"][0]["tag"], "DAJ");
    assert_eq!(json["fields"][0]["status"], "CriticalInvalid");
    assert_eq!(json["isHeaderValid"], true);
}

#[test]
fn record_without_compliance_indicator() {
    let (form, metadata) = complete_form();
    let raw = encode(&form, &metadata).into_string().replacen('@', "X", 1);

    let decoded = decode(&raw);
    assert!(decoded.fields.is_empty());
    assert_eq!(decoded.diagnostics, [Diagnostic::MissingComplianceIndicator]);
    assert!(decoded.is_fatal());

    let report = validate_record(&raw, &form, &metadata);
    assert!(!report.is_header_valid);
    assert_eq!(report.overall_score, 0);
    assert!(report
        .fields
        .iter()
        .all(|f| f.status != ValidationStatus::Match));
}

#[test]
fn canadian_dates() {
    let (form, mut metadata) = complete_form();
    metadata.country = Country::Can;
    let form = form
        .with(Tag::CountryIdentification, "Canada")
        .with(Tag::AddressJurisdictionCode, "ON")
        .with(Tag::AddressPostalCode, "K1A 0B1");

    let raw = encode(&form, &metadata).into_string();
    let decoded = decode(&raw);
    assert_eq!(decoded.fields.get(Tag::DateOfBirth), Some("19900101"));
    assert_eq!(decoded.fields.get(Tag::DocumentExpirationDate), Some("20301231"));
    assert_eq!(decoded.fields.get(Tag::CountryIdentification), Some("CAN"));
    assert_eq!(decoded.fields.get(Tag::AddressPostalCode), Some("K1A0B1"));

    assert_eq!(validate(&form, &metadata).overall_score, 100);

    // The same record read with the US byte order.
    metadata.country = Country::Usa;
    let report = validate_record(&raw, &form, &metadata);
    assert_eq!(
        report.field(Tag::DateOfBirth).unwrap().status,
        ValidationStatus::FormatError
    );
}

#[test]
fn identification_card() {
    let (form, mut metadata) = complete_form();
    metadata.subfile_kind = SubfileKind::Id;

    let record = encode(&form, &metadata);
    assert_eq!(&record.as_str()[21..23], "ID");
    assert_eq!(&record.as_str()[31..33], "ID");

    let decoded = decode(record.as_str());
    assert!(decoded.diagnostics.is_empty(), "{:?}", decoded.diagnostics);
    assert!(!decoded.fields.contains(Tag::VehicleClass));
    assert!(!decoded.fields.contains(Tag::RestrictionCodes));
    assert!(!decoded.fields.contains(Tag::EndorsementCodes));

    let report = validate(&form, &metadata);
    assert_eq!(report.overall_score, 100);
    assert!(report.field(Tag::VehicleClass).is_none());
}

#[test]
fn external_record_mismatch_and_format_error() {
    let (form, metadata) = complete_form();
    let raw = encode(&form, &metadata)
        .into_string()
        .replace("DCSSMITH", "DCSSMYTH")
        .replace("DAU070 IN", "DAU070 XX");

    let report = validate_record(&raw, &form, &metadata);
    assert!(report.is_header_valid);
    assert!(report.overall_score < 100);

    assert_eq!(report.fields[0].tag, Tag::Height);
    assert_eq!(report.fields[0].status, ValidationStatus::FormatError);
    assert_eq!(report.fields[1].tag, Tag::CustomerFamilyName);
    assert_eq!(report.fields[1].status, ValidationStatus::Mismatch);
    assert_eq!(report.fields[1].form_value, "Smith");
    assert_eq!(report.fields[1].scanned_or_derived_value, "SMYTH");
    assert_eq!(report.compliance_notes.len(), 2);
}

#[test]
fn inconsistent_designator_is_noted() {
    let (form, metadata) = complete_form();
    let raw = encode(&form, &metadata).into_string();
    let raw = format!("{}0032{}", &raw[..23], &raw[27..]);

    let decoded = decode(&raw);
    assert!(!decoded.is_fatal());

    let report = validate_record(&raw, &form, &metadata);
    assert!(report.is_header_valid);
    assert!(report.overall_score < 100);
    assert!(report
        .compliance_notes
        .iter()
        .any(|n| n.contains("subfile designators")));
}

#[test]
fn custom_weights() {
    let (mut form, metadata) = complete_form();
    form.remove(Tag::AddressJurisdictionCode);

    let validator = Validator::new(Weights {
        critical: 0,
        ..Weights::default()
    });
    let report = validator.validate(&form, &metadata);
    assert_eq!(report.overall_score, 100);
    assert!(!report.compliance_notes.is_empty());
}

#[test]
fn removing_any_mandatory_element_lowers_the_score() {
    let (form, metadata) = complete_form();
    let raw = encode(&form, &metadata).into_string();

    for spec in catalog::mandatory() {
        let stripped = strip_segment(&raw, spec.tag.string_id());
        assert!(decode(&stripped).diagnostics.is_empty());

        let report = validate_record(&stripped, &form, &metadata);
        assert!(report.overall_score < 100, "{}", spec.tag);
        assert!(report
            .compliance_notes
            .iter()
            .any(|n| n.contains(spec.tag.string_id())));
    }
}

#[test]
fn extracted_values_merge_into_form() {
    let (mut form, metadata) = complete_form();
    let (extracted, unknown) = sanitize_extracted([
        ("DAI", " Buffalo "),
        ("DBB", "1985-07-04"),
        ("DAJ", ""),
        ("XYZ", "noise"),
    ]);
    assert_eq!(unknown, [("XYZ".to_owned(), "noise".to_owned())]);

    form.merge(extracted);
    let decoded = decode(encode(&form, &metadata).as_str());

    assert_eq!(decoded.fields.get(Tag::AddressCity), Some("BUFFALO"));
    assert_eq!(decoded.fields.get(Tag::DateOfBirth), Some("07041985"));
    assert_eq!(decoded.fields.get(Tag::AddressJurisdictionCode), Some("NY"));
}

#[test]
fn metadata_from_json() {
    let metadata = RecordMetadata::from_json(r#"{ "issuerIdentificationNumber": "604428" }"#).unwrap();
    assert_eq!(metadata.issuer_id(), 604428);
    assert_eq!(metadata.subfile_kind, SubfileKind::Dl);
    assert!(RecordMetadata::from_json("{ not json").is_err());
}

#[test]
fn oversized_height_is_clamped() {
    let (form, metadata) = complete_form();

    for height in ["400000000'", "5 FT 4294967295 IN", "99999 CM"] {
        let form = form.clone().with(Tag::Height, height);
        let decoded = decode(encode(&form, &metadata).as_str());
        assert!(decoded.fields.get(Tag::Height).unwrap().starts_with("999 "));
        assert_eq!(validate(&form, &metadata).overall_score, 100);
    }
}

fn height_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        "[0-9]{1,12}'[0-9]{0,12}\"?",
        "[0-9]{1,12} FT [0-9]{1,12} IN",
        "[0-9]{1,12} ?(CM|IN)?",
        any::<String>(),
    ]
}

/// Any value for any tag, printable or not.
fn arbitrary_form_strategy() -> impl Strategy<Value = FieldValues> {
    (
        prop::collection::vec(
            (prop::sample::select(Tag::LIST.to_vec()), any::<String>()),
            0..Tag::COUNT * 2,
        ),
        prop::option::of(height_strategy()),
    )
        .prop_map(|(pairs, height)| {
            let mut form: FieldValues = pairs.into_iter().collect();
            if let Some(height) = height {
                form.insert(Tag::Height, height);
            }
            form
        })
}

fn form_strategy() -> impl Strategy<Value = FieldValues> {
    (
        "[A-Z][A-Z '-]{0,30}",
        "[A-Z][A-Z '-]{0,30}",
        "[A-Z0-9]{1,25}",
        "[A-Z0-9 ]{1,35}",
        (1950i32..2040, 1u32..=12, 1u32..=28),
        "[A-Z]{2}",
        "[0-9]{5}",
    )
        .prop_map(|(family, first, id, street, (y, m, d), state, zip)| {
            FieldValues::new()
                .with(Tag::CustomerFamilyName, family)
                .with(Tag::CustomerFirstName, first)
                .with(Tag::CustomerIdNumber, id)
                .with(Tag::AddressStreet1, street)
                .with(Tag::DateOfBirth, format!("{y:04}-{m:02}-{d:02}"))
                .with(Tag::AddressJurisdictionCode, state)
                .with(Tag::AddressPostalCode, zip)
        })
}

proptest! {
    #[test]
    fn decode_reproduces_encoded_values(form in form_strategy()) {
        let metadata = RecordMetadata::new("636005");
        let expected = format_elements(&form, &metadata);
        let decoded = decode(encode(&form, &metadata).as_str());

        prop_assert!(decoded.diagnostics.is_empty(), "{:?}", decoded.diagnostics);
        prop_assert_eq!(decoded.length_mismatches(), 0);
        prop_assert_eq!(decoded.fields.len(), expected.elements.len());
        for (tag, value) in &expected.elements {
            prop_assert_eq!(decoded.fields.get(*tag), Some(value.trim()));
        }
    }

    #[test]
    fn stripping_a_mandatory_element_never_raises_the_score(
        form in form_strategy(),
        tag in prop::sample::select(catalog::mandatory().map(|s| s.tag).collect::<Vec<_>>()),
    ) {
        let metadata = RecordMetadata::new("636005");
        let full = validate(&form, &metadata);
        let stripped = strip_segment(&full.raw_string, tag.string_id());

        prop_assert!(validate_record(&stripped, &form, &metadata).overall_score <= full.overall_score);
    }

    #[test]
    fn any_form_encodes_to_a_consistent_record(
        form in arbitrary_form_strategy(),
        kind in prop::sample::select(vec![SubfileKind::Dl, SubfileKind::Id]),
    ) {
        let mut metadata = RecordMetadata::new("636005");
        metadata.subfile_kind = kind;

        let record = encode(&form, &metadata);
        let decoded = decode(record.as_str());
        prop_assert!(!decoded.is_fatal());
        prop_assert_eq!(decoded.length_mismatches(), 0);

        let report = validate(&form, &metadata);
        prop_assert!(report.is_header_valid);
        prop_assert!(report.overall_score <= 100);
    }
}

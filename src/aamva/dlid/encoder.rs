use std::fmt;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use super::{
    catalog,
    pdf_417::{encode_entries, FileBuilder, Header, Subfile, SubfileDesignator},
    truncate,
    values::sanitize,
    Country, FieldKind, FieldSpec, FieldValues, RecordMetadata, SubfileKind, Tag, Truncation,
    NAME_LIMIT,
};

/// Optional element values meaning "not applicable".
const SENTINELS: [&str; 3] = ["0", "N", "NONE"];

/// Wire-format record produced by [`encode`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedRecord {
    raw: String,
    header: Header,
    designators: Vec<SubfileDesignator>,
    elements: Vec<(Tag, String)>,
    names: [Truncation; 3],
}

impl EncodedRecord {
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.raw.as_bytes()
    }

    pub fn into_string(self) -> String {
        self.raw
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    pub fn header(&self) -> Header {
        self.header
    }

    pub fn designators(&self) -> &[SubfileDesignator] {
        &self.designators
    }

    /// Emitted elements, in emission order, with their formatted values.
    pub fn elements(&self) -> &[(Tag, String)] {
        &self.elements
    }

    /// Truncation outcome of the family, first and middle names.
    pub fn names(&self) -> &[Truncation; 3] {
        &self.names
    }

    /// Renders the record with control characters escaped, for logs and
    /// terminals.
    pub fn escaped(&self) -> String {
        self.raw.escape_debug().to_string()
    }

}

impl fmt::Display for EncodedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Element values as they will be emitted, without the wire framing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormattedElements {
    pub elements: Vec<(Tag, String)>,
    pub names: [Truncation; 3],
}

impl FormattedElements {
    pub fn get(&self, tag: Tag) -> Option<&str> {
        self.elements
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, v)| v.as_str())
    }
}

/// Encodes `values` as a single-subfile DL/ID record.
///
/// Encoding never fails: every value is sanitized and coerced into the shape
/// its data element requires.
pub fn encode(values: &FieldValues, metadata: &RecordMetadata) -> EncodedRecord {
    let FormattedElements { elements, names } = format_elements(values, metadata);

    let data = encode_entries(
        elements
            .iter()
            .map(|(tag, value)| (tag.id(), value.as_bytes())),
    );

    let mut builder = FileBuilder::new(
        metadata.issuer_id(),
        metadata.version(),
        metadata.jurisdiction_version(),
    );
    builder.push(Subfile::new(*metadata.subfile_kind.marker(), data));

    // All emitted bytes are printable ASCII or separators.
    let raw = String::from_utf8_lossy(&builder.to_bytes()).into_owned();

    tracing::debug!(
        bytes = raw.len(),
        elements = elements.len(),
        kind = metadata.subfile_kind.as_str(),
        "encoded DL/ID record"
    );

    EncodedRecord {
        raw,
        header: builder.header(),
        designators: builder.designators(),
        elements,
        names,
    }
}

/// Formats every element that [`encode`] would emit, in canonical order.
pub fn format_elements(values: &FieldValues, metadata: &RecordMetadata) -> FormattedElements {
    let names = Tag::NAMES.map(|(name, _)| {
        truncate(&sanitize(values.get(name).unwrap_or_default()), NAME_LIMIT)
    });

    let mut elements = Vec::new();

    for tag in Tag::LIST {
        let spec = catalog::lookup(tag);

        if spec.dl_only && metadata.subfile_kind == SubfileKind::Id {
            continue;
        }

        let value = match Tag::NAMES.iter().position(|(n, t)| *n == tag || *t == tag) {
            Some(i) if tag.is_truncation_indicator() => Some(names[i].truncated.to_string()),
            Some(i) => Some(names[i].text.clone()).filter(|v| !v.is_empty()),
            None => {
                let raw = sanitize(values.get(tag).unwrap_or_default());
                if !spec.mandatory && (raw.is_empty() || SENTINELS.contains(&raw.as_str())) {
                    continue;
                }

                format_value(spec, &raw, metadata)
            }
        };

        let value = value.or_else(|| {
            (spec.mandatory && !spec.placeholder.is_empty()).then(|| spec.placeholder.clone())
        });

        match value {
            Some(value) => {
                tracing::trace!(%tag, %value, "formatted element");
                elements.push((tag, value))
            }
            None => tracing::trace!(%tag, "element omitted"),
        }
    }

    FormattedElements { elements, names }
}

/// Coerces a sanitized, non-name value. Returns `None` when nothing usable
/// is left.
fn format_value(spec: &FieldSpec, value: &str, metadata: &RecordMetadata) -> Option<String> {
    let formatted = match spec.kind {
        FieldKind::Text => value.to_owned(),
        FieldKind::Date => format_date(value, metadata.country)?,
        FieldKind::SexCode => format_sex(value)?,
        FieldKind::Height => format_height(value)?,
        FieldKind::Weight => format_weight(value)?,
        FieldKind::CountryCode => format_country(value, metadata.country),
        FieldKind::FixedCode => match spec.tag {
            Tag::AddressPostalCode => {
                return format_postal_code(value, metadata.country, spec.max_length)
            }
            Tag::AddressJurisdictionCode => {
                value.chars().filter(char::is_ascii_alphabetic).collect()
            }
            Tag::EyeColor => format_eye_color(value),
            _ => value.to_owned(),
        },
    };

    let formatted: String = formatted.chars().take(spec.max_length).collect();
    let formatted = formatted.trim();

    (!formatted.is_empty()).then(|| formatted.to_owned())
}

/// Reads a calendar date written as `YYYYMMDD`, `MMDDYYYY`, or with any
/// separators as `YYYY-MM-DD` or `MM/DD/YYYY`.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    let groups: Vec<&str> = value
        .split(|c: char| !c.is_ascii_digit())
        .filter(|g| !g.is_empty())
        .collect();

    let (y, m, d) = match groups.as_slice() {
        [a, b, c] if a.len() == 4 => (*a, *b, *c),
        [a, b, c] if c.len() == 4 => (*c, *a, *b),
        [digits] if digits.len() == 8 => {
            let ymd = (&digits[..4], &digits[4..6], &digits[6..]);
            let mdy = (&digits[4..], &digits[..2], &digits[2..4]);
            if to_date(ymd).is_some() && (digits.starts_with("19") || digits.starts_with("20")) {
                ymd
            } else {
                mdy
            }
        }
        _ => return None,
    };

    to_date((y, m, d))
}

fn to_date((y, m, d): (&str, &str, &str)) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(y.parse().ok()?, m.parse().ok()?, d.parse().ok()?)
}

/// Formats a date in the byte order used by `country`.
pub fn date_to_wire(date: NaiveDate, country: Country) -> String {
    match country {
        Country::Usa => format!("{:02}{:02}{:04}", date.month(), date.day(), date.year()),
        Country::Can => format!("{:04}{:02}{:02}", date.year(), date.month(), date.day()),
    }
}

/// Reads an 8-digit wire date in the byte order used by `country`.
pub fn date_from_wire(value: &str, country: Country) -> Option<NaiveDate> {
    if value.len() != 8 || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    match country {
        Country::Usa => to_date((&value[4..], &value[..2], &value[2..4])),
        Country::Can => to_date((&value[..4], &value[4..6], &value[6..])),
    }
}

fn format_date(value: &str, country: Country) -> Option<String> {
    match parse_date(value) {
        Some(date) => Some(date_to_wire(date, country)),
        None => {
            let digits: String = value.chars().filter(char::is_ascii_digit).take(8).collect();
            (!digits.is_empty()).then_some(digits)
        }
    }
}

fn format_sex(value: &str) -> Option<String> {
    let code = match value {
        "" => return None,
        "1" | "M" | "MALE" | "MAN" => "1",
        "2" | "F" | "FEMALE" | "WOMAN" => "2",
        _ => "9",
    };

    Some(code.to_owned())
}

fn digit_groups(value: &str) -> Vec<u32> {
    value
        .split(|c: char| !c.is_ascii_digit())
        .filter_map(|g| g.parse().ok())
        .collect()
}

/// `NNN IN` or `NNN CM`.
fn format_height(value: &str) -> Option<String> {
    let groups = digit_groups(value);
    let first = *groups.first()?;

    let (amount, unit) = if value.contains("CM") {
        (first, "CM")
    } else if value.contains('\'') || value.contains("FT") {
        (
            first
                .saturating_mul(12)
                .saturating_add(groups.get(1).copied().unwrap_or(0)),
            "IN",
        )
    } else if value.contains("IN") || first < 100 {
        (first, "IN")
    } else {
        (first, "CM")
    };

    Some(format!("{:03} {unit}", amount.min(999)))
}

fn format_weight(value: &str) -> Option<String> {
    let amount = *digit_groups(value).first()?;
    Some(format!("{:03}", amount.min(999)))
}

fn format_country(value: &str, fallback: Country) -> String {
    match value {
        "" => fallback.code().to_owned(),
        "US" | "USA" | "UNITED STATES" | "UNITED STATES OF AMERICA" => "USA".to_owned(),
        "CA" | "CAN" | "CANADA" => "CAN".to_owned(),
        other => other.chars().filter(char::is_ascii_alphabetic).collect(),
    }
}

/// Postal codes are padded with spaces to the full element width.
fn format_postal_code(value: &str, country: Country, width: usize) -> Option<String> {
    let mut code: String = value.chars().filter(char::is_ascii_alphanumeric).collect();
    if code.is_empty() {
        return None;
    }

    if country == Country::Usa && code.len() == 5 {
        code.push_str("0000");
    }

    Some(format!("{code:<width$.width$}"))
}

/// ANSI D20 eye color codes.
pub const EYE_COLORS: [(&str, &str); 10] = [
    ("BLK", "BLACK"),
    ("BLU", "BLUE"),
    ("BRO", "BROWN"),
    ("GRY", "GRAY"),
    ("GRN", "GREEN"),
    ("HAZ", "HAZEL"),
    ("MAR", "MAROON"),
    ("PNK", "PINK"),
    ("DIC", "DICHROMATIC"),
    ("UNK", "UNKNOWN"),
];

fn format_eye_color(value: &str) -> String {
    let value = if value == "GREY" { "GRAY" } else { value };

    EYE_COLORS
        .iter()
        .find(|(code, name)| value == *code || value == *name)
        .map(|(code, _)| (*code).to_owned())
        .unwrap_or_else(|| value.chars().filter(char::is_ascii_alphabetic).collect())
}

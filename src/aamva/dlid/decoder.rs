use super::{
    pdf_417::{
        decode_digits, Header, RecordEntry, SubfileDesignator, COMPLIANCE_INDICATOR,
        DATA_ELEMENT_SEPARATOR, ENTRY_COUNT_RANGE, FILE_TYPE, FILE_TYPE_RANGE, HEADER_SIZE,
        SEGMENT_TERMINATOR, SUBFILE_DESIGNATOR_SIZE,
    },
    FieldValues, Tag,
};

/// Structural finding reported by [`decode`].
///
/// Only a missing anchor (compliance indicator or file type) is fatal: every
/// other diagnostic is advisory and decoding continues.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Diagnostic {
    #[error("missing compliance indicator `@` at byte 0")]
    MissingComplianceIndicator,

    #[error("missing file type `ANSI ` at bytes 4 to 8")]
    MissingFileType,

    #[error("header has non-numeric issuer, version or entry count fields")]
    InvalidHeader,

    #[error("invalid number of entries `{0}`, assuming 1")]
    InvalidEntryCount(String),

    #[error("designator table ends before entry {index}")]
    TruncatedDesignatorTable { index: usize },

    #[error("designator {index} is not readable: `{text}`")]
    InvalidDesignator { index: usize, text: String },

    #[error("subfile {subfile} starts at offset {offset}, past the end of the record ({len} bytes)")]
    OffsetOutOfBounds {
        subfile: String,
        offset: usize,
        len: usize,
    },

    #[error("subfile marker mismatch: expected `{expected}`, found `{found}`")]
    SubfileMarkerMismatch { expected: String, found: String },

    #[error("subfile {subfile} declares {declared} bytes but spans {actual}")]
    LengthMismatch {
        subfile: String,
        declared: usize,
        actual: usize,
    },

    #[error("malformed segment `{0}` skipped")]
    MalformedSegment(String),

    #[error("unknown data element `{0}`")]
    UnknownElement(String),

    #[error("duplicate data element `{0}`, keeping the last occurrence")]
    DuplicateElement(Tag),
}

impl Diagnostic {
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingComplianceIndicator | Self::MissingFileType
        )
    }
}

/// Result of [`decode`]: whatever could be recovered, and what went wrong.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedRecord {
    /// `None` if the anchor is missing or a numeric header field is garbled.
    pub header: Option<Header>,

    pub designators: Vec<SubfileDesignator>,

    pub fields: FieldValues,

    /// Elements whose tag is not in the catalog, as `(tag, value)`.
    pub unknown: Vec<(String, String)>,

    pub diagnostics: Vec<Diagnostic>,
}

impl DecodedRecord {
    pub fn is_fatal(&self) -> bool {
        self.diagnostics.iter().any(Diagnostic::is_fatal)
    }

    pub fn length_mismatches(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::LengthMismatch { .. }))
            .count()
    }

    fn diagnose(&mut self, diagnostic: Diagnostic) {
        if diagnostic.is_fatal() {
            tracing::warn!(%diagnostic, "cannot decode DL/ID record");
        } else {
            tracing::debug!(%diagnostic, "DL/ID record diagnostic");
        }

        self.diagnostics.push(diagnostic)
    }
}

/// Decodes a wire-format record.
///
/// Subfiles are located through the designator table. Decoding never fails:
/// malformed input yields partial results and diagnostics.
pub fn decode(raw: &str) -> DecodedRecord {
    let bytes = raw.as_bytes();
    let mut record = DecodedRecord::default();

    if bytes.first() != Some(&COMPLIANCE_INDICATOR) {
        record.diagnose(Diagnostic::MissingComplianceIndicator);
        return record;
    }

    if bytes.get(FILE_TYPE_RANGE) != Some(FILE_TYPE.as_slice()) {
        record.diagnose(Diagnostic::MissingFileType);
        return record;
    }

    record.header = Header::decode(bytes);
    if record.header.is_none() {
        record.diagnose(Diagnostic::InvalidHeader);
    }

    let entry_count = match bytes.get(ENTRY_COUNT_RANGE).and_then(decode_digits) {
        Some(n) => n,
        None => {
            let text = lossy(bytes.get(ENTRY_COUNT_RANGE).unwrap_or_default());
            record.diagnose(Diagnostic::InvalidEntryCount(text));
            1
        }
    };

    for index in 0..entry_count {
        let start = HEADER_SIZE + SUBFILE_DESIGNATOR_SIZE * index;
        let Some(chunk) = bytes
            .get(start..start + SUBFILE_DESIGNATOR_SIZE)
            .and_then(|c| <&[u8; SUBFILE_DESIGNATOR_SIZE]>::try_from(c).ok())
        else {
            record.diagnose(Diagnostic::TruncatedDesignatorTable { index });
            break;
        };

        match SubfileDesignator::decode(chunk) {
            Some(designator) => record.designators.push(designator),
            None => record.diagnose(Diagnostic::InvalidDesignator {
                index,
                text: lossy(chunk),
            }),
        }
    }

    for designator in record.designators.clone() {
        decode_subfile(bytes, &designator, &mut record);
    }

    tracing::debug!(
        fields = record.fields.len(),
        diagnostics = record.diagnostics.len(),
        "decoded DL/ID record"
    );

    record
}

fn decode_subfile(bytes: &[u8], designator: &SubfileDesignator, record: &mut DecodedRecord) {
    let subfile = designator.subfile_type_str();

    let rest = match bytes.get(designator.offset..) {
        Some(rest) if !rest.is_empty() => rest,
        _ => {
            record.diagnose(Diagnostic::OffsetOutOfBounds {
                subfile,
                offset: designator.offset,
                len: bytes.len(),
            });
            return;
        }
    };

    let actual = rest
        .iter()
        .position(|&b| b == SEGMENT_TERMINATOR)
        .map_or(rest.len(), |p| p + 1);

    if actual != designator.length {
        record.diagnose(Diagnostic::LengthMismatch {
            subfile,
            declared: designator.length,
            actual,
        });
    }

    for segment in SegmentReader::new(designator.subfile_type, &rest[..actual]) {
        match segment {
            Segment::MarkerMismatch(found) => {
                record.diagnose(Diagnostic::SubfileMarkerMismatch {
                    expected: designator.subfile_type_str(),
                    found: lossy(found),
                });
            }
            Segment::Malformed(line) => {
                record.diagnose(Diagnostic::MalformedSegment(lossy(line)));
            }
            Segment::Entry(entry) => {
                let value = lossy(&entry.value).trim().to_owned();
                match Tag::from_id(&entry.field) {
                    Some(tag) => {
                        tracing::trace!(%tag, %value, "decoded element");
                        if record.fields.insert(tag, value).is_some() {
                            record.diagnose(Diagnostic::DuplicateElement(tag));
                        }
                    }
                    None => {
                        let field = lossy(&entry.field);
                        record.diagnose(Diagnostic::UnknownElement(field.clone()));
                        record.unknown.push((field, value));
                    }
                }
            }
        }
    }
}

fn lossy(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

fn is_separator(b: u8) -> bool {
    b == DATA_ELEMENT_SEPARATOR || b == SEGMENT_TERMINATOR
}

fn known_tag(bytes: &[u8]) -> Option<Tag> {
    <&[u8; 3]>::try_from(bytes).ok().and_then(Tag::from_id)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Expecting the subfile type marker.
    Marker,

    /// Expecting a 3-letter tag at the start of a segment.
    Tag,

    /// Reading the value of the given tag up to the next separator.
    Value([u8; 3]),

    /// Skipping a malformed segment.
    Skip,

    Done,
}

enum Segment<'a> {
    MarkerMismatch(&'a [u8]),
    Entry(RecordEntry),
    Malformed(&'a [u8]),
}

/// Splits a subfile body into data element segments.
struct SegmentReader<'a> {
    marker: [u8; 2],
    body: &'a [u8],
    pos: usize,
    state: State,
}

impl<'a> SegmentReader<'a> {
    fn new(marker: [u8; 2], body: &'a [u8]) -> Self {
        Self {
            marker,
            body,
            pos: 0,
            state: State::Marker,
        }
    }

    /// Bytes from the current position up to the next separator.
    fn line(&self) -> &'a [u8] {
        let rest = &self.body[self.pos..];
        let end = rest
            .iter()
            .position(|&b| is_separator(b))
            .unwrap_or(rest.len());
        &rest[..end]
    }
}

impl<'a> Iterator for SegmentReader<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.state {
                State::Marker => {
                    self.state = State::Tag;
                    if self.body.starts_with(&self.marker) {
                        self.pos = self.marker.len();
                    } else {
                        let found = &self.body[..self.body.len().min(2)];
                        return Some(Segment::MarkerMismatch(found));
                    }
                }
                State::Tag => {
                    while self.pos < self.body.len() && is_separator(self.body[self.pos]) {
                        self.pos += 1;
                    }

                    if self.pos >= self.body.len() {
                        self.state = State::Done;
                        continue;
                    }

                    // Some encoders repeat the subfile type before the first tag.
                    let line = self.line();
                    if line.len() >= 5
                        && line.starts_with(&self.marker)
                        && known_tag(&line[..3]).is_none()
                        && known_tag(&line[2..5]).is_some()
                    {
                        self.pos += 2;
                    }

                    self.state = match self.line().get(..3) {
                        Some(tag) if tag.iter().all(u8::is_ascii_uppercase) => {
                            self.pos += 3;
                            State::Value([tag[0], tag[1], tag[2]])
                        }
                        _ => State::Skip,
                    };
                }
                State::Value(field) => {
                    let value = self.line();
                    self.pos += value.len();
                    self.state = State::Tag;
                    return Some(Segment::Entry(RecordEntry {
                        field,
                        value: value.to_vec(),
                    }));
                }
                State::Skip => {
                    let line = self.line();
                    self.pos += line.len();
                    self.state = State::Tag;
                    return Some(Segment::Malformed(line));
                }
                State::Done => return None,
            }
        }
    }
}

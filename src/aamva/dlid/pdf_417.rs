//! PDF417 DL/ID file layout.
//!
//! ```text
//! header (21) | designator (10) * n | subfile * n
//! ```
pub const HEADER_SIZE: usize = 9 + 6 + 2 + 2 + 2;

pub const SUBFILE_DESIGNATOR_SIZE: usize = 2 + 4 + 4;

pub const COMPLIANCE_INDICATOR: u8 = b'@';

pub const DATA_ELEMENT_SEPARATOR: u8 = b'\n';

pub const RECORD_SEPARATOR: u8 = 0x1e;

pub const SEGMENT_TERMINATOR: u8 = b'\r';

pub const FILE_TYPE: [u8; 5] = *b"ANSI ";

pub const PREFIX: [u8; 9] = [
    COMPLIANCE_INDICATOR,
    DATA_ELEMENT_SEPARATOR,
    RECORD_SEPARATOR,
    SEGMENT_TERMINATOR,
    FILE_TYPE[0],
    FILE_TYPE[1],
    FILE_TYPE[2],
    FILE_TYPE[3],
    FILE_TYPE[4],
];

/// Byte range of the file type within the header.
pub const FILE_TYPE_RANGE: std::ops::Range<usize> = 4..9;

/// Byte range of the number of entries within the header.
pub const ENTRY_COUNT_RANGE: std::ops::Range<usize> = 19..21;

/// Offset of the first subfile body when there are `entry_count` subfiles.
pub fn first_subfile_offset(entry_count: usize) -> usize {
    HEADER_SIZE + SUBFILE_DESIGNATOR_SIZE * entry_count
}

pub struct FileBuilder {
    header: Header,
    subfiles: Vec<Subfile>,
}

impl FileBuilder {
    pub fn new(issuer_id: u32, version: u8, jurisdiction_version: u8) -> Self {
        Self {
            header: Header {
                issuer_id,
                version,
                jurisdiction_version,
                entry_count: 0,
            },
            subfiles: Vec::new(),
        }
    }

    pub fn push(&mut self, subfile: impl Into<Subfile>) {
        self.subfiles.push(subfile.into());
    }

    pub fn header(&self) -> Header {
        Header {
            entry_count: self.subfiles.len() as u8,
            ..self.header
        }
    }

    /// Designator table, with offsets laid out back to back after the table.
    pub fn designators(&self) -> Vec<SubfileDesignator> {
        let mut offset = first_subfile_offset(self.subfiles.len());
        self.subfiles
            .iter()
            .map(|subfile| {
                let designator = SubfileDesignator {
                    subfile_type: subfile.subfile_type,
                    offset,
                    length: subfile.len(),
                };
                offset += designator.length;
                designator
            })
            .collect()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let body_len: usize = self.subfiles.iter().map(Subfile::len).sum();
        let mut result =
            Vec::with_capacity(first_subfile_offset(self.subfiles.len()) + body_len);

        self.header().encode(&mut result);

        for designator in self.designators() {
            designator.encode(&mut result);
        }

        for subfile in &self.subfiles {
            subfile.encode(&mut result);
        }

        result
    }
}

pub struct Subfile {
    pub subfile_type: [u8; 2],
    pub data: Vec<u8>,
}

impl Subfile {
    pub fn new(subfile_type: [u8; 2], data: Vec<u8>) -> Self {
        Self { subfile_type, data }
    }

    /// Byte length of the subfile, type marker and terminator included.
    pub fn len(&self) -> usize {
        2 + self.data.len()
    }

    pub fn encode(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.subfile_type);
        buffer.extend_from_slice(&self.data);
    }
}

/// Builds subfile data from `(tag, value)` entries.
///
/// Entries are separated by [`DATA_ELEMENT_SEPARATOR`] and the last one is
/// followed by [`SEGMENT_TERMINATOR`].
pub fn encode_entries<'a>(entries: impl IntoIterator<Item = (&'a [u8; 3], &'a [u8])>) -> Vec<u8> {
    let mut data = Vec::new();

    for (field, value) in entries {
        if !data.is_empty() {
            data.push(DATA_ELEMENT_SEPARATOR);
        }

        RecordEntry::encode_ref(&mut data, field, value);
    }

    data.push(SEGMENT_TERMINATOR);
    data
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub issuer_id: u32,
    pub version: u8,
    pub jurisdiction_version: u8,
    pub entry_count: u8,
}

impl Header {
    pub fn encode(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&PREFIX);
        buffer.extend_from_slice(&encode_digits::<6>(self.issuer_id as usize));
        buffer.extend_from_slice(&encode_digits::<2>(self.version as usize));
        buffer.extend_from_slice(&encode_digits::<2>(self.jurisdiction_version as usize));
        buffer.extend_from_slice(&encode_digits::<2>(self.entry_count as usize));
    }

    /// Decodes the numeric part of a header whose anchor has already been
    /// checked.
    ///
    /// Returns `None` if `bytes` is too short or a numeric field has a
    /// non-digit.
    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let bytes = bytes.get(..HEADER_SIZE)?;

        Some(Self {
            issuer_id: decode_digits(&bytes[9..15])? as u32,
            version: decode_digits(&bytes[15..17])? as u8,
            jurisdiction_version: decode_digits(&bytes[17..19])? as u8,
            entry_count: decode_digits(&bytes[ENTRY_COUNT_RANGE])? as u8,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubfileDesignator {
    pub subfile_type: [u8; 2],
    pub offset: usize,
    pub length: usize,
}

impl SubfileDesignator {
    pub fn decode(bytes: &[u8; SUBFILE_DESIGNATOR_SIZE]) -> Option<Self> {
        Some(Self {
            subfile_type: [bytes[0], bytes[1]],
            offset: decode_digits(&bytes[2..6])?,
            length: decode_digits(&bytes[6..10])?,
        })
    }

    pub fn encode(&self, buffer: &mut Vec<u8>) {
        buffer.extend_from_slice(&self.subfile_type);
        buffer.extend_from_slice(&encode_digits::<4>(self.offset));
        buffer.extend_from_slice(&encode_digits::<4>(self.length));
    }

    pub fn subfile_type_str(&self) -> String {
        String::from_utf8_lossy(&self.subfile_type).into_owned()
    }
}

pub struct RecordEntry {
    pub field: [u8; 3],
    pub value: Vec<u8>,
}

impl RecordEntry {
    pub fn encode_ref(buffer: &mut Vec<u8>, field: &[u8; 3], value: &[u8]) {
        buffer.extend_from_slice(field);
        buffer.extend_from_slice(value);
    }
}

fn encode_digit(value: usize) -> u8 {
    (value % 10) as u8 + b'0'
}

/// Encodes the `N` least significant decimal digits of `value`.
pub fn encode_digits<const N: usize>(mut value: usize) -> [u8; N] {
    let mut digits = [b'0'; N];
    for d in digits.iter_mut().rev() {
        *d = encode_digit(value);
        value /= 10;
    }
    digits
}

pub fn decode_digits(digits: &[u8]) -> Option<usize> {
    if digits.is_empty() {
        return None;
    }

    digits.iter().try_fold(0usize, |acc, &d| {
        d.is_ascii_digit().then(|| acc * 10 + (d - b'0') as usize)
    })
}

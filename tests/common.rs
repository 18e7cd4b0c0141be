use std::{fs, path::Path};

use aamva_dlid::{FieldValues, RecordMetadata};

pub fn load_metadata(path: impl AsRef<Path>) -> RecordMetadata {
    let file = fs::File::open(path).unwrap();
    RecordMetadata::from_reader(file).unwrap()
}

pub fn load_form(path: impl AsRef<Path>) -> FieldValues {
    let content = fs::read_to_string(path).unwrap();
    serde_json::from_str(&content).unwrap()
}

/// Fully filled-in driver license form, with its metadata.
pub fn complete_form() -> (FieldValues, RecordMetadata) {
    (
        load_form("tests/aamva/form.json"),
        load_metadata("tests/aamva/metadata.json"),
    )
}

/// Removes every `tag` segment from a single-subfile record and fixes the
/// designator length accordingly.
pub fn strip_segment(raw: &str, tag: &str) -> String {
    let (head, body) = raw.split_at(31);
    let kind = &body[..2];
    let inner = &body[2..body.len() - 1];

    let kept: Vec<&str> = inner
        .split('\n')
        .filter(|segment| !segment.starts_with(tag))
        .collect();
    let body = format!("{kind}{}\r", kept.join("\n"));

    format!("{}{:04}{body}", &head[..27], body.len())
}

/// Installs a test subscriber so that `RUST_LOG` works in tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

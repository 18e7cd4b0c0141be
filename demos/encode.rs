use aamva_dlid::{encode, validate, FieldValues, RecordMetadata};
use tracing_subscriber::EnvFilter;

/// Form data, as the form would hand it over.
const FORM: &str = r#"{
    "DCS": "Smith",
    "DAC": "John",
    "DBB": "1990-01-01",
    "DBA": "2030-12-31",
    "DBD": "2024-01-01",
    "DBC": "M",
    "DAY": "Brown",
    "DAU": "5'10\"",
    "DAG": "123 Main St",
    "DAI": "Albany",
    "DAJ": "NY",
    "DAK": "12207",
    "DAQ": "D1234567",
    "DCF": "DOC1234567890"
}"#;

const METADATA: &str = r#"{ "issuerIdentificationNumber": "636005", "subfileKind": "DL" }"#;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // Forms and metadata may also be given as JSON files.
    let mut args = std::env::args().skip(1);
    let form = match args.next() {
        Some(path) => std::fs::read_to_string(path).unwrap(),
        None => FORM.to_owned(),
    };
    let metadata = match args.next() {
        Some(path) => RecordMetadata::from_reader(std::fs::File::open(path).unwrap()).unwrap(),
        None => RecordMetadata::from_json(METADATA).unwrap(),
    };

    let form: FieldValues = serde_json::from_str(&form).unwrap();

    let record = encode(&form, &metadata);
    eprintln!("record ({} bytes): {}", record.len(), record.escaped());

    let report = validate(&form, &metadata);
    println!("{}", report.to_json().unwrap())
}

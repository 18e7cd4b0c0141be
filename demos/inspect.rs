use aamva_dlid::decode;
use tracing_subscriber::EnvFilter;

/// Scanned PDF417 payload, with a wrong subfile length.
const RECORD: &str = "@\n\x1e\rANSI 636005100001DL00310070DLDAQD1234567\nDCSSMITH\nDACJOHN\nDADNONE\nDBB01011990\nDBA12312030\nDAJNY\nDCGUSA\nDDEN\r";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    // A record may also be read from a file.
    let raw = match std::env::args().nth(1) {
        Some(path) => std::fs::read_to_string(path).unwrap(),
        None => RECORD.to_owned(),
    };

    let record = decode(&raw);

    match record.header {
        Some(header) => println!(
            "issuer {:06}, version {:02}, {} subfile(s)",
            header.issuer_id, header.version, header.entry_count
        ),
        None => println!("no readable header"),
    }

    for designator in &record.designators {
        println!(
            "  {} at {} ({} bytes)",
            designator.subfile_type_str(),
            designator.offset,
            designator.length
        );
    }

    for (tag, value) in record.fields.iter() {
        println!("{tag} {:<40} {value}", tag.spec().description);
    }

    for (field, value) in &record.unknown {
        println!("{field} (unknown) {value}");
    }

    for diagnostic in &record.diagnostics {
        println!("! {diagnostic}");
    }
}

use phone_append_types::NumberRecord;
use std::io;
use std::path::Path;

const HEADER: [&str; 11] = [
    "number",
    "firstname",
    "lastname",
    "address",
    "city",
    "state",
    "zip",
    "latitude",
    "longitude",
    "vendor",
    "restricted",
];

/// Write one row per contact, or a number-only row for records without any.
/// Returns the number of data rows written.
pub fn export_csv(records: &[NumberRecord], path: &Path) -> Result<usize, csv::Error> {
    let writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;
    write_records(records, writer)
}

fn write_records<W: io::Write>(
    records: &[NumberRecord],
    mut writer: csv::Writer<W>,
) -> Result<usize, csv::Error> {
    writer.write_record(HEADER)?;
    let mut rows = 0;

    for record in records {
        if record.contacts.is_empty() {
            writer.write_record([record.number.as_str()])?;
            rows += 1;
            continue;
        }

        let identity = record.vendor.as_deref().unwrap_or_default();
        let vendor = identity.split('-').next().unwrap_or_default();
        let restricted = if identity.contains("restricted") { "Y" } else { "N" };

        for contact in &record.contacts {
            let text = |field: &Option<String>| field.clone().unwrap_or_default();
            let coordinate = |value: Option<f64>| value.map(|v| v.to_string()).unwrap_or_default();
            writer.write_record([
                record.number.clone(),
                text(&contact.firstname),
                text(&contact.lastname),
                text(&contact.address),
                text(&contact.city),
                text(&contact.state),
                text(&contact.zip),
                coordinate(contact.latitude),
                coordinate(contact.longitude),
                vendor.to_string(),
                restricted.to_string(),
            ])?;
            rows += 1;
        }
    }

    writer.flush()?;
    Ok(rows)
}

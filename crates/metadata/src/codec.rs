use crate::errors::*;
use land_types::MetadataRecord;

/// Separator between the packed fields.
pub const FIELD_SEPARATOR: char = ',';
/// Wrapper written around `name` and `description`.
pub const FIELD_DELIMITER: char = '"';

/// Decode a packed metadata string.
///
/// The empty string means nothing is stored and yields `None`. Otherwise the
/// leading version marker is skipped without being parsed (the record always
/// carries version 0), and one character is stripped from each end of the
/// name and description. Fields that end up empty, or are missing entirely,
/// become `None`. Anything after the third field is ignored.
pub fn decode(raw: &str) -> Option<MetadataRecord> {
    if raw.is_empty() {
        return None;
    }

    let mut fields = raw.split(FIELD_SEPARATOR).skip(1);
    let name = fields.next().and_then(unwrap_field);
    let description = fields.next().and_then(unwrap_field);

    Some(MetadataRecord::new(name, description))
}

/// Pack a record into the legacy string form.
///
/// Absent fields are written as `""`. Values containing the separator are
/// refused because they would not decode back to the same record.
pub fn encode(record: &MetadataRecord) -> Result<String> {
    let name = record.name.as_deref().unwrap_or_default();
    let description = record.description.as_deref().unwrap_or_default();

    if name.contains(FIELD_SEPARATOR) {
        return Err(MetadataError::UnencodableField { field: "name" });
    }
    if description.contains(FIELD_SEPARATOR) {
        return Err(MetadataError::UnencodableField {
            field: "description",
        });
    }

    Ok(format!(
        "{version}{sep}{d}{name}{d}{sep}{d}{description}{d}",
        version = record.version,
        sep = FIELD_SEPARATOR,
        d = FIELD_DELIMITER,
    ))
}

fn unwrap_field(field: &str) -> Option<String> {
    let mut chars = field.chars();
    chars.next();
    chars.next_back();
    let inner = chars.as_str();
    if inner.is_empty() {
        None
    } else {
        Some(inner.to_string())
    }
}

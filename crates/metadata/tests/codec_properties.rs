use land_metadata::{decode, encode};
use land_types::MetadataRecord;
use proptest::prelude::*;

// Text that survives the legacy format: no separator anywhere.
fn storable_text() -> impl Strategy<Value = Option<String>> {
    prop::option::of("[^,]{1,24}")
}

proptest! {
    #[test]
    fn decode_never_panics(raw in ".*") {
        let _ = decode(&raw);
    }

    #[test]
    fn decoded_version_is_always_zero(raw in ".+") {
        let record = decode(&raw).expect("non-empty input always yields a record");
        prop_assert_eq!(record.version, 0);
    }

    #[test]
    fn decoded_fields_are_never_empty_strings(raw in ".*") {
        if let Some(record) = decode(&raw) {
            prop_assert!(record.name.as_deref() != Some(""));
            prop_assert!(record.description.as_deref() != Some(""));
        }
    }

    #[test]
    fn storable_records_survive_packing(name in storable_text(), description in storable_text()) {
        let record = MetadataRecord::new(name, description);
        let packed = encode(&record).expect("no separators in generated text");
        prop_assert_eq!(decode(&packed), Some(record));
    }
}

use super::*;

#[test]
fn test_location_display() {
    assert_eq!(Location::new(2, 7, 40).to_string(), "2:7");
}

#[test]
fn test_entry_serialization() {
    let entry = Entry::new(Location::new(0, 0, 0), Location::new(0, 6, 6));
    assert_eq!(
        json::to_value(entry).unwrap(),
        json::json!({
            "value_start": {"line": 0, "column": 0, "offset": 0},
            "value_end": {"line": 0, "column": 6, "offset": 6},
        })
    );
}

#[test]
fn test_entry_serialization_with_key() {
    let entry = Entry::new(Location::new(0, 4, 4), Location::new(0, 5, 5))
        .with_key(Location::new(0, 1, 1), Location::new(0, 2, 2));
    assert_eq!(
        json::to_value(entry).unwrap(),
        json::json!({
            "value_start": {"line": 0, "column": 4, "offset": 4},
            "value_end": {"line": 0, "column": 5, "offset": 5},
            "key_start": {"line": 0, "column": 1, "offset": 1},
            "key_end": {"line": 0, "column": 2, "offset": 2},
        })
    );
}

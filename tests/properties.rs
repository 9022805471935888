use std::collections::BTreeMap;

use labdesk::correct::{RawRow, correct_batch};
use labdesk::vocab::Vocabulary;
use proptest::prelude::*;

fn raw_row(headers: &[String], cells: &[String]) -> RawRow {
    headers
        .iter()
        .cloned()
        .zip(cells.iter().cloned().chain(std::iter::repeat(String::new())))
        .collect()
}

proptest! {
    /// Any input with at least one header and one row corrects without
    /// panicking, and every corrected record is complete (status and month
    /// always land on a canonical value).
    #[test]
    fn correction_is_total_for_arbitrary_input(
        headers in prop::collection::vec("[ -~]{1,24}", 1..8),
        cells in prop::collection::vec("[ -~]{0,24}", 0..8),
    ) {
        let vocab = Vocabulary::delivery_import();
        let rows = vec![raw_row(&headers, &cells)];
        let outcome = correct_batch(&vocab, &headers, &rows).expect("structurally valid input");
        prop_assert_eq!(outcome.records.len(), 1);
        let record = &outcome.records[0];
        prop_assert!(!record.lab_status.is_empty());
        prop_assert!(!record.month.is_empty());
        prop_assert!(record.year != 0);
        prop_assert_eq!(record.to_raw_row().len(), 24);
    }

    /// Re-correcting a corrected row through its own canonical raw form is a
    /// no-op: the normalizers are idempotent on already-canonical values.
    #[test]
    fn correction_is_idempotent_on_canonical_output(
        client in "[ -~]{0,16}",
        status in "[ -~]{0,12}",
        lab_type in "[ -~]{0,12}",
        month in "[ -~]{0,10}",
        amount in "[ -~]{0,12}",
        participants in "[ -~]{0,8}",
    ) {
        let vocab = Vocabulary::delivery_import();
        let headers: Vec<String> = ["Client", "Status", "Lab Type", "Month", "Total Amount", "Participants"]
            .iter()
            .map(|h| (*h).to_string())
            .collect();
        let mut row = BTreeMap::new();
        row.insert("Client".to_string(), client);
        row.insert("Status".to_string(), status);
        row.insert("Lab Type".to_string(), lab_type);
        row.insert("Month".to_string(), month);
        row.insert("Total Amount".to_string(), amount);
        row.insert("Participants".to_string(), participants);

        let first = correct_batch(&vocab, &headers, &[row]).expect("valid input");
        let canonical = first.records[0].to_raw_row();
        let canonical_headers: Vec<String> = canonical.keys().cloned().collect();
        let second =
            correct_batch(&vocab, &canonical_headers, &[canonical]).expect("valid input");
        prop_assert_eq!(&second.records[0], &first.records[0]);
    }
}

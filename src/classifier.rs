// Single vs Tandem detection for one table.
//
// The sheet label wins when it names the configuration; otherwise the
// table is Tandem only when more than half of its rows carry a positive
// P2 efficiency.
use crate::types::{Configuration, Field, PumpRecord, Side};
use std::collections::BTreeSet;

pub fn classify(label: &str, columns: &BTreeSet<String>, records: &[PumpRecord]) -> Configuration {
    let lowered = label.to_lowercase();
    if lowered.contains("single") {
        return Configuration::Single;
    }
    if lowered.contains("tandem") {
        return Configuration::Tandem;
    }

    let p2 = Field::Eff(Side::P2);
    if !columns.contains(p2.column()) {
        return Configuration::Single;
    }

    let with_p2 = records.iter().filter(|r| r.positive(p2).is_some()).count();
    // Strictly more than half, so an empty table stays Single.
    if with_p2 as f64 > records.len() as f64 * 0.5 {
        Configuration::Tandem
    } else {
        Configuration::Single
    }
}

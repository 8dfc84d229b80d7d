// Column checks run once per table before any analysis.
//
// Nothing here is fatal: each issue names a slice (table + column, or a
// whole condition) that the analyzers will treat as "no data".
use crate::amperage::AmperageAnalysis;
use crate::types::{Condition, Configuration, Field, PumpTable, Side};
use log::{info, warn};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SliceIssue {
    #[error("{table}: column '{column}' not found, slice skipped")]
    MissingColumn { table: String, column: &'static str },

    #[error("{table}: no records")]
    EmptyTable { table: String },

    #[error("{condition}: no positive amperage readings")]
    NoPositiveReadings { condition: Condition },
}

/// Columns the analyzers read for a table of the given configuration.
pub fn required_fields(configuration: Configuration) -> Vec<Field> {
    let sides: &[Side] = match configuration {
        Configuration::Single => &[Side::P1],
        Configuration::Tandem => &[Side::P1, Side::P2],
    };
    let mut fields: Vec<Field> = sides.iter().map(|s| Field::Eff(*s)).collect();
    for condition in Condition::ALL {
        fields.extend(sides.iter().map(|s| Field::Amp(condition, *s)));
    }
    fields
}

pub fn validate_table(table: &PumpTable) -> Vec<SliceIssue> {
    let mut issues = Vec::new();
    if table.unit_count() == 0 {
        issues.push(SliceIssue::EmptyTable {
            table: table.label().to_string(),
        });
    }
    for field in required_fields(table.configuration()) {
        if !table.has_field(field) {
            issues.push(SliceIssue::MissingColumn {
                table: table.label().to_string(),
                column: field.column(),
            });
        }
    }
    issues
}

pub fn check_amperage(analysis: &AmperageAnalysis) -> Vec<SliceIssue> {
    Condition::ALL
        .into_iter()
        .filter(|c| analysis.get(*c).maximum <= 0.0)
        .map(|condition| SliceIssue::NoPositiveReadings { condition })
        .collect()
}

pub fn log_issues(issues: &[SliceIssue]) {
    for issue in issues {
        match issue {
            SliceIssue::MissingColumn { .. } => warn!("{}", issue),
            _ => info!("{}", issue),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amperage::analyze_amperage;
    use crate::types::PumpRecord;

    #[test]
    fn single_needs_only_p1_columns() {
        let fields = required_fields(Configuration::Single);
        let cols: Vec<&str> = fields.iter().map(|f| f.column()).collect();
        assert_eq!(cols, vec!["Eff%P1", "0 Bar Amp P1", "200 Bar Amp P1"]);
    }

    #[test]
    fn tandem_needs_both_sides() {
        assert_eq!(required_fields(Configuration::Tandem).len(), 6);
    }

    #[test]
    fn reports_missing_columns_and_empty_table() {
        let table = PumpTable::new("TandemPump", ["Eff%P1", "Eff%P2", "0 Bar Amp P1"], vec![]);
        let issues = validate_table(&table);
        assert_eq!(
            issues[0],
            SliceIssue::EmptyTable {
                table: "TandemPump".to_string()
            }
        );
        assert!(issues.contains(&SliceIssue::MissingColumn {
            table: "TandemPump".to_string(),
            column: "0 Bar Amp P2",
        }));
        assert_eq!(issues.len(), 4);
    }

    #[test]
    fn complete_single_table_is_clean() {
        let table = PumpTable::new(
            "SinglePump",
            ["Pump Sr. No", "Eff%P1", "0 Bar Amp P1", "200 Bar Amp P1"],
            vec![PumpRecord::default()],
        );
        assert!(validate_table(&table).is_empty());
    }

    #[test]
    fn flags_conditions_without_readings() {
        let table = PumpTable::new(
            "SinglePump",
            ["0 Bar Amp P1", "200 Bar Amp P1"],
            vec![PumpRecord::default().with(Field::Amp(Condition::ZeroBar, Side::P1), 5.0)],
        );
        let issues = check_amperage(&analyze_amperage(&[table]));
        assert_eq!(
            issues,
            vec![SliceIssue::NoPositiveReadings {
                condition: Condition::TwoHundredBar
            }]
        );
        assert_eq!(issues[0].to_string(), "200_bar: no positive amperage readings");
    }
}

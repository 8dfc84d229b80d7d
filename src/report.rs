use crate::amperage::{AmperageAnalysis, AmperageStat};
use crate::efficiency::{Band, EfficiencyAnalysis};
use crate::types::{
    BandSummary, Condition, ConditionSummary, Configuration, PumpTable, ReportSummary,
    TableSummary, TandemEfficiencySummary,
};
use chrono::{DateTime, Utc};
use std::fmt;

/// P1/P2 amperage difference (percent of the larger reading) above which a
/// tandem unit counts as mismatched.
pub const AMP_MISMATCH_PCT: f64 = 10.0;

/// P1/P2 efficiency difference (percentage points) above which a tandem
/// unit counts as mismatched.
pub const EFF_MISMATCH_POINTS: f64 = 3.0;

/// The assembled report, one entry per output line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportText {
    lines: Vec<String>,
}

impl ReportText {
    #[cfg(test)]
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    fn blank(&mut self) {
        self.lines.push(String::new());
    }
}

impl fmt::Display for ReportText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.lines.join("\n"))
    }
}

pub fn assemble_report(
    tables: &[PumpTable],
    amperage: &AmperageAnalysis,
    efficiency: &EfficiencyAnalysis,
) -> ReportText {
    let mut out = ReportText::default();
    out.push("PUMP PERFORMANCE TEST REPORT");
    out.push("=".repeat(50));
    out.blank();

    push_configuration(&mut out, tables, efficiency.total_individual_readings);

    out.push("AMPERAGE ANALYSIS:");
    out.push("-".repeat(18));
    for condition in Condition::ALL {
        push_condition(&mut out, condition, amperage.get(condition));
        out.blank();
    }

    push_efficiency(&mut out, tables, efficiency);
    out
}

fn push_configuration(out: &mut ReportText, tables: &[PumpTable], individual: usize) {
    out.push("PUMP CONFIGURATION ANALYSIS:");
    out.push("-".repeat(28));
    for table in tables {
        let line = match table.configuration() {
            Configuration::Tandem => format!(
                "{}: {} Tandem units (each with 2 pumps)",
                table.label(),
                table.unit_count()
            ),
            Configuration::Single => {
                format!("{}: {} Single pump units", table.label(), table.unit_count())
            }
        };
        out.push(line);
    }
    let total_units: usize = tables.iter().map(PumpTable::unit_count).sum();
    out.push(format!("Total units tested: {}", total_units));
    out.push(format!("Total individual pumps: {}", individual));
    out.blank();
}

fn push_condition(out: &mut ReportText, condition: Condition, stat: &AmperageStat) {
    out.push(format!("{} Conditions:", condition.title()));
    if !stat.has_data() {
        out.push("  No data available");
        return;
    }

    out.push(format!("  Minimum amperage: {:.2} A", stat.minimum));
    out.push(format!("  Maximum amperage: {:.2} A", stat.maximum));

    if !stat.tandem_matches.is_empty() {
        out.push("  Tandem pump matching analysis:");
        out.push(format!("    - Total tandem units: {}", stat.tandem_matches.len()));
        out.push(format!(
            "    - Units with >10% P1/P2 difference: {}",
            stat.mismatched(AMP_MISMATCH_PCT).count()
        ));
        match stat.worst_mismatch(AMP_MISMATCH_PCT) {
            Some(worst) => out.push(format!(
                "    - Worst mismatch: {:.1}% (Unit {})",
                worst.percentage_difference, worst.unit_id
            )),
            None => out.push("    - All tandem units within 10% tolerance"),
        }
    }
    out.push(format!("  Total units analyzed: {}", stat.unit_count));
}

fn push_efficiency(out: &mut ReportText, tables: &[PumpTable], efficiency: &EfficiencyAnalysis) {
    out.push("EFFICIENCY ANALYSIS:");
    out.push("-".repeat(20));
    out.push(format!(
        "Individual pump efficiencies analyzed: {}",
        efficiency.total_individual_readings
    ));
    out.blank();
    for band in Band::ALL {
        out.push(format!(
            "{:<15}{} pumps",
            band.label(),
            efficiency.counts.get(band)
        ));
    }

    let has_tandem = tables.iter().any(PumpTable::is_tandem);
    if !has_tandem || efficiency.tandem_matches.is_empty() {
        return;
    }

    out.blank();
    out.push("TANDEM PUMP MATCHING (P1 vs P2):");
    out.push("-".repeat(33));
    out.push(format!(
        "Total tandem units analyzed: {}",
        efficiency.tandem_matches.len()
    ));
    out.push(format!(
        "Average efficiency difference: {:.2}%",
        efficiency.average_difference()
    ));
    out.push(format!(
        "Units with >3% efficiency difference: {}",
        efficiency.mismatched(EFF_MISMATCH_POINTS).count()
    ));
    match efficiency.worst_mismatch(EFF_MISMATCH_POINTS) {
        Some(worst) => out.push(format!(
            "Worst efficiency mismatch: {:.2}% (Unit {})",
            worst.absolute_difference, worst.unit_id
        )),
        None => out.push("All tandem units within 3% efficiency tolerance"),
    }
}

/// Machine-readable counterpart of the report, written as JSON.
pub fn build_summary(
    tables: &[PumpTable],
    amperage: &AmperageAnalysis,
    efficiency: &EfficiencyAnalysis,
    generated_at: DateTime<Utc>,
) -> ReportSummary {
    let tables_out: Vec<TableSummary> = tables
        .iter()
        .map(|t| TableSummary {
            label: t.label().to_string(),
            configuration: t.configuration(),
            units: t.unit_count(),
        })
        .collect();

    let amperage_out = Condition::ALL
        .into_iter()
        .map(|condition| {
            let stat = amperage.get(condition);
            ConditionSummary {
                condition,
                minimum_amp: stat.minimum,
                maximum_amp: stat.maximum,
                units_analyzed: stat.unit_count,
                tandem_matches: stat.tandem_matches.len(),
                mismatched_units: stat.mismatched(AMP_MISMATCH_PCT).count(),
            }
        })
        .collect();

    let tandem_efficiency = if efficiency.tandem_matches.is_empty() {
        None
    } else {
        let worst = efficiency.worst_mismatch(EFF_MISMATCH_POINTS);
        Some(TandemEfficiencySummary {
            units_analyzed: efficiency.tandem_matches.len(),
            average_difference: efficiency.average_difference(),
            mismatched_units: efficiency.mismatched(EFF_MISMATCH_POINTS).count(),
            worst_unit: worst.map(|w| w.unit_id.clone()),
            worst_difference: worst.map(|w| w.absolute_difference),
        })
    };

    ReportSummary {
        generated_at: generated_at.to_rfc3339(),
        total_units: tables_out.iter().map(|t| t.units).sum(),
        tables: tables_out,
        total_individual_pumps: efficiency.total_individual_readings,
        amperage: amperage_out,
        efficiency_bands: BandSummary {
            from_90_to_92: efficiency.counts.from_90_to_92,
            from_92_to_94: efficiency.counts.from_92_to_94,
            from_94: efficiency.counts.from_94,
        },
        tandem_efficiency,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amperage::analyze_amperage;
    use crate::efficiency::analyze_efficiency;
    use crate::types::{Field, PumpRecord, Side};
    use chrono::TimeZone;

    fn report_for(tables: &[PumpTable]) -> ReportText {
        let amp = analyze_amperage(tables);
        let eff = analyze_efficiency(tables);
        assemble_report(tables, &amp, &eff)
    }

    #[test]
    fn empty_run_renders_fixed_skeleton() {
        let text = report_for(&[]).to_string();
        let expected = [
            "PUMP PERFORMANCE TEST REPORT",
            "==================================================",
            "",
            "PUMP CONFIGURATION ANALYSIS:",
            "----------------------------",
            "Total units tested: 0",
            "Total individual pumps: 0",
            "",
            "AMPERAGE ANALYSIS:",
            "------------------",
            "0 Bar Conditions:",
            "  No data available",
            "",
            "200 Bar Conditions:",
            "  No data available",
            "",
            "EFFICIENCY ANALYSIS:",
            "--------------------",
            "Individual pump efficiencies analyzed: 0",
            "",
            "90% - 92%:     0 pumps",
            "92% - 94%:     0 pumps",
            "94% and above: 0 pumps",
        ]
        .join("\n");
        assert_eq!(text, expected);
    }

    #[test]
    fn single_table_amperage_block() {
        let records = vec![
            PumpRecord::default().with(Field::Amp(Condition::ZeroBar, Side::P1), 4.0),
            PumpRecord::default().with(Field::Amp(Condition::ZeroBar, Side::P1), 5.127),
        ];
        let table = PumpTable::new("SinglePump", ["0 Bar Amp P1"], records);
        let report = report_for(&[table]);
        let lines = report.lines();

        let at = lines.iter().position(|l| l == "0 Bar Conditions:").unwrap();
        assert_eq!(lines[at + 1], "  Minimum amperage: 4.00 A");
        assert_eq!(lines[at + 2], "  Maximum amperage: 5.13 A");
        assert_eq!(lines[at + 3], "  Total units analyzed: 2");
        assert!(lines.contains(&"SinglePump: 2 Single pump units".to_string()));
        assert!(!lines.iter().any(|l| l.starts_with("TANDEM PUMP MATCHING")));
    }

    #[test]
    fn low_efficiency_is_analyzed_but_not_banded() {
        let records = vec![PumpRecord::default().with(Field::Eff(Side::P1), 50.0)];
        let table = PumpTable::new("SinglePump", ["Eff%P1"], records);
        let report = report_for(&[table]);
        let lines = report.lines();

        assert!(lines.contains(&"Individual pump efficiencies analyzed: 1".to_string()));
        assert!(lines.contains(&"90% - 92%:     0 pumps".to_string()));
        assert!(lines.contains(&"92% - 94%:     0 pumps".to_string()));
        assert!(lines.contains(&"94% and above: 0 pumps".to_string()));
    }

    #[test]
    fn tandem_within_tolerance() {
        let rec = |s: &str, a: f64, b: f64, e1: f64, e2: f64| {
            PumpRecord::default()
                .with_serial(s)
                .with(Field::Amp(Condition::ZeroBar, Side::P1), a)
                .with(Field::Amp(Condition::ZeroBar, Side::P2), b)
                .with(Field::Eff(Side::P1), e1)
                .with(Field::Eff(Side::P2), e2)
        };
        let table = PumpTable::new(
            "TandemPump",
            ["Pump Sr. No", "Eff%P1", "Eff%P2", "0 Bar Amp P1", "0 Bar Amp P2"],
            vec![rec("T1", 10.0, 10.5, 92.0, 93.0), rec("T2", 11.0, 10.2, 94.0, 95.5)],
        );
        let report = report_for(&[table]);
        let lines = report.lines();

        assert!(lines.contains(&"TandemPump: 2 Tandem units (each with 2 pumps)".to_string()));
        assert!(lines.contains(&"    - Units with >10% P1/P2 difference: 0".to_string()));
        assert!(lines.contains(&"    - All tandem units within 10% tolerance".to_string()));
        assert!(lines.contains(&"Average efficiency difference: 1.25%".to_string()));
        assert_eq!(
            lines.last().map(String::as_str),
            Some("All tandem units within 3% efficiency tolerance")
        );
    }

    #[test]
    fn summary_mirrors_report_numbers() {
        let table = PumpTable::new(
            "TandemPump",
            ["Eff%P1", "Eff%P2"],
            vec![PumpRecord::default()
                .with(Field::Eff(Side::P1), 90.0)
                .with(Field::Eff(Side::P2), 95.0)],
        );
        let tables = [table];
        let amp = analyze_amperage(&tables);
        let eff = analyze_efficiency(&tables);
        let at = Utc.with_ymd_and_hms(2024, 9, 2, 8, 30, 0).unwrap();
        let summary = build_summary(&tables, &amp, &eff, at);

        assert_eq!(summary.generated_at, "2024-09-02T08:30:00+00:00");
        assert_eq!(summary.total_units, 1);
        assert_eq!(summary.total_individual_pumps, 2);
        assert_eq!(summary.efficiency_bands.from_90_to_92, 1);
        assert_eq!(summary.efficiency_bands.from_94, 1);
        let tandem = summary.tandem_efficiency.unwrap();
        assert_eq!(tandem.worst_unit.as_deref(), Some("Unit_1"));
        assert_eq!(tandem.mismatched_units, 1);
        assert_eq!(summary.amperage[0].units_analyzed, 0);
    }
}

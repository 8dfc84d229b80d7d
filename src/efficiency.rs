use crate::types::{Configuration, Field, PumpTable, Side};
use log::debug;
use serde::Serialize;

/// Efficiency distribution band. Boundaries are half-open: 90.0, 92.0 and
/// 94.0 belong to the higher band. Readings below 90 fall in no band.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    From90To92,
    From92To94,
    From94,
}

impl Band {
    pub const ALL: [Band; 3] = [Band::From90To92, Band::From92To94, Band::From94];

    pub fn of(value: f64) -> Option<Band> {
        if value < 90.0 {
            None
        } else if value < 92.0 {
            Some(Band::From90To92)
        } else if value < 94.0 {
            Some(Band::From92To94)
        } else {
            Some(Band::From94)
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Band::From90To92 => "90% - 92%:",
            Band::From92To94 => "92% - 94%:",
            Band::From94 => "94% and above:",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EfficiencyCounts {
    pub from_90_to_92: usize,
    pub from_92_to_94: usize,
    pub from_94: usize,
}

impl EfficiencyCounts {
    pub fn add(&mut self, value: f64) {
        match Band::of(value) {
            Some(Band::From90To92) => self.from_90_to_92 += 1,
            Some(Band::From92To94) => self.from_92_to_94 += 1,
            Some(Band::From94) => self.from_94 += 1,
            None => {}
        }
    }

    pub fn get(&self, band: Band) -> usize {
        match band {
            Band::From90To92 => self.from_90_to_92,
            Band::From92To94 => self.from_92_to_94,
            Band::From94 => self.from_94,
        }
    }

    #[cfg(test)]
    pub fn total(&self) -> usize {
        self.from_90_to_92 + self.from_92_to_94 + self.from_94
    }

    fn merge(self, other: EfficiencyCounts) -> Self {
        EfficiencyCounts {
            from_90_to_92: self.from_90_to_92 + other.from_90_to_92,
            from_92_to_94: self.from_92_to_94 + other.from_92_to_94,
            from_94: self.from_94 + other.from_94,
        }
    }
}

/// P1 vs P2 efficiency comparison for one tandem unit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TandemEffMatch {
    #[serde(rename = "Unit")]
    pub unit_id: String,
    #[serde(rename = "P1Eff")]
    pub p1_eff: f64,
    #[serde(rename = "P2Eff")]
    pub p2_eff: f64,
    #[serde(rename = "Difference")]
    pub absolute_difference: f64,
    #[serde(rename = "AverageEff")]
    pub average_efficiency: f64,
}

impl TandemEffMatch {
    pub fn new(unit_id: impl Into<String>, p1_eff: f64, p2_eff: f64) -> Option<Self> {
        if p1_eff <= 0.0 || p2_eff <= 0.0 {
            return None;
        }
        Some(TandemEffMatch {
            unit_id: unit_id.into(),
            p1_eff,
            p2_eff,
            absolute_difference: (p1_eff - p2_eff).abs(),
            average_efficiency: (p1_eff + p2_eff) / 2.0,
        })
    }
}

/// Band counts, individual reading total and tandem matches for a run.
///
/// `total_individual_readings` counts every positive reading, including
/// those below 90 that no band holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EfficiencyAnalysis {
    pub counts: EfficiencyCounts,
    pub total_individual_readings: usize,
    pub tandem_matches: Vec<TandemEffMatch>,
}

impl EfficiencyAnalysis {
    pub fn from_table(table: &PumpTable) -> Self {
        let mut out = EfficiencyAnalysis::default();
        let p1 = Field::Eff(Side::P1);
        let p2 = Field::Eff(Side::P2);

        match table.configuration() {
            Configuration::Single => {
                if !table.has_field(p1) {
                    debug!("{}: no {} column, no efficiency readings", table.label(), p1.column());
                    return out;
                }
                for value in table.records().iter().filter_map(|r| r.positive(p1)) {
                    out.counts.add(value);
                    out.total_individual_readings += 1;
                }
            }
            Configuration::Tandem => {
                for (idx, record) in table.records().iter().enumerate() {
                    let a = record.reading(p1).unwrap_or(0.0);
                    let b = record.reading(p2).unwrap_or(0.0);
                    // One-sided readings on a tandem unit are dropped entirely.
                    let Some(m) = TandemEffMatch::new(record.unit_id(idx), a, b) else {
                        continue;
                    };
                    out.counts.add(a);
                    out.counts.add(b);
                    out.total_individual_readings += 2;
                    out.tandem_matches.push(m);
                }
            }
        }
        out
    }

    pub fn merge(self, other: EfficiencyAnalysis) -> Self {
        let mut tandem_matches = self.tandem_matches;
        tandem_matches.extend(other.tandem_matches);
        EfficiencyAnalysis {
            counts: self.counts.merge(other.counts),
            total_individual_readings: self.total_individual_readings
                + other.total_individual_readings,
            tandem_matches,
        }
    }

    pub fn average_difference(&self) -> f64 {
        let diffs: Vec<f64> = self
            .tandem_matches
            .iter()
            .map(|m| m.absolute_difference)
            .collect();
        crate::util::average(&diffs)
    }

    pub fn mismatched(&self, threshold: f64) -> impl Iterator<Item = &TandemEffMatch> {
        self.tandem_matches
            .iter()
            .filter(move |m| m.absolute_difference > threshold)
    }

    /// Largest absolute difference above `threshold`; first seen wins ties.
    pub fn worst_mismatch(&self, threshold: f64) -> Option<&TandemEffMatch> {
        self.mismatched(threshold).fold(None, |worst, m| match worst {
            Some(w) if w.absolute_difference >= m.absolute_difference => Some(w),
            _ => Some(m),
        })
    }
}

pub fn analyze_efficiency(tables: &[PumpTable]) -> EfficiencyAnalysis {
    tables.iter().fold(EfficiencyAnalysis::default(), |acc, t| {
        acc.merge(EfficiencyAnalysis::from_table(t))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PumpRecord;

    const EFF_P1: Field = Field::Eff(Side::P1);
    const EFF_P2: Field = Field::Eff(Side::P2);

    fn eff(p1: f64, p2: Option<f64>) -> PumpRecord {
        let r = PumpRecord::default().with(EFF_P1, p1);
        match p2 {
            Some(v) => r.with(EFF_P2, v),
            None => r,
        }
    }

    #[test]
    fn boundaries_land_in_higher_band() {
        assert_eq!(Band::of(89.99), None);
        assert_eq!(Band::of(90.0), Some(Band::From90To92));
        assert_eq!(Band::of(91.99), Some(Band::From90To92));
        assert_eq!(Band::of(92.0), Some(Band::From92To94));
        assert_eq!(Band::of(93.999), Some(Band::From92To94));
        assert_eq!(Band::of(94.0), Some(Band::From94));
        assert_eq!(Band::of(100.0), Some(Band::From94));
    }

    #[test]
    fn low_reading_counts_toward_total_only() {
        let table = PumpTable::new("SinglePump", ["Eff%P1"], vec![eff(50.0, None)]);
        let got = analyze_efficiency(&[table]);
        assert_eq!(got.total_individual_readings, 1);
        assert_eq!(got.counts, EfficiencyCounts::default());
    }

    #[test]
    fn single_skips_zero_and_missing() {
        let records = vec![
            eff(91.0, None),
            eff(0.0, None),
            PumpRecord::default(),
            eff(96.5, None),
        ];
        let table = PumpTable::new("SinglePump", ["Eff%P1"], records);
        let got = analyze_efficiency(&[table]);
        assert_eq!(got.total_individual_readings, 2);
        assert_eq!(got.counts.from_90_to_92, 1);
        assert_eq!(got.counts.from_94, 1);
        assert!(got.tandem_matches.is_empty());
    }

    #[test]
    fn single_without_p1_column_contributes_nothing() {
        let table = PumpTable::new("SinglePump", ["Pump Sr. No"], vec![PumpRecord::default()]);
        assert_eq!(analyze_efficiency(&[table]), EfficiencyAnalysis::default());
    }

    #[test]
    fn tandem_pairs_count_twice() {
        let records = vec![eff(93.0, Some(94.5)).with_serial("T-7")];
        let table = PumpTable::new("TandemPump", ["Pump Sr. No", "Eff%P1", "Eff%P2"], records);
        let got = analyze_efficiency(&[table]);
        assert_eq!(got.total_individual_readings, 2);
        assert_eq!(got.counts.from_92_to_94, 1);
        assert_eq!(got.counts.from_94, 1);
        assert_eq!(got.tandem_matches.len(), 1);
        let m = &got.tandem_matches[0];
        assert_eq!(m.unit_id, "T-7");
        assert!((m.absolute_difference - 1.5).abs() < 1e-9);
        assert!((m.average_efficiency - 93.75).abs() < 1e-9);
    }

    #[test]
    fn tandem_one_sided_readings_are_dropped() {
        // Kept as observed: a lone P1 reading on a tandem unit is not counted
        // as a single-pump reading.
        let records = vec![eff(93.0, None), eff(95.0, Some(0.0))];
        let table = PumpTable::new("TandemPump", ["Eff%P1", "Eff%P2"], records);
        let got = analyze_efficiency(&[table]);
        assert_eq!(got.total_individual_readings, 0);
        assert_eq!(got.counts.total(), 0);
        assert!(got.tandem_matches.is_empty());
    }

    #[test]
    fn below_ninety_is_counted_but_not_banded() {
        let single = PumpTable::new(
            "SinglePump",
            ["Eff%P1"],
            vec![eff(90.0, None), eff(92.0, None), eff(94.0, None), eff(88.0, None)],
        );
        let tandem = PumpTable::new(
            "TandemPump",
            ["Eff%P1", "Eff%P2"],
            vec![eff(91.0, Some(95.0)), eff(93.5, Some(85.0))],
        );
        let got = analyze_efficiency(&[single, tandem]);
        assert_eq!(got.total_individual_readings, 8);
        assert_eq!(got.counts.from_90_to_92, 2);
        assert_eq!(got.counts.from_92_to_94, 2);
        assert_eq!(got.counts.from_94, 2);
        assert_eq!(got.counts.total(), 6);
        assert_eq!(got.tandem_matches.len(), 2);
    }

    #[test]
    fn worst_mismatch_by_absolute_difference() {
        let records = vec![
            eff(90.0, Some(95.0)).with_serial("A"),
            eff(95.0, Some(90.0)).with_serial("B"),
            eff(92.0, Some(93.0)).with_serial("C"),
        ];
        let table = PumpTable::new("TandemPump", ["Pump Sr. No", "Eff%P1", "Eff%P2"], records);
        let got = analyze_efficiency(&[table]);
        assert_eq!(got.mismatched(3.0).count(), 2);
        assert_eq!(got.worst_mismatch(3.0).unwrap().unit_id, "A");
        assert!((got.average_difference() - 11.0 / 3.0).abs() < 1e-9);
    }
}

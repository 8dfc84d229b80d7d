use crate::types::{Condition, Configuration, Field, PumpTable, Side};
use log::debug;

/// P1 vs P2 amperage comparison for one tandem unit at one condition.
#[derive(Debug, Clone, PartialEq)]
pub struct TandemAmpMatch {
    pub unit_id: String,
    pub p1_amp: f64,
    pub p2_amp: f64,
    pub absolute_difference: f64,
    pub percentage_difference: f64,
}

impl TandemAmpMatch {
    /// Returns `None` unless both readings are strictly positive.
    pub fn new(unit_id: impl Into<String>, p1_amp: f64, p2_amp: f64) -> Option<Self> {
        if p1_amp <= 0.0 || p2_amp <= 0.0 {
            return None;
        }
        let absolute_difference = (p1_amp - p2_amp).abs();
        let percentage_difference = absolute_difference / p1_amp.max(p2_amp) * 100.0;
        Some(TandemAmpMatch {
            unit_id: unit_id.into(),
            p1_amp,
            p2_amp,
            absolute_difference,
            percentage_difference,
        })
    }
}

/// Finished statistics for one condition.
#[derive(Debug, Clone, PartialEq)]
pub struct AmperageStat {
    pub minimum: f64,
    pub maximum: f64,
    pub unit_count: usize,
    pub tandem_matches: Vec<TandemAmpMatch>,
}

impl AmperageStat {
    /// True when at least one unit was analyzed and a positive reading seen.
    pub fn has_data(&self) -> bool {
        self.unit_count > 0 && self.maximum > 0.0
    }

    pub fn mismatched(&self, threshold_pct: f64) -> impl Iterator<Item = &TandemAmpMatch> {
        self.tandem_matches
            .iter()
            .filter(move |m| m.percentage_difference > threshold_pct)
    }

    /// Largest percentage difference above `threshold_pct`; first seen wins ties.
    pub fn worst_mismatch(&self, threshold_pct: f64) -> Option<&TandemAmpMatch> {
        self.mismatched(threshold_pct).fold(None, |worst, m| match worst {
            Some(w) if w.percentage_difference >= m.percentage_difference => Some(w),
            _ => Some(m),
        })
    }
}

/// Running state for one condition. `None` extremes mean nothing positive
/// has been folded in yet.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionAccumulator {
    minimum: Option<f64>,
    maximum: Option<f64>,
    unit_count: usize,
    matches: Vec<TandemAmpMatch>,
}

impl ConditionAccumulator {
    fn observe(&mut self, value: f64) {
        self.minimum = Some(self.minimum.map_or(value, |m| m.min(value)));
        self.maximum = Some(self.maximum.map_or(value, |m| m.max(value)));
    }

    /// Combine two accumulators. Extremes and counts are order independent;
    /// match entries keep `self` before `other`.
    pub fn merge(mut self, other: ConditionAccumulator) -> Self {
        if let Some(v) = other.minimum {
            self.minimum = Some(self.minimum.map_or(v, |m| m.min(v)));
        }
        if let Some(v) = other.maximum {
            self.maximum = Some(self.maximum.map_or(v, |m| m.max(v)));
        }
        self.unit_count += other.unit_count;
        self.matches.extend(other.matches);
        self
    }

    /// The "no data" sentinel becomes 0 here and nowhere else.
    pub fn finish(self) -> AmperageStat {
        AmperageStat {
            minimum: self.minimum.unwrap_or(0.0),
            maximum: self.maximum.unwrap_or(0.0),
            unit_count: self.unit_count,
            tandem_matches: self.matches,
        }
    }

    fn from_table(table: &PumpTable, condition: Condition) -> Self {
        let mut acc = ConditionAccumulator::default();
        let p1 = Field::Amp(condition, Side::P1);
        let p2 = Field::Amp(condition, Side::P2);

        match table.configuration() {
            Configuration::Single => {
                if !table.has_field(p1) {
                    debug!(
                        "{}: skipping {} amperage (no {} column)",
                        table.label(),
                        condition,
                        p1.column()
                    );
                    return acc;
                }
                for record in table.records() {
                    if let Some(v) = record.positive(p1) {
                        acc.observe(v);
                    }
                }
            }
            Configuration::Tandem => {
                if !table.has_field(p1) || !table.has_field(p2) {
                    debug!(
                        "{}: skipping {} (P1/P2 amperage columns incomplete)",
                        table.label(),
                        condition
                    );
                    return acc;
                }
                for (idx, record) in table.records().iter().enumerate() {
                    let a = record.reading(p1).unwrap_or(0.0);
                    let b = record.reading(p2).unwrap_or(0.0);
                    if let Some(m) = TandemAmpMatch::new(record.unit_id(idx), a, b) {
                        acc.observe(a);
                        acc.observe(b);
                        acc.matches.push(m);
                    }
                }
            }
        }
        acc.unit_count = table.unit_count();
        acc
    }
}

/// Per-condition accumulators for a whole run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AmperageAccumulator {
    zero_bar: ConditionAccumulator,
    two_hundred_bar: ConditionAccumulator,
}

impl AmperageAccumulator {
    pub fn from_table(table: &PumpTable) -> Self {
        AmperageAccumulator {
            zero_bar: ConditionAccumulator::from_table(table, Condition::ZeroBar),
            two_hundred_bar: ConditionAccumulator::from_table(table, Condition::TwoHundredBar),
        }
    }

    pub fn fold_table(self, table: &PumpTable) -> Self {
        self.merge(AmperageAccumulator::from_table(table))
    }

    pub fn merge(self, other: AmperageAccumulator) -> Self {
        AmperageAccumulator {
            zero_bar: self.zero_bar.merge(other.zero_bar),
            two_hundred_bar: self.two_hundred_bar.merge(other.two_hundred_bar),
        }
    }

    pub fn finish(self) -> AmperageAnalysis {
        AmperageAnalysis {
            zero_bar: self.zero_bar.finish(),
            two_hundred_bar: self.two_hundred_bar.finish(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmperageAnalysis {
    pub zero_bar: AmperageStat,
    pub two_hundred_bar: AmperageStat,
}

impl AmperageAnalysis {
    pub fn get(&self, condition: Condition) -> &AmperageStat {
        match condition {
            Condition::ZeroBar => &self.zero_bar,
            Condition::TwoHundredBar => &self.two_hundred_bar,
        }
    }
}

pub fn analyze_amperage(tables: &[PumpTable]) -> AmperageAnalysis {
    tables
        .iter()
        .fold(AmperageAccumulator::default(), AmperageAccumulator::fold_table)
        .finish()
}

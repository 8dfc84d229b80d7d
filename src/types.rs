use crate::classifier;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use tabled::Tabled;

/// Column holding the unit identifier.
pub const COL_SERIAL_NO: &str = "Pump Sr. No";

/// Pump configuration of one table, decided once when the table is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Configuration {
    Single,
    Tandem,
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Configuration::Single => write!(f, "Single"),
            Configuration::Tandem => write!(f, "Tandem"),
        }
    }
}

/// Test pressure point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Condition {
    #[serde(rename = "0_bar")]
    ZeroBar,
    #[serde(rename = "200_bar")]
    TwoHundredBar,
}

impl Condition {
    /// Report order.
    pub const ALL: [Condition; 2] = [Condition::ZeroBar, Condition::TwoHundredBar];

    /// Heading used in the report, e.g. `0 Bar`.
    pub fn title(self) -> &'static str {
        match self {
            Condition::ZeroBar => "0 Bar",
            Condition::TwoHundredBar => "200 Bar",
        }
    }

    pub fn key(self) -> &'static str {
        match self {
            Condition::ZeroBar => "0_bar",
            Condition::TwoHundredBar => "200_bar",
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    P1,
    P2,
}

/// Numeric measurement columns the analyzers understand.
///
/// This is the single place where column names are spelled out; every
/// analyzer goes through `Field::column` instead of building names by hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Eff(Side),
    Amp(Condition, Side),
}

impl Field {
    pub const ALL: [Field; 6] = [
        Field::Eff(Side::P1),
        Field::Eff(Side::P2),
        Field::Amp(Condition::ZeroBar, Side::P1),
        Field::Amp(Condition::ZeroBar, Side::P2),
        Field::Amp(Condition::TwoHundredBar, Side::P1),
        Field::Amp(Condition::TwoHundredBar, Side::P2),
    ];

    pub fn column(self) -> &'static str {
        match self {
            Field::Eff(Side::P1) => "Eff%P1",
            Field::Eff(Side::P2) => "Eff%P2",
            Field::Amp(Condition::ZeroBar, Side::P1) => "0 Bar Amp P1",
            Field::Amp(Condition::ZeroBar, Side::P2) => "0 Bar Amp P2",
            Field::Amp(Condition::TwoHundredBar, Side::P1) => "200 Bar Amp P1",
            Field::Amp(Condition::TwoHundredBar, Side::P2) => "200 Bar Amp P2",
        }
    }
}

/// Every column name the core recognizes; anything else is ignored.
pub static RECOGNIZED_COLUMNS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    let mut cols: HashSet<&'static str> = Field::ALL.iter().map(|f| f.column()).collect();
    cols.insert(COL_SERIAL_NO);
    cols
});

/// One CSV row as it comes off the reader, before numeric cleanup.
#[derive(Debug, Deserialize)]
pub struct RawPumpRow {
    #[serde(rename = "Pump Sr. No")]
    pub serial_no: Option<String>,
    #[serde(rename = "Eff%P1")]
    pub eff_p1: Option<String>,
    #[serde(rename = "Eff%P2")]
    pub eff_p2: Option<String>,
    #[serde(rename = "0 Bar Amp P1")]
    pub amp_0_bar_p1: Option<String>,
    #[serde(rename = "0 Bar Amp P2")]
    pub amp_0_bar_p2: Option<String>,
    #[serde(rename = "200 Bar Amp P1")]
    pub amp_200_bar_p1: Option<String>,
    #[serde(rename = "200 Bar Amp P2")]
    pub amp_200_bar_p2: Option<String>,
}

/// One tested unit. `None` means "no reading", never a measured zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PumpRecord {
    pub serial_no: Option<String>,
    pub eff_p1: Option<f64>,
    pub eff_p2: Option<f64>,
    pub amp_0_bar_p1: Option<f64>,
    pub amp_0_bar_p2: Option<f64>,
    pub amp_200_bar_p1: Option<f64>,
    pub amp_200_bar_p2: Option<f64>,
}

impl PumpRecord {
    pub fn reading(&self, field: Field) -> Option<f64> {
        match field {
            Field::Eff(Side::P1) => self.eff_p1,
            Field::Eff(Side::P2) => self.eff_p2,
            Field::Amp(Condition::ZeroBar, Side::P1) => self.amp_0_bar_p1,
            Field::Amp(Condition::ZeroBar, Side::P2) => self.amp_0_bar_p2,
            Field::Amp(Condition::TwoHundredBar, Side::P1) => self.amp_200_bar_p1,
            Field::Amp(Condition::TwoHundredBar, Side::P2) => self.amp_200_bar_p2,
        }
    }

    /// Reading only if it is strictly positive.
    pub fn positive(&self, field: Field) -> Option<f64> {
        self.reading(field).filter(|v| *v > 0.0)
    }

    /// Identifier shown in the report; `index` is the row position in its table.
    pub fn unit_id(&self, index: usize) -> String {
        match self.serial_no.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_string(),
            _ => format!("Unit_{}", index + 1),
        }
    }
}

#[cfg(test)]
impl PumpRecord {
    pub fn with(mut self, field: Field, value: f64) -> Self {
        let slot = match field {
            Field::Eff(Side::P1) => &mut self.eff_p1,
            Field::Eff(Side::P2) => &mut self.eff_p2,
            Field::Amp(Condition::ZeroBar, Side::P1) => &mut self.amp_0_bar_p1,
            Field::Amp(Condition::ZeroBar, Side::P2) => &mut self.amp_0_bar_p2,
            Field::Amp(Condition::TwoHundredBar, Side::P1) => &mut self.amp_200_bar_p1,
            Field::Amp(Condition::TwoHundredBar, Side::P2) => &mut self.amp_200_bar_p2,
        };
        *slot = Some(value);
        self
    }

    pub fn with_serial(mut self, serial: impl Into<String>) -> Self {
        self.serial_no = Some(serial.into());
        self
    }
}

/// One worksheet's records. The configuration is fixed at construction.
#[derive(Debug, Clone)]
pub struct PumpTable {
    label: String,
    columns: BTreeSet<String>,
    records: Vec<PumpRecord>,
    configuration: Configuration,
}

impl PumpTable {
    pub fn new<I, S>(label: impl Into<String>, columns: I, records: Vec<PumpRecord>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let label = label.into();
        let columns: BTreeSet<String> = columns
            .into_iter()
            .map(|c| c.as_ref().trim().to_string())
            .collect();
        let configuration = classifier::classify(&label, &columns, &records);
        PumpTable {
            label,
            columns,
            records,
            configuration,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn records(&self) -> &[PumpRecord] {
        &self.records
    }

    pub fn configuration(&self) -> Configuration {
        self.configuration
    }

    pub fn is_tandem(&self) -> bool {
        self.configuration == Configuration::Tandem
    }

    /// One row is one unit, whatever the configuration.
    pub fn unit_count(&self) -> usize {
        self.records.len()
    }

    pub fn has_field(&self, field: Field) -> bool {
        self.columns.contains(field.column())
    }
}

/// Row shape for the raw-data preview.
#[derive(Debug, Clone, Tabled)]
pub struct PumpRecordRow {
    #[tabled(rename = "Pump Sr. No")]
    pub unit_id: String,
    #[tabled(rename = "Eff%P1")]
    pub eff_p1: String,
    #[tabled(rename = "Eff%P2")]
    pub eff_p2: String,
    #[tabled(rename = "0 Bar Amp P1")]
    pub amp_0_bar_p1: String,
    #[tabled(rename = "0 Bar Amp P2")]
    pub amp_0_bar_p2: String,
    #[tabled(rename = "200 Bar Amp P1")]
    pub amp_200_bar_p1: String,
    #[tabled(rename = "200 Bar Amp P2")]
    pub amp_200_bar_p2: String,
}

impl PumpRecordRow {
    pub fn from_record(record: &PumpRecord, index: usize) -> Self {
        let cell = |v: Option<f64>| v.map(|x| format!("{:.2}", x)).unwrap_or_default();
        PumpRecordRow {
            unit_id: record.unit_id(index),
            eff_p1: cell(record.eff_p1),
            eff_p2: cell(record.eff_p2),
            amp_0_bar_p1: cell(record.amp_0_bar_p1),
            amp_0_bar_p2: cell(record.amp_0_bar_p2),
            amp_200_bar_p1: cell(record.amp_200_bar_p1),
            amp_200_bar_p2: cell(record.amp_200_bar_p2),
        }
    }
}

/// Flattened amperage match for CSV export.
#[derive(Debug, Serialize, Clone)]
pub struct AmperageMatchRow {
    #[serde(rename = "Condition")]
    pub condition: Condition,
    #[serde(rename = "Unit")]
    pub unit_id: String,
    #[serde(rename = "P1Amp")]
    pub p1_amp: f64,
    #[serde(rename = "P2Amp")]
    pub p2_amp: f64,
    #[serde(rename = "Difference")]
    pub absolute_difference: f64,
    #[serde(rename = "DifferencePct")]
    pub percentage_difference: f64,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TableSummary {
    pub label: String,
    pub configuration: Configuration,
    pub units: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ConditionSummary {
    pub condition: Condition,
    pub minimum_amp: f64,
    pub maximum_amp: f64,
    pub units_analyzed: usize,
    pub tandem_matches: usize,
    pub mismatched_units: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct BandSummary {
    #[serde(rename = "90_to_92")]
    pub from_90_to_92: usize,
    #[serde(rename = "92_to_94")]
    pub from_92_to_94: usize,
    #[serde(rename = "94_plus")]
    pub from_94: usize,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TandemEfficiencySummary {
    pub units_analyzed: usize,
    pub average_difference: f64,
    pub mismatched_units: usize,
    pub worst_unit: Option<String>,
    pub worst_difference: Option<f64>,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct ReportSummary {
    pub generated_at: String,
    pub tables: Vec<TableSummary>,
    pub total_units: usize,
    pub total_individual_pumps: usize,
    pub amperage: Vec<ConditionSummary>,
    pub efficiency_bands: BandSummary,
    pub tandem_efficiency: Option<TandemEfficiencySummary>,
}

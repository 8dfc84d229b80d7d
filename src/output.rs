use crate::amperage::AmperageAnalysis;
use crate::efficiency::EfficiencyAnalysis;
use crate::report::ReportText;
use crate::types::{AmperageMatchRow, Condition, PumpRecordRow, PumpTable};
use serde::Serialize;
use std::error::Error;
use std::path::Path;
use tabled::{settings::Style, Table, Tabled};

pub fn write_csv<T: Serialize>(path: &Path, rows: &[T]) -> Result<(), Box<dyn Error>> {
    let mut wtr = csv::Writer::from_path(path)?;
    for r in rows {
        wtr.serialize(r)?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

/// Write the report text, optionally headed by customer/order lines.
pub fn write_report(
    path: &Path,
    report: &ReportText,
    customer: Option<&str>,
    order: Option<&str>,
) -> Result<(), Box<dyn Error>> {
    let mut body = String::new();
    if let Some(c) = customer {
        body.push_str(&format!("Customer: {}\n", c));
    }
    if let Some(o) = order {
        body.push_str(&format!("Order No.: {}\n", o));
    }
    if !body.is_empty() {
        body.push('\n');
    }
    body.push_str(&report.to_string());
    body.push('\n');
    std::fs::write(path, body)?;
    Ok(())
}

pub fn amperage_rows(analysis: &AmperageAnalysis) -> Vec<AmperageMatchRow> {
    Condition::ALL
        .into_iter()
        .flat_map(move |condition| {
            analysis
                .get(condition)
                .tandem_matches
                .iter()
                .map(move |m| AmperageMatchRow {
                    condition,
                    unit_id: m.unit_id.clone(),
                    p1_amp: m.p1_amp,
                    p2_amp: m.p2_amp,
                    absolute_difference: m.absolute_difference,
                    percentage_difference: m.percentage_difference,
                })
        })
        .collect()
}

/// Write `amperage_matches.csv` and `efficiency_matches.csv` into `dir`.
pub fn export_matches(
    dir: &Path,
    amperage: &AmperageAnalysis,
    efficiency: &EfficiencyAnalysis,
) -> Result<(), Box<dyn Error>> {
    std::fs::create_dir_all(dir)?;
    write_csv(&dir.join("amperage_matches.csv"), &amperage_rows(amperage))?;
    write_csv(&dir.join("efficiency_matches.csv"), &efficiency.tandem_matches)?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

pub fn preview_pump_table(table: &PumpTable, max_rows: usize) {
    println!("{} Data ({} Pump)\n", table.label(), table.configuration());
    let rows: Vec<PumpRecordRow> = table
        .records()
        .iter()
        .enumerate()
        .map(|(idx, r)| PumpRecordRow::from_record(r, idx))
        .collect();
    preview_table_rows(&rows, max_rows);
}

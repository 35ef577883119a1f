use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use rust_xlsxwriter::Workbook;
use serde::Serialize;

use crate::{
    core::Plan,
    prelude::*,
    quantity::{energy::KilowattHours, power::Kilowatts, rate::KilowattHourRate},
};

#[derive(Serialize)]
struct Row {
    t: usize,
    price: KilowattHourRate,
    charge: Kilowatts,
    discharge: Kilowatts,
    energy: KilowattHours,
    energy_after: KilowattHours,
}

/// Write the plan to the file, in the format given by its extension.
#[instrument(skip_all, fields(path = %path.display()))]
pub fn export(plan: &Plan, path: &Path) -> Result {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    let write: fn(&Plan, File) -> Result = match extension.as_str() {
        "csv" => write_csv,
        "json" => write_json,
        "xlsx" => write_xlsx,
        _ => bail!("unsupported output format: `{}`", path.display()),
    };
    let file =
        File::create(path).with_context(|| format!("failed to create `{}`", path.display()))?;
    write(plan, file).with_context(|| format!("failed to write `{}`", path.display()))?;
    info!("Exported the plan");
    Ok(())
}

/// One row per step, followed by an empty row and the summary.
fn write_csv<W: Write>(plan: &Plan, writer: W) -> Result {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_writer(writer);
    for step in &plan.steps {
        writer.serialize(Row {
            t: step.index,
            price: step.rate,
            charge: step.charge,
            discharge: step.discharge,
            energy: step.energy_before,
            energy_after: step.energy_after,
        })?;
    }
    writer.write_record(None::<&[u8]>)?;
    for (label, value) in summary(plan) {
        writer.serialize((label, value))?;
    }
    writer.flush()?;
    Ok(())
}

/// Same layout as the CSV: header, steps, an empty row, and the summary.
fn write_xlsx(plan: &Plan, file: File) -> Result {
    const HEADER: [&str; 6] = ["t", "price", "charge", "discharge", "energy", "energy_after"];

    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet().set_name("Plan")?;
    for (column, title) in (0..).zip(HEADER) {
        worksheet.write_string(0, column, title)?;
    }
    let mut row = 1;
    for step in &plan.steps {
        let cells = [
            f64::from(u32::try_from(step.index)?),
            step.rate.0,
            step.charge.0,
            step.discharge.0,
            step.energy_before.0,
            step.energy_after.0,
        ];
        for (column, value) in (0..).zip(cells) {
            worksheet.write_number(row, column, value)?;
        }
        row += 1;
    }
    for (label, value) in summary(plan) {
        row += 1;
        worksheet.write_string(row, 0, label)?;
        worksheet.write_number(row, 1, value)?;
    }
    workbook.save_to_writer(file)?;
    Ok(())
}

fn summary(plan: &Plan) -> [(&'static str, f64); 6] {
    let throughput = &plan.throughput;
    [
        ("Profit", plan.profit.0),
        ("Charged energy", throughput.charged.0),
        ("Discharged energy", throughput.discharged.0),
        ("Charge cycles", throughput.charge_cycles()),
        ("Discharge cycles", throughput.discharge_cycles()),
        ("Equivalent cycles (round-trip)", throughput.round_trip_cycles()),
    ]
}

fn write_json<W: Write>(plan: &Plan, writer: W) -> Result {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer_pretty(&mut writer, plan)?;
    writer.flush()?;
    Ok(())
}

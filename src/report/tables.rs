use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    core::Plan,
    quantity::{cost::Cost, power::Kilowatts, rate::KilowattHourRate},
};

fn new_table() -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table
}

fn power_cell(power: Kilowatts, color: Color) -> Cell {
    let cell = Cell::new(power).set_alignment(CellAlignment::Right);
    if power.abs() < Kilowatts(1e-6) { cell.add_attribute(Attribute::Dim) } else { cell.fg(color) }
}

#[must_use]
pub fn build_steps_table(plan: &Plan) -> Table {
    let median_rate = median_rate(plan).unwrap_or(KilowattHourRate::ZERO);

    let mut table = new_table();
    table.set_header(vec!["Step", "Rate", "Charge", "Discharge", "Before", "After", "Profit"]);
    for step in &plan.steps {
        let profit = step.profit();
        table.add_row(vec![
            Cell::new(step.index).add_attribute(Attribute::Dim),
            Cell::new(step.rate).set_alignment(CellAlignment::Right).fg(
                if step.rate >= median_rate { Color::Red } else { Color::Green },
            ),
            power_cell(step.charge, Color::Green),
            power_cell(step.discharge, Color::Red),
            Cell::new(step.energy_before).set_alignment(CellAlignment::Right),
            Cell::new(step.energy_after).set_alignment(CellAlignment::Right),
            Cell::new(profit).set_alignment(CellAlignment::Right).fg(if profit < Cost::ZERO {
                Color::Red
            } else {
                Color::Green
            }),
        ]);
    }
    table
}

#[must_use]
pub fn build_summary_table(plan: &Plan) -> Table {
    let throughput = &plan.throughput;
    let mut table = new_table();
    table.set_header(vec!["Profit", "Charged", "Discharged", "Cycles", "Round-trip cycles"]);
    table.add_row(vec![
        Cell::new(plan.profit).fg(if plan.profit > Cost::ZERO { Color::Green } else { Color::Red }),
        Cell::new(throughput.charged),
        Cell::new(throughput.discharged),
        Cell::new(format!(
            "{:.3} / {:.3}",
            throughput.charge_cycles(),
            throughput.discharge_cycles(),
        )),
        Cell::new(format!("{:.3}", throughput.round_trip_cycles())),
    ]);
    table
}

fn median_rate(plan: &Plan) -> Option<KilowattHourRate> {
    let mut rates: Vec<_> = plan.steps.iter().map(|step| step.rate).collect();
    rates.sort_unstable();
    rates.get(rates.len() / 2).copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        core::{Battery, Optimizer, Outcome},
        quantity::{energy::KilowattHours, power::Kilowatts},
    };

    fn plan() -> Plan {
        let battery = Battery::builder()
            .capacity_max(KilowattHours(10.0))
            .charging_power(Kilowatts(5.0))
            .discharging_power(Kilowatts(5.0))
            .build()
            .unwrap();
        let rates = [KilowattHourRate(1.0), KilowattHourRate(3.0), KilowattHourRate(2.0)];
        match Optimizer::builder().battery(&battery).rates(&rates).optimize() {
            Outcome::Solved(plan) => plan,
            outcome => panic!("unexpected outcome: {outcome:?}"),
        }
    }

    #[test]
    fn test_median_rate() {
        assert_eq!(median_rate(&plan()), Some(KilowattHourRate(2.0)));
    }

    #[test]
    fn test_steps_table() {
        let rendered = build_steps_table(&plan()).to_string();
        assert!(rendered.contains("Discharge"));
        assert!(rendered.contains("3.00 /kWh"));
        assert!(rendered.contains("5.00 kW"));
    }

    #[test]
    fn test_summary_table() {
        let rendered = build_summary_table(&plan()).to_string();
        assert!(rendered.contains("Round-trip cycles"));
        assert!(rendered.contains("10.00"));
        assert!(rendered.contains("0.500"));
    }
}

//! Console and data-log rendering of LT8491 readings.

use crate::lt8491::{
    registers::ScaledValue, CalibrationReadback, ChargerStatus, Telemetry,
};
use chrono::NaiveDateTime;
use std::fmt::Write;
use uom::si::{
    electric_current::ampere, electric_potential::volt, power::watt, ratio::percent,
    thermodynamic_temperature::degree_celsius,
};

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Printout of the calibration read-back, one register per line.
pub fn render_readback(rb: &CalibrationReadback) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<16}0x{:04X}", "Version:", rb.version);
    let _ = writeln!(out, "{:<16}0x{:04X}", "Boot CRC:", rb.boot_crc);
    let _ = writeln!(out, "{:<16}0x{:04X}", "Config CRC:", rb.cfg_crc);
    for (reg, raw) in &rb.values {
        let label = format!("{}:", reg.name);
        match reg.scale {
            Some(scale) => {
                let _ = writeln!(
                    out,
                    "{:<16}0x{:04X} ({:.2} {})",
                    label,
                    raw,
                    ScaledValue::new(*raw, scale).value(),
                    scale.unit.symbol()
                );
            }
            None => {
                let _ = writeln!(out, "{:<16}0x{:04X}", label, raw);
            }
        }
    }
    out
}

/// One cycle's console block.
pub fn render(status: &ChargerStatus, t: &Telemetry) -> String {
    let mut out = String::new();
    let solar = status.supply.solar_state.description();
    if solar.is_empty() {
        out.push('\n');
    } else {
        let _ = writeln!(out, "MPPT: {}", solar);
    }
    if status.charger.charging {
        let _ = writeln!(out, "Charging: {}", status.charger.stage);
    }
    if status.supply.vin_uvlo {
        out.push_str("VIN_UVLO\n");
    }
    if status.charger.fault {
        let _ = writeln!(out, "Fault: 0x{:02X}", status.faults.bits());
    }
    let _ = writeln!(
        out,
        "PV Solar: {:.2}V, {:.2}A, {:.2}W ({:.2}W)",
        t.input_voltage_raw.get::<volt>(),
        t.input_current.get::<ampere>(),
        t.input_power.get::<watt>(),
        t.computed_input_power().get::<watt>()
    );
    let _ = writeln!(
        out,
        "Battery:  {:.2}V, {:.2}A, {:.2}W ({:.2}W)",
        t.battery_voltage.get::<volt>(),
        t.output_current.get::<ampere>(),
        t.output_power.get::<watt>(),
        t.computed_output_power().get::<watt>()
    );
    let _ = writeln!(
        out,
        "Efficiency: {:.1}% ({:.1}%)",
        t.efficiency.get::<percent>(),
        t.computed_efficiency().get::<percent>()
    );
    out
}

/// One data-log record, without the line terminator:
/// `timestamp,vinr,iin,pin,vbat,iout,pout,tbat,eff,cross_check_eff,solar_state,charge_stage`.
pub fn log_line(at: &NaiveDateTime, status: &ChargerStatus, t: &Telemetry) -> String {
    format!(
        "{},{:.2},{:.2},{:.2},{:.2},{:.2},{:.2},{:.1},{:.1},{:.1},{},{}",
        at.format(TIMESTAMP_FORMAT),
        t.input_voltage_raw.get::<volt>(),
        t.input_current.get::<ampere>(),
        t.input_power.get::<watt>(),
        t.battery_voltage.get::<volt>(),
        t.output_current.get::<ampere>(),
        t.output_power.get::<watt>(),
        t.battery_temperature.get::<degree_celsius>(),
        t.efficiency.get::<percent>(),
        t.computed_efficiency().get::<percent>(),
        status.supply.solar_state.label(),
        status.stage_label(),
    )
}

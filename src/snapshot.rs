// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Decoded poll responses and the readings derived from them.
//!
//! A [`Snapshot`] holds one decoded response from the device. Readings are
//! computed on demand and return `None` when the underlying field was not
//! part of the response.
//!
//! Signed flows are split into two non-negative magnitudes:
//!
//! | Field                              | Positive          | Negative          |
//! |------------------------------------|-------------------|-------------------|
//! | `ENERGY.GUI_BAT_DATA_POWER`        | battery charge    | battery discharge |
//! | `ENERGY.GUI_GRID_POW`              | grid import       | grid export       |
//! | `WALLBOX.APPARENT_CHARGING_POWER`  | wallbox charge    | wallbox import    |
//!
//! # Examples
//!
//! ```
//! use senec_lib::Snapshot;
//!
//! let json = serde_json::json!({
//!     "ENERGY": {
//!         "STAT_STATE": "u8_0E",
//!         "GUI_GRID_POW": "fl_C3E10000"
//!     }
//! });
//! let snapshot = Snapshot::from_json(json).unwrap();
//! assert_eq!(snapshot.system_state(), Some("CHARGE"));
//! assert_eq!(snapshot.grid_exported_power(), Some(450.0));
//! assert_eq!(snapshot.grid_imported_power(), Some(0.0));
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::codes;
use crate::error::ParseError;
use crate::value::{self, Value};

/// A decoded response: section name to field name to value.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Snapshot {
    sections: BTreeMap<String, Value>,
}

impl Snapshot {
    /// Decodes a raw JSON response body.
    ///
    /// # Errors
    ///
    /// Returns a [`ParseError`] if a tagged value is malformed or the
    /// response is not a JSON object.
    pub fn from_json(json: serde_json::Value) -> Result<Self, ParseError> {
        match value::decode(json)? {
            Value::Map(sections) => Ok(Self { sections }),
            other => Err(ParseError::UnexpectedFormat(format!(
                "expected an object of sections, got {other:?}"
            ))),
        }
    }

    /// Returns all fields of a section.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&BTreeMap<String, Value>> {
        self.sections.get(name).and_then(Value::as_map)
    }

    /// Returns a single field.
    #[must_use]
    pub fn get(&self, section: &str, field: &str) -> Option<&Value> {
        self.section(section).and_then(|s| s.get(field))
    }

    /// Returns the whole decoded response.
    #[must_use]
    pub fn raw(&self) -> &BTreeMap<String, Value> {
        &self.sections
    }

    /// Consumes the snapshot and returns the decoded response.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.sections
    }

    fn number(&self, section: &str, field: &str) -> Option<f64> {
        self.get(section, field).and_then(Value::as_f64)
    }

    /// First slot of a per-wallbox or per-phase field; a bare scalar is its
    /// own first slot.
    fn first_number(&self, section: &str, field: &str) -> Option<f64> {
        self.get(section, field)
            .and_then(Value::first)
            .and_then(Value::as_f64)
    }

    fn element(&self, section: &str, field: &str, index: usize) -> Option<f64> {
        self.get(section, field)
            .and_then(|v| v.index(index))
            .and_then(Value::as_f64)
    }

    // ========== System ==========

    /// Raw `ENERGY.STAT_STATE` code.
    #[must_use]
    pub fn system_state_code(&self) -> Option<u64> {
        self.get("ENERGY", "STAT_STATE").and_then(Value::as_u64)
    }

    /// Textual system state, `"UNKNOWN"` for unmapped codes.
    #[must_use]
    pub fn system_state(&self) -> Option<&'static str> {
        self.get("ENERGY", "STAT_STATE")
            .map(|v| v.as_u64().map_or(codes::UNKNOWN, codes::system_state_name))
    }

    // ========== House ==========

    /// Current house consumption (W).
    #[must_use]
    pub fn house_power(&self) -> Option<f64> {
        self.number("ENERGY", "GUI_HOUSE_POW")
    }

    /// Total energy used by the house (kWh). Does not include the wallbox.
    #[must_use]
    pub fn house_total_consumption(&self) -> Option<f64> {
        self.number("STATISTIC", "LIVE_HOUSE_CONS")
    }

    // ========== Solar ==========

    /// Current power generated by the solar panels (W).
    ///
    /// The inverter reports generation as a negative value.
    #[must_use]
    pub fn solar_generated_power(&self) -> Option<f64> {
        self.number("ENERGY", "GUI_INVERTER_POWER").map(f64::abs)
    }

    /// Total energy generated by the solar panels (kWh).
    #[must_use]
    pub fn solar_total_generated(&self) -> Option<f64> {
        self.number("STATISTIC", "LIVE_PV_GEN")
    }

    /// Feed-in limitation ratio of the PV inverter (%).
    #[must_use]
    pub fn solar_power_ratio(&self) -> Option<f64> {
        self.number("PV1", "POWER_RATIO")
    }

    // ========== Battery ==========

    /// Battery state of charge (%).
    #[must_use]
    pub fn battery_charge_percent(&self) -> Option<f64> {
        self.number("ENERGY", "GUI_BAT_DATA_FUEL_CHARGE")
    }

    /// Current battery charging power (W), zero while discharging.
    #[must_use]
    pub fn battery_charge_power(&self) -> Option<f64> {
        self.battery_state_power().map(positive_part)
    }

    /// Current battery discharging power (W), zero while charging.
    #[must_use]
    pub fn battery_discharge_power(&self) -> Option<f64> {
        self.battery_state_power().map(negative_magnitude)
    }

    /// Signed battery power (W): positive when charging, negative when
    /// discharging.
    #[must_use]
    pub fn battery_state_power(&self) -> Option<f64> {
        self.number("ENERGY", "GUI_BAT_DATA_POWER")
    }

    /// Battery voltage (V).
    #[must_use]
    pub fn battery_voltage(&self) -> Option<f64> {
        self.number("ENERGY", "GUI_BAT_DATA_VOLTAGE")
    }

    /// Battery current (A).
    #[must_use]
    pub fn battery_current(&self) -> Option<f64> {
        self.number("ENERGY", "GUI_BAT_DATA_CURRENT")
    }

    /// Total energy charged to the battery (kWh).
    #[must_use]
    pub fn battery_total_charged(&self) -> Option<f64> {
        self.number("STATISTIC", "LIVE_BAT_CHARGE")
    }

    /// Total energy discharged from the battery (kWh).
    #[must_use]
    pub fn battery_total_discharged(&self) -> Option<f64> {
        self.number("STATISTIC", "LIVE_BAT_DISCHARGE")
    }

    // ========== Grid ==========

    /// Current power imported from the grid (W).
    #[must_use]
    pub fn grid_imported_power(&self) -> Option<f64> {
        self.grid_state_power().map(positive_part)
    }

    /// Current power exported to the grid (W).
    #[must_use]
    pub fn grid_exported_power(&self) -> Option<f64> {
        self.grid_state_power().map(negative_magnitude)
    }

    /// Signed grid exchange (W): positive on import, negative on export.
    #[must_use]
    pub fn grid_state_power(&self) -> Option<f64> {
        self.number("ENERGY", "GUI_GRID_POW")
    }

    /// Total energy imported from the grid (kWh).
    #[must_use]
    pub fn grid_total_import(&self) -> Option<f64> {
        self.number("STATISTIC", "LIVE_GRID_IMPORT")
    }

    /// Total energy exported to the grid (kWh).
    #[must_use]
    pub fn grid_total_export(&self) -> Option<f64> {
        self.number("STATISTIC", "LIVE_GRID_EXPORT")
    }

    // ========== Wallbox ==========

    /// Signed apparent charging power of the first wallbox (W).
    #[must_use]
    pub fn wallbox_state_power(&self) -> Option<f64> {
        self.first_number("WALLBOX", "APPARENT_CHARGING_POWER")
    }

    /// Power the wallbox is charging with (W).
    #[must_use]
    pub fn wallbox_charge_power(&self) -> Option<f64> {
        self.wallbox_state_power().map(positive_part)
    }

    /// Power flowing back out of the wallbox (W).
    #[must_use]
    pub fn wallbox_import_power(&self) -> Option<f64> {
        self.wallbox_state_power().map(negative_magnitude)
    }

    /// Total wallbox charging power (W), from the per-phase charging
    /// currents and the phase voltages measured by `PM1OBJ1`.
    #[must_use]
    pub fn wallbox_power(&self) -> Option<f64> {
        ["L1_CHARGING_CURRENT", "L2_CHARGING_CURRENT", "L3_CHARGING_CURRENT"]
            .iter()
            .enumerate()
            .map(|(phase, field)| {
                let current = self.first_number("WALLBOX", field)?;
                let voltage = self.element("PM1OBJ1", "U_AC", phase)?;
                Some(current * voltage)
            })
            .sum()
    }

    /// Whether an EV is connected to the first wallbox.
    #[must_use]
    pub fn wallbox_ev_connected(&self) -> Option<bool> {
        self.get("WALLBOX", "EV_CONNECTED")
            .and_then(Value::first)
            .and_then(Value::as_u64)
            .map(|v| v != 0)
    }

    /// Energy charged by the first wallbox (kWh).
    #[must_use]
    pub fn wallbox_energy(&self) -> Option<f64> {
        self.first_number("STATISTIC", "LIVE_WB_ENERGY")
            .map(|wh| wh / 1000.0)
    }

    // ========== Temperatures ==========

    /// Battery temperature (°C).
    #[must_use]
    pub fn battery_temperature(&self) -> Option<f64> {
        self.number("TEMPMEASURE", "BATTERY_TEMP")
    }

    /// Case temperature (°C).
    #[must_use]
    pub fn case_temperature(&self) -> Option<f64> {
        self.number("TEMPMEASURE", "CASE_TEMP")
    }

    /// Controller temperature (°C).
    #[must_use]
    pub fn mcu_temperature(&self) -> Option<f64> {
        self.number("TEMPMEASURE", "MCU_TEMP")
    }
}

fn positive_part(value: f64) -> f64 {
    if value > 0.0 { value } else { 0.0 }
}

fn negative_magnitude(value: f64) -> f64 {
    if value < 0.0 { -value } else { 0.0 }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot::from_json(serde_json::json!({
            "ENERGY": {
                "STAT_STATE": "u8_10",
                "GUI_HOUSE_POW": "fl_43E10000",
                "GUI_INVERTER_POWER": "fl_C4D87000",
                "GUI_BAT_DATA_POWER": "fl_C3E10000",
                "GUI_GRID_POW": "fl_42480000",
                "GUI_BAT_DATA_FUEL_CHARGE": "fl_42480000",
                "GUI_BAT_DATA_VOLTAGE": "fl_4244CCCD",
                "GUI_BAT_DATA_CURRENT": "fl_C1200000",
            },
            "STATISTIC": {
                "LIVE_BAT_CHARGE": "fl_447A0000",
                "LIVE_BAT_DISCHARGE": "fl_44610000",
                "LIVE_GRID_EXPORT": "fl_44FA0000",
                "LIVE_GRID_IMPORT": "fl_43C80000",
                "LIVE_HOUSE_CONS": "fl_44BB8000",
                "LIVE_PV_GEN": "fl_451C4000",
                "LIVE_WB_ENERGY": ["fl_45FA0000", "fl_00000000"],
            },
            "TEMPMEASURE": {
                "BATTERY_TEMP": "fl_41C80000",
                "CASE_TEMP": "fl_42200000",
                "MCU_TEMP": "fl_42480000",
            },
            "PV1": { "POWER_RATIO": "fl_42C80000" },
            "PM1OBJ1": { "U_AC": ["fl_43660000", "fl_43660000", "fl_43660000"] },
            "WALLBOX": {
                "APPARENT_CHARGING_POWER": ["fl_C5000000", "fl_00000000"],
                "L1_CHARGING_CURRENT": ["fl_40000000"],
                "L2_CHARGING_CURRENT": ["fl_40000000"],
                "L3_CHARGING_CURRENT": ["fl_00000000"],
                "EV_CONNECTED": ["u8_01", "u8_00"],
            },
        }))
        .unwrap()
    }

    #[test]
    fn system_state_lookup() {
        let snap = snapshot();
        assert_eq!(snap.system_state_code(), Some(16));
        assert_eq!(snap.system_state(), Some("DISCHARGE"));
    }

    #[test]
    fn unknown_system_state() {
        let snap = Snapshot::from_json(serde_json::json!({
            "ENERGY": { "STAT_STATE": "u8_FF" }
        }))
        .unwrap();
        assert_eq!(snap.system_state(), Some("UNKNOWN"));
    }

    #[test]
    fn absent_fields_read_as_none() {
        let snap = Snapshot::default();
        assert_eq!(snap.system_state(), None);
        assert_eq!(snap.house_power(), None);
        assert_eq!(snap.wallbox_power(), None);
        assert_eq!(snap.wallbox_ev_connected(), None);
    }

    #[test]
    fn house_and_solar() {
        let snap = snapshot();
        assert_eq!(snap.house_power(), Some(450.0));
        assert_eq!(snap.solar_generated_power(), Some(1731.5));
        assert_eq!(snap.solar_total_generated(), Some(2500.0));
        assert_eq!(snap.house_total_consumption(), Some(1500.0));
        assert_eq!(snap.solar_power_ratio(), Some(100.0));
    }

    #[test]
    fn solar_power_is_never_negative() {
        for (raw, expected) in [
            ("fl_C4D87000", 1731.5),
            ("fl_44D87000", 1731.5),
            ("fl_00000000", 0.0),
        ] {
            let snap = Snapshot::from_json(serde_json::json!({
                "ENERGY": { "GUI_INVERTER_POWER": raw }
            }))
            .unwrap();
            assert_eq!(snap.solar_generated_power(), Some(expected));
        }
    }

    #[test]
    fn battery_split() {
        let snap = snapshot();
        assert_eq!(snap.battery_state_power(), Some(-450.0));
        assert_eq!(snap.battery_charge_power(), Some(0.0));
        assert_eq!(snap.battery_discharge_power(), Some(450.0));
        assert_eq!(snap.battery_charge_percent(), Some(50.0));
        assert_eq!(snap.battery_current(), Some(-10.0));
        assert!((snap.battery_voltage().unwrap() - 49.2).abs() < 1e-4);
        assert_eq!(snap.battery_total_charged(), Some(1000.0));
        assert_eq!(snap.battery_total_discharged(), Some(900.0));
    }

    #[test]
    fn grid_split() {
        let snap = snapshot();
        assert_eq!(snap.grid_state_power(), Some(50.0));
        assert_eq!(snap.grid_imported_power(), Some(50.0));
        assert_eq!(snap.grid_exported_power(), Some(0.0));
        assert_eq!(snap.grid_total_import(), Some(400.0));
        assert_eq!(snap.grid_total_export(), Some(2000.0));
    }

    #[test]
    fn split_puts_magnitude_on_one_side() {
        for v in [-1234.5, -0.5, 0.0, 0.5, 987.0] {
            let (pos, neg) = (positive_part(v), negative_magnitude(v));
            assert!(pos >= 0.0 && neg >= 0.0);
            assert!(pos == 0.0 || neg == 0.0);
            assert_eq!(pos + neg, f64::abs(v));
        }
    }

    #[test]
    fn wallbox_readings() {
        let snap = snapshot();
        assert_eq!(snap.wallbox_state_power(), Some(-2048.0));
        assert_eq!(snap.wallbox_charge_power(), Some(0.0));
        assert_eq!(snap.wallbox_import_power(), Some(2048.0));
        // 2 A * 230 V on two phases
        assert_eq!(snap.wallbox_power(), Some(920.0));
        assert_eq!(snap.wallbox_ev_connected(), Some(true));
        assert_eq!(snap.wallbox_energy(), Some(8.0));
    }

    #[test]
    fn scalar_wallbox_fields_read_as_first_slot() {
        let snap = Snapshot::from_json(serde_json::json!({
            "STATISTIC": { "LIVE_WB_ENERGY": "fl_45FA0000" },
            "PM1OBJ1": { "U_AC": ["fl_43660000", "fl_43660000", "fl_43660000"] },
            "WALLBOX": {
                "APPARENT_CHARGING_POWER": "fl_45000000",
                "L1_CHARGING_CURRENT": "fl_40000000",
                "L2_CHARGING_CURRENT": "fl_00000000",
                "L3_CHARGING_CURRENT": "fl_00000000",
                "EV_CONNECTED": "u8_01",
            },
        }))
        .unwrap();
        assert_eq!(snap.wallbox_state_power(), Some(2048.0));
        assert_eq!(snap.wallbox_charge_power(), Some(2048.0));
        assert_eq!(snap.wallbox_power(), Some(460.0));
        assert_eq!(snap.wallbox_ev_connected(), Some(true));
        assert_eq!(snap.wallbox_energy(), Some(8.0));
    }

    #[test]
    fn temperatures() {
        let snap = snapshot();
        assert_eq!(snap.battery_temperature(), Some(25.0));
        assert_eq!(snap.case_temperature(), Some(40.0));
        assert_eq!(snap.mcu_temperature(), Some(50.0));
    }

    #[test]
    fn rejects_non_object_response() {
        let err = Snapshot::from_json(serde_json::json!(["u8_01"])).unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedFormat(_)));
    }

    #[test]
    fn raw_access() {
        let snap = snapshot();
        assert!(snap.raw().contains_key("WALLBOX"));
        assert_eq!(snap.section("PV1").map(BTreeMap::len), Some(1));
        assert_eq!(snap.into_inner().len(), 6);
    }
}

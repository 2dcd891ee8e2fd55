// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Static code tables for system state and system type names.

/// Name returned for any code outside a table.
pub const UNKNOWN: &str = "UNKNOWN";

/// `ENERGY.STAT_STATE` names, indexed by code.
static SYSTEM_STATE_NAMES: [&str; 92] = [
    "INITIAL STATE",
    "ERROR INVERTER COMMUNICATION",
    "ERROR ELECTRICITY METER",
    "RIPPLE CONTROL RECEIVER",
    "INITIAL CHARGE",
    "MAINTENANCE CHARGE",
    "MAINTENANCE READY",
    "MAINTENANCE REQUIRED",
    "MAN. SAFETY CHARGE",
    "SAFETY CHARGE READY",
    "FULL CHARGE",
    "EQUALIZATION: CHARGE",
    "DESULFATATION: CHARGE",
    "BATTERY FULL",
    "CHARGE",
    "BATTERY EMPTY",
    "DISCHARGE",
    "PV + DISCHARGE",
    "GRID + DISCHARGE",
    "PASSIVE",
    "OFF",
    "OWN CONSUMPTION",
    "RESTART",
    "MAN. EQUALIZATION: CHARGE",
    "MAN. DESULFATATION: CHARGE",
    "SAFETY CHARGE",
    "BATTERY PROTECTION MODE",
    "EG ERROR",
    "EG CHARGE",
    "EG DISCHARGE",
    "EG PASSIVE",
    "EG PROHIBIT CHARGE",
    "EG PROHIBIT DISCHARGE",
    "EMERGENCY CHARGE",
    "SOFTWARE UPDATE",
    "NSP ERROR",
    "NSP ERROR: GRID",
    "NSP ERROR: HARDWARE",
    "NO SERVER CONNECTION",
    "BMS ERROR",
    "MAINTENANCE: FILTER",
    "SLEEPING MODE",
    "WAITING EXCESS",
    "CAPACITY TEST: CHARGE",
    "CAPACITY TEST: DISCHARGE",
    "MAN. DESULFATATION: WAIT",
    "MAN. DESULFATATION: READY",
    "MAN. DESULFATATION: ERROR",
    "EQUALIZATION: WAIT",
    "EMERGENCY CHARGE: ERROR",
    "MAN. EQUALIZATION: WAIT",
    "MAN. EQUALIZATION: ERROR",
    "MAN: EQUALIZATION: READY",
    "AUTO. DESULFATATION: WAIT",
    "ABSORPTION PHASE",
    "DC-SWITCH OFF",
    "PEAK-SHAVING: WAIT",
    "ERROR BATTERY INVERTER",
    "NPU-ERROR",
    "BMS OFFLINE",
    "MAINTENANCE CHARGE ERROR",
    "MAN. SAFETY CHARGE ERROR",
    "SAFETY CHARGE ERROR",
    "NO CONNECTION TO MASTER",
    "LITHIUM SAFE MODE ACTIVE",
    "LITHIUM SAFE MODE DONE",
    "BATTERY VOLTAGE ERROR",
    "BMS DC SWITCHED OFF",
    "GRID INITIALIZATION",
    "GRID STABILIZATION",
    "REMOTE SHUTDOWN",
    "OFFPEAK-CHARGE",
    "ERROR HALFBRIDGE",
    "BMS: ERROR OPERATING TEMPERATURE",
    "FACTORY SETTINGS NOT FOUND",
    "BACKUP POWER MODE - ACTIVE",
    "BACKUP POWER MODE - BATTERY EMPTY",
    "BACKUP POWER MODE ERROR",
    "INITIALISING",
    "INSTALLATION MODE",
    "GRID OFFLINE",
    "BMS UPDATE NEEDED",
    "BMS CONFIGURATION NEEDED",
    "INSULATION TEST",
    "SELFTEST",
    "EXTERNAL CONTROL",
    "ERROR: TEMPERATURESENSOR",
    "GRID OPERATOR: CHARGE PROHIBITED",
    "GRID OPERATOR: DISCHARGE PROHIBITED",
    "SPARE CAPACITY",
    "SELFTEST ERROR",
    "EARTH FAULT",
];

/// `FACTORY.SYS_TYPE` names, indexed by code. The flag marks lithium-ion
/// systems, which expose per-module `BAT1OBJn` sections.
static SYSTEM_TYPES: [(&str, bool); 20] = [
    ("SENEC.Home 8.0 / Lead", false),
    ("SENEC.Business 30.0 / Lead", false),
    ("SENEC.Home 5.0 / Lead", false),
    ("SENEC.Home 10.0 / Lead", false),
    ("SENEC.Home 8.0 / Lead (Gen. 2)", false),
    ("SENEC.Home 15.0 / Lead", false),
    ("SENEC.Business 60.0 / Lead", false),
    ("SENEC.Home 4.0 / Lead", false),
    ("SENEC.Home V2 / Li-Ion", true),
    ("SENEC.Home V2 1-phase / Li-Ion", true),
    ("SENEC.Business V2 / Li-Ion", true),
    ("SENEC.Business V2 2-phase / Li-Ion", true),
    ("SENEC.Home V2.1 / Li-Ion", true),
    ("SENEC.Home V2.1 1-phase / Li-Ion", true),
    ("SENEC.Home V3 hybrid", true),
    ("SENEC.Home V3 hybrid duo", true),
    ("SENEC.Home V2.1 hybrid", true),
    ("SENEC.Home V2.1 hybrid duo", true),
    ("SENEC.Home V2.1 / Li-Ion (Gen. 2)", true),
    ("SENEC.Home V4 hybrid", true),
];

/// Returns the display name for an `ENERGY.STAT_STATE` code.
///
/// # Examples
///
/// ```
/// use senec_lib::codes::system_state_name;
///
/// assert_eq!(system_state_name(14), "CHARGE");
/// assert_eq!(system_state_name(9999), "UNKNOWN");
/// ```
#[must_use]
pub fn system_state_name(code: u64) -> &'static str {
    lookup(&SYSTEM_STATE_NAMES, code).copied().unwrap_or(UNKNOWN)
}

/// Returns the display name for a `FACTORY.SYS_TYPE` code.
#[must_use]
pub fn system_type_name(code: u64) -> &'static str {
    lookup(&SYSTEM_TYPES, code).map_or(UNKNOWN, |&(name, _)| name)
}

/// Returns whether a system type reports per-module battery sections.
///
/// Unknown codes are treated as not having them.
#[must_use]
pub fn system_type_has_battery_objects(code: u64) -> bool {
    lookup(&SYSTEM_TYPES, code).is_some_and(|(_, lithium)| *lithium)
}

fn lookup<T>(table: &[T], code: u64) -> Option<&T> {
    usize::try_from(code).ok().and_then(|i| table.get(i))
}

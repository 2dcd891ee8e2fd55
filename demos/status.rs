// SPDX-License-Identifier: MPL-2.0

//! Status example.
//!
//! Prints the current state of a SENEC system: power flows, battery,
//! grid exchange and lifetime totals.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example status -- <host> [--all] [--https]
//! ```
//!
//! With `--all` every section is polled and the raw decoded response is
//! printed as well. This is heavy for the device; do not run it in a loop.
//!
//! With `--https` the device is reached over HTTPS and its self-signed
//! certificate is accepted.

use std::env;

use senec_lib::{HttpConfig, Senec};

fn kw(watts: Option<f64>) -> f64 {
    watts.unwrap_or_default() / 1000.0
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <host> [--all] [--https]", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  cargo run --example status -- 192.168.1.50");
        eprintln!("  cargo run --example status -- senec.local --all");
        eprintln!("  cargo run --example status -- senec.local --https");
        std::process::exit(1);
    }

    let host = &args[1];
    let verbose = args.iter().skip(2).any(|a| a == "--all");
    let https = args.iter().skip(2).any(|a| a == "--https");

    let mut config = HttpConfig::new(host.as_str());
    if https {
        // The device only has a self-signed certificate
        config = config.with_https().accept_invalid_certs();
    }
    let mut senec = Senec::http_config(config).build().await?;

    println!("System type: {}", senec.system_type_name().unwrap_or("UNKNOWN"));

    let snapshot = if verbose {
        senec.poll_all().await?
    } else {
        senec.update().await?
    };

    println!("System state: {}", snapshot.system_state().unwrap_or("UNKNOWN"));
    println!("House energy use: {:.3} kW", kw(snapshot.house_power()));
    println!(
        "Solar Panel generate: {:.3} kW",
        kw(snapshot.solar_generated_power())
    );
    println!(
        "Battery: {:.1} % charge: {:.3} kW, discharge {:.3} kW",
        snapshot.battery_charge_percent().unwrap_or_default(),
        kw(snapshot.battery_charge_power()),
        kw(snapshot.battery_discharge_power())
    );
    println!(
        "Grid: exported {:.3} kW, imported {:.3} kW",
        kw(snapshot.grid_exported_power()),
        kw(snapshot.grid_imported_power())
    );
    if let Some(power) = snapshot.wallbox_charge_power() {
        println!(
            "Wallbox: {:.3} kW, charged {:.3} kWh",
            power / 1000.0,
            snapshot.wallbox_energy().unwrap_or_default()
        );
    }

    println!();
    println!(
        "Total house use {:.3} kWh",
        snapshot.house_total_consumption().unwrap_or_default()
    );
    println!(
        "Total solar generation {:.3} kWh",
        snapshot.solar_total_generated().unwrap_or_default()
    );
    println!(
        "Total grid imported {:.3} kWh, export {:.3} kWh",
        snapshot.grid_total_import().unwrap_or_default(),
        snapshot.grid_total_export().unwrap_or_default()
    );
    println!(
        "Total battery charged {:.3} kWh, discharged {:.3} kWh",
        snapshot.battery_total_charged().unwrap_or_default(),
        snapshot.battery_total_discharged().unwrap_or_default()
    );

    if verbose {
        println!();
        println!("{}", serde_json::to_string_pretty(snapshot)?);
    }

    Ok(())
}

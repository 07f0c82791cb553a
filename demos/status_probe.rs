// SPDX-License-Identifier: MPL-2.0

//! Status probe example.
//!
//! Walks through every read the local API offers and prints the results:
//! battery, photovoltaic, P1 meter, energy system and the operating mode.
//! Device identity is queried when a BLE MAC is given; the device only
//! answers `Marstek.GetDevice` when addressed by its BLE MAC.
//!
//! # Usage
//!
//! ```bash
//! cargo run --example status_probe -- <host> <max_output_w> [ble_mac]
//! ```
//!
//! # Example
//!
//! ```bash
//! cargo run --example status_probe -- 192.168.1.11 800
//! cargo run --example status_probe -- 192.168.1.11 2500 ac4d16a123bc
//! ```

use std::env;

use venusr_lib::VenusDevice;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 3 {
        eprintln!("Usage: {} <host> <max_output_w> [ble_mac]", args[0]);
        eprintln!();
        eprintln!("Examples:");
        eprintln!("  cargo run --example status_probe -- 192.168.1.11 800");
        eprintln!("  cargo run --example status_probe -- 192.168.1.11 2500 ac4d16a123bc");
        std::process::exit(1);
    }

    let host = &args[1];
    let max_output_w: u16 = args[2].parse()?;

    println!("=== Venus Status Probe ===");
    println!("Host: {host}");
    println!();

    let device = VenusDevice::udp(host.clone())
        .with_max_output_power(max_output_w)
        .build()?;

    if let Some(ble_mac) = args.get(3) {
        println!("--- Device ---");
        match device.get_device_info(ble_mac.clone()).await {
            Ok(info) => {
                if let Some(name) = info.device {
                    println!("Model:    {name}");
                }
                if let Some(ver) = info.ver {
                    println!("Firmware: {ver}");
                }
                if let Some(ip) = info.ip {
                    println!("IP:       {ip}");
                }
            }
            Err(error) => println!("Device info unavailable: {error}"),
        }
        println!();
    }

    println!("--- Battery ---");
    match device.get_battery_status().await {
        Ok(battery) => {
            if let Some(soc) = battery.soc {
                println!("State of charge: {soc:.0} %");
            }
            if let Some(temperature) = battery.bat_temp {
                println!("Temperature:     {temperature:.1} °C");
            }
            if let Some(capacity) = battery.bat_capacity {
                println!("Capacity left:   {capacity:.0} Wh");
            }
        }
        Err(error) => println!("Battery status unavailable: {error}"),
    }
    println!();

    println!("--- Photovoltaic ---");
    match device.get_pv_status().await {
        Ok(pv) => match pv.pv_power {
            Some(power) => println!("PV power: {power:.0} W"),
            None => println!("No PV readings reported"),
        },
        Err(error) => println!("PV status unavailable: {error}"),
    }
    println!();

    println!("--- P1 Meter ---");
    match device.get_energy_meter_status().await {
        Ok(meter) => {
            if let Some(total) = meter.total_power {
                println!("Grid power: {total:.0} W");
            }
            if let Some(connected) = meter.ct_state {
                println!(
                    "CT link:    {}",
                    if connected { "connected" } else { "offline" }
                );
            }
        }
        Err(error) => println!("Meter status unavailable: {error}"),
    }
    println!();

    println!("--- Energy System ---");
    match device.get_energy_system_status().await {
        Ok(system) => {
            if let Some(soc) = system.bat_soc {
                println!("Total SOC:       {soc:.0} %");
            }
            if let Some(power) = system.ongrid_power {
                println!("On-grid power:   {power:.0} W");
            }
            if let Some(energy) = system.total_pv_energy {
                println!("PV energy total: {energy:.1} kWh");
            }
        }
        Err(error) => println!("System status unavailable: {error}"),
    }
    println!();

    match device.get_operating_mode().await {
        Ok(mode) => println!("Operating mode: {mode}"),
        Err(error) => println!("Operating mode unavailable: {error}"),
    }

    Ok(())
}

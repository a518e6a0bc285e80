//! Discover LIFX devices on the network and print what is known about each.
//!
//! Run with: cargo run --example discover

use std::time::Duration;
use lifx_lan_rs::{Device, discover_devices};

fn print_device(device: &Device) {
    println!("{} ({}):", device.product_name(), device.ipv4());
    println!("    MAC: {}", device.mac());
    println!(
        "    Firmware: {}.{}",
        device.firmware_major(),
        device.firmware_minor()
    );
    println!("    Label: {}", device.label());
    println!("    Latency: {}ms", device.latency());
    if let Some(color) = device.light_color() {
        println!(
            "    HSBK: {:.0}° {:.0}% {:.0}% {}k",
            color.hue,
            color.saturation * 100.0,
            color.brightness * 100.0,
            color.kelvin
        );
        println!(
            "    Power: {}",
            if device.is_powered() { "On" } else { "Off" }
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("Discovering LIFX devices on the network...");

    let client = discover_devices(Duration::from_secs(2)).await?;
    let controller = client.controller();

    if controller.count() == 0 {
        println!("No devices found on the network.");
        return Ok(());
    }

    println!("Found {} device(s):", controller.count());
    for device in controller.devices() {
        print_device(device);
    }
    Ok(())
}

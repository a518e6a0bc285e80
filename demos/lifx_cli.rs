//! CLI application for controlling LIFX lights.
//!
//! Run with: cargo run --example lifx_cli -- --help

use clap::{Parser, Subcommand};
use std::net::Ipv4Addr;
use std::time::Duration;
use lifx_lan_rs::{Client, DeviceHandle, Hsbk, MacAddress};

#[derive(Parser)]
#[command(name = "lifx-cli")]
#[command(about = "Control LIFX lights from the command line", long_about = None)]
struct Cli {
    /// Only discover this host instead of broadcasting
    #[arg(short, long, global = true)]
    ip: Option<Ipv4Addr>,

    /// How long to wait for devices to answer, in milliseconds
    #[arg(short, long, global = true, default_value = "1500")]
    wait: u64,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every device that answers
    Discover,

    /// Turn a light on
    On {
        mac: MacAddress,
        /// Transition time in milliseconds
        #[arg(short, long, default_value = "0")]
        duration: u32,
    },

    /// Turn a light off
    Off {
        mac: MacAddress,
        #[arg(short, long, default_value = "0")]
        duration: u32,
    },

    /// Set a light's color
    Color {
        mac: MacAddress,
        /// Hue in degrees (0-360)
        hue: f64,
        /// Saturation (0.0-1.0)
        saturation: f64,
        /// Brightness (0.0-1.0)
        brightness: f64,
        /// Color temperature in Kelvin
        #[arg(short, long, default_value = "3500")]
        kelvin: u16,
        #[arg(short, long, default_value = "0")]
        duration: u32,
    },

    /// Dump controller diagnostics as JSON
    Diagnostics,
}

fn find(client: &Client, mac: &MacAddress) -> Result<DeviceHandle, String> {
    client
        .controller()
        .device_by_mac(mac)
        .ok_or_else(|| format!("device {mac} did not answer"))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut client = Client::bind().await?;

    match cli.ip {
        Some(ip) => client.discover_device(ip).await?,
        None => client.discover().await?,
    }
    client.listen(Duration::from_millis(cli.wait)).await?;

    match cli.command {
        Commands::Discover => {
            for device in client.controller().devices() {
                println!(
                    "{}  {:15}  {:24}  {}",
                    device.mac(),
                    device.ipv4().to_string(),
                    device.product_name(),
                    device.label()
                );
            }
        }
        Commands::On { mac, duration } => {
            let handle = find(&client, &mac)?;
            client.set_light_power(handle, true, duration).await?;
            println!("{mac} turned ON");
        }
        Commands::Off { mac, duration } => {
            let handle = find(&client, &mac)?;
            client.set_light_power(handle, false, duration).await?;
            println!("{mac} turned OFF");
        }
        Commands::Color {
            mac,
            hue,
            saturation,
            brightness,
            kelvin,
            duration,
        } => {
            let handle = find(&client, &mac)?;
            let color = Hsbk::new(hue, saturation, brightness, kelvin);
            client.set_light_color(handle, &color, duration).await?;
            println!("{mac} color set");
        }
        Commands::Diagnostics => {
            let diagnostics = client.controller().diagnostics();
            println!("{}", serde_json::to_string_pretty(&diagnostics)?);
        }
    }
    Ok(())
}

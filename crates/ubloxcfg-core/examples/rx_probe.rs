//! Receiver probe tool
//!
//! Connects to a u-blox receiver, prints its version and dumps the messages it
//! sends. Optionally resets the receiver first.
//!
//! Usage:
//!   cargo run --example rx_probe -- [OPTIONS] [TARGET]
//!
//! Options:
//!   --reset MODE      Reset the receiver (hot, warm, cold, default, factory, stop, start, gnss)
//!   --count N         Number of messages to print (default: 20)
//!   --timeout MS      Timeout waiting for a message in ms (default: 2000)
//!   --no-autobaud     Use the baud rate from the target
//!
//! Targets are serial ports (/dev/ttyACM0, ser:///dev/ttyUSB0@115200) or TCP
//! endpoints (tcp://192.168.1.1:2000). Set RUST_LOG=debug for protocol traces.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;
use ubloxcfg_core::receiver::{Receiver, ReceiverOptions, ResetMode, DEFAULT_TIMEOUT_MS};

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args: Vec<String> = std::env::args().collect();

    let mut target = "/dev/ttyACM0".to_string();
    let mut reset: Option<ResetMode> = None;
    let mut count = 20usize;
    let mut timeout_ms = DEFAULT_TIMEOUT_MS;
    let mut options = ReceiverOptions::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--reset" | "-r" => {
                i += 1;
                let mode = args.get(i).context("--reset needs a mode")?;
                reset = Some(mode.parse().map_err(anyhow::Error::msg)?);
            }
            "--count" | "-n" => {
                i += 1;
                count = args.get(i).context("--count needs a number")?.parse()?;
            }
            "--timeout" | "-t" => {
                i += 1;
                timeout_ms = args.get(i).context("--timeout needs a number")?.parse()?;
            }
            "--no-autobaud" => {
                options.autobaud = false;
            }
            "--help" | "-h" => {
                print_help();
                return Ok(());
            }
            arg if !arg.starts_with('-') => {
                target = arg.to_string();
            }
            arg => {
                anyhow::bail!("Unknown option: {}", arg);
            }
        }
        i += 1;
    }

    let mut rx = Receiver::open(&target, options)
        .with_context(|| format!("Failed connecting to {}", target))?;
    println!("Connected to {}", rx.name());
    if let Some(baudrate) = rx.baudrate() {
        println!("Baudrate: {}", baudrate);
    }
    println!("Version: {}", rx.get_ver_str()?);

    if let Some(mode) = reset {
        rx.reset(mode)
            .with_context(|| format!("Failed resetting receiver ({})", mode))?;
        println!("Reset sent ({})", mode);
    }

    let mut printed = 0;
    while printed < count {
        match rx.get_next_message_timeout(Duration::from_millis(timeout_ms))? {
            Some(msg) => {
                println!("{}", msg);
                printed += 1;
            }
            None => {
                println!("No message within {} ms", timeout_ms);
                break;
            }
        }
    }

    let stats = rx.stats();
    println!(
        "{} messages, {} bytes ({} UBX, {} NMEA, {} garbage)",
        stats.total_msgs(),
        stats.total_bytes(),
        stats.ubx_msgs,
        stats.nmea_msgs,
        stats.garbage_msgs
    );

    rx.close();
    Ok(())
}

fn print_help() {
    println!("u-blox receiver probe");
    println!();
    println!("Usage: rx_probe [OPTIONS] [TARGET]");
    println!();
    println!("Options:");
    println!("  -r, --reset MODE   Reset the receiver (hot, warm, cold, default, factory, stop, start, gnss)");
    println!("  -n, --count N      Number of messages to print (default: 20)");
    println!("  -t, --timeout MS   Timeout waiting for a message (default: {})", DEFAULT_TIMEOUT_MS);
    println!("  --no-autobaud      Use the baud rate from the target");
    println!("  -h, --help         Show this help");
}

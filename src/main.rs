use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use lt8491::{
    lt8491::{registers::DEFAULT_ADDRESS, Calibration},
    monitor::{DataLog, Monitor, MonitorConfig},
    report,
    transport::LinuxI2c,
    Lt8491,
};
use std::{io, path::PathBuf, time::Duration};
use tokio::sync::watch;

/// LT8491 - Buck/Boost Battery Charger with MPPT
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// I2C bus device
    #[arg(short, long, default_value = "/dev/i2c-0")]
    port: PathBuf,

    /// I2C address of the charger (hex)
    #[arg(short, long, value_parser = parse_hex_address, default_value = "0x10")]
    address: u8,

    /// Append a CSV record of every cycle to this file
    #[arg(short, long)]
    log: Option<PathBuf>,

    /// Seconds between polls
    #[arg(short, long, default_value_t = 1)]
    interval: u64,

    /// Request a telemetry refresh before each read
    #[arg(short, long)]
    update_telemetry: bool,

    /// Timeout for a single bus transfer, in milliseconds
    #[arg(short, long, default_value_t = 100)]
    timeout_ms: u64,
}

fn parse_hex_address(s: &str) -> Result<u8, String> {
    let s = s.trim();
    let digits = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    let addr = u8::from_str_radix(digits, 16).map_err(|e| e.to_string())?;
    if addr > 0x7F {
        return Err(format!("0x{:02X} is not a 7-bit address", addr));
    }
    Ok(addr)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    println!("LT8491 - Buck/Boost Battery Charger with MPPT");
    println!("\nInitialising device at addr 0x{:02X} on {}", args.address, args.port.display());
    if args.address != DEFAULT_ADDRESS {
        info!("using non-default address 0x{:02X}", args.address);
    }

    let bus = LinuxI2c::open(&args.port).context("opening I2C bus")?;
    let mut device =
        Lt8491::new(bus, args.address).with_timeout(Duration::from_millis(args.timeout_ms));
    let readback = device
        .configure(&Calibration::default())
        .await
        .with_context(|| format!("configuring LT8491 at 0x{:02X}", args.address))?;
    println!("{}", report::render_readback(&readback));

    let config = MonitorConfig {
        interval: Duration::from_secs(args.interval),
        update_telemetry: args.update_telemetry,
    };
    let (stop_tx, stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("interrupted, stopping");
            let _ = stop_tx.send(true);
        } else {
            // keep the sender alive so polling is not cut short
            std::future::pending::<()>().await;
        }
    });

    let monitor = Monitor::new(device, io::stdout(), config);
    match args.log {
        Some(path) => {
            let log = DataLog::append(&path)
                .with_context(|| format!("opening log file {}", path.display()))?;
            info!("logging to {}", path.display());
            monitor.with_log(log).run(stop_rx).await;
        }
        None => {
            let mut monitor = monitor;
            monitor.run(stop_rx).await;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_addresses() {
        assert_eq!(parse_hex_address("10"), Ok(0x10));
        assert_eq!(parse_hex_address("0x1f"), Ok(0x1F));
        assert!(parse_hex_address("0x80").is_err());
        assert!(parse_hex_address("zz").is_err());
    }

    #[test]
    fn defaults() {
        let args = Args::try_parse_from(["lt8491-monitor"]).unwrap();
        assert_eq!(args.port, PathBuf::from("/dev/i2c-0"));
        assert_eq!(args.address, 0x10);
        assert_eq!(args.interval, 1);
        assert!(args.log.is_none());
    }

    #[test]
    fn unknown_flag_is_rejected() {
        assert!(Args::try_parse_from(["lt8491-monitor", "-x"]).is_err());
    }
}

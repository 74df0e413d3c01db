//! The polling loop: read status, read telemetry, report, wait.

use crate::{
    error::Result,
    lt8491::{ChargerStatus, Lt8491, Telemetry},
    report,
    transport::Transport,
};
use chrono::Local;
use log::{error, info, warn};
use std::{
    fs::{File, OpenOptions},
    io::{self, Write},
    path::Path,
    time::Duration,
};
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorConfig {
    /// Pause between the end of one cycle and the start of the next.
    pub interval: Duration,
    /// Ask the part to refresh telemetry before reading it.
    pub update_telemetry: bool,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        MonitorConfig { interval: Duration::from_secs(1), update_telemetry: false }
    }
}

/// Append-only record of every successful cycle.
pub struct DataLog<W> {
    sink: W,
}

impl DataLog<File> {
    pub fn append<P: AsRef<Path>>(path: P) -> io::Result<DataLog<File>> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(DataLog { sink: file })
    }
}

impl<W: Write> DataLog<W> {
    pub fn new(sink: W) -> Self {
        DataLog { sink }
    }

    pub fn record(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.sink, "{}", line)?;
        self.sink.flush()
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub status: ChargerStatus,
    pub telemetry: Telemetry,
}

pub struct Monitor<T, O, L = File> {
    device: Lt8491<T>,
    out: O,
    log: Option<DataLog<L>>,
    config: MonitorConfig,
    cycles: u64,
}

impl<T: Transport, O: Write> Monitor<T, O> {
    /// A monitor printing to `out`. The device should already be configured.
    pub fn new(device: Lt8491<T>, out: O, config: MonitorConfig) -> Self {
        Monitor { device, out, log: None, config, cycles: 0 }
    }
}

impl<T: Transport, O: Write, L: Write> Monitor<T, O, L> {
    pub fn with_log<L2: Write>(self, log: DataLog<L2>) -> Monitor<T, O, L2> {
        Monitor {
            device: self.device,
            out: self.out,
            log: Some(log),
            config: self.config,
            cycles: self.cycles,
        }
    }

    /// Cycles started so far.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn into_parts(self) -> (Lt8491<T>, O, Option<DataLog<L>>) {
        (self.device, self.out, self.log)
    }

    /// Reads one status and telemetry snapshot, status first.
    pub async fn poll(&mut self) -> Result<Snapshot> {
        if self.config.update_telemetry {
            self.device.request_telemetry_update().await?;
        }
        let status = self.device.read_status().await?;
        let telemetry = self.device.read_telemetry().await?;
        Ok(Snapshot { status, telemetry })
    }

    /// Polls once and reports the outcome. Read failures are printed and
    /// returned; nothing is logged for that cycle.
    pub async fn cycle(&mut self) -> Result<Snapshot> {
        self.cycles += 1;
        let snapshot = match self.poll().await {
            Ok(s) => s,
            Err(e) => {
                error!("cycle {}: {}", self.cycles, e);
                if let Err(io) = writeln!(self.out, "Read failed: {}\n", e) {
                    warn!("failed to write output: {}", io);
                }
                return Err(e);
            }
        };

        let text = report::render(&snapshot.status, &snapshot.telemetry);
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            warn!("failed to write output: {}", e);
        }
        if let Some(log) = self.log.as_mut() {
            let now = Local::now().naive_local();
            let line = report::log_line(&now, &snapshot.status, &snapshot.telemetry);
            if let Err(e) = log.record(&line) {
                warn!("failed to append data log: {}", e);
            }
        }
        Ok(snapshot)
    }

    /// Polls until `stop` turns true or its sender goes away. The flag is
    /// checked before every cycle and interrupts the wait between cycles.
    pub async fn run(&mut self, mut stop: watch::Receiver<bool>) {
        loop {
            if *stop.borrow() {
                break;
            }
            let _ = self.cycle().await;
            tokio::select! {
                _ = tokio::time::sleep(self.config.interval) => {}
                changed = stop.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }
        info!("stopped after {} cycles", self.cycles);
    }
}

//! Dissolved-oxygen calibration example
//!
//! Demonstrates a two-point DO calibration driven by a simulated telemetry
//! feed:
//! - Streaming readings into a TelemetryHub
//! - Capturing the saturation points at two temperatures
//! - Comparing uncalibrated and calibrated values
//!
//! Run with: cargo run --example do_calibration
//!
//! Use single-point mode with:
//!   cargo run --example do_calibration -- --single

use aquacal::{
    saturation_from_table, saturation_polynomial, CalibrationPayload, CalibrationSubmitter,
    CalibrationWorkflow, DoCalibrationSession, DoMode, Result, SensorReading, TelemetryHub,
};
use async_trait::async_trait;
use futures::stream;
use std::sync::Arc;

const DEVICE: &str = "demo-tank";

/// Prints payloads instead of sending them anywhere.
struct ConsoleSubmitter;

#[async_trait]
impl CalibrationSubmitter for ConsoleSubmitter {
    async fn submit(&self, device_id: &str, payload: &CalibrationPayload) -> Result<()> {
        println!("POST {}", aquacal::protocol::calibration_path(device_id));
        println!("{}", payload.to_json()?);
        Ok(())
    }
}

/// Feed one reading through the hub and return what a subscriber would see.
async fn feed(hub: &TelemetryHub, voltage_mv: f64, temperature: f64) -> SensorReading {
    let update = (
        DEVICE.to_string(),
        SensorReading::new(voltage_mv, temperature, voltage_mv * 1.24, true),
    );
    hub.ingest(stream::iter(vec![update])).await;
    hub.latest(DEVICE).unwrap_or_default()
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("warn,aquacal=debug")
        .init();

    let single = std::env::args().any(|arg| arg == "--single");
    let mode = if single { DoMode::Single } else { DoMode::Double };

    println!("Dissolved Oxygen Calibration ({})", mode.name());
    println!("=====================================\n");

    println!("=== Saturation ===");
    for t in [10.0, 20.0, 25.0, 30.0] {
        println!(
            "{:>4.1}°C: table {:.2} mg/L, curve {:.2} mg/L",
            t,
            saturation_from_table(t),
            saturation_polynomial(t)
        );
    }
    println!();

    let hub = TelemetryHub::new();
    let workflow = CalibrationWorkflow::new(
        DEVICE,
        DoCalibrationSession::new(mode),
        Arc::new(ConsoleSubmitter),
    );

    let captures: &[(f64, f64)] = match mode {
        DoMode::Single => &[(1580.0, 24.0)],
        DoMode::Double => &[(1720.0, 18.0), (1410.0, 28.0)],
    };

    for (voltage_mv, temperature) in captures {
        let reading = feed(&hub, *voltage_mv, *temperature).await;
        let state = workflow.update(|s| s.capture_point(&reading))??;
        println!(
            "Captured {:.0} mV at {:.1}°C -> {:?}",
            voltage_mv, temperature, state
        );
    }

    println!("\n=== Live Readings ===");
    for (voltage_mv, temperature) in [(1500.0, 22.0), (1200.0, 25.0), (900.0, 26.5)] {
        let reading = feed(&hub, voltage_mv, temperature).await;
        let (raw, calibrated) = workflow.with_session(|s| {
            (s.uncalibrated_value(&reading), s.calibrated_value(&reading))
        });
        println!(
            "{:>6.0} mV @ {:.1}°C: uncalibrated {:.2} mg/L, calibrated {:.2} mg/L",
            voltage_mv, temperature, raw, calibrated
        );
    }

    println!("\n=== Submission ===");
    let latest = hub.reading(DEVICE)?;
    workflow.submit(&latest).await?;
    println!("\nStatus: {}", workflow.status());

    Ok(())
}

//! pH calibration example
//!
//! Walks through a three-buffer pH calibration:
//! - Capturing points from simulated probe readings
//! - Inspecting the fitted model and its quality band
//! - Submitting the result through a submitter that prints the payload
//!
//! Run with: cargo run --example ph_calibration
//!
//! Pass custom buffer voltages (pH 4.01, 6.86, 9.18) with:
//!   cargo run --example ph_calibration -- --voltages 0.181,0.049,-0.072

use aquacal::{
    CalibrationPayload, CalibrationSubmitter, CalibrationWorkflow, PhCalibrationSession,
    ReferenceSource, Result, SensorReading,
};
use async_trait::async_trait;
use std::sync::Arc;

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

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("warn,aquacal=debug")
        .init();

    println!("pH Calibration");
    println!("==============\n");

    // Parse command line arguments
    let args: Vec<String> = std::env::args().collect();
    let voltages: Vec<f64> = args
        .iter()
        .position(|arg| arg == "--voltages")
        .and_then(|i| args.get(i + 1))
        .map(|s| s.split(',').filter_map(|v| v.trim().parse().ok()).collect())
        .unwrap_or_else(|| vec![0.181, 0.049, -0.072]);

    let workflow = CalibrationWorkflow::new(
        "demo-tank",
        PhCalibrationSession::new(),
        Arc::new(ConsoleSubmitter),
    );

    for (index, voltage) in voltages.iter().enumerate() {
        let reading = SensorReading::new(*voltage, 25.0, 0.0, true);
        match workflow.update(|s| s.capture(ReferenceSource::Buffer(index), &reading))? {
            Ok(_) => {
                let buffer = workflow.with_session(|s| s.config().ph_buffer(index));
                println!(
                    "Captured buffer pH {:.2} at {:.3} V",
                    buffer.unwrap_or_default(),
                    voltage
                );
            }
            Err(e) => println!("Skipped point {}: {}", index + 1, e),
        }
    }
    println!();

    let model = workflow.with_session(|s| s.fit())?;
    println!("=== Model ===");
    println!("pH = {:.5} * V + {:.5}", model.slope, model.intercept);

    if let Some(quality) = workflow.with_session(|s| s.quality()) {
        println!(
            "R² = {:.4} ({:.1}%, {})",
            quality.r_squared,
            quality.percent(),
            quality.band().name()
        );
        if quality.needs_warning() {
            println!("Warning: poor fit, check the buffers and probe.");
        }
    }

    println!("\n=== Predictions ===");
    for voltage in [0.2, 0.1, 0.0, -0.1] {
        println!("{:>6.3} V -> pH {:.2}", voltage, model.predict(voltage));
    }

    println!("\n=== Submission ===");
    let live = SensorReading::new(0.05, 25.0, 0.0, true);
    workflow.submit(&live).await?;
    println!("\nStatus: {}", workflow.status());

    Ok(())
}

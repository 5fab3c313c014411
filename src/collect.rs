//! Run orchestration: devices, sessions, engines, aggregation.
//!
//! Devices are visited one at a time, commands one at a time within a
//! device. Each device owns a scoped session, released on every exit path.
//! One device's failure never aborts the others; one command's failure
//! never aborts the device's remaining commands. The engine chain and row
//! normalizer are pure per-(device, command), so fanning devices out to
//! workers only needs per-worker aggregators merged at the end and the
//! shared read-only run timestamp.

use std::path::Path;

use log::{error, info};

use crate::aggregate::{CommandAggregator, RunBatch};
use crate::command::normalize_command;
use crate::device::ClassifiedDevice;
use crate::engine::{EngineChain, EngineContext};
use crate::rows::{normalize_rows, RowMetadata};
use crate::session::{DeviceSession, SessionFactory};

/// Execute every command on every device and aggregate normalized rows
/// into per-command tables.
///
/// The run batch timestamp is captured here, before any device work.
pub async fn collect_tables(
    factory: &dyn SessionFactory,
    devices: &[ClassifiedDevice],
    commands: &[String],
    chain: &EngineChain,
    templates_dir: Option<&Path>,
) -> CommandAggregator {
    let batch = RunBatch::start();
    let mut aggregator = CommandAggregator::new();

    for device in devices {
        let mut session = factory.create(device);

        if let Err(e) = session.connect().await {
            error!("{}: connect failed: {}", device.hostname, e);
            continue;
        }
        info!("{}: connected", device.hostname);

        run_device(
            session.as_mut(),
            device,
            commands,
            chain,
            templates_dir,
            &batch,
            &mut aggregator,
        )
        .await;

        if let Err(e) = session.disconnect().await {
            error!("{}: disconnect failed: {}", device.hostname, e);
        }
    }

    aggregator
}

/// Run all commands on one connected device.
///
/// Failures are contained per command so the rest of the device's queue
/// still runs; the caller releases the session afterwards regardless.
async fn run_device(
    session: &mut dyn DeviceSession,
    device: &ClassifiedDevice,
    commands: &[String],
    chain: &EngineChain,
    templates_dir: Option<&Path>,
    batch: &RunBatch,
    aggregator: &mut CommandAggregator,
) {
    for command in commands {
        let mut ctx = EngineContext::new(session, device, command, templates_dir);

        match chain.run(&mut ctx).await {
            Ok(result) => {
                let meta = RowMetadata::new(device, batch.timestamp(), command, result.tag);
                let rows = normalize_rows(result.rows, &meta);
                aggregator.append(normalize_command(command), rows);
            }
            Err(e) => {
                error!("{}: '{}' failed: {}", device.hostname, command, e);
            }
        }
    }
}

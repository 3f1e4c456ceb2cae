//! Polling service that owns the driver on a dedicated task.
//!
//! The driver itself is synchronous; this task serializes poll cycles
//! with commands from the host so no locking is needed anywhere.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;

use super::driver::FlatPanelDriver;
use super::models::{CoverSwitch, DeviceSnapshot};
use super::{DeviceError, Result};

/// Pause between poll cycles. The next cycle is scheduled after the
/// current one finishes, so a slow cycle delays the next instead of
/// stacking up behind it.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1000);

const COMMAND_CAPACITY: usize = 16;

/// Requests the host glue can send to the driver task.
#[derive(Debug)]
pub enum DriverCommand {
    Connect {
        respond: oneshot::Sender<Result<()>>,
    },
    Disconnect {
        respond: oneshot::Sender<()>,
    },
    CoverSwitch {
        switch: CoverSwitch,
        respond: oneshot::Sender<Result<bool>>,
    },
    SetBrightness {
        requested: i64,
        respond: oneshot::Sender<Result<u16>>,
    },
    Shutdown,
}

/// Cloneable access point to a running driver task.
#[derive(Clone)]
pub struct CoverHandle {
    cmd_tx: mpsc::Sender<DriverCommand>,
    snapshot_rx: watch::Receiver<DeviceSnapshot>,
}

impl CoverHandle {
    pub async fn connect(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(DriverCommand::Connect { respond: tx }).await?;
        rx.await.map_err(|_| DeviceError::ChannelClosed)?
    }

    pub async fn disconnect(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.send(DriverCommand::Disconnect { respond: tx }).await?;
        rx.await.map_err(|_| DeviceError::ChannelClosed)
    }

    /// Forward an update of the cover switch; resolves to true when a
    /// move command went out on the wire.
    pub async fn set_cover_switch(&self, switch: CoverSwitch) -> Result<bool> {
        let (tx, rx) = oneshot::channel();
        self.send(DriverCommand::CoverSwitch {
            switch,
            respond: tx,
        })
        .await?;
        rx.await.map_err(|_| DeviceError::ChannelClosed)?
    }

    /// Request a brightness level; resolves to the clamped value that was
    /// actually transmitted.
    pub async fn set_brightness(&self, requested: i64) -> Result<u16> {
        let (tx, rx) = oneshot::channel();
        self.send(DriverCommand::SetBrightness {
            requested,
            respond: tx,
        })
        .await?;
        rx.await.map_err(|_| DeviceError::ChannelClosed)?
    }

    /// Ask the task to release the port and exit.
    pub async fn shutdown(&self) -> Result<()> {
        self.send(DriverCommand::Shutdown).await
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> DeviceSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    /// Subscribe to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<DeviceSnapshot> {
        self.snapshot_rx.clone()
    }

    async fn send(&self, cmd: DriverCommand) -> Result<()> {
        self.cmd_tx
            .send(cmd)
            .await
            .map_err(|_| DeviceError::ChannelClosed)
    }
}

pub struct CoverService;

impl CoverService {
    /// Spawn the polling task around `driver`. Returns the handle the
    /// host glue talks to and the task's join handle.
    pub fn spawn(driver: FlatPanelDriver) -> (CoverHandle, JoinHandle<()>) {
        let (cmd_tx, cmd_rx) = mpsc::channel(COMMAND_CAPACITY);
        let (snapshot_tx, snapshot_rx) = watch::channel(driver.snapshot());

        let task = tokio::spawn(run(driver, cmd_rx, snapshot_tx));

        (
            CoverHandle {
                cmd_tx,
                snapshot_rx,
            },
            task,
        )
    }
}

async fn run(
    mut driver: FlatPanelDriver,
    mut cmd_rx: mpsc::Receiver<DriverCommand>,
    snapshot_tx: watch::Sender<DeviceSnapshot>,
) {
    log::info!("Flat panel driver task started");

    let poll = tokio::time::sleep(POLL_INTERVAL);
    tokio::pin!(poll);

    loop {
        tokio::select! {
            maybe_cmd = cmd_rx.recv() => {
                match maybe_cmd {
                    Some(DriverCommand::Connect { respond }) => {
                        let result = driver.connect();
                        let _ = snapshot_tx.send(driver.snapshot());
                        let _ = respond.send(result);
                    }
                    Some(DriverCommand::Disconnect { respond }) => {
                        driver.disconnect();
                        let _ = snapshot_tx.send(driver.snapshot());
                        let _ = respond.send(());
                    }
                    Some(DriverCommand::CoverSwitch { switch, respond }) => {
                        let result = driver.handle_cover_switch(switch);
                        if result.is_ok() {
                            let _ = snapshot_tx.send(driver.snapshot());
                        }
                        let _ = respond.send(result);
                    }
                    Some(DriverCommand::SetBrightness { requested, respond }) => {
                        let result = driver.request_brightness(requested);
                        if result.is_ok() {
                            let _ = snapshot_tx.send(driver.snapshot());
                        }
                        let _ = respond.send(result);
                    }
                    Some(DriverCommand::Shutdown) | None => break,
                }
            }
            () = &mut poll => {
                match driver.tick() {
                    Ok(true) => {
                        let _ = snapshot_tx.send(driver.snapshot());
                    }
                    Ok(false) => {}
                    Err(e) => {
                        log::warn!("Poll cycle failed: {}", e);
                        let _ = snapshot_tx.send(driver.snapshot());
                    }
                }
                poll.as_mut().reset(tokio::time::Instant::now() + POLL_INTERVAL);
            }
        }
    }

    driver.disconnect();
    let _ = snapshot_tx.send(driver.snapshot());
    log::info!("Flat panel driver task stopped");
}

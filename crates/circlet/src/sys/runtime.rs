use crate::events::AppEvent;
use async_channel::Sender;
use std::thread;
use std::time::Duration;
use tokio::runtime::Runtime;
use tokio::time::{self, Instant, MissedTickBehavior};

pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

pub fn start_background_services(tx: Sender<AppEvent>) {
    thread::spawn(move || {
        let rt = match Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                log::error!("Failed to create Tokio runtime: {}", e);
                tx.close();
                return;
            }
        };

        rt.block_on(async {
            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::sys::server::run_server(tx).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    crate::config::run_async_watcher(tx).await;
                });
            }

            {
                let tx = tx.clone();
                tokio::spawn(async move {
                    run_frame_ticker(tx).await;
                });
            }

            std::future::pending::<()>().await;
        });
    });
}

/// Sends one [`AppEvent::Frame`] per interval carrying the real time elapsed since the last.
pub async fn run_frame_ticker(tx: Sender<AppEvent>) {
    let mut interval = time::interval(FRAME_INTERVAL);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut last = Instant::now();

    loop {
        let now = interval.tick().await;
        let elapsed = now.saturating_duration_since(last);
        last = now;
        if tx.send(AppEvent::Frame(elapsed)).await.is_err() {
            break;
        }
    }
}

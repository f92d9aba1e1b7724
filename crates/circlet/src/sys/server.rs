use crate::events::AppEvent;
use crate::sys::command::Command;
use async_channel::Sender;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::net::UnixListener;

pub const SOCKET_PATH: &str = "/tmp/circlet.sock";

pub async fn run_server(tx: Sender<AppEvent>) {
    // stale socket from a previous run
    if std::fs::metadata(SOCKET_PATH).is_ok() {
        let _ = std::fs::remove_file(SOCKET_PATH);
    }

    let listener = match UnixListener::bind(SOCKET_PATH) {
        Ok(l) => l,
        Err(e) => {
            log::error!("Failed to bind unix socket: {}", e);
            return;
        }
    };
    log::info!("Listening on {}", SOCKET_PATH);

    loop {
        match listener.accept().await {
            Ok((mut stream, _)) => {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let reader = BufReader::new(&mut stream);
                    let mut lines = reader.lines();

                    while let Ok(Some(line)) = lines.next_line().await {
                        if line.trim().is_empty() {
                            continue;
                        }
                        match line.parse::<Command>() {
                            Ok(command) => {
                                if tx.send(AppEvent::Command(command)).await.is_err() {
                                    return;
                                }
                            }
                            Err(e) => log::warn!("Ignoring control line {:?}: {}", line, e),
                        }
                    }
                });
            }
            Err(e) => {
                log::error!("Failed to accept connection: {}", e);
            }
        }
    }
}

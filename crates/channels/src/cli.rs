//! CLI channel: interactive terminal-based chat.
//!
//! Reads lines from stdin, writes to stdout. Used for `routechat chat`.

use async_trait::async_trait;
use routechat_core::channel::{Channel, ChannelMessage};
use routechat_core::error::ChannelError;
use tokio::io::{self, AsyncBufRead, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::debug;

const SENDER_ID: &str = "local_user";

/// Interactive CLI channel for terminal-based chat.
#[derive(Debug, Default)]
pub struct CliChannel;

impl CliChannel {
    pub fn new() -> Self {
        Self
    }
}

/// Is this line one of the session-ending commands?
pub fn is_exit_command(line: &str) -> bool {
    matches!(line, "exit" | "quit" | "/exit" | "/quit" | ":q")
}

/// Forward non-empty lines from `reader` until EOF or an exit command.
pub fn spawn_line_reader<R>(reader: R) -> mpsc::Receiver<Result<ChannelMessage, ChannelError>>
where
    R: AsyncBufRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(32);

    tokio::spawn(async move {
        let mut lines = reader.lines();

        loop {
            match lines.next_line().await {
                Ok(Some(line)) => {
                    let line = line.trim().to_string();
                    if line.is_empty() {
                        continue;
                    }

                    if is_exit_command(&line) {
                        debug!("Exit command received");
                        break;
                    }

                    let msg = ChannelMessage {
                        sender_id: SENDER_ID.into(),
                        content: line,
                    };

                    if tx.send(Ok(msg)).await.is_err() {
                        break;
                    }
                }
                Ok(None) => break, // EOF (Ctrl+D)
                Err(e) => {
                    let _ = tx.send(Err(ChannelError::ConnectionLost(e.to_string()))).await;
                    break;
                }
            }
        }
    });

    rx
}

#[async_trait]
impl Channel for CliChannel {
    fn name(&self) -> &str {
        "cli"
    }

    async fn start(
        &self,
    ) -> Result<mpsc::Receiver<Result<ChannelMessage, ChannelError>>, ChannelError> {
        Ok(spawn_line_reader(BufReader::new(io::stdin())))
    }

    async fn send(&self, content: &str) -> Result<(), ChannelError> {
        let mut stdout = io::stdout();
        stdout
            .write_all(format!("{content}\n").as_bytes())
            .await
            .map_err(|e| ChannelError::DeliveryFailed(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| ChannelError::DeliveryFailed(e.to_string()))
    }
}

//! Replication messages and their wire framing.
//!
//! Control traffic is newline-delimited JSON: one tagged message per line,
//! which keeps the channel inspectable with netcat when debugging a
//! misbehaving worker.

use std::io;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::users::User;

/// Messages a worker sends to the primary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WorkerMessage {
    /// First message on a fresh control connection.
    Hello { index: usize },

    /// Full post-mutation snapshot of the worker's store.
    StateChanged { users: Vec<User> },
}

/// Messages the primary sends to every worker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PrimaryMessage {
    /// Replace the local store with this snapshot.
    Sync { users: Vec<User> },
}

/// Read the next message, skipping blank lines. `None` means the peer
/// closed the connection.
pub async fn read_message<R, T>(reader: &mut R) -> io::Result<Option<T>>
where
    R: AsyncBufRead + Unpin,
    T: DeserializeOwned,
{
    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            return Ok(None);
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        return serde_json::from_str(trimmed)
            .map(Some)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e));
    }
}

/// Write one message followed by the line delimiter and flush, so peers see
/// snapshots without buffering delay.
pub async fn write_message<W, T>(writer: &mut W, message: &T) -> io::Result<()>
where
    W: AsyncWrite + Unpin,
    T: Serialize,
{
    let mut encoded = serde_json::to_vec(message)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    encoded.push(b'\n');
    writer.write_all(&encoded).await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn sample_users() -> Vec<User> {
        vec![User {
            id: Uuid::new_v4(),
            username: "Vlad".to_string(),
            age: 25,
            hobbies: vec!["gym".to_string()],
        }]
    }

    #[tokio::test]
    async fn snapshot_messages_round_trip() {
        let (mut writer, reader) = tokio::io::duplex(4096);
        let mut reader = tokio::io::BufReader::new(reader);

        let message = WorkerMessage::StateChanged {
            users: sample_users(),
        };
        write_message(&mut writer, &message).await.unwrap();

        let parsed: WorkerMessage = read_message(&mut reader)
            .await
            .unwrap()
            .expect("message expected");
        assert_eq!(parsed, message);
    }

    #[tokio::test]
    async fn closed_connection_reads_as_none() {
        let (writer, reader) = tokio::io::duplex(64);
        drop(writer);
        let mut reader = tokio::io::BufReader::new(reader);

        let parsed: Option<PrimaryMessage> = read_message(&mut reader).await.unwrap();
        assert!(parsed.is_none());
    }

    #[test]
    fn wire_format_is_action_tagged() {
        let encoded = serde_json::to_string(&WorkerMessage::Hello { index: 2 }).unwrap();
        assert_eq!(encoded, r#"{"action":"hello","index":2}"#);

        let encoded =
            serde_json::to_string(&PrimaryMessage::Sync { users: vec![] }).unwrap();
        assert_eq!(encoded, r#"{"action":"sync","users":[]}"#);
    }
}

// src/processor/mod.rs

use anyhow::Result;
use async_trait::async_trait;

use crate::connection::Connection;

/// Seam between the dispatch machinery and whatever understands the bytes
/// on the wire. Request parsing and response construction live behind this
/// trait; the workers only move connections and write the reply back.
#[async_trait]
pub trait ConnectionProcessor: Send + Sync {
    /// Inspect the connection and produce the bytes to write back to the
    /// client. The calling worker writes the reply and closes the
    /// connection afterwards.
    async fn process(&self, conn: &mut Connection) -> Result<Vec<u8>>;
}

/// Answers every connection with the same canned bytes. Stands in until a
/// real protocol handler is plugged in behind the trait.
pub struct StaticResponder {
    reply: Vec<u8>,
}

impl StaticResponder {
    pub fn new(reply: impl Into<Vec<u8>>) -> Self {
        Self {
            reply: reply.into(),
        }
    }
}

#[async_trait]
impl ConnectionProcessor for StaticResponder {
    async fn process(&self, _conn: &mut Connection) -> Result<Vec<u8>> {
        Ok(self.reply.clone())
    }
}

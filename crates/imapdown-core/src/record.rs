//! On-disk record format.
//!
//! A record file is a single-line JSON metadata object, a newline, the
//! separator line `---`, then the message body verbatim:
//!
//! ```text
//! {"Key":"…","MessageID":"<a@x>",…,"Size":"1234","Hash":"…"}
//! ---
//! <raw RFC 5322 message>
//! ```

use blake2::digest::consts::U32;
use blake2::{Blake2b, Digest};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::key::StoreKey;
use crate::message::Envelope;
use crate::{Error, Result};

/// BLAKE2b with a 256-bit digest.
pub type Blake2b256 = Blake2b<U32>;

/// Bytes between the metadata line and the body.
pub const SEPARATOR: &[u8] = b"---\n";

/// Metadata persisted ahead of each body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Record {
    /// Base32 text of the store key; also the file name.
    pub key: String,
    /// Message-ID header.
    #[serde(rename = "MessageID")]
    pub message_id: String,
    /// Parent Message-ID.
    pub in_reply_to: String,
    /// RFC 3339 date; the zero time when unknown.
    pub date: String,
    /// Mailbox the message was archived from, decoded from modified UTF-7.
    pub folder: String,
    /// Subject header.
    pub subject: String,
    /// First sender.
    pub from: String,
    /// Body length in bytes, as decimal text.
    pub size: String,
    /// BLAKE2b-256 of the body.
    #[serde(with = "base64_bytes")]
    pub hash: Vec<u8>,
}

/// Reasons a record file fails to decode or verify.
#[derive(Debug, Error)]
pub enum RecordError {
    /// No `\n---\n` after the metadata line.
    #[error("missing metadata separator")]
    MissingSeparator,
    /// Metadata is not valid JSON for a record.
    #[error("metadata: {0}")]
    Metadata(#[from] serde_json::Error),
    /// `Size` disagrees with the body.
    #[error("size mismatch: record says {recorded}, body has {actual} bytes")]
    Size {
        /// Value of the `Size` field.
        recorded: String,
        /// Measured body length.
        actual: usize,
    },
    /// `Hash` disagrees with the body.
    #[error("hash mismatch")]
    Hash,
}

impl Record {
    /// Builds the record for a message body that has already been hashed.
    #[must_use]
    pub fn new(
        key: &StoreKey,
        folder: &str,
        envelope: &Envelope,
        size: usize,
        hash: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            key: key.to_string(),
            message_id: envelope.message_id.clone(),
            in_reply_to: envelope.in_reply_to.clone(),
            date: envelope.format_date(),
            folder: folder.to_string(),
            subject: envelope.subject.clone(),
            from: envelope.format_from(),
            size: size.to_string(),
            hash: hash.into(),
        }
    }

    /// Digest of `body` as stored in [`Record::hash`].
    #[must_use]
    pub fn digest(body: &[u8]) -> Vec<u8> {
        Blake2b256::digest(body).to_vec()
    }

    /// Serializes the record followed by `body` into the file format.
    pub fn encode(&self, body: &[u8]) -> Result<Vec<u8>> {
        let mut out = serde_json::to_vec(self).map_err(|source| Error::Encoding {
            op: "encode record",
            source,
        })?;
        out.reserve(1 + SEPARATOR.len() + body.len());
        out.push(b'\n');
        out.extend_from_slice(SEPARATOR);
        out.extend_from_slice(body);
        Ok(out)
    }

    /// Splits a record file into its metadata and body.
    pub fn decode(file: &[u8]) -> std::result::Result<(Self, &[u8]), RecordError> {
        let split = file
            .windows(SEPARATOR.len() + 1)
            .position(|w| w[0] == b'\n' && &w[1..] == SEPARATOR)
            .ok_or(RecordError::MissingSeparator)?;
        let record = serde_json::from_slice(&file[..split])?;
        Ok((record, &file[split + 1 + SEPARATOR.len()..]))
    }

    /// Checks `Size` and `Hash` against `body`.
    pub fn verify(&self, body: &[u8]) -> std::result::Result<(), RecordError> {
        if self.size != body.len().to_string() {
            return Err(RecordError::Size {
                recorded: self.size.clone(),
                actual: body.len(),
            });
        }
        if self.hash != Self::digest(body) {
            return Err(RecordError::Hash);
        }
        Ok(())
    }
}

mod base64_bytes {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        STANDARD.decode(text).map_err(serde::de::Error::custom)
    }
}

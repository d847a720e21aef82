use alloy::primitives::Address;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::contracts::encoding::codec::{uint_literal_to_word, uint_to_u64, word_bytes_to_uint};
use crate::contracts::encoding::DecodedResult;
use crate::error::{SocialError, SocialResult};

/// One on-chain post as returned by `getPost`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: u64,
    pub author: Address,
    pub content: String,
    pub timestamp: u64,
    pub likes: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PostView {
    pub id: u64,
    pub author: String,
    pub short_author: String,
    pub content: String,
    pub timestamp: u64,
    pub posted_at: String,
    pub likes: u64,
}

impl Post {
    /// Post id from user input, decimal or `0x` hex. Negative ids are encoding errors.
    pub fn parse_id(text: &str) -> SocialResult<u64> {
        let word = uint_literal_to_word(text)?;
        uint_to_u64(word_bytes_to_uint(&word))
            .map_err(|_| SocialError::Encoding(format!("post id {} is out of range", text.trim())))
    }

    pub fn from_decoded(id: u64, decoded: &DecodedResult) -> SocialResult<Self> {
        Ok(Self {
            id,
            author: decoded.address("author")?,
            content: decoded.string("content")?.to_string(),
            timestamp: uint_to_u64(decoded.uint("timestamp")?)?,
            likes: uint_to_u64(decoded.uint("likes")?)?,
        })
    }

    /// `0x1234…abcd`
    pub fn short_author(&self) -> String {
        let full = self.author.to_checksum(None);
        format!("{}…{}", &full[..6], &full[full.len() - 4..])
    }

    pub fn posted_at(&self) -> Option<DateTime<Utc>> {
        i64::try_from(self.timestamp)
            .ok()
            .and_then(|secs| DateTime::from_timestamp(secs, 0))
    }

    pub fn to_response(&self) -> PostView {
        PostView {
            id: self.id,
            author: self.author.to_checksum(None),
            short_author: self.short_author(),
            content: self.content.clone(),
            timestamp: self.timestamp,
            posted_at: self
                .posted_at()
                .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string())
                .unwrap_or_else(|| "unknown".to_string()),
            likes: self.likes,
        }
    }
}

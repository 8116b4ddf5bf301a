// SPDX-FileCopyrightText: 2026 Souq Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chats that are in the middle of attaching a photo to a product.
//!
//! The table is shared between the bot handlers and the web front. No
//! handler drives it yet; it is the hook for a photo-upload conversation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use souq_core::ChatKey;

/// An upload waiting for its photo.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpload {
    /// Catalog identifier of the product the photo belongs to.
    pub product: String,
    pub started_at: DateTime<Utc>,
}

/// Concurrent chat -> pending upload table. Clones share the same table.
#[derive(Debug, Clone, Default)]
pub struct PendingUploads {
    inner: Arc<DashMap<ChatKey, PendingUpload>>,
}

impl PendingUploads {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `chat` as waiting for a photo of `product`, replacing any
    /// earlier pending upload for that chat.
    pub fn begin(&self, chat: ChatKey, product: impl Into<String>) -> Option<PendingUpload> {
        self.inner.insert(
            chat,
            PendingUpload {
                product: product.into(),
                started_at: Utc::now(),
            },
        )
    }

    /// Removes and returns the pending upload for `chat`.
    pub fn take(&self, chat: ChatKey) -> Option<PendingUpload> {
        self.inner.remove(&chat).map(|(_, upload)| upload)
    }

    pub fn is_pending(&self, chat: ChatKey) -> bool {
        self.inner.contains_key(&chat)
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn begin_then_take() {
        let uploads = PendingUploads::new();
        assert!(uploads.begin(ChatKey(7), "sku-1").is_none());
        assert!(uploads.is_pending(ChatKey(7)));
        assert_eq!(uploads.len(), 1);

        let upload = uploads.take(ChatKey(7)).unwrap();
        assert_eq!(upload.product, "sku-1");
        assert!(!uploads.is_pending(ChatKey(7)));
        assert!(uploads.is_empty());
    }

    #[test]
    fn begin_replaces_previous_upload() {
        let uploads = PendingUploads::new();
        uploads.begin(ChatKey(1), "old");
        let replaced = uploads.begin(ChatKey(1), "new").unwrap();
        assert_eq!(replaced.product, "old");
        assert_eq!(uploads.take(ChatKey(1)).unwrap().product, "new");
    }

    #[test]
    fn clones_share_the_table() {
        let uploads = PendingUploads::new();
        let other = uploads.clone();
        other.begin(ChatKey(3), "sku");
        assert!(uploads.is_pending(ChatKey(3)));
    }

    #[test]
    fn take_unknown_chat_is_none() {
        assert!(PendingUploads::new().take(ChatKey(99)).is_none());
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-browser UI state

use bytes::Bytes;
use lru::LruCache;
use std::num::NonZeroUsize;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use uuid::Uuid;

use super::notice::Notice;
use crate::fish::IdentificationResult;
use crate::vision::{decode_image_bytes, ImageError, ImageInfo};

/// An upload that decoded successfully
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub bytes: Bytes,
    pub info: ImageInfo,
}

/// Transient state of one browser session
#[derive(Debug, Clone, Default)]
pub struct UiSession {
    pub uploaded_file: Option<UploadedFile>,
    /// Bumped on every reset so the upload control renders fresh
    pub uploader_key: u64,
    pub fish_result: Option<IdentificationResult>,
    /// Last location picked, kept for the picker
    pub selected_location: String,
    flash: Vec<Notice>,
}

impl UiSession {
    /// Store an upload if it decodes as PNG/JPEG.
    ///
    /// On failure the stored upload is cleared and a load-error notice is
    /// queued.
    pub fn accept_upload(&mut self, name: &str, bytes: Bytes) -> Result<&UploadedFile, ImageError> {
        match decode_image_bytes(&bytes) {
            Ok((_image, info)) => {
                debug!(
                    "Upload accepted: {} ({}x{}, {} bytes)",
                    name, info.width, info.height, info.size_bytes
                );
                self.fish_result = None;
                let file = self.uploaded_file.insert(UploadedFile {
                    name: name.to_string(),
                    bytes,
                    info,
                });
                Ok(&*file)
            }
            Err(e) => {
                warn!("Upload rejected: {}: {}", name, e);
                self.uploaded_file = None;
                self.push_notice(Notice::error(format!("読み込みエラー: {}", e)));
                Err(e)
            }
        }
    }

    /// "Choose another image": drop the upload and the last result
    pub fn reset(&mut self) {
        self.uploaded_file = None;
        self.fish_result = None;
        self.uploader_key += 1;
    }

    pub fn push_notice(&mut self, notice: Notice) {
        self.flash.push(notice);
    }

    pub fn extend_notices(&mut self, notices: impl IntoIterator<Item = Notice>) {
        self.flash.extend(notices);
    }

    /// Notices queued since the last render; each is shown once
    pub fn take_flash(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.flash)
    }

    pub fn pending_notices(&self) -> &[Notice] {
        &self.flash
    }
}

/// Sessions keyed by cookie id; least recently used sessions are dropped
/// once capacity is reached
pub struct SessionStore {
    sessions: Mutex<LruCache<Uuid, UiSession>>,
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Return `id` if it names a live session, otherwise start a new one
    pub async fn resolve(&self, id: Option<Uuid>) -> Uuid {
        let mut sessions = self.sessions.lock().await;
        if let Some(id) = id {
            if sessions.contains(&id) {
                return id;
            }
        }
        let id = Uuid::new_v4();
        sessions.put(id, UiSession::default());
        debug!("New UI session {}", id);
        id
    }

    /// Run `f` against a session, creating it if it was evicted
    pub async fn with_session<R>(&self, id: Uuid, f: impl FnOnce(&mut UiSession) -> R) -> R {
        let mut sessions = self.sessions.lock().await;
        let session = sessions.get_or_insert_mut(id, UiSession::default);
        f(session)
    }

    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for fish photos
//!
//! This module provides:
//! - PNG/JPEG validation and decoding for uploads
//! - A VLM client that identifies species and drafts regulation summaries
//! - A Cloud Vision client used to verify service-account credentials

pub mod cloud_client;
pub mod image_utils;
pub mod vlm_client;

pub use cloud_client::CloudVisionClient;
pub use image_utils::{
    decode_base64_payload, decode_image_bytes, detect_format, format_to_extension, format_to_mime,
    ImageError, ImageInfo, MAX_IMAGE_SIZE,
};
pub use vlm_client::{extract_json_block, VlmClient, VlmError, VlmReply};

// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Identify API endpoint module
//!
//! Provides POST /v1/identify, the JSON form of the checker flow.

pub mod handler;
pub mod request;

pub use handler::identify_handler;
pub use request::IdentifyRequest;

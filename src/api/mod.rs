// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod errors;
pub mod handlers;
pub mod http_server;
pub mod identify;
pub mod pages;

pub use errors::{ApiError, ErrorResponse};
pub use handlers::{CitiesResponse, CityInfo, HealthResponse};
pub use http_server::{create_app, start_server, AppState};
pub use identify::{identify_handler, IdentifyRequest};
pub use pages::SESSION_COOKIE;

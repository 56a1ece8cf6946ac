// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Presentation layer
//!
//! Holds per-browser session state, validates submissions before any
//! backend call, turns an Identification Result into a view model and
//! renders the page as HTML.

pub mod notice;
pub mod render;
pub mod session;
pub mod submit;
pub mod view;

pub use notice::{Notice, NoticeLevel};
pub use render::{render_page, PageContext, UploadPreview};
pub use session::{SessionStore, UiSession, UploadedFile};
pub use submit::{
    apply_outcome, begin_submit, plan_submit, run_submit, SubmitOutcome, SubmitPlan, SubmitRequest,
};
pub use view::{DetailItem, IdentifiedView, Metric, ResultView};

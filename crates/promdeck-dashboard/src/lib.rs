//! promdeck-dashboard — server-rendered HTML for Promdeck.
//!
//! Turns a [`promdeck_exposition::ParsedMetrics`] into the dashboard page
//! and the stored snapshot listing into the upload page. Rendering is pure
//! string production; the api crate owns routes, status codes, and headers.
//!
//! # Pages
//!
//! | Page | Entry point |
//! |---|---|
//! | Metrics dashboard | [`render_dashboard`] |
//! | Upload form + recent snapshots | [`render_upload_page`] |

pub mod pages;
pub mod views;

pub use pages::{render_dashboard, render_upload_page};
pub use views::{DashboardView, RecentUpload, TCP_SESSIONS_METRIC};

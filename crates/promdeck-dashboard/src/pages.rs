//! Page rendering for the Promdeck dashboard.
//!
//! Pure functions from view types to HTML strings; handlers in the api
//! crate decide status codes and headers. Each page is an Askama template
//! extending `base.html`.

use askama::Template;

use promdeck_store::SnapshotMeta;

use crate::views::{DashboardView, RecentUpload, recent_uploads};

fn render<T: Template>(tmpl: T) -> String {
    tmpl.render()
        .unwrap_or_else(|e| format!("<pre>Template error: {e}</pre>"))
}

#[derive(Template)]
#[template(path = "dashboard.html")]
struct DashboardTemplate {
    view: DashboardView,
}

#[derive(Template)]
#[template(path = "upload.html")]
struct UploadTemplate {
    recent: Vec<RecentUpload>,
}

/// Render the metrics dashboard for one parsed snapshot.
pub fn render_dashboard(view: DashboardView) -> String {
    render(DashboardTemplate { view })
}

/// Render the upload page, listing the stored snapshots newest first.
pub fn render_upload_page(snapshots: &[SnapshotMeta]) -> String {
    render(UploadTemplate {
        recent: recent_uploads(snapshots),
    })
}

use std::convert::Infallible;
use std::path::Path;

use super::error::LaunchError;
use super::layout::LayoutStore;
use super::session::SessionGateway;
use super::slug::{project_name, slugify};

/// Create the session for `project` from `layout` unless it already exists,
/// then hand the terminal over to it.
///
/// On success this never returns; every `Err` is a reason the handoff did
/// not happen. A session left half-built by a failing layout script is not
/// cleaned up.
pub fn launch<G: SessionGateway>(
    gateway: &G,
    layouts: &LayoutStore,
    project: &Path,
    layout: &str,
) -> Result<Infallible, LaunchError> {
    let layout = layouts.get(layout)?;

    let project_str = project.to_string_lossy();
    let session = slugify(&project_str);
    let name = project_name(&project_str);

    if gateway.session_exists(&session) {
        tracing::info!("Session {} already exists, attaching", session);
    } else {
        gateway.create_session(&layout.path, project, &session, &name)?;
    }

    gateway.attach(&session)
}

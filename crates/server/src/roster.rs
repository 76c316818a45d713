//! Roster API endpoints

use api_types::roster::{RosterDepartment, RosterDocument};
use axum::{Extension, Json, extract::State, http::StatusCode};

use crate::{
    ServerError,
    server::{Actor, ServerState},
};

/// Handle requests for reading the roster.
pub async fn get(
    Extension(_actor): Extension<Actor>,
    State(state): State<ServerState>,
) -> Json<RosterDocument> {
    let roster = state.engine.roster().await;
    let departments = roster
        .departments()
        .iter()
        .map(|department| RosterDepartment {
            name: department.name.clone(),
            members: department.members.clone(),
        })
        .collect();

    Json(RosterDocument { departments })
}

/// Handle requests for replacing the roster document.
///
/// Full replace, not merge: clients read-modify-write the whole map.
/// Duplicate department names are rejected with 409 before any write.
pub async fn save(
    Extension(_actor): Extension<Actor>,
    State(state): State<ServerState>,
    Json(payload): Json<RosterDocument>,
) -> Result<StatusCode, ServerError> {
    let departments = payload
        .departments
        .into_iter()
        .map(|department| engine::Department::new(department.name, department.members))
        .collect();
    let roster = engine::Roster::new(departments)?;

    state.engine.save_roster(&roster).await?;
    Ok(StatusCode::NO_CONTENT)
}

use shared::{
    domain::{InternshipId, ProfileId, Role},
    error::ApiError,
    profile::{Internship, StoredInternship, StoredProfile, StudentProfile},
};
use tracing::info;

use crate::{internal, session::Session, ApiContext};

/// Stores a student intake profile after validating it. Internship ids listed
/// on the profile must already exist.
pub async fn create_profile(
    ctx: &ApiContext,
    session: &Session,
    profile: &StudentProfile,
) -> Result<StoredProfile, ApiError> {
    session.require(&[Role::Student])?;
    profile.validate()?;
    for internship_id in &profile.internships {
        let known = ctx
            .documents
            .get_internship(*internship_id)
            .await
            .map_err(internal)?;
        if known.is_none() {
            return Err(ApiError::validation(format!(
                "internship {} does not exist",
                internship_id.0
            )));
        }
    }
    let stored = ctx
        .documents
        .insert_profile(profile)
        .await
        .map_err(internal)?;
    info!(profile_id = stored.id.0, roll_no = stored.profile.roll_no, "profile stored");
    Ok(stored)
}

pub async fn get_profile(
    ctx: &ApiContext,
    session: &Session,
    id: ProfileId,
) -> Result<StoredProfile, ApiError> {
    session.require_authenticated()?;
    ctx.documents
        .get_profile(id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found("profile", id.0))
}

pub async fn create_internship(
    ctx: &ApiContext,
    session: &Session,
    internship: &Internship,
) -> Result<StoredInternship, ApiError> {
    session.require(&[Role::Student])?;
    internship.validate()?;
    let stored = ctx
        .documents
        .insert_internship(internship)
        .await
        .map_err(internal)?;
    info!(
        internship_id = stored.id.0,
        organisation = %stored.internship.organisation,
        "internship stored"
    );
    Ok(stored)
}

pub async fn get_internship(
    ctx: &ApiContext,
    session: &Session,
    id: InternshipId,
) -> Result<StoredInternship, ApiError> {
    session.require_authenticated()?;
    ctx.documents
        .get_internship(id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found("internship", id.0))
}

pub async fn attach_internship(
    ctx: &ApiContext,
    session: &Session,
    profile_id: ProfileId,
    internship_id: InternshipId,
) -> Result<StoredProfile, ApiError> {
    session.require(&[Role::Student])?;
    get_internship(ctx, session, internship_id).await?;
    let stored = ctx
        .documents
        .attach_internship(profile_id, internship_id)
        .await
        .map_err(internal)?
        .ok_or_else(|| ApiError::not_found("profile", profile_id.0))?;
    info!(profile_id = profile_id.0, internship_id = internship_id.0, "internship attached");
    Ok(stored)
}

#[cfg(test)]
#[path = "tests/documents_tests.rs"]
mod tests;

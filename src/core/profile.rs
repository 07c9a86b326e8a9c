//! Profile editing with avatar replacement.
//!
//! The avatar is uploaded to the bucket before the form is saved. Once the profile
//! is written, the previous avatar file is deleted if it was replaced; that cleanup
//! is best-effort and never fails the save.

use crate::{
    core::auth::{ProfileUpdate, SessionContext},
    entities::user,
    errors::Result,
    storage::{FileBucket, file_id_from_url},
};
use sea_orm::ConnectionTrait;
use tracing::{info, warn};

/// The profile form as submitted
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    /// Required display name
    pub full_name: String,
    /// Left unchanged when blank
    pub phone_number: Option<String>,
    /// Left unchanged when blank
    pub employee_id: Option<String>,
    /// Avatar URL to save, possibly one just uploaded
    pub avatar: Option<String>,
    /// Id of a file uploaded while editing this form, if any
    pub uploaded_file_id: Option<String>,
}

fn filled(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// The file to delete when `form` replaces `previous_avatar`, if any.
#[must_use]
pub fn replaced_avatar_file<'a>(previous_avatar: Option<&'a str>, form: &ProfileForm) -> Option<&'a str> {
    let previous = previous_avatar?;
    let uploaded = form.uploaded_file_id.as_deref()?;
    if form.avatar.as_deref() == Some(previous) {
        return None;
    }
    file_id_from_url(previous).filter(|old| *old != uploaded)
}

/// Saves the profile form for the logged-in user.
pub async fn save_profile<C>(
    db: &C,
    bucket: &FileBucket,
    context: &mut SessionContext,
    form: ProfileForm,
) -> Result<user::Model>
where
    C: ConnectionTrait,
{
    let previous_avatar = context.require()?.user.avatar.clone();
    let old_file = replaced_avatar_file(previous_avatar.as_deref(), &form).map(str::to_string);

    let changes = ProfileUpdate {
        full_name: Some(form.full_name),
        phone_number: filled(form.phone_number),
        employee_id: filled(form.employee_id),
        avatar: filled(form.avatar),
    };
    let user = context.update_profile(db, changes).await?.clone();

    if let Some(old_file) = old_file {
        info!("Deleting replaced avatar {old_file}");
        if let Err(e) = bucket.delete(&old_file).await {
            warn!("Failed to delete old avatar {old_file}: {e}");
        }
    }
    Ok(user)
}

/// User API
///
/// Two operations: get-or-create by email, and linking a phone number to an
/// existing account. There is no authentication beyond the email lookup
/// itself; users are never deleted.
///
/// # Endpoints
///
/// ```text
/// POST  /api/users   # {email, name?, phone?} — get or create
/// PATCH /api/users   # {id, phone} — link/update phone number
/// ```

use crate::app::AppState;
use crate::error::{ApiError, ApiResult};
use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use taskpad_shared::envelope::Envelope;
use taskpad_shared::models::user::{normalize_phone, User};
use uuid::Uuid;
use validator::Validate;

/// Get-or-create user request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct GetOrCreateUserRequest {
    /// Email address (required; lowercased before lookup)
    #[validate(email)]
    pub email: Option<String>,

    /// Optional display name, applied only on creation
    pub name: Option<String>,

    /// Optional phone number, normalized to digits, applied only on creation
    pub phone: Option<String>,
}

/// Get-or-create user handler
///
/// Returns 200 with the existing user, or 201 when the email was unseen and
/// a new account was created.
pub async fn get_or_create_user(
    State(state): State<AppState>,
    Json(request): Json<GetOrCreateUserRequest>,
) -> ApiResult<(StatusCode, Json<Envelope<User>>)> {
    let email = request
        .email
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("email is required".to_string()))?;

    request
        .validate()
        .map_err(|_| ApiError::BadRequest("email must be a valid email address".to_string()))?;

    let (user, created) = User::get_or_create(
        &state.db,
        email,
        request.name.as_deref(),
        request.phone.as_deref(),
    )
    .await?;

    if created {
        tracing::info!(user_id = %user.id, "User created");
    }

    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(Envelope::ok(user))))
}

/// Update phone request
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePhoneRequest {
    /// User id (required)
    pub id: Option<String>,

    /// Phone number to link (required; stored digits-only)
    pub phone: Option<String>,
}

/// Update phone handler
///
/// Links a phone number to an existing account so the webhook path can
/// resolve the user by phone.
pub async fn update_phone(
    State(state): State<AppState>,
    Json(request): Json<UpdatePhoneRequest>,
) -> ApiResult<Json<Envelope<User>>> {
    let (id, phone) = match (&request.id, &request.phone) {
        (Some(id), Some(phone)) if !phone.trim().is_empty() => (id.as_str(), phone.as_str()),
        _ => {
            return Err(ApiError::BadRequest(
                "id and phone are required".to_string(),
            ))
        }
    };
    let id = Uuid::parse_str(id)
        .map_err(|_| ApiError::BadRequest("id must be a valid UUID".to_string()))?;

    if normalize_phone(phone).is_empty() {
        return Err(ApiError::BadRequest(
            "phone must contain at least one digit".to_string(),
        ));
    }

    let user = User::update_phone(&state.db, id, phone)
        .await?
        .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

    tracing::info!(user_id = %user.id, "Phone number linked");

    Ok(Json(Envelope::ok(user)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_shape_validation() {
        let request = GetOrCreateUserRequest {
            email: Some("not-an-email".to_string()),
            name: None,
            phone: None,
        };
        assert!(request.validate().is_err());

        let request = GetOrCreateUserRequest {
            email: Some("user@example.com".to_string()),
            name: None,
            phone: None,
        };
        assert!(request.validate().is_ok());
    }
}

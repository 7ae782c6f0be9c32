//! Account Handlers

use std::collections::HashMap;

use axum::{
    Json,
    extract::{FromRequest, Multipart, Request, State},
};
use http::header;

use shared::models::{
    AuthResponse, LoginRequest, ResetRequest, UserCreate, UserProfile, UserUpdate,
    VerifyOtpRequest,
};

use crate::api::files::read_file_field;
use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::utils::{ApiResponse, AppError, AppResult, ErrorCode, ok, ok_with_message};

/// Multipart field carrying the optional picture at registration
const PROFILE_PIC_FIELD: &str = "profile_pic";

/// POST /api/auth/register
///
/// JSON body, or a multipart form with the same fields plus an optional
/// `profile_pic` image. `skills` may repeat or be comma separated.
pub async fn register(
    State(state): State<ServerState>,
    request: Request,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    let auth = if is_multipart {
        let multipart = Multipart::from_request(request, &state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;
        let (payload, picture) = read_registration(multipart).await?;
        match picture {
            Some((bytes, filename)) => {
                state
                    .accounts
                    .register_with_picture(payload, bytes, &filename)
                    .await?
            }
            None => state.accounts.register(payload).await?,
        }
    } else {
        let Json(payload) = Json::<UserCreate>::from_request(request, &state)
            .await
            .map_err(|e| AppError::validation(e.body_text()))?;
        state.accounts.register(payload).await?
    };
    Ok(ok(auth))
}

type Picture = (Vec<u8>, String);

async fn read_registration(mut multipart: Multipart) -> AppResult<(UserCreate, Option<Picture>)> {
    let multipart_error = |e: axum::extract::multipart::MultipartError| {
        AppError::validation(format!("Invalid multipart request: {}", e))
    };

    let mut text: HashMap<String, String> = HashMap::new();
    let mut skills = Vec::new();
    let mut picture = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        if name == PROFILE_PIC_FIELD {
            let filename = field
                .file_name()
                .map(|s| s.to_string())
                .ok_or_else(|| AppError::new(ErrorCode::NoFilename))?;
            let data = field.bytes().await.map_err(multipart_error)?;
            if !data.is_empty() {
                picture = Some((data.to_vec(), filename));
            }
            continue;
        }
        let value = field.text().await.map_err(multipart_error)?;
        if name == "skills" {
            skills.extend(
                value
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty()),
            );
        } else {
            text.insert(name, value);
        }
    }

    let payload = UserCreate {
        name: text.remove("name").unwrap_or_default(),
        email: text.remove("email").unwrap_or_default(),
        password: text.remove("password").unwrap_or_default(),
        role: text.remove("role").unwrap_or_default(),
        bio: text.remove("bio"),
        skills: (!skills.is_empty()).then_some(skills),
    };
    Ok((payload, picture))
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<ApiResponse<AuthResponse>>> {
    let auth = state.accounts.login(payload).await?;
    Ok(ok(auth))
}

/// GET /api/auth/freelancers
pub async fn freelancers(
    State(state): State<ServerState>,
) -> AppResult<Json<ApiResponse<Vec<UserProfile>>>> {
    Ok(ok(state.accounts.freelancers().await?))
}

/// POST /api/auth/request-reset
///
/// Answers the same way whether or not the email is registered.
pub async fn request_reset(
    State(state): State<ServerState>,
    Json(payload): Json<ResetRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.accounts.request_reset(&payload.email).await?;
    Ok(ok_with_message(
        "If the email is registered, a verification code has been sent",
    ))
}

/// POST /api/auth/verify-otp
pub async fn verify_otp(
    State(state): State<ServerState>,
    Json(payload): Json<VerifyOtpRequest>,
) -> AppResult<Json<ApiResponse<()>>> {
    state.accounts.verify_otp(payload).await?;
    Ok(ok_with_message("Password updated"))
}

/// GET /api/auth/me
pub async fn me(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    Ok(ok(state.accounts.me(&user).await?))
}

/// PUT /api/auth/update
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    Ok(ok(state.accounts.update_profile(&user, payload).await?))
}

/// DELETE /api/auth/delete
pub async fn delete_account(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<ApiResponse<()>>> {
    state.accounts.delete_account(&user).await?;
    Ok(ok_with_message("Account deleted"))
}

/// PUT /api/auth/profile-pic (multipart, field `file`)
pub async fn profile_pic(
    State(state): State<ServerState>,
    user: CurrentUser,
    multipart: Multipart,
) -> AppResult<Json<ApiResponse<UserProfile>>> {
    let (bytes, filename) = read_file_field(multipart).await?;
    let profile = state
        .accounts
        .update_profile_pic(&user, bytes, &filename)
        .await?;
    Ok(ok(profile))
}

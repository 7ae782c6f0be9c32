//! Auth API module
//!
//! | Path | Method | Auth |
//! |------|------|------|
//! | /api/auth/register | POST | none |
//! | /api/auth/login | POST | none |
//! | /api/auth/freelancers | GET | none |
//! | /api/auth/request-reset | POST | none |
//! | /api/auth/verify-otp | POST | none |
//! | /api/auth/me | GET | user |
//! | /api/auth/update | PUT | user |
//! | /api/auth/delete | DELETE | user |
//! | /api/auth/profile-pic | PUT | user |

mod handler;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/auth", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/freelancers", get(handler::freelancers))
        .route("/request-reset", post(handler::request_reset))
        .route("/verify-otp", post(handler::verify_otp))
        .route("/me", get(handler::me))
        .route("/update", put(handler::update))
        .route("/delete", delete(handler::delete_account))
        .route("/profile-pic", put(handler::profile_pic))
}

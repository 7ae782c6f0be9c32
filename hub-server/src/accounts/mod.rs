//! Accounts: registration, login, profiles and password reset
//!
//! Password reset uses a 6-digit one-time code. The code is stored hashed,
//! one pending record per email, and allows three verification attempts.

use std::sync::Arc;

use rand::Rng;
use shared::models::{
    AuthResponse, DEFAULT_PROFILE_PIC, LoginRequest, User, UserCreate, UserProfile, UserRole,
    UserUpdate, VerifyOtpRequest,
};
use shared::util::{new_id, normalize_email, now_millis};
use shared::{AppError, AppResult, ErrorCode};

use crate::auth::{CurrentUser, JwtService, hash_password, verify_password};
use crate::db::models::PasswordReset;
use crate::db::{RepoError, Stores};
use crate::security_log;
use crate::services::file_store::is_image_name;
use crate::services::{FileStore, Mailer};
use crate::utils::validation::{
    MAX_DESCRIPTION_LEN, MAX_NAME_LEN, validate_email, validate_optional_text, validate_password,
    validate_required_text,
};

/// Verification attempts allowed per code
pub const MAX_OTP_ATTEMPTS: u32 = 3;

fn user_not_found(user_id: &str) -> AppError {
    AppError::new(ErrorCode::UserNotFound).with_detail("user_id", user_id)
}

fn email_taken(email: &str) -> AppError {
    AppError::new(ErrorCode::EmailAlreadyRegistered).with_detail("email", email)
}

/// Six decimal digits
fn generate_otp() -> String {
    rand::thread_rng().gen_range(100_000..1_000_000).to_string()
}

#[derive(Clone)]
pub struct AccountService {
    stores: Stores,
    jwt: Arc<JwtService>,
    mailer: Arc<dyn Mailer>,
    files: Arc<dyn FileStore>,
    otp_ttl_minutes: i64,
}

impl std::fmt::Debug for AccountService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AccountService")
            .field("otp_ttl_minutes", &self.otp_ttl_minutes)
            .finish_non_exhaustive()
    }
}

impl AccountService {
    pub fn new(
        stores: Stores,
        jwt: Arc<JwtService>,
        mailer: Arc<dyn Mailer>,
        files: Arc<dyn FileStore>,
        otp_ttl_minutes: i64,
    ) -> Self {
        Self {
            stores,
            jwt,
            mailer,
            files,
            otp_ttl_minutes,
        }
    }

    fn issue(&self, user: &User) -> AppResult<AuthResponse> {
        let token = self
            .jwt
            .generate_token(user)
            .map_err(|e| AppError::internal(format!("Failed to issue token: {}", e)))?;
        Ok(AuthResponse {
            token,
            user: user.profile(),
        })
    }

    /// Remove an uploaded file once no record points at it any more
    async fn release_file(&self, reference: &str) {
        match self.stores.file_in_use(reference).await {
            Ok(true) => {
                tracing::debug!(reference = %reference, "File still referenced, keeping it");
            }
            Ok(false) => {
                if let Err(e) = self.files.delete(reference).await {
                    tracing::warn!(reference = %reference, error = %e, "Could not remove file");
                }
            }
            Err(e) => {
                tracing::warn!(reference = %reference, error = %e, "Could not check file references");
            }
        }
    }

    async fn load(&self, user_id: &str) -> AppResult<User> {
        self.stores
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| user_not_found(user_id))
    }

    pub async fn register(&self, input: UserCreate) -> AppResult<AuthResponse> {
        self.create_user(input, DEFAULT_PROFILE_PIC.to_string()).await
    }

    /// Register with a profile picture sent in the same request.
    ///
    /// The picture is stored first and released again when the account is
    /// rejected.
    pub async fn register_with_picture(
        &self,
        input: UserCreate,
        bytes: Vec<u8>,
        filename: &str,
    ) -> AppResult<AuthResponse> {
        let url = self.store_picture(bytes, filename).await?;
        match self.create_user(input, url.clone()).await {
            Ok(auth) => Ok(auth),
            Err(e) => {
                self.release_file(&url).await;
                Err(e)
            }
        }
    }

    async fn create_user(&self, input: UserCreate, profile_pic: String) -> AppResult<AuthResponse> {
        let name = input.name.trim().to_string();
        validate_required_text(&name, "name", MAX_NAME_LEN)?;
        let email = normalize_email(&input.email);
        validate_email(&email)?;
        validate_required_text(&input.role, "role", MAX_NAME_LEN)?;
        let role: UserRole = input
            .role
            .parse()
            .map_err(|e: String| AppError::validation(e).with_detail("field", "role"))?;
        validate_password(&input.password)?;
        validate_optional_text(&input.bio, "bio", MAX_DESCRIPTION_LEN)?;

        if self.stores.users.find_by_email(&email).await?.is_some() {
            return Err(email_taken(&email));
        }

        let now = now_millis();
        let user = User {
            id: new_id(),
            name,
            email,
            password_hash: hash_password(&input.password)?,
            role,
            bio: input.bio.map(|b| b.trim().to_string()).unwrap_or_default(),
            skills: input.skills.unwrap_or_default(),
            profile_pic,
            rating: 0.0,
            created_at: now,
            updated_at: now,
        };

        let user = match self.stores.users.create(user).await {
            Ok(user) => user,
            Err(RepoError::Duplicate(_)) => return Err(email_taken(&normalize_email(&input.email))),
            Err(e) => return Err(e.into()),
        };
        tracing::info!(user_id = %user.id, role = %user.role, "User registered");
        self.issue(&user)
    }

    /// Unknown email and wrong password are indistinguishable
    pub async fn login(&self, input: LoginRequest) -> AppResult<AuthResponse> {
        let email = normalize_email(&input.email);
        let user = self.stores.users.find_by_email(&email).await?;

        match user {
            Some(user) if verify_password(&input.password, &user.password_hash) => {
                tracing::info!(user_id = %user.id, "User logged in");
                self.issue(&user)
            }
            _ => {
                security_log!("WARN", "login_failed", email = email.clone());
                Err(AppError::invalid_credentials())
            }
        }
    }

    pub async fn me(&self, actor: &CurrentUser) -> AppResult<UserProfile> {
        Ok(self.load(&actor.id).await?.profile())
    }

    /// Name, bio and skills only
    pub async fn update_profile(&self, actor: &CurrentUser, update: UserUpdate) -> AppResult<UserProfile> {
        for (field, present) in [
            ("role", update.role.is_some()),
            ("email", update.email.is_some()),
            ("password", update.password.is_some()),
        ] {
            if present {
                return Err(AppError::with_message(
                    ErrorCode::ProfileFieldLocked,
                    format!("{} cannot be changed through a profile update", field),
                )
                .with_detail("field", field));
            }
        }

        let mut user = self.load(&actor.id).await?;
        if let Some(name) = update.name {
            let name = name.trim().to_string();
            validate_required_text(&name, "name", MAX_NAME_LEN)?;
            user.name = name;
        }
        validate_optional_text(&update.bio, "bio", MAX_DESCRIPTION_LEN)?;
        if let Some(bio) = update.bio {
            user.bio = bio.trim().to_string();
        }
        if let Some(skills) = update.skills {
            user.skills = skills
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        user.updated_at = now_millis();

        let user = self.stores.users.update(user).await?;
        Ok(user.profile())
    }

    /// Removes the user record only; orders and reviews stay
    pub async fn delete_account(&self, actor: &CurrentUser) -> AppResult<()> {
        let user = self.load(&actor.id).await?;
        if !self.stores.users.delete(&user.id).await? {
            return Err(user_not_found(&user.id));
        }
        self.release_file(&user.profile_pic).await;
        security_log!("INFO", "account_deleted", user_id = user.id.clone());
        Ok(())
    }

    pub async fn freelancers(&self) -> AppResult<Vec<UserProfile>> {
        let users = self.stores.users.find_by_role(UserRole::Freelancer).await?;
        Ok(users.iter().map(User::profile).collect())
    }

    /// Send a reset code. Unknown emails get the same answer as known ones.
    ///
    /// The stored code survives a mail failure.
    pub async fn request_reset(&self, email: &str) -> AppResult<()> {
        let email = normalize_email(email);
        validate_email(&email)?;

        if self.stores.users.find_by_email(&email).await?.is_none() {
            tracing::info!("Password reset requested for unknown email");
            return Ok(());
        }

        let code = generate_otp();
        let now = now_millis();
        self.stores
            .resets
            .upsert(PasswordReset {
                email: email.clone(),
                code_hash: hash_password(&code)?,
                expires_at: now + self.otp_ttl_minutes * 60 * 1000,
                attempts: 0,
                created_at: now,
            })
            .await?;

        if let Err(e) = self
            .mailer
            .send_reset_code(&email, &code, self.otp_ttl_minutes)
            .await
        {
            tracing::error!(error = %e, "Failed to send password reset code");
            return Err(AppError::with_message(ErrorCode::MailDeliveryFailed, e.to_string()));
        }
        Ok(())
    }

    /// Check the code and replace the password
    pub async fn verify_otp(&self, input: VerifyOtpRequest) -> AppResult<()> {
        let email = normalize_email(&input.email);
        let record = self
            .stores
            .resets
            .find(&email)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::VerificationCodeInvalid))?;

        if record.is_expired(now_millis()) {
            return Err(AppError::new(ErrorCode::VerificationCodeExpired));
        }
        if record.attempts >= MAX_OTP_ATTEMPTS {
            security_log!("WARN", "otp_locked", email = email.clone());
            return Err(AppError::new(ErrorCode::TooManyAttempts));
        }

        self.stores.resets.increment_attempts(&email).await?;

        if !verify_password(input.otp.trim(), &record.code_hash) {
            security_log!("WARN", "otp_invalid", email = email.clone());
            return Err(AppError::new(ErrorCode::VerificationCodeInvalid));
        }

        validate_password(&input.new_password)?;

        let mut user = self
            .stores
            .users
            .find_by_email(&email)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
        user.password_hash = hash_password(&input.new_password)?;
        user.updated_at = now_millis();
        self.stores.users.update(user).await?;
        self.stores.resets.delete(&email).await?;

        security_log!("INFO", "password_reset", email = email.clone());
        Ok(())
    }

    /// Store a new profile picture and drop the previous one when nothing
    /// else uses it
    pub async fn update_profile_pic(
        &self,
        actor: &CurrentUser,
        bytes: Vec<u8>,
        filename: &str,
    ) -> AppResult<UserProfile> {
        let mut user = self.load(&actor.id).await?;
        let url = self.store_picture(bytes, filename).await?;

        let previous = std::mem::replace(&mut user.profile_pic, url.clone());
        user.updated_at = now_millis();
        let user = self.stores.users.update(user).await?;

        if previous != url {
            self.release_file(&previous).await;
        }
        Ok(user.profile())
    }

    /// Images only; returns the stored reference
    async fn store_picture(&self, bytes: Vec<u8>, filename: &str) -> AppResult<String> {
        if !is_image_name(filename) {
            return Err(AppError::with_message(
                ErrorCode::UnsupportedFileFormat,
                "Profile pictures must be png, jpg or webp images",
            ));
        }
        Ok(self.files.put(bytes, filename).await?.url)
    }
}

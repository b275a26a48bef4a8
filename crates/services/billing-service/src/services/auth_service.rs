//! Authentication service - Accounts, credentials and tokens.
//!
//! Signup can join an organization and start (or pay for) a subscription in
//! the same transaction that creates the account.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use common::{AppError, AppResult, OptionExt};
use domain::{
    generate_temporary_password, normalize_org_code, parse_date_of_birth, password::DUMMY_HASH,
    Credential, Password, User, UserResponse, UserRole, DEFAULT_PAYMENT_METHOD,
};

use super::membership;
use super::payment::PaymentVerifier;
use crate::config::{Config, SECONDS_PER_HOUR, TOKEN_TYPE_BEARER};
use crate::infra::UnitOfWork;
use crate::notifications::Notifier;

/// JWT claims payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub email: String,
    pub role: String,
    pub exp: i64,
    pub iat: i64,
}

/// Token response returned after successful authentication
#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    /// JWT access token
    #[schema(example = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9...")]
    pub access_token: String,
    /// Token type (always "Bearer")
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Token expiration time in seconds
    #[schema(example = 86400)]
    pub expires_in: i64,
}

/// Self-service registration
#[derive(Debug, Clone)]
pub struct Signup {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    /// `YYYY-MM-DD`; anything else is ignored
    pub dob: Option<String>,
    pub org_code: Option<String>,
    pub plan_id: Option<Uuid>,
    pub payment_id: Option<String>,
    pub payment_method: Option<String>,
}

/// Account created by an administrator
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub name: String,
    pub role: UserRole,
    pub phone: Option<String>,
    pub dob: Option<String>,
    pub organization_id: Option<Uuid>,
}

/// Admin-created user and whether the welcome email went out
#[derive(Debug, Serialize, ToSchema)]
pub struct AddedUser {
    pub user: UserResponse,
    pub email_sent: bool,
}

/// Outcome of an admin password reset
#[derive(Debug, Serialize, ToSchema)]
pub struct PasswordResetResponse {
    pub success: bool,
    pub email_sent: bool,
}

/// Authentication service trait for dependency injection.
#[async_trait]
pub trait AuthService: Send + Sync {
    /// Register an account and return a token
    async fn signup(&self, form: Signup) -> AppResult<TokenResponse>;

    /// Check credentials and return a token
    async fn signin(&self, email: String, password: String) -> AppResult<TokenResponse>;

    /// Create an account with a temporary password and email it
    async fn add_user(&self, account: NewAccount) -> AppResult<AddedUser>;

    /// Replace a user's password with a temporary one and email it
    async fn reset_password(&self, user_id: Uuid) -> AppResult<PasswordResetResponse>;

    /// Change a password after checking the current one
    async fn update_password(
        &self,
        user_id: Uuid,
        current_password: String,
        new_password: String,
    ) -> AppResult<()>;

    /// Verify JWT token and extract claims
    fn verify_token(&self, token: &str) -> AppResult<Claims>;
}

fn generate_token(user: &User, config: &Config) -> AppResult<TokenResponse> {
    let now = Utc::now();
    let expires_at = now + Duration::hours(config.jwt.expiration_hours);

    let claims = Claims {
        sub: user.id,
        email: user.email.clone(),
        role: user.role.to_string(),
        exp: expires_at.timestamp(),
        iat: now.timestamp(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.jwt_secret_bytes()),
    )?;

    Ok(TokenResponse {
        access_token: token,
        token_type: TOKEN_TYPE_BEARER.to_string(),
        expires_in: config.jwt.expiration_hours * SECONDS_PER_HOUR,
    })
}

fn verify_token_internal(token: &str, config: &Config) -> AppResult<Claims> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.jwt_secret_bytes()),
        &Validation::default(),
    )?;

    Ok(token_data.claims)
}

fn date_of_birth(dob: Option<&str>) -> Option<chrono::NaiveDate> {
    let raw = dob.filter(|d| !d.trim().is_empty())?;
    let parsed = parse_date_of_birth(raw);
    if parsed.is_none() {
        tracing::warn!(dob = %raw, "Ignoring invalid date of birth");
    }
    parsed
}

/// Concrete implementation of AuthService using Unit of Work.
pub struct Authenticator<U: UnitOfWork> {
    uow: Arc<U>,
    config: Config,
    notifier: Notifier,
    verifier: Arc<dyn PaymentVerifier>,
}

impl<U: UnitOfWork> Authenticator<U> {
    pub fn new(
        uow: Arc<U>,
        config: Config,
        notifier: Notifier,
        verifier: Arc<dyn PaymentVerifier>,
    ) -> Self {
        Self {
            uow,
            config,
            notifier,
            verifier,
        }
    }

    async fn ensure_email_free(&self, email: &str) -> AppResult<()> {
        if self
            .uow
            .repos()
            .credentials()
            .find_by_email(email)
            .await?
            .is_some()
        {
            return Err(AppError::conflict("User"));
        }
        Ok(())
    }
}

#[async_trait]
impl<U: UnitOfWork> AuthService for Authenticator<U> {
    async fn signup(&self, form: Signup) -> AppResult<TokenResponse> {
        let email = form.email.trim().to_lowercase();
        self.ensure_email_free(&email).await?;

        let password_hash = Password::new(&form.password)?.into_string();
        let date_of_birth = date_of_birth(form.dob.as_deref());

        // Payment is confirmed before any row is written
        let payment_method = form
            .payment_method
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());
        let paid_with = match (form.plan_id, form.payment_id) {
            (Some(_), Some(payment_id)) => {
                if !self.verifier.verify(&payment_id, &payment_method).await? {
                    return Err(AppError::bad_request("Payment verification failed"));
                }
                Some(payment_id)
            }
            _ => None,
        };

        let role = if paid_with.is_some() {
            UserRole::User
        } else {
            UserRole::Pending
        };
        let org_code = form.org_code.filter(|c| !c.trim().is_empty());
        let (name, phone, plan_id) = (form.name, form.phone, form.plan_id);

        // Serializable: organization membership is a read-modify-write
        let user = self
            .uow
            .transaction_serializable(move |repos| {
                Box::pin(async move {
                    let organization = match org_code {
                        Some(code) => {
                            let code = normalize_org_code(&code)?;
                            let org = repos
                                .organizations()
                                .find_by_code(&code)
                                .await?
                                .ok_or_not_found()?;
                            org.ensure_accepts_signups()?;
                            Some(org)
                        }
                        None => None,
                    };

                    let id = Uuid::new_v4();
                    repos
                        .credentials()
                        .create(Credential {
                            id,
                            email: email.clone(),
                            password_hash,
                            active: true,
                        })
                        .await?;

                    let mut user = User::new(id, email, name, role);
                    user.phone = phone;
                    user.date_of_birth = date_of_birth;
                    user.organization_id = organization.as_ref().map(|o| o.id);
                    let mut user = repos.users().create(user).await?;

                    if let Some(mut org) = organization {
                        if org.add_users(&[id]) > 0 {
                            repos.organizations().update(org).await?;
                        }
                    }

                    if let Some(plan_id) = plan_id {
                        let subscription = membership::start_subscription(
                            repos,
                            id,
                            plan_id,
                            paid_with.clone(),
                            Some(payment_method.clone()),
                        )
                        .await?;

                        if let Some(payment_id) = paid_with {
                            membership::activate_subscription(
                                repos,
                                subscription.id,
                                payment_id,
                                payment_method,
                            )
                            .await?;
                        }

                        // Membership bookkeeping stamped the stored row
                        if let Some(stamped) = repos.users().find_by_id(id).await? {
                            user = stamped;
                        }
                    }

                    Ok(user)
                })
            })
            .await?;

        tracing::info!(user_id = %user.id, role = %user.role, "User signed up");
        generate_token(&user, &self.config)
    }

    async fn signin(&self, email: String, password: String) -> AppResult<TokenResponse> {
        let email = email.trim().to_lowercase();
        let credential = self.uow.repos().credentials().find_by_email(&email).await?;

        // Hash something even for unknown emails so timing does not leak them
        let (password_hash, active) = match &credential {
            Some(c) => (c.password_hash.clone(), c.active),
            None => (DUMMY_HASH.to_string(), false),
        };
        let password_valid = Password::from_hash(password_hash).verify(&password);

        let credential = match credential {
            Some(c) if active && password_valid => c,
            _ => return Err(AppError::InvalidCredentials),
        };

        let user = self
            .uow
            .repos()
            .users()
            .find_by_id(credential.id)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        generate_token(&user, &self.config)
    }

    async fn add_user(&self, account: NewAccount) -> AppResult<AddedUser> {
        let email = account.email.trim().to_lowercase();
        self.ensure_email_free(&email).await?;

        let temporary_password = generate_temporary_password();
        let password_hash = Password::new(&temporary_password)?.into_string();
        let date_of_birth = date_of_birth(account.dob.as_deref());

        let user = self
            .uow
            .transaction(move |repos| {
                Box::pin(async move {
                    let id = Uuid::new_v4();
                    repos
                        .credentials()
                        .create(Credential {
                            id,
                            email: email.clone(),
                            password_hash,
                            active: true,
                        })
                        .await?;

                    let mut user = User::new(id, email, account.name, account.role);
                    user.phone = account.phone;
                    user.date_of_birth = date_of_birth;
                    user.organization_id = account.organization_id;
                    repos.users().create(user).await
                })
            })
            .await?;

        let email_sent = self
            .notifier
            .send_welcome(&user.name, &user.email, &temporary_password)
            .await;

        tracing::info!(user_id = %user.id, email_sent, "User added by admin");
        Ok(AddedUser {
            user: user.into(),
            email_sent,
        })
    }

    async fn reset_password(&self, user_id: Uuid) -> AppResult<PasswordResetResponse> {
        let repos = self.uow.repos();
        let user = repos.users().find_by_id(user_id).await?.ok_or_not_found()?;

        let temporary_password = generate_temporary_password();
        let password_hash = Password::new(&temporary_password)?.into_string();
        repos
            .credentials()
            .update_password(user_id, password_hash)
            .await?;

        let email_sent = self
            .notifier
            .send_password_reset(&user.name, &user.email, &temporary_password)
            .await;

        tracing::info!(user_id = %user_id, email_sent, "Password reset by admin");
        Ok(PasswordResetResponse {
            success: true,
            email_sent,
        })
    }

    async fn update_password(
        &self,
        user_id: Uuid,
        current_password: String,
        new_password: String,
    ) -> AppResult<()> {
        let credentials = self.uow.repos().credentials();
        let credential = credentials.find_by_id(user_id).await?.ok_or_not_found()?;

        if !Password::from_hash(credential.password_hash).verify(&current_password) {
            return Err(AppError::bad_request("Current password is incorrect"));
        }

        let password_hash = Password::new(&new_password)?.into_string();
        credentials.update_password(user_id, password_hash).await
    }

    fn verify_token(&self, token: &str) -> AppResult<Claims> {
        verify_token_internal(token, &self.config)
    }
}

use reqwest::Method;
use tokio_util::sync::CancellationToken;

use super::Gateway;
use crate::error::Result;
use crate::models::{AuthResponse, Credentials, Registration, User};

impl Gateway {
    /// `POST /api/auth/login`; the returned token becomes the session token.
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse> {
        log::debug!("POST /api/auth/login");
        let builder = self.request(Method::POST, "/api/auth/login").json(credentials);
        let auth: AuthResponse = Self::execute_json(builder).await?;
        self.set_token(auth.access_token.clone());
        log::info!("Signed in as {}", credentials.email);
        Ok(auth)
    }

    /// `POST /api/auth/register`; signs the new user in.
    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse> {
        log::debug!("POST /api/auth/register");
        let builder = self
            .request(Method::POST, "/api/auth/register")
            .json(registration);
        let auth: AuthResponse = Self::execute_json(builder).await?;
        self.set_token(auth.access_token.clone());
        log::info!("Registered {}", registration.email);
        Ok(auth)
    }

    /// `GET /api/auth/me`.
    pub async fn me(&self, cancel: &CancellationToken) -> Result<User> {
        self.get_json("/api/auth/me", &[], cancel).await
    }

    pub fn logout(&self) {
        self.clear_token();
    }
}

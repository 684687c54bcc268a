//! Scripted [`ApiClient`] for unit tests.

#![allow(clippy::unwrap_used)]

use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{ApiClient, ApiError, CheckoutOrder, LoginRequest, RegisterRequest};
use crate::models::{ProductImage, ProfilePatch, User};

/// A recorded call, with its JSON body where there is one.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Login(Value),
    Register(Value),
    Logout,
    EditProfile(Value),
    ProductImages,
    Checkout(Value),
}

/// Records every call and answers from canned data.
#[derive(Default)]
pub struct FakeApi {
    calls: Mutex<Vec<Call>>,
    failure: Mutex<Option<u16>>,
    user: Mutex<Option<User>>,
    images: Mutex<Vec<ProductImage>>,
    cookie: Mutex<Option<String>>,
}

/// Cookie handed out by a successful login or register.
pub const SESSION_COOKIE: &str = "sid=fake-session";

impl FakeApi {
    /// Make every following call fail with `status`.
    pub fn fail_with(&self, status: u16) {
        *self.failure.lock().unwrap() = Some(status);
    }

    /// User returned by login and register.
    pub fn respond_with_user(&self, user: User) {
        *self.user.lock().unwrap() = Some(user);
    }

    /// Images returned by `product_images`.
    pub fn respond_with_images(&self, images: Vec<ProductImage>) {
        *self.images.lock().unwrap() = images;
    }

    /// Calls seen so far.
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> Result<(), ApiError> {
        self.calls.lock().unwrap().push(call);
        match *self.failure.lock().unwrap() {
            Some(status) => Err(ApiError::Status {
                status,
                message: format!("scripted failure {status}"),
            }),
            None => Ok(()),
        }
    }

    fn user(&self) -> Result<User, ApiError> {
        let user = self.user.lock().unwrap().clone().ok_or_else(|| ApiError::Status {
            status: 500,
            message: "no scripted user".to_string(),
        })?;
        *self.cookie.lock().unwrap() = Some(SESSION_COOKIE.to_string());
        Ok(user)
    }
}

#[async_trait]
impl ApiClient for FakeApi {
    async fn login(&self, request: &LoginRequest) -> Result<User, ApiError> {
        self.record(Call::Login(serde_json::to_value(request).unwrap()))?;
        self.user()
    }

    async fn register(&self, request: &RegisterRequest) -> Result<User, ApiError> {
        self.record(Call::Register(serde_json::to_value(request).unwrap()))?;
        self.user()
    }

    async fn logout(&self) -> Result<(), ApiError> {
        self.record(Call::Logout)
    }

    async fn edit_profile(&self, patch: &ProfilePatch) -> Result<(), ApiError> {
        self.record(Call::EditProfile(serde_json::to_value(patch).unwrap()))
    }

    async fn product_images(&self) -> Result<Vec<ProductImage>, ApiError> {
        self.record(Call::ProductImages)?;
        Ok(self.images.lock().unwrap().clone())
    }

    async fn checkout(&self, order: &CheckoutOrder<'_>) -> Result<(), ApiError> {
        self.record(Call::Checkout(serde_json::to_value(order).unwrap()))
    }

    fn session_cookie(&self) -> Option<String> {
        self.cookie.lock().unwrap().clone()
    }

    fn resume_session(&self, cookie: &str) {
        *self.cookie.lock().unwrap() = Some(cookie.to_string());
    }
}

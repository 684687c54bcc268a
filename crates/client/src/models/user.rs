//! Session and profile types.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use shopfront_core::{PhoneNumber, PhoneNumberError};

use crate::api::types::serialize_optional_secret;

/// The authenticated user as returned by the backend.
///
/// The named fields are the ones the storefront reads and edits; anything
/// else the backend sends is kept in `extra` and written back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub phone_number: String,
    /// Remaining fields, passed through opaquely.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl User {
    /// Overwrite the fields present in `patch`.
    ///
    /// The password is never copied into the user record.
    pub fn apply_patch(&mut self, patch: &ProfilePatch) {
        if let Some(username) = &patch.username {
            self.username.clone_from(username);
        }
        if let Some(full_name) = &patch.full_name {
            self.full_name.clone_from(full_name);
        }
        if let Some(email) = &patch.email {
            self.email.clone_from(email);
        }
        if let Some(address) = &patch.address {
            self.address.clone_from(address);
        }
        if let Some(phone_number) = &patch.phone_number {
            self.phone_number.clone_from(phone_number);
        }
    }
}

/// Persisted session: `{"user": ...}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSession {
    /// Logged-in user, or `None` when anonymous.
    #[serde(default)]
    pub user: Option<User>,
}

impl UserSession {
    /// Returns `true` if a user is logged in.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Profile edits as entered by the user.
///
/// `None` and blank fields mean "leave unchanged". Turn into a
/// [`ProfilePatch`] with [`ProfileUpdate::into_patch`].
#[derive(Debug, Default)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub phone_number: Option<String>,
    pub password: Option<SecretString>,
}

impl ProfileUpdate {
    /// Trim every field, drop the blank ones, and normalize the phone number.
    ///
    /// A non-empty phone number is validated as given, before trimming, so
    /// surrounding whitespace makes it invalid.
    ///
    /// # Errors
    ///
    /// Returns `PhoneNumberError::InvalidFormat` if a phone number is given
    /// but is not an accepted shape.
    pub fn into_patch(self) -> Result<ProfilePatch, PhoneNumberError> {
        let phone_number = self
            .phone_number
            .filter(|raw| !raw.is_empty())
            .map(|raw| PhoneNumber::parse(&raw).map(PhoneNumber::into_inner))
            .transpose()?;

        let password = self
            .password
            .map(|secret| secret.expose_secret().trim().to_owned())
            .filter(|password| !password.is_empty())
            .map(SecretString::from);

        Ok(ProfilePatch {
            username: non_blank(self.username),
            full_name: non_blank(self.full_name),
            email: non_blank(self.email),
            address: non_blank(self.address),
            phone_number,
            password,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

/// Sparse profile update sent to `/api/edit-profile`.
///
/// Only present fields are serialized.
#[derive(Debug, Default, Serialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    #[serde(
        skip_serializing_if = "Option::is_none",
        serialize_with = "serialize_optional_secret"
    )]
    pub password: Option<SecretString>,
}

impl ProfilePatch {
    /// Returns `true` if no field would be sent.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.full_name.is_none()
            && self.email.is_none()
            && self.address.is_none()
            && self.phone_number.is_none()
            && self.password.is_none()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn sample_user() -> User {
        serde_json::from_value(json!({
            "username": "ada",
            "full_name": "Ada Lovelace",
            "email": "ada@example.com",
            "address": "12 St James's Square",
            "phone_number": "123-456-7890",
            "_id": "64f0c2"
        }))
        .unwrap()
    }

    #[test]
    fn test_user_keeps_extra_fields() {
        let user = sample_user();
        assert_eq!(user.extra.get("_id"), Some(&json!("64f0c2")));
        assert_eq!(serde_json::to_value(&user).unwrap()["_id"], json!("64f0c2"));
    }

    #[test]
    fn test_user_session_shape() {
        let anonymous = UserSession::default();
        assert!(!anonymous.is_authenticated());
        assert_eq!(serde_json::to_value(&anonymous).unwrap(), json!({"user": null}));

        let session = UserSession {
            user: Some(sample_user()),
        };
        assert!(session.is_authenticated());
    }

    #[test]
    fn test_into_patch_drops_blank_and_trims() {
        let patch = ProfileUpdate {
            full_name: Some("  Ada King  ".to_string()),
            email: Some("   ".to_string()),
            address: Some(String::new()),
            ..ProfileUpdate::default()
        }
        .into_patch()
        .unwrap();

        assert_eq!(patch.full_name.as_deref(), Some("Ada King"));
        assert!(patch.email.is_none());
        assert!(patch.address.is_none());
        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"full_name": "Ada King"})
        );
    }

    #[test]
    fn test_into_patch_normalizes_phone() {
        let patch = ProfileUpdate {
            phone_number: Some("(123) 456-7890".to_string()),
            ..ProfileUpdate::default()
        }
        .into_patch()
        .unwrap();

        assert_eq!(patch.phone_number.as_deref(), Some("123-456-7890"));
    }

    #[test]
    fn test_into_patch_validates_phone_before_trimming() {
        for raw in [" (123) 456-7890 ", "   "] {
            let result = ProfileUpdate {
                phone_number: Some(raw.to_string()),
                ..ProfileUpdate::default()
            }
            .into_patch();
            assert!(
                matches!(result, Err(PhoneNumberError::InvalidFormat(_))),
                "{raw:?}"
            );
        }

        let patch = ProfileUpdate {
            phone_number: Some(String::new()),
            ..ProfileUpdate::default()
        }
        .into_patch()
        .unwrap();
        assert!(patch.phone_number.is_none());
    }

    #[test]
    fn test_into_patch_rejects_bad_phone() {
        let result = ProfileUpdate {
            full_name: Some("Ada".to_string()),
            phone_number: Some("12-34".to_string()),
            ..ProfileUpdate::default()
        }
        .into_patch();

        assert!(matches!(result, Err(PhoneNumberError::InvalidFormat(_))));
    }

    #[test]
    fn test_patch_serializes_password_but_apply_skips_it() {
        let patch = ProfileUpdate {
            email: Some("ada@lovelace.dev".to_string()),
            password: Some(SecretString::from(" hunter22 ".to_string())),
            ..ProfileUpdate::default()
        }
        .into_patch()
        .unwrap();

        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({"email": "ada@lovelace.dev", "password": "hunter22"})
        );

        let mut user = sample_user();
        user.apply_patch(&patch);
        assert_eq!(user.email, "ada@lovelace.dev");
        assert_eq!(user.full_name, "Ada Lovelace");
        assert!(!serde_json::to_string(&user).unwrap().contains("hunter22"));
    }

    #[test]
    fn test_empty_patch() {
        let patch = ProfileUpdate::default().into_patch().unwrap();
        assert!(patch.is_empty());
        assert_eq!(serde_json::to_value(&patch).unwrap(), json!({}));
    }
}

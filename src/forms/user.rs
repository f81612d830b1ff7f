use crate::models::user::User as UserModel;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Body of the auth provider's "current user" endpoint.
#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub email_confirmed_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub role: Option<String>,
}

impl TryInto<UserModel> for AuthUser {
    type Error = String;

    fn try_into(self) -> Result<UserModel, Self::Error> {
        if self.id.trim().is_empty() {
            return Err("auth provider returned a user without id".to_string());
        }

        Ok(UserModel {
            id: self.id,
            email: self.email,
            email_confirmed: self.email_confirmed_at.is_some(),
            access_token: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_id_is_rejected() {
        let user = AuthUser::default();
        let result: Result<UserModel, String> = user.try_into();
        assert!(result.is_err());
    }

    #[test]
    fn confirmed_email_maps_to_flag() {
        let body = r#"{"id":"5f0c","email":"a@b.c","email_confirmed_at":"2024-05-01T10:00:00Z","role":"authenticated"}"#;
        let user: AuthUser = serde_json::from_str(body).unwrap();
        let user: UserModel = user.try_into().unwrap();

        assert_eq!(user.id, "5f0c");
        assert!(user.email_confirmed);
    }
}

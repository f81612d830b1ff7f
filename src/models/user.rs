use serde::{Deserialize, Serialize};

/// Identity resolved from the external auth provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub email: Option<String>,
    pub email_confirmed: bool,
    #[serde(skip)]
    pub access_token: Option<String>,
}

use crate::models::{Gender, HandPreference, UserProfile};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_valid::Validate;

/// Profile step of the reading flow. Empty strings mean "not provided".
#[derive(Serialize, Deserialize, Debug, Clone, Default, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProfileForm {
    #[serde(default)]
    #[validate(max_length = 10)]
    pub date_of_birth: Option<String>,
    #[validate(min_length = 1)]
    #[validate(max_length = 20)]
    pub hand_preference: String,
    #[serde(default)]
    #[validate(max_length = 20)]
    pub gender: Option<String>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl TryFrom<ProfileForm> for UserProfile {
    type Error = String;

    fn try_from(form: ProfileForm) -> Result<Self, Self::Error> {
        let date_of_birth = non_empty(form.date_of_birth)
            .map(|raw| {
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .map_err(|_| format!("dateOfBirth must be YYYY-MM-DD, got {raw}"))
            })
            .transpose()?;
        let hand_preference = form.hand_preference.trim().parse::<HandPreference>()?;
        let gender = non_empty(form.gender)
            .map(|raw| raw.trim().parse::<Gender>())
            .transpose()?;

        Ok(UserProfile {
            date_of_birth,
            hand_preference,
            gender,
        })
    }
}

use serde::{Deserialize, Serialize};
use serde_valid::Validate;
use uuid::Uuid;

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct StartChatForm {
    #[serde(default)]
    pub palm_reading_id: Option<Uuid>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct SendMessageForm {
    #[validate(max_length = 4000)]
    pub message: String,
}

use serde::{Deserialize, Serialize};

/// Body POSTed to the reply service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub text: String,
    pub user_id: String,
}

/// Body returned by the reply service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatReply {
    pub reply: String,
}

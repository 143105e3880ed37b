use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::models::LogEntry;

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTransactionLogRequest {
    pub user_id: Option<i32>,
    pub action_type: String,
    pub table_name: String,
    pub record_id: i32,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTransactionLogRequest {
    pub user_id: Option<i32>,
    pub action_type: Option<String>,
    pub table_name: Option<String>,
    pub record_id: Option<i32>,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(transparent)]
pub struct LogList {
    #[schema(value_type = Vec<LogEntry>)]
    pub items: Vec<LogEntry>,
}

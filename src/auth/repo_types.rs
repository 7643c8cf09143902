use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use time::OffsetDateTime;
use uuid::Uuid;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: Uuid,                   // surrogate key
    pub username: String,           // unique
    #[serde(skip_serializing)]
    pub password: String,           // plaintext or Argon2 PHC, see PasswordStorage
    pub role: String,               // free-form label
    pub created_at: OffsetDateTime,
}

/// Values for a row about to be inserted. `password` is already encoded.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub role: String,
}

use axum::{extract::State, routing::post, Json, Router};
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginRequest, LoginResponse, MessageResponse, RegisterRequest},
        extractors::ValidatedJson,
        repo_types::NewUser,
    },
    error::AppError,
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn register(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterRequest>,
) -> Result<Json<MessageResponse>, AppError> {
    // Fast path; the unique index still decides when two requests race.
    if state.users.find_by_username(&payload.username).await?.is_some() {
        warn!("username already registered");
        return Err(AppError::Conflict);
    }

    let password = state.config.password_storage.encode(&payload.password)?;

    let user = match state
        .users
        .create(NewUser {
            username: payload.username,
            password,
            role: payload.role,
        })
        .await
    {
        Ok(u) => u,
        Err(AppError::Conflict) => {
            warn!("username registered concurrently");
            return Err(AppError::Conflict);
        }
        Err(e) => return Err(e),
    };

    info!(user_id = %user.id, role = %user.role, "user registered");
    Ok(Json(MessageResponse {
        message: "User registered successfully",
    }))
}

#[instrument(skip(state, payload), fields(username = %payload.username))]
pub async fn login(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginRequest>,
) -> Result<Json<LoginResponse>, AppError> {
    let Some(user) = state.users.find_by_username(&payload.username).await? else {
        warn!("login unknown username");
        return Err(AppError::Unauthorized);
    };

    if !state
        .config
        .password_storage
        .matches(&payload.password, &user.password)
    {
        warn!(user_id = %user.id, "login invalid password");
        return Err(AppError::Unauthorized);
    }

    info!(user_id = %user.id, "user logged in");
    Ok(Json(LoginResponse {
        message: "Login successful",
        username: user.username,
        role: user.role,
    }))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::async_trait;

    use super::*;
    use crate::auth::repo::UserRepo;
    use crate::auth::repo_types::User;
    use crate::config::PasswordStorage;

    /// Sees no existing row but loses the insert, as when a concurrent
    /// registration commits between the lookup and the insert.
    struct LosesInsertRace;

    #[async_trait]
    impl UserRepo for LosesInsertRace {
        async fn find_by_username(&self, _username: &str) -> anyhow::Result<Option<User>> {
            Ok(None)
        }

        async fn create(&self, _new_user: NewUser) -> Result<User, AppError> {
            Err(AppError::Conflict)
        }
    }

    async fn register_ok(state: &AppState, req: RegisterRequest) {
        let Json(ack) = register(State(state.clone()), ValidatedJson(req))
            .await
            .expect("registration");
        assert_eq!(ack.message, "User registered successfully");
    }

    fn register_req(username: &str, password: &str, role: &str) -> RegisterRequest {
        RegisterRequest {
            username: username.into(),
            password: password.into(),
            role: role.into(),
        }
    }

    fn login_req(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.into(),
            password: password.into(),
        }
    }

    #[tokio::test]
    async fn second_registration_conflicts() {
        let state = AppState::fake(PasswordStorage::Plain);
        register_ok(&state, register_req("gina", "pw", "farmer")).await;
        let err = register(State(state), ValidatedJson(register_req("gina", "other", "consumer")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict));
    }

    #[tokio::test]
    async fn login_returns_registered_role() {
        let state = AppState::fake(PasswordStorage::Plain);
        register_ok(&state, register_req("hal", "pw", "farmer")).await;
        let Json(res) = login(State(state), ValidatedJson(login_req("hal", "pw")))
            .await
            .expect("login");
        assert_eq!(res.message, "Login successful");
        assert_eq!(res.username, "hal");
        assert_eq!(res.role, "farmer");
    }

    #[tokio::test]
    async fn login_rejects_wrong_password_and_unknown_user() {
        let state = AppState::fake(PasswordStorage::Plain);
        register_ok(&state, register_req("ivy", "pw", "user")).await;
        let wrong = login(State(state.clone()), ValidatedJson(login_req("ivy", "nope")))
            .await
            .unwrap_err();
        assert!(matches!(wrong, AppError::Unauthorized));
        let unknown = login(State(state), ValidatedJson(login_req("jack", "pw")))
            .await
            .unwrap_err();
        assert!(matches!(unknown, AppError::Unauthorized));
    }

    #[tokio::test]
    async fn argon2_mode_stores_hash_and_still_logs_in() {
        let state = AppState::fake(PasswordStorage::Argon2);
        register_ok(&state, register_req("kim", "pw1", "admin")).await;
        let stored = state
            .users
            .find_by_username("kim")
            .await
            .unwrap()
            .expect("stored");
        assert_ne!(stored.password, "pw1");

        let Json(res) = login(State(state.clone()), ValidatedJson(login_req("kim", "pw1")))
            .await
            .expect("login");
        assert_eq!(res.role, "admin");
        assert!(login(State(state), ValidatedJson(login_req("kim", "pw2")))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn insert_losing_race_is_conflict() {
        let base = AppState::fake(PasswordStorage::Plain);
        let state = AppState::from_parts(Arc::new(LosesInsertRace), base.config.clone());
        let err = register(State(state), ValidatedJson(register_req("lee", "pw", "farmer")))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict));
    }

    #[test]
    fn login_response_serialization() {
        let res = LoginResponse {
            message: "Login successful",
            username: "alice".into(),
            role: "admin".into(),
        };
        let json = serde_json::to_value(&res).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"message": "Login successful", "username": "alice", "role": "admin"})
        );
    }
}

use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use crate::auth::password::{hash_password, verify_password};
use crate::models::{User, UserRole};
use crate::services::is_unique_violation;
use crate::utils::error::{AppError, AppResult};

const USER_COLUMNS: &str = "id, name, email, role, created_at, updated_at";

pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(FromRow)]
struct Credentials {
    id: Uuid,
    password_hash: String,
}

pub async fn register(pool: &PgPool, new_user: NewUser) -> AppResult<User> {
    let exists: Option<Uuid> = sqlx::query_scalar("SELECT id FROM users WHERE email = $1")
        .bind(&new_user.email)
        .fetch_optional(pool)
        .await?;

    if exists.is_some() {
        return Err(AppError::Conflict(
            "An account with this email already exists".to_string(),
        ));
    }

    let password_hash = hash_password(new_user.password).await?;

    let user = sqlx::query_as::<_, User>(&format!(
        "INSERT INTO users (id, name, email, password_hash, role) \
         VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(&new_user.name)
    .bind(&new_user.email)
    .bind(password_hash)
    .bind(UserRole::User)
    .fetch_one(pool)
    .await
    .map_err(|e| {
        // Lost a race with a concurrent registration for the same email.
        if is_unique_violation(&e) {
            AppError::Conflict("An account with this email already exists".to_string())
        } else {
            AppError::from(e)
        }
    })?;

    tracing::info!(user_id = %user.id, email = %user.email, "New user registered");
    Ok(user)
}

/// Checks an email/password pair. Both failure modes share one message.
pub async fn authenticate(pool: &PgPool, email: &str, password: String) -> AppResult<User> {
    let invalid = || AppError::AuthError("Invalid email or password".to_string());

    let credentials =
        sqlx::query_as::<_, Credentials>("SELECT id, password_hash FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(pool)
            .await?;

    let Some(credentials) = credentials else {
        tracing::info!(%email, "Login failed: unknown email");
        return Err(invalid());
    };

    if !verify_password(password, credentials.password_hash).await? {
        tracing::info!(%email, "Login failed: wrong password");
        return Err(invalid());
    }

    get_user(pool, credentials.id).await
}

pub async fn get_user(pool: &PgPool, user_id: Uuid) -> AppResult<User> {
    sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
        .bind(user_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))
}

pub async fn list_users(pool: &PgPool) -> AppResult<Vec<User>> {
    let users = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY created_at DESC"
    ))
    .fetch_all(pool)
    .await?;
    Ok(users)
}

pub async fn change_role(
    pool: &PgPool,
    acting_admin: Uuid,
    user_id: Uuid,
    role: UserRole,
) -> AppResult<User> {
    if acting_admin == user_id && role != UserRole::Admin {
        return Err(AppError::ValidationError(
            "You cannot remove your own admin role".to_string(),
        ));
    }

    let user = sqlx::query_as::<_, User>(&format!(
        "UPDATE users SET role = $1, updated_at = NOW() WHERE id = $2 RETURNING {USER_COLUMNS}"
    ))
    .bind(role)
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    tracing::info!(admin_id = %acting_admin, user_id = %user.id, role = ?role, "User role changed");
    Ok(user)
}

pub async fn delete_user(pool: &PgPool, acting_admin: Uuid, user_id: Uuid) -> AppResult<()> {
    if acting_admin == user_id {
        return Err(AppError::ValidationError(
            "You cannot delete your own account".to_string(),
        ));
    }

    let mut tx = pool.begin().await?;

    // Their bookings cascade away with them; reserved seats go back on sale first.
    let restored = sqlx::query(
        r#"
        UPDATE events e
        SET available_tickets = e.available_tickets + held.tickets, updated_at = NOW()
        FROM (
            SELECT event_id, SUM(tickets_requested)::INTEGER AS tickets
            FROM user_bookings
            WHERE user_id = $1 AND status = 'booked'
            GROUP BY event_id
        ) held
        WHERE e.id = held.event_id
        "#,
    )
    .bind(user_id)
    .execute(&mut *tx)
    .await?;

    let result = sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(user_id)
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("User not found".to_string()));
    }

    tx.commit().await?;

    tracing::info!(
        admin_id = %acting_admin,
        %user_id,
        events_restocked = restored.rows_affected(),
        "User deleted"
    );
    Ok(())
}

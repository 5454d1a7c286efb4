use chrono::{DateTime, Duration, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::extractors::CurrentUser;
use crate::config::MAX_SESSION_TTL_HOURS;
use crate::utils::error::AppResult;

pub struct NewSession {
    pub token: Uuid,
    pub expires_at: DateTime<Utc>,
}

pub fn expiry_from(now: DateTime<Utc>, ttl_hours: i64) -> DateTime<Utc> {
    now + Duration::hours(ttl_hours.clamp(1, MAX_SESSION_TTL_HOURS))
}

pub async fn create_session(pool: &PgPool, user_id: Uuid, ttl_hours: i64) -> AppResult<NewSession> {
    let token = Uuid::new_v4();
    let expires_at = expiry_from(Utc::now(), ttl_hours);

    sqlx::query("INSERT INTO sessions (id, user_id, expires_at) VALUES ($1, $2, $3)")
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .execute(pool)
        .await?;

    Ok(NewSession { token, expires_at })
}

pub async fn find_session_user(pool: &PgPool, token: Uuid) -> AppResult<Option<CurrentUser>> {
    let user = sqlx::query_as::<_, CurrentUser>(
        r#"
        SELECT s.id AS session_id, u.id, u.name, u.email, u.role
        FROM sessions s
        JOIN users u ON u.id = s.user_id
        WHERE s.id = $1 AND s.expires_at > NOW()
        "#,
    )
    .bind(token)
    .fetch_optional(pool)
    .await?;

    Ok(user)
}

pub async fn delete_session(pool: &PgPool, token: Uuid) -> AppResult<()> {
    sqlx::query("DELETE FROM sessions WHERE id = $1")
        .bind(token)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn purge_expired_sessions(pool: &PgPool) -> AppResult<u64> {
    let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= NOW()")
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_from() {
        let now = Utc::now();
        assert_eq!(expiry_from(now, 24) - now, Duration::hours(24));
        assert_eq!(
            expiry_from(now, i64::MAX) - now,
            Duration::hours(MAX_SESSION_TTL_HOURS)
        );
        assert_eq!(expiry_from(now, 0) - now, Duration::hours(1));
    }
}

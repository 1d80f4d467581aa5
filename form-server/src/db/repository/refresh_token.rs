//! Refresh token storage
//!
//! Tokens are opaque UUIDs handed to the client; only their SHA-256 hash is
//! stored. Using a token revokes it and issues a new one.

use super::RepoResult;
use sha2::{Digest, Sha256};
use shared::util::now_millis;
use sqlx::SqlitePool;

const DAY_MS: i64 = 24 * 60 * 60 * 1000;

fn hash_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// Issue a new refresh token for the user, valid for `ttl_days`
pub async fn create<'e, E>(executor: E, user_id: i64, ttl_days: i64) -> RepoResult<String>
where
    E: sqlx::SqliteExecutor<'e>,
{
    let token = uuid::Uuid::new_v4().to_string();
    let now = now_millis();

    sqlx::query(
        "INSERT INTO refresh_tokens (user_id, token_hash, expires_at, revoked, created_at) VALUES (?1, ?2, ?3, 0, ?4)",
    )
    .bind(user_id)
    .bind(hash_token(&token))
    .bind(now + ttl_days * DAY_MS)
    .bind(now)
    .execute(executor)
    .await?;

    Ok(token)
}

/// Validate and rotate a refresh token. Returns `(user_id, new_refresh_token)`.
///
/// Revoke and re-issue share one transaction: if issuing fails the old
/// token stays usable.
pub async fn rotate(
    pool: &SqlitePool,
    refresh_token: &str,
    ttl_days: i64,
) -> RepoResult<Option<(i64, String)>> {
    let hash = hash_token(refresh_token);
    let mut tx = pool.begin().await?;

    // 条件更新保证同一令牌只能被轮换一次
    let user_id: Option<i64> = sqlx::query_scalar(
        "UPDATE refresh_tokens SET revoked = 1 WHERE token_hash = ? AND revoked = 0 AND expires_at > ? RETURNING user_id",
    )
    .bind(&hash)
    .bind(now_millis())
    .fetch_optional(&mut *tx)
    .await?;

    let Some(user_id) = user_id else {
        return Ok(None);
    };

    let new_token = create(&mut *tx, user_id, ttl_days).await?;
    tx.commit().await?;
    Ok(Some((user_id, new_token)))
}

/// Revoke one token. Unknown or already revoked tokens are ignored.
pub async fn revoke(pool: &SqlitePool, refresh_token: &str) -> RepoResult<()> {
    sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE token_hash = ?")
        .bind(hash_token(refresh_token))
        .execute(pool)
        .await?;
    Ok(())
}

/// Revoke all refresh tokens of a user
pub async fn revoke_all(pool: &SqlitePool, user_id: i64) -> RepoResult<u64> {
    let result = sqlx::query("UPDATE refresh_tokens SET revoked = 1 WHERE user_id = ? AND revoked = 0")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

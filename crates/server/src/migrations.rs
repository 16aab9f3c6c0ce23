use sqlx::PgPool;
use storage::postgres::EMAIL_UNIQUE_CONSTRAINT;
use tracing::info;

/// Create the accounts table if it does not exist yet
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::Error> {
    let create_users = format!(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY,
            email TEXT NOT NULL,
            password_hash TEXT NOT NULL,
            role TEXT NOT NULL DEFAULT 'user',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            CONSTRAINT {} UNIQUE (email)
        )
        "#,
        EMAIL_UNIQUE_CONSTRAINT
    );

    sqlx::query(&create_users).execute(pool).await?;

    info!("Schema is up to date");
    Ok(())
}

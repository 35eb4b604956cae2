use sqlx::{Executor, Postgres};

pub struct UserService;

impl UserService {
    /// Create the user row on first write. Identity is owned by the token issuer;
    /// this table only anchors the foreign keys of ratings, favorites and meals.
    pub async fn ensure<'e, E>(executor: E, user_id: &str) -> anyhow::Result<()>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("INSERT INTO users (id) VALUES ($1) ON CONFLICT (id) DO NOTHING")
            .bind(user_id)
            .execute(executor)
            .await?;
        Ok(())
    }
}

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // One row per TikTok account that ever completed a login.
        let create_users_sql = r#"
            CREATE TABLE IF NOT EXISTS platform_users (
                open_id VARCHAR(255) PRIMARY KEY,
                union_id VARCHAR(255),
                display_name VARCHAR(255),
                avatar_url TEXT,

                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_users_sql)
            .await?;

        // Latest tokens per account. Ciphertext when TOKEN_ENCRYPTION_KEY is set.
        let create_tokens_sql = r#"
            CREATE TABLE IF NOT EXISTS platform_tokens (
                open_id VARCHAR(255) PRIMARY KEY
                    REFERENCES platform_users(open_id) ON DELETE CASCADE,

                access_token TEXT NOT NULL,
                refresh_token TEXT,
                token_type VARCHAR(50) NOT NULL DEFAULT 'Bearer',
                expires_in BIGINT NOT NULL,
                scopes TEXT NOT NULL DEFAULT '',

                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
        "#;

        manager
            .get_connection()
            .execute_unprepared(create_tokens_sql)
            .await?;

        manager
            .get_connection()
            .execute_unprepared(
                "CREATE INDEX IF NOT EXISTS idx_platform_users_updated_at
                 ON platform_users(updated_at DESC)",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS platform_tokens")
            .await?;

        manager
            .get_connection()
            .execute_unprepared("DROP TABLE IF EXISTS platform_users")
            .await?;

        Ok(())
    }
}

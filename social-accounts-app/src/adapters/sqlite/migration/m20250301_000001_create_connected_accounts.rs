use sea_orm_migration::prelude::*;
use sea_orm_migration::sea_orm::ConnectionTrait;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(ConnectedAccount::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConnectedAccount::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ConnectedAccount::UserId).string().not_null())
                    .col(ColumnDef::new(ConnectedAccount::Platform).string().not_null())
                    .col(ColumnDef::new(ConnectedAccount::Username).string().not_null())
                    .col(
                        ColumnDef::new(ConnectedAccount::UsernameKey)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConnectedAccount::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(ConnectedAccount::FollowerCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ConnectedAccount::FollowingCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ConnectedAccount::PostCount)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ConnectedAccount::ProfilePictureUrl)
                            .string()
                            .null(),
                    )
                    .col(
                        ColumnDef::new(ConnectedAccount::CreatedAt)
                            .string()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one active row per owner + platform + normalized username
        manager
            .get_connection()
            .execute_unprepared(
                "CREATE UNIQUE INDEX IF NOT EXISTS idx_connected_accounts_active_handle \
                 ON connected_accounts (user_id, platform, username_key) \
                 WHERE is_active = 1",
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(ConnectedAccount::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum ConnectedAccount {
    #[sea_orm(iden = "connected_accounts")]
    Table,
    Id,
    UserId,
    Platform,
    Username,
    UsernameKey,
    IsActive,
    FollowerCount,
    FollowingCount,
    PostCount,
    ProfilePictureUrl,
    CreatedAt,
}

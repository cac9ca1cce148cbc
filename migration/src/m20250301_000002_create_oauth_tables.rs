use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ==================== OAuth 配置表 ====================
        manager
            .create_table(
                Table::create()
                    .table(OAuthConfigs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OAuthConfigs::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(OAuthConfigs::ProviderType)
                            .string_len(10)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OAuthConfigs::AppKey)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OAuthConfigs::AppSecret)
                            .string_len(200)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OAuthConfigs::CallbackUrl)
                            .string_len(200)
                            .not_null()
                            .default("http://www.google.com"),
                    )
                    .col(
                        ColumnDef::new(OAuthConfigs::IsEnabled)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(OAuthConfigs::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OAuthConfigs::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // ==================== OAuth 用户表 ====================
        manager
            .create_table(
                Table::create()
                    .table(OAuthUsers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(OAuthUsers::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(OAuthUsers::UserId).big_integer().null())
                    .col(ColumnDef::new(OAuthUsers::OpenId).string().not_null())
                    .col(
                        ColumnDef::new(OAuthUsers::Nickname)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(OAuthUsers::Token).string_len(300).null())
                    .col(
                        ColumnDef::new(OAuthUsers::ProviderType)
                            .string_len(50)
                            .not_null(),
                    )
                    .col(ColumnDef::new(OAuthUsers::Email).string_len(50).null())
                    .col(ColumnDef::new(OAuthUsers::Metadata).text().null())
                    .col(
                        ColumnDef::new(OAuthUsers::CreatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(OAuthUsers::UpdatedAt)
                            .big_integer()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .from(OAuthUsers::Table, OAuthUsers::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_oauth_configs_provider_type")
                    .table(OAuthConfigs::Table)
                    .col(OAuthConfigs::ProviderType)
                    .to_owned(),
            )
            .await?;

        // 同一提供方的同一外部身份只保留一条记录
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("uq_oauth_users_provider_open_id")
                    .table(OAuthUsers::Table)
                    .col(OAuthUsers::ProviderType)
                    .col(OAuthUsers::OpenId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_oauth_users_user_id")
                    .table(OAuthUsers::Table)
                    .col(OAuthUsers::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(OAuthUsers::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(OAuthConfigs::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Users {
    #[sea_orm(iden = "users")]
    Table,
    Id,
}

#[derive(DeriveIden)]
enum OAuthConfigs {
    #[sea_orm(iden = "oauth_configs")]
    Table,
    Id,
    ProviderType,
    AppKey,
    AppSecret,
    CallbackUrl,
    IsEnabled,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum OAuthUsers {
    #[sea_orm(iden = "oauth_users")]
    Table,
    Id,
    UserId,
    OpenId,
    Nickname,
    Token,
    ProviderType,
    Email,
    Metadata,
    CreatedAt,
    UpdatedAt,
}

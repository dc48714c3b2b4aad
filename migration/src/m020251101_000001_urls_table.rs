use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 创建 urls 表
        manager
            .create_table(
                Table::create()
                    .table(Urls::Table)
                    .if_not_exists()
                    // 自增主键保留插入顺序，同一事务内的批量写入也能稳定排序
                    .col(
                        ColumnDef::new(Urls::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Urls::ShortUrl)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    // MySQL 唯一索引上限为 3072 字节（utf8mb4 下约 768 字符）
                    .col(ColumnDef::new(Urls::OriginalUrl).string_len(700).not_null())
                    .col(ColumnDef::new(Urls::UserId).string().not_null())
                    .col(
                        ColumnDef::new(Urls::IsDeleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Urls::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        // 原始 URL 唯一索引，重复缩短同一 URL 时由数据库拒绝
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_urls_original_url")
                    .table(Urls::Table)
                    .col(Urls::OriginalUrl)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // 按用户查询索引
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_urls_user_id")
                    .table(Urls::Table)
                    .col(Urls::UserId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_urls_user_id").to_owned())
            .await?;

        manager
            .drop_index(Index::drop().name("idx_urls_original_url").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Urls::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Urls {
    Table,
    Id,
    ShortUrl,
    OriginalUrl,
    UserId,
    IsDeleted,
    CreatedAt,
}

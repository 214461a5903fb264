use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(DeriveIden)]
enum Portfolios {
    Table,
    Name,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Index on portfolios.name for search and name ordering
        manager
            .create_index(
                Index::create()
                    .name("idx_portfolios_name")
                    .table(Portfolios::Table)
                    .col(Portfolios::Name)
                    .to_owned(),
            )
            .await?;

        // Index on portfolios.created_at for the default listing order
        manager
            .create_index(
                Index::create()
                    .name("idx_portfolios_created_at")
                    .table(Portfolios::Table)
                    .col(Portfolios::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_portfolios_name").to_owned())
            .await?;
        manager
            .drop_index(Index::drop().name("idx_portfolios_created_at").to_owned())
            .await?;

        Ok(())
    }
}

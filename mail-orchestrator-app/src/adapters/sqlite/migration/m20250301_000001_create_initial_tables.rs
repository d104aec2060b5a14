use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // users
        manager
            .create_table(
                Table::create()
                    .table(User::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(User::Id).string().not_null().primary_key())
                    .col(
                        ColumnDef::new(User::Domains)
                            .string()
                            .not_null()
                            .default("[]"),
                    )
                    .col(ColumnDef::new(User::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        // domain_claims (globally unique domain ownership)
        manager
            .create_table(
                Table::create()
                    .table(DomainClaim::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DomainClaim::Name)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DomainClaim::UserId).string().not_null())
                    .col(ColumnDef::new(DomainClaim::Kind).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_domain_claims_user_id")
                    .table(DomainClaim::Table)
                    .col(DomainClaim::UserId)
                    .to_owned(),
            )
            .await?;

        // deletion_jobs
        manager
            .create_table(
                Table::create()
                    .table(DeletionJob::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DeletionJob::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(DeletionJob::Kind).string().not_null())
                    .col(ColumnDef::new(DeletionJob::UserId).string().not_null())
                    .col(ColumnDef::new(DeletionJob::Domain).string().not_null())
                    .col(ColumnDef::new(DeletionJob::State).string().not_null())
                    .col(
                        ColumnDef::new(DeletionJob::AttemptsMade)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(DeletionJob::Progress)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(DeletionJob::LastError).string().null())
                    .col(ColumnDef::new(DeletionJob::CreatedAt).string().not_null())
                    .col(ColumnDef::new(DeletionJob::UpdatedAt).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_deletion_jobs_state")
                    .table(DeletionJob::Table)
                    .col(DeletionJob::State)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(DeletionJob::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DomainClaim::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(User::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum User {
    #[sea_orm(iden = "users")]
    Table,
    Id,
    Domains,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum DomainClaim {
    #[sea_orm(iden = "domain_claims")]
    Table,
    Name,
    UserId,
    Kind,
}

#[derive(DeriveIden)]
enum DeletionJob {
    #[sea_orm(iden = "deletion_jobs")]
    Table,
    Id,
    Kind,
    UserId,
    Domain,
    State,
    AttemptsMade,
    Progress,
    LastError,
    CreatedAt,
    UpdatedAt,
}

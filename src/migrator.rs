use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240101_000001_create_users_table::Migration),
            Box::new(m20240101_000002_create_zones_table::Migration),
            Box::new(m20240101_000003_create_brands_table::Migration),
            Box::new(m20240101_000004_create_clients_table::Migration),
            Box::new(m20240101_000005_create_comercials_table::Migration),
            Box::new(m20240101_000006_create_sales_table::Migration),
            Box::new(m20240101_000007_create_user_sales_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240101_000001_create_users_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000001_create_users_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Users::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Users::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Users::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                        .col(ColumnDef::new(Users::Username).string().not_null())
                        .col(ColumnDef::new(Users::Avatar).string())
                        .col(ColumnDef::new(Users::FirstName).string())
                        .col(ColumnDef::new(Users::FamilyName).string())
                        .col(ColumnDef::new(Users::Role).string().not_null())
                        .col(
                            ColumnDef::new(Users::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Users::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Users::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Users {
        Table,
        Id,
        Email,
        PasswordHash,
        Username,
        Avatar,
        FirstName,
        FamilyName,
        Role,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000002_create_zones_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000002_create_zones_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Zones::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Zones::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Zones::Name).string().not_null().unique_key())
                        .col(ColumnDef::new(Zones::Address).string().not_null())
                        .col(ColumnDef::new(Zones::Latitude).double().not_null())
                        .col(ColumnDef::new(Zones::Longitude).double().not_null())
                        .col(
                            ColumnDef::new(Zones::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Zones::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Zones::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Zones {
        Table,
        Id,
        Name,
        Address,
        Latitude,
        Longitude,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000003_create_brands_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000003_create_brands_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Brands::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Brands::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Brands::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Brands::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Brands::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Brands::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Brands {
        Table,
        Id,
        Name,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000004_create_clients_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000004_create_clients_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Clients::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Clients::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Clients::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Clients::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Clients::Address).string().not_null())
                        .col(ColumnDef::new(Clients::Latitude).double().not_null())
                        .col(ColumnDef::new(Clients::Longitude).double().not_null())
                        .col(
                            ColumnDef::new(Clients::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Clients::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Clients::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Clients {
        Table,
        Id,
        Name,
        Email,
        Address,
        Latitude,
        Longitude,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000005_create_comercials_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000005_create_comercials_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Comercials::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Comercials::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Comercials::Name)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Comercials::Email)
                                .string()
                                .not_null()
                                .unique_key(),
                        )
                        .col(
                            ColumnDef::new(Comercials::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Comercials::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Comercials::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Comercials {
        Table,
        Id,
        Name,
        Email,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240101_000006_create_sales_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000006_create_sales_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Sales::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Sales::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Sales::SaleNumber).big_integer().not_null())
                        .col(ColumnDef::new(Sales::Day).integer().not_null())
                        .col(ColumnDef::new(Sales::Month).integer().not_null())
                        .col(ColumnDef::new(Sales::Year).integer().not_null())
                        .col(ColumnDef::new(Sales::Date).string().not_null())
                        .col(ColumnDef::new(Sales::Business).string().not_null())
                        .col(
                            ColumnDef::new(Sales::Amount)
                                .decimal_len(12, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(Sales::ZoneId).uuid())
                        .col(ColumnDef::new(Sales::BrandId).uuid())
                        .col(ColumnDef::new(Sales::ClientId).uuid())
                        .col(ColumnDef::new(Sales::ComercialId).uuid())
                        .col(ColumnDef::new(Sales::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(Sales::UpdatedBy).uuid())
                        .col(ColumnDef::new(Sales::DeletedBy).uuid())
                        .col(
                            ColumnDef::new(Sales::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Sales::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_sales_created_by")
                                .from(Sales::Table, Sales::CreatedBy)
                                .to(Users::Table, Users::Id),
                        )
                        .to_owned(),
                )
                .await?;

            // Indexes for the common query paths
            manager
                .create_index(
                    Index::create()
                        .name("idx_sales_year_month")
                        .table(Sales::Table)
                        .col(Sales::Year)
                        .col(Sales::Month)
                        .to_owned(),
                )
                .await?;
            manager
                .create_index(
                    Index::create()
                        .name("idx_sales_business")
                        .table(Sales::Table)
                        .col(Sales::Business)
                        .to_owned(),
                )
                .await?;
            manager
                .create_index(
                    Index::create()
                        .name("idx_sales_created_by")
                        .table(Sales::Table)
                        .col(Sales::CreatedBy)
                        .to_owned(),
                )
                .await?;
            manager
                .create_index(
                    Index::create()
                        .name("idx_sales_zone_year")
                        .table(Sales::Table)
                        .col(Sales::ZoneId)
                        .col(Sales::Year)
                        .to_owned(),
                )
                .await?;
            manager
                .create_index(
                    Index::create()
                        .name("idx_sales_year_business")
                        .table(Sales::Table)
                        .col(Sales::Year)
                        .col(Sales::Business)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Sales::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum Sales {
        Table,
        Id,
        SaleNumber,
        Day,
        Month,
        Year,
        Date,
        Business,
        Amount,
        ZoneId,
        BrandId,
        ClientId,
        ComercialId,
        CreatedBy,
        UpdatedBy,
        DeletedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(Iden)]
    enum Users {
        Table,
        Id,
    }
}

mod m20240101_000007_create_user_sales_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240101_000007_create_user_sales_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(UserSales::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(UserSales::UserId).uuid().not_null())
                        .col(ColumnDef::new(UserSales::SaleId).uuid().not_null())
                        .primary_key(
                            Index::create()
                                .col(UserSales::UserId)
                                .col(UserSales::SaleId),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_user_sales_user")
                                .from(UserSales::Table, UserSales::UserId)
                                .to(Users::Table, Users::Id),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_user_sales_sale")
                                .from(UserSales::Table, UserSales::SaleId)
                                .to(Sales::Table, Sales::Id),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(UserSales::Table).to_owned())
                .await
        }
    }

    #[derive(Iden)]
    enum UserSales {
        Table,
        UserId,
        SaleId,
    }

    #[derive(Iden)]
    enum Users {
        Table,
        Id,
    }

    #[derive(Iden)]
    enum Sales {
        Table,
        Id,
    }
}

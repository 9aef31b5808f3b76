use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20240301_000001_create_profiles_table::Migration),
            Box::new(m20240301_000002_create_catalog_tables::Migration),
            Box::new(m20240301_000003_create_orders_tables::Migration),
            Box::new(m20240301_000004_create_change_requests_table::Migration),
            Box::new(m20240301_000005_create_progress_logs_table::Migration),
            Box::new(m20240301_000006_create_form_templates_table::Migration),
        ]
    }
}

// Migration implementations

mod m20240301_000001_create_profiles_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000001_create_profiles_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Profiles::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Profiles::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Profiles::DisplayName).string().not_null())
                        .col(ColumnDef::new(Profiles::Email).string().not_null())
                        .col(ColumnDef::new(Profiles::Phone).string().null())
                        .col(ColumnDef::new(Profiles::Role).string().not_null())
                        .col(
                            ColumnDef::new(Profiles::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(Profiles::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Profiles::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_profiles_email")
                        .table(Profiles::Table)
                        .col(Profiles::Email)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(Profiles::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Profiles {
        Table,
        Id,
        DisplayName,
        Email,
        Phone,
        Role,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000002_create_catalog_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000002_create_catalog_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ServiceTypes::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ServiceTypes::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ServiceTypes::Name).string().not_null())
                        .col(ColumnDef::new(ServiceTypes::Description).string().null())
                        .col(
                            ColumnDef::new(ServiceTypes::BasePriceCents)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ServiceTypes::BaseDays).integer().not_null())
                        .col(ColumnDef::new(ServiceTypes::Icon).string().null())
                        .col(
                            ColumnDef::new(ServiceTypes::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ServiceTypes::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(ServiceTypes::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(ServiceTypes::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ComplexityLevels::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ComplexityLevels::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ComplexityLevels::Name).string().not_null())
                        .col(ColumnDef::new(ComplexityLevels::Slug).string().not_null())
                        .col(
                            ColumnDef::new(ComplexityLevels::Multiplier)
                                .decimal()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ComplexityLevels::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ComplexityLevels::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(ComplexityLevels::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_complexity_levels_slug")
                        .table(ComplexityLevels::Table)
                        .col(ComplexityLevels::Slug)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ServiceComplexities::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ServiceComplexities::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceComplexities::ServiceId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceComplexities::ComplexityId)
                                .uuid()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceComplexities::OverrideMultiplier)
                                .decimal()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_service_complexities_service_complexity")
                        .table(ServiceComplexities::Table)
                        .col(ServiceComplexities::ServiceId)
                        .col(ServiceComplexities::ComplexityId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ServiceAddons::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ServiceAddons::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ServiceAddons::ServiceId).uuid().not_null())
                        .col(ColumnDef::new(ServiceAddons::Name).string().not_null())
                        .col(
                            ColumnDef::new(ServiceAddons::PriceCents)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceAddons::Required)
                                .boolean()
                                .not_null()
                                .default(false),
                        )
                        .col(
                            ColumnDef::new(ServiceAddons::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ServiceAddons::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(ColumnDef::new(ServiceAddons::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_service_addons_service_id")
                        .table(ServiceAddons::Table)
                        .col(ServiceAddons::ServiceId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ServiceAddons::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ServiceComplexities::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ComplexityLevels::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ServiceTypes::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ServiceTypes {
        Table,
        Id,
        Name,
        Description,
        BasePriceCents,
        BaseDays,
        Icon,
        SortOrder,
        Active,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum ComplexityLevels {
        Table,
        Id,
        Name,
        Slug,
        Multiplier,
        SortOrder,
        Active,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum ServiceComplexities {
        Table,
        Id,
        ServiceId,
        ComplexityId,
        OverrideMultiplier,
    }

    #[derive(DeriveIden)]
    pub(super) enum ServiceAddons {
        Table,
        Id,
        ServiceId,
        Name,
        PriceCents,
        Required,
        SortOrder,
        Active,
        CreatedAt,
    }
}

mod m20240301_000003_create_orders_tables {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000003_create_orders_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Orders::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Orders::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Orders::OrderNumber).string().not_null())
                        .col(ColumnDef::new(Orders::ClientId).uuid().not_null())
                        .col(ColumnDef::new(Orders::Status).string().not_null())
                        .col(
                            ColumnDef::new(Orders::EstimatedPriceCents)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Orders::EstimatedDays)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Orders::FinalPriceCents).big_integer().null())
                        .col(ColumnDef::new(Orders::FinalDays).integer().null())
                        .col(ColumnDef::new(Orders::Notes).string().null())
                        .col(ColumnDef::new(Orders::CreatedAt).timestamp().not_null())
                        .col(ColumnDef::new(Orders::UpdatedAt).timestamp().null())
                        .col(
                            ColumnDef::new(Orders::Version)
                                .integer()
                                .not_null()
                                .default(1),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_client_id")
                        .table(Orders::Table)
                        .col(Orders::ClientId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_status")
                        .table(Orders::Table)
                        .col(Orders::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_orders_order_number")
                        .table(Orders::Table)
                        .col(Orders::OrderNumber)
                        .unique()
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(OrderItems::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(OrderItems::OrderId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::KitName).string().not_null())
                        .col(ColumnDef::new(OrderItems::KitGrade).string().null())
                        .col(ColumnDef::new(OrderItems::ServiceId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::ComplexityId).uuid().not_null())
                        .col(ColumnDef::new(OrderItems::Notes).string().null())
                        .col(
                            ColumnDef::new(OrderItems::SubtotalCents)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderItems::AddonTotalCents)
                                .big_integer()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(OrderItems::TotalCents)
                                .big_integer()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItems::DurationDays).integer().not_null())
                        .col(ColumnDef::new(OrderItems::CreatedAt).timestamp().not_null())
                        .foreign_key(
                            ForeignKey::create()
                                .from(OrderItems::Table, OrderItems::OrderId)
                                .to(Orders::Table, Orders::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_items_order_id")
                        .table(OrderItems::Table)
                        .col(OrderItems::OrderId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(OrderItemAddons::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(OrderItemAddons::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(OrderItemAddons::OrderItemId).uuid().not_null())
                        .col(ColumnDef::new(OrderItemAddons::AddonId).uuid().not_null())
                        .col(
                            ColumnDef::new(OrderItemAddons::PriceCents)
                                .big_integer()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .from(OrderItemAddons::Table, OrderItemAddons::OrderItemId)
                                .to(OrderItems::Table, OrderItems::Id)
                                .on_delete(ForeignKeyAction::Cascade)
                                .on_update(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_order_item_addons_order_item_id")
                        .table(OrderItemAddons::Table)
                        .col(OrderItemAddons::OrderItemId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(OrderItemAddons::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(OrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Orders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Orders {
        Table,
        Id,
        OrderNumber,
        ClientId,
        Status,
        EstimatedPriceCents,
        EstimatedDays,
        FinalPriceCents,
        FinalDays,
        Notes,
        CreatedAt,
        UpdatedAt,
        Version,
    }

    #[derive(DeriveIden)]
    pub(super) enum OrderItems {
        Table,
        Id,
        OrderId,
        KitName,
        KitGrade,
        ServiceId,
        ComplexityId,
        Notes,
        SubtotalCents,
        AddonTotalCents,
        TotalCents,
        DurationDays,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum OrderItemAddons {
        Table,
        Id,
        OrderItemId,
        AddonId,
        PriceCents,
    }
}

mod m20240301_000004_create_change_requests_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000004_create_change_requests_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ChangeRequests::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ChangeRequests::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ChangeRequests::OrderId).uuid().not_null())
                        .col(ColumnDef::new(ChangeRequests::Description).string().not_null())
                        .col(
                            ColumnDef::new(ChangeRequests::PriceImpactCents)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(ChangeRequests::DayImpact)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(ChangeRequests::Status).string().not_null())
                        .col(ColumnDef::new(ChangeRequests::DecidedAt).timestamp().null())
                        .col(
                            ColumnDef::new(ChangeRequests::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ChangeRequests::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_change_requests_order_id")
                        .table(ChangeRequests::Table)
                        .col(ChangeRequests::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ChangeRequests::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ChangeRequests {
        Table,
        Id,
        OrderId,
        Description,
        PriceImpactCents,
        DayImpact,
        Status,
        DecidedAt,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20240301_000005_create_progress_logs_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000005_create_progress_logs_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ProgressLogs::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ProgressLogs::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ProgressLogs::OrderId).uuid().not_null())
                        .col(ColumnDef::new(ProgressLogs::OrderItemId).uuid().null())
                        .col(ColumnDef::new(ProgressLogs::Message).string().not_null())
                        .col(ColumnDef::new(ProgressLogs::PhotoUrl).string().null())
                        .col(ColumnDef::new(ProgressLogs::CreatedAt).timestamp().not_null())
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_progress_logs_order_id")
                        .table(ProgressLogs::Table)
                        .col(ProgressLogs::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ProgressLogs::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ProgressLogs {
        Table,
        Id,
        OrderId,
        OrderItemId,
        Message,
        PhotoUrl,
        CreatedAt,
    }
}

mod m20240301_000006_create_form_templates_table {

    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20240301_000006_create_form_templates_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(FormTemplates::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(FormTemplates::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(FormTemplates::Name).string().not_null())
                        .col(ColumnDef::new(FormTemplates::Fields).json().not_null())
                        .col(
                            ColumnDef::new(FormTemplates::Active)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(FormTemplates::CreatedAt)
                                .timestamp()
                                .not_null(),
                        )
                        .col(ColumnDef::new(FormTemplates::UpdatedAt).timestamp().null())
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(FormTemplates::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum FormTemplates {
        Table,
        Id,
        Name,
        Fields,
        Active,
        CreatedAt,
        UpdatedAt,
    }
}

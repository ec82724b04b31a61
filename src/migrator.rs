use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250101_000001_create_reference_tables::Migration),
            Box::new(m20250101_000002_create_service_requests_table::Migration),
            Box::new(m20250101_000003_create_inventory_tables::Migration),
            Box::new(m20250101_000004_create_invoice_tables::Migration),
            Box::new(m20250101_000005_create_purchase_order_tables::Migration),
            Box::new(m20250101_000006_create_document_sequences_table::Migration),
        ]
    }
}

// Migration implementations

mod m20250101_000001_create_reference_tables {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000001_create_reference_tables"
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
                        .col(ColumnDef::new(Clients::Name).string().not_null())
                        .col(ColumnDef::new(Clients::TaxId).string_len(20).null().unique_key())
                        .col(ColumnDef::new(Clients::RegistrationNumber).string_len(20).null())
                        .col(ColumnDef::new(Clients::ContactPerson).string().null())
                        .col(ColumnDef::new(Clients::Phone).string_len(50).null())
                        .col(ColumnDef::new(Clients::Email).string().null())
                        .col(ColumnDef::new(Clients::Address).text().null())
                        .col(ColumnDef::new(Clients::ManagerId).uuid().null())
                        .col(
                            ColumnDef::new(Clients::Status)
                                .string_len(20)
                                .not_null()
                                .default("active"),
                        )
                        .col(ColumnDef::new(Clients::Notes).text().null())
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
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_clients_status")
                        .table(Clients::Table)
                        .col(Clients::Status)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(ClientInteractions::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ClientInteractions::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(ClientInteractions::ClientId).uuid().not_null())
                        .col(ColumnDef::new(ClientInteractions::UserId).uuid().not_null())
                        .col(ColumnDef::new(ClientInteractions::Kind).string_len(20).not_null())
                        .col(ColumnDef::new(ClientInteractions::Summary).text().not_null())
                        .col(
                            ColumnDef::new(ClientInteractions::OccurredAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ClientInteractions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_client_interactions_client")
                                .from(ClientInteractions::Table, ClientInteractions::ClientId)
                                .to(Clients::Table, Clients::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_client_interactions_client_id")
                        .table(ClientInteractions::Table)
                        .col(ClientInteractions::ClientId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(Vendors::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Vendors::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(Vendors::Name).string().not_null())
                        .col(ColumnDef::new(Vendors::ContactPerson).string().null())
                        .col(ColumnDef::new(Vendors::Phone).string_len(50).null())
                        .col(ColumnDef::new(Vendors::Email).string().null())
                        .col(ColumnDef::new(Vendors::Address).text().null())
                        .col(ColumnDef::new(Vendors::TaxId).string_len(20).null())
                        .col(ColumnDef::new(Vendors::Notes).text().null())
                        .col(
                            ColumnDef::new(Vendors::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Vendors::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(EquipmentCatalog::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(EquipmentCatalog::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EquipmentCatalog::Name).string().not_null())
                        .col(ColumnDef::new(EquipmentCatalog::Model).string().null())
                        .col(ColumnDef::new(EquipmentCatalog::Manufacturer).string().null())
                        .col(ColumnDef::new(EquipmentCatalog::Category).string_len(100).null())
                        .col(ColumnDef::new(EquipmentCatalog::Description).text().null())
                        .col(ColumnDef::new(EquipmentCatalog::Price).decimal_len(14, 2).null())
                        .col(
                            ColumnDef::new(EquipmentCatalog::IsActive)
                                .boolean()
                                .not_null()
                                .default(true),
                        )
                        .col(
                            ColumnDef::new(EquipmentCatalog::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EquipmentCatalog::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(EquipmentUnits::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(EquipmentUnits::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(EquipmentUnits::ClientId).uuid().not_null())
                        .col(ColumnDef::new(EquipmentUnits::CatalogId).uuid().not_null())
                        .col(
                            ColumnDef::new(EquipmentUnits::SerialNumber)
                                .string_len(100)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(EquipmentUnits::InstallDate).date().null())
                        .col(ColumnDef::new(EquipmentUnits::Address).text().null())
                        .col(ColumnDef::new(EquipmentUnits::WarrantyUntil).date().null())
                        .col(
                            ColumnDef::new(EquipmentUnits::Status)
                                .string_len(20)
                                .not_null()
                                .default("active"),
                        )
                        .col(ColumnDef::new(EquipmentUnits::Notes).text().null())
                        .col(
                            ColumnDef::new(EquipmentUnits::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(EquipmentUnits::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_equipment_units_client")
                                .from(EquipmentUnits::Table, EquipmentUnits::ClientId)
                                .to(Clients::Table, Clients::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_equipment_units_catalog")
                                .from(EquipmentUnits::Table, EquipmentUnits::CatalogId)
                                .to(EquipmentCatalog::Table, EquipmentCatalog::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_equipment_units_client_id")
                        .table(EquipmentUnits::Table)
                        .col(EquipmentUnits::ClientId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(EquipmentUnits::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(EquipmentCatalog::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Vendors::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(ClientInteractions::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Clients::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum Clients {
        Table,
        Id,
        Name,
        TaxId,
        RegistrationNumber,
        ContactPerson,
        Phone,
        Email,
        Address,
        ManagerId,
        Status,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum ClientInteractions {
        Table,
        Id,
        ClientId,
        UserId,
        Kind,
        Summary,
        OccurredAt,
        CreatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum Vendors {
        Table,
        Id,
        Name,
        ContactPerson,
        Phone,
        Email,
        Address,
        TaxId,
        Notes,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum EquipmentCatalog {
        Table,
        Id,
        Name,
        Model,
        Manufacturer,
        Category,
        Description,
        Price,
        IsActive,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    pub(super) enum EquipmentUnits {
        Table,
        Id,
        ClientId,
        CatalogId,
        SerialNumber,
        InstallDate,
        Address,
        WarrantyUntil,
        Status,
        Notes,
        CreatedAt,
        UpdatedAt,
    }
}

mod m20250101_000002_create_service_requests_table {
    use super::m20250101_000001_create_reference_tables::{Clients, EquipmentUnits};
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000002_create_service_requests_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(ServiceRequests::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(ServiceRequests::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceRequests::Number)
                                .string_len(32)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(ServiceRequests::ClientId).uuid().not_null())
                        .col(ColumnDef::new(ServiceRequests::EquipmentId).uuid().not_null())
                        .col(ColumnDef::new(ServiceRequests::EngineerId).uuid().null())
                        .col(ColumnDef::new(ServiceRequests::CreatedBy).uuid().not_null())
                        .col(ColumnDef::new(ServiceRequests::Kind).string_len(20).not_null())
                        .col(ColumnDef::new(ServiceRequests::Priority).string_len(20).not_null())
                        .col(ColumnDef::new(ServiceRequests::Description).text().not_null())
                        .col(ColumnDef::new(ServiceRequests::Resolution).text().null())
                        .col(ColumnDef::new(ServiceRequests::Status).string_len(20).not_null())
                        .col(
                            ColumnDef::new(ServiceRequests::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(ServiceRequests::AssignedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ServiceRequests::StartedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ServiceRequests::ClosedAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(ServiceRequests::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_service_requests_client")
                                .from(ServiceRequests::Table, ServiceRequests::ClientId)
                                .to(Clients::Table, Clients::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_service_requests_equipment")
                                .from(ServiceRequests::Table, ServiceRequests::EquipmentId)
                                .to(EquipmentUnits::Table, EquipmentUnits::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            for (name, column) in [
                ("idx_service_requests_status", ServiceRequests::Status),
                ("idx_service_requests_equipment_id", ServiceRequests::EquipmentId),
                ("idx_service_requests_engineer_id", ServiceRequests::EngineerId),
            ] {
                manager
                    .create_index(
                        Index::create()
                            .if_not_exists()
                            .name(name)
                            .table(ServiceRequests::Table)
                            .col(column)
                            .to_owned(),
                    )
                    .await?;
            }

            Ok(())
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(ServiceRequests::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum ServiceRequests {
        Table,
        Id,
        Number,
        ClientId,
        EquipmentId,
        EngineerId,
        CreatedBy,
        Kind,
        Priority,
        Description,
        Resolution,
        Status,
        CreatedAt,
        AssignedAt,
        StartedAt,
        ClosedAt,
        UpdatedAt,
    }
}

mod m20250101_000003_create_inventory_tables {
    use super::m20250101_000001_create_reference_tables::{EquipmentCatalog, Vendors};
    use super::m20250101_000002_create_service_requests_table::ServiceRequests;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000003_create_inventory_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(SpareParts::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(SpareParts::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(SpareParts::Name).string().not_null())
                        .col(ColumnDef::new(SpareParts::PartNumber).string_len(100).null())
                        .col(ColumnDef::new(SpareParts::CatalogId).uuid().null())
                        .col(ColumnDef::new(SpareParts::VendorId).uuid().null())
                        .col(
                            ColumnDef::new(SpareParts::Quantity)
                                .integer()
                                .not_null()
                                .default(0)
                                .check(Expr::col(SpareParts::Quantity).gte(0)),
                        )
                        .col(
                            ColumnDef::new(SpareParts::MinQuantity)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SpareParts::Unit)
                                .string_len(16)
                                .not_null()
                                .default("pcs"),
                        )
                        .col(
                            ColumnDef::new(SpareParts::CostPrice)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(SpareParts::SalePrice)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(SpareParts::Location).string().null())
                        .col(
                            ColumnDef::new(SpareParts::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(SpareParts::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_spare_parts_catalog")
                                .from(SpareParts::Table, SpareParts::CatalogId)
                                .to(EquipmentCatalog::Table, EquipmentCatalog::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_spare_parts_vendor")
                                .from(SpareParts::Table, SpareParts::VendorId)
                                .to(Vendors::Table, Vendors::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PartsUsages::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(PartsUsages::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(PartsUsages::PartId).uuid().not_null())
                        .col(ColumnDef::new(PartsUsages::RequestId).uuid().not_null())
                        .col(ColumnDef::new(PartsUsages::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(PartsUsages::UnitPrice)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(PartsUsages::UsedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(PartsUsages::UsedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PartsUsages::Notes).text().null())
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_parts_usages_part")
                                .from(PartsUsages::Table, PartsUsages::PartId)
                                .to(SpareParts::Table, SpareParts::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_parts_usages_request")
                                .from(PartsUsages::Table, PartsUsages::RequestId)
                                .to(ServiceRequests::Table, ServiceRequests::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_parts_usages_request_id")
                        .table(PartsUsages::Table)
                        .col(PartsUsages::RequestId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_parts_usages_part_id")
                        .table(PartsUsages::Table)
                        .col(PartsUsages::PartId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PartsUsages::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(SpareParts::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    pub(super) enum SpareParts {
        Table,
        Id,
        Name,
        PartNumber,
        CatalogId,
        VendorId,
        Quantity,
        MinQuantity,
        Unit,
        CostPrice,
        SalePrice,
        Location,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum PartsUsages {
        Table,
        Id,
        PartId,
        RequestId,
        Quantity,
        UnitPrice,
        UsedBy,
        UsedAt,
        Notes,
    }
}

mod m20250101_000004_create_invoice_tables {
    use super::m20250101_000001_create_reference_tables::Clients;
    use super::m20250101_000002_create_service_requests_table::ServiceRequests;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000004_create_invoice_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(Invoices::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(Invoices::Id).uuid().primary_key().not_null())
                        .col(
                            ColumnDef::new(Invoices::Number)
                                .string_len(32)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(Invoices::ClientId).uuid().not_null())
                        .col(ColumnDef::new(Invoices::RequestId).uuid().null())
                        .col(ColumnDef::new(Invoices::Kind).string_len(20).not_null())
                        .col(ColumnDef::new(Invoices::Status).string_len(20).not_null())
                        .col(ColumnDef::new(Invoices::IssueDate).date().not_null())
                        .col(ColumnDef::new(Invoices::DueDate).date().null())
                        .col(
                            ColumnDef::new(Invoices::Subtotal)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Invoices::VatRate)
                                .decimal_len(5, 2)
                                .not_null()
                                .default(20),
                        )
                        .col(
                            ColumnDef::new(Invoices::VatAmount)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(Invoices::Total)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(ColumnDef::new(Invoices::Notes).text().null())
                        .col(ColumnDef::new(Invoices::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(Invoices::PaidAt)
                                .timestamp_with_time_zone()
                                .null(),
                        )
                        .col(
                            ColumnDef::new(Invoices::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Invoices::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoices_client")
                                .from(Invoices::Table, Invoices::ClientId)
                                .to(Clients::Table, Clients::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoices_request")
                                .from(Invoices::Table, Invoices::RequestId)
                                .to(ServiceRequests::Table, ServiceRequests::Id)
                                .on_delete(ForeignKeyAction::SetNull),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_invoices_client_id")
                        .table(Invoices::Table)
                        .col(Invoices::ClientId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(InvoiceItems::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(InvoiceItems::Id).uuid().primary_key().not_null())
                        .col(ColumnDef::new(InvoiceItems::InvoiceId).uuid().not_null())
                        .col(ColumnDef::new(InvoiceItems::Description).text().not_null())
                        .col(
                            ColumnDef::new(InvoiceItems::Quantity)
                                .decimal_len(12, 3)
                                .not_null(),
                        )
                        .col(ColumnDef::new(InvoiceItems::Unit).string_len(16).not_null())
                        .col(
                            ColumnDef::new(InvoiceItems::UnitPrice)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(ColumnDef::new(InvoiceItems::Total).decimal_len(14, 2).not_null())
                        .col(
                            ColumnDef::new(InvoiceItems::SortOrder)
                                .integer()
                                .not_null()
                                .default(0),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_invoice_items_invoice")
                                .from(InvoiceItems::Table, InvoiceItems::InvoiceId)
                                .to(Invoices::Table, Invoices::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_invoice_items_invoice_id")
                        .table(InvoiceItems::Table)
                        .col(InvoiceItems::InvoiceId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(InvoiceItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(Invoices::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum Invoices {
        Table,
        Id,
        Number,
        ClientId,
        RequestId,
        Kind,
        Status,
        IssueDate,
        DueDate,
        Subtotal,
        VatRate,
        VatAmount,
        Total,
        Notes,
        CreatedBy,
        PaidAt,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum InvoiceItems {
        Table,
        Id,
        InvoiceId,
        Description,
        Quantity,
        Unit,
        UnitPrice,
        Total,
        SortOrder,
    }
}

mod m20250101_000005_create_purchase_order_tables {
    use super::m20250101_000001_create_reference_tables::{EquipmentCatalog, Vendors};
    use super::m20250101_000003_create_inventory_tables::SpareParts;
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000005_create_purchase_order_tables"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrders::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrders::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::Number)
                                .string_len(32)
                                .not_null()
                                .unique_key(),
                        )
                        .col(ColumnDef::new(PurchaseOrders::VendorId).uuid().not_null())
                        .col(ColumnDef::new(PurchaseOrders::Status).string_len(20).not_null())
                        .col(ColumnDef::new(PurchaseOrders::OrderDate).date().not_null())
                        .col(ColumnDef::new(PurchaseOrders::ExpectedDate).date().null())
                        .col(ColumnDef::new(PurchaseOrders::ReceivedDate).date().null())
                        .col(
                            ColumnDef::new(PurchaseOrders::TotalAmount)
                                .decimal_len(14, 2)
                                .not_null()
                                .default(0),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::Currency)
                                .string_len(3)
                                .not_null()
                                .default("RUB"),
                        )
                        .col(ColumnDef::new(PurchaseOrders::Notes).text().null())
                        .col(ColumnDef::new(PurchaseOrders::CreatedBy).uuid().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrders::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrders::UpdatedAt)
                                .timestamp_with_time_zone()
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_orders_vendor")
                                .from(PurchaseOrders::Table, PurchaseOrders::VendorId)
                                .to(Vendors::Table, Vendors::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_orders_vendor_id")
                        .table(PurchaseOrders::Table)
                        .col(PurchaseOrders::VendorId)
                        .to_owned(),
                )
                .await?;

            manager
                .create_table(
                    Table::create()
                        .table(PurchaseOrderItems::Table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(PurchaseOrderItems::Id)
                                .uuid()
                                .primary_key()
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrderItems::OrderId).uuid().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrderItems::ItemType)
                                .string_len(20)
                                .not_null(),
                        )
                        .col(ColumnDef::new(PurchaseOrderItems::CatalogId).uuid().null())
                        .col(ColumnDef::new(PurchaseOrderItems::PartId).uuid().null())
                        .col(ColumnDef::new(PurchaseOrderItems::Description).text().not_null())
                        .col(ColumnDef::new(PurchaseOrderItems::Quantity).integer().not_null())
                        .col(
                            ColumnDef::new(PurchaseOrderItems::UnitPrice)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(PurchaseOrderItems::Total)
                                .decimal_len(14, 2)
                                .not_null(),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_order_items_order")
                                .from(PurchaseOrderItems::Table, PurchaseOrderItems::OrderId)
                                .to(PurchaseOrders::Table, PurchaseOrders::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_order_items_catalog")
                                .from(PurchaseOrderItems::Table, PurchaseOrderItems::CatalogId)
                                .to(EquipmentCatalog::Table, EquipmentCatalog::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name("fk_purchase_order_items_part")
                                .from(PurchaseOrderItems::Table, PurchaseOrderItems::PartId)
                                .to(SpareParts::Table, SpareParts::Id)
                                .on_delete(ForeignKeyAction::Restrict),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .if_not_exists()
                        .name("idx_purchase_order_items_order_id")
                        .table(PurchaseOrderItems::Table)
                        .col(PurchaseOrderItems::OrderId)
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(PurchaseOrderItems::Table).to_owned())
                .await?;
            manager
                .drop_table(Table::drop().table(PurchaseOrders::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum PurchaseOrders {
        Table,
        Id,
        Number,
        VendorId,
        Status,
        OrderDate,
        ExpectedDate,
        ReceivedDate,
        TotalAmount,
        Currency,
        Notes,
        CreatedBy,
        CreatedAt,
        UpdatedAt,
    }

    #[derive(DeriveIden)]
    enum PurchaseOrderItems {
        Table,
        Id,
        OrderId,
        ItemType,
        CatalogId,
        PartId,
        Description,
        Quantity,
        UnitPrice,
        Total,
    }
}

mod m20250101_000006_create_document_sequences_table {
    use sea_orm_migration::prelude::*;

    pub struct Migration;

    impl MigrationName for Migration {
        fn name(&self) -> &str {
            "m20250101_000006_create_document_sequences_table"
        }
    }

    #[async_trait::async_trait]
    impl MigrationTrait for Migration {
        async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .create_table(
                    Table::create()
                        .table(DocumentSequences::Table)
                        .if_not_exists()
                        .col(ColumnDef::new(DocumentSequences::Kind).string_len(32).not_null())
                        .col(ColumnDef::new(DocumentSequences::Year).integer().not_null())
                        .col(
                            ColumnDef::new(DocumentSequences::LastValue)
                                .big_integer()
                                .not_null()
                                .default(0),
                        )
                        .primary_key(
                            Index::create()
                                .col(DocumentSequences::Kind)
                                .col(DocumentSequences::Year),
                        )
                        .to_owned(),
                )
                .await
        }

        async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
            manager
                .drop_table(Table::drop().table(DocumentSequences::Table).to_owned())
                .await
        }
    }

    #[derive(DeriveIden)]
    enum DocumentSequences {
        Table,
        Kind,
        Year,
        LastValue,
    }
}

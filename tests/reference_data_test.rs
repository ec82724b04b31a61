//! Clients, equipment catalog and units, vendors.

mod common;

use assert_matches::assert_matches;
use chrono::{Duration, TimeZone, Utc};
use common::TestApp;
use fieldservice_api::{
    clock::Clock,
    entities::{client::ClientStatus, equipment_unit::EquipmentStatus, interaction::InteractionKind},
    errors::ServiceError,
    services::{
        clients::{ClientFilter, CreateClient, CreateInteraction, UpdateClient},
        equipment::{CatalogFilter, CreateCatalogItem, CreateEquipmentUnit, EquipmentFilter},
        purchase_orders::{CreatePurchaseOrder, PurchaseOrderItemInput},
        vendors::{UpdateVendor, VendorFilter},
    },
};
use rust_decimal_macros::dec;
use uuid::Uuid;

fn client_input(name: &str, tax_id: Option<&str>) -> CreateClient {
    CreateClient {
        name: name.to_string(),
        tax_id: tax_id.map(str::to_string),
        registration_number: None,
        contact_person: None,
        phone: Some("+7 495 000-00-00".to_string()),
        email: Some("office@example.com".to_string()),
        address: None,
        manager_id: None,
        notes: None,
    }
}

#[tokio::test]
async fn client_crud_and_soft_deactivation() {
    let app = TestApp::new().await;
    let clients = &app.state.services.clients;

    let created = clients
        .create(&app.engineer, client_input("  Teplo LLC ", Some("7701234567")))
        .await
        .unwrap();
    assert_eq!(created.name, "Teplo LLC");
    assert_eq!(created.status, ClientStatus::Active);

    let updated = clients
        .update(
            &app.engineer,
            created.id,
            UpdateClient {
                contact_person: Some("Ivanova".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.contact_person.as_deref(), Some("Ivanova"));
    assert_eq!(updated.tax_id.as_deref(), Some("7701234567"), "untouched fields survive");

    clients.deactivate(&app.manager, created.id).await.unwrap();

    let active = clients.list(ClientFilter::default()).await.unwrap();
    assert!(active.is_empty());
    let inactive = clients
        .list(ClientFilter {
            search: None,
            status: Some(ClientStatus::Inactive),
        })
        .await
        .unwrap();
    assert_eq!(inactive.len(), 1);
    assert_eq!(clients.get(created.id).await.unwrap().status, ClientStatus::Inactive);
}

#[tokio::test]
async fn client_validation_and_duplicate_tax_id() {
    let app = TestApp::new().await;
    let clients = &app.state.services.clients;

    assert_matches!(
        clients.create(&app.engineer, client_input(" ", None)).await,
        Err(ServiceError::ValidationError(_))
    );
    assert_matches!(
        clients
            .create(&app.engineer, client_input("Short Tax", Some("123")))
            .await,
        Err(ServiceError::ValidationError(_))
    );
    let mut bad_email = client_input("Mail Co", None);
    bad_email.email = Some("not-an-email".to_string());
    assert_matches!(
        clients.create(&app.engineer, bad_email).await,
        Err(ServiceError::ValidationError(_))
    );

    clients
        .create(&app.engineer, client_input("First", Some("7701234567")))
        .await
        .unwrap();
    assert_matches!(
        clients
            .create(&app.engineer, client_input("Second", Some("7701234567")))
            .await,
        Err(ServiceError::Conflict(_))
    );
}

#[tokio::test]
async fn client_search_matches_name_and_tax_id() {
    let app = TestApp::new().await;
    let clients = &app.state.services.clients;
    clients
        .create(&app.engineer, client_input("Boiler House", Some("5009876543")))
        .await
        .unwrap();
    clients
        .create(&app.engineer, client_input("Aqua Systems", None))
        .await
        .unwrap();

    let by_name = clients
        .list(ClientFilter {
            search: Some("Aqua".to_string()),
            status: None,
        })
        .await
        .unwrap();
    assert_eq!(by_name.len(), 1);
    assert_eq!(by_name[0].name, "Aqua Systems");

    let by_tax = clients
        .list(ClientFilter {
            search: Some("500987".to_string()),
            status: None,
        })
        .await
        .unwrap();
    assert_eq!(by_tax.len(), 1);
    assert_eq!(by_tax[0].name, "Boiler House");
}

#[tokio::test]
async fn interactions_are_logged_newest_first() {
    let app = TestApp::new().await;
    let client = app.seed_client("Teplo LLC").await;
    let clients = &app.state.services.clients;

    let call = clients
        .add_interaction(
            &app.engineer,
            client.id,
            CreateInteraction {
                kind: InteractionKind::Call,
                summary: "Asked about a maintenance contract".to_string(),
                occurred_at: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(call.user_id, app.engineer.user_id);

    let meeting = clients
        .add_interaction(
            &app.manager,
            client.id,
            CreateInteraction {
                kind: InteractionKind::Meeting,
                summary: "Site visit".to_string(),
                occurred_at: Some(Utc.with_ymd_and_hms(2025, 3, 12, 14, 0, 0).unwrap()),
            },
        )
        .await
        .unwrap();

    let log = clients.interactions(client.id).await.unwrap();
    let ids: Vec<_> = log.iter().map(|i| i.id).collect();
    assert_eq!(ids, vec![meeting.id, call.id]);

    let err = clients
        .add_interaction(
            &app.engineer,
            Uuid::new_v4(),
            CreateInteraction {
                kind: InteractionKind::Email,
                summary: "Lost".to_string(),
                occurred_at: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(_));
}

#[tokio::test]
async fn catalog_is_admin_maintained_and_soft_deleted() {
    let app = TestApp::new().await;
    let equipment = &app.state.services.equipment;

    let input = CreateCatalogItem {
        name: "Condensing boiler".to_string(),
        model: Some("CB-24".to_string()),
        manufacturer: Some("Termo".to_string()),
        category: Some("boilers".to_string()),
        description: None,
        price: Some(dec!(98000.00)),
    };
    assert_matches!(
        equipment.create_catalog_item(&app.manager, input.clone()).await,
        Err(ServiceError::Forbidden(_))
    );

    let item = equipment
        .create_catalog_item(&app.admin, input)
        .await
        .unwrap();
    app.seed_catalog_item("Water heater").await;

    let boilers = equipment
        .list_catalog(CatalogFilter {
            category: None,
            search: Some("CB-2".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(boilers.len(), 1);
    assert_eq!(boilers[0].id, item.id);

    equipment
        .deactivate_catalog_item(&app.admin, item.id)
        .await
        .unwrap();
    let remaining = equipment
        .list_catalog(CatalogFilter::default())
        .await
        .unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "Water heater");
    assert!(!equipment.get_catalog_item(item.id).await.unwrap().is_active);
}

#[tokio::test]
async fn serial_numbers_are_unique() {
    let app = TestApp::new().await;
    let (client, unit) = app.seed_site("SN-DUP-1").await;

    let err = app
        .state
        .services
        .equipment
        .create_unit(
            &app.engineer,
            CreateEquipmentUnit {
                client_id: client.id,
                catalog_id: unit.catalog_id,
                serial_number: " SN-DUP-1 ".to_string(),
                install_date: None,
                address: None,
                warranty_until: None,
                notes: None,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Conflict(msg) if msg.contains("SN-DUP-1"));
}

#[tokio::test]
async fn units_filter_by_client_and_status() {
    let app = TestApp::new().await;
    let (client, first) = app.seed_site("SN-A").await;
    let second = app.seed_equipment(client.id, "SN-B").await;
    app.seed_site("SN-C").await;
    let equipment = &app.state.services.equipment;

    app.open_request(client.id, second.id).await;

    let owned = equipment
        .list_units(EquipmentFilter {
            client_id: Some(client.id),
            status: None,
        })
        .await
        .unwrap();
    let serials: Vec<_> = owned.iter().map(|u| u.serial_number.as_str()).collect();
    assert_eq!(serials, vec!["SN-A", "SN-B"]);

    let in_repair = equipment
        .list_units(EquipmentFilter {
            client_id: None,
            status: Some(EquipmentStatus::InRepair),
        })
        .await
        .unwrap();
    assert_eq!(in_repair.len(), 1);
    assert_eq!(in_repair[0].id, second.id);

    assert_matches!(
        equipment.decommission_unit(&app.engineer, first.id).await,
        Err(ServiceError::Forbidden(_))
    );
}

#[tokio::test]
async fn vendors_with_orders_cannot_be_deleted() {
    let app = TestApp::new().await;
    let busy = app.seed_vendor("Parts Supply").await;
    let idle = app.seed_vendor("Idle Trading").await;
    let part = app.seed_part("electrode", 0, 0).await;
    let vendors = &app.state.services.vendors;

    app.state
        .services
        .purchase_orders
        .create(
            &app.manager,
            CreatePurchaseOrder {
                vendor_id: busy.id,
                order_date: app.clock.today(),
                expected_date: None,
                currency: None,
                notes: None,
                items: vec![PurchaseOrderItemInput {
                    item_type: None,
                    catalog_id: None,
                    part_id: Some(part.part.id),
                    description: "Electrodes".to_string(),
                    quantity: 5,
                    unit_price: dec!(10.00),
                }],
            },
        )
        .await
        .unwrap();

    let err = vendors.delete(&app.manager, busy.id).await.unwrap_err();
    assert_matches!(err, ServiceError::Conflict(msg) if msg.contains("Parts Supply"));
    assert!(vendors.get(busy.id).await.is_ok());

    assert_matches!(
        vendors.delete(&app.engineer, idle.id).await,
        Err(ServiceError::Forbidden(_))
    );
    vendors.delete(&app.manager, idle.id).await.unwrap();
    assert_matches!(vendors.get(idle.id).await, Err(ServiceError::NotFound(_)));
}

#[tokio::test]
async fn vendor_updates_and_search() {
    let app = TestApp::new().await;
    let vendor = app.seed_vendor("Parts Supply").await;
    app.seed_vendor("Boilers Inc").await;
    let vendors = &app.state.services.vendors;

    app.clock.advance(Duration::minutes(1));
    let updated = vendors
        .update(
            &app.manager,
            vendor.id,
            UpdateVendor {
                contact_person: Some("Sidorov".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.contact_person.as_deref(), Some("Sidorov"));
    assert!(updated.updated_at > vendor.updated_at);

    let found = vendors
        .list(VendorFilter {
            search: Some("Sidor".to_string()),
        })
        .await
        .unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].id, vendor.id);
}

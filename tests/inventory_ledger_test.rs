//! Spare-parts stock: receipts, consumption against requests and the
//! guarantee that stock never goes negative.

mod common;

use assert_matches::assert_matches;
use chrono::Duration;
use common::TestApp;
use fieldservice_api::{
    errors::ServiceError,
    services::inventory::{CreateSparePart, PartFilter, ReceiveStock, UpdateSparePart, UsePart},
};
use rust_decimal_macros::dec;
use uuid::Uuid;

fn usage(request_id: Uuid, quantity: i32) -> UsePart {
    UsePart {
        request_id,
        quantity,
        unit_price: None,
        notes: None,
    }
}

#[tokio::test]
async fn use_part_decrements_stock_and_records_usage() {
    let app = TestApp::new().await;
    let (client, unit) = app.seed_site("SN-INV-1").await;
    let request = app.open_request(client.id, unit.id).await;
    let part = app.seed_part("thermocouple", 5, 2).await;
    assert_eq!(part.part.unit, "pcs");
    assert!(!part.low_stock);

    let record = app
        .state
        .services
        .inventory
        .use_part(&app.engineer, part.part.id, usage(request.id, 3))
        .await
        .unwrap();
    assert_eq!(record.quantity, 3);
    assert_eq!(record.unit_price, dec!(600.00), "defaults to the sale price");
    assert_eq!(record.used_by, app.engineer.user_id);
    assert_eq!(record.request_id, request.id);

    let after = app.state.services.inventory.get_part(part.part.id).await.unwrap();
    assert_eq!(after.part.quantity, 2);
    assert!(after.low_stock, "quantity equal to the threshold counts as low");
}

#[tokio::test]
async fn insufficient_stock_is_rejected_without_side_effects() {
    let app = TestApp::new().await;
    let (client, unit) = app.seed_site("SN-INV-2").await;
    let request = app.open_request(client.id, unit.id).await;
    let part = app.seed_part("nozzle", 2, 0).await;
    let inventory = &app.state.services.inventory;

    let err = inventory
        .use_part(&app.engineer, part.part.id, usage(request.id, 3))
        .await
        .unwrap_err();
    assert_matches!(
        &err,
        ServiceError::InsufficientStock { part, available: 2, unit } if part == "nozzle" && unit == "pcs"
    );
    assert_eq!(err.to_string(), "Insufficient stock for nozzle: available 2 pcs");

    let untouched = inventory.get_part(part.part.id).await.unwrap();
    assert_eq!(untouched.part.quantity, 2);
    assert!(inventory.usages(part.part.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn use_part_validates_quantity_and_request() {
    let app = TestApp::new().await;
    let (client, unit) = app.seed_site("SN-INV-3").await;
    let request = app.open_request(client.id, unit.id).await;
    let part = app.seed_part("fuse", 4, 0).await;
    let inventory = &app.state.services.inventory;

    for quantity in [0, -1] {
        let err = inventory
            .use_part(&app.engineer, part.part.id, usage(request.id, quantity))
            .await
            .unwrap_err();
        assert_matches!(err, ServiceError::ValidationError(_));
    }

    let err = inventory
        .use_part(&app.engineer, part.part.id, usage(Uuid::new_v4(), 1))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(msg) if msg.starts_with("Service request"));

    let err = inventory
        .use_part(&app.engineer, Uuid::new_v4(), usage(request.id, 1))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::NotFound(msg) if msg.starts_with("Spare part"));

    let stock = inventory.get_part(part.part.id).await.unwrap();
    assert_eq!(stock.part.quantity, 4);
}

#[tokio::test]
async fn concurrent_consumers_never_oversell() {
    let app = TestApp::new().await;
    let (client, unit) = app.seed_site("SN-INV-4").await;
    let request = app.open_request(client.id, unit.id).await;
    let part = app.seed_part("filter", 10, 0).await;

    let mut tasks = vec![];
    for _ in 0..20 {
        let inventory = app.state.services.inventory.clone();
        let actor = app.engineer.clone();
        let part_id = part.part.id;
        let request_id = request.id;
        tasks.push(tokio::spawn(async move {
            inventory
                .use_part(&actor, part_id, usage(request_id, 1))
                .await
        }));
    }

    let mut success = 0;
    let mut rejected = 0;
    for task in tasks {
        match task.await.expect("task panicked") {
            Ok(_) => success += 1,
            Err(ServiceError::InsufficientStock { .. }) => rejected += 1,
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    assert_eq!(success, 10, "exactly the available quantity can be used");
    assert_eq!(rejected, 10);

    let inventory = &app.state.services.inventory;
    let drained = inventory.get_part(part.part.id).await.unwrap();
    assert_eq!(drained.part.quantity, 0);
    assert_eq!(inventory.usages(part.part.id).await.unwrap().len(), 10);
}

#[tokio::test]
async fn receive_adds_stock_and_rejects_non_positive_quantities() {
    let app = TestApp::new().await;
    let part = app.seed_part("relay", 1, 3).await;
    let inventory = &app.state.services.inventory;

    let restocked = inventory
        .receive(&app.engineer, part.part.id, ReceiveStock { quantity: 7 })
        .await
        .unwrap();
    assert_eq!(restocked.part.quantity, 8);
    assert!(!restocked.low_stock);

    let err = inventory
        .receive(&app.engineer, part.part.id, ReceiveStock { quantity: 0 })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));
}

#[tokio::test]
async fn low_stock_listing_follows_thresholds() {
    let app = TestApp::new().await;
    let low = app.seed_part("gasket", 1, 5).await;
    let edge = app.seed_part("bolt", 5, 5).await;
    app.seed_part("washer", 50, 5).await;
    let inventory = &app.state.services.inventory;

    let flagged: Vec<_> = inventory
        .low_stock()
        .await
        .unwrap()
        .into_iter()
        .map(|p| p.part.id)
        .collect();
    assert_eq!(flagged, vec![edge.part.id, low.part.id], "alphabetical by name");

    inventory
        .update_part(
            &app.engineer,
            edge.part.id,
            UpdateSparePart {
                min_quantity: Some(1),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    let flagged = inventory.low_stock().await.unwrap();
    assert_eq!(flagged.len(), 1);
    assert_eq!(flagged[0].part.id, low.part.id);

    let searched = inventory
        .list_parts(PartFilter {
            search: Some("PN-WASH".to_string()),
            low_stock: None,
        })
        .await
        .unwrap();
    assert_eq!(searched.len(), 1);
    assert_eq!(searched[0].part.name, "washer");
}

#[tokio::test]
async fn usages_are_listed_newest_first() {
    let app = TestApp::new().await;
    let (client, unit) = app.seed_site("SN-INV-5").await;
    let request = app.open_request(client.id, unit.id).await;
    let part = app.seed_part("pump", 10, 0).await;
    let inventory = &app.state.services.inventory;

    let first = inventory
        .use_part(&app.engineer, part.part.id, usage(request.id, 1))
        .await
        .unwrap();
    app.clock.advance(Duration::minutes(5));
    let second = inventory
        .use_part(
            &app.manager,
            part.part.id,
            UsePart {
                request_id: request.id,
                quantity: 2,
                unit_price: Some(dec!(550.00)),
                notes: Some("discounted".to_string()),
            },
        )
        .await
        .unwrap();

    let ids: Vec<_> = inventory
        .usages(part.part.id)
        .await
        .unwrap()
        .into_iter()
        .map(|u| u.id)
        .collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test]
async fn create_part_rejects_negative_values() {
    let app = TestApp::new().await;
    let inventory = &app.state.services.inventory;

    let mut input = fieldservice_api::services::inventory::CreateSparePart {
        name: "Sensor".to_string(),
        part_number: None,
        catalog_id: None,
        vendor_id: None,
        quantity: -1,
        min_quantity: 0,
        unit: Some("m".to_string()),
        cost_price: dec!(1.00),
        sale_price: dec!(2.00),
        location: None,
    };
    assert_matches!(
        inventory.create_part(&app.engineer, input.clone()).await,
        Err(ServiceError::ValidationError(_))
    );

    input.quantity = 0;
    input.sale_price = dec!(-2.00);
    assert_matches!(
        inventory.create_part(&app.engineer, input.clone()).await,
        Err(ServiceError::ValidationError(_))
    );

    input.sale_price = dec!(2.00);
    input.vendor_id = Some(Uuid::new_v4());
    assert_matches!(
        inventory.create_part(&app.engineer, input).await,
        Err(ServiceError::NotFound(_))
    );
}

#[tokio::test]
async fn receive_rejects_quantities_that_overflow_stock() {
    let app = TestApp::new().await;
    let part = app.seed_part("gasket", i32::MAX - 1, 0).await;

    let err = app
        .state
        .services
        .inventory
        .receive(&app.engineer, part.part.id, ReceiveStock { quantity: 2 })
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(msg) if msg.contains("gasket"));

    let unchanged = app.state.services.inventory.get_part(part.part.id).await.unwrap();
    assert_eq!(unchanged.part.quantity, i32::MAX - 1);
}

#[tokio::test]
async fn configured_default_unit_applies_to_new_parts() {
    let app = TestApp::with_config(|cfg| cfg.default_unit = "set".to_string()).await;

    let part = app
        .state
        .services
        .inventory
        .create_part(
            &app.engineer,
            CreateSparePart {
                name: "o-ring kit".to_string(),
                part_number: None,
                catalog_id: None,
                vendor_id: None,
                quantity: 4,
                min_quantity: 1,
                unit: None,
                cost_price: dec!(3.00),
                sale_price: dec!(5.00),
                location: None,
            },
        )
        .await
        .unwrap();
    assert_eq!(part.part.unit, "set");
}

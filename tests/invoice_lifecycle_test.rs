//! Invoice drafting, totals and status flow.

mod common;

use assert_matches::assert_matches;
use chrono::NaiveDate;
use common::TestApp;
use fieldservice_api::{
    entities::invoice::{InvoiceKind, InvoiceStatus},
    errors::ServiceError,
    services::invoices::{CreateInvoice, InvoiceDetails, InvoiceItemInput, SetInvoiceStatus},
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

fn item(description: &str, quantity: Decimal, unit_price: Decimal) -> InvoiceItemInput {
    InvoiceItemInput {
        description: description.to_string(),
        quantity,
        unit: None,
        unit_price,
        sort_order: None,
    }
}

fn issue_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 10).unwrap()
}

async fn draft_invoice(app: &TestApp, client_id: Uuid) -> InvoiceDetails {
    app.state
        .services
        .invoices
        .create(
            &app.engineer,
            CreateInvoice {
                client_id,
                request_id: None,
                kind: None,
                issue_date: issue_date(),
                due_date: NaiveDate::from_ymd_opt(2025, 3, 24),
                vat_rate: None,
                notes: None,
                items: vec![
                    item("Diagnostics", dec!(2), dec!(100.00)),
                    item("Gasket", dec!(1), dec!(50.00)),
                ],
            },
        )
        .await
        .expect("create draft invoice")
}

async fn set_status(
    app: &TestApp,
    id: Uuid,
    status: InvoiceStatus,
) -> Result<InvoiceDetails, ServiceError> {
    app.state
        .services
        .invoices
        .set_status(&app.manager, id, SetInvoiceStatus { status })
        .await
}

#[tokio::test]
async fn create_derives_totals_at_default_vat() {
    let app = TestApp::new().await;
    let client = app.seed_client("Teplo LLC").await;

    let details = draft_invoice(&app, client.id).await;
    let invoice = &details.invoice;

    assert_eq!(invoice.number, "SCH-2025-00001");
    assert_eq!(invoice.status, InvoiceStatus::Draft);
    assert_eq!(invoice.kind, InvoiceKind::Service);
    assert_eq!(invoice.vat_rate, dec!(20));
    assert_eq!(invoice.subtotal, dec!(250.00));
    assert_eq!(invoice.vat_amount, dec!(50.00));
    assert_eq!(invoice.total, dec!(300.00));

    assert_eq!(details.items.len(), 2);
    assert_eq!(details.items[0].description, "Diagnostics");
    assert_eq!(details.items[0].total, dec!(200.00));
    assert_eq!(details.items[0].unit, "pcs");
    assert_eq!(details.items[1].sort_order, 1);
}

#[tokio::test]
async fn adding_and_removing_items_recomputes_totals() {
    let app = TestApp::new().await;
    let client = app.seed_client("Teplo LLC").await;
    let invoices = &app.state.services.invoices;
    let draft = draft_invoice(&app, client.id).await;

    let extended = invoices
        .add_item(
            &app.engineer,
            draft.invoice.id,
            item("Travel", dec!(1.5), dec!(33.33)),
        )
        .await
        .unwrap();
    // 1.5 x 33.33 = 49.995, rounds half to even
    let travel = extended.items.last().unwrap();
    assert_eq!(travel.total, dec!(50.00));
    assert_eq!(travel.sort_order, 2);
    assert_eq!(extended.invoice.subtotal, dec!(300.00));
    assert_eq!(extended.invoice.vat_amount, dec!(60.00));
    assert_eq!(extended.invoice.total, dec!(360.00));

    let gasket = extended
        .items
        .iter()
        .find(|i| i.description == "Gasket")
        .unwrap()
        .id;
    let reduced = invoices
        .remove_item(&app.engineer, draft.invoice.id, gasket)
        .await
        .unwrap();
    assert_eq!(reduced.items.len(), 2);
    assert_eq!(reduced.invoice.subtotal, dec!(250.00));
    assert_eq!(reduced.invoice.total, dec!(300.00));

    for line in reduced.items.clone() {
        invoices
            .remove_item(&app.engineer, draft.invoice.id, line.id)
            .await
            .unwrap();
    }
    let empty = invoices.get(draft.invoice.id).await.unwrap();
    assert!(empty.items.is_empty());
    assert_eq!(empty.invoice.subtotal, Decimal::ZERO);
    assert_eq!(empty.invoice.vat_amount, Decimal::ZERO);
    assert_eq!(empty.invoice.total, Decimal::ZERO);
}

#[tokio::test]
async fn items_are_frozen_once_sent() {
    let app = TestApp::new().await;
    let client = app.seed_client("Teplo LLC").await;
    let invoices = &app.state.services.invoices;
    let draft = draft_invoice(&app, client.id).await;

    set_status(&app, draft.invoice.id, InvoiceStatus::Sent)
        .await
        .unwrap();

    let err = invoices
        .add_item(
            &app.engineer,
            draft.invoice.id,
            item("Late fee", dec!(1), dec!(10.00)),
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(msg) if msg.contains("draft"));

    let err = invoices
        .remove_item(&app.engineer, draft.invoice.id, draft.items[0].id)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let unchanged = invoices.get(draft.invoice.id).await.unwrap();
    assert_eq!(unchanged.items.len(), 2);
    assert_eq!(unchanged.invoice.total, dec!(300.00));
}

#[tokio::test]
async fn payment_stamps_paid_at_and_is_final() {
    let app = TestApp::new().await;
    let client = app.seed_client("Teplo LLC").await;
    let draft = draft_invoice(&app, client.id).await;

    let err = set_status(&app, draft.invoice.id, InvoiceStatus::Paid)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidTransition { entity: "invoice", .. });

    set_status(&app, draft.invoice.id, InvoiceStatus::Sent)
        .await
        .unwrap();
    let paid = set_status(&app, draft.invoice.id, InvoiceStatus::Paid)
        .await
        .unwrap();
    assert_eq!(paid.invoice.status, InvoiceStatus::Paid);
    assert!(paid.invoice.paid_at.is_some());

    let err = set_status(&app, draft.invoice.id, InvoiceStatus::Cancelled)
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::InvalidTransition { .. });
}

#[tokio::test]
async fn status_changes_need_a_manager() {
    let app = TestApp::new().await;
    let client = app.seed_client("Teplo LLC").await;
    let draft = draft_invoice(&app, client.id).await;

    let err = app
        .state
        .services
        .invoices
        .set_status(
            &app.engineer,
            draft.invoice.id,
            SetInvoiceStatus {
                status: InvoiceStatus::Sent,
            },
        )
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::Forbidden(_));
}

#[tokio::test]
async fn create_validates_input() {
    let app = TestApp::new().await;
    let client = app.seed_client("Teplo LLC").await;
    let invoices = &app.state.services.invoices;

    let base = CreateInvoice {
        client_id: client.id,
        request_id: None,
        kind: Some(InvoiceKind::Parts),
        issue_date: issue_date(),
        due_date: None,
        vat_rate: Some(dec!(10)),
        notes: None,
        items: vec![item("Filter", dec!(1), dec!(10.00))],
    };

    let no_items = CreateInvoice {
        items: vec![],
        ..base.clone()
    };
    assert_matches!(
        invoices.create(&app.engineer, no_items).await,
        Err(ServiceError::ValidationError(_))
    );

    let negative_price = CreateInvoice {
        items: vec![item("Refund", dec!(1), dec!(-5.00))],
        ..base.clone()
    };
    assert_matches!(
        invoices.create(&app.engineer, negative_price).await,
        Err(ServiceError::ValidationError(_))
    );

    let zero_quantity = CreateInvoice {
        items: vec![item("Nothing", dec!(0), dec!(5.00))],
        ..base.clone()
    };
    assert_matches!(
        invoices.create(&app.engineer, zero_quantity).await,
        Err(ServiceError::ValidationError(_))
    );

    let bad_vat = CreateInvoice {
        vat_rate: Some(dec!(120)),
        ..base.clone()
    };
    assert_matches!(
        invoices.create(&app.engineer, bad_vat).await,
        Err(ServiceError::ValidationError(_))
    );

    let due_before_issue = CreateInvoice {
        due_date: NaiveDate::from_ymd_opt(2025, 3, 1),
        ..base.clone()
    };
    assert_matches!(
        invoices.create(&app.engineer, due_before_issue).await,
        Err(ServiceError::ValidationError(_))
    );

    let unknown_client = CreateInvoice {
        client_id: Uuid::new_v4(),
        ..base.clone()
    };
    assert_matches!(
        invoices.create(&app.engineer, unknown_client).await,
        Err(ServiceError::NotFound(_))
    );

    // Rejections above must not burn numbers
    let created = invoices.create(&app.engineer, base).await.unwrap();
    assert_eq!(created.invoice.number, "SCH-2025-00001");
    assert_eq!(created.invoice.vat_rate, dec!(10));
    assert_eq!(created.invoice.total, dec!(11.00));
}

#[tokio::test]
async fn linked_request_must_belong_to_the_same_client() {
    let app = TestApp::new().await;
    let (owner, unit) = app.seed_site("SN-INV-1").await;
    let request = app.open_request(owner.id, unit.id).await;
    let stranger = app.seed_client("Stranger LLC").await;
    let invoices = &app.state.services.invoices;

    let input = |client_id| CreateInvoice {
        client_id,
        request_id: Some(request.id),
        kind: None,
        issue_date: issue_date(),
        due_date: None,
        vat_rate: None,
        notes: Some("Repair visit".to_string()),
        items: vec![item("Visit", dec!(1), dec!(80.00))],
    };

    let err = invoices
        .create(&app.engineer, input(stranger.id))
        .await
        .unwrap_err();
    assert_matches!(err, ServiceError::ValidationError(_));

    let linked = invoices.create(&app.engineer, input(owner.id)).await.unwrap();
    assert_eq!(linked.invoice.request_id, Some(request.id));
}

#[tokio::test]
async fn list_filters_by_status() {
    let app = TestApp::new().await;
    let client = app.seed_client("Teplo LLC").await;
    let first = draft_invoice(&app, client.id).await;
    let second = draft_invoice(&app, client.id).await;
    assert_eq!(second.invoice.number, "SCH-2025-00002");

    set_status(&app, first.invoice.id, InvoiceStatus::Sent)
        .await
        .unwrap();

    let sent = app
        .state
        .services
        .invoices
        .list(fieldservice_api::services::invoices::InvoiceFilter {
            client_id: Some(client.id),
            status: Some(InvoiceStatus::Sent),
        })
        .await
        .unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].id, first.invoice.id);
}

use crate::clock::Clock;
use crate::config::AppConfig;
use crate::db::DbPool;
use crate::errors::ServiceError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use validator::ValidationError;

// Document lifecycles
pub mod invoices;
pub mod purchase_orders;
pub mod service_requests;

// Stock
pub mod inventory;

// Reference data
pub mod clients;
pub mod equipment;
pub mod vendors;

/// Values applied when a create command leaves them out
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentDefaults {
    pub vat_rate: Decimal,
    pub currency: String,
    pub unit: String,
}

impl Default for DocumentDefaults {
    fn default() -> Self {
        Self {
            vat_rate: dec!(20),
            currency: "RUB".to_string(),
            unit: "pcs".to_string(),
        }
    }
}

impl From<&AppConfig> for DocumentDefaults {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            vat_rate: cfg.default_vat_rate,
            currency: cfg.default_currency.clone(),
            unit: cfg.default_unit.clone(),
        }
    }
}

/// Every domain service, shared behind `Arc`s
#[derive(Clone)]
pub struct AppServices {
    pub service_requests: Arc<service_requests::ServiceRequestService>,
    pub invoices: Arc<invoices::InvoiceService>,
    pub purchase_orders: Arc<purchase_orders::PurchaseOrderService>,
    pub inventory: Arc<inventory::InventoryService>,
    pub clients: Arc<clients::ClientService>,
    pub equipment: Arc<equipment::EquipmentService>,
    pub vendors: Arc<vendors::VendorService>,
}

impl AppServices {
    pub fn new(db: Arc<DbPool>, clock: Arc<dyn Clock>, defaults: DocumentDefaults) -> Self {
        Self {
            service_requests: Arc::new(service_requests::ServiceRequestService::new(
                db.clone(),
                clock.clone(),
            )),
            invoices: Arc::new(invoices::InvoiceService::new(
                db.clone(),
                clock.clone(),
                defaults.clone(),
            )),
            purchase_orders: Arc::new(purchase_orders::PurchaseOrderService::new(
                db.clone(),
                clock.clone(),
                defaults.clone(),
            )),
            inventory: Arc::new(inventory::InventoryService::new(
                db.clone(),
                clock.clone(),
                defaults,
            )),
            clients: Arc::new(clients::ClientService::new(db.clone(), clock.clone())),
            equipment: Arc::new(equipment::EquipmentService::new(db.clone(), clock.clone())),
            vendors: Arc::new(vendors::VendorService::new(db, clock)),
        }
    }
}

/// Rejects empty and whitespace-only strings
pub(crate) fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("must not be blank".into());
        return Err(err);
    }
    Ok(())
}

/// Trims optional free text, mapping blank input to `None`
pub(crate) fn clean_text(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub(crate) fn ensure_non_negative(field: &str, value: i32) -> Result<(), ServiceError> {
    if value < 0 {
        return Err(ServiceError::validation(format!(
            "{} must not be negative, got {}",
            field, value
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_strings_are_rejected() {
        assert!(validate_not_blank("  ").is_err());
        assert!(validate_not_blank("jam in feeder").is_ok());
    }

    #[test]
    fn clean_text_drops_blank_values() {
        assert_eq!(clean_text(Some("  ".into())), None);
        assert_eq!(clean_text(Some(" ok ".into())), Some("ok".into()));
        assert_eq!(clean_text(None), None);
    }
}

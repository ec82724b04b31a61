//! Status machines for service requests, invoices and purchase orders.
//!
//! Each status enum declares its allowed successors in one table below and
//! every status change in the services goes through [`guard_transition`].

use crate::entities::{
    invoice::InvoiceStatus, purchase_order::PurchaseOrderStatus,
    service_request::RequestStatus,
};
use crate::errors::ServiceError;
use std::fmt::Display;

pub trait Lifecycle: Copy + Eq + Display + 'static {
    /// Human-readable entity name used in transition errors
    const ENTITY: &'static str;

    fn successors(self) -> &'static [Self];

    fn is_terminal(self) -> bool {
        self.successors().is_empty()
    }

    fn can_transition_to(self, next: Self) -> bool {
        self.successors().contains(&next)
    }
}

/// Rejects `from -> to` unless `to` is a listed successor of `from`.
pub fn guard_transition<S: Lifecycle>(from: S, to: S) -> Result<(), ServiceError> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(ServiceError::InvalidTransition {
            entity: S::ENTITY,
            from: from.to_string(),
            to: to.to_string(),
        })
    }
}

impl Lifecycle for RequestStatus {
    const ENTITY: &'static str = "service request";

    fn successors(self) -> &'static [Self] {
        use RequestStatus::*;
        match self {
            New => &[Assigned, InProgress, Cancelled],
            Assigned => &[InProgress, Cancelled],
            InProgress => &[Done, Cancelled],
            Done => &[Closed],
            Closed | Cancelled => &[],
        }
    }
}

impl Lifecycle for InvoiceStatus {
    const ENTITY: &'static str = "invoice";

    fn successors(self) -> &'static [Self] {
        use InvoiceStatus::*;
        match self {
            Draft => &[Sent, Cancelled],
            Sent => &[Paid, Cancelled],
            Paid | Cancelled => &[],
        }
    }
}

impl Lifecycle for PurchaseOrderStatus {
    const ENTITY: &'static str = "purchase order";

    fn successors(self) -> &'static [Self] {
        use PurchaseOrderStatus::*;
        match self {
            Draft => &[Sent, Cancelled],
            Sent => &[Confirmed, Cancelled],
            Confirmed => &[Received, Cancelled],
            Received | Cancelled => &[],
        }
    }
}

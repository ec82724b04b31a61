pub mod client;
pub mod document_sequence;
pub mod equipment_catalog;
pub mod equipment_unit;
pub mod interaction;
pub mod invoice;
pub mod invoice_item;
pub mod parts_usage;
pub mod purchase_order;
pub mod purchase_order_item;
pub mod service_request;
pub mod spare_part;
pub mod vendor;

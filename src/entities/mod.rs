//! SeaORM entities mirroring the persistence schema.

pub mod change_request;
pub mod complexity_level;
pub mod form_template;
pub mod order;
pub mod order_item;
pub mod order_item_addon;
pub mod profile;
pub mod progress_log;
pub mod service_addon;
pub mod service_complexity;
pub mod service_type;

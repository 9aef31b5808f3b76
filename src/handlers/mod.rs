pub mod board;
pub mod change_requests;
pub mod common;
pub mod complexity;
pub mod estimates;
pub mod form_templates;
pub mod orders;
pub mod profiles;
pub mod progress;
pub mod services;

use std::sync::Arc;

use crate::db::DbPool;
use crate::events::EventSender;

// Re-export AppState so handler modules can import it as crate::handlers::AppState
pub use crate::AppState;

/// Services layer that encapsulates business logic used by HTTP handlers
#[derive(Clone)]
pub struct AppServices {
    pub catalog: Arc<crate::services::catalog::CatalogService>,
    pub estimation: crate::services::estimation::EstimationService,
    pub orders: Arc<crate::services::orders::OrderService>,
    pub change_requests: Arc<crate::services::change_requests::ChangeRequestService>,
    pub progress: Arc<crate::services::progress::ProgressService>,
    pub profiles: Arc<crate::services::profiles::ProfileService>,
    pub form_templates: Arc<crate::services::form_templates::FormTemplateService>,
}

impl AppServices {
    pub fn new(db_pool: Arc<DbPool>, event_sender: Arc<EventSender>) -> Self {
        let estimation = crate::services::estimation::EstimationService::new(db_pool.clone());
        let catalog = Arc::new(crate::services::catalog::CatalogService::new(db_pool.clone()));
        let orders = Arc::new(crate::services::orders::OrderService::new(
            db_pool.clone(),
            estimation.clone(),
            Some(event_sender.clone()),
        ));
        let change_requests = Arc::new(crate::services::change_requests::ChangeRequestService::new(
            db_pool.clone(),
            Some(event_sender.clone()),
        ));
        let progress = Arc::new(crate::services::progress::ProgressService::new(
            db_pool.clone(),
            Some(event_sender),
        ));
        let profiles = Arc::new(crate::services::profiles::ProfileService::new(db_pool.clone()));
        let form_templates = Arc::new(crate::services::form_templates::FormTemplateService::new(
            db_pool,
        ));

        Self {
            catalog,
            estimation,
            orders,
            change_requests,
            progress,
            profiles,
            form_templates,
        }
    }
}

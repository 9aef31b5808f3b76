use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Kitstudio API",
        version = "0.1.0",
        description = r#"
# Kitstudio Build-Studio API

Backend for custom model-kit build studios: order intake, price/time
estimation, workflow tracking, change requests, and build progress logging.

## Authentication

All endpoints except `/api/v1/status` and `/api/v1/health` require a bearer
token issued by the identity provider:

```
Authorization: Bearer <your-jwt-token>
```

The `role` claim (`admin` or `client`) gates staff-only surfaces. Clients
only ever see their own orders.

## Estimation

Quotes are computed server-side from the service, complexity and add-on
catalogs. Money is integer minor units (IDR); multipliers are decimals and
rounding happens once per line.

## Error Handling

Failures use a consistent JSON error shape:

```json
{
  "error": "Bad Request",
  "message": "Validation failed",
  "request_id": "…",
  "timestamp": "2025-11-02T00:00:00Z"
}
```
        "#,
        contact(
            name = "Kitstudio Support",
            email = "support@kitstudio.dev"
        ),
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "Catalog", description = "Service, complexity and add-on catalogs"),
        (name = "Estimates", description = "Price and duration quotes"),
        (name = "Orders", description = "Order intake and workflow"),
        (name = "Projections", description = "Kanban board and calendar"),
        (name = "Change Requests", description = "Scope adjustments"),
        (name = "Progress", description = "Build progress logs"),
        (name = "Profiles", description = "Client and staff profiles"),
        (name = "Forms", description = "Intake form templates"),
    ),
    paths(
        // Catalog
        crate::handlers::services::list_services,
        crate::handlers::services::get_service,
        crate::handlers::services::create_service,
        crate::handlers::services::update_service,
        crate::handlers::services::delete_service,
        crate::handlers::services::list_addons,
        crate::handlers::services::create_addon,
        crate::handlers::services::update_addon,
        crate::handlers::services::delete_addon,
        crate::handlers::complexity::list_complexity_levels,
        crate::handlers::complexity::create_complexity_level,
        crate::handlers::complexity::update_complexity_level,
        crate::handlers::complexity::delete_complexity_level,
        crate::handlers::complexity::list_overrides,
        crate::handlers::complexity::set_override,

        // Estimates
        crate::handlers::estimates::create_estimate,

        // Orders
        crate::handlers::orders::list_orders,
        crate::handlers::orders::create_order,
        crate::handlers::orders::get_order,
        crate::handlers::orders::get_order_items,
        crate::handlers::orders::update_order_status,
        crate::handlers::orders::cancel_order,
        crate::handlers::orders::finalize_order,

        // Projections
        crate::handlers::board::get_board,
        crate::handlers::board::get_calendar,

        // Change requests
        crate::handlers::change_requests::list_change_requests,
        crate::handlers::change_requests::create_change_request,
        crate::handlers::change_requests::approve_change_request,
        crate::handlers::change_requests::reject_change_request,

        // Progress
        crate::handlers::progress::list_progress,
        crate::handlers::progress::create_progress,

        // Profiles & forms
        crate::handlers::profiles::get_me,
        crate::handlers::profiles::list_profiles,
        crate::handlers::profiles::update_profile,
        crate::handlers::form_templates::list_form_templates,
        crate::handlers::form_templates::get_form_template,
        crate::handlers::form_templates::create_form_template,
        crate::handlers::form_templates::update_form_template,
        crate::handlers::form_templates::delete_form_template,
    ),
    components(
        schemas(
            // Common types
            crate::ApiResponse<serde_json::Value>,
            crate::PaginatedResponse<serde_json::Value>,
            crate::ListQuery,
            crate::errors::ErrorResponse,

            // Domain enums
            crate::models::OrderStatus,
            crate::models::ChangeRequestStatus,
            crate::models::Role,
            crate::projection::KanbanBucket,
            crate::projection::DueState,

            // Estimation types
            crate::estimation::LineEstimate,
            crate::estimation::OrderEstimate,
            crate::services::estimation::LineSelection,
            crate::handlers::estimates::EstimateRequest,

            // Catalog types
            crate::services::catalog::CreateServiceType,
            crate::services::catalog::UpdateServiceType,
            crate::services::catalog::CreateComplexityLevel,
            crate::services::catalog::UpdateComplexityLevel,
            crate::services::catalog::CreateAddon,
            crate::services::catalog::UpdateAddon,
            crate::services::catalog::DeleteOutcome,
            crate::handlers::complexity::SetOverrideRequest,

            // Order types
            crate::handlers::orders::CreateOrderRequest,
            crate::handlers::orders::UpdateOrderStatusRequest,
            crate::handlers::orders::CancelOrderRequest,
            crate::handlers::orders::FinalizeOrderRequest,
            crate::services::orders::OrderItemInput,
            crate::services::orders::OrderResponse,
            crate::services::orders::OrderItemResponse,
            crate::services::orders::StatusChange,

            // Projection types
            crate::handlers::board::OrderCard,
            crate::handlers::board::BoardColumn,
            crate::handlers::board::BoardResponse,

            // Change request / progress / profile / form types
            crate::services::change_requests::CreateChangeRequest,
            crate::services::progress::CreateProgressLog,
            crate::services::profiles::UpdateProfile,
            crate::services::form_templates::CreateFormTemplate,
            crate::services::form_templates::UpdateFormTemplate,

            // Auth types
            crate::auth::DevTokenRequest,
            crate::auth::TokenResponse,
        )
    )
)]
pub struct ApiDoc;

/// Swagger UI router serving the generated OpenAPI document.
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/docs").url("/api-docs/openapi.json", ApiDoc::openapi())
}

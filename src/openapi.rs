use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "SafeGear API",
        version = "0.3.0",
        description = r#"
# SafeGear PPE & Safety Management API

Backend for ordering personal protective equipment and managing worksite
safety: a quantity-tiered product catalog, carts with captured pricing,
order checkout, warehouse inventory batches, equipment assignment with
use-life tracking, and a five-step incident reporting workflow.

## Authentication

All endpoints except `/api/v1/auth/login` require a JWT access token:

```
Authorization: Bearer <access-token>
```

Contractor and principal accounts are scoped to their tenant; admin and
warehouse accounts operate across tenants.

## Rate Limiting

Responses carry `X-RateLimit-Limit`, `X-RateLimit-Remaining` and
`X-RateLimit-Reset` headers. Exceeding the limit yields `429`.

## Pagination

List endpoints accept `page` (default 1) and `per_page` (default 20)
query parameters and return a `pagination` object alongside the data.
        "#
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development")
    ),
    tags(
        (name = "products", description = "PPE catalog with quantity-tier pricing"),
        (name = "cart", description = "Tenant cart with captured unit prices"),
        (name = "orders", description = "Checkout and order tracking"),
        (name = "inventory", description = "Warehouse inventory batches"),
        (name = "equipment", description = "Equipment assignment and use-life"),
        (name = "employees", description = "Tenant employee roster"),
        (name = "worksites", description = "Tenant worksites"),
        (name = "incidents", description = "Five-step incident reporting")
    ),
    paths(
        // Catalog
        crate::handlers::products::list_products,
        crate::handlers::products::get_product,
        crate::handlers::products::create_product,
        crate::handlers::products::update_product,
        crate::handlers::products::archive_product,
        crate::handlers::products::replace_price_tiers,
        crate::handlers::products::replace_lead_time_tiers,

        // Cart
        crate::handlers::carts::get_cart,
        crate::handlers::carts::add_item,
        crate::handlers::carts::update_item,
        crate::handlers::carts::remove_item,
        crate::handlers::carts::refresh_prices,
        crate::handlers::carts::clear_cart,

        // Orders
        crate::handlers::orders::checkout,
        crate::handlers::orders::list_orders,
        crate::handlers::orders::get_order,
        crate::handlers::orders::update_status,

        // Inventory
        crate::handlers::inventory::list_batches,
        crate::handlers::inventory::get_batch,
        crate::handlers::inventory::low_stock,
        crate::handlers::inventory::receive_batch,
        crate::handlers::inventory::adjust_batch,

        // Equipment
        crate::handlers::equipment::assign,
        crate::handlers::equipment::unassign,
        crate::handlers::equipment::employee_equipment,

        // Employees
        crate::handlers::employees::list_employees,
        crate::handlers::employees::create_employee,
        crate::handlers::employees::get_employee,
        crate::handlers::employees::update_employee,
        crate::handlers::employees::delete_employee,

        // Worksites
        crate::handlers::worksites::list_worksites,
        crate::handlers::worksites::create_worksite,
        crate::handlers::worksites::get_worksite,
        crate::handlers::worksites::update_worksite,
        crate::handlers::worksites::delete_worksite,

        // Incidents
        crate::handlers::incidents::list_incidents,
        crate::handlers::incidents::create_incident,
        crate::handlers::incidents::get_incident,
        crate::handlers::incidents::update_incident,
        crate::handlers::incidents::upsert_step,
        crate::handlers::incidents::submit_incident,
        crate::handlers::incidents::update_status,
    ),
    components(
        schemas(
            // Entity records
            crate::entities::product::Model,
            crate::entities::product::ProductStatus,
            crate::entities::price_tier::Model,
            crate::entities::lead_time_tier::Model,
            crate::entities::cart_item::Model,
            crate::entities::order::Model,
            crate::entities::order::OrderStatus,
            crate::entities::order_item::Model,
            crate::entities::inventory_batch::Model,
            crate::entities::worksite::Model,
            crate::entities::employee::Model,
            crate::entities::assignment::Model,
            crate::entities::incident_report::Model,
            crate::entities::incident_report::IncidentSeverity,
            crate::entities::incident_report::IncidentStatus,
            crate::entities::incident_step::Model,

            // Catalog
            crate::services::catalog::ProductDetail,
            crate::services::catalog::PriceTierInput,
            crate::services::catalog::LeadTimeTierInput,
            crate::services::catalog::CreateProductInput,
            crate::services::catalog::UpdateProductInput,

            // Cart
            crate::services::carts::AddCartItemInput,
            crate::services::carts::CartLine,
            crate::services::carts::CartView,
            crate::handlers::carts::UpdateQuantityRequest,

            // Orders
            crate::services::orders::ContractorSnapshot,
            crate::services::orders::DeliveryAddress,
            crate::services::orders::CheckoutInput,
            crate::services::orders::OrderDetail,
            crate::handlers::orders::UpdateStatusRequest,

            // Inventory
            crate::services::inventory::ReceiveBatchInput,
            crate::services::inventory::AdjustBatchInput,

            // Equipment
            crate::services::equipment::AssignEquipmentInput,
            crate::services::equipment::EquipmentView,

            // Employees and worksites
            crate::services::employees::CreateEmployeeInput,
            crate::services::employees::UpdateEmployeeInput,
            crate::services::worksites::CreateWorksiteInput,
            crate::services::worksites::UpdateWorksiteInput,

            // Incidents
            crate::services::incidents::CreateIncidentInput,
            crate::services::incidents::UpdateIncidentInput,
            crate::services::incidents::UpsertStepInput,
            crate::services::incidents::IncidentDetail,
            crate::handlers::incidents::ReviewStatusRequest,

            // Errors
            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDocV1;

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDocV1::openapi())
        .config(utoipa_swagger_ui::Config::from("/api-docs/openapi.json").try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generates_document() {
        let openapi = ApiDocV1::openapi();
        let json = serde_json::to_string(&openapi).unwrap();
        assert!(json.contains("SafeGear API"));
        assert!(json.contains("/api/v1/products"));
        assert!(json.contains("/api/v1/incidents"));
    }
}

use crate::entities::user::UserRole;

/// Common permission string constants for compile-time safety
pub mod consts {
    // Catalog
    pub const CATALOG_READ: &str = "catalog:read";
    pub const CATALOG_MANAGE: &str = "catalog:manage";

    // Carts
    pub const CARTS_MANAGE: &str = "carts:manage";

    // Orders
    pub const ORDERS_READ: &str = "orders:read";
    pub const ORDERS_CREATE: &str = "orders:create";
    pub const ORDERS_UPDATE_STATUS: &str = "orders:update-status";

    // Inventory
    pub const INVENTORY_READ: &str = "inventory:read";
    pub const INVENTORY_RECEIVE: &str = "inventory:receive";
    pub const INVENTORY_ADJUST: &str = "inventory:adjust";

    // Equipment lifecycle
    pub const EQUIPMENT_READ: &str = "equipment:read";
    pub const EQUIPMENT_ASSIGN: &str = "equipment:assign";

    // Employees
    pub const EMPLOYEES_READ: &str = "employees:read";
    pub const EMPLOYEES_MANAGE: &str = "employees:manage";

    // Worksites
    pub const WORKSITES_READ: &str = "worksites:read";
    pub const WORKSITES_MANAGE: &str = "worksites:manage";

    // EHS incidents
    pub const INCIDENTS_READ: &str = "incidents:read";
    pub const INCIDENTS_REPORT: &str = "incidents:report";
    pub const INCIDENTS_REVIEW: &str = "incidents:review";

    // Accounts
    pub const USERS_MANAGE: &str = "users:manage";
}

pub use consts::*;

/// Permissions granted to each role at token-issue time. The admin role
/// additionally bypasses permission checks in the middleware, so its list
/// here only matters for introspection endpoints.
pub fn role_permissions(role: UserRole) -> Vec<String> {
    use consts::*;
    let perms: &[&str] = match role {
        UserRole::Contractor => &[
            CATALOG_READ,
            CARTS_MANAGE,
            ORDERS_READ,
            ORDERS_CREATE,
            INVENTORY_READ,
            EQUIPMENT_READ,
            EQUIPMENT_ASSIGN,
            EMPLOYEES_READ,
            EMPLOYEES_MANAGE,
            WORKSITES_READ,
            WORKSITES_MANAGE,
            INCIDENTS_READ,
            INCIDENTS_REPORT,
        ],
        UserRole::Warehouse => &[
            CATALOG_READ,
            ORDERS_READ,
            ORDERS_UPDATE_STATUS,
            INVENTORY_READ,
            INVENTORY_RECEIVE,
            INVENTORY_ADJUST,
            EQUIPMENT_READ,
            WORKSITES_READ,
        ],
        UserRole::Principal => &[
            CATALOG_READ,
            ORDERS_READ,
            INVENTORY_READ,
            EQUIPMENT_READ,
            EMPLOYEES_READ,
            WORKSITES_READ,
            INCIDENTS_READ,
        ],
        UserRole::Admin => &[
            CATALOG_READ,
            CATALOG_MANAGE,
            CARTS_MANAGE,
            ORDERS_READ,
            ORDERS_CREATE,
            ORDERS_UPDATE_STATUS,
            INVENTORY_READ,
            INVENTORY_RECEIVE,
            INVENTORY_ADJUST,
            EQUIPMENT_READ,
            EQUIPMENT_ASSIGN,
            EMPLOYEES_READ,
            EMPLOYEES_MANAGE,
            WORKSITES_READ,
            WORKSITES_MANAGE,
            INCIDENTS_READ,
            INCIDENTS_REPORT,
            INCIDENTS_REVIEW,
            USERS_MANAGE,
        ],
    };
    perms.iter().map(|p| p.to_string()).collect()
}

/// Format a permission string
pub fn format_permission(resource: &str, action: &str) -> String {
    format!("{}:{}", resource, action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contractors_cannot_mutate_inventory_or_review_incidents() {
        let perms = role_permissions(UserRole::Contractor);
        assert!(perms.contains(&consts::EQUIPMENT_ASSIGN.to_string()));
        assert!(!perms.contains(&consts::INVENTORY_ADJUST.to_string()));
        assert!(!perms.contains(&consts::INCIDENTS_REVIEW.to_string()));
    }

    #[test]
    fn principal_is_read_only() {
        let perms = role_permissions(UserRole::Principal);
        assert!(perms.iter().all(|p| p.ends_with(":read")));
    }

    #[test]
    fn warehouse_can_move_stock_and_orders() {
        let perms = role_permissions(UserRole::Warehouse);
        assert!(perms.contains(&consts::INVENTORY_RECEIVE.to_string()));
        assert!(perms.contains(&consts::ORDERS_UPDATE_STATUS.to_string()));
        assert!(!perms.contains(&consts::CARTS_MANAGE.to_string()));
    }

    #[test]
    fn format_permission_joins_resource_and_action() {
        assert_eq!(format_permission("orders", "read"), "orders:read");
    }
}

pub mod assignment;
pub mod cart_item;
pub mod employee;
pub mod incident_report;
pub mod incident_step;
pub mod inventory_batch;
pub mod lead_time_tier;
pub mod order;
pub mod order_item;
pub mod price_tier;
pub mod product;
pub mod user;
pub mod worksite;

pub use assignment::Entity as Assignment;
pub use cart_item::Entity as CartItem;
pub use employee::Entity as Employee;
pub use incident_report::Entity as IncidentReport;
pub use incident_step::Entity as IncidentStep;
pub use inventory_batch::Entity as InventoryBatch;
pub use lead_time_tier::Entity as LeadTimeTier;
pub use order::Entity as Order;
pub use order_item::Entity as OrderItem;
pub use price_tier::Entity as PriceTier;
pub use product::Entity as Product;
pub use user::Entity as User;
pub use worksite::Entity as Worksite;

pub use assignment::Model as AssignmentModel;
pub use cart_item::Model as CartItemModel;
pub use employee::Model as EmployeeModel;
pub use incident_report::Model as IncidentReportModel;
pub use incident_step::Model as IncidentStepModel;
pub use inventory_batch::Model as InventoryBatchModel;
pub use lead_time_tier::Model as LeadTimeTierModel;
pub use order::Model as OrderModel;
pub use order_item::Model as OrderItemModel;
pub use price_tier::Model as PriceTierModel;
pub use product::Model as ProductModel;
pub use user::Model as UserModel;
pub use worksite::Model as WorksiteModel;

pub mod common_dto;
pub mod service_order_dto;

pub use common_dto::ApiResponse;
pub use service_order_dto::{ExecutionView, PartUsageView, ServiceOrderDetail, ServiceOrderView};

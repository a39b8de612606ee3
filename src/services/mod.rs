pub mod cart;
pub mod catalog;
pub mod orders;
pub mod reports;

pub use cart::CartService;
pub use catalog::CatalogService;
pub use orders::OrderService;
pub use reports::ReportService;

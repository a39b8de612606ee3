pub mod food_item;
pub mod order;
pub mod order_item;

pub use food_item::Entity as FoodItem;
pub use order::Entity as Order;
pub use order_item::Entity as OrderItem;

//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod console_navigation_bridge;
mod http_discount_gateway;
mod in_memory_discount_store;

pub use console_navigation_bridge::ConsoleNavigationBridge;
pub use http_discount_gateway::HttpDiscountGateway;
pub use in_memory_discount_store::InMemoryDiscountStore;

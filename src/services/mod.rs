pub mod capabilities;

pub mod session_service;
pub mod order_validator;
pub mod pricing;
pub mod order_gateway;

pub mod paper_venue;

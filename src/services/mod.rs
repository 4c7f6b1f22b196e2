pub mod account_service;
pub mod availability_service;
pub mod booking_api;
pub mod booking_form;
pub mod currency;
pub mod discount_service;
pub mod history_service;
pub mod notifier;
pub mod phone_service;
pub mod pricing_service;

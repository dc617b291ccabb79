//! REST API endpoint tests

mod admin_tests;
mod auth_tests;
mod cart_tests;
mod catalog_tests;
mod chat_tests;
mod health_tests;
mod images_tests;
mod order_tests;

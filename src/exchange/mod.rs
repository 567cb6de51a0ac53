//! Exchange module - price feed over the exchange REST API

pub mod auth;
pub mod messages;
pub mod rest;

pub use rest::ExchangeRestClient;

//! HTTP layer of the CityInfo API.

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod files;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod token;
pub mod version;

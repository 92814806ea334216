pub mod activities;
pub mod auth;
mod client;
pub mod materials;
pub mod uploads;

pub use client::ApiClient;
pub use uploads::ProgressHandle;

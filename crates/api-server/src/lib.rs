//! REST API over the analytics engines — filters, KPIs, charts,
//! segmentation, churn, what-if simulation, and export downloads.

pub mod animation;
pub mod rest;
pub mod server;

pub use server::ApiServer;

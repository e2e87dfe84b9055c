//! Vitrine - admin session service for the Vitrine marketing site
//!
//! Issues cookie-borne access/refresh sessions for the back-office, gates
//! the protected area ahead of every route, and hands public pages to
//! locale routing.

pub mod api;
pub mod client;
pub mod config;
pub mod models;
pub mod services;

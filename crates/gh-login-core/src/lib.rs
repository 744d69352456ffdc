//! Core library for the "Login with GitHub" OAuth2 flow, shared by embedding
//! hosts and the CLI front-end.

pub mod auth;
pub mod config;

//! Client library for the AdminHub multi-tenant admin backend.
//!
//! | Module      | Purpose                                                   |
//! |-------------|-----------------------------------------------------------|
//! | `http`      | Endpoint declarations, payload shapes, transport, executor |
//! | `crud`      | Generic create/update/get/delete/search over a registry    |
//! | `state`     | List page state kept in the location and a session cache   |
//! | `auth`      | Session context, permission checks, sign-in flows          |
//! | `resources` | Users and clients services                                 |
//! | `dashboard` | Static analytics data                                      |
//! | `notify`    | User-facing notifications                                  |
//! | `config`    | `adminhub.toml` plus env and CLI overrides                 |
//! | `telemetry` | Tracing subscriber setup                                   |
//! | `ui`        | Terminal tables, spinner and icons                         |

pub mod auth;
pub mod config;
pub mod crud;
pub mod dashboard;
pub mod errors;
pub mod http;
pub mod notify;
pub mod resources;
pub mod state;
pub mod telemetry;
pub mod ui;

//! Backend resources built on the generic CRUD client.

pub mod clients;
pub mod users;

pub use clients::{Client, ClientService, CreateClientRequest, UpdateClientRequest};
pub use users::{CreateUserRequest, Grant, Policy, Role, UpdateUserRequest, User, UserService};

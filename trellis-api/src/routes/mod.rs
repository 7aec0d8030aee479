/// API route handlers
///
/// Each submodule owns the request/response types and handlers for one
/// resource. Handlers follow the same shape throughout: parse and validate
/// input, run the access check for the resource being touched, call into
/// the entity store, and wrap the result in the response envelope.

pub mod auth;
pub mod columns;
pub mod health;
pub mod modules;
pub mod projects;
pub mod tasks;
pub mod users;

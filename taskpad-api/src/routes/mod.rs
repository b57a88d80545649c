/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `tasks`: Task Service API (list, create, partial update, delete)
/// - `users`: Get-or-create by email, phone linking
/// - `webhook`: Action-tagged ingestion endpoint for external automation

pub mod health;
pub mod tasks;
pub mod users;
pub mod webhook;

//! # Taskpad Client Library
//!
//! Client-side layer for the Taskpad to-do service: the HTTP API client, the
//! in-memory task list that backs rendering, and the enhancement poller that
//! reconciles asynchronously arriving AI-rewritten titles into that list.
//!
//! ## Modules
//!
//! - `api`: `TasksApi` trait and the reqwest-backed `ApiClient`
//! - `store`: Client State Store (ordered task list + in-flight marker set)
//! - `poller`: Enhancement Poller (fixed-schedule re-fetch loop)
//! - `session`: User-facing operations tying the three together
//!
//! ## Example
//!
//! ```no_run
//! use taskpad_client::api::ApiClient;
//! use taskpad_client::session::TaskSession;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let api = Arc::new(ApiClient::new("http://localhost:8080"));
//! let user = api.get_or_create_user("user@example.com", None, None).await?;
//!
//! let session = TaskSession::new(api, user.id);
//! session.refresh().await?;
//! session.add_task("buy milk").await?;
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod error;
pub mod poller;
pub mod session;
pub mod store;

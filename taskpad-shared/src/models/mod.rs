/// Database models for Taskpad
///
/// This module contains the two persisted models and their CRUD operations.
///
/// # Models
///
/// - `user`: Accounts identified by email, with an optional phone number
///   for reverse lookup from the webhook path
/// - `task`: To-do items, each owned by a single user, carrying an optional
///   AI-written enhanced title
///
/// # Example
///
/// ```no_run
/// use taskpad_shared::models::user::User;
/// use taskpad_shared::db::pool::{create_pool, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = create_pool(DatabaseConfig::default()).await?;
///
/// let (user, created) = User::get_or_create(&pool, "user@example.com", None, None).await?;
/// println!("user {} (new: {})", user.id, created);
/// # Ok(())
/// # }
/// ```

pub mod task;
pub mod user;

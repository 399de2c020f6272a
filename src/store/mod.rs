mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::{Post, PostWithAuthor, User};

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, username: &str, email: &str, password_hash: &str) -> Result<User>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_email(&self, email: &str) -> Result<Option<User>>;
    fn list_users(&self) -> Result<Vec<User>>;

    // Post operations
    fn create_post(&self, title: &str, content: &str, user_id: i64) -> Result<Post>;
    fn get_post(&self, id: i64) -> Result<Option<Post>>;
    fn list_posts(&self) -> Result<Vec<PostWithAuthor>>;
    fn update_post(&self, id: i64, title: &str, content: &str) -> Result<Post>;
    fn delete_post(&self, id: i64) -> Result<bool>;
}

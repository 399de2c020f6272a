use std::path::Path;
use std::sync::Mutex;

use rusqlite::{Connection, OptionalExtension, params};

use super::Store;
use super::schema::SCHEMA;
use crate::error::{Error, Result};
use crate::types::{Post, PostWithAuthor, User};

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database, used in tests.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn map_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        email: row.get(2)?,
        password_hash: row.get(3)?,
    })
}

fn map_post(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
    Ok(Post {
        id: row.get(0)?,
        title: row.get(1)?,
        content: row.get(2)?,
        user_id: row.get(3)?,
    })
}

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        self.conn().execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, username: &str, email: &str, password_hash: &str) -> Result<User> {
        let conn = self.conn();

        let result = conn.execute(
            "INSERT INTO users (username, email, password_hash) VALUES (?1, ?2, ?3)",
            params![username, email, password_hash],
        );

        match result {
            Ok(_) => {}
            Err(rusqlite::Error::SqliteFailure(e, _))
                if e.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                return Err(Error::EmailTaken);
            }
            Err(e) => return Err(e.into()),
        }

        let id = conn.last_insert_rowid();
        Ok(User {
            id,
            username: username.to_string(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        })
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, username, email, password_hash FROM users WHERE id = ?1",
            params![id],
            map_user,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, username, email, password_hash FROM users WHERE email = ?1",
            params![email],
            map_user,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare("SELECT id, username, email, password_hash FROM users ORDER BY id")?;

        let rows = stmt.query_map([], map_user)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Post operations

    fn create_post(&self, title: &str, content: &str, user_id: i64) -> Result<Post> {
        let conn = self.conn();
        conn.execute(
            "INSERT INTO posts (title, content, user_id) VALUES (?1, ?2, ?3)",
            params![title, content, user_id],
        )?;

        let id = conn.last_insert_rowid();
        Ok(Post {
            id,
            title: title.to_string(),
            content: content.to_string(),
            user_id,
        })
    }

    fn get_post(&self, id: i64) -> Result<Option<Post>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, title, content, user_id FROM posts WHERE id = ?1",
            params![id],
            map_post,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_posts(&self) -> Result<Vec<PostWithAuthor>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT p.id, p.title, p.content, u.username
             FROM posts p JOIN users u ON u.id = p.user_id
             ORDER BY p.id",
        )?;

        let rows = stmt.query_map([], |row| {
            Ok(PostWithAuthor {
                id: row.get(0)?,
                title: row.get(1)?,
                content: row.get(2)?,
                author: row.get(3)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_post(&self, id: i64, title: &str, content: &str) -> Result<Post> {
        let conn = self.conn();
        let rows = conn.execute(
            "UPDATE posts SET title = ?1, content = ?2, updated_at = datetime('now')
             WHERE id = ?3",
            params![title, content, id],
        )?;

        if rows == 0 {
            return Err(Error::NotFound);
        }

        conn.query_row(
            "SELECT id, title, content, user_id FROM posts WHERE id = ?1",
            params![id],
            map_post,
        )
        .map_err(Error::from)
    }

    fn delete_post(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }
}

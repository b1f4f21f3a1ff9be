//! User database queries.

use cinelog_common::{Error, Result, UserId};
use rusqlite::{Connection, OptionalExtension, Row};

use crate::models::User;

fn row_to_user(row: &Row<'_>) -> rusqlite::Result<User> {
    Ok(User {
        id: UserId::from(row.get::<_, i64>(0)?),
        user_name: row.get(1)?,
        avatar_url: row.get(2)?,
    })
}

/// Create a new user.
///
/// # Returns
///
/// * `Ok(User)` - The created user with its assigned id
/// * `Err(Error)` - If the name is blank or a database error occurs
pub fn create_user(conn: &Connection, user_name: &str, avatar_url: Option<&str>) -> Result<User> {
    let user_name = user_name.trim();
    if user_name.is_empty() {
        return Err(Error::invalid_input("user_name must not be empty"));
    }

    conn.execute(
        "INSERT INTO users (user_name, avatar_url) VALUES (:user_name, :avatar_url)",
        rusqlite::named_params! {
            ":user_name": user_name,
            ":avatar_url": avatar_url,
        },
    )
    .map_err(|e| Error::database(e.to_string()))?;

    Ok(User {
        id: UserId::from(conn.last_insert_rowid()),
        user_name: user_name.to_string(),
        avatar_url: avatar_url.map(str::to_string),
    })
}

/// Get a user by ID.
///
/// # Returns
///
/// * `Ok(Some(User))` - The user if found
/// * `Ok(None)` - If the user does not exist
/// * `Err(Error)` - If a database error occurs
pub fn get_user(conn: &Connection, id: UserId) -> Result<Option<User>> {
    conn.query_row(
        "SELECT id, user_name, avatar_url FROM users WHERE id = :id",
        rusqlite::named_params! { ":id": id.get() },
        row_to_user,
    )
    .optional()
    .map_err(|e| Error::database(e.to_string()))
}

/// List all users ordered by name.
pub fn list_users(conn: &Connection) -> Result<Vec<User>> {
    let mut stmt = conn
        .prepare("SELECT id, user_name, avatar_url FROM users ORDER BY user_name, id")
        .map_err(|e| Error::database(e.to_string()))?;

    let users = stmt
        .query_map([], row_to_user)
        .map_err(|e| Error::database(e.to_string()))?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(users)
}

/// Delete a user. Their list entries go with them.
///
/// # Returns
///
/// * `Ok(true)` - If the user was deleted
/// * `Ok(false)` - If the user did not exist
pub fn delete_user(conn: &Connection, id: UserId) -> Result<bool> {
    let rows_affected = conn
        .execute(
            "DELETE FROM users WHERE id = :id",
            rusqlite::named_params! { ":id": id.get() },
        )
        .map_err(|e| Error::database(e.to_string()))?;

    Ok(rows_affected > 0)
}

//! Item persistence operations.
//!
//! All functions take a `&PgPool` and operate on the `items` table. Each
//! mutation mirrors an in-memory store operation that has already been
//! applied; the caller surfaces a persistence failure as a 500 rather than
//! letting the stores drift silently apart across a restart.

use sqlx::PgPool;

use catalog_core::Item;

/// Insert a new item row.
pub async fn insert(pool: &PgPool, item: &Item) -> Result<(), sqlx::Error> {
    sqlx::query("INSERT INTO items (id, name, description, price) VALUES ($1, $2, $3, $4)")
        .bind(item.id)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price)
        .execute(pool)
        .await?;

    Ok(())
}

/// Overwrite the mutable fields of an item row.
///
/// Returns `false` if no row has that id.
pub async fn update(pool: &PgPool, item: &Item) -> Result<bool, sqlx::Error> {
    let result =
        sqlx::query("UPDATE items SET name = $1, description = $2, price = $3 WHERE id = $4")
            .bind(&item.name)
            .bind(&item.description)
            .bind(item.price)
            .bind(item.id)
            .execute(pool)
            .await?;

    Ok(result.rows_affected() > 0)
}

/// Delete an item row.
///
/// Returns `false` if no row has that id.
pub async fn delete(pool: &PgPool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM items WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Load all items from the database into the in-memory store on startup.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Item>, sqlx::Error> {
    let rows = sqlx::query_as::<_, ItemRow>(
        "SELECT id, name, description, price FROM items ORDER BY id",
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(ItemRow::into_item).collect())
}

/// Internal row type for SQLx mapping.
#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i64,
    name: String,
    description: String,
    price: f64,
}

impl ItemRow {
    fn into_item(self) -> Item {
        Item {
            id: self.id,
            name: self.name,
            description: self.description,
            price: self.price,
        }
    }
}

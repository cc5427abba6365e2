use std::time::Duration;

use async_trait::async_trait;
use sqlx::PgPool;

use crate::db::{bounded, StoreError};
use crate::inventory::dto::ProductInput;
use crate::inventory::repo_types::Product;

/// Persistence operations for the product table. Stock changes go through
/// `adjust_quantity` so the increment/decrement happens inside the store,
/// never as a read-modify-write in the application.
#[async_trait]
pub trait ProductStore: Send + Sync {
    /// Inserts a new row and returns it with the store-assigned id.
    async fn insert(&self, input: &ProductInput) -> Result<Product, StoreError>;

    /// Full replace by id. `None` when no row matched.
    async fn update(&self, id: i64, input: &ProductInput) -> Result<Option<Product>, StoreError>;

    /// Removes a row by id; `false` when no row matched.
    async fn delete(&self, id: i64) -> Result<bool, StoreError>;

    /// Every product in insertion order.
    async fn all(&self) -> Result<Vec<Product>, StoreError>;

    /// Products with `quantity` strictly below the threshold.
    async fn below_threshold(&self, threshold: i64) -> Result<Vec<Product>, StoreError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError>;

    /// Applies `quantity = quantity + delta` as one atomic statement, guarded
    /// so the result can never go negative. `None` when no row matched the
    /// guard: the id is absent, or the delta would overdraw the quantity.
    async fn adjust_quantity(&self, id: i64, delta: i64) -> Result<Option<Product>, StoreError>;
}

/// sqlx-backed store over the `products` table.
#[derive(Clone)]
pub struct PgProductStore {
    pool: PgPool,
    timeout: Duration,
}

impl PgProductStore {
    pub fn new(pool: PgPool, timeout: Duration) -> Self {
        Self { pool, timeout }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn insert(&self, input: &ProductInput) -> Result<Product, StoreError> {
        let product = bounded(
            self.timeout,
            sqlx::query_as::<_, Product>(
                r#"
                INSERT INTO products (name, description, category, price, quantity)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, name, description, category, price, quantity
                "#,
            )
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.price)
            .bind(input.quantity)
            .fetch_one(&self.pool),
        )
        .await?;
        Ok(product)
    }

    async fn update(&self, id: i64, input: &ProductInput) -> Result<Option<Product>, StoreError> {
        let product = bounded(
            self.timeout,
            sqlx::query_as::<_, Product>(
                r#"
                UPDATE products
                SET name = $2, description = $3, category = $4, price = $5, quantity = $6
                WHERE id = $1
                RETURNING id, name, description, category, price, quantity
                "#,
            )
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(input.price)
            .bind(input.quantity)
            .fetch_optional(&self.pool),
        )
        .await?;
        Ok(product)
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = bounded(
            self.timeout,
            sqlx::query("DELETE FROM products WHERE id = $1")
                .bind(id)
                .execute(&self.pool),
        )
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn all(&self) -> Result<Vec<Product>, StoreError> {
        let products = bounded(
            self.timeout,
            sqlx::query_as::<_, Product>(
                r#"
                SELECT id, name, description, category, price, quantity
                FROM products
                ORDER BY id
                "#,
            )
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(products)
    }

    async fn below_threshold(&self, threshold: i64) -> Result<Vec<Product>, StoreError> {
        let products = bounded(
            self.timeout,
            sqlx::query_as::<_, Product>(
                r#"
                SELECT id, name, description, category, price, quantity
                FROM products
                WHERE quantity < $1
                ORDER BY id
                "#,
            )
            .bind(threshold)
            .fetch_all(&self.pool),
        )
        .await?;
        Ok(products)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
        let product = bounded(
            self.timeout,
            sqlx::query_as::<_, Product>(
                r#"
                SELECT id, name, description, category, price, quantity
                FROM products
                WHERE id = $1
                "#,
            )
            .bind(id)
            .fetch_optional(&self.pool),
        )
        .await?;
        Ok(product)
    }

    async fn adjust_quantity(&self, id: i64, delta: i64) -> Result<Option<Product>, StoreError> {
        let product = bounded(
            self.timeout,
            sqlx::query_as::<_, Product>(
                r#"
                UPDATE products
                SET quantity = quantity + $2
                WHERE id = $1 AND quantity + $2 >= 0
                RETURNING id, name, description, category, price, quantity
                "#,
            )
            .bind(id)
            .bind(delta)
            .fetch_optional(&self.pool),
        )
        .await?;
        Ok(product)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Mutex;

    use super::*;

    /// In-memory stand-in for the `products` table with the same guarded
    /// mutation semantics as the SQL statements above.
    #[derive(Default)]
    pub struct MemoryProductStore {
        rows: Mutex<BTreeMap<i64, Product>>,
        next_id: AtomicI64,
    }

    fn from_input(id: i64, input: &ProductInput) -> Product {
        Product {
            id,
            name: input.name.clone(),
            description: input.description.clone(),
            category: input.category.clone(),
            price: input.price,
            quantity: input.quantity,
        }
    }

    #[async_trait]
    impl ProductStore for MemoryProductStore {
        async fn insert(&self, input: &ProductInput) -> Result<Product, StoreError> {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let product = from_input(id, input);
            self.rows.lock().expect("lock").insert(id, product.clone());
            Ok(product)
        }

        async fn update(&self, id: i64, input: &ProductInput) -> Result<Option<Product>, StoreError> {
            let mut rows = self.rows.lock().expect("lock");
            match rows.get_mut(&id) {
                Some(existing) => {
                    *existing = from_input(id, input);
                    Ok(Some(existing.clone()))
                }
                None => Ok(None),
            }
        }

        async fn delete(&self, id: i64) -> Result<bool, StoreError> {
            Ok(self.rows.lock().expect("lock").remove(&id).is_some())
        }

        async fn all(&self) -> Result<Vec<Product>, StoreError> {
            Ok(self.rows.lock().expect("lock").values().cloned().collect())
        }

        async fn below_threshold(&self, threshold: i64) -> Result<Vec<Product>, StoreError> {
            Ok(self
                .rows
                .lock()
                .expect("lock")
                .values()
                .filter(|p| p.quantity < threshold)
                .cloned()
                .collect())
        }

        async fn find_by_id(&self, id: i64) -> Result<Option<Product>, StoreError> {
            Ok(self.rows.lock().expect("lock").get(&id).cloned())
        }

        async fn adjust_quantity(&self, id: i64, delta: i64) -> Result<Option<Product>, StoreError> {
            let mut rows = self.rows.lock().expect("lock");
            match rows.get_mut(&id) {
                Some(product) if product.quantity + delta >= 0 => {
                    product.quantity += delta;
                    Ok(Some(product.clone()))
                }
                _ => Ok(None),
            }
        }
    }
}

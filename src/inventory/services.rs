use tracing::{info, warn};

use crate::error::ApiError;
use crate::inventory::dto::ProductInput;
use crate::inventory::repo::ProductStore;
use crate::inventory::repo_types::Product;

fn validate_fields(input: &ProductInput) -> Result<(), ApiError> {
    if input.price.is_sign_negative() {
        return Err(ApiError::Validation("Price must not be negative".into()));
    }
    if input.quantity < 0 {
        return Err(ApiError::Validation("Quantity must not be negative".into()));
    }
    Ok(())
}

fn validate_delta(quantity: i64) -> Result<(), ApiError> {
    if quantity < 0 {
        return Err(ApiError::Validation("Quantity must not be negative".into()));
    }
    Ok(())
}

pub async fn add_product(
    products: &dyn ProductStore,
    input: ProductInput,
) -> Result<Product, ApiError> {
    validate_fields(&input)?;
    let product = products.insert(&input).await.map_err(ApiError::internal)?;
    info!(product_id = product.id, name = %product.name, "product added");
    Ok(product)
}

/// Full replace by id. An unknown id is reported, never a silent success.
pub async fn update_product(
    products: &dyn ProductStore,
    id: i64,
    input: ProductInput,
) -> Result<Product, ApiError> {
    validate_fields(&input)?;
    match products
        .update(id, &input)
        .await
        .map_err(ApiError::internal)?
    {
        Some(product) => {
            info!(product_id = id, "product updated");
            Ok(product)
        }
        None => {
            warn!(product_id = id, "update for unknown product");
            Err(ApiError::NotFound("Product not found".into()))
        }
    }
}

pub async fn delete_product(products: &dyn ProductStore, id: i64) -> Result<(), ApiError> {
    let removed = products.delete(id).await.map_err(ApiError::internal)?;
    if !removed {
        warn!(product_id = id, "delete for unknown product");
        return Err(ApiError::NotFound("Product not found".into()));
    }
    info!(product_id = id, "product deleted");
    Ok(())
}

pub async fn all_products(products: &dyn ProductStore) -> Result<Vec<Product>, ApiError> {
    products.all().await.map_err(ApiError::internal)
}

pub async fn low_stock_products(
    products: &dyn ProductStore,
    threshold: i64,
) -> Result<Vec<Product>, ApiError> {
    products
        .below_threshold(threshold)
        .await
        .map_err(ApiError::internal)
}

pub async fn add_stock(
    products: &dyn ProductStore,
    id: i64,
    quantity: i64,
) -> Result<Product, ApiError> {
    validate_delta(quantity)?;
    // A non-negative delta cannot fail the store guard, so a missed update
    // means the id is absent.
    match products
        .adjust_quantity(id, quantity)
        .await
        .map_err(ApiError::internal)?
    {
        Some(product) => {
            info!(product_id = id, delta = quantity, quantity = product.quantity, "stock added");
            Ok(product)
        }
        None => {
            warn!(product_id = id, "stock addition for unknown product");
            Err(ApiError::NotFound("Product not found".into()))
        }
    }
}

/// Deducts stock atomically. A deduction that would take the quantity below
/// zero is rejected outright with a conflict and leaves the row untouched;
/// there is no clamping and no silent negative balance.
pub async fn deduct_stock(
    products: &dyn ProductStore,
    id: i64,
    quantity: i64,
) -> Result<Product, ApiError> {
    validate_delta(quantity)?;
    match products
        .adjust_quantity(id, -quantity)
        .await
        .map_err(ApiError::internal)?
    {
        Some(product) => {
            info!(product_id = id, delta = -quantity, quantity = product.quantity, "stock deducted");
            Ok(product)
        }
        None => match products.find_by_id(id).await.map_err(ApiError::internal)? {
            Some(current) => {
                warn!(
                    product_id = id,
                    requested = quantity,
                    available = current.quantity,
                    "deduction exceeds available stock"
                );
                Err(ApiError::Conflict("Insufficient stock".into()))
            }
            None => {
                warn!(product_id = id, "stock deduction for unknown product");
                Err(ApiError::NotFound("Product not found".into()))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::inventory::repo::memory::MemoryProductStore;

    fn input(name: &str, price: &str, quantity: i64) -> ProductInput {
        ProductInput {
            name: name.into(),
            description: format!("{name} description"),
            category: "general".into(),
            price: price.parse::<Decimal>().expect("decimal literal"),
            quantity,
        }
    }

    #[tokio::test]
    async fn added_products_come_back_in_insertion_order() {
        let store = MemoryProductStore::default();
        let first = add_product(&store, input("Widget", "9.99", 3))
            .await
            .expect("add");
        let second = add_product(&store, input("Gadget", "24.50", 8))
            .await
            .expect("add");
        assert!(first.id < second.id);

        let listed = all_products(&store).await.expect("list");
        assert_eq!(listed, vec![first, second]);
    }

    #[tokio::test]
    async fn add_product_rejects_negative_price_and_quantity() {
        let store = MemoryProductStore::default();
        let err = add_product(&store, input("Widget", "-1.00", 3))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));

        let err = add_product(&store, input("Widget", "1.00", -3))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn update_replaces_every_field_and_keeps_the_id() {
        let store = MemoryProductStore::default();
        let created = add_product(&store, input("Widget", "9.99", 3))
            .await
            .expect("add");

        let updated = update_product(&store, created.id, input("Widget Pro", "12.00", 6))
            .await
            .expect("update");
        assert_eq!(updated.id, created.id);
        assert_eq!(updated.name, "Widget Pro");
        assert_eq!(updated.quantity, 6);
    }

    #[tokio::test]
    async fn update_unknown_id_is_not_found() {
        let store = MemoryProductStore::default();
        let err = update_product(&store, 404, input("Ghost", "1.00", 1))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_removes_the_row_and_reports_unknown_ids() {
        let store = MemoryProductStore::default();
        let created = add_product(&store, input("Widget", "9.99", 3))
            .await
            .expect("add");

        delete_product(&store, created.id).await.expect("delete");
        assert!(all_products(&store).await.expect("list").is_empty());

        let err = delete_product(&store, created.id).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn add_then_deduct_restores_original_quantity() {
        let store = MemoryProductStore::default();
        let created = add_product(&store, input("Widget", "9.99", 7))
            .await
            .expect("add");

        add_stock(&store, created.id, 5).await.expect("add stock");
        let after = deduct_stock(&store, created.id, 5)
            .await
            .expect("deduct stock");
        assert_eq!(after.quantity, 7);
    }

    #[tokio::test]
    async fn low_stock_is_strictly_below_the_threshold() {
        let store = MemoryProductStore::default();
        let scarce = add_product(&store, input("Scarce", "1.00", 3))
            .await
            .expect("add");
        add_product(&store, input("Boundary", "1.00", 10))
            .await
            .expect("add");
        add_product(&store, input("Plenty", "1.00", 12))
            .await
            .expect("add");

        let low = low_stock_products(&store, 10).await.expect("low stock");
        assert_eq!(low, vec![scarce]);
    }

    #[tokio::test]
    async fn widget_scenario_rejects_overdraw_and_keeps_quantity() {
        let store = MemoryProductStore::default();
        let widget = add_product(&store, input("Widget", "9.99", 3))
            .await
            .expect("add");

        let stocked = add_stock(&store, widget.id, 2).await.expect("add stock");
        assert_eq!(stocked.quantity, 5);

        let err = deduct_stock(&store, widget.id, 10).await.unwrap_err();
        assert!(matches!(err, ApiError::Conflict(_)));

        let current = store
            .find_by_id(widget.id)
            .await
            .expect("find")
            .expect("still present");
        assert_eq!(current.quantity, 5);
    }

    #[tokio::test]
    async fn deduction_down_to_exactly_zero_is_allowed() {
        let store = MemoryProductStore::default();
        let created = add_product(&store, input("Widget", "9.99", 5))
            .await
            .expect("add");

        let drained = deduct_stock(&store, created.id, 5).await.expect("deduct");
        assert_eq!(drained.quantity, 0);
    }

    #[tokio::test]
    async fn stock_mutations_reject_negative_deltas() {
        let store = MemoryProductStore::default();
        let created = add_product(&store, input("Widget", "9.99", 5))
            .await
            .expect("add");

        let err = add_stock(&store, created.id, -1).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        let err = deduct_stock(&store, created.id, -1).await.unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[tokio::test]
    async fn stock_mutations_on_unknown_ids_are_not_found() {
        let store = MemoryProductStore::default();
        let err = add_stock(&store, 404, 1).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
        let err = deduct_stock(&store, 404, 1).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}

//! Cart commands.
//!
//! Every command restores the stored cart first, so an expired cart is
//! reset before anything else happens.

use shopfront_client::models::CartItem;
use shopfront_client::{CART_EXPIRATION_HOURS, CartManager, RestoreOutcome};
use shopfront_core::{Price, ProductId};

use super::{CliError, Context};

fn open(ctx: &Context) -> Result<CartManager, CliError> {
    let mut cart = CartManager::new(ctx.store.clone(), ctx.api.clone());
    if cart.restore_cart_state()? == RestoreOutcome::Expired {
        tracing::info!(
            "Your cart was older than {CART_EXPIRATION_HOURS} hours and has been emptied"
        );
    }
    Ok(cart)
}

/// List cart lines.
pub fn show(ctx: &Context) -> Result<(), CliError> {
    let cart = open(ctx)?;
    if cart.is_empty() {
        tracing::info!("Cart is empty");
        return Ok(());
    }

    for item in cart.items() {
        let name = item
            .details
            .get("name")
            .and_then(serde_json::Value::as_str)
            .unwrap_or("-");
        tracing::info!("{:>8} x{:<4} {}", item.product_id, item.quantity_purchased, name);
    }
    tracing::info!("{} item(s) in {} line(s)", cart.item_count(), cart.items().len());
    Ok(())
}

/// Add a product, optionally recording its name and unit price.
pub fn add(
    ctx: &Context,
    product_id: &str,
    quantity: u32,
    name: Option<String>,
    price: Option<&str>,
) -> Result<(), CliError> {
    let item = build_item(product_id, quantity, name, price)?;
    let mut cart = open(ctx)?;
    cart.add_product_to_cart(item)?;
    tracing::info!("Added {quantity} x {product_id}");
    Ok(())
}

fn build_item(
    product_id: &str,
    quantity: u32,
    name: Option<String>,
    price: Option<&str>,
) -> Result<CartItem, CliError> {
    let mut item = CartItem::new(ProductId::parse_lenient(product_id), quantity);
    if let Some(name) = name {
        item = item.with_detail("name", name);
    }
    if let Some(price) = price {
        item = item.with_detail("price", Price::parse(price)?.amount.to_string());
    }
    Ok(item)
}

/// Remove a product's line.
pub fn remove(ctx: &Context, product_id: &str) -> Result<(), CliError> {
    let mut cart = open(ctx)?;
    if cart.remove_product_from_cart(&ProductId::parse_lenient(product_id))? {
        tracing::info!("Removed {product_id}");
    } else {
        tracing::info!("{product_id} was not in the cart");
    }
    Ok(())
}

/// Empty the cart.
pub fn clear(ctx: &Context) -> Result<(), CliError> {
    let mut cart = open(ctx)?;
    cart.reset_cart_state()?;
    tracing::info!("Cart emptied");
    Ok(())
}

/// Place the order for the whole cart.
///
/// The cart is only emptied once the backend accepts the order.
pub async fn checkout(ctx: &Context, total: &str) -> Result<(), CliError> {
    let total = Price::parse(total)?;
    let mut cart = open(ctx)?;
    if cart.is_empty() {
        tracing::info!("Cart is empty, nothing to check out");
        return Ok(());
    }

    cart.purchase_items(total).await?;
    tracing::info!("Order placed for {total}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_build_item_with_details() {
        let item = build_item("42", 2, Some("Tee".to_string()), Some("19.99")).unwrap();
        assert_eq!(item.product_id, ProductId::from(42_i64));
        assert_eq!(item.quantity_purchased, 2);
        assert_eq!(item.details["name"], "Tee");
        assert_eq!(item.details["price"], "19.99");
    }

    #[test]
    fn test_build_item_text_id() {
        let item = build_item("sku-42", 1, None, None).unwrap();
        assert_eq!(item.product_id, ProductId::from("sku-42"));
        assert!(item.details.is_empty());
    }

    #[test]
    fn test_build_item_bad_price() {
        assert!(matches!(
            build_item("42", 1, None, Some("-3")),
            Err(CliError::Price(_))
        ));
    }
}

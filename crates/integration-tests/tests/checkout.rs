//! Cart persistence and checkout against the mock backend.

use secrecy::SecretString;
use serde_json::json;
use shopfront_client::api::ApiError;
use shopfront_client::models::{CartItem, CartState};
use shopfront_client::storage::{StoreExt, keys};
use shopfront_client::{
    CartError, CartManager, ClientError, ErrorKind, RestoreOutcome, SessionManager,
    resume_backend_session,
};
use shopfront_core::{Price, ProductId};
use shopfront_integration_tests::TestContext;

async fn logged_in() -> TestContext {
    let ctx = TestContext::new().await;
    ctx.backend.seed_account("ada", "secret-pass", "ada@example.com");
    let mut session =
        SessionManager::new(ctx.store.clone(), ctx.api.clone()).expect("Failed to open session");
    session
        .login("ada", SecretString::from("secret-pass".to_string()))
        .await
        .expect("Login failed");
    ctx
}

fn cart(ctx: &TestContext) -> CartManager {
    CartManager::new(ctx.store.clone(), ctx.api.clone())
}

fn stored_cart(ctx: &TestContext) -> CartState {
    ctx.store
        .load_json(keys::SHOPPING_CART)
        .expect("Read failed")
        .expect("No stored cart")
}

#[tokio::test]
async fn test_checkout_sends_cart_and_empties_it() {
    let ctx = logged_in().await;
    let mut cart = cart(&ctx);
    cart.add_product_to_cart(CartItem::new(7_i64, 2).with_detail("name", "Tee"))
        .expect("Add failed");
    cart.add_product_to_cart(CartItem::new("sku-9", 1))
        .expect("Add failed");

    let total = Price::parse("49.97").expect("Invalid price");
    cart.purchase_items(total).await.expect("Checkout failed");

    assert_eq!(
        ctx.backend.orders(),
        vec![json!({
            "cart": [
                {"productID": 7, "quantity_purchased": 2, "name": "Tee"},
                {"productID": "sku-9", "quantity_purchased": 1}
            ],
            "total": 49.97
        })]
    );
    assert!(cart.is_empty());
    assert_eq!(cart.last_modified(), None);

    let stored = stored_cart(&ctx);
    assert!(stored.items.is_empty());
    assert_eq!(stored.last_modified, None);
}

#[tokio::test]
async fn test_unavailable_item_keeps_cart() {
    let ctx = logged_in().await;
    ctx.backend.mark_unavailable(&json!(7));
    let mut cart = cart(&ctx);
    cart.add_product_to_cart(CartItem::new(7_i64, 1))
        .expect("Add failed");

    let err = cart
        .purchase_items(Price::parse("19.99").expect("Invalid price"))
        .await
        .expect_err("Checkout should fail");

    assert!(matches!(
        &err,
        CartError::Checkout(ApiError::Status { status: 409, .. })
    ));
    assert_eq!(ClientError::from(err).kind(), ErrorKind::Conflict);
    assert_eq!(cart.item_count(), 1);
    assert_eq!(stored_cart(&ctx).items.len(), 1);
    assert!(ctx.backend.orders().is_empty());
}

#[tokio::test]
async fn test_checkout_needs_backend_session() {
    let ctx = TestContext::new().await;
    let mut cart = cart(&ctx);
    cart.add_product_to_cart(CartItem::new(7_i64, 1))
        .expect("Add failed");

    let err = cart
        .purchase_items(Price::parse("19.99").expect("Invalid price"))
        .await
        .expect_err("Checkout should fail");

    assert!(matches!(
        err,
        CartError::Checkout(ApiError::Status { status: 401, .. })
    ));
    assert_eq!(cart.item_count(), 1);
}

#[tokio::test]
async fn test_checkout_from_new_process_reuses_login() {
    let ctx = logged_in().await;
    let mut first = cart(&ctx);
    first
        .add_product_to_cart(CartItem::new(7_i64, 1))
        .expect("Add failed");

    let api = ctx.fresh_client();
    assert!(resume_backend_session(ctx.store.as_ref(), api.as_ref()).expect("Read failed"));
    let mut second = CartManager::new(ctx.store.clone(), api);
    second.restore_cart_state().expect("Restore failed");
    second
        .purchase_items(Price::parse("19.99").expect("Invalid price"))
        .await
        .expect("Checkout failed");

    assert_eq!(ctx.backend.orders().len(), 1);
    assert!(second.is_empty());
}

#[tokio::test]
async fn test_cart_survives_restart() {
    let ctx = TestContext::new().await;
    let mut first = cart(&ctx);
    first
        .add_product_to_cart(CartItem::new(7_i64, 1))
        .expect("Add failed");
    first
        .add_product_to_cart(CartItem::new(7_i64, 2))
        .expect("Add failed");

    let mut second = CartManager::new(ctx.store.clone(), ctx.fresh_client());
    let outcome = second.restore_cart_state().expect("Restore failed");

    assert_eq!(outcome, RestoreOutcome::Restored { lines: 1 });
    assert_eq!(second.items().len(), 1);
    assert_eq!(second.items()[0].product_id, ProductId::from(7_i64));
    assert_eq!(second.items()[0].quantity_purchased, 3);
}

#[tokio::test]
async fn test_restore_with_empty_store() {
    let ctx = TestContext::new().await;
    let mut cart = cart(&ctx);
    assert_eq!(
        cart.restore_cart_state().expect("Restore failed"),
        RestoreOutcome::NotFound
    );
    assert!(cart.is_empty());
}

//! End-to-end walk through users, products and orders.

use axum::http::StatusCode;
use ecom_core::{OrderView, ProductView, UserView};
use ecom_integration_tests::{TestContext, product_ids};

#[tokio::test]
#[ignore = "Requires PostgreSQL (TEST_DATABASE_URL)"]
async fn test_shopping_flow() {
    let ctx = TestContext::new().await;

    let user = ctx.create_user("Shopper").await;
    let book = ctx.create_product("Book", 12.99).await;
    let pen = ctx.create_product("Pen", 1.25).await;
    let order = ctx.create_order(&user).await;

    for product in [&book, &pen] {
        let response = ctx
            .put(&format!("/orders/{}/add_product/{}", order.id, product.id), None)
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }

    // The user graph shows the order with both products, nested one level.
    let user: UserView = ctx.get(&format!("/users/{}", user.id)).await.json();
    let [placed] = user.orders.as_slice() else {
        panic!("expected exactly one order, got {:?}", user.orders);
    };
    assert_eq!(placed.id, order.id);
    let products = placed.products.clone().unwrap_or_default();
    let mut expected = vec![book.id, pen.id];
    expected.sort();
    assert_eq!(product_ids(&products), expected);
    assert!(products.iter().all(|p| p.orders.is_none()));

    // The product graph points back at the order without its products.
    let book: ProductView = ctx.get(&format!("/products/{}", book.id)).await.json();
    let orders = book.orders.unwrap_or_default();
    assert_eq!(orders.iter().map(|o| o.id).collect::<Vec<_>>(), vec![order.id]);
    assert!(orders.iter().all(|o| o.products.is_none()));

    let response = ctx
        .delete(&format!("/orders/{}/remove_product/{}", order.id, pen.id))
        .await;
    let order: OrderView = response.json();
    assert_eq!(
        product_ids(&order.products.unwrap_or_default()),
        vec![book.id]
    );

    let response = ctx.delete(&format!("/users/{}", user.id)).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

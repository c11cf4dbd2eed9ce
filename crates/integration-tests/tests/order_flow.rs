//! Order list, detail and the pay/cancel transitions.

#![allow(clippy::unwrap_used)]

use grayshop_core::{OrderId, OrderStatus};
use grayshop_integration_tests::{OrderItemRow, TestContext};
use grayshop_storefront::app::Action;
use grayshop_storefront::render::OrderDetailView;

fn mouse(stock_id: u64) -> Vec<OrderItemRow> {
    vec![OrderItemRow {
        stock_id,
        name: "鼠标".to_string(),
        price: 1999,
        qty: 1,
    }]
}

#[tokio::test]
async fn test_list_uses_configured_page_size() {
    let ctx = TestContext::new().await;
    let user = ctx.sign_in("alice").await;
    let stock = ctx.backend.seed_stock("鼠标", "数码", 1999, 5).await;
    ctx.backend.seed_order(user, "pending", mouse(stock)).await;
    let mut app = ctx.app();

    app.dispatch(Action::LoadOrders { page: 1 }).await;

    let page = &app.state().orders;
    assert_eq!(page.total, 1);
    assert_eq!(page.page_size, 20);
    assert!(page.list[0].items.is_empty());
    assert_eq!(page.list[0].status, OrderStatus::Pending);
    assert_eq!(
        ctx.backend.request_lines().await,
        vec!["GET /api/orders?page=1&page_size=20"]
    );
}

#[tokio::test]
async fn test_pay_reloads_list_and_detail() {
    let ctx = TestContext::new().await;
    let user = ctx.sign_in("alice").await;
    let stock = ctx.backend.seed_stock("鼠标", "数码", 1999, 5).await;
    let order = ctx.backend.seed_order(user, "pending", mouse(stock)).await;
    let mut app = ctx.app();

    app.dispatch(Action::LoadOrders { page: 1 }).await;
    app.dispatch(Action::OpenOrder(OrderId::new(order))).await;
    let before = app.state().open_order.clone().unwrap();
    assert_eq!(before.total_price.to_string(), "¥ 19.99");
    assert!(OrderDetailView(&before).to_string().contains("待支付"));

    ctx.backend.clear_requests().await;
    app.dispatch(Action::PayOrder(OrderId::new(order))).await;

    assert_eq!(app.state().notice.as_ref().unwrap().message, "支付成功");
    let after = app.state().open_order.clone().unwrap();
    assert_eq!(after.status, OrderStatus::Paid);
    assert_eq!(after.status.label(), "已支付");
    assert_eq!(after.total_price, before.total_price);
    assert_eq!(after.items, before.items);
    assert_eq!(app.state().orders.list[0].status, OrderStatus::Paid);
    assert_eq!(
        ctx.backend.request_lines().await,
        vec![
            format!("POST /api/orders/{order}/pay"),
            "GET /api/orders?page=1&page_size=20".to_string(),
            format!("GET /api/orders/{order}"),
        ]
    );
}

#[tokio::test]
async fn test_cancel_pending_order() {
    let ctx = TestContext::new().await;
    let user = ctx.sign_in("alice").await;
    let stock = ctx.backend.seed_stock("鼠标", "数码", 1999, 5).await;
    let order = ctx.backend.seed_order(user, "pending", mouse(stock)).await;
    let mut app = ctx.app();

    app.dispatch(Action::LoadOrders { page: 1 }).await;
    app.dispatch(Action::CancelOrder(OrderId::new(order))).await;

    assert_eq!(app.state().notice.as_ref().unwrap().message, "已取消");
    assert_eq!(
        app.state().open_order.as_ref().unwrap().status,
        OrderStatus::Canceled
    );
    assert_eq!(ctx.backend.state().await.stocks[0].inventory, 6);
}

#[tokio::test]
async fn test_cancel_paid_order_keeps_displayed_status() {
    let ctx = TestContext::new().await;
    let user = ctx.sign_in("alice").await;
    let stock = ctx.backend.seed_stock("鼠标", "数码", 1999, 5).await;
    let order = ctx.backend.seed_order(user, "paid", mouse(stock)).await;
    let mut app = ctx.app();

    app.dispatch(Action::OpenOrder(OrderId::new(order))).await;
    app.dispatch(Action::CancelOrder(OrderId::new(order))).await;

    let notice = app.state().notice.clone().unwrap();
    assert!(notice.is_error());
    assert_eq!(notice.message, "取消失败");
    assert_eq!(
        app.state().open_order.as_ref().unwrap().status,
        OrderStatus::Paid
    );
}

#[tokio::test]
async fn test_unknown_status_is_shown_raw() {
    let ctx = TestContext::new().await;
    let user = ctx.sign_in("alice").await;
    let stock = ctx.backend.seed_stock("鼠标", "数码", 1999, 5).await;
    let order = ctx.backend.seed_order(user, "refunding", mouse(stock)).await;
    let mut app = ctx.app();

    app.dispatch(Action::OpenOrder(OrderId::new(order))).await;

    let detail = app.state().open_order.as_ref().unwrap();
    assert!(OrderDetailView(detail).to_string().contains("状态: refunding"));
}

#[tokio::test]
async fn test_missing_order_is_a_notice() {
    let ctx = TestContext::new().await;
    ctx.sign_in("alice").await;
    let mut app = ctx.app();

    app.dispatch(Action::OpenOrder(OrderId::new(404))).await;

    assert_eq!(app.state().notice.as_ref().unwrap().message, "订单不存在");
    assert!(app.state().open_order.is_none());
}

//! Product loading and client-side filtering.

#![allow(clippy::unwrap_used)]

use grayshop_core::ProductId;
use grayshop_integration_tests::TestContext;
use grayshop_storefront::app::Action;
use grayshop_storefront::render::CatalogView;
use grayshop_storefront::services::SortKey;
use rust_decimal::Decimal;

fn names(app: &grayshop_storefront::app::App) -> Vec<String> {
    app.state()
        .visible_products()
        .into_iter()
        .map(|p| p.name.clone())
        .collect()
}

#[tokio::test]
async fn test_load_keeps_server_order_without_auth() {
    let ctx = TestContext::new().await;
    ctx.backend.seed_stock("键盘", "数码", 39900, 3).await;
    ctx.backend.seed_stock("保温杯", "生活", 8900, 0).await;
    ctx.backend.seed_stock("鼠标", "数码", 1999, 5).await;
    let mut app = ctx.app();

    app.dispatch(Action::LoadProducts).await;

    assert_eq!(names(&app), vec!["鼠标", "保温杯", "键盘"]);
    assert_eq!(app.state().categories(), vec!["数码", "生活"]);
    let requests = ctx.backend.requests().await;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].authorization, None);
}

#[tokio::test]
async fn test_category_filter_round_trips_to_all() {
    let ctx = TestContext::new().await;
    ctx.backend.seed_stock("键盘", "数码", 39900, 3).await;
    ctx.backend.seed_stock("保温杯", "生活", 8900, 2).await;
    ctx.backend.seed_stock("鼠标", "数码", 1999, 5).await;
    let mut app = ctx.app();
    app.dispatch(Action::LoadProducts).await;

    app.dispatch(Action::SetCategory(Some("数码".to_string()))).await;
    assert_eq!(names(&app), vec!["鼠标", "键盘"]);

    app.dispatch(Action::SetCategory(None)).await;
    assert_eq!(names(&app), vec!["鼠标", "保温杯", "键盘"]);

    // Filtering never hits the network.
    assert_eq!(ctx.backend.requests().await.len(), 1);
}

#[tokio::test]
async fn test_price_bounds_are_inclusive_and_sortable() {
    let ctx = TestContext::new().await;
    ctx.backend.seed_stock("A", "", 1000, 1).await;
    ctx.backend.seed_stock("B", "", 2000, 1).await;
    ctx.backend.seed_stock("C", "", 3000, 1).await;
    let mut app = ctx.app();
    app.dispatch(Action::LoadProducts).await;

    app.dispatch(Action::SetPriceRange {
        min: Some(Decimal::new(10, 0)),
        max: Some(Decimal::new(20, 0)),
    })
    .await;
    assert_eq!(names(&app), vec!["B", "A"]);

    app.dispatch(Action::SetSort(SortKey::PriceAsc)).await;
    assert_eq!(names(&app), vec!["A", "B"]);

    app.dispatch(Action::ResetFilter).await;
    assert_eq!(names(&app), vec!["C", "B", "A"]);
}

#[tokio::test]
async fn test_keyword_matches_name_case_insensitively() {
    let ctx = TestContext::new().await;
    ctx.backend.seed_stock("USB Hub", "数码", 5900, 1).await;
    ctx.backend.seed_stock("保温杯", "生活", 8900, 1).await;
    let mut app = ctx.app();
    app.dispatch(Action::LoadProducts).await;

    app.dispatch(Action::SetKeyword("  usb ".to_string())).await;
    assert_eq!(names(&app), vec!["USB Hub"]);

    app.dispatch(Action::SetKeyword("耳机".to_string())).await;
    assert!(names(&app).is_empty());
    assert!(CatalogView(app.state()).to_string().contains("没有符合条件的商品"));
}

#[tokio::test]
async fn test_open_product_modal() {
    let ctx = TestContext::new().await;
    let id = ctx.backend.seed_stock("鼠标", "数码", 1999, 5).await;
    let mut app = ctx.app();
    app.dispatch(Action::LoadProducts).await;

    app.dispatch(Action::OpenProduct(ProductId::new(id))).await;
    assert_eq!(app.state().modal_product().unwrap().name, "鼠标");

    app.dispatch(Action::CloseProduct).await;
    assert!(app.state().modal_product().is_none());

    app.dispatch(Action::OpenProduct(ProductId::new(99))).await;
    let notice = app.state().notice.clone().unwrap();
    assert!(notice.is_error());
    assert_eq!(notice.message, "商品不存在: 99");
    assert!(app.state().modal.is_none());
}

//! Login, registration, logout and stock publishing.

#![allow(clippy::unwrap_used)]

use grayshop_core::Price;
use grayshop_integration_tests::TestContext;
use grayshop_storefront::api::{NewStock, Picture};
use grayshop_storefront::app::Action;
use grayshop_storefront::navigation::Route;
use grayshop_storefront::services::Registration;
use grayshop_storefront::token_store::TokenStore;
use secrecy::SecretString;

fn registration(username: &str, password: &str, confirm: &str) -> Registration {
    Registration {
        username: username.to_string(),
        password: SecretString::from(password.to_string()),
        confirm_password: SecretString::from(confirm.to_string()),
        email: format!("{}@example.com", username.trim()),
        phone_num: String::new(),
    }
}

#[tokio::test]
async fn test_register_validation_sends_nothing() {
    let ctx = TestContext::new().await;
    let mut app = ctx.app();

    for (form, expected) in [
        (registration("  ", "secret1", "secret1"), "请输入用户名"),
        (registration("bob", "12345", "12345"), "密码至少 6 位"),
        (registration("bob", "secret1", "secret2"), "两次密码不一致"),
    ] {
        app.dispatch(Action::Register(form)).await;
        let notice = app.state().notice.clone().unwrap();
        assert!(notice.is_error());
        assert_eq!(notice.message, expected);
    }

    assert!(ctx.backend.requests().await.is_empty());
    assert_eq!(app.route().await, Route::Catalog);
}

#[tokio::test]
async fn test_register_then_login() {
    let ctx = TestContext::new().await;
    let mut app = ctx.app();

    app.dispatch(Action::Register(registration("bob", "secret1", "secret1")))
        .await;
    assert_eq!(app.state().notice.as_ref().unwrap().message, "注册成功，请登录");
    assert_eq!(app.route().await, Route::Login);
    assert!(ctx.tokens.get().unwrap().is_none());

    app.dispatch(Action::Login {
        account: "bob@example.com".to_string(),
        password: SecretString::from("secret1".to_string()),
    })
    .await;

    assert_eq!(app.state().notice.as_ref().unwrap().message, "登录成功");
    assert_eq!(app.route().await, Route::Catalog);
    assert_eq!(app.state().user.as_ref().unwrap().username, "bob");
    let token = ctx.tokens.get().unwrap().unwrap();
    assert!(token.expose().starts_with("token-"));
}

#[tokio::test]
async fn test_duplicate_registration_shows_server_message() {
    let ctx = TestContext::new().await;
    ctx.backend.seed_user("bob", "secret1", "bob@example.com").await;
    let mut app = ctx.app();

    app.dispatch(Action::Register(registration("bob", "secret1", "secret1")))
        .await;

    assert_eq!(
        app.state().notice.as_ref().unwrap().message,
        "注册失败(可能重复)"
    );
    assert_eq!(app.route().await, Route::Catalog);
}

#[tokio::test]
async fn test_wrong_password_is_reported() {
    let ctx = TestContext::new().await;
    ctx.backend.seed_user("bob", "secret1", "bob@example.com").await;
    let mut app = ctx.app();

    app.dispatch(Action::Login {
        account: "bob".to_string(),
        password: SecretString::from("wrong-one".to_string()),
    })
    .await;

    let notice = app.state().notice.clone().unwrap();
    assert!(notice.is_error());
    assert_eq!(notice.message, "账号或密码错误");
    assert!(app.state().user.is_none());
    assert!(ctx.tokens.get().unwrap().is_none());
    assert_eq!(app.route().await, Route::Login);
}

#[tokio::test]
async fn test_blank_login_sends_nothing() {
    let ctx = TestContext::new().await;
    let mut app = ctx.app();

    app.dispatch(Action::Login {
        account: " ".to_string(),
        password: SecretString::from("secret1".to_string()),
    })
    .await;

    assert_eq!(app.state().notice.as_ref().unwrap().message, "请输入账号和密码");
    assert!(ctx.backend.requests().await.is_empty());
}

#[tokio::test]
async fn test_me_and_logout() {
    let ctx = TestContext::new().await;
    let user = ctx.sign_in("alice").await;
    let mut app = ctx.app();

    app.dispatch(Action::LoadMe).await;
    let me = app.state().user.clone().unwrap();
    assert_eq!(me.id.as_u64(), user);
    assert_eq!(me.email.as_deref(), Some("alice@example.com"));

    ctx.backend.clear_requests().await;
    app.dispatch(Action::Logout).await;

    assert_eq!(app.state().notice.as_ref().unwrap().message, "已退出登录");
    assert!(app.state().user.is_none());
    assert!(ctx.tokens.get().unwrap().is_none());
    assert_eq!(app.route().await, Route::Login);
    assert!(ctx.backend.requests().await.is_empty());
}

#[tokio::test]
async fn test_publish_stock_uploads_multipart() {
    let ctx = TestContext::new().await;
    ctx.sign_in("admin").await;
    let mut app = ctx.app();

    app.dispatch(Action::PublishStock(NewStock {
        name: "蓝牙耳机".to_string(),
        price: Price::from_minor(19_900),
        category: "数码".to_string(),
        info: "降噪".to_string(),
        inventory: 12,
        picture: Some(Picture {
            file_name: "earbuds.png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
            mime: Some("image/png".to_string()),
        }),
    }))
    .await;
    assert_eq!(app.state().notice.as_ref().unwrap().message, "发布成功");

    let requests = ctx.backend.requests().await;
    assert_eq!(requests[0].line(), "POST /api/admin/stocks");
    assert!(
        requests[0]
            .content_type
            .as_deref()
            .unwrap()
            .starts_with("multipart/form-data; boundary=")
    );

    {
        let state = ctx.backend.state().await;
        let upload = &state.uploads[0];
        assert_eq!(upload.fields["name"], "蓝牙耳机");
        assert_eq!(upload.fields["price"], "19900");
        assert_eq!(upload.fields["category"], "数码");
        assert_eq!(upload.fields["info"], "降噪");
        assert_eq!(upload.fields["inventory"], "12");
        assert_eq!(upload.picture_name.as_deref(), Some("earbuds.png"));
        assert_eq!(upload.picture_type.as_deref(), Some("image/png"));
        assert_eq!(upload.picture_len, 4);
    }

    app.dispatch(Action::LoadProducts).await;
    let product = &app.state().products[0];
    assert_eq!(product.name, "蓝牙耳机");
    assert_eq!(product.price.to_string(), "¥ 199.00");
    assert_eq!(product.inventory, Some(12));
}

#[tokio::test]
async fn test_publish_rejects_zero_price_locally() {
    let ctx = TestContext::new().await;
    ctx.sign_in("admin").await;
    let mut app = ctx.app();

    app.dispatch(Action::PublishStock(NewStock {
        name: "赠品".to_string(),
        price: Price::from_minor(0),
        category: String::new(),
        info: String::new(),
        inventory: 1,
        picture: None,
    }))
    .await;

    assert_eq!(app.state().notice.as_ref().unwrap().message, "价格必须大于 0");
    assert!(ctx.backend.requests().await.is_empty());
}

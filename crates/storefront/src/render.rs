//! Plain-text views over [`AppState`].
//!
//! Each view borrows the state and implements `Display`, so front-ends can
//! write them anywhere a formatter goes.

use std::fmt;

use crate::models::{Order, Product};
use crate::navigation::Route;
use crate::state::AppState;

const EMPTY_CART: &str = "购物车空空的，去挑点商品吧。";

/// The whole screen for `route`: its main view plus the pending notice.
pub struct Screen<'a> {
    pub state: &'a AppState,
    pub route: Route,
}

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.route {
            Route::Catalog => {
                write!(f, "{}", CatalogView(self.state))?;
                if let Some(product) = self.state.modal_product() {
                    writeln!(f)?;
                    write!(f, "{}", ProductView(product))?;
                }
                writeln!(f)?;
                write!(f, "{}", CartView(self.state))?;
            }
            Route::Orders => {
                write!(f, "{}", OrdersView(self.state))?;
                if let Some(order) = &self.state.open_order {
                    writeln!(f)?;
                    write!(f, "{}", OrderDetailView(order))?;
                }
            }
            Route::Login => writeln!(f, "请登录: login <账号> <密码>")?,
            Route::Register => writeln!(f, "注册: register <用户名> <邮箱> [手机号]")?,
            Route::Admin => writeln!(f, "发布商品: publish <名称> <价格> <库存> [选项]")?,
        }

        if let Some(notice) = &self.state.notice {
            let marker = if notice.is_error() { "!" } else { "*" };
            writeln!(f, "{marker} {notice}")?;
        }
        Ok(())
    }
}

/// Category chips plus the filtered product grid.
pub struct CatalogView<'a>(pub &'a AppState);

impl fmt::Display for CatalogView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;
        let active = state.filter.category.as_deref();

        write!(f, "分类:")?;
        write!(f, " {}", chip("全部", active.is_none()))?;
        for category in state.categories() {
            write!(f, " {}", chip(category, active == Some(category)))?;
        }
        writeln!(f)?;

        let visible = state.visible_products();
        writeln!(f, "共 {} 件商品 · 排序 {}", visible.len(), state.filter.sort)?;
        if visible.is_empty() {
            return writeln!(f, "没有符合条件的商品");
        }
        for product in visible {
            write!(
                f,
                "#{:<4} {}  [{}]  {}",
                product.id,
                product.name,
                product.category_label(),
                product.price
            )?;
            writeln!(f, "  库存 {}", inventory(product))?;
        }
        Ok(())
    }
}

fn chip(label: &str, active: bool) -> String {
    if active {
        format!("[{label}]")
    } else {
        label.to_string()
    }
}

fn inventory(product: &Product) -> String {
    product
        .inventory
        .map_or_else(|| "-".to_string(), |n| n.to_string())
}

/// Product detail modal.
pub struct ProductView<'a>(pub &'a Product);

impl fmt::Display for ProductView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let product = self.0;
        writeln!(f, "== {} ==", product.name)?;
        writeln!(f, "分类: {}", product.category_label())?;
        writeln!(f, "库存: {}", inventory(product))?;
        writeln!(f, "价格: {}", product.price)?;
        if let Some(updated) = product.last_update {
            writeln!(f, "上架: {}", updated.format("%Y-%m-%d"))?;
        }
        if !product.picture.is_empty() {
            writeln!(f, "图片: {}", product.picture)?;
        }
        if product.description.is_empty() {
            writeln!(f, "暂无描述。")
        } else {
            writeln!(f, "{}", product.description)
        }
    }
}

/// Cart drawer: lines, over-stock flags, count and total.
pub struct CartView<'a>(pub &'a AppState);

impl fmt::Display for CartView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;
        let summary = state.cart_summary();
        writeln!(f, "购物车 ({})", summary.total_quantity)?;

        if state.cart.is_empty() {
            writeln!(f, "{EMPTY_CART}")?;
        }
        for line in &state.cart {
            write!(
                f,
                "  #{:<4} {}  {} × {} = {}",
                line.id,
                line.stock.name,
                line.stock.price,
                line.quantity,
                line.line_total()
            )?;
            if line.exceeds_inventory() {
                write!(f, "  超出库存")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "合计: {}", summary.total)
    }
}

/// Order list for the current page.
pub struct OrdersView<'a>(pub &'a AppState);

impl fmt::Display for OrdersView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let page = &self.0.orders;
        if page.list.is_empty() {
            return writeln!(f, "暂无订单");
        }

        writeln!(f, "共 {} 笔 · 第 {} 页", page.total, page.page.max(1))?;
        for order in &page.list {
            writeln!(f, "#{:<4} {}  {}", order.id, order.status, order.total_price)?;
        }
        Ok(())
    }
}

/// One order with its item breakdown.
pub struct OrderDetailView<'a>(pub &'a Order);

impl fmt::Display for OrderDetailView<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let order = self.0;
        writeln!(f, "订单 #{}", order.id)?;
        writeln!(f, "状态: {}", order.status)?;
        writeln!(f, "合计: {}", order.total_price)?;
        for item in &order.items {
            writeln!(
                f,
                "  {} × {}  {}",
                item.name,
                item.qty,
                item.price.times(item.qty)
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::{CartLine, OrderItem, OrderPage};
    use crate::state::Notice;
    use grayshop_core::{CartLineId, OrderId, OrderStatus, Price, ProductId};

    fn product(id: u64, category: &str, minor: i64, inventory: Option<u32>) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("商品{id}"),
            category: category.to_string(),
            price: Price::from_minor(minor),
            inventory,
            description: String::new(),
            picture: String::new(),
            last_update: None,
        }
    }

    #[test]
    fn test_cart_view_flags_over_stock() {
        let state = AppState {
            cart: vec![CartLine {
                id: CartLineId::new(1),
                stock_id: ProductId::new(9),
                quantity: 3,
                stock: product(9, "数码", 10000, Some(2)),
            }],
            ..Default::default()
        };
        let text = CartView(&state).to_string();
        assert!(text.contains("超出库存"));
        assert!(text.contains("合计: ¥ 300.00"));
        assert!(text.starts_with("购物车 (3)"));
    }

    #[test]
    fn test_empty_cart_view() {
        let text = CartView(&AppState::default()).to_string();
        assert!(text.contains(EMPTY_CART));
        assert!(text.contains("合计: ¥ 0.00"));
    }

    #[test]
    fn test_catalog_marks_active_category() {
        let mut state = AppState {
            products: vec![product(1, "数码", 100, None), product(2, "", 200, Some(1))],
            ..Default::default()
        };
        let text = CatalogView(&state).to_string();
        assert!(text.starts_with("分类: [全部] 数码"));
        assert!(text.contains("未分类"));

        state.filter.category = Some("数码".to_string());
        let text = CatalogView(&state).to_string();
        assert!(text.starts_with("分类: 全部 [数码]"));
        assert!(text.contains("共 1 件商品"));
    }

    #[test]
    fn test_order_detail_view() {
        let order = Order {
            id: OrderId::new(5),
            status: OrderStatus::Paid,
            total_price: Price::from_minor(1999),
            items: vec![OrderItem {
                stock_id: ProductId::new(2),
                name: "鼠标".to_string(),
                price: Price::from_minor(1999),
                qty: 1,
            }],
        };
        let text = OrderDetailView(&order).to_string();
        assert!(text.contains("状态: 已支付"));
        assert!(text.contains("合计: ¥ 19.99"));
        assert!(text.contains("鼠标 × 1  ¥ 19.99"));
    }

    #[test]
    fn test_screen_appends_notice() {
        let state = AppState {
            orders: OrderPage::default(),
            notice: Some(Notice::error("库存不足")),
            ..Default::default()
        };
        let text = Screen {
            state: &state,
            route: Route::Orders,
        }
        .to_string();
        assert!(text.contains("暂无订单"));
        assert!(text.ends_with("! 库存不足\n"));
    }
}

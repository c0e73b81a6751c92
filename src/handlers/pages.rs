// src/handlers/pages.rs
//
// Páginas HTML. As públicas não exigem login; o painel exige a sessão de
// equipe (cookie), criada pelo formulário de /staff/login/.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use serde::Deserialize;

use crate::{
    common::{
        error::AppError,
        html::{escape, money, page},
    },
    config::AppState,
    middleware::auth::{SessionStaff, SESSION_COOKIE},
    models::{
        catalog::{Category, MenuItem},
        dashboard::{DashboardSummary, HomeStats},
        orders::Order,
        tables::Table,
    },
};

// 404 vira página; o resto segue o formato JSON de sempre
fn respond(result: Result<Html<String>, AppError>) -> Response {
    match result {
        Ok(html) => html.into_response(),
        Err(AppError::ResourceNotFound(what)) => (
            StatusCode::NOT_FOUND,
            page("Not found", &format!("<p class=\"muted\">{} not found.</p>", escape(&what))),
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}

// ---
// PÚBLICAS
// ---

pub async fn home(State(app_state): State<AppState>) -> Response {
    respond(home_page(&app_state).await)
}

async fn home_page(app_state: &AppState) -> Result<Html<String>, AppError> {
    let featured = app_state.catalog_service.newest_items(3).await?;
    let stats = app_state.dashboard_service.home_stats().await?;
    Ok(render_home(&featured, &stats))
}

pub async fn menu(State(app_state): State<AppState>) -> Response {
    respond(app_state.catalog_service.public_menu().await.map(|groups| render_menu(&groups)))
}

#[derive(Debug, Deserialize)]
pub struct OrderPageQuery {
    table: Option<String>,
}

pub async fn order_page(State(app_state): State<AppState>, Query(query): Query<OrderPageQuery>) -> Response {
    respond(order_form_page(&app_state, query.table.as_deref()).await)
}

async fn order_form_page(app_state: &AppState, table: Option<&str>) -> Result<Html<String>, AppError> {
    // Sem ?table= (ou com lixo) não há mesa para pedir
    let table_id = table
        .and_then(|raw| raw.trim().parse::<i64>().ok())
        .ok_or_else(|| AppError::not_found("Table"))?;

    let table = app_state.table_service.get(table_id).await?;
    let items = app_state.catalog_service.orderable_items().await?;
    Ok(render_order_form(&table, &items))
}

pub async fn order_status(State(app_state): State<AppState>, Path(id): Path<i64>) -> Response {
    respond(app_state.order_service.get(id).await.map(|order| render_order_status(&order)))
}

// ---
// EQUIPE
// ---

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    username: String,
    #[serde(default)]
    password: String,
}

pub async fn login_form(session: Result<SessionStaff, Redirect>) -> Response {
    if session.is_ok() {
        return Redirect::to("/admin/dashboard/").into_response();
    }
    render_login("").into_response()
}

pub async fn login_submit(
    State(app_state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<LoginForm>,
) -> Response {
    let username = form.username.trim();

    match app_state.auth_service.login_session(username, &form.password).await {
        Ok(token) => {
            let cookie = Cookie::build((SESSION_COOKIE, token))
                .path("/")
                .http_only(true)
                .same_site(SameSite::Lax);
            (jar.add(cookie), Redirect::to("/admin/dashboard/")).into_response()
        }
        Err(AppError::InvalidCredentials) => {
            tracing::info!(username, "Rejected staff login");
            render_login("Invalid credentials or not authorized as staff.").into_response()
        }
        Err(e) => e.into_response(),
    }
}

pub async fn logout(jar: CookieJar) -> impl IntoResponse {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Redirect::to("/"))
}

pub async fn admin_dashboard(State(app_state): State<AppState>, SessionStaff(staff): SessionStaff) -> Response {
    respond(
        app_state
            .dashboard_service
            .summary(Utc::now())
            .await
            .map(|summary| render_dashboard(&staff.username, &summary)),
    )
}

// ---
// RENDERIZAÇÃO
// ---

fn item_card(item: &MenuItem) -> String {
    let image = item
        .image
        .as_deref()
        .map(|src| format!("<img src=\"{}\" alt=\"\" width=\"120\"> ", escape(src)))
        .unwrap_or_default();
    format!(
        "<li>{image}<strong>{}</strong> · {} <span class=\"muted\">{}</span></li>",
        escape(&item.name),
        money(item.price),
        escape(&item.description),
    )
}

fn render_home(featured: &[MenuItem], stats: &HomeStats) -> Html<String> {
    let featured: String = featured.iter().map(item_card).collect();
    page(
        "Welcome",
        &format!(
            r#"<p>{} categories · {} dishes available · {} tables in use · {} open orders</p>
<h2>New on the menu</h2>
<ul>{featured}</ul>
<p><a href="/menu/">See the full menu</a></p>"#,
            stats.category_count, stats.menu_item_count, stats.active_tables, stats.open_orders,
        ),
    )
}

fn render_menu(groups: &[(Category, Vec<MenuItem>)]) -> Html<String> {
    if groups.is_empty() {
        return page("Menu", "<p class=\"muted\">Nothing to order right now.</p>");
    }
    let body: String = groups
        .iter()
        .map(|(category, items)| {
            let items: String = items.iter().map(item_card).collect();
            format!("<h2>{}</h2><ul>{items}</ul>", escape(&category.name))
        })
        .collect();
    page("Menu", &body)
}

fn render_order_form(table: &Table, items: &[MenuItem]) -> Html<String> {
    let rows: String = items
        .iter()
        .map(|item| {
            format!(
                r#"<tr><td>{}</td><td>{}</td>
<td><input type="number" min="0" value="0" data-item="{}" class="qty"></td>
<td><input type="text" data-notes="{}" placeholder="Notes"></td></tr>"#,
                escape(&item.name),
                money(item.price),
                item.id,
                item.id,
            )
        })
        .collect();

    page(
        &format!("Order · Table {}", table.table_number),
        &format!(
            r#"<form id="order-form">
<table><thead><tr><th>Dish</th><th>Price</th><th>Qty</th><th></th></tr></thead>
<tbody>{rows}</tbody></table>
<p><textarea id="special" placeholder="Special instructions"></textarea></p>
<p><button type="submit">Place order</button> <span id="order-error" class="error"></span></p>
</form>
<script>
document.getElementById("order-form").addEventListener("submit", async (ev) => {{
  ev.preventDefault();
  const items = [];
  document.querySelectorAll("input.qty").forEach((input) => {{
    const quantity = parseInt(input.value, 10);
    if (quantity > 0) {{
      const id = input.dataset.item;
      const notes = document.querySelector(`[data-notes="${{id}}"]`).value;
      items.push({{ menuItemId: Number(id), quantity, customNotes: notes }});
    }}
  }});
  const res = await fetch("/api/orders/", {{
    method: "POST",
    headers: {{ "Content-Type": "application/json" }},
    body: JSON.stringify({{
      tableId: {table_id},
      items,
      specialInstructions: document.getElementById("special").value,
    }}),
  }});
  const body = await res.json();
  if (res.ok) {{
    window.location = `/order/track/${{body.id}}/`;
  }} else {{
    document.getElementById("order-error").textContent = body.error || "Could not place the order.";
  }}
}});
</script>"#,
            table_id = table.id,
        ),
    )
}

fn render_order_status(order: &Order) -> Html<String> {
    let lines: String = order
        .items
        .iter()
        .map(|line| {
            format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                escape(&line.menu_item.name),
                line.quantity,
                escape(&line.custom_notes),
                money(line.line_total),
            )
        })
        .collect();
    let instructions = if order.special_instructions.is_empty() {
        String::new()
    } else {
        format!("<p class=\"muted\">{}</p>", escape(&order.special_instructions))
    };

    page(
        &format!("Order #{}", order.id),
        &format!(
            r#"<p>Table {} · status <strong id="status">{}</strong></p>
{instructions}
<table><thead><tr><th>Dish</th><th>Qty</th><th>Notes</th><th>Total</th></tr></thead>
<tbody>{lines}</tbody></table>
<p><strong>Total: {}</strong></p>
<script>
const ws = new WebSocket(`${{location.protocol === "https:" ? "wss" : "ws"}}://${{location.host}}/ws/orders/`);
ws.onmessage = (msg) => {{
  const data = JSON.parse(msg.data);
  if (data.order && data.order.id === {id}) {{ window.location.reload(); }}
}};
</script>"#,
            order.table.table_number,
            order.status.label(),
            money(order.total_price),
            id = order.id,
        ),
    )
}

fn render_login(message: &str) -> Html<String> {
    let message = if message.is_empty() {
        String::new()
    } else {
        format!("<p class=\"error\">{}</p>", escape(message))
    };
    page(
        "Staff login",
        &format!(
            r#"{message}<form method="post" action="/staff/login/">
<p><label>Username <input name="username" autocomplete="username"></label></p>
<p><label>Password <input name="password" type="password" autocomplete="current-password"></label></p>
<p><button type="submit">Log in</button></p>
</form>"#
        ),
    )
}

fn render_dashboard(username: &str, summary: &DashboardSummary) -> Html<String> {
    let active: String = summary
        .active_orders
        .iter()
        .map(|o| {
            format!(
                "<tr><td><a href=\"/order/track/{id}/\">#{id}</a></td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
                o.table_number,
                o.status.label(),
                money(o.total_price),
                o.created_at.format("%Y-%m-%d %H:%M"),
                id = o.id,
            )
        })
        .collect();
    let tables: String = summary
        .table_stats
        .iter()
        .map(|s| format!("<li>{}: {}</li>", s.status.label(), s.count))
        .collect();
    let popular: String = summary
        .popular_dishes
        .iter()
        .map(|d| format!("<li>{} ({}×)</li>", escape(&d.name), d.times_ordered))
        .collect();

    page(
        "Dashboard",
        &format!(
            r#"<p class="muted">Signed in as {} · <a href="/staff/logout/">Log out</a></p>
<p>Total revenue: <strong>{}</strong> · Today: <strong>{}</strong></p>
<h2>Active orders</h2>
<table><thead><tr><th>Order</th><th>Table</th><th>Status</th><th>Total</th><th>Created</th></tr></thead>
<tbody>{active}</tbody></table>
<h2>Tables</h2><ul>{tables}</ul>
<h2>Popular dishes</h2><ol>{popular}</ol>"#,
            escape(username),
            money(summary.total_revenue),
            money(summary.daily_revenue),
        ),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        dashboard::{ActiveOrder, PopularDish, TableStatusCount},
        orders::OrderStatus,
        tables::TableStatus,
    };
    use rust_decimal::Decimal;

    fn dish(id: i64, name: &str, category: (i64, &str)) -> MenuItem {
        MenuItem {
            id,
            name: name.into(),
            description: "House special".into(),
            price: Decimal::new(18000, 2),
            is_available: true,
            image: None,
            category: Category {
                id: category.0,
                name: category.1.into(),
            },
        }
    }

    #[test]
    fn menu_lists_categories_and_escapes_names() {
        let groups = vec![(
            Category { id: 1, name: "Main Course".into() },
            vec![dish(1, "Paneer <Tikka>", (1, "Main Course"))],
        )];
        let Html(body) = render_menu(&groups);

        assert!(body.contains("<h2>Main Course</h2>"));
        assert!(body.contains("Paneer &lt;Tikka&gt;"));
        assert!(body.contains("180.00"));
    }

    #[test]
    fn order_form_posts_the_table_id() {
        let table = Table {
            id: 9,
            table_number: 4,
            capacity: 2,
            status: TableStatus::Available,
            qr_code_url: None,
            opened_at: None,
            closed_at: None,
        };
        let Html(body) = render_order_form(&table, &[dish(3, "Masala Dosa", (1, "Main Course"))]);

        assert!(body.contains("Order · Table 4"));
        assert!(body.contains("tableId: 9"));
        assert!(body.contains("data-item=\"3\""));
    }

    #[test]
    fn dashboard_shows_revenue_and_rankings() {
        let summary = DashboardSummary {
            total_revenue: Decimal::new(25000, 2),
            daily_revenue: Decimal::new(5000, 2),
            active_orders: vec![ActiveOrder {
                id: 7,
                table_number: 2,
                status: OrderStatus::Preparing,
                total_price: Decimal::new(12000, 2),
                created_at: Utc::now(),
            }],
            table_stats: vec![TableStatusCount { status: TableStatus::Occupied, count: 3 }],
            popular_dishes: vec![PopularDish { menu_item_id: 1, name: "Masala Chai".into(), times_ordered: 4 }],
        };
        let Html(body) = render_dashboard("admin", &summary);

        assert!(body.contains("Total revenue: <strong>250.00</strong>"));
        assert!(body.contains("Today: <strong>50.00</strong>"));
        assert!(body.contains("/order/track/7/"));
        assert!(body.contains("Occupied: 3"));
        assert!(body.contains("Masala Chai (4×)"));
    }

    #[test]
    fn login_page_shows_the_error_message() {
        let Html(body) = render_login("Invalid credentials or not authorized as staff.");
        assert!(body.contains("class=\"error\""));
        assert!(!render_login("").0.contains("class=\"error\""));
    }
}

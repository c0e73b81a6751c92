// src/common/html.rs
//
// Utilitários mínimos para as páginas HTML (públicas e do painel).

use axum::response::Html;
use rust_decimal::Decimal;

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

/// Envolve o corpo no layout comum (cabeçalho + navegação).
pub fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · Tableside</title>
<style>
body {{ font-family: system-ui, sans-serif; margin: 0 auto; max-width: 960px; padding: 1rem; }}
nav a {{ margin-right: 1rem; }}
table {{ border-collapse: collapse; width: 100%; }}
th, td {{ border-bottom: 1px solid #ddd; padding: .4rem; text-align: left; }}
.muted {{ color: #666; }}
.error {{ color: #b00020; }}
</style>
</head>
<body>
<nav><a href="/">Home</a><a href="/menu/">Menu</a><a href="/admin/dashboard/">Dashboard</a></nav>
<h1>{title}</h1>
{body}
</body>
</html>"#,
        title = escape(title),
        body = body,
    ))
}

//! HTTP surface: the single-page display and a small JSON API.
//!
//! Config and price snapshot are loaded once at startup. Rates are
//! recomputed on every request against the current wall-clock time.

use actix_cors::Cors;
use actix_web::{http::header::ContentType, web, App, HttpResponse, HttpServer, Responder};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::{
    config::RoiConfig,
    error::RoiError,
    prices::PriceSnapshot,
    report::{parse_investment, Projection, ReturnsReport, ShareLinks},
    util::{
        date_utils::display_date,
        format_utils::{format_percent, format_usd},
    },
};

pub struct AppState {
    pub config: RoiConfig,
    pub prices: PriceSnapshot,
}

impl AppState {
    pub fn new(config: RoiConfig, prices: PriceSnapshot) -> Self {
        Self { config, prices }
    }

    fn report(&self) -> Result<ReturnsReport, RoiError> {
        ReturnsReport::compute(&self.config, &self.prices, Utc::now())
    }
}

#[derive(Debug, Deserialize)]
pub struct AmountQuery {
    pub amount: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProjectionsResponse {
    amount: f64,
    rate: f64,
    projections: Vec<Projection>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(e: RoiError) -> HttpResponse {
    error!("Failed to compute report: {}", e);
    HttpResponse::InternalServerError().json(ErrorResponse {
        error: e.to_string(),
    })
}

async fn health() -> impl Responder {
    HttpResponse::Ok().body("ok")
}

async fn get_returns(state: web::Data<AppState>) -> HttpResponse {
    match state.report() {
        Ok(report) => HttpResponse::Ok().json(report),
        Err(e) => error_response(e),
    }
}

async fn get_projections(
    query: web::Query<AmountQuery>,
    state: web::Data<AppState>,
) -> HttpResponse {
    let Some(amount) = query.amount.as_deref().and_then(parse_investment) else {
        return invalid_amount();
    };
    match state.report() {
        Ok(report) => HttpResponse::Ok().json(ProjectionsResponse {
            amount,
            rate: report.tracked.rate,
            projections: report.projections(amount, &state.config.horizons),
        }),
        Err(e) => error_response(e),
    }
}

fn invalid_amount() -> HttpResponse {
    HttpResponse::BadRequest().json(ErrorResponse {
        error: "amount must be a number greater than zero".to_string(),
    })
}

async fn get_share(query: web::Query<AmountQuery>, state: web::Data<AppState>) -> HttpResponse {
    let amount = match query.amount.as_deref() {
        None => None,
        Some(raw) => match parse_investment(raw) {
            Some(amount) => Some(amount),
            None => return invalid_amount(),
        },
    };
    match state.report() {
        Ok(report) => {
            HttpResponse::Ok().json(ShareLinks::new(&report, &state.config.share_site, amount))
        }
        Err(e) => error_response(e),
    }
}

async fn index(query: web::Query<AmountQuery>, state: web::Data<AppState>) -> HttpResponse {
    match state.report() {
        Ok(report) => {
            let amount = query.amount.as_deref().unwrap_or("");
            let body = render_page(&report, &state.config, amount);
            HttpResponse::Ok()
                .content_type(ContentType::html())
                .body(body)
        }
        Err(e) => error_response(e),
    }
}

fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Renders the single-page display. `amount` is the raw user input.
pub fn render_page(report: &ReturnsReport, config: &RoiConfig, amount: &str) -> String {
    let tracked = &report.tracked;
    let mut benchmarks = String::new();
    for asset in &report.benchmarks {
        benchmarks.push_str(&format!(
            "<li><span>{}</span><strong>{}</strong></li>\n",
            escape_html(&asset.name),
            format_percent(asset.rate)
        ));
    }

    let investment = parse_investment(amount);
    let projections = match investment {
        Some(value) => {
            let mut rows = String::new();
            for p in report.projections(value, &config.horizons) {
                rows.push_str(&format!(
                    "<li>{} year{}: {}</li>\n",
                    p.horizon_years,
                    if p.horizon_years == 1 { "" } else { "s" },
                    format_usd(p.value)
                ));
            }
            format!("<ul class=\"projections\">\n{}</ul>", rows)
        }
        None if amount.trim().is_empty() => String::new(),
        None => "<p class=\"notice\">Enter an amount greater than zero.</p>".to_string(),
    };

    let share = ShareLinks::new(report, &config.share_site, investment);
    let investment_share = share
        .investment_text
        .as_deref()
        .map(|text| format!("<p class=\"investment-share\">{}</p>\n", escape_html(text)))
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>{name} ROI</title>
</head>
<body>
<main>
<h1>{name} annualized ROI</h1>
<p class="rate">{rate}</p>
<p>Annualized ROI since inception ({start} - {today})</p>
<h2>Benchmarks</h2>
<ul class="benchmarks">
{benchmarks}</ul>
<h2>Hypothetical investment</h2>
<form method="get" action="/">
<input type="text" name="amount" value="{amount}" placeholder="USD">
<button type="submit">Project</button>
</form>
{projections}
<details class="about">
<summary>What is {name}?</summary>
<p>{name} is the fastest, most scalable and decentralized blockchain.</p>
<p>Nerd disclaimer: {name} is a PoW, L1 BlockDAG</p>
</details>
{investment_share}<p class="share"><a href="{x_url}">Share on X</a> <a href="{whatsapp_url}">Share on WhatsApp</a> <a href="{discord_url}">Share on Discord</a></p>
</main>
</body>
</html>
"#,
        name = escape_html(&tracked.name),
        rate = format_percent(tracked.rate),
        start = display_date(tracked.initial.timestamp),
        today = display_date(report.as_of),
        benchmarks = benchmarks,
        amount = escape_html(amount),
        projections = projections,
        investment_share = investment_share,
        x_url = escape_html(&share.x_url),
        whatsapp_url = escape_html(&share.whatsapp_url),
        discord_url = escape_html(&share.discord_url),
    )
}

/// Registers every route; shared by the server and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(index))
        .route("/health", web::get().to(health))
        .route("/api/returns", web::get().to(get_returns))
        .route("/api/projections", web::get().to(get_projections))
        .route("/api/share", web::get().to(get_share));
}

pub async fn run_server(config: RoiConfig, prices: PriceSnapshot) -> std::io::Result<()> {
    let host = config.server.host.clone();
    let port = config.server.port;
    let app_state = web::Data::new(AppState::new(config, prices));

    info!("Listening on {}:{}", host, port);
    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(app_state.clone())
            .configure(configure)
    })
    .bind((host.as_str(), port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{body::to_bytes, http::StatusCode, test};

    fn state() -> web::Data<AppState> {
        let config = RoiConfig::default();
        let prices = PriceSnapshot::from_defaults(&config);
        web::Data::new(AppState::new(config, prices))
    }

    #[actix_web::test]
    async fn test_health() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/health").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body = to_bytes(resp.into_body()).await.unwrap();
        assert_eq!(body, "ok");
    }

    #[actix_web::test]
    async fn test_returns_json() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/returns").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["tracked"]["key"], "kaspa");
        assert_eq!(body["benchmarks"].as_array().unwrap().len(), 4);
        assert!(body["tracked"]["rate"].as_f64().unwrap() > 0.0);
    }

    #[actix_web::test]
    async fn test_projections_json() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/projections?amount=1000")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["amount"], 1000.0);
        let projections = body["projections"].as_array().unwrap();
        assert_eq!(projections.len(), 3);
        assert_eq!(projections[2]["horizon_years"], 5);
    }

    #[actix_web::test]
    async fn test_projections_rejects_invalid_amount() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        for uri in [
            "/api/projections",
            "/api/projections?amount=abc",
            "/api/projections?amount=0",
            "/api/projections?amount=-10",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
        }
    }

    #[actix_web::test]
    async fn test_index_page() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/?amount=500").to_request();
        let body = test::call_and_read_body(&app, req).await;
        let html = String::from_utf8(body.to_vec()).unwrap();
        assert!(html.contains("<h1>Kaspa annualized ROI</h1>"));
        assert!(html.contains("S&amp;P 500"));
        assert!(html.contains("5 years: $"));
        assert!(html.contains("https://x.com/intent/tweet?text="));
        assert!(html.contains("https://discord.com/channels/@me"));
        assert!(html.contains("If invested $500.00 today"));
        assert!(html.contains("<summary>What is Kaspa?</summary>"));
        assert!(html.contains("Nerd disclaimer: Kaspa is a PoW, L1 BlockDAG"));
    }

    #[actix_web::test]
    async fn test_share_json() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get().uri("/api/share").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["text"].as_str().unwrap().contains("Data: kaspa.page"));
        assert_eq!(body["discord_url"], "https://discord.com/channels/@me");
        assert!(body.get("investment_text").is_none());
    }

    #[actix_web::test]
    async fn test_share_json_with_amount() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        let req = test::TestRequest::get()
            .uri("/api/share?amount=1000")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        let text = body["investment_text"].as_str().unwrap();
        assert!(text.starts_with("🚀 Kaspa's Annualized ROI: "));
        assert!(text.contains("If invested $1,000.00 today"));
        assert!(text.contains("in 5 years"));
    }

    #[actix_web::test]
    async fn test_share_rejects_invalid_amount() {
        let app = test::init_service(App::new().app_data(state()).configure(configure)).await;
        for uri in ["/api/share?amount=1,0,0", "/api/share?amount=0"] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{}", uri);
        }
    }

    #[::core::prelude::v1::test]
    fn test_render_page_invalid_amount_notice() {
        let config = RoiConfig::default();
        let report =
            ReturnsReport::compute(&config, &PriceSnapshot::new(), Utc::now()).unwrap();
        let html = render_page(&report, &config, "<script>");
        assert!(html.contains("Enter an amount greater than zero."));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
    }

    #[::core::prelude::v1::test]
    fn test_render_page_no_amount() {
        let config = RoiConfig::default();
        let report =
            ReturnsReport::compute(&config, &PriceSnapshot::new(), Utc::now()).unwrap();
        let html = render_page(&report, &config, "");
        assert!(!html.contains("class=\"projections\""));
        assert!(!html.contains("class=\"notice\""));
        assert!(!html.contains("class=\"investment-share\""));
    }
}

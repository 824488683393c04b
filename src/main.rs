use actix_cors::Cors;
use actix_web::{get, post, put, web, App, HttpResponse, HttpServer};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod balance;
mod error;
mod resolve;
mod schemas;
mod settlement;
mod store;

use balance::compute_balances;
use error::Error;
use schemas::{Expense, Member};
use settlement::plan_settlement;
use store::AppState;

#[derive(Deserialize, Serialize)]
struct ProjectJson {
    name: String,
    #[serde(default)]
    members: Vec<Member>,
}

#[derive(Deserialize, Serialize)]
struct ExpenseJson {
    title: String,
    amount: f64,
    payer: String,
}

#[put("/projects/{id}")]
async fn add_project(
    state: web::Data<AppState>,
    id: web::Path<String>,
    json: web::Json<ProjectJson>,
) -> Result<HttpResponse, Error> {
    let json = json.into_inner();
    state.create_project(id.into_inner(), json.name, json.members)?;
    Ok(HttpResponse::Ok().body("Project added"))
}

#[post("/projects/{id}/members")]
async fn add_member(
    state: web::Data<AppState>,
    id: web::Path<String>,
    json: web::Json<Member>,
) -> Result<HttpResponse, Error> {
    state.add_member(&id.into_inner(), json.into_inner())?;
    Ok(HttpResponse::Ok().body("Member added"))
}

#[post("/projects/{id}/expenses")]
async fn add_expense(
    state: web::Data<AppState>,
    id: web::Path<String>,
    json: web::Json<ExpenseJson>,
) -> Result<HttpResponse, Error> {
    let json = json.into_inner();
    let expense = Expense {
        title: json.title,
        amount: json.amount,
        payer: json.payer,
        created_at: Utc::now(),
    };
    state.add_expense(&id.into_inner(), expense)?;
    Ok(HttpResponse::Ok().body("Expense added"))
}

#[get("/projects/{id}/expenses")]
async fn list_expenses(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let expenses = state.expenses_recent_first(&id.into_inner())?;
    Ok(HttpResponse::Ok().json(expenses))
}

#[get("/projects/{id}/balance")]
async fn get_balance(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let (project, profiles) = state.snapshot(&id.into_inner())?;
    let balances = compute_balances(&project.members, &project.expenses, &profiles);
    Ok(HttpResponse::Ok().json(balances))
}

#[get("/projects/{id}/settlement")]
async fn get_settlement(
    state: web::Data<AppState>,
    id: web::Path<String>,
) -> Result<HttpResponse, Error> {
    let (project, profiles) = state.snapshot(&id.into_inner())?;
    let balances = compute_balances(&project.members, &project.expenses, &profiles);
    let transfers = plan_settlement(&balances)?;
    Ok(HttpResponse::Ok().json(transfers))
}

fn routes(cfg: &mut web::ServiceConfig) {
    cfg.service(add_project)
        .service(add_member)
        .service(add_expense)
        .service(list_expenses)
        .service(get_balance)
        .service(get_settlement);
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let bind = std::env::var("EVENUP_BIND").unwrap_or_else(|_| "0.0.0.0:8080".to_string());
    let state = web::Data::new(AppState::default());
    info!(%bind, "starting evenup backend");

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .app_data(state.clone())
            .configure(routes)
    })
    .bind(bind)?
    .run()
    .await
}

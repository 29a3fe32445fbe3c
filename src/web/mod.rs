//! HTTP surface: thin actix-web routing over the catalog aggregators.
//!
//! Handlers move blocking SQLite work off the executor with
//! `spawn_blocking`; each blocking closure opens one connection and drops it
//! when the closure returns, on success and failure alike.

use actix_web::web::{Data, Query};
use actix_web::{App, HttpResponse, HttpServer, Responder, get};
use serde::Deserialize;
use tokio::task;
use tracing::{error, info};

use crate::catalog::{DomainData, Endpoint, LookupLists, OrgData};
use crate::db::Database;
use crate::error::CatalogError;

/// Per-process state injected into every handler: the database handle and
/// the lookup snapshots loaded at startup.
pub struct AppState {
    pub db: Database,
    pub lookups: LookupLists,
}

#[derive(Deserialize)]
struct DomainQuery {
    domain: String,
}

#[derive(Deserialize)]
struct OrgQuery {
    org: String,
}

#[derive(Deserialize)]
struct EndpointQuery {
    ip: String,
}

#[get("/getDomainList")]
async fn get_domain_list(state: Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(&state.lookups.domains)
}

#[get("/getOrgList")]
async fn get_org_list(state: Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(&state.lookups.organizations)
}

#[get("/getIPList")]
async fn get_ip_list(state: Data<AppState>) -> impl Responder {
    HttpResponse::Ok().json(&state.lookups.ips)
}

#[get("/getEndpointData")]
async fn get_endpoint_data(state: Data<AppState>, query: Query<EndpointQuery>) -> impl Responder {
    let db = state.db.clone();
    let ip = query.into_inner().ip;

    let result = task::spawn_blocking(move || {
        let conn = db.connect()?;
        Endpoint::resolve(&conn, &ip)
    })
    .await;

    respond(result)
}

#[get("/getDomainData")]
async fn get_domain_data(state: Data<AppState>, query: Query<DomainQuery>) -> impl Responder {
    let db = state.db.clone();
    let domain = query.into_inner().domain;

    let result = task::spawn_blocking(move || {
        let conn = db.connect()?;
        DomainData::resolve(&conn, &domain)
    })
    .await;

    respond(result)
}

#[get("/getOrgData")]
async fn get_org_data(state: Data<AppState>, query: Query<OrgQuery>) -> impl Responder {
    let db = state.db.clone();
    let org = query.into_inner().org;

    let result = task::spawn_blocking(move || {
        let conn = db.connect()?;
        OrgData::resolve(&conn, &org)
    })
    .await;

    respond(result)
}

/// Map an aggregator outcome onto the wire. Aggregation either fully
/// succeeds or the request fails; there are no partial responses.
fn respond<T: serde::Serialize>(
    result: Result<Result<T, CatalogError>, task::JoinError>,
) -> HttpResponse {
    match result {
        Ok(Ok(value)) => HttpResponse::Ok().json(value),
        Ok(Err(err @ CatalogError::EndpointNotFound(_))) => {
            HttpResponse::NotFound().json(serde_json::json!({
                "error": err.to_string()
            }))
        }
        Ok(Err(CatalogError::Database(e))) => {
            error!("database error while handling request: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "database error"
            }))
        }
        Err(e) => {
            error!("blocking task failed: {}", e);
            HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal error"
            }))
        }
    }
}

/// Bind and run the HTTP server until shutdown.
pub async fn serve(state: AppState, host: &str, port: u16) -> std::io::Result<()> {
    let state = Data::new(state);
    info!("listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .service(get_domain_list)
            .service(get_org_list)
            .service(get_ip_list)
            .service(get_domain_data)
            .service(get_org_data)
            .service(get_endpoint_data)
    })
    .bind((host, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;
    use rusqlite::Connection;

    use crate::db::testing::{create_schema, seed_acme};

    /// File-backed fixture database; handlers reopen it by path, so an
    /// in-memory connection would not be visible to them.
    fn test_state() -> (tempfile::NamedTempFile, Data<AppState>) {
        let file = tempfile::NamedTempFile::new().expect("temp db");
        let path = file.path().to_string_lossy().into_owned();

        let conn = Connection::open(&path).expect("open temp db");
        create_schema(&conn);
        seed_acme(&conn);

        let lookups = LookupLists::load(&conn).expect("load lookups");
        drop(conn);

        let state = AppState {
            db: Database::new(&path),
            lookups,
        };
        (file, Data::new(state))
    }

    #[actix_web::test]
    async fn endpoint_data_returns_the_full_nested_shape() {
        let (_file, state) = test_state();
        let app = test::init_service(App::new().app_data(state).service(get_endpoint_data)).await;

        let req = test::TestRequest::get()
            .uri("/getEndpointData?ip=1.2.3.4")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["IP"], "1.2.3.4");
        assert_eq!(body["org"], "Acme");
        assert_eq!(body["domain"], "acme.com");
        assert_eq!(body["location"]["city"], "NYC");
        assert_eq!(body["location"]["latitute"], 40.7128);
        assert_eq!(body["location"]["longtitude"], -74.006);
        assert_eq!(body["openPorts"][0]["serviceName"], "http");
        assert_eq!(body["openPorts"][1]["serviceName"], "https");
    }

    #[actix_web::test]
    async fn unknown_ip_is_a_404_with_a_json_error() {
        let (_file, state) = test_state();
        let app = test::init_service(App::new().app_data(state).service(get_endpoint_data)).await;

        let req = test::TestRequest::get()
            .uri("/getEndpointData?ip=10.0.0.1")
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::NOT_FOUND);
        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(
            body["error"],
            CatalogError::EndpointNotFound("10.0.0.1".to_string()).to_string()
        );
    }

    #[actix_web::test]
    async fn missing_query_parameter_is_a_400() {
        let (_file, state) = test_state();
        let app = test::init_service(App::new().app_data(state).service(get_endpoint_data)).await;

        let req = test::TestRequest::get().uri("/getEndpointData").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn domain_data_with_no_endpoints_is_an_empty_list() {
        let (_file, state) = test_state();
        let app = test::init_service(App::new().app_data(state).service(get_domain_data)).await;

        let req = test::TestRequest::get()
            .uri("/getDomainData?domain=nowhere.example")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: serde_json::Value = test::read_body_json(resp).await;
        assert_eq!(body["name"], "nowhere.example");
        assert_eq!(body["endpoints"], serde_json::json!([]));
    }

    #[actix_web::test]
    async fn org_data_lists_owned_endpoints() {
        let (_file, state) = test_state();
        let app = test::init_service(App::new().app_data(state).service(get_org_data)).await;

        let req = test::TestRequest::get()
            .uri("/getOrgData?org=Acme")
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;

        assert_eq!(body["name"], "Acme");
        assert_eq!(body["endpoints"][0]["IP"], "1.2.3.4");
    }

    #[actix_web::test]
    async fn lookup_lists_serve_the_startup_snapshot() {
        let (_file, state) = test_state();
        let app = test::init_service(
            App::new()
                .app_data(state)
                .service(get_domain_list)
                .service(get_org_list)
                .service(get_ip_list),
        )
        .await;

        let req = test::TestRequest::get().uri("/getDomainList").to_request();
        let domains: Vec<String> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(domains, vec!["acme.com"]);

        let req = test::TestRequest::get().uri("/getOrgList").to_request();
        let orgs: Vec<String> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(orgs, vec!["Acme"]);

        let req = test::TestRequest::get().uri("/getIPList").to_request();
        let ips: Vec<String> = test::call_and_read_body_json(&app, req).await;
        assert_eq!(ips, vec!["1.2.3.4"]);
    }
}

use actix_cors::Cors;
use actix_web::{error, get, middleware::Logger, web, App, HttpResponse, HttpServer, Responder};
use serde::Deserialize;
use serde_json::json;

use crate::traffic::{TimeFilter, TrafficMap};

#[derive(Deserialize)]
struct CursorQuery {
    minute: Option<i32>,
}

impl CursorQuery {
    // An absent minute means the slider is parked on "no filter".
    fn filter(&self) -> actix_web::Result<TimeFilter> {
        TimeFilter::from_cursor(self.minute.unwrap_or(-1)).map_err(error::ErrorBadRequest)
    }
}

#[get("/ok")]
async fn ok() -> impl Responder {
    HttpResponse::Ok().finish()
}

#[get("/stations")]
async fn get_stations(
    query: web::Query<CursorQuery>,
    map: web::Data<TrafficMap>,
) -> actix_web::Result<impl Responder> {
    let filter = query.filter()?;
    let body = map.geojson(filter).map_err(error::ErrorInternalServerError)?;

    Ok(HttpResponse::Ok()
        .content_type("application/geo+json")
        .body(body))
}

#[get("/label")]
async fn get_label(query: web::Query<CursorQuery>) -> actix_web::Result<impl Responder> {
    let filter = query.filter()?;

    let response = web::Json(json!({
        "minute": filter.cursor(),
        "label": filter.label(),
    }));
    Ok(response)
}

pub async fn run(map: TrafficMap, listen_address: &str) -> std::io::Result<()> {
    let map = web::Data::new(map);

    log::info!("Starting server at {}", listen_address);

    HttpServer::new(move || {
        // The map page is served from another origin; markers are read-only.
        let cors = Cors::default()
            .allow_any_origin()
            .allowed_methods(vec!["GET"])
            .allowed_headers(vec!["accept"]);

        App::new()
            .wrap(Logger::default())
            .wrap(cors)
            .app_data(map.clone())
            .service(ok)
            .service(get_stations)
            .service(get_label)
    })
    .bind(listen_address)?
    .run()
    .await
}

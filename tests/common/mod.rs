#![allow(dead_code)]

use std::sync::Mutex;

use actix_web::{dev::ServerHandle, web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::{json, Value};
use url::Url;

use travelmore_booking::config::ClientConfig;
use travelmore_booking::services::notifier::Notifier;

pub const TOKEN: &str = "test-token";

/// A request the mock backend received.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub authorization: Option<String>,
    pub body: Value,
}

type Log = web::Data<Mutex<Vec<Recorded>>>;

fn record(log: &Log, req: &HttpRequest, body: Value) {
    let authorization = req
        .headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    log.lock().unwrap().push(Recorded {
        method: req.method().to_string(),
        path: req.path().to_string(),
        authorization,
        body,
    });
}

fn authorized(req: &HttpRequest) -> bool {
    req.headers()
        .get("Authorization")
        .and_then(|value| value.to_str().ok())
        == Some(&format!("Bearer {}", TOKEN)[..])
}

async fn check_price(req: HttpRequest, log: Log, body: web::Json<Value>) -> HttpResponse {
    record(&log, &req, body.0.clone());
    match body["discount_code"].as_str() {
        Some("HEMAT") => HttpResponse::Ok().json(json!({
            "discount_amount": "50000.00",
            "total_amount": "350000.00",
            "message": "Discount applied"
        })),
        Some("ZERO") => HttpResponse::Ok().json(json!({
            "discount_amount": 0,
            "total_amount": 400000
        })),
        _ => HttpResponse::NotFound().json(json!({ "message": "Discount code not found." })),
    }
}

async fn book(req: HttpRequest, log: Log, path: web::Path<(String, u64)>, body: web::Json<Value>) -> HttpResponse {
    record(&log, &req, body.0.clone());
    let (service, _id) = path.into_inner();
    match service.as_str() {
        "car-rentals" => HttpResponse::UnprocessableEntity().json(json!({
            "message": "The given data was invalid.",
            "errors": { "start_date": ["The start date must be a date after today."] }
        })),
        "packages" => HttpResponse::Ok().json(json!({ "id": 43 })),
        _ => HttpResponse::Created().json(json!({ "message": "Booking created", "order": { "id": 41 } })),
    }
}

async fn my_orders(req: HttpRequest, log: Log) -> HttpResponse {
    record(&log, &req, Value::Null);
    HttpResponse::Ok().json(json!([
        {
            "id": 1,
            "order_number": "TM-0001",
            "status": "pending",
            "payment_status": "unpaid",
            "subtotal": "400000.00",
            "total_amount": "350000.00",
            "discount_amount": "50000.00",
            "created_at": "2026-10-01T08:00:00.000000Z",
            "payment_deadline": "2099-01-01 00:00:00",
            "order_items": []
        }
    ]))
}

async fn my_bookings(req: HttpRequest, log: Log) -> HttpResponse {
    record(&log, &req, Value::Null);
    HttpResponse::Ok().json(json!([
        {
            "id": 3,
            "bookable_type": "App\\Models\\OpenTrip",
            "start_date": "2026-11-10",
            "status": "confirmed",
            "payment_status": "paid",
            "details": { "adults": 2, "children": 1, "service_name": "Komodo Sailing" }
        }
    ]))
}

async fn my_profile(req: HttpRequest, log: Log) -> HttpResponse {
    record(&log, &req, Value::Null);
    if !authorized(&req) {
        return HttpResponse::Unauthorized().json(json!({ "message": "Unauthenticated." }));
    }
    HttpResponse::Ok().json(json!({
        "id": 9,
        "name": "budi",
        "email": "budi@example.com",
        "full_name": "Budi Santoso",
        "phone_number": "+6281234567890",
        "nationality": "WNI"
    }))
}

async fn update_profile(req: HttpRequest, log: Log, body: web::Json<Value>) -> HttpResponse {
    record(&log, &req, body.0.clone());
    HttpResponse::Ok().json(body.0)
}

async fn public_availability(req: HttpRequest, log: Log, path: web::Path<u64>) -> HttpResponse {
    record(&log, &req, Value::Null);
    if path.into_inner() == 1 {
        return HttpResponse::InternalServerError().json(json!({ "message": "Server Error" }));
    }
    HttpResponse::Ok().json(json!({ "2026-11-04": "booked", "2026-11-05": "available" }))
}

async fn availability(req: HttpRequest, log: Log) -> HttpResponse {
    record(&log, &req, Value::Null);
    HttpResponse::Ok().json(json!({ "2026-11-09": "maintenance" }))
}

/// Stand-in for the booking backend, served on an ephemeral local port.
pub struct MockBackend {
    pub base_url: Url,
    log: Log,
    handle: ServerHandle,
}

impl MockBackend {
    pub async fn start() -> Self {
        let log: Log = web::Data::new(Mutex::new(Vec::new()));
        let app_log = log.clone();

        let server = HttpServer::new(move || {
            App::new().app_data(app_log.clone()).service(
                web::scope("/api")
                    .route("/booking/check-price", web::post().to(check_price))
                    .route("/{service}/{id}/book", web::post().to(book))
                    .route("/my-orders", web::get().to(my_orders))
                    .route("/my-bookings", web::get().to(my_bookings))
                    .route("/my-profile", web::get().to(my_profile))
                    .route("/my-profile", web::put().to(update_profile))
                    .route("/public/car-rentals/{id}/availability", web::get().to(public_availability))
                    .route("/car-rentals/{id}/availability", web::get().to(availability)),
            )
        })
        .workers(1)
        .bind(("127.0.0.1", 0))
        .expect("bind mock backend");

        let addr = server.addrs()[0];
        let server = server.run();
        let handle = server.handle();
        actix_rt::spawn(server);

        let base_url = Url::parse(&format!("http://{}/api/", addr)).expect("mock url");
        MockBackend { base_url, log, handle }
    }

    pub fn config(&self) -> ClientConfig {
        ClientConfig::new(self.base_url.clone()).with_token(TOKEN)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.log.lock().unwrap().clone()
    }

    pub fn requests_to(&self, path: &str) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.path == path).collect()
    }

    pub async fn stop(self) {
        self.handle.stop(false).await;
    }
}

#[derive(Default)]
pub struct RecordingNotifier {
    pub messages: Mutex<Vec<String>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<String> {
        self.messages.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn success(&self, message: &str) {
        self.messages.lock().unwrap().push(format!("success: {}", message));
    }

    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push(format!("error: {}", message));
    }

    fn navigate(&self, path: &str) {
        self.messages.lock().unwrap().push(format!("navigate: {}", path));
    }
}

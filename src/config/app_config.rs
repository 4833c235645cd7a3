use dotenv::dotenv;
use log::error;
use std::env;

pub struct AppConfig {
    pub db_url: String,
    pub db_name: String,
    pub jwt_secret: String,
    pub is_dev: bool,
    pub client_origin: String,
    pub server_addr: String,
    pub session_days: i64,
    pub bcrypt_cost: u32,
    pub admin_username: Option<String>,
    pub admin_password: Option<String>,
}

impl AppConfig {
    pub fn init() -> Self {
        dotenv().ok();
        let is_dev = env::var("IS_DEV").map(|v| v == "true").unwrap_or_else(|_| {
            error!("is_dev var not found!");
            false
        });
        let prefix = if is_dev { "DEV" } else { "PROD" };
        let db_url = env::var(format!("{}_DB_URL", prefix)).unwrap_or_else(|_| {
            error!("{}_DB_URL var not found, using the in-memory store!", prefix);
            String::from("memory:")
        });
        let client_origin = env::var(format!("{}_CLIENT_ORIGIN", prefix)).unwrap_or_else(|_| {
            error!("{}_CLIENT_ORIGIN var not found!", prefix);
            String::from("http://localhost:3000")
        });
        let server_addr = env::var(format!("{}_SERVER_ADDR", prefix)).unwrap_or_else(|_| {
            error!("{}_SERVER_ADDR var not found!", prefix);
            String::from("localhost:5000")
        });
        let db_name = env::var("DB_NAME").unwrap_or_else(|_| String::from("polls"));
        let jwt_secret = env::var("JWT_SECRET").unwrap_or_else(|_| {
            error!("jwt_secret var not set!");
            String::from("Garden")
        });
        let session_days = env::var("SESSION_DAYS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(14);
        let bcrypt_cost = env::var("BCRYPT_COST")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(bcrypt::DEFAULT_COST);
        let admin_username = env::var("ADMIN_USERNAME").ok().filter(|v| !v.is_empty());
        let admin_password = env::var("ADMIN_PASSWORD").ok().filter(|v| !v.is_empty());
        Self {
            db_url,
            db_name,
            is_dev,
            jwt_secret,
            client_origin,
            server_addr,
            session_days,
            bcrypt_cost,
            admin_username,
            admin_password,
        }
    }

    pub fn uses_memory_store(&self) -> bool {
        self.db_url.starts_with("memory:")
    }
}

use actix_cors::Cors;
use actix_web::{
    middleware::{from_fn, Logger},
    web::Data,
    App, HttpServer,
};
use log::{error, info};

use polls_backend::{
    config::app_config::AppConfig,
    init_store,
    middlewares::authenticate::identify_user,
    routes,
    utils::{clock::Clock, jwt::JWT},
};

#[actix_web::main]
async fn main() -> Result<(), std::io::Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app_config = AppConfig::init();
    let store = init_store(&app_config).await.map_err(|e| {
        error!("Failed initializing the store: {}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;
    let jwt = Data::new(JWT::init(&app_config.jwt_secret, app_config.session_days));
    let clock = Data::new(Clock::System);
    let server_addr = app_config.server_addr.clone();
    let client_origin = app_config.client_origin.clone();
    let app_config = Data::new(app_config);

    info!("Listening on {}", server_addr);
    HttpServer::new(move || {
        let cors = Cors::default()
            .allowed_origin(&client_origin)
            .allow_any_method()
            .allow_any_header()
            .supports_credentials();
        App::new()
            .app_data(store.clone())
            .app_data(jwt.clone())
            .app_data(clock.clone())
            .app_data(app_config.clone())
            .wrap(from_fn(identify_user))
            .wrap(cors)
            .wrap(Logger::default())
            .configure(routes::init)
    })
    .bind(server_addr)?
    .run()
    .await
}

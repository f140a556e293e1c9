use std::{net::IpAddr, sync::Arc};

use axum::Router;
use quickpack_core_contact_contracts::ContactService;
use quickpack_core_order_contracts::OrderService;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::info;

mod extractors;
mod middlewares;
mod models;
mod routes;

#[derive(Debug, Clone)]
pub struct RestServer<Contact, Order> {
    pub contact: Contact,
    pub order: Order,
    pub config: RestServerConfig,
}

#[derive(Debug, Clone, Copy)]
pub struct RestServerConfig {
    /// Include the details of unexpected errors in responses.
    pub expose_errors: bool,
}

impl<Contact, Order> RestServer<Contact, Order>
where
    Contact: ContactService,
    Order: OrderService,
{
    pub async fn serve(self, host: IpAddr, port: u16) -> anyhow::Result<()> {
        let router = self.router();
        let listener = TcpListener::bind((host, port)).await?;
        info!("Listening on {}", listener.local_addr()?);
        axum::serve(listener, router).await.map_err(Into::into)
    }

    pub fn router(self) -> Router<()> {
        let api = Router::new()
            .merge(routes::index::api_router())
            .merge(routes::health::router())
            .merge(routes::contact::router(Arc::new(self.contact)))
            .merge(routes::order::router(Arc::new(self.order)));

        let router = Router::new()
            .merge(routes::index::router())
            .nest("/api", api)
            .fallback(routes::not_found);

        let router = middlewares::panic_handler::add(self.config.expose_errors)(router)
            .layer(CorsLayer::permissive());
        let router = middlewares::trace::add(router);
        middlewares::request_id::add(router)
    }
}

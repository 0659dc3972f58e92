use crate::models::{ItemsBody, ServiceSummary, SERVICES};
use axum::Json;

pub async fn list_services() -> Json<ItemsBody<ServiceSummary>> {
    let items = SERVICES
        .iter()
        .map(|service| ServiceSummary {
            id: service.id.to_string(),
            label: service.label.to_string(),
            price_usdc: service.price_usdc,
            partner_id: service.partner_id.to_string(),
        })
        .collect();
    Json(ItemsBody { items })
}

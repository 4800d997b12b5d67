use actix_web::{web, HttpResponse};

use crate::error::AppError;
use crate::query::{OrderQueryService, Strategy};
use super::QUERY_COUNT_HEADER;

pub(super) async fn list_simple_orders(
    version: web::Path<String>,
    service: web::Data<OrderQueryService>,
) -> Result<HttpResponse, AppError> {
    let strategy: Strategy = version.parse()?;
    let listing = service.list_simple_orders(strategy).await?;

    Ok(HttpResponse::Ok()
        .insert_header((QUERY_COUNT_HEADER, listing.queries.total().to_string()))
        .json(listing.rows))
}

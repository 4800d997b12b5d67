use actix_web::{web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::order::{OrderCommand, OrderCommandHandler, OrderLine, OrderStatus};
use crate::error::AppError;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderRequest {
    pub member_id: i64,
    pub items: Vec<OrderLine>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceOrderResponse {
    pub order_id: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelOrderResponse {
    pub order_id: i64,
    pub status: OrderStatus,
}

pub(super) async fn place_order(
    body: web::Json<PlaceOrderRequest>,
    handler: web::Data<OrderCommandHandler>,
) -> Result<HttpResponse, AppError> {
    let request = body.into_inner();
    let order_id = handler
        .handle(OrderCommand::PlaceOrder {
            member_id: request.member_id,
            lines: request.items,
        })
        .await?;

    Ok(HttpResponse::Created().json(PlaceOrderResponse { order_id }))
}

pub(super) async fn cancel_order(
    path: web::Path<i64>,
    handler: web::Data<OrderCommandHandler>,
) -> Result<HttpResponse, AppError> {
    let order_id = handler
        .handle(OrderCommand::CancelOrder { order_id: path.into_inner() })
        .await?;

    Ok(HttpResponse::Ok().json(CancelOrderResponse {
        order_id,
        status: OrderStatus::Cancelled,
    }))
}

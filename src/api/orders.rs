use actix_web::{web, HttpResponse};
use serde::Deserialize;

use crate::domain::order::OrderStatus;
use crate::error::AppError;
use crate::persistence::OrderSearch;
use crate::query::{ListRequest, OrderQueryService, Strategy};
use super::QUERY_COUNT_HEADER;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub offset: Option<i64>,
    pub limit: Option<i64>,
    pub member_name: Option<String>,
    pub order_status: Option<OrderStatus>,
}

impl From<ListParams> for ListRequest {
    fn from(params: ListParams) -> Self {
        ListRequest {
            offset: params.offset,
            limit: params.limit,
            search: OrderSearch {
                member_name: params.member_name,
                order_status: params.order_status,
            },
        }
    }
}

pub(super) async fn list_orders(
    version: web::Path<String>,
    params: web::Query<ListParams>,
    service: web::Data<OrderQueryService>,
) -> Result<HttpResponse, AppError> {
    let strategy: Strategy = version.parse()?;
    let listing = service.list_orders(strategy, params.into_inner().into()).await?;

    Ok(HttpResponse::Ok()
        .insert_header((QUERY_COUNT_HEADER, listing.queries.total().to_string()))
        .json(listing.rows))
}

#[cfg(test)]
mod tests {
    use actix_web::{test, App};
    use serde_json::Value;

    use super::super::{configure, test_support};
    use super::*;

    macro_rules! app {
        () => {{
            let (queries, commands, _db) = test_support::app_data().await;
            test::init_service(App::new().app_data(queries).app_data(commands).configure(configure)).await
        }};
    }

    #[actix_web::test]
    async fn test_every_version_serves_the_same_orders() {
        let app = app!();

        let mut shapes = Vec::new();
        for version in ["v1", "v2", "v3", "v3.1", "v4"] {
            let req = test::TestRequest::get().uri(&format!("/api/{}/orders", version)).to_request();
            let json: Value = test::call_and_read_body_json(&app, req).await;
            let orders = json.as_array().unwrap().clone();
            assert_eq!(orders.len(), 2, "{}", version);

            let items: Vec<usize> = orders
                .iter()
                .map(|o| o["orderItems"].as_array().unwrap().len())
                .collect();
            shapes.push((version, orders[0]["orderStatus"].clone(), items));
        }

        for (version, _, items) in &shapes {
            assert_eq!(items, &vec![2, 2], "{}", version);
        }
        // v1 answers with entities, the rest with DTOs
        assert_eq!(shapes[0].1, Value::Null);
        assert!(shapes[1..].iter().all(|(_, status, _)| status == "ORDERED"));
    }

    #[actix_web::test]
    async fn test_dto_wire_shape() {
        let app = app!();

        let req = test::TestRequest::get().uri("/api/v4/orders").to_request();
        let json: Value = test::call_and_read_body_json(&app, req).await;
        let first = &json[0];

        assert_eq!(first["name"], "userA");
        assert_eq!(first["address"]["city"], "Seoul");
        assert_eq!(first["orderItems"][0]["itemName"], "JPA1 BOOK");
        assert_eq!(first["orderItems"][0]["orderPrice"], 10000);
        assert_eq!(first["orderItems"][1]["count"], 2);
    }

    #[actix_web::test]
    async fn test_query_count_header() {
        let app = app!();

        for (version, expected) in [("v1", "7"), ("v3", "1"), ("v3.1", "2"), ("v4", "2")] {
            let req = test::TestRequest::get().uri(&format!("/api/{}/orders", version)).to_request();
            let resp = test::call_service(&app, req).await;
            assert!(resp.status().is_success());
            assert_eq!(resp.headers().get(QUERY_COUNT_HEADER).unwrap(), expected, "{}", version);
        }
    }

    #[actix_web::test]
    async fn test_pagination_params() {
        let app = app!();

        let req = test::TestRequest::get().uri("/api/v3.1/orders?offset=1&limit=1").to_request();
        let json: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["name"], "userB");

        for uri in [
            "/api/v3/orders?limit=1",
            "/api/v1/orders?offset=0",
            "/api/v4/orders?offset=-1",
            "/api/v3.1/orders?limit=0",
            "/api/v4/orders?limit=1001",
            "/api/v4/orders?limit=abc",
        ] {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status().as_u16(), 400, "{}", uri);
        }
    }

    #[actix_web::test]
    async fn test_search_params() {
        let app = app!();

        let req = test::TestRequest::get().uri("/api/v2/orders?memberName=userB").to_request();
        let json: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(json.as_array().unwrap().len(), 1);
        assert_eq!(json[0]["name"], "userB");

        let req = test::TestRequest::get().uri("/api/v2/orders?orderStatus=CANCELLED").to_request();
        let json: Value = test::call_and_read_body_json(&app, req).await;
        assert!(json.as_array().unwrap().is_empty());
    }

    #[actix_web::test]
    async fn test_unknown_version_is_not_found() {
        let app = app!();

        let req = test::TestRequest::get().uri("/api/v9/orders").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status().as_u16(), 404);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["error"], "Unknown query version: v9");
    }
}

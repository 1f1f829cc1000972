//! Deal API handlers.
//!
//! ```text
//! GET    /api/deals            optional bearer; owners see their own deals
//! GET    /api/deals/my-deals   bearer; deals created by the caller
//! GET    /api/deals/{id}       public
//! POST   /api/deals            owner; multipart or JSON
//! PUT    /api/deals/{id}       owner of the deal; multipart or JSON, partial
//! DELETE /api/deals/{id}       owner of the deal
//! ```

use actix_web::{HttpRequest, HttpResponse, delete, get, post, put, web};

use crate::domain::ports::{CreateDealRequest, DeleteDealRequest, UpdateDealRequest};
use crate::domain::{DealId, Error};
use crate::inbound::http::ApiResult;
use crate::inbound::http::auth::{AuthenticatedAccount, OptionalAccount, OwnerAccount};
use crate::inbound::http::deal_form::{DealJsonBody, parse_deal_form};
use crate::inbound::http::deals_dto::{DealEnvelope, DealResponse};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::users::MessageResponse;

fn parse_deal_id(raw: &str) -> Result<DealId, Error> {
    DealId::new(raw).map_err(|_| Error::not_found("Deal not found"))
}

fn to_responses(deals: Vec<crate::domain::Deal>) -> Vec<DealResponse> {
    deals.into_iter().map(DealResponse::from).collect()
}

/// Browse deals.
///
/// Owners get their own deals; anonymous callers and other roles get the
/// whole catalogue.
#[utoipa::path(
    get,
    path = "/api/deals",
    responses(
        (status = 200, description = "Deals, oldest first", body = [DealResponse]),
        (status = 503, description = "Storage unavailable", body = Error)
    ),
    tags = ["deals"],
    operation_id = "listDeals",
    security((), ("BearerToken" = []))
)]
#[get("")]
pub async fn list_deals(
    state: web::Data<HttpState>,
    viewer: OptionalAccount,
) -> ApiResult<web::Json<Vec<DealResponse>>> {
    let deals = state.deal_query.list(viewer.into_inner()).await?;
    Ok(web::Json(to_responses(deals)))
}

/// Deals created by the caller, whatever its role.
#[utoipa::path(
    get,
    path = "/api/deals/my-deals",
    responses(
        (status = 200, description = "Caller's deals", body = [DealResponse]),
        (status = 401, description = "Missing or invalid token", body = Error)
    ),
    tags = ["deals"],
    operation_id = "listMyDeals"
)]
#[get("/my-deals")]
pub async fn my_deals(
    state: web::Data<HttpState>,
    caller: AuthenticatedAccount,
) -> ApiResult<web::Json<Vec<DealResponse>>> {
    let deals = state.deal_query.list_mine(caller.into_inner()).await?;
    Ok(web::Json(to_responses(deals)))
}

/// One deal by id.
#[utoipa::path(
    get,
    path = "/api/deals/{id}",
    params(("id" = String, Path, description = "Deal identifier")),
    responses(
        (status = 200, description = "Deal", body = DealResponse),
        (status = 404, description = "Unknown deal", body = Error)
    ),
    tags = ["deals"],
    operation_id = "getDeal",
    security([])
)]
#[get("/{id}")]
pub async fn get_deal(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<web::Json<DealResponse>> {
    let deal_id = parse_deal_id(&path)?;
    let deal = state.deal_query.get(deal_id).await?;
    Ok(web::Json(deal.into()))
}

/// Publish a deal, optionally with an image.
#[utoipa::path(
    post,
    path = "/api/deals",
    request_body(
        content = DealJsonBody,
        description = "Multipart form (file under `image`) or JSON",
        content_type = "multipart/form-data"
    ),
    responses(
        (status = 201, description = "Deal created", body = DealEnvelope),
        (status = 400, description = "Validation failed or image rejected", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Caller is not an owner", body = Error)
    ),
    tags = ["deals"],
    operation_id = "createDeal"
)]
#[post("")]
pub async fn create_deal(
    state: web::Data<HttpState>,
    caller: OwnerAccount,
    req: HttpRequest,
    payload: web::Payload,
) -> ApiResult<HttpResponse> {
    let form = parse_deal_form(&req, payload).await?;
    let deal = state
        .deals
        .create(CreateDealRequest {
            actor: caller.into_inner(),
            draft: form.draft,
            image: form.image,
        })
        .await?;
    Ok(HttpResponse::Created().json(DealEnvelope::new("Deal created successfully", deal)))
}

/// Change some fields of a deal the caller owns.
#[utoipa::path(
    put,
    path = "/api/deals/{id}",
    params(("id" = String, Path, description = "Deal identifier")),
    request_body(
        content = DealJsonBody,
        description = "Partial JSON object or multipart form (file under `image`)"
    ),
    responses(
        (status = 200, description = "Deal updated", body = DealEnvelope),
        (status = 400, description = "Validation failed or image rejected", body = Error),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Not an owner, or not this deal's owner", body = Error),
        (status = 404, description = "Unknown deal", body = Error)
    ),
    tags = ["deals"],
    operation_id = "updateDeal"
)]
#[put("/{id}")]
pub async fn update_deal(
    state: web::Data<HttpState>,
    caller: OwnerAccount,
    path: web::Path<String>,
    req: HttpRequest,
    payload: web::Payload,
) -> ApiResult<web::Json<DealEnvelope>> {
    let deal_id = parse_deal_id(&path)?;
    let form = parse_deal_form(&req, payload).await?;
    let deal = state
        .deals
        .update(UpdateDealRequest {
            actor: caller.into_inner(),
            deal_id,
            draft: form.draft,
            image: form.image,
        })
        .await?;
    Ok(web::Json(DealEnvelope::new("Deal updated successfully", deal)))
}

/// Delete a deal the caller owns, together with its image.
#[utoipa::path(
    delete,
    path = "/api/deals/{id}",
    params(("id" = String, Path, description = "Deal identifier")),
    responses(
        (status = 200, description = "Deal deleted", body = MessageResponse),
        (status = 401, description = "Missing or invalid token", body = Error),
        (status = 403, description = "Not an owner, or not this deal's owner", body = Error),
        (status = 404, description = "Unknown deal", body = Error)
    ),
    tags = ["deals"],
    operation_id = "deleteDeal"
)]
#[delete("/{id}")]
pub async fn delete_deal(
    state: web::Data<HttpState>,
    caller: OwnerAccount,
    path: web::Path<String>,
) -> ApiResult<web::Json<MessageResponse>> {
    let deal_id = parse_deal_id(&path)?;
    state
        .deals
        .delete(DeleteDealRequest {
            actor: caller.into_inner(),
            deal_id,
        })
        .await?;
    Ok(web::Json(MessageResponse::new("Deal deleted successfully")))
}

/// Register deal routes on a scope mounted at `/api/deals`.
///
/// `my-deals` is registered ahead of `{id}` so it is not captured as an id.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(list_deals)
        .service(my_deals)
        .service(get_deal)
        .service(create_deal)
        .service(update_deal)
        .service(delete_deal);
}

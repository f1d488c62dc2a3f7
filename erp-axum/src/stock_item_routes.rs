//! REST API endpoints for stock items.

use crate::{
    ApiApplication,
    auth::{CompanyPath, CurrentUser, company_access},
    response::{ApiError, ApiResult, Envelope, created, internal, ok},
};
use aide::axum::{ApiRouter, routing::get};
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use erp_core::{
    models::{CompanyId, MenuSection, StockItem, StockItemData, StockItemId},
    ports::StockItemRepository as _,
};

/// Path parameters for item-specific endpoints.
#[derive(serde::Deserialize, schemars::JsonSchema)]
#[schemars(inline)]
struct Id {
    /// The unique identifier of the company
    company_id: CompanyId,
    /// The unique identifier of the stock item
    item_id: StockItemId,
}

/// Creates a router with stock-item-related endpoints.
pub fn router<T: ApiApplication>() -> ApiRouter<T> {
    ApiRouter::new()
        .api_route_with(
            "/",
            get(list_stock_items::<T>).post(create_stock_item::<T>),
            |route| route.security_requirement("jwt").tag("stock-items"),
        )
        .api_route_with(
            "/{item_id}",
            get(read_stock_item::<T>)
                .put(update_stock_item::<T>)
                .delete(delete_stock_item::<T>),
            |route| route.security_requirement("jwt").tag("stock-items"),
        )
}

async fn list_stock_items<T: ApiApplication>(
    State(app): State<T>,
    CurrentUser(user): CurrentUser,
    Path(CompanyPath { company_id }): Path<CompanyPath>,
) -> ApiResult<Json<Envelope<Vec<StockItem>>>> {
    company_access(&app, &user, company_id).await?;
    let items = app
        .database()
        .list_stock_items(company_id)
        .await
        .map_err(internal("list stock items"))?;
    Ok(ok(items))
}

async fn create_stock_item<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(CompanyPath { company_id }): Path<CompanyPath>,
    Json(body): Json<StockItemData>,
) -> ApiResult<(StatusCode, Json<Envelope<StockItem>>)> {
    let user = current.require(MenuSection::StockItems)?;
    company_access(&app, user, company_id).await?;
    let data = body.validate()?;

    let item = app
        .database()
        .create_stock_item(app.generate_id(), company_id, data, app.now())
        .await
        .map_err(internal("create stock item"))??;
    Ok(created(item))
}

async fn read_stock_item<T: ApiApplication>(
    State(app): State<T>,
    CurrentUser(user): CurrentUser,
    Path(Id {
        company_id,
        item_id,
    }): Path<Id>,
) -> ApiResult<Json<Envelope<StockItem>>> {
    company_access(&app, &user, company_id).await?;
    app.database()
        .get_stock_item(company_id, item_id)
        .await
        .map_err(internal("get stock item"))?
        .map(ok)
        .ok_or_else(|| ApiError::not_found("stock item"))
}

async fn update_stock_item<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(Id {
        company_id,
        item_id,
    }): Path<Id>,
    Json(body): Json<StockItemData>,
) -> ApiResult<Json<Envelope<StockItem>>> {
    let user = current.require(MenuSection::StockItems)?;
    company_access(&app, user, company_id).await?;
    let data = body.validate()?;

    let item = app
        .database()
        .update_stock_item(company_id, item_id, data)
        .await
        .map_err(internal("update stock item"))??;
    Ok(ok(item))
}

/// Delete a stock item that no voucher refers to.
async fn delete_stock_item<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(Id {
        company_id,
        item_id,
    }): Path<Id>,
) -> ApiResult<Json<Envelope<()>>> {
    let user = current.require(MenuSection::StockItems)?;
    company_access(&app, user, company_id).await?;

    app.database()
        .delete_stock_item(company_id, item_id)
        .await
        .map_err(internal("delete stock item"))??;
    Ok(ok(()))
}

//! User administration endpoints. Every route requires the `users` menu.

use crate::{
    ApiApplication,
    auth::CurrentUser,
    response::{ApiError, ApiResult, Envelope, internal, ok},
};
use aide::axum::{
    ApiRouter,
    routing::{delete, get, put},
};
use axum::{
    Json,
    extract::{Path, State},
};
use erp_core::{
    models::{MenuSection, User, UserAccessUpdate, UserId},
    ports::UserRepository as _,
};
use tracing::{Level, event};

/// Path parameter for user-specific endpoints.
#[derive(serde::Deserialize, schemars::JsonSchema)]
#[schemars(inline)]
struct Id {
    /// The unique identifier of the user
    user_id: UserId,
}

/// Creates a router with the user administration endpoints.
pub fn router<T: ApiApplication>() -> ApiRouter<T> {
    ApiRouter::new()
        .api_route_with("/list", get(list_users::<T>), |route| {
            route.security_requirement("jwt").tag("admin")
        })
        .api_route_with(
            "/user-permissions/{user_id}",
            put(update_permissions::<T>),
            |route| route.security_requirement("jwt").tag("admin"),
        )
        .api_route_with("/{user_id}", delete(delete_user::<T>), |route| {
            route.security_requirement("jwt").tag("admin")
        })
}

/// List every user, oldest first.
async fn list_users<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
) -> ApiResult<Json<Envelope<Vec<User>>>> {
    current.require(MenuSection::Users)?;
    let users = app
        .database()
        .list_users()
        .await
        .map_err(internal("list users"))?;
    Ok(ok(users))
}

/// Change a user's role, menu permissions or active flag.
///
/// Menu flags are merged over the existing permissions. Changing the role
/// without sending `menu` resets the permissions to the role's defaults.
///
/// # Returns
///
/// - `200 OK`: The updated user
/// - `400 Bad Request`: The caller tried to change their own role or deactivate themself
/// - `403 Forbidden`: Missing the `users` menu
/// - `404 Not Found`: User does not exist
/// - `500 Internal Server Error`: Database operation failed
async fn update_permissions<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(Id { user_id }): Path<Id>,
    Json(update): Json<UserAccessUpdate>,
) -> ApiResult<Json<Envelope<User>>> {
    let admin = current.require(MenuSection::Users)?;
    let db = app.database();

    let user = db
        .get_user(user_id)
        .await
        .map_err(internal("get user"))?
        .ok_or_else(|| ApiError::not_found("user"))?;

    let access = update.apply(&user);
    if user.id == admin.id && (access.role != user.role || !access.active) {
        return Err(ApiError::bad_request(
            "you cannot change your own role or deactivate yourself",
        ));
    }

    let user = db
        .update_user_access(user_id, access, app.now())
        .await
        .map_err(internal("update user"))??;

    event!(Level::INFO, %user_id, by = %admin.id, role = %user.role, active = user.active, "updated user access");
    Ok(ok(user))
}

/// Delete a user. Users cannot delete themselves.
async fn delete_user<T: ApiApplication>(
    State(app): State<T>,
    current: CurrentUser,
    Path(Id { user_id }): Path<Id>,
) -> ApiResult<Json<Envelope<()>>> {
    let admin = current.require(MenuSection::Users)?;
    if admin.id == user_id {
        return Err(ApiError::bad_request("you cannot delete yourself"));
    }

    app.database()
        .delete_user(user_id)
        .await
        .map_err(internal("delete user"))??;

    event!(Level::INFO, %user_id, by = %admin.id, "deleted user");
    Ok(ok(()))
}

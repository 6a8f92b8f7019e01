//! # Employee Routes
//!
//! ```text
//! GET    /api/employees        shop owner (admin: ?shop=)
//! POST   /api/employees        shop owner   creates User(employee) + Employee
//! GET    /api/employees/me     employee
//! PUT    /api/employees/{id}   shop owner | admin   position / permissions
//! DELETE /api/employees/{id}   shop owner | admin   deactivate (soft)
//! ```

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, put};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::info;

use super::{callers_shop, check_id, collection, page_request};
use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::state::AppState;
use pawmart_core::policy::{authorize, Action, Resource, Subject};
use pawmart_core::types::{Employee, EmployeePatch, Permissions, Role, Shop, User, UserProfile};
use pawmart_core::validation::{validate_email, validate_name, validate_password, Validator};
use pawmart_db::password::hash_password;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_employees).post(hire))
        .route("/me", get(me))
        .route("/{id}", put(update_employee).delete(deactivate))
}

fn owner_resource(shop: &Shop) -> Resource<'_> {
    Resource::Shop {
        id: &shop.id,
        owner: &shop.owner,
        employment: None,
    }
}

/// Loads an employee and checks the caller manages their shop.
async fn load_for(state: &AppState, subject: &Subject, id: &str) -> ApiResult<Employee> {
    check_id(id, "Employee")?;
    let employee = state.db.employees().get(id).await?;
    let shop = state.db.shops().get(&employee.shop).await?;
    authorize(subject, Action::ManageEmployees, &owner_resource(&shop))?;
    Ok(employee)
}

#[derive(Debug, Deserialize)]
struct EmployeeListParams {
    shop: Option<String>,
    page: Option<u32>,
    limit: Option<u32>,
}

async fn list_employees(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    ApiQuery(params): ApiQuery<EmployeeListParams>,
) -> ApiResult<Json<Value>> {
    let shop = match (subject.role, params.shop.as_deref()) {
        (Role::Admin, Some(id)) => {
            check_id(id, "Shop")?;
            state.db.shops().get(id).await?
        }
        _ => callers_shop(&state.db, &subject, None).await?,
    };
    authorize(&subject, Action::ManageEmployees, &owner_resource(&shop))?;

    let page = state
        .db
        .employees()
        .list_by_shop(&shop.id, page_request(params.page, params.limit))
        .await?;
    collection("employees", page)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HireRequest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    email: String,
    #[serde(default)]
    password: String,
    #[serde(default)]
    position: String,
    #[serde(default)]
    permissions: Permissions,
}

#[derive(Debug, Serialize)]
struct HireResponse {
    employee: Employee,
    user: UserProfile,
}

async fn hire(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    ApiJson(req): ApiJson<HireRequest>,
) -> ApiResult<(StatusCode, Json<HireResponse>)> {
    let shop = callers_shop(&state.db, &subject, None).await?;
    authorize(&subject, Action::ManageEmployees, &owner_resource(&shop))?;

    Validator::new()
        .check(validate_name("name", &req.name))
        .check(validate_email(&req.email))
        .check(validate_password(&req.password))
        .check(validate_name("position", &req.position))
        .finish()?;

    let user = User::new(
        &req.name,
        &req.email,
        hash_password(&req.password)?,
        Role::Employee,
    );
    let employee = Employee::new(&user.id, &shop.id, &req.position, req.permissions);

    let mut uow = state.db.begin().await?;
    uow.insert(&user).await?;
    uow.insert(&employee).await?;
    uow.commit().await?;

    info!(
        employee_id = %employee.id,
        user_id = %user.id,
        shop_id = %shop.id,
        "Employee hired"
    );
    Ok((
        StatusCode::CREATED,
        Json(HireResponse {
            employee,
            user: user.profile(),
        }),
    ))
}

async fn me(State(state): State<AppState>, AuthUser(subject): AuthUser) -> ApiResult<Json<Employee>> {
    state
        .db
        .employees()
        .find_by_user(&subject.user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Employee"))
}

async fn update_employee(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
    ApiJson(patch): ApiJson<EmployeePatch>,
) -> ApiResult<Json<Employee>> {
    if let Some(position) = &patch.position {
        validate_name("position", position)?;
    }

    let mut employee = load_for(&state, &subject, &id).await?;
    patch.apply_to(&mut employee);
    state.db.employees().update(&employee).await?;
    Ok(Json(employee))
}

async fn deactivate(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Employee>> {
    let mut employee = load_for(&state, &subject, &id).await?;
    EmployeePatch {
        is_active: Some(false),
        ..Default::default()
    }
    .apply_to(&mut employee);
    state.db.employees().update(&employee).await?;

    info!(employee_id = %employee.id, "Employee deactivated");
    Ok(Json(employee))
}

//! Employee directory route handlers.
//!
//! The directory page lists every employee from the backend, narrowed by the
//! `search` and `filter` query parameters. Admins additionally get the
//! create/update form and per-row edit and delete actions. Every mutation
//! redirects back to the list, which re-fetches from the backend.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Router,
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use employee_directory_core::{
    Action, AgeCategory, DraftFields, Employee, EmployeeDraft, EmployeeFilter, EmployeeRecordId,
    PendingImage,
};

use crate::components::{FilterOption, NavbarView, TableColumn, age_filter_options, employee_columns};
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireSession;
use crate::models::{Alert, CurrentUser, SessionContext};
use crate::services::Operation;
use crate::state::AppState;

// =============================================================================
// Query & View Types
// =============================================================================

/// Query parameters of the directory page.
#[derive(Debug, Default, Deserialize)]
pub struct DirectoryQuery {
    pub search: Option<String>,
    pub filter: Option<String>,
}

/// Employee row for templates.
#[derive(Debug, Clone)]
pub struct EmployeeRow {
    pub record_id: String,
    pub employee_id: String,
    pub full_name: String,
    pub initial: String,
    pub age: String,
    pub role: String,
    pub contact: String,
    pub profile_url: Option<String>,
}

impl EmployeeRow {
    fn new(employee: &Employee, backend_base: &str) -> Self {
        Self {
            record_id: employee.record_id.to_string(),
            employee_id: employee.employee_id.clone(),
            full_name: employee.full_name(),
            initial: employee.initial(),
            age: employee.age.map_or_else(|| "-".to_string(), |a| a.to_string()),
            role: employee.role.clone(),
            contact: employee.contact().unwrap_or("-").to_string(),
            profile_url: employee.profile_url(backend_base),
        }
    }
}

/// The create/update form as rendered.
#[derive(Debug, Clone)]
pub struct DraftView {
    pub is_update: bool,
    pub action: String,
    pub employee_id: String,
    pub first_name: String,
    pub last_name: String,
    pub age: String,
    pub role: String,
    pub contact: String,
    pub preview_src: Option<String>,
}

impl DraftView {
    fn new(draft: &EmployeeDraft, backend_base: &str) -> Self {
        let action = draft
            .record_id
            .as_ref()
            .map_or_else(|| "/employees".to_string(), |id| format!("/employees/{id}"));
        Self {
            is_update: draft.is_update(),
            action,
            employee_id: draft.employee_id.clone(),
            first_name: draft.first_name.clone(),
            last_name: draft.last_name.clone(),
            age: draft.age.clone(),
            role: draft.role.clone(),
            contact: draft.contact.clone(),
            preview_src: draft.preview_src(backend_base),
        }
    }
}

// =============================================================================
// Templates
// =============================================================================

/// Directory page template.
#[derive(Template, WebTemplate)]
#[template(path = "employees/index.html")]
pub struct EmployeesIndexTemplate {
    pub navbar: NavbarView,
    pub alerts: Vec<Alert>,
    pub form: Option<DraftView>,
    pub columns: Vec<TableColumn>,
    pub rows: Vec<EmployeeRow>,
    pub total: usize,
    pub search: String,
    pub filter_options: Vec<FilterOption>,
    pub can_edit: bool,
    pub can_delete: bool,
}

/// Delete confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "employees/confirm_delete.html")]
pub struct ConfirmDeleteTemplate {
    pub navbar: NavbarView,
    pub employee: EmployeeRow,
}

/// Build the employees router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/employees", get(index).post(create))
        .route("/employees/draft/clear", post(clear_draft))
        .route("/employees/{id}", post(update))
        .route("/employees/{id}/edit", get(edit))
        .route("/employees/{id}/delete", get(confirm_delete).post(delete))
}

// =============================================================================
// Helpers
// =============================================================================

/// Reject users whose role does not permit `action`.
fn authorize(user: &CurrentUser, action: Action) -> Result<(), AppError> {
    if user.role.can(action) {
        Ok(())
    } else {
        tracing::warn!(email = %user.email, ?action, "Action refused for read-only user");
        Err(AppError::Forbidden(
            "You are in read-only mode".to_string(),
        ))
    }
}

/// Find a record in the last loaded list.
async fn find_in_snapshot(
    ctx: &SessionContext,
    id: &EmployeeRecordId,
) -> Result<Employee, AppError> {
    ctx.snapshot()
        .await?
        .into_iter()
        .find(|e| &e.record_id == id)
        .ok_or_else(|| AppError::NotFound(format!("employee {id}")))
}

/// An uploaded file part.
struct Upload {
    file_name: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// Read the employee form. An empty file input yields no upload.
async fn read_form(mut multipart: Multipart) -> Result<(DraftFields, Option<Upload>), AppError> {
    let mut fields = DraftFields::default();
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid form submission: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        if name == "profile" {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_string();
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::BadRequest(format!("Invalid profile upload: {e}")))?;
            if !file_name.is_empty() && !bytes.is_empty() {
                upload = Some(Upload {
                    file_name,
                    content_type,
                    bytes: bytes.to_vec(),
                });
            }
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| AppError::BadRequest(format!("Invalid form field {name}: {e}")))?;
        match name.as_str() {
            "employeeId" => fields.employee_id = value,
            "firstName" => fields.first_name = value,
            "lastName" => fields.last_name = value,
            "age" => fields.age = value,
            "role" => fields.role = value,
            "contact" => fields.contact = value,
            _ => {}
        }
    }

    Ok((fields, upload))
}

/// Merge a submission into the draft.
///
/// Returns `false` when the upload was rejected; the alert is already queued.
async fn merge_submission(
    ctx: &SessionContext,
    draft: &mut EmployeeDraft,
    fields: DraftFields,
    upload: Option<Upload>,
) -> Result<bool, AppError> {
    draft.apply_fields(fields);
    let Some(upload) = upload else {
        return Ok(true);
    };

    match PendingImage::new(upload.file_name, upload.content_type, upload.bytes) {
        Ok(image) => {
            draft.attach_image(image);
            Ok(true)
        }
        Err(violation) => {
            ctx.push_alert(Alert::error(violation.to_string())).await?;
            Ok(false)
        }
    }
}

// =============================================================================
// Routes
// =============================================================================

/// Directory page.
///
/// GET /employees?search=&filter=
///
/// On a failed fetch the previously loaded list is shown with the error.
#[instrument(skip_all, fields(email = %user.email))]
pub async fn index(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    ctx: SessionContext,
    Query(query): Query<DirectoryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let mut alerts = ctx.take_alerts().await?;

    let employees = match state.employees().list(&user.token).await {
        Ok(employees) => {
            ctx.save_snapshot(&employees).await?;
            employees
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to fetch employees");
            alerts.push(Alert::error(e.user_message(Operation::List)));
            ctx.snapshot().await?
        }
    };

    let backend_base = state.employees().base_url();
    let search = query.search.unwrap_or_default();
    let category = AgeCategory::parse_or_default(query.filter.as_deref());
    let filter = EmployeeFilter::new(&search, category);
    let rows = filter
        .apply(&employees)
        .into_iter()
        .map(|e| EmployeeRow::new(e, backend_base))
        .collect();

    let can_edit = user.role.can(Action::EditEmployee);
    let form = if user.role.can(Action::AddEmployee) {
        Some(DraftView::new(&ctx.draft().await?, backend_base))
    } else {
        None
    };

    Ok(EmployeesIndexTemplate {
        navbar: NavbarView::new(&user, "/employees"),
        alerts,
        form,
        columns: employee_columns(can_edit),
        rows,
        total: employees.len(),
        search,
        filter_options: age_filter_options(filter.category()),
        can_edit,
        can_delete: user.role.can(Action::DeleteEmployee),
    })
}

/// Create an employee from the form.
///
/// POST /employees
///
/// Validation failures and backend errors keep the draft for correction.
#[instrument(skip_all, fields(email = %user.email))]
pub async fn create(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    ctx: SessionContext,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    authorize(&user, Action::AddEmployee)?;
    let (fields, upload) = read_form(multipart).await?;

    let mut draft = ctx.draft().await?;
    if draft.is_update() {
        draft = EmployeeDraft::default();
    }
    let accepted = merge_submission(&ctx, &mut draft, fields, upload).await?;
    ctx.save_draft(&draft).await?;
    if !accepted {
        return Ok(Redirect::to("/employees"));
    }

    let new_employee = match draft.validate_for_create() {
        Ok(employee) => employee,
        Err(e) => {
            ctx.push_alert(Alert::error(e.to_string())).await?;
            return Ok(Redirect::to("/employees"));
        }
    };

    match state.employees().create(&user.token, &new_employee).await {
        Ok(()) => {
            tracing::info!(employee_id = %new_employee.employee_id, "Employee created");
            ctx.reset_draft().await?;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to create employee");
            ctx.push_alert(Alert::error(e.user_message(Operation::Create)))
                .await?;
        }
    }

    Ok(Redirect::to("/employees"))
}

/// Update an employee from the form.
///
/// POST /employees/{id}
///
/// No required-field checks; the backend decides what it accepts.
#[instrument(skip(user, state, ctx, multipart), fields(email = %user.email))]
pub async fn update(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Result<Redirect, AppError> {
    authorize(&user, Action::EditEmployee)?;
    let id = EmployeeRecordId::new(id);
    let (fields, upload) = read_form(multipart).await?;

    let mut draft = ctx.draft().await?;
    if draft.record_id.as_ref() != Some(&id) {
        draft = EmployeeDraft::for_update(&find_in_snapshot(&ctx, &id).await?);
    }
    let accepted = merge_submission(&ctx, &mut draft, fields, upload).await?;
    ctx.save_draft(&draft).await?;
    if !accepted {
        return Ok(Redirect::to("/employees"));
    }

    match state
        .employees()
        .update(&user.token, &id, &draft.to_update())
        .await
    {
        Ok(()) => {
            tracing::info!(record_id = %id, "Employee updated");
            ctx.reset_draft().await?;
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to update employee");
            ctx.push_alert(Alert::error(e.user_message(Operation::Update)))
                .await?;
        }
    }

    Ok(Redirect::to("/employees"))
}

/// Load a listed employee into the form in update mode.
///
/// GET /employees/{id}/edit
#[instrument(skip(user, ctx), fields(email = %user.email))]
pub async fn edit(
    RequireSession(user): RequireSession,
    ctx: SessionContext,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    authorize(&user, Action::EditEmployee)?;
    let employee = find_in_snapshot(&ctx, &EmployeeRecordId::new(id)).await?;
    ctx.save_draft(&EmployeeDraft::for_update(&employee)).await?;
    Ok(Redirect::to("/employees#employee-form"))
}

/// Discard the form.
///
/// POST /employees/draft/clear
pub async fn clear_draft(
    RequireSession(_user): RequireSession,
    ctx: SessionContext,
) -> Result<Redirect, AppError> {
    ctx.reset_draft().await?;
    Ok(Redirect::to("/employees"))
}

/// Ask for confirmation before deleting.
///
/// GET /employees/{id}/delete
#[instrument(skip(user, state, ctx), fields(email = %user.email))]
pub async fn confirm_delete(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    authorize(&user, Action::DeleteEmployee)?;
    let employee = find_in_snapshot(&ctx, &EmployeeRecordId::new(id)).await?;

    Ok(ConfirmDeleteTemplate {
        navbar: NavbarView::new(&user, "/employees"),
        employee: EmployeeRow::new(&employee, state.employees().base_url()),
    })
}

/// Delete an employee after confirmation.
///
/// POST /employees/{id}/delete
///
/// Only records from the last listed snapshot can be deleted.
#[instrument(skip(user, state, ctx), fields(email = %user.email))]
pub async fn delete(
    RequireSession(user): RequireSession,
    State(state): State<AppState>,
    ctx: SessionContext,
    Path(id): Path<String>,
) -> Result<Redirect, AppError> {
    authorize(&user, Action::DeleteEmployee)?;
    let id = find_in_snapshot(&ctx, &EmployeeRecordId::new(id))
        .await?
        .record_id;

    match state.employees().delete(&user.token, &id).await {
        Ok(()) => {
            tracing::info!(record_id = %id, "Employee deleted");
            if ctx.draft().await?.record_id.as_ref() == Some(&id) {
                ctx.reset_draft().await?;
            }
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to delete employee");
            ctx.push_alert(Alert::error(e.user_message(Operation::Delete)))
                .await?;
        }
    }

    Ok(Redirect::to("/employees"))
}

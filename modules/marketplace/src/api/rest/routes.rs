use std::sync::Arc;

use axum::middleware::from_fn_with_state;
use axum::routing::{patch, post, MethodRouter};
use axum::{Extension, Router};
use modkit::api::{OpenApiRegistry, OperationBuilder};
use modkit::http::{rate_limit, FixedWindowLimiter};

use crate::api::rest::dto;
use crate::api::rest::handlers::{admin, auth, catalog, inbox, plan, site, supplier};
use crate::api::rest::session::SESSION_COOKIE;
use crate::auth::JwtManager;
use crate::domain::service::Service;

/// Per-client fixed-window buckets for the abuse-prone routes.
#[derive(Clone)]
pub struct Limiters {
    /// Sign-up and sign-in.
    pub auth: Arc<FixedWindowLimiter>,
    /// Listing, package, message and tracking writes.
    pub write: Arc<FixedWindowLimiter>,
}

const SESSION_DOC: &str = "Session token set by sign-in";

fn limited(limiter: &Arc<FixedWindowLimiter>, route: MethodRouter) -> MethodRouter {
    route.layer(from_fn_with_state(limiter.clone(), rate_limit::enforce))
}

pub fn register_routes(
    mut router: Router,
    openapi: &dyn OpenApiRegistry,
    service: Arc<Service>,
    jwt: Arc<JwtManager>,
    limiters: Limiters,
) -> anyhow::Result<Router> {
    // --- auth ---

    router = OperationBuilder::post("/api/auth/register")
        .operation_id("marketplace.register")
        .summary("Create an account")
        .description("Registers a customer or supplier account and starts a session")
        .tag("auth")
        .json_request::<dto::RegisterReq>(openapi, "Account details")
        .method_router(limited(&limiters.auth, post(auth::register)))
        .json_response_with_schema::<dto::AuthResponse>(openapi, 200, "Registered and signed in")
        .problem_responses(openapi, &[400, 409, 429, 500])
        .register(router, openapi);

    router = OperationBuilder::post("/api/auth/login")
        .operation_id("marketplace.login")
        .summary("Sign in")
        .tag("auth")
        .json_request::<dto::LoginReq>(openapi, "Credentials")
        .method_router(limited(&limiters.auth, post(auth::login)))
        .json_response_with_schema::<dto::AuthResponse>(openapi, 200, "Signed in")
        .problem_responses(openapi, &[400, 401, 429, 500])
        .register(router, openapi);

    router = OperationBuilder::post("/api/auth/logout")
        .operation_id("marketplace.logout")
        .summary("Sign out")
        .tag("auth")
        .handler(auth::logout)
        .json_response_with_schema::<dto::OkResponse>(openapi, 200, "Session cleared")
        .register(router, openapi);

    router = OperationBuilder::get("/api/auth/me")
        .operation_id("marketplace.me")
        .summary("Current account")
        .description("Returns `{\"user\": null}` without a valid session")
        .tag("auth")
        .cookie_param(SESSION_COOKIE, false, SESSION_DOC)
        .handler(auth::me)
        .json_response_with_schema::<dto::MeResponse>(openapi, 200, "Current account")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = OperationBuilder::get("/api/me/settings")
        .operation_id("marketplace.get_settings")
        .summary("Notification settings")
        .tag("auth")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .handler(auth::get_settings)
        .json_response_with_schema::<dto::SettingsDto>(openapi, 200, "Settings")
        .problem_responses(openapi, &[401, 404, 500])
        .register(router, openapi);

    router = OperationBuilder::post("/api/me/settings")
        .operation_id("marketplace.save_settings")
        .summary("Update notification settings")
        .tag("auth")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .json_request::<dto::SettingsReq>(openapi, "New settings")
        .request_optional()
        .handler(auth::save_settings)
        .json_response_with_schema::<dto::SettingsSavedDto>(openapi, 200, "Saved settings")
        .problem_responses(openapi, &[400, 401, 404, 500])
        .register(router, openapi);

    // --- public catalogue ---

    router = OperationBuilder::get("/api/suppliers")
        .operation_id("marketplace.list_suppliers")
        .summary("Browse suppliers")
        .description("Approved suppliers, optionally filtered")
        .tag("catalog")
        .query_param("category", false, "Exact category")
        .query_param("q", false, "Text in name, summary or location")
        .query_param("price", false, "Text in the price band")
        .handler(catalog::list_suppliers)
        .json_response_with_schema::<dto::SupplierListDto>(openapi, 200, "Suppliers")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = OperationBuilder::get("/api/suppliers/{id}")
        .operation_id("marketplace.get_supplier")
        .summary("Supplier details")
        .tag("catalog")
        .path_param("id", "Supplier id")
        .handler(catalog::get_supplier)
        .json_response_with_schema::<dto::SupplierDto>(openapi, 200, "Supplier")
        .problem_responses(openapi, &[404, 500])
        .register(router, openapi);

    router = OperationBuilder::get("/api/suppliers/{id}/packages")
        .operation_id("marketplace.supplier_packages")
        .summary("Packages of a supplier")
        .tag("catalog")
        .path_param("id", "Supplier id")
        .handler(catalog::supplier_packages)
        .json_response_with_schema::<dto::PackageListDto>(openapi, 200, "Approved packages")
        .problem_responses(openapi, &[404, 500])
        .register(router, openapi);

    router = OperationBuilder::get("/api/packages/featured")
        .operation_id("marketplace.featured_packages")
        .summary("Featured packages")
        .tag("catalog")
        .handler(catalog::featured_packages)
        .json_response_with_schema::<dto::PackageListDto>(openapi, 200, "Featured first")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = OperationBuilder::get("/api/packages/search")
        .operation_id("marketplace.search_packages")
        .summary("Search packages")
        .tag("catalog")
        .query_param("q", false, "Text in title or description")
        .handler(catalog::search_packages)
        .json_response_with_schema::<dto::PackageListDto>(openapi, 200, "Matching packages")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    // --- supplier self-service ---

    router = OperationBuilder::get("/api/me/suppliers")
        .operation_id("marketplace.my_suppliers")
        .summary("Own listings")
        .description("Own listings in any approval state, with a listing health score")
        .tag("supplier")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .handler(supplier::my_suppliers)
        .json_response_with_schema::<dto::ScoredSupplierListDto>(openapi, 200, "Own listings")
        .problem_responses(openapi, &[401, 403, 500])
        .register(router, openapi);

    router = OperationBuilder::post("/api/me/suppliers")
        .operation_id("marketplace.create_supplier")
        .summary("Submit a listing")
        .tag("supplier")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .json_request::<dto::CreateSupplierReq>(openapi, "Listing")
        .method_router(limited(&limiters.write, post(supplier::create_supplier)))
        .json_response_with_schema::<dto::SupplierEnvelope>(openapi, 200, "Listing awaiting review")
        .problem_responses(openapi, &[400, 401, 403, 429, 500])
        .register(router, openapi);

    router = OperationBuilder::patch("/api/me/suppliers/{id}")
        .operation_id("marketplace.update_supplier")
        .summary("Edit a listing")
        .description("Edits send the listing back for review")
        .tag("supplier")
        .path_param("id", "Supplier id")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .json_request::<dto::UpdateSupplierReq>(openapi, "Changed fields")
        .method_router(limited(&limiters.write, patch(supplier::update_supplier)))
        .json_response_with_schema::<dto::SupplierEnvelope>(openapi, 200, "Updated listing")
        .problem_responses(openapi, &[400, 401, 403, 404, 429, 500])
        .register(router, openapi);

    router = OperationBuilder::get("/api/me/packages")
        .operation_id("marketplace.my_packages")
        .summary("Own packages")
        .tag("supplier")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .handler(supplier::my_packages)
        .json_response_with_schema::<dto::PackageListDto>(openapi, 200, "Own packages")
        .problem_responses(openapi, &[401, 403, 500])
        .register(router, openapi);

    router = OperationBuilder::post("/api/me/packages")
        .operation_id("marketplace.create_package")
        .summary("Submit a package")
        .tag("supplier")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .json_request::<dto::CreatePackageReq>(openapi, "Package")
        .method_router(limited(&limiters.write, post(supplier::create_package)))
        .json_response_with_schema::<dto::PackageEnvelope>(openapi, 200, "Package awaiting review")
        .problem_responses(openapi, &[400, 401, 403, 429, 500])
        .register(router, openapi);

    router = OperationBuilder::patch("/api/me/packages/{id}")
        .operation_id("marketplace.update_package")
        .summary("Edit a package")
        .tag("supplier")
        .path_param("id", "Package id")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .json_request::<dto::UpdatePackageReq>(openapi, "Changed fields")
        .method_router(limited(&limiters.write, patch(supplier::update_package)))
        .json_response_with_schema::<dto::PackageEnvelope>(openapi, 200, "Updated package")
        .problem_responses(openapi, &[400, 401, 403, 404, 429, 500])
        .register(router, openapi);

    // --- threads ---

    router = OperationBuilder::post("/api/threads/start")
        .operation_id("marketplace.start_thread")
        .summary("Start a conversation")
        .description("Returns the existing thread with this supplier when there is one")
        .tag("threads")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .json_request::<dto::SupplierRefReq>(openapi, "Supplier to contact")
        .method_router(limited(&limiters.write, post(inbox::start_thread)))
        .json_response_with_schema::<dto::ThreadEnvelope>(openapi, 200, "Thread")
        .problem_responses(openapi, &[400, 401, 404, 429, 500])
        .register(router, openapi);

    router = OperationBuilder::get("/api/threads/my")
        .operation_id("marketplace.my_threads")
        .summary("Conversations")
        .tag("threads")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .handler(inbox::my_threads)
        .json_response_with_schema::<dto::ThreadListDto>(openapi, 200, "Threads with last message")
        .problem_responses(openapi, &[401, 500])
        .register(router, openapi);

    router = OperationBuilder::get("/api/threads/{id}/messages")
        .operation_id("marketplace.thread_messages")
        .summary("Messages of a conversation")
        .tag("threads")
        .path_param("id", "Thread id")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .handler(inbox::thread_messages)
        .json_response_with_schema::<dto::MessageListDto>(openapi, 200, "Oldest first")
        .problem_responses(openapi, &[401, 403, 404, 500])
        .register(router, openapi);

    router = OperationBuilder::post("/api/threads/{id}/messages")
        .operation_id("marketplace.post_message")
        .summary("Send a message")
        .tag("threads")
        .path_param("id", "Thread id")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .json_request::<dto::PostMessageReq>(openapi, "Message")
        .method_router(limited(&limiters.write, post(inbox::post_message)))
        .json_response_with_schema::<dto::MessageEnvelope>(openapi, 200, "Stored message")
        .problem_responses(openapi, &[400, 401, 403, 404, 429, 500])
        .register(router, openapi);

    // --- plan & notes ---

    router = OperationBuilder::get("/api/plan")
        .operation_id("marketplace.get_plan")
        .summary("Saved suppliers")
        .tag("plan")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .handler(plan::get_plan)
        .json_response_with_schema::<dto::SupplierListDto>(openapi, 200, "Plan")
        .problem_responses(openapi, &[401, 403, 500])
        .register(router, openapi);

    router = OperationBuilder::post("/api/plan")
        .operation_id("marketplace.add_to_plan")
        .summary("Save a supplier")
        .tag("plan")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .json_request::<dto::SupplierRefReq>(openapi, "Supplier to save")
        .handler(plan::add_to_plan)
        .json_response_with_schema::<dto::OkResponse>(openapi, 200, "Saved")
        .problem_responses(openapi, &[400, 401, 403, 404, 500])
        .register(router, openapi);

    router = OperationBuilder::delete("/api/plan/{supplierId}")
        .operation_id("marketplace.remove_from_plan")
        .summary("Remove a saved supplier")
        .tag("plan")
        .path_param("supplierId", "Supplier id")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .handler(plan::remove_from_plan)
        .json_response_with_schema::<dto::OkResponse>(openapi, 200, "Removed")
        .problem_responses(openapi, &[401, 403, 500])
        .register(router, openapi);

    router = OperationBuilder::get("/api/plan/progress")
        .operation_id("marketplace.plan_progress")
        .summary("Plan progress")
        .tag("plan")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .handler(plan::plan_progress)
        .json_response_with_schema::<dto::PlanProgressDto>(openapi, 200, "Covered categories")
        .problem_responses(openapi, &[401, 403, 500])
        .register(router, openapi);

    router = OperationBuilder::get("/api/notes")
        .operation_id("marketplace.get_notes")
        .summary("Planning notes")
        .tag("plan")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .handler(plan::get_notes)
        .json_response_with_schema::<dto::NotesDto>(openapi, 200, "Notes")
        .problem_responses(openapi, &[401, 403, 500])
        .register(router, openapi);

    router = OperationBuilder::post("/api/notes")
        .operation_id("marketplace.save_notes")
        .summary("Save planning notes")
        .tag("plan")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .json_request::<dto::NotesDto>(openapi, "Notes")
        .request_optional()
        .handler(plan::save_notes)
        .json_response_with_schema::<dto::OkResponse>(openapi, 200, "Saved")
        .problem_responses(openapi, &[400, 401, 403, 500])
        .register(router, openapi);

    // --- admin ---

    router = OperationBuilder::get("/api/admin/metrics")
        .operation_id("marketplace.metrics")
        .summary("Platform counts")
        .tag("admin")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .handler(admin::metrics)
        .json_response_with_schema::<dto::MetricsDto>(openapi, 200, "Counts")
        .problem_responses(openapi, &[401, 403, 500])
        .register(router, openapi);

    router = OperationBuilder::get("/api/admin/metrics/timeseries")
        .operation_id("marketplace.metrics_timeseries")
        .summary("Daily activity")
        .description("Pageviews, signups and messages for the last 14 UTC days")
        .tag("admin")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .handler(admin::metrics_timeseries)
        .json_response_with_schema::<dto::TimeseriesDto>(openapi, 200, "Daily counts")
        .problem_responses(openapi, &[401, 403, 500])
        .register(router, openapi);

    router = OperationBuilder::get("/api/admin/suppliers")
        .operation_id("marketplace.admin_suppliers")
        .summary("All listings")
        .tag("admin")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .handler(admin::all_suppliers)
        .json_response_with_schema::<dto::SupplierListDto>(openapi, 200, "Listings")
        .problem_responses(openapi, &[401, 403, 500])
        .register(router, openapi);

    router = OperationBuilder::post("/api/admin/suppliers/{id}/approve")
        .operation_id("marketplace.approve_supplier")
        .summary("Approve or hide a listing")
        .tag("admin")
        .path_param("id", "Supplier id")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .json_request::<dto::ApproveReq>(openapi, "Approval flag")
        .request_optional()
        .handler(admin::approve_supplier)
        .json_response_with_schema::<dto::SupplierEnvelope>(openapi, 200, "Moderated listing")
        .problem_responses(openapi, &[400, 401, 403, 404, 500])
        .register(router, openapi);

    router = OperationBuilder::get("/api/admin/packages")
        .operation_id("marketplace.admin_packages")
        .summary("All packages")
        .tag("admin")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .handler(admin::all_packages)
        .json_response_with_schema::<dto::PackageListDto>(openapi, 200, "Packages")
        .problem_responses(openapi, &[401, 403, 500])
        .register(router, openapi);

    router = OperationBuilder::post("/api/admin/packages/{id}/approve")
        .operation_id("marketplace.approve_package")
        .summary("Approve or hide a package")
        .tag("admin")
        .path_param("id", "Package id")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .json_request::<dto::ApproveReq>(openapi, "Approval flag")
        .request_optional()
        .handler(admin::approve_package)
        .json_response_with_schema::<dto::PackageEnvelope>(openapi, 200, "Moderated package")
        .problem_responses(openapi, &[400, 401, 403, 404, 500])
        .register(router, openapi);

    router = OperationBuilder::post("/api/admin/packages/{id}/feature")
        .operation_id("marketplace.feature_package")
        .summary("Feature a package")
        .tag("admin")
        .path_param("id", "Package id")
        .cookie_param(SESSION_COOKIE, true, SESSION_DOC)
        .json_request::<dto::FeatureReq>(openapi, "Featured flag")
        .request_optional()
        .handler(admin::feature_package)
        .json_response_with_schema::<dto::PackageEnvelope>(openapi, 200, "Updated package")
        .problem_responses(openapi, &[400, 401, 403, 404, 500])
        .register(router, openapi);

    // --- site ---

    router = OperationBuilder::post("/api/metrics/track")
        .operation_id("marketplace.track_event")
        .summary("Record an analytics event")
        .tag("site")
        .json_request::<dto::TrackReq>(openapi, "Event")
        .method_router(limited(&limiters.write, post(site::track)))
        .json_response_with_schema::<dto::OkResponse>(openapi, 200, "Recorded")
        .problem_responses(openapi, &[400, 429, 500])
        .register(router, openapi);

    router = OperationBuilder::get("/sitemap.xml")
        .operation_id("marketplace.sitemap")
        .summary("Sitemap")
        .tag("site")
        .handler(site::sitemap)
        .content_response(200, "application/xml", "Public pages and approved listings")
        .problem_response(openapi, 500, "Internal Server Error")
        .register(router, openapi);

    router = router.layer(Extension(service)).layer(Extension(jwt));

    Ok(router)
}

use serde::Serialize;
use utoipa::OpenApi;
use utoipa::ToSchema;

// Documentation mirrors of the service types; the service crate stays free of utoipa.

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct LoginRequest { pub username: String, pub password: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct ChangePasswordRequest { pub current_password: String, pub new_password: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct AdminSessionDoc { pub username: String, pub token: String, pub expires_at: String }

#[derive(ToSchema, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResourceDoc {
    pub id: String,
    pub title: String,
    pub description: String,
    pub long_description: String,
    /// PDF, Spreadsheet, Document, Presentation, Image, Video or Audio
    #[serde(rename = "type")]
    pub resource_type: String,
    /// "DIY Personal Finance Toolkit" or "Sample Financial Plans"
    pub category: String,
    pub tags: Vec<String>,
    pub image_url: String,
    /// Empty on public views of coming-soon resources
    pub file_url: String,
    pub file_name: String,
    pub download_count: u64,
    pub is_coming_soon: bool,
    pub is_hidden: bool,
    pub live_date: Option<String>,
    pub revision: u64,
    pub created_at: String,
    pub updated_at: String,
}

/// Resource fields plus the publication status, flattened.
#[derive(ToSchema, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminResourceDoc {
    #[serde(flatten)]
    pub resource: ResourceDoc,
    /// hidden, scheduled or live
    pub status: String,
}

#[derive(ToSchema, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResourceDoc {
    pub title: String,
    pub description: String,
    pub long_description: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub category: String,
    pub tags: Option<Vec<String>>,
    /// Plain URL or `data:<mime>;base64,...`
    pub image_url: Option<String>,
    /// Plain URL or `data:<mime>;base64,...`; ignored for coming-soon resources
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub is_coming_soon: Option<bool>,
    pub is_hidden: Option<bool>,
    pub live_date: Option<String>,
}

#[derive(ToSchema, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateResourceDoc {
    /// Revision the edit is based on
    pub revision: u64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub long_description: Option<String>,
    #[serde(rename = "type")]
    pub resource_type: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
    pub image_url: Option<String>,
    pub file_url: Option<String>,
    pub file_name: Option<String>,
    pub is_coming_soon: Option<bool>,
    pub is_hidden: Option<bool>,
    /// `null` clears the schedule
    pub live_date: Option<String>,
}

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct LeadRequest { pub first_name: String, pub email: String, pub has_consented: bool }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct LeadDoc {
    pub id: String,
    pub first_name: String,
    pub email: String,
    pub resource_id: String,
    pub resource_title: String,
    pub timestamp: String,
    pub has_consented: bool,
}

#[derive(ToSchema)]
pub struct PassRequestDoc { pub email: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct SubscriberPassDoc { pub token: String, pub email: String, pub expires_at: String }

#[derive(ToSchema)]
#[schema(rename_all = "camelCase")]
pub struct DownloadOutcomeDoc {
    pub lead: LeadDoc,
    pub download_url: Option<String>,
    pub subscriber_pass: SubscriberPassDoc,
}

#[derive(utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct CatalogQueryDoc {
    /// Case-insensitive substring of title or description
    pub search: Option<String>,
    pub category: Option<String>,
    /// Repeat for each required tag
    pub tag: Option<Vec<String>>,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::routes::health,
        crate::routes::catalog::list_resources,
        crate::routes::catalog::get_resource,
        crate::routes::downloads::submit_download,
        crate::routes::downloads::record_external_access,
        crate::routes::downloads::issue_pass,
        crate::routes::auth::login,
        crate::routes::auth::logout,
        crate::routes::auth::change_password,
        crate::routes::admin::list_resources,
        crate::routes::admin::create_resource,
        crate::routes::admin::update_resource,
        crate::routes::admin::delete_resource,
        crate::routes::admin::upload_file,
        crate::routes::admin::list_leads,
        crate::routes::admin::export_signups,
        crate::embed::embed_js,
    ),
    components(
        schemas(
            HealthResponse,
            LoginRequest,
            ChangePasswordRequest,
            AdminSessionDoc,
            ResourceDoc,
            AdminResourceDoc,
            NewResourceDoc,
            UpdateResourceDoc,
            LeadRequest,
            LeadDoc,
            PassRequestDoc,
            SubscriberPassDoc,
            DownloadOutcomeDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "catalog"),
        (name = "downloads"),
        (name = "auth"),
        (name = "admin"),
        (name = "embed")
    )
)]
pub struct ApiDoc;

use std::collections::HashMap;

use askama::Template;
use axum::{
    Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
};
use serde::Deserialize;

use crate::{
    config::Config,
    database::Database,
    models::{ContactInfo, CreateRfqRequest, Form as SiteForm, HomePage, InformationPage,
        Product, Service, ServiceFeature},
    notify::Notifier,
    services::{
        CatalogService, FormService, ProductListing, RfqService, SearchResults, ServiceError,
        SubmitOutcome, form_service::SubmissionContext,
    },
};
use dynforms::{FieldError, FormSchema};

#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub catalog: CatalogService,
    pub forms: FormService,
    pub rfq: RfqService,
}

impl AppState {
    pub fn new(db: Database, config: &Config) -> Self {
        let notifier = Notifier::new(config);
        Self {
            catalog: CatalogService::new(db.clone()),
            forms: FormService::new(db.clone(), notifier.clone()),
            rfq: RfqService::new(db.clone(), notifier),
            db,
        }
    }
}

// Template rendering helper
struct HtmlTemplate<T>(T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(err) => {
                tracing::error!("Template error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Template error: {}", err),
                )
                    .into_response()
            }
        }
    }
}

fn http_error(err: ServiceError) -> (StatusCode, String) {
    if err.is_not_found() {
        (StatusCode::NOT_FOUND, err.to_string())
    } else {
        tracing::error!("Request failed: {}", err);
        (StatusCode::INTERNAL_SERVER_ERROR, err.to_string())
    }
}

/// First address of `X-Forwarded-For`, when a proxy supplied one.
fn client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn user_agent(headers: &HeaderMap) -> String {
    headers
        .get("user-agent")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

// Templates

#[derive(Template)]
#[template(path = "home.html")]
struct HomeTemplate {
    page: HomePage,
    featured: Vec<Product>,
    services: Vec<Service>,
}

#[derive(Template)]
#[template(path = "information.html")]
struct InformationTemplate {
    page: InformationPage,
}

#[derive(Template)]
#[template(path = "contact.html")]
struct ContactTemplate {
    info: ContactInfo,
    sent: bool,
    error: Option<String>,
}

#[derive(Template)]
#[template(path = "search.html")]
struct SearchTemplate {
    results: SearchResults,
}

#[derive(Template)]
#[template(path = "products/list.html")]
struct ProductListTemplate {
    listing: ProductListing,
}

#[derive(Template)]
#[template(path = "products/detail.html")]
struct ProductDetailTemplate {
    product: Product,
    related: Vec<Product>,
    category_label: Option<String>,
}

#[derive(Template)]
#[template(path = "services/list.html")]
struct ServiceListTemplate {
    services: Vec<Service>,
}

#[derive(Template)]
#[template(path = "services/detail.html")]
struct ServiceDetailTemplate {
    service: Service,
    features: Vec<ServiceFeature>,
}

#[derive(Template)]
#[template(path = "rfq/form.html")]
struct RfqFormTemplate {
    product: Option<Product>,
    error: Option<String>,
}

#[derive(Template)]
#[template(path = "rfq/success.html")]
struct RfqSuccessTemplate {}

#[derive(Template)]
#[template(path = "forms/list.html")]
struct FormListTemplate {
    forms: Vec<SiteForm>,
}

#[derive(Template)]
#[template(path = "forms/detail.html")]
struct FormDetailTemplate {
    form: SiteForm,
    schema: FormSchema,
    errors: Vec<FieldError>,
}

#[derive(Template)]
#[template(path = "forms/success.html")]
struct FormSuccessTemplate {
    form: SiteForm,
}

// Query/form payloads

#[derive(Deserialize)]
struct SearchParams {
    q: Option<String>,
}

#[derive(Deserialize)]
struct ContactForm {
    name: String,
    email: String,
    #[serde(default)]
    subject: String,
    message: String,
}

/// Raw RFQ form payload. Numbers arrive as strings from the browser
/// (an unselected product posts an empty `product_id`), so parsing
/// happens here rather than in serde.
#[derive(Deserialize)]
struct RfqForm {
    name: String,
    email: String,
    phone: String,
    #[serde(default)]
    company: String,
    #[serde(default)]
    address: String,
    #[serde(default)]
    subject: String,
    message: String,
    #[serde(default)]
    quantity: String,
    #[serde(default)]
    product_id: String,
}

impl RfqForm {
    /// An empty quantity means one unit; anything else must parse as a
    /// whole number or the form is re-rendered with the error.
    fn into_request(self) -> Result<CreateRfqRequest, String> {
        let quantity = match self.quantity.trim() {
            "" => 1,
            raw => raw
                .parse()
                .map_err(|_| "quantity must be a whole number".to_string())?,
        };
        Ok(CreateRfqRequest {
            name: self.name,
            email: self.email,
            phone: self.phone,
            company: self.company,
            address: self.address,
            subject: self.subject,
            message: self.message,
            quantity,
            product_id: self.product_id.trim().parse().ok(),
            items: Vec::new(),
        })
    }
}

// Handlers

async fn home(State(state): State<AppState>) -> Result<impl IntoResponse, (StatusCode, String)> {
    let page = HomePage::from(state.db.home_page().await.map_err(ServiceError::from).map_err(http_error)?);
    let content = state.catalog.home_content().await.map_err(http_error)?;
    Ok(HtmlTemplate(HomeTemplate {
        page,
        featured: content.featured,
        services: content.services,
    }))
}

async fn information(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let page = InformationPage::from(
        state
            .db
            .information_page()
            .await
            .map_err(ServiceError::from)
            .map_err(http_error)?,
    );
    Ok(HtmlTemplate(InformationTemplate { page }))
}

async fn contact(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let info = ContactInfo::from(
        state
            .db
            .contact_info()
            .await
            .map_err(ServiceError::from)
            .map_err(http_error)?,
    );
    Ok(HtmlTemplate(ContactTemplate {
        info,
        sent: params.contains_key("sent"),
        error: None,
    }))
}

async fn contact_submit(
    State(state): State<AppState>,
    axum::extract::Form(form): axum::extract::Form<ContactForm>,
) -> Result<Response, (StatusCode, String)> {
    if form.name.trim().is_empty()
        || form.email.trim().is_empty()
        || !form.email.contains('@')
        || form.message.trim().is_empty()
    {
        let info = ContactInfo::from(
            state
                .db
                .contact_info()
                .await
                .map_err(ServiceError::from)
                .map_err(http_error)?,
        );
        return Ok(HtmlTemplate(ContactTemplate {
            info,
            sent: false,
            error: Some("Please fill in your name, a valid email, and a message.".to_string()),
        })
        .into_response());
    }

    let id = state
        .db
        .insert_contact_message(
            form.name.trim(),
            form.email.trim(),
            form.subject.trim(),
            form.message.trim(),
        )
        .await
        .map_err(ServiceError::from)
        .map_err(http_error)?;
    tracing::info!(message_id = id, "contact message received");

    Ok(Redirect::to("/contact?sent=1").into_response())
}

async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let query = params.q.unwrap_or_default();
    let results = state.catalog.site_search(&query).await.map_err(http_error)?;
    Ok(HtmlTemplate(SearchTemplate { results }))
}

async fn products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let listing = state
        .catalog
        .product_listing(None, params.q.as_deref())
        .await
        .map_err(http_error)?;
    Ok(HtmlTemplate(ProductListTemplate { listing }))
}

async fn products_by_category(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let listing = state
        .catalog
        .product_listing(Some(&slug), params.q.as_deref())
        .await
        .map_err(http_error)?;
    Ok(HtmlTemplate(ProductListTemplate { listing }))
}

async fn product_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (product, related) = state.catalog.product_detail(&slug).await.map_err(http_error)?;
    let category_label = match product.category_id {
        Some(category_id) => state.catalog.category_label(category_id).await.ok(),
        None => None,
    };
    Ok(HtmlTemplate(ProductDetailTemplate {
        product,
        related,
        category_label,
    }))
}

async fn services(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let services: Vec<Service> = state
        .db
        .list_services(true)
        .await
        .map_err(ServiceError::from)
        .map_err(http_error)?
        .into_iter()
        .map(Service::from)
        .collect();
    Ok(HtmlTemplate(ServiceListTemplate { services }))
}

async fn service_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let service = Service::from(
        state
            .db
            .get_service_by_slug(&slug)
            .await
            .map_err(ServiceError::from)
            .map_err(http_error)?,
    );
    let features: Vec<ServiceFeature> = state
        .db
        .list_service_features(service.id)
        .await
        .map_err(ServiceError::from)
        .map_err(http_error)?
        .into_iter()
        .map(ServiceFeature::from)
        .collect();
    Ok(HtmlTemplate(ServiceDetailTemplate { service, features }))
}

async fn rfq_form(State(_state): State<AppState>) -> impl IntoResponse {
    HtmlTemplate(RfqFormTemplate {
        product: None,
        error: None,
    })
}

async fn rfq_product_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let product = Product::from(
        state
            .db
            .get_product_by_id(id)
            .await
            .map_err(ServiceError::from)
            .map_err(http_error)?,
    );
    Ok(HtmlTemplate(RfqFormTemplate {
        product: Some(product),
        error: None,
    }))
}

async fn rfq_submit(
    State(state): State<AppState>,
    axum::extract::Form(form): axum::extract::Form<RfqForm>,
) -> Result<Response, (StatusCode, String)> {
    submit_rfq(&state, form, None).await
}

async fn rfq_product_submit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    axum::extract::Form(form): axum::extract::Form<RfqForm>,
) -> Result<Response, (StatusCode, String)> {
    submit_rfq(&state, form, Some(id)).await
}

async fn submit_rfq(
    state: &AppState,
    form: RfqForm,
    product_id: Option<i64>,
) -> Result<Response, (StatusCode, String)> {
    let mut request = match form.into_request() {
        Ok(request) => request,
        Err(message) => return rfq_form_with_error(state, product_id, message).await,
    };
    // The path-bound product wins over anything posted in the body.
    if product_id.is_some() {
        request.product_id = product_id;
    }

    match state.rfq.create(request).await {
        Ok(_) => Ok(Redirect::to("/rfq/success").into_response()),
        Err(ServiceError::Invalid(message)) => {
            rfq_form_with_error(state, product_id, message).await
        }
        Err(err) => Err(http_error(err)),
    }
}

async fn rfq_form_with_error(
    state: &AppState,
    product_id: Option<i64>,
    message: String,
) -> Result<Response, (StatusCode, String)> {
    let product = match product_id {
        Some(id) => Some(Product::from(
            state
                .db
                .get_product_by_id(id)
                .await
                .map_err(ServiceError::from)
                .map_err(http_error)?,
        )),
        None => None,
    };
    Ok(HtmlTemplate(RfqFormTemplate {
        product,
        error: Some(message),
    })
    .into_response())
}

async fn rfq_success() -> impl IntoResponse {
    HtmlTemplate(RfqSuccessTemplate {})
}

async fn forms(State(state): State<AppState>) -> Result<impl IntoResponse, (StatusCode, String)> {
    let forms = state.forms.list_active().await.map_err(http_error)?;
    Ok(HtmlTemplate(FormListTemplate { forms }))
}

async fn form_detail(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (form, schema) = state.forms.schema(&slug).await.map_err(http_error)?;
    Ok(HtmlTemplate(FormDetailTemplate {
        form,
        schema,
        errors: Vec::new(),
    }))
}

async fn form_submit(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    headers: HeaderMap,
    axum::extract::Form(values): axum::extract::Form<HashMap<String, String>>,
) -> Result<Response, (StatusCode, String)> {
    let context = SubmissionContext {
        user_ip: client_ip(&headers),
        user_agent: user_agent(&headers),
    };
    let outcome = state
        .forms
        .submit(&slug, &values, context)
        .await
        .map_err(http_error)?;

    match outcome {
        SubmitOutcome::Accepted { .. } => {
            Ok(Redirect::to(&format!("/forms/{}/success", slug)).into_response())
        }
        SubmitOutcome::Rejected(errors) => {
            let (form, schema) = state.forms.schema(&slug).await.map_err(http_error)?;
            Ok(HtmlTemplate(FormDetailTemplate {
                form,
                schema,
                errors: errors.0,
            })
            .into_response())
        }
    }
}

async fn form_success(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let (form, _) = state.forms.schema(&slug).await.map_err(http_error)?;
    Ok(HtmlTemplate(FormSuccessTemplate { form }))
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home))
        .route("/information", get(information))
        .route("/contact", get(contact).post(contact_submit))
        .route("/search", get(search))
        .route("/products", get(products))
        .route("/products/category/{slug}", get(products_by_category))
        .route("/products/{slug}", get(product_detail))
        .route("/services", get(services))
        .route("/services/{slug}", get(service_detail))
        .route("/rfq", get(rfq_form).post(rfq_submit))
        .route("/rfq/success", get(rfq_success))
        .route("/rfq/product/{id}", get(rfq_product_form).post(rfq_product_submit))
        .route("/forms", get(forms))
        .route("/forms/{slug}", get(form_detail).post(form_submit))
        .route("/forms/{slug}/success", get(form_success))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rfq_form(quantity: &str, product_id: &str) -> RfqForm {
        RfqForm {
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            phone: "+15550001".to_string(),
            company: String::new(),
            address: String::new(),
            subject: String::new(),
            message: "Need units".to_string(),
            quantity: quantity.to_string(),
            product_id: product_id.to_string(),
        }
    }

    #[test]
    fn test_rfq_quantity_blank_defaults_to_one() {
        assert_eq!(rfq_form("", "").into_request().unwrap().quantity, 1);
        assert_eq!(rfq_form(" 7 ", "").into_request().unwrap().quantity, 7);
    }

    #[test]
    fn test_rfq_quantity_garbage_is_rejected() {
        assert!(rfq_form("abc", "").into_request().is_err());
        assert!(rfq_form("1.5", "").into_request().is_err());
    }

    #[test]
    fn test_rfq_blank_product_id_is_none() {
        assert_eq!(rfq_form("1", "").into_request().unwrap().product_id, None);
        assert_eq!(
            rfq_form("1", "42").into_request().unwrap().product_id,
            Some(42)
        );
    }
}

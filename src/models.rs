//! Domain Models
//!
//! Business entities that represent the site's content, independent of
//! the database layer. The catalog entities themselves live in the
//! `catalog` crate; this module maps storage rows into them and defines
//! the rest of the site's models.

use serde::{Deserialize, Serialize};

pub use catalog::{Category, Product};

use crate::database::{
    CategoryRow, ContactInfoRow, FormRow, HomePageRow, InformationPageRow, ProductRow,
    RfqItemRow, RfqRequestRow, ServiceFeatureRow, ServiceRow,
};

/// URL-safe slug derived from a display name: lowercased, alphanumerics
/// kept, everything else collapsed into single hyphens.
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    let mut last_was_hyphen = true;
    for ch in name.chars() {
        if ch.is_alphanumeric() {
            slug.extend(ch.to_lowercase());
            last_was_hyphen = false;
        } else if !last_was_hyphen {
            slug.push('-');
            last_was_hyphen = true;
        }
    }
    slug.trim_end_matches('-').to_string()
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            description: row.description,
            image: row.image,
            parent_id: row.parent_id,
            is_active: row.is_active,
            sort_order: row.sort_order,
            created_at: row.created_at,
        }
    }
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            slug: row.slug,
            sku: row.sku,
            category_id: row.category_id,
            company: row.company,
            short_description: row.short_description,
            description: row.description,
            specifications: row.specifications,
            price: row.price,
            image: row.image,
            in_stock: row.in_stock,
            stock_quantity: row.stock_quantity,
            is_active: row.is_active,
            is_featured: row.is_featured,
            views: row.views,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Service {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub short_description: String,
    pub description: String,
    pub icon: String,
    pub image: Option<String>,
    pub is_active: bool,
    pub sort_order: i64,
    pub created_at: String,
}

impl From<ServiceRow> for Service {
    fn from(row: ServiceRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            short_description: row.short_description,
            description: row.description,
            icon: row.icon,
            image: row.image,
            is_active: row.is_active,
            sort_order: row.sort_order,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceFeature {
    pub id: i64,
    pub service_id: i64,
    pub title: String,
    pub description: String,
    pub sort_order: i64,
}

impl From<ServiceFeatureRow> for ServiceFeature {
    fn from(row: ServiceFeatureRow) -> Self {
        Self {
            id: row.id,
            service_id: row.service_id,
            title: row.title,
            description: row.description,
            sort_order: row.sort_order,
        }
    }
}

/// Lifecycle of a quotation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RfqStatus {
    Pending,
    InProgress,
    Quoted,
    Completed,
    Cancelled,
}

impl RfqStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RfqStatus::Pending => "pending",
            RfqStatus::InProgress => "in_progress",
            RfqStatus::Quoted => "quoted",
            RfqStatus::Completed => "completed",
            RfqStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<RfqStatus> {
        match value {
            "pending" => Some(RfqStatus::Pending),
            "in_progress" => Some(RfqStatus::InProgress),
            "quoted" => Some(RfqStatus::Quoted),
            "completed" => Some(RfqStatus::Completed),
            "cancelled" => Some(RfqStatus::Cancelled),
            _ => None,
        }
    }

    /// Human-readable label for emails and admin views.
    pub fn label(&self) -> &'static str {
        match self {
            RfqStatus::Pending => "Pending",
            RfqStatus::InProgress => "In Progress",
            RfqStatus::Quoted => "Quoted",
            RfqStatus::Completed => "Completed",
            RfqStatus::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RfqRequest {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub address: String,
    pub subject: String,
    pub message: String,
    pub quantity: i64,
    pub product_id: Option<i64>,
    pub status: RfqStatus,
    pub admin_notes: String,
    pub created_at: String,
    pub updated_at: String,
}

impl From<RfqRequestRow> for RfqRequest {
    fn from(row: RfqRequestRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            email: row.email,
            phone: row.phone,
            company: row.company,
            address: row.address,
            subject: row.subject,
            message: row.message,
            quantity: row.quantity,
            product_id: row.product_id,
            status: RfqStatus::parse(&row.status).unwrap_or(RfqStatus::Pending),
            admin_notes: row.admin_notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RfqItem {
    pub id: i64,
    pub rfq_id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: i64,
    pub specifications: String,
}

impl From<RfqItemRow> for RfqItem {
    fn from(row: RfqItemRow) -> Self {
        Self {
            id: row.id,
            rfq_id: row.rfq_id,
            product_id: row.product_id,
            product_name: row.product_name,
            quantity: row.quantity,
            specifications: row.specifications,
        }
    }
}

/// Form metadata as shown in listings and used for submission handling.
#[derive(Debug, Clone, Serialize)]
pub struct Form {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub is_active: bool,
    pub allow_multiple_submissions: bool,
    /// Blank means no notification email is configured.
    pub email_notification: String,
    pub created_at: String,
}

impl From<FormRow> for Form {
    fn from(row: FormRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            slug: row.slug,
            description: row.description,
            is_active: row.is_active,
            allow_multiple_submissions: row.allow_multiple_submissions,
            email_notification: row.email_notification,
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HomePage {
    pub title: String,
    pub subtitle: String,
    pub hero_image: Option<String>,
    pub content: String,
    pub welcome_section: String,
}

impl From<HomePageRow> for HomePage {
    fn from(row: HomePageRow) -> Self {
        Self {
            title: row.title,
            subtitle: row.subtitle,
            hero_image: row.hero_image,
            content: row.content,
            welcome_section: row.welcome_section,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InformationPage {
    pub title: String,
    pub content: String,
    pub mission: String,
    pub vision: String,
    pub image: Option<String>,
}

impl From<InformationPageRow> for InformationPage {
    fn from(row: InformationPageRow) -> Self {
        Self {
            title: row.title,
            content: row.content,
            mission: row.mission,
            vision: row.vision,
            image: row.image,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactInfo {
    pub address: String,
    pub phone: String,
    pub email: String,
    pub whatsapp: String,
    pub working_hours: String,
    pub map_embed: String,
}

impl From<ContactInfoRow> for ContactInfo {
    fn from(row: ContactInfoRow) -> Self {
        Self {
            address: row.address,
            phone: row.phone,
            email: row.email,
            whatsapp: row.whatsapp,
            working_hours: row.working_hours,
            map_embed: row.map_embed,
        }
    }
}

// DTOs for creating entities

#[derive(Debug, Clone, Deserialize)]
pub struct CreateRfqRequest {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub address: String,
    pub subject: String,
    pub message: String,
    pub quantity: i64,
    pub product_id: Option<i64>,
    pub items: Vec<RfqItemInput>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RfqItemInput {
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: i64,
    pub specifications: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Fresh Produce"), "fresh-produce");
        assert_eq!(slugify("Auto Generated"), "auto-generated");
        assert_eq!(slugify("  spaced   out  "), "spaced-out");
        assert_eq!(slugify("Solar (2kW) Kit!"), "solar-2kw-kit");
        assert_eq!(slugify("Électronique"), "électronique");
    }

    #[test]
    fn test_rfq_status_round_trip() {
        for status in [
            RfqStatus::Pending,
            RfqStatus::InProgress,
            RfqStatus::Quoted,
            RfqStatus::Completed,
            RfqStatus::Cancelled,
        ] {
            assert_eq!(RfqStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(RfqStatus::parse("archived"), None);
    }
}

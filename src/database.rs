//! Database Infrastructure Layer
//!
//! Handles database connection, schema initialization, and provides
//! data access methods for the catalog (categories, products), services,
//! single-instance content pages and contact messages. The RFQ and
//! dynamic-form services keep their own queries but share the row types
//! defined here.

use std::{ops::Deref, str::FromStr};

use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use tracing::info;

use crate::models::slugify;

#[derive(Debug)]
pub enum DatabaseError {
    Connection(sqlx::Error),
    Query(sqlx::Error),
    InvalidData(String),
    NotFound(String),
}

impl std::fmt::Display for DatabaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DatabaseError::Connection(err) => write!(f, "Database connection error: {}", err),
            DatabaseError::Query(err) => write!(f, "Database query error: {}", err),
            DatabaseError::InvalidData(msg) => write!(f, "Invalid data: {}", msg),
            DatabaseError::NotFound(msg) => write!(f, "Not found: {}", msg),
        }
    }
}

impl std::error::Error for DatabaseError {}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        DatabaseError::Query(err)
    }
}

pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Database row for the categories table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub image: Option<String>,
    pub parent_id: Option<i64>,
    pub is_active: bool,
    pub sort_order: i64,
    pub created_at: String,
}

/// Database row for the products table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ProductRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub sku: String,
    pub category_id: Option<i64>,
    pub company: String,
    pub short_description: String,
    pub description: String,
    pub specifications: String,
    pub price: Option<f64>,
    pub image: Option<String>,
    pub in_stock: bool,
    pub stock_quantity: i64,
    pub is_active: bool,
    pub is_featured: bool,
    pub views: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Database row for the services table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ServiceRow {
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

/// Database row for service features
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ServiceFeatureRow {
    pub id: i64,
    pub service_id: i64,
    pub title: String,
    pub description: String,
    pub sort_order: i64,
}

/// Database row for RFQ requests
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RfqRequestRow {
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
    pub status: String,
    pub admin_notes: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Database row for RFQ line items
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct RfqItemRow {
    pub id: i64,
    pub rfq_id: i64,
    pub product_id: Option<i64>,
    pub product_name: String,
    pub quantity: i64,
    pub specifications: String,
}

/// Database row for the forms table
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FormRow {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub is_active: bool,
    pub allow_multiple_submissions: bool,
    pub email_notification: String,
    pub created_at: String,
}

/// Database row for form field definitions
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FormFieldRow {
    pub id: i64,
    pub form_id: i64,
    pub label: String,
    pub field_type: String,
    pub help_text: String,
    pub is_required: bool,
    pub sort_order: i64,
    pub choices: String,
    pub placeholder: String,
    pub pattern: String,
}

/// Database row for form submissions
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FormSubmissionRow {
    pub id: i64,
    pub form_id: i64,
    pub submitted_at: String,
    pub user_ip: Option<String>,
    pub user_agent: String,
}

/// Database row for individual submitted values
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FormSubmissionDataRow {
    pub id: i64,
    pub submission_id: i64,
    pub field_id: Option<i64>,
    pub field_label: String,
    pub value: String,
}

/// Single-instance home page content
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct HomePageRow {
    pub id: i64,
    pub title: String,
    pub subtitle: String,
    pub hero_image: Option<String>,
    pub content: String,
    pub welcome_section: String,
}

/// Single-instance information page content
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct InformationPageRow {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub mission: String,
    pub vision: String,
    pub image: Option<String>,
}

/// Single-instance contact information
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ContactInfoRow {
    pub id: i64,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub whatsapp: String,
    pub working_hours: String,
    pub map_embed: String,
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Deref for Database {
    type Target = SqlitePool;
    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let database_config = SqliteConnectOptions::from_str(database_url)
            .map_err(DatabaseError::Connection)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePool::connect_lazy_with(database_config);

        let db = Self { pool };
        db.initialize_tables().await?;

        info!("Database initialized at {}", database_url);
        Ok(db)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    async fn initialize_tables(&self) -> Result<()> {
        // Categories: a tree through parent_id. Deleting a category
        // removes its descendants with it.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS categories (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                image TEXT,
                parent_id INTEGER,
                is_active INTEGER NOT NULL DEFAULT 1,
                sort_order INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (parent_id) REFERENCES categories(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Products keep existing when their category goes away.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS products (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                sku TEXT NOT NULL UNIQUE,
                category_id INTEGER,
                company TEXT NOT NULL DEFAULT '',
                short_description TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                specifications TEXT NOT NULL DEFAULT '',
                price REAL,
                image TEXT,
                in_stock INTEGER NOT NULL DEFAULT 1,
                stock_quantity INTEGER NOT NULL DEFAULT 0,
                is_active INTEGER NOT NULL DEFAULT 1,
                is_featured INTEGER NOT NULL DEFAULT 0,
                views INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (category_id) REFERENCES categories(id) ON DELETE SET NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS services (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                short_description TEXT NOT NULL DEFAULT '',
                description TEXT NOT NULL DEFAULT '',
                icon TEXT NOT NULL DEFAULT '',
                image TEXT,
                is_active INTEGER NOT NULL DEFAULT 1,
                sort_order INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS service_features (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                service_id INTEGER NOT NULL,
                title TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                sort_order INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (service_id) REFERENCES services(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS rfq_requests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                phone TEXT NOT NULL,
                company TEXT NOT NULL DEFAULT '',
                address TEXT NOT NULL DEFAULT '',
                subject TEXT NOT NULL DEFAULT '',
                message TEXT NOT NULL,
                quantity INTEGER NOT NULL DEFAULT 1,
                product_id INTEGER,
                status TEXT NOT NULL DEFAULT 'pending',
                admin_notes TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                updated_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                FOREIGN KEY (product_id) REFERENCES products(id) ON DELETE SET NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS rfq_items (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                rfq_id INTEGER NOT NULL,
                product_id INTEGER,
                product_name TEXT NOT NULL DEFAULT '',
                quantity INTEGER NOT NULL DEFAULT 1,
                specifications TEXT NOT NULL DEFAULT '',
                FOREIGN KEY (rfq_id) REFERENCES rfq_requests(id) ON DELETE CASCADE,
                FOREIGN KEY (product_id) REFERENCES products(id) ON DELETE SET NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS forms (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL,
                slug TEXT NOT NULL UNIQUE,
                description TEXT NOT NULL DEFAULT '',
                is_active INTEGER NOT NULL DEFAULT 1,
                allow_multiple_submissions INTEGER NOT NULL DEFAULT 1,
                email_notification TEXT NOT NULL DEFAULT '',
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS form_fields (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                form_id INTEGER NOT NULL,
                label TEXT NOT NULL,
                field_type TEXT NOT NULL,
                help_text TEXT NOT NULL DEFAULT '',
                is_required INTEGER NOT NULL DEFAULT 1,
                sort_order INTEGER NOT NULL DEFAULT 0,
                choices TEXT NOT NULL DEFAULT '',
                placeholder TEXT NOT NULL DEFAULT '',
                pattern TEXT NOT NULL DEFAULT '',
                UNIQUE(form_id, label),
                FOREIGN KEY (form_id) REFERENCES forms(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS form_submissions (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                form_id INTEGER NOT NULL,
                submitted_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
                user_ip TEXT,
                user_agent TEXT NOT NULL DEFAULT '',
                FOREIGN KEY (form_id) REFERENCES forms(id) ON DELETE CASCADE
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // field_label is denormalized so submissions stay readable after
        // a field definition is deleted.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS form_submission_data (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                submission_id INTEGER NOT NULL,
                field_id INTEGER,
                field_label TEXT NOT NULL,
                value TEXT NOT NULL DEFAULT '',
                FOREIGN KEY (submission_id) REFERENCES form_submissions(id) ON DELETE CASCADE,
                FOREIGN KEY (field_id) REFERENCES form_fields(id) ON DELETE SET NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Single-instance content pages: at most one row, id forced to 1.
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS home_page (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                title TEXT NOT NULL DEFAULT '',
                subtitle TEXT NOT NULL DEFAULT '',
                hero_image TEXT,
                content TEXT NOT NULL DEFAULT '',
                welcome_section TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS information_page (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                title TEXT NOT NULL DEFAULT 'About Us',
                content TEXT NOT NULL DEFAULT '',
                mission TEXT NOT NULL DEFAULT '',
                vision TEXT NOT NULL DEFAULT '',
                image TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS contact_info (
                id INTEGER PRIMARY KEY CHECK (id = 1),
                address TEXT NOT NULL DEFAULT '',
                phone TEXT NOT NULL DEFAULT '',
                email TEXT NOT NULL DEFAULT '',
                whatsapp TEXT NOT NULL DEFAULT '',
                working_hours TEXT NOT NULL DEFAULT '',
                map_embed TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS contact_messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL,
                subject TEXT NOT NULL DEFAULT '',
                message TEXT NOT NULL,
                created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        // Indexes for the hot lookups
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_categories_parent_id ON categories(parent_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_category_id ON products(category_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_products_created_at ON products(created_at)")
            .execute(&self.pool)
            .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_form_fields_form_id ON form_fields(form_id)",
        )
        .execute(&self.pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_rfq_requests_status ON rfq_requests(status)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    // ========== Category Operations ==========

    pub async fn list_categories(&self, active_only: bool) -> Result<Vec<CategoryRow>> {
        let sql = if active_only {
            "SELECT * FROM categories WHERE is_active = 1 ORDER BY sort_order, name"
        } else {
            "SELECT * FROM categories ORDER BY sort_order, name"
        };
        sqlx::query_as::<_, CategoryRow>(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    pub async fn get_category_by_slug(&self, slug: &str) -> Result<CategoryRow> {
        sqlx::query_as::<_, CategoryRow>("SELECT * FROM categories WHERE slug = ?")
            .bind(slug)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    DatabaseError::NotFound(format!("Category '{}' not found", slug))
                }
                e => DatabaseError::Query(e),
            })
    }

    pub async fn create_category(
        &self,
        name: &str,
        slug: Option<&str>,
        description: &str,
        parent_id: Option<i64>,
        sort_order: i64,
    ) -> Result<i64> {
        if let Some(parent_id) = parent_id {
            self.ensure_category_exists(parent_id).await?;
        }

        let slug = match slug {
            Some(s) => s.to_string(),
            None => slugify(name),
        };

        let result = sqlx::query(
            r#"
            INSERT INTO categories (name, slug, description, parent_id, sort_order)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(&slug)
        .bind(description)
        .bind(parent_id)
        .bind(sort_order)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Reparent a category. Rejected when the new parent is the category
    /// itself or one of its descendants, which would close a loop in the
    /// parent graph. This is the write-time guard the read-side tree
    /// builder relies on.
    pub async fn set_category_parent(&self, id: i64, parent_id: Option<i64>) -> Result<()> {
        self.ensure_category_exists(id).await?;

        if let Some(parent_id) = parent_id {
            if parent_id == id {
                return Err(DatabaseError::InvalidData(
                    "a category cannot be its own parent".to_string(),
                ));
            }
            self.ensure_category_exists(parent_id).await?;

            let categories = self.list_categories(false).await?;
            let total = categories.len();
            let mut current = Some(parent_id);
            let mut steps = 0;
            while let Some(cursor) = current {
                if cursor == id {
                    return Err(DatabaseError::InvalidData(
                        "a category cannot be moved under its own descendant".to_string(),
                    ));
                }
                steps += 1;
                if steps > total {
                    return Err(DatabaseError::InvalidData(
                        "category parent chain contains a cycle".to_string(),
                    ));
                }
                current = categories
                    .iter()
                    .find(|c| c.id == cursor)
                    .and_then(|c| c.parent_id);
            }
        }

        sqlx::query("UPDATE categories SET parent_id = ? WHERE id = ?")
            .bind(parent_id)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Removes the category and, through the schema's cascade, its
    /// descendants. Products referencing any removed category get their
    /// category cleared instead of being deleted.
    pub async fn delete_category(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(DatabaseError::NotFound(format!(
                "Category with id {} not found",
                id
            )));
        }
        Ok(())
    }

    async fn ensure_category_exists(&self, id: i64) -> Result<()> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        match found {
            Some(_) => Ok(()),
            None => Err(DatabaseError::NotFound(format!(
                "Category with id {} not found",
                id
            ))),
        }
    }

    // ========== Product Operations ==========

    pub async fn list_products(&self, active_only: bool) -> Result<Vec<ProductRow>> {
        let sql = if active_only {
            "SELECT * FROM products WHERE is_active = 1 ORDER BY created_at DESC, id DESC"
        } else {
            "SELECT * FROM products ORDER BY created_at DESC, id DESC"
        };
        sqlx::query_as::<_, ProductRow>(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    pub async fn get_product_by_slug(&self, slug: &str) -> Result<ProductRow> {
        sqlx::query_as::<_, ProductRow>(
            "SELECT * FROM products WHERE slug = ? AND is_active = 1",
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                DatabaseError::NotFound(format!("Product '{}' not found", slug))
            }
            e => DatabaseError::Query(e),
        })
    }

    pub async fn get_product_by_id(&self, id: i64) -> Result<ProductRow> {
        sqlx::query_as::<_, ProductRow>("SELECT * FROM products WHERE id = ? AND is_active = 1")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    DatabaseError::NotFound(format!("Product with id {} not found", id))
                }
                e => DatabaseError::Query(e),
            })
    }

    pub async fn list_featured_products(&self, limit: i64) -> Result<Vec<ProductRow>> {
        sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT * FROM products
            WHERE is_active = 1 AND is_featured = 1
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    pub async fn related_products(
        &self,
        category_id: Option<i64>,
        exclude_id: i64,
        limit: i64,
    ) -> Result<Vec<ProductRow>> {
        let Some(category_id) = category_id else {
            return Ok(Vec::new());
        };
        sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT * FROM products
            WHERE category_id = ? AND is_active = 1 AND id != ?
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(category_id)
        .bind(exclude_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    /// Autocomplete lookup over product name and SKU.
    pub async fn search_products_brief(&self, query: &str, limit: i64) -> Result<Vec<ProductRow>> {
        let needle = format!("%{}%", query);
        sqlx::query_as::<_, ProductRow>(
            r#"
            SELECT * FROM products
            WHERE is_active = 1
              AND (name LIKE ? COLLATE NOCASE OR sku LIKE ? COLLATE NOCASE)
            ORDER BY created_at DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(&needle)
        .bind(&needle)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    pub async fn increment_product_views(&self, id: i64) -> Result<()> {
        sqlx::query("UPDATE products SET views = views + 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn create_product(
        &self,
        name: &str,
        slug: Option<&str>,
        sku: &str,
        category_id: Option<i64>,
        short_description: &str,
        description: &str,
        price: Option<f64>,
        is_featured: bool,
    ) -> Result<i64> {
        if let Some(category_id) = category_id {
            self.ensure_category_exists(category_id).await?;
        }
        let slug = match slug {
            Some(s) => s.to_string(),
            None => slugify(name),
        };
        let result = sqlx::query(
            r#"
            INSERT INTO products
                (name, slug, sku, category_id, short_description, description, price, is_featured)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(&slug)
        .bind(sku)
        .bind(category_id)
        .bind(short_description)
        .bind(description)
        .bind(price)
        .bind(is_featured)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    // ========== Service Operations ==========

    pub async fn list_services(&self, active_only: bool) -> Result<Vec<ServiceRow>> {
        let sql = if active_only {
            "SELECT * FROM services WHERE is_active = 1 ORDER BY sort_order, title"
        } else {
            "SELECT * FROM services ORDER BY sort_order, title"
        };
        sqlx::query_as::<_, ServiceRow>(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    pub async fn get_service_by_slug(&self, slug: &str) -> Result<ServiceRow> {
        sqlx::query_as::<_, ServiceRow>(
            "SELECT * FROM services WHERE slug = ? AND is_active = 1",
        )
        .bind(slug)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                DatabaseError::NotFound(format!("Service '{}' not found", slug))
            }
            e => DatabaseError::Query(e),
        })
    }

    pub async fn list_service_features(&self, service_id: i64) -> Result<Vec<ServiceFeatureRow>> {
        sqlx::query_as::<_, ServiceFeatureRow>(
            "SELECT * FROM service_features WHERE service_id = ? ORDER BY sort_order, id",
        )
        .bind(service_id)
        .fetch_all(&self.pool)
        .await
        .map_err(DatabaseError::Query)
    }

    pub async fn create_service(
        &self,
        title: &str,
        slug: Option<&str>,
        short_description: &str,
        description: &str,
        sort_order: i64,
    ) -> Result<i64> {
        let slug = match slug {
            Some(s) => s.to_string(),
            None => slugify(title),
        };
        let result = sqlx::query(
            r#"
            INSERT INTO services (title, slug, short_description, description, sort_order)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(title)
        .bind(&slug)
        .bind(short_description)
        .bind(description)
        .bind(sort_order)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    pub async fn add_service_feature(
        &self,
        service_id: i64,
        title: &str,
        description: &str,
        sort_order: i64,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO service_features (service_id, title, description, sort_order)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(service_id)
        .bind(title)
        .bind(description)
        .bind(sort_order)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }

    // ========== Single-Instance Pages ==========
    //
    // Fetched-or-created on demand: the table holds at most one row with
    // id 1, inserted with defaults on first read.

    pub async fn home_page(&self) -> Result<HomePageRow> {
        sqlx::query("INSERT OR IGNORE INTO home_page (id, title) VALUES (1, 'Welcome')")
            .execute(&self.pool)
            .await?;
        sqlx::query_as::<_, HomePageRow>("SELECT * FROM home_page WHERE id = 1")
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    pub async fn information_page(&self) -> Result<InformationPageRow> {
        sqlx::query("INSERT OR IGNORE INTO information_page (id) VALUES (1)")
            .execute(&self.pool)
            .await?;
        sqlx::query_as::<_, InformationPageRow>("SELECT * FROM information_page WHERE id = 1")
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    pub async fn contact_info(&self) -> Result<ContactInfoRow> {
        sqlx::query("INSERT OR IGNORE INTO contact_info (id) VALUES (1)")
            .execute(&self.pool)
            .await?;
        sqlx::query_as::<_, ContactInfoRow>("SELECT * FROM contact_info WHERE id = 1")
            .fetch_one(&self.pool)
            .await
            .map_err(DatabaseError::Query)
    }

    // ========== Contact Messages ==========

    pub async fn insert_contact_message(
        &self,
        name: &str,
        email: &str,
        subject: &str,
        message: &str,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO contact_messages (name, email, subject, message)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(name)
        .bind(email)
        .bind(subject)
        .bind(message)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }
}

#[cfg(test)]
pub(crate) async fn test_database() -> Database {
    use sqlx::sqlite::SqlitePoolOptions;

    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);
    // A single connection keeps every query on the same in-memory db.
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_lazy_with(options);
    let db = Database { pool };
    db.initialize_tables().await.unwrap();
    db
}

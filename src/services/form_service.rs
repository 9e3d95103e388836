//! Dynamic forms: loads stored field definitions into a `dynforms`
//! schema, validates submissions against it, and persists accepted
//! answers with per-field label snapshots.

use std::collections::HashMap;

use dynforms::{validate, FieldKind, FieldSpec, FormSchema, ValidationErrors};

use super::{Result, ServiceError};
use crate::database::{Database, DatabaseError, FormFieldRow, FormRow, FormSubmissionDataRow};
use crate::models::Form;
use crate::notify::Notifier;

#[derive(Clone)]
pub struct FormService {
    db: Database,
    notifier: Notifier,
}

/// Outcome of a submission attempt. Validation failures are part of the
/// normal flow (the page re-renders with the errors), not a
/// `ServiceError`.
#[derive(Debug)]
pub enum SubmitOutcome {
    Accepted { submission_id: i64 },
    Rejected(ValidationErrors),
}

pub struct SubmissionContext {
    pub user_ip: Option<String>,
    pub user_agent: String,
}

impl FormService {
    pub fn new(db: Database, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    pub async fn list_active(&self) -> Result<Vec<Form>> {
        let rows = sqlx::query_as::<_, FormRow>(
            "SELECT * FROM forms WHERE is_active = 1 ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(self.db.pool())
        .await
        .map_err(DatabaseError::Query)?;
        Ok(rows.into_iter().map(Form::from).collect())
    }

    /// Load a form and its field definitions as a typed schema. Unknown
    /// or inactive slugs are not found; a stored field with an unknown
    /// kind means the definition rows are corrupt.
    pub async fn schema(&self, slug: &str) -> Result<(Form, FormSchema)> {
        let row = sqlx::query_as::<_, FormRow>(
            "SELECT * FROM forms WHERE slug = ? AND is_active = 1",
        )
        .bind(slug)
        .fetch_one(self.db.pool())
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                DatabaseError::NotFound(format!("Form '{}' not found", slug))
            }
            e => DatabaseError::Query(e),
        })?;

        let field_rows = sqlx::query_as::<_, FormFieldRow>(
            "SELECT * FROM form_fields WHERE form_id = ? ORDER BY sort_order, id",
        )
        .bind(row.id)
        .fetch_all(self.db.pool())
        .await
        .map_err(DatabaseError::Query)?;

        let mut fields = Vec::with_capacity(field_rows.len());
        for field in field_rows {
            let kind = FieldKind::parse(&field.field_type).ok_or_else(|| {
                DatabaseError::InvalidData(format!(
                    "form '{}' field '{}' has unknown type '{}'",
                    slug, field.label, field.field_type
                ))
            })?;
            fields.push(FieldSpec {
                label: field.label,
                kind,
                help_text: field.help_text,
                required: field.is_required,
                sort_order: field.sort_order,
                choices: FieldSpec::parse_choices(&field.choices),
                placeholder: field.placeholder,
                pattern: field.pattern,
            });
        }

        let form = Form::from(row);
        let schema = FormSchema::new(&form.title, &form.slug, &form.description, fields);
        Ok((form, schema))
    }

    /// Validate and store a submission. Accepted values are persisted
    /// with the field label denormalized, and a copy is mailed to the
    /// form's configured recipient.
    pub async fn submit(
        &self,
        slug: &str,
        values: &HashMap<String, String>,
        context: SubmissionContext,
    ) -> Result<SubmitOutcome> {
        let (form, schema) = self.schema(slug).await?;

        let cleaned = match validate(&schema, values) {
            Ok(cleaned) => cleaned,
            Err(errors) => return Ok(SubmitOutcome::Rejected(errors)),
        };

        // The submission row and its values land together or not at all.
        let mut tx = self.db.pool().begin().await.map_err(DatabaseError::Query)?;

        let result = sqlx::query(
            "INSERT INTO form_submissions (form_id, user_ip, user_agent) VALUES (?, ?, ?)",
        )
        .bind(form.id)
        .bind(&context.user_ip)
        .bind(&context.user_agent)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::Query)?;
        let submission_id = result.last_insert_rowid();

        for value in &cleaned {
            let field_id: Option<i64> = sqlx::query_scalar(
                "SELECT id FROM form_fields WHERE form_id = ? AND label = ?",
            )
            .bind(form.id)
            .bind(&value.label)
            .fetch_optional(&mut *tx)
            .await
            .map_err(DatabaseError::Query)?;

            sqlx::query(
                r#"
                INSERT INTO form_submission_data (submission_id, field_id, field_label, value)
                VALUES (?, ?, ?, ?)
                "#,
            )
            .bind(submission_id)
            .bind(field_id)
            .bind(&value.label)
            .bind(&value.value)
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::Query)?;
        }

        tx.commit().await.map_err(DatabaseError::Query)?;

        if !form.email_notification.is_empty() {
            self.notifier
                .form_submission(&form.email_notification, &form.title, &cleaned);
        }

        tracing::info!(form = form.slug.as_str(), submission_id, "form submitted");
        Ok(SubmitOutcome::Accepted { submission_id })
    }

    pub async fn submission_values(&self, submission_id: i64) -> Result<Vec<FormSubmissionDataRow>> {
        sqlx::query_as::<_, FormSubmissionDataRow>(
            "SELECT * FROM form_submission_data WHERE submission_id = ? ORDER BY id",
        )
        .bind(submission_id)
        .fetch_all(self.db.pool())
        .await
        .map_err(|e| ServiceError::Database(DatabaseError::Query(e)))
    }

    // Admin-side definition writes, used to seed forms.

    pub async fn create_form(
        &self,
        title: &str,
        slug: Option<&str>,
        description: &str,
        email_notification: &str,
    ) -> Result<i64> {
        let slug = match slug {
            Some(s) => s.to_string(),
            None => crate::models::slugify(title),
        };
        let result = sqlx::query(
            r#"
            INSERT INTO forms (title, slug, description, email_notification)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(title)
        .bind(&slug)
        .bind(description)
        .bind(email_notification)
        .execute(self.db.pool())
        .await
        .map_err(DatabaseError::Query)?;
        Ok(result.last_insert_rowid())
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn add_field(
        &self,
        form_id: i64,
        label: &str,
        kind: FieldKind,
        required: bool,
        sort_order: i64,
        choices: &str,
        pattern: &str,
    ) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO form_fields
                (form_id, label, field_type, is_required, sort_order, choices, pattern)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(form_id)
        .bind(label)
        .bind(kind.as_str())
        .bind(required)
        .bind(sort_order)
        .bind(choices)
        .bind(pattern)
        .execute(self.db.pool())
        .await
        .map_err(DatabaseError::Query)?;
        Ok(result.last_insert_rowid())
    }
}

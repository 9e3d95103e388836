//! RFQ handling: validates and stores quotation requests, keeps their
//! status lifecycle, and triggers the customer/admin notifications.

use super::{Result, ServiceError};
use crate::database::{Database, DatabaseError, RfqItemRow, RfqRequestRow};
use crate::models::{CreateRfqRequest, RfqItem, RfqRequest, RfqStatus};
use crate::notify::Notifier;

#[derive(Clone)]
pub struct RfqService {
    db: Database,
    notifier: Notifier,
}

impl RfqService {
    pub fn new(db: Database, notifier: Notifier) -> Self {
        Self { db, notifier }
    }

    /// Store a new quotation request and send the confirmation and admin
    /// alert. Returns the new request id.
    pub async fn create(&self, request: CreateRfqRequest) -> Result<i64> {
        if request.name.trim().is_empty() {
            return Err(ServiceError::Invalid("name is required".to_string()));
        }
        if request.email.trim().is_empty() || !request.email.contains('@') {
            return Err(ServiceError::Invalid(
                "a valid email address is required".to_string(),
            ));
        }
        if request.phone.trim().is_empty() {
            return Err(ServiceError::Invalid("phone is required".to_string()));
        }
        if request.message.trim().is_empty() {
            return Err(ServiceError::Invalid("message is required".to_string()));
        }
        if request.quantity < 1 {
            return Err(ServiceError::Invalid(
                "quantity must be at least 1".to_string(),
            ));
        }

        // A product-specific RFQ must point at a product customers can see.
        let product_name = match request.product_id {
            Some(product_id) => Some(self.db.get_product_by_id(product_id).await?.name),
            None => None,
        };

        // The request and its line items land together or not at all.
        let mut tx = self.db.pool().begin().await.map_err(DatabaseError::Query)?;

        let result = sqlx::query(
            r#"
            INSERT INTO rfq_requests
                (name, email, phone, company, address, subject, message, quantity, product_id)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(request.name.trim())
        .bind(request.email.trim())
        .bind(request.phone.trim())
        .bind(request.company.trim())
        .bind(request.address.trim())
        .bind(request.subject.trim())
        .bind(request.message.trim())
        .bind(request.quantity)
        .bind(request.product_id)
        .execute(&mut *tx)
        .await
        .map_err(DatabaseError::Query)?;

        let rfq_id = result.last_insert_rowid();

        for item in &request.items {
            sqlx::query(
                r#"
                INSERT INTO rfq_items (rfq_id, product_id, product_name, quantity, specifications)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(rfq_id)
            .bind(item.product_id)
            .bind(item.product_name.trim())
            .bind(item.quantity.max(1))
            .bind(item.specifications.trim())
            .execute(&mut *tx)
            .await
            .map_err(DatabaseError::Query)?;
        }

        tx.commit().await.map_err(DatabaseError::Query)?;

        let rfq = self.get(rfq_id).await?;
        self.notifier.rfq_received(&rfq);
        self.notifier.rfq_admin_alert(&rfq, product_name.as_deref());

        tracing::info!(rfq_id, customer = rfq.email.as_str(), "RFQ submitted");
        Ok(rfq_id)
    }

    pub async fn get(&self, id: i64) -> Result<RfqRequest> {
        let row = sqlx::query_as::<_, RfqRequestRow>("SELECT * FROM rfq_requests WHERE id = ?")
            .bind(id)
            .fetch_one(self.db.pool())
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    DatabaseError::NotFound(format!("RFQ #{} not found", id))
                }
                e => DatabaseError::Query(e),
            })?;
        Ok(RfqRequest::from(row))
    }

    pub async fn items(&self, rfq_id: i64) -> Result<Vec<RfqItem>> {
        let rows = sqlx::query_as::<_, RfqItemRow>(
            "SELECT * FROM rfq_items WHERE rfq_id = ? ORDER BY id",
        )
        .bind(rfq_id)
        .fetch_all(self.db.pool())
        .await
        .map_err(DatabaseError::Query)?;
        Ok(rows.into_iter().map(RfqItem::from).collect())
    }

    /// Move a request through its lifecycle. The customer is notified
    /// only when the status actually changes.
    pub async fn update_status(
        &self,
        id: i64,
        status: RfqStatus,
        admin_notes: Option<&str>,
    ) -> Result<()> {
        let previous = self.get(id).await?;

        sqlx::query(
            r#"
            UPDATE rfq_requests
            SET status = ?, admin_notes = COALESCE(?, admin_notes), updated_at = CURRENT_TIMESTAMP
            WHERE id = ?
            "#,
        )
        .bind(status.as_str())
        .bind(admin_notes)
        .bind(id)
        .execute(self.db.pool())
        .await
        .map_err(DatabaseError::Query)?;

        if previous.status != status {
            let updated = self.get(id).await?;
            self.notifier.rfq_status_changed(&updated);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::database::test_database;
    use crate::models::RfqItemInput;

    fn request() -> CreateRfqRequest {
        CreateRfqRequest {
            name: "Dana".to_string(),
            email: "dana@example.com".to_string(),
            phone: "+15550001".to_string(),
            company: String::new(),
            address: String::new(),
            subject: "Bulk order".to_string(),
            message: "Need 40 units".to_string(),
            quantity: 40,
            product_id: None,
            items: Vec::new(),
        }
    }

    async fn service() -> RfqService {
        let db = test_database().await;
        RfqService::new(db, Notifier::new(&Config::default()))
    }

    #[tokio::test]
    async fn test_create_and_fetch() {
        let service = service().await;
        let id = service.create(request()).await.unwrap();
        let rfq = service.get(id).await.unwrap();
        assert_eq!(rfq.name, "Dana");
        assert_eq!(rfq.status, RfqStatus::Pending);
    }

    #[tokio::test]
    async fn test_create_rejects_blank_required_fields() {
        let service = service().await;
        let mut bad = request();
        bad.email = "not-an-email".to_string();
        assert!(matches!(
            service.create(bad).await.unwrap_err(),
            ServiceError::Invalid(_)
        ));

        let mut bad = request();
        bad.message = "   ".to_string();
        assert!(matches!(
            service.create(bad).await.unwrap_err(),
            ServiceError::Invalid(_)
        ));
    }

    #[tokio::test]
    async fn test_create_for_unknown_product_is_not_found() {
        let service = service().await;
        let mut req = request();
        req.product_id = Some(999);
        let err = service.create(req).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_items_are_stored_with_the_request() {
        let service = service().await;
        let mut req = request();
        req.items = vec![RfqItemInput {
            product_id: None,
            product_name: "Custom bracket".to_string(),
            quantity: 12,
            specifications: "Stainless".to_string(),
        }];
        let id = service.create(req).await.unwrap();
        let items = service.items(id).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].product_name, "Custom bracket");
        assert_eq!(items[0].quantity, 12);
    }

    #[tokio::test]
    async fn test_failed_item_write_rolls_back_the_request() {
        let service = service().await;
        let mut req = request();
        // The item references a product that does not exist, so its
        // insert trips the foreign key after the parent row is written.
        req.items = vec![RfqItemInput {
            product_id: Some(999),
            product_name: "Ghost".to_string(),
            quantity: 1,
            specifications: String::new(),
        }];

        assert!(service.create(req).await.is_err());

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM rfq_requests")
            .fetch_one(service.db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_status_transitions_persist() {
        let service = service().await;
        let id = service.create(request()).await.unwrap();
        service
            .update_status(id, RfqStatus::Quoted, Some("Quoted at list price"))
            .await
            .unwrap();
        let rfq = service.get(id).await.unwrap();
        assert_eq!(rfq.status, RfqStatus::Quoted);
        assert_eq!(rfq.admin_notes, "Quoted at list price");
    }
}

//! Database repository for cash-register entries.
//!
//! Saving an entry also reconciles it against the application book: the
//! received amount is credited to the newest application for the same
//! vehicle in the same branch. Insert and credit happen in one transaction
//! so the ledger never shows an entry whose credit was lost.

use crate::db::{
    errors::Result,
    handlers::applications::Applications,
    models::cash_register::{CashEntryCreateDBRequest, CashEntryDBResponse, CashEntrySaveDBResponse},
};
use crate::types::{BranchId, CashEntryId, abbrev_uuid};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{Connection, PgConnection};
use tracing::instrument;
use uuid::Uuid;

/// Filter for listing cash entries
#[derive(Debug, Clone, Default)]
pub struct CashEntryFilter {
    /// None lists across all branches
    pub branch_id: Option<BranchId>,
    pub entry_date: Option<NaiveDate>,
    pub skip: i64,
    pub limit: i64,
}

const CASH_ENTRY_COLUMNS: &str = "id, entry_date, vehicle_number, customer_name, purpose, fees, cash_received, \
     payment_mode_id, bank_account_id, remarks, branch_id, created_by, created_at";

pub struct CashRegister<'c> {
    db: &'c mut PgConnection,
}

impl<'c> CashRegister<'c> {
    pub fn new(db: &'c mut PgConnection) -> Self {
        Self { db }
    }

    /// Insert an entry and credit its amount against the matching
    /// application, atomically.
    #[instrument(skip(self, request), fields(vehicle_number = %request.vehicle_number), err)]
    pub async fn save(&mut self, request: &CashEntryCreateDBRequest) -> Result<CashEntrySaveDBResponse> {
        let mut tx = self.db.begin().await?;

        let entry = sqlx::query_as::<_, CashEntryDBResponse>(&format!(
            "INSERT INTO cash_register (id, entry_date, vehicle_number, customer_name, purpose, fees, \
                 cash_received, payment_mode_id, bank_account_id, remarks, branch_id, created_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) \
             RETURNING {CASH_ENTRY_COLUMNS}"
        ))
        .bind(Uuid::new_v4())
        .bind(request.entry_date)
        .bind(&request.vehicle_number)
        .bind(&request.customer_name)
        .bind(&request.purpose)
        .bind(request.fees)
        .bind(request.cash_received)
        .bind(request.payment_mode_id)
        .bind(request.bank_account_id)
        .bind(&request.remarks)
        .bind(request.branch_id)
        .bind(request.created_by)
        .fetch_one(&mut *tx)
        .await?;

        let credited_application_id = if request.cash_received > Decimal::ZERO {
            Applications::new(&mut tx)
                .credit_advance(&request.vehicle_number, request.branch_id, request.cash_received)
                .await?
        } else {
            None
        };

        tx.commit().await?;
        Ok(CashEntrySaveDBResponse {
            entry,
            credited_application_id,
        })
    }

    #[instrument(skip(self), fields(entry_id = %abbrev_uuid(&id)), err)]
    pub async fn get_by_id(&mut self, id: CashEntryId) -> Result<Option<CashEntryDBResponse>> {
        let entry = sqlx::query_as::<_, CashEntryDBResponse>(&format!(
            "SELECT {CASH_ENTRY_COLUMNS} FROM cash_register WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *self.db)
        .await?;
        Ok(entry)
    }

    #[instrument(skip(self, filter), err)]
    pub async fn list(&mut self, filter: &CashEntryFilter) -> Result<Vec<CashEntryDBResponse>> {
        let entries = sqlx::query_as::<_, CashEntryDBResponse>(&format!(
            "SELECT {CASH_ENTRY_COLUMNS} FROM cash_register \
             WHERE ($1::uuid IS NULL OR branch_id = $1) \
               AND ($2::date IS NULL OR entry_date = $2) \
             ORDER BY created_at DESC, id DESC \
             OFFSET $3 LIMIT $4"
        ))
        .bind(filter.branch_id)
        .bind(filter.entry_date)
        .bind(filter.skip)
        .bind(filter.limit)
        .fetch_all(&mut *self.db)
        .await?;
        Ok(entries)
    }

    #[instrument(skip(self), fields(entry_id = %abbrev_uuid(&id)), err)]
    pub async fn delete(&mut self, id: CashEntryId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM cash_register WHERE id = $1")
            .bind(id)
            .execute(&mut *self.db)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Cash received today, optionally scoped to a branch. The UTC calendar
    /// day, independent of the session timezone.
    pub async fn total_received_today(&mut self, branch_id: Option<BranchId>) -> Result<Decimal> {
        let total: Decimal = sqlx::query_scalar(
            "SELECT COALESCE(SUM(cash_received), 0) FROM cash_register \
             WHERE entry_date = (NOW() AT TIME ZONE 'UTC')::date \
               AND ($1::uuid IS NULL OR branch_id = $1)",
        )
        .bind(branch_id)
        .fetch_one(&mut *self.db)
        .await?;
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::applications::{ApplicationCreate, VehicleKind};
    use crate::db::models::applications::ApplicationCreateDBRequest;
    use chrono::Utc;
    use sqlx::PgPool;

    fn cash_request(vehicle: &str, received: Decimal, branch_id: BranchId) -> CashEntryCreateDBRequest {
        CashEntryCreateDBRequest {
            entry_date: Utc::now().date_naive(),
            vehicle_number: vehicle.to_string(),
            customer_name: Some("N. Kumar".to_string()),
            purpose: Some("Tax payment".to_string()),
            fees: Decimal::new(10000, 2),
            cash_received: received,
            payment_mode_id: None,
            bank_account_id: None,
            remarks: None,
            branch_id,
            created_by: Uuid::new_v4(),
        }
    }

    async fn seed_application(conn: &mut PgConnection, vehicle: &str, branch_id: BranchId) -> crate::types::ApplicationId {
        let api = ApplicationCreate {
            vehicle_number: vehicle.to_string(),
            chassis_no: None,
            application_no: None,
            service_date: None,
            agent_id: None,
            contact_no: None,
            mvd_office_id: None,
            vehicle_class_id: None,
            status_id: None,
            rto_service_id: None,
            vehicle_kind: VehicleKind::Ntv,
            cf_expiry_date: None,
            tax_exp_date: None,
            permit_exp_date: None,
            service_fee: Decimal::ZERO,
            advance: Decimal::ZERO,
            vahan_fee: Decimal::ZERO,
            office_exp: Decimal::ZERO,
            payment_mode_id: None,
            payment_date: None,
            branch_id: None,
        };
        let request = ApplicationCreateDBRequest::from_api(api, branch_id, Uuid::new_v4());
        Applications::new(conn).create(&request).await.unwrap().id
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_save_credits_matching_application(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let branch = Uuid::new_v4();
        let application_id = seed_application(&mut conn, "KL-01-AB-1234", branch).await;

        let mut cash = CashRegister::new(&mut conn);
        let saved = cash
            .save(&cash_request("KL-01-AB-1234", Decimal::new(50000, 2), branch))
            .await
            .unwrap();
        assert_eq!(saved.credited_application_id, Some(application_id));

        let application = Applications::new(&mut conn)
            .get_by_id(application_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(application.advance, Decimal::new(50000, 2));
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_save_without_matching_application(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let branch = Uuid::new_v4();

        let mut cash = CashRegister::new(&mut conn);
        let saved = cash
            .save(&cash_request("KL-99-XX-0000", Decimal::new(50000, 2), branch))
            .await
            .unwrap();
        // Entry persists even with nothing to credit
        assert_eq!(saved.credited_application_id, None);
        assert!(cash.get_by_id(saved.entry.id).await.unwrap().is_some());
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_save_respects_branch_boundary(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let branch_a = Uuid::new_v4();
        let branch_b = Uuid::new_v4();
        let application_id = seed_application(&mut conn, "KL-01-AB-1234", branch_a).await;

        let mut cash = CashRegister::new(&mut conn);
        let saved = cash
            .save(&cash_request("KL-01-AB-1234", Decimal::new(50000, 2), branch_b))
            .await
            .unwrap();
        assert_eq!(saved.credited_application_id, None);

        let application = Applications::new(&mut conn)
            .get_by_id(application_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(application.advance, Decimal::ZERO);
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_zero_received_skips_credit(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let branch = Uuid::new_v4();
        seed_application(&mut conn, "KL-01-AB-1234", branch).await;

        let mut cash = CashRegister::new(&mut conn);
        let saved = cash
            .save(&cash_request("KL-01-AB-1234", Decimal::ZERO, branch))
            .await
            .unwrap();
        assert_eq!(saved.credited_application_id, None);
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_concurrent_saves_accumulate_exactly(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let branch = Uuid::new_v4();
        let application_id = seed_application(&mut conn, "KL-01-AB-1234", branch).await;
        drop(conn);

        // Each save runs in its own transaction on its own connection
        let mut handles = Vec::new();
        for _ in 0..4 {
            let pool = pool.clone();
            handles.push(tokio::spawn(async move {
                let mut conn = pool.acquire().await.unwrap();
                CashRegister::new(&mut conn)
                    .save(&cash_request("KL-01-AB-1234", Decimal::new(12500, 2), branch))
                    .await
                    .unwrap()
            }));
        }
        for handle in handles {
            let saved = handle.await.unwrap();
            assert_eq!(saved.credited_application_id, Some(application_id));
        }

        let mut conn = pool.acquire().await.unwrap();
        let application = Applications::new(&mut conn)
            .get_by_id(application_id)
            .await
            .unwrap()
            .unwrap();
        // 4 x 125.00, no increment lost
        assert_eq!(application.advance, Decimal::new(50000, 2));
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_todays_total_uses_utc_calendar_day(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let branch = Uuid::new_v4();
        CashRegister::new(&mut conn)
            .save(&cash_request("KL-01-AB-1234", Decimal::new(30000, 2), branch))
            .await
            .unwrap();

        for tz in ["UTC", "Pacific/Kiritimati", "Pacific/Pago_Pago"] {
            sqlx::query(&format!("SET TIME ZONE '{tz}'")).execute(&mut *conn).await.unwrap();
            let total = CashRegister::new(&mut conn).total_received_today(Some(branch)).await.unwrap();
            assert_eq!(total, Decimal::new(30000, 2), "session timezone: {tz}");
        }
    }

    #[test_log::test(sqlx::test(migrations = "./migrations"))]
    async fn test_todays_total(pool: PgPool) {
        let mut conn = pool.acquire().await.unwrap();
        let branch = Uuid::new_v4();

        let mut cash = CashRegister::new(&mut conn);
        cash.save(&cash_request("KL-01-AB-1234", Decimal::new(30000, 2), branch)).await.unwrap();
        cash.save(&cash_request("KL-01-AB-1234", Decimal::new(20000, 2), branch)).await.unwrap();

        let mut old_entry = cash_request("KL-01-AB-1234", Decimal::new(99900, 2), branch);
        old_entry.entry_date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        cash.save(&old_entry).await.unwrap();

        assert_eq!(
            cash.total_received_today(Some(branch)).await.unwrap(),
            Decimal::new(50000, 2)
        );
        assert_eq!(
            cash.total_received_today(Some(Uuid::new_v4())).await.unwrap(),
            Decimal::ZERO
        );
    }
}

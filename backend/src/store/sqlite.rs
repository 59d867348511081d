use super::schema::SCHEMA;
use super::{RecordStore, StoreError, StoreResult, TransitionCommit};
use chrono::{DateTime, Utc};
use common::model::agent::Agent;
use common::model::application::{Application, ApplicationRef, ApplicationStatus, Timeline};
use common::model::bank::{AssignedBank, BankRecord, QrImage};
use common::model::customer::Customer;
use common::model::notification::{DeliveryState, OutboundNotification};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

const APPLICATION_COLUMNS: &str = "id, email, full_name, phone, profile, status, reviewed_by, \
     submitted_at, approved_at, agreement_at, one_time_fee_at, rejected_at";
const CUSTOMER_COLUMNS: &str =
    "customer_id, email, full_name, application_id, password_hash, created_at";
const BANK_COLUMNS: &str =
    "id, holder_name, account_number, ifsc, bank_name, branch_name, upi_id, created_at";
const ASSIGNED_COLUMNS: &str = "id, customer_email, bank_record_id, holder_name, account_number, \
     ifsc, bank_name, branch_name, upi_id, qr_image_id, assigned_at";
/// Rows a sender may take. `?3` is the moment before which a `sending` claim is stale.
const CLAIMABLE: &str =
    "(state IN ('pending', 'failed') OR (state = 'sending' AND updated_at < ?3))";
const NOTIFICATION_COLUMNS: &str = "id, application_id, stage, recipient, subject, body, state, \
     attempts, last_error, created_at, updated_at";

/// SQLite-backed `RecordStore` sharing a single connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens (or creates) the database file and applies the schema.
    ///
    /// `busy_timeout` bounds how long a call waits for a locked database before it
    /// fails with `StoreError::Sqlite`.
    pub fn open(path: impl AsRef<Path>, busy_timeout: Duration) -> StoreResult<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(busy_timeout)?;
        Self::with_connection(conn)
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(SqliteStore {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StoreError::Poisoned)
    }
}

fn corrupt(idx: usize, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, message.into())
}

fn parse_column<T>(row: &Row, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.get(idx)?;
    raw.parse().map_err(|e| corrupt(idx, e))
}

fn application_from_row(row: &Row) -> rusqlite::Result<Application> {
    let profile: String = row.get(4)?;
    Ok(Application {
        id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        phone: row.get(3)?,
        profile: serde_json::from_str(&profile).map_err(|e| corrupt(4, e.to_string()))?,
        status: parse_column(row, 5)?,
        reviewed_by: row.get(6)?,
        timeline: Timeline {
            submitted_at: row.get(7)?,
            approved_at: row.get(8)?,
            agreement_at: row.get(9)?,
            one_time_fee_at: row.get(10)?,
            rejected_at: row.get(11)?,
        },
    })
}

fn customer_from_row(row: &Row) -> rusqlite::Result<Customer> {
    Ok(Customer {
        customer_id: row.get(0)?,
        email: row.get(1)?,
        full_name: row.get(2)?,
        application_id: row.get(3)?,
        password_hash: row.get(4)?,
        created_at: row.get(5)?,
    })
}

fn agent_from_row(row: &Row) -> rusqlite::Result<Agent> {
    Ok(Agent {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn bank_from_row(row: &Row) -> rusqlite::Result<BankRecord> {
    Ok(BankRecord {
        id: row.get(0)?,
        holder_name: row.get(1)?,
        account_number: row.get(2)?,
        ifsc: row.get(3)?,
        bank_name: row.get(4)?,
        branch_name: row.get(5)?,
        upi_id: row.get(6)?,
        created_at: row.get(7)?,
    })
}

fn assigned_from_row(row: &Row) -> rusqlite::Result<AssignedBank> {
    Ok(AssignedBank {
        id: row.get(0)?,
        customer_email: row.get(1)?,
        bank_record_id: row.get(2)?,
        holder_name: row.get(3)?,
        account_number: row.get(4)?,
        ifsc: row.get(5)?,
        bank_name: row.get(6)?,
        branch_name: row.get(7)?,
        upi_id: row.get(8)?,
        qr_image_id: row.get(9)?,
        assigned_at: row.get(10)?,
    })
}

fn notification_from_row(row: &Row) -> rusqlite::Result<OutboundNotification> {
    let attempts: i64 = row.get(7)?;
    Ok(OutboundNotification {
        id: row.get(0)?,
        application_id: row.get(1)?,
        stage: parse_column(row, 2)?,
        recipient: row.get(3)?,
        subject: row.get(4)?,
        body: row.get(5)?,
        state: parse_column(row, 6)?,
        attempts: u32::try_from(attempts).map_err(|e| corrupt(7, e.to_string()))?,
        last_error: row.get(8)?,
        created_at: row.get(9)?,
        updated_at: row.get(10)?,
    })
}

/// Column holding the moment an application entered `status`.
fn timestamp_column(status: ApplicationStatus) -> StoreResult<&'static str> {
    match status {
        ApplicationStatus::Approved => Ok("approved_at"),
        ApplicationStatus::Agreement => Ok("agreement_at"),
        ApplicationStatus::OneTimeFee => Ok("one_time_fee_at"),
        ApplicationStatus::Rejected => Ok("rejected_at"),
        ApplicationStatus::Pending => Err(StoreError::Corrupt(
            "an application cannot move back to pending".to_string(),
        )),
    }
}

fn insert_notification(conn: &Connection, n: &OutboundNotification) -> rusqlite::Result<usize> {
    conn.execute(
        &format!(
            "INSERT INTO notifications ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            NOTIFICATION_COLUMNS
        ),
        params![
            n.id,
            n.application_id,
            n.stage.as_str(),
            n.recipient,
            n.subject,
            n.body,
            n.state.as_str(),
            i64::from(n.attempts),
            n.last_error,
            n.created_at,
            n.updated_at,
        ],
    )
}

fn select_application(conn: &Connection, id: &str) -> rusqlite::Result<Option<Application>> {
    conn.query_row(
        &format!("SELECT {} FROM applications WHERE id = ?1", APPLICATION_COLUMNS),
        params![id],
        application_from_row,
    )
    .optional()
}

impl RecordStore for SqliteStore {
    fn insert_application(&self, application: &Application) -> StoreResult<()> {
        let profile = serde_json::to_string(&application.profile)
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        let t = &application.timeline;
        self.lock()?.execute(
            &format!(
                "INSERT INTO applications ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
                APPLICATION_COLUMNS
            ),
            params![
                application.id,
                application.email,
                application.full_name,
                application.phone,
                profile,
                application.status.as_str(),
                application.reviewed_by,
                t.submitted_at,
                t.approved_at,
                t.agreement_at,
                t.one_time_fee_at,
                t.rejected_at,
            ],
        )?;
        Ok(())
    }

    fn find_application(&self, reference: &ApplicationRef) -> StoreResult<Option<Application>> {
        let conn = self.lock()?;
        let found = match reference {
            ApplicationRef::Id(id) => select_application(&conn, id)?,
            ApplicationRef::Applicant { email, full_name } => conn
                .query_row(
                    &format!(
                        "SELECT {} FROM applications \
                         WHERE email = ?1 COLLATE NOCASE AND full_name = ?2",
                        APPLICATION_COLUMNS
                    ),
                    params![email, full_name],
                    application_from_row,
                )
                .optional()?,
        };
        Ok(found)
    }

    fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> StoreResult<Vec<Application>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM applications WHERE ?1 IS NULL OR status = ?1 ORDER BY submitted_at DESC",
            APPLICATION_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![status.map(|s| s.as_str())], application_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn delete_application(&self, id: &str) -> StoreResult<bool> {
        let changed = self
            .lock()?
            .execute("DELETE FROM applications WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn commit_transition(&self, commit: &TransitionCommit) -> StoreResult<Option<Application>> {
        let column = timestamp_column(commit.next)?;
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        let changed = tx.execute(
            &format!(
                "UPDATE applications SET status = ?1, {} = ?2, reviewed_by = COALESCE(?3, reviewed_by) \
                 WHERE id = ?4 AND status = ?5",
                column
            ),
            params![
                commit.next.as_str(),
                commit.at,
                commit.reviewed_by,
                commit.application_id,
                commit.expected.as_str(),
            ],
        )?;
        if changed == 0 {
            // Dropping the transaction rolls it back.
            return Ok(None);
        }

        if let Some(customer) = &commit.provision {
            tx.execute(
                &format!(
                    "INSERT INTO customers ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                    CUSTOMER_COLUMNS
                ),
                params![
                    customer.customer_id,
                    customer.email,
                    customer.full_name,
                    customer.application_id,
                    customer.password_hash,
                    customer.created_at,
                ],
            )?;
        }

        if let Some(notification) = &commit.notification {
            insert_notification(&tx, notification)?;
        }

        let updated = select_application(&tx, &commit.application_id)?;
        tx.commit()?;
        Ok(updated)
    }

    fn find_customer(&self, email: &str, full_name: &str) -> StoreResult<Option<Customer>> {
        let found = self
            .lock()?
            .query_row(
                &format!(
                    "SELECT {} FROM customers WHERE email = ?1 COLLATE NOCASE AND full_name = ?2",
                    CUSTOMER_COLUMNS
                ),
                params![email, full_name],
                customer_from_row,
            )
            .optional()?;
        Ok(found)
    }

    fn find_customer_by_id(&self, customer_id: &str) -> StoreResult<Option<Customer>> {
        let found = self
            .lock()?
            .query_row(
                &format!(
                    "SELECT {} FROM customers WHERE customer_id = ?1",
                    CUSTOMER_COLUMNS
                ),
                params![customer_id],
                customer_from_row,
            )
            .optional()?;
        Ok(found)
    }

    fn customer_id_taken(&self, customer_id: &str) -> StoreResult<bool> {
        let count: i64 = self.lock()?.query_row(
            "SELECT COUNT(*) FROM customers WHERE customer_id = ?1",
            params![customer_id],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    fn insert_agent(&self, agent: &Agent) -> StoreResult<()> {
        self.lock()?.execute(
            "INSERT INTO agents (id, name, email, phone, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![agent.id, agent.name, agent.email, agent.phone, agent.created_at],
        )?;
        Ok(())
    }

    fn find_agent(&self, id: &str) -> StoreResult<Option<Agent>> {
        let found = self
            .lock()?
            .query_row(
                "SELECT id, name, email, phone, created_at FROM agents WHERE id = ?1",
                params![id],
                agent_from_row,
            )
            .optional()?;
        Ok(found)
    }

    fn list_agents(&self) -> StoreResult<Vec<Agent>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT id, name, email, phone, created_at FROM agents ORDER BY name")?;
        let rows = stmt
            .query_map([], agent_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn delete_agent(&self, id: &str) -> StoreResult<bool> {
        let changed = self
            .lock()?
            .execute("DELETE FROM agents WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn insert_bank_record(&self, record: &BankRecord) -> StoreResult<()> {
        self.lock()?.execute(
            &format!(
                "INSERT INTO bank_records ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
                BANK_COLUMNS
            ),
            params![
                record.id,
                record.holder_name,
                record.account_number,
                record.ifsc,
                record.bank_name,
                record.branch_name,
                record.upi_id,
                record.created_at,
            ],
        )?;
        Ok(())
    }

    fn update_bank_record(&self, record: &BankRecord) -> StoreResult<bool> {
        let changed = self.lock()?.execute(
            "UPDATE bank_records SET holder_name = ?1, account_number = ?2, ifsc = ?3, \
             bank_name = ?4, branch_name = ?5, upi_id = ?6 WHERE id = ?7",
            params![
                record.holder_name,
                record.account_number,
                record.ifsc,
                record.bank_name,
                record.branch_name,
                record.upi_id,
                record.id,
            ],
        )?;
        Ok(changed > 0)
    }

    fn delete_bank_record(&self, id: &str) -> StoreResult<bool> {
        let changed = self
            .lock()?
            .execute("DELETE FROM bank_records WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    fn find_bank_record(&self, id: &str) -> StoreResult<Option<BankRecord>> {
        let found = self
            .lock()?
            .query_row(
                &format!("SELECT {} FROM bank_records WHERE id = ?1", BANK_COLUMNS),
                params![id],
                bank_from_row,
            )
            .optional()?;
        Ok(found)
    }

    fn list_bank_records(&self) -> StoreResult<Vec<BankRecord>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM bank_records ORDER BY bank_name, holder_name",
            BANK_COLUMNS
        ))?;
        let rows = stmt
            .query_map([], bank_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn insert_assigned_bank(&self, assigned: &AssignedBank) -> StoreResult<()> {
        self.lock()?.execute(
            &format!(
                "INSERT INTO assigned_banks ({}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
                ASSIGNED_COLUMNS
            ),
            params![
                assigned.id,
                assigned.customer_email,
                assigned.bank_record_id,
                assigned.holder_name,
                assigned.account_number,
                assigned.ifsc,
                assigned.bank_name,
                assigned.branch_name,
                assigned.upi_id,
                assigned.qr_image_id,
                assigned.assigned_at,
            ],
        )?;
        Ok(())
    }

    fn assigned_banks(&self, customer_email: &str) -> StoreResult<Vec<AssignedBank>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM assigned_banks WHERE customer_email = ?1 COLLATE NOCASE ORDER BY seq DESC",
            ASSIGNED_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![customer_email], assigned_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn insert_qr_image(&self, image: &QrImage) -> StoreResult<()> {
        self.lock()?.execute(
            "INSERT INTO qr_images (id, content_type, md5, base64, uploaded_at) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                image.id,
                image.content_type,
                image.md5,
                image.base64,
                image.uploaded_at,
            ],
        )?;
        Ok(())
    }

    fn latest_qr_image(&self) -> StoreResult<Option<QrImage>> {
        let found = self
            .lock()?
            .query_row(
                "SELECT id, content_type, md5, base64, uploaded_at FROM qr_images \
                 ORDER BY seq DESC LIMIT 1",
                [],
                |row| {
                    Ok(QrImage {
                        id: row.get(0)?,
                        content_type: row.get(1)?,
                        md5: row.get(2)?,
                        base64: row.get(3)?,
                        uploaded_at: row.get(4)?,
                    })
                },
            )
            .optional()?;
        Ok(found)
    }

    fn enqueue_notification(&self, notification: &OutboundNotification) -> StoreResult<()> {
        let conn = self.lock()?;
        insert_notification(&conn, notification)?;
        Ok(())
    }

    fn find_notification(&self, id: &str) -> StoreResult<Option<OutboundNotification>> {
        let found = self
            .lock()?
            .query_row(
                &format!(
                    "SELECT {} FROM notifications WHERE id = ?1",
                    NOTIFICATION_COLUMNS
                ),
                params![id],
                notification_from_row,
            )
            .optional()?;
        Ok(found)
    }

    fn list_notifications(
        &self,
        state: Option<DeliveryState>,
    ) -> StoreResult<Vec<OutboundNotification>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM notifications WHERE ?1 IS NULL OR state = ?1 ORDER BY seq DESC",
            NOTIFICATION_COLUMNS
        ))?;
        let rows = stmt
            .query_map(params![state.map(|s| s.as_str())], notification_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn due_notifications(
        &self,
        max_attempts: u32,
        limit: usize,
        stale_before: DateTime<Utc>,
    ) -> StoreResult<Vec<OutboundNotification>> {
        let conn = self.lock()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {} FROM notifications WHERE attempts < ?1 AND {} \
             ORDER BY seq ASC LIMIT ?2",
            NOTIFICATION_COLUMNS, CLAIMABLE
        ))?;
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let rows = stmt
            .query_map(
                params![i64::from(max_attempts), limit, stale_before],
                notification_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn claim_notification(
        &self,
        id: &str,
        at: DateTime<Utc>,
        stale_before: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let changed = self.lock()?.execute(
            &format!(
                "UPDATE notifications SET state = 'sending', updated_at = ?1 \
                 WHERE id = ?2 AND {}",
                CLAIMABLE
            ),
            params![at, id, stale_before],
        )?;
        Ok(changed > 0)
    }

    fn record_delivery(
        &self,
        id: &str,
        error: Option<&str>,
        at: DateTime<Utc>,
    ) -> StoreResult<()> {
        let state = match error {
            None => DeliveryState::Sent,
            Some(_) => DeliveryState::Failed,
        };
        self.lock()?.execute(
            "UPDATE notifications SET state = ?1, attempts = attempts + 1, last_error = ?2, \
             updated_at = ?3 WHERE id = ?4",
            params![state.as_str(), error, at, id],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{sample_application, sample_notification};
    use chrono::Duration as ChronoDuration;

    fn commit_for(app: &Application, next: ApplicationStatus) -> TransitionCommit {
        TransitionCommit {
            application_id: app.id.clone(),
            expected: app.status,
            next,
            at: app.timeline.submitted_at + ChronoDuration::hours(1),
            reviewed_by: Some("Ravi Agent".to_string()),
            provision: None,
            notification: None,
        }
    }

    #[test]
    fn applications_are_found_by_id_and_by_applicant() {
        let store = SqliteStore::open_in_memory().unwrap();
        let app = sample_application("alice@example.com", "Alice Kumar");
        store.insert_application(&app).unwrap();

        let by_id = store
            .find_application(&ApplicationRef::Id(app.id.clone()))
            .unwrap();
        assert_eq!(by_id.as_ref(), Some(&app));

        let by_applicant = store
            .find_application(&ApplicationRef::Applicant {
                email: "ALICE@example.com".to_string(),
                full_name: "Alice Kumar".to_string(),
            })
            .unwrap();
        assert_eq!(by_applicant.map(|a| a.id), Some(app.id));
    }

    #[test]
    fn applicant_pair_is_unique() {
        let store = SqliteStore::open_in_memory().unwrap();
        store
            .insert_application(&sample_application("alice@example.com", "Alice Kumar"))
            .unwrap();
        let duplicate = sample_application("alice@example.com", "Alice Kumar");
        assert!(store.insert_application(&duplicate).is_err());
    }

    #[test]
    fn transition_commits_status_timestamp_customer_and_notification_together() {
        let store = SqliteStore::open_in_memory().unwrap();
        let app = sample_application("alice@example.com", "Alice Kumar");
        store.insert_application(&app).unwrap();

        let mut commit = commit_for(&app, ApplicationStatus::Approved);
        commit.provision = Some(Customer {
            customer_id: "VOL_2026/12345".to_string(),
            email: app.email.clone(),
            full_name: app.full_name.clone(),
            application_id: app.id.clone(),
            password_hash: "salt$hash".to_string(),
            created_at: commit.at,
        });
        commit.notification = Some(sample_notification(&app));

        let updated = store.commit_transition(&commit).unwrap().unwrap();
        assert_eq!(updated.status, ApplicationStatus::Approved);
        assert_eq!(updated.timeline.approved_at, Some(commit.at));
        assert_eq!(updated.reviewed_by.as_deref(), Some("Ravi Agent"));
        assert!(store.customer_id_taken("VOL_2026/12345").unwrap());
        assert_eq!(store.list_notifications(None).unwrap().len(), 1);
    }

    #[test]
    fn stale_expected_status_writes_nothing() {
        let store = SqliteStore::open_in_memory().unwrap();
        let app = sample_application("alice@example.com", "Alice Kumar");
        store.insert_application(&app).unwrap();
        store
            .commit_transition(&commit_for(&app, ApplicationStatus::Approved))
            .unwrap()
            .unwrap();

        // Second approval still believes the application is pending.
        let mut stale = commit_for(&app, ApplicationStatus::Approved);
        stale.notification = Some(sample_notification(&app));
        assert!(store.commit_transition(&stale).unwrap().is_none());
        assert!(store.list_notifications(None).unwrap().is_empty());
    }

    #[test]
    fn failed_customer_insert_rolls_back_the_status_change() {
        let store = SqliteStore::open_in_memory().unwrap();
        let first = sample_application("alice@example.com", "Alice Kumar");
        let second = sample_application("bob@example.com", "Bob Singh");
        store.insert_application(&first).unwrap();
        store.insert_application(&second).unwrap();

        let customer = |app: &Application| Customer {
            customer_id: "VOL_2026/55555".to_string(),
            email: app.email.clone(),
            full_name: app.full_name.clone(),
            application_id: app.id.clone(),
            password_hash: "salt$hash".to_string(),
            created_at: app.timeline.submitted_at,
        };

        let mut ok = commit_for(&first, ApplicationStatus::Approved);
        ok.provision = Some(customer(&first));
        store.commit_transition(&ok).unwrap().unwrap();

        let mut clash = commit_for(&second, ApplicationStatus::Approved);
        clash.provision = Some(customer(&second));
        assert!(store.commit_transition(&clash).is_err());

        let reloaded = store
            .find_application(&ApplicationRef::Id(second.id.clone()))
            .unwrap()
            .unwrap();
        assert_eq!(reloaded.status, ApplicationStatus::Pending);
        assert!(reloaded.timeline.approved_at.is_none());
    }

    #[test]
    fn assignments_and_qr_images_come_back_newest_first() {
        let store = SqliteStore::open_in_memory().unwrap();
        let at = Utc::now();
        for (i, id) in ["qr-1", "qr-2"].iter().enumerate() {
            store
                .insert_qr_image(&QrImage {
                    id: id.to_string(),
                    content_type: "image/png".to_string(),
                    md5: format!("{:032}", i),
                    base64: "iVBORw0KGgo=".to_string(),
                    uploaded_at: at,
                })
                .unwrap();
        }
        assert_eq!(store.latest_qr_image().unwrap().unwrap().id, "qr-2");

        for id in ["as-1", "as-2"] {
            store
                .insert_assigned_bank(&AssignedBank {
                    id: id.to_string(),
                    customer_email: "alice@example.com".to_string(),
                    bank_record_id: None,
                    holder_name: None,
                    account_number: None,
                    ifsc: None,
                    bank_name: None,
                    branch_name: None,
                    upi_id: None,
                    qr_image_id: Some("qr-2".to_string()),
                    assigned_at: at,
                })
                .unwrap();
        }
        let ids: Vec<String> = store
            .assigned_banks("Alice@Example.com")
            .unwrap()
            .into_iter()
            .map(|a| a.id)
            .collect();
        assert_eq!(ids, vec!["as-2".to_string(), "as-1".to_string()]);
    }

    #[test]
    fn delivery_attempts_are_counted_until_sent() {
        let store = SqliteStore::open_in_memory().unwrap();
        let app = sample_application("alice@example.com", "Alice Kumar");
        let notification = sample_notification(&app);
        store.enqueue_notification(&notification).unwrap();

        store
            .record_delivery(&notification.id, Some("relay down"), Utc::now())
            .unwrap();
        let failed = store.find_notification(&notification.id).unwrap().unwrap();
        assert_eq!(failed.state, DeliveryState::Failed);
        assert_eq!(failed.attempts, 1);
        assert_eq!(failed.last_error.as_deref(), Some("relay down"));
        assert_eq!(store.due_notifications(5, 10, Utc::now()).unwrap().len(), 1);
        assert!(store.due_notifications(1, 10, Utc::now()).unwrap().is_empty());

        store
            .record_delivery(&notification.id, None, Utc::now())
            .unwrap();
        let sent = store.find_notification(&notification.id).unwrap().unwrap();
        assert_eq!(sent.state, DeliveryState::Sent);
        assert_eq!(sent.attempts, 2);
        assert!(store.due_notifications(5, 10, Utc::now()).unwrap().is_empty());
    }

    #[test]
    fn a_claimed_notification_is_not_due_until_the_claim_goes_stale() {
        let store = SqliteStore::open_in_memory().unwrap();
        let notification = sample_notification(&sample_application("alice@example.com", "Alice Kumar"));
        store.enqueue_notification(&notification).unwrap();

        let claimed_at = Utc::now();
        let stale_before = claimed_at - ChronoDuration::minutes(5);
        assert!(store
            .claim_notification(&notification.id, claimed_at, stale_before)
            .unwrap());
        assert!(!store
            .claim_notification(&notification.id, claimed_at, stale_before)
            .unwrap());
        let row = store.find_notification(&notification.id).unwrap().unwrap();
        assert_eq!(row.state, DeliveryState::Sending);
        assert!(store.due_notifications(5, 10, stale_before).unwrap().is_empty());

        // A claim older than the cut-off is abandoned and may be taken over.
        let later = claimed_at + ChronoDuration::minutes(10);
        assert_eq!(store.due_notifications(5, 10, later).unwrap().len(), 1);
        assert!(store.claim_notification(&notification.id, later, later).unwrap());

        store.record_delivery(&notification.id, None, later).unwrap();
        assert!(!store
            .claim_notification(&notification.id, later, later + ChronoDuration::hours(1))
            .unwrap());
    }

    #[test]
    fn data_survives_reopening_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("franchise.sqlite");
        let app = sample_application("alice@example.com", "Alice Kumar");
        {
            let store = SqliteStore::open(&path, Duration::from_secs(1)).unwrap();
            store.insert_application(&app).unwrap();
        }
        let store = SqliteStore::open(&path, Duration::from_secs(1)).unwrap();
        assert_eq!(
            store.list_applications(Some(ApplicationStatus::Pending)).unwrap(),
            vec![app]
        );
    }
}

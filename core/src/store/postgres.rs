//! PostgreSQL repository.
//!
//! Runtime (non-macro) queries so the crate builds without a live
//! `DATABASE_URL`. The atomic primitives rely on conditional `UPDATE`
//! statements checked via `rows_affected`; the ticket batch insert runs in
//! a single transaction. A user's owned-ticket list is derived from
//! `tickets.owner_id`, so `attach_tickets`/`detach_ticket` are no-ops here.

use crate::error::{Result, TicketingError};
use crate::event::{CategoryInventory, Event, TicketInventory};
use crate::store::{InventoryReservation, TicketingRepository};
use crate::ticket::{ResaleListing, Ticket, TicketStatus};
use crate::types::{
    EventId, TicketCategory, TicketId, TicketNumber, UserId, WaitlistEntryId,
};
use crate::user::{User, UserRole};
use crate::waitlist::WaitlistEntry;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// PostgreSQL implementation of [`TicketingRepository`].
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
}

impl PostgresRepository {
    /// Wraps an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the database at `url`.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if the connection fails.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = PgPool::connect(url).await.map_err(db_err)?;
        Ok(Self::new(pool))
    }

    /// Runs embedded schema migrations.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if a migration fails.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| TicketingError::Storage(format!("migration failed: {e}")))?;
        Ok(())
    }
}

fn db_err(e: sqlx::Error) -> TicketingError {
    TicketingError::Storage(e.to_string())
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn to_u64(value: i64) -> u64 {
    u64::try_from(value).unwrap_or(0)
}

fn to_u32(value: i32) -> u32 {
    u32::try_from(value).unwrap_or(0)
}

const fn category_columns(category: TicketCategory) -> (&'static str, &'static str) {
    match category {
        TicketCategory::Vvip => ("vvip_remaining", "vvip_issued"),
        TicketCategory::Vip => ("vip_remaining", "vip_issued"),
        TicketCategory::Standard => ("standard_remaining", "standard_issued"),
    }
}

fn event_from_row(row: &PgRow) -> Result<Event> {
    let slot = |remaining: &str, issued: &str, price: &str| -> Result<CategoryInventory> {
        Ok(CategoryInventory {
            remaining: to_u32(row.try_get::<i32, _>(remaining).map_err(db_err)?),
            issued: to_u32(row.try_get::<i32, _>(issued).map_err(db_err)?),
            price: to_u64(row.try_get::<i64, _>(price).map_err(db_err)?),
        })
    };
    Ok(Event {
        id: EventId::from_uuid(row.try_get("id").map_err(db_err)?),
        name: row.try_get("name").map_err(db_err)?,
        description: row.try_get("description").map_err(db_err)?,
        date: row.try_get("date").map_err(db_err)?,
        time: row.try_get("time").map_err(db_err)?,
        location: row.try_get("location").map_err(db_err)?,
        image_url: row.try_get("image_url").map_err(db_err)?,
        inventory: TicketInventory {
            vvip: slot("vvip_remaining", "vvip_issued", "vvip_price")?,
            vip: slot("vip_remaining", "vip_issued", "vip_price")?,
            standard: slot("standard_remaining", "standard_issued", "standard_price")?,
        },
        created_at: row.try_get("created_at").map_err(db_err)?,
    })
}

fn ticket_from_row(row: &PgRow) -> Result<Ticket> {
    let status_text: String = row.try_get("status").map_err(db_err)?;
    let status = TicketStatus::parse(&status_text)
        .ok_or_else(|| TicketingError::Storage(format!("unknown ticket status: {status_text}")))?;
    let category_text: String = row.try_get("category").map_err(db_err)?;
    let category = TicketCategory::parse(&category_text).ok_or_else(|| {
        TicketingError::Storage(format!("unknown ticket category: {category_text}"))
    })?;

    let resale_price: Option<i64> = row.try_get("resale_price").map_err(db_err)?;
    let resale_listed_at: Option<DateTime<Utc>> =
        row.try_get("resale_listed_at").map_err(db_err)?;
    let resale = match (resale_price, resale_listed_at) {
        (Some(price), Some(listed_at)) => Some(ResaleListing {
            price: to_u64(price),
            reason: row.try_get("resale_reason").map_err(db_err)?,
            listed_at,
        }),
        _ => None,
    };

    Ok(Ticket {
        id: TicketId::from_uuid(row.try_get("id").map_err(db_err)?),
        number: TicketNumber(to_u64(row.try_get::<i64, _>("number").map_err(db_err)?)),
        event_id: EventId::from_uuid(row.try_get("event_id").map_err(db_err)?),
        owner_id: UserId::from_uuid(row.try_get("owner_id").map_err(db_err)?),
        category,
        seat_label: row.try_get("seat_label").map_err(db_err)?,
        price_paid: to_u64(row.try_get::<i64, _>("price_paid").map_err(db_err)?),
        purchased_at: row.try_get("purchased_at").map_err(db_err)?,
        status,
        resale,
        buyer_id: row
            .try_get::<Option<Uuid>, _>("buyer_id")
            .map_err(db_err)?
            .map(UserId::from_uuid),
    })
}

fn entry_from_row(row: &PgRow) -> Result<WaitlistEntry> {
    let category_text: String = row.try_get("category").map_err(db_err)?;
    let category = TicketCategory::parse(&category_text).ok_or_else(|| {
        TicketingError::Storage(format!("unknown waitlist category: {category_text}"))
    })?;
    Ok(WaitlistEntry {
        id: WaitlistEntryId::from_uuid(row.try_get("id").map_err(db_err)?),
        event_id: EventId::from_uuid(row.try_get("event_id").map_err(db_err)?),
        user_id: UserId::from_uuid(row.try_get("user_id").map_err(db_err)?),
        category,
        joined_at: row.try_get("joined_at").map_err(db_err)?,
    })
}

const SELECT_TICKET: &str = "SELECT id, number, event_id, owner_id, category, seat_label, \
     price_paid, purchased_at, status, resale_price, resale_reason, resale_listed_at, buyer_id \
     FROM tickets";

#[async_trait]
impl TicketingRepository for PostgresRepository {
    async fn insert_event(&self, event: &Event) -> Result<()> {
        sqlx::query(
            "INSERT INTO events (id, name, description, date, time, location, image_url, \
             vvip_remaining, vvip_issued, vvip_price, \
             vip_remaining, vip_issued, vip_price, \
             standard_remaining, standard_issued, standard_price, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
        )
        .bind(event.id.as_uuid())
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.date)
        .bind(&event.time)
        .bind(&event.location)
        .bind(&event.image_url)
        .bind(i32::try_from(event.inventory.vvip.remaining).unwrap_or(i32::MAX))
        .bind(i32::try_from(event.inventory.vvip.issued).unwrap_or(i32::MAX))
        .bind(to_i64(event.inventory.vvip.price))
        .bind(i32::try_from(event.inventory.vip.remaining).unwrap_or(i32::MAX))
        .bind(i32::try_from(event.inventory.vip.issued).unwrap_or(i32::MAX))
        .bind(to_i64(event.inventory.vip.price))
        .bind(i32::try_from(event.inventory.standard.remaining).unwrap_or(i32::MAX))
        .bind(i32::try_from(event.inventory.standard.issued).unwrap_or(i32::MAX))
        .bind(to_i64(event.inventory.standard.price))
        .bind(event.created_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn get_event(&self, event_id: EventId) -> Result<Event> {
        let row = sqlx::query("SELECT * FROM events WHERE id = $1")
            .bind(event_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| TicketingError::not_found("event", event_id))?;
        event_from_row(&row)
    }

    async fn set_inventory(&self, event_id: EventId, inventory: TicketInventory) -> Result<Event> {
        let row = sqlx::query(
            "UPDATE events SET \
             vvip_remaining = $2, vvip_issued = $3, vvip_price = $4, \
             vip_remaining = $5, vip_issued = $6, vip_price = $7, \
             standard_remaining = $8, standard_issued = $9, standard_price = $10 \
             WHERE id = $1 RETURNING *",
        )
        .bind(event_id.as_uuid())
        .bind(i32::try_from(inventory.vvip.remaining).unwrap_or(i32::MAX))
        .bind(i32::try_from(inventory.vvip.issued).unwrap_or(i32::MAX))
        .bind(to_i64(inventory.vvip.price))
        .bind(i32::try_from(inventory.vip.remaining).unwrap_or(i32::MAX))
        .bind(i32::try_from(inventory.vip.issued).unwrap_or(i32::MAX))
        .bind(to_i64(inventory.vip.price))
        .bind(i32::try_from(inventory.standard.remaining).unwrap_or(i32::MAX))
        .bind(i32::try_from(inventory.standard.issued).unwrap_or(i32::MAX))
        .bind(to_i64(inventory.standard.price))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| TicketingError::not_found("event", event_id))?;
        event_from_row(&row)
    }

    async fn reserve_inventory(
        &self,
        event_id: EventId,
        category: TicketCategory,
        quantity: u32,
    ) -> Result<InventoryReservation> {
        let (remaining_col, issued_col) = category_columns(category);
        // Check and decrement in a single statement: the WHERE clause is the
        // conditional that keeps the count non-negative under races.
        let sql = format!(
            "UPDATE events SET {remaining_col} = {remaining_col} - $2, \
             {issued_col} = {issued_col} + $2 \
             WHERE id = $1 AND {remaining_col} >= $2 \
             RETURNING {remaining_col} AS remaining, {issued_col} AS issued",
        );
        let quantity_i32 = i32::try_from(quantity).unwrap_or(i32::MAX);
        let row = sqlx::query(&sql)
            .bind(event_id.as_uuid())
            .bind(quantity_i32)
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?;

        if let Some(row) = row {
            let remaining = to_u32(row.try_get::<i32, _>("remaining").map_err(db_err)?);
            let issued = to_u32(row.try_get::<i32, _>("issued").map_err(db_err)?);
            return Ok(InventoryReservation {
                remaining,
                first_seat: issued - quantity + 1,
            });
        }

        // Lost the conditional: report the exact remaining count, or
        // NotFound if the event is gone.
        let event = self.get_event(event_id).await?;
        Err(TicketingError::InsufficientInventory {
            category,
            remaining: event.inventory.remaining(category),
        })
    }

    async fn restore_inventory(
        &self,
        event_id: EventId,
        category: TicketCategory,
        quantity: u32,
    ) -> Result<()> {
        let (remaining_col, _) = category_columns(category);
        let sql =
            format!("UPDATE events SET {remaining_col} = {remaining_col} + $2 WHERE id = $1");
        let result = sqlx::query(&sql)
            .bind(event_id.as_uuid())
            .bind(i32::try_from(quantity).unwrap_or(i32::MAX))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(TicketingError::not_found("event", event_id));
        }
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        let role = match user.role {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        };
        sqlx::query("INSERT INTO users (id, name, email, role, wallet) VALUES ($1, $2, $3, $4, $5)")
            .bind(user.id.as_uuid())
            .bind(&user.name)
            .bind(&user.email)
            .bind(role)
            .bind(to_i64(user.wallet))
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(())
    }

    async fn get_user(&self, user_id: UserId) -> Result<User> {
        let row = sqlx::query("SELECT id, name, email, role, wallet FROM users WHERE id = $1")
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| TicketingError::not_found("user", user_id))?;

        let role_text: String = row.try_get("role").map_err(db_err)?;
        let role = if role_text == "admin" {
            UserRole::Admin
        } else {
            UserRole::User
        };

        let ticket_rows =
            sqlx::query("SELECT id FROM tickets WHERE owner_id = $1 ORDER BY number")
                .bind(user_id.as_uuid())
                .fetch_all(&self.pool)
                .await
                .map_err(db_err)?;
        let mut tickets = Vec::with_capacity(ticket_rows.len());
        for ticket_row in &ticket_rows {
            tickets.push(TicketId::from_uuid(
                ticket_row.try_get("id").map_err(db_err)?,
            ));
        }

        Ok(User {
            id: UserId::from_uuid(row.try_get("id").map_err(db_err)?),
            name: row.try_get("name").map_err(db_err)?,
            email: row.try_get("email").map_err(db_err)?,
            role,
            wallet: to_u64(row.try_get::<i64, _>("wallet").map_err(db_err)?),
            tickets,
        })
    }

    async fn debit_wallet(&self, user_id: UserId, amount: u64) -> Result<u64> {
        let row = sqlx::query(
            "UPDATE users SET wallet = wallet - $2 WHERE id = $1 AND wallet >= $2 \
             RETURNING wallet",
        )
        .bind(user_id.as_uuid())
        .bind(to_i64(amount))
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;

        if let Some(row) = row {
            return Ok(to_u64(row.try_get::<i64, _>("wallet").map_err(db_err)?));
        }

        let user = self.get_user(user_id).await?;
        Err(TicketingError::InsufficientFunds {
            required: amount,
            available: user.wallet,
        })
    }

    async fn credit_wallet(&self, user_id: UserId, amount: u64) -> Result<u64> {
        let row = sqlx::query("UPDATE users SET wallet = wallet + $2 WHERE id = $1 RETURNING wallet")
            .bind(user_id.as_uuid())
            .bind(to_i64(amount))
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| TicketingError::not_found("user", user_id))?;
        Ok(to_u64(row.try_get::<i64, _>("wallet").map_err(db_err)?))
    }

    async fn attach_tickets(&self, _user_id: UserId, _tickets: &[TicketId]) -> Result<()> {
        // Ownership lives on tickets.owner_id; the list is derived.
        Ok(())
    }

    async fn detach_ticket(&self, _user_id: UserId, _ticket: TicketId) -> Result<()> {
        Ok(())
    }

    async fn next_ticket_numbers(&self, count: u32) -> Result<u64> {
        let row = sqlx::query(
            "UPDATE counters SET value = value + $1 WHERE name = 'ticket_number' RETURNING value",
        )
        .bind(i64::from(count))
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)?;
        let end = to_u64(row.try_get::<i64, _>("value").map_err(db_err)?);
        Ok(end - u64::from(count) + 1)
    }

    async fn insert_tickets(&self, tickets: &[Ticket]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(db_err)?;
        for ticket in tickets {
            sqlx::query(
                "INSERT INTO tickets (id, number, event_id, owner_id, category, seat_label, \
                 price_paid, purchased_at, status, resale_price, resale_reason, \
                 resale_listed_at, buyer_id) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)",
            )
            .bind(ticket.id.as_uuid())
            .bind(to_i64(ticket.number.0))
            .bind(ticket.event_id.as_uuid())
            .bind(ticket.owner_id.as_uuid())
            .bind(ticket.category.as_str())
            .bind(&ticket.seat_label)
            .bind(to_i64(ticket.price_paid))
            .bind(ticket.purchased_at)
            .bind(ticket.status.as_str())
            .bind(ticket.resale.as_ref().map(|listing| to_i64(listing.price)))
            .bind(ticket.resale.as_ref().and_then(|listing| listing.reason.clone()))
            .bind(ticket.resale.as_ref().map(|listing| listing.listed_at))
            .bind(ticket.buyer_id.map(|id| *id.as_uuid()))
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
        }
        tx.commit().await.map_err(db_err)?;
        Ok(())
    }

    async fn get_ticket(&self, ticket_id: TicketId) -> Result<Ticket> {
        let sql = format!("{SELECT_TICKET} WHERE id = $1");
        let row = sqlx::query(&sql)
            .bind(ticket_id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(db_err)?
            .ok_or_else(|| TicketingError::not_found("ticket", ticket_id))?;
        ticket_from_row(&row)
    }

    async fn list_tickets_for_user(&self, user_id: UserId) -> Result<Vec<Ticket>> {
        let sql = format!("{SELECT_TICKET} WHERE owner_id = $1 ORDER BY number");
        let rows = sqlx::query(&sql)
            .bind(user_id.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(ticket_from_row).collect()
    }

    async fn list_resale_tickets(&self) -> Result<Vec<Ticket>> {
        let sql = format!("{SELECT_TICKET} WHERE status = 'listed_for_resale' ORDER BY number");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;
        rows.iter().map(ticket_from_row).collect()
    }

    async fn update_ticket_guarded(&self, ticket: &Ticket, expected: TicketStatus) -> Result<()> {
        let result = sqlx::query(
            "UPDATE tickets SET owner_id = $3, status = $4, resale_price = $5, \
             resale_reason = $6, resale_listed_at = $7, buyer_id = $8 \
             WHERE id = $1 AND status = $2",
        )
        .bind(ticket.id.as_uuid())
        .bind(expected.as_str())
        .bind(ticket.owner_id.as_uuid())
        .bind(ticket.status.as_str())
        .bind(ticket.resale.as_ref().map(|listing| to_i64(listing.price)))
        .bind(ticket.resale.as_ref().and_then(|listing| listing.reason.clone()))
        .bind(ticket.resale.as_ref().map(|listing| listing.listed_at))
        .bind(ticket.buyer_id.map(|id| *id.as_uuid()))
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            // Distinguish a lost race from a missing row.
            self.get_ticket(ticket.id).await?;
            return Err(TicketingError::ConcurrencyConflict);
        }
        Ok(())
    }

    async fn delete_ticket(&self, ticket_id: TicketId) -> Result<()> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(ticket_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(TicketingError::not_found("ticket", ticket_id));
        }
        Ok(())
    }

    async fn insert_waitlist_entry(&self, entry: &WaitlistEntry) -> Result<()> {
        let result = sqlx::query(
            "INSERT INTO waitlist_entries (id, event_id, user_id, category, joined_at) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (event_id, user_id, category) DO NOTHING",
        )
        .bind(entry.id.as_uuid())
        .bind(entry.event_id.as_uuid())
        .bind(entry.user_id.as_uuid())
        .bind(entry.category.as_str())
        .bind(entry.joined_at)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;

        if result.rows_affected() == 0 {
            return Err(TicketingError::DuplicateWaitlistEntry);
        }
        Ok(())
    }

    async fn get_waitlist_entry(&self, entry_id: WaitlistEntryId) -> Result<WaitlistEntry> {
        let row = sqlx::query(
            "SELECT id, event_id, user_id, category, joined_at FROM waitlist_entries \
             WHERE id = $1",
        )
        .bind(entry_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?
        .ok_or_else(|| TicketingError::not_found("waitlist entry", entry_id))?;
        entry_from_row(&row)
    }

    async fn list_waitlist_for_event(&self, event_id: EventId) -> Result<Vec<WaitlistEntry>> {
        let rows = sqlx::query(
            "SELECT id, event_id, user_id, category, joined_at FROM waitlist_entries \
             WHERE event_id = $1 ORDER BY joined_at ASC",
        )
        .bind(event_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(entry_from_row).collect()
    }

    async fn list_waitlist_for_user(&self, user_id: UserId) -> Result<Vec<WaitlistEntry>> {
        let rows = sqlx::query(
            "SELECT id, event_id, user_id, category, joined_at FROM waitlist_entries \
             WHERE user_id = $1 ORDER BY joined_at ASC",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        rows.iter().map(entry_from_row).collect()
    }

    async fn delete_waitlist_entry(&self, entry_id: WaitlistEntryId) -> Result<()> {
        let result = sqlx::query("DELETE FROM waitlist_entries WHERE id = $1")
            .bind(entry_id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        if result.rows_affected() == 0 {
            return Err(TicketingError::not_found("waitlist entry", entry_id));
        }
        Ok(())
    }

    async fn delete_waitlist_entries_for(
        &self,
        user_id: UserId,
        event_id: EventId,
    ) -> Result<u64> {
        let result =
            sqlx::query("DELETE FROM waitlist_entries WHERE user_id = $1 AND event_id = $2")
                .bind(user_id.as_uuid())
                .bind(event_id.as_uuid())
                .execute(&self.pool)
                .await
                .map_err(db_err)?;
        Ok(result.rows_affected())
    }
}

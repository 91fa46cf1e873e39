use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, Row, Transaction};
use std::time::Duration;

use crate::core::distance::calculate_bounding_box;
use crate::models::{Coordinates, Decision, DecisionKind, ProfileUpdate, User};
use crate::services::store::{resolve_record, DecisionStore, RecordOutcome, StoreError, UserDirectory};

const USER_COLUMNS: &str = r#"
    id, username, email, first_name, last_name, image_url, hobbies, interests,
    zip_code, friend_radius_miles, latitude, longitude
"#;

/// PostgreSQL-backed user directory and decision store
///
/// Users and decisions live in the same database so that a decision insert
/// can re-check eligibility against fresh user rows in one transaction.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }

    async fn decisions_where(&self, column: &str, user_id: i64) -> Result<Vec<Decision>, StoreError> {
        let query = format!(
            r#"
            SELECT actor_id, target_id, kind, created_at
            FROM decisions
            WHERE {} = $1
            "#,
            column
        );

        let rows = sqlx::query(&query).bind(user_id).fetch_all(&self.pool).await?;

        rows.iter().map(decision_from_row).collect()
    }

    /// Lock both users' rows for the rest of the transaction
    ///
    /// Rows are locked in id order so that two opposite-direction decisions
    /// between the same pair cannot deadlock.
    async fn lock_pair(
        tx: &mut Transaction<'_, Postgres>,
        actor_id: i64,
        target_id: i64,
    ) -> Result<(User, User), StoreError> {
        let query = format!(
            "SELECT {} FROM users WHERE id = ANY($1) ORDER BY id FOR UPDATE",
            USER_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(vec![actor_id, target_id])
            .fetch_all(&mut **tx)
            .await?;

        let users = rows.iter().map(user_from_row).collect::<Result<Vec<_>, _>>()?;
        let find = |id: i64| {
            users
                .iter()
                .find(|u| u.id == id)
                .cloned()
                .ok_or_else(|| StoreError::NotFound(format!("User {} not found", id)))
        };

        Ok((find(actor_id)?, find(target_id)?))
    }
}

#[async_trait]
impl UserDirectory for PostgresClient {
    async fn get_user(&self, user_id: i64) -> Result<User, StoreError> {
        let query = format!("SELECT {} FROM users WHERE id = $1", USER_COLUMNS);

        let row = sqlx::query(&query)
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("User {} not found", user_id)))?;

        user_from_row(&row)
    }

    /// Users with coordinates inside the bounding box of `user`'s radius
    ///
    /// Only rows with coordinates are returned; the exact Haversine and
    /// mutual-radius checks are left to the matcher.
    async fn candidate_pool(&self, user: &User) -> Result<Vec<User>, StoreError> {
        let (location, radius) = match (user.location(), user.radius()) {
            (Some(location), Some(radius)) => (location, radius),
            _ => {
                tracing::debug!("User {} has no usable location, empty pool", user.id);
                return Ok(Vec::new());
            }
        };

        let bbox = calculate_bounding_box(location.latitude, location.longitude, radius);
        let query = format!(
            r#"
            SELECT {}
            FROM users
            WHERE id <> $1
              AND latitude BETWEEN $2 AND $3
              AND longitude BETWEEN $4 AND $5
            ORDER BY id
            "#,
            USER_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(user.id)
            .bind(bbox.min_lat)
            .bind(bbox.max_lat)
            .bind(bbox.min_lon)
            .bind(bbox.max_lon)
            .fetch_all(&self.pool)
            .await?;

        let pool = rows.iter().map(user_from_row).collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Candidate pool for user {}: {} users", user.id, pool.len());

        Ok(pool)
    }

    async fn update_profile(&self, user_id: i64, update: ProfileUpdate) -> Result<User, StoreError> {
        let query = format!(
            r#"
            UPDATE users SET
                email = $2,
                first_name = $3,
                last_name = $4,
                hobbies = $5,
                interests = $6,
                zip_code = $7,
                friend_radius_miles = $8,
                image_url = COALESCE($9, image_url),
                latitude = $10,
                longitude = $11
            WHERE id = $1
            RETURNING {}
            "#,
            USER_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(user_id)
            .bind(&update.email)
            .bind(&update.first_name)
            .bind(&update.last_name)
            .bind(&update.hobbies)
            .bind(&update.interests)
            .bind(&update.zip_code)
            .bind(update.friend_radius_miles)
            .bind(&update.image_url)
            .bind(update.coordinates.map(|c| c.latitude))
            .bind(update.coordinates.map(|c| c.longitude))
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("User {} not found", user_id)))?;

        user_from_row(&row)
    }
}

#[async_trait]
impl DecisionStore for PostgresClient {
    async fn decisions_by_actor(&self, user_id: i64) -> Result<Vec<Decision>, StoreError> {
        self.decisions_where("actor_id", user_id).await
    }

    async fn decisions_by_target(&self, user_id: i64) -> Result<Vec<Decision>, StoreError> {
        self.decisions_where("target_id", user_id).await
    }

    async fn record_if_eligible(
        &self,
        actor_id: i64,
        target_id: i64,
        kind: DecisionKind,
    ) -> Result<RecordOutcome, StoreError> {
        let mut tx = self.pool.begin().await?;

        let (actor, target) = Self::lock_pair(&mut tx, actor_id, target_id).await?;

        let rows = sqlx::query(
            r#"
            SELECT actor_id, target_id, kind, created_at
            FROM decisions
            WHERE (actor_id = $1 AND target_id = $2)
               OR (actor_id = $2 AND target_id = $1)
            "#,
        )
        .bind(actor_id)
        .bind(target_id)
        .fetch_all(&mut *tx)
        .await?;
        let pair_decisions = rows.iter().map(decision_from_row).collect::<Result<Vec<_>, _>>()?;

        let decision = match resolve_record(&actor, &target, kind, &pair_decisions) {
            Ok(decision) => decision,
            Err(outcome) => {
                tx.rollback().await?;
                return Ok(outcome);
            }
        };

        let inserted = sqlx::query(
            r#"
            INSERT INTO decisions (actor_id, target_id, kind, created_at)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (actor_id, target_id, kind) DO NOTHING
            "#,
        )
        .bind(decision.actor_id)
        .bind(decision.target_id)
        .bind(decision.kind)
        .bind(decision.created_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        if inserted.rows_affected() == 0 {
            return Ok(RecordOutcome::AlreadyRecorded);
        }

        tracing::debug!("Recorded decision: {} -> {} ({:?})", actor_id, target_id, kind);

        Ok(RecordOutcome::Recorded(decision))
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let latitude: Option<f64> = row.try_get("latitude")?;
    let longitude: Option<f64> = row.try_get("longitude")?;

    Ok(User {
        id: row.try_get("id")?,
        username: row.try_get("username")?,
        email: row.try_get("email")?,
        first_name: row.try_get("first_name")?,
        last_name: row.try_get("last_name")?,
        image_url: row.try_get("image_url")?,
        hobbies: row.try_get("hobbies")?,
        interests: row.try_get("interests")?,
        zip_code: row.try_get("zip_code")?,
        friend_radius_miles: row.try_get("friend_radius_miles")?,
        coordinates: latitude.zip(longitude).map(|(lat, lon)| Coordinates::new(lat, lon)),
    })
}

fn decision_from_row(row: &PgRow) -> Result<Decision, StoreError> {
    Ok(Decision {
        actor_id: row.try_get("actor_id")?,
        target_id: row.try_get("target_id")?,
        kind: row.try_get("kind")?,
        created_at: row.try_get("created_at")?,
    })
}

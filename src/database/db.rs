use super::db_structs::{RatingHistory, StoredRating};
use crate::{error::ProcessorError, model::structures::rating_type::RatingType, utils::progress_utils::progress_bar};
use futures::future::try_join_all;
use postgres_types::ToSql;
use std::collections::HashMap;
use tokio_postgres::{Client, GenericClient, NoTls, Row, Transaction};
use tracing::{error, info};
use uuid::Uuid;

pub struct DbClient {
    client: Client
}

impl DbClient {
    // Connect to the database and return a DbClient instance
    pub async fn connect(connection_str: &str) -> Result<Self, ProcessorError> {
        let (client, connection) = tokio_postgres::connect(connection_str, NoTls).await?;

        // Spawn the connection object to run in the background
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                error!("connection error: {}", e);
            }
        });

        Ok(DbClient { client })
    }

    /// Fetches the current ratings of the given members in one rating category.
    /// Members who have never been rated are absent from the result.
    pub async fn get_ratings(
        &self,
        member_ids: &[i32],
        rating_type: RatingType
    ) -> Result<HashMap<i32, StoredRating>, ProcessorError> {
        info!("Fetching {} ratings for {} members...", rating_type, member_ids.len());

        let ids = member_ids.to_vec();
        let rows = self
            .client
            .query(
                "SELECT member_id, challenge_id, win_position, total_wins, rating, volatility, ratings_count \
                FROM ratings WHERE rating_type_id = $1 AND member_id = ANY($2)",
                &[&rating_type.id(), &ids]
            )
            .await?;

        let mut ratings = HashMap::with_capacity(rows.len());
        for row in rows {
            let rating = Self::rating_from_row(&row, rating_type)?;
            ratings.insert(rating.member_id, rating);
        }

        info!("Found {} existing ratings", ratings.len());
        Ok(ratings)
    }

    /// Fetches the history snapshots recorded for one event.
    pub async fn get_history(
        &self,
        event_id: Uuid,
        rating_type: RatingType
    ) -> Result<Vec<RatingHistory>, ProcessorError> {
        let rows = self
            .client
            .query(
                "SELECT member_id, challenge_id, submission_id, score, rank, rating, volatility, ratings_count, total_wins \
                FROM ratings_history WHERE challenge_id = $1 AND rating_type_id = $2 ORDER BY id",
                &[&event_id, &rating_type.id()]
            )
            .await?;

        rows.iter().map(|row| Self::history_from_row(row, rating_type)).collect()
    }

    pub async fn is_event_rated(&self, event_id: Uuid, rating_type: RatingType) -> Result<bool, ProcessorError> {
        Self::event_rated(&self.client, event_id, rating_type).await
    }

    /// Persists the outcome of one event in a single transaction: the pre-update
    /// history snapshots first, then the new ratings.
    pub async fn save_event(
        &mut self,
        event_id: Uuid,
        rating_type: RatingType,
        ratings: &[StoredRating],
        history: &[RatingHistory]
    ) -> Result<(), ProcessorError> {
        let tx = self.client.transaction().await?;

        if Self::event_rated(&tx, event_id, rating_type).await? {
            return Err(ProcessorError::AlreadyRated { event_id });
        }

        Self::save_history(&tx, history).await?;
        info!("Saved {} rating history records", history.len());

        Self::save_ratings(&tx, ratings).await?;
        info!("Saved {} ratings", ratings.len());

        tx.commit().await?;
        info!("Event {} committed", event_id);
        Ok(())
    }

    /// Restores every member of an event to their pre-event snapshot and removes
    /// the event's history. Refuses when any member has been rated since.
    /// Returns the number of members restored.
    pub async fn rollback_event(&mut self, event_id: Uuid, rating_type: RatingType) -> Result<usize, ProcessorError> {
        let tx = self.client.transaction().await?;
        let type_id = rating_type.id();

        let rows = tx
            .query(
                "SELECT id, member_id, challenge_id, submission_id, score, rank, rating, volatility, ratings_count, total_wins \
                FROM ratings_history WHERE challenge_id = $1 AND rating_type_id = $2 ORDER BY id",
                &[&event_id, &type_id]
            )
            .await?;

        if rows.is_empty() {
            return Err(ProcessorError::NotRated { event_id });
        }

        let p_bar = progress_bar(rows.len() as u64, format!("Rolling back event {}", event_id));

        for row in &rows {
            let history_id: i32 = row.try_get("id")?;
            let snapshot = Self::history_from_row(row, rating_type)?;

            let later = tx
                .query_one(
                    "SELECT EXISTS(SELECT 1 FROM ratings_history \
                    WHERE member_id = $1 AND rating_type_id = $2 AND id > $3)",
                    &[&snapshot.member_id, &type_id, &history_id]
                )
                .await?;
            if later.try_get::<_, bool>(0)? {
                return Err(ProcessorError::RollbackConflict {
                    member_id: snapshot.member_id
                });
            }

            Self::restore_snapshot(&tx, history_id, &snapshot).await?;

            if let Some(bar) = &p_bar {
                bar.inc(1);
            }
        }

        tx.execute(
            "DELETE FROM ratings_history WHERE challenge_id = $1 AND rating_type_id = $2",
            &[&event_id, &type_id]
        )
        .await?;

        tx.commit().await?;

        if let Some(bar) = p_bar {
            bar.finish_with_message("Rollback complete");
        }

        info!("Rolled back event {} for {} members", event_id, rows.len());
        Ok(rows.len())
    }

    async fn restore_snapshot(tx: &Transaction<'_>, history_id: i32, snapshot: &RatingHistory) -> Result<(), ProcessorError> {
        let type_id = snapshot.rating_type.id();

        if snapshot.ratings_count == 0 {
            // The event was this member's first rating
            tx.execute(
                "DELETE FROM ratings WHERE member_id = $1 AND rating_type_id = $2",
                &[&snapshot.member_id, &type_id]
            )
            .await?;
            return Ok(());
        }

        // The event before this one, if it is still on record
        let previous = tx
            .query_opt(
                "SELECT challenge_id, rank FROM ratings_history \
                WHERE member_id = $1 AND rating_type_id = $2 AND id < $3 ORDER BY id DESC LIMIT 1",
                &[&snapshot.member_id, &type_id, &history_id]
            )
            .await?;
        let (challenge_id, win_position) = match previous {
            Some(row) => (
                row.try_get::<_, Option<Uuid>>("challenge_id")?,
                row.try_get::<_, Option<i32>>("rank")?
            ),
            None => (None, None)
        };

        tx.execute(
            "UPDATE ratings SET rating = $1, volatility = $2, ratings_count = $3, total_wins = $4, \
            challenge_id = $5, win_position = $6, updated_at = now() \
            WHERE member_id = $7 AND rating_type_id = $8",
            &[
                &snapshot.rating,
                &snapshot.volatility,
                &snapshot.ratings_count,
                &snapshot.total_wins,
                &challenge_id,
                &win_position,
                &snapshot.member_id,
                &type_id
            ]
        )
        .await?;

        Ok(())
    }

    async fn event_rated<C: GenericClient>(
        client: &C,
        event_id: Uuid,
        rating_type: RatingType
    ) -> Result<bool, ProcessorError> {
        let row = client
            .query_one(
                "SELECT EXISTS(SELECT 1 FROM ratings_history WHERE challenge_id = $1 AND rating_type_id = $2)",
                &[&event_id, &rating_type.id()]
            )
            .await?;

        Ok(row.try_get(0)?)
    }

    /// Inserts all snapshots concurrently over the transaction's connection.
    async fn save_history(tx: &Transaction<'_>, history: &[RatingHistory]) -> Result<(), ProcessorError> {
        let statement = tx
            .prepare(
                "INSERT INTO ratings_history (member_id, rating_type_id, challenge_id, submission_id, score, rank, \
                rating, volatility, ratings_count, total_wins) \
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)"
            )
            .await?;

        let inserts = history.iter().map(|h| {
            let params: [&dyn ToSql; 10] = [
                &h.member_id,
                type_param(h.rating_type),
                &h.challenge_id,
                &h.submission_id,
                &h.score,
                &h.rank,
                &h.rating,
                &h.volatility,
                &h.ratings_count,
                &h.total_wins
            ];
            tx.execute_raw(&statement, params)
        });

        try_join_all(inserts).await?;
        Ok(())
    }

    async fn save_ratings(tx: &Transaction<'_>, ratings: &[StoredRating]) -> Result<(), ProcessorError> {
        let statement = tx
            .prepare(
                "INSERT INTO ratings (member_id, rating_type_id, challenge_id, win_position, total_wins, rating, \
                volatility, ratings_count) \
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8) \
                ON CONFLICT (member_id, rating_type_id) DO UPDATE SET \
                challenge_id = EXCLUDED.challenge_id, win_position = EXCLUDED.win_position, \
                total_wins = EXCLUDED.total_wins, rating = EXCLUDED.rating, volatility = EXCLUDED.volatility, \
                ratings_count = EXCLUDED.ratings_count, updated_at = now()"
            )
            .await?;

        let upserts = ratings.iter().map(|r| {
            let params: [&dyn ToSql; 8] = [
                &r.member_id,
                type_param(r.rating_type),
                &r.challenge_id,
                &r.win_position,
                &r.total_wins,
                &r.rating,
                &r.volatility,
                &r.ratings_count
            ];
            tx.execute_raw(&statement, params)
        });

        try_join_all(upserts).await?;
        Ok(())
    }

    fn rating_from_row(row: &Row, rating_type: RatingType) -> Result<StoredRating, ProcessorError> {
        Ok(StoredRating {
            member_id: row.try_get("member_id")?,
            rating_type,
            challenge_id: row.try_get("challenge_id")?,
            win_position: row.try_get("win_position")?,
            total_wins: row.try_get("total_wins")?,
            rating: row.try_get("rating")?,
            volatility: row.try_get("volatility")?,
            ratings_count: row.try_get("ratings_count")?
        })
    }

    fn history_from_row(row: &Row, rating_type: RatingType) -> Result<RatingHistory, ProcessorError> {
        Ok(RatingHistory {
            member_id: row.try_get("member_id")?,
            rating_type,
            challenge_id: row.try_get("challenge_id")?,
            submission_id: row.try_get("submission_id")?,
            score: row.try_get("score")?,
            rank: row.try_get("rank")?,
            rating: row.try_get("rating")?,
            volatility: row.try_get("volatility")?,
            ratings_count: row.try_get("ratings_count")?,
            total_wins: row.try_get("total_wins")?
        })
    }
}

/// The `rating_type_id` column value as an owned-for-'static SQL parameter.
fn type_param(rating_type: RatingType) -> &'static dyn ToSql {
    match rating_type {
        RatingType::Marathon => &"MM"
    }
}

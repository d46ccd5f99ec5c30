use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::users::repo_types::User;

/// Read access to the `users` table.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// `Ok(None)` means no row matched; `Err` is reserved for query failures.
    async fn get_user_by_id(&self, id: &str) -> anyhow::Result<Option<User>>;
    async fn list_users(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<User>>;
    async fn count_users(&self) -> anyhow::Result<i64>;
}

#[derive(Clone)]
pub struct PgUserRepository {
    db: PgPool,
}

impl PgUserRepository {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserRepository {
    async fn get_user_by_id(&self, id: &str) -> anyhow::Result<Option<User>> {
        // ids are uuids; anything else cannot match a row
        let Ok(id) = Uuid::parse_str(id) else {
            tracing::debug!(%id, "malformed user id");
            return Ok(None);
        };

        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, full_name, age, country_code, is_active, created_at
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("failed to get user")?;
        Ok(user)
    }

    async fn list_users(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<User>> {
        let rows = sqlx::query_as::<_, User>(
            r#"
            SELECT id, email, full_name, age, country_code, is_active, created_at
            FROM users
            ORDER BY created_at DESC
            LIMIT $1 OFFSET $2
            "#,
        )
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.db)
        .await
        .context("failed to list users")?;
        Ok(rows)
    }

    async fn count_users(&self) -> anyhow::Result<i64> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&self.db)
            .await
            .context("failed to count users")?;
        Ok(total)
    }
}

#[cfg(test)]
pub(crate) mod fake {
    use super::*;
    use time::Duration;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Failure {
        None,
        Get,
        List,
        Count,
        Panic,
        Stall,
    }

    /// In-memory stand-in for the users table.
    pub struct InMemoryUsers {
        users: Vec<User>,
        failure: Failure,
    }

    impl InMemoryUsers {
        pub fn new(users: Vec<User>) -> Self {
            Self {
                users,
                failure: Failure::None,
            }
        }

        pub fn failing(failure: Failure) -> Self {
            Self {
                users: Vec::new(),
                failure,
            }
        }

        fn check(&self, op: Failure) -> anyhow::Result<()> {
            if self.failure == Failure::Panic {
                panic!("store exploded");
            }
            if self.failure == op {
                anyhow::bail!("connection reset by peer");
            }
            Ok(())
        }
    }

    #[async_trait]
    impl UserStore for InMemoryUsers {
        async fn get_user_by_id(&self, id: &str) -> anyhow::Result<Option<User>> {
            self.check(Failure::Get)?;
            Ok(self.users.iter().find(|u| u.id.to_string() == id).cloned())
        }

        async fn list_users(&self, limit: i64, offset: i64) -> anyhow::Result<Vec<User>> {
            if self.failure == Failure::Stall {
                tokio::time::sleep(std::time::Duration::from_secs(60)).await;
            }
            self.check(Failure::List)?;
            let mut sorted = self.users.clone();
            sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(sorted
                .into_iter()
                .skip(offset as usize)
                .take(limit as usize)
                .collect())
        }

        async fn count_users(&self) -> anyhow::Result<i64> {
            self.check(Failure::Count)?;
            Ok(self.users.len() as i64)
        }
    }

    /// A user created `minutes_ago` minutes before a fixed instant.
    pub fn sample_user(n: u32, minutes_ago: i64) -> User {
        let base = time::macros::datetime!(2024-05-01 12:00 UTC);
        User {
            id: Uuid::new_v4(),
            email: format!("user{n}@example.com"),
            full_name: format!("User {n}"),
            age: 20 + n as i32,
            country_code: "SE".into(),
            is_active: n % 2 == 0,
            created_at: base - Duration::minutes(minutes_ago),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[tokio::test]
    async fn malformed_id_is_absent_without_querying() {
        // lazy pool never connects, so a query here would fail
        let cfg = AppConfig::from_lookup(|_| None).db;
        let pool = sqlx::postgres::PgPoolOptions::new()
            .connect_lazy_with(crate::db::connect_options(&cfg));
        let repo = PgUserRepository::new(pool);

        let found = repo.get_user_by_id("not-a-uuid").await.unwrap();
        assert!(found.is_none());
    }

    /// Seeds a throwaway schema on the database named by `TEST_DATABASE_URL`
    /// and runs the real queries against it. Skipped when the variable is unset.
    #[tokio::test]
    async fn queries_against_seeded_database() {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set, skipping");
            return;
        };

        // one connection so the search_path below applies to every query
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .unwrap();
        let schema = format!("users_api_test_{}", Uuid::new_v4().simple());
        for stmt in [
            format!("CREATE SCHEMA {schema}"),
            format!("SET search_path TO {schema}"),
            "CREATE TABLE users (
                id uuid PRIMARY KEY,
                email text NOT NULL,
                full_name text NOT NULL,
                age integer NOT NULL,
                country_code text NOT NULL,
                is_active boolean NOT NULL,
                created_at timestamptz NOT NULL
            )"
            .to_string(),
        ] {
            sqlx::query(&stmt).execute(&pool).await.unwrap();
        }

        // inserted oldest first: t1 < t2 < t3
        let seeded = vec![
            fake::sample_user(1, 30),
            fake::sample_user(2, 20),
            fake::sample_user(3, 10),
        ];
        for u in &seeded {
            sqlx::query(
                "INSERT INTO users (id, email, full_name, age, country_code, is_active, created_at)
                 VALUES ($1, $2, $3, $4, $5, $6, $7)",
            )
            .bind(u.id)
            .bind(&u.email)
            .bind(&u.full_name)
            .bind(u.age)
            .bind(&u.country_code)
            .bind(u.is_active)
            .bind(u.created_at)
            .execute(&pool)
            .await
            .unwrap();
        }

        let repo = PgUserRepository::new(pool.clone());

        assert_eq!(repo.count_users().await.unwrap(), 3);

        let page = repo.list_users(2, 0).await.unwrap();
        let ids: Vec<Uuid> = page.iter().map(|u| u.id).collect();
        assert_eq!(ids, vec![seeded[2].id, seeded[1].id]);

        let tail = repo.list_users(2, 2).await.unwrap();
        assert_eq!(tail, vec![seeded[0].clone()]);
        assert!(repo.list_users(50, 3).await.unwrap().is_empty());

        let found = repo.get_user_by_id(&seeded[1].id.to_string()).await.unwrap();
        assert_eq!(found, Some(seeded[1].clone()));
        let missing = repo.get_user_by_id(&Uuid::new_v4().to_string()).await.unwrap();
        assert!(missing.is_none());

        sqlx::query(&format!("DROP SCHEMA {schema} CASCADE"))
            .execute(&pool)
            .await
            .unwrap();
    }
}

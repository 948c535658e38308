//! Runs against the Postgres named by `DATABASE_URL` (a `.env` file works).
//! Without one the tests return early.

use std::sync::Arc;

use sales_crm_backend::{
    config::{Config, LogFormat},
    database::{
        pool::create_pool,
        postgres::PgJobSeekerStore,
        store::{JobSeekerStore, UnitOfWork},
    },
    dto::job_seeker_dto::UpdateJobSeekerPayload,
    error::Error,
    models::{
        history::{HistoryOrder, NewHistoryEntry},
        job_seeker::{JobSeekerChanges, JobSeekerSearch, NewJobSeeker, SortKey, SortOrder, Status},
        sales_user::Actor,
    },
    services::job_seeker_service::JobSeekerService,
};
use sqlx::PgPool;
use uuid::Uuid;

async fn test_pool() -> Option<PgPool> {
    dotenvy::dotenv().ok();
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set, skipping Postgres store test");
        return None;
    };
    let config = Config {
        server_address: "127.0.0.1:0".into(),
        database_url,
        database_max_connections: 5,
        jwt_secret: "test_secret_key".into(),
        api_rps: 100,
        log_format: LogFormat::Text,
    };
    let pool = create_pool(&config).await.expect("pool");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("migrations");
    Some(pool)
}

struct Seeded {
    store: PgJobSeekerStore,
    pool: PgPool,
    owner_id: String,
    owner_name: String,
    job_seeker_id: String,
}

async fn seed(pool: PgPool) -> Seeded {
    let suffix = Uuid::new_v4().simple().to_string();
    let owner_id = format!("sales-{}", suffix);
    let owner_name = format!("営業 {}", &suffix[..8]);
    sqlx::query("INSERT INTO sales_users (id, name, is_active) VALUES ($1, $2, TRUE)")
        .bind(&owner_id)
        .bind(&owner_name)
        .execute(&pool)
        .await
        .expect("seed sales user");

    let store = PgJobSeekerStore::new(pool.clone());
    let created = store
        .insert_job_seeker(NewJobSeeker {
            id: format!("js-{}", suffix),
            name: "山田太郎".into(),
            age: Some(30),
            email: format!("taro-{}@example.com", suffix),
            phone: "090-1234-5678".into(),
            desired_job_type: "フロントエンドエンジニア".into(),
            desired_location: "東京".into(),
            sales_user_id: owner_id.clone(),
            memo: Some("メモ".into()),
        })
        .await
        .expect("seed job seeker");
    assert_eq!(created.status, Status::New);

    Seeded {
        store,
        pool,
        owner_id,
        owner_name,
        job_seeker_id: created.id,
    }
}

async fn history_rows(pool: &PgPool, job_seeker_id: &str) -> i64 {
    sqlx::query_scalar::<_, i64>(
        "SELECT COUNT(*) FROM job_seeker_histories WHERE job_seeker_id = $1",
    )
    .bind(job_seeker_id)
    .fetch_one(pool)
    .await
    .expect("count history")
}

fn payload(owner_id: &str, status: Status) -> UpdateJobSeekerPayload {
    UpdateJobSeekerPayload {
        name: "山田太郎".into(),
        age: Some(30),
        email: "taro@example.com".into(),
        phone: "090-1234-5678".into(),
        desired_job_type: "フロントエンドエンジニア".into(),
        desired_location: "東京".into(),
        sales_user_id: Some(owner_id.to_string()),
        status: Some(status),
        memo: Some("メモ".into()),
    }
}

fn changes(owner_id: &str, status: Status) -> JobSeekerChanges {
    JobSeekerChanges {
        name: "山田太郎".into(),
        age: Some(30),
        email: "taro@example.com".into(),
        phone: "090-1234-5678".into(),
        desired_job_type: "フロントエンドエンジニア".into(),
        desired_location: "東京".into(),
        sales_user_id: owner_id.to_string(),
        status,
        memo: Some("メモ".into()),
    }
}

#[tokio::test]
async fn status_change_commits_record_and_history_together() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let seeded = seed(pool).await;
    let service = JobSeekerService::new(Arc::new(seeded.store.clone()));
    let actor = Actor::new(seeded.owner_id.clone());

    let updated = service
        .update(
            &actor,
            &seeded.job_seeker_id,
            payload(&seeded.owner_id, Status::Interviewed),
        )
        .await
        .expect("update");
    assert_eq!(updated.status, Status::Interviewed);
    assert!(updated.updated_at >= updated.created_at);

    let history = seeded
        .store
        .list_history(&seeded.job_seeker_id, HistoryOrder::CreatedAtDesc)
        .await
        .expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].status, Status::Interviewed);
    assert_eq!(history[0].sales_user_id, seeded.owner_id);
    assert_eq!(history[0].sales_user_name, seeded.owner_name);

    let detail = seeded
        .store
        .find_owned_job_seeker(&seeded.job_seeker_id, &seeded.owner_id)
        .await
        .expect("detail")
        .expect("owned");
    assert_eq!(detail.job_seeker.status, Status::Interviewed);
    assert_eq!(detail.sales_user_name, seeded.owner_name);
}

#[tokio::test]
async fn failed_history_insert_leaves_record_unchanged() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let seeded = seed(pool).await;

    let mut uow = seeded.store.begin().await.expect("begin");
    let locked = uow
        .lock_job_seeker(&seeded.job_seeker_id)
        .await
        .expect("lock")
        .expect("exists");
    assert_eq!(locked.status, Status::New);
    let updated = uow
        .update_job_seeker(
            &seeded.job_seeker_id,
            &changes(&seeded.owner_id, Status::Interviewed),
        )
        .await
        .expect("update inside transaction");
    assert_eq!(updated.status, Status::Interviewed);

    // no such job seeker: the history foreign key rejects the row
    let err = uow
        .append_history(NewHistoryEntry {
            id: Uuid::new_v4().to_string(),
            job_seeker_id: format!("missing-{}", Uuid::new_v4()),
            status: Status::Interviewed,
            memo: None,
            sales_user_id: seeded.owner_id.clone(),
            sales_user_name: seeded.owner_name.clone(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, Error::Database(_)));
    uow.rollback().await.expect("rollback");

    let reread = seeded
        .store
        .find_job_seeker(&seeded.job_seeker_id)
        .await
        .expect("reread")
        .expect("exists");
    assert_eq!(reread.status, Status::New);
    assert_eq!(history_rows(&seeded.pool, &seeded.job_seeker_id).await, 0);
}

#[tokio::test]
async fn dropping_an_uncommitted_unit_discards_its_writes() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let seeded = seed(pool).await;

    {
        let mut uow = seeded.store.begin().await.expect("begin");
        uow.update_job_seeker(
            &seeded.job_seeker_id,
            &changes(&seeded.owner_id, Status::Closed),
        )
        .await
        .expect("update inside transaction");
    }

    let reread = seeded
        .store
        .find_job_seeker(&seeded.job_seeker_id)
        .await
        .expect("reread")
        .expect("exists");
    assert_eq!(reread.status, Status::New);
}

#[tokio::test]
async fn concurrent_updates_wait_on_the_row_lock() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let seeded = seed(pool).await;
    let service = JobSeekerService::new(Arc::new(seeded.store.clone()));
    let actor = Actor::new(seeded.owner_id.clone());

    let (close, advance) = tokio::join!(
        service.update(
            &actor,
            &seeded.job_seeker_id,
            payload(&seeded.owner_id, Status::Closed)
        ),
        service.update(
            &actor,
            &seeded.job_seeker_id,
            payload(&seeded.owner_id, Status::Interviewed)
        ),
    );

    assert!(close.is_ok());
    if let Err(err) = &advance {
        assert!(matches!(err, Error::IllegalTransition { .. }));
    }
    let succeeded = 1 + i64::from(advance.is_ok());

    let reread = seeded
        .store
        .find_job_seeker(&seeded.job_seeker_id)
        .await
        .expect("reread")
        .expect("exists");
    assert_eq!(reread.status, Status::Closed);
    assert_eq!(
        history_rows(&seeded.pool, &seeded.job_seeker_id).await,
        succeeded
    );
}

#[tokio::test]
async fn search_matches_owner_name_and_escapes_wildcards() {
    let Some(pool) = test_pool().await else {
        return;
    };
    let seeded = seed(pool).await;

    let search = |q: Option<&str>| JobSeekerSearch {
        sales_user_id: seeded.owner_id.clone(),
        q: q.map(str::to_string),
        sort_key: SortKey::Name,
        sort_order: SortOrder::Asc,
        limit: 200,
    };

    let all = seeded
        .store
        .search_job_seekers(&search(None))
        .await
        .expect("search");
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].sales_user_name, seeded.owner_name);

    let by_owner = seeded
        .store
        .search_job_seekers(&search(Some(&seeded.owner_name)))
        .await
        .expect("search by owner");
    assert_eq!(by_owner.len(), 1);

    let wildcard = seeded
        .store
        .search_job_seekers(&search(Some("%")))
        .await
        .expect("search wildcard");
    assert!(wildcard.is_empty());
}

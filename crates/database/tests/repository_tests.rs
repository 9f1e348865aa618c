use chrono::{Duration, Utc};
use smileboard_config::DatabaseConfig;
use smileboard_database::{
    initialize_database, BillingRepository, BillingStatus, CampaignChannel, CampaignRepository,
    ConnectionRepository, ConnectionStatus, ContactFilter, ContactOrigin, ContactRepository,
    CreateBillingLogRequest, CreateCampaignRequest, CreateContactRequest, CreateReviewRequest,
    IntegrationProvider, Plan, ReviewRepository, TokenSet, UpdateContactRequest, UpsertOutcome,
    UserRepository,
};
use sqlx::SqlitePool;
use tempfile::TempDir;

type TestResult<T = ()> = anyhow::Result<T>;

struct TestContext {
    pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestContext {
    async fn new() -> TestResult<Self> {
        let temp_dir = TempDir::new()?;
        let config = DatabaseConfig {
            url: format!("sqlite://{}", temp_dir.path().join("repos.sqlite").display()),
            max_connections: 5,
        };
        let pool = initialize_database(&config).await?;
        Ok(Self {
            pool,
            _temp_dir: temp_dir,
        })
    }

    async fn insert_user(&self, public_id: &str) -> TestResult<i64> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "INSERT INTO users (public_id, email, display_name, created_at, updated_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(public_id)
        .bind(format!("{public_id}@clinic.test"))
        .bind(format!("Dr. {public_id}"))
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        Ok(result.last_insert_rowid())
    }
}

fn tokens(access: &str, refresh: Option<&str>) -> TokenSet {
    TokenSet {
        access_token: access.to_string(),
        refresh_token: refresh.map(str::to_string),
        expires_at: Some(Utc::now() + Duration::hours(1)),
        scope: Some("https://www.googleapis.com/auth/calendar".to_string()),
    }
}

#[tokio::test]
async fn upsert_inserts_then_updates_same_active_row() -> TestResult {
    let ctx = TestContext::new().await?;
    let user_id = ctx.insert_user("smile").await?;
    let repo = ConnectionRepository::new(ctx.pool.clone());

    let (first, outcome) = repo
        .upsert_active(
            user_id,
            IntegrationProvider::GoogleCalendar,
            "front-desk@clinic.test",
            &tokens("access-1", Some("refresh-1")),
        )
        .await?;
    assert_eq!(outcome, UpsertOutcome::Inserted);

    let (second, outcome) = repo
        .upsert_active(
            user_id,
            IntegrationProvider::GoogleCalendar,
            "front-desk@clinic.test",
            &tokens("access-2", None),
        )
        .await?;
    assert_eq!(outcome, UpsertOutcome::Updated);
    assert_eq!(first.public_id, second.public_id);
    assert_eq!(second.access_token, "access-2");
    assert_eq!(
        second.refresh_token.as_deref(),
        Some("refresh-1"),
        "absent refresh token keeps the stored one"
    );

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM connections")
        .fetch_one(&ctx.pool)
        .await?;
    assert_eq!(rows, 1);
    Ok(())
}

#[tokio::test]
async fn revoke_leaves_no_active_connection() -> TestResult {
    let ctx = TestContext::new().await?;
    let user_id = ctx.insert_user("smile").await?;
    let repo = ConnectionRepository::new(ctx.pool.clone());

    repo.upsert_active(
        user_id,
        IntegrationProvider::GoogleBusiness,
        "owner@clinic.test",
        &tokens("access", Some("refresh")),
    )
    .await?;
    assert_eq!(repo.count_active(user_id).await?, 1);

    let revoked = repo
        .revoke_active(user_id, IntegrationProvider::GoogleBusiness)
        .await?;
    assert_eq!(revoked, 1);
    assert_eq!(repo.count_active(user_id).await?, 0);
    assert!(repo
        .find_active(user_id, IntegrationProvider::GoogleBusiness)
        .await?
        .is_none());

    let all = repo.list_for_user(user_id).await?;
    assert_eq!(all.len(), 1);
    assert_eq!(all[0].status, ConnectionStatus::Revoked);

    // Reconnecting after a revoke starts a fresh row.
    let (_, outcome) = repo
        .upsert_active(
            user_id,
            IntegrationProvider::GoogleBusiness,
            "owner@clinic.test",
            &tokens("access-new", Some("refresh-new")),
        )
        .await?;
    assert_eq!(outcome, UpsertOutcome::Inserted);
    assert_eq!(repo.count_active(user_id).await?, 1);
    Ok(())
}

#[tokio::test]
async fn update_tokens_preserves_refresh_token_when_absent() -> TestResult {
    let ctx = TestContext::new().await?;
    let user_id = ctx.insert_user("smile").await?;
    let repo = ConnectionRepository::new(ctx.pool.clone());

    let (connection, _) = repo
        .upsert_active(
            user_id,
            IntegrationProvider::GoogleCalendar,
            "front-desk@clinic.test",
            &tokens("stale", Some("long-lived")),
        )
        .await?;

    let later = Utc::now() + Duration::hours(2);
    let refreshed = repo
        .update_tokens(
            connection.id,
            &TokenSet {
                access_token: "fresh".into(),
                refresh_token: None,
                expires_at: Some(later),
                scope: None,
            },
        )
        .await?;

    assert_eq!(refreshed.access_token, "fresh");
    assert_eq!(refreshed.refresh_token.as_deref(), Some("long-lived"));
    assert_eq!(
        refreshed.expires_at.map(|value| value.timestamp()),
        Some(later.timestamp())
    );
    assert_eq!(refreshed.scope, connection.scope);
    Ok(())
}

#[tokio::test]
async fn user_flags_and_plan_round_trip() -> TestResult {
    let ctx = TestContext::new().await?;
    let user_id = ctx.insert_user("smile").await?;
    let repo = UserRepository::new(ctx.pool.clone());

    let user = repo.find_by_id(user_id).await?.expect("user exists");
    assert_eq!(user.plan, Plan::Free);
    assert!(!user.onboarding_completed);

    repo.set_integration_flag(user_id, IntegrationProvider::GoogleCalendar, true)
        .await?;
    let expiry = Utc::now() + Duration::days(30);
    repo.set_plan(user_id, Plan::Pro, Some(expiry)).await?;
    let user = repo.complete_onboarding(user_id).await?;

    assert!(user.google_calendar_connected);
    assert!(!user.google_business_connected);
    assert!(user.onboarding_completed);
    assert_eq!(user.plan, Plan::Pro);
    assert_eq!(
        user.plan_expires_at.map(|value| value.timestamp()),
        Some(expiry.timestamp())
    );
    Ok(())
}

#[tokio::test]
async fn contacts_filter_by_tag_and_search() -> TestResult {
    let ctx = TestContext::new().await?;
    let user_id = ctx.insert_user("smile").await?;
    let other_id = ctx.insert_user("other").await?;
    let repo = ContactRepository::new(ctx.pool.clone());

    let ana = repo
        .create(
            user_id,
            &CreateContactRequest {
                name: " Ana Souza ".into(),
                email: Some("ana@mail.test".into()),
                phone: None,
                origin: ContactOrigin::Whatsapp,
                tags: vec!["vip".into(), "VIP".into(), " implant".into()],
                notes: None,
            },
        )
        .await?;
    assert_eq!(ana.name, "Ana Souza");
    assert_eq!(ana.tags, vec!["vip", "implant"]);

    repo.create(
        user_id,
        &CreateContactRequest {
            name: "Bruno Lima".into(),
            email: None,
            phone: Some("+55 11 9999".into()),
            origin: ContactOrigin::Manual,
            tags: vec!["ortho".into()],
            notes: None,
        },
    )
    .await?;
    repo.create(
        other_id,
        &CreateContactRequest {
            name: "Ana Other".into(),
            email: None,
            phone: None,
            origin: ContactOrigin::Manual,
            tags: vec!["vip".into()],
            notes: None,
        },
    )
    .await?;

    let vip = repo
        .list(
            user_id,
            &ContactFilter {
                tag: Some("Vip".into()),
                search: None,
            },
        )
        .await?;
    assert_eq!(vip.len(), 1);
    assert_eq!(vip[0].public_id, ana.public_id);

    let by_phone = repo
        .list(
            user_id,
            &ContactFilter {
                tag: None,
                search: Some("9999".into()),
            },
        )
        .await?;
    assert_eq!(by_phone.len(), 1);
    assert_eq!(by_phone[0].name, "Bruno Lima");

    let updated = repo
        .update(
            user_id,
            &ana.public_id,
            &UpdateContactRequest {
                tags: Some(vec!["recall".into()]),
                ..Default::default()
            },
        )
        .await?
        .expect("contact exists");
    assert_eq!(updated.tags, vec!["recall"]);
    assert_eq!(updated.email.as_deref(), Some("ana@mail.test"));

    let cleared = repo
        .update(
            user_id,
            &ana.public_id,
            &UpdateContactRequest {
                email: Some(None),
                notes: Some(Some("call after 6pm".into())),
                ..Default::default()
            },
        )
        .await?
        .expect("contact exists");
    assert_eq!(cleared.email, None);
    assert_eq!(cleared.notes.as_deref(), Some("call after 6pm"));
    assert_eq!(cleared.tags, vec!["recall"]);

    assert!(repo.update(other_id, &ana.public_id, &UpdateContactRequest::default()).await?.is_none());
    assert!(!repo.delete(other_id, &ana.public_id).await?);
    assert!(repo.delete(user_id, &ana.public_id).await?);
    Ok(())
}

#[tokio::test]
async fn review_summary_averages_per_campaign() -> TestResult {
    let ctx = TestContext::new().await?;
    let user_id = ctx.insert_user("smile").await?;
    let campaigns = CampaignRepository::new(ctx.pool.clone());
    let reviews = ReviewRepository::new(ctx.pool.clone());

    let recall = campaigns
        .create(
            user_id,
            &CreateCampaignRequest {
                name: "Recall".into(),
                channel: CampaignChannel::Sms,
                message_template: "Hi {{name}}".into(),
                min_redirect_rating: 4,
                redirect_url: Some("https://g.page/r/smile/review".into()),
                is_active: true,
            },
        )
        .await?;
    let quiet = campaigns
        .create(
            user_id,
            &CreateCampaignRequest {
                name: "Quiet".into(),
                channel: CampaignChannel::Email,
                message_template: "Hello".into(),
                min_redirect_rating: 5,
                redirect_url: None,
                is_active: true,
            },
        )
        .await?;

    for rating in [5, 4, 3] {
        reviews
            .insert(
                recall.id,
                &CreateReviewRequest {
                    rating,
                    comment: None,
                    reviewer_name: None,
                    submitter_ip: Some("203.0.113.9".into()),
                    redirected: rating >= 4,
                },
            )
            .await?;
    }

    let summary = reviews.summary_for_user(user_id).await?;
    let recall_summary = summary
        .iter()
        .find(|entry| entry.campaign_public_id == recall.public_id)
        .expect("recall summary present");
    assert_eq!(recall_summary.review_count, 3);
    assert_eq!(recall_summary.average_rating, Some(4.0));

    let quiet_summary = summary
        .iter()
        .find(|entry| entry.campaign_public_id == quiet.public_id)
        .expect("quiet summary present");
    assert_eq!(quiet_summary.review_count, 0);
    assert_eq!(quiet_summary.average_rating, None);

    let listed = reviews
        .list_for_user(user_id, Some(&recall.public_id))
        .await?;
    assert_eq!(listed.len(), 3);
    assert_eq!(listed.iter().filter(|review| review.redirected).count(), 2);
    assert!(reviews
        .list_for_user(user_id, Some(&quiet.public_id))
        .await?
        .is_empty());
    Ok(())
}

#[tokio::test]
async fn billing_status_filter_and_update() -> TestResult {
    let ctx = TestContext::new().await?;
    let user_id = ctx.insert_user("smile").await?;
    let repo = BillingRepository::new(ctx.pool.clone());

    let log = repo
        .create(
            user_id,
            &CreateBillingLogRequest {
                kind: "subscription".into(),
                origin: "stripe".into(),
                amount_cents: 4_900,
                currency: "EUR".into(),
                status: BillingStatus::Pending,
                description: Some("Starter plan".into()),
            },
        )
        .await?;

    assert_eq!(repo.list(user_id, Some(BillingStatus::Paid)).await?.len(), 0);

    let paid = repo
        .update_status(user_id, &log.public_id, BillingStatus::Paid)
        .await?
        .expect("log exists");
    assert_eq!(paid.status, BillingStatus::Paid);
    assert_eq!(repo.list(user_id, Some(BillingStatus::Paid)).await?.len(), 1);
    assert_eq!(repo.list(user_id, None).await?.len(), 1);
    assert!(repo
        .update_status(user_id, "missing", BillingStatus::Failed)
        .await?
        .is_none());
    Ok(())
}

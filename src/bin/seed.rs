use legal_eye_api::{
    config::AppConfig,
    db::{DbPool, create_pool, run_migrations},
    services::credential_service::CredentialService,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;
    let credentials = CredentialService::from_config(&config);

    let pool = create_pool(&config.database_url, 2).await?;
    run_migrations(&pool).await?;

    let admin_id = ensure_user(
        &pool,
        &credentials,
        ("Site Admin", "admin@legaleye.test", "admin12345", "admin"),
    )
    .await?;
    let client_id = ensure_user(
        &pool,
        &credentials,
        ("Demo Client", "client@legaleye.test", "client12345", "client"),
    )
    .await?;
    let lawyer_user_id = ensure_user(
        &pool,
        &credentials,
        ("Priya Sharma", "lawyer@legaleye.test", "lawyer12345", "lawyer"),
    )
    .await?;
    let lawyer_id = ensure_lawyer(&pool, lawyer_user_id).await?;
    seed_availability(&pool, lawyer_id).await?;
    seed_articles(&pool, admin_id).await?;

    println!(
        "Seed completed. Admin ID: {admin_id}, Client ID: {client_id}, Lawyer ID: {lawyer_id}"
    );
    Ok(())
}

async fn ensure_user(
    pool: &DbPool,
    credentials: &CredentialService,
    (name, email, password, role): (&str, &str, &str, &str),
) -> anyhow::Result<i64> {
    let password_hash = credentials
        .hash_password(password)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (user_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO users (name, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(password_hash)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured user {email} (role={role})");
    Ok(user_id)
}

async fn ensure_lawyer(pool: &DbPool, user_id: i64) -> anyhow::Result<i64> {
    let (lawyer_id,): (i64,) = sqlx::query_as(
        r#"
        INSERT INTO lawyers (
            user_id, specialization, bar_council_number, experience, education,
            about, consultation_fee, languages, location, practice_areas
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        ON CONFLICT (user_id) DO UPDATE SET specialization = EXCLUDED.specialization
        RETURNING id
        "#,
    )
    .bind(user_id)
    .bind("Family Law")
    .bind("MAH/1234/2012")
    .bind(12_i32)
    .bind("LL.M., National Law School")
    .bind("Divorce, custody and inheritance matters.")
    .bind(1500_i64)
    .bind("English, Hindi, Marathi")
    .bind("Mumbai")
    .bind(serde_json::json!(["Divorce", "Child Custody", "Inheritance"]))
    .fetch_one(pool)
    .await?;

    println!("Ensured lawyer profile {lawyer_id}");
    Ok(lawyer_id)
}

async fn seed_availability(pool: &DbPool, lawyer_id: i64) -> anyhow::Result<()> {
    let mut tx = pool.begin().await?;
    sqlx::query("DELETE FROM availability WHERE lawyer_id = $1")
        .bind(lawyer_id)
        .execute(&mut *tx)
        .await?;

    for day in ["monday", "wednesday", "friday"] {
        for slot in ["10:00", "11:00", "15:00"] {
            sqlx::query(
                "INSERT INTO availability (lawyer_id, day_of_week, time_slot) VALUES ($1, $2, $3)",
            )
            .bind(lawyer_id)
            .bind(day)
            .bind(slot)
            .execute(&mut *tx)
            .await?;
        }
    }
    tx.commit().await?;

    println!("Seeded availability");
    Ok(())
}

async fn seed_articles(pool: &DbPool, author_id: i64) -> anyhow::Result<()> {
    let articles = [
        (
            "Understanding Tenant Rights",
            "Property",
            "What a tenant can expect from a landlord.",
            "A rental agreement binds both parties. Deposits must be returned ...",
            vec!["rent", "lease", "tenant"],
            5,
        ),
        (
            "Filing a Consumer Complaint",
            "Consumer",
            "Steps to approach a consumer forum.",
            "Collect invoices and correspondence before filing with the forum ...",
            vec!["consumer", "complaint"],
            4,
        ),
        (
            "Mutual Consent Divorce",
            "Family",
            "How mutual consent divorce proceeds.",
            "Both spouses file a joint petition after living separately ...",
            vec!["divorce", "family"],
            6,
        ),
    ];

    for (title, category, summary, content, tags, read_time) in articles {
        sqlx::query(
            r#"
            INSERT INTO legal_info (title, category, summary, content, tags, read_time, author_id)
            SELECT $1, $2, $3, $4, $5, $6, $7
            WHERE NOT EXISTS (SELECT 1 FROM legal_info WHERE title = $1)
            "#,
        )
        .bind(title)
        .bind(category)
        .bind(summary)
        .bind(content)
        .bind(serde_json::json!(tags))
        .bind(read_time)
        .bind(author_id)
        .execute(pool)
        .await?;
    }

    println!("Seeded articles");
    Ok(())
}

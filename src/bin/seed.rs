use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use craftmart_api::{config::AppConfig, db::create_pool};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = AppConfig::from_env()?;

    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let user_id = ensure_user(&pool, "user@example.com", "user123").await?;
    let inserted = seed_products(&pool).await?;

    println!("Seed completed. User ID: {user_id}, products inserted: {inserted}");
    Ok(())
}

async fn ensure_user(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!(e.to_string()))?
        .to_string();

    let row: (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<usize> {
    let existing: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM products")
        .fetch_one(pool)
        .await?;
    if existing.0 > 0 {
        return Ok(0);
    }

    // (name, category, image, unit, price, original_price, description)
    let catalog: &[(&str, &str, &str, &str, i64, Option<i64>, &str)] = &[
        (
            "Terracotta Vase",
            "pottery",
            "/images/terracotta-vase.jpg",
            "piece",
            45000,
            Some(60000),
            "Hand-thrown terracotta vase with a matte finish.",
        ),
        (
            "Blue Pottery Bowl Set",
            "pottery",
            "/images/blue-pottery-bowls.jpg",
            "set of 4",
            82000,
            None,
            "Jaipur blue pottery bowls, food safe glaze.",
        ),
        (
            "Jute Storage Basket",
            "weaving",
            "/images/jute-basket.jpg",
            "piece",
            30000,
            Some(38000),
            "Braided jute basket with cotton lining.",
        ),
        (
            "Handloom Cotton Throw",
            "textiles",
            "/images/handloom-throw.jpg",
            "piece",
            129000,
            None,
            "Naturally dyed handloom throw, 130x180 cm.",
        ),
        (
            "Block Print Table Runner",
            "textiles",
            "/images/block-print-runner.jpg",
            "piece",
            54000,
            Some(70000),
            "Hand block printed runner, indigo on off-white.",
        ),
        (
            "Brass Diya Pair",
            "metalwork",
            "/images/brass-diya.jpg",
            "pair",
            38000,
            None,
            "Cast brass oil lamps with peacock motif.",
        ),
        (
            "Carved Wooden Coasters",
            "woodwork",
            "/images/wooden-coasters.jpg",
            "set of 6",
            42000,
            None,
            "Sheesham wood coasters with floral carving.",
        ),
        (
            "Madhubani Wall Plate",
            "painting",
            "/images/madhubani-plate.jpg",
            "piece",
            95000,
            Some(110000),
            "Hand-painted Madhubani art on a ceramic plate.",
        ),
    ];

    for (name, category, image, unit, price, original_price, description) in catalog {
        sqlx::query(
            r#"
            INSERT INTO products (id, name, category, image, unit, price, original_price, description, in_stock)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE)
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(name)
        .bind(category)
        .bind(image)
        .bind(unit)
        .bind(price)
        .bind(original_price)
        .bind(description)
        .execute(pool)
        .await?;
    }

    Ok(catalog.len())
}

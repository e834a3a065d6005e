use anyhow::Context;
use furniture_shop_api::{
    db::{create_orm_conn, run_migrations, shared_pool},
    services::auth_service::hash_password,
};
use uuid::Uuid;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL is not set")?;

    let orm = create_orm_conn(&database_url).await?;
    run_migrations(&orm).await?;
    let pool = shared_pool(&orm);

    let admin_id = ensure_member(&pool, "admin", "admin@example.com", "admin1234", "ADMIN").await?;
    let member_id = ensure_member(&pool, "member", "member@example.com", "member1234", "MEMBER").await?;
    seed_products(&pool).await?;

    println!("Seed completed. Admin ID: {admin_id}, Member ID: {member_id}");
    Ok(())
}

async fn ensure_member(
    pool: &sqlx::PgPool,
    username: &str,
    email: &str,
    password: &str,
    role: &str,
) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password).map_err(|e| anyhow::anyhow!(e.to_string()))?;

    let (member_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO members (id, username, password_hash, phone, email, zip_code, city, street, gender, role)
        VALUES ($1, $2, $3, '01000000000', $4, '06236', 'Seoul', 'Teheran-ro 123', 'FEMALE', $5)
        ON CONFLICT (email) DO UPDATE SET role = EXCLUDED.role
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(username)
    .bind(password_hash)
    .bind(email)
    .bind(role)
    .fetch_one(pool)
    .await?;

    println!("Ensured member {email} (role={role})");
    Ok(member_id)
}

async fn seed_products(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    let products = [
        ("CH-OAK-01", "Oak dining chair", "CHAIR", 45_000_i64, 40, (45.0, 52.0, 88.0)),
        ("TB-WAL-01", "Walnut table", "TABLE", 320_000, 8, (160.0, 90.0, 74.0)),
        ("CL-PIN-01", "Pine closet", "CLOSET", 210_000, 5, (120.0, 60.0, 200.0)),
        ("BD-ASH-Q1", "Ash queen bed", "BED", 540_000, 3, (160.0, 210.0, 40.0)),
    ];

    for (code, name, category, price, stock, (width, length, height)) in products {
        sqlx::query(
            r#"
            INSERT INTO products (id, code, name, category, stock, price, width, length, height, description)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (code) DO NOTHING
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(code)
        .bind(name)
        .bind(category)
        .bind(stock)
        .bind(price)
        .bind(width)
        .bind(length)
        .bind(height)
        .bind(format!("{name}, sample furniture"))
        .execute(pool)
        .await?;
    }

    println!("Seeded {} products", products.len());
    Ok(())
}

use anyhow::Context;
use chrono::{Duration, Utc};
use dotenvy::dotenv;
use sqlx::SqlitePool;
use tracing::info;

use reactivities::config::Config;
use reactivities::database::{self, user_repo};
use reactivities::models::{ActivityForm, Category};
use reactivities::services::{account_service, activities_service};

const DEMO_PASSWORD: &str = "Pa$$w0rd";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    tracing_subscriber::fmt::init();

    let config = Config::from_env()?;
    let pool = database::connect(&config.database_url)
        .await
        .context("cannot connect to database")?;
    database::migrate(&pool).await?;

    let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
        .fetch_one(&pool)
        .await?;
    if users > 0 {
        info!(users, "database already seeded, nothing to do");
        return Ok(());
    }

    let bob = seed_user(&pool, "bob", "Bob").await?;
    let jane = seed_user(&pool, "jane", "Jane").await?;
    let tom = seed_user(&pool, "tom", "Tom").await?;

    let plan = [
        (&bob, "Past Activity 1", -60, Category::Drinks, "London", "Pub"),
        (&jane, "Past Activity 2", -30, Category::Culture, "Paris", "Louvre"),
        (&tom, "Future Activity 1", 30, Category::Culture, "London", "Natural History Museum"),
        (&bob, "Future Activity 2", 60, Category::Music, "London", "O2 Arena"),
        (&jane, "Future Activity 3", 90, Category::Drinks, "London", "Another pub"),
        (&tom, "Future Activity 4", 120, Category::Film, "London", "Cinema"),
        (&bob, "Future Activity 5", 150, Category::Travel, "London", "Somewhere on the Thames"),
        (&jane, "Future Activity 6", 180, Category::Food, "London", "Street market"),
    ];

    let mut created = 0;
    for (host, title, days, category, city, venue) in plan {
        let form = ActivityForm {
            id: None,
            title: title.to_string(),
            description: format!("Activity {} days from now", days),
            category: Some(category),
            date: Some(Utc::now() + Duration::days(days)),
            city: city.to_string(),
            venue: venue.to_string(),
        };
        let activity = activities_service::create(&pool, host, &form).await?;
        // Everyone else tags along.
        for guest in [&bob, &jane, &tom] {
            if guest != host {
                activities_service::update_attendance(&pool, guest, &activity.id).await?;
            }
        }
        created += 1;
    }

    println!("seeded: users=3, activities={}", created);
    Ok(())
}

async fn seed_user(pool: &SqlitePool, username: &str, display_name: &str) -> anyhow::Result<String> {
    let id = uuid::Uuid::new_v4().to_string();
    let password_hash = account_service::hash_password(DEMO_PASSWORD)?;
    user_repo::insert_user(
        pool,
        user_repo::NewUser {
            id: &id,
            username,
            email: &format!("{}@test.com", username),
            display_name,
            password_hash: &password_hash,
        },
    )
    .await?;
    Ok(id)
}

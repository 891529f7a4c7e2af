use crate::auth::hash_password;
use crate::models::{author, category, collection, collection_tags, edition, editor, tag, user, volume, Role};
use sea_orm::*;

/// Creates the bootstrap administrator unless the email is already registered.
pub async fn ensure_admin(db: &DatabaseConnection, email: &str, password: &str) -> Result<(), DbErr> {
    let existing = user::Entity::find()
        .filter(user::Column::Email.eq(email))
        .one(db)
        .await?;
    if existing.is_some() {
        tracing::debug!("Admin {} already present", email);
        return Ok(());
    }

    let password_hash = hash_password(password).map_err(DbErr::Custom)?;
    user::ActiveModel {
        email: Set(email.to_owned()),
        password_hash: Set(password_hash),
        registration_date: Set(chrono::Utc::now().to_rfc3339()),
        role: Set(Role::Admin),
        count_volume: Set(0),
        count_volume_read: Set(0),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Bootstrap admin {} created", email);
    Ok(())
}

struct DemoSeries {
    title: &'static str,
    release_date: &'static str,
    author: (&'static str, &'static str),
    category: &'static str,
    tags: &'static [&'static str],
    volumes: &'static [&'static str],
}

const DEMO_CATALOG: &[DemoSeries] = &[
    DemoSeries {
        title: "One Piece",
        release_date: "1997-07-22",
        author: ("Eiichiro", "Oda"),
        category: "Shonen",
        tags: &["Adventure", "Pirates"],
        volumes: &["Romance Dawn", "Versus the Buggy Crew", "Don't Get Fooled Again"],
    },
    DemoSeries {
        title: "Naruto",
        release_date: "1999-09-21",
        author: ("Masashi", "Kishimoto"),
        category: "Shonen",
        tags: &["Adventure", "Ninja"],
        volumes: &["Uzumaki Naruto", "The Worst Client", "Dreams"],
    },
    DemoSeries {
        title: "Vinland Saga",
        release_date: "2005-04-13",
        author: ("Makoto", "Yukimura"),
        category: "Seinen",
        tags: &["History"],
        volumes: &["Somewhere Not Here", "Sword", "Battle of London Bridge"],
    },
];

/// Loads a small manga catalog. Skipped when collections already exist.
pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    if collection::Entity::find().count(db).await? > 0 {
        tracing::info!("Catalog not empty, skipping demo data");
        return Ok(());
    }

    let publisher = editor::ActiveModel {
        name: Set("Shueisha".to_owned()),
        official_website: Set(Some("https://www.shueisha.co.jp".to_owned())),
        ..Default::default()
    }
    .insert(db)
    .await?;

    for series in DEMO_CATALOG {
        let category = match category::Entity::find()
            .filter(category::Column::Name.eq(series.category))
            .one(db)
            .await?
        {
            Some(found) => found,
            None => {
                category::ActiveModel {
                    name: Set(series.category.to_owned()),
                    ..Default::default()
                }
                .insert(db)
                .await?
            }
        };

        let writer = author::ActiveModel {
            name: Set(series.author.0.to_owned()),
            surname: Set(series.author.1.to_owned()),
            ..Default::default()
        }
        .insert(db)
        .await?;

        let created = collection::ActiveModel {
            title: Set(series.title.to_owned()),
            release_date: Set(Some(series.release_date.to_owned())),
            create_date: Set(chrono::Utc::now().format("%Y-%m-%d").to_string()),
            is_finish: Set(false),
            visibility: Set(true),
            follow_number: Set(0),
            author_id: Set(Some(writer.id)),
            category_id: Set(Some(category.id)),
            editor_id: Set(Some(publisher.id)),
            ..Default::default()
        }
        .insert(db)
        .await?;

        for name in series.tags {
            let label = match tag::Entity::find()
                .filter(tag::Column::Name.eq(*name))
                .one(db)
                .await?
            {
                Some(found) => found,
                None => {
                    tag::ActiveModel {
                        name: Set((*name).to_owned()),
                        ..Default::default()
                    }
                    .insert(db)
                    .await?
                }
            };
            collection_tags::ActiveModel {
                collection_id: Set(created.id),
                tag_id: Set(label.id),
            }
            .insert(db)
            .await?;
        }

        let original = edition::ActiveModel {
            name: Set("Original".to_owned()),
            collection_id: Set(created.id),
            ..Default::default()
        }
        .insert(db)
        .await?;

        for (index, title) in series.volumes.iter().enumerate() {
            volume::ActiveModel {
                title: Set((*title).to_owned()),
                number: Set(index as i32 + 1),
                release_date: Set(Some(series.release_date.to_owned())),
                create_date: Set(chrono::Utc::now().format("%Y-%m-%d").to_string()),
                visibility: Set(true),
                follow_number: Set(0),
                edition_id: Set(original.id),
                ..Default::default()
            }
            .insert(db)
            .await?;
        }

        tracing::debug!("Seeded {} ({} volumes)", series.title, series.volumes.len());
    }

    Ok(())
}

use sea_orm::{ConnectionTrait, Database, DatabaseConnection, DbErr, Statement};

pub async fn init_db(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(database_url).await?;

    // Run migrations manually (simple SQL)
    run_migrations(&db).await?;

    Ok(db)
}

/// Schema, in dependency order. Every statement is idempotent.
const MIGRATIONS: &[&str] = &[
    "PRAGMA foreign_keys = ON",
    r#"
    CREATE TABLE IF NOT EXISTS authors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        surname TEXT NOT NULL,
        gender TEXT,
        image TEXT,
        slug TEXT NOT NULL,
        biography TEXT,
        date_of_birth TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS categories (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        slug TEXT NOT NULL,
        description TEXT,
        image TEXT
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS editors (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        logo TEXT,
        description TEXT,
        official_website TEXT,
        slug TEXT NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tags (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS collections (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL UNIQUE,
        slug TEXT NOT NULL,
        image TEXT,
        release_date TEXT,
        create_date TEXT NOT NULL,
        is_finish BOOLEAN NOT NULL DEFAULT 0,
        visibility BOOLEAN NOT NULL DEFAULT 1,
        resume TEXT,
        follow_number INTEGER NOT NULL DEFAULT 0,
        author_id INTEGER REFERENCES authors(id) ON DELETE SET NULL,
        category_id INTEGER REFERENCES categories(id) ON DELETE SET NULL,
        editor_id INTEGER REFERENCES editors(id) ON DELETE SET NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS collection_tags (
        collection_id INTEGER NOT NULL REFERENCES collections(id) ON DELETE CASCADE ON UPDATE CASCADE,
        tag_id INTEGER NOT NULL REFERENCES tags(id) ON DELETE CASCADE ON UPDATE CASCADE,
        PRIMARY KEY (collection_id, tag_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS editions (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        slug TEXT NOT NULL,
        collection_id INTEGER NOT NULL REFERENCES collections(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS volumes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        slug TEXT NOT NULL,
        number INTEGER NOT NULL,
        release_date TEXT,
        create_date TEXT NOT NULL,
        image TEXT,
        resume TEXT,
        nbr_pages INTEGER,
        price REAL,
        visibility BOOLEAN NOT NULL DEFAULT 1,
        follow_number INTEGER NOT NULL DEFAULT 0,
        edition_id INTEGER NOT NULL REFERENCES editions(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT,
        surname TEXT,
        email TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        picture TEXT,
        registration_date TEXT NOT NULL,
        date_of_birth TEXT,
        role TEXT NOT NULL DEFAULT 'user',
        count_volume INTEGER NOT NULL DEFAULT 0,
        count_volume_read INTEGER NOT NULL DEFAULT 0,
        gender TEXT
    )
    "#,
    // No UNIQUE (volume_id, user_id): duplicates are tolerated and counted
    r#"
    CREATE TABLE IF NOT EXISTS libraries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        is_read BOOLEAN NOT NULL DEFAULT 0,
        volume_id INTEGER NOT NULL REFERENCES volumes(id),
        user_id INTEGER NOT NULL REFERENCES users(id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS wish_list (
        user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE ON UPDATE CASCADE,
        volume_id INTEGER NOT NULL REFERENCES volumes(id) ON DELETE CASCADE ON UPDATE CASCADE,
        PRIMARY KEY (user_id, volume_id)
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_collections_category ON collections(category_id)",
    "CREATE INDEX IF NOT EXISTS idx_editions_collection ON editions(collection_id)",
    "CREATE INDEX IF NOT EXISTS idx_volumes_edition ON volumes(edition_id)",
    "CREATE INDEX IF NOT EXISTS idx_libraries_user ON libraries(user_id)",
    "CREATE INDEX IF NOT EXISTS idx_libraries_volume ON libraries(volume_id)",
];

async fn run_migrations(db: &DatabaseConnection) -> Result<(), DbErr> {
    for sql in MIGRATIONS {
        db.execute(Statement::from_string(
            db.get_database_backend(),
            sql.to_string(),
        ))
        .await?;
    }

    tracing::debug!("Applied {} schema statements", MIGRATIONS.len());
    Ok(())
}

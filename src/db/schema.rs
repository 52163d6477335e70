pub const SCHEMA: &str = r#"
-- Single row present once the library has been saved
CREATE TABLE IF NOT EXISTS library (
    id INTEGER PRIMARY KEY CHECK (id = 1),
    saved_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

-- Registered usernames in registration order
CREATE TABLE IF NOT EXISTS library_users (
    username TEXT PRIMARY KEY,
    position INTEGER NOT NULL
);

-- One row per saved user
CREATE TABLE IF NOT EXISTS users (
    username TEXT PRIMARY KEY,
    saved_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP
);

CREATE TABLE IF NOT EXISTS tag_types (
    username TEXT NOT NULL,
    position INTEGER NOT NULL,
    name TEXT NOT NULL,
    PRIMARY KEY (username, position),
    FOREIGN KEY (username) REFERENCES users(username) ON DELETE CASCADE
);

-- Each distinct photo of a user is stored once, in a numbered slot
CREATE TABLE IF NOT EXISTS photos (
    username TEXT NOT NULL,
    slot INTEGER NOT NULL,
    location TEXT NOT NULL,
    caption TEXT NOT NULL,
    captured_at TEXT NOT NULL,  -- "YYYY-MM-DDTHH:MM:SS", local wall-clock time
    PRIMARY KEY (username, slot),
    FOREIGN KEY (username) REFERENCES users(username) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS photo_tags (
    username TEXT NOT NULL,
    slot INTEGER NOT NULL,
    position INTEGER NOT NULL,
    tag_type TEXT NOT NULL,
    value TEXT NOT NULL,
    PRIMARY KEY (username, slot, position),
    FOREIGN KEY (username, slot) REFERENCES photos(username, slot) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS albums (
    username TEXT NOT NULL,
    position INTEGER NOT NULL,
    name TEXT NOT NULL,
    PRIMARY KEY (username, position),
    FOREIGN KEY (username) REFERENCES users(username) ON DELETE CASCADE
);

-- Album membership; several albums may point at the same photo slot
CREATE TABLE IF NOT EXISTS album_photos (
    username TEXT NOT NULL,
    album_position INTEGER NOT NULL,
    position INTEGER NOT NULL,
    slot INTEGER NOT NULL,
    PRIMARY KEY (username, album_position, position),
    FOREIGN KEY (username, album_position) REFERENCES albums(username, position) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_library_users_position ON library_users(position);
"#;

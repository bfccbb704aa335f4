//! SQL schema for the compatibility SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
///
/// A rating row cannot exist without the membership (person) or season link
/// (relationship) it is scoped to. Rating types do not cascade; their
/// ratings are removed by `graph::delete_rating_type`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS people (
    person_id     INTEGER PRIMARY KEY,
    first_name    TEXT NOT NULL,
    last_name     TEXT NOT NULL,
    date_of_birth TEXT NOT NULL,            -- ISO 8601 date
    home_city     TEXT NOT NULL DEFAULT '',
    home_country  TEXT NOT NULL DEFAULT '',
    person_type   TEXT NOT NULL DEFAULT '',
    gender        TEXT NOT NULL DEFAULT '',
    image_path    TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS seasons (
    season       INTEGER PRIMARY KEY,
    air_date     TEXT NOT NULL,
    filming_date TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS person_seasons (
    person_id INTEGER NOT NULL REFERENCES people(person_id) ON DELETE CASCADE,
    season    INTEGER NOT NULL,
    PRIMARY KEY (person_id, season)
);

-- One row per unordered pair; the column order carries no meaning.
CREATE TABLE IF NOT EXISTS relationships (
    relationship_id   INTEGER PRIMARY KEY,
    person_id_1       INTEGER NOT NULL REFERENCES people(person_id) ON DELETE CASCADE,
    person_id_2       INTEGER NOT NULL REFERENCES people(person_id) ON DELETE CASCADE,
    relationship_type TEXT NOT NULL,
    image_path        TEXT NOT NULL DEFAULT '',
    CHECK (person_id_1 != person_id_2)
);

CREATE UNIQUE INDEX IF NOT EXISTS relationships_pair_idx
    ON relationships (min(person_id_1, person_id_2), max(person_id_1, person_id_2));

CREATE TABLE IF NOT EXISTS relationship_seasons (
    season          INTEGER NOT NULL,
    relationship_id INTEGER NOT NULL
        REFERENCES relationships(relationship_id) ON DELETE CASCADE,
    PRIMARY KEY (season, relationship_id)
);

CREATE TABLE IF NOT EXISTS rating_types (
    rating_type_id INTEGER PRIMARY KEY,
    name           TEXT NOT NULL,
    weight         TEXT NOT NULL,           -- decimal string
    category       TEXT NOT NULL DEFAULT ''
);

CREATE TABLE IF NOT EXISTS person_ratings (
    person_id      INTEGER NOT NULL,
    season         INTEGER NOT NULL,
    rating_type_id INTEGER NOT NULL REFERENCES rating_types(rating_type_id),
    rating_value   TEXT NOT NULL,           -- decimal string
    PRIMARY KEY (person_id, season, rating_type_id),
    FOREIGN KEY (person_id, season)
        REFERENCES person_seasons(person_id, season) ON DELETE CASCADE
);

CREATE TABLE IF NOT EXISTS relationship_ratings (
    relationship_id INTEGER NOT NULL,
    season          INTEGER NOT NULL,
    rating_type_id  INTEGER NOT NULL REFERENCES rating_types(rating_type_id),
    rating_value    TEXT NOT NULL,          -- decimal string
    PRIMARY KEY (relationship_id, season, rating_type_id),
    FOREIGN KEY (season, relationship_id)
        REFERENCES relationship_seasons(season, relationship_id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS relationship_seasons_rel_idx ON relationship_seasons(relationship_id);
CREATE INDEX IF NOT EXISTS person_ratings_type_idx       ON person_ratings(rating_type_id);
CREATE INDEX IF NOT EXISTS relationship_ratings_type_idx ON relationship_ratings(rating_type_id);

PRAGMA user_version = 1;
";

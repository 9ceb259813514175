//! SQL schema for the Tally SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS players (
    player_id  INTEGER PRIMARY KEY,
    name       TEXT    NOT NULL,
    restricted INTEGER NOT NULL DEFAULT 0
);

CREATE TABLE IF NOT EXISTS maps (
    md5     TEXT    PRIMARY KEY,
    map_id  INTEGER NOT NULL UNIQUE,
    set_id  INTEGER NOT NULL,
    status  INTEGER NOT NULL,       -- RankedStatus discriminant
    plays   INTEGER NOT NULL DEFAULT 0,
    passes  INTEGER NOT NULL DEFAULT 0
);

-- Results are never deleted; only `status` is ever updated.
CREATE TABLE IF NOT EXISTS scores (
    score_id        INTEGER PRIMARY KEY AUTOINCREMENT,
    map_md5         TEXT    NOT NULL,
    player_id       INTEGER NOT NULL REFERENCES players(player_id),
    ruleset         INTEGER NOT NULL,
    mods            INTEGER NOT NULL,
    n300            INTEGER NOT NULL,
    n100            INTEGER NOT NULL,
    n50             INTEGER NOT NULL,
    ngeki           INTEGER NOT NULL,
    nkatu           INTEGER NOT NULL,
    nmiss           INTEGER NOT NULL,
    raw_score       INTEGER NOT NULL,
    max_combo       INTEGER NOT NULL,
    perfect         INTEGER NOT NULL,
    grade           TEXT    NOT NULL,
    passed          INTEGER NOT NULL,
    accuracy        REAL    NOT NULL,
    pp              REAL    NOT NULL,
    star_rating     REAL    NOT NULL,
    client_time     TEXT    NOT NULL,   -- client-local, no zone
    server_time     TEXT    NOT NULL,   -- RFC 3339 UTC
    time_elapsed_ms INTEGER NOT NULL,
    client_flags    INTEGER NOT NULL,
    online_checksum TEXT    NOT NULL UNIQUE,
    status          INTEGER NOT NULL    -- 0 failed, 1 submitted, 2 best
);

-- At most one best per (player, map, ruleset).
CREATE UNIQUE INDEX IF NOT EXISTS scores_one_best_idx
    ON scores(player_id, map_md5, ruleset) WHERE status = 2;
CREATE INDEX IF NOT EXISTS scores_board_idx
    ON scores(map_md5, ruleset, status);
CREATE INDEX IF NOT EXISTS scores_player_idx
    ON scores(player_id, ruleset, status);

CREATE TABLE IF NOT EXISTS stats (
    player_id     INTEGER NOT NULL REFERENCES players(player_id),
    ruleset       INTEGER NOT NULL,
    total_score   INTEGER NOT NULL DEFAULT 0,
    ranked_score  INTEGER NOT NULL DEFAULT 0,
    pp            REAL    NOT NULL DEFAULT 0,
    accuracy      REAL    NOT NULL DEFAULT 0,
    plays         INTEGER NOT NULL DEFAULT 0,
    playtime_secs INTEGER NOT NULL DEFAULT 0,
    max_combo     INTEGER NOT NULL DEFAULT 0,
    total_hits    INTEGER NOT NULL DEFAULT 0,
    xh_count      INTEGER NOT NULL DEFAULT 0,
    x_count       INTEGER NOT NULL DEFAULT 0,
    sh_count      INTEGER NOT NULL DEFAULT 0,
    s_count       INTEGER NOT NULL DEFAULT 0,
    a_count       INTEGER NOT NULL DEFAULT 0,
    version       INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (player_id, ruleset)
);

CREATE TABLE IF NOT EXISTS achievements (
    achievement_id INTEGER PRIMARY KEY,
    file           TEXT NOT NULL UNIQUE,
    name           TEXT NOT NULL,
    description    TEXT NOT NULL,
    condition_json TEXT NOT NULL
);

-- Unlocks are append-only.
CREATE TABLE IF NOT EXISTS player_achievements (
    player_id      INTEGER NOT NULL REFERENCES players(player_id),
    achievement_id INTEGER NOT NULL REFERENCES achievements(achievement_id),
    unlocked_at    TEXT    NOT NULL,
    UNIQUE (player_id, achievement_id)
);

PRAGMA user_version = 1;
";

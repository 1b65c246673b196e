/// SQL schema for the Reelfeed database
/// Creates all tables with proper constraints, foreign keys, and indexes
pub const SCHEMA: &str = r#"
-- Users table
CREATE TABLE IF NOT EXISTS users (
    id TEXT PRIMARY KEY,
    username TEXT UNIQUE NOT NULL,
    bio TEXT,
    join_date TEXT NOT NULL
);

-- Locally cached movie records, keyed by the external catalog id.
-- Rows are created lazily on first reference and never deleted.
CREATE TABLE IF NOT EXISTS movies (
    tmdb_id INTEGER PRIMARY KEY,
    title TEXT NOT NULL,
    poster_path TEXT,
    release_year INTEGER,
    release_date TEXT,
    cached_at TEXT NOT NULL
);

-- Reviews table; one review per (author, movie)
CREATE TABLE IF NOT EXISTS reviews (
    id TEXT PRIMARY KEY,
    author_id TEXT NOT NULL,
    tmdb_id INTEGER NOT NULL,
    rating INTEGER NOT NULL CHECK(rating BETWEEN 0 AND 10),
    body TEXT,
    created_at TEXT NOT NULL,
    UNIQUE (author_id, tmdb_id),
    FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (tmdb_id) REFERENCES movies(tmdb_id)
);

-- Feed queries sort by recency with the id as a stable tiebreak
CREATE INDEX IF NOT EXISTS idx_reviews_created_at ON reviews(created_at DESC, id DESC);
CREATE INDEX IF NOT EXISTS idx_reviews_author ON reviews(author_id);
CREATE INDEX IF NOT EXISTS idx_reviews_tmdb ON reviews(tmdb_id);

-- Reactions table; at most one reaction per (review, reactor),
-- a repeat reaction replaces the type
CREATE TABLE IF NOT EXISTS reactions (
    review_id TEXT NOT NULL,
    reactor_id TEXT NOT NULL,
    reaction_type TEXT NOT NULL CHECK(reaction_type IN ('like', 'love', 'funny', 'wow')),
    created_at TEXT NOT NULL,
    PRIMARY KEY (review_id, reactor_id),
    FOREIGN KEY (review_id) REFERENCES reviews(id) ON DELETE CASCADE,
    FOREIGN KEY (reactor_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_reactions_review ON reactions(review_id);

-- Comments table
CREATE TABLE IF NOT EXISTS comments (
    id TEXT PRIMARY KEY,
    review_id TEXT NOT NULL,
    author_id TEXT NOT NULL,
    text TEXT NOT NULL,
    created_at TEXT NOT NULL,
    FOREIGN KEY (review_id) REFERENCES reviews(id) ON DELETE CASCADE,
    FOREIGN KEY (author_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_comments_review ON comments(review_id);

-- Follows table (one-way relationships)
CREATE TABLE IF NOT EXISTS follows (
    follower_id TEXT NOT NULL,
    followee_id TEXT NOT NULL,
    created_at INTEGER NOT NULL,
    PRIMARY KEY (follower_id, followee_id),
    FOREIGN KEY (follower_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (followee_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_follows_follower ON follows(follower_id);
CREATE INDEX IF NOT EXISTS idx_follows_followee ON follows(followee_id);

-- Watchlist; reviewing a movie removes it from the author's watchlist
CREATE TABLE IF NOT EXISTS watchlist (
    user_id TEXT NOT NULL,
    tmdb_id INTEGER NOT NULL,
    added_at TEXT NOT NULL,
    PRIMARY KEY (user_id, tmdb_id),
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (tmdb_id) REFERENCES movies(tmdb_id)
);

-- Append-only notification events; is_read only ever flips 0 -> 1
CREATE TABLE IF NOT EXISTS notifications (
    id TEXT PRIMARY KEY,
    recipient_id TEXT NOT NULL,
    sender_id TEXT NOT NULL,
    kind TEXT NOT NULL CHECK(kind IN ('new_follower', 'new_reaction', 'new_comment')),
    review_id TEXT,
    created_at TEXT NOT NULL,
    is_read INTEGER NOT NULL DEFAULT 0,
    FOREIGN KEY (recipient_id) REFERENCES users(id) ON DELETE CASCADE,
    FOREIGN KEY (sender_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_notifications_recipient ON notifications(recipient_id, created_at DESC);

-- Sessions table for authentication
CREATE TABLE IF NOT EXISTS sessions (
    token TEXT PRIMARY KEY,
    user_id TEXT NOT NULL,
    created_at TEXT NOT NULL,
    expires_at TEXT NOT NULL,
    FOREIGN KEY (user_id) REFERENCES users(id) ON DELETE CASCADE
);

CREATE INDEX IF NOT EXISTS idx_sessions_user_id ON sessions(user_id);
CREATE INDEX IF NOT EXISTS idx_sessions_expires_at ON sessions(expires_at);
"#;

/// Test data for development and testing:
/// - 4 test users (alice, bob, charlie, diana)
/// - A handful of cached movies
/// - Reviews with reactions and comments
/// - Follow relationships and watchlist entries
pub const TEST_DATA: &str = r#"
-- ============================================================================
-- TEST USERS
-- ============================================================================
INSERT OR IGNORE INTO users (id, username, bio, join_date) VALUES
    ('550e8400-e29b-41d4-a716-446655440001', 'alice', 'Criterion collection completionist', '2024-01-01T00:00:00+00:00'),
    ('550e8400-e29b-41d4-a716-446655440002', 'bob', 'Will defend any Nicolas Cage movie', '2024-01-02T00:00:00+00:00'),
    ('550e8400-e29b-41d4-a716-446655440003', 'charlie', 'Documentaries and slow cinema', '2024-01-03T00:00:00+00:00'),
    ('550e8400-e29b-41d4-a716-446655440004', 'diana', 'Horror before midnight, musicals after', '2024-01-04T00:00:00+00:00');

-- ============================================================================
-- CACHED MOVIES
-- ============================================================================
INSERT OR IGNORE INTO movies (tmdb_id, title, poster_path, release_year, release_date, cached_at) VALUES
    (278, 'The Shawshank Redemption', '/q6y0Go1tsGEsmtFryDOJo3dEmqu.jpg', 1994, '1994-09-23', '2024-02-01T00:00:00+00:00'),
    (550, 'Fight Club', '/pB8BM7pdSp6B6Ih7QZ4DrQ3PmJK.jpg', 1999, '1999-10-15', '2024-02-01T00:00:00+00:00'),
    (603, 'The Matrix', '/f89U3ADr1oiB1s9GkdPOEpXUk5H.jpg', 1999, '1999-03-30', '2024-02-01T00:00:00+00:00'),
    (155, 'The Dark Knight', '/qJ2tW6WMUDux911r6m7haRef0WH.jpg', 2008, '2008-07-16', '2024-02-01T00:00:00+00:00'),
    (27205, 'Inception', '/oYuLEt3zVCKq57qu2F8dT7NIa6f.jpg', 2010, '2010-07-15', '2024-02-01T00:00:00+00:00');

-- ============================================================================
-- SAMPLE REVIEWS
-- ============================================================================
INSERT OR IGNORE INTO reviews (id, author_id, tmdb_id, rating, body, created_at) VALUES
    -- Bob's reviews
    ('650e8400-e29b-41d4-a716-446655440001', '550e8400-e29b-41d4-a716-446655440002', 278, 9, 'Still lands every single time.', '2024-02-08T10:00:00+00:00'),
    ('650e8400-e29b-41d4-a716-446655440002', '550e8400-e29b-41d4-a716-446655440002', 603, 8, 'The lobby scene alone is worth the rewatch.', '2024-02-09T14:30:00+00:00'),
    -- Charlie's reviews
    ('650e8400-e29b-41d4-a716-446655440003', '550e8400-e29b-41d4-a716-446655440003', 550, 6, 'Louder than it is clever, but it is pretty loud.', '2024-02-10T09:15:00+00:00'),
    ('650e8400-e29b-41d4-a716-446655440004', '550e8400-e29b-41d4-a716-446655440003', 27205, 9, 'A heist movie wearing a physics paper as a trench coat.', '2024-02-11T16:45:00+00:00'),
    -- Diana's reviews
    ('650e8400-e29b-41d4-a716-446655440005', '550e8400-e29b-41d4-a716-446655440004', 155, 10, 'The rare sequel that resets the ceiling.', '2024-02-12T08:00:00+00:00');

-- ============================================================================
-- REACTIONS
-- ============================================================================
INSERT OR IGNORE INTO reactions (review_id, reactor_id, reaction_type, created_at) VALUES
    ('650e8400-e29b-41d4-a716-446655440001', '550e8400-e29b-41d4-a716-446655440001', 'love', '2024-02-08T10:05:00+00:00'),
    ('650e8400-e29b-41d4-a716-446655440001', '550e8400-e29b-41d4-a716-446655440003', 'like', '2024-02-08T11:00:00+00:00'),
    ('650e8400-e29b-41d4-a716-446655440003', '550e8400-e29b-41d4-a716-446655440002', 'funny', '2024-02-10T10:00:00+00:00'),
    ('650e8400-e29b-41d4-a716-446655440005', '550e8400-e29b-41d4-a716-446655440001', 'wow', '2024-02-12T09:00:00+00:00');

-- ============================================================================
-- COMMENTS
-- ============================================================================
INSERT OR IGNORE INTO comments (id, review_id, author_id, text, created_at) VALUES
    ('750e8400-e29b-41d4-a716-446655440001', '650e8400-e29b-41d4-a716-446655440001', '550e8400-e29b-41d4-a716-446655440001', 'Get busy living, indeed.', '2024-02-08T10:10:00+00:00'),
    ('750e8400-e29b-41d4-a716-446655440002', '650e8400-e29b-41d4-a716-446655440003', '550e8400-e29b-41d4-a716-446655440004', 'First rule of this comment section...', '2024-02-10T11:30:00+00:00'),
    ('750e8400-e29b-41d4-a716-446655440003', '650e8400-e29b-41d4-a716-446655440004', '550e8400-e29b-41d4-a716-446655440001', 'The hallway fight still holds up.', '2024-02-11T17:00:00+00:00');

-- ============================================================================
-- SOCIAL CONNECTIONS (Follows)
-- ============================================================================
INSERT OR IGNORE INTO follows (follower_id, followee_id, created_at) VALUES
    -- Alice follows everyone
    ('550e8400-e29b-41d4-a716-446655440001', '550e8400-e29b-41d4-a716-446655440002', 1704672000),
    ('550e8400-e29b-41d4-a716-446655440001', '550e8400-e29b-41d4-a716-446655440003', 1704672000),
    ('550e8400-e29b-41d4-a716-446655440001', '550e8400-e29b-41d4-a716-446655440004', 1704758400),
    -- Bob and Charlie follow each other
    ('550e8400-e29b-41d4-a716-446655440002', '550e8400-e29b-41d4-a716-446655440003', 1704672000),
    ('550e8400-e29b-41d4-a716-446655440003', '550e8400-e29b-41d4-a716-446655440002', 1704672000),
    -- Diana follows Alice
    ('550e8400-e29b-41d4-a716-446655440004', '550e8400-e29b-41d4-a716-446655440001', 1704758400);

-- ============================================================================
-- WATCHLIST
-- ============================================================================
INSERT OR IGNORE INTO watchlist (user_id, tmdb_id, added_at) VALUES
    ('550e8400-e29b-41d4-a716-446655440001', 155, '2024-02-05T00:00:00+00:00'),
    ('550e8400-e29b-41d4-a716-446655440001', 27205, '2024-02-06T00:00:00+00:00'),
    ('550e8400-e29b-41d4-a716-446655440002', 550, '2024-02-07T00:00:00+00:00');
"#;

use super::state::FeedState;
use super::parse_review_input;

use proptest::prelude::*;
use reelfeed_types::{FeedItem, FeedPage};
use uuid::Uuid;

/// Build a feed item whose id is derived from a small integer, so tests can
/// talk about "r5" and friends.
fn item(n: u32) -> FeedItem {
    FeedItem {
        review_id: Uuid::from_u128(n as u128),
        author_id: Uuid::from_u128(1000 + n as u128),
        author_username: format!("user{}", n),
        tmdb_id: n as i64,
        movie_title: format!("Movie {}", n),
        poster_path: None,
        release_year: Some(2020),
        rating: 7,
        body: None,
        created_at: chrono::Utc::now(),
        reaction_counts: Default::default(),
        comment_count: 0,
    }
}

fn page(number: u32, items: Vec<FeedItem>, has_more: bool) -> FeedPage {
    FeedPage {
        page: number,
        items,
        has_more,
    }
}

fn ids(state: &FeedState) -> Vec<u128> {
    state.items.iter().map(|i| i.review_id.as_u128()).collect()
}

#[test]
fn test_reload_after_interaction_merges_without_duplicates() {
    // Client holds page 1 = [r5, r4, r3]; a reload returns [r6, r5, r4, r3]
    let mut state = FeedState::new();
    state.merge_page(vec![item(5), item(4), item(3)]);

    state.merge_page(vec![item(6), item(5), item(4), item(3)]);

    // Merged local state keeps one instance per id
    assert_eq!(ids(&state), vec![5, 4, 3, 6]);

    // The real interaction flow resets before re-fetching page 1, which
    // restores the server's order exactly
    let mut state = FeedState::new();
    state.merge_page(vec![item(5), item(4), item(3)]);
    state.reset();
    let (_, generation) = state.begin_load().unwrap();
    state.apply_page(
        generation,
        page(1, vec![item(6), item(5), item(4), item(3)], false),
    );
    assert_eq!(ids(&state), vec![6, 5, 4, 3]);
}

#[test]
fn test_merge_preserves_server_order_for_consecutive_pages() {
    let mut state = FeedState::new();
    state.merge_page(vec![item(9), item(8), item(7)]);
    state.merge_page(vec![item(6), item(5)]);
    assert_eq!(ids(&state), vec![9, 8, 7, 6, 5]);
}

#[test]
fn test_single_flight_guard_blocks_second_load() {
    let mut state = FeedState::new();
    let first = state.begin_load();
    assert!(first.is_some());

    // Second trigger while Loading is a no-op
    assert!(state.begin_load().is_none());

    // Once the page lands the next trigger goes through
    let (_, generation) = first.unwrap();
    state.apply_page(generation, page(1, vec![item(1)], true));
    assert!(state.begin_load().is_some());
}

#[test]
fn test_exhausted_feed_stops_loading() {
    let mut state = FeedState::new();
    let (_, generation) = state.begin_load().unwrap();
    state.apply_page(generation, page(1, vec![item(1), item(2)], false));

    assert!(state.at_end_of_feed);
    assert!(state.begin_load().is_none());
}

#[test]
fn test_stale_response_after_reset_is_dropped() {
    let mut state = FeedState::new();
    state.merge_page(vec![item(3)]);

    let (_, stale_generation) = state.begin_load().unwrap();

    // An interaction resets the feed while the fetch is in flight
    state.reset();
    assert!(state.items.is_empty());

    // The stale response resolves afterwards and must not be merged
    state.apply_page(stale_generation, page(2, vec![item(2), item(1)], true));
    assert!(state.items.is_empty());
    assert_eq!(state.next_page, 1);

    // Same for a stale error: it must not clobber the fresh state
    state.apply_error(stale_generation, "boom".to_string());
    assert!(state.error.is_none());
}

#[test]
fn test_error_halts_pagination_until_retry() {
    let mut state = FeedState::new();
    let (_, generation) = state.begin_load().unwrap();
    state.apply_error(generation, "connection refused".to_string());

    assert!(!state.loading);
    assert!(state.error.is_some());

    // Retry is an explicit new load, not an automatic one
    assert!(state.begin_load().is_some());
    assert!(state.error.is_none());
}

#[test]
fn test_reset_restarts_from_page_one() {
    let mut state = FeedState::new();
    let (page_number, generation) = state.begin_load().unwrap();
    assert_eq!(page_number, 1);
    state.apply_page(generation, page(1, vec![item(1)], true));
    assert_eq!(state.next_page, 2);

    state.reset();
    assert_eq!(state.next_page, 1);
    assert!(state.pending_load);
    let (page_number, _) = state.begin_load().unwrap();
    assert_eq!(page_number, 1);
}

#[test]
fn test_selection_past_end_requests_next_page() {
    let mut state = FeedState::new();
    state.merge_page(vec![item(2), item(1)]);

    assert!(!state.select_next()); // selects index 0
    assert!(!state.select_next()); // selects index 1
    assert!(state.select_next(), "running off the end should request more");

    state.at_end_of_feed = true;
    assert!(!state.select_next(), "exhausted feed requests nothing");
}

#[test]
fn test_parse_review_input() {
    assert_eq!(parse_review_input("550 8"), Some((550, 8, None)));
    assert_eq!(
        parse_review_input("550 8 louder than it is clever"),
        Some((550, 8, Some("louder than it is clever".to_string())))
    );
    assert_eq!(parse_review_input("550"), None);
    assert_eq!(parse_review_input("550 11"), None);
    assert_eq!(parse_review_input("not a number 5"), None);
    assert_eq!(parse_review_input(""), None);
}

proptest! {
    /// For arbitrary page overlap, the merge never duplicates an id and
    /// never reorders previously accumulated items.
    #[test]
    fn prop_merge_is_duplicate_free_and_order_preserving(
        first in proptest::collection::vec(0u32..50, 0..30),
        second in proptest::collection::vec(0u32..50, 0..30),
    ) {
        let mut state = FeedState::new();
        state.merge_page(first.iter().map(|&n| item(n)).collect());
        let before = ids(&state);

        state.merge_page(second.iter().map(|&n| item(n)).collect());
        let after = ids(&state);

        // No duplicates
        let mut sorted = after.clone();
        sorted.sort_unstable();
        sorted.dedup();
        prop_assert_eq!(sorted.len(), after.len());

        // The previously accumulated prefix is untouched
        prop_assert_eq!(&after[..before.len()], &before[..]);

        // Everything from either input is present
        for n in first.iter().chain(second.iter()) {
            prop_assert!(after.contains(&(*n as u128)));
        }
    }
}

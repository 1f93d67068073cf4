//! Integration tests for keyset pagination over SQLite
//!
//! These tests page through fixed datasets and check:
//! - every row is visited exactly once, in the unpaginated order
//! - paging backward reproduces the forward sequence in reverse
//! - ties on non-unique sort keys are broken by the identifier
//! - metadata-backed sort keys and filter clauses
//! - stale cursors fall back to identifier comparison

use std::cmp::Ordering;

use wpgraph_cursor::CursorConfig;
use wpgraph_cursor::entity::{EntityKind, Item};
use wpgraph_cursor::graphql::pagination::{Connection, ConnectionArgs};
use wpgraph_cursor::query::{ListQueryState, MetaClause, OrderDirection};
use wpgraph_cursor::sqlite::{ListQuery, SqliteStore, fetch_connection};

// ============================================================================
// Fixtures
// ============================================================================

struct Post {
    id: i64,
    title: &'static str,
    date: &'static str,
    price: &'static str,
    rating: &'static str,
    featured: bool,
}

const fn post(
    id: i64,
    title: &'static str,
    date: &'static str,
    price: &'static str,
    rating: &'static str,
    featured: bool,
) -> Post {
    Post {
        id,
        title,
        date,
        price,
        rating,
        featured,
    }
}

const POSTS: &[Post] = &[
    post(1, "Banana", "2024-01-03 00:00:00", "10", "4", true),
    post(2, "Apple", "2024-01-05 00:00:00", "9", "2", false),
    post(3, "Cherry", "2024-01-01 00:00:00", "100", "5", true),
    post(4, "Apple", "2024-01-05 00:00:00", "9", "1", true),
    post(5, "Banana", "2024-01-02 00:00:00", "25", "3", false),
    post(6, "Apple", "2024-01-01 00:00:00", "3", "2", true),
    post(7, "Date", "2024-01-04 00:00:00", "10", "1", false),
    post(8, "Cherry", "2024-01-04 00:00:00", "250", "4", true),
    post(9, "Banana", "2024-01-03 00:00:00", "10", "4", true),
];

async fn store() -> SqliteStore {
    let store = SqliteStore::connect("sqlite::memory:", "wp_").await.unwrap();
    store.create_tables().await.unwrap();
    store
}

async fn post_store() -> SqliteStore {
    let store = store().await;
    for post in POSTS {
        let item = Item::new(EntityKind::Post, post.id)
            .with_attribute("post_title", post.title)
            .with_attribute("post_date", post.date)
            .with_meta("price", post.price)
            .with_meta("rating", post.rating)
            .with_meta("featured", if post.featured { "yes" } else { "no" });
        store.insert_item(&item).await.unwrap();
    }
    store
}

async fn titled_store(titles: &[&str]) -> SqliteStore {
    let store = store().await;
    for (i, title) in titles.iter().enumerate() {
        let item = Item::new(EntityKind::Post, i as i64 + 1)
            .with_attribute("post_title", *title)
            .with_attribute("post_date", "2024-01-01 00:00:00");
        store.insert_item(&item).await.unwrap();
    }
    store
}

fn ids(connection: &Connection<Item>) -> Vec<i64> {
    connection.edges.iter().map(|e| e.node.id).collect()
}

/// Page forward from the start until the last page.
async fn page_forward(
    store: &SqliteStore,
    kind: EntityKind,
    state: &ListQueryState,
    page_size: i32,
) -> Vec<i64> {
    let config = CursorConfig::default();
    let mut visited = Vec::new();
    let mut after = None;

    for _ in 0..100 {
        let args = ConnectionArgs::forward(Some(page_size), after.clone());
        let page = fetch_connection(store, kind, state, &args, &config).await.unwrap();
        assert!(page.edges.len() <= page_size as usize);
        visited.extend(ids(&page));

        if !page.page_info.has_next_page {
            return visited;
        }
        after = page.page_info.end_cursor.clone();
    }
    panic!("pagination did not terminate");
}

/// Page backward from `before` until the first page, returning rows in forward order.
async fn page_backward(
    store: &SqliteStore,
    kind: EntityKind,
    state: &ListQueryState,
    page_size: i32,
    before: String,
) -> Vec<i64> {
    let config = CursorConfig::default();
    let mut visited = Vec::new();
    let mut before = Some(before);

    for _ in 0..100 {
        let args = ConnectionArgs::backward(Some(page_size), before.clone());
        let page = fetch_connection(store, kind, state, &args, &config).await.unwrap();
        let mut page_ids = ids(&page);
        page_ids.extend(visited);
        visited = page_ids;

        if !page.page_info.has_previous_page {
            return visited;
        }
        before = page.page_info.start_cursor.clone();
    }
    panic!("pagination did not terminate");
}

/// Full, unpaginated order of the list.
async fn unpaginated(store: &SqliteStore, kind: EntityKind, state: &ListQueryState) -> Vec<i64> {
    ListQuery::new(store.schema(kind), state.clone())
        .fetch_ids(store.pool())
        .await
        .unwrap()
}

fn expected_order(compare: impl Fn(&Post, &Post) -> Ordering) -> Vec<i64> {
    let mut posts: Vec<&Post> = POSTS.iter().collect();
    posts.sort_by(|a, b| compare(a, b).then(a.id.cmp(&b.id)));
    posts.iter().map(|p| p.id).collect()
}

fn num(value: &str) -> i64 {
    value.parse().unwrap()
}

// ============================================================================
// No duplicates, no gaps
// ============================================================================

mod traversal {
    use super::*;

    async fn assert_traversal(state: ListQueryState, expected: Vec<i64>) {
        let store = post_store().await;
        assert_eq!(unpaginated(&store, EntityKind::Post, &state).await, expected);

        for page_size in 1..=POSTS.len() as i32 + 1 {
            let visited = page_forward(&store, EntityKind::Post, &state, page_size).await;
            assert_eq!(visited, expected, "page size {}", page_size);
        }
    }

    #[tokio::test]
    async fn test_default_date_order() {
        let expected = expected_order(|a, b| a.date.cmp(b.date));
        assert_traversal(ListQueryState::new(), expected).await;
    }

    #[tokio::test]
    async fn test_title_with_ties() {
        let state = ListQueryState::new().order_by("title", Some(OrderDirection::Asc));
        let expected = expected_order(|a, b| a.title.cmp(b.title));
        assert_traversal(state, expected).await;
    }

    #[tokio::test]
    async fn test_title_descending() {
        let state = ListQueryState::new().order_by("title", Some(OrderDirection::Desc));
        let expected = expected_order(|a, b| b.title.cmp(a.title));
        assert_traversal(state, expected).await;
    }

    #[tokio::test]
    async fn test_mixed_directions() {
        let state = ListQueryState::new()
            .order_by_many([("title", OrderDirection::Asc), ("date", OrderDirection::Desc)]);
        let expected = expected_order(|a, b| a.title.cmp(b.title).then(b.date.cmp(a.date)));
        assert_traversal(state, expected).await;
    }

    #[tokio::test]
    async fn test_numeric_meta_value() {
        let state = ListQueryState::new()
            .meta_key("price", None)
            .order_by("meta_value_num", Some(OrderDirection::Desc));
        let expected = expected_order(|a, b| num(b.price).cmp(&num(a.price)));
        assert_traversal(state, expected).await;
    }

    #[tokio::test]
    async fn test_two_meta_clauses() {
        let state = ListQueryState::new()
            .meta_clause(MetaClause::new("price_clause", "price").with_type("NUMERIC"))
            .meta_clause(MetaClause::new("rating_clause", "rating").with_type("SIGNED"))
            .order_by_many([
                ("price_clause", OrderDirection::Desc),
                ("rating_clause", OrderDirection::Asc),
            ]);
        let expected = expected_order(|a, b| {
            num(b.price)
                .cmp(&num(a.price))
                .then(num(a.rating).cmp(&num(b.rating)))
        });
        assert_traversal(state, expected).await;
    }

    #[tokio::test]
    async fn test_filter_clause_with_sort() {
        let store = post_store().await;
        let state = ListQueryState::new()
            .meta_clause(MetaClause::new("featured", "featured").with_value("yes"))
            .order_by("title", Some(OrderDirection::Asc));

        let expected: Vec<i64> = expected_order(|a, b| a.title.cmp(b.title))
            .into_iter()
            .filter(|id| POSTS.iter().any(|p| p.id == *id && p.featured))
            .collect();

        for page_size in 1..=4 {
            let visited = page_forward(&store, EntityKind::Post, &state, page_size).await;
            assert_eq!(visited, expected, "page size {}", page_size);
        }
    }
}

// ============================================================================
// Direction symmetry
// ============================================================================

mod symmetry {
    use super::*;

    async fn assert_symmetric(state: ListQueryState) {
        let store = post_store().await;
        let config = CursorConfig::default();
        let forward = page_forward(&store, EntityKind::Post, &state, 2).await;

        // Cursor of the last row of the forward traversal
        let all = fetch_connection(
            &store,
            EntityKind::Post,
            &state,
            &ConnectionArgs::forward(Some(100), None),
            &config,
        )
        .await
        .unwrap();
        let last = all.page_info.end_cursor.clone().unwrap();

        for page_size in 1..=4 {
            let mut backward =
                page_backward(&store, EntityKind::Post, &state, page_size, last.clone()).await;
            backward.push(*forward.last().unwrap());
            assert_eq!(backward, forward, "page size {}", page_size);
        }
    }

    #[tokio::test]
    async fn test_default_order_backward() {
        assert_symmetric(ListQueryState::new()).await;
    }

    #[tokio::test]
    async fn test_title_backward() {
        assert_symmetric(ListQueryState::new().order_by("title", None)).await;
    }

    #[tokio::test]
    async fn test_mixed_directions_backward() {
        assert_symmetric(
            ListQueryState::new()
                .order_by_many([("title", OrderDirection::Asc), ("date", OrderDirection::Desc)]),
        )
        .await;
    }

    #[tokio::test]
    async fn test_meta_backward() {
        assert_symmetric(
            ListQueryState::new()
                .meta_key("price", Some("NUMERIC"))
                .order_by("meta_value", Some(OrderDirection::Desc)),
        )
        .await;
    }

    #[tokio::test]
    async fn test_last_page_without_cursor() {
        let store = post_store().await;
        let state = ListQueryState::new().order_by("title", Some(OrderDirection::Asc));
        let page = fetch_connection(
            &store,
            EntityKind::Post,
            &state,
            &ConnectionArgs::backward(Some(3), None),
            &CursorConfig::default(),
        )
        .await
        .unwrap();

        let expected = expected_order(|a, b| a.title.cmp(b.title));
        assert_eq!(ids(&page), expected[expected.len() - 3..].to_vec());
        assert!(page.page_info.has_previous_page);
        assert!(!page.page_info.has_next_page);
    }
}

// ============================================================================
// Ties and stale cursors
// ============================================================================

mod cursors {
    use super::*;
    use wpgraph_cursor::cursor::token::encode_cursor;

    #[tokio::test]
    async fn test_ties_resolved_by_identifier() {
        let store = titled_store(&["A", "A", "B", "C", "C"]).await;
        let state = ListQueryState::new().order_by("title", Some(OrderDirection::Asc));
        let args = ConnectionArgs::forward(Some(10), Some(encode_cursor(EntityKind::Post, 2)));

        let config = CursorConfig::default();
        let page = fetch_connection(&store, EntityKind::Post, &state, &args, &config)
            .await
            .unwrap();
        assert_eq!(ids(&page), vec![3, 4, 5]);
        assert!(page.page_info.has_previous_page);
        assert!(!page.page_info.has_next_page);
    }

    #[tokio::test]
    async fn test_stale_cursor_falls_back_to_identifier() {
        let store = titled_store(&["C", "A", "B", "A", "C"]).await;
        sqlx::query("DELETE FROM wp_posts WHERE ID = ?1")
            .bind(3i64)
            .execute(store.pool())
            .await
            .unwrap();

        let state = ListQueryState::new().order_by("title", Some(OrderDirection::Asc));
        let args = ConnectionArgs::forward(Some(10), Some(encode_cursor(EntityKind::Post, 3)));
        let config = CursorConfig::default();
        let page = fetch_connection(&store, EntityKind::Post, &state, &args, &config)
            .await
            .unwrap();

        // Identifier comparison only, still in title order
        assert_eq!(ids(&page), vec![4, 5]);
    }

    #[tokio::test]
    async fn test_rejects_foreign_cursor() {
        let store = titled_store(&["A"]).await;
        let args = ConnectionArgs::forward(Some(1), Some(encode_cursor(EntityKind::Comment, 1)));
        let result = fetch_connection(
            &store,
            EntityKind::Post,
            &ListQueryState::new(),
            &args,
            &CursorConfig::default(),
        )
        .await;
        assert!(matches!(result, Err(wpgraph_cursor::ConnectionError::Token(_))));
    }
}

// ============================================================================
// Empty column values
// ============================================================================

mod empty_values {
    use super::*;
    use wpgraph_cursor::cursor::token::encode_cursor;

    async fn store_with(items: Vec<Item>) -> SqliteStore {
        let store = store().await;
        for item in &items {
            store.insert_item(item).await.unwrap();
        }
        store
    }

    async fn assert_pages(store: &SqliteStore, state: &ListQueryState, expected: Vec<i64>) {
        assert_eq!(unpaginated(store, EntityKind::Post, state).await, expected);
        for page_size in 1..=expected.len() as i32 + 1 {
            let visited = page_forward(store, EntityKind::Post, state, page_size).await;
            assert_eq!(visited, expected, "page size {}", page_size);
        }
    }

    #[tokio::test]
    async fn test_empty_column_values_sort_first() {
        let store = store_with(vec![
            Item::new(EntityKind::Post, 1)
                .with_attribute("post_excerpt", "")
                .with_attribute("post_date", "2024-01-05 00:00:00"),
            Item::new(EntityKind::Post, 2)
                .with_attribute("post_excerpt", "a")
                .with_attribute("post_date", "2024-01-01 00:00:00"),
            Item::new(EntityKind::Post, 3)
                .with_attribute("post_excerpt", "b")
                .with_attribute("post_date", "2024-01-02 00:00:00"),
            // Excerpt left to the column default
            Item::new(EntityKind::Post, 4).with_attribute("post_date", "2024-01-03 00:00:00"),
        ])
        .await;
        let state = ListQueryState::new().order_by("excerpt", Some(OrderDirection::Asc));
        assert_pages(&store, &state, vec![1, 4, 2, 3]).await;

        let before = encode_cursor(EntityKind::Post, 3);
        let backward = page_backward(&store, EntityKind::Post, &state, 1, before).await;
        assert_eq!(backward, vec![1, 4, 2]);
    }

    #[tokio::test]
    async fn test_clause_named_like_column_sorts_by_column() {
        let titled = |id: i64, title: &str, rating: &str| {
            Item::new(EntityKind::Post, id)
                .with_attribute("post_title", title)
                .with_attribute("post_date", "2024-01-01 00:00:00")
                .with_meta("subtitle", "m")
                .with_meta("rating", rating)
        };
        let store =
            store_with(vec![titled(1, "", "3"), titled(2, "B", "1"), titled(3, "A", "2")]).await;
        let state = ListQueryState::new()
            .meta_clause(MetaClause::new("title", "subtitle"))
            .meta_clause(MetaClause::new("rating_clause", "rating").with_type("SIGNED"))
            .order_by_many([
                ("title", OrderDirection::Asc),
                ("rating_clause", OrderDirection::Asc),
            ]);
        assert_pages(&store, &state, vec![1, 3, 2]).await;
    }
}

// ============================================================================
// Other entity kinds
// ============================================================================

mod kinds {
    use super::*;

    #[tokio::test]
    async fn test_terms_by_name() {
        let store = store().await;
        for (id, name) in [(1, "News"), (2, "Art"), (3, "News"), (4, "Code"), (5, "Art")] {
            let term = Item::new(EntityKind::Term, id)
                .with_attribute("name", name)
                .with_attribute("slug", name.to_lowercase());
            store.insert_item(&term).await.unwrap();
        }

        let state = ListQueryState::new().order_by("name", Some(OrderDirection::Asc));
        for page_size in 1..=3 {
            let visited = page_forward(&store, EntityKind::Term, &state, page_size).await;
            assert_eq!(visited, vec![2, 5, 4, 1, 3]);
        }

        let default = page_forward(&store, EntityKind::Term, &ListQueryState::new(), 2).await;
        assert_eq!(default, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn test_comments_by_date() {
        let store = store().await;
        let dates = [
            (1, "2024-02-02 10:00:00"),
            (2, "2024-02-01 10:00:00"),
            (3, "2024-02-02 10:00:00"),
            (4, "2024-01-30 08:00:00"),
        ];
        for (id, date) in dates {
            let comment = Item::new(EntityKind::Comment, id)
                .with_attribute("comment_date", date)
                .with_attribute("comment_content", format!("comment {}", id));
            store.insert_item(&comment).await.unwrap();
        }

        let visited = page_forward(&store, EntityKind::Comment, &ListQueryState::new(), 1).await;
        assert_eq!(visited, vec![4, 2, 1, 3]);

        let newest_first = ListQueryState::new().order_by("date", Some(OrderDirection::Desc));
        let visited = page_forward(&store, EntityKind::Comment, &newest_first, 3).await;
        assert_eq!(visited, vec![1, 3, 2, 4]);
    }
}

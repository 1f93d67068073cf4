//! Cursor-based pagination types for GraphQL
//!
//! Implements the Relay Connection specification on top of keyset cursors:
//! a page is fetched with one extra row to tell whether more rows follow,
//! and every edge carries the opaque cursor of its node.

use async_graphql::{InputObject, SimpleObject};
use serde::Serialize;

use crate::config::CursorConfig;
use crate::cursor::token::decode_cursor;
use crate::entity::EntityKind;
use crate::error::ConnectionError;
use crate::query::{ListQueryState, OrderDirection, PageDirection};

/// Information about pagination in a connection
#[derive(SimpleObject, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// When paginating forwards, are there more items?
    pub has_next_page: bool,
    /// When paginating backwards, are there more items?
    pub has_previous_page: bool,
    /// Cursor of the first item in this page
    pub start_cursor: Option<String>,
    /// Cursor of the last item in this page
    pub end_cursor: Option<String>,
    /// Total count of items (if available)
    pub total_count: Option<i64>,
}

/// An edge in a connection, containing a node and cursor
#[derive(Serialize, Debug, Clone)]
pub struct Edge<T> {
    /// The item at the end of the edge
    pub node: T,
    /// A cursor for pagination
    pub cursor: String,
}

/// A paginated connection result
#[derive(Serialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    /// The edges in this connection
    pub edges: Vec<Edge<T>>,
    /// Pagination information
    pub page_info: PageInfo,
}

/// Relay pagination arguments
#[derive(InputObject, Debug, Clone, Default)]
#[graphql(name = "ConnectionArgs")]
pub struct ConnectionArgs {
    /// Return the first N items
    #[graphql(name = "First")]
    pub first: Option<i32>,

    /// Return items after this cursor
    #[graphql(name = "After")]
    pub after: Option<String>,

    /// Return the last N items
    #[graphql(name = "Last")]
    pub last: Option<i32>,

    /// Return items before this cursor
    #[graphql(name = "Before")]
    pub before: Option<String>,
}

/// One sort key of a list query
#[derive(InputObject, Debug, Clone)]
#[graphql(name = "OrderByInput")]
pub struct OrderByInput {
    /// Sort key: a column name, `id`, `meta_value` or a metadata clause name
    #[graphql(name = "Field")]
    pub field: String,

    /// Direction, the paging direction's default when omitted
    #[graphql(name = "Order")]
    pub order: Option<OrderDirection>,
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub direction: PageDirection,
    pub limit: i64,
    /// Identifier of the cursor item, if paging from one
    pub cursor: Option<i64>,
}

impl ConnectionArgs {
    pub fn forward(first: Option<i32>, after: Option<String>) -> Self {
        Self {
            first,
            after,
            ..Default::default()
        }
    }

    pub fn backward(last: Option<i32>, before: Option<String>) -> Self {
        Self {
            last,
            before,
            ..Default::default()
        }
    }

    /// Validate the arguments and decode the cursor for `kind`.
    pub fn page_request(
        &self,
        kind: EntityKind,
        config: &CursorConfig,
    ) -> Result<PageRequest, ConnectionError> {
        if self.first.is_some() && self.last.is_some() {
            return Err(ConnectionError::InvalidArguments("first and last are exclusive"));
        }
        if self.after.is_some() && self.before.is_some() {
            return Err(ConnectionError::InvalidArguments("after and before are exclusive"));
        }

        let backward = self.last.is_some() || self.before.is_some();
        let (direction, count, cursor) = if backward {
            (PageDirection::Backward, self.last, self.before.as_deref())
        } else {
            (PageDirection::Forward, self.first, self.after.as_deref())
        };

        let cursor = cursor.map(|c| decode_cursor(c, kind)).transpose()?;

        Ok(PageRequest {
            direction,
            limit: config.page_size(count.map(i64::from)),
            cursor,
        })
    }
}

/// Apply GraphQL sort keys to a list query state.
pub fn apply_order_by(state: ListQueryState, order_by: &[OrderByInput]) -> ListQueryState {
    match order_by {
        [] => state,
        [single] => state.order_by(single.field.clone(), single.order),
        many => state.order_by_many(
            many.iter()
                .map(|o| (o.field.clone(), o.order.unwrap_or_default())),
        ),
    }
}

impl<T> Connection<T> {
    /// Create an empty connection
    pub fn empty() -> Self {
        Self {
            edges: Vec::new(),
            page_info: PageInfo::default(),
        }
    }

    /// Create a connection from fetched rows
    ///
    /// # Arguments
    /// * `rows` - Up to `limit + 1` rows, in query order (reversed when paging backward)
    /// * `request` - The page request the rows were fetched for
    /// * `cursor_of` - Cursor for a row
    pub fn from_rows<F>(mut rows: Vec<T>, request: &PageRequest, cursor_of: F) -> Self
    where
        F: Fn(&T) -> String,
    {
        let limit = usize::try_from(request.limit).unwrap_or(0);
        let has_more = rows.len() > limit;
        rows.truncate(limit);

        let from_cursor = request.cursor.is_some();
        let (has_next_page, has_previous_page) = match request.direction {
            PageDirection::Forward => (has_more, from_cursor),
            PageDirection::Backward => {
                rows.reverse();
                (from_cursor, has_more)
            }
        };

        let edges: Vec<Edge<T>> = rows
            .into_iter()
            .map(|node| Edge {
                cursor: cursor_of(&node),
                node,
            })
            .collect();

        let page_info = PageInfo {
            has_next_page,
            has_previous_page,
            start_cursor: edges.first().map(|e| e.cursor.clone()),
            end_cursor: edges.last().map(|e| e.cursor.clone()),
            total_count: None,
        };

        Self { edges, page_info }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cursor::token::encode_cursor;
    use crate::query::SortSpec;
    use assert_matches::assert_matches;

    fn request(direction: PageDirection, limit: i64, cursor: Option<i64>) -> PageRequest {
        PageRequest {
            direction,
            limit,
            cursor,
        }
    }

    #[test]
    fn test_page_request_default() {
        let request = ConnectionArgs::default()
            .page_request(EntityKind::Post, &CursorConfig::default())
            .unwrap();
        assert_eq!(request.direction, PageDirection::Forward);
        assert_eq!(request.limit, 10);
        assert_eq!(request.cursor, None);
    }

    #[test]
    fn test_page_request_max_limit() {
        let request = ConnectionArgs::forward(Some(1000), None)
            .page_request(EntityKind::Post, &CursorConfig::default())
            .unwrap();
        assert_eq!(request.limit, 100); // Capped at 100
    }

    #[test]
    fn test_page_request_backward_with_cursor() {
        let before = encode_cursor(EntityKind::Comment, 11);
        let request = ConnectionArgs::backward(Some(5), Some(before))
            .page_request(EntityKind::Comment, &CursorConfig::default())
            .unwrap();
        assert_eq!(request, self::request(PageDirection::Backward, 5, Some(11)));
    }

    #[test]
    fn test_page_request_rejects_conflicts() {
        let config = CursorConfig::default();
        let args = ConnectionArgs {
            first: Some(1),
            last: Some(1),
            ..Default::default()
        };
        assert_matches!(
            args.page_request(EntityKind::Post, &config),
            Err(ConnectionError::InvalidArguments(_))
        );

        let args = ConnectionArgs::forward(None, Some(encode_cursor(EntityKind::Term, 1)));
        assert_matches!(
            args.page_request(EntityKind::Post, &config),
            Err(ConnectionError::Token(_))
        );
    }

    #[test]
    fn test_from_rows_forward() {
        let rows = vec![1, 2, 3, 4];
        let request = request(PageDirection::Forward, 3, None);
        let conn = Connection::from_rows(rows, &request, |n| n.to_string());
        let nodes: Vec<i32> = conn.edges.iter().map(|e| e.node).collect();
        assert_eq!(nodes, vec![1, 2, 3]);
        assert!(conn.page_info.has_next_page);
        assert!(!conn.page_info.has_previous_page);
        assert_eq!(conn.page_info.start_cursor.as_deref(), Some("1"));
        assert_eq!(conn.page_info.end_cursor.as_deref(), Some("3"));
        assert_eq!(conn.page_info.total_count, None);
    }

    #[test]
    fn test_from_rows_backward_restores_order() {
        // Fetched in reverse: 9, 8, 7
        let rows = vec![9, 8, 7];
        let request = request(PageDirection::Backward, 2, Some(10));
        let conn = Connection::from_rows(rows, &request, |n| n.to_string());
        let nodes: Vec<i32> = conn.edges.iter().map(|e| e.node).collect();
        assert_eq!(nodes, vec![8, 9]);
        assert!(conn.page_info.has_next_page);
        assert!(conn.page_info.has_previous_page);
    }

    #[test]
    fn test_empty_connection() {
        let conn: Connection<i32> = Connection::empty();
        assert!(conn.edges.is_empty());
        assert!(!conn.page_info.has_next_page);
    }

    #[test]
    fn test_apply_order_by() {
        let single = apply_order_by(
            ListQueryState::new(),
            &[OrderByInput {
                field: "title".into(),
                order: Some(OrderDirection::Desc),
            }],
        );
        assert_eq!(single.orderby, Some(SortSpec::Single("title".into())));
        assert_eq!(single.order, Some(OrderDirection::Desc));

        let many = apply_order_by(
            ListQueryState::new(),
            &[
                OrderByInput {
                    field: "title".into(),
                    order: None,
                },
                OrderByInput {
                    field: "date".into(),
                    order: Some(OrderDirection::Desc),
                },
            ],
        );
        assert_eq!(
            many.orderby,
            Some(SortSpec::Multi(vec![
                ("title".into(), OrderDirection::Asc),
                ("date".into(), OrderDirection::Desc),
            ]))
        );
    }
}

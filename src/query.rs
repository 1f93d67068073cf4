//! Active list-query state read by the cursor adapters
//!
//! This is the slice of a list request the cursor engine cares about: the
//! declared sort, the metadata configuration that sort keys may refer to,
//! and which way the client is paging.

/// Sort direction for ORDER BY clauses.
#[derive(async_graphql::Enum, Copy, Clone, Debug, Default, Eq, PartialEq)]
#[graphql(name = "OrderDirection")]
pub enum OrderDirection {
    /// Ascending order (A-Z, 1-9, oldest-newest)
    #[default]
    #[graphql(name = "Asc")]
    Asc,
    /// Descending order (Z-A, 9-1, newest-oldest)
    #[graphql(name = "Desc")]
    Desc,
}

impl OrderDirection {
    /// Convert to SQL order string
    pub fn to_sql(&self) -> &'static str {
        match self {
            OrderDirection::Asc => "ASC",
            OrderDirection::Desc => "DESC",
        }
    }

    pub fn reversed(self) -> Self {
        match self {
            OrderDirection::Asc => OrderDirection::Desc,
            OrderDirection::Desc => OrderDirection::Asc,
        }
    }

    /// Parse `asc`/`desc` in any case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_uppercase().as_str() {
            "ASC" => Some(OrderDirection::Asc),
            "DESC" => Some(OrderDirection::Desc),
            _ => None,
        }
    }
}

/// Which way the client is paging relative to the declared sort.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub enum PageDirection {
    /// `first` / `after`
    #[default]
    Forward,
    /// `last` / `before`
    Backward,
}

/// Declared sort of a list query.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SortSpec {
    /// A single key; its direction comes from [`ListQueryState::order`].
    Single(String),
    /// Several keys with their own directions, highest priority first.
    Multi(Vec<(String, OrderDirection)>),
}

impl SortSpec {
    fn reversed(&self) -> Self {
        match self {
            SortSpec::Single(key) => SortSpec::Single(key.clone()),
            SortSpec::Multi(keys) => SortSpec::Multi(
                keys.iter()
                    .map(|(key, dir)| (key.clone(), dir.reversed()))
                    .collect(),
            ),
        }
    }
}

/// A named metadata filter clause of the list query.
///
/// Sort keys may name a clause to order by its metadata value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetaClause {
    /// Clause name, referenced by sort keys
    pub name: String,
    /// Metadata key the clause joins on
    pub key: String,
    /// Declared value type (cast hint), e.g. `NUMERIC`
    pub meta_type: Option<String>,
    /// Optional equality filter on the metadata value
    pub value: Option<String>,
}

impl MetaClause {
    pub fn new(name: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn with_type(mut self, meta_type: impl Into<String>) -> Self {
        self.meta_type = Some(meta_type.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }
}

/// The active list query as seen by the cursor engine.
#[derive(Clone, Debug, Default)]
pub struct ListQueryState {
    pub orderby: Option<SortSpec>,
    /// Direction for a [`SortSpec::Single`] key
    pub order: Option<OrderDirection>,
    /// Metadata key used by the generic `meta_value` sort alias
    pub meta_key: Option<String>,
    /// Cast hint for the generic `meta_value` sort alias
    pub meta_type: Option<String>,
    pub meta_query: Vec<MetaClause>,
    pub direction: PageDirection,
}

impl ListQueryState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sort by a single key.
    pub fn order_by(mut self, key: impl Into<String>, order: Option<OrderDirection>) -> Self {
        self.orderby = Some(SortSpec::Single(key.into()));
        self.order = order;
        self
    }

    /// Sort by several keys, in the given priority.
    pub fn order_by_many<K: Into<String>>(
        mut self,
        keys: impl IntoIterator<Item = (K, OrderDirection)>,
    ) -> Self {
        self.orderby = Some(SortSpec::Multi(
            keys.into_iter().map(|(k, d)| (k.into(), d)).collect(),
        ));
        self.order = None;
        self
    }

    pub fn meta_key(mut self, key: impl Into<String>, meta_type: Option<&str>) -> Self {
        self.meta_key = Some(key.into());
        self.meta_type = meta_type.map(str::to_string);
        self
    }

    pub fn meta_clause(mut self, clause: MetaClause) -> Self {
        self.meta_query.push(clause);
        self
    }

    pub fn find_clause(&self, name: &str) -> Option<&MetaClause> {
        self.meta_query.iter().find(|c| c.name == name)
    }

    /// Active state for a page request.
    ///
    /// Paging backward runs the list query in reverse, so every explicit
    /// direction is flipped along with the paging direction.
    pub fn paged(&self, direction: PageDirection) -> Self {
        let mut state = self.clone();
        state.direction = direction;
        if direction == PageDirection::Backward {
            state.orderby = self.orderby.as_ref().map(SortSpec::reversed);
            state.order = self.order.map(OrderDirection::reversed);
        }
        state
    }
}

//! Filtering and pagination for pet searches.

use serde::Serialize;

use crate::{OwnerId, Pet};

/// Filters applied to a pet search. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetFilter {
    /// Exact pet type.
    pub kind: Option<String>,

    /// Case-insensitive substring of the breed.
    pub breed: Option<String>,

    /// Case-insensitive substring of the last-seen place.
    pub last_seen_place: Option<String>,

    /// Listings published by this owner only.
    pub owner_id: Option<OwnerId>,
}

impl PetFilter {
    /// Creates an empty filter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by pet type.
    pub fn kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = Some(kind.into());
        self
    }

    /// Filters by breed substring.
    pub fn breed(mut self, breed: impl Into<String>) -> Self {
        self.breed = Some(breed.into());
        self
    }

    /// Filters by last-seen place substring.
    pub fn last_seen_place(mut self, place: impl Into<String>) -> Self {
        self.last_seen_place = Some(place.into());
        self
    }

    /// Filters by owner.
    pub fn owner(mut self, owner_id: OwnerId) -> Self {
        self.owner_id = Some(owner_id);
        self
    }

    /// Returns true if the pet satisfies every set criterion.
    pub fn matches(&self, pet: &Pet) -> bool {
        if let Some(ref kind) = self.kind
            && pet.kind != *kind
        {
            return false;
        }
        if let Some(ref breed) = self.breed
            && !contains_ignore_case(&pet.breed, breed)
        {
            return false;
        }
        if let Some(ref place) = self.last_seen_place
            && !contains_ignore_case(&pet.last_seen_place, place)
        {
            return false;
        }
        if let Some(owner_id) = self.owner_id
            && pet.owner_id != owner_id
        {
            return false;
        }
        true
    }
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Sort direction on `created_at`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// Parses `asc`/`desc` in any case.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "ASC" => Some(SortDirection::Asc),
            "DESC" => Some(SortDirection::Desc),
            _ => None,
        }
    }

    /// Returns the SQL keyword.
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        }
    }
}

/// Defaults and limits used when normalising a page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageConfig {
    pub default_page: u32,
    pub default_size: u32,
    pub max_size: u32,
    pub default_sort_dir: SortDirection,
}

impl PageConfig {
    /// Limits used by pet searches.
    pub const PETS: PageConfig = PageConfig {
        default_page: 1,
        default_size: 10,
        max_size: 50,
        default_sort_dir: SortDirection::Desc,
    };
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            default_page: 1,
            default_size: 10,
            max_size: 100,
            default_sort_dir: SortDirection::Desc,
        }
    }
}

/// A normalised page request. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
    pub sort_dir: SortDirection,
}

impl PageRequest {
    /// Creates a request for the given page and size, newest first.
    pub fn new(page: u32, size: u32) -> Self {
        Self {
            page: page.max(1),
            size: size.max(1),
            sort_dir: SortDirection::Desc,
        }
    }

    /// Normalises raw client input.
    ///
    /// Missing or non-positive page and size fall back to the defaults, size is
    /// clamped to `max_size`, and an unknown sort direction falls back to the
    /// default direction.
    pub fn normalize(
        page: Option<i64>,
        size: Option<i64>,
        sort_dir: Option<&str>,
        config: &PageConfig,
    ) -> Self {
        let page = match page {
            Some(p) if p > 0 => u32::try_from(p).unwrap_or(u32::MAX),
            _ => config.default_page,
        };
        let size = match size {
            Some(s) if s > 0 => u32::try_from(s).unwrap_or(u32::MAX),
            _ => config.default_size,
        }
        .min(config.max_size);
        let sort_dir = sort_dir
            .and_then(SortDirection::parse)
            .unwrap_or(config.default_sort_dir);

        Self {
            page,
            size,
            sort_dir,
        }
    }

    /// Sets the sort direction.
    pub fn sorted(mut self, sort_dir: SortDirection) -> Self {
        self.sort_dir = sort_dir;
        self
    }

    /// Number of rows to skip.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.size)
    }

    /// Maximum number of rows to return.
    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::normalize(None, None, None, &PageConfig::default())
    }
}

/// A search: filter plus page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PetQuery {
    pub filter: PetFilter,
    pub page: PageRequest,
}

impl PetQuery {
    /// Creates a query with the given filter and page.
    pub fn new(filter: PetFilter, page: PageRequest) -> Self {
        Self { filter, page }
    }
}

/// One page of search results with navigation metadata.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub total: u64,
    pub page: u32,
    pub size: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev_page: Option<u32>,
}

impl<T> Page<T> {
    /// Builds a page from its rows and the unpaginated match count.
    pub fn new(data: Vec<T>, total: u64, request: &PageRequest) -> Self {
        let total_pages = if request.size == 0 {
            0
        } else {
            u32::try_from(total.div_ceil(u64::from(request.size))).unwrap_or(u32::MAX)
        };
        let has_next = request.page < total_pages;
        let has_prev = request.page > 1;

        Self {
            data,
            total,
            page: request.page,
            size: request.size,
            total_pages,
            has_next,
            has_prev,
            next_page: has_next.then(|| request.page + 1),
            prev_page: has_prev.then(|| request.page - 1),
        }
    }

    /// Returns true if the page has no rows.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

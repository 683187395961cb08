//! Datatable query types shared by every employment listing.
//!
//! Sorting is restricted to an explicit allow-list per [`ListView`]. Any key
//! outside that list, or any unrecognised direction, silently falls back to
//! the view's default ordering.

use uuid::Uuid;

use crate::{
  Error, Result, access::AccessFilter, employment::EmploymentRecord,
  lifecycle::LifecycleState,
};

// ─── Sorting ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
  Asc,
  Desc,
}

impl SortOrder {
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Asc => "asc",
      Self::Desc => "desc",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    if s.eq_ignore_ascii_case("asc") {
      Some(Self::Asc)
    } else if s.eq_ignore_ascii_case("desc") {
      Some(Self::Desc)
    } else {
      None
    }
  }
}

/// Every column a listing may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
  Id,
  Company,
  Position,
  StartDate,
  CreatedAt,
  DeletedAt,
}

impl SortKey {
  /// The public name accepted in `sortBy` and echoed in listing metadata.
  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Id => "id",
      Self::Company => "company",
      Self::Position => "position",
      Self::StartDate => "start_date",
      Self::CreatedAt => "created_at",
      Self::DeletedAt => "deleted_at",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "id" => Some(Self::Id),
      "company" => Some(Self::Company),
      "position" => Some(Self::Position),
      "start_date" => Some(Self::StartDate),
      "created_at" => Some(Self::CreatedAt),
      "deleted_at" => Some(Self::DeletedAt),
      _ => None,
    }
  }
}

/// Which side of the lifecycle a listing shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListView {
  /// Records without a `deleted_at` marker.
  Active,
  /// Records currently in the trash.
  Trash,
}

impl ListView {
  pub fn state(&self) -> LifecycleState {
    match self {
      Self::Active => LifecycleState::Active,
      Self::Trash => LifecycleState::Trashed,
    }
  }

  pub fn allowed_sort_keys(&self) -> &'static [SortKey] {
    match self {
      Self::Active => &[
        SortKey::Id,
        SortKey::Company,
        SortKey::Position,
        SortKey::StartDate,
        SortKey::CreatedAt,
      ],
      Self::Trash => &[SortKey::Id, SortKey::Company, SortKey::DeletedAt],
    }
  }

  pub fn default_sort(&self) -> (SortKey, SortOrder) {
    match self {
      Self::Active => (SortKey::Id, SortOrder::Asc),
      Self::Trash => (SortKey::DeletedAt, SortOrder::Desc),
    }
  }

  /// Resolve raw `sortBy` / `order` parameters against the allow-list.
  pub fn resolve_sort(
    &self,
    sort_by: Option<&str>,
    order: Option<&str>,
  ) -> (SortKey, SortOrder) {
    let (default_key, default_order) = self.default_sort();
    let key = sort_by
      .and_then(SortKey::parse)
      .filter(|k| self.allowed_sort_keys().contains(k))
      .unwrap_or(default_key);
    let order = order.and_then(SortOrder::parse).unwrap_or(default_order);
    (key, order)
  }
}

// ─── Pagination ──────────────────────────────────────────────────────────────

/// A validated page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
  pub page:  u32,
  pub limit: u32,
}

impl PageRequest {
  pub const DEFAULT_LIMIT: u32 = 10;
  pub const MAX_LIMIT: u32 = 100;

  /// `page` below 1 clamps to 1 and `limit` above [`Self::MAX_LIMIT`] clamps
  /// down; a zero `limit` is rejected.
  pub fn new(page: Option<u32>, limit: Option<u32>) -> Result<Self> {
    let limit = limit.unwrap_or(Self::DEFAULT_LIMIT);
    if limit == 0 {
      return Err(Error::InvalidInput("limit must be at least 1".into()));
    }
    Ok(Self {
      page:  page.unwrap_or(1).max(1),
      limit: limit.min(Self::MAX_LIMIT),
    })
  }

  pub fn offset(&self) -> u64 {
    u64::from(self.page - 1) * u64::from(self.limit)
  }

  /// Number of pages needed to show `total` rows.
  pub fn pages(&self, total: u64) -> u64 { total.div_ceil(u64::from(self.limit)) }
}

impl Default for PageRequest {
  fn default() -> Self { Self { page: 1, limit: Self::DEFAULT_LIMIT } }
}

/// Caller-supplied listing parameters, before sort resolution.
#[derive(Debug, Clone, Default)]
pub struct ListRequest {
  pub page:    PageRequest,
  pub search:  Option<String>,
  pub sort_by: Option<String>,
  pub order:   Option<String>,
}

impl ListRequest {
  /// Trimmed search text, or `None` when blank.
  pub fn search_text(&self) -> Option<String> {
    self
      .search
      .as_deref()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(str::to_owned)
  }
}

// ─── Store-facing queries ────────────────────────────────────────────────────

/// A filtered, ordered window over employment records.
#[derive(Debug, Clone)]
pub struct RecordQuery {
  pub access: AccessFilter,
  pub view:   ListView,
  /// Case-insensitive substring; `None` disables text filtering.
  pub search: Option<String>,
  pub sort:   SortKey,
  pub order:  SortOrder,
  pub limit:  u32,
  pub offset: u64,
}

/// The records matching a [`RecordQuery`], counted and windowed against the
/// same snapshot.
#[derive(Debug, Clone, Default)]
pub struct RecordPage {
  /// Matches across all pages.
  pub total: u64,
  pub items: Vec<EmploymentRecord>,
}

/// Identifies exactly one record under an access filter and, optionally, a
/// required lifecycle state. Every conditional write is keyed by one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordSelector {
  pub employment_id: Uuid,
  pub access:        AccessFilter,
  pub state:         Option<LifecycleState>,
}

/// One page of results plus the parameters that produced it.
#[derive(Debug, Clone)]
pub struct Listing<T> {
  pub items:  Vec<T>,
  pub total:  u64,
  pub page:   PageRequest,
  pub sort:   SortKey,
  pub order:  SortOrder,
  pub search: Option<String>,
}

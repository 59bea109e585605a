//! Row service — creating rows and growing their capacity.

use warren_domain::error::{ConflictError, FarmError, NotFoundError};
use warren_domain::id::FarmId;
use warren_domain::row::{Row, parse_expansion, resolve_row_name};

use crate::ports::{RowRepository, SnapshotCache};

/// Input for [`RowService::create_row`].
#[derive(Debug, Clone, Default)]
pub struct NewRow {
    /// Explicit name; a name from the pool is chosen when `None` or blank.
    pub name: Option<String>,
    pub capacity: u32,
    pub level_count: usize,
    pub description: Option<String>,
}

/// Application service owning the row lifecycle.
pub struct RowService<R, C> {
    repo: R,
    cache: C,
}

impl<R: RowRepository, C: SnapshotCache> RowService<R, C> {
    /// Create a new service backed by the given repository and cache.
    pub fn new(repo: R, cache: C) -> Self {
        Self { repo, cache }
    }

    /// Create a row, resolving its name from the pool when none is given.
    ///
    /// Name resolution works on the cached row list. When that list is stale
    /// the store still rejects a duplicate.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::Validation`] for a zero capacity or a level count
    /// outside `1..=26`, [`ConflictError::DuplicateName`] when the resolved
    /// name exists, or a storage error from the repository.
    #[tracing::instrument(skip(self, request), fields(farm_id = %farm_id))]
    pub async fn create_row(&self, farm_id: FarmId, request: NewRow) -> Result<Row, FarmError> {
        let existing = self.list_rows(farm_id).await?;
        let names: Vec<&str> = existing.iter().map(|row| row.name.as_str()).collect();
        let name = match request.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => resolve_row_name(&names),
        };
        if names.contains(&name.as_str()) {
            tracing::warn!(row = %name, "row name already taken");
            return Err(ConflictError::DuplicateName { name }.into());
        }

        let mut builder = Row::builder()
            .farm_id(farm_id)
            .name(name)
            .capacity(request.capacity)
            .level_count(request.level_count);
        if let Some(description) = request.description {
            builder = builder.description(description);
        }
        let row = builder.build()?;

        let created = self.repo.create(row).await?;
        self.cache.invalidate(farm_id).await;
        tracing::info!(
            row = %created.name,
            capacity = created.capacity,
            levels = created.levels.len(),
            "row created"
        );
        Ok(created)
    }

    /// Grow a row's capacity by `additional` hutches (1 to 20).
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::InvalidExpansion`] when `additional` is out of
    /// range or would overflow the capacity, [`FarmError::NotFound`] when the
    /// row does not exist, or a storage error from the repository.
    #[tracing::instrument(skip(self), fields(farm_id = %farm_id))]
    pub async fn expand_capacity(
        &self,
        farm_id: FarmId,
        name: &str,
        additional: i64,
    ) -> Result<Row, FarmError> {
        let mut row = self.get_row(farm_id, name).await?;
        let step = row.expand(additional).inspect_err(|_| {
            tracing::warn!(row = %name, additional, "expansion rejected");
        })?;

        let updated = self.repo.increase_capacity(farm_id, &row.name, step).await?;
        self.cache.invalidate(farm_id).await;
        tracing::info!(row = %updated.name, capacity = updated.capacity, "row expanded");
        Ok(updated)
    }

    /// Grow a row's capacity from a user-entered amount.
    ///
    /// # Errors
    ///
    /// Returns [`ConflictError::InvalidExpansion`] when `raw` is not an
    /// integer, otherwise as [`expand_capacity`](Self::expand_capacity).
    pub async fn expand_capacity_from_input(
        &self,
        farm_id: FarmId,
        name: &str,
        raw: &str,
    ) -> Result<Row, FarmError> {
        let additional = parse_expansion(raw)?;
        self.expand_capacity(farm_id, name, additional).await
    }

    /// Look up a row by name in the authoritative store.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::NotFound`] when no row has that name, or a storage
    /// error from the repository.
    #[tracing::instrument(skip(self), fields(farm_id = %farm_id))]
    pub async fn get_row(&self, farm_id: FarmId, name: &str) -> Result<Row, FarmError> {
        self.repo.get_by_name(farm_id, name).await?.ok_or_else(|| {
            NotFoundError {
                entity: "Row",
                id: name.to_string(),
            }
            .into()
        })
    }

    /// List a farm's rows, served from the snapshot cache when possible.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository on a cache miss.
    pub async fn list_rows(&self, farm_id: FarmId) -> Result<Vec<Row>, FarmError> {
        if let Some(rows) = self.cache.rows(farm_id).await {
            return Ok(rows);
        }
        self.refresh_rows(farm_id).await
    }

    /// Fetch a farm's rows from the store and replace the cached snapshot.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn refresh_rows(&self, farm_id: FarmId) -> Result<Vec<Row>, FarmError> {
        let rows = self.repo.list(farm_id).await?;
        self.cache.store_rows(farm_id, rows.clone()).await;
        Ok(rows)
    }
}

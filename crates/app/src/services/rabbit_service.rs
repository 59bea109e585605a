//! Rabbit service — registering animals and looking them up.

use warren_domain::error::{FarmError, NotFoundError};
use warren_domain::id::{FarmId, RabbitId};
use warren_domain::rabbit::{Gender, Rabbit};

use crate::ports::RabbitRepository;

/// Input for [`RabbitService::register_rabbit`].
#[derive(Debug, Clone)]
pub struct NewRabbit {
    pub tag: String,
    pub name: Option<String>,
    pub gender: Gender,
}

/// Application service for rabbit registration and lookup.
pub struct RabbitService<B> {
    repo: B,
}

impl<B: RabbitRepository> RabbitService<B> {
    /// Create a new service backed by the given repository.
    pub fn new(repo: B) -> Self {
        Self { repo }
    }

    /// Register a rabbit that is not yet housed anywhere.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::Validation`] for a blank tag,
    /// `ConflictError::DuplicateRabbit` when the tag is taken, or a storage
    /// error from the repository.
    #[tracing::instrument(skip(self, request), fields(farm_id = %farm_id, tag = %request.tag))]
    pub async fn register_rabbit(
        &self,
        farm_id: FarmId,
        request: NewRabbit,
    ) -> Result<Rabbit, FarmError> {
        let mut builder = Rabbit::builder()
            .farm_id(farm_id)
            .rabbit_id(request.tag)
            .gender(request.gender);
        if let Some(name) = request.name.filter(|n| !n.trim().is_empty()) {
            builder = builder.name(name);
        }
        let rabbit = builder.build()?;

        let created = self.repo.create(rabbit).await?;
        tracing::info!(rabbit = %created.rabbit_id, gender = %created.gender, "rabbit registered");
        Ok(created)
    }

    /// Look up a rabbit by tag, or by id when `key` is a UUID.
    ///
    /// # Errors
    ///
    /// Returns [`FarmError::NotFound`] when nothing matches, or a storage
    /// error from the repository.
    #[tracing::instrument(skip(self), fields(farm_id = %farm_id))]
    pub async fn get_rabbit(&self, farm_id: FarmId, key: &str) -> Result<Rabbit, FarmError> {
        load_rabbit(&self.repo, farm_id, key).await
    }

    /// Look up a rabbit by its farm-visible tag only.
    ///
    /// # Errors
    ///
    /// Returns a storage error propagated from the repository.
    pub async fn find_by_tag(
        &self,
        farm_id: FarmId,
        tag: &str,
    ) -> Result<Option<Rabbit>, FarmError> {
        self.repo.find_by_tag(farm_id, tag.trim()).await
    }
}

/// Resolve `key` as a tag first, then as a [`RabbitId`].
pub(crate) async fn load_rabbit<B: RabbitRepository>(
    repo: &B,
    farm_id: FarmId,
    key: &str,
) -> Result<Rabbit, FarmError> {
    let key = key.trim();
    if let Some(rabbit) = repo.find_by_tag(farm_id, key).await? {
        return Ok(rabbit);
    }
    if let Ok(id) = key.parse::<RabbitId>()
        && let Some(rabbit) = repo.get_by_id(farm_id, id).await?
    {
        return Ok(rabbit);
    }
    Err(NotFoundError {
        entity: "Rabbit",
        id: key.to_string(),
    }
    .into())
}

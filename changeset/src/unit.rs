use {
    crate::{Changeset, ChangesetError, ChangesetOutput, Environment},
    async_trait::async_trait,
    serde::de::DeserializeOwned,
    std::any::{Any, type_name},
};

/// A changeset paired with its config, with the config type erased.
///
/// Units wrapping changesets with unrelated config types can share one ordered list. A config
/// that cannot be cast to the changeset's config type does not fail construction. The unit
/// reports [`ChangesetError::ConfigTypeMismatch`] from both `verify` and `apply` instead.
pub struct ChangesetUnit {
    inner: Box<dyn ErasedChangeset>,
}

impl ChangesetUnit {
    pub fn configure<C: Changeset>(changeset: C, config: C::Config) -> Self {
        Self::erase(changeset, Ok(config))
    }

    /// Wraps a dynamically-typed config, which must hold a `C::Config`.
    pub fn from_dyn<C: Changeset>(changeset: C, config: Box<dyn Any + Send + Sync>) -> Self {
        let config = config.downcast::<C::Config>().map(|config| *config).map_err(|_| {
            TypeMismatch {
                expected: type_name::<C::Config>(),
                reason: "value of a different type".to_owned(),
            }
        });

        Self::erase(changeset, config)
    }

    /// Wraps a config given as JSON, which must deserialize into a `C::Config`.
    pub fn from_json<C>(changeset: C, config: serde_json::Value) -> Self
    where
        C: Changeset,
        C::Config: DeserializeOwned,
    {
        let config = serde_json::from_value(config).map_err(|e| TypeMismatch {
            expected: type_name::<C::Config>(),
            reason: e.to_string(),
        });

        Self::erase(changeset, config)
    }

    fn erase<C: Changeset>(changeset: C, config: Result<C::Config, TypeMismatch>) -> Self {
        Self {
            inner: Box::new(Configured { changeset, config }),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn verify(&self, env: &Environment) -> Result<(), ChangesetError> {
        self.inner.verify(env)
    }

    pub async fn apply(&self, env: &Environment) -> Result<ChangesetOutput, ChangesetError> {
        self.inner.apply(env).await
    }
}

impl std::fmt::Debug for ChangesetUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangesetUnit")
            .field("name", &self.name())
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
struct TypeMismatch {
    expected: &'static str,
    reason: String,
}

impl From<&TypeMismatch> for ChangesetError {
    fn from(value: &TypeMismatch) -> Self {
        Self::ConfigTypeMismatch {
            expected: value.expected,
            reason: value.reason.clone(),
        }
    }
}

#[async_trait]
trait ErasedChangeset: Send + Sync {
    fn name(&self) -> &str;

    fn verify(&self, env: &Environment) -> Result<(), ChangesetError>;

    async fn apply(&self, env: &Environment) -> Result<ChangesetOutput, ChangesetError>;
}

struct Configured<C: Changeset> {
    changeset: C,
    config: Result<C::Config, TypeMismatch>,
}

#[async_trait]
impl<C: Changeset> ErasedChangeset for Configured<C> {
    fn name(&self) -> &str {
        self.changeset.name()
    }

    fn verify(&self, env: &Environment) -> Result<(), ChangesetError> {
        let config = self.config.as_ref().map_err(ChangesetError::from)?;
        self.changeset.verify(env, config)
    }

    async fn apply(&self, env: &Environment) -> Result<ChangesetOutput, ChangesetError> {
        let config = self.config.as_ref().map_err(ChangesetError::from)?;
        self.changeset.apply(env, config).await
    }
}

//! Typed configuration subtree bound as a component

use std::fmt;

use serde::de::DeserializeOwned;
use validator::Validate;

use crate::component::{Component, ConfigurationProperties};
use crate::decode::decode;
use crate::error::{Error, Result};
use crate::fields::Setting;
use crate::instance::{Instance, InstanceBuilder};

type StructValidator<V> = fn(&V) -> std::result::Result<(), String>;

/// Binds the configuration subtree at `prefix` into `V`
///
/// ```ignore
/// #[derive(Deserialize, Clone)]
/// struct Database { url: String, pool: u32 }
///
/// factory.register(Properties::<Database>::new("database").into_instance());
/// ```
pub struct Properties<V> {
    prefix: String,
    value: Setting<V>,
    validator: Option<StructValidator<V>>,
}

impl<V: DeserializeOwned + Send + Sync + 'static> Properties<V> {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: prefix.to_string(),
            value: Setting::new(),
            validator: None,
        }
    }

    pub fn get(&self) -> Option<V>
    where
        V: Clone,
    {
        self.value.get()
    }

    pub fn with<R>(&self, f: impl FnOnce(&V) -> R) -> Option<R> {
        self.value.with(f)
    }

    pub fn is_bound(&self) -> bool {
        self.value.is_set()
    }

    /// Builder declaring the [`ConfigurationProperties`] capability
    pub fn builder(self) -> InstanceBuilder<Self> {
        Instance::builder(self).implements::<dyn ConfigurationProperties>(|c| c)
    }

    pub fn into_instance(self) -> Instance {
        self.builder().build()
    }
}

impl<V: DeserializeOwned + Validate + Send + Sync + 'static> Properties<V> {
    /// Like [`Properties::new`], validating the decoded value every time it is bound
    pub fn validated(prefix: &str) -> Self {
        Self {
            validator: Some(|value: &V| value.validate().map_err(|e| e.to_string())),
            ..Self::new(prefix)
        }
    }
}

impl<V: DeserializeOwned + Send + Sync + 'static> Component for Properties<V> {}

impl<V: DeserializeOwned + Send + Sync + 'static> ConfigurationProperties for Properties<V> {
    fn prefix(&self) -> &str {
        &self.prefix
    }

    fn bind(&self, literal: &str, validate: bool) -> Result<()> {
        let value: V = decode(&self.prefix, literal)?;
        match self.validator {
            Some(check) => check(&value).map_err(|message| Error::validation(&self.prefix, message))?,
            None if validate => {
                return Err(Error::validation(
                    &self.prefix,
                    "validation requested but no validator is configured",
                ));
            }
            None => {}
        }
        self.value.set(value);
        Ok(())
    }
}

impl<V> fmt::Debug for Properties<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Properties")
            .field("prefix", &self.prefix)
            .field("value", &std::any::type_name::<V>())
            .finish_non_exhaustive()
    }
}

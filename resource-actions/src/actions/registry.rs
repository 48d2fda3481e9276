//! Per-resource action registry
//!
//! An [`ActionRegistry`] is bound to one document store and takes its name
//! from it. It owns three tables keyed by action name:
//!
//! - `actions`: the canonical body for each name, defined once
//! - `options`: the validator chain that runs before the body
//! - `syncs`: follow-up actions recorded against a name
//!
//! Registration takes `&mut self` and is meant to happen during setup. Once
//! the registry is shared (typically behind `Arc`), lookups are plain reads.
//!
//! The sync table is append-only and never consulted by [`handlers`]. It is
//! exposed read-only through [`sync_hooks`] for observers that want it.
//!
//! [`handlers`]: ActionRegistry::handlers
//! [`sync_hooks`]: ActionRegistry::sync_hooks

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use super::error::RegistryError;
use super::handler::{Action, HandlerChain, Validator};
use crate::config::Conventions;
use crate::store::DocumentStore;

/// Per-action configuration accepted by [`ActionRegistry::define_action`]
#[derive(Clone, Default)]
pub struct ActionOptions {
    /// Validators run before the action body, in this order
    pub validators: Vec<Arc<dyn Validator>>,
}

impl ActionOptions {
    /// Options with no validators
    pub fn new() -> Self {
        Self::default()
    }

    /// Options with the given validator chain
    pub fn with_validators(validators: Vec<Arc<dyn Validator>>) -> Self {
        Self { validators }
    }

    /// Append a validator to the chain
    #[must_use]
    pub fn validator(mut self, validator: Arc<dyn Validator>) -> Self {
        self.validators.push(validator);
        self
    }
}

impl fmt::Debug for ActionOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionOptions")
            .field("validators", &self.validators.len())
            .finish()
    }
}

/// Registry of named actions for a single resource
pub struct ActionRegistry<S> {
    name: String,
    store: Arc<S>,
    conventions: Conventions,
    actions: HashMap<String, Arc<dyn Action>>,
    options: HashMap<String, ActionOptions>,
    syncs: HashMap<String, Vec<Arc<dyn Action>>>,
}

impl<S: DocumentStore> ActionRegistry<S> {
    /// Create an empty registry bound to `store`, using default conventions
    pub fn new(store: Arc<S>) -> Self {
        Self::with_conventions(store, Conventions::default())
    }

    /// Create an empty registry bound to `store` with explicit conventions
    pub fn with_conventions(store: Arc<S>, conventions: Conventions) -> Self {
        let name = store.name().to_string();
        tracing::debug!(resource = %name, "action registry created");
        Self {
            name,
            store,
            conventions,
            actions: HashMap::new(),
            options: HashMap::new(),
            syncs: HashMap::new(),
        }
    }
}

impl<S> ActionRegistry<S> {
    /// Resource name, fixed at construction
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The bound document store
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Field naming used by the built-in CRUD actions
    pub fn conventions(&self) -> &Conventions {
        &self.conventions
    }

    /// Register `body` under `name`
    ///
    /// When `options` is given its validator chain is recorded as well.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateAction`] if `name` is already
    /// defined. The existing definition is left untouched.
    pub fn define_action(
        &mut self,
        name: impl Into<String>,
        body: Arc<dyn Action>,
        options: Option<ActionOptions>,
    ) -> Result<(), RegistryError> {
        let name = name.into();
        if self.actions.contains_key(&name) {
            tracing::warn!(resource = %self.name, action = %name, "duplicate action definition rejected");
            return Err(RegistryError::DuplicateAction {
                resource: self.name.clone(),
                name,
            });
        }

        let validator_count = options.as_ref().map_or(0, |o| o.validators.len());
        if let Some(options) = options {
            self.options.insert(name.clone(), options);
        }
        self.actions.insert(name.clone(), body);

        tracing::debug!(
            resource = %self.name,
            action = %name,
            validators = validator_count,
            "action defined"
        );
        Ok(())
    }

    /// The raw action body registered under `name`
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownAction`] if `name` was never defined.
    pub fn action(&self, name: &str) -> Result<&Arc<dyn Action>, RegistryError> {
        self.actions.get(name).ok_or_else(|| self.unknown(name))
    }

    /// The composed `[validators..., body]` chain for `name`
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownAction`] if `name` was never defined,
    /// regardless of whether validators exist for it.
    pub fn handlers(&self, name: &str) -> Result<HandlerChain, RegistryError> {
        let body = self.action(name)?;
        Ok(HandlerChain::new(
            self.name.as_str(),
            name,
            self.validators(name),
            body.clone(),
        ))
    }

    /// Record a follow-up action against `name`
    ///
    /// Never fails: `name` need not be defined, and the same follow-up may be
    /// recorded more than once.
    pub fn sync(&mut self, name: impl Into<String>, follow_up: Arc<dyn Action>) {
        let name = name.into();
        let hooks = self.syncs.entry(name.clone()).or_default();
        hooks.push(follow_up);
        tracing::debug!(
            resource = %self.name,
            action = %name,
            hooks = hooks.len(),
            "sync hook recorded"
        );
    }

    /// Follow-up actions recorded for `name`, in recording order
    pub fn sync_hooks(&self, name: &str) -> &[Arc<dyn Action>] {
        self.syncs.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Validators registered for `name`, in execution order
    pub fn validators(&self, name: &str) -> &[Arc<dyn Validator>] {
        self.options
            .get(name)
            .map(|options| options.validators.as_slice())
            .unwrap_or(&[])
    }

    /// Whether `name` is a defined action
    pub fn contains(&self, name: &str) -> bool {
        self.actions.contains_key(name)
    }

    /// Defined action names, sorted
    pub fn action_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.actions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    fn unknown(&self, name: &str) -> RegistryError {
        RegistryError::UnknownAction {
            resource: self.name.clone(),
            name: name.to_string(),
        }
    }
}

impl<S> fmt::Debug for ActionRegistry<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionRegistry")
            .field("name", &self.name)
            .field("actions", &self.action_names())
            .field("conventions", &self.conventions)
            .finish_non_exhaustive()
    }
}

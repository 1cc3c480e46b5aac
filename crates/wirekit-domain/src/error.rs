//! Error handling types

use thiserror::Error;

/// Result type alias for operations that can fail
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for wirekit
#[derive(Error, Debug)]
pub enum Error {
    /// Resource not found error
    #[error("Not found: {resource}")]
    NotFound {
        /// The resource that was not found
        resource: String,
    },

    /// Two different instances claimed the same component name
    #[error("Component name conflict: {name} is already registered with a different instance")]
    DuplicateComponent {
        /// The contested component name
        name: String,
    },

    /// A required dependency had no candidate after matching
    #[error("Missing dependency for {property}: no component matched")]
    MissingDependency {
        /// Property identifier
        property: String,
    },

    /// Removing the owning component left no candidates
    #[error("Self injection rejected for {property}, the only candidate is its own holder:\n{stack}")]
    SelfInjection {
        /// Property identifier
        property: String,
        /// Holder chain from the root component to the field
        stack: String,
    },

    /// Qualifier filtering removed every candidate
    #[error("No candidate for {property} matches qualifier {expected}")]
    QualifierNotMatched {
        /// Property identifier
        property: String,
        /// Qualifier values the property asked for
        expected: String,
    },

    /// More than one component satisfies a typed lookup
    #[error("Ambiguous lookup for {target}: {candidates:?}")]
    Ambiguous {
        /// Requested type
        target: String,
        /// Names of the competing components
        candidates: Vec<String>,
    },

    /// A post processor hook failed
    #[error("Post processor {processor} failed on {component}: {source}")]
    PostProcessor {
        /// Processor component name
        processor: String,
        /// Component being processed
        component: String,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// Creating a component failed
    #[error("Failed to create component {component}: {source}")]
    Creation {
        /// Component name
        component: String,
        /// Underlying failure
        #[source]
        source: Box<Error>,
    },

    /// The exposed instance differs from the one handed out during a cycle
    #[error(
        "Component {component} has been injected into {dependents:?} in its raw version as part of a circular reference, \
         but has eventually been wrapped; those components do not use the final version"
    )]
    InconsistentEarlyExposure {
        /// Component name
        component: String,
        /// Components holding the stale early reference
        dependents: Vec<String>,
    },

    /// A component was requested while it is already being created
    #[error("Circular reference while creating {component}: {chain}")]
    CircularReference {
        /// Component name
        component: String,
        /// Components currently in creation
        chain: String,
    },

    /// Assigning a resolved value into a field failed
    #[error("Binding error on {field}: {message}")]
    Binding {
        /// Field name
        field: String,
        /// Description of the failure
        message: String,
    },

    /// A configuration literal could not be decoded into the field type
    #[error("Decode error on {field}: {message}")]
    Decode {
        /// Field name
        field: String,
        /// Description of the failure
        message: String,
    },

    /// A bound value failed validation
    #[error("Validation failed on {field}: {message}")]
    Validation {
        /// Field name
        field: String,
        /// Description of the failure
        message: String,
    },

    /// An embedded expression failed to evaluate
    #[error("Expression error in `{expression}`: {message}")]
    Expression {
        /// The expression source
        expression: String,
        /// Description of the failure
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {message}")]
    Configuration {
        /// Description of the configuration error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A component lifecycle hook failed
    #[error("Component {component} failed: {message}")]
    Component {
        /// Component name
        component: String,
        /// Description of the failure
        message: String,
    },

    /// Several independent failures collected from a parallel phase
    #[error("{} errors occurred: {}", .0.len(), join_errors(.0))]
    Aggregate(Vec<Error>),

    /// The runtime environment refused an operation, such as installing a global subscriber
    #[error("Infrastructure error: {message}")]
    Infrastructure {
        /// Description of the infrastructure error
        message: String,
        /// Optional source error
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Internal error
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error
        message: String,
    },
}

fn join_errors(errors: &[Error]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl Error {
    /// Create a not found error
    pub fn not_found<S: Into<String>>(resource: S) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a duplicate component error
    pub fn duplicate_component<S: Into<String>>(name: S) -> Self {
        Self::DuplicateComponent { name: name.into() }
    }

    /// Create a missing dependency error
    pub fn missing_dependency<S: Into<String>>(property: S) -> Self {
        Self::MissingDependency {
            property: property.into(),
        }
    }

    /// Create a self injection error
    pub fn self_injection<S: Into<String>, T: Into<String>>(property: S, stack: T) -> Self {
        Self::SelfInjection {
            property: property.into(),
            stack: stack.into(),
        }
    }

    /// Create a qualifier mismatch error
    pub fn qualifier_not_matched<S: Into<String>, T: Into<String>>(property: S, expected: T) -> Self {
        Self::QualifierNotMatched {
            property: property.into(),
            expected: expected.into(),
        }
    }

    /// Create an ambiguous lookup error
    pub fn ambiguous<S: Into<String>>(target: S, candidates: Vec<String>) -> Self {
        Self::Ambiguous {
            target: target.into(),
            candidates,
        }
    }
}

impl Error {
    /// Wrap a failure raised by a post processor
    pub fn post_processor<P: Into<String>, C: Into<String>>(
        processor: P,
        component: C,
        source: Error,
    ) -> Self {
        Self::PostProcessor {
            processor: processor.into(),
            component: component.into(),
            source: Box::new(source),
        }
    }

    /// Wrap a failure raised while creating a component
    pub fn creation<C: Into<String>>(component: C, source: Error) -> Self {
        Self::Creation {
            component: component.into(),
            source: Box::new(source),
        }
    }

    /// Create an inconsistent early exposure error
    pub fn inconsistent_early_exposure<C: Into<String>>(component: C, dependents: Vec<String>) -> Self {
        Self::InconsistentEarlyExposure {
            component: component.into(),
            dependents,
        }
    }

    /// Create a circular reference error
    pub fn circular_reference<C: Into<String>, S: Into<String>>(component: C, chain: S) -> Self {
        Self::CircularReference {
            component: component.into(),
            chain: chain.into(),
        }
    }
}

impl Error {
    /// Create a binding error
    pub fn binding<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Binding {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a decode error
    pub fn decode<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Decode {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create a validation error
    pub fn validation<F: Into<String>, M: Into<String>>(field: F, message: M) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create an expression error
    pub fn expression<E: Into<String>, M: Into<String>>(expression: E, message: M) -> Self {
        Self::Expression {
            expression: expression.into(),
            message: message.into(),
        }
    }

    /// Create a component lifecycle error
    pub fn component<C: Into<String>, M: Into<String>>(component: C, message: M) -> Self {
        Self::Component {
            component: component.into(),
            message: message.into(),
        }
    }
}

impl Error {
    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a configuration error with source
    pub fn configuration_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Configuration {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Create an infrastructure error with source
    pub fn infrastructure_with_source<
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    >(
        message: S,
        source: E,
    ) -> Self {
        Self::Infrastructure {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

impl Error {
    /// Fold a batch of failures: none is success, one is itself, more become an aggregate
    pub fn from_many(mut errors: Vec<Error>) -> Result<()> {
        match errors.len() {
            0 => Ok(()),
            1 => Err(errors.remove(0)),
            _ => Err(Self::Aggregate(errors)),
        }
    }

    /// Strip processor and creation wrappers down to the originating error
    pub fn root_cause(&self) -> &Error {
        match self {
            Self::PostProcessor { source, .. } | Self::Creation { source, .. } => source.root_cause(),
            other => other,
        }
    }
}

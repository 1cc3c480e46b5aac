//! Where a property lives: the component root or a chain of embedded structs

use std::fmt::Write as _;
use std::sync::Arc;

use crate::meta::{Meta, MetaId};

#[derive(Debug, Clone)]
pub enum Holder {
    /// The registered component itself
    Root {
        meta: MetaId,
        name: String,
        type_name: &'static str,
    },
    /// A struct embedded in `parent` under `field`
    Embedded {
        field: String,
        type_name: &'static str,
        parent: Arc<Holder>,
    },
}

impl Holder {
    pub fn root(meta: &Meta) -> Self {
        Self::Root {
            meta: meta.id(),
            name: meta.name().to_string(),
            type_name: meta.raw().type_name(),
        }
    }

    pub fn embedded(field: &str, type_name: &'static str, parent: Arc<Holder>) -> Self {
        Self::Embedded {
            field: field.to_string(),
            type_name,
            parent,
        }
    }

    /// Name of the component at the top of the chain
    pub fn root_name(&self) -> &str {
        match self {
            Self::Root { name, .. } => name,
            Self::Embedded { parent, .. } => parent.root_name(),
        }
    }

    pub fn root_id(&self) -> MetaId {
        match self {
            Self::Root { meta, .. } => *meta,
            Self::Embedded { parent, .. } => parent.root_id(),
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Root { type_name, .. } | Self::Embedded { type_name, .. } => type_name,
        }
    }

    /// Number of embedded levels below the root
    pub fn depth(&self) -> usize {
        match self {
            Self::Root { .. } => 0,
            Self::Embedded { parent, .. } => parent.depth() + 1,
        }
    }

    /// Holders from the root down to this one
    pub fn chain(&self) -> Vec<&Holder> {
        let mut chain = vec![self];
        let mut current = self;
        while let Self::Embedded { parent, .. } = current {
            chain.push(parent.as_ref());
            current = parent.as_ref();
        }
        chain.reverse();
        chain
    }

    /// Dotted path such as `app::Service.inner.deeper`
    pub fn path(&self) -> String {
        self.chain()
            .into_iter()
            .map(|holder| match holder {
                Self::Root { name, .. } => name.as_str(),
                Self::Embedded { field, .. } => field.as_str(),
            })
            .collect::<Vec<_>>()
            .join(".")
    }

    /// One line per level, indented by depth
    pub fn stack(&self) -> String {
        let mut out = String::new();
        for (depth, holder) in self.chain().into_iter().enumerate() {
            let indent = "  ".repeat(depth);
            let _ = match holder {
                Self::Root { name, type_name, .. } => {
                    writeln!(out, "{indent}component `{name}` ({type_name})")
                }
                Self::Embedded { field, type_name, .. } => {
                    writeln!(out, "{indent}embedded `{field}` ({type_name})")
                }
            };
        }
        out
    }
}

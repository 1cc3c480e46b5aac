use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;
use wirekit_application::InstantiationAwarePostProcessor;
use wirekit_domain::constants::ARG_QUALIFIER;
use wirekit_domain::{Error, Instance, Meta, Ordered, PriorityOrdered, Property, Result, component};

use super::builtin_processor;
use crate::constants::ORDER_FURTHER_MATCHING;

/// Narrows the candidates found for each component property
///
/// 1. duplicates (found both by name and by type) are dropped
/// 2. `qualifier=q` / `qualifier=[q1,q2]` keeps only candidates qualified
///    with one of the listed groups
/// 3. the owning component is never injected into itself
/// 4. a singular field keeps one candidate: the primary, else the first
///    non-alias, else the first found
#[derive(Debug, Default)]
pub struct DependencyFurtherMatchingProcessor;

impl DependencyFurtherMatchingProcessor {
    pub fn instance() -> Instance {
        component!(Self; dyn InstantiationAwarePostProcessor, dyn Ordered, dyn PriorityOrdered)
    }
}

builtin_processor!(DependencyFurtherMatchingProcessor, ORDER_FURTHER_MATCHING);

impl InstantiationAwarePostProcessor for DependencyFurtherMatchingProcessor {
    fn post_process_properties(&self, properties: &mut [Property], _component: &Instance, name: &str) -> Result<()> {
        for property in properties.iter_mut().filter(|p| p.is_component()) {
            let mut candidates = dedup_by_name(std::mem::take(&mut property.injects));

            let allowed = property.args.values_flat(ARG_QUALIFIER);
            if !allowed.is_empty() {
                let found = !candidates.is_empty();
                candidates.retain(|meta| meta.qualifier().is_some_and(|q| allowed.contains(&q)));
                if candidates.is_empty() && (property.required() || found) {
                    return Err(Error::qualifier_not_matched(property.id(), describe_allowed(&allowed)));
                }
            }

            let owner = property.holder.root_name().to_string();
            if candidates.iter().any(|meta| meta.name() == owner) {
                candidates.retain(|meta| meta.name() != owner);
                if candidates.is_empty() {
                    return Err(Error::self_injection(property.id(), property.holder.stack()));
                }
            }

            if property.is_singular() && candidates.len() > 1 {
                let chosen = pick(&candidates);
                debug!(
                    component = name,
                    property = %property.id(),
                    chosen = chosen.name(),
                    candidates = candidates.len(),
                    "Selected one of several candidates"
                );
                candidates = vec![chosen];
            }
            property.injects = candidates;
        }
        Ok(())
    }
}

fn dedup_by_name(candidates: Vec<Arc<Meta>>) -> Vec<Arc<Meta>> {
    let mut seen = HashSet::new();
    candidates
        .into_iter()
        .filter(|meta| seen.insert(meta.name().to_string()))
        .collect()
}

fn pick(candidates: &[Arc<Meta>]) -> Arc<Meta> {
    let chosen = candidates
        .iter()
        .find(|meta| meta.is_primary())
        .or_else(|| candidates.iter().find(|meta| !meta.is_alias()))
        .unwrap_or(&candidates[0]);
    Arc::clone(chosen)
}

/// `g1` for a single group, `[g1,g2]` otherwise
fn describe_allowed(allowed: &[String]) -> String {
    match allowed {
        [single] => single.clone(),
        groups => format!("[{}]", groups.join(",")),
    }
}

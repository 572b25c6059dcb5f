//! Feature graph factory.
//!
//! Builds a [`FeatureGraph`] from the feature names listed in configuration.
//! Dependencies of a requested feature are registered too, hidden from
//! reports unless they were requested themselves.

use tracing::{debug, warn};

use super::{BestAskFeature, BestBidFeature, Feature, FeatureGraph, FeatureId, MidPriceFeature};
use crate::error::Result;

/// Build the feature graph from configuration.
///
/// Unknown feature names are logged and skipped.
///
/// # Errors
///
/// Fails only if wiring a dependency edge fails, which indicates a bug in
/// the registration order below.
pub fn build_graph(names: &[String]) -> Result<FeatureGraph> {
    let mut graph = FeatureGraph::new();

    for name in names {
        let normalized = normalize_feature_name(name);
        match normalized.as_str() {
            BestAskFeature::NAME => {
                ensure(&mut graph, BestAskFeature::NAME, true, || {
                    Box::new(BestAskFeature::new())
                });
            }
            BestBidFeature::NAME => {
                ensure(&mut graph, BestBidFeature::NAME, true, || {
                    Box::new(BestBidFeature::new())
                });
            }
            MidPriceFeature::NAME => {
                ensure_mid_price(&mut graph)?;
            }
            unknown => {
                warn!(
                    feature = name,
                    normalized_feature = unknown,
                    "Unknown feature in config, skipping"
                );
            }
        }
    }

    debug!(features = graph.len(), reported = ?graph.reported_names(), "Feature graph built");
    Ok(graph)
}

/// Return the id of `name`, registering it if needed. A requested feature
/// that was first pulled in as a hidden dependency becomes reported.
fn ensure(
    graph: &mut FeatureGraph,
    name: &str,
    reported: bool,
    make: impl FnOnce() -> Box<dyn Feature>,
) -> FeatureId {
    match graph.find(name) {
        Some(id) => {
            if reported {
                graph.set_reported(id, true);
            }
            id
        }
        None => graph.register(make(), reported),
    }
}

fn ensure_mid_price(graph: &mut FeatureGraph) -> Result<FeatureId> {
    if let Some(id) = graph.find(MidPriceFeature::NAME) {
        graph.set_reported(id, true);
        return Ok(id);
    }

    let ask = ensure(graph, BestAskFeature::NAME, false, || {
        Box::new(BestAskFeature::new())
    });
    let bid = ensure(graph, BestBidFeature::NAME, false, || {
        Box::new(BestBidFeature::new())
    });
    let mid = graph.register(Box::new(MidPriceFeature::new()), true);
    graph.add_parent(mid, ask, MidPriceFeature::ASK_SLOT)?;
    graph.add_parent(mid, bid, MidPriceFeature::BID_SLOT)?;
    Ok(mid)
}

fn normalize_feature_name(raw: &str) -> String {
    raw.trim().to_lowercase().replace('-', "_")
}

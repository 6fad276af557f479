//! Payloads exchanged with the host during a step's negotiation rounds.
//!
//! Requests flow out of [`collect_requests`][crate::Facility::collect_requests]
//! as [`RequestPortfolio`]s and come back in as [`Request`]s in a
//! [`RequestBook`] once the host has numbered them.  Bids answer requests;
//! the host turns matched bids into [`Trade`]s and the sender resolves each
//! trade into a [`TradeResponse`].

use std::collections::BTreeMap;

use msr_core::{AgentId, Commodity, Composition, Material, RequestId, TradeId};

/// A numbered request for material, as seen by bidders.
#[derive(Clone, Debug, PartialEq)]
pub struct Request {
    pub id:          RequestId,
    pub requester:   AgentId,
    pub commodity:   Commodity,
    pub quantity:    f64,
    /// Preferred composition, if the requester cares.
    pub composition: Option<Composition>,
}

/// Open requests grouped by commodity, in posting order within each group.
pub type RequestBook = BTreeMap<Commodity, Vec<Request>>;

/// One desired lot inside a portfolio.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestSpec {
    pub commodity: Commodity,
    pub target:    Material,
}

/// A group of requests sharing one total-quantity constraint.
#[derive(Clone, Debug, PartialEq)]
pub struct RequestPortfolio {
    pub requests:   Vec<RequestSpec>,
    /// Upper bound on the total quantity received across `requests`.
    pub constraint: f64,
}

impl RequestPortfolio {
    /// A portfolio holding a single request bounded by its own quantity.
    pub fn single(commodity: Commodity, target: Material) -> Self {
        let constraint = target.quantity();
        Self { requests: vec![RequestSpec { commodity, target }], constraint }
    }
}

/// An offer against one request.
#[derive(Clone, Debug, PartialEq)]
pub struct Bid {
    pub request:   RequestId,
    pub commodity: Commodity,
    pub offer:     Material,
}

/// A matched bid the sender must fulfil.
#[derive(Clone, Debug, PartialEq)]
pub struct Trade {
    pub id:        TradeId,
    pub request:   RequestId,
    pub commodity: Commodity,
    pub quantity:  f64,
}

/// The material handed over for one trade.
#[derive(Clone, Debug, PartialEq)]
pub struct TradeResponse {
    pub trade:    Trade,
    pub material: Material,
}

/// Fill material the reactor wants this step to replace what the dataset
/// says was consumed.  Valid only for the step it was staged in.
#[derive(Clone, Debug, PartialEq)]
pub struct DemandRequest {
    pub quantity:    f64,
    pub composition: Composition,
}

//! Deskline Routing: rule ladder, policies, dispatcher
//!
//! Routing is a deterministic rule evaluator over message text, not a
//! learned classifier. Policies are data: an ordered ladder of keyword
//! rules with first-match-wins semantics, a fallback responder, and the
//! termination-marker placement the policy version prescribes.

pub mod dispatcher;
pub mod policy;
pub mod rule;

pub use dispatcher::{Dispatcher, RouteDecision};
pub use policy::RoutePolicy;
pub use rule::RouteRule;

//! dxform Core
//!
//! Core library of a declarative infrastructure tool: resources and states,
//! attribute schemas, the provider trait, the state-change waiter, and the
//! plan/apply machinery that treats side effects as values.

pub mod differ;
pub mod effect;
pub mod interpreter;
pub mod plan;
pub mod provider;
pub mod resource;
pub mod schema;
pub mod waiter;

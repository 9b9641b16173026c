//! PayKeeper payment gateway adapter.

mod paykeeper_gateway;

pub use paykeeper_gateway::PaykeeperGateway;

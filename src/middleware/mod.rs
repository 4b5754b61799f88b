pub mod rate_limit;

pub use rate_limit::create_rate_limit_layer;

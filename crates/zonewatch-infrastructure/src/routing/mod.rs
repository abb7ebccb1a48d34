//! Provider routing
//!
//! | Component | Role |
//! |-----------|------|
//! | [`CircuitBreakerRegistry`] | Per-provider Closed/Open/HalfOpen state |
//! | [`ProviderDispatcher`] | Ordered failover across enabled providers |
//! | [`ProviderResolver`] | Builds provider instances from configuration |

pub mod circuit_breaker;
pub mod dispatcher;

pub use circuit_breaker::{
    BreakerPhase, BreakerSnapshot, CallPermit, CircuitBreaker, CircuitBreakerRegistry,
};
pub use dispatcher::{DefaultProviderResolver, ProviderDispatcher, ProviderResolver};

//! Store adapters implementing [`KvTarget`]

pub mod embedded;
pub mod redis;

pub use self::embedded::EmbeddedTarget;
pub use self::redis::{RedisConnector, RedisTarget};

use crate::endpoint::Endpoint;
use crate::target::{KvTarget, TargetResult};

/// Opens a connection to a reference target
pub trait ReferenceConnector {
    fn connect(
        &self,
        endpoint: &Endpoint,
        password: Option<&str>,
    ) -> TargetResult<Box<dyn KvTarget>>;
}

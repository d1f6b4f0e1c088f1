//! `kubectl`-backed collaborators for lazykube-framework: namespace and
//! resource listing, `logs -f` streams and `describe` output.

mod command;
mod describe;
mod inventory;
mod stream;

pub use command::{DEFAULT_CHUNK_SIZE, DEFAULT_PROGRAM, DEFAULT_READ_TIMEOUT, KubectlConfig};
pub use describe::KubectlDescriber;
pub use inventory::KubectlInventory;
pub use stream::{KubectlLogSource, KubectlLogStream};

use lazykube_framework::Services;
use std::sync::Arc;

/// Wire every collaborator to the same `kubectl` configuration.
pub fn services(config: KubectlConfig) -> Services {
    let config = Arc::new(config);
    Services {
        inventory: Box::new(KubectlInventory::new(config.clone())),
        logs: Arc::new(KubectlLogSource::new(config.clone())),
        describer: Some(Arc::new(KubectlDescriber::new(config))),
    }
}

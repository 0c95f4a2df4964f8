//! Eviction policy stores.
//!
//! Each store owns its entries and implements
//! [`CoreCache`](crate::traits::CoreCache) plus the policy-specific trait:
//!
//! | Store                  | Evicts                        | Extra trait      |
//! |------------------------|-------------------------------|------------------|
//! | [`lru::LruCache`]      | least recently used           | `LruCacheTrait`  |
//! | [`lfu::LfuCache`]      | lowest access count           | `LfuCacheTrait`  |
//! | [`fifo::FifoCache`]    | earliest inserted             | `FifoCacheTrait` |

pub mod fifo;
pub mod lfu;
pub mod lru;

/// Entries reserved up front; larger caches grow on demand.
const MAX_INITIAL_RESERVATION: usize = 4096;

/// Capacity is a bound, not an allocation request.
fn initial_reservation(capacity: usize) -> usize {
    capacity.min(MAX_INITIAL_RESERVATION)
}

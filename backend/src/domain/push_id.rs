//! Push Keys
//!
//! 20-character identifiers: 8 characters of millisecond timestamp followed by
//! 12 random characters. The alphabet is in ascending ASCII order, so keys sort
//! by creation time. Keys generated in the same millisecond increment the
//! random suffix, which keeps them strictly increasing per generator.

use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

use rand::Rng;

use super::clock::Clock;

const PUSH_CHARS: &[u8; 64] = b"-0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ_abcdefghijklmnopqrstuvwxyz";

pub const PUSH_ID_LEN: usize = 20;

struct PushState {
    last_time: i64,
    last_rand: [u8; 12],
}

pub struct PushIdGenerator {
    clock: Arc<dyn Clock>,
    state: Mutex<PushState>,
}

impl PushIdGenerator {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            state: Mutex::new(PushState {
                last_time: i64::MIN,
                last_rand: [0; 12],
            }),
        }
    }

    pub fn next_id(&self) -> String {
        let now = self.clock.now_millis().max(0);
        let mut state = self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner());

        if now == state.last_time {
            // Same millisecond: bump the suffix like a base-64 counter
            for slot in state.last_rand.iter_mut().rev() {
                if *slot == 63 {
                    *slot = 0;
                } else {
                    *slot += 1;
                    break;
                }
            }
        } else {
            let mut rng = rand::thread_rng();
            for slot in state.last_rand.iter_mut() {
                *slot = rng.gen_range(0..64);
            }
        }
        state.last_time = now;

        let mut time_chars = [0u8; 8];
        let mut t = now;
        for slot in time_chars.iter_mut().rev() {
            *slot = PUSH_CHARS[(t % 64) as usize];
            t /= 64;
        }

        let mut id = String::with_capacity(PUSH_ID_LEN);
        id.extend(time_chars.iter().map(|&c| c as char));
        id.extend(state.last_rand.iter().map(|&r| PUSH_CHARS[r as usize] as char));
        id
    }
}

/// Child-key order of the store: keys that read as a 32-bit integer come
/// first, numerically; every other key follows in string order. Array data
/// written as `items[0..n]` therefore keeps its index order.
pub fn compare_keys(a: &str, b: &str) -> Ordering {
    match (index_key(a), index_key(b)) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}

fn index_key(key: &str) -> Option<i32> {
    let n: i32 = key.parse().ok()?;
    // "007" and "+7" are plain strings to the store
    (n.to_string() == key).then_some(n)
}

use rand::Rng;
use uuid::Uuid;

use crate::ItemId;

/// Generate a deterministic v4-format UUID from a seeded RNG.
pub fn generate_uuid(rng: &mut impl Rng) -> Uuid {
    let bytes: [u8; 16] = rng.gen();
    uuid::Builder::from_random_bytes(bytes).into_uuid()
}

pub(crate) fn new_item_id(rng: &mut impl Rng) -> ItemId {
    ItemId(format!("item_{}", generate_uuid(rng).simple()))
}

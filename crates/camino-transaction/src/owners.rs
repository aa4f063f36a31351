//! Output owners: who may spend an output and from when.

use std::collections::BTreeSet;

use camino_primitives::util::{ByteReader, ByteWriter};
use camino_primitives::ShortId;

use crate::codec::{Codec, Encodable, ReadExt};
use crate::secp::SigIdx;
use crate::TransactionError;

/// Encoded size of an owner set with no addresses.
pub const OWNERS_MIN_SIZE: usize = 8 + 4 + 4;

/// A threshold set of addresses with a locktime.
///
/// Addresses are kept sorted ascending without duplicates; the constructor
/// normalizes them and the decoder rejects any other order.  A signature
/// index is a position in this sorted list.
///
/// # Wire format
///
/// | Field      | Size             |
/// |------------|------------------|
/// | locktime   | 8 bytes (BE)     |
/// | threshold  | 4 bytes (BE)     |
/// | num addrs  | 4 bytes (BE)     |
/// | addresses  | 20 bytes each    |
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct OutputOwners {
    locktime: u64,
    threshold: u32,
    addresses: Vec<ShortId>,
}

impl OutputOwners {
    /// Build an owner set, sorting and deduplicating `addresses`.
    ///
    /// Fails if `threshold` exceeds the number of distinct addresses, or if
    /// there are addresses but a zero threshold.
    pub fn new(
        locktime: u64,
        threshold: u32,
        addresses: impl IntoIterator<Item = ShortId>,
    ) -> Result<Self, TransactionError> {
        let addresses: Vec<ShortId> = addresses
            .into_iter()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        check_threshold(threshold, addresses.len())?;
        Ok(OutputOwners {
            locktime,
            threshold,
            addresses,
        })
    }

    /// A single address, threshold 1, no locktime.
    pub fn single(address: ShortId) -> Self {
        OutputOwners {
            locktime: 0,
            threshold: 1,
            addresses: vec![address],
        }
    }

    pub fn locktime(&self) -> u64 {
        self.locktime
    }

    pub fn threshold(&self) -> u32 {
        self.threshold
    }

    pub fn addresses(&self) -> &[ShortId] {
        &self.addresses
    }

    /// Position of `address` in the sorted address list.
    pub fn index_of(&self, address: &ShortId) -> Option<u32> {
        self.addresses
            .binary_search(address)
            .ok()
            .map(|i| i as u32)
    }

    pub fn contains(&self, address: &ShortId) -> bool {
        self.index_of(address).is_some()
    }

    /// Pick signers for this owner set at time `as_of`.
    ///
    /// Walks the addresses in index order and takes each one `can_sign`
    /// accepts, stopping at the threshold.  Returns `None` if the locktime
    /// has not passed or the threshold cannot be met.
    pub fn select_signers<F>(&self, as_of: u64, mut can_sign: F) -> Option<Vec<SigIdx>>
    where
        F: FnMut(&ShortId) -> bool,
    {
        if self.locktime > as_of {
            return None;
        }
        let needed = self.threshold as usize;
        let mut picked = Vec::with_capacity(needed);
        for (i, address) in self.addresses.iter().enumerate() {
            if picked.len() == needed {
                break;
            }
            if can_sign(address) {
                picked.push(SigIdx::with_source(i as u32, *address));
            }
        }
        (picked.len() == needed).then_some(picked)
    }
}

fn check_threshold(threshold: u32, count: usize) -> Result<(), TransactionError> {
    if threshold as usize > count {
        return Err(TransactionError::InvalidOwners(format!(
            "threshold {} exceeds {} addresses",
            threshold, count
        )));
    }
    if threshold == 0 && count > 0 {
        return Err(TransactionError::InvalidOwners(
            "zero threshold with addresses".to_string(),
        ));
    }
    Ok(())
}

impl Encodable for OutputOwners {
    fn write_to(&self, writer: &mut ByteWriter, _codec: Codec) {
        writer.write_u64_be(self.locktime);
        writer.write_u32_be(self.threshold);
        writer.write_length_prefixed_array(&self.addresses, |w, a| w.write_bytes(a.as_bytes()));
    }

    fn read_from(reader: &mut ByteReader<'_>, _codec: Codec) -> Result<Self, TransactionError> {
        let locktime = reader.read_u64_be().reading("owners locktime")?;
        let threshold = reader.read_u32_be().reading("owners threshold")?;
        let start = reader.offset();
        let addresses: Vec<ShortId> = reader
            .read_length_prefixed_array(20, |r| Ok::<_, TransactionError>(ShortId::new(r.read_array()?)))?;
        if !addresses.windows(2).all(|w| w[0] < w[1]) {
            return Err(TransactionError::malformed(
                "owner addresses not sorted and unique",
                start,
            ));
        }
        check_threshold(threshold, addresses.len())
            .map_err(|e| TransactionError::malformed(e.to_string(), start))?;
        Ok(OutputOwners {
            locktime,
            threshold,
            addresses,
        })
    }
}

use crate::{
    evm_circuit::{
        param::{N_BYTES_GAS, N_BYTES_MEMORY_ADDRESS, N_BYTES_MEMORY_SIZE},
        util::{
            constraint_builder::ConstraintBuilder,
            math_gadget::{constant_divmod, is_zero, lt, max},
            Word,
        },
    },
    util::Expr,
    Error,
};
use eth_types::{evm_types::GasCost, Field};

/// Decodes a memory range given as `(offset, length)` words. A zero length
/// accesses nothing, so its offset is ignored and `(0, 0)` is returned.
/// Otherwise both must fit in [`N_BYTES_MEMORY_ADDRESS`] bytes.
pub(crate) fn memory_offset_and_length<F: Field>(
    cb: &ConstraintBuilder<F>,
    offset: &Word<F>,
    length: &Word<F>,
) -> Result<(F, F), Error> {
    let length = cb.word_to_field_exact("memory length", length, N_BYTES_MEMORY_ADDRESS)?;
    if is_zero(length) == F::one() {
        return Ok((F::zero(), F::zero()));
    }
    let offset = cb.word_to_field_exact("memory offset", offset, N_BYTES_MEMORY_ADDRESS)?;
    Ok((offset, length))
}

/// Memory size in words required for an access ending at `address`.
/// `memory_word_size = ceil(address / 32) = floor((address + 31) / 32)`
fn memory_word_size<F: Field>(cb: &ConstraintBuilder<F>, address: F) -> Result<F, Error> {
    let (word_size, _) = constant_divmod(cb, address + F::from(31), 32, N_BYTES_MEMORY_SIZE)?;
    Ok(word_size)
}

/// Gas charged for growing memory from `curr_memory_word_size` to
/// `next_memory_word_size`:
/// `memory_cost = Gmem * memory_word_size + floor(memory_word_size² / 512)`
pub(crate) fn memory_expansion_gas_cost<F: Field>(
    cb: &ConstraintBuilder<F>,
    curr_memory_word_size: F,
    next_memory_word_size: F,
) -> Result<F, Error> {
    let quad_denominator = GasCost::MEMORY_EXPANSION_QUAD_DENOMINATOR.as_u64();
    let (curr_quad_memory_cost, _) = constant_divmod(
        cb,
        curr_memory_word_size * curr_memory_word_size,
        quad_denominator,
        N_BYTES_GAS,
    )?;
    let (next_quad_memory_cost, _) = constant_divmod(
        cb,
        next_memory_word_size * next_memory_word_size,
        quad_denominator,
        N_BYTES_GAS,
    )?;

    Ok((next_memory_word_size - curr_memory_word_size)
        * <GasCost as Expr<F>>::expr(&GasCost::MEMORY_EXPANSION_LINEAR_COEFF)
        + (next_quad_memory_cost - curr_quad_memory_cost))
}

/// Returns `(next_memory_word_size, memory_expansion_gas_cost)` of accesses
/// ending at each of `addresses`, starting from the memory size of the current
/// step.
pub(crate) fn memory_expansion<F: Field>(
    cb: &ConstraintBuilder<F>,
    addresses: &[F],
) -> Result<(F, F), Error> {
    let curr_memory_word_size = cb.curr.memory_size;
    let mut next_memory_word_size = curr_memory_word_size;
    for address in addresses {
        let memory_word_size = memory_word_size(cb, *address)?;
        next_memory_word_size = max(next_memory_word_size, memory_word_size, N_BYTES_MEMORY_SIZE)?;
    }
    let gas_cost = memory_expansion_gas_cost(cb, curr_memory_word_size, next_memory_word_size)?;
    Ok((next_memory_word_size, gas_cost))
}

/// Same as [`memory_expansion`] for ranges given as `(offset, length)`, as
/// returned by [`memory_offset_and_length`].
pub(crate) fn memory_expansion_dynamic_length<F: Field>(
    cb: &ConstraintBuilder<F>,
    ranges: &[(F, F)],
) -> Result<(F, F), Error> {
    let addresses = ranges
        .iter()
        .map(|(offset, length)| *offset + *length)
        .collect::<Vec<_>>();
    memory_expansion(cb, &addresses)
}

/// Reads up to `MAX_BYTES` bytes of a buffer `[addr_start, addr_end)` of
/// which `bytes_left` are still wanted. Bytes past `addr_end` read as zero.
#[derive(Clone, Debug)]
pub(crate) struct BufferReader<F, const MAX_BYTES: usize> {
    // 1 for the bytes this step moves
    has_data: [F; MAX_BYTES],
    // 1 for the bytes actually read from the source
    read_flag: [F; MAX_BYTES],
}

impl<F: Field, const MAX_BYTES: usize> BufferReader<F, MAX_BYTES> {
    pub(crate) fn new(addr_start: F, addr_end: F, bytes_left: F) -> Result<Self, Error> {
        let mut has_data = [F::zero(); MAX_BYTES];
        let mut read_flag = [F::zero(); MAX_BYTES];
        for idx in 0..MAX_BYTES {
            has_data[idx] = lt(F::from(idx as u64), bytes_left, N_BYTES_MEMORY_SIZE)?;
            let in_bound = lt(
                addr_start + F::from(idx as u64),
                addr_end,
                N_BYTES_MEMORY_ADDRESS,
            )?;
            read_flag[idx] = has_data[idx] * in_bound;
        }
        Ok(Self {
            has_data,
            read_flag,
        })
    }

    pub(crate) fn has_data(&self, idx: usize) -> bool {
        self.has_data[idx] == F::one()
    }

    pub(crate) fn read_flag(&self, idx: usize) -> bool {
        self.read_flag[idx] == F::one()
    }

    /// Bytes past the end of the source are zero.
    pub(crate) fn constrain_byte(
        &self,
        cb: &ConstraintBuilder<F>,
        idx: usize,
        byte: F,
    ) -> Result<(), Error> {
        cb.require_zero(
            "byte past the end of the buffer is zero",
            (F::one() - self.read_flag[idx]) * byte,
        )
    }

    /// Number of bytes this step moves.
    pub(crate) fn num_bytes(&self) -> F {
        self.has_data
            .iter()
            .fold(F::zero(), |acc, has_data| acc + has_data)
    }
}

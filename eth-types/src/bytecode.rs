//! EVM byte code generator

use crate::{error::Error, evm_types::OpcodeId, keccak256_word, Word};

/// EVM Bytecode
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Bytecode {
    code: Vec<u8>,
    num_opcodes: usize,
}

impl Bytecode {
    /// Get a reference to the generated code
    pub fn code(&self) -> &[u8] {
        &self.code
    }

    /// Get the generated code
    pub fn to_vec(&self) -> Vec<u8> {
        self.code.clone()
    }

    /// Number of opcodes written so far, push data excluded.
    pub fn num_opcodes(&self) -> usize {
        self.num_opcodes
    }

    /// Code hash, `keccak256(code)`.
    pub fn hash(&self) -> Word {
        keccak256_word(&self.code)
    }

    /// Append
    pub fn append(&mut self, other: &Bytecode) {
        self.code.extend_from_slice(&other.code);
        self.num_opcodes += other.num_opcodes;
    }

    /// Write op
    pub fn write_op(&mut self, op: OpcodeId) -> &mut Self {
        self.num_opcodes += 1;
        self.write(op.as_u8())
    }

    /// Write byte
    pub fn write(&mut self, byte: u8) -> &mut Self {
        self.code.push(byte);
        self
    }

    /// Push
    pub fn push(&mut self, n: usize, value: Word) -> &mut Self {
        debug_assert!((1..=32).contains(&n), "invalid push");

        // Write the op code
        self.write_op(OpcodeId::from(OpcodeId::PUSH1.as_u8() + ((n - 1) as u8)));

        let mut bytes = [0u8; 32];
        value.to_little_endian(&mut bytes);
        // Write the bytes MSB to LSB
        for i in 0..n {
            self.write(bytes[n - 1 - i]);
        }
        for byte in bytes.iter().skip(n) {
            debug_assert!(*byte == 0u8, "value too big for PUSH{}: {}", n, value);
        }
        self
    }

    /// Push every argument as a PUSH32, last argument first, then write `op`.
    /// The first argument ends up on top of the stack.
    pub fn op_with_args(&mut self, op: OpcodeId, args: &[Word]) -> &mut Self {
        for arg in args.iter().rev() {
            self.push(32, *arg);
        }
        self.write_op(op)
    }

    /// Call a contract
    #[allow(clippy::too_many_arguments)]
    pub fn call(
        &mut self,
        gas: Word,
        address: Word,
        value: Word,
        mem_in: Word,
        mem_in_size: Word,
        mem_out: Word,
        mem_out_size: Word,
    ) -> &mut Self {
        self.op_with_args(
            OpcodeId::CALL,
            &[
                gas,
                address,
                value,
                mem_in,
                mem_in_size,
                mem_out,
                mem_out_size,
            ],
        )
    }
}

impl TryFrom<Vec<u8>> for Bytecode {
    type Error = Error;

    fn try_from(input: Vec<u8>) -> Result<Self, Self::Error> {
        let mut code = Bytecode::default();

        let mut input_iter = input.iter();
        while let Some(byte) = input_iter.next() {
            let op = OpcodeId::from(*byte);
            if let OpcodeId::INVALID(byte) = op {
                return Err(Error::InvalidOpcodeIdByte(byte));
            }
            if op.is_push() {
                let n = op.data_len();
                let mut value = vec![0u8; n];
                for value_byte in value.iter_mut() {
                    *value_byte = input_iter.next().cloned().ok_or(Error::InsufficientPush)?;
                }
                code.push(n, Word::from(value.as_slice()));
            } else {
                code.write_op(op);
            }
        }

        Ok(code)
    }
}

/// EVM code macro
#[macro_export]
macro_rules! bytecode {
    ($($args:tt)*) => {{
        let mut code = $crate::bytecode::Bytecode::default();
        $crate::bytecode_internal!(code, $($args)*);
        code
    }};
}

#[macro_export]
#[doc(hidden)]
macro_rules! bytecode_internal {
    // Nothing left to do
    ($code:ident, ) => {};
    // PUSHX op codes
    ($code:ident, $x:ident ($v:expr) $($rest:tt)*) => {{
        debug_assert!($crate::evm_types::OpcodeId::$x.is_push(), "invalid push");
        let n = $crate::evm_types::OpcodeId::$x.data_len();
        $code.push(n, $v.into());
        $crate::bytecode_internal!($code, $($rest)*);
    }};
    // Default opcode without any inputs
    ($code:ident, $x:ident $($rest:tt)*) => {{
        debug_assert!(!$crate::evm_types::OpcodeId::$x.is_push(), "invalid push");
        $code.write_op($crate::evm_types::OpcodeId::$x);
        $crate::bytecode_internal!($code, $($rest)*);
    }};
    // Function calls
    ($code:ident, .$function:ident ($($args:expr),*) $($rest:tt)*) => {{
        $code.$function($($args.into(),)*);
        $crate::bytecode_internal!($code, $($rest)*);
    }};
}

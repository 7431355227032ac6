use crate::evm_circuit::step::ExecutionState;
use eth_types::Field;
use gadgets::impl_expr;
use strum::IntoEnumIterator;
use strum_macros::EnumIter;

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter)]
pub enum FixedTableTag {
    Range5 = 1,
    Range16,
    Range32,
    Range64,
    Range256,
    Range512,
    Range1024,
    ResponsibleOpcode,
}
impl_expr!(FixedTableTag);

impl FixedTableTag {
    /// The range tag checking `value < range`, if there is one.
    pub fn range_table(range: u64) -> Option<Self> {
        Self::iter().find(|tag| tag.range_size() == Some(range))
    }

    pub(crate) fn range_size(&self) -> Option<u64> {
        match self {
            Self::Range5 => Some(5),
            Self::Range16 => Some(16),
            Self::Range32 => Some(32),
            Self::Range64 => Some(64),
            Self::Range256 => Some(256),
            Self::Range512 => Some(512),
            Self::Range1024 => Some(1024),
            Self::ResponsibleOpcode => None,
        }
    }

    pub fn build<F: Field>(&self) -> Box<dyn Iterator<Item = [F; 3]>> {
        let tag = F::from(*self as u64);
        match self.range_size() {
            Some(range) => Box::new((0..range).map(move |value| [tag, F::from(value), F::zero()])),
            None => Box::new(ExecutionState::iter_responsible_opcodes().map(
                move |(execution_state, opcode)| {
                    [
                        tag,
                        F::from(execution_state.as_u64()),
                        F::from(opcode.as_u64()),
                    ]
                },
            )),
        }
    }
}

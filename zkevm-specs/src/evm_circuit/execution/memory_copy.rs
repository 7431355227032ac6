use crate::{
    evm_circuit::{
        execution::ExecutionGadget,
        param::{MAX_COPY_BYTES, N_BYTES_MEMORY_SIZE},
        step::ExecutionState,
        util::{
            constraint_builder::{ConstraintBuilder, StepStateTransition, Transition::Delta},
            math_gadget::compare,
            memory_gadget::BufferReader,
        },
    },
    util::Expr,
    Error,
};
use eth_types::Field;

/// Copies up to [`MAX_COPY_BYTES`] bytes of calldata or memory into the
/// memory of the current call, and hands the rest over to the next step.
pub(crate) struct CopyToMemoryGadget;

impl<F: Field> ExecutionGadget<F> for CopyToMemoryGadget {
    const NAME: &'static str = "CopyToMemory";

    const EXECUTION_STATE: ExecutionState = ExecutionState::CopyToMemory;

    fn configure(cb: &mut ConstraintBuilder<F>) -> Result<(), Error> {
        let aux = *cb
            .curr
            .copy_to_memory_aux()
            .ok_or(Error::InvalidAuxData(ExecutionState::CopyToMemory))?;

        let buffer_reader = BufferReader::<F, MAX_COPY_BYTES>::new(
            aux.src_addr,
            aux.src_addr_end,
            aux.bytes_left,
        )?;
        for idx in 0..MAX_COPY_BYTES {
            let offset = F::from(idx as u64);
            let byte = if !buffer_reader.read_flag(idx) {
                F::zero()
            } else if aux.from_tx == F::one() {
                cb.tx_calldata_lookup(aux.tx_id, aux.src_addr + offset)?
            } else {
                cb.memory_lookup(false, aux.src_addr + offset, None)?
            };
            buffer_reader.constrain_byte(cb, idx, byte)?;
            if buffer_reader.has_data(idx) {
                let written = cb.memory_lookup(true, aux.dst_addr + offset, None)?;
                cb.require_equal("copied byte is written to memory", byte, written)?;
            }
        }

        let copied_bytes = buffer_reader.num_bytes();
        let (lt, finished) = compare(copied_bytes, aux.bytes_left, N_BYTES_MEMORY_SIZE)?;
        // Either the step is full or nothing is left
        cb.require_zero(
            "copied_bytes < bytes_left or copied_bytes == bytes_left",
            (F::one() - lt) * (F::one() - finished),
        )?;

        if finished == F::zero() {
            let next = cb.next.ok_or(Error::ConstraintUnsatisfied {
                name: "unfinished copy continues in the next step",
            })?;
            cb.require_equal(
                "next step continues the copy",
                next.execution_state.as_u64().expr(),
                ExecutionState::CopyToMemory.as_u64().expr(),
            )?;
            let next_aux = next
                .copy_to_memory_aux()
                .ok_or(Error::InvalidAuxData(next.execution_state))?;

            cb.require_equal(
                "next src_addr == src_addr + copied_bytes",
                next_aux.src_addr,
                aux.src_addr + copied_bytes,
            )?;
            cb.require_equal(
                "next dst_addr == dst_addr + copied_bytes",
                next_aux.dst_addr,
                aux.dst_addr + copied_bytes,
            )?;
            cb.require_equal(
                "next bytes_left + copied_bytes == bytes_left",
                next_aux.bytes_left + copied_bytes,
                aux.bytes_left,
            )?;
            cb.require_equal(
                "src_addr_end is unchanged",
                next_aux.src_addr_end,
                aux.src_addr_end,
            )?;
            cb.require_equal("from_tx is unchanged", next_aux.from_tx, aux.from_tx)?;
            cb.require_equal("tx_id is unchanged", next_aux.tx_id, aux.tx_id)?;
        }

        cb.require_step_state_transition(StepStateTransition {
            rw_counter: Delta(cb.rw_counter_offset()),
            ..Default::default()
        })
    }
}

#[cfg(test)]
mod test {
    use crate::{
        evm_circuit::{
            param::MAX_COPY_BYTES,
            step::{CopyToMemoryAuxData, ExecutionState, StepAuxiliaryData, StepState},
            test::{rand_bytes, rand_fr, run_test_steps},
        },
        table::Tables,
        witness::{RwMap, Transaction},
        Error,
    };
    use halo2_proofs::{arithmetic::Field as _, halo2curves::bn256::Fr};

    const CALL_ID: usize = 1;

    struct CopyCase {
        src_addr: u64,
        dst_addr: u64,
        length: u64,
        src_addr_end: u64,
        from_tx: bool,
    }

    impl CopyCase {
        // Source bytes, past the end they read as zero
        fn byte(&self, buffer: &[u8], addr: u64) -> u8 {
            if addr < self.src_addr_end {
                buffer[addr as usize]
            } else {
                0
            }
        }

        /// Builds the steps and the tables of the copy, with `buffer` as
        /// calldata or as the source memory.
        fn build(&self, buffer: &[u8]) -> (Tables<Fr>, Vec<StepState<Fr>>) {
            self.build_with_bad_write(buffer, None)
        }

        /// Same as [`Self::build`], but the destination byte at offset
        /// `bad_write` gets its lowest bit flipped.
        fn build_with_bad_write(
            &self,
            buffer: &[u8],
            bad_write: Option<u64>,
        ) -> (Tables<Fr>, Vec<StepState<Fr>>) {
            let tx = Transaction {
                id: 1,
                call_data: if self.from_tx { buffer.to_vec() } else { vec![] },
                ..Default::default()
            };

            let mut rws = RwMap::new(1);
            let mut steps = Vec::new();
            let mut copied = 0;
            loop {
                let bytes_left = self.length - copied;
                steps.push(StepState {
                    execution_state: ExecutionState::CopyToMemory,
                    rw_counter: Fr::from(rws.rw_counter() as u64),
                    call_id: Fr::from(CALL_ID as u64),
                    aux_data: Some(StepAuxiliaryData::CopyToMemory(CopyToMemoryAuxData {
                        src_addr: Fr::from(self.src_addr + copied),
                        src_addr_end: Fr::from(self.src_addr_end),
                        bytes_left: Fr::from(bytes_left),
                        dst_addr: Fr::from(self.dst_addr + copied),
                        from_tx: Fr::from(self.from_tx as u64),
                        tx_id: Fr::from(tx.id as u64),
                    })),
                    ..Default::default()
                });
                let chunk = bytes_left.min(MAX_COPY_BYTES as u64);
                for idx in copied..copied + chunk {
                    let src_addr = self.src_addr + idx;
                    let byte = self.byte(buffer, src_addr);
                    if !self.from_tx && src_addr < self.src_addr_end {
                        rws.memory_read(CALL_ID, src_addr, byte);
                    }
                    let written = if bad_write == Some(idx) { byte ^ 1 } else { byte };
                    rws.memory_write(CALL_ID, self.dst_addr + idx, written);
                }
                copied += chunk;
                if copied == self.length {
                    break;
                }
            }
            steps.push(StepState {
                execution_state: ExecutionState::STOP,
                rw_counter: Fr::from(rws.rw_counter() as u64),
                call_id: Fr::from(CALL_ID as u64),
                ..Default::default()
            });

            let tables = Tables::new(rand_fr(), rws).with_tx(&tx);
            (tables, steps)
        }
    }

    fn test_ok(case: CopyCase) {
        let buffer = rand_bytes(case.src_addr_end as usize);
        let (tables, steps) = case.build(&buffer);
        assert_eq!(run_test_steps(&tables, &steps), Ok(()));
    }

    #[test]
    fn copy_from_tx_single_step() {
        test_ok(CopyCase {
            src_addr: 0,
            dst_addr: 0x40,
            length: 5,
            src_addr_end: 8,
            from_tx: true,
        });
    }

    #[test]
    fn copy_from_memory_past_buffer_end() {
        test_ok(CopyCase {
            src_addr: 0x10,
            dst_addr: 0x100,
            length: 5,
            src_addr_end: 0x13,
            from_tx: false,
        });
    }

    #[test]
    fn copy_multi_step() {
        for from_tx in [true, false] {
            for length in [MAX_COPY_BYTES as u64, 100, 3 * MAX_COPY_BYTES as u64 + 1] {
                test_ok(CopyCase {
                    src_addr: 2,
                    dst_addr: 0x1000,
                    length,
                    src_addr_end: 200,
                    from_tx,
                });
            }
        }
    }

    #[test]
    fn copy_zero_bytes() {
        test_ok(CopyCase {
            src_addr: 0,
            dst_addr: 0,
            length: 0,
            src_addr_end: 0,
            from_tx: true,
        });
    }

    #[test]
    fn copy_writes_source_byte() {
        for from_tx in [true, false] {
            let case = CopyCase {
                src_addr: 2,
                dst_addr: 0x1000,
                length: 100,
                src_addr_end: 200,
                from_tx,
            };
            let (tables, steps) = case.build_with_bad_write(&rand_bytes(200), Some(40));
            assert_eq!(
                run_test_steps(&tables, &steps),
                Err(Error::ConstraintUnsatisfied {
                    name: "copied byte is written to memory"
                })
            );
        }
    }

    #[test]
    fn copy_past_buffer_end_writes_zero() {
        let case = CopyCase {
            src_addr: 0x10,
            dst_addr: 0x100,
            length: 5,
            src_addr_end: 0x13,
            from_tx: false,
        };
        let (tables, steps) = case.build_with_bad_write(&rand_bytes(0x13), Some(4));
        assert_eq!(
            run_test_steps(&tables, &steps),
            Err(Error::ConstraintUnsatisfied {
                name: "copied byte is written to memory"
            })
        );
    }

    fn long_copy() -> (Tables<Fr>, Vec<StepState<Fr>>) {
        CopyCase {
            src_addr: 0,
            dst_addr: 0x100,
            length: 100,
            src_addr_end: 100,
            from_tx: true,
        }
        .build(&rand_bytes(100))
    }

    fn set_aux(step: &mut StepState<Fr>, f: impl FnOnce(&mut CopyToMemoryAuxData<Fr>)) {
        if let Some(StepAuxiliaryData::CopyToMemory(aux)) = step.aux_data.as_mut() {
            f(aux)
        }
    }

    #[test]
    fn copy_continuation_must_advance() {
        let (tables, mut steps) = long_copy();
        set_aux(&mut steps[1], |aux| aux.bytes_left += Fr::one());
        assert_eq!(
            run_test_steps(&tables, &steps),
            Err(Error::ConstraintUnsatisfied {
                name: "next bytes_left + copied_bytes == bytes_left"
            })
        );

        let (tables, mut steps) = long_copy();
        set_aux(&mut steps[1], |aux| aux.from_tx = Fr::zero());
        assert_eq!(
            run_test_steps(&tables, &steps),
            Err(Error::ConstraintUnsatisfied {
                name: "from_tx is unchanged"
            })
        );
    }

    #[test]
    fn copy_continuation_must_exist() {
        let (tables, mut steps) = long_copy();
        steps[1].execution_state = ExecutionState::ADD_SUB;
        assert_eq!(
            run_test_steps(&tables, &steps),
            Err(Error::ConstraintUnsatisfied {
                name: "next step continues the copy"
            })
        );

        let (tables, mut steps) = long_copy();
        steps[1].aux_data = None;
        assert_eq!(
            run_test_steps(&tables, &steps),
            Err(Error::InvalidAuxData(ExecutionState::CopyToMemory))
        );
    }

    #[test]
    fn copy_without_aux_data() {
        let (tables, mut steps) = long_copy();
        steps[0].aux_data = None;
        let result = run_test_steps(&tables, &steps);
        assert_eq!(
            result,
            Err(Error::InvalidAuxData(ExecutionState::CopyToMemory))
        );
        assert!(!result.unwrap_err().is_witness_failure());
    }
}

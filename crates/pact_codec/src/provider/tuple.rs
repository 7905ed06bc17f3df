use alloc::boxed::Box;

use pact_contract::{ContractShape, ReadContract, ReadField, WriteContract, WriteField};
use pact_reflect::info::TypeInfo;

use crate::build::{ReadBuilder, ReadStep, WriteBuilder, WriteStep};
use crate::provider::{ContractBuilder, ProvidedField, TypeProvider, wrong_kind};
use crate::{CodecError, UnsupportedTypeError};

/// Fixed-arity tuples, written as an array of their items.
#[derive(Debug, Clone, Copy, Default)]
pub struct TupleProvider;

fn contract<F: ProvidedField>(
    info: &'static TypeInfo,
    contracts: &mut ContractBuilder<'_, F>,
) -> Result<ContractShape<F>, UnsupportedTypeError> {
    let tuple = info.as_tuple().map_err(wrong_kind(info))?;
    let items = tuple
        .iter()
        .map(|field| contracts.contract_for(field.type_info()))
        .collect::<Result<Box<[_]>, _>>()?;
    Ok(ContractShape::Tuple(items))
}

impl TypeProvider for TupleProvider {
    fn name(&self) -> &'static str {
        "tuple"
    }

    fn can_provide(&self, info: &'static TypeInfo) -> bool {
        matches!(info, TypeInfo::Tuple(_))
    }

    fn write_contract(
        &self,
        info: &'static TypeInfo,
        contracts: &mut ContractBuilder<'_, WriteField>,
    ) -> Result<WriteContract, UnsupportedTypeError> {
        contract(info, contracts)
    }

    fn read_contract(
        &self,
        info: &'static TypeInfo,
        contracts: &mut ContractBuilder<'_, ReadField>,
    ) -> Result<ReadContract, UnsupportedTypeError> {
        contract(info, contracts)
    }

    fn build_reader(&self, info: &'static TypeInfo, builder: &mut ReadBuilder<'_>) -> Result<ReadStep, CodecError> {
        let tuple = info.as_tuple().map_err(wrong_kind(info))?;
        let items = tuple
            .iter()
            .map(|field| builder.step_for(field.type_info()))
            .collect::<Result<Box<[_]>, _>>()?;
        Ok(ReadStep::Tuple(items))
    }

    fn build_writer(&self, info: &'static TypeInfo, builder: &mut WriteBuilder<'_>) -> Result<WriteStep, CodecError> {
        let tuple = info.as_tuple().map_err(wrong_kind(info))?;
        let items = tuple
            .iter()
            .map(|field| builder.step_for(field.type_info()))
            .collect::<Result<Box<[_]>, _>>()?;
        Ok(WriteStep::Tuple(items))
    }
}

use alloc::boxed::Box;

use pact_contract::{ContractShape, ReadContract, ReadField, WriteContract, WriteField};
use pact_reflect::info::TypeInfo;

use crate::build::{ReadBuilder, ReadStep, WriteBuilder, WriteStep};
use crate::provider::{ContractBuilder, ProvidedField, TypeProvider, wrong_kind};
use crate::{CodecError, UnsupportedTypeError};

/// Sequences, written as a length-prefixed array of items.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListProvider;

fn contract<F: ProvidedField>(
    info: &'static TypeInfo,
    contracts: &mut ContractBuilder<'_, F>,
) -> Result<ContractShape<F>, UnsupportedTypeError> {
    let list = info.as_list().map_err(wrong_kind(info))?;
    Ok(ContractShape::List(contracts.contract_for(list.item_info())?))
}

impl TypeProvider for ListProvider {
    fn name(&self) -> &'static str {
        "list"
    }

    fn can_provide(&self, info: &'static TypeInfo) -> bool {
        matches!(info, TypeInfo::List(_))
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
        let list = info.as_list().map_err(wrong_kind(info))?;
        Ok(ReadStep::List(Box::new(builder.step_for(list.item_info())?)))
    }

    fn build_writer(&self, info: &'static TypeInfo, builder: &mut WriteBuilder<'_>) -> Result<WriteStep, CodecError> {
        let list = info.as_list().map_err(wrong_kind(info))?;
        Ok(WriteStep::List(Box::new(builder.step_for(list.item_info())?)))
    }
}

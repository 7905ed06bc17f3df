use alloc::boxed::Box;

use pact_contract::{ContractShape, ReadContract, ReadField, WriteContract, WriteField};
use pact_reflect::info::TypeInfo;

use crate::build::{ReadBuilder, ReadStep, WriteBuilder, WriteStep};
use crate::provider::{ContractBuilder, ProvidedField, TypeProvider, wrong_kind};
use crate::{CodecError, UnsupportedTypeError};

/// Maps, written as a MessagePack map of key/value pairs.
#[derive(Debug, Clone, Copy, Default)]
pub struct DictionaryProvider;

fn contract<F: ProvidedField>(
    info: &'static TypeInfo,
    contracts: &mut ContractBuilder<'_, F>,
) -> Result<ContractShape<F>, UnsupportedTypeError> {
    let map = info.as_map().map_err(wrong_kind(info))?;
    let key = contracts.contract_for(map.key_info())?;
    let value = contracts.contract_for(map.value_info())?;
    Ok(ContractShape::Dictionary { key, value })
}

impl TypeProvider for DictionaryProvider {
    fn name(&self) -> &'static str {
        "dictionary"
    }

    fn can_provide(&self, info: &'static TypeInfo) -> bool {
        matches!(info, TypeInfo::Map(_))
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
        let map = info.as_map().map_err(wrong_kind(info))?;
        Ok(ReadStep::Dictionary {
            key: Box::new(builder.step_for(map.key_info())?),
            value: Box::new(builder.step_for(map.value_info())?),
        })
    }

    fn build_writer(&self, info: &'static TypeInfo, builder: &mut WriteBuilder<'_>) -> Result<WriteStep, CodecError> {
        let map = info.as_map().map_err(wrong_kind(info))?;
        Ok(WriteStep::Dictionary {
            key: Box::new(builder.step_for(map.key_info())?),
            value: Box::new(builder.step_for(map.value_info())?),
        })
    }
}

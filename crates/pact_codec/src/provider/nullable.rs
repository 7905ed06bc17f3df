use alloc::boxed::Box;

use pact_contract::{ContractShape, ReadContract, ReadField, WriteContract, WriteField};
use pact_reflect::info::TypeInfo;

use crate::build::{ReadBuilder, ReadStep, WriteBuilder, WriteStep};
use crate::provider::{ContractBuilder, ProvidedField, TypeProvider, wrong_kind};
use crate::{CodecError, UnsupportedTypeError};

/// `Option<T>`: nil, or a value of the inner type.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullableProvider;

fn contract<F: ProvidedField>(
    info: &'static TypeInfo,
    contracts: &mut ContractBuilder<'_, F>,
) -> Result<ContractShape<F>, UnsupportedTypeError> {
    let nullable = info.as_nullable().map_err(wrong_kind(info))?;
    Ok(ContractShape::Nullable(
        contracts.contract_for(nullable.inner_info())?,
    ))
}

impl TypeProvider for NullableProvider {
    fn name(&self) -> &'static str {
        "nullable"
    }

    fn can_provide(&self, info: &'static TypeInfo) -> bool {
        matches!(info, TypeInfo::Nullable(_))
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
        let nullable = info.as_nullable().map_err(wrong_kind(info))?;
        let inner = builder.step_for(nullable.inner_info())?;
        Ok(ReadStep::Nullable(Box::new(inner)))
    }

    fn build_writer(&self, info: &'static TypeInfo, builder: &mut WriteBuilder<'_>) -> Result<WriteStep, CodecError> {
        let nullable = info.as_nullable().map_err(wrong_kind(info))?;
        let inner = builder.step_for(nullable.inner_info())?;
        Ok(WriteStep::Nullable(Box::new(inner)))
    }
}

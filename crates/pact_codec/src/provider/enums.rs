use alloc::string::String;

use pact_contract::{ContractShape, ReadContract, ReadField, WriteContract, WriteField};
use pact_reflect::info::TypeInfo;

use crate::build::{ReadBuilder, ReadStep, WriteBuilder, WriteStep};
use crate::provider::{ContractBuilder, ProvidedField, TypeProvider, wrong_kind};
use crate::{CodecError, UnsupportedTypeError};

/// Field-less enums, written as the member name.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnumProvider;

fn contract<F: ProvidedField>(info: &'static TypeInfo) -> Result<ContractShape<F>, UnsupportedTypeError> {
    let enumeration = info.as_enum().map_err(wrong_kind(info))?;
    let members = enumeration.members().iter().map(|member| String::from(*member)).collect();
    Ok(ContractShape::Enum(members))
}

impl TypeProvider for EnumProvider {
    fn name(&self) -> &'static str {
        "enum"
    }

    fn can_provide(&self, info: &'static TypeInfo) -> bool {
        matches!(info, TypeInfo::Enum(_))
    }

    fn write_contract(
        &self,
        info: &'static TypeInfo,
        _: &mut ContractBuilder<'_, WriteField>,
    ) -> Result<WriteContract, UnsupportedTypeError> {
        contract(info)
    }

    fn read_contract(
        &self,
        info: &'static TypeInfo,
        _: &mut ContractBuilder<'_, ReadField>,
    ) -> Result<ReadContract, UnsupportedTypeError> {
        contract(info)
    }

    fn build_reader(&self, info: &'static TypeInfo, _: &mut ReadBuilder<'_>) -> Result<ReadStep, CodecError> {
        Ok(ReadStep::Enum(info.as_enum().map_err(wrong_kind(info))?))
    }

    fn build_writer(&self, info: &'static TypeInfo, _: &mut WriteBuilder<'_>) -> Result<WriteStep, CodecError> {
        Ok(WriteStep::Enum(info.as_enum().map_err(wrong_kind(info))?))
    }
}

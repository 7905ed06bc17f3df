use alloc::boxed::Box;
use alloc::string::String;

use pact_contract::{ContractShape, ReadContract, ReadField, WriteContract, WriteField};
use pact_reflect::info::TypeInfo;

use crate::build::{ReadBuilder, ReadStep, WriteBuilder, WriteStep};
use crate::provider::{ContractBuilder, ProvidedField, TypeProvider, wrong_kind};
use crate::{CodecError, UnsupportedTypeError};

/// Tagged unions, written as a `[tag, value]` array.
///
/// Unions read and write through their own procedure, since a member may
/// refer back to the union.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnionProvider;

fn contract<F: ProvidedField>(
    info: &'static TypeInfo,
    contracts: &mut ContractBuilder<'_, F>,
) -> Result<ContractShape<F>, UnsupportedTypeError> {
    let union = info.as_union().map_err(wrong_kind(info))?;
    let members = union
        .members()
        .iter()
        .map(|member| Ok((String::from(member.tag()), contracts.contract_for(member.type_info())?)))
        .collect::<Result<Box<[_]>, UnsupportedTypeError>>()?;
    Ok(ContractShape::Union(members))
}

impl TypeProvider for UnionProvider {
    fn name(&self) -> &'static str {
        "union"
    }

    fn can_provide(&self, info: &'static TypeInfo) -> bool {
        matches!(info, TypeInfo::Union(_))
    }

    fn nests(&self) -> bool {
        true
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
        let union = info.as_union().map_err(wrong_kind(info))?;
        let steps = union
            .members()
            .iter()
            .map(|member| builder.step_for(member.type_info()))
            .collect::<Result<Box<[_]>, CodecError>>()?;
        Ok(ReadStep::Union(union, steps))
    }

    fn build_writer(&self, info: &'static TypeInfo, builder: &mut WriteBuilder<'_>) -> Result<WriteStep, CodecError> {
        let union = info.as_union().map_err(wrong_kind(info))?;
        let steps = union
            .members()
            .iter()
            .map(|member| builder.step_for(member.type_info()))
            .collect::<Result<Box<[_]>, CodecError>>()?;
        Ok(WriteStep::Union(union, steps))
    }
}

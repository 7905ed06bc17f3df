use pact_contract::{ContractShape, ReadContract, ReadField, WriteContract, WriteField};
use pact_reflect::info::TypeInfo;

use crate::build::{ReadBuilder, ReadStep, WriteBuilder, WriteStep};
use crate::provider::{ContractBuilder, TypeProvider, wrong_kind};
use crate::{CodecError, UnsupportedTypeError};

/// Booleans, integers, floats, strings and byte blobs.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrimitiveProvider;

impl TypeProvider for PrimitiveProvider {
    fn name(&self) -> &'static str {
        "primitive"
    }

    fn can_provide(&self, info: &'static TypeInfo) -> bool {
        matches!(info, TypeInfo::Primitive(_))
    }

    fn write_contract(
        &self,
        info: &'static TypeInfo,
        _: &mut ContractBuilder<'_, WriteField>,
    ) -> Result<WriteContract, UnsupportedTypeError> {
        let primitive = info.as_primitive().map_err(wrong_kind(info))?;
        Ok(ContractShape::Primitive(primitive.kind()))
    }

    fn read_contract(
        &self,
        info: &'static TypeInfo,
        _: &mut ContractBuilder<'_, ReadField>,
    ) -> Result<ReadContract, UnsupportedTypeError> {
        let primitive = info.as_primitive().map_err(wrong_kind(info))?;
        Ok(ContractShape::Primitive(primitive.kind()))
    }

    fn build_reader(&self, info: &'static TypeInfo, _: &mut ReadBuilder<'_>) -> Result<ReadStep, CodecError> {
        let primitive = info.as_primitive().map_err(wrong_kind(info))?;
        Ok(ReadStep::Primitive(primitive.kind()))
    }

    fn build_writer(&self, info: &'static TypeInfo, _: &mut WriteBuilder<'_>) -> Result<WriteStep, CodecError> {
        let primitive = info.as_primitive().map_err(wrong_kind(info))?;
        Ok(WriteStep::Primitive(primitive.kind()))
    }
}

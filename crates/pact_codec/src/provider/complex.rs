use alloc::boxed::Box;
use alloc::format;
use alloc::string::String;

use pact_contract::{ContractShape, ReadContract, ReadField, WriteContract, WriteField};
use pact_reflect::info::{ComplexInfo, ConstructorInfo, TypeInfo};

use crate::build::{ComplexReader, ComplexWriter, ReadBuilder, ReadStep, WriteBuilder, WriteStep};
use crate::provider::{ContractBuilder, TypeProvider, wrong_kind};
use crate::{CodecError, DeserialisationError, UnsupportedTypeError};

/// Records: written from their readable fields, read through the
/// parameters of their single public constructor.
///
/// Complex types always get their own procedure, which nested references
/// point at.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComplexProvider;

fn single_constructor(complex: &'static ComplexInfo) -> Result<&'static ConstructorInfo, String> {
    complex.single_constructor().ok_or_else(|| {
        format!(
            "a complex type must have a single public constructor, found {}",
            complex.constructors().len()
        )
    })
}

impl TypeProvider for ComplexProvider {
    fn name(&self) -> &'static str {
        "complex"
    }

    fn can_provide(&self, info: &'static TypeInfo) -> bool {
        matches!(info, TypeInfo::Complex(_))
    }

    fn nests(&self) -> bool {
        true
    }

    fn write_contract(
        &self,
        info: &'static TypeInfo,
        contracts: &mut ContractBuilder<'_, WriteField>,
    ) -> Result<WriteContract, UnsupportedTypeError> {
        let complex = info.as_complex().map_err(wrong_kind(info))?;
        let fields = complex
            .fields()
            .iter()
            .map(|field| {
                Ok(WriteField {
                    name: String::from(field.name()),
                    contract: contracts.contract_for(field.type_info())?,
                })
            })
            .collect::<Result<Box<[_]>, UnsupportedTypeError>>()?;
        Ok(ContractShape::Complex(fields))
    }

    fn read_contract(
        &self,
        info: &'static TypeInfo,
        contracts: &mut ContractBuilder<'_, ReadField>,
    ) -> Result<ReadContract, UnsupportedTypeError> {
        let complex = info.as_complex().map_err(wrong_kind(info))?;
        let constructor = single_constructor(complex)
            .map_err(|reason| UnsupportedTypeError::new(info.type_path(), reason))?;
        let fields = constructor
            .params()
            .iter()
            .map(|param| {
                Ok(ReadField {
                    name: String::from(param.name()),
                    contract: contracts.contract_for(param.type_info())?,
                    has_default: param.has_default(),
                })
            })
            .collect::<Result<Box<[_]>, UnsupportedTypeError>>()?;
        Ok(ContractShape::Complex(fields))
    }

    fn build_reader(&self, info: &'static TypeInfo, builder: &mut ReadBuilder<'_>) -> Result<ReadStep, CodecError> {
        let complex = info.as_complex().map_err(wrong_kind(info))?;
        let constructor = single_constructor(complex)
            .map_err(|reason| DeserialisationError::new(reason).in_type(info.type_path()))?;
        let steps = constructor
            .params()
            .iter()
            .map(|param| builder.step_for(param.type_info()))
            .collect::<Result<Box<[_]>, CodecError>>()?;
        let positions = complex
            .fields()
            .iter()
            .map(|field| constructor.param_index(field.name()))
            .collect();
        Ok(ReadStep::Complex(ComplexReader::new(
            info.type_path(),
            constructor,
            steps,
            positions,
            builder.policy(),
        )))
    }

    fn build_writer(&self, info: &'static TypeInfo, builder: &mut WriteBuilder<'_>) -> Result<WriteStep, CodecError> {
        let complex = info.as_complex().map_err(wrong_kind(info))?;
        let fields = complex
            .fields()
            .iter()
            .map(|field| Ok((field.name(), builder.step_for(field.type_info())?)))
            .collect::<Result<Box<[_]>, CodecError>>()?;
        Ok(WriteStep::Complex(ComplexWriter::new(
            info.type_path(),
            fields,
            builder.layout(),
        )))
    }
}

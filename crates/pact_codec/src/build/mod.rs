//! Procedure construction.
//!
//! A procedure is a tree of steps, built once per type from its
//! [`TypeInfo`] and then interpreted for every value. Providers assemble the
//! steps through a [`ReadBuilder`] or [`WriteBuilder`]; complex types become
//! [`Nested`](ReadStep::Nested) references to their own cached procedure, so
//! each complex type is built once and recursive types terminate.

// -----------------------------------------------------------------------------
// Modules

mod read;
mod write;

// -----------------------------------------------------------------------------
// Exports

pub use read::{ComplexReader, CustomReader, NestedReader, ReadProcedure, ReadStep};
pub use write::{ComplexWriter, CustomWriter, NestedWriter, WriteProcedure, WriteStep};

use core::any::TypeId;

use pact_reflect::info::TypeInfo;

use crate::cache::{Claim, Session};
use crate::{CodecError, ComplexLayout, Context, UnexpectedFieldPolicy};

pub(crate) type ReadKey = (TypeId, UnexpectedFieldPolicy);

// -----------------------------------------------------------------------------
// ReadBuilder

/// Builds the read steps of one root procedure and the nested procedures it
/// claims along the way.
pub struct ReadBuilder<'a> {
    cx: &'a Context,
    policy: UnexpectedFieldPolicy,
    session: &'a mut Session<ReadKey, ReadProcedure>,
}

impl<'a> ReadBuilder<'a> {
    pub(crate) fn new(
        cx: &'a Context,
        policy: UnexpectedFieldPolicy,
        session: &'a mut Session<ReadKey, ReadProcedure>,
    ) -> Self {
        Self {
            cx,
            policy,
            session,
        }
    }

    #[inline]
    pub fn context(&self) -> &'a Context {
        self.cx
    }

    /// The unexpected-field policy of the procedure being built.
    #[inline]
    pub fn policy(&self) -> UnexpectedFieldPolicy {
        self.policy
    }

    /// Returns the step reading a value of `info`.
    pub fn step_for(&mut self, info: &'static TypeInfo) -> Result<ReadStep, CodecError> {
        let cx = self.cx;
        let provider = cx.registry().find(info)?;
        if provider.nests() {
            return self.nested(info).map(ReadStep::Nested);
        }
        provider.build_reader(info, self)
    }

    /// A reference to the procedure of `info`, claiming and building it
    /// within this session if no one has yet.
    fn nested(&mut self, info: &'static TypeInfo) -> Result<NestedReader, CodecError> {
        let key = (info.type_id(), self.policy);
        if let Some(slot) = self.session.claimed(&key) {
            return Ok(NestedReader::new(slot, info, self.policy));
        }
        match self.cx.readers().claim(key) {
            Claim::Existing(slot) => Ok(NestedReader::new(slot, info, self.policy)),
            Claim::Owned(slot) => {
                self.session.claim(key, slot.clone());
                let procedure = self.build_procedure(info)?;
                self.session.finish(slot.clone(), procedure);
                Ok(NestedReader::new(slot, info, self.policy))
            }
        }
    }

    /// Builds the procedure of `info` itself, even when its provider nests.
    pub(crate) fn build_procedure(
        &mut self,
        info: &'static TypeInfo,
    ) -> Result<ReadProcedure, CodecError> {
        let cx = self.cx;
        let provider = cx.registry().find(info)?;
        let step = provider.build_reader(info, self)?;
        Ok(ReadProcedure::new(info, self.policy, step))
    }
}

// -----------------------------------------------------------------------------
// WriteBuilder

/// Builds the write steps of one root procedure and the nested procedures it
/// claims along the way.
pub struct WriteBuilder<'a> {
    cx: &'a Context,
    session: &'a mut Session<TypeId, WriteProcedure>,
}

impl<'a> WriteBuilder<'a> {
    pub(crate) fn new(cx: &'a Context, session: &'a mut Session<TypeId, WriteProcedure>) -> Self {
        Self { cx, session }
    }

    #[inline]
    pub fn context(&self) -> &'a Context {
        self.cx
    }

    /// The layout complex values are written with.
    #[inline]
    pub fn layout(&self) -> ComplexLayout {
        self.cx.options().layout
    }

    /// Returns the step writing a value of `info`.
    pub fn step_for(&mut self, info: &'static TypeInfo) -> Result<WriteStep, CodecError> {
        let cx = self.cx;
        let provider = cx.registry().find(info)?;
        if provider.nests() {
            return self.nested(info).map(WriteStep::Nested);
        }
        provider.build_writer(info, self)
    }

    fn nested(&mut self, info: &'static TypeInfo) -> Result<NestedWriter, CodecError> {
        let key = info.type_id();
        if let Some(slot) = self.session.claimed(&key) {
            return Ok(NestedWriter::new(slot, info));
        }
        match self.cx.writers().claim(key) {
            Claim::Existing(slot) => Ok(NestedWriter::new(slot, info)),
            Claim::Owned(slot) => {
                self.session.claim(key, slot.clone());
                let procedure = self.build_procedure(info)?;
                self.session.finish(slot.clone(), procedure);
                Ok(NestedWriter::new(slot, info))
            }
        }
    }

    pub(crate) fn build_procedure(
        &mut self,
        info: &'static TypeInfo,
    ) -> Result<WriteProcedure, CodecError> {
        let cx = self.cx;
        let provider = cx.registry().find(info)?;
        let step = provider.build_writer(info, self)?;
        Ok(WriteProcedure::new(info, step))
    }
}

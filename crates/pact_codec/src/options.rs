/// How complex values are laid out on the wire.
///
/// Readers accept both layouts regardless of this setting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ComplexLayout {
    /// A map from field name to value. Robust to field reordering.
    #[default]
    Map,
    /// An array of values in field declaration order. Smaller, but only
    /// readable by types with the same field order.
    Array,
}

/// What a reader does with an input field it does not expect.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum UnexpectedFieldPolicy {
    /// Fail with a [`DeserialisationError`](crate::DeserialisationError)
    /// naming the field.
    #[default]
    Throw,
    /// Skip the field's encoded value.
    Ignore,
}

/// Configuration of a [`Context`](crate::Context).
///
/// ```
/// use pact_codec::{ComplexLayout, ContextOptions, UnexpectedFieldPolicy};
///
/// let options = ContextOptions::new()
///     .with_layout(ComplexLayout::Array)
///     .with_unexpected_fields(UnexpectedFieldPolicy::Ignore);
/// assert_eq!(options.layout, ComplexLayout::Array);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextOptions {
    /// Layout used when writing complex values.
    pub layout: ComplexLayout,
    /// Policy used by [`Deserialiser`](crate::Deserialiser)s that do not pick one.
    pub unexpected_fields: UnexpectedFieldPolicy,
    /// Initial capacity of each procedure cache.
    pub cache_capacity: usize,
    /// Initial capacity of the output buffer of `serialise` calls.
    pub buffer_capacity: usize,
}

impl ContextOptions {
    pub const fn new() -> Self {
        Self {
            layout: ComplexLayout::Map,
            unexpected_fields: UnexpectedFieldPolicy::Throw,
            cache_capacity: 64,
            buffer_capacity: 128,
        }
    }

    #[inline]
    pub const fn with_layout(mut self, layout: ComplexLayout) -> Self {
        self.layout = layout;
        self
    }

    #[inline]
    pub const fn with_unexpected_fields(mut self, policy: UnexpectedFieldPolicy) -> Self {
        self.unexpected_fields = policy;
        self
    }

    #[inline]
    pub const fn with_cache_capacity(mut self, capacity: usize) -> Self {
        self.cache_capacity = capacity;
        self
    }

    #[inline]
    pub const fn with_buffer_capacity(mut self, capacity: usize) -> Self {
        self.buffer_capacity = capacity;
        self
    }
}

impl Default for ContextOptions {
    fn default() -> Self {
        Self::new()
    }
}

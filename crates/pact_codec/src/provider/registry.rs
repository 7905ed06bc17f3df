use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt;

use pact_reflect::info::{TypeInfo, TypeKind};

use crate::UnsupportedTypeError;
use crate::provider::{
    ComplexProvider, DictionaryProvider, EnumProvider, ListProvider, NullableProvider,
    PrimitiveProvider, TupleProvider, TypeProvider, UnionProvider,
};

/// The ordered set of providers a [`Context`](crate::Context) consults.
///
/// Custom providers are asked first, in registration order; then the
/// built-in ones: primitive, nullable, list, dictionary, enum, union, tuple
/// and complex.
///
/// ```
/// use pact_codec::provider::TypeProviderRegistry;
///
/// let names: Vec<_> = TypeProviderRegistry::new().providers().map(|p| p.name()).collect();
/// assert_eq!(names[0], "primitive");
/// assert_eq!(names.last(), Some(&"complex"));
/// ```
#[derive(Clone)]
pub struct TypeProviderRegistry {
    providers: Vec<Arc<dyn TypeProvider>>,
    custom: usize,
}

impl TypeProviderRegistry {
    /// A registry holding the built-in providers only.
    pub fn new() -> Self {
        let providers: Vec<Arc<dyn TypeProvider>> = alloc::vec![
            Arc::new(PrimitiveProvider),
            Arc::new(NullableProvider),
            Arc::new(ListProvider),
            Arc::new(DictionaryProvider),
            Arc::new(EnumProvider),
            Arc::new(UnionProvider),
            Arc::new(TupleProvider),
            Arc::new(ComplexProvider),
        ];
        Self {
            providers,
            custom: 0,
        }
    }

    /// Adds a custom provider, asked after earlier custom providers and
    /// before every built-in one.
    pub fn register(&mut self, provider: impl TypeProvider) {
        self.providers.insert(self.custom, Arc::new(provider));
        self.custom += 1;
    }

    #[inline]
    pub fn with_provider(mut self, provider: impl TypeProvider) -> Self {
        self.register(provider);
        self
    }

    /// All providers, in lookup order.
    pub fn providers(&self) -> impl Iterator<Item = &dyn TypeProvider> {
        self.providers.iter().map(|provider| &**provider)
    }

    /// Returns the first provider accepting `info`.
    pub fn find(&self, info: &'static TypeInfo) -> Result<&dyn TypeProvider, UnsupportedTypeError> {
        self.providers()
            .find(|provider| provider.can_provide(info))
            .ok_or_else(|| {
                let reason = match info.kind() {
                    TypeKind::Opaque => "opaque types need a custom type provider",
                    _ => "no registered type provider accepts it",
                };
                UnsupportedTypeError::new(info.type_path(), reason)
            })
    }
}

impl Default for TypeProviderRegistry {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for TypeProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.providers().map(|provider| provider.name()))
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

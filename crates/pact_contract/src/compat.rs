use hashbrown::HashSet;
use pact_reflect::hash::FixedHashState;
use pact_reflect::info::PrimitiveKind;

use crate::{ContractField, ReadContract, ReadContractCollection, ReadId};
use crate::{WriteContract, WriteContractCollection, WriteId};

// -----------------------------------------------------------------------------
// Primitives

/// Returns `true` if a `reader` primitive accepts every value of a `writer`
/// primitive.
///
/// Integers widen to integers of a larger range, and to both float kinds;
/// `f32` widens to `f64`. `bool`, `str` and `bytes` only read themselves.
///
/// ```
/// use pact_contract::can_widen;
/// use pact_reflect::info::PrimitiveKind::*;
///
/// assert!(can_widen(I64, U32));
/// assert!(!can_widen(I32, U32));
/// assert!(can_widen(F64, F32));
/// assert!(!can_widen(F32, F64));
/// assert!(!can_widen(Str, Bytes));
/// ```
pub fn can_widen(reader: PrimitiveKind, writer: PrimitiveKind) -> bool {
    if reader == writer {
        return true;
    }
    let (Some(r_bits), Some(w_bits)) = (reader.bits(), writer.bits()) else {
        return false;
    };
    if reader.is_float() {
        return writer.is_integer() || (reader == PrimitiveKind::F64 && writer.is_float());
    }
    if reader.is_signed() {
        // Unsigned writers need one spare bit for the sign.
        return writer.is_integer() && w_bits < r_bits;
    }
    reader.is_unsigned() && writer.is_unsigned() && w_bits <= r_bits
}

// -----------------------------------------------------------------------------
// Contracts

/// Coinductive compatibility check over one (reader, writer) graph pair.
struct Checker<'a> {
    readers: &'a ReadContractCollection,
    writers: &'a WriteContractCollection,
    strict: bool,
    assumed: HashSet<(ReadId, WriteId), FixedHashState>,
}

impl Checker<'_> {
    fn check(&mut self, reader: ReadId, writer: WriteId) -> bool {
        let (readers, writers) = (self.readers, self.writers);
        let (reader, writer) = (readers.resolve(reader), writers.resolve(writer));
        // A pair already under examination holds unless proven otherwise.
        if !self.assumed.insert((reader, writer)) {
            return true;
        }
        let (Some(r), Some(w)) = (readers.get(reader), writers.get(writer)) else {
            return false;
        };

        match (r, w) {
            (ReadContract::Nullable(r_inner), WriteContract::Nullable(w_inner)) => {
                self.check(*r_inner, *w_inner)
            }
            (ReadContract::Nullable(r_inner), _) => self.check(*r_inner, writer),
            (_, WriteContract::Nullable(_)) => false,

            (ReadContract::Primitive(r), WriteContract::Primitive(w)) => can_widen(*r, *w),
            (ReadContract::List(r_item), WriteContract::List(w_item)) => {
                self.check(*r_item, *w_item)
            }
            (
                ReadContract::Dictionary { key: rk, value: rv },
                WriteContract::Dictionary { key: wk, value: wv },
            ) => self.check(*rk, *wk) && self.check(*rv, *wv),
            (ReadContract::Enum(r_members), WriteContract::Enum(w_members)) => {
                w_members.iter().all(|member| {
                    r_members
                        .iter()
                        .any(|known| known.eq_ignore_ascii_case(member))
                })
            }
            (ReadContract::Union(r_members), WriteContract::Union(w_members)) => {
                w_members.iter().all(|(tag, w_member)| {
                    r_members
                        .iter()
                        .find(|(known, _)| known.eq_ignore_ascii_case(tag))
                        .is_some_and(|(_, r_member)| self.check(*r_member, *w_member))
                })
            }
            (ReadContract::Tuple(r_items), WriteContract::Tuple(w_items)) => {
                r_items.len() == w_items.len()
                    && r_items
                        .iter()
                        .zip(w_items.iter())
                        .all(|(r_item, w_item)| self.check(*r_item, *w_item))
            }
            (ReadContract::Complex(r_fields), WriteContract::Complex(w_fields)) => {
                let readable = r_fields.iter().all(|r_field| {
                    match w_fields
                        .iter()
                        .find(|w_field| w_field.name.eq_ignore_ascii_case(&r_field.name))
                    {
                        Some(w_field) => self.check(r_field.contract, w_field.contract),
                        None => r_field.has_default(),
                    }
                });
                readable
                    && (!self.strict
                        || w_fields.iter().all(|w_field| {
                            r_fields
                                .iter()
                                .any(|r_field| r_field.name.eq_ignore_ascii_case(&w_field.name))
                        }))
            }
            _ => false,
        }
    }
}

/// Returns `true` if data written with `writer` can be read with `reader`.
///
/// Under `strict`, writer fields unknown to the reader are rejected; otherwise
/// they are skipped. The relation is neither symmetric nor transitive.
pub fn can_read_from(
    readers: &ReadContractCollection,
    reader: ReadId,
    writers: &WriteContractCollection,
    writer: WriteId,
    strict: bool,
) -> bool {
    Checker {
        readers,
        writers,
        strict,
        assumed: HashSet::default(),
    }
    .check(reader, writer)
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;
    use alloc::vec;
    use alloc::vec::Vec;

    use pact_reflect::info::PrimitiveKind::{self, *};

    use super::*;
    use crate::{ReadField, WriteField};

    #[test]
    fn widening_table() {
        let allowed: &[(PrimitiveKind, &[PrimitiveKind])] = &[
            (I8, &[I8]),
            (U8, &[U8]),
            (I16, &[I8, U8, I16]),
            (U16, &[U8, U16]),
            (I32, &[I8, I16, I32, U8, U16]),
            (U32, &[U8, U16, U32]),
            (I64, &[I8, I16, I32, I64, U8, U16, U32]),
            (U64, &[U8, U16, U32, U64]),
            (F32, &[F32, I8, I16, I32, I64, U8, U16, U32, U64]),
            (F64, &[F32, F64, I8, I16, I32, I64, U8, U16, U32, U64]),
            (Bool, &[Bool]),
            (Str, &[Str]),
            (Bytes, &[Bytes]),
        ];
        for (reader, writers) in allowed {
            for writer in PrimitiveKind::ALL {
                assert_eq!(
                    can_widen(*reader, writer),
                    writers.contains(&writer),
                    "{reader} <- {writer}"
                );
            }
        }
    }

    struct Graphs {
        readers: ReadContractCollection,
        writers: WriteContractCollection,
    }

    impl Graphs {
        fn new() -> Self {
            Self {
                readers: ReadContractCollection::new(),
                writers: WriteContractCollection::new(),
            }
        }

        fn w_prim(&mut self, kind: PrimitiveKind) -> WriteId {
            self.writers.get_or_create(WriteContract::Primitive(kind))
        }

        fn r_prim(&mut self, kind: PrimitiveKind) -> ReadId {
            self.readers.get_or_create(ReadContract::Primitive(kind))
        }

        fn w_complex(&mut self, fields: Vec<(&str, WriteId)>) -> WriteId {
            let fields: Box<[WriteField]> = fields
                .into_iter()
                .map(|(name, contract)| WriteField {
                    name: String::from(name),
                    contract,
                })
                .collect();
            self.writers.get_or_create(WriteContract::Complex(fields))
        }

        fn r_complex(&mut self, fields: Vec<(&str, ReadId, bool)>) -> ReadId {
            let fields: Box<[ReadField]> = fields
                .into_iter()
                .map(|(name, contract, has_default)| ReadField {
                    name: String::from(name),
                    contract,
                    has_default,
                })
                .collect();
            self.readers.get_or_create(ReadContract::Complex(fields))
        }

        fn check(&self, reader: ReadId, writer: WriteId, strict: bool) -> bool {
            can_read_from(&self.readers, reader, &self.writers, writer, strict)
        }
    }

    #[test]
    fn added_field_with_default() {
        let mut g = Graphs::new();
        let w_int = g.w_prim(I32);
        let w_str = g.w_prim(Str);
        let r_int = g.r_prim(I32);
        let r_str = g.r_prim(Str);

        let v1_writer = g.w_complex(vec![("a", w_int)]);
        let v2_reader = g.r_complex(vec![("a", r_int, false), ("b", r_str, true)]);
        assert!(g.check(v2_reader, v1_writer, true));

        // Without the default, `b` cannot be satisfied.
        let v2_required = g.r_complex(vec![("a", r_int, false), ("b", r_str, false)]);
        assert!(!g.check(v2_required, v1_writer, false));

        // V1 reading V2 data only works when extra fields may be skipped.
        let v2_writer = g.w_complex(vec![("a", w_int), ("b", w_str)]);
        let v1_reader = g.r_complex(vec![("a", r_int, false)]);
        assert!(g.check(v1_reader, v2_writer, false));
        assert!(!g.check(v1_reader, v2_writer, true));
    }

    #[test]
    fn field_names_ignore_ascii_case() {
        let mut g = Graphs::new();
        let w_int = g.w_prim(I8);
        let r_int = g.r_prim(I64);
        let writer = g.w_complex(vec![("UserId", w_int)]);
        let reader = g.r_complex(vec![("userid", r_int, false)]);
        assert!(g.check(reader, writer, true));
    }

    #[test]
    fn nullable_is_directional() {
        let mut g = Graphs::new();
        let w_int = g.w_prim(I32);
        let w_opt = g.writers.get_or_create(WriteContract::Nullable(w_int));
        let r_int = g.r_prim(I32);
        let r_opt = g.readers.get_or_create(ReadContract::Nullable(r_int));

        assert!(g.check(r_opt, w_opt, true));
        assert!(g.check(r_opt, w_int, true));
        assert!(!g.check(r_int, w_opt, false));
    }

    #[test]
    fn enums_and_unions_accept_subsets() {
        let mut g = Graphs::new();
        let members = |names: &[&str]| -> Box<[String]> {
            names.iter().map(|name| String::from(*name)).collect()
        };
        let w_small = g.writers.get_or_create(WriteContract::Enum(members(&["Red"])));
        let w_large = g.writers.get_or_create(WriteContract::Enum(members(&["Red", "Blue"])));
        let r_enum = g.readers.get_or_create(ReadContract::Enum(members(&["red", "Green"])));
        assert!(g.check(r_enum, w_small, true));
        assert!(!g.check(r_enum, w_large, true));

        let w_int = g.w_prim(U8);
        let r_int = g.r_prim(U32);
        let r_str = g.r_prim(Str);
        let w_union = g
            .writers
            .get_or_create(WriteContract::Union(Box::new([(String::from("n"), w_int)])));
        let r_union = g.readers.get_or_create(ReadContract::Union(Box::new([
            (String::from("N"), r_int),
            (String::from("s"), r_str),
        ])));
        assert!(g.check(r_union, w_union, true));

        let w_wide = g.w_prim(I64);
        let w_bad = g
            .writers
            .get_or_create(WriteContract::Union(Box::new([(String::from("n"), w_wide)])));
        assert!(!g.check(r_union, w_bad, true));
    }

    #[test]
    fn tuples_need_equal_arity() {
        let mut g = Graphs::new();
        let w_int = g.w_prim(U16);
        let r_int = g.r_prim(U64);
        let w_pair = g.writers.get_or_create(WriteContract::Tuple(Box::new([w_int, w_int])));
        let w_triple = g
            .writers
            .get_or_create(WriteContract::Tuple(Box::new([w_int, w_int, w_int])));
        let r_pair = g.readers.get_or_create(ReadContract::Tuple(Box::new([r_int, r_int])));
        assert!(g.check(r_pair, w_pair, true));
        assert!(!g.check(r_pair, w_triple, false));
    }

    #[test]
    fn recursive_contracts_terminate() {
        let mut g = Graphs::new();
        let w_int = g.w_prim(I16);
        let w_node = g.writers.reserve();
        let w_next = g.writers.get_or_create(WriteContract::Nullable(w_node));
        let w_node = g.writers.fill(
            w_node,
            WriteContract::Complex(Box::new([
                WriteField { name: "value".into(), contract: w_int },
                WriteField { name: "next".into(), contract: w_next },
            ])),
        );

        let r_int = g.r_prim(I32);
        let r_node = g.readers.reserve();
        let r_next = g.readers.get_or_create(ReadContract::Nullable(r_node));
        let r_node = g.readers.fill(
            r_node,
            ReadContract::Complex(Box::new([
                ReadField { name: "value".into(), contract: r_int, has_default: false },
                ReadField { name: "next".into(), contract: r_next, has_default: true },
            ])),
        );

        assert!(g.check(r_node, w_node, true));
        assert!(!g.check(r_int, w_node, false));
    }
}

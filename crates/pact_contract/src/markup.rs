use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write;

use crate::{ContractCollection, ContractField, ContractId, ContractShape};

/// Renders a contract graph as compact markup.
///
/// Containers render as `{kind ...}`, primitives by name and complex fields as
/// `name:contract`, with `name?:contract` for reader fields with a default.
/// A reference back to an enclosing contract renders as `#n`, where `n` is the
/// nesting depth of that contract counted from the root.
///
/// ```
/// use pact_contract::{render_markup, WriteContract, WriteContractCollection, WriteField};
/// use pact_reflect::info::PrimitiveKind;
///
/// let mut contracts = WriteContractCollection::new();
/// let text = contracts.get_or_create(WriteContract::Primitive(PrimitiveKind::Str));
/// let int = contracts.get_or_create(WriteContract::Primitive(PrimitiveKind::I32));
/// let list = contracts.get_or_create(WriteContract::List(text));
/// let root = contracts.get_or_create(WriteContract::Complex(Box::new([
///     WriteField { name: "a".into(), contract: int },
///     WriteField { name: "b".into(), contract: list },
/// ])));
///
/// assert_eq!(render_markup(&contracts, root), "{complex a:i32 b:{list str}}");
/// ```
pub fn render_markup<F: ContractField>(contracts: &ContractCollection<F>, root: F::Id) -> String {
    let mut out = String::new();
    Renderer {
        contracts,
        open: Vec::new(),
        out: &mut out,
    }
    .render(root);
    out
}

struct Renderer<'a, F: ContractField> {
    contracts: &'a ContractCollection<F>,
    open: Vec<F::Id>,
    out: &'a mut String,
}

impl<F: ContractField> Renderer<'_, F> {
    fn render(&mut self, id: F::Id) {
        let id = self.contracts.resolve(id);
        if let Some(depth) = self.open.iter().position(|open| *open == id) {
            let _ = write!(self.out, "#{depth}");
            return;
        }
        let Some(contract) = self.contracts.get(id) else {
            let _ = write!(self.out, "{{unfilled {}}}", id.index());
            return;
        };
        if let ContractShape::Primitive(kind) = contract {
            self.out.push_str(kind.name());
            return;
        }

        self.open.push(id);
        self.out.push('{');
        self.out.push_str(contract.kind().name());
        match contract {
            ContractShape::Primitive(_) => {}
            ContractShape::Enum(members) => {
                for member in members {
                    self.out.push(' ');
                    self.out.push_str(member);
                }
            }
            ContractShape::Union(members) => {
                for (tag, member) in members {
                    self.out.push(' ');
                    self.out.push_str(tag);
                    self.out.push(':');
                    self.render(*member);
                }
            }
            ContractShape::Complex(fields) => {
                for field in fields {
                    self.out.push(' ');
                    self.out.push_str(field.name());
                    if field.has_default() {
                        self.out.push('?');
                    }
                    self.out.push(':');
                    self.render(field.contract());
                }
            }
            _ => {
                for child in contract.children() {
                    self.out.push(' ');
                    self.render(child);
                }
            }
        }
        self.out.push('}');
        self.open.pop();
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::boxed::Box;
    use alloc::string::String;

    use pact_reflect::info::PrimitiveKind;

    use crate::{ReadContract, ReadContractCollection, ReadField};
    use crate::{WriteContract, WriteContractCollection, WriteField, render_markup};

    #[test]
    fn recursion_renders_as_back_reference() {
        let mut contracts = WriteContractCollection::new();
        let int = contracts.get_or_create(WriteContract::Primitive(PrimitiveKind::I32));
        let node = contracts.reserve();
        let next = contracts.get_or_create(WriteContract::Nullable(node));
        let node = contracts.fill(
            node,
            WriteContract::Complex(Box::new([
                WriteField { name: String::from("value"), contract: int },
                WriteField { name: String::from("next"), contract: next },
            ])),
        );

        assert_eq!(
            render_markup(&contracts, node),
            "{complex value:i32 next:{nullable #0}}"
        );
    }

    #[test]
    fn containers_and_defaults() {
        let mut contracts = ReadContractCollection::new();
        let key = contracts.get_or_create(ReadContract::Primitive(PrimitiveKind::Str));
        let value = contracts.get_or_create(ReadContract::Primitive(PrimitiveKind::F64));
        let dict = contracts.get_or_create(ReadContract::Dictionary { key, value });
        let pair = contracts.get_or_create(ReadContract::Tuple(Box::new([key, value])));
        let colour = contracts.get_or_create(ReadContract::Enum(Box::new([
            String::from("Red"),
            String::from("Green"),
        ])));
        let root = contracts.get_or_create(ReadContract::Complex(Box::new([
            ReadField { name: String::from("scores"), contract: dict, has_default: false },
            ReadField { name: String::from("pair"), contract: pair, has_default: true },
            ReadField { name: String::from("colour"), contract: colour, has_default: false },
        ])));

        assert_eq!(
            render_markup(&contracts, root),
            "{complex scores:{dictionary str f64} pair?:{tuple str f64} colour:{enum Red Green}}"
        );
    }
}

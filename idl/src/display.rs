//! Renders resolved interfaces back into IDL text.
//!
//! References to declared typedefs are written by name; every other struct or enum is written
//! inline, so the output parses back into an equal [`Interface`].

use std::fmt;

use crate::components::TypeRef;
use crate::model::{ErrorDeclaration, Interface, Method, Origin, TypeKind};

/// Displays a type the way it would be written at a use site.
pub struct TypeDisplay<'a> {
    interface: &'a Interface,
    ref_: TypeRef,
}

impl Interface {
    pub fn display_type(&self, ref_: TypeRef) -> TypeDisplay<'_> {
        TypeDisplay {
            interface: self,
            ref_,
        }
    }

    fn fmt_body(&self, f: &mut fmt::Formatter<'_>, ref_: TypeRef) -> fmt::Result {
        let type_ = self.get(ref_);
        if !type_.kind.is_declaration() {
            return write!(f, "{}", self.display_type(ref_));
        }
        f.write_str("(")?;
        for (i, member) in type_.members().iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&member.name)?;
            if let Some(member_type) = member.type_ {
                write!(f, ": {}", self.display_type(member_type))?;
            }
        }
        f.write_str(")")
    }
}

impl fmt::Display for TypeDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interface = self.interface;
        let type_ = interface.get(self.ref_);
        match type_.kind {
            _ if type_.origin == Origin::Typedef => {
                f.write_str(type_.name().expect("typedefs are named"))
            }
            TypeKind::Struct(_) | TypeKind::Enum(_) => interface.fmt_body(f, self.ref_),
            TypeKind::Bool => f.write_str("bool"),
            TypeKind::Int => f.write_str("int"),
            TypeKind::Float => f.write_str("float"),
            TypeKind::String => f.write_str("string"),
            TypeKind::Object => f.write_str("object"),
            TypeKind::Maybe(inner) => write!(f, "?{}", interface.display_type(inner)),
            TypeKind::Array(inner) => write!(f, "[]{}", interface.display_type(inner)),
            TypeKind::Dictionary(inner) => write!(f, "[string]{}", interface.display_type(inner)),
        }
    }
}

struct MethodDisplay<'a>(&'a Interface, &'a Method);

impl fmt::Display for MethodDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(interface, method) = self;
        write!(
            f,
            "method {} {} -> {}",
            method.name,
            interface.display_type(method.parameter_type),
            interface.display_type(method.return_type)
        )
    }
}

struct ErrorDisplay<'a>(&'a Interface, &'a ErrorDeclaration);

impl fmt::Display for ErrorDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Self(interface, error) = self;
        write!(f, "error {} {}", error.name, interface.display_type(error.type_))
    }
}

impl fmt::Display for Interface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "interface {}", self.name)?;
        for typedef in self.declared_typedefs() {
            let name = self.get(typedef).name().expect("typedefs are named");
            write!(f, "\ntype {name} ")?;
            self.fmt_body(f, typedef)?;
            writeln!(f)?;
        }
        for error in &self.errors {
            writeln!(f, "\n{}", ErrorDisplay(self, error))?;
        }
        for method in &self.methods {
            writeln!(f, "\n{}", MethodDisplay(self, method))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::parse;
    use pretty_assertions::assert_eq;

    #[test]
    fn renders_members_in_categories() {
        let interface = parse(
            "interface org.example
             method Get (id: int) -> (item: ?Item, tags: [](name: string))
             error Missing (id: int)
             type Item (kind: (a, b), children: []Item)",
        )
        .unwrap();
        assert_eq!(
            interface.to_string(),
            "interface org.example\n\
             \n\
             type Item (kind: (a, b), children: []Item)\n\
             \n\
             error Missing (id: int)\n\
             \n\
             method Get (id: int) -> (item: ?Item, tags: [](name: string))\n"
        );
    }

    #[test]
    fn displays_use_sites() {
        let interface = parse("interface a type T (m: [string]?(x))").unwrap();
        let t = interface.typedef("T").unwrap();
        let m = interface.get(t).members()[0].type_.unwrap();
        assert_eq!(interface.display_type(t).to_string(), "T");
        assert_eq!(interface.display_type(m).to_string(), "[string]?(x)");
    }

    #[test]
    fn signatures_keep_typedef_names() {
        let source = "interface a\n\ntype Point (x: int, y: int)\n\nerror Off Point\n\nmethod Draw Point -> ()\n";
        let interface = parse(source).unwrap();
        assert_eq!(interface.to_string(), source);
        assert_eq!(parse(&interface.to_string()).unwrap(), interface);
    }
}

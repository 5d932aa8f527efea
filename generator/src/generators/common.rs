use heck::ToPascalCase;
use varlink_idl::{ErrorDeclaration, Interface, Member, Method, TypeKind, TypeRef};

/// Callbacks for the declarations a backend emits, in emission order.
pub(super) trait InterfaceVisitor {
    fn visit_struct(&mut self, ctx: &GeneratorContext, type_: TypeRef, name: &str, members: &[Member]);

    fn visit_enum(&mut self, ctx: &GeneratorContext, type_: TypeRef, name: &str, members: &[Member]);

    /// Called once with all errors, after all types. Not called if there are none.
    fn visit_errors(&mut self, ctx: &GeneratorContext, errors: &[ErrorDeclaration]);

    /// Called once with all methods, last.
    fn visit_methods(&mut self, ctx: &GeneratorContext, methods: &[Method]);
}

pub(super) struct GeneratorContext<'a> {
    pub(super) interface: &'a Interface,
    /// Name of the generated client.
    pub(super) client_name: String,
    /// Name of the generated error type.
    pub(super) error_name: String,
}

impl<'a> GeneratorContext<'a> {
    pub(super) fn new(interface: &'a Interface) -> Self {
        let segment = interface.name.rsplit('.').next().unwrap_or_default();
        // Segments may contain dashes or start with a digit.
        let mut client_name = segment.to_pascal_case();
        if !client_name.starts_with(|c: char| c.is_alphabetic()) {
            client_name.insert_str(0, "Interface");
        }
        // Typedefs keep their names, so the client gives way.
        while interface.typedef(&client_name).is_some()
            || interface.typedef(&format!("{client_name}Error")).is_some()
        {
            client_name.push_str("Client");
        }
        let error_name = format!("{client_name}Error");
        Self {
            interface,
            client_name,
            error_name,
        }
    }

    /// Name of a struct or enum; every declaration is named after resolution.
    pub(super) fn declaration_name(&self, type_: TypeRef) -> &'a str {
        self.interface
            .get(type_)
            .name()
            .expect("declaration without name")
    }

    /// The fully qualified name of a method or error, as sent over the wire.
    pub(super) fn qualified(&self, name: &str) -> String {
        format!("{}.{name}", self.interface.name)
    }

    /// The wrapper type of a call, unless it is suppressed.
    pub(super) fn wrapper(&self, type_: TypeRef) -> Option<&'a str> {
        let wrapper = self.interface.get(type_);
        (!wrapper.is_suppressed()).then(|| self.declaration_name(type_))
    }
}

/// Walks all declarations of `ctx.interface` in the order of [`Interface::typedefs`].
pub(super) fn walk(visitor: &mut impl InterfaceVisitor, ctx: &GeneratorContext) {
    let interface = ctx.interface;
    for typedef in interface.typedefs.iter().copied() {
        let type_ = interface.get(typedef);
        let name = ctx.declaration_name(typedef);
        match &type_.kind {
            TypeKind::Struct(members) => visitor.visit_struct(ctx, typedef, name, members),
            TypeKind::Enum(members) => visitor.visit_enum(ctx, typedef, name, members),
            kind => unreachable!("typedef {name} is not a declaration: {kind:?}"),
        }
    }
    if !interface.errors.is_empty() {
        visitor.visit_errors(ctx, &interface.errors);
    }
    visitor.visit_methods(ctx, &interface.methods);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_is_named_after_last_segment() {
        let interface = varlink_idl::parse("interface org.example.shop method Ping () -> ()")
            .unwrap();
        let ctx = GeneratorContext::new(&interface);
        assert_eq!(ctx.client_name, "Shop");
        assert_eq!(ctx.error_name, "ShopError");
        assert_eq!(ctx.qualified("Ping"), "org.example.shop.Ping");
    }

    #[test]
    fn client_avoids_typedef_names() {
        let interface = varlink_idl::parse(
            "interface org.example.shop
             type Shop (name: string)
             type ShopClientError (code: int)",
        )
        .unwrap();
        let ctx = GeneratorContext::new(&interface);
        assert_eq!(ctx.client_name, "ShopClientClient");
    }

    #[test]
    fn client_name_is_an_identifier() {
        for (name, client) in [
            ("org.example.my-service", "MyService"),
            ("org.example.a--b-c", "ABC"),
            ("org.example.42", "Interface42"),
        ] {
            let interface = varlink_idl::parse(&format!("interface {name}")).unwrap();
            let ctx = GeneratorContext::new(&interface);
            assert_eq!(ctx.client_name, client);
            assert_eq!(ctx.error_name, format!("{client}Error"));
        }
    }
}

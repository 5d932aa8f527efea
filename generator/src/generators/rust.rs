use std::collections::HashSet;

use syn::{
    __private::Span, ext::IdentExt, parse_quote, Arm, Attribute, Expr, Field, FieldMutability,
    FnArg, Ident, ImplItemFn, Item, Type, Variant,
};

use varlink_idl::{ErrorDeclaration, Member, Method, TypeKind, TypeRef};

use super::common::{walk, GeneratorContext, InterfaceVisitor};

use check_keyword::CheckKeyword;
use heck::{ToPascalCase, ToSnakeCase};

#[derive(Default)]
struct RustVisitor {
    output_items: Vec<Item>,
}

impl RustVisitor {
    fn new() -> Self {
        Self::default()
    }

    fn name_to_ident(name: &str) -> Ident {
        if ["crate", "self", "super", "Self"].contains(&name) {
            // These are keywords that are not allowed as raw identifiers
            Ident::new(&format!("{}_", name), Span::call_site())
        } else if name.is_keyword() {
            Ident::new_raw(name, Span::call_site())
        } else {
            Ident::new(name, Span::call_site())
        }
    }

    /// `#[serde(rename)]` for an identifier that does not spell its JSON name.
    fn rename_attr(ident: &Ident, name: &str) -> Option<Attribute> {
        (ident.unraw() != name).then(|| parse_quote!(#[serde(rename = #name)]))
    }

    fn compute_type(ctx: &GeneratorContext, type_: TypeRef) -> Type {
        match &ctx.interface.get(type_).kind {
            TypeKind::Struct(_) | TypeKind::Enum(_) => {
                let name = Self::name_to_ident(ctx.declaration_name(type_));
                parse_quote!(#name)
            }
            TypeKind::Bool => parse_quote!(bool),
            TypeKind::Int => parse_quote!(i64),
            TypeKind::Float => parse_quote!(f64),
            TypeKind::String => parse_quote!(String),
            TypeKind::Object => parse_quote!(rt::Object),
            TypeKind::Maybe(inner) => {
                let inner = Self::compute_type(ctx, *inner);
                parse_quote!(Option<#inner>)
            }
            TypeKind::Array(inner) => {
                let inner = Self::compute_type(ctx, *inner);
                parse_quote!(Vec<#inner>)
            }
            TypeKind::Dictionary(inner) => {
                let inner = Self::compute_type(ctx, *inner);
                parse_quote!(HashMap<String, #inner>)
            }
        }
    }

    /// Whether a value of `type_` stores a value of `target` without indirection.
    ///
    /// `Vec` and `HashMap` allocate, so only struct fields and `Option` count.
    fn contains_inline(
        ctx: &GeneratorContext,
        type_: TypeRef,
        target: TypeRef,
        visited: &mut HashSet<TypeRef>,
    ) -> bool {
        if type_ == target {
            return true;
        }
        if !visited.insert(type_) {
            return false;
        }
        match &ctx.interface.get(type_).kind {
            TypeKind::Struct(members) => members
                .iter()
                .filter_map(|member| member.type_)
                .any(|member| Self::contains_inline(ctx, member, target, visited)),
            TypeKind::Maybe(inner) => Self::contains_inline(ctx, *inner, target, visited),
            _ => false,
        }
    }

    fn generate_field(ctx: &GeneratorContext, owner: TypeRef, member: &Member) -> Field {
        let member_type = member.type_.expect("struct member without type");
        let ident = Self::name_to_ident(&member.name.to_snake_case());

        let mut attrs = Vec::new();
        attrs.extend(Self::rename_attr(&ident, &member.name));

        let kind = &ctx.interface.get(member_type).kind;
        if matches!(kind, TypeKind::Maybe(_)) {
            attrs.push(parse_quote!(#[serde(default, skip_serializing_if = "Option::is_none")]));
        }

        // A struct that contains itself inline would be infinitely sized.
        let recursive = Self::contains_inline(ctx, member_type, owner, &mut HashSet::new());
        let ty = match kind {
            TypeKind::Maybe(inner) if recursive => {
                let inner = Self::compute_type(ctx, *inner);
                parse_quote!(Option<Box<#inner>>)
            }
            _ if recursive => {
                let ty = Self::compute_type(ctx, member_type);
                parse_quote!(Box<#ty>)
            }
            _ => Self::compute_type(ctx, member_type),
        };

        Field {
            attrs,
            vis: parse_quote!(pub),
            mutability: FieldMutability::None,
            ident: Some(ident),
            colon_token: Some(Default::default()),
            ty,
        }
    }

    fn generate_call(ctx: &GeneratorContext, method: &Method) -> ImplItemFn {
        let snake_name = method.name.to_snake_case();
        let fn_name = if ["new", "connect"].contains(&snake_name.as_str()) {
            // Taken by the client's constructors
            Ident::new(&format!("{snake_name}_"), Span::call_site())
        } else {
            Self::name_to_ident(&snake_name)
        };
        let qualified = ctx.qualified(&method.name);

        let (inputs, parameters): (Vec<FnArg>, Expr) = match ctx.wrapper(method.parameter_type) {
            Some(args) => {
                let args = Self::name_to_ident(args);
                (vec![parse_quote!(args: &#args)], parse_quote!(args))
            }
            None => (Vec::new(), parse_quote!(&rt::Empty {})),
        };

        match ctx.wrapper(method.return_type) {
            Some(result) => {
                let result = Self::name_to_ident(result);
                parse_quote! {
                    pub fn #fn_name(&mut self, #(#inputs),*) -> Result<#result, rt::Error> {
                        self.connection.call(#qualified, #parameters)
                    }
                }
            }
            None => parse_quote! {
                pub fn #fn_name(&mut self, #(#inputs),*) -> Result<(), rt::Error> {
                    self.connection.call::<_, rt::Empty>(#qualified, #parameters)?;
                    Ok(())
                }
            },
        }
    }
}

impl InterfaceVisitor for RustVisitor {
    fn visit_struct(
        &mut self,
        ctx: &GeneratorContext,
        type_: TypeRef,
        name: &str,
        members: &[Member],
    ) {
        let name = Self::name_to_ident(name);
        let fields = members
            .iter()
            .map(|member| Self::generate_field(ctx, type_, member));
        self.output_items.push(parse_quote! {
            #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
            pub struct #name {
                #(#fields),*
            }
        });
    }

    fn visit_enum(
        &mut self,
        _ctx: &GeneratorContext,
        _type: TypeRef,
        name: &str,
        members: &[Member],
    ) {
        let name = Self::name_to_ident(name);
        let variants = members.iter().map(|member| -> Variant {
            let ident = Self::name_to_ident(&member.name.to_pascal_case());
            let rename = Self::rename_attr(&ident, &member.name);
            parse_quote! {
                #rename
                #ident
            }
        });
        self.output_items.push(parse_quote! {
            #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
            pub enum #name {
                #(#variants),*
            }
        });
    }

    fn visit_errors(&mut self, ctx: &GeneratorContext, errors: &[ErrorDeclaration]) {
        let name = Self::name_to_ident(&ctx.error_name);

        let mut variants: Vec<Variant> = Vec::with_capacity(errors.len());
        let mut match_arms: Vec<Arm> = Vec::with_capacity(errors.len());
        for error in errors {
            let variant = Self::name_to_ident(&error.name);
            let qualified = ctx.qualified(&error.name);
            match ctx.wrapper(error.type_) {
                Some(args) => {
                    let args = Self::name_to_ident(args);
                    variants.push(parse_quote!(#variant(#args)));
                    match_arms.push(parse_quote! {
                        #qualified => rt::from_parameters(parameters).map(Self::#variant),
                    });
                }
                None => {
                    variants.push(parse_quote!(#variant));
                    match_arms.push(parse_quote! {
                        #qualified => Some(Self::#variant),
                    });
                }
            }
        }

        self.output_items.push(parse_quote! {
            #[derive(Debug, Clone, PartialEq)]
            pub enum #name {
                #(#variants),*
            }
        });
        self.output_items.push(parse_quote! {
            impl #name {
                /// Converts an error reply of this interface into its typed form.
                pub fn from_call_error(error: &rt::Error) -> Option<Self> {
                    let rt::Error::Call { error, parameters } = error else {
                        return None;
                    };
                    match error.as_str() {
                        #(#match_arms)*
                        _ => None,
                    }
                }
            }
        });
    }

    fn visit_methods(&mut self, ctx: &GeneratorContext, methods: &[Method]) {
        let name = Self::name_to_ident(&ctx.client_name);
        let doc = format!("Client for the `{}` interface.", ctx.interface.name);
        let calls = methods
            .iter()
            .map(|method| Self::generate_call(ctx, method));

        self.output_items.push(parse_quote! {
            #[doc = #doc]
            pub struct #name<S = rt::BoxedStream> {
                connection: rt::Connection<S>,
            }
        });
        self.output_items.push(parse_quote! {
            impl #name {
                pub fn connect(address: &str) -> Result<Self, rt::Error> {
                    Ok(Self::new(rt::Connection::open(address)?))
                }
            }
        });
        self.output_items.push(parse_quote! {
            impl<S: rt::Stream> #name<S> {
                pub fn new(connection: rt::Connection<S>) -> Self {
                    Self { connection }
                }

                #(#calls)*
            }
        });
    }
}

pub fn generate(interface: &varlink_idl::Interface) -> String {
    let ctx = GeneratorContext::new(interface);
    let mut visitor = RustVisitor::new();

    visitor.output_items.push(parse_quote!(
        use std::collections::HashMap;
    ));
    visitor.output_items.push(parse_quote!(
        use serde::{Deserialize, Serialize};
    ));
    visitor.output_items.push(parse_quote!(
        use varlink_runtime as rt;
    ));
    let interface_name = &interface.name;
    visitor.output_items.push(parse_quote!(
        pub const INTERFACE_NAME: &str = #interface_name;
    ));

    walk(&mut visitor, &ctx);

    let doc_comment = format!(
        "Generated by {} {} from `{}`",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        interface.name
    );
    let root = syn::File {
        shebang: None,
        attrs: vec![
            parse_quote!(#![doc = #doc_comment]),
            parse_quote!(#![allow(dead_code, unused_imports, unused_variables)]),
        ],
        items: visitor.output_items,
    };
    prettyplease::unparse(&root)
}
